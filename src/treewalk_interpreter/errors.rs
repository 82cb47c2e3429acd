use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    UnresolvedIdentifier,
    TypeMismatch,
    ArityMismatch,
    OutOfBounds,
    InvalidKey,
    ReservedName,
    MethodNotFound,
    DivisionByZero,
    InvalidClassMember,
}

/// An evaluation failure. `identifier` is set when the error is about a
/// particular name (unresolved lookups, reserved words, missing methods).
#[derive(Debug, PartialEq, Clone, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    pub identifier: Option<String>,
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError {
            kind,
            message,
            identifier: None,
        }
    }

    fn with_identifier(kind: ErrorKind, message: String, name: &str) -> Self {
        RuntimeError {
            kind,
            message,
            identifier: Some(name.to_owned()),
        }
    }

    pub fn unresolved(name: &str) -> Self {
        let message = format!("Identifier not found: '{}'.", name);
        Self::with_identifier(ErrorKind::UnresolvedIdentifier, message, name)
    }

    pub fn type_mismatch(message: String) -> Self {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    pub fn arity(expected: usize, got: usize) -> Self {
        let message = format!("Unexpected arguments, got: {}, want: {}.", got, expected);
        Self::new(ErrorKind::ArityMismatch, message)
    }

    pub fn out_of_bounds(index: f64, len: usize) -> Self {
        let message = format!("Index {} out of bounds for length {}.", index, len);
        Self::new(ErrorKind::OutOfBounds, message)
    }

    pub fn invalid_key(message: String) -> Self {
        Self::new(ErrorKind::InvalidKey, message)
    }

    pub fn reserved(name: &str) -> Self {
        let message = format!("'{}' is a reserved word.", name);
        Self::with_identifier(ErrorKind::ReservedName, message, name)
    }

    pub fn method_not_found(name: &str, type_name: &str) -> Self {
        let message = format!("Method '{}' not found for {}.", name, type_name);
        Self::with_identifier(ErrorKind::MethodNotFound, message, name)
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "Division by zero.".to_owned())
    }

    pub fn invalid_class_member() -> Self {
        Self::new(
            ErrorKind::InvalidClassMember,
            "Only let statements are allowed in a class body.".to_owned(),
        )
    }

    pub fn is_unresolved(&self) -> bool {
        self.kind == ErrorKind::UnresolvedIdentifier
    }
}
