use super::errors::{RuntimeError, RuntimeResult};
use super::object::Object;
use std::fmt;

type FnType = fn(Vec<Object>) -> RuntimeResult<Object>;

pub struct NativeFnData {
    name: &'static str,
    func: FnType,
    arity: usize,
    accepts_extra: bool,
}

/// Handle to an entry of the builtin table. The table is static, so two
/// handles are equal exactly when they point at the same entry.
#[derive(Clone, Copy)]
pub struct NativeFn(&'static NativeFnData);

static BUILTINS: [NativeFnData; 3] = [
    NativeFnData {
        name: "size",
        func: size,
        arity: 1,
        accepts_extra: false,
    },
    NativeFnData {
        name: "type",
        func: type_tag,
        arity: 1,
        accepts_extra: false,
    },
    NativeFnData {
        name: "push",
        func: push,
        arity: 1,
        accepts_extra: true,
    },
];

pub fn get_native_func(name: &str) -> Option<NativeFn> {
    BUILTINS.iter().find(|data| data.name == name).map(NativeFn)
}

pub fn is_reserved(name: &str) -> bool {
    get_native_func(name).is_some()
}

impl NativeFn {
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    pub fn accepts_extra(&self) -> bool {
        self.0.accepts_extra
    }

    pub fn execute(&self, args: Vec<Object>) -> RuntimeResult<Object> {
        let arity_ok = if self.0.accepts_extra {
            args.len() >= self.0.arity
        } else {
            args.len() == self.0.arity
        };

        if arity_ok {
            (self.0.func)(args)
        } else {
            Err(RuntimeError::arity(self.0.arity, args.len()))
        }
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<native-func {}>", self.0.name)
    }
}

impl PartialEq<NativeFn> for NativeFn {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for NativeFn {}

fn size(args: Vec<Object>) -> RuntimeResult<Object> {
    let len = match &args[0] {
        Object::String(s) => s.chars().count(),
        Object::Array(elements) => elements.borrow().len(),
        Object::Hash(entries) => entries.borrow().len(),
        other => {
            return Err(RuntimeError::type_mismatch(format!(
                "Argument to 'size' not supported, got {}.",
                other.type_name()
            )))
        }
    };
    Ok(Object::Number(len as f64))
}

fn type_tag(args: Vec<Object>) -> RuntimeResult<Object> {
    Ok(Object::String(args[0].type_tag().to_owned()))
}

fn push(args: Vec<Object>) -> RuntimeResult<Object> {
    let mut args = args.into_iter();
    let mut elements = match args.next() {
        Some(Object::Array(elements)) => elements.borrow().clone(),
        Some(other) => {
            return Err(RuntimeError::type_mismatch(format!(
                "Argument to 'push' must be ARRAY, got {}.",
                other.type_name()
            )))
        }
        None => return Err(RuntimeError::arity(1, 0)),
    };

    let extra: Vec<Object> = args.collect();
    if extra.is_empty() {
        elements.push(Object::Null);
    } else {
        elements.extend(extra);
    }
    Ok(Object::new_array(elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treewalk_interpreter::errors::ErrorKind;

    fn call(name: &str, args: Vec<Object>) -> RuntimeResult<Object> {
        get_native_func(name).unwrap().execute(args)
    }

    #[test]
    fn test_lookup() {
        assert!(is_reserved("size"));
        assert!(is_reserved("push"));
        assert!(!is_reserved("len"));
        assert_eq!(get_native_func("type"), get_native_func("type"));
        assert_ne!(get_native_func("type"), get_native_func("size"));
    }

    #[test]
    fn test_size() {
        assert_eq!(
            call("size", vec![Object::String("héllo".to_owned())]),
            Ok(Object::Number(5.0))
        );
        let err = call("size", vec![Object::Number(42.0)]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_push_does_not_mutate() {
        let original = Object::new_array(vec![Object::Number(1.0), Object::Number(2.0)]);
        let pushed = call("push", vec![original.clone(), Object::Number(3.0)]).unwrap();

        assert_eq!(pushed.to_string(), "[1, 2, 3]");
        assert_eq!(original.to_string(), "[1, 2]");
    }

    #[test]
    fn test_push_without_extra_appends_null() {
        let pushed = call("push", vec![Object::new_array(vec![])]).unwrap();
        assert_eq!(pushed.to_string(), "[null]");
    }

    #[test]
    fn test_arity() {
        let err = call("type", vec![]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);

        let err = call("size", vec![Object::Null, Object::Null]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
    }
}
