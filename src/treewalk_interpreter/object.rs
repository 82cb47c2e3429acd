use super::class::CornyClass;
use super::errors::{RuntimeError, RuntimeResult};
use super::function::CornyFn;
use super::native_function::NativeFn;
use crate::corny_frontend::grammar::{write_quoted, InfixOperator, PrefixOperator};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub type ArrayPtr = Rc<RefCell<Vec<Object>>>;
pub type HashPtr = Rc<RefCell<BTreeMap<String, Object>>>;

#[derive(Debug, PartialEq, Clone)]
pub enum Object {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Array(ArrayPtr),
    Hash(HashPtr),
    Function(CornyFn),
    Class(CornyClass),
    Builtin(NativeFn),
    /// A `return` unwinding towards the nearest function body or program.
    Return(Box<Object>),
    /// A method call whose name did not resolve inside a dot expression.
    Call(DeferredCall),
}

#[derive(Debug, PartialEq, Clone)]
pub struct DeferredCall {
    pub name: String,
    pub args: Vec<Object>,
}

const TYPE_ONLY: &[&str] = &["type"];
const SIZED: &[&str] = &["size", "type"];
const ARRAY_METHODS: &[&str] = &["push", "size", "type"];

impl Object {
    pub fn new_array(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn new_hash(entries: BTreeMap<String, Object>) -> Self {
        Object::Hash(Rc::new(RefCell::new(entries)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Number(_) => "NUMBER",
            Object::String(_) => "STRING",
            Object::Boolean(_) => "BOOLEAN",
            Object::Null => "NULL",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Class(_) => "CLASS",
            Object::Builtin(_) => "BUILTIN",
            Object::Return(_) => "RETURN",
            Object::Call(_) => "CALL",
        }
    }

    /// Single letter reported by the `type` builtin.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Object::String(_) => "C",
            Object::Number(_) => "N",
            Object::Null => "X",
            Object::Function(_) => "F",
            Object::Array(_) => "A",
            Object::Hash(_) => "H",
            Object::Boolean(_) => "B",
            Object::Class(_) => "K",
            _ => "U",
        }
    }

    fn methods(&self) -> &'static [&'static str] {
        match self {
            Object::Number(_) | Object::Boolean(_) | Object::Function(_) | Object::Class(_) => {
                TYPE_ONLY
            }
            Object::String(_) | Object::Hash(_) => SIZED,
            Object::Array(_) => ARRAY_METHODS,
            Object::Null | Object::Builtin(_) | Object::Return(_) | Object::Call(_) => &[],
        }
    }

    pub fn responds_to(&self, method: &str) -> bool {
        if let Object::Class(class) = self {
            if class.has_member(method) {
                return true;
            }
        }
        self.methods().contains(&method)
    }

    pub fn apply_infix_op(op: InfixOperator, lhs: Object, rhs: Object) -> RuntimeResult<Object> {
        match (lhs, rhs) {
            (Object::Number(a), Object::Number(b)) => numerical_binop(op, a, b),
            (Object::Boolean(a), Object::Boolean(b)) => numerical_binop(op, bool_num(a), bool_num(b)),
            (Object::String(a), Object::String(b)) => match op {
                InfixOperator::Add => Ok(Object::String(a + &b)),
                _ => Err(RuntimeError::type_mismatch(format!(
                    "Operator '{}' is not supported for strings.",
                    op.symbol()
                ))),
            },
            (a, b) => Err(RuntimeError::type_mismatch(format!(
                "Incompatible data types: {} {} {}.",
                a.type_name(),
                op.symbol(),
                b.type_name()
            ))),
        }
    }

    pub fn apply_prefix_op(op: PrefixOperator, value: Object) -> RuntimeResult<Object> {
        match (op, value) {
            (PrefixOperator::Negate, Object::Number(n)) => Ok(Object::Number(-n)),
            (PrefixOperator::LogicalNot, Object::Boolean(b)) => Ok(Object::Boolean(!b)),
            (op, value) => Err(RuntimeError::type_mismatch(format!(
                "Operator '{}' is not supported for {}.",
                op.symbol(),
                value.type_name()
            ))),
        }
    }
}

fn bool_num(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn numerical_binop(op: InfixOperator, a: f64, b: f64) -> RuntimeResult<Object> {
    let result = match op {
        InfixOperator::Add => Object::Number(a + b),
        InfixOperator::Subtract => Object::Number(a - b),
        InfixOperator::Multiply => Object::Number(a * b),
        InfixOperator::Divide => {
            if b == 0.0 {
                return Err(RuntimeError::division_by_zero());
            }
            Object::Number(a / b)
        }
        InfixOperator::EqualTo => Object::Boolean(a == b),
        InfixOperator::NotEqualTo => Object::Boolean(a != b),
        InfixOperator::GreaterThan => Object::Boolean(a > b),
        InfixOperator::GreaterEq => Object::Boolean(a >= b),
        InfixOperator::LessThan => Object::Boolean(a < b),
        InfixOperator::LessEq => Object::Boolean(a <= b),
    };
    Ok(result)
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Number(n) => write!(f, "{}", n),
            Object::String(s) => write_quoted(f, s),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::Null => write!(f, "null"),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Object::Hash(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ": {}", value)?;
                }
                write!(f, "}}")
            }
            Object::Function(func) => write!(f, "{}", func),
            Object::Class(_) => write!(f, "<class>"),
            Object::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name()),
            Object::Return(value) => write!(f, "{}", value),
            Object::Call(call) => write!(f, "<call {}>", call.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treewalk_interpreter::errors::ErrorKind;

    #[test]
    fn test_number_arithmetic() {
        let result = Object::apply_infix_op(
            InfixOperator::Multiply,
            Object::Number(2.5),
            Object::Number(4.0),
        );
        assert_eq!(result, Ok(Object::Number(10.0)));
    }

    #[test]
    fn test_division_by_zero() {
        let err = Object::apply_infix_op(
            InfixOperator::Divide,
            Object::Number(1.0),
            Object::Number(0.0),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);

        let result = Object::apply_infix_op(
            InfixOperator::Divide,
            Object::Number(1.0),
            Object::Number(-4.0),
        );
        assert_eq!(result, Ok(Object::Number(-0.25)));
    }

    #[test]
    fn test_booleans_compare_as_numbers() {
        let result = Object::apply_infix_op(
            InfixOperator::GreaterThan,
            Object::Boolean(true),
            Object::Boolean(false),
        );
        assert_eq!(result, Ok(Object::Boolean(true)));

        let result = Object::apply_infix_op(
            InfixOperator::Add,
            Object::Boolean(true),
            Object::Boolean(true),
        );
        assert_eq!(result, Ok(Object::Number(2.0)));
    }

    #[test]
    fn test_strings() {
        let result = Object::apply_infix_op(
            InfixOperator::Add,
            Object::String("a".to_owned()),
            Object::String("b".to_owned()),
        );
        assert_eq!(result, Ok(Object::String("ab".to_owned())));

        let err = Object::apply_infix_op(
            InfixOperator::Subtract,
            Object::String("a".to_owned()),
            Object::String("b".to_owned()),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_incompatible_operands() {
        let err = Object::apply_infix_op(
            InfixOperator::EqualTo,
            Object::Number(1.0),
            Object::String("1".to_owned()),
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.message, "Incompatible data types: NUMBER == STRING.");
    }

    #[test]
    fn test_prefix() {
        assert_eq!(
            Object::apply_prefix_op(PrefixOperator::Negate, Object::Number(3.0)),
            Ok(Object::Number(-3.0))
        );
        assert_eq!(
            Object::apply_prefix_op(PrefixOperator::LogicalNot, Object::Boolean(false)),
            Ok(Object::Boolean(true))
        );
        assert!(Object::apply_prefix_op(PrefixOperator::LogicalNot, Object::Number(0.0)).is_err());
        assert!(Object::apply_prefix_op(PrefixOperator::Negate, Object::Null).is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(Object::Number(1.0).responds_to("type"));
        assert!(!Object::Number(1.0).responds_to("size"));
        assert!(Object::String("x".to_owned()).responds_to("size"));
        assert!(Object::new_array(vec![]).responds_to("push"));
        assert!(!Object::new_hash(BTreeMap::new()).responds_to("push"));
        assert!(!Object::Null.responds_to("type"));
    }

    #[test]
    fn test_rendering() {
        assert_eq!(Object::Number(15.0).to_string(), "15");
        assert_eq!(Object::Number(3.5).to_string(), "3.5");
        assert_eq!(Object::String("ab".to_owned()).to_string(), "\"ab\"");

        let array = Object::new_array(vec![Object::Number(1.0), Object::Null]);
        assert_eq!(array.to_string(), "[1, null]");

        let mut entries = BTreeMap::new();
        entries.insert("b".to_owned(), Object::Boolean(false));
        entries.insert("a".to_owned(), Object::Number(1.0));
        assert_eq!(Object::new_hash(entries).to_string(), "{\"a\": 1, \"b\": false}");
    }

    #[test]
    fn test_structural_equality() {
        let a = Object::new_array(vec![Object::Number(1.0)]);
        let b = Object::new_array(vec![Object::Number(1.0)]);
        assert_eq!(a, b);
    }
}
