use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::errors::{RuntimeError, RuntimeResult};
use super::object::Object;

/// One lexical frame. Cloning shares the frame, so closures and class
/// values observe later bindings made through any handle.
#[derive(Clone)]
pub struct Environment {
    env_ptr: Rc<RefCell<EnvironmentData>>,
}

struct EnvironmentData {
    values: HashMap<String, Object>,
    enclosing: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        let env_data = EnvironmentData {
            values: HashMap::new(),
            enclosing: None,
        };
        Environment {
            env_ptr: Rc::new(RefCell::new(env_data)),
        }
    }

    pub fn with_enclosing(env: &Environment) -> Self {
        let env_data = EnvironmentData {
            values: HashMap::new(),
            enclosing: Some(env.clone()),
        };
        Environment {
            env_ptr: Rc::new(RefCell::new(env_data)),
        }
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn define(&self, name: String, value: Object) {
        self.env_ptr.borrow_mut().values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> RuntimeResult<Object> {
        let data = self.env_ptr.borrow();
        match data.values.get(name) {
            Some(obj) => Ok(obj.clone()),
            None => match &data.enclosing {
                Some(enclosing) => enclosing.get(name),
                None => Err(RuntimeError::unresolved(name)),
            },
        }
    }

    /// Looks only at this frame.
    pub fn get_local(&self, name: &str) -> Option<Object> {
        self.env_ptr.borrow().values.get(name).cloned()
    }

    pub fn contains_local(&self, name: &str) -> bool {
        self.env_ptr.borrow().values.contains_key(name)
    }

    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.env_ptr.borrow().values.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.env_ptr, &other.env_ptr)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treewalk_interpreter::errors::ErrorKind;

    #[test]
    fn test_lookup_walks_enclosing() {
        let globals = Environment::new();
        globals.define("x".to_owned(), Object::Number(1.0));
        let inner = Environment::with_enclosing(&globals);

        assert_eq!(inner.get("x"), Ok(Object::Number(1.0)));
        assert_eq!(inner.get_local("x"), None);
    }

    #[test]
    fn test_shadowing() {
        let globals = Environment::new();
        globals.define("x".to_owned(), Object::Number(1.0));
        let inner = Environment::with_enclosing(&globals);
        inner.define("x".to_owned(), Object::Number(2.0));

        assert_eq!(inner.get("x"), Ok(Object::Number(2.0)));
        assert_eq!(globals.get("x"), Ok(Object::Number(1.0)));
    }

    #[test]
    fn test_late_binding_is_visible() {
        let globals = Environment::new();
        let inner = Environment::with_enclosing(&globals);
        globals.define("later".to_owned(), Object::Boolean(true));

        assert_eq!(inner.get("later"), Ok(Object::Boolean(true)));
    }

    #[test]
    fn test_missing_name() {
        let env = Environment::new();
        let err = env.get("nope").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedIdentifier);
        assert_eq!(err.identifier.as_deref(), Some("nope"));
    }
}
