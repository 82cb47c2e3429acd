use super::environment::Environment;
use super::errors::{RuntimeError, RuntimeResult};
use super::interpreter::Interpreter;
use super::object::Object;
use crate::corny_frontend::grammar::FuncInfo;

use std::fmt;
use std::rc::Rc;
use tracing::debug;

pub struct CornyFnData {
    func_info: Rc<FuncInfo>,
    closure: Environment,
}

#[derive(Clone)]
pub struct CornyFn(Rc<CornyFnData>);

impl CornyFn {
    pub fn new(func_info: Rc<FuncInfo>, closure: Environment) -> Self {
        let data = CornyFnData { func_info, closure };
        CornyFn(Rc::new(data))
    }

    pub fn arity(&self) -> usize {
        self.0.func_info.params.len()
    }

    pub fn execute(
        &self,
        args: Vec<Object>,
        interpreter: &mut Interpreter,
    ) -> RuntimeResult<Object> {
        if args.len() != self.arity() {
            return Err(RuntimeError::arity(self.arity(), args.len()));
        }

        // Each call gets a fresh frame chained to the captured one.
        let env = Environment::with_enclosing(&self.0.closure);
        for (param, arg) in self.0.func_info.params.iter().zip(args.into_iter()) {
            env.define(param.name.clone(), arg);
        }

        debug!(arity = self.arity(), "calling function");
        match interpreter.eval_block_in(&self.0.func_info.body, env)? {
            Object::Return(value) => Ok(*value),
            value => Ok(value),
        }
    }
}

impl fmt::Display for CornyFn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.func_info)
    }
}

impl fmt::Debug for CornyFn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<function/{}>", self.arity())
    }
}

impl PartialEq<CornyFn> for CornyFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CornyFn {}
