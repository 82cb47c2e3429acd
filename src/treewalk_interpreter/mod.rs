mod class;
mod environment;
mod errors;
mod function;
mod interpreter;
mod native_function;
mod object;

pub use environment::Environment;
pub use errors::{ErrorKind, RuntimeError, RuntimeResult};
pub use interpreter::Interpreter;
pub use object::Object;
