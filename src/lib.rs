pub mod corny_frontend;
pub mod session;
pub mod treewalk_interpreter;

pub use session::{Session, SessionError};
