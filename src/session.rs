use crate::corny_frontend::grammar::Program;
use crate::corny_frontend::{Parser, ParserError};
use crate::treewalk_interpreter::{Interpreter, Object, RuntimeError};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{}", render_diagnostics(.0))]
    Syntax(Vec<ParserError>),
    #[error("Error: {0}")]
    Runtime(#[from] RuntimeError),
}

fn render_diagnostics(errors: &[ParserError]) -> String {
    let lines: Vec<_> = errors
        .iter()
        .map(|e| format!("Syntax error: {}", e))
        .collect();
    lines.join("\n")
}

/// A shell session: every input is parsed and evaluated against the same
/// root frame, so bindings persist between inputs.
pub struct Session {
    interpreter: Interpreter,
}

impl Session {
    pub fn new() -> Self {
        Session {
            interpreter: Interpreter::new(),
        }
    }

    /// Parses `source`. Any diagnostic rejects the input, even when the
    /// parser produced a tree.
    pub fn parse(source: &str) -> Result<Program, SessionError> {
        match Parser::new(source).parse() {
            Ok(parsed) if parsed.diagnostics.is_empty() => Ok(parsed.program),
            Ok(parsed) => Err(SessionError::Syntax(parsed.diagnostics)),
            Err(errors) => Err(SessionError::Syntax(errors)),
        }
    }

    pub fn eval_source(&mut self, source: &str) -> Result<Object, SessionError> {
        let program = Self::parse(source)?;
        debug!(statements = program.stmts.len(), "evaluating input");
        Ok(self.interpreter.eval_program(&program)?)
    }

    /// Evaluates one line and renders the outcome the way the shell prints it.
    pub fn eval_line(&mut self, line: &str) -> String {
        match self.eval_source(line) {
            Ok(value) => value.to_string(),
            Err(e) => e.to_string(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treewalk_interpreter::ErrorKind;

    #[test]
    fn test_bindings_persist() {
        let mut session = Session::new();
        assert_eq!(session.eval_line("let x = 40"), "40");
        assert_eq!(session.eval_line("let add = fn(a) { a + x }"), "fn(a) { (a + x); }");
        assert_eq!(session.eval_line("add(2)"), "42");
    }

    #[test]
    fn test_error_does_not_poison_session() {
        let mut session = Session::new();
        session.eval_line("let a = [1, 2]");
        assert_eq!(
            session.eval_line("a[9]"),
            "Error: Index 9 out of bounds for length 2."
        );
        assert_eq!(session.eval_line("a.push(3)"), "[1, 2, 3]");
    }

    #[test]
    fn test_runtime_error_kind() {
        let mut session = Session::new();
        match session.eval_source("let push = 1") {
            Err(SessionError::Runtime(e)) => assert_eq!(e.kind, ErrorKind::ReservedName),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_syntax_errors_are_reported() {
        let mut session = Session::new();
        assert!(matches!(
            session.eval_source("let = 1"),
            Err(SessionError::Syntax(_))
        ));
        assert!(matches!(
            session.eval_source("fn(x) { x"),
            Err(SessionError::Syntax(_))
        ));
        assert!(session.eval_line(")").starts_with("Syntax error: "));
    }
}
