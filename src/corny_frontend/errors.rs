use super::span::Span;
use super::token::Token;

use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum ParserErrorType {
    ExpectedToken(Token, Token),
    ExpectedExpr(Token),
    ExpectedIdentifier(Token),
    IllegalToken(String),
    Unclosed(Token),
}

/// A parser diagnostic. Only `ExpectedExpr` and `IllegalToken` in expression
/// position stop the parse; the rest are collected while parsing continues.
#[derive(Debug, PartialEq, Clone)]
pub struct ParserError {
    pub span: Span,
    pub error: ParserErrorType,
}

pub type ParserResult<T> = Result<T, ParserError>;

impl ParserError {
    pub fn new(span: Span, error: ParserErrorType) -> Self {
        ParserError { span, error }
    }

    /// Formats the error together with the source line it points at.
    pub fn render(&self, source: &str) -> String {
        match self.span.source_line(source) {
            Some(line) => format!(
                "{}\n    {}\n    {}^",
                self,
                line,
                " ".repeat(self.span.start_pos.column_no.saturating_sub(1))
            ),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let line_no = self.span.start_pos.line_no;
        match &self.error {
            ParserErrorType::ExpectedToken(expected, got) => write!(
                f,
                "Expected {} on line {}, but instead got {}.",
                expected, line_no, got
            ),
            ParserErrorType::ExpectedExpr(got) => write!(
                f,
                "Expected expression on line {}, but instead got {}.",
                line_no, got
            ),
            ParserErrorType::ExpectedIdentifier(got) => write!(
                f,
                "Expected identifier on line {}, but instead got {}.",
                line_no, got
            ),
            ParserErrorType::IllegalToken(message) => {
                write!(f, "Illegal token on line {}: {}.", line_no, message)
            }
            ParserErrorType::Unclosed(delimiter) => write!(
                f,
                "Reached end of input on line {} while looking for {}.",
                line_no, delimiter
            ),
        }
    }
}

impl std::error::Error for ParserError {}
