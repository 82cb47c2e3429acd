use super::span::Span;
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Dot,
    Comma,
    Colon,
    Semicolon,
    Question,

    // One or two character tokens.
    Bang,
    BangEq,
    Equals,
    DoubleEq,
    LeftAngle,
    LeftAngleEq,
    RightAngle,
    RightAngleEq,

    // Literals.
    Identifier(String),
    String(String),
    Number(f64),

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fn,
    If,
    Let,
    Null,
    Or,
    Return,
    True,

    LexerError(String),
    EndOfFile,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

impl Token {
    /// Looks up the keyword spelled by `word`, if any.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "and" => Token::And,
            "class" => Token::Class,
            "else" => Token::Else,
            "false" => Token::False,
            "fn" => Token::Fn,
            "if" => Token::If,
            "let" => Token::Let,
            "null" => Token::Null,
            "or" => Token::Or,
            "return" => Token::Return,
            "true" => Token::True,
            _ => return None,
        };
        Some(token)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Token::LeftParen => "(",
            Token::RightParen => ")",
            Token::LeftBrace => "{",
            Token::RightBrace => "}",
            Token::LeftBracket => "[",
            Token::RightBracket => "]",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Asterisk => "*",
            Token::Slash => "/",
            Token::Dot => ".",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::Question => "?",
            Token::Bang => "!",
            Token::BangEq => "!=",
            Token::Equals => "=",
            Token::DoubleEq => "==",
            Token::LeftAngle => "<",
            Token::LeftAngleEq => "<=",
            Token::RightAngle => ">",
            Token::RightAngleEq => ">=",
            Token::Identifier(name) => return write!(f, "identifier `{}`", name),
            Token::String(s) => return write!(f, "string \"{}\"", s),
            Token::Number(n) => return write!(f, "number {}", n),
            Token::And => "and",
            Token::Class => "class",
            Token::Else => "else",
            Token::False => "false",
            Token::Fn => "fn",
            Token::If => "if",
            Token::Let => "let",
            Token::Null => "null",
            Token::Or => "or",
            Token::Return => "return",
            Token::True => "true",
            Token::LexerError(e) => return write!(f, "invalid input ({})", e),
            Token::EndOfFile => "end of input",
        };
        write!(f, "`{}`", text)
    }
}
