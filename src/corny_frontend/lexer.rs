use super::cursor::Cursor;
use super::span::Span;
use super::token::{SpannedToken, Token};

pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    seen_eof: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer from source.
    pub fn new(source: &'src str) -> Self {
        Lexer {
            cursor: Cursor::new(source),
            seen_eof: false,
        }
    }

    /// Returns the next token. Once the source is exhausted this keeps
    /// returning `EndOfFile`.
    pub fn next_token(&mut self) -> SpannedToken {
        loop {
            // Get rid of whitespace.
            self.cursor.take_while(|ch| ch.is_ascii_whitespace());

            let start_pos = self.cursor.get_position();
            let token = self.lex_token();
            let end_pos = self.cursor.get_position();

            if let Some(token) = token {
                return SpannedToken {
                    token,
                    span: Span::new(start_pos, end_pos),
                };
            }
        }
    }

    fn lex_token(&mut self) -> Option<Token> {
        let (byte_idx, ch) = match self.cursor.take() {
            Some(t) => t,
            None => {
                self.seen_eof = true;
                return Some(Token::EndOfFile);
            }
        };

        let token = match ch {
            // Single-character tokens.
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Asterisk,
            '.' => Token::Dot,
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '?' => Token::Question,

            // Slash can either be comment or division.
            '/' => {
                if self.cursor.take_if('/') {
                    self.consume_line();
                    return None;
                } else {
                    Token::Slash
                }
            }

            // Potentially two character tokens.
            '=' => self.look_for_eq_sign(Token::Equals, Token::DoubleEq),
            '<' => self.look_for_eq_sign(Token::LeftAngle, Token::LeftAngleEq),
            '>' => self.look_for_eq_sign(Token::RightAngle, Token::RightAngleEq),
            '!' => self.look_for_eq_sign(Token::Bang, Token::BangEq),

            // String literals, either quote style.
            '"' | '\'' => self.lex_string(ch),

            _ if is_digit_char(ch) => self.lex_number(byte_idx),
            _ if is_identifier_start(ch) => self.lex_identifier_or_kw(byte_idx),

            _ => Token::LexerError(format!("Unrecognized character `{}`", ch)),
        };

        Some(token)
    }

    fn consume_line(&mut self) {
        self.cursor.take_while(|ch| ch != '\n');
        self.cursor.take();
    }

    /// Checks if next char is '='. If so, consume it and return t2.
    /// Otherwise, return t1.
    fn look_for_eq_sign(&mut self, t1: Token, t2: Token) -> Token {
        if self.cursor.take_if('=') {
            t2
        } else {
            t1
        }
    }

    /// Scans a string up to the matching `delimiter`. The opening delimiter
    /// has already been consumed.
    fn lex_string(&mut self, delimiter: char) -> Token {
        let start_idx = self.cursor.offset();
        self.cursor.take_until(|ch| ch == delimiter);

        match self.cursor.peek_char() {
            Some(_) => {
                let string = self.cursor.slice_from(start_idx).to_owned();
                self.cursor.take();
                Token::String(string)
            }
            None => Token::LexerError(format!("No terminal {} in string.", delimiter)),
        }
    }

    fn lex_number(&mut self, start_idx: usize) -> Token {
        self.cursor.take_while(is_digit_char);

        // Only consume the period when a digit follows it.
        if let Some('.') = self.cursor.peek_char() {
            if self
                .cursor
                .peek_next()
                .map_or(false, |(_, ch)| is_digit_char(ch))
            {
                self.cursor.take();
                self.cursor.take_while(is_digit_char);
            }
        }

        let scanned_number = self.cursor.slice_from(start_idx);
        match scanned_number.parse() {
            Ok(value) => Token::Number(value),
            Err(_) => Token::LexerError(format!("Unparsable number `{}`", scanned_number)),
        }
    }

    fn lex_identifier_or_kw(&mut self, start_idx: usize) -> Token {
        self.cursor.take_while(is_identifier_char);

        let word = self.cursor.slice_from(start_idx);
        Token::keyword(word).unwrap_or_else(|| Token::Identifier(word.to_owned()))
    }

    /// Returns an iterator version of lexer. The final item is `EndOfFile`.
    pub fn iter(self) -> LexerIterator<'src> {
        LexerIterator { lexer: self }
    }
}

pub struct LexerIterator<'src> {
    lexer: Lexer<'src>,
}

impl<'src> Iterator for LexerIterator<'src> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        if self.lexer.seen_eof {
            return None;
        }
        Some(self.lexer.next_token())
    }
}

fn is_digit_char(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_lexer_operators() {
        assert_eq!(
            lex("a <= b != c ? [1] : {}"),
            vec![
                Token::Identifier("a".to_owned()),
                Token::LeftAngleEq,
                Token::Identifier("b".to_owned()),
                Token::BangEq,
                Token::Identifier("c".to_owned()),
                Token::Question,
                Token::LeftBracket,
                Token::Number(1.0),
                Token::RightBracket,
                Token::Colon,
                Token::LeftBrace,
                Token::RightBrace,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_lexer_literals_and_keywords() {
        assert_eq!(
            lex("let x = fn(y) { return 3.5 } // trailing"),
            vec![
                Token::Let,
                Token::Identifier("x".to_owned()),
                Token::Equals,
                Token::Fn,
                Token::LeftParen,
                Token::Identifier("y".to_owned()),
                Token::RightParen,
                Token::LeftBrace,
                Token::Return,
                Token::Number(3.5),
                Token::RightBrace,
                Token::EndOfFile,
            ]
        );

        assert_eq!(
            lex("'it' \"a'b\" class or and null"),
            vec![
                Token::String("it".to_owned()),
                Token::String("a'b".to_owned()),
                Token::Class,
                Token::Or,
                Token::And,
                Token::Null,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_lexer_number_followed_by_dot() {
        assert_eq!(
            lex("1.size"),
            vec![
                Token::Number(1.0),
                Token::Dot,
                Token::Identifier("size".to_owned()),
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_lexer_errors() {
        assert!(matches!(lex("\"open")[0], Token::LexerError(_)));
        assert!(matches!(lex("#")[0], Token::LexerError(_)));
    }

    #[test]
    fn test_lexer_spans() {
        let tokens: Vec<_> = Lexer::new("a\n  bc").iter().collect();
        assert_eq!(tokens[1].span.start_pos.line_no, 2);
        assert_eq!(tokens[1].span.start_pos.column_no, 3);
        assert_eq!(tokens[1].span.end_pos.column_no, 5);
    }
}
