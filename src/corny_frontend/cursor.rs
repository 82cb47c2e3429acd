use super::span::CodePosition;
use std::iter::Peekable;
use std::str::CharIndices;

/// Character stream over source text that keeps track of where it is.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    position: CodePosition,
}

impl<'src> Cursor<'src> {
    pub fn new(source: &'src str) -> Self {
        Cursor {
            source,
            chars: source.char_indices().peekable(),
            position: CodePosition::new(0, 1, 1),
        }
    }

    pub fn get_position(&self) -> CodePosition {
        self.position
    }

    /// Byte offset of the next unconsumed character.
    pub fn offset(&mut self) -> usize {
        self.peek().map_or(self.source.len(), |(idx, _)| idx)
    }

    /// Source text between `start` and the current offset.
    pub fn slice_from(&mut self, start: usize) -> &'src str {
        let end = self.offset();
        &self.source[start..end]
    }

    pub fn peek(&mut self) -> Option<(usize, char)> {
        self.chars.peek().copied()
    }

    pub fn peek_char(&mut self) -> Option<char> {
        self.peek().map(|(_, ch)| ch)
    }

    /// Peeks one character past the next one.
    pub fn peek_next(&mut self) -> Option<(usize, char)> {
        let mut lookahead = self.clone();
        lookahead.take();
        lookahead.peek()
    }

    pub fn take(&mut self) -> Option<(usize, char)> {
        let (byte_idx, ch) = self.chars.next()?;

        self.position.byte_pos = self.offset();
        if ch == '\n' {
            self.position.line_no += 1;
            self.position.column_no = 1;
        } else {
            self.position.column_no += 1;
        }

        Some((byte_idx, ch))
    }

    /// Consumes the next character if it equals `target`.
    pub fn take_if(&mut self, target: char) -> bool {
        match self.peek_char() {
            Some(ch) if ch == target => {
                self.take();
                true
            }
            _ => false,
        }
    }

    /// Consumes characters while they meet `condition`.
    pub fn take_while<F>(&mut self, condition: F)
    where
        F: Fn(char) -> bool,
    {
        while let Some(ch) = self.peek_char() {
            if !condition(ch) {
                break;
            }
            self.take();
        }
    }

    /// Consumes characters up to, but not including, the first one meeting `condition`.
    pub fn take_until<F>(&mut self, condition: F)
    where
        F: Fn(char) -> bool,
    {
        self.take_while(|ch| !condition(ch));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_positions() {
        let mut cursor = Cursor::new("ab\ncd");
        assert_eq!(cursor.take(), Some((0, 'a')));
        assert_eq!(cursor.get_position(), CodePosition::new(1, 1, 2));

        cursor.take_until(|ch| ch == 'c');
        assert_eq!(cursor.get_position(), CodePosition::new(3, 2, 1));
        assert_eq!(cursor.peek_next(), Some((4, 'd')));
        assert!(cursor.take_if('c'));
        assert!(!cursor.take_if('x'));
        assert_eq!(cursor.slice_from(0), "ab\nc");
    }

    #[test]
    fn test_cursor_end() {
        let mut cursor = Cursor::new("42");
        cursor.take_while(|ch| ch.is_ascii_digit());
        assert_eq!(cursor.take(), None);
        assert_eq!(cursor.offset(), 2);
    }
}
