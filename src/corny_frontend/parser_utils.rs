use super::grammar::{CallMarker, InfixOperator, LogicalOperator};
use super::token::Token;

/// Operators the Pratt loop can attach to an already parsed left-hand side.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParserOperator {
    Arithequal(InfixOperator),
    Logical(LogicalOperator),
    Postfix(CallMarker),
    Ternary,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Precedence {
    // Lowest precedence
    Lowest,
    LogicalOr,
    LogicalAnd,
    Equality,
    Comparison,
    Addition,
    Multiplication,
    Unary,
    Call, // Highest precedence
}

#[derive(Debug, Clone, Copy)]
pub enum Associativity {
    Left,
    Right,
}

impl ParserOperator {
    pub fn from_token(token: &Token) -> Option<ParserOperator> {
        if let Some(op) = Self::try_arithequal(token) {
            return Some(ParserOperator::Arithequal(op));
        }

        if let Some(op) = Self::try_logical(token) {
            return Some(ParserOperator::Logical(op));
        }

        match token {
            Token::LeftParen => Some(ParserOperator::Postfix(CallMarker::Paren)),
            Token::LeftBracket => Some(ParserOperator::Postfix(CallMarker::Bracket)),
            Token::Dot => Some(ParserOperator::Postfix(CallMarker::Dot)),
            Token::Question => Some(ParserOperator::Ternary),
            _ => None,
        }
    }

    fn try_arithequal(token: &Token) -> Option<InfixOperator> {
        let op = match token {
            Token::Plus => InfixOperator::Add,
            Token::Minus => InfixOperator::Subtract,
            Token::Asterisk => InfixOperator::Multiply,
            Token::Slash => InfixOperator::Divide,
            Token::DoubleEq => InfixOperator::EqualTo,
            Token::BangEq => InfixOperator::NotEqualTo,
            Token::RightAngle => InfixOperator::GreaterThan,
            Token::RightAngleEq => InfixOperator::GreaterEq,
            Token::LeftAngle => InfixOperator::LessThan,
            Token::LeftAngleEq => InfixOperator::LessEq,
            _ => return None,
        };
        Some(op)
    }

    fn try_logical(token: &Token) -> Option<LogicalOperator> {
        let op = match token {
            Token::And => LogicalOperator::And,
            Token::Or => LogicalOperator::Or,
            _ => return None,
        };

        Some(op)
    }

    pub fn is_higher_precedence(&self, min_precedence: Precedence) -> bool {
        use std::cmp::Ordering;
        match self.precedence().cmp(&min_precedence) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => match self.associativity() {
                Associativity::Left => false,
                Associativity::Right => true,
            },
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            ParserOperator::Arithequal(op) => match op {
                InfixOperator::Add | InfixOperator::Subtract => Precedence::Addition,
                InfixOperator::Multiply | InfixOperator::Divide => Precedence::Multiplication,
                InfixOperator::EqualTo | InfixOperator::NotEqualTo => Precedence::Equality,
                InfixOperator::GreaterEq
                | InfixOperator::LessEq
                | InfixOperator::GreaterThan
                | InfixOperator::LessThan => Precedence::Comparison,
            },
            ParserOperator::Logical(op) => match op {
                LogicalOperator::And => Precedence::LogicalAnd,
                LogicalOperator::Or => Precedence::LogicalOr,
            },
            ParserOperator::Postfix(_) | ParserOperator::Ternary => Precedence::Call,
        }
    }

    pub fn associativity(&self) -> Associativity {
        self.precedence().associativity()
    }
}

impl Precedence {
    fn associativity(&self) -> Associativity {
        match self {
            // Prefix operators nest to the right: `- - x` is `-(-x)`.
            Precedence::Unary => Associativity::Right,
            _ => Associativity::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::more_asserts::*;

    #[test]
    fn test_precedence() {
        assert_lt!(Precedence::Lowest, Precedence::Unary);
        assert_lt!(Precedence::LogicalOr, Precedence::LogicalAnd);
        assert_lt!(Precedence::LogicalAnd, Precedence::Equality);
        assert_gt!(Precedence::Multiplication, Precedence::Addition);
        assert_gt!(Precedence::Comparison, Precedence::Equality);
        assert_gt!(Precedence::Call, Precedence::Unary);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            ParserOperator::from_token(&Token::Plus),
            Some(ParserOperator::Arithequal(InfixOperator::Add))
        );

        assert_eq!(
            ParserOperator::from_token(&Token::Or),
            Some(ParserOperator::Logical(LogicalOperator::Or))
        );

        assert_eq!(
            ParserOperator::from_token(&Token::LeftBracket),
            Some(ParserOperator::Postfix(CallMarker::Bracket))
        );

        assert_eq!(
            ParserOperator::from_token(&Token::Question),
            Some(ParserOperator::Ternary)
        );

        assert_eq!(ParserOperator::from_token(&Token::Bang), None);
        assert_eq!(ParserOperator::from_token(&Token::Equals), None);
    }

    #[test]
    fn test_left_associativity() {
        let op = ParserOperator::Arithequal(InfixOperator::Subtract);
        assert!(!op.is_higher_precedence(Precedence::Addition));
        assert!(op.is_higher_precedence(Precedence::Comparison));
    }
}
