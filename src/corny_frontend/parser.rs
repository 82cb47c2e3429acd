use super::errors::{ParserError, ParserErrorType, ParserResult};
use super::grammar::{
    Block, CallMarker, Expr, ExprType, FuncInfo, Identifier, Literal, PrefixOperator, Program,
    Stmt, StmtType,
};
use super::lexer::Lexer;
use super::parser_utils::{ParserOperator, Precedence};
use super::span::Span;
use super::token::{SpannedToken, Token};

use std::rc::Rc;

/// Result of a parse that reached the end of input. `diagnostics` lists
/// malformed spots the parser stepped over; when it is non-empty the tree
/// may not mean what the author intended.
#[derive(Debug)]
pub struct Parsed {
    pub program: Program,
    pub diagnostics: Vec<ParserError>,
}

pub struct Parser<'s> {
    lexer: Lexer<'s>,
    current: SpannedToken,
    previous: SpannedToken,
    errors: Vec<ParserError>,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let previous = SpannedToken {
            token: Token::EndOfFile,
            span: Span::default(),
        };

        Parser {
            lexer,
            current,
            previous,
            errors: vec![],
        }
    }

    /// Advances the stream.
    fn bump(&mut self) {
        let next = self.lexer.next_token();
        self.previous = std::mem::replace(&mut self.current, next);
    }

    /// Checks whether or not the current token matches the given token.
    fn check(&self, t: &Token) -> bool {
        self.current.token == *t
    }

    /// If the current token matches, consume it and return true.
    fn check_consume(&mut self, t: &Token) -> bool {
        if self.check(t) {
            self.bump();
            return true;
        }
        false
    }

    /// Consumes the expected token. A mismatch is recorded and the current
    /// token is left in place for whatever comes next.
    fn consume(&mut self, expected: Token) {
        if self.check(&expected) {
            self.bump();
            return;
        }

        let error = match self.current.token {
            Token::EndOfFile => ParserErrorType::Unclosed(expected),
            _ => ParserErrorType::ExpectedToken(expected, self.current.token.clone()),
        };
        self.emit_error(ParserError::new(self.current.span, error));
    }

    fn emit_error(&mut self, error: ParserError) {
        self.errors.push(error);
    }

    /// Parses the whole token stream as a program.
    pub fn parse(mut self) -> Result<Parsed, Vec<ParserError>> {
        let mut stmts = vec![];

        while !self.check(&Token::EndOfFile) {
            match self.parse_statement() {
                Ok(stmt) => stmts.push(stmt),
                Err(fatal) => {
                    self.emit_error(fatal);
                    return Err(self.errors);
                }
            }
        }

        Ok(Parsed {
            program: Program { stmts },
            diagnostics: self.errors,
        })
    }

    fn parse_statement(&mut self) -> ParserResult<Stmt> {
        let curr_span = self.current.span;

        let stmt_type = match self.current.token {
            Token::Let => self.parse_let()?,
            Token::Return => {
                self.bump();
                StmtType::Return(self.parse_expression()?)
            }
            _ => StmtType::Expression(self.parse_expression()?),
        };

        // The terminator is optional.
        self.check_consume(&Token::Semicolon);

        Ok(Stmt::new(stmt_type, curr_span.extend(self.previous.span)))
    }

    fn parse_let(&mut self) -> ParserResult<StmtType> {
        self.bump();
        let name = self.parse_identifier();
        self.consume(Token::Equals);
        let value = self.parse_expression()?;

        Ok(StmtType::Let(name, value))
    }

    fn parse_block(&mut self) -> ParserResult<Block> {
        let curr_span = self.current.span;
        self.consume(Token::LeftBrace);

        let mut stmts = vec![];
        while !self.check(&Token::RightBrace) && !self.check(&Token::EndOfFile) {
            stmts.push(self.parse_statement()?);
        }
        self.consume(Token::RightBrace);

        Ok(Block::new(stmts, curr_span.extend(self.previous.span)))
    }

    pub fn parse_expression(&mut self) -> ParserResult<Expr> {
        self.run_pratt_parse_algo(Precedence::Lowest)
    }

    /// Pratt parsing algo.
    pub fn run_pratt_parse_algo(&mut self, min_precedence: Precedence) -> ParserResult<Expr> {
        let prefix_op = match &self.current.token {
            Token::Bang => Some(PrefixOperator::LogicalNot),
            Token::Minus => Some(PrefixOperator::Negate),
            _ => None,
        };

        let mut lhs = match prefix_op {
            Some(op) => {
                let curr_span = self.current.span;
                self.bump();
                let expr = self.run_pratt_parse_algo(Precedence::Unary)?;
                to_expr(
                    ExprType::Prefix(op, Box::new(expr)),
                    curr_span.extend(self.previous.span),
                )
            }
            None => self.parse_primary()?,
        };

        while let Some(op) = ParserOperator::from_token(&self.current.token) {
            if !op.is_higher_precedence(min_precedence) {
                break;
            }

            let precedence = op.precedence();
            let lhs_span = lhs.span;
            self.bump();

            let new_lhs = match op {
                ParserOperator::Arithequal(op) => {
                    let rhs = self.run_pratt_parse_algo(precedence)?;
                    ExprType::Infix(op, Box::new(lhs), Box::new(rhs))
                }
                ParserOperator::Logical(op) => {
                    let rhs = self.run_pratt_parse_algo(precedence)?;
                    ExprType::Logical(op, Box::new(lhs), Box::new(rhs))
                }
                ParserOperator::Postfix(CallMarker::Paren) => {
                    let args = self.parse_comma_sep(Token::RightParen, Self::parse_expression)?;
                    ExprType::Call(Box::new(lhs), CallMarker::Paren, args)
                }
                ParserOperator::Postfix(CallMarker::Bracket) => {
                    let index = self.parse_expression()?;
                    self.consume(Token::RightBracket);
                    ExprType::Call(Box::new(lhs), CallMarker::Bracket, vec![index])
                }
                ParserOperator::Postfix(CallMarker::Dot) => {
                    let member = self.parse_member()?;
                    ExprType::Call(Box::new(lhs), CallMarker::Dot, vec![member])
                }
                ParserOperator::Ternary => self.parse_ternary(lhs)?,
            };

            lhs = to_expr(new_lhs, lhs_span.extend(self.previous.span));
        }

        Ok(lhs)
    }

    /// Right-hand side of a dot: a primary optionally followed by one
    /// argument list. Anything after that chains onto the dot expression.
    fn parse_member(&mut self) -> ParserResult<Expr> {
        let member = self.parse_primary()?;
        if !self.check_consume(&Token::LeftParen) {
            return Ok(member);
        }

        let span = member.span;
        let args = self.parse_comma_sep(Token::RightParen, Self::parse_expression)?;
        Ok(to_expr(
            ExprType::Call(Box::new(member), CallMarker::Paren, args),
            span.extend(self.previous.span),
        ))
    }

    /// `cond ? a : b` becomes `if (cond) { a } else { b }`.
    fn parse_ternary(&mut self, condition: Expr) -> ParserResult<ExprType> {
        let consequence = self.parse_single_stmt_block()?;
        self.consume(Token::Colon);
        let alternative = self.parse_single_stmt_block()?;

        Ok(ExprType::If(
            Box::new(condition),
            consequence,
            Some(alternative),
        ))
    }

    fn parse_single_stmt_block(&mut self) -> ParserResult<Block> {
        let expr = self.parse_expression()?;
        let span = expr.span;
        let stmt = Stmt::new(StmtType::Expression(expr), span);
        Ok(Block::new(vec![stmt], span))
    }

    fn parse_primary(&mut self) -> ParserResult<Expr> {
        let curr_span = self.current.span;

        let expr = match &self.current.token {
            Token::Number(n) => from_literal(Literal::Number(*n)),
            Token::True => from_literal(Literal::Boolean(true)),
            Token::False => from_literal(Literal::Boolean(false)),
            Token::String(s) => from_literal(Literal::Str(s.to_owned())),
            Token::Null => from_literal(Literal::Null),
            Token::Identifier(name) => {
                ExprType::Identifier(Identifier::new(name.to_owned(), curr_span))
            }
            Token::LeftParen => {
                self.bump();
                let sub_expr = self.parse_expression()?;
                self.consume(Token::RightParen);
                return Ok(sub_expr);
            }
            Token::Fn => return self.parse_function_literal(),
            Token::Class => {
                self.bump();
                let body = self.parse_block()?;
                return Ok(to_expr(
                    ExprType::Class(body),
                    curr_span.extend(self.previous.span),
                ));
            }
            Token::LeftBracket => {
                self.bump();
                let elements =
                    self.parse_comma_sep(Token::RightBracket, Self::parse_expression)?;
                return Ok(to_expr(
                    ExprType::Array(elements),
                    curr_span.extend(self.previous.span),
                ));
            }
            Token::LeftBrace => return self.parse_hash_literal(),
            Token::If => return self.parse_if(),
            Token::LexerError(e) => {
                return Err(ParserError::new(
                    curr_span,
                    ParserErrorType::IllegalToken(e.clone()),
                ))
            }
            t => {
                return Err(ParserError::new(
                    curr_span,
                    ParserErrorType::ExpectedExpr(t.clone()),
                ))
            }
        };

        self.bump();
        Ok(to_expr(expr, curr_span))
    }

    fn parse_function_literal(&mut self) -> ParserResult<Expr> {
        let curr_span = self.current.span;
        self.bump();

        self.consume(Token::LeftParen);
        let params = self.parse_comma_sep(Token::RightParen, |this| Ok(this.parse_identifier()))?;
        let body = self.parse_block()?;
        let span = curr_span.extend(self.previous.span);

        let func_info = FuncInfo::new(params, body, span);
        Ok(to_expr(ExprType::Function(Rc::new(func_info)), span))
    }

    fn parse_hash_literal(&mut self) -> ParserResult<Expr> {
        let curr_span = self.current.span;
        self.bump();

        let pairs = self.parse_comma_sep(Token::RightBrace, |this| {
            let key = this.parse_expression()?;
            this.consume(Token::Colon);
            let value = this.parse_expression()?;
            Ok((key, value))
        })?;

        Ok(to_expr(
            ExprType::Hash(pairs),
            curr_span.extend(self.previous.span),
        ))
    }

    fn parse_if(&mut self) -> ParserResult<Expr> {
        let curr_span = self.current.span;
        self.bump();

        self.consume(Token::LeftParen);
        let condition = self.parse_expression()?;
        self.consume(Token::RightParen);

        let consequence = self.parse_block()?;
        let alternative = if self.check_consume(&Token::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(to_expr(
            ExprType::If(Box::new(condition), consequence, alternative),
            curr_span.extend(self.previous.span),
        ))
    }

    /// Parses an identifier. If the current token is not one, a diagnostic is
    /// recorded and an empty-named identifier stands in without consuming.
    fn parse_identifier(&mut self) -> Identifier {
        let span = self.current.span;
        if let Token::Identifier(name) = &self.current.token {
            let ident = Identifier::new(name.to_owned(), span);
            self.bump();
            return ident;
        }

        let error = ParserErrorType::ExpectedIdentifier(self.current.token.clone());
        self.emit_error(ParserError::new(span, error));
        Identifier::new(String::new(), span)
    }

    /// Parses `item (, item)*` up to `closing`. The opening delimiter has
    /// already been consumed.
    fn parse_comma_sep<T, F>(&mut self, closing: Token, parser: F) -> ParserResult<Vec<T>>
    where
        F: Fn(&mut Parser<'s>) -> ParserResult<T>,
    {
        let mut items = vec![];
        if self.check_consume(&closing) {
            return Ok(items);
        }

        items.push(parser(self)?);
        while self.check_consume(&Token::Comma) {
            items.push(parser(self)?);
        }
        self.consume(closing);

        Ok(items)
    }
}

fn from_literal(l: Literal) -> ExprType {
    ExprType::Literal(l)
}

fn to_expr(expr: ExprType, span: Span) -> Expr {
    Expr::new(expr, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corny_frontend::grammar::{InfixOperator, LogicalOperator};

    fn parse_ok(source: &str) -> Program {
        let parsed = Parser::new(source).parse().unwrap();
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        parsed.program
    }

    fn parse_expr(source: &str) -> ExprType {
        let mut program = parse_ok(source);
        assert_eq!(program.stmts.len(), 1);
        match program.stmts.remove(0).stmt {
            StmtType::Expression(expr) => expr.expr,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    fn render(source: &str) -> String {
        parse_ok(source).to_string()
    }

    #[test]
    fn test_precedence_tiers() {
        assert_eq!(render("3 + 99 * 20 - 5"), "((3 + (99 * 20)) - 5);");
        assert_eq!(render("-3 * (110 + 220)"), "((-3) * (110 + 220));");
        assert_eq!(
            render("a or b and c == 1 < 2"),
            "(a or (b and (c == (1 < 2))));"
        );
        assert_eq!(render("!-x"), "(!(-x));");
    }

    #[test]
    fn test_infix_tree() {
        match parse_expr("99 + 49") {
            ExprType::Infix(InfixOperator::Add, lhs, rhs) => {
                assert_eq!(lhs.expr, ExprType::Literal(Literal::Number(99.0)));
                assert_eq!(rhs.expr, ExprType::Literal(Literal::Number(49.0)));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            parse_expr("true and false"),
            ExprType::Logical(LogicalOperator::And, _, _)
        ));
    }

    #[test]
    fn test_postfix_chain() {
        match parse_expr("a[0].b(1)") {
            ExprType::Call(callee, CallMarker::Dot, args) => {
                assert!(matches!(callee.expr, ExprType::Call(_, CallMarker::Bracket, _)));
                assert_eq!(args.len(), 1);
                match &args[0].expr {
                    ExprType::Call(method, CallMarker::Paren, method_args) => {
                        assert!(matches!(&method.expr, ExprType::Identifier(i) if i.name == "b"));
                        assert_eq!(method_args.len(), 1);
                    }
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(render("a.b().c()"), "a.b().c();");
        assert_eq!(render("s.size() + 1"), "(s.size() + 1);");
        assert_eq!(render("f(1, 2)(3)"), "f(1, 2)(3);");
    }

    #[test]
    fn test_ternary_desugars_to_if() {
        match parse_expr("c ? 1 : 2") {
            ExprType::If(condition, consequence, Some(alternative)) => {
                assert!(matches!(condition.expr, ExprType::Identifier(_)));
                assert_eq!(consequence.stmts.len(), 1);
                assert_eq!(alternative.stmts.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(render("(x > 1) ? 1 : 2"), "if ((x > 1)) { 1; } else { 2; };");
    }

    #[test]
    fn test_statements() {
        let program = parse_ok("let x = 1; return x\nx");
        assert_eq!(program.stmts.len(), 3);
        assert!(matches!(&program.stmts[0].stmt, StmtType::Let(name, _) if name.name == "x"));
        assert!(matches!(program.stmts[1].stmt, StmtType::Return(_)));
        assert!(matches!(program.stmts[2].stmt, StmtType::Expression(_)));
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            render("fn(a, b) { let c = a; c }"),
            "fn(a, b) { let c = a; c; };"
        );
        assert_eq!(render("[1, 'x', null]"), "[1, \"x\", null];");
        assert_eq!(render("{\"k\": 1, 'j': [2]}"), "{\"k\": 1, \"j\": [2]};");
        assert_eq!(render("{}"), "{};");
        assert_eq!(render("class { let a = 1 }"), "class { let a = 1; };");
        assert_eq!(
            render("if (a) { 1 } else { 2 }"),
            "if (a) { 1; } else { 2; };"
        );
        assert_eq!(render("3.5"), "3.5;");
    }

    #[test]
    fn test_render_reparses() {
        let sources = [
            "let f = fn(x) { (x > 1) ? x * 2 : -x }; f(3)",
            "{'a': [1, 2][0], \"b\": 'say \"hi\"'}",
            "class { let n = 1; let get = fn() { n } }.get()",
        ];
        for source in sources.iter() {
            let rendered = render(source);
            assert_eq!(render(&rendered), rendered);
        }
    }

    #[test]
    fn test_diagnostics_are_collected() {
        let parsed = Parser::new("let = 5; let y 6; (1").parse().unwrap();
        assert_eq!(parsed.diagnostics.len(), 3);
        assert!(matches!(
            parsed.diagnostics[0].error,
            ParserErrorType::ExpectedIdentifier(Token::Equals)
        ));
        assert!(matches!(
            parsed.diagnostics[1].error,
            ParserErrorType::ExpectedToken(Token::Equals, Token::Number(_))
        ));
        assert!(matches!(
            parsed.diagnostics[2].error,
            ParserErrorType::Unclosed(Token::RightParen)
        ));
        assert_eq!(parsed.program.stmts.len(), 3);
    }

    #[test]
    fn test_unclosed_block_terminates() {
        let parsed = Parser::new("fn(x) { x").parse().unwrap();
        assert_eq!(parsed.diagnostics.len(), 1);
        assert!(matches!(
            parsed.diagnostics[0].error,
            ParserErrorType::Unclosed(Token::RightBrace)
        ));
    }

    #[test]
    fn test_fatal_primary() {
        let errors = Parser::new("let x = ;").parse().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0].error,
            ParserErrorType::ExpectedExpr(Token::Semicolon)
        ));

        let errors = Parser::new("1 + #").parse().unwrap_err();
        assert!(matches!(errors[0].error, ParserErrorType::IllegalToken(_)));
    }
}
