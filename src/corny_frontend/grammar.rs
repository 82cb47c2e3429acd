use super::span::Span;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PrefixOperator {
    Negate,
    LogicalNot,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterEq,
    LessThan,
    LessEq,
}

/// Which postfix marker produced a call node. The evaluator gives each a
/// different meaning: `f(x)` invokes, `a[i]` subscripts, `a.m(x)` dispatches
/// a method on `a`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CallMarker {
    Paren,
    Bracket,
    Dot,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Stmt {
    pub stmt: StmtType,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StmtType {
    Let(Identifier, Expr),
    Return(Expr),
    Expression(Expr),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expr {
    pub expr: ExprType,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExprType {
    Literal(Literal),
    Identifier(Identifier),
    Prefix(PrefixOperator, Box<Expr>),
    Infix(InfixOperator, Box<Expr>, Box<Expr>),
    Logical(LogicalOperator, Box<Expr>, Box<Expr>),
    Call(Box<Expr>, CallMarker, Vec<Expr>),
    If(Box<Expr>, Block, Option<Block>),
    Function(Rc<FuncInfo>),
    Class(Block),
    Array(Vec<Expr>),
    Hash(Vec<(Expr, Expr)>),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FuncInfo {
    pub params: Vec<Identifier>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(f64),
    Boolean(bool),
    Str(String),
    Null,
}

impl LogicalOperator {
    pub fn symbol(&self) -> &str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

impl PrefixOperator {
    pub fn symbol(&self) -> &str {
        match self {
            PrefixOperator::LogicalNot => "!",
            PrefixOperator::Negate => "-",
        }
    }
}

impl InfixOperator {
    pub fn symbol(&self) -> &str {
        match self {
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
            InfixOperator::EqualTo => "==",
            InfixOperator::NotEqualTo => "!=",
            InfixOperator::GreaterThan => ">",
            InfixOperator::GreaterEq => ">=",
            InfixOperator::LessThan => "<",
            InfixOperator::LessEq => "<=",
        }
    }
}

impl Identifier {
    pub fn new(name: String, span: Span) -> Self {
        Self { name, span }
    }
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Block { stmts, span }
    }
}

impl Stmt {
    pub fn new(stmt: StmtType, span: Span) -> Self {
        Stmt { stmt, span }
    }
}

impl Expr {
    pub fn new(expr: ExprType, span: Span) -> Self {
        Expr { expr, span }
    }
}

impl FuncInfo {
    pub fn new(params: Vec<Identifier>, body: Block, span: Span) -> Self {
        FuncInfo { params, body, span }
    }
}

// Rendering. Everything below prints source text the parser accepts again.

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_separated(f, &self.stmts, " ")
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.stmts.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{ ")?;
        write_separated(f, &self.stmts, " ")?;
        write!(f, " }}")
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.stmt {
            StmtType::Let(name, value) => write!(f, "let {} = {};", name.name, value),
            StmtType::Return(value) => write!(f, "return {};", value),
            StmtType::Expression(expr) => write!(f, "{};", expr),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Str(s) => write_quoted(f, s),
            Literal::Null => write!(f, "null"),
        }
    }
}

impl fmt::Display for FuncInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let params: Vec<_> = self.params.iter().map(|p| p.name.as_str()).collect();
        write!(f, "fn({}) {}", params.join(", "), self.body)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.expr {
            ExprType::Literal(l) => write!(f, "{}", l),
            ExprType::Identifier(ident) => write!(f, "{}", ident.name),
            ExprType::Prefix(op, expr) => write!(f, "({}{})", op.symbol(), expr),
            ExprType::Infix(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            ExprType::Logical(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            ExprType::Call(callee, marker, args) => match marker {
                CallMarker::Paren => {
                    write!(f, "{}(", callee)?;
                    write_separated(f, args, ", ")?;
                    write!(f, ")")
                }
                CallMarker::Bracket => {
                    write!(f, "{}[", callee)?;
                    write_separated(f, args, ", ")?;
                    write!(f, "]")
                }
                CallMarker::Dot => {
                    write!(f, "{}.", callee)?;
                    write_separated(f, args, "")
                }
            },
            ExprType::If(condition, consequence, alternative) => {
                write!(f, "if ({}) {}", condition, consequence)?;
                match alternative {
                    Some(alternative) => write!(f, " else {}", alternative),
                    None => Ok(()),
                }
            }
            ExprType::Function(func_info) => write!(f, "{}", func_info),
            ExprType::Class(body) => write!(f, "class {}", body),
            ExprType::Array(elements) => {
                write!(f, "[")?;
                write_separated(f, elements, ", ")?;
                write!(f, "]")
            }
            ExprType::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Strings have no escapes, so pick whichever quote does not occur in them.
pub fn write_quoted(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    if s.contains('"') {
        write!(f, "'{}'", s)
    } else {
        write!(f, "\"{}\"", s)
    }
}
