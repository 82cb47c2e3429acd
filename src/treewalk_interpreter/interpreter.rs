use super::class::CornyClass;
use super::environment::Environment;
use super::errors::{RuntimeError, RuntimeResult};
use super::function::CornyFn;
use super::native_function::{get_native_func, is_reserved};
use super::object::{DeferredCall, Object};
use crate::corny_frontend::grammar::{
    Block, CallMarker, Expr, ExprType, Identifier, InfixOperator, Literal, LogicalOperator,
    PrefixOperator, Program, Stmt, StmtType,
};

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tracing::{debug, trace};

/// Evaluates an operand. A `return` unwinding out of it ends the enclosing
/// evaluation with the same signal.
macro_rules! operand {
    ($self:ident, $expr:expr) => {
        match $self.eval_expression($expr)? {
            signal @ Object::Return(_) => return Ok(signal),
            value => value,
        }
    };
}

macro_rules! arguments {
    ($self:ident, $raw_args:expr) => {
        match $self.eval_arguments($raw_args)? {
            ControlFlow::Continue(args) => args,
            ControlFlow::Break(signal) => return Ok(signal),
        }
    };
}

pub struct Interpreter {
    pub env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            env: Environment::new(),
        }
    }

    pub fn swap_env(&mut self, mut env: Environment) -> Environment {
        std::mem::swap(&mut self.env, &mut env);
        // Return old original interpreter env
        env
    }

    /// Runs a whole program in the current environment. A top level
    /// `return` ends the program with its payload.
    pub fn eval_program(&mut self, program: &Program) -> RuntimeResult<Object> {
        match self.eval_statements(&program.stmts)? {
            Object::Return(value) => Ok(*value),
            Object::Call(call) => Err(RuntimeError::unresolved(&call.name)),
            value => Ok(value),
        }
    }

    /// Evaluates statements in order, stopping early on a `return`. The
    /// result is the value of the last statement, or null if there is none.
    pub fn eval_statements(&mut self, stmts: &[Stmt]) -> RuntimeResult<Object> {
        let mut result = Object::Null;
        for stmt in stmts.iter() {
            result = self.eval_statement(stmt)?;
            if let Object::Return(_) = result {
                break;
            }
        }
        Ok(result)
    }

    pub fn eval_block_in(&mut self, block: &Block, env: Environment) -> RuntimeResult<Object> {
        let prev_env = self.swap_env(env);
        let result = self.eval_statements(&block.stmts);
        self.swap_env(prev_env);
        result
    }

    fn eval_expression_in(&mut self, expr: &Expr, env: Environment) -> RuntimeResult<Object> {
        let prev_env = self.swap_env(env);
        let result = self.eval_expression(expr);
        self.swap_env(prev_env);
        result
    }

    pub fn eval_statement(&mut self, stmt: &Stmt) -> RuntimeResult<Object> {
        match &stmt.stmt {
            StmtType::Let(name, expr) => self.eval_let(name, expr),
            StmtType::Return(expr) => {
                let value = operand!(self, expr);
                Ok(Object::Return(Box::new(value)))
            }
            StmtType::Expression(expr) => self.eval_expression(expr),
        }
    }

    fn eval_let(&mut self, name: &Identifier, expr: &Expr) -> RuntimeResult<Object> {
        let value = operand!(self, expr);
        if is_reserved(&name.name) {
            return Err(RuntimeError::reserved(&name.name));
        }

        self.env.define(name.name.clone(), value.clone());
        Ok(value)
    }

    pub fn eval_expression(&mut self, expr: &Expr) -> RuntimeResult<Object> {
        match &expr.expr {
            ExprType::Literal(l) => Ok(self.eval_literal(l)),
            ExprType::Identifier(ident) => self.lookup(&ident.name),
            ExprType::Prefix(op, expr) => self.eval_prefix_operator(*op, expr),
            ExprType::Infix(op, lhs, rhs) => self.eval_infix_operator(*op, lhs, rhs),
            ExprType::Logical(op, lhs, rhs) => self.eval_logical_operator(*op, lhs, rhs),
            ExprType::Call(callee, marker, args) => match marker {
                CallMarker::Paren => self.eval_func_call(callee, args),
                CallMarker::Bracket => self.eval_subscript(callee, args),
                CallMarker::Dot => self.eval_member(callee, args),
            },
            ExprType::If(condition, consequence, alternative) => {
                self.eval_if_else(condition, consequence, alternative.as_ref())
            }
            ExprType::Function(func_info) => Ok(Object::Function(CornyFn::new(
                func_info.clone(),
                self.env.clone(),
            ))),
            ExprType::Class(body) => self.eval_class(body),
            ExprType::Array(elements) => Ok(Object::new_array(arguments!(self, elements))),
            ExprType::Hash(pairs) => self.eval_hash(pairs),
        }
    }

    fn eval_literal(&self, l: &Literal) -> Object {
        match l {
            Literal::Number(n) => Object::Number(*n),
            Literal::Boolean(b) => Object::Boolean(*b),
            Literal::Str(s) => Object::String(s.clone()),
            Literal::Null => Object::Null,
        }
    }

    /// Variables shadow builtins; a builtin name that is not bound anywhere
    /// resolves to the builtin itself.
    fn lookup(&self, name: &str) -> RuntimeResult<Object> {
        match self.env.get(name) {
            Ok(value) => Ok(value),
            Err(e) => get_native_func(name).map(Object::Builtin).ok_or(e),
        }
    }

    fn eval_if_else(
        &mut self,
        condition: &Expr,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> RuntimeResult<Object> {
        match operand!(self, condition) {
            Object::Boolean(true) => self.eval_statements(&consequence.stmts),
            Object::Boolean(false) => match alternative {
                Some(alternative) => self.eval_statements(&alternative.stmts),
                None => Ok(Object::Null),
            },
            other => Err(RuntimeError::type_mismatch(format!(
                "Invalid data type for if condition: {}.",
                other.type_name()
            ))),
        }
    }

    fn eval_class(&mut self, body: &Block) -> RuntimeResult<Object> {
        let members = Environment::with_enclosing(&self.env);
        let prev_env = self.swap_env(members.clone());
        let result = self.eval_class_body(body);
        self.swap_env(prev_env);
        if let Some(signal) = result? {
            return Ok(signal);
        }

        if let Some(type_fn) = get_native_func("type") {
            members.define(type_fn.name().to_owned(), Object::Builtin(type_fn));
        }

        debug!(members = body.stmts.len(), "created class");
        Ok(Object::Class(CornyClass::new(members)))
    }

    fn eval_class_body(&mut self, body: &Block) -> RuntimeResult<Option<Object>> {
        for stmt in body.stmts.iter() {
            match &stmt.stmt {
                StmtType::Let(name, expr) => {
                    if let signal @ Object::Return(_) = self.eval_let(name, expr)? {
                        return Ok(Some(signal));
                    }
                }
                _ => return Err(RuntimeError::invalid_class_member()),
            }
        }
        Ok(None)
    }

    fn eval_hash(&mut self, pairs: &[(Expr, Expr)]) -> RuntimeResult<Object> {
        let mut entries = BTreeMap::new();
        for (key_expr, value_expr) in pairs.iter() {
            let key = match operand!(self, key_expr) {
                Object::String(key) => key,
                other => {
                    return Err(RuntimeError::invalid_key(format!(
                        "Hash keys must be STRING, got {}.",
                        other.type_name()
                    )))
                }
            };
            let value = operand!(self, value_expr);
            entries.insert(key, value);
        }
        Ok(Object::new_hash(entries))
    }

    fn eval_logical_operator(
        &mut self,
        op: LogicalOperator,
        lhs: &Expr,
        rhs: &Expr,
    ) -> RuntimeResult<Object> {
        let lhs = match operand!(self, lhs) {
            Object::Boolean(b) => b,
            other => return Err(logical_operand_error(op, "left", &other)),
        };

        // Handle short circuiting.
        match op {
            LogicalOperator::And if !lhs => return Ok(Object::Boolean(false)),
            LogicalOperator::Or if lhs => return Ok(Object::Boolean(true)),
            _ => {}
        }

        match operand!(self, rhs) {
            Object::Boolean(b) => Ok(Object::Boolean(b)),
            other => Err(logical_operand_error(op, "right", &other)),
        }
    }

    fn eval_infix_operator(
        &mut self,
        op: InfixOperator,
        lhs: &Expr,
        rhs: &Expr,
    ) -> RuntimeResult<Object> {
        let lhs = operand!(self, lhs);
        let rhs = operand!(self, rhs);
        Object::apply_infix_op(op, lhs, rhs)
    }

    fn eval_prefix_operator(&mut self, op: PrefixOperator, expr: &Expr) -> RuntimeResult<Object> {
        let value = operand!(self, expr);
        Object::apply_prefix_op(op, value)
    }

    /// Evaluates arguments left to right. Breaks with the signal if one of
    /// them unwinds a `return`.
    fn eval_arguments(
        &mut self,
        raw_args: &[Expr],
    ) -> RuntimeResult<ControlFlow<Object, Vec<Object>>> {
        let mut args = Vec::with_capacity(raw_args.len());
        for raw_arg in raw_args.iter() {
            match self.eval_expression(raw_arg)? {
                signal @ Object::Return(_) => return Ok(ControlFlow::Break(signal)),
                value => args.push(value),
            }
        }
        Ok(ControlFlow::Continue(args))
    }

    fn eval_func_call(&mut self, callee: &Expr, raw_args: &[Expr]) -> RuntimeResult<Object> {
        let callee = operand!(self, callee);
        let args = arguments!(self, raw_args);
        self.call_value(callee, args)
    }

    fn call_value(&mut self, callee: Object, args: Vec<Object>) -> RuntimeResult<Object> {
        match callee {
            Object::Function(func) => func.execute(args, self),
            Object::Builtin(builtin) => builtin.execute(args),
            other => Err(RuntimeError::type_mismatch(format!(
                "{} is not callable.",
                other.type_name()
            ))),
        }
    }

    fn eval_subscript(&mut self, target: &Expr, raw_args: &[Expr]) -> RuntimeResult<Object> {
        let target = operand!(self, target);
        let mut args = arguments!(self, raw_args);
        if args.len() != 1 {
            return Err(RuntimeError::arity(1, args.len()));
        }
        let index = args.remove(0);

        match (&target, index) {
            (Object::Array(elements), Object::Number(n)) => {
                let elements = elements.borrow();
                match checked_index(n, elements.len()) {
                    Some(i) => Ok(elements[i].clone()),
                    None => Err(RuntimeError::out_of_bounds(n, elements.len())),
                }
            }
            (Object::String(s), Object::Number(n)) => {
                let len = s.chars().count();
                match checked_index(n, len).and_then(|i| s.chars().nth(i)) {
                    Some(c) => Ok(Object::String(c.to_string())),
                    None => Err(RuntimeError::out_of_bounds(n, len)),
                }
            }
            (Object::Hash(entries), Object::String(key)) => {
                Ok(entries.borrow().get(&key).cloned().unwrap_or(Object::Null))
            }
            (Object::Array(_), other) | (Object::String(_), other) => {
                Err(RuntimeError::invalid_key(format!(
                    "Index must be NUMBER, got {}.",
                    other.type_name()
                )))
            }
            (Object::Hash(_), other) => Err(RuntimeError::invalid_key(format!(
                "Hash key must be STRING, got {}.",
                other.type_name()
            ))),
            (other, _) => Err(RuntimeError::type_mismatch(format!(
                "{} is not subscriptable.",
                other.type_name()
            ))),
        }
    }

    /// `receiver.member`. The whole member, call arguments included, is
    /// evaluated against the class frame when the receiver is a class,
    /// otherwise against the current frame.
    fn eval_member(&mut self, receiver: &Expr, raw_args: &[Expr]) -> RuntimeResult<Object> {
        let receiver = operand!(self, receiver);
        let member = match raw_args {
            [member] => member,
            _ => return Err(RuntimeError::arity(1, raw_args.len())),
        };

        let member_env = match &receiver {
            Object::Class(class) => class.env().clone(),
            _ => self.env.clone(),
        };

        let value = match &member.expr {
            ExprType::Call(callee, CallMarker::Paren, member_args) => match &callee.expr {
                ExprType::Identifier(ident) => {
                    self.eval_method_call(&ident.name, member_args, &member_env)?
                }
                _ => self.eval_expression_in(member, member_env)?,
            },
            _ => self.eval_expression_in(member, member_env)?,
        };

        match value {
            Object::Call(call) => self.dispatch_method(receiver, call),
            value => Ok(value),
        }
    }

    /// Calls `name(args)` when `name` is bound to something other than a
    /// builtin. Otherwise packages the call for the receiver to resolve.
    fn eval_method_call(
        &mut self,
        name: &str,
        raw_args: &[Expr],
        member_env: &Environment,
    ) -> RuntimeResult<Object> {
        let prev_env = self.swap_env(member_env.clone());
        let args = self.eval_arguments(raw_args);
        self.swap_env(prev_env);
        let args = match args? {
            ControlFlow::Continue(args) => args,
            ControlFlow::Break(signal) => return Ok(signal),
        };

        match member_env.get(name) {
            Ok(Object::Builtin(_)) => {}
            Ok(callee) => return self.call_value(callee, args),
            Err(e) if e.is_unresolved() => {}
            Err(e) => return Err(e),
        }

        trace!(name, args = args.len(), "deferring call");
        Ok(Object::Call(DeferredCall {
            name: name.to_owned(),
            args,
        }))
    }

    fn dispatch_method(&mut self, receiver: Object, call: DeferredCall) -> RuntimeResult<Object> {
        if !receiver.responds_to(&call.name) {
            return Err(RuntimeError::method_not_found(
                &call.name,
                receiver.type_name(),
            ));
        }

        let member = match &receiver {
            Object::Class(class) => class.member(&call.name),
            _ => None,
        };
        let member = member.or_else(|| get_native_func(&call.name).map(Object::Builtin));

        debug!(method = %call.name, receiver = receiver.type_name(), "dispatching method");
        match member {
            Some(Object::Function(func)) => func.execute(call.args, self),
            Some(Object::Builtin(builtin)) => {
                let mut args = vec![receiver];
                if builtin.accepts_extra() {
                    args.extend(call.args);
                }
                builtin.execute(args)
            }
            Some(other) => self.call_value(other, call.args),
            None => Err(RuntimeError::method_not_found(
                &call.name,
                receiver.type_name(),
            )),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn checked_index(n: f64, len: usize) -> Option<usize> {
    let index = n.trunc();
    if index.is_nan() || index < 0.0 || index >= len as f64 {
        None
    } else {
        Some(index as usize)
    }
}

fn logical_operand_error(op: LogicalOperator, side: &str, value: &Object) -> RuntimeError {
    RuntimeError::type_mismatch(format!(
        "Invalid {} hand operand for '{}': {}.",
        side,
        op.symbol(),
        value.type_name()
    ))
}
