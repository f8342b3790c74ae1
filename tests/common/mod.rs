//! Small AST-builder helpers shared by the integration tests. There is no
//! parser in this crate, so tests construct `ast::Program` values by hand;
//! these helpers keep that construction readable.

#![allow(dead_code)]

use std::rc::Rc;

use jinja_rt::ast::*;
use jinja_rt::{environment, Environment, Error, Interpreter};

pub fn text(s: &str) -> Stmt {
    Stmt::Emit(Expr::StringLiteral(s.to_string()))
}

pub fn emit(e: Expr) -> Stmt {
    Stmt::Emit(e)
}

pub fn id(name: &str) -> Expr {
    Expr::Identifier(name.to_string())
}

pub fn int(v: i64) -> Expr {
    Expr::IntegerLiteral(v)
}

pub fn float(v: f64) -> Expr {
    Expr::FloatLiteral(v)
}

pub fn str_lit(s: &str) -> Expr {
    Expr::StringLiteral(s.to_string())
}

pub fn array(items: Vec<Expr>) -> Expr {
    Expr::ArrayLiteral(items)
}

pub fn tuple(items: Vec<Expr>) -> Expr {
    Expr::TupleLiteral(items)
}

pub fn binary(op: &str, left: Expr, right: Expr) -> Expr {
    Expr::Binary(BinaryExpression {
        operator: Operator::new(op),
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn unary(op: &str, argument: Expr) -> Expr {
    Expr::Unary(UnaryExpression {
        operator: Operator::new(op),
        argument: Box::new(argument),
    })
}

pub fn filter(operand: Expr, name: &str, args: Vec<Expr>) -> Expr {
    Expr::Filter(FilterExpression {
        operand: Box::new(operand),
        name: name.to_string(),
        args,
    })
}

pub fn test_expr(operand: Expr, name: &str, negate: bool) -> Expr {
    Expr::Test(TestExpression {
        operand: Box::new(operand),
        name: name.to_string(),
        args: Vec::new(),
        negate,
    })
}

pub fn slice(object: Expr, start: Option<Expr>, stop: Option<Expr>, step: Option<Expr>) -> Expr {
    Expr::Slice(SliceExpression {
        object: Box::new(object),
        start: start.map(Box::new),
        stop: stop.map(Box::new),
        step: step.map(Box::new),
    })
}

pub fn member(object: Expr, property: Expr, computed: bool) -> Expr {
    Expr::Member(MemberExpression {
        object: Box::new(object),
        property: Box::new(property),
        computed,
    })
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpression {
        callee: Box::new(callee),
        args,
    })
}

pub fn program(body: Vec<Stmt>) -> Program {
    Program { body }
}

/// Renders `program` against a fresh environment with globals installed.
pub fn render(program: &Program) -> Result<String, Error> {
    let interpreter = Interpreter::new(None);
    Ok(interpreter.run(program)?.to_string())
}

/// Renders `program` against a caller-supplied environment (e.g. one seeded
/// with context via `Environment::set`).
pub fn render_with(env: Rc<Environment>, program: &Program) -> Result<String, Error> {
    let interpreter = Interpreter::new(Some(env));
    Ok(interpreter.run(program)?.to_string())
}

pub fn new_env() -> Rc<Environment> {
    environment::new_with_globals()
}
