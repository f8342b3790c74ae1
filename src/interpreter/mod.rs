//! Tree-walking evaluator entry point (§2, §6): walks a pre-parsed
//! [`crate::ast::Program`] and produces a single rendered string.

pub(crate) mod expr;
pub(crate) mod stmt;

use std::rc::Rc;

use crate::ast::Program;
use crate::environment::{self, Environment};
use crate::error::{Error, ErrorKind};
use crate::value::Value;
use stmt::Signal;

/// Walks a `Program` against an `Environment`. Stateless beyond the
/// environment it holds — `run` can be called repeatedly against the same
/// interpreter to render several programs sharing one context.
pub struct Interpreter {
    env: Rc<Environment>,
}

impl Interpreter {
    /// Creates an interpreter over `env`, or a fresh environment with
    /// globals installed when `env` is `None` (§6 `Interpreter(env?)`).
    pub fn new(env: Option<Rc<Environment>>) -> Self {
        Interpreter {
            env: env.unwrap_or_else(environment::new_with_globals),
        }
    }

    /// The environment this interpreter evaluates against.
    pub fn environment(&self) -> &Rc<Environment> {
        &self.env
    }

    /// Renders `program` to a string (§6, §8: always a `Value::String` for
    /// well-formed input, never any other variant).
    pub fn run(&self, program: &Program) -> Result<Value, Error> {
        match stmt::eval_block(&program.body, &self.env)? {
            Signal::Normal(s) => Ok(Value::string(s)),
            Signal::Break | Signal::Continue => Err(Error::new(
                ErrorKind::LoopControlOutsideLoop,
                "break/continue outside of a loop",
            )),
        }
    }
}
