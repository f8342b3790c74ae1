//! A tree-walking evaluator for a Jinja-compatible template dialect.
//!
//! This crate implements the runtime core only: it consumes a pre-parsed
//! [`ast::Program`] and renders it against an [`Environment`] to produce a
//! single output string. Producing that AST — lexing and parsing template
//! source, template loading, caching, and error formatting — lives outside
//! this crate.
//!
//! ```
//! use std::rc::Rc;
//!
//! use jinja_rt::ast::*;
//! use jinja_rt::{environment, Interpreter};
//!
//! let env = environment::new_with_globals();
//! env.set("name", "world");
//!
//! let program = Program {
//!     body: vec![
//!         Stmt::Emit(Expr::StringLiteral("Hello, ".into())),
//!         Stmt::Emit(Expr::Identifier("name".into())),
//!         Stmt::Emit(Expr::StringLiteral("!".into())),
//!     ],
//! };
//!
//! let interpreter = Interpreter::new(Some(Rc::clone(&env)));
//! assert_eq!(interpreter.run(&program).unwrap().to_string(), "Hello, world!");
//! ```

pub mod arg_utils;
pub mod ast;
pub mod environment;
pub mod error;
pub mod filters;
pub mod functions;
pub mod interpreter;
pub mod json;
pub mod tests_registry;
pub mod value;

pub use environment::Environment;
pub use error::{Error, ErrorKind};
pub use interpreter::Interpreter;
pub use value::Value;
