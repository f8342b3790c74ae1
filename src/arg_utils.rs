//! Positional/keyword argument parsing shared by filters, tests, and global
//! functions (§4.D call form, §4.E).
//!
//! Calls and filter invocations carry their keyword arguments as a single
//! trailing `KeywordArguments` value appended to the positional list (§4.D).
//! [`ArgParser`] unpacks that convention once so call sites can ask for a
//! named-or-positional argument the way the teacher's own macro-argument
//! parser does, without forcing every caller to re-detect the trailing
//! kwargs value by hand.

use crate::error::{Error, ErrorKind};
use crate::value::Value;

#[derive(Debug)]
pub struct ArgParser {
    positional: std::collections::VecDeque<Value>,
    kwargs: std::collections::HashMap<String, Value>,
}

impl ArgParser {
    /// Splits `args` into positional values and keyword arguments, unpacking
    /// a trailing `KeywordArguments` value if present.
    pub fn new(args: &[Value]) -> Self {
        let mut positional: std::collections::VecDeque<Value> = args.iter().cloned().collect();
        let mut kwargs = std::collections::HashMap::new();
        if let Some(Value::KeywordArguments(map)) = positional.back() {
            let map = (**map).clone();
            positional.pop_back();
            for (k, v) in map {
                kwargs.insert(k, v);
            }
        }
        ArgParser { positional, kwargs }
    }

    /// Takes the value bound to `name`, falling back to the next unconsumed
    /// positional argument.
    pub fn get(&mut self, name: &str) -> Option<Value> {
        self.kwargs
            .remove(name)
            .or_else(|| self.positional.pop_front())
    }

    /// Like [`Self::get`] but returns `default` when nothing is supplied.
    pub fn get_or(&mut self, name: &str, default: Value) -> Value {
        self.get(name).unwrap_or(default)
    }

    /// Like [`Self::get`] but errors when nothing is supplied.
    pub fn require(&mut self, name: &str) -> Result<Value, Error> {
        self.get(name).ok_or_else(|| {
            Error::new(ErrorKind::MissingArgument, format!("missing required argument '{name}'"))
        })
    }

    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }
}
