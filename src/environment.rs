//! Lexically nested variable scopes and the `is`-test registry (§4.B).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::functions;
use crate::tests_registry::{self, TestFn};
use crate::value::Value;

/// A node in a singly-linked parent chain (§4.B). Lookup walks parent
/// pointers; writes always land in the current node — `{% set %}` inside a
/// macro shadows an outer variable of the same name, it never mutates it
/// (§9 Open Question).
pub struct Environment {
    vars: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
    tests: Rc<RefCell<HashMap<String, TestFn>>>,
}

impl Environment {
    /// Creates a new root environment, optionally nested under `parent`.
    ///
    /// This is the crate's one public constructor (§6): `Environment(parent?)`.
    /// A root environment (`parent: None`) gets its own test registry; a
    /// child environment shares its parent's registry.
    pub fn new(parent: Option<&Rc<Environment>>) -> Rc<Environment> {
        let tests = match parent {
            Some(p) => Rc::clone(&p.tests),
            None => Rc::new(RefCell::new(tests_registry::builtin_tests())),
        };
        Rc::new(Environment {
            vars: RefCell::new(HashMap::new()),
            parent: parent.cloned(),
            tests,
        })
    }

    /// Creates a child scope of `self` (used for `for` bodies, macro calls,
    /// and `{% call %}` blocks).
    pub fn child(self: &Rc<Self>) -> Rc<Environment> {
        Rc::new(Environment {
            vars: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(self)),
            tests: Rc::clone(&self.tests),
        })
    }

    /// Seeds a variable in the current scope from a host value (§6).
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.set_variable(name.into(), value.into());
    }

    /// Writes `value` to the current scope. Never walks to a parent frame.
    pub fn set_variable(&self, name: impl Into<String>, value: Value) {
        self.vars.borrow_mut().insert(name.into(), value);
    }

    /// Walks the parent chain looking for `name`; returns `Value::Undefined`
    /// rather than failing when it is not bound anywhere (§4.B, §7).
    pub fn lookup_variable(&self, name: &str) -> Value {
        if let Some(v) = self.vars.borrow().get(name) {
            return v.clone();
        }
        match &self.parent {
            Some(parent) => parent.lookup_variable(name),
            None => Value::Undefined,
        }
    }

    /// Looks up a test by name in the shared registry (§4.D `is`/`is not`).
    pub fn lookup_test(&self, name: &str) -> Option<TestFn> {
        self.tests.borrow().get(name).cloned()
    }
}

/// Injects the engine's global names into `env` (§6): `false`/`true`/`none`
/// and their Python-cased aliases, `range`, `strftime_now`,
/// `raise_exception`, and the `namespace` builtin.
pub fn setup_globals(env: &Rc<Environment>) {
    env.set_variable("false", Value::Boolean(false));
    env.set_variable("true", Value::Boolean(true));
    env.set_variable("none", Value::Null);
    env.set_variable("False", Value::Boolean(false));
    env.set_variable("True", Value::Boolean(true));
    env.set_variable("None", Value::Null);
    env.set_variable("range", functions::range_fn());
    env.set_variable("strftime_now", functions::strftime_now_fn());
    env.set_variable("raise_exception", functions::raise_exception_fn());
    env.set_variable("namespace", functions::namespace_fn());
}

/// Creates a fresh root environment with globals already installed. This is
/// the convenience most callers want; `Environment::new(None)` alone leaves
/// globals unset, mirroring how the teacher separates `Environment::new`
/// from its global setup step.
pub fn new_with_globals() -> Rc<Environment> {
    let env = Environment::new(None);
    setup_globals(&env);
    env
}
