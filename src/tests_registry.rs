//! The `is`/`is not` test registry (§4.D, §6).
//!
//! Tests are plain predicates over a value plus zero or more operand
//! arguments (`x is equalto y`, `x is divisibleby 3`). Unlike filters they
//! are not dispatched per receiver type — one flat name-keyed table covers
//! every value kind, matching how small and fixed this set is.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, ErrorKind};
use crate::value::loose_eq;
use crate::value::Value;

pub type TestFn = Rc<dyn Fn(&Value, &[Value]) -> Result<bool, Error>>;

fn test(f: impl Fn(&Value, &[Value]) -> Result<bool, Error> + 'static) -> TestFn {
    Rc::new(f)
}

/// Builds the fixed table of builtin tests (§4.D).
pub fn builtin_tests() -> HashMap<String, TestFn> {
    let mut m: HashMap<String, TestFn> = HashMap::new();

    m.insert(
        "boolean".into(),
        test(|v, _| Ok(matches!(v, Value::Boolean(_)))),
    );
    m.insert("callable".into(), test(|v, _| Ok(v.is_callable())));
    m.insert(
        "odd".into(),
        test(|v, _| match v {
            Value::Integer(i) => Ok(i % 2 != 0),
            other => Err(not_a_number("odd", other)),
        }),
    );
    m.insert(
        "even".into(),
        test(|v, _| match v {
            Value::Integer(i) => Ok(i % 2 == 0),
            other => Err(not_a_number("even", other)),
        }),
    );
    m.insert("false".into(), test(|v, _| Ok(matches!(v, Value::Boolean(false)))));
    m.insert("true".into(), test(|v, _| Ok(matches!(v, Value::Boolean(true)))));
    m.insert("none".into(), test(|v, _| Ok(v.is_null())));
    m.insert("string".into(), test(|v, _| Ok(matches!(v, Value::String(_)))));
    m.insert("number".into(), test(|v, _| Ok(v.is_number())));
    m.insert(
        "integer".into(),
        test(|v, _| Ok(matches!(v, Value::Integer(_)))),
    );
    m.insert(
        "iterable".into(),
        test(|v, _| Ok(v.try_iter().is_ok())),
    );
    m.insert(
        "mapping".into(),
        test(|v, _| Ok(matches!(v, Value::Object(_) | Value::KeywordArguments(_)))),
    );
    m.insert(
        "lower".into(),
        test(|v, _| match v.as_str() {
            Some(s) => Ok(s.chars().all(|c| !c.is_alphabetic() || c.is_lowercase())),
            None => Err(not_a_string("lower", v)),
        }),
    );
    m.insert(
        "upper".into(),
        test(|v, _| match v.as_str() {
            Some(s) => Ok(s.chars().all(|c| !c.is_alphabetic() || c.is_uppercase())),
            None => Err(not_a_string("upper", v)),
        }),
    );
    m.insert("defined".into(), test(|v, _| Ok(!v.is_undefined())));
    m.insert("undefined".into(), test(|v, _| Ok(v.is_undefined())));

    let equalto = test(|v, args| {
        let other = args
            .first()
            .ok_or_else(|| Error::new(ErrorKind::MissingArgument, "equalto requires an argument"))?;
        Ok(loose_eq(v, other))
    });
    m.insert("equalto".into(), Rc::clone(&equalto));
    m.insert("eq".into(), equalto);

    m
}

fn not_a_number(test_name: &str, v: &Value) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("'{test_name}' test requires an integer, got {}", v.type_name()),
    )
}

fn not_a_string(test_name: &str, v: &Value) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!("'{test_name}' test requires a string, got {}", v.type_name()),
    )
}
