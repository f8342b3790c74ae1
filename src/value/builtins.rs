//! Per-type builtin member tables (§3, §4.A).
//!
//! Member access on a value first consults its own data (for `Object`) then
//! this module's builtins. Each method-shaped builtin is resolved lazily:
//! `get_attr` returns a `Function` that closes over a clone of the receiver,
//! built fresh at access time rather than stored on the value up front
//! (§9 "per-instance built-in maps capturing `this`").

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, ErrorKind};
use crate::value::{map_with_capacity, Value, ValueMap};

/// Resolves `receiver.name` against the builtins table for `receiver`'s
/// type. Returns `Value::Undefined` for anything not covered below — member
/// access never fails on a missing name (§4.D).
pub fn get_attr(receiver: &Value, name: &str) -> Value {
    match receiver {
        Value::String(s) => string_attr(s, name),
        Value::Array(a) => array_attr(a, name),
        Value::Object(o) => object_attr(o, name),
        Value::KeywordArguments(o) => o.get(name).cloned().unwrap_or(Value::Undefined),
        _ => Value::Undefined,
    }
}

fn string_attr(s: &Rc<str>, name: &str) -> Value {
    if name == "length" {
        return Value::Integer(s.chars().count() as i64);
    }
    match name {
        "upper" | "lower" | "strip" | "lstrip" | "rstrip" | "title" | "capitalize"
        | "startswith" | "endswith" | "split" | "replace" => {
            let receiver = Rc::clone(s);
            let method = name.to_string();
            Value::native_fn(move |args, _env| call_string_method(&receiver, &method, args))
        }
        _ => Value::Undefined,
    }
}

fn array_attr(a: &Rc<RefCell<Vec<Value>>>, name: &str) -> Value {
    if name == "length" {
        Value::Integer(a.borrow().len() as i64)
    } else {
        Value::Undefined
    }
}

fn object_attr(o: &Rc<RefCell<ValueMap>>, name: &str) -> Value {
    if let Some(v) = o.borrow().get(name) {
        return v.clone();
    }
    match name {
        "get" | "keys" | "values" | "items" => {
            let receiver = Rc::clone(o);
            let method = name.to_string();
            Value::native_fn(move |args, _env| call_object_method(&receiver, &method, args))
        }
        _ => Value::Undefined,
    }
}

/// Dispatches a call to one of the String builtins. Shared by member-access
/// calls (`s.upper()`) and the identically-behaving filters (`s | upper`).
pub fn call_string_method(receiver: &Rc<str>, name: &str, args: &[Value]) -> Result<Value, Error> {
    match name {
        "upper" => Ok(Value::string(receiver.to_uppercase())),
        "lower" => Ok(Value::string(receiver.to_lowercase())),
        "strip" => Ok(Value::string(receiver.trim().to_string())),
        "lstrip" => Ok(Value::string(receiver.trim_start().to_string())),
        "rstrip" => Ok(Value::string(receiver.trim_end().to_string())),
        "title" => Ok(Value::string(title_case(receiver))),
        "capitalize" => Ok(Value::string(capitalize(receiver))),
        "startswith" => string_affix_check(receiver, args, true),
        "endswith" => string_affix_check(receiver, args, false),
        "split" => string_split(receiver, args),
        "replace" => string_replace(receiver, args),
        other => Err(Error::new(
            ErrorKind::UnknownFilter,
            format!("no method named '{other}' for strings"),
        )),
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
    }
}

fn affix_candidates(arg: &Value) -> Result<Vec<String>, Error> {
    let items: Vec<Value> = match arg {
        Value::String(s) => return Ok(vec![s.to_string()]),
        Value::Tuple(items) => (**items).clone(),
        Value::Array(a) => a.borrow().clone(),
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "startswith/endswith requires a string or tuple of strings",
            ))
        }
    };
    items
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidArgument,
                    "startswith/endswith requires string elements",
                )
            })
        })
        .collect()
}

fn string_affix_check(receiver: &str, args: &[Value], is_prefix: bool) -> Result<Value, Error> {
    let arg = args.first().ok_or_else(|| {
        Error::new(ErrorKind::MissingArgument, "startswith/endswith requires an argument")
    })?;
    let candidates = affix_candidates(arg)?;
    let matched = candidates.iter().any(|c| {
        if is_prefix {
            receiver.starts_with(c.as_str())
        } else {
            receiver.ends_with(c.as_str())
        }
    });
    Ok(Value::Boolean(matched))
}

fn string_split(receiver: &str, args: &[Value]) -> Result<Value, Error> {
    let sep = args.first().cloned().unwrap_or(Value::Null);
    let maxsplit = match args.get(1) {
        Some(Value::Integer(i)) => *i,
        Some(Value::Undefined) | Some(Value::Null) | None => -1,
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "maxsplit must be an integer",
            ))
        }
    };
    let parts = split_string(receiver, &sep, maxsplit)?;
    Ok(Value::array(parts.into_iter().map(Value::string).collect()))
}

/// Implements the `split` builtin/filter's semantics (§4.A `split`).
pub fn split_string(receiver: &str, sep: &Value, maxsplit: i64) -> Result<Vec<String>, Error> {
    match sep {
        Value::Null | Value::Undefined => {
            // Split on runs of whitespace, trimming leading whitespace. When
            // maxsplit is reached the remainder (including interior
            // whitespace) becomes the last element.
            let trimmed = receiver.trim_start();
            if trimmed.is_empty() {
                return Ok(Vec::new());
            }
            if maxsplit < 0 {
                return Ok(trimmed.split_whitespace().map(str::to_string).collect());
            }
            let mut parts = Vec::new();
            let mut rest = trimmed;
            for _ in 0..maxsplit {
                let rest_trimmed = rest.trim_start();
                if rest_trimmed.is_empty() {
                    rest = rest_trimmed;
                    break;
                }
                match rest_trimmed.find(char::is_whitespace) {
                    Some(idx) => {
                        parts.push(rest_trimmed[..idx].to_string());
                        rest = &rest_trimmed[idx..];
                    }
                    None => {
                        parts.push(rest_trimmed.to_string());
                        rest = "";
                        break;
                    }
                }
            }
            let remainder = rest.trim_start();
            if !remainder.is_empty() {
                parts.push(remainder.to_string());
            }
            Ok(parts)
        }
        Value::String(sep) => {
            if sep.is_empty() {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    "empty separator for split",
                ));
            }
            if maxsplit < 0 {
                Ok(receiver.split(sep.as_ref()).map(str::to_string).collect())
            } else {
                Ok(receiver
                    .splitn(maxsplit as usize + 1, sep.as_ref())
                    .map(str::to_string)
                    .collect())
            }
        }
        other => Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("split separator must be a string or none, got {}", other.type_name()),
        )),
    }
}

fn string_replace(receiver: &str, args: &[Value]) -> Result<Value, Error> {
    let old = args
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| Error::new(ErrorKind::MissingArgument, "replace requires 'old'"))?;
    let new = args
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::new(ErrorKind::MissingArgument, "replace requires 'new'"))?;
    let count = match args.get(2) {
        Some(Value::Integer(i)) => Some(*i as usize),
        Some(Value::Null) | Some(Value::Undefined) | None => None,
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "replace count must be an integer",
            ))
        }
    };
    Ok(Value::string(replace_n(receiver, old, new, count)))
}

/// Replaces the first `count` left-to-right non-overlapping occurrences of
/// `old` with `new` (or all occurrences when `count` is `None`).
pub fn replace_n(receiver: &str, old: &str, new: &str, count: Option<usize>) -> String {
    match count {
        None => receiver.replace(old, new),
        Some(n) => receiver.replacen(old, new, n),
    }
}

/// `get`/`keys`/`values`/`items` on `Object` (§4.A).
pub fn call_object_method(
    receiver: &Rc<RefCell<ValueMap>>,
    name: &str,
    args: &[Value],
) -> Result<Value, Error> {
    let map = receiver.borrow();
    match name {
        "get" => {
            let key = args
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| Error::new(ErrorKind::MissingArgument, "get requires a key"))?;
            let default = args.get(1).cloned().unwrap_or(Value::Null);
            Ok(map.get(key).cloned().unwrap_or(default))
        }
        "keys" => Ok(Value::array(
            map.keys().map(|k| Value::string(k.as_str())).collect(),
        )),
        "values" => Ok(Value::array(map.values().cloned().collect())),
        "items" => Ok(Value::array(
            map.iter()
                .map(|(k, v)| Value::array(vec![Value::string(k.as_str()), v.clone()]))
                .collect(),
        )),
        other => Err(Error::new(
            ErrorKind::UnknownFilter,
            format!("no method named '{other}' for objects"),
        )),
    }
}

/// Builds a fresh empty `ValueMap` with a given capacity, used by a handful
/// of call sites outside this module (kept here to avoid re-exporting
/// `indexmap` directly from two places).
pub fn new_map(capacity: usize) -> ValueMap {
    map_with_capacity(capacity)
}
