//! The per-type filter registry (§4.E).
//!
//! Filters are dispatched on `(receiver type, filter name)`; there is no
//! single flat name→fn table the way `tests_registry` has one, because the
//! same name (`string`, `int`, `length`) means something different for each
//! receiver kind.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::arg_utils::ArgParser;
use crate::environment::Environment;
use crate::error::{Error, ErrorKind};
use crate::json;
use crate::value::builtins::call_string_method;
use crate::value::{loose_eq, Value};

/// Applies `name(args)` to `receiver`. `env` is the environment active at the
/// filter's call site, needed by `selectattr`/`rejectattr` to resolve tests.
pub fn apply_filter(
    name: &str,
    receiver: Value,
    args: &[Value],
    env: &Rc<Environment>,
) -> Result<Value, Error> {
    if let Some(v) = universal_filter(name, &receiver, args)? {
        return Ok(v);
    }
    match &receiver {
        Value::Array(_) | Value::Tuple(_) => array_filter(name, receiver, args, env),
        Value::String(_) => string_filter(name, receiver, args),
        Value::Integer(_) | Value::Float(_) => numeric_filter(name, receiver, args),
        Value::Object(_) | Value::KeywordArguments(_) => object_filter(name, receiver),
        Value::Boolean(_) => boolean_filter(name, receiver),
        other => Err(unknown_filter(name, other)),
    }
}

fn unknown_filter(name: &str, receiver: &Value) -> Error {
    Error::new(
        ErrorKind::UnknownFilter,
        format!("no filter named '{name}' for {}", receiver.type_name()),
    )
}

fn universal_filter(name: &str, receiver: &Value, args: &[Value]) -> Result<Option<Value>, Error> {
    match name {
        "tojson" => {
            let mut parser = ArgParser::new(args);
            let indent = match parser.get_or("indent", Value::Null) {
                Value::Null | Value::Undefined => None,
                Value::Integer(i) if i > 0 => Some(i as usize),
                Value::Integer(_) => None,
                Value::Boolean(true) => Some(2),
                Value::Boolean(false) => None,
                other => {
                    return Err(Error::new(
                        ErrorKind::InvalidArgument,
                        format!(
                            "tojson indent must be an integer or boolean, got {}",
                            other.type_name()
                        ),
                    ))
                }
            };
            Ok(Some(Value::string(json::to_json(receiver, indent)?)))
        }
        "default" => {
            let mut parser = ArgParser::new(args);
            let fallback = parser.get_or("value", Value::string(""));
            let use_for_falsy = parser.get_or("boolean", Value::Boolean(false)).is_true();
            if receiver.is_undefined() || (use_for_falsy && !receiver.is_true()) {
                Ok(Some(fallback))
            } else {
                Ok(Some(receiver.clone()))
            }
        }
        _ => Ok(None),
    }
}

fn array_items(receiver: &Value) -> Vec<Value> {
    match receiver {
        Value::Array(a) => a.borrow().clone(),
        Value::Tuple(t) => (**t).clone(),
        _ => Vec::new(),
    }
}

fn array_filter(
    name: &str,
    receiver: Value,
    args: &[Value],
    env: &Rc<Environment>,
) -> Result<Value, Error> {
    let items = array_items(&receiver);
    match name {
        "list" => Ok(Value::array(items)),
        "first" => Ok(items.into_iter().next().unwrap_or(Value::Undefined)),
        "last" => Ok(items.into_iter().next_back().unwrap_or(Value::Undefined)),
        "length" => Ok(Value::Integer(items.len() as i64)),
        "reverse" => {
            let mut items = items;
            items.reverse();
            Ok(Value::array(items))
        }
        "sort" => sort_values(items).map(Value::array),
        "join" => {
            let mut parser = ArgParser::new(args);
            let sep = parser.get_or("sep", Value::string("")).to_string();
            Ok(Value::string(
                items
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(&sep),
            ))
        }
        "unique" => {
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !out.iter().any(|seen| loose_eq(seen, &item)) {
                    out.push(item);
                }
            }
            Ok(Value::array(out))
        }
        "string" => Ok(Value::string(json::to_json(&receiver, None)?)),
        "selectattr" => select_reject(items, args, env, true),
        "rejectattr" => select_reject(items, args, env, false),
        "map" => map_attribute(items, args),
        other => Err(unknown_filter(other, &receiver)),
    }
}

fn sort_values(mut items: Vec<Value>) -> Result<Vec<Value>, Error> {
    if items.iter().all(|v| v.is_number()) {
        items.sort_by(|a, b| a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal));
        Ok(items)
    } else if items.iter().all(|v| matches!(v, Value::String(_))) {
        items.sort_by(|a, b| a.as_str().unwrap_or("").cmp(b.as_str().unwrap_or("")));
        Ok(items)
    } else {
        Err(Error::new(
            ErrorKind::InvalidOperation,
            "sort requires all-numeric or all-string elements",
        ))
    }
}

fn select_reject(
    items: Vec<Value>,
    args: &[Value],
    env: &Rc<Environment>,
    keep_on_match: bool,
) -> Result<Value, Error> {
    let mut parser = ArgParser::new(args);
    let attr = parser
        .require("attr")?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            Error::new(ErrorKind::InvalidArgument, "selectattr/rejectattr attr must be a string")
        })?;
    let test_name = parser.get("test").and_then(|v| v.as_str().map(str::to_string));
    let test_args: Vec<Value> = std::iter::from_fn(|| parser.get("value")).collect();

    let mut out = Vec::new();
    for item in items {
        let value = match &item {
            Value::Object(o) => o.borrow().get(&attr).cloned().unwrap_or(Value::Undefined),
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    "selectattr/rejectattr requires Object elements",
                ))
            }
        };
        let matched = match &test_name {
            Some(test_name) => {
                let test = env.lookup_test(test_name).ok_or_else(|| {
                    Error::new(ErrorKind::UnknownTest, format!("unknown test '{test_name}'"))
                })?;
                test(&value, &test_args)?
            }
            None => value.is_true(),
        };
        if matched == keep_on_match {
            out.push(item);
        }
    }
    Ok(Value::array(out))
}

fn map_attribute(items: Vec<Value>, args: &[Value]) -> Result<Value, Error> {
    let mut parser = ArgParser::new(args);
    let attr = parser.require("attribute")?;
    let attr = attr
        .as_str()
        .ok_or_else(|| Error::new(ErrorKind::InvalidArgument, "map attribute must be a string"))?
        .to_string();
    let default = parser.get_or("default", Value::Undefined);
    let out = items
        .into_iter()
        .map(|item| match item {
            Value::Object(o) => o
                .borrow()
                .get(&attr)
                .cloned()
                .unwrap_or_else(|| default.clone()),
            _ => default.clone(),
        })
        .collect();
    Ok(Value::array(out))
}

fn string_filter(name: &str, receiver: Value, args: &[Value]) -> Result<Value, Error> {
    let s = match &receiver {
        Value::String(s) => Rc::clone(s),
        _ => return Err(unknown_filter(name, &receiver)),
    };
    match name {
        "length" => Ok(Value::Integer(s.chars().count() as i64)),
        "upper" | "lower" | "title" | "capitalize" | "replace" => call_string_method(&s, name, args),
        "trim" => Ok(Value::string(s.trim().to_string())),
        "indent" => string_indent(&s, args),
        "join" => {
            let mut parser = ArgParser::new(args);
            let sep = parser.get_or("sep", Value::string("")).to_string();
            Ok(Value::string(
                s.chars().map(|c| c.to_string()).collect::<Vec<_>>().join(&sep),
            ))
        }
        "int" => {
            let mut parser = ArgParser::new(args);
            let default = parser.get_or("default", Value::Integer(0));
            Ok(s.trim().parse::<i64>().map(Value::Integer).unwrap_or(default))
        }
        "float" => {
            let mut parser = ArgParser::new(args);
            let default = parser.get_or("default", Value::Float(0.0));
            Ok(s.trim().parse::<f64>().map(Value::Float).unwrap_or(default))
        }
        "string" => Ok(receiver),
        other => Err(unknown_filter(other, &receiver)),
    }
}

fn string_indent(s: &str, args: &[Value]) -> Result<Value, Error> {
    let mut parser = ArgParser::new(args);
    let width = match parser.get_or("width", Value::Integer(4)) {
        Value::Integer(i) if i >= 0 => i as usize,
        _ => {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "indent width must be a non-negative integer",
            ))
        }
    };
    let first = parser.get_or("first", Value::Boolean(false)).is_true();
    let blank = parser.get_or("blank", Value::Boolean(false)).is_true();
    let prefix = " ".repeat(width);

    let mut out = String::new();
    for (i, line) in s.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let should_indent = (i > 0 || first) && (blank || !line.is_empty());
        if should_indent {
            out.push_str(&prefix);
        }
        out.push_str(line);
    }
    Ok(Value::string(out))
}

/// `int`/`float` accept an unused `default=` kwarg here for call-site
/// symmetry with the String variants; a numeric receiver always converts
/// successfully so there's nothing to fall back to.
fn numeric_filter(name: &str, receiver: Value, _args: &[Value]) -> Result<Value, Error> {
    match (name, &receiver) {
        ("abs", Value::Integer(i)) => Ok(Value::Integer(i.abs())),
        ("abs", Value::Float(f)) => Ok(Value::Float(f.abs())),
        ("int", Value::Integer(i)) => Ok(Value::Integer(*i)),
        ("int", Value::Float(f)) => Ok(Value::Integer(f.floor() as i64)),
        ("float", Value::Integer(i)) => Ok(Value::Float(*i as f64)),
        ("float", Value::Float(f)) => Ok(Value::Float(*f)),
        (other, _) => Err(unknown_filter(other, &receiver)),
    }
}

fn object_filter(name: &str, receiver: Value) -> Result<Value, Error> {
    let map = match &receiver {
        Value::Object(o) => o.borrow().clone(),
        Value::KeywordArguments(o) => (**o).clone(),
        _ => return Err(unknown_filter(name, &receiver)),
    };
    match name {
        "items" => Ok(Value::array(
            map.into_iter()
                .map(|(k, v)| Value::array(vec![Value::string(k), v]))
                .collect(),
        )),
        "length" => Ok(Value::Integer(map.len() as i64)),
        other => Err(unknown_filter(other, &receiver)),
    }
}

fn boolean_filter(name: &str, receiver: Value) -> Result<Value, Error> {
    let b = matches!(receiver, Value::Boolean(true));
    match name {
        "bool" => Ok(Value::Boolean(b)),
        "int" => Ok(Value::Integer(b as i64)),
        "float" => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        "string" => Ok(Value::string(if b { "true" } else { "false" })),
        other => Err(unknown_filter(other, &receiver)),
    }
}
