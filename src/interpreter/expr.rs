//! Expression evaluation (§4.D): binary/unary/ternary/select/test/filter/
//! call/member/slice.

use std::rc::Rc;

use crate::ast::{CallExpression, Expr, MemberExpression, SliceExpression};
use crate::environment::Environment;
use crate::error::{Error, ErrorKind};
use crate::filters;
use crate::value::{builtins, loose_eq, map_with_capacity, Value, ValueMap};

pub fn eval_expr(expr: &Expr, env: &Rc<Environment>) -> Result<Value, Error> {
    match expr {
        Expr::IntegerLiteral(i) => Ok(Value::Integer(*i)),
        Expr::FloatLiteral(f) => Ok(Value::Float(*f)),
        Expr::StringLiteral(s) => Ok(Value::string(s.as_str())),
        Expr::ArrayLiteral(items) => {
            let items = items
                .iter()
                .map(|e| eval_expr(e, env))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::array(items))
        }
        Expr::TupleLiteral(items) => {
            let items = items
                .iter()
                .map(|e| eval_expr(e, env))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::tuple(items))
        }
        Expr::ObjectLiteral(pairs) => {
            let mut map: ValueMap = map_with_capacity(pairs.len());
            for (key, value) in pairs {
                let key = eval_object_key(key, env)?;
                let value = eval_expr(value, env)?;
                map.insert(key, value);
            }
            Ok(Value::object(map))
        }
        Expr::Identifier(name) => Ok(env.lookup_variable(name)),
        Expr::Member(m) => eval_member(m, env),
        Expr::Call(c) => eval_call(c, env),
        Expr::Binary(b) => eval_binary(b, env),
        Expr::Unary(u) => eval_unary(u, env),
        Expr::Filter(f) => {
            let operand = eval_expr(&f.operand, env)?;
            let args = eval_args(&f.args, env)?;
            filters::apply_filter(&f.name, operand, &args, env)
        }
        Expr::Test(t) => {
            let operand = eval_expr(&t.operand, env)?;
            let args = eval_args(&t.args, env)?;
            let test = env
                .lookup_test(&t.name)
                .ok_or_else(|| Error::new(ErrorKind::UnknownTest, format!("unknown test '{}'", t.name)))?;
            let result = test(&operand, &args)?;
            Ok(Value::Boolean(if t.negate { !result } else { result }))
        }
        Expr::Select(s) => {
            let test = eval_expr(&s.test, env)?;
            if test.is_true() {
                eval_expr(&s.consequent, env)
            } else {
                Ok(Value::Undefined)
            }
        }
        Expr::Ternary(t) => {
            let test = eval_expr(&t.test, env)?;
            if test.is_true() {
                eval_expr(&t.consequent, env)
            } else {
                eval_expr(&t.alternate, env)
            }
        }
        Expr::Slice(s) => eval_slice(s, env),
        Expr::KeywordArgument(k) => eval_expr(&k.value, env),
        Expr::Spread(s) => eval_expr(&s.argument, env),
    }
}

fn eval_object_key(key: &Expr, env: &Rc<Environment>) -> Result<String, Error> {
    match key {
        Expr::Identifier(name) => Ok(name.clone()),
        other => {
            let value = eval_expr(other, env)?;
            value.as_str().map(str::to_string).ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidOperation,
                    format!("object key must be a string, got {}", value.type_name()),
                )
            })
        }
    }
}

/// Evaluates a call's argument list (§4.D): positional arguments in order,
/// spreads inlined, and — if any keyword arguments were supplied — a single
/// trailing `KeywordArguments` value. Shared by `CallExpression`, filter call
/// form, and test call form.
pub(crate) fn eval_args(args: &[Expr], env: &Rc<Environment>) -> Result<Vec<Value>, Error> {
    let mut positional = Vec::with_capacity(args.len());
    let mut kwargs: ValueMap = map_with_capacity(0);
    let mut seen_kwarg = false;

    for arg in args {
        match arg {
            Expr::Spread(s) => {
                if seen_kwarg {
                    return Err(Error::new(
                        ErrorKind::InvalidArgument,
                        "positional argument follows keyword argument",
                    ));
                }
                let seq = eval_expr(&s.argument, env)?;
                positional.extend(seq.try_iter()?);
            }
            Expr::KeywordArgument(k) => {
                seen_kwarg = true;
                let value = eval_expr(&k.value, env)?;
                kwargs.insert(k.key.clone(), value);
            }
            other => {
                if seen_kwarg {
                    return Err(Error::new(
                        ErrorKind::InvalidArgument,
                        "positional argument follows keyword argument",
                    ));
                }
                positional.push(eval_expr(other, env)?);
            }
        }
    }

    if !kwargs.is_empty() {
        positional.push(Value::keyword_arguments(kwargs));
    }
    Ok(positional)
}

fn eval_call(call: &CallExpression, env: &Rc<Environment>) -> Result<Value, Error> {
    let callee = eval_expr(&call.callee, env)?;
    let args = eval_args(&call.args, env)?;
    match callee {
        Value::Function(f) => f(&args, env),
        other => Err(Error::new(
            ErrorKind::NotCallable,
            format!("{} is not callable", other.type_name()),
        )),
    }
}

fn eval_member(m: &MemberExpression, env: &Rc<Environment>) -> Result<Value, Error> {
    let object = eval_expr(&m.object, env)?;
    if m.computed {
        let key = eval_expr(&m.property, env)?;
        member_get(&object, &key)
    } else {
        match m.property.as_ref() {
            Expr::Identifier(name) => Ok(builtins::get_attr(&object, name)),
            other => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("member access name must be an identifier, got {other:?}"),
            )),
        }
    }
}

fn member_get(object: &Value, key: &Value) -> Result<Value, Error> {
    match key {
        Value::Integer(i) => index_get(object, *i),
        Value::String(name) => Ok(builtins::get_attr(object, name)),
        other => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot index with a {}", other.type_name()),
        )),
    }
}

fn index_get(object: &Value, index: i64) -> Result<Value, Error> {
    match object {
        Value::Array(a) => {
            let a = a.borrow();
            Ok(normalize_index(index, a.len())
                .and_then(|i| a.get(i).cloned())
                .unwrap_or(Value::Undefined))
        }
        Value::Tuple(t) => Ok(normalize_index(index, t.len())
            .and_then(|i| t.get(i).cloned())
            .unwrap_or(Value::Undefined)),
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(normalize_index(index, chars.len())
                .map(|i| Value::string(chars[i].to_string()))
                .unwrap_or(Value::Undefined))
        }
        other => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("{} is not indexable", other.type_name()),
        )),
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let idx = if index < 0 { index + len as i64 } else { index };
    if idx >= 0 && (idx as usize) < len {
        Some(idx as usize)
    } else {
        None
    }
}

fn eval_unary(u: &crate::ast::UnaryExpression, env: &Rc<Environment>) -> Result<Value, Error> {
    let argument = eval_expr(&u.argument, env)?;
    match u.operator.value.as_str() {
        "not" => Ok(Value::Boolean(!argument.is_true())),
        other => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("unknown unary operator '{other}'"),
        )),
    }
}

fn eval_binary(b: &crate::ast::BinaryExpression, env: &Rc<Environment>) -> Result<Value, Error> {
    let op = b.operator.value.as_str();
    let left = eval_expr(&b.left, env)?;

    match op {
        "and" => {
            return if !left.is_true() {
                Ok(left)
            } else {
                eval_expr(&b.right, env)
            }
        }
        "or" => {
            return if left.is_true() {
                Ok(left)
            } else {
                eval_expr(&b.right, env)
            }
        }
        _ => {}
    }

    let right = eval_expr(&b.right, env)?;

    match op {
        "==" => return Ok(Value::Boolean(loose_eq(&left, &right))),
        "!=" => return Ok(Value::Boolean(!loose_eq(&left, &right))),
        _ => {}
    }

    if left.is_undefined() || right.is_undefined() {
        return match op {
            "in" => Ok(Value::Boolean(false)),
            "not in" => Ok(Value::Boolean(true)),
            other => Err(unknown_operator(other, &left, &right)),
        };
    }

    if left.is_null() || right.is_null() {
        return Err(unknown_operator(op, &left, &right));
    }

    match op {
        "~" => return Ok(Value::string(format!("{left}{right}"))),
        "in" => return eval_in(&left, &right),
        "not in" => return eval_in(&left, &right).map(|v| Value::Boolean(!v.is_true())),
        _ => {}
    }

    if left.is_number() && right.is_number() {
        if let Some(result) = numeric_binary(op, &left, &right) {
            return result;
        }
    }

    if let (Value::Array(a), Value::Array(c)) = (&left, &right) {
        if op == "+" {
            let mut items = a.borrow().clone();
            items.extend(c.borrow().iter().cloned());
            return Ok(Value::array(items));
        }
    }

    if op == "+" && (matches!(left, Value::String(_)) || matches!(right, Value::String(_))) {
        return Ok(Value::string(format!("{left}{right}")));
    }

    Err(unknown_operator(op, &left, &right))
}

fn unknown_operator(op: &str, left: &Value, right: &Value) -> Error {
    Error::new(
        ErrorKind::InvalidOperation,
        format!(
            "Unknown operator {op} between {} and {}",
            left.type_name(),
            right.type_name()
        ),
    )
}

fn numeric_binary(op: &str, left: &Value, right: &Value) -> Option<Result<Value, Error>> {
    let both_int = matches!((left, right), (Value::Integer(_), Value::Integer(_)));
    let lf = left.as_f64()?;
    let rf = right.as_f64()?;

    Some(match op {
        "+" if both_int => Ok(Value::Integer(as_int(left) + as_int(right))),
        "+" => Ok(Value::Float(lf + rf)),
        "-" if both_int => Ok(Value::Integer(as_int(left) - as_int(right))),
        "-" => Ok(Value::Float(lf - rf)),
        "*" if both_int => Ok(Value::Integer(as_int(left) * as_int(right))),
        "*" => Ok(Value::Float(lf * rf)),
        "/" => Ok(Value::Float(lf / rf)),
        "%" if both_int => {
            let r = as_int(right);
            if r == 0 {
                Err(Error::new(ErrorKind::InvalidOperation, "modulo by zero"))
            } else {
                Ok(Value::Integer(python_mod_int(as_int(left), r)))
            }
        }
        "%" => Ok(Value::Float(python_mod_float(lf, rf))),
        "<" => Ok(Value::Boolean(lf < rf)),
        "<=" => Ok(Value::Boolean(lf <= rf)),
        ">" => Ok(Value::Boolean(lf > rf)),
        ">=" => Ok(Value::Boolean(lf >= rf)),
        _ => return None,
    })
}

fn as_int(v: &Value) -> i64 {
    match v {
        Value::Integer(i) => *i,
        _ => 0,
    }
}

/// Python/Jinja `%` takes the sign of the divisor, unlike Rust's `%`
/// (truncating) or `rem_euclid` (always non-negative). `-7 % -3 == -1`,
/// `-7 % 3 == 2`.
fn python_mod_int(lhs: i64, rhs: i64) -> i64 {
    let r = lhs % rhs;
    if r != 0 && (r < 0) != (rhs < 0) {
        r + rhs
    } else {
        r
    }
}

fn python_mod_float(lhs: f64, rhs: f64) -> f64 {
    let r = lhs % rhs;
    if r != 0.0 && (r < 0.0) != (rhs < 0.0) {
        r + rhs
    } else {
        r
    }
}

fn eval_in(left: &Value, right: &Value) -> Result<Value, Error> {
    match right {
        Value::Array(a) => Ok(Value::Boolean(a.borrow().iter().any(|v| loose_eq(v, left)))),
        Value::Tuple(t) => Ok(Value::Boolean(t.iter().any(|v| loose_eq(v, left)))),
        Value::String(s) => match left.as_str() {
            Some(needle) => Ok(Value::Boolean(s.contains(needle))),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                "left side of 'in' must be a string when testing membership in a string",
            )),
        },
        Value::Object(o) => match left.as_str() {
            Some(key) => Ok(Value::Boolean(o.borrow().contains_key(key))),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                "left side of 'in' must be a string when testing membership in an object",
            )),
        },
        Value::KeywordArguments(o) => match left.as_str() {
            Some(key) => Ok(Value::Boolean(o.contains_key(key))),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                "left side of 'in' must be a string when testing membership in an object",
            )),
        },
        other => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("{} is not a container usable with 'in'", other.type_name()),
        )),
    }
}

fn eval_slice(s: &SliceExpression, env: &Rc<Environment>) -> Result<Value, Error> {
    let object = eval_expr(&s.object, env)?;
    let step = match optional_int(&s.step, env)? {
        Some(0) => {
            return Err(Error::new(ErrorKind::InvalidArgument, "slice step cannot be zero"))
        }
        Some(step) => step,
        None => 1,
    };
    let start = optional_int(&s.start, env)?;
    let stop = optional_int(&s.stop, env)?;

    match &object {
        Value::String(st) => {
            let chars: Vec<char> = st.chars().collect();
            let indices = slice_indices(chars.len() as i64, start, stop, step);
            Ok(Value::string(
                indices.into_iter().map(|i| chars[i as usize]).collect::<String>(),
            ))
        }
        Value::Array(a) => {
            let items = a.borrow();
            let indices = slice_indices(items.len() as i64, start, stop, step);
            Ok(Value::array(
                indices.into_iter().map(|i| items[i as usize].clone()).collect(),
            ))
        }
        Value::Tuple(t) => {
            let indices = slice_indices(t.len() as i64, start, stop, step);
            Ok(Value::tuple(
                indices.into_iter().map(|i| t[i as usize].clone()).collect(),
            ))
        }
        other => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot slice a {}", other.type_name()),
        )),
    }
}

fn optional_int(expr: &Option<Box<Expr>>, env: &Rc<Environment>) -> Result<Option<i64>, Error> {
    match expr {
        None => Ok(None),
        Some(e) => match eval_expr(e, env)? {
            Value::Integer(i) => Ok(Some(i)),
            Value::Undefined | Value::Null => Ok(None),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("slice bound must be an integer, got {}", other.type_name()),
            )),
        },
    }
}

/// Computes the Python-style slice index sequence for a sequence of length
/// `len` (§4.D): negative bounds count from the end, a negative `step`
/// reverses, and out-of-range bounds clamp rather than error.
fn slice_indices(len: i64, start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<i64> {
    let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
    let clamp = |v: i64| -> i64 {
        let v = if v < 0 { v + len } else { v };
        v.clamp(lower, upper)
    };
    let start = match start {
        Some(s) => clamp(s),
        None => {
            if step < 0 {
                len - 1
            } else {
                0
            }
        }
    };
    let stop = match stop {
        Some(s) => clamp(s),
        None => {
            if step < 0 {
                -1
            } else {
                len
            }
        }
    };

    let mut out = Vec::new();
    let mut i = start;
    if step > 0 {
        while i < stop {
            out.push(i);
            i += step;
        }
    } else {
        while i > stop {
            out.push(i);
            i += step;
        }
    }
    out
}
