//! Statement evaluation (§4.F): Program, Set, If, For, Macro, CallStatement,
//! FilterStatement, Break/Continue.

use std::rc::Rc;

use crate::ast::{CallStatement, Expr, FilterStatement, For, If, Macro, MacroParam, SetStatement, Stmt};
use crate::environment::Environment;
use crate::error::{Error, ErrorKind};
use crate::filters;
use crate::interpreter::expr::{eval_args, eval_expr};
use crate::value::{map_with_capacity, Value, ValueMap};

/// The result of evaluating a statement block: either the accumulated
/// output, or an in-flight `break`/`continue` signal (§9 "throw-based
/// break/continue" — modeled as an explicit return value, not an exception).
pub enum Signal {
    Normal(String),
    Break,
    Continue,
}

/// Evaluates a sequence of statements, accumulating their string output.
/// Stops early (without an error) if a `break`/`continue` signal surfaces —
/// the caller (a `For` loop, or `run` at the top level) decides what that
/// means.
pub fn eval_block(stmts: &[Stmt], env: &Rc<Environment>) -> Result<Signal, Error> {
    let mut out = String::new();
    for stmt in stmts {
        match eval_stmt(stmt, env)? {
            Signal::Normal(s) => out.push_str(&s),
            signal => return Ok(signal),
        }
    }
    Ok(Signal::Normal(out))
}

fn eval_stmt(stmt: &Stmt, env: &Rc<Environment>) -> Result<Signal, Error> {
    match stmt {
        Stmt::Emit(expr) => Ok(Signal::Normal(eval_expr(expr, env)?.to_string())),
        Stmt::Comment => Ok(Signal::Normal(String::new())),
        Stmt::Set(s) => {
            eval_set(s, env)?;
            Ok(Signal::Normal(String::new()))
        }
        Stmt::If(i) => eval_if(i, env),
        Stmt::For(f) => eval_for(f, env),
        Stmt::Macro(m) => {
            define_macro(m, env);
            Ok(Signal::Normal(String::new()))
        }
        Stmt::Call(c) => Ok(Signal::Normal(eval_call_statement(c, env)?)),
        Stmt::Filter(f) => Ok(Signal::Normal(eval_filter_statement(f, env)?)),
        Stmt::Break => Ok(Signal::Break),
        Stmt::Continue => Ok(Signal::Continue),
    }
}

fn eval_if(i: &If, env: &Rc<Environment>) -> Result<Signal, Error> {
    let test = eval_expr(&i.test, env)?;
    if test.is_true() {
        eval_block(&i.body, env)
    } else {
        eval_block(&i.alternate, env)
    }
}

fn eval_set(s: &SetStatement, env: &Rc<Environment>) -> Result<(), Error> {
    let value = match &s.value {
        Some(expr) => eval_expr(expr, env)?,
        None => match eval_block(&s.body, env)? {
            Signal::Normal(text) => Value::string(text),
            Signal::Break | Signal::Continue => {
                return Err(Error::new(
                    ErrorKind::LoopControlOutsideLoop,
                    "break/continue inside a set block",
                ))
            }
        },
    };
    assign(&s.assignee, value, env)
}

/// Writes `value` to `target`, which must be an `Identifier`, a
/// `TupleLiteral` (destructuring), or a `MemberExpression` onto an `Object`
/// (§4.F).
fn assign(target: &Expr, value: Value, env: &Rc<Environment>) -> Result<(), Error> {
    match target {
        Expr::Identifier(name) => {
            env.set_variable(name.clone(), value);
            Ok(())
        }
        Expr::TupleLiteral(items) => destructure(items, value, env),
        Expr::Member(m) => {
            let object = eval_expr(&m.object, env)?;
            let key = if m.computed {
                eval_expr(&m.property, env)?
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        Error::new(ErrorKind::InvalidAssignmentTarget, "member assignment key must be a string")
                    })?
            } else {
                match m.property.as_ref() {
                    Expr::Identifier(name) => name.clone(),
                    _ => {
                        return Err(Error::new(
                            ErrorKind::InvalidAssignmentTarget,
                            "member assignment name must be an identifier",
                        ))
                    }
                }
            };
            match object {
                Value::Object(o) => {
                    o.borrow_mut().insert(key, value);
                    Ok(())
                }
                other => Err(Error::new(
                    ErrorKind::InvalidAssignmentTarget,
                    format!("cannot assign a member on a {}", other.type_name()),
                )),
            }
        }
        _ => Err(Error::new(
            ErrorKind::InvalidAssignmentTarget,
            "invalid assignment target",
        )),
    }
}

fn destructure(items: &[Expr], value: Value, env: &Rc<Environment>) -> Result<(), Error> {
    let type_name = value.type_name();
    let values = value
        .try_iter()
        .map_err(|_| Error::new(ErrorKind::CannotUnpack, format!("cannot unpack a {type_name}")))?;
    if values.len() != items.len() {
        return Err(Error::new(
            ErrorKind::CannotUnpack,
            format!("cannot unpack {} values into {} targets", values.len(), items.len()),
        ));
    }
    for (target, v) in items.iter().zip(values) {
        assign(target, v, env)?;
    }
    Ok(())
}

fn eval_for(f: &For, env: &Rc<Environment>) -> Result<Signal, Error> {
    let candidates = resolve_for_candidates(&f.iterable, &f.loop_var, env)?;
    if candidates.is_empty() {
        return eval_block(&f.default_block, env);
    }

    let scope = env.child();
    let len = candidates.len();
    let mut out = String::new();

    for (index0, item) in candidates.iter().enumerate() {
        assign(&f.loop_var, item.clone(), &scope)?;
        let previtem = if index0 > 0 {
            candidates[index0 - 1].clone()
        } else {
            Value::Undefined
        };
        let nextitem = candidates.get(index0 + 1).cloned().unwrap_or(Value::Undefined);
        scope.set_variable("loop", build_loop_object(index0, len, previtem, nextitem));

        match eval_block(&f.body, &scope)? {
            Signal::Normal(s) => out.push_str(&s),
            Signal::Continue => continue,
            Signal::Break => break,
        }
    }

    Ok(Signal::Normal(out))
}

fn build_loop_object(index0: usize, len: usize, previtem: Value, nextitem: Value) -> Value {
    let mut map: ValueMap = map_with_capacity(8);
    map.insert("index".into(), Value::Integer(index0 as i64 + 1));
    map.insert("index0".into(), Value::Integer(index0 as i64));
    map.insert("revindex".into(), Value::Integer((len - index0) as i64));
    map.insert("revindex0".into(), Value::Integer((len - 1 - index0) as i64));
    map.insert("first".into(), Value::Boolean(index0 == 0));
    map.insert("last".into(), Value::Boolean(index0 == len - 1));
    map.insert("length".into(), Value::Integer(len as i64));
    map.insert("previtem".into(), previtem);
    map.insert("nextitem".into(), nextitem);
    Value::object(map)
}

/// Resolves the items a `For` iterates over, honoring the `for x in xs if
/// cond` shorthand (§4.F): when `iterable` is a `SelectExpression`, `cond` is
/// evaluated once per candidate with the loop variable bound in a per-
/// candidate subscope, and only surviving candidates are returned.
fn resolve_for_candidates(iterable: &Expr, loop_var: &Expr, env: &Rc<Environment>) -> Result<Vec<Value>, Error> {
    match iterable {
        Expr::Select(select) => {
            let base = eval_expr(&select.consequent, env)?;
            let mut out = Vec::new();
            for candidate in base.try_iter()? {
                let sub = env.child();
                assign(loop_var, candidate.clone(), &sub)?;
                if eval_expr(&select.test, &sub)?.is_true() {
                    out.push(candidate);
                }
            }
            Ok(out)
        }
        other => eval_expr(other, env)?.try_iter(),
    }
}

fn define_macro(m: &Macro, env: &Rc<Environment>) {
    let params = m.args.clone();
    let body = m.body.clone();
    let name = m.name.clone();
    let func = Value::native_fn(move |args, call_env| {
        let scope = call_env.child();
        bind_params(&params, args, &scope)?;
        match eval_block(&body, &scope)? {
            Signal::Normal(s) => Ok(Value::string(s)),
            Signal::Break | Signal::Continue => Err(Error::new(
                ErrorKind::LoopControlOutsideLoop,
                format!("break/continue inside macro '{name}'"),
            )),
        }
    });
    env.set_variable(m.name.clone(), func);
}

/// Binds `args` to `params` by position, then by keyword, then by each
/// param's declared default (evaluated in `scope`) — the macro/`call`-block
/// argument-binding order (§4.F).
fn bind_params(params: &[MacroParam], args: &[Value], scope: &Rc<Environment>) -> Result<(), Error> {
    let mut positional = args.to_vec();
    let kwargs = match positional.last() {
        Some(Value::KeywordArguments(map)) => {
            let map = (**map).clone();
            positional.pop();
            map
        }
        _ => map_with_capacity(0),
    };

    if positional.len() > params.len() {
        return Err(Error::new(
            ErrorKind::ArityMismatch,
            format!(
                "too many positional arguments: expected at most {}, got {}",
                params.len(),
                positional.len()
            ),
        ));
    }

    for (i, param) in params.iter().enumerate() {
        let value = if let Some(v) = positional.get(i).cloned() {
            v
        } else if let Some(v) = kwargs.get(&param.name).cloned() {
            v
        } else if let Some(default) = &param.default {
            eval_expr(default, scope)?
        } else {
            return Err(Error::new(
                ErrorKind::MissingArgument,
                format!("macro argument '{}' not provided", param.name),
            ));
        };
        scope.set_variable(param.name.clone(), value);
    }
    Ok(())
}

/// `{% call macro(args) %} body {% endcall %}` (§4.F): builds a `caller`
/// function closing over this call site's environment, binds it in the
/// scope used to evaluate `macro(args)`, and invokes the macro.
fn eval_call_statement(c: &CallStatement, env: &Rc<Environment>) -> Result<String, Error> {
    let caller_params = c.caller_args.clone();
    let caller_body = c.body.clone();
    let body_env = Rc::clone(env);
    let caller_fn = Value::native_fn(move |args, _call_env| {
        let scope = body_env.child();
        bind_params(&caller_params, args, &scope)?;
        match eval_block(&caller_body, &scope)? {
            Signal::Normal(s) => Ok(Value::string(s)),
            Signal::Break | Signal::Continue => Err(Error::new(
                ErrorKind::LoopControlOutsideLoop,
                "break/continue inside a call block",
            )),
        }
    });

    let call_scope = env.child();
    call_scope.set_variable("caller", caller_fn);
    let callee = eval_expr(&c.call.callee, &call_scope)?;
    let call_args = eval_args(&c.call.args, &call_scope)?;
    let result = match callee {
        Value::Function(f) => f(&call_args, &call_scope)?,
        other => {
            return Err(Error::new(
                ErrorKind::NotCallable,
                format!("{} is not callable", other.type_name()),
            ))
        }
    };
    Ok(result.to_string())
}

/// `{% filter f %} body {% endfilter %}` (§4.F): renders `body`, then
/// applies `f` to the resulting string.
fn eval_filter_statement(fs: &FilterStatement, env: &Rc<Environment>) -> Result<String, Error> {
    let body_value = match eval_block(&fs.body, env)? {
        Signal::Normal(s) => Value::string(s),
        Signal::Break | Signal::Continue => {
            return Err(Error::new(
                ErrorKind::LoopControlOutsideLoop,
                "break/continue inside a filter block",
            ))
        }
    };
    match fs.filter.as_ref() {
        Expr::Filter(f) => {
            let args = eval_args(&f.args, env)?;
            Ok(filters::apply_filter(&f.name, body_value, &args, env)?.to_string())
        }
        Expr::Identifier(name) => Ok(filters::apply_filter(name, body_value, &[], env)?.to_string()),
        other => Err(Error::new(
            ErrorKind::UnknownNode,
            format!("unsupported filter-statement node {other:?}"),
        )),
    }
}
