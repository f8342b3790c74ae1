//! The runtime value model (§3, §4.A).
//!
//! `Value` is a single closed tagged variant (design note §9): there is no
//! base class and no dynamic `Object` trait for host extension the way
//! `minijinja::Value` has one — this interpreter's value space is exactly
//! the eleven variants `spec.md` §3 lists, dispatched on by matching the
//! tag rather than by virtual call.

pub mod builtins;
pub mod convert;
mod map;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use map::{map_with_capacity, ValueMap};

use crate::environment::Environment;
use crate::error::{Error, ErrorKind};

/// A native callable: positional arguments plus the environment active at
/// the call site, returning a value (§4.A, §6).
pub type NativeFunc = dyn Fn(&[Value], &Rc<Environment>) -> Result<Value, Error>;

/// The runtime value.
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Boolean(bool),
    Null,
    Undefined,
    Array(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<Vec<Value>>),
    Object(Rc<RefCell<ValueMap>>),
    /// A distinguished `Object` subtype marking a kwargs payload appended to
    /// a call's positional arguments (§3, §4.D).
    KeywordArguments(Rc<ValueMap>),
    Function(Rc<NativeFunc>),
}

impl Value {
    pub const TRUE: Value = Value::Boolean(true);
    pub const FALSE: Value = Value::Boolean(false);

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    pub fn object(map: ValueMap) -> Value {
        Value::Object(Rc::new(RefCell::new(map)))
    }

    pub fn keyword_arguments(map: ValueMap) -> Value {
        Value::KeywordArguments(Rc::new(map))
    }

    pub fn native_fn<F>(f: F) -> Value
    where
        F: Fn(&[Value], &Rc<Environment>) -> Result<Value, Error> + 'static,
    {
        Value::Function(Rc::new(f))
    }

    /// The stable type tag used by `is` tests and error messages (§4.A).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "IntegerValue",
            Value::Float(_) => "FloatValue",
            Value::String(_) => "StringValue",
            Value::Boolean(_) => "BooleanValue",
            Value::Null => "NullValue",
            Value::Undefined => "UndefinedValue",
            Value::Array(_) => "ArrayValue",
            Value::Tuple(_) => "TupleValue",
            Value::Object(_) => "ObjectValue",
            Value::KeywordArguments(_) => "KeywordArgumentsValue",
            Value::Function(_) => "FunctionValue",
        }
    }

    /// Python-flavored truthiness (§3): empty containers and zero/empty
    /// scalars are falsy, everything else is truthy.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
            Value::Null | Value::Undefined => false,
            Value::Array(a) => !a.borrow().is_empty(),
            Value::Tuple(t) => !t.is_empty(),
            Value::Object(o) => !o.borrow().is_empty(),
            Value::KeywordArguments(o) => !o.is_empty(),
            Value::Function(_) => true,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Clones the elements of `Array`/`Tuple`, or the keys of `Object` (as
    /// `String` values), or the code points of `String` (as single-character
    /// `String` values). Used by `for`, `in`, spreads, and iterable filters.
    pub fn try_iter(&self) -> Result<Vec<Value>, Error> {
        match self {
            Value::Array(a) => Ok(a.borrow().clone()),
            Value::Tuple(t) => Ok((**t).clone()),
            Value::Object(o) => Ok(o.borrow().keys().map(|k| Value::string(k.as_str())).collect()),
            Value::KeywordArguments(o) => {
                Ok(o.keys().map(|k| Value::string(k.as_str())).collect())
            }
            Value::String(s) => Ok(s.chars().map(|c| Value::string(c.to_string())).collect()),
            _ => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("{} is not iterable", self.type_name()),
            )),
        }
    }

    /// Number of code points / elements / entries (§4.A `length`).
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(a) => Some(a.borrow().len()),
            Value::Tuple(t) => Some(t.len()),
            Value::Object(o) => Some(o.borrow().len()),
            Value::KeywordArguments(o) => Some(o.len()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len().map(|n| n == 0).unwrap_or(false)
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if f == f.trunc() && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        let mut s = format!("{f}");
        if !s.contains('.') && !s.contains('e') && !s.contains('E') {
            s.push_str(".0");
        }
        s
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::String(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Null | Value::Undefined => Ok(()),
            Value::Array(a) => write_seq(f, '[', ']', a.borrow().iter()),
            Value::Tuple(t) => write_seq(f, '[', ']', t.iter()),
            Value::Object(o) => write_map(f, o.borrow().iter()),
            Value::KeywordArguments(o) => write_map(f, o.iter()),
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}

fn write_seq<'a>(
    f: &mut fmt::Formatter<'_>,
    open: char,
    close: char,
    items: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", debug_repr(item))?;
    }
    write!(f, "{close}")
}

fn write_map<'a>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = (&'a String, &'a Value)>,
) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (k, v)) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{k:?}: {}", debug_repr(v))?;
    }
    write!(f, "}}")
}

/// Python-`repr`-ish rendering used for elements nested inside a stringified
/// container (strings get quoted so `[1, "a"]` round-trips visually).
fn debug_repr(v: &Value) -> String {
    match v {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({self})", self.type_name())
    }
}

/// Loose equality (§9): `Integer`/`Float`/`Boolean` compare across kinds by
/// numeric value (`1 == 1.0`, `true == 1`); other kinds compare structurally
/// by content, with `Array`/`Tuple` compared element-wise regardless of tag.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Undefined, Value::Undefined) => true,
        (Value::String(x), Value::String(y)) => x == y,
        (a, b)
            if (a.is_number() || matches!(a, Value::Boolean(_)))
                && (b.is_number() || matches!(b, Value::Boolean(_))) =>
        {
            a.as_f64() == b.as_f64()
        }
        (Value::Array(x), Value::Array(y)) => seq_eq(&x.borrow(), &y.borrow()),
        (Value::Tuple(x), Value::Tuple(y)) => seq_eq(x, y),
        (Value::Array(x), Value::Tuple(y)) | (Value::Tuple(y), Value::Array(x)) => {
            seq_eq(&x.borrow(), y)
        }
        (Value::Object(x), Value::Object(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map(|v2| loose_eq(v, v2)).unwrap_or(false))
        }
        _ => false,
    }
}

fn seq_eq(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
}
