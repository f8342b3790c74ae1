//! JSON serialization feeding the `tojson` filter (§4.G).
//!
//! Scalars are escaped with `serde_json` (already a dependency for host
//! value conversion); container layout — `", "`/`": "` separators when flat,
//! newline-plus-indent per depth level otherwise — is rolled by hand so it
//! matches `spec.md`'s exact contract rather than `serde_json`'s own
//! pretty-printer spacing.

use crate::error::{Error, ErrorKind};
use crate::value::Value;

/// Renders `value` as JSON text. `indent`, when `Some`, is the number of
/// spaces used per nesting depth; `None` renders the flat single-line form.
pub fn to_json(value: &Value, indent: Option<usize>) -> Result<String, Error> {
    let mut out = String::new();
    write_value(value, indent, 0, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, indent: Option<usize>, depth: usize, out: &mut String) -> Result<(), Error> {
    match value {
        Value::Null | Value::Undefined => {
            out.push_str("null");
            Ok(())
        }
        Value::Boolean(b) => {
            out.push_str(if *b { "true" } else { "false" });
            Ok(())
        }
        Value::Integer(i) => {
            out.push_str(&i.to_string());
            Ok(())
        }
        Value::Float(f) => {
            if f.is_finite() {
                out.push_str(&serde_json::Number::from_f64(*f).map_or_else(
                    || "0".to_string(),
                    |n| n.to_string(),
                ));
                Ok(())
            } else {
                Err(Error::new(
                    ErrorKind::BadSerialization,
                    "cannot serialize a non-finite float to JSON",
                ))
            }
        }
        Value::String(s) => {
            out.push_str(&escape_string(s));
            Ok(())
        }
        Value::Array(a) => write_seq(a.borrow().iter(), indent, depth, out),
        Value::Tuple(t) => write_seq(t.iter(), indent, depth, out),
        Value::Object(o) => write_map(o.borrow().iter(), indent, depth, out),
        Value::KeywordArguments(o) => write_map(o.iter(), indent, depth, out),
        Value::Function(_) => Err(Error::new(
            ErrorKind::BadSerialization,
            "cannot serialize a function to JSON",
        )),
    }
}

fn escape_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

fn write_seq<'a>(
    items: impl ExactSizeIterator<Item = &'a Value>,
    indent: Option<usize>,
    depth: usize,
    out: &mut String,
) -> Result<(), Error> {
    if items.len() == 0 {
        out.push_str("[]");
        return Ok(());
    }
    out.push('[');
    let len = items.len();
    for (i, item) in items.enumerate() {
        open_entry(indent, depth + 1, out);
        write_value(item, indent, depth + 1, out)?;
        if i + 1 < len {
            out.push(',');
            if indent.is_none() {
                out.push(' ');
            }
        }
    }
    close_container(indent, depth, out);
    out.push(']');
    Ok(())
}

fn write_map<'a>(
    items: impl ExactSizeIterator<Item = (&'a String, &'a Value)>,
    indent: Option<usize>,
    depth: usize,
    out: &mut String,
) -> Result<(), Error> {
    if items.len() == 0 {
        out.push_str("{}");
        return Ok(());
    }
    out.push('{');
    let len = items.len();
    for (i, (k, v)) in items.enumerate() {
        open_entry(indent, depth + 1, out);
        out.push_str(&escape_string(k));
        out.push_str(": ");
        write_value(v, indent, depth + 1, out)?;
        if i + 1 < len {
            out.push(',');
            if indent.is_none() {
                out.push(' ');
            }
        }
    }
    close_container(indent, depth, out);
    out.push('}');
    Ok(())
}

fn open_entry(indent: Option<usize>, depth: usize, out: &mut String) {
    if let Some(width) = indent {
        out.push('\n');
        out.push_str(&" ".repeat(width * depth));
    }
}

fn close_container(indent: Option<usize>, depth: usize, out: &mut String) {
    if let Some(width) = indent {
        out.push('\n');
        out.push_str(&" ".repeat(width * depth));
    }
}
