//! `Value` truthiness, stringification, and loose-equality behavior (§3, §4.A, §8).

mod common;

use similar_asserts::assert_eq;

use jinja_rt::value::{loose_eq, Value};

#[test]
fn falsy_scalars_and_empty_containers() {
    assert!(!Value::Integer(0).is_true());
    assert!(!Value::Float(0.0).is_true());
    assert!(!Value::string("").is_true());
    assert!(!Value::Boolean(false).is_true());
    assert!(!Value::Null.is_true());
    assert!(!Value::Undefined.is_true());
    assert!(!Value::array(vec![]).is_true());
    assert!(!Value::object(Default::default()).is_true());
}

#[test]
fn truthy_nonempty_values() {
    assert!(Value::Integer(1).is_true());
    assert!(Value::Integer(-1).is_true());
    assert!(Value::string("x").is_true());
    assert!(Value::array(vec![Value::Null]).is_true());
    let mut map = jinja_rt::value::map_with_capacity(1);
    map.insert("k".into(), Value::Integer(1));
    assert!(Value::object(map).is_true());
}

#[test]
fn undefined_is_distinct_from_null() {
    assert!(Value::Undefined.is_undefined());
    assert!(!Value::Null.is_undefined());
    assert!(Value::Null.is_null());
    assert!(!Value::Undefined.is_null());
    assert!(!loose_eq(&Value::Undefined, &Value::Null));
}

#[test]
fn float_stringifies_with_trailing_dot_zero_when_integral() {
    assert_eq!(Value::Float(2.0).to_string(), "2.0");
    assert_eq!(Value::Float(2.5).to_string(), "2.5");
    assert_eq!(Value::Float(-3.0).to_string(), "-3.0");
}

#[test]
fn null_and_undefined_render_as_empty_string() {
    assert_eq!(Value::Null.to_string(), "");
    assert_eq!(Value::Undefined.to_string(), "");
}

#[test]
fn loose_equality_crosses_numeric_and_boolean_kinds() {
    assert!(loose_eq(&Value::Integer(1), &Value::Float(1.0)));
    assert!(loose_eq(&Value::Boolean(true), &Value::Integer(1)));
    assert!(!loose_eq(&Value::Boolean(false), &Value::Integer(1)));
    assert!(!loose_eq(&Value::Integer(2), &Value::Float(1.0)));
}

#[test]
fn loose_equality_ignores_array_vs_tuple_tag() {
    let arr = Value::array(vec![Value::Integer(1), Value::Integer(2)]);
    let tup = Value::tuple(vec![Value::Integer(1), Value::Integer(2)]);
    assert!(loose_eq(&arr, &tup));
}

#[test]
fn length_counts_code_points_not_bytes() {
    // "café" has 4 code points but 5 UTF-8 bytes.
    let v = Value::string("café");
    assert_eq!(v.len(), Some(4));
}

#[test]
fn type_name_is_stable() {
    assert_eq!(Value::Integer(1).type_name(), "IntegerValue");
    assert_eq!(Value::Float(1.0).type_name(), "FloatValue");
    assert_eq!(Value::string("s").type_name(), "StringValue");
    assert_eq!(Value::Boolean(true).type_name(), "BooleanValue");
    assert_eq!(Value::Null.type_name(), "NullValue");
    assert_eq!(Value::Undefined.type_name(), "UndefinedValue");
    assert_eq!(Value::array(vec![]).type_name(), "ArrayValue");
    assert_eq!(Value::tuple(vec![]).type_name(), "TupleValue");
    assert_eq!(Value::object(Default::default()).type_name(), "ObjectValue");
}
