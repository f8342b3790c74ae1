//! Expression evaluation: operators, slicing, member access, filters, tests (§4.D, §4.E).

mod common;

use similar_asserts::assert_eq;

use jinja_rt::ast::*;
use jinja_rt::value::Value;
use jinja_rt::Environment;

use common::*;

fn render_expr(e: Expr) -> String {
    render(&program(vec![emit(e)])).unwrap()
}

fn render_expr_err(e: Expr) -> jinja_rt::Error {
    render(&program(vec![emit(e)])).unwrap_err()
}

#[test]
fn integer_arithmetic_preserves_integer_tag() {
    assert_eq!(render_expr(binary("+", int(1), int(2))), "3");
    assert_eq!(render_expr(binary("-", int(5), int(2))), "3");
    assert_eq!(render_expr(binary("*", int(2), int(3))), "6");
}

#[test]
fn division_always_promotes_to_float() {
    assert_eq!(render_expr(binary("/", int(4), int(2))), "2.0");
}

#[test]
fn mixed_numeric_arithmetic_promotes_to_float() {
    assert_eq!(render_expr(binary("+", int(1), float(1.5))), "2.5");
}

#[test]
fn modulo_preserves_integer_kind() {
    assert_eq!(render_expr(binary("%", int(7), int(3))), "1");
}

#[test]
fn modulo_takes_the_sign_of_the_divisor() {
    // CPython/Jinja semantics: the result's sign follows the divisor, not
    // the dividend — unlike Rust's truncating `%`.
    assert_eq!(render_expr(binary("%", int(-7), int(-3))), "-1");
    assert_eq!(render_expr(binary("%", int(-7), int(3))), "2");
    assert_eq!(render_expr(binary("%", int(7), int(-3))), "-2");
    assert_eq!(render_expr(binary("%", float(-7.0), float(-3.0))), "-1.0");
    assert_eq!(render_expr(binary("%", float(-7.0), float(3.0))), "2.0");
}

#[test]
fn comparison_operators_yield_boolean() {
    assert_eq!(render_expr(binary("<", int(1), int(2))), "true");
    assert_eq!(render_expr(binary(">=", int(2), int(2))), "true");
}

#[test]
fn tilde_concatenates_string_renderings() {
    assert_eq!(render_expr(binary("~", int(1), str_lit("x"))), "1x");
}

#[test]
fn plus_concatenates_arrays() {
    let e = binary("+", array(vec![int(1), int(2)]), array(vec![int(3)]));
    let result = render(&program(vec![emit(filter(e, "join", vec![str_lit(",")]))])).unwrap();
    assert_eq!(result, "1,2,3");
}

#[test]
fn plus_concatenates_strings_when_either_side_is_a_string() {
    assert_eq!(render_expr(binary("+", str_lit("a"), str_lit("b"))), "ab");
}

#[test]
fn and_or_return_python_style_unevaluated_operand() {
    assert_eq!(render_expr(binary("or", int(0), str_lit("x"))), "x");
    assert_eq!(render_expr(binary("or", array(vec![]), str_lit("x"))), "x");
    assert_eq!(render_expr(binary("and", str_lit("y"), str_lit("z"))), "z");
}

#[test]
fn and_short_circuits_without_evaluating_right() {
    // If short-circuiting failed to work, evaluating the unknown identifier
    // as a callee would still not error (it is simply Undefined), so this
    // test instead checks that the falsy left operand itself is returned,
    // not some transformation of the right.
    assert_eq!(render_expr(binary("and", int(0), str_lit("z"))), "0");
}

#[test]
fn equality_is_loose_across_numeric_kinds() {
    assert_eq!(render_expr(binary("==", int(1), float(1.0))), "true");
    assert_eq!(render_expr(binary("!=", int(1), float(1.0))), "false");
}

#[test]
fn undefined_in_rhs_of_in_yields_false_not_in_yields_true() {
    assert_eq!(render_expr(binary("in", str_lit("x"), id("missing"))), "false");
    assert_eq!(render_expr(binary("not in", str_lit("x"), id("missing"))), "true");
}

#[test]
fn operator_on_null_fails() {
    let err = render_expr_err(binary("+", id("none"), int(1)));
    assert_eq!(err.kind(), jinja_rt::ErrorKind::InvalidOperation);
}

#[test]
fn unknown_operator_combination_fails_with_clear_message() {
    let err = render_expr_err(binary("+", int(1), array(vec![])));
    assert!(err.to_string().contains("Unknown operator"));
}

#[test]
fn not_negates_truthiness() {
    assert_eq!(render_expr(unary("not", int(0))), "true");
    assert_eq!(render_expr(unary("not", str_lit("x"))), "false");
}

#[test]
fn ternary_evaluates_exactly_one_branch() {
    let e = Expr::Ternary(Ternary {
        test: Box::new(binary("==", int(1), int(1))),
        consequent: Box::new(str_lit("yes")),
        alternate: Box::new(str_lit("no")),
    });
    assert_eq!(render_expr(e), "yes");
}

#[test]
fn select_expression_without_else_yields_undefined_when_falsy() {
    let e = Expr::Select(SelectExpression {
        consequent: Box::new(str_lit("shown")),
        test: Box::new(binary("==", int(1), int(2))),
    });
    assert_eq!(render_expr(e), "");
}

#[test]
fn test_expression_applies_registry_test_and_negation() {
    assert_eq!(render_expr(test_expr(int(3), "odd", false)), "true");
    assert_eq!(render_expr(test_expr(int(3), "odd", true)), "false");
}

#[test]
fn defined_and_undefined_tests_on_missing_identifier() {
    assert_eq!(render_expr(test_expr(id("ghost"), "defined", false)), "false");
    assert_eq!(render_expr(test_expr(id("ghost"), "undefined", false)), "true");
}

#[test]
fn unknown_test_fails() {
    let err = render_expr_err(test_expr(int(1), "bogus", false));
    assert_eq!(err.kind(), jinja_rt::ErrorKind::UnknownTest);
}

#[test]
fn member_access_on_array_supports_negative_index() {
    let e = member(array(vec![int(1), int(2), int(3)]), int(-1), true);
    assert_eq!(render_expr(e), "3");
}

#[test]
fn member_access_missing_key_yields_undefined_not_error() {
    let env = new_env();
    let obj = Value::object(Default::default());
    env.set("o", obj);
    let e = member(id("o"), str_lit("missing"), true);
    let out = render_with(env, &program(vec![emit(e)])).unwrap();
    assert_eq!(out, "");
}

#[test]
fn slice_with_negative_step_reverses_string() {
    let e = slice(str_lit("abcde"), None, None, Some(int(-1)));
    assert_eq!(render_expr(e), "edcba");
}

#[test]
fn slice_bounds_select_array_subrange() {
    let e = slice(array(vec![int(1), int(2), int(3), int(4)]), Some(int(1)), Some(int(3)), None);
    let joined = filter(e, "join", vec![str_lit("")]);
    assert_eq!(render_expr(joined), "23");
}

#[test]
fn slice_roundtrip_double_reverse_is_identity() {
    let once = slice(str_lit("hello"), None, None, Some(int(-1)));
    let twice = slice(once, None, None, Some(int(-1)));
    assert_eq!(render_expr(twice), "hello");
}

#[test]
fn call_expression_invokes_native_function() {
    let env = new_env();
    env.set(
        "double",
        Value::native_fn(|args: &[Value], _env: &std::rc::Rc<Environment>| {
            Ok(Value::Integer(match args.first() {
                Some(Value::Integer(i)) => i * 2,
                _ => 0,
            }))
        }),
    );
    let e = call(id("double"), vec![int(21)]);
    let out = render_with(env, &program(vec![emit(e)])).unwrap();
    assert_eq!(out, "42");
}

#[test]
fn calling_a_non_function_fails() {
    let err = render_expr_err(call(int(1), vec![]));
    assert_eq!(err.kind(), jinja_rt::ErrorKind::NotCallable);
}

#[test]
fn call_with_keyword_arguments_appends_kwargs_value() {
    let env = new_env();
    env.set(
        "greet",
        Value::native_fn(|args: &[Value], _env: &std::rc::Rc<Environment>| match args.last() {
            Some(Value::KeywordArguments(kw)) => {
                Ok(kw.get("name").cloned().unwrap_or(Value::Undefined))
            }
            _ => Ok(Value::Undefined),
        }),
    );
    let e = call(
        id("greet"),
        vec![Expr::KeywordArgument(KeywordArgumentExpression {
            key: "name".into(),
            value: Box::new(str_lit("Ada")),
        })],
    );
    let out = render_with(env, &program(vec![emit(e)])).unwrap();
    assert_eq!(out, "Ada");
}

#[test]
fn spread_inlines_array_into_positional_arguments() {
    let env = new_env();
    env.set(
        "sum3",
        Value::native_fn(|args: &[Value], _env: &std::rc::Rc<Environment>| {
            let total: i64 = args
                .iter()
                .map(|v| match v {
                    Value::Integer(i) => *i,
                    _ => 0,
                })
                .sum();
            Ok(Value::Integer(total))
        }),
    );
    let e = call(
        id("sum3"),
        vec![Expr::Spread(SpreadExpression {
            argument: Box::new(array(vec![int(1), int(2), int(3)])),
        })],
    );
    let out = render_with(env, &program(vec![emit(e)])).unwrap();
    assert_eq!(out, "6");
}

#[test]
fn default_filter_semantics() {
    let env = new_env();
    let missing = filter(id("missing"), "default", vec![str_lit("-")]);
    assert_eq!(render_with(new_env(), &program(vec![emit(missing)])).unwrap(), "-");

    let zero_boolean = filter(
        int(0),
        "default",
        vec![
            str_lit("-"),
            Expr::KeywordArgument(KeywordArgumentExpression {
                key: "boolean".into(),
                value: Box::new(id("true")),
            }),
        ],
    );
    assert_eq!(render_with(env, &program(vec![emit(zero_boolean)])).unwrap(), "-");

    let zero_plain = filter(int(0), "default", vec![str_lit("-")]);
    assert_eq!(render(&program(vec![emit(zero_plain)])).unwrap(), "0");
}

#[test]
fn string_split_with_whitespace_and_maxsplit() {
    let e = filter(str_lit("  a  b   c  d "), "split", vec![id("none"), int(2)]);
    let joined = filter(e, "join", vec![str_lit("|")]);
    assert_eq!(render_expr(joined), "a|b|c  d ");
}

#[test]
fn tojson_round_trips_json_compatible_values() {
    let e = filter(
        array(vec![int(1), str_lit("x"), id("true"), id("none")]),
        "tojson",
        vec![],
    );
    let out = render_expr(e);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed, serde_json::json!([1, "x", true, null]));
}

#[test]
fn tojson_indents_nested_containers() {
    let obj = Expr::ObjectLiteral(vec![(str_lit("a"), int(1))]);
    let e = filter(obj, "tojson", vec![int(2)]);
    assert_eq!(render_expr(e), "{\n  \"a\": 1\n}");
}
