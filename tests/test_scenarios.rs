//! The worked scenarios, verbatim (§8).

mod common;

use similar_asserts::assert_eq;

use jinja_rt::ast::*;
use jinja_rt::value::Value;

use common::*;

#[test]
fn scenario_1_truthy_and_or() {
    assert_eq!(render(&program(vec![emit(binary("or", int(0), str_lit("x")))])).unwrap(), "x");
    assert_eq!(
        render(&program(vec![emit(binary("or", array(vec![]), str_lit("x")))])).unwrap(),
        "x"
    );
    assert_eq!(
        render(&program(vec![emit(binary("and", str_lit("y"), str_lit("z")))])).unwrap(),
        "z"
    );
}

#[test]
fn scenario_2_for_with_else() {
    let make = |items: Vec<Expr>| {
        program(vec![Stmt::For(For {
            loop_var: id("x"),
            iterable: array(items),
            body: vec![emit(id("x"))],
            default_block: vec![text("none")],
        })])
    };
    assert_eq!(render(&make(vec![])).unwrap(), "none");
    assert_eq!(render(&make(vec![int(1), int(2)])).unwrap(), "12");
}

#[test]
fn scenario_3_macro_defaults_and_caller() {
    let prog = program(vec![
        Stmt::Macro(Macro {
            name: "m".into(),
            args: vec![
                MacroParam { name: "a".into(), default: None },
                MacroParam { name: "b".into(), default: Some(int(2)) },
            ],
            body: vec![
                emit(id("a")),
                emit(str_lit("-")),
                emit(id("b")),
                emit(str_lit("-")),
                emit(call(id("caller"), vec![])),
            ],
        }),
        Stmt::Call(CallStatement {
            call: CallExpression {
                callee: Box::new(id("m")),
                args: vec![int(1)],
            },
            caller_args: vec![],
            body: vec![text("hi")],
        }),
    ]);
    assert_eq!(render(&prog).unwrap(), "1-2-hi");
}

#[test]
fn scenario_4_slice_with_negative_step() {
    let reversed_string = slice(str_lit("abcde"), None, None, Some(int(-1)));
    assert_eq!(render(&program(vec![emit(reversed_string)])).unwrap(), "edcba");

    let sub = slice(array(vec![int(1), int(2), int(3), int(4)]), Some(int(1)), Some(int(3)), None);
    let joined = filter(sub, "join", vec![str_lit("")]);
    assert_eq!(render(&program(vec![emit(joined)])).unwrap(), "23");
}

#[test]
fn scenario_5_destructuring_for() {
    let prog = program(vec![Stmt::For(For {
        loop_var: tuple(vec![id("k"), id("v")]),
        iterable: array(vec![
            array(vec![str_lit("a"), int(1)]),
            array(vec![str_lit("b"), int(2)]),
        ]),
        body: vec![emit(id("k")), emit(str_lit("=")), emit(id("v")), emit(str_lit(";"))],
        default_block: vec![],
    })]);
    assert_eq!(render(&prog).unwrap(), "a=1;b=2;");
}

#[test]
fn scenario_6_default_filter() {
    assert_eq!(
        render(&program(vec![emit(filter(id("missing"), "default", vec![str_lit("-")]))])).unwrap(),
        "-"
    );

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
    assert_eq!(render(&program(vec![emit(zero_boolean)])).unwrap(), "-");

    let zero_plain = filter(int(0), "default", vec![str_lit("-")]);
    assert_eq!(render(&program(vec![emit(zero_plain)])).unwrap(), "0");
}

#[test]
fn invariant_array_concat_length_is_sum_of_operands() {
    let e = binary("+", array(vec![int(1), int(2)]), array(vec![int(3), int(4), int(5)]));
    let len = filter(e, "length", vec![]);
    assert_eq!(render(&program(vec![emit(len)])).unwrap(), "5");
}

#[test]
fn invariant_reverse_is_its_own_inverse() {
    let a = array(vec![int(1), int(2), int(3)]);
    let twice = filter(filter(a, "reverse", vec![]), "reverse", vec![]);
    let joined = filter(twice, "join", vec![str_lit(",")]);
    assert_eq!(render(&program(vec![emit(joined)])).unwrap(), "1,2,3");
}

#[test]
fn invariant_unique_is_idempotent() {
    let a = array(vec![int(1), int(1), int(2), int(3), int(3)]);
    let once = filter(a, "unique", vec![]);
    let twice = filter(once.clone(), "unique", vec![]);
    let env = new_env();
    let once_out = render_with(env.clone(), &program(vec![emit(filter(once, "join", vec![str_lit(",")]))])).unwrap();
    let twice_out = render_with(env, &program(vec![emit(filter(twice, "join", vec![str_lit(",")]))])).unwrap();
    assert_eq!(once_out, twice_out);
    assert_eq!(once_out, "1,2,3");
}

#[test]
fn invariant_tojson_round_trips_json_compatible_leaves() {
    let mut ctx = new_env();
    ctx.set(
        "value",
        Value::from(serde_json::json!({"a": 1, "b": [true, null, "s"]})),
    );
    let e = filter(id("value"), "tojson", vec![]);
    let out = render_with(ctx, &program(vec![emit(e)])).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed, serde_json::json!({"a": 1, "b": [true, null, "s"]}));
}
