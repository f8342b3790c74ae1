//! The AST contract consumed by the evaluator.
//!
//! Producing this tree (lexing and parsing template source) is out of scope
//! for this crate (§1); this module only defines the node shapes §6
//! specifies so that a parser living elsewhere can hand the evaluator a
//! finished program.

/// A full template program: a flat sequence of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `{{ expr }}` and bare literal text both end up here: `Program`/`If`/
    /// `For` bodies are themselves `Vec<Stmt>`, and literal text is modeled
    /// as an `Expr::StringLiteral` wrapped in an `Emit`.
    Emit(Expr),
    /// A `{# ... #}` comment. Evaluates to nothing.
    Comment,
    Set(SetStatement),
    If(If),
    For(For),
    Macro(Macro),
    Call(CallStatement),
    Filter(FilterStatement),
    Break,
    Continue,
}

/// `{% set ... = ... %}` / `{% set ... %}...{% endset %}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetStatement {
    pub assignee: Expr,
    /// `None` when the set-block form (`{% set x %}...{% endset %}`) is used;
    /// in that case `body` supplies the rendered value instead.
    pub value: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub test: Expr,
    pub body: Vec<Stmt>,
    /// `elif`/`else` chain, represented as a nested single-element `If`
    /// (for `elif`) or a plain body (for a terminal `else`).
    pub alternate: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct For {
    /// `Identifier` or `TupleLiteral` (destructuring).
    pub loop_var: Expr,
    /// Either a plain iterable expression, or a `SelectExpression` whose
    /// `test` filters candidates before iteration (`for x in xs if cond`).
    pub iterable: Expr,
    pub body: Vec<Stmt>,
    /// `{% else %}` block, rendered when the iterable yields zero items.
    pub default_block: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    pub args: Vec<MacroParam>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroParam {
    pub name: String,
    pub default: Option<Expr>,
}

/// `{% call macro(args) %} body {% endcall %}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStatement {
    pub call: CallExpression,
    /// Parameters the `{% call %}` block itself declares, bound from the
    /// target macro's invocation of `caller(...)`.
    pub caller_args: Vec<MacroParam>,
    pub body: Vec<Stmt>,
}

/// `{% filter name %} body {% endfilter %}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStatement {
    pub filter: Box<Expr>,
    pub body: Vec<Stmt>,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    ArrayLiteral(Vec<Expr>),
    TupleLiteral(Vec<Expr>),
    ObjectLiteral(Vec<(Expr, Expr)>),
    Identifier(String),
    Member(MemberExpression),
    Call(CallExpression),
    Binary(BinaryExpression),
    Unary(UnaryExpression),
    Filter(FilterExpression),
    Test(TestExpression),
    Select(SelectExpression),
    Ternary(Ternary),
    Slice(SliceExpression),
    KeywordArgument(KeywordArgumentExpression),
    Spread(SpreadExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub object: Box<Expr>,
    pub property: Box<Expr>,
    /// `true` for `obj[prop]`, `false` for `obj.prop` (property is then
    /// required to be an `Identifier` used as a literal name).
    pub computed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

/// `operator.value` holds the textual operator (`"+"`, `"and"`, `"in"`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub value: String,
}

impl Operator {
    pub fn new(value: impl Into<String>) -> Self {
        Operator {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: Operator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: Operator,
    pub argument: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    pub operand: Box<Expr>,
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestExpression {
    pub operand: Box<Expr>,
    pub name: String,
    pub args: Vec<Expr>,
    pub negate: bool,
}

/// `A if C` (no `else`): yields `A` if `C` is truthy, else `Undefined`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectExpression {
    pub consequent: Box<Expr>,
    pub test: Box<Expr>,
}

/// `A if C else B`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ternary {
    pub test: Box<Expr>,
    pub consequent: Box<Expr>,
    pub alternate: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpression {
    pub object: Box<Expr>,
    pub start: Option<Box<Expr>>,
    pub stop: Option<Box<Expr>>,
    pub step: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordArgumentExpression {
    pub key: String,
    pub value: Box<Expr>,
}

/// `*seq` in a call's argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadExpression {
    pub argument: Box<Expr>,
}
