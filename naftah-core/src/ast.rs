//! Abstract syntax tree for Naftah programs.
//!
//! Mirrors the teacher's flat, struct-variant `AstNode` enum (`libs/fhirpath/src/ast.rs`):
//! no semantic analysis is baked into the tree, every node carries just the fields its
//! grammar rule needs, and operators get their own small `Copy` enums rather than being
//! folded into a single catch-all. Naftah is statement-oriented rather than a single
//! expression grammar, so the tree splits into [`Stmt`] and [`Expr`] the way an
//! imperative-language AST normally does; the grammar itself is out of scope (§1), so this
//! is only detailed enough to drive the parser and the tree-walking evaluator of §4.F.

use crate::token::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VariableDecl {
        name: String,
        declared_type: Option<QualifiedName>,
        init: Option<Expr>,
        span: Span,
    },
    ConstantDecl {
        name: String,
        declared_type: Option<QualifiedName>,
        init: Expr,
        span: Span,
    },
    FunctionDecl {
        name: String,
        params: Vec<Param>,
        return_type: Option<QualifiedName>,
        body: Block,
        span: Span,
    },
    ImplementationDecl {
        type_name: QualifiedName,
        methods: Vec<Stmt>,
        span: Span,
    },
    ActorDecl {
        name: String,
        handlers: Vec<Stmt>,
        span: Span,
    },
    Import {
        path: QualifiedName,
        alias: Option<String>,
        span: Span,
    },
    ExprStmt {
        expr: Expr,
        span: Span,
    },
    Assign {
        target: Expr,
        value: Expr,
        span: Span,
    },
    If {
        condition: Expr,
        then_branch: Block,
        else_ifs: Vec<(Expr, Block)>,
        else_branch: Option<Block>,
        span: Span,
    },
    ForRange {
        label: Option<String>,
        variable: String,
        start: Expr,
        end: Expr,
        down: bool,
        step: Option<Expr>,
        body: Block,
        span: Span,
    },
    ForIn {
        label: Option<String>,
        variable: String,
        iterable: Expr,
        body: Block,
        span: Span,
    },
    While {
        label: Option<String>,
        condition: Expr,
        body: Block,
        span: Span,
    },
    RepeatUntil {
        label: Option<String>,
        body: Block,
        condition: Expr,
        span: Span,
    },
    Case {
        subject: Expr,
        arms: Vec<(Vec<Expr>, Block)>,
        default: Option<Block>,
        span: Span,
    },
    Break {
        label: Option<String>,
        span: Span,
    },
    Continue {
        label: Option<String>,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    Try {
        body: Block,
        /// `نجاح x { ... }`: when present, runs with `x` bound to the body's
        /// result instead of yielding that result directly (§4.F.4 "ok(x) ->
        /// block").
        ok_binding: Option<String>,
        ok_branch: Option<Block>,
        error_binding: Option<String>,
        error_branch: Block,
        span: Span,
    },
    /// The option-test form of `try` (§4.F.4 "tests whether `expr` is `None`"),
    /// distinct from the error-handling form above: `some_branch` runs with
    /// `some_binding` bound to the unwrapped non-`None` value, `none_branch` runs
    /// when the body's result is `None`.
    TryOption {
        body: Block,
        some_binding: String,
        some_branch: Block,
        none_branch: Block,
        span: Span,
    },
    ScopeBlock {
        ordered: bool,
        body: Block,
        span: Span,
    },
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub declared_type: Option<QualifiedName>,
    pub default: Option<Expr>,
}

/// A dotted/colon-qualified name, e.g. `جافا:لغة:سلسلة` (§4.D "qualified name
/// resolution").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub parts: Vec<String>,
}

impl QualifiedName {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }

    pub fn single(name: String) -> Self {
        Self { parts: vec![name] }
    }

    pub fn to_dotted(&self) -> String {
        self.parts.join(":")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NullLiteral(Span),
    NoneLiteral(Span),
    BoolLiteral(bool, Span),
    NaNLiteral(Span),
    NumberLiteral(String, Span),
    RadixLiteral { digits: String, radix: u32, span: Span },
    CharLiteral(char, Span),
    StringLiteral {
        parts: Vec<StringPart>,
        raw: bool,
        span: Span,
    },
    ByteStringLiteral(String, Span),
    TemporalLiteral {
        marker: TemporalKind,
        value: String,
        span: Span,
    },
    Identifier(String, Span),
    QualifiedAccess {
        base: Box<Expr>,
        name: String,
        span: Span,
    },
    SelfExpr(Span),
    ListLiteral {
        elements: Vec<Expr>,
        span: Span,
    },
    SetLiteral {
        elements: Vec<Expr>,
        span: Span,
    },
    MapLiteral {
        entries: Vec<(Expr, Expr)>,
        span: Span,
    },
    ObjectLiteral {
        fields: Vec<(String, Expr)>,
        span: Span,
    },
    Index {
        collection: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        overload: Option<u32>,
        args: Vec<Expr>,
        span: Span,
    },
    Member {
        receiver: Box<Expr>,
        name: String,
        optional: bool,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    InstanceOf {
        value: Box<Expr>,
        type_name: QualifiedName,
        span: Span,
    },
    TypeOf {
        value: Box<Expr>,
        span: Span,
    },
    SizeOf {
        value: Box<Expr>,
        span: Span,
    },
    PreIncrement { target: Box<Expr>, span: Span },
    PreDecrement { target: Box<Expr>, span: Span },
    PostIncrement { target: Box<Expr>, span: Span },
    PostDecrement { target: Box<Expr>, span: Span },
    Coalesce {
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    SomeWrap { value: Box<Expr>, span: Span },
    OkWrap { value: Box<Expr>, span: Span },
    ErrorWrap { value: Box<Expr>, span: Span },
    Spawn { body: Box<Expr>, span: Span },
    Await { task: Box<Expr>, span: Span },
    Send {
        actor: Box<Expr>,
        message: Box<Expr>,
        span: Span,
    },
    New {
        type_name: QualifiedName,
        args: Vec<Expr>,
        span: Span,
    },
}

/// A fragment of an interpolated string literal (§4.F.6). Only a bare identifier or a
/// `name:default` form is permitted inside `${…}`/`{…}$`; general expressions are not.
#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Literal(String),
    Interp { name: String, default: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Instant,
    Point,
    Amount,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    ElemAdd,
    ElemSub,
    ElemMul,
    ElemDiv,
    ElemMod,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Ushr,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}
