//! Owned syntax tree for the language.
//!
//! ## Architecture
//!
//! - **Ownership**: every node owns its children (`Box`/`Vec`/`SmallVec`);
//!   there is no sharing and no arena. The parser builds nodes bottom-up and
//!   never touches them again after returning them.
//! - **Span tracking**: nodes are wrapped in `Spanned<T>`, which records the
//!   byte span and the line/column of the node's first token.
//! - **Closed variant sets**: `Stmt`, `Expr` and `Type` are plain enums so
//!   consumers can match exhaustively.
//!
//! This module models syntax only. Arity of multi-assignments, whether a
//! condition is boolean, and whether `_` is used as a value are all left to
//! later stages.

use std::fmt;

use smallvec::SmallVec;

pub use crate::error::{Pos, Span};

// =============================================================================
// Core Types
// =============================================================================

/// Wrapper that associates an AST node with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    /// The actual AST node.
    pub node: T,
    /// Bytes covered by the node.
    pub span: Span,
    /// Position of the node's first token.
    pub pos: Pos,
}

impl<T> Spanned<T> {
    #[inline]
    pub fn new(node: T, span: Span, pos: Pos) -> Self {
        Self { node, span, pos }
    }
}

/// Identifier name. `_` is the blank identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(pub String);

impl Ident {
    pub const BLANK: &'static str = "_";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the reserved blank identifier `_`.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.0 == Self::BLANK
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Small inline list used for expression lists (assignment sides, returns).
pub type ExprList = SmallVec<[Spanned<Expr>; 2]>;

// =============================================================================
// Declarations
// =============================================================================

/// A whole source unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Name from an optional leading `package` clause.
    pub package: Option<Spanned<Ident>>,
    pub funcs: Vec<Spanned<FuncDecl>>,
}

/// `func name(params) results { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Spanned<Ident>,
    pub params: Vec<Spanned<Param>>,
    /// Zero, one or many result types.
    pub results: Vec<Spanned<Type>>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Spanned<Ident>,
    pub typ: Spanned<Type>,
}

/// Primitive type names. Never inferred at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float64,
    String,
}

impl Type {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Type::Int),
            "float64" => Some(Type::Float64),
            "string" => Some(Type::String),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float64 => "float64",
            Type::String => "string",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Statements
// =============================================================================

/// `{ stmts }`. Always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
    /// From `{` through `}`.
    pub span: Span,
    /// Position of `{`.
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression evaluated for its effect, typically a call.
    Expr(Spanned<Expr>),

    /// `targets := values` or `targets = values`.
    Assign(AssignStmt),

    If(IfStmt),

    For(ForStmt),

    /// `return` with zero or more values.
    Return(ExprList),

    /// A lone terminator.
    Empty,
}

/// Assignment or short declaration. Target and value counts are parsed
/// independently.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    /// Identifiers (possibly `_`), each wrapped as `Expr::Ident`.
    pub targets: ExprList,
    pub op: AssignOp,
    pub values: ExprList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// Short variable declaration (`:=`).
    Declare,
    /// Plain assignment (`=`).
    Assign,
}

impl AssignOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            AssignOp::Declare => ":=",
            AssignOp::Assign => "=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Spanned<Expr>,
    pub then_block: Block,
    pub otherwise: Option<Else>,
}

/// Tail of an `if`: `else { ... }` or `else if ...`.
#[derive(Debug, Clone, PartialEq)]
pub enum Else {
    Block(Block),
    If(Box<Spanned<IfStmt>>),
}

impl Else {
    /// `else { if ... }` with nothing else in the braces is the same chain
    /// as `else if ...` and is stored that way.
    pub fn from_block(mut block: Block) -> Self {
        if let [Spanned {
            node: Stmt::If(_), ..
        }] = block.stmts.as_slice()
        {
            if let Some(Spanned {
                node: Stmt::If(nested),
                span,
                pos,
            }) = block.stmts.pop()
            {
                return Else::If(Box::new(Spanned::new(nested, span, pos)));
            }
        }
        Else::Block(block)
    }
}

/// Three-clause loop. Each clause is independently optional; a missing
/// condition means "always true".
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Spanned<Stmt>>>,
    pub cond: Option<Spanned<Expr>>,
    pub post: Option<Box<Spanned<Stmt>>>,
    pub body: Block,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    IntLit(i64),
    FloatLit(f64),
    /// Decoded string contents.
    StringLit(String),
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Spanned<Expr>>,
        right: Box<Spanned<Expr>>,
    },
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
}

impl Expr {
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `^x` (bitwise complement)
    Compl,
}

impl UnaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::Compl => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    LOr,
    LAnd,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Binding power, lowest first. All levels associate left.
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOp::LOr => 1,
            BinaryOp::LAnd => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOp::LOr => "||",
            BinaryOp::LAnd => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
