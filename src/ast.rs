/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! AST definitions for the formula language with precise source spans.
//!
//! The parser creates this AST first. A later resolution phase type-checks it,
//! picks overloads, and rewrites operators into builtin calls before lowering
//! to a node graph.

use nom_locate::LocatedSpan;

/// Lexer input span type carrying byte offsets and line/column info.
pub type Span<'a> = LocatedSpan<&'a str>;

/// Source range and anchor position for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based UTF-8 column.
    pub column: usize,
}

impl SourceSpan {
    /// Creates a source span from lexer start/end positions.
    pub fn from_bounds(start: Span<'_>, end: Span<'_>) -> Self {
        Self {
            start: start.location_offset(),
            end: end.location_offset(),
            line: start.location_line() as usize,
            column: start.get_utf8_column(),
        }
    }

    /// Returns span length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns a span that starts at `self` and ends at `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }
}

/// User-facing value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    /// Scalar (`f64`) value; `float` in source.
    Float,
    /// 3D vector; `vector` in source.
    Vector,
}

impl TypeName {
    /// Source keyword for this type.
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeName::Float => "float",
            TypeName::Vector => "vector",
        }
    }
}

/// Binary operators before rewriting into builtin calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition (`+`).
    Add,
    /// Subtraction (`-`).
    Sub,
    /// Multiplication (`*`).
    Mul,
    /// Division (`/`).
    Div,
    /// Exponentiation (`**`).
    Pow,
    /// Less than (`<`).
    Less,
    /// Greater than (`>`).
    Greater,
    /// Less than or equal (`<=`).
    LessEqual,
    /// Greater than or equal (`>=`).
    GreaterEqual,
    /// Equality (`==`).
    Equal,
    /// Logical conjunction (`and`).
    And,
    /// Logical disjunction (`or`).
    Or,
}

impl BinOp {
    /// Builtin function name the operator rewrites to.
    pub fn builtin_name(&self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::Pow => "power",
            BinOp::Less => "less_than",
            BinOp::Greater => "greater_than",
            BinOp::LessEqual => "less_equal",
            BinOp::GreaterEqual => "greater_equal",
            BinOp::Equal => "equal",
            BinOp::And => "_and",
            BinOp::Or => "_or",
        }
    }
}

/// Unary operators before rewriting into builtin calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-`).
    Neg,
    /// Logical negation (`not`).
    Not,
}

impl UnaryOp {
    /// Builtin function name the operator rewrites to.
    pub fn builtin_name(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "_not",
        }
    }
}

/// Expression node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal.
    Number(f64),
    /// Identifier reference.
    Ident(String),
    /// Named constant reference (`#pi`).
    ConstRef(String),
    /// Vector literal (`{a, b, c}`).
    VectorLit(Vec<Expr>),
    /// Unary operation.
    Unary {
        /// Operator kind.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator kind.
        op: BinOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Function call.
    Call {
        /// Function name.
        name: String,
        /// Call arguments.
        args: Vec<Expr>,
    },
}

/// Spanned expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// Expression payload.
    pub kind: ExprKind,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}

/// One target of an assignment; `None` name means a `_` skip.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignTarget {
    /// Bound name, or `None` for `_`.
    pub name: Option<String>,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Assignment (`x = e` or destructuring `x, _, z = e`).
    Assign {
        /// Assignment targets, left to right.
        targets: Vec<AssignTarget>,
        /// Assigned value.
        value: Expr,
    },
    /// Output binding inside a function body (`out name = e`).
    Output {
        /// Declared output name.
        name: String,
        /// Output value.
        value: Expr,
    },
    /// Bare expression evaluated for its graph effects.
    Expr(Expr),
}

/// Spanned statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// Statement payload.
    pub kind: StmtKind,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}

/// Function parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: TypeName,
    /// Optional default value literal.
    pub default: Option<f64>,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}

/// Declared function output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDecl {
    /// Output name.
    pub name: String,
    /// Output type.
    pub ty: TypeName,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}

/// How a function is expanded at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnKind {
    /// `fn`: compiled once into a reusable node group, instanced per call.
    Group,
    /// `ng`: inlined into the caller's graph at every call site.
    Macro,
}

/// User-defined function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// Expansion strategy.
    pub kind: FnKind,
    /// Function name.
    pub name: String,
    /// Typed parameter list.
    pub params: Vec<Param>,
    /// Declared outputs.
    pub outputs: Vec<OutputDecl>,
    /// Function body statements.
    pub body: Vec<Stmt>,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}

/// Full parsed source unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Function declarations in source order.
    pub functions: Vec<FunctionDef>,
    /// Top-level statements in source order.
    pub statements: Vec<Stmt>,
}
