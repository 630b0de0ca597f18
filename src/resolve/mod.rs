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

//! Type checking and overload resolution.
//!
//! Rewrites the parsed AST into a typed AST: every expression gets an
//! [`ExprType`], every call site an exact [`FunctionSignature`]. Operators
//! and vector literals are rewritten into calls against builtin names here,
//! so one lookup path decides everything.

mod expr;

use crate::ast::{FnKind, FunctionDef, SourceSpan, Stmt, StmtKind};
use crate::diagnostics::{CompileError, ErrorKind, SourceDocument};
use crate::registry::FunctionRegistry;
use crate::types::{
    ConstValue, ExprType, FunctionSignature, OutputSig, ParamSig, ValueType,
};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Typed expression node variants.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypedExprKind {
    /// Literal or resolved `#name` constant.
    Constant(ConstValue),
    /// Reference to a bound local or parameter.
    Var(String),
    /// Resolved call. Operators and vector literals end up here too.
    Call {
        /// The chosen overload.
        signature: Rc<FunctionSignature>,
        /// Primitive node tag, or `None` for user/prelude functions.
        builtin: Option<&'static str>,
        /// Typed arguments in order.
        args: Vec<TypedExpr>,
    },
}

/// Typed, spanned expression node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: ExprType,
    pub span: SourceSpan,
}

/// Typed statement.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TypedStmt {
    /// Assignment; `None` targets are `_` skips. Target count equals the
    /// value arity.
    Assign {
        targets: Vec<Option<String>>,
        value: TypedExpr,
    },
    /// `out name = value`.
    Output {
        name: String,
        value: TypedExpr,
        span: SourceSpan,
    },
    /// Bare expression statement.
    Expr(TypedExpr),
}

/// A fully resolved function body, ready for lowering.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TypedFunction {
    /// Interface registered for this declaration.
    pub signature: Rc<FunctionSignature>,
    /// Typed body statements.
    pub body: Vec<TypedStmt>,
    /// Document the body came from, for lowering-time diagnostics.
    pub doc: Rc<SourceDocument>,
}

/// Builds the callable interface of a declaration.
pub(crate) fn signature_of(def: &FunctionDef) -> FunctionSignature {
    FunctionSignature {
        name: def.name.clone(),
        params: def
            .params
            .iter()
            .map(|p| ParamSig {
                name: p.name.clone(),
                ty: ValueType::from(p.ty),
                default: p.default,
            })
            .collect(),
        outputs: def
            .outputs
            .iter()
            .map(|o| OutputSig {
                name: o.name.clone(),
                ty: ValueType::from(o.ty),
            })
            .collect(),
        is_macro: def.kind == FnKind::Macro,
    }
}

/// Single-body resolution pass.
///
/// One resolver is created per function body or per top-level statement
/// list; the scope starts from the parameters (if any) and grows with
/// assignments.
pub(crate) struct Resolver<'a> {
    registry: &'a FunctionRegistry,
    constants: &'a HashMap<String, ConstValue>,
    doc: Rc<SourceDocument>,
    scope: HashMap<String, ValueType>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        registry: &'a FunctionRegistry,
        constants: &'a HashMap<String, ConstValue>,
        doc: Rc<SourceDocument>,
    ) -> Self {
        Self {
            registry,
            constants,
            doc,
            scope: HashMap::new(),
        }
    }

    pub(super) fn lookup_binding(&self, name: &str) -> Option<ValueType> {
        self.scope.get(name).copied()
    }

    pub(super) fn lookup_constant(&self, name: &str) -> Option<ConstValue> {
        self.constants.get(name).copied()
    }

    pub(super) fn registry(&self) -> &FunctionRegistry {
        self.registry
    }

    /// Creates a source-mapped compile error.
    pub(super) fn error_at(
        &self,
        kind: ErrorKind,
        message: impl Into<String>,
        span: &SourceSpan,
    ) -> CompileError {
        CompileError::at(kind, message, &self.doc, span)
    }

    /// Resolves a declaration body against its registered signature.
    ///
    /// Each declared output must be `out`-assigned exactly once, with a
    /// matching type.
    pub(crate) fn resolve_function(
        mut self,
        def: &FunctionDef,
        signature: Rc<FunctionSignature>,
    ) -> Result<TypedFunction, CompileError> {
        for param in &signature.params {
            self.scope.insert(param.name.clone(), param.ty);
        }

        let mut assigned = vec![false; signature.outputs.len()];
        let mut body = Vec::with_capacity(def.body.len());
        for stmt in &def.body {
            let typed = self.resolve_stmt(stmt)?;
            if let TypedStmt::Output { name, value, span } = &typed {
                let Some(index) = signature.outputs.iter().position(|o| &o.name == name) else {
                    return Err(self.error_at(
                        ErrorKind::UnresolvedReference,
                        format!("`{}` declares no output named `{name}`", signature.name),
                        span,
                    ));
                };
                let expected = signature.outputs[index].ty;
                if value.ty != ExprType::Value(expected) {
                    return Err(self.error_at(
                        ErrorKind::TypeMismatch,
                        format!("Output `{name}` expects {expected}, got {}", value.ty),
                        span,
                    ));
                }
                if assigned[index] {
                    return Err(self.error_at(
                        ErrorKind::DuplicateOutput,
                        format!("Output `{name}` is assigned more than once"),
                        span,
                    ));
                }
                assigned[index] = true;
            }
            body.push(typed);
        }

        for (output, assigned) in signature.outputs.iter().zip(&assigned) {
            if !assigned {
                return Err(self.error_at(
                    ErrorKind::MissingOutput,
                    format!(
                        "`{}` never assigns its output `{}`",
                        signature.name, output.name
                    ),
                    &def.span,
                ));
            }
        }

        Ok(TypedFunction {
            signature,
            body,
            doc: self.doc,
        })
    }

    /// Resolves the top-level statements of a formula.
    ///
    /// `out` names must be unique; bare expression statements are legal and
    /// become anonymous graph outputs during lowering.
    pub(crate) fn resolve_statements(
        mut self,
        stmts: &[Stmt],
    ) -> Result<Vec<TypedStmt>, CompileError> {
        let mut named = HashSet::new();
        let mut body = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let typed = self.resolve_stmt(stmt)?;
            if let TypedStmt::Output { name, value, span } = &typed {
                if value.ty.as_value().is_none() {
                    return Err(self.error_at(
                        ErrorKind::TypeMismatch,
                        format!(
                            "Output `{name}` cannot bind a multi-output value of type {}",
                            value.ty
                        ),
                        span,
                    ));
                }
                if !named.insert(name.clone()) {
                    return Err(self.error_at(
                        ErrorKind::DuplicateOutput,
                        format!("Graph output `{name}` is declared more than once"),
                        span,
                    ));
                }
            }
            body.push(typed);
        }
        Ok(body)
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<TypedStmt, CompileError> {
        match &stmt.kind {
            StmtKind::Assign { targets, value } => {
                let value = self.resolve_expr(value)?;
                if targets.len() != value.ty.arity() {
                    return Err(self.error_at(
                        ErrorKind::ArityMismatch,
                        format!(
                            "Cannot assign a value of type {} to {} target{}",
                            value.ty,
                            targets.len(),
                            if targets.len() == 1 { "" } else { "s" }
                        ),
                        &stmt.span,
                    ));
                }
                let component_types = match &value.ty {
                    ExprType::Value(ty) => vec![*ty],
                    ExprType::Tuple(types) => types.clone(),
                };
                let mut names = Vec::with_capacity(targets.len());
                for (target, ty) in targets.iter().zip(component_types) {
                    if let Some(name) = &target.name {
                        self.scope.insert(name.clone(), ty);
                    }
                    names.push(target.name.clone());
                }
                Ok(TypedStmt::Assign {
                    targets: names,
                    value,
                })
            }
            StmtKind::Output { name, value } => {
                let value = self.resolve_expr(value)?;
                Ok(TypedStmt::Output {
                    name: name.clone(),
                    value,
                    span: stmt.span.clone(),
                })
            }
            StmtKind::Expr(value) => Ok(TypedStmt::Expr(self.resolve_expr(value)?)),
        }
    }
}
