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

//! Expression resolution and the operator-to-call rewrite.

use crate::ast::{Expr, ExprKind, SourceSpan};
use crate::diagnostics::{CompileError, ErrorKind};
use crate::registry::LookupError;
use crate::types::{ConstValue, ExprType, ValueType};
use std::rc::Rc;

use super::{Resolver, TypedExpr, TypedExprKind};

impl Resolver<'_> {
    pub(super) fn resolve_expr(&mut self, expr: &Expr) -> Result<TypedExpr, CompileError> {
        match &expr.kind {
            ExprKind::Number(value) => Ok(TypedExpr {
                kind: TypedExprKind::Constant(ConstValue::Float(*value)),
                ty: ExprType::Value(ValueType::Float),
                span: expr.span.clone(),
            }),
            ExprKind::ConstRef(name) => {
                let Some(value) = self.lookup_constant(name) else {
                    return Err(self.error_at(
                        ErrorKind::UnknownConstant,
                        format!("Unknown constant `#{name}`"),
                        &expr.span,
                    ));
                };
                Ok(TypedExpr {
                    ty: ExprType::Value(value.value_type()),
                    kind: TypedExprKind::Constant(value),
                    span: expr.span.clone(),
                })
            }
            ExprKind::Ident(name) => {
                let Some(ty) = self.lookup_binding(name) else {
                    return Err(self.error_at(
                        ErrorKind::UnresolvedReference,
                        format!("Unknown identifier `{name}`"),
                        &expr.span,
                    ));
                };
                Ok(TypedExpr {
                    kind: TypedExprKind::Var(name.clone()),
                    ty: ExprType::Value(ty),
                    span: expr.span.clone(),
                })
            }
            ExprKind::VectorLit(elements) => {
                if elements.len() != 3 {
                    return Err(self.error_at(
                        ErrorKind::Arity,
                        format!(
                            "Vector literal takes exactly 3 elements, found {}",
                            elements.len()
                        ),
                        &expr.span,
                    ));
                }
                let mut args = Vec::with_capacity(3);
                for element in elements {
                    let arg = self.resolve_expr(element)?;
                    if self.single_type(&arg)? != ValueType::Float {
                        return Err(self.error_at(
                            ErrorKind::TypeMismatch,
                            format!("Vector literal elements must be float, got {}", arg.ty),
                            &arg.span,
                        ));
                    }
                    args.push(arg);
                }
                // `{x, y, z}` is sugar for `combine(x, y, z)`.
                self.resolve_call("combine", args, &expr.span)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.resolve_expr(operand)?;
                self.resolve_call(op.builtin_name(), vec![operand], &expr.span)
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.resolve_expr(left)?;
                let right = self.resolve_expr(right)?;
                self.resolve_call(op.builtin_name(), vec![left, right], &expr.span)
            }
            ExprKind::Call { name, args } => {
                let mut typed = Vec::with_capacity(args.len());
                for arg in args {
                    typed.push(self.resolve_expr(arg)?);
                }
                self.resolve_call(name, typed, &expr.span)
            }
        }
    }

    /// Resolves one call site through exact-match overload lookup.
    fn resolve_call(
        &mut self,
        name: &str,
        args: Vec<TypedExpr>,
        span: &SourceSpan,
    ) -> Result<TypedExpr, CompileError> {
        let mut arg_types = Vec::with_capacity(args.len());
        for arg in &args {
            arg_types.push(self.single_type(arg)?);
        }

        match self.registry().lookup(name, &arg_types) {
            Ok(entry) => Ok(TypedExpr {
                ty: entry.signature.result_type(),
                kind: TypedExprKind::Call {
                    signature: Rc::clone(&entry.signature),
                    builtin: entry.builtin,
                    args,
                },
                span: span.clone(),
            }),
            Err(LookupError::NoMatch) => {
                let candidates = self.registry().candidates(name);
                let mut message = if candidates.is_empty() {
                    format!("Unknown function `{name}`")
                } else {
                    let types = arg_types
                        .iter()
                        .map(|ty| ty.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("No overload of `{name}` matches arguments ({types})")
                };
                for candidate in candidates {
                    message.push_str("\n  candidate: ");
                    message.push_str(&candidate);
                }
                Err(self.error_at(ErrorKind::NoMatch, message, span))
            }
            Err(LookupError::Ambiguous) => Err(self.error_at(
                ErrorKind::AmbiguousMatch,
                format!("Ambiguous call to `{name}`: more than one overload matches"),
                span,
            )),
        }
    }

    /// Requires a single (non-tuple) value and returns its type.
    fn single_type(&self, expr: &TypedExpr) -> Result<ValueType, CompileError> {
        expr.ty.as_value().ok_or_else(|| {
            self.error_at(
                ErrorKind::TypeMismatch,
                format!("A multi-output value of type {} cannot be used here", expr.ty),
                &expr.span,
            )
        })
    }
}
