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

//! Expression lowering and the per-statement memo table.

use crate::diagnostics::CompileError;
use crate::resolve::{TypedExpr, TypedExprKind};
use crate::types::ConstValue;
use std::fmt::Write as _;

use super::{LowerContext, Value};

impl LowerContext<'_> {
    pub(super) fn lower_expr(&mut self, expr: &TypedExpr) -> Result<Value, CompileError> {
        match &expr.kind {
            TypedExprKind::Constant(value) => Ok(Value::Constant(*value)),
            TypedExprKind::Var(name) => Ok(self
                .resolve_binding(name)
                .expect("resolution checked every identifier")),
            TypedExprKind::Call { .. } => {
                let key = memo_key(expr);
                if let Some(hit) = self.memo.get(&key) {
                    return Ok(hit.clone());
                }
                let value = self.lower_call(expr)?;
                self.memo.insert(key, value.clone());
                Ok(value)
            }
        }
    }
}

/// Structural identity of a typed subexpression.
///
/// Two subexpressions with equal keys compute the same value within one
/// statement, so the second lowering reuses the first node.
fn memo_key(expr: &TypedExpr) -> String {
    let mut key = String::new();
    write_memo_key(&mut key, expr);
    key
}

fn write_memo_key(out: &mut String, expr: &TypedExpr) {
    match &expr.kind {
        TypedExprKind::Constant(ConstValue::Float(v)) => {
            let _ = write!(out, "f{:016x}", v.to_bits());
        }
        TypedExprKind::Constant(ConstValue::Vector(v)) => {
            let _ = write!(
                out,
                "v{:016x}{:016x}{:016x}",
                v.x.to_bits(),
                v.y.to_bits(),
                v.z.to_bits()
            );
        }
        TypedExprKind::Var(name) => {
            let _ = write!(out, "n:{name};");
        }
        TypedExprKind::Call {
            signature, args, ..
        } => {
            let _ = write!(out, "c:{}/{}(", signature.name, args.len());
            for arg in args {
                write_memo_key(out, arg);
                out.push(',');
            }
            out.push(')');
        }
    }
}
