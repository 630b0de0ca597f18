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

//! Expression parser.
//!
//! Precedence climbing over the ladder
//! `or < and < not < comparison < term < factor < unary < exponent < call`.
//! All binary levels are left-associative except `**`, which is
//! right-associative and binds tighter than a unary minus on its left.

use crate::ast::{BinOp, Expr, ExprKind, UnaryOp};
use crate::diagnostics::CompileError;
use crate::token::TokenKind;

use super::Parser;

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_CMP: u8 = 4;
const PREC_TERM: u8 = 5;
const PREC_FACTOR: u8 = 6;

/// Maps a token to its binary operator and precedence level.
fn binop_of(kind: TokenKind) -> Option<(BinOp, u8)> {
    match kind {
        TokenKind::Or => Some((BinOp::Or, PREC_OR)),
        TokenKind::And => Some((BinOp::And, PREC_AND)),
        TokenKind::Less => Some((BinOp::Less, PREC_CMP)),
        TokenKind::Greater => Some((BinOp::Greater, PREC_CMP)),
        TokenKind::LessEqual => Some((BinOp::LessEqual, PREC_CMP)),
        TokenKind::GreaterEqual => Some((BinOp::GreaterEqual, PREC_CMP)),
        TokenKind::EqualEqual => Some((BinOp::Equal, PREC_CMP)),
        TokenKind::Plus => Some((BinOp::Add, PREC_TERM)),
        TokenKind::Minus => Some((BinOp::Sub, PREC_TERM)),
        TokenKind::Star => Some((BinOp::Mul, PREC_FACTOR)),
        TokenKind::Slash => Some((BinOp::Div, PREC_FACTOR)),
        _ => None,
    }
}

impl<'a> Parser<'a> {
    /// Top-level expression parser.
    pub(super) fn expression(&mut self) -> Result<Expr, CompileError> {
        self.binary_expr(PREC_OR)
    }

    /// Parses left-associative binary levels at or above `min_prec`.
    fn binary_expr(&mut self, min_prec: u8) -> Result<Expr, CompileError> {
        let mut left = self.unary_expr()?;
        loop {
            let Some((op, prec)) = binop_of(self.peek_kind()) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            // Left-associative fold: `a-b-c` becomes `(a-b)-c`.
            let right = self.binary_expr(prec + 1)?;
            let span = left.span.merge(&right.span);
            left = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            };
        }
        Ok(left)
    }

    /// Parses unary operators.
    fn unary_expr(&mut self) -> Result<Expr, CompileError> {
        let start = self.peek().span.clone();
        match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                // Unary minus chains (`--x`) recurse here.
                let operand = self.unary_expr()?;
                let span = start.merge(&operand.span);
                Ok(Expr {
                    kind: ExprKind::Unary {
                        op: UnaryOp::Neg,
                        operand: Box::new(operand),
                    },
                    span,
                })
            }
            TokenKind::Not => {
                self.advance();
                // `not a < b` negates the comparison, so the operand is
                // parsed at comparison precedence.
                let operand = self.binary_expr(PREC_CMP)?;
                let span = start.merge(&operand.span);
                Ok(Expr {
                    kind: ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(operand),
                    },
                    span,
                })
            }
            _ => self.power_expr(),
        }
    }

    /// Parses the right-associative `**` level.
    fn power_expr(&mut self) -> Result<Expr, CompileError> {
        let base = self.primary_expr()?;
        if self.peek_kind() == TokenKind::StarStar {
            self.advance();
            // Right-associative with a unary-capable exponent: `2**-3` and
            // `2**3**2` both parse the Python way.
            let exponent = self.unary_expr()?;
            let span = base.span.merge(&exponent.span);
            return Ok(Expr {
                kind: ExprKind::Binary {
                    op: BinOp::Pow,
                    left: Box::new(base),
                    right: Box::new(exponent),
                },
                span,
            });
        }
        Ok(base)
    }

    /// Parses expression atoms.
    fn primary_expr(&mut self) -> Result<Expr, CompileError> {
        match self.peek_kind() {
            TokenKind::Number => {
                let tok = self.advance();
                let value = self.number_value(tok)?;
                Ok(Expr {
                    kind: ExprKind::Number(value),
                    span: tok.span.clone(),
                })
            }
            TokenKind::ConstRef => {
                let tok = self.advance();
                Ok(Expr {
                    kind: ExprKind::ConstRef(tok.lexeme.clone()),
                    span: tok.span.clone(),
                })
            }
            TokenKind::Ident => {
                let tok = self.advance();
                // A name followed by `(...)` is parsed as call, otherwise
                // identifier.
                if self.peek_kind() == TokenKind::LParen {
                    let args = self.call_args()?;
                    Ok(Expr {
                        kind: ExprKind::Call {
                            name: tok.lexeme.clone(),
                            args,
                        },
                        span: tok.span.merge(&self.prev_span()),
                    })
                } else {
                    Ok(Expr {
                        kind: ExprKind::Ident(tok.lexeme.clone()),
                        span: tok.span.clone(),
                    })
                }
            }
            TokenKind::LParen => {
                let open = self.advance();
                let mut inner = self.expression()?;
                let close = self.expect(TokenKind::RParen)?;
                // Preserve the outer range for diagnostics around
                // parenthesized terms.
                inner.span = open.span.merge(&close.span);
                Ok(inner)
            }
            TokenKind::LBrace => self.vector_literal(),
            _ => Err(self.error_expected("an expression")),
        }
    }

    /// Parses `{e1, e2, ...}` vector construction.
    ///
    /// Element count is checked during resolution so the diagnostic can name
    /// the expected arity.
    fn vector_literal(&mut self) -> Result<Expr, CompileError> {
        let open = self.advance();
        let mut elements = vec![self.expression()?];
        while self.eat(TokenKind::Comma) {
            elements.push(self.expression()?);
        }
        let close = self.expect(TokenKind::RBrace)?;
        Ok(Expr {
            kind: ExprKind::VectorLit(elements),
            span: open.span.merge(&close.span),
        })
    }

    /// Parses a parenthesized argument list.
    fn call_args(&mut self) -> Result<Vec<Expr>, CompileError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.peek_kind() != TokenKind::RParen {
            loop {
                args.push(self.expression()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}
