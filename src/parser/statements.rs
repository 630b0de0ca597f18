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

//! Statement and declaration parsers.

use crate::ast::{
    AssignTarget, FnKind, FunctionDef, OutputDecl, Param, Stmt, StmtKind, TypeName,
};
use crate::diagnostics::CompileError;
use crate::token::TokenKind;

use super::Parser;

impl<'a> Parser<'a> {
    /// Parses one statement, consuming any trailing semicolons.
    pub(super) fn statement(&mut self) -> Result<Stmt, CompileError> {
        let stmt = if self.peek_kind() == TokenKind::Out {
            self.output_stmt()?
        } else if self.is_assignment_start() {
            self.assignment()?
        } else {
            let value = self.expression()?;
            let span = value.span.clone();
            Stmt {
                kind: StmtKind::Expr(value),
                span,
            }
        };
        while self.eat(TokenKind::Semicolon) {}
        Ok(stmt)
    }

    /// Looks ahead for `target (, target)* =` without consuming tokens.
    fn is_assignment_start(&self) -> bool {
        let mut n = 0;
        loop {
            match self.nth_kind(n) {
                TokenKind::Ident | TokenKind::Underscore => {}
                _ => return false,
            }
            match self.nth_kind(n + 1) {
                TokenKind::Assign => return true,
                TokenKind::Comma => n += 2,
                _ => return false,
            }
        }
    }

    /// Parses `out name = expr`.
    fn output_stmt(&mut self) -> Result<Stmt, CompileError> {
        let out_tok = self.expect(TokenKind::Out)?;
        let name_tok = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::Assign)?;
        let value = self.expression()?;
        let span = out_tok.span.merge(&value.span);
        Ok(Stmt {
            kind: StmtKind::Output {
                name: name_tok.lexeme.clone(),
                value,
            },
            span,
        })
    }

    /// Parses `t1, t2, ... = expr` where targets are names or `_`.
    fn assignment(&mut self) -> Result<Stmt, CompileError> {
        let mut targets = Vec::new();
        loop {
            // `is_assignment_start` guarantees an identifier or `_` here.
            let tok = self.advance();
            let name = match tok.kind {
                TokenKind::Ident => Some(tok.lexeme.clone()),
                _ => None,
            };
            targets.push(AssignTarget {
                name,
                span: tok.span.clone(),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Assign)?;
        let value = self.expression()?;
        let span = targets[0].span.merge(&value.span);
        Ok(Stmt {
            kind: StmtKind::Assign { targets, value },
            span,
        })
    }

    /// Parses a full `fn`/`ng` declaration with its body.
    pub(super) fn function_def(&mut self) -> Result<FunctionDef, CompileError> {
        let kw = self.advance();
        let kind = match kw.kind {
            TokenKind::Fn => FnKind::Group,
            _ => FnKind::Macro,
        };
        let name_tok = self.expect(TokenKind::Ident)?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if self.peek_kind() != TokenKind::RParen {
            loop {
                params.push(self.param()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        self.expect(TokenKind::Arrow)?;
        let mut outputs = vec![self.output_decl()?];
        while self.eat(TokenKind::Comma) {
            outputs.push(self.output_decl()?);
        }

        // Duplicate interface names are rejected up front; later phases key
        // scopes and output slots by name.
        for (i, param) in params.iter().enumerate() {
            if params[..i].iter().any(|p| p.name == param.name) {
                return Err(self.error_at(
                    &param.span,
                    format!("Syntax error: duplicate parameter name `{}`", param.name),
                ));
            }
        }
        for (i, output) in outputs.iter().enumerate() {
            if outputs[..i].iter().any(|o| o.name == output.name) {
                return Err(self.error_at(
                    &output.span,
                    format!("Syntax error: duplicate output name `{}`", output.name),
                ));
            }
        }

        self.expect(TokenKind::LBrace)?;
        let mut body = Vec::new();
        loop {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            match self.peek_kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.error_expected("`}`")),
                _ => body.push(self.statement()?),
            }
        }
        let close = self.expect(TokenKind::RBrace)?;

        Ok(FunctionDef {
            kind,
            name: name_tok.lexeme.clone(),
            params,
            outputs,
            body,
            span: kw.span.merge(&close.span),
        })
    }

    /// Parses `name : type` with an optional `= literal` default.
    fn param(&mut self) -> Result<Param, CompileError> {
        let name_tok = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::Colon)?;
        let ty = self.type_name()?;
        let default = if self.eat(TokenKind::Assign) {
            Some(self.numeric_default()?)
        } else {
            None
        };
        Ok(Param {
            name: name_tok.lexeme.clone(),
            ty,
            default,
            span: name_tok.span.merge(&self.prev_span()),
        })
    }

    /// Parses `name : type`.
    fn output_decl(&mut self) -> Result<OutputDecl, CompileError> {
        let name_tok = self.expect(TokenKind::Ident)?;
        self.expect(TokenKind::Colon)?;
        let ty = self.type_name()?;
        Ok(OutputDecl {
            name: name_tok.lexeme.clone(),
            ty,
            span: name_tok.span.merge(&self.prev_span()),
        })
    }

    /// Parses a type keyword.
    fn type_name(&mut self) -> Result<TypeName, CompileError> {
        match self.peek_kind() {
            TokenKind::Float => {
                self.advance();
                Ok(TypeName::Float)
            }
            TokenKind::Vector => {
                self.advance();
                Ok(TypeName::Vector)
            }
            _ => Err(self.error_expected("a type (`float` or `vector`)")),
        }
    }

    /// Parses an optionally negated numeric literal.
    fn numeric_default(&mut self) -> Result<f64, CompileError> {
        let negative = self.eat(TokenKind::Minus);
        let tok = self.expect(TokenKind::Number)?;
        let value = self.number_value(tok)?;
        Ok(if negative { -value } else { value })
    }
}
