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

//! Recursive-descent parser over the lexed token stream.
//!
//! The grammar supports:
//! - `fn`/`ng` function declarations with typed parameters, optional
//!   parameter defaults, and declared outputs
//! - assignments with destructuring targets (`x, _, z = e`)
//! - `out name = expr` output bindings
//! - bare expression statements
//!
//! Expressions support:
//! - numeric literals, identifiers, `#name` constants
//! - vector literals (`{a, b, c}`)
//! - unary `-` and `not`
//! - binary `+ - * / ** < > <= >= == and or`
//! - function calls
//!
//! Failures are fail-fast `ErrorKind::Syntax` diagnostics; there is no error
//! recovery and no partial output.

mod expr;
mod statements;

use crate::ast::{Module, SourceSpan};
use crate::diagnostics::{CompileError, ErrorKind};
use crate::lexer::tokenize_in_source;
use crate::token::{Token, TokenKind};

/// Parses full formula source into a spanned AST module.
pub fn parse_module(source: &str) -> Result<Module, CompileError> {
    parse_module_in_source(source, "<formula>")
}

/// Parses full formula source while tagging diagnostics with a source
/// name/path.
pub(crate) fn parse_module_in_source(
    source: &str,
    source_name: &str,
) -> Result<Module, CompileError> {
    let tokens = tokenize_in_source(source, source_name)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        source,
        source_name,
    };
    parser.module()
}

/// Parser state over a lexed token stream.
///
/// The stream always ends with an `Eof` token, so `self.tokens[self.pos]` is
/// in bounds as long as `advance` never steps past it.
pub(super) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
    source_name: &'a str,
}

impl<'a> Parser<'a> {
    /// Returns the current token without consuming it.
    pub(super) fn peek(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    /// Returns the current token kind.
    pub(super) fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    /// Returns the kind `n` tokens ahead (`Eof` past the end).
    pub(super) fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|tok| tok.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Consumes and returns the current token. `Eof` is never stepped past.
    pub(super) fn advance(&mut self) -> &'a Token {
        let tok = &self.tokens[self.pos];
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    /// Consumes the current token when it matches `kind`.
    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of `kind` or fails with a syntax diagnostic.
    pub(super) fn expect(&mut self, kind: TokenKind) -> Result<&'a Token, CompileError> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kind.describe()))
        }
    }

    /// Builds an expected/found syntax error anchored at the current token.
    pub(super) fn error_expected(&self, what: &str) -> CompileError {
        let tok = self.peek();
        self.error_at(
            &tok.span,
            format!("Syntax error: expected {what}, found {}", tok.kind),
        )
    }

    /// Builds a syntax error at an explicit span.
    pub(super) fn error_at(&self, span: &SourceSpan, message: impl Into<String>) -> CompileError {
        CompileError::from_span_in_source(
            ErrorKind::Syntax,
            message,
            self.source_name,
            self.source,
            span,
        )
    }

    /// Span of the most recently consumed token.
    pub(super) fn prev_span(&self) -> SourceSpan {
        self.tokens[self.pos.saturating_sub(1)].span.clone()
    }

    /// Parses a numeric literal token's value.
    pub(super) fn number_value(&self, tok: &Token) -> Result<f64, CompileError> {
        tok.lexeme
            .parse::<f64>()
            .map_err(|_| self.error_at(&tok.span, "Syntax error: malformed number literal"))
    }

    /// Parses the whole module.
    fn module(&mut self) -> Result<Module, CompileError> {
        let mut functions = Vec::new();
        let mut statements = Vec::new();
        while self.peek_kind() != TokenKind::Eof {
            // Stray separators between items are harmless.
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            if matches!(self.peek_kind(), TokenKind::Fn | TokenKind::Ng) {
                functions.push(self.function_def()?);
            } else {
                statements.push(self.statement()?);
            }
        }
        Ok(Module {
            functions,
            statements,
        })
    }
}
