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

//! `nom` lexer producing the token stream the parser consumes.
//!
//! Tokens:
//! - identifiers and keywords (`fn`, `ng`, `out`, `and`, `or`, `not`,
//!   `float`, `vector`, `_`)
//! - numeric literals (integer, decimal, exponent forms)
//! - constant references (`#pi`)
//! - operators `+ - * / ** < > <= >= == =` and `->`
//! - punctuation `( ) { } , ; :`
//!
//! Whitespace and `//` line comments are trivia. Operators are tried before
//! numbers so `a-2` lexes as `a`, `-`, `2` rather than `a`, `-2`.

use crate::ast::{SourceSpan, Span};
use crate::diagnostics::{CompileError, ErrorKind};
use crate::token::{Token, TokenKind, keyword_lookup};
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{multispace1, not_line_ending},
    combinator::{map, opt, recognize, value},
    multi::many0,
    number::complete::recognize_float,
    sequence::pair,
};

type LResult<'a, O> = IResult<Span<'a>, O>;

/// Lazy tokenizer over one source string.
pub struct Lexer<'a> {
    source: &'a str,
    source_name: &'a str,
    rest: Span<'a>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self::in_source(source, "<formula>")
    }

    /// Creates a lexer tagging diagnostics with a source name/path.
    pub(crate) fn in_source(source: &'a str, source_name: &'a str) -> Self {
        Self {
            source,
            source_name,
            rest: Span::new(source),
        }
    }

    /// Lexes the next token. At end of input it keeps returning
    /// [`TokenKind::Eof`].
    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        let (after_trivia, ()) = ws0(self.rest).expect("trivia parsing never fails");
        self.rest = after_trivia;
        if self.rest.fragment().is_empty() {
            return Ok(Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                span: SourceSpan::from_bounds(self.rest, self.rest),
            });
        }

        match token(self.rest) {
            Ok((after, tok)) => {
                self.rest = after;
                Ok(tok)
            }
            Err(_) => {
                let bad = self.rest.fragment().chars().next().unwrap_or('\u{fffd}');
                let mut span = SourceSpan::from_bounds(self.rest, self.rest);
                span.end = span.start + bad.len_utf8();
                Err(CompileError::from_span_in_source(
                    ErrorKind::Lex,
                    format!("Unrecognized character '{bad}'"),
                    self.source_name,
                    self.source,
                    &span,
                ))
            }
        }
    }
}

/// Lexes full source into a token stream ending with [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    tokenize_in_source(source, "<formula>")
}

/// Lexes full source while tagging diagnostics with a source name/path.
pub(crate) fn tokenize_in_source(
    source: &str,
    source_name: &str,
) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer::in_source(source, source_name);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if done {
            return Ok(tokens);
        }
    }
}

/// Skips zero-or-more whitespace/comments.
fn ws0(input: Span<'_>) -> LResult<'_, ()> {
    // Treat spaces/newlines and comments uniformly as trivia.
    value((), many0(alt((value((), multispace1), comment))))(input)
}

/// Parses line comments (`// ...`).
fn comment(input: Span<'_>) -> LResult<'_, ()> {
    value((), pair(tag("//"), opt(not_line_ending)))(input)
}

/// Parses one token. Assumes leading trivia was already consumed.
fn token(input: Span<'_>) -> LResult<'_, Token> {
    alt((const_ref, operator, number, ident_or_keyword))(input)
}

/// Parses identifiers (`[A-Za-z_][A-Za-z0-9_]*`), mapping keywords.
fn ident_or_keyword(input: Span<'_>) -> LResult<'_, Token> {
    let start = input;
    let (rest, lexeme) = identifier(input)?;
    let kind = keyword_lookup(&lexeme).unwrap_or(TokenKind::Ident);
    Ok((
        rest,
        Token {
            kind,
            lexeme,
            span: SourceSpan::from_bounds(start, rest),
        },
    ))
}

/// Parses an identifier fragment into a `String`.
fn identifier(input: Span<'_>) -> LResult<'_, String> {
    map(
        recognize(pair(
            take_while1(is_ident_start),
            take_while(is_ident_continue),
        )),
        |s: Span<'_>| s.fragment().to_string(),
    )(input)
}

/// Returns whether a char can start an identifier.
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

/// Returns whether a char can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Parses `#name` constant references; the lexeme is the bare name.
fn const_ref(input: Span<'_>) -> LResult<'_, Token> {
    let start = input;
    let (rest, _) = tag("#")(input)?;
    let (rest, name) = identifier(rest)?;
    Ok((
        rest,
        Token {
            kind: TokenKind::ConstRef,
            lexeme: name,
            span: SourceSpan::from_bounds(start, rest),
        },
    ))
}

/// Parses numeric literals via `recognize_float`.
///
/// Tried after operators, so the optional sign `recognize_float` accepts is
/// never reachable here.
fn number(input: Span<'_>) -> LResult<'_, Token> {
    let start = input;
    let (rest, lexeme) = recognize_float(input)?;
    Ok((
        rest,
        Token {
            kind: TokenKind::Number,
            lexeme: lexeme.fragment().to_string(),
            span: SourceSpan::from_bounds(start, rest),
        },
    ))
}

/// Parses operators and punctuation. Longest forms first.
fn operator(input: Span<'_>) -> LResult<'_, Token> {
    let start = input;
    let (rest, kind) = alt((
        value(TokenKind::Arrow, tag("->")),
        value(TokenKind::StarStar, tag("**")),
        value(TokenKind::LessEqual, tag("<=")),
        value(TokenKind::GreaterEqual, tag(">=")),
        value(TokenKind::EqualEqual, tag("==")),
        value(TokenKind::Plus, tag("+")),
        value(TokenKind::Minus, tag("-")),
        value(TokenKind::Star, tag("*")),
        value(TokenKind::Slash, tag("/")),
        value(TokenKind::Less, tag("<")),
        value(TokenKind::Greater, tag(">")),
        value(TokenKind::Assign, tag("=")),
        value(TokenKind::LParen, tag("(")),
        value(TokenKind::RParen, tag(")")),
        value(TokenKind::LBrace, tag("{")),
        value(TokenKind::RBrace, tag("}")),
        value(TokenKind::Comma, tag(",")),
        value(TokenKind::Semicolon, tag(";")),
        value(TokenKind::Colon, tag(":")),
    ))(input)?;
    Ok((
        rest,
        Token {
            kind,
            lexeme: start.fragment()[..start.fragment().len() - rest.fragment().len()].to_string(),
            span: SourceSpan::from_bounds(start, rest),
        },
    ))
}
