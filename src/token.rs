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

//! Token stream definitions produced by the lexer.

use crate::ast::SourceSpan;
use std::fmt;

/// Token discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier.
    Ident,
    /// Numeric literal.
    Number,
    /// Named constant reference (`#pi`).
    ConstRef,
    /// `fn` keyword.
    Fn,
    /// `ng` keyword.
    Ng,
    /// `out` keyword.
    Out,
    /// `and` keyword.
    And,
    /// `or` keyword.
    Or,
    /// `not` keyword.
    Not,
    /// `float` keyword.
    Float,
    /// `vector` keyword.
    Vector,
    /// `_` placeholder.
    Underscore,
    /// `(`.
    LParen,
    /// `)`.
    RParen,
    /// `{`.
    LBrace,
    /// `}`.
    RBrace,
    /// `,`.
    Comma,
    /// `;`.
    Semicolon,
    /// `:`.
    Colon,
    /// `->`.
    Arrow,
    /// `=`.
    Assign,
    /// `+`.
    Plus,
    /// `-`.
    Minus,
    /// `*`.
    Star,
    /// `**`.
    StarStar,
    /// `/`.
    Slash,
    /// `<`.
    Less,
    /// `>`.
    Greater,
    /// `<=`.
    LessEqual,
    /// `>=`.
    GreaterEqual,
    /// `==`.
    EqualEqual,
    /// End of input marker.
    Eof,
}

impl TokenKind {
    /// Short description used in syntax error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::ConstRef => "constant reference",
            TokenKind::Fn => "`fn`",
            TokenKind::Ng => "`ng`",
            TokenKind::Out => "`out`",
            TokenKind::And => "`and`",
            TokenKind::Or => "`or`",
            TokenKind::Not => "`not`",
            TokenKind::Float => "`float`",
            TokenKind::Vector => "`vector`",
            TokenKind::Underscore => "`_`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Arrow => "`->`",
            TokenKind::Assign => "`=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::StarStar => "`**`",
            TokenKind::Slash => "`/`",
            TokenKind::Less => "`<`",
            TokenKind::Greater => "`>`",
            TokenKind::LessEqual => "`<=`",
            TokenKind::GreaterEqual => "`>=`",
            TokenKind::EqualEqual => "`==`",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Returns the keyword kind for an identifier lexeme, if it is one.
pub fn keyword_lookup(lexeme: &str) -> Option<TokenKind> {
    match lexeme {
        "fn" => Some(TokenKind::Fn),
        "ng" => Some(TokenKind::Ng),
        "out" => Some(TokenKind::Out),
        "and" => Some(TokenKind::And),
        "or" => Some(TokenKind::Or),
        "not" => Some(TokenKind::Not),
        "float" => Some(TokenKind::Float),
        "vector" => Some(TokenKind::Vector),
        "_" => Some(TokenKind::Underscore),
        _ => None,
    }
}

/// One lexed token with its original text and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token discriminant.
    pub kind: TokenKind,
    /// Original source text; for [`TokenKind::ConstRef`] the name without `#`.
    pub lexeme: String,
    /// Source location for diagnostics.
    pub span: SourceSpan,
}
