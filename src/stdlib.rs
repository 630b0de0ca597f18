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

//! Embedded DSL prelude source.
//!
//! The prelude is shipped as a plain formula-language file and registered
//! into every [`crate::Compiler`] right after the primitive builtins. It
//! layers derived comparisons, scalar-position `mul`/`div` overloads, and
//! coordinate conversions on top of the primitive node vocabulary.

/// Canonical path label for the embedded prelude.
pub const PRELUDE_PATH: &str = "stdlib/prelude.mf";

/// Embedded source text for `stdlib/prelude.mf`.
pub const PRELUDE_SOURCE: &str = include_str!("../stdlib/prelude.mf");
