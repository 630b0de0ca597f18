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

//! Compiler from a small math-formula DSL to a node-graph description.
//!
//! This crate provides:
//! - A typed formula parser (`float`, `vector`, calls, operators,
//!   `{x, y, z}` vector literals, `#name` constants).
//! - User-defined functions: `fn` declarations compile once into reusable
//!   node groups, `ng` declarations inline at every call site.
//! - Overload resolution by exact parameter-type match through one
//!   [`FunctionRegistry`] shared by operators and named calls.
//! - Lowering into an append-only [`CompiledGraph`], replayable into any
//!   host through the [`GraphSink`] trait.
//! - Rich compile diagnostics with line/column/caret output.
//!
//! # Pipeline
//!
//! 1. Lex and parse source into an AST with source spans.
//! 2. Resolve: type-check, pick overloads, rewrite operators to builtin
//!    calls.
//! 3. Lower: emit nodes, links, and node groups; constants become socket
//!    default values and never produce nodes.
//!
//! The compiler never evaluates formulas; it only describes a graph for a
//! host visual-programming environment to execute.
//!
//! ```
//! use formula_graph::compile_formula;
//!
//! let compiled = compile_formula("out y = sin(#pi / 4) * 2").unwrap();
//! assert_eq!(compiled.outputs.len(), 1);
//! ```

mod ast;
mod diagnostics;
mod graph;
mod lexer;
mod lower;
mod parser;
mod registry;
mod resolve;
mod stdlib;
mod token;
mod types;

pub use ast::{
    AssignTarget, BinOp, Expr, ExprKind, FnKind, FunctionDef, Module, OutputDecl, Param,
    SourceSpan, Stmt, StmtKind, TypeName, UnaryOp,
};
pub use diagnostics::{CompileError, ErrorKind};
pub use graph::{
    CompiledGraph, GraphNode, GraphOutput, GraphSink, GroupId, GroupSocket, InputBinding,
    NodeGraph, NodeGroupDefinition, NodeId, NodeOp, OutputSocket,
};
pub use lexer::{Lexer, tokenize};
pub use parser::parse_module;
pub use registry::{DuplicateSignatureError, FunctionEntry, FunctionRegistry, LookupError};
pub use stdlib::{PRELUDE_PATH, PRELUDE_SOURCE};
pub use token::{Token, TokenKind};
pub use types::{
    ConstValue, ExprType, FunctionSignature, OutputSig, ParamSig, SignatureKey, ValueType,
};

use diagnostics::SourceDocument;
use lower::lower_unit;
use parser::parse_module_in_source;
use resolve::{Resolver, TypedFunction, signature_of};
use std::collections::HashMap;
use std::rc::Rc;

/// One compilation unit: registry, resolved function bodies, and the
/// constant table.
///
/// Construction pre-registers the primitive builtins and the embedded
/// prelude. Library declarations can then be layered with
/// [`Compiler::add_functions`] before compiling formulas. Independent
/// `Compiler` values share nothing; each [`Compiler::compile`] call works on
/// a private copy of the registry, so one formula's declarations never leak
/// into the next.
pub struct Compiler {
    registry: FunctionRegistry,
    functions: HashMap<SignatureKey, Rc<TypedFunction>>,
    constants: HashMap<String, ConstValue>,
}

impl Compiler {
    /// Creates a compiler with builtins, the embedded prelude, and the
    /// default constant table (`#e`, `#pi`, `#tau`).
    pub fn new() -> Self {
        let mut compiler = Self {
            registry: FunctionRegistry::with_builtins(),
            functions: HashMap::new(),
            constants: default_constants(),
        };
        compiler
            .add_functions(PRELUDE_PATH, PRELUDE_SOURCE)
            .expect("embedded prelude always compiles");
        compiler
    }

    /// Defines or replaces a named constant usable as `#name`.
    pub fn define_constant(&mut self, name: impl Into<String>, value: ConstValue) {
        self.constants.insert(name.into(), value);
    }

    /// Registers the `fn`/`ng` declarations of a library source.
    ///
    /// Library sources must not contain top-level statements. Signatures
    /// are registered before any body is resolved, so declarations may
    /// reference each other in any order.
    pub fn add_functions(&mut self, path: &str, source: &str) -> Result<(), CompileError> {
        let module = parse_module_in_source(source, path)?;
        let doc = SourceDocument::new(path, source);
        if let Some(stmt) = module.statements.first() {
            return Err(CompileError::at(
                ErrorKind::Syntax,
                "Library sources must not contain top-level statements",
                &doc,
                &stmt.span,
            ));
        }
        register_declarations(
            &mut self.registry,
            &mut self.functions,
            &self.constants,
            &module.functions,
            &doc,
        )
    }

    /// Compiles one formula source into a graph description.
    pub fn compile(&self, source: &str) -> Result<CompiledGraph, CompileError> {
        self.compile_in_source("<formula>", source)
    }

    /// Compiles one formula while tagging diagnostics with a source
    /// name/path.
    ///
    /// Declarations inside the formula are visible to it but never alter
    /// this compiler.
    pub fn compile_in_source(
        &self,
        path: &str,
        source: &str,
    ) -> Result<CompiledGraph, CompileError> {
        let module = parse_module_in_source(source, path)?;
        let doc = SourceDocument::new(path, source);

        let mut registry = self.registry.clone();
        let mut functions = self.functions.clone();
        register_declarations(
            &mut registry,
            &mut functions,
            &self.constants,
            &module.functions,
            &doc,
        )?;

        let resolver = Resolver::new(&registry, &self.constants, Rc::clone(&doc));
        let statements = resolver.resolve_statements(&module.statements)?;
        lower_unit(&functions, doc, &statements)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot convenience over [`Compiler::compile`].
pub fn compile_formula(source: &str) -> Result<CompiledGraph, CompileError> {
    Compiler::new().compile(source)
}

/// Default `#name` constant table.
fn default_constants() -> HashMap<String, ConstValue> {
    let mut constants = HashMap::new();
    constants.insert("e".to_string(), ConstValue::Float(std::f64::consts::E));
    constants.insert("pi".to_string(), ConstValue::Float(std::f64::consts::PI));
    constants.insert("tau".to_string(), ConstValue::Float(std::f64::consts::TAU));
    constants
}

/// Two-phase declaration processing: all signatures first, then bodies in
/// source order. Forward references are legal; recursion is rejected at
/// lowering when an expansion re-enters an active signature.
fn register_declarations(
    registry: &mut FunctionRegistry,
    functions: &mut HashMap<SignatureKey, Rc<TypedFunction>>,
    constants: &HashMap<String, ConstValue>,
    declarations: &[FunctionDef],
    doc: &Rc<SourceDocument>,
) -> Result<(), CompileError> {
    let mut signatures = Vec::with_capacity(declarations.len());
    for def in declarations {
        let signature = signature_of(def);
        let rendered = registry::render_signature(&signature);
        let signature = registry.register(signature, None).map_err(|_| {
            CompileError::at(
                ErrorKind::DuplicateSignature,
                format!("Duplicate signature `{rendered}`"),
                doc,
                &def.span,
            )
        })?;
        signatures.push(signature);
    }

    for (def, signature) in declarations.iter().zip(signatures) {
        let resolver = Resolver::new(registry, constants, Rc::clone(doc));
        let function = resolver.resolve_function(def, Rc::clone(&signature))?;
        functions.insert(signature.key(), Rc::new(function));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
