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

//! Graph lowering: typed statements to nodes, links, and node groups.
//!
//! Lowering is where the two call-site strategies diverge: `ng` bodies are
//! re-lowered into the caller's graph at every call, `fn` bodies are
//! compiled once into a cached [`NodeGroupDefinition`] and instanced per
//! call. Recursion has no base case in this language, so any expansion that
//! re-enters an active signature is rejected here.

mod calls;
mod expr;

use crate::ast::SourceSpan;
use crate::diagnostics::{CompileError, ErrorKind, SourceDocument};
use crate::graph::{
    CompiledGraph, GraphOutput, GroupId, InputBinding, NodeGraph, NodeGroupDefinition,
    OutputSocket,
};
use crate::resolve::{TypedFunction, TypedStmt};
use crate::types::{ConstValue, SignatureKey, ValueType};
use std::collections::HashMap;
use std::rc::Rc;

/// Lowers resolved top-level statements into a full compilation result.
pub(crate) fn lower_unit(
    functions: &HashMap<SignatureKey, Rc<TypedFunction>>,
    doc: Rc<SourceDocument>,
    stmts: &[TypedStmt],
) -> Result<CompiledGraph, CompileError> {
    let mut ctx = LowerContext::new(functions, doc);
    ctx.lower_statements(stmts)?;
    Ok(ctx.build())
}

/// A lowered value flowing between statements.
///
/// Constants stay constants all the way to a socket default; only
/// expressions that need a runtime operation produce nodes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    /// Compile-time constant; becomes a socket default value.
    Constant(ConstValue),
    /// Output socket of an emitted node.
    Socket {
        socket: OutputSocket,
        ty: ValueType,
    },
    /// Flat multi-output result.
    Tuple(Vec<Value>),
}

impl Value {
    /// Socket binding for a single value.
    pub(super) fn binding(&self) -> InputBinding {
        match self {
            Value::Constant(value) => InputBinding::Constant(*value),
            Value::Socket { socket, .. } => InputBinding::Link(*socket),
            Value::Tuple(_) => unreachable!("tuples never feed a single socket"),
        }
    }

    /// Type of a single value.
    pub(super) fn value_type(&self) -> ValueType {
        match self {
            Value::Constant(value) => value.value_type(),
            Value::Socket { ty, .. } => *ty,
            Value::Tuple(_) => unreachable!("tuples have no single type"),
        }
    }

    /// Flattens into assignable components.
    pub(super) fn into_components(self) -> Vec<Value> {
        match self {
            Value::Tuple(values) => values,
            value => vec![value],
        }
    }
}

/// Lowering context for one compilation unit.
///
/// Holds the graph under construction, the group cache, the scope and call
/// stacks, and the per-statement memo table.
pub(crate) struct LowerContext<'a> {
    pub(super) functions: &'a HashMap<SignatureKey, Rc<TypedFunction>>,
    pub(super) graph: NodeGraph,
    pub(super) groups: Vec<NodeGroupDefinition>,
    pub(super) group_cache: HashMap<SignatureKey, GroupId>,
    pub(super) scopes: Vec<HashMap<String, Value>>,
    pub(super) memo: HashMap<String, Value>,
    pub(super) out_slots: Vec<HashMap<String, Value>>,
    pub(super) outputs: Vec<GraphOutput>,
    pub(super) call_stack: Vec<SignatureKey>,
    pub(super) doc_stack: Vec<Rc<SourceDocument>>,
}

impl<'a> LowerContext<'a> {
    /// Creates a fresh lowering context bound to the compile target's
    /// source document.
    pub(super) fn new(
        functions: &'a HashMap<SignatureKey, Rc<TypedFunction>>,
        initial_doc: Rc<SourceDocument>,
    ) -> Self {
        Self {
            functions,
            graph: NodeGraph::new(),
            groups: Vec::new(),
            group_cache: HashMap::new(),
            scopes: vec![HashMap::new()],
            memo: HashMap::new(),
            out_slots: Vec::new(),
            outputs: Vec::new(),
            call_stack: Vec::new(),
            doc_stack: vec![initial_doc],
        }
    }

    pub(super) fn current_doc(&self) -> &SourceDocument {
        self.doc_stack
            .last()
            .expect("lowering always executes with an active source document")
            .as_ref()
    }

    /// Creates a source-mapped compile error.
    pub(super) fn error_at(
        &self,
        kind: ErrorKind,
        message: impl Into<String>,
        span: &SourceSpan,
    ) -> CompileError {
        CompileError::at(kind, message, self.current_doc(), span)
    }

    pub(super) fn current_scope_mut(&mut self) -> &mut HashMap<String, Value> {
        self.scopes
            .last_mut()
            .expect("lowering always executes within at least one scope")
    }

    pub(super) fn resolve_binding(&self, name: &str) -> Option<Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(value.clone());
            }
        }
        None
    }

    /// Lowers a statement list with per-statement subexpression memoization.
    pub(super) fn lower_statements(&mut self, stmts: &[TypedStmt]) -> Result<(), CompileError> {
        for stmt in stmts {
            // One memo table per statement: sharing never crosses statements.
            self.memo.clear();
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &TypedStmt) -> Result<(), CompileError> {
        match stmt {
            TypedStmt::Assign { targets, value } => {
                let value = self.lower_expr(value)?;
                // The resolver checked target count against value arity.
                for (target, component) in targets.iter().zip(value.into_components()) {
                    if let Some(name) = target {
                        self.current_scope_mut().insert(name.clone(), component);
                    }
                }
                Ok(())
            }
            TypedStmt::Output { name, value, .. } => {
                let lowered = self.lower_expr(value)?;
                if let Some(slots) = self.out_slots.last_mut() {
                    slots.insert(name.clone(), lowered);
                } else {
                    self.outputs.push(GraphOutput {
                        name: Some(name.clone()),
                        ty: lowered.value_type(),
                        binding: lowered.binding(),
                    });
                }
                Ok(())
            }
            TypedStmt::Expr(value) => {
                let lowered = self.lower_expr(value)?;
                // At the root, bare expressions become anonymous outputs.
                // Inside a body they only matter for the nodes they emitted.
                if self.out_slots.is_empty() {
                    for component in lowered.into_components() {
                        self.outputs.push(GraphOutput {
                            name: None,
                            ty: component.value_type(),
                            binding: component.binding(),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Finalizes lowering into a [`CompiledGraph`].
    pub(super) fn build(self) -> CompiledGraph {
        CompiledGraph {
            graph: self.graph,
            groups: self.groups,
            outputs: self.outputs,
        }
    }
}
