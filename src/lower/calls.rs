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

//! Lowering for call sites: primitive nodes, `ng` inlining, and `fn` node
//! groups.

use crate::diagnostics::{CompileError, ErrorKind};
use crate::graph::{GroupId, GroupSocket, NodeGroupDefinition, NodeId, NodeOp, OutputSocket};
use crate::resolve::{TypedExpr, TypedExprKind, TypedFunction};
use crate::types::{ConstValue, FunctionSignature, ValueType};
use rs_math3d::Vec3d;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use super::{LowerContext, Value};

impl LowerContext<'_> {
    /// Lowers one resolved call site.
    pub(super) fn lower_call(&mut self, expr: &TypedExpr) -> Result<Value, CompileError> {
        let TypedExprKind::Call {
            signature,
            builtin,
            args,
        } = &expr.kind
        else {
            unreachable!("lower_call only receives call expressions")
        };

        let mut lowered = Vec::with_capacity(args.len());
        for arg in args {
            lowered.push(self.lower_expr(arg)?);
        }

        if let Some(op) = builtin {
            return Ok(self.emit_builtin(signature, op, lowered));
        }

        let key = signature.key();
        if self.call_stack.contains(&key) {
            return Err(self.error_at(
                ErrorKind::RecursiveMacro,
                format!("Recursive expansion of `{}`", signature.name),
                &expr.span,
            ));
        }
        let function = self
            .functions
            .get(&key)
            .map(Rc::clone)
            .expect("registered signatures always have resolved bodies");

        if signature.is_macro {
            self.expand_macro(&function, lowered)
        } else {
            self.instantiate_group(&function, lowered)
        }
    }

    /// Emits one primitive node, folding all-constant operand patterns that
    /// the host expects as plain socket values.
    fn emit_builtin(
        &mut self,
        signature: &FunctionSignature,
        op: &'static str,
        args: Vec<Value>,
    ) -> Value {
        if let Some(folded) = fold_constant(op, &args) {
            return folded;
        }
        let inputs = args.iter().map(Value::binding).collect();
        let output_types: Vec<ValueType> = signature.outputs.iter().map(|o| o.ty).collect();
        let node = self
            .graph
            .add_node(NodeOp::Builtin(op), inputs, output_types.clone(), None);
        node_value(node, &output_types)
    }

    /// Inlines an `ng` body into the current graph.
    fn expand_macro(
        &mut self,
        function: &TypedFunction,
        args: Vec<Value>,
    ) -> Result<Value, CompileError> {
        let signature = &function.signature;
        let mut scope = HashMap::new();
        for (param, value) in signature.params.iter().zip(args) {
            scope.insert(param.name.clone(), value);
        }

        self.call_stack.push(signature.key());
        self.scopes.push(scope);
        self.doc_stack.push(Rc::clone(&function.doc));
        self.out_slots.push(HashMap::new());
        // The caller's statement memo never reaches the expansion and the
        // expansion's never leaks back, so sibling call sites stay disjoint.
        let saved_memo = mem::take(&mut self.memo);

        let result = self.lower_statements(&function.body);

        self.memo = saved_memo;
        let slots = self.out_slots.pop();
        self.doc_stack.pop();
        self.scopes.pop();
        self.call_stack.pop();
        result?;

        Ok(collect_outputs(
            signature,
            slots.expect("expansion always pushes an output sink"),
        ))
    }

    /// Lowers a `fn` call: compiles the group on first use, then emits one
    /// instance node.
    fn instantiate_group(
        &mut self,
        function: &TypedFunction,
        args: Vec<Value>,
    ) -> Result<Value, CompileError> {
        let signature = &function.signature;
        let group = match self.group_cache.get(&signature.key()) {
            Some(id) => *id,
            None => self.build_group(function)?,
        };

        let inputs = args.iter().map(Value::binding).collect();
        let output_types: Vec<ValueType> = signature.outputs.iter().map(|o| o.ty).collect();
        let node = self.graph.add_node(
            NodeOp::Group(group),
            inputs,
            output_types.clone(),
            Some(signature.name.clone()),
        );
        Ok(node_value(node, &output_types))
    }

    /// Compiles a `fn` body into a [`NodeGroupDefinition`].
    ///
    /// The group body is lowered into its own graph; graph, scopes, and
    /// memo are swapped out and restored around it. Groups created by
    /// nested `fn` calls land in the table first, keeping it in dependency
    /// order.
    fn build_group(&mut self, function: &TypedFunction) -> Result<GroupId, CompileError> {
        let signature = &function.signature;

        let saved_graph = mem::take(&mut self.graph);
        let saved_scopes = mem::take(&mut self.scopes);
        let saved_memo = mem::take(&mut self.memo);
        self.call_stack.push(signature.key());
        self.doc_stack.push(Rc::clone(&function.doc));
        self.out_slots.push(HashMap::new());

        // Parameters enter the body as outputs of the interface node.
        let param_types: Vec<ValueType> = signature.params.iter().map(|p| p.ty).collect();
        let input_node = self
            .graph
            .add_node(NodeOp::GroupInput, Vec::new(), param_types, None);
        let mut scope = HashMap::new();
        for (index, param) in signature.params.iter().enumerate() {
            scope.insert(
                param.name.clone(),
                Value::Socket {
                    socket: OutputSocket {
                        node: input_node,
                        index,
                    },
                    ty: param.ty,
                },
            );
        }
        self.scopes.push(scope);

        let result = self.lower_statements(&function.body);

        let slots = self.out_slots.pop();
        self.doc_stack.pop();
        self.call_stack.pop();
        let inner = mem::replace(&mut self.graph, saved_graph);
        self.scopes = saved_scopes;
        self.memo = saved_memo;
        result?;

        let mut slots = slots.expect("group compilation always pushes an output sink");
        let results = signature
            .outputs
            .iter()
            .map(|output| {
                slots
                    .remove(&output.name)
                    .expect("resolution guarantees each output is assigned")
                    .binding()
            })
            .collect();

        let definition = NodeGroupDefinition {
            name: signature.name.clone(),
            inputs: signature
                .params
                .iter()
                .map(|param| GroupSocket {
                    name: param.name.clone(),
                    ty: param.ty,
                    default: param.default,
                })
                .collect(),
            outputs: signature.outputs.clone(),
            graph: inner,
            results,
        };
        let id = GroupId(self.groups.len());
        self.groups.push(definition);
        self.group_cache.insert(signature.key(), id);
        Ok(id)
    }
}

/// Wraps a node's output sockets as a lowered value.
fn node_value(node: NodeId, output_types: &[ValueType]) -> Value {
    if output_types.len() == 1 {
        Value::Socket {
            socket: OutputSocket { node, index: 0 },
            ty: output_types[0],
        }
    } else {
        Value::Tuple(
            output_types
                .iter()
                .enumerate()
                .map(|(index, ty)| Value::Socket {
                    socket: OutputSocket { node, index },
                    ty: *ty,
                })
                .collect(),
        )
    }
}

/// Drains an expansion's output sink in declaration order.
fn collect_outputs(signature: &FunctionSignature, mut slots: HashMap<String, Value>) -> Value {
    let mut values: Vec<Value> = signature
        .outputs
        .iter()
        .map(|output| {
            slots
                .remove(&output.name)
                .expect("resolution guarantees each output is assigned")
        })
        .collect();
    if values.len() == 1 {
        values.pop().expect("signatures declare at least one output")
    } else {
        Value::Tuple(values)
    }
}

/// Folds primitives whose operands are all constants.
///
/// Constants never become nodes, so the folds cover exactly the shapes the
/// resolver produces for literal expressions: negated literals and packed
/// vector literals.
fn fold_constant(op: &str, args: &[Value]) -> Option<Value> {
    match (op, args) {
        ("math.negate", [Value::Constant(ConstValue::Float(v))]) => {
            Some(Value::Constant(ConstValue::Float(-v)))
        }
        (
            "combine_xyz",
            [Value::Constant(ConstValue::Float(x)), Value::Constant(ConstValue::Float(y)), Value::Constant(ConstValue::Float(z))],
        ) => Some(Value::Constant(ConstValue::Vector(Vec3d::new(*x, *y, *z)))),
        _ => None,
    }
}
