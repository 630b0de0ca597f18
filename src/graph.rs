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

//! Node-graph description emitted by the compiler.
//!
//! Graphs are append-only, so every link points backwards and the structure
//! is a DAG by construction. [`CompiledGraph::emit_to`] replays a finished
//! compilation into a host through the [`GraphSink`] trait; a sink never
//! sees a partially compiled graph.

use crate::types::{ConstValue, OutputSig, ValueType};
use std::fmt::Write as _;

/// Index of a node within one [`NodeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Index of a group within a [`CompiledGraph`]'s group table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub usize);

/// One output socket of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputSocket {
    /// Producing node.
    pub node: NodeId,
    /// Output index on that node.
    pub index: usize,
}

/// What feeds a node input socket.
#[derive(Debug, Clone, PartialEq)]
pub enum InputBinding {
    /// Link from an upstream output socket.
    Link(OutputSocket),
    /// Constant socket value; no upstream node exists.
    Constant(ConstValue),
}

/// Node operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOp {
    /// Primitive operation tag (e.g. `math.add`).
    Builtin(&'static str),
    /// Instance of a compiled node group.
    Group(GroupId),
    /// Interface fan-out node at the head of a group body; its outputs are
    /// the group's input sockets.
    GroupInput,
}

/// One node of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Operation performed by the node.
    pub op: NodeOp,
    /// Input bindings in socket order.
    pub inputs: Vec<InputBinding>,
    /// Output socket types in order.
    pub output_types: Vec<ValueType>,
    /// Optional display label.
    pub label: Option<String>,
}

/// Append-only node graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGraph {
    nodes: Vec<GraphNode>,
}

impl NodeGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    pub fn add_node(
        &mut self,
        op: NodeOp,
        inputs: Vec<InputBinding>,
        output_types: Vec<ValueType>,
        label: Option<String>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(GraphNode {
            op,
            inputs,
            output_types,
            label,
        });
        id
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes with their ids, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

/// One interface socket of a node group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSocket {
    /// Socket name.
    pub name: String,
    /// Socket type.
    pub ty: ValueType,
    /// Default value shown when an instance input is left constant.
    pub default: Option<f64>,
}

/// A reusable node group compiled from one `fn` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGroupDefinition {
    /// Group name (the function name).
    pub name: String,
    /// Input interface sockets in parameter order.
    pub inputs: Vec<GroupSocket>,
    /// Output interface sockets in declaration order.
    pub outputs: Vec<OutputSig>,
    /// Inner graph; its first node is the [`NodeOp::GroupInput`] fan-out.
    pub graph: NodeGraph,
    /// What feeds each declared output, in declaration order.
    pub results: Vec<InputBinding>,
}

/// One named or anonymous output of the root graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOutput {
    /// Output name from `out name = ...`, or `None` for a bare expression
    /// statement.
    pub name: Option<String>,
    /// Output type.
    pub ty: ValueType,
    /// What feeds the output.
    pub binding: InputBinding,
}

/// Host contract for receiving a compiled graph.
///
/// `emit_to` drives these callbacks in a fixed order: group definitions
/// first (dependency order), then root nodes in creation order, then links
/// and constant socket values per node, then graph outputs. Node and group
/// ids are the compiler's; a host maps them to its own handles.
pub trait GraphSink {
    /// A primitive node was added to the root graph.
    fn add_node(&mut self, node: NodeId, op: &str, label: Option<&str>);
    /// A node group definition is complete. The sink walks
    /// `definition.graph` itself if it materializes group internals.
    fn define_group(&mut self, group: GroupId, definition: &NodeGroupDefinition);
    /// A group-instance node was added to the root graph.
    fn instantiate_group(&mut self, node: NodeId, group: GroupId, label: Option<&str>);
    /// An upstream output feeds an input socket.
    fn add_link(&mut self, from: OutputSocket, to_node: NodeId, to_input: usize);
    /// A constant feeds an input socket.
    fn set_input_value(&mut self, node: NodeId, input: usize, value: ConstValue);
    /// A graph output was declared.
    fn add_output(&mut self, name: Option<&str>, ty: ValueType, binding: &InputBinding);
}

/// Result of a whole-unit compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    /// Root graph built from top-level statements.
    pub graph: NodeGraph,
    /// Node groups in definition order; `GroupId` indexes this table.
    pub groups: Vec<NodeGroupDefinition>,
    /// Root graph outputs in declaration order.
    pub outputs: Vec<GraphOutput>,
}

impl CompiledGraph {
    /// Replays the compilation into a host sink.
    pub fn emit_to(&self, sink: &mut dyn GraphSink) {
        // Groups are defined in creation order, which is dependency order:
        // a group can only reference groups compiled before it.
        for (i, definition) in self.groups.iter().enumerate() {
            sink.define_group(GroupId(i), definition);
        }
        for (id, node) in self.graph.iter() {
            match &node.op {
                NodeOp::Builtin(op) => sink.add_node(id, op, node.label.as_deref()),
                NodeOp::Group(group) => sink.instantiate_group(id, *group, node.label.as_deref()),
                NodeOp::GroupInput => {
                    unreachable!("root graph never contains group interface nodes")
                }
            }
            for (input, binding) in node.inputs.iter().enumerate() {
                match binding {
                    InputBinding::Link(from) => sink.add_link(*from, id, input),
                    InputBinding::Constant(value) => sink.set_input_value(id, input, *value),
                }
            }
        }
        for output in &self.outputs {
            sink.add_output(output.name.as_deref(), output.ty, &output.binding);
        }
    }

    /// Renders a human-readable graph listing for debugging.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, group) in self.groups.iter().enumerate() {
            let _ = writeln!(out, "group g{} {}:", i, group.name);
            dump_graph(&mut out, &group.graph, "  ");
            for (sig, binding) in group.outputs.iter().zip(&group.results) {
                let _ = writeln!(out, "  out {} = {}", sig.name, render_binding(binding));
            }
        }
        let _ = writeln!(out, "root:");
        dump_graph(&mut out, &self.graph, "  ");
        for output in &self.outputs {
            let name = output.name.as_deref().unwrap_or("_");
            let _ = writeln!(out, "  out {} = {}", name, render_binding(&output.binding));
        }
        out
    }
}

fn dump_graph(out: &mut String, graph: &NodeGraph, indent: &str) {
    for (id, node) in graph.iter() {
        let op = match &node.op {
            NodeOp::Builtin(op) => (*op).to_string(),
            NodeOp::Group(g) => format!("group g{}", g.0),
            NodeOp::GroupInput => "group_input".to_string(),
        };
        let inputs = node
            .inputs
            .iter()
            .map(render_binding)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "{indent}n{} = {op}({inputs})", id.0);
    }
}

fn render_binding(binding: &InputBinding) -> String {
    match binding {
        InputBinding::Link(socket) => format!("n{}.{}", socket.node.0, socket.index),
        InputBinding::Constant(value) => format!("{value:?}"),
    }
}
