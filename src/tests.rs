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

//! Crate unit tests.

use super::*;
use rs_math3d::Vec3d;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Graph evaluator
//
// Tests check compiled graphs by executing them numerically: nodes are
// evaluated in creation order (links only point backwards), group instances
// recurse into their definitions.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum EvalValue {
    Float(f64),
    Vector(Vec3d),
}

impl EvalValue {
    fn float(self) -> f64 {
        match self {
            EvalValue::Float(v) => v,
            EvalValue::Vector(_) => panic!("expected a float value"),
        }
    }

    fn vector(self) -> Vec3d {
        match self {
            EvalValue::Vector(v) => v,
            EvalValue::Float(_) => panic!("expected a vector value"),
        }
    }
}

fn eval_binding(binding: &InputBinding, values: &[Vec<EvalValue>]) -> EvalValue {
    match binding {
        InputBinding::Link(socket) => values[socket.node.0][socket.index],
        InputBinding::Constant(ConstValue::Float(v)) => EvalValue::Float(*v),
        InputBinding::Constant(ConstValue::Vector(v)) => EvalValue::Vector(*v),
    }
}

fn eval_builtin(op: &str, args: &[EvalValue]) -> Vec<EvalValue> {
    let f = |i: usize| args[i].float();
    let v = |i: usize| args[i].vector();
    let truthy = |x: f64| x != 0.0;
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    let one = |x: f64| vec![EvalValue::Float(x)];
    let one_v = |x: Vec3d| vec![EvalValue::Vector(x)];
    match op {
        "math.add" => one(f(0) + f(1)),
        "math.subtract" => one(f(0) - f(1)),
        "math.multiply" => one(f(0) * f(1)),
        "math.divide" => one(f(0) / f(1)),
        "math.negate" => one(-f(0)),
        "math.power" => one(f(0).powf(f(1))),
        "math.sqrt" => one(f(0).sqrt()),
        "math.logarithm" => one(f(0).log(f(1))),
        "math.exponent" => one(f(0).exp()),
        "math.sine" => one(f(0).sin()),
        "math.cosine" => one(f(0).cos()),
        "math.tangent" => one(f(0).tan()),
        "math.arcsine" => one(f(0).asin()),
        "math.arccosine" => one(f(0).acos()),
        "math.arctan2" => one(f(0).atan2(f(1))),
        "math.absolute" => one(f(0).abs()),
        "math.minimum" => one(f(0).min(f(1))),
        "math.maximum" => one(f(0).max(f(1))),
        "math.less_than" => one(flag(f(0) < f(1))),
        "math.greater_than" => one(flag(f(0) > f(1))),
        "math.equal" => one(flag(f(0) == f(1))),
        "math.and" => one(flag(truthy(f(0)) && truthy(f(1)))),
        "math.or" => one(flag(truthy(f(0)) || truthy(f(1)))),
        "math.not" => one(flag(!truthy(f(0)))),
        "vector.add" => {
            let (a, b) = (v(0), v(1));
            one_v(Vec3d::new(a.x + b.x, a.y + b.y, a.z + b.z))
        }
        "vector.subtract" => {
            let (a, b) = (v(0), v(1));
            one_v(Vec3d::new(a.x - b.x, a.y - b.y, a.z - b.z))
        }
        "vector.multiply" => {
            let (a, b) = (v(0), v(1));
            one_v(Vec3d::new(a.x * b.x, a.y * b.y, a.z * b.z))
        }
        "vector.divide" => {
            let (a, b) = (v(0), v(1));
            one_v(Vec3d::new(a.x / b.x, a.y / b.y, a.z / b.z))
        }
        "vector.scale" => {
            let (a, s) = (v(0), f(1));
            one_v(Vec3d::new(a.x * s, a.y * s, a.z * s))
        }
        "vector.dot_product" => {
            let (a, b) = (v(0), v(1));
            one(a.x * b.x + a.y * b.y + a.z * b.z)
        }
        "vector.length" => {
            let a = v(0);
            one((a.x * a.x + a.y * a.y + a.z * a.z).sqrt())
        }
        "vector.normalize" => {
            let a = v(0);
            let len = (a.x * a.x + a.y * a.y + a.z * a.z).sqrt();
            one_v(Vec3d::new(a.x / len, a.y / len, a.z / len))
        }
        "combine_xyz" => one_v(Vec3d::new(f(0), f(1), f(2))),
        "separate_xyz" => {
            let a = v(0);
            vec![
                EvalValue::Float(a.x),
                EvalValue::Float(a.y),
                EvalValue::Float(a.z),
            ]
        }
        other => panic!("evaluator has no rule for op '{other}'"),
    }
}

fn eval_nodes(
    graph: &NodeGraph,
    groups: &[NodeGroupDefinition],
    group_inputs: &[EvalValue],
) -> Vec<Vec<EvalValue>> {
    let mut values: Vec<Vec<EvalValue>> = Vec::with_capacity(graph.len());
    for (_, node) in graph.iter() {
        let outputs = match &node.op {
            NodeOp::GroupInput => group_inputs.to_vec(),
            NodeOp::Builtin(op) => {
                let args: Vec<EvalValue> = node
                    .inputs
                    .iter()
                    .map(|binding| eval_binding(binding, &values))
                    .collect();
                eval_builtin(op, &args)
            }
            NodeOp::Group(id) => {
                let args: Vec<EvalValue> = node
                    .inputs
                    .iter()
                    .map(|binding| eval_binding(binding, &values))
                    .collect();
                eval_group(&groups[id.0], groups, &args)
            }
        };
        values.push(outputs);
    }
    values
}

fn eval_group(
    definition: &NodeGroupDefinition,
    groups: &[NodeGroupDefinition],
    args: &[EvalValue],
) -> Vec<EvalValue> {
    let values = eval_nodes(&definition.graph, groups, args);
    definition
        .results
        .iter()
        .map(|binding| eval_binding(binding, &values))
        .collect()
}

fn eval_outputs(compiled: &CompiledGraph) -> Vec<(Option<String>, EvalValue)> {
    let values = eval_nodes(&compiled.graph, &compiled.groups, &[]);
    compiled
        .outputs
        .iter()
        .map(|output| (output.name.clone(), eval_binding(&output.binding, &values)))
        .collect()
}

fn compile_ok(source: &str) -> CompiledGraph {
    compile_formula(source).expect("formula should compile")
}

fn eval_single(source: &str) -> EvalValue {
    let compiled = compile_ok(source);
    let outputs = eval_outputs(&compiled);
    assert_eq!(outputs.len(), 1, "expected a single graph output");
    outputs[0].1
}

fn eval_float(source: &str) -> f64 {
    eval_single(source).float()
}

fn named_float_outputs(source: &str) -> HashMap<String, f64> {
    let compiled = compile_ok(source);
    eval_outputs(&compiled)
        .into_iter()
        .map(|(name, value)| (name.expect("named output"), value.float()))
        .collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn assert_vec_close(actual: Vec3d, expected: (f64, f64, f64)) {
    assert_close(actual.x, expected.0);
    assert_close(actual.y, expected.1);
    assert_close(actual.z, expected.2);
}

fn count_ops(compiled: &CompiledGraph, tag: &str) -> usize {
    compiled
        .graph
        .iter()
        .filter(|(_, node)| matches!(&node.op, NodeOp::Builtin(op) if *op == tag))
        .count()
}

fn count_group_instances(compiled: &CompiledGraph) -> usize {
    compiled
        .graph
        .iter()
        .filter(|(_, node)| matches!(node.op, NodeOp::Group(_)))
        .count()
}

fn compile_err(source: &str) -> CompileError {
    compile_formula(source).expect_err("compile should fail")
}

fn assert_error(source: &str, kind: ErrorKind, needle: &str) {
    let err = compile_err(source);
    assert_eq!(err.kind, kind, "source {source:?}: got '{err}'");
    assert!(
        err.message.contains(needle),
        "source {source:?}: unexpected message '{}'",
        err.message
    );
}

fn first_caret_column(pointer: &str) -> Option<usize> {
    pointer.chars().position(|ch| ch == '^').map(|idx| idx + 1)
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[test]
fn tokenizes_operators_keywords_and_comments() {
    let tokens = tokenize("x <= 2 ** #pi and not y // trailing comment\n").expect("lex");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident,
            TokenKind::LessEqual,
            TokenKind::Number,
            TokenKind::StarStar,
            TokenKind::ConstRef,
            TokenKind::And,
            TokenKind::Not,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
    // The `#` sigil never reaches the constant name.
    assert_eq!(tokens[4].lexeme, "pi");
}

#[test]
fn lexer_is_lazy_and_sticks_at_eof() {
    let mut lexer = Lexer::new("a + 1");
    assert_eq!(lexer.next_token().expect("lex").kind, TokenKind::Ident);
    assert_eq!(lexer.next_token().expect("lex").kind, TokenKind::Plus);
    assert_eq!(lexer.next_token().expect("lex").kind, TokenKind::Number);
    assert_eq!(lexer.next_token().expect("lex").kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().expect("lex").kind, TokenKind::Eof);
}

#[test]
fn reports_lex_error_with_caret() {
    let err = compile_err("out y = 1 $ 2");
    assert_eq!(err.kind, ErrorKind::Lex);
    assert!(err.message.contains("Unrecognized character"));
    assert_eq!(err.line, 1);
    assert_eq!(err.column, 11);
    assert_eq!(err.snippet, "out y = 1 $ 2");
    assert_eq!(first_caret_column(&err.pointer), Some(err.column));
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[test]
fn reports_parse_errors_for_exhaustive_invalid_forms() {
    let cases = vec![
        (
            "missing colon in parameter",
            "fn bad(a float) -> r: float { out r = a }",
        ),
        ("missing parameter list", "fn bad -> r: float { out r = 1 }"),
        ("missing arrow", "fn bad(a: float) r: float { out r = a }"),
        ("missing output type", "fn bad(a: float) -> r { out r = a }"),
        ("missing output name", "out = 1"),
        ("missing binary rhs", "out y = 1 + "),
        ("unclosed paren", "out y = (1 + 2"),
        ("unclosed call", "out y = min(1, 2"),
        ("trailing comma in call args", "out y = min(1,)"),
        ("unclosed vector literal", "out y = {1, 2, 3"),
        (
            "unclosed function body",
            "fn bad(a: float) -> r: float { out r = a",
        ),
        (
            "duplicate parameter name",
            "fn bad(a: float, a: float) -> r: float { out r = a }",
        ),
        (
            "duplicate declared output name",
            "fn bad(a: float) -> r: float, r: float { out r = a }",
        ),
        (
            "non-numeric parameter default",
            "fn bad(a: float = x) -> r: float { out r = a }",
        ),
        (
            "unknown type name",
            "fn bad(a: matrix) -> r: float { out r = 1 }",
        ),
    ];
    for (case_name, source) in cases {
        let err = compile_err(source);
        assert_eq!(err.kind, ErrorKind::Syntax, "{case_name}: got '{err}'");
        assert_eq!(err.line, 1, "{case_name}: unexpected error line");
        assert!(err.column > 0, "{case_name}: expected non-zero column");
        assert!(
            err.message.contains("Syntax error") || err.message.contains("expected"),
            "{case_name}: unexpected message '{}'",
            err.message
        );
        assert!(
            err.pointer.contains('^'),
            "{case_name}: missing caret pointer"
        );
    }
}

#[test]
fn parses_negated_parameter_defaults() {
    let module = parse_module("fn f(a: float = -2.5, b: float = 1) -> r: float { out r = a }")
        .expect("parse");
    let params = &module.functions[0].params;
    assert_eq!(params[0].default, Some(-2.5));
    assert_eq!(params[1].default, Some(1.0));
}

// ---------------------------------------------------------------------------
// Expression semantics
// ---------------------------------------------------------------------------

#[test]
fn evaluates_arithmetic_precedence() {
    assert_close(eval_float("out y = 2 + 3 * 4"), 14.0);
    assert_close(eval_float("out y = (2 + 3) * 4"), 20.0);
    assert_close(eval_float("out y = 10 - 4 - 3"), 3.0);
    assert_close(eval_float("out y = 7 / 2 / 2"), 1.75);
}

#[test]
fn evaluates_power_operator() {
    assert_close(eval_float("out y = 2 * 3 ** 2"), 18.0);
    // `**` binds tighter than the unary minus on its left and is
    // right-associative.
    assert_close(eval_float("out y = -2 ** 2"), -4.0);
    assert_close(eval_float("out y = 2 ** -1"), 0.5);
    assert_close(eval_float("out y = 2 ** 3 ** 2"), 512.0);
}

#[test]
fn evaluates_comparisons_and_boolean_logic() {
    assert_close(eval_float("out y = 1 < 2 and not (3 <= 2)"), 1.0);
    assert_close(eval_float("out y = 1 >= 2 or 2 == 2"), 1.0);
    assert_close(eval_float("out y = not 1 < 2"), 0.0);
    assert_close(eval_float("out y = 3 > 4 and 1 < 2"), 0.0);
}

#[test]
fn evaluates_builtin_constants() {
    assert_close(eval_float("out y = sin(#pi / 2)"), 1.0);
    assert_close(eval_float("out y = #tau / #pi"), 2.0);
    assert_close(eval_float("out y = log(#e, #e)"), 1.0);
}

#[test]
fn evaluates_vector_arithmetic() {
    assert_vec_close(
        eval_single("out v = {1, 2, 3} + {4, 5, 6}").vector(),
        (5.0, 7.0, 9.0),
    );
    assert_vec_close(
        eval_single("out v = {1, 2, 3} * {2, 2, 2}").vector(),
        (2.0, 4.0, 6.0),
    );
    assert_close(eval_float("out y = dot({1, 2, 3}, {4, 5, 6})"), 32.0);
    assert_close(eval_float("out y = length({3, 4, 0})"), 5.0);
    assert_vec_close(
        eval_single("out v = normalize({3, 0, 0})").vector(),
        (1.0, 0.0, 0.0),
    );
}

#[test]
fn scalar_factors_work_in_either_position() {
    assert_vec_close(
        eval_single("out v = 2 * {1, 2, 3}").vector(),
        (2.0, 4.0, 6.0),
    );
    assert_vec_close(
        eval_single("out v = {1, 2, 3} * 2").vector(),
        (2.0, 4.0, 6.0),
    );
    assert_vec_close(
        eval_single("out v = {2, 4, 6} / 2").vector(),
        (1.0, 2.0, 3.0),
    );
    assert_vec_close(
        eval_single("out v = -{1, 2, 3}").vector(),
        (-1.0, -2.0, -3.0),
    );
}

#[test]
fn evaluates_vector_comparisons() {
    assert_close(eval_float("out y = {1, 2, 3} > {0, 1, 2}"), 1.0);
    assert_close(eval_float("out y = {1, 2, 3} > {0, 5, 2}"), 0.0);
    assert_close(eval_float("out y = {1, 2, 3} <= {1, 2, 3}"), 1.0);
    assert_close(eval_float("out y = {1, 2, 3} < {1, 2, 3}"), 0.0);
}

#[test]
fn non_strict_vector_comparisons_negate_the_strict_ones() {
    // Mixed components: no strict ordering holds either way, so both
    // non-strict forms hold.
    assert_close(eval_float("out y = {0, 5, 0} <= {1, 1, 1}"), 1.0);
    assert_close(eval_float("out y = {0, 5, 0} > {1, 1, 1}"), 0.0);
    assert_close(eval_float("out y = {5, 0, 5} >= {1, 1, 1}"), 1.0);
    assert_close(eval_float("out y = {5, 0, 5} < {1, 1, 1}"), 0.0);
    // Strictly ordered operands keep the float identities.
    assert_close(eval_float("out y = {0, 0, 0} <= {1, 1, 1}"), 1.0);
    assert_close(eval_float("out y = {2, 2, 2} <= {1, 1, 1}"), 0.0);
    assert_close(eval_float("out y = {2, 2, 2} >= {1, 1, 1}"), 1.0);
    assert_close(eval_float("out y = {0, 0, 0} >= {1, 1, 1}"), 0.0);
}

#[test]
fn derived_float_comparisons_agree_on_boundaries() {
    assert_close(eval_float("out y = less_equal(2, 2)"), 1.0);
    assert_close(eval_float("out y = greater_equal(2, 3)"), 0.0);
    assert_close(eval_float("out y = 2 <= 2"), 1.0);
    assert_close(eval_float("out y = 2 >= 2"), 1.0);
}

#[test]
fn asinh_matches_the_float_primitive() {
    assert_close(eval_float("out y = asinh(1.25)"), 1.25f64.asinh());
    assert_close(eval_float("out y = asinh(0)"), 0.0);
}

#[test]
fn destructures_multi_output_calls() {
    let outputs = named_float_outputs("x, y, z = separate({1, 2, 3})\nout s = x + y + z");
    assert_close(outputs["s"], 6.0);

    let outputs = named_float_outputs("x, _, z = separate({1, 2, 3})\nout s = x + z");
    assert_close(outputs["s"], 4.0);
}

#[test]
fn polar_conversions_round_trip() {
    let outputs = named_float_outputs(
        "r, theta = cart_to_polar(3, 4)\n\
         x, y = polar_to_cart(r, theta)\n\
         out ox = x\n\
         out oy = y",
    );
    assert_close(outputs["ox"], 3.0);
    assert_close(outputs["oy"], 4.0);
}

#[test]
fn spherical_conversions_round_trip() {
    let outputs = named_float_outputs(
        "v = spherical_to_cart(2, 0.7, 1.1)\n\
         r, theta, phi = cart_to_spherical(v)\n\
         out r2 = r\n\
         out theta2 = theta\n\
         out phi2 = phi",
    );
    assert_close(outputs["r2"], 2.0);
    assert_close(outputs["theta2"], 0.7);
    assert_close(outputs["phi2"], 1.1);
}

// ---------------------------------------------------------------------------
// Declarations and lowering
// ---------------------------------------------------------------------------

#[test]
fn declarations_may_be_referenced_before_their_definition() {
    let value = eval_float("out y = twice(2)\nng twice(a: float) -> r: float { out r = a + a }");
    assert_close(value, 4.0);
}

#[test]
fn ng_calls_inline_without_creating_groups() {
    let compiled = compile_ok(
        "ng twice(a: float) -> r: float { out r = a + a }\n\
         out y = twice(1) + twice(2)",
    );
    assert!(compiled.groups.is_empty());
    assert_eq!(count_group_instances(&compiled), 0);
    // One add per expansion plus the joining add.
    assert_eq!(count_ops(&compiled, "math.add"), 3);
    assert_close(eval_outputs(&compiled)[0].1.float(), 6.0);
}

#[test]
fn fn_calls_share_one_group_definition() {
    let compiled = compile_ok(
        "fn f(a: float) -> r: float { out r = a + 1 }\n\
         out y = f(1) + f(2)",
    );
    assert_eq!(compiled.groups.len(), 1);
    assert_eq!(compiled.groups[0].name, "f");
    assert_eq!(count_group_instances(&compiled), 2);
    assert_close(eval_outputs(&compiled)[0].1.float(), 5.0);
}

#[test]
fn group_interface_carries_names_and_defaults() {
    let compiled = compile_ok(
        "fn f(a: float = 2.5, v: vector) -> r: float { out r = a + length(v) }\n\
         out y = f(1, {3, 4, 0})",
    );
    let group = &compiled.groups[0];
    assert_eq!(group.inputs[0].name, "a");
    assert_eq!(group.inputs[0].ty, ValueType::Float);
    assert_eq!(group.inputs[0].default, Some(2.5));
    assert_eq!(group.inputs[1].name, "v");
    assert_eq!(group.inputs[1].ty, ValueType::Vector);
    assert_eq!(group.inputs[1].default, None);
    assert_eq!(group.outputs[0].name, "r");
    assert!(matches!(group.graph.node(NodeId(0)).op, NodeOp::GroupInput));
    assert_close(eval_outputs(&compiled)[0].1.float(), 6.0);
}

#[test]
fn nested_groups_land_in_dependency_order() {
    let compiled = compile_ok(
        "fn inner(a: float) -> r: float { out r = a + 1 }\n\
         fn outer(a: float) -> r: float { out r = inner(a) * 2 }\n\
         out y = outer(3)",
    );
    assert_eq!(compiled.groups.len(), 2);
    assert_eq!(compiled.groups[0].name, "inner");
    assert_eq!(compiled.groups[1].name, "outer");
    let inner_instances = compiled.groups[1]
        .graph
        .iter()
        .filter(|(_, node)| matches!(node.op, NodeOp::Group(GroupId(0))))
        .count();
    assert_eq!(inner_instances, 1);
    assert_close(eval_outputs(&compiled)[0].1.float(), 8.0);
}

#[test]
fn shared_subexpressions_merge_within_a_statement() {
    let compiled = compile_ok("out y = sin(3) + sin(3)");
    assert_eq!(count_ops(&compiled, "math.sine"), 1);
    assert_eq!(count_ops(&compiled, "math.add"), 1);
}

#[test]
fn subexpressions_never_merge_across_statements() {
    let compiled = compile_ok("out a = sin(3)\nout b = sin(3)");
    assert_eq!(count_ops(&compiled, "math.sine"), 2);
}

#[test]
fn constant_expressions_fold_into_socket_values() {
    let compiled = compile_ok("out v = {1, 2, 3}");
    assert!(compiled.graph.is_empty());
    assert_eq!(
        compiled.outputs[0].binding,
        InputBinding::Constant(ConstValue::Vector(Vec3d::new(1.0, 2.0, 3.0)))
    );

    let compiled = compile_ok("out y = -5");
    assert!(compiled.graph.is_empty());
    assert_eq!(
        compiled.outputs[0].binding,
        InputBinding::Constant(ConstValue::Float(-5.0))
    );
}

#[test]
fn bare_expression_statements_become_anonymous_outputs() {
    let compiled = compile_ok("sin(1) * 2");
    assert_eq!(compiled.outputs.len(), 1);
    assert_eq!(compiled.outputs[0].name, None);
    assert_eq!(compiled.outputs[0].ty, ValueType::Float);
    assert_close(eval_outputs(&compiled)[0].1.float(), 1f64.sin() * 2.0);
}

#[test]
fn compilation_is_deterministic() {
    let source = "fn f(a: float) -> r: float { out r = sqrt(a) + 1 }\n\
                  v = {1, 2, 3}\n\
                  out y = f(length(v)) * f(dot(v, v))";
    let compiler = Compiler::new();
    let first = compiler.compile(source).expect("compile");
    let second = compiler.compile(source).expect("compile");
    assert_eq!(first, second);
}

#[test]
fn graph_dump_lists_groups_and_outputs() {
    let compiled = compile_ok(
        "fn f(a: float) -> r: float { out r = a * 2 }\n\
         out y = f(3)",
    );
    let dump = compiled.dump();
    assert!(dump.contains("group g0 f:"));
    assert!(dump.contains("root:"));
    assert!(dump.contains("out y"));
}

#[test]
fn emit_replays_groups_nodes_links_and_outputs_in_order() {
    #[derive(Default)]
    struct RecordingSink {
        events: Vec<String>,
    }

    impl GraphSink for RecordingSink {
        fn add_node(&mut self, node: NodeId, op: &str, _label: Option<&str>) {
            self.events.push(format!("node n{} {op}", node.0));
        }
        fn define_group(&mut self, group: GroupId, definition: &NodeGroupDefinition) {
            self.events
                .push(format!("group g{} {}", group.0, definition.name));
        }
        fn instantiate_group(&mut self, node: NodeId, group: GroupId, _label: Option<&str>) {
            self.events.push(format!("instance n{} g{}", node.0, group.0));
        }
        fn add_link(&mut self, from: OutputSocket, to_node: NodeId, to_input: usize) {
            self.events.push(format!(
                "link n{}.{} -> n{}.{}",
                from.node.0, from.index, to_node.0, to_input
            ));
        }
        fn set_input_value(&mut self, node: NodeId, input: usize, _value: ConstValue) {
            self.events.push(format!("value n{}.{}", node.0, input));
        }
        fn add_output(&mut self, name: Option<&str>, _ty: ValueType, _binding: &InputBinding) {
            self.events.push(format!("output {}", name.unwrap_or("_")));
        }
    }

    let compiled = compile_ok(
        "fn f(a: float) -> r: float { out r = a * 2 }\n\
         out y = f(3) + 1",
    );
    let mut sink = RecordingSink::default();
    compiled.emit_to(&mut sink);
    assert_eq!(
        sink.events,
        vec![
            "group g0 f".to_string(),
            "instance n0 g0".to_string(),
            "value n0.0".to_string(),
            "node n1 math.add".to_string(),
            "link n0.0 -> n1.0".to_string(),
            "value n1.1".to_string(),
            "output y".to_string(),
        ]
    );
}

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

#[test]
fn reports_line_and_column_for_unknown_identifiers() {
    let err = compile_err("x = 1\nout y = x + q");
    assert_eq!(err.kind, ErrorKind::UnresolvedReference);
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 13);
    assert_eq!(err.snippet, "out y = x + q");
    assert_eq!(first_caret_column(&err.pointer), Some(err.column));
    assert!(err.to_string().contains("Unknown identifier `q`"));
}

#[test]
fn reports_unknown_constants() {
    assert_error(
        "out y = #zeta",
        ErrorKind::UnknownConstant,
        "Unknown constant `#zeta`",
    );
}

#[test]
fn reports_unknown_functions_and_failed_overloads() {
    assert_error(
        "out y = frobnicate(1)",
        ErrorKind::NoMatch,
        "Unknown function `frobnicate`",
    );

    let err = compile_err("out y = sin(1, 2)");
    assert_eq!(err.kind, ErrorKind::NoMatch);
    assert!(err.message.contains("No overload of `sin` matches"));
    assert!(err.message.contains("candidate: sin(float) -> float"));

    // Vector equality has no builtin and no derived overload.
    assert_error(
        "out y = {1, 2, 3} == {1, 2, 3}",
        ErrorKind::NoMatch,
        "No overload of `equal` matches",
    );
}

#[test]
fn reports_multi_output_values_in_single_value_positions() {
    assert_error(
        "out y = separate({1, 2, 3}) + 1",
        ErrorKind::TypeMismatch,
        "multi-output value",
    );
    assert_error(
        "out y = cart_to_polar(1, 2)",
        ErrorKind::TypeMismatch,
        "multi-output value",
    );
}

#[test]
fn reports_destructuring_arity_mismatches() {
    assert_error(
        "x, y = {1, 2, 3}\nout o = x",
        ErrorKind::ArityMismatch,
        "Cannot assign",
    );
    assert_error(
        "p = cart_to_polar(1, 2)\nout o = p",
        ErrorKind::ArityMismatch,
        "Cannot assign",
    );
    assert_error(
        "x, y = separate({1, 2, 3})\nout o = x",
        ErrorKind::ArityMismatch,
        "Cannot assign",
    );
}

#[test]
fn reports_vector_literal_shape_errors() {
    assert_error(
        "out y = {1, 2}",
        ErrorKind::Arity,
        "Vector literal takes exactly 3 elements",
    );
    assert_error(
        "out y = {1, {1, 2, 3}, 2}",
        ErrorKind::TypeMismatch,
        "Vector literal elements must be float",
    );
}

#[test]
fn reports_function_output_contract_violations() {
    assert_error(
        "fn f(x: float) -> r: float { x + 1 }\nout y = f(1)",
        ErrorKind::MissingOutput,
        "never assigns its output `r`",
    );
    assert_error(
        "fn f(x: float) -> r: float { out q = x }\nout y = f(1)",
        ErrorKind::UnresolvedReference,
        "declares no output named `q`",
    );
    assert_error(
        "fn f(x: float) -> r: float { out r = x out r = x }\nout y = f(1)",
        ErrorKind::DuplicateOutput,
        "`r`",
    );
    assert_error(
        "fn f(x: float) -> r: vector { out r = x }\nout y = f(1)",
        ErrorKind::TypeMismatch,
        "Output `r` expects vector",
    );
}

#[test]
fn reports_duplicate_graph_outputs() {
    assert_error(
        "out y = 1\nout y = 2",
        ErrorKind::DuplicateOutput,
        "Graph output `y` is declared more than once",
    );
}

#[test]
fn reports_duplicate_signatures() {
    assert_error(
        "ng f(a: float) -> r: float { out r = a }\n\
         ng f(b: float) -> r: float { out r = b }\n\
         out y = f(1)",
        ErrorKind::DuplicateSignature,
        "Duplicate signature `f(float) -> float`",
    );

    // Same name with a different parameter-type list is a legal overload.
    let value = eval_float(
        "ng f(a: float) -> r: float { out r = a }\n\
         ng f(a: float, b: float) -> r: float { out r = a + b }\n\
         out y = f(1) + f(2, 3)",
    );
    assert_close(value, 6.0);
}

#[test]
fn reports_recursive_expansions() {
    assert_error(
        "ng f(a: float) -> r: float { out r = f(a) }\nout y = f(1)",
        ErrorKind::RecursiveMacro,
        "Recursive expansion of `f`",
    );
    assert_error(
        "ng f(a: float) -> r: float { out r = g(a) }\n\
         ng g(a: float) -> r: float { out r = f(a) }\n\
         out y = f(1)",
        ErrorKind::RecursiveMacro,
        "Recursive expansion",
    );
    assert_error(
        "fn f(a: float) -> r: float { out r = f(a) }\nout y = f(1)",
        ErrorKind::RecursiveMacro,
        "Recursive expansion of `f`",
    );
}

// ---------------------------------------------------------------------------
// Compiler sessions
// ---------------------------------------------------------------------------

#[test]
fn library_functions_persist_across_compiles() {
    let mut compiler = Compiler::new();
    compiler
        .add_functions(
            "lib.mf",
            "ng double(a: float) -> r: float { out r = 2 * a }",
        )
        .expect("library should register");
    let compiled = compiler.compile("out y = double(21)").expect("compile");
    assert_close(eval_outputs(&compiled)[0].1.float(), 42.0);
}

#[test]
fn formula_declarations_never_leak_into_the_compiler() {
    let compiler = Compiler::new();
    let compiled = compiler
        .compile("ng h(a: float) -> r: float { out r = a }\nout y = h(1)")
        .expect("compile");
    assert_close(eval_outputs(&compiled)[0].1.float(), 1.0);

    let err = compiler
        .compile("out y = h(1)")
        .expect_err("h should be unknown");
    assert_eq!(err.kind, ErrorKind::NoMatch);
}

#[test]
fn libraries_reject_top_level_statements() {
    let mut compiler = Compiler::new();
    let err = compiler
        .add_functions("lib.mf", "out y = 1")
        .expect_err("library should be rejected");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.file, "lib.mf");
    assert!(err.message.contains("top-level statements"));
}

#[test]
fn user_constants_participate_in_folding_and_lookup() {
    let mut compiler = Compiler::new();
    compiler.define_constant("g", ConstValue::Float(9.81));
    compiler.define_constant("up", ConstValue::Vector(Vec3d::new(0.0, 0.0, 1.0)));

    let compiled = compiler.compile("out y = #g * 2").expect("compile");
    assert_close(eval_outputs(&compiled)[0].1.float(), 19.62);

    let compiled = compiler.compile("out v = #up + {1, 0, 0}").expect("compile");
    assert_vec_close(eval_outputs(&compiled)[0].1.vector(), (1.0, 0.0, 1.0));
}
