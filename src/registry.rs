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

//! Function registry: overload sets, exact-match lookup, and the primitive
//! builtin table.

use crate::types::{FunctionSignature, OutputSig, ParamSig, SignatureKey, ValueType};
use std::collections::HashMap;
use std::rc::Rc;

/// One registered overload.
#[derive(Debug, Clone)]
pub struct FunctionEntry {
    /// Callable interface.
    pub signature: Rc<FunctionSignature>,
    /// Primitive node operation tag, or `None` for user/prelude functions
    /// whose bodies are lowered.
    pub builtin: Option<&'static str>,
}

/// `register` failure: the exact parameter-type list is already taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSignatureError {
    /// The clashing overload identity.
    pub key: SignatureKey,
}

/// `lookup` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// No overload with the given name accepts the argument types.
    NoMatch,
    /// More than one overload matched.
    ///
    /// Unreachable while `register` rejects duplicate parameter-type lists;
    /// kept so the lookup contract is total.
    Ambiguous,
}

/// Name-indexed overload sets.
///
/// Lookup is exact-match on the parameter-type list; there is no widening
/// and no scoring, so resolution is deterministic by construction.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    overloads: HashMap<String, Vec<FunctionEntry>>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            overloads: HashMap::new(),
        }
    }

    /// Creates a registry pre-populated with the primitive builtins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (signature, op) in builtin_table() {
            registry
                .register(signature, Some(op))
                .expect("builtin table has no duplicate signatures");
        }
        registry
    }

    /// Registers an overload; fails when the exact parameter-type list is
    /// already present under the same name.
    pub fn register(
        &mut self,
        signature: FunctionSignature,
        builtin: Option<&'static str>,
    ) -> Result<Rc<FunctionSignature>, DuplicateSignatureError> {
        let key = signature.key();
        let entries = self.overloads.entry(signature.name.clone()).or_default();
        if entries.iter().any(|e| e.signature.key() == key) {
            return Err(DuplicateSignatureError { key });
        }
        let signature = Rc::new(signature);
        entries.push(FunctionEntry {
            signature: Rc::clone(&signature),
            builtin,
        });
        Ok(signature)
    }

    /// Finds the overload whose parameter types equal `arg_types` exactly.
    pub fn lookup(
        &self,
        name: &str,
        arg_types: &[ValueType],
    ) -> Result<&FunctionEntry, LookupError> {
        let entries = self.overloads.get(name).ok_or(LookupError::NoMatch)?;
        let mut found = None;
        for entry in entries {
            if entry.signature.param_types() == arg_types {
                if found.is_some() {
                    return Err(LookupError::Ambiguous);
                }
                found = Some(entry);
            }
        }
        found.ok_or(LookupError::NoMatch)
    }

    /// Returns all overloads registered under `name`, for diagnostics.
    pub fn candidates(&self, name: &str) -> Vec<String> {
        self.overloads
            .get(name)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| render_signature(&e.signature))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders `name(float, vector) -> float` for error messages.
pub(crate) fn render_signature(signature: &FunctionSignature) -> String {
    let params = signature
        .params
        .iter()
        .map(|p| p.ty.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let outputs = signature
        .outputs
        .iter()
        .map(|o| o.ty.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({params}) -> {outputs}", signature.name)
}

const F: ValueType = ValueType::Float;
const V: ValueType = ValueType::Vector;

/// Builds a builtin signature from positional parameter/output types.
fn builtin(name: &str, params: &[ValueType], outputs: &[(&str, ValueType)]) -> FunctionSignature {
    const PARAM_NAMES: [&str; 3] = ["a", "b", "c"];
    FunctionSignature {
        name: name.to_string(),
        params: params
            .iter()
            .enumerate()
            .map(|(i, ty)| ParamSig {
                name: PARAM_NAMES[i].to_string(),
                ty: *ty,
                default: None,
            })
            .collect(),
        outputs: outputs
            .iter()
            .map(|(name, ty)| OutputSig {
                name: name.to_string(),
                ty: *ty,
            })
            .collect(),
        is_macro: false,
    }
}

/// The primitive node vocabulary.
///
/// Every entry lowers to a single graph node tagged with its operation
/// string. Scalar-position `mul`/`div` variants, vector `neg`, and vector
/// comparisons are prelude functions built on top of these.
fn builtin_table() -> Vec<(FunctionSignature, &'static str)> {
    let one = |ty| [("value", ty)];
    vec![
        // Float arithmetic.
        (builtin("add", &[F, F], &one(F)), "math.add"),
        (builtin("sub", &[F, F], &one(F)), "math.subtract"),
        (builtin("mul", &[F, F], &one(F)), "math.multiply"),
        (builtin("div", &[F, F], &one(F)), "math.divide"),
        (builtin("neg", &[F], &one(F)), "math.negate"),
        (builtin("power", &[F, F], &one(F)), "math.power"),
        (builtin("sqrt", &[F], &one(F)), "math.sqrt"),
        (builtin("log", &[F, F], &one(F)), "math.logarithm"),
        (builtin("exp", &[F], &one(F)), "math.exponent"),
        (builtin("sin", &[F], &one(F)), "math.sine"),
        (builtin("cos", &[F], &one(F)), "math.cosine"),
        (builtin("tan", &[F], &one(F)), "math.tangent"),
        (builtin("asin", &[F], &one(F)), "math.arcsine"),
        (builtin("acos", &[F], &one(F)), "math.arccosine"),
        (builtin("atan2", &[F, F], &one(F)), "math.arctan2"),
        (builtin("abs", &[F], &one(F)), "math.absolute"),
        (builtin("min", &[F, F], &one(F)), "math.minimum"),
        (builtin("max", &[F, F], &one(F)), "math.maximum"),
        // Float comparison; results are 0.0/1.0.
        (builtin("less_than", &[F, F], &one(F)), "math.less_than"),
        (builtin("greater_than", &[F, F], &one(F)), "math.greater_than"),
        (builtin("equal", &[F, F], &one(F)), "math.equal"),
        // Boolean over 0.0/1.0 floats.
        (builtin("_and", &[F, F], &one(F)), "math.and"),
        (builtin("_or", &[F, F], &one(F)), "math.or"),
        (builtin("_not", &[F], &one(F)), "math.not"),
        // Component-wise vector arithmetic.
        (builtin("add", &[V, V], &one(V)), "vector.add"),
        (builtin("sub", &[V, V], &one(V)), "vector.subtract"),
        (builtin("mul", &[V, V], &one(V)), "vector.multiply"),
        (builtin("div", &[V, V], &one(V)), "vector.divide"),
        (builtin("scale", &[V, F], &one(V)), "vector.scale"),
        (builtin("dot", &[V, V], &one(F)), "vector.dot_product"),
        (builtin("length", &[V], &one(F)), "vector.length"),
        (builtin("normalize", &[V], &one(V)), "vector.normalize"),
        // Component packing.
        (builtin("combine", &[F, F, F], &one(V)), "combine_xyz"),
        (
            builtin("separate", &[V], &[("x", F), ("y", F), ("z", F)]),
            "separate_xyz",
        ),
    ]
}
