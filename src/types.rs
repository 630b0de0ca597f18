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

//! Value types, signatures, and constant values shared by the resolver,
//! registry, and graph layers.

use crate::ast::TypeName;
use rs_math3d::Vec3d;
use std::fmt;

/// Socket-level value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Scalar (`f64`) value.
    Float,
    /// 3D vector value.
    Vector,
}

impl From<TypeName> for ValueType {
    fn from(ty: TypeName) -> Self {
        match ty {
            TypeName::Float => ValueType::Float,
            TypeName::Vector => ValueType::Vector,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Float => f.write_str("float"),
            ValueType::Vector => f.write_str("vector"),
        }
    }
}

/// Type of a resolved expression.
///
/// Multi-output calls produce flat tuples; tuples never nest and only exist
/// transiently between a call and the destructuring assignment that consumes
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprType {
    /// Single socket-typed value.
    Value(ValueType),
    /// Flat multi-output result (arity > 1).
    Tuple(Vec<ValueType>),
}

impl ExprType {
    /// Number of values carried.
    pub fn arity(&self) -> usize {
        match self {
            ExprType::Value(_) => 1,
            ExprType::Tuple(types) => types.len(),
        }
    }

    /// Returns the single value type, if this is not a tuple.
    pub fn as_value(&self) -> Option<ValueType> {
        match self {
            ExprType::Value(ty) => Some(*ty),
            ExprType::Tuple(_) => None,
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprType::Value(ty) => write!(f, "{ty}"),
            ExprType::Tuple(types) => {
                f.write_str("(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Compile-time constant socket value.
#[derive(Clone, Copy)]
pub enum ConstValue {
    /// Scalar constant.
    Float(f64),
    /// Vector constant.
    Vector(Vec3d),
}

impl ConstValue {
    /// Socket type of the constant.
    pub fn value_type(&self) -> ValueType {
        match self {
            ConstValue::Float(_) => ValueType::Float,
            ConstValue::Vector(_) => ValueType::Vector,
        }
    }
}

impl fmt::Debug for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Float(v) => write!(f, "{v}"),
            ConstValue::Vector(v) => write!(f, "{{{}, {}, {}}}", v.x, v.y, v.z),
        }
    }
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConstValue::Float(a), ConstValue::Float(b)) => a == b,
            (ConstValue::Vector(a), ConstValue::Vector(b)) => {
                a.x == b.x && a.y == b.y && a.z == b.z
            }
            _ => false,
        }
    }
}

/// One typed parameter of a function signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSig {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: ValueType,
    /// Default socket value for node-group inputs.
    pub default: Option<f64>,
}

/// One typed output of a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSig {
    /// Output name.
    pub name: String,
    /// Output type.
    pub ty: ValueType,
}

/// Resolved callable interface.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    /// Function name; overloads share it.
    pub name: String,
    /// Parameters in declaration order.
    pub params: Vec<ParamSig>,
    /// Outputs in declaration order; never empty.
    pub outputs: Vec<OutputSig>,
    /// `ng` declarations inline at call sites; `fn` become node groups.
    pub is_macro: bool,
}

impl FunctionSignature {
    /// Parameter types in order.
    pub fn param_types(&self) -> Vec<ValueType> {
        self.params.iter().map(|p| p.ty).collect()
    }

    /// Result type seen by a call site.
    pub fn result_type(&self) -> ExprType {
        if self.outputs.len() == 1 {
            ExprType::Value(self.outputs[0].ty)
        } else {
            ExprType::Tuple(self.outputs.iter().map(|o| o.ty).collect())
        }
    }

    /// Identity key within a compilation unit.
    pub fn key(&self) -> SignatureKey {
        SignatureKey {
            name: self.name.clone(),
            params: self.param_types(),
        }
    }
}

/// Overload identity: name plus exact parameter-type list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    /// Function name.
    pub name: String,
    /// Parameter types in order.
    pub params: Vec<ValueType>,
}
