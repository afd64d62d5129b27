//! Tensor types and the type-constraint predicates.
//!
//! A `TensorType` is the boundary representation of an IR value's type:
//! an element type plus a shape. `TypeConstraint` is the closed predicate
//! vocabulary operand and result specs are written in.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dtype::{ElemType, FloatType, IntType, QuantizedType};
use crate::shape::Shape;

/// The type of a tensor-valued IR operand or result.
///
/// # Examples
///
/// ```
/// use fxpir::{IntType, Shape, TensorType, TypeConstraint};
///
/// let t = TensorType::int(IntType::I32, Shape::new(&[3]));
/// assert!(TypeConstraint::IntegerLike.satisfies(&t));
/// assert!(!TypeConstraint::RealValue.satisfies(&t));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorType {
    /// Element type.
    pub elem: ElemType,
    /// Shape.
    pub shape: Shape,
}

impl TensorType {
    /// Creates a tensor type from an element type and shape.
    #[must_use]
    pub fn new(elem: ElemType, shape: Shape) -> Self {
        Self { elem, shape }
    }

    /// Integer tensor type.
    #[must_use]
    pub fn int(int: IntType, shape: Shape) -> Self {
        Self::new(ElemType::Int(int), shape)
    }

    /// Float tensor type.
    #[must_use]
    pub fn float(float: FloatType, shape: Shape) -> Self {
        Self::new(ElemType::Float(float), shape)
    }

    /// Quantized tensor type.
    #[must_use]
    pub fn quantized(quant: QuantizedType, shape: Shape) -> Self {
        Self::new(ElemType::Quantized(quant), shape)
    }

    /// Single-bit boolean tensor type, as produced by compare-to-zero.
    #[must_use]
    pub fn bool_like(shape: Shape) -> Self {
        Self::int(IntType::I1, shape)
    }

    /// Whether this is the single-bit boolean tensor type.
    #[must_use]
    pub fn is_bool_like(&self) -> bool {
        self.elem == ElemType::Int(IntType::I1)
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tensor<{}, {}>", self.elem, self.shape)
    }
}

/// The closed vocabulary of type constraints operand/result specs use.
///
/// `RealValue` accepts either a plain floating-point representation or a
/// quantized one; the integer-domain operations see quantized values only
/// after the lowering pass has cast them to their storage type, so
/// `IntegerLike` accepts integer storage alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeConstraint {
    /// Integer storage representation.
    IntegerLike,
    /// Floating-point representation.
    FloatLike,
    /// Real number: floating point or quantized.
    RealValue,
}

impl TypeConstraint {
    /// Whether `ty`'s representation satisfies this constraint.
    #[must_use]
    pub fn satisfies(self, ty: &TensorType) -> bool {
        match self {
            Self::IntegerLike => ty.elem.is_integer_like(),
            Self::FloatLike => ty.elem.is_float_like(),
            Self::RealValue => ty.elem.is_real_value(),
        }
    }
}

impl fmt::Display for TypeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegerLike => write!(f, "integer-like"),
            Self::FloatLike => write!(f, "float-like"),
            Self::RealValue => write!(f, "real value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i32_tensor() -> TensorType {
        TensorType::int(IntType::I32, Shape::new(&[4]))
    }

    fn f32_tensor() -> TensorType {
        TensorType::float(FloatType::F32, Shape::new(&[4]))
    }

    fn quant_tensor() -> TensorType {
        let q = QuantizedType::new(0.5, 0, IntType::I8).unwrap();
        TensorType::quantized(q, Shape::new(&[4]))
    }

    #[test]
    fn test_integer_like() {
        assert!(TypeConstraint::IntegerLike.satisfies(&i32_tensor()));
        assert!(!TypeConstraint::IntegerLike.satisfies(&f32_tensor()));
        assert!(!TypeConstraint::IntegerLike.satisfies(&quant_tensor()));
    }

    #[test]
    fn test_float_like() {
        assert!(TypeConstraint::FloatLike.satisfies(&f32_tensor()));
        assert!(!TypeConstraint::FloatLike.satisfies(&i32_tensor()));
        assert!(!TypeConstraint::FloatLike.satisfies(&quant_tensor()));
    }

    #[test]
    fn test_real_value_accepts_float_and_quantized() {
        assert!(TypeConstraint::RealValue.satisfies(&f32_tensor()));
        assert!(TypeConstraint::RealValue.satisfies(&quant_tensor()));
        assert!(!TypeConstraint::RealValue.satisfies(&i32_tensor()));
    }

    #[test]
    fn test_bool_like() {
        let b = TensorType::bool_like(Shape::new(&[3]));
        assert!(b.is_bool_like());
        assert!(TypeConstraint::IntegerLike.satisfies(&b));
        assert!(!i32_tensor().is_bool_like());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", i32_tensor()), "tensor<i32, [4]>");
        assert_eq!(format!("{}", TypeConstraint::RealValue), "real value");
    }

    #[test]
    fn test_serde_roundtrip() {
        let t = quant_tensor();
        let json = serde_json::to_string(&t).unwrap();
        let back: TensorType = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
