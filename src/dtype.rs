//! Element types for the catalog's tensor values.
//!
//! The catalog classifies element representations three ways: integer
//! storage types, IEEE floats, and quantized reals (an integer storage
//! type together with a scale and zero-point). Quantized types are
//! first-class citizens, not an annotation layered on top.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A signed or unsigned integer storage type of 1 to 64 bits.
///
/// # Examples
///
/// ```
/// use fxpir::IntType;
///
/// assert_eq!(IntType::I8.signed_range(), (-128, 127));
/// assert_eq!(IntType::new(1, false).signed_range(), (0, 1));
/// assert_eq!(format!("{}", IntType::I32), "i32");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntType {
    /// Bit width, 1 to 64.
    pub width: u32,
    /// Whether values are interpreted as two's-complement signed.
    pub signed: bool,
}

impl IntType {
    /// Signed 8-bit integer.
    pub const I8: Self = Self { width: 8, signed: true };
    /// Unsigned 8-bit integer.
    pub const U8: Self = Self { width: 8, signed: false };
    /// Signed 16-bit integer.
    pub const I16: Self = Self { width: 16, signed: true };
    /// Signed 32-bit integer.
    pub const I32: Self = Self { width: 32, signed: true };
    /// Signed 64-bit integer.
    pub const I64: Self = Self { width: 64, signed: true };
    /// Single-bit boolean storage, as produced by compare-to-zero.
    pub const I1: Self = Self { width: 1, signed: false };

    /// Creates an integer type. Width is clamped into 1..=64.
    #[must_use]
    pub fn new(width: u32, signed: bool) -> Self {
        Self {
            width: width.clamp(1, 64),
            signed,
        }
    }

    /// The inclusive representable range of this type.
    ///
    /// A signed width-w type spans `[-2^(w-1), 2^(w-1) - 1]`; an unsigned
    /// one spans `[0, 2^w - 1]`. Returned as `i128` so 64-bit ranges are
    /// exact.
    #[must_use]
    pub const fn signed_range(self) -> (i128, i128) {
        if self.signed {
            let half = 1i128 << (self.width - 1);
            (-half, half - 1)
        } else {
            (0, (1i128 << self.width) - 1)
        }
    }

    /// Whether `value` lies within the representable range.
    #[must_use]
    pub const fn contains(self, value: i128) -> bool {
        let (min, max) = self.signed_range();
        min <= value && value <= max
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.signed { 'i' } else { 'u' };
        write!(f, "{prefix}{}", self.width)
    }
}

/// IEEE 754 floating-point element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatType {
    /// 32-bit single precision.
    F32,
    /// 64-bit double precision.
    F64,
}

impl fmt::Display for FloatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
        }
    }
}

/// A quantized real type: integer storage plus scale and zero-point.
///
/// The real value represented by a storage value `q` is
/// `scale * (q - zero_point)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizedType {
    /// Positive, finite multiplier from storage steps to real values.
    pub scale: f64,
    /// Storage value that represents real zero.
    pub zero_point: i64,
    /// Underlying integer storage type.
    pub storage: IntType,
}

impl QuantizedType {
    /// Creates a quantized type. Returns `None` for a non-finite or
    /// non-positive scale.
    #[must_use]
    pub fn new(scale: f64, zero_point: i64, storage: IntType) -> Option<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        Some(Self {
            scale,
            zero_point,
            storage,
        })
    }

    /// The real value represented by storage value `q`.
    #[must_use]
    pub fn dequantize(&self, q: i128) -> f64 {
        self.scale * (q as f64 - self.zero_point as f64)
    }

    /// Encodes a real value into storage.
    ///
    /// Rounds to the nearest storage step (ties away from zero, matching
    /// `f64::round`) and saturates to the storage range. Any clamping of
    /// the real value must happen before this call.
    #[must_use]
    pub fn quantize(&self, value: f64) -> i128 {
        let (min, max) = self.storage.signed_range();
        let q = (value / self.scale).round() as i128 + i128::from(self.zero_point);
        q.clamp(min, max)
    }
}

impl fmt::Display for QuantizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "quant<{}, scale={}, zp={}>",
            self.storage, self.scale, self.zero_point
        )
    }
}

/// An element type: integer storage, float, or quantized real.
///
/// # Examples
///
/// ```
/// use fxpir::{ElemType, FloatType, IntType};
///
/// let int = ElemType::Int(IntType::I32);
/// let float = ElemType::Float(FloatType::F32);
///
/// assert!(int.is_integer_like());
/// assert!(float.is_real_value());
/// assert!(!int.is_real_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ElemType {
    /// Integer storage.
    Int(IntType),
    /// IEEE float.
    Float(FloatType),
    /// Quantized real.
    Quantized(QuantizedType),
}

impl ElemType {
    /// Whether this is an integer storage type.
    #[must_use]
    pub const fn is_integer_like(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Whether this is a floating-point type.
    #[must_use]
    pub const fn is_float_like(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    /// Whether this represents a real number: float or quantized.
    #[must_use]
    pub const fn is_real_value(&self) -> bool {
        matches!(self, Self::Float(_) | Self::Quantized(_))
    }

    pub const fn as_int(&self) -> Option<IntType> {
        match self {
            Self::Int(t) => Some(*t),
            _ => None,
        }
    }

    pub const fn as_quantized(&self) -> Option<QuantizedType> {
        match self {
            Self::Quantized(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(t) => write!(f, "{t}"),
            Self::Float(t) => write!(f, "{t}"),
            Self::Quantized(t) => write!(f, "{t}"),
        }
    }
}

impl From<IntType> for ElemType {
    fn from(t: IntType) -> Self {
        Self::Int(t)
    }
}

impl From<FloatType> for ElemType {
    fn from(t: FloatType) -> Self {
        Self::Float(t)
    }
}

impl From<QuantizedType> for ElemType {
    fn from(t: QuantizedType) -> Self {
        Self::Quantized(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_ranges() {
        assert_eq!(IntType::I8.signed_range(), (-128, 127));
        assert_eq!(IntType::U8.signed_range(), (0, 255));
        assert_eq!(IntType::I32.signed_range(), (-(1 << 31), (1 << 31) - 1));
        assert_eq!(
            IntType::I64.signed_range(),
            (i128::from(i64::MIN), i128::from(i64::MAX))
        );
        assert_eq!(IntType::I1.signed_range(), (0, 1));
    }

    #[test]
    fn test_contains() {
        assert!(IntType::I8.contains(127));
        assert!(!IntType::I8.contains(128));
        assert!(IntType::I8.contains(-128));
        assert!(!IntType::U8.contains(-1));
    }

    #[test]
    fn test_width_is_clamped() {
        assert_eq!(IntType::new(0, true).width, 1);
        assert_eq!(IntType::new(99, true).width, 64);
    }

    #[test]
    fn test_categories() {
        assert!(ElemType::Int(IntType::I32).is_integer_like());
        assert!(!ElemType::Int(IntType::I32).is_real_value());
        assert!(ElemType::Float(FloatType::F32).is_float_like());
        assert!(ElemType::Float(FloatType::F32).is_real_value());

        let q = QuantizedType::new(0.5, 0, IntType::I8).unwrap();
        assert!(ElemType::Quantized(q).is_real_value());
        assert!(!ElemType::Quantized(q).is_integer_like());
    }

    #[test]
    fn test_quantized_rejects_bad_scale() {
        assert!(QuantizedType::new(0.0, 0, IntType::I8).is_none());
        assert!(QuantizedType::new(-1.0, 0, IntType::I8).is_none());
        assert!(QuantizedType::new(f64::NAN, 0, IntType::I8).is_none());
    }

    #[test]
    fn test_quantize_dequantize() {
        let q = QuantizedType::new(0.5, 10, IntType::I8).unwrap();
        assert_eq!(q.dequantize(10), 0.0);
        assert_eq!(q.dequantize(12), 1.0);
        assert_eq!(q.quantize(1.0), 12);
        // Saturates to storage range instead of wrapping.
        assert_eq!(q.quantize(1000.0), 127);
        assert_eq!(q.quantize(-1000.0), -128);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", IntType::I32), "i32");
        assert_eq!(format!("{}", IntType::U8), "u8");
        assert_eq!(format!("{}", FloatType::F64), "f64");
        let q = QuantizedType::new(0.25, -3, IntType::U8).unwrap();
        assert_eq!(format!("{q}"), "quant<u8, scale=0.25, zp=-3>");
    }

    #[test]
    fn test_serde_roundtrip() {
        let e = ElemType::Quantized(QuantizedType::new(0.1, 5, IntType::I8).unwrap());
        let json = serde_json::to_string(&e).unwrap();
        let back: ElemType = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
