//! Attribute kinds and values usable by operations.
//!
//! Three families: wide signed integer constants, 64-bit real constants
//! (optional on the operations that take them; absence means "no clamp"),
//! and two closed string enums selecting a unary function or a
//! zero-comparison predicate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The unary-function selector of the real unary elementwise operation.
///
/// Twelve functions share one operation so lookup-table lowering and
/// fusion of consecutive unary applications stay generic.
///
/// # Examples
///
/// ```
/// use fxpir::UnaryFn;
///
/// assert_eq!(UnaryFn::default(), UnaryFn::Identity);
/// assert_eq!("ABS".parse::<UnaryFn>().unwrap(), UnaryFn::Abs);
/// assert_eq!(UnaryFn::Tanh.to_string(), "TANH");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnaryFn {
    Abs,
    Exp,
    #[default]
    Identity,
    Log,
    Neg,
    Rsqrt,
    Sigmoid,
    Sign,
    Sin,
    Sqrt,
    Square,
    Tanh,
}

impl UnaryFn {
    /// All twelve selector values in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Abs,
        Self::Exp,
        Self::Identity,
        Self::Log,
        Self::Neg,
        Self::Rsqrt,
        Self::Sigmoid,
        Self::Sign,
        Self::Sin,
        Self::Sqrt,
        Self::Square,
        Self::Tanh,
    ];

    /// Applies the selected mathematical function to one element.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Abs => x.abs(),
            Self::Exp => x.exp(),
            Self::Identity => x,
            Self::Log => x.ln(),
            Self::Neg => -x,
            Self::Rsqrt => 1.0 / x.sqrt(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Self::Sin => x.sin(),
            Self::Sqrt => x.sqrt(),
            Self::Square => x * x,
            Self::Tanh => x.tanh(),
        }
    }
}

impl fmt::Display for UnaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Abs => "ABS",
            Self::Exp => "EXP",
            Self::Identity => "IDENTITY",
            Self::Log => "LOG",
            Self::Neg => "NEG",
            Self::Rsqrt => "RSQRT",
            Self::Sigmoid => "SIGMOID",
            Self::Sign => "SIGN",
            Self::Sin => "SIN",
            Self::Sqrt => "SQRT",
            Self::Square => "SQUARE",
            Self::Tanh => "TANH",
        };
        write!(f, "{s}")
    }
}

impl FromStr for UnaryFn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ABS" => Ok(Self::Abs),
            "EXP" => Ok(Self::Exp),
            "IDENTITY" => Ok(Self::Identity),
            "LOG" => Ok(Self::Log),
            "NEG" => Ok(Self::Neg),
            "RSQRT" => Ok(Self::Rsqrt),
            "SIGMOID" => Ok(Self::Sigmoid),
            "SIGN" => Ok(Self::Sign),
            "SIN" => Ok(Self::Sin),
            "SQRT" => Ok(Self::Sqrt),
            "SQUARE" => Ok(Self::Square),
            "TANH" => Ok(Self::Tanh),
            other => Err(format!("unknown unary function '{other}'")),
        }
    }
}

/// The zero-relative comparison selector of compare-to-zero.
///
/// By convention of the surrounding lowering pipeline the operand is
/// already the result of a subtraction; the operation performs only the
/// comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompareFn {
    /// Equal to zero.
    Cmpz,
    /// Not equal to zero.
    Cmpnz,
    /// Less than zero.
    Cmplz,
    /// Less than or equal to zero.
    Cmplze,
    /// Greater than zero.
    Cmpgz,
    /// Greater than or equal to zero.
    Cmpgze,
}

impl CompareFn {
    /// All six selector values in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Cmpz,
        Self::Cmpnz,
        Self::Cmplz,
        Self::Cmplze,
        Self::Cmpgz,
        Self::Cmpgze,
    ];

    /// Applies the selected predicate to one element.
    #[must_use]
    pub fn apply(self, x: f64) -> bool {
        match self {
            Self::Cmpz => x == 0.0,
            Self::Cmpnz => x != 0.0,
            Self::Cmplz => x < 0.0,
            Self::Cmplze => x <= 0.0,
            Self::Cmpgz => x > 0.0,
            Self::Cmpgze => x >= 0.0,
        }
    }
}

impl fmt::Display for CompareFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cmpz => "CMPZ",
            Self::Cmpnz => "CMPNZ",
            Self::Cmplz => "CMPLZ",
            Self::Cmplze => "CMPLZE",
            Self::Cmpgz => "CMPGZ",
            Self::Cmpgze => "CMPGZE",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CompareFn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CMPZ" => Ok(Self::Cmpz),
            "CMPNZ" => Ok(Self::Cmpnz),
            "CMPLZ" => Ok(Self::Cmplz),
            "CMPLZE" => Ok(Self::Cmplze),
            "CMPGZ" => Ok(Self::Cmpgz),
            "CMPGZE" => Ok(Self::Cmpgze),
            other => Err(format!("unknown comparison function '{other}'")),
        }
    }
}

/// The kind of an attribute, for kind checking against a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    /// Wide signed integer constant.
    Int,
    /// 64-bit real constant.
    Real,
    /// Unary-function selector.
    UnaryFn,
    /// Comparison selector.
    CompareFn,
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Real => write!(f, "real"),
            Self::UnaryFn => write!(f, "unary_fn"),
            Self::CompareFn => write!(f, "compare_fn"),
        }
    }
}

/// A concrete attribute value bound on an operation instance.
///
/// Integer constants are carried as `i128`: wide enough to hold any value
/// of the catalog's integer types (at most 64 bits) with headroom for the
/// full-width products the reference kernels form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    Int(i128),
    Real(f64),
    UnaryFn(UnaryFn),
    CompareFn(CompareFn),
}

impl AttrValue {
    /// The kind of this value.
    #[must_use]
    pub const fn kind(&self) -> AttrKind {
        match self {
            Self::Int(_) => AttrKind::Int,
            Self::Real(_) => AttrKind::Real,
            Self::UnaryFn(_) => AttrKind::UnaryFn,
            Self::CompareFn(_) => AttrKind::CompareFn,
        }
    }

    pub const fn as_int(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_unary_fn(&self) -> Option<UnaryFn> {
        match self {
            Self::UnaryFn(v) => Some(*v),
            _ => None,
        }
    }

    pub const fn as_compare_fn(&self) -> Option<CompareFn> {
        match self {
            Self::CompareFn(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::UnaryFn(v) => write!(f, "{v}"),
            Self::CompareFn(v) => write!(f, "{v}"),
        }
    }
}

impl From<i128> for AttrValue {
    fn from(v: i128) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<UnaryFn> for AttrValue {
    fn from(v: UnaryFn) -> Self {
        Self::UnaryFn(v)
    }
}

impl From<CompareFn> for AttrValue {
    fn from(v: CompareFn) -> Self {
        Self::CompareFn(v)
    }
}
