//! Real-valued elementwise operation definitions.
//!
//! The real half of the catalog: the four binary arithmetic operations
//! and their fused-bias variants, the unary elementwise operation with
//! its twelve-way function selector, and compare-to-zero. Operands are
//! real-valued: plain float or quantized; the contract is over the
//! mathematical values the operands represent.

use crate::attr::{AttrKind, CompareFn, UnaryFn};
use crate::error::{FxpResult, VerificationError};
use crate::instance::{OpBuilder, OpInstance};
use crate::schema::{AttrSpec, OperandSpec, OpSchema, ResultSpec};
use crate::traits::OpTrait;
use crate::types::{TensorType, TypeConstraint};

/// `real_add_ew`: elementwise addition.
pub const REAL_ADD_EW: &str = "real_add_ew";
/// `real_sub_ew`: elementwise subtraction.
pub const REAL_SUB_EW: &str = "real_sub_ew";
/// `real_mul_ew`: elementwise multiplication.
pub const REAL_MUL_EW: &str = "real_mul_ew";
/// `real_div_ew`: elementwise division.
pub const REAL_DIV_EW: &str = "real_div_ew";
/// `real_add_ew_bias`: addition with fused broadcast bias.
pub const REAL_ADD_EW_BIAS: &str = "real_add_ew_bias";
/// `real_sub_ew_bias`: subtraction with fused broadcast bias.
pub const REAL_SUB_EW_BIAS: &str = "real_sub_ew_bias";
/// `real_mul_ew_bias`: multiplication with fused broadcast bias.
pub const REAL_MUL_EW_BIAS: &str = "real_mul_ew_bias";
/// `real_div_ew_bias`: division with fused broadcast bias.
pub const REAL_DIV_EW_BIAS: &str = "real_div_ew_bias";
/// `real_unary_ew`: unary elementwise function application.
pub const REAL_UNARY_EW: &str = "real_unary_ew";
/// `real_compare_zero_ew`: elementwise zero comparison.
pub const REAL_COMPARE_ZERO_EW: &str = "real_compare_zero_ew";

const BINARY_NAMES: [&str; 4] = [REAL_ADD_EW, REAL_SUB_EW, REAL_MUL_EW, REAL_DIV_EW];
const BINARY_BIAS_NAMES: [&str; 4] = [
    REAL_ADD_EW_BIAS,
    REAL_SUB_EW_BIAS,
    REAL_MUL_EW_BIAS,
    REAL_DIV_EW_BIAS,
];

fn clamp_attrs(schema: OpSchema) -> OpSchema {
    schema
        .attr(AttrSpec::optional("clamp_min", AttrKind::Real))
        .attr(AttrSpec::optional("clamp_max", AttrKind::Real))
}

fn binary_schema(name: &str) -> OpSchema {
    clamp_attrs(
        OpSchema::new(name)
            .operand(OperandSpec::new("lhs", TypeConstraint::RealValue))
            .operand(OperandSpec::new("rhs", TypeConstraint::RealValue)),
    )
    .result_spec(ResultSpec::new("result", TypeConstraint::RealValue))
    .with_trait(OpTrait::SideEffectFree)
    .verifier(verify_binary_broadcast)
}

fn binary_bias_schema(name: &str) -> OpSchema {
    clamp_attrs(
        OpSchema::new(name)
            .operand(OperandSpec::new("lhs", TypeConstraint::RealValue))
            .operand(OperandSpec::new("rhs", TypeConstraint::RealValue))
            .operand(OperandSpec::new("bias", TypeConstraint::RealValue)),
    )
    .result_spec(ResultSpec::new("result", TypeConstraint::RealValue))
    .with_trait(OpTrait::SideEffectFree)
    .verifier(verify_binary_broadcast)
}

pub(crate) fn schemas() -> Vec<OpSchema> {
    let mut out: Vec<OpSchema> = Vec::new();
    out.extend(BINARY_NAMES.iter().map(|n| binary_schema(n)));
    out.extend(BINARY_BIAS_NAMES.iter().map(|n| binary_bias_schema(n)));
    out.push(
        clamp_attrs(
            OpSchema::new(REAL_UNARY_EW)
                .operand(OperandSpec::new("operand", TypeConstraint::RealValue))
                .attr(AttrSpec::with_default("fn", UnaryFn::Identity)),
        )
        .result_spec(ResultSpec::new("result", TypeConstraint::RealValue))
        .with_trait(OpTrait::SideEffectFree)
        .with_trait(OpTrait::SameOperandResultShape),
    );
    out.push(
        OpSchema::new(REAL_COMPARE_ZERO_EW)
            .operand(OperandSpec::new("operand", TypeConstraint::RealValue))
            .attr(AttrSpec::required("fn", AttrKind::CompareFn))
            .result_spec(ResultSpec::new("result", TypeConstraint::IntegerLike))
            .with_trait(OpTrait::SideEffectFree)
            .with_trait(OpTrait::SameOperandResultShape)
            .verifier(verify_bool_result),
    );
    out
}

pub(crate) fn builtin_verifier(
    name: &str,
) -> Option<fn(&OpInstance) -> Result<(), VerificationError>> {
    if BINARY_NAMES.contains(&name) || BINARY_BIAS_NAMES.contains(&name) {
        return Some(verify_binary_broadcast);
    }
    if name == REAL_COMPARE_ZERO_EW {
        return Some(verify_bool_result);
    }
    None
}

/// The result shape must be the broadcast of every operand shape: lhs
/// with rhs, then (for the bias variants) with bias.
fn verify_binary_broadcast(instance: &OpInstance) -> Result<(), VerificationError> {
    let mut operands = instance.operands().iter();
    let Some(first) = operands.next() else {
        return Ok(());
    };
    let mut expected = first.shape.clone();
    for operand in operands {
        match expected.broadcast_with(&operand.shape) {
            Some(shape) => expected = shape,
            None => {
                return Err(VerificationError::custom(
                    instance.op(),
                    format!(
                        "operand shapes {} and {} are not broadcast-compatible",
                        expected, operand.shape
                    ),
                ));
            }
        }
    }
    match instance.results().first() {
        Some(result) if result.shape == expected => Ok(()),
        Some(result) => Err(VerificationError::custom(
            instance.op(),
            format!(
                "result shape {} does not match broadcast shape {}",
                result.shape, expected
            ),
        )),
        None => Ok(()),
    }
}

/// Compare-to-zero produces a single-bit boolean tensor.
fn verify_bool_result(instance: &OpInstance) -> Result<(), VerificationError> {
    match instance.results().first() {
        Some(result) if !result.is_bool_like() => Err(VerificationError::custom(
            instance.op(),
            format!("result must be an i1 tensor, got {result}"),
        )),
        _ => Ok(()),
    }
}

fn build_binary(
    name: &str,
    lhs: TensorType,
    rhs: TensorType,
    clamp: Option<(f64, f64)>,
    result: TensorType,
) -> FxpResult<OpInstance> {
    let mut builder = OpBuilder::new(name)
        .operand(lhs)
        .operand(rhs)
        .result(result);
    if let Some((min, max)) = clamp {
        builder = builder.attr("clamp_min", min).attr("clamp_max", max);
    }
    builder.build()
}

macro_rules! binary_factories {
    ($($(#[$doc:meta])* $plain:ident, $bias:ident => $plain_name:ident, $bias_name:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $plain(
                lhs: TensorType,
                rhs: TensorType,
                clamp: Option<(f64, f64)>,
                result: TensorType,
            ) -> FxpResult<OpInstance> {
                build_binary($plain_name, lhs, rhs, clamp, result)
            }

            /// The fused-bias variant: broadcast-adds `bias` to the binary
            /// result before the optional clamp.
            pub fn $bias(
                lhs: TensorType,
                rhs: TensorType,
                bias: TensorType,
                clamp: Option<(f64, f64)>,
                result: TensorType,
            ) -> FxpResult<OpInstance> {
                let mut builder = OpBuilder::new($bias_name)
                    .operand(lhs)
                    .operand(rhs)
                    .operand(bias)
                    .result(result);
                if let Some((min, max)) = clamp {
                    builder = builder.attr("clamp_min", min).attr("clamp_max", max);
                }
                builder.build()
            }
        )*
    };
}

binary_factories! {
    /// Builds a verified elementwise addition instance.
    real_add_ew, real_add_ew_bias => REAL_ADD_EW, REAL_ADD_EW_BIAS;
    /// Builds a verified elementwise subtraction instance.
    real_sub_ew, real_sub_ew_bias => REAL_SUB_EW, REAL_SUB_EW_BIAS;
    /// Builds a verified elementwise multiplication instance.
    real_mul_ew, real_mul_ew_bias => REAL_MUL_EW, REAL_MUL_EW_BIAS;
    /// Builds a verified elementwise division instance.
    real_div_ew, real_div_ew_bias => REAL_DIV_EW, REAL_DIV_EW_BIAS;
}

/// Builds a verified unary elementwise instance applying `func`.
///
/// The result keeps the operand's shape; its element type may differ
/// (the lowering pass chooses the re-encoding target).
pub fn real_unary_ew(
    operand: TensorType,
    func: UnaryFn,
    clamp: Option<(f64, f64)>,
    result: TensorType,
) -> FxpResult<OpInstance> {
    let mut builder = OpBuilder::new(REAL_UNARY_EW)
        .operand(operand)
        .attr("fn", func)
        .result(result);
    if let Some((min, max)) = clamp {
        builder = builder.attr("clamp_min", min).attr("clamp_max", max);
    }
    builder.build()
}

macro_rules! unary_factories {
    ($($name:ident => $func:ident),* $(,)?) => {
        $(
            /// Fixed-function unary factory: the general operation with
            /// `fn` pre-bound.
            pub fn $name(operand: TensorType, result: TensorType) -> FxpResult<OpInstance> {
                real_unary_ew(operand, UnaryFn::$func, None, result)
            }
        )*
    };
}

unary_factories! {
    abs_ew => Abs,
    exp_ew => Exp,
    identity_ew => Identity,
    log_ew => Log,
    neg_ew => Neg,
    rsqrt_ew => Rsqrt,
    sigmoid_ew => Sigmoid,
    sign_ew => Sign,
    sin_ew => Sin,
    sqrt_ew => Sqrt,
    square_ew => Square,
    tanh_ew => Tanh,
}

/// Builds a verified compare-to-zero instance.
///
/// The result is an i1 tensor of the operand's shape. The operation
/// compares only; by pipeline convention the operand is already the
/// result of a subtraction.
pub fn real_compare_zero_ew(operand: TensorType, func: CompareFn) -> FxpResult<OpInstance> {
    let result = TensorType::bool_like(operand.shape.clone());
    OpBuilder::new(REAL_COMPARE_ZERO_EW)
        .operand(operand)
        .attr("fn", func)
        .result(result)
        .build()
}

macro_rules! compare_factories {
    ($($name:ident => $func:ident),* $(,)?) => {
        $(
            /// Fixed-predicate comparison factory.
            pub fn $name(operand: TensorType) -> FxpResult<OpInstance> {
                real_compare_zero_ew(operand, CompareFn::$func)
            }
        )*
    };
}

compare_factories! {
    cmpz_ew => Cmpz,
    cmpnz_ew => Cmpnz,
    cmplz_ew => Cmplz,
    cmplze_ew => Cmplze,
    cmpgz_ew => Cmpgz,
    cmpgze_ew => Cmpgze,
}
