//! Matrix multiply operation definitions.
//!
//! Kept as a distinct operation rather than a generic contraction:
//! execution backends expose a dedicated kernel for exactly this
//! signature, and a code generator maps onto it directly.

use crate::attr::AttrKind;
use crate::error::{FxpResult, VerificationError};
use crate::instance::{OpBuilder, OpInstance};
use crate::schema::{AttrSpec, OperandSpec, OpSchema, ResultSpec};
use crate::traits::OpTrait;
use crate::types::{TensorType, TypeConstraint};

/// `real_matmul`: batched matrix product.
pub const REAL_MATMUL: &str = "real_matmul";
/// `real_matmul_bias`: batched matrix product with fused bias.
pub const REAL_MATMUL_BIAS: &str = "real_matmul_bias";

pub(crate) fn schemas() -> Vec<OpSchema> {
    let clamped = |schema: OpSchema| {
        schema
            .attr(AttrSpec::optional("clamp_min", AttrKind::Real))
            .attr(AttrSpec::optional("clamp_max", AttrKind::Real))
    };
    vec![
        clamped(
            OpSchema::new(REAL_MATMUL)
                .operand(OperandSpec::new("lhs", TypeConstraint::RealValue))
                .operand(OperandSpec::new("rhs", TypeConstraint::RealValue)),
        )
        .result_spec(ResultSpec::new("result", TypeConstraint::RealValue))
        .with_trait(OpTrait::SideEffectFree)
        .verifier(verify_matmul_shapes),
        clamped(
            OpSchema::new(REAL_MATMUL_BIAS)
                .operand(OperandSpec::new("lhs", TypeConstraint::RealValue))
                .operand(OperandSpec::new("rhs", TypeConstraint::RealValue))
                .operand(OperandSpec::new("bias", TypeConstraint::RealValue)),
        )
        .result_spec(ResultSpec::new("result", TypeConstraint::RealValue))
        .with_trait(OpTrait::SideEffectFree)
        .verifier(verify_matmul_shapes),
    ]
}

pub(crate) fn builtin_verifier(
    name: &str,
) -> Option<fn(&OpInstance) -> Result<(), VerificationError>> {
    match name {
        REAL_MATMUL | REAL_MATMUL_BIAS => Some(verify_matmul_shapes),
        _ => None,
    }
}

/// `lhs: [..., m, k]`, `rhs: [k, n]`, result `[..., m, n]`; the bias
/// variant additionally requires `bias: [n]`.
fn verify_matmul_shapes(instance: &OpInstance) -> Result<(), VerificationError> {
    let operands = instance.operands();
    let (Some(lhs), Some(rhs)) = (operands.first(), operands.get(1)) else {
        return Ok(());
    };

    let Some(expected) = lhs.shape.matmul_with(&rhs.shape) else {
        return Err(VerificationError::custom(
            instance.op(),
            format!(
                "lhs {} and rhs {} do not contract; need [..., m, k] x [k, n]",
                lhs.shape, rhs.shape
            ),
        ));
    };

    if let Some(bias) = operands.get(2) {
        let n = rhs.shape.dims()[1];
        if bias.shape.dims() != [n] {
            return Err(VerificationError::custom(
                instance.op(),
                format!("bias must have shape [{n}], got {}", bias.shape),
            ));
        }
    }

    match instance.results().first() {
        Some(result) if result.shape == expected => Ok(()),
        Some(result) => Err(VerificationError::custom(
            instance.op(),
            format!(
                "result shape {} does not match contraction shape {}",
                result.shape, expected
            ),
        )),
        None => Ok(()),
    }
}

fn with_clamp(builder: OpBuilder, clamp: Option<(f64, f64)>) -> OpBuilder {
    match clamp {
        Some((min, max)) => builder.attr("clamp_min", min).attr("clamp_max", max),
        None => builder,
    }
}

/// Builds a verified `real_matmul` instance.
pub fn real_matmul(
    lhs: TensorType,
    rhs: TensorType,
    clamp: Option<(f64, f64)>,
    result: TensorType,
) -> FxpResult<OpInstance> {
    with_clamp(
        OpBuilder::new(REAL_MATMUL)
            .operand(lhs)
            .operand(rhs)
            .result(result),
        clamp,
    )
    .build()
}

/// Builds a verified `real_matmul_bias` instance.
///
/// `bias` is broadcast over the batch and row dimensions and added after
/// the contraction, before the optional clamp.
pub fn real_matmul_bias(
    lhs: TensorType,
    rhs: TensorType,
    bias: TensorType,
    clamp: Option<(f64, f64)>,
    result: TensorType,
) -> FxpResult<OpInstance> {
    with_clamp(
        OpBuilder::new(REAL_MATMUL_BIAS)
            .operand(lhs)
            .operand(rhs)
            .operand(bias)
            .result(result),
        clamp,
    )
    .build()
}
