//! Integer-domain operation definitions.
//!
//! The fixed-point half of the catalog: clamp, the two conversions, the
//! saturating rounding doubling high multiply, and the rounding divide by
//! power of two. Schemas here carry the same-type/same-shape trait
//! obligations; the numerically delicate part of their contracts lives in
//! [`crate::kernels`].

use crate::attr::AttrKind;
use crate::dtype::{FloatType, IntType};
use crate::error::{FxpResult, VerificationError};
use crate::instance::{OpBuilder, OpInstance};
use crate::schema::{AttrSpec, OperandSpec, OpSchema, ResultSpec};
use crate::traits::OpTrait;
use crate::types::{TensorType, TypeConstraint};

/// `clamp_is`: elementwise integer clamp.
pub const CLAMP_IS: &str = "clamp_is";
/// `convert_is`: integer-to-integer conversion.
pub const CONVERT_IS: &str = "convert_is";
/// `convert_is_to_f`: integer-to-float conversion.
pub const CONVERT_IS_TO_F: &str = "convert_is_to_f";
/// `saturating_rounding_doubling_high_mul_is`.
pub const SATURATING_ROUNDING_DOUBLING_HIGH_MUL_IS: &str =
    "saturating_rounding_doubling_high_mul_is";
/// `rounding_divide_by_pot_is`.
pub const ROUNDING_DIVIDE_BY_POT_IS: &str = "rounding_divide_by_pot_is";

/// The inclusive exponent range `rounding_divide_by_pot_is` admits.
pub const POT_EXPONENT_RANGE: (i128, i128) = (0, 31);

pub(crate) fn schemas() -> Vec<OpSchema> {
    vec![
        OpSchema::new(CLAMP_IS)
            .operand(OperandSpec::new("operand", TypeConstraint::IntegerLike))
            .attr(AttrSpec::required("clamp_min", AttrKind::Int))
            .attr(AttrSpec::required("clamp_max", AttrKind::Int))
            .result_spec(ResultSpec::new("result", TypeConstraint::IntegerLike))
            .with_trait(OpTrait::SideEffectFree)
            .with_trait(OpTrait::SameOperandResultType),
        OpSchema::new(CONVERT_IS)
            .operand(OperandSpec::new("operand", TypeConstraint::IntegerLike))
            .result_spec(ResultSpec::new("result", TypeConstraint::IntegerLike))
            .with_trait(OpTrait::SideEffectFree)
            .with_trait(OpTrait::SameOperandResultShape),
        OpSchema::new(CONVERT_IS_TO_F)
            .operand(OperandSpec::new("operand", TypeConstraint::IntegerLike))
            .result_spec(ResultSpec::new("result", TypeConstraint::FloatLike))
            .with_trait(OpTrait::SideEffectFree)
            .with_trait(OpTrait::SameOperandResultShape),
        OpSchema::new(SATURATING_ROUNDING_DOUBLING_HIGH_MUL_IS)
            .operand(OperandSpec::new("a", TypeConstraint::IntegerLike))
            .attr(AttrSpec::required("b", AttrKind::Int))
            .result_spec(ResultSpec::new("result", TypeConstraint::IntegerLike))
            .with_trait(OpTrait::SideEffectFree)
            .with_trait(OpTrait::SameOperandResultType)
            .verifier(verify_multiplier_fits),
        OpSchema::new(ROUNDING_DIVIDE_BY_POT_IS)
            .operand(OperandSpec::new("operand", TypeConstraint::IntegerLike))
            .attr(AttrSpec::required("exponent", AttrKind::Int))
            .result_spec(ResultSpec::new("result", TypeConstraint::IntegerLike))
            .with_trait(OpTrait::SideEffectFree)
            .with_trait(OpTrait::SameOperandResultType)
            .verifier(verify_pot_exponent),
    ]
}

pub(crate) fn builtin_verifier(
    name: &str,
) -> Option<fn(&OpInstance) -> Result<(), VerificationError>> {
    match name {
        SATURATING_ROUNDING_DOUBLING_HIGH_MUL_IS => Some(verify_multiplier_fits),
        ROUNDING_DIVIDE_BY_POT_IS => Some(verify_pot_exponent),
        _ => None,
    }
}

/// The scalar multiplier must be representable in the operand's integer
/// type; the primitive it replicates takes a same-width operand.
fn verify_multiplier_fits(instance: &OpInstance) -> Result<(), VerificationError> {
    // Operand presence and integer storage were already checked
    // structurally.
    let Some(int) = instance
        .operands()
        .first()
        .and_then(|t| t.elem.as_int())
    else {
        return Ok(());
    };
    let b = instance.int_attr("b").unwrap_or(0);
    if !int.contains(b) {
        return Err(VerificationError::custom(
            instance.op(),
            format!("multiplier b = {b} is not representable in {int}"),
        ));
    }
    Ok(())
}

/// Hard invariant: `0 <= exponent <= 31`.
fn verify_pot_exponent(instance: &OpInstance) -> Result<(), VerificationError> {
    let exponent = instance.int_attr("exponent").unwrap_or(i128::MIN);
    let (lo, hi) = POT_EXPONENT_RANGE;
    if !(lo..=hi).contains(&exponent) {
        return Err(VerificationError::custom(
            instance.op(),
            format!("exponent must be in [{lo}, {hi}], got {exponent}"),
        ));
    }
    Ok(())
}

/// Builds a verified `clamp_is` instance.
///
/// `clamp_min <= clamp_max` is a caller precondition; the catalog does not
/// check it.
pub fn clamp(operand: TensorType, clamp_min: i128, clamp_max: i128) -> FxpResult<OpInstance> {
    OpBuilder::new(CLAMP_IS)
        .operand(operand.clone())
        .attr("clamp_min", clamp_min)
        .attr("clamp_max", clamp_max)
        .result(operand)
        .build()
}

/// Builds a verified `convert_is` instance casting to integer type `to`.
pub fn convert_int(operand: TensorType, to: IntType) -> FxpResult<OpInstance> {
    let result = TensorType::int(to, operand.shape.clone());
    OpBuilder::new(CONVERT_IS)
        .operand(operand)
        .result(result)
        .build()
}

/// Builds a verified `convert_is_to_f` instance casting to float type `to`.
pub fn convert_int_to_float(operand: TensorType, to: FloatType) -> FxpResult<OpInstance> {
    let result = TensorType::float(to, operand.shape.clone());
    OpBuilder::new(CONVERT_IS_TO_F)
        .operand(operand)
        .result(result)
        .build()
}

/// Builds a verified saturating rounding doubling high multiply instance
/// with scalar multiplier `b`.
pub fn saturating_rounding_doubling_high_mul(
    operand: TensorType,
    b: i128,
) -> FxpResult<OpInstance> {
    OpBuilder::new(SATURATING_ROUNDING_DOUBLING_HIGH_MUL_IS)
        .operand(operand.clone())
        .attr("b", b)
        .result(operand)
        .build()
}

/// Builds a verified `rounding_divide_by_pot_is` instance.
///
/// Fails verification unless `0 <= exponent <= 31`.
pub fn rounding_divide_by_pot(operand: TensorType, exponent: i128) -> FxpResult<OpInstance> {
    OpBuilder::new(ROUNDING_DIVIDE_BY_POT_IS)
        .operand(operand.clone())
        .attr("exponent", exponent)
        .result(operand)
        .build()
}
