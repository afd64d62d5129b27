//! Structural traits an operation may declare.
//!
//! A trait is a declared property of an operation that the verification
//! engine enforces as an invariant over every instance's operands and
//! results. Traits are plain data here; each variant carries one check
//! function, invoked generically, so downstream passes can query an
//! operation's traits without operation-specific logic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VerificationError;
use crate::instance::OpInstance;

/// The fixed trait vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpTrait {
    /// The operation has no side effects; instances whose results are
    /// unused may be erased. Queryable only, no structural obligation.
    SideEffectFree,
    /// Every operand and result have the same element type and shape.
    SameOperandResultType,
    /// Every operand and result have the same shape; element types may
    /// differ.
    SameOperandResultShape,
}

impl OpTrait {
    /// Checks this trait's invariant over a concrete instance.
    ///
    /// Returns the first violation as a `TraitViolated` error.
    pub fn check(self, instance: &OpInstance) -> Result<(), VerificationError> {
        match self {
            Self::SideEffectFree => Ok(()),
            Self::SameOperandResultType => check_same_type(self, instance),
            Self::SameOperandResultShape => check_same_shape(self, instance),
        }
    }
}

impl fmt::Display for OpTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SideEffectFree => write!(f, "side-effect-free"),
            Self::SameOperandResultType => write!(f, "same-operand-result-type"),
            Self::SameOperandResultShape => write!(f, "same-operand-result-shape"),
        }
    }
}

/// For every operand o and result r: elem(o) = elem(r) and shape(o) = shape(r).
fn check_same_type(op_trait: OpTrait, instance: &OpInstance) -> Result<(), VerificationError> {
    for (i, operand) in instance.operands().iter().enumerate() {
        for (j, result) in instance.results().iter().enumerate() {
            if operand != result {
                return Err(VerificationError::TraitViolated {
                    op: instance.op().to_string(),
                    op_trait,
                    reason: format!(
                        "operand #{i} is {operand} but result #{j} is {result}"
                    ),
                });
            }
        }
    }
    Ok(())
}

/// For every operand o and result r: shape(o) = shape(r).
fn check_same_shape(op_trait: OpTrait, instance: &OpInstance) -> Result<(), VerificationError> {
    for (i, operand) in instance.operands().iter().enumerate() {
        for (j, result) in instance.results().iter().enumerate() {
            if operand.shape != result.shape {
                return Err(VerificationError::TraitViolated {
                    op: instance.op().to_string(),
                    op_trait,
                    reason: format!(
                        "operand #{i} has shape {} but result #{j} has shape {}",
                        operand.shape, result.shape
                    ),
                });
            }
        }
    }
    Ok(())
}
