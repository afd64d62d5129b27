//! Error types for fxpir.
//!
//! All errors in fxpir are strongly typed using thiserror.
//! This enables pattern matching on specific error conditions
//! and provides clear error messages.

use thiserror::Error;

use crate::attr::AttrKind;
use crate::types::{TensorType, TypeConstraint};

/// Verification errors raised when an operation instance is constructed.
///
/// Every variant names the operation whose construction failed. A
/// verification failure is final: it is raised synchronously at
/// construction time, never retried, and the instance is never created.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("operation '{op}' expects {expected} operands, got {got}")]
    OperandCountMismatch {
        op: String,
        expected: usize,
        got: usize,
    },

    #[error("operand '{operand}' of '{op}' must be {constraint}, got {found}")]
    OperandConstraintViolated {
        op: String,
        operand: String,
        constraint: TypeConstraint,
        found: TensorType,
    },

    #[error("operation '{op}' expects {expected} results, got {got}")]
    ResultCountMismatch {
        op: String,
        expected: usize,
        got: usize,
    },

    #[error("result '{result}' of '{op}' must be {constraint}, got {found}")]
    ResultConstraintViolated {
        op: String,
        result: String,
        constraint: TypeConstraint,
        found: TensorType,
    },

    #[error("required attribute '{attr}' of '{op}' is missing")]
    MissingAttribute {
        op: String,
        attr: String,
    },

    #[error("attribute '{attr}' of '{op}' must be of kind {expected}, got {got}")]
    AttributeKindMismatch {
        op: String,
        attr: String,
        expected: AttrKind,
        got: AttrKind,
    },

    #[error("operation '{op}' does not declare an attribute named '{attr}'")]
    UnknownAttribute {
        op: String,
        attr: String,
    },

    #[error("attribute '{attr}' of '{op}' is fixed by the schema and cannot be rebound")]
    FixedAttributeRebound {
        op: String,
        attr: String,
    },

    #[error("trait {op_trait} violated on '{op}': {reason}")]
    TraitViolated {
        op: String,
        op_trait: crate::traits::OpTrait,
        reason: String,
    },

    #[error("verifier for '{op}' failed: {message}")]
    Custom {
        op: String,
        message: String,
    },
}

impl VerificationError {
    /// Creates a custom-verifier failure for the named operation.
    #[must_use]
    pub fn custom(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Custom {
            op: op.into(),
            message: message.into(),
        }
    }

    /// The name of the operation whose construction failed.
    #[must_use]
    pub fn op(&self) -> &str {
        match self {
            Self::OperandCountMismatch { op, .. }
            | Self::OperandConstraintViolated { op, .. }
            | Self::ResultCountMismatch { op, .. }
            | Self::ResultConstraintViolated { op, .. }
            | Self::MissingAttribute { op, .. }
            | Self::AttributeKindMismatch { op, .. }
            | Self::UnknownAttribute { op, .. }
            | Self::FixedAttributeRebound { op, .. }
            | Self::TraitViolated { op, .. }
            | Self::Custom { op, .. } => op,
        }
    }
}

/// Errors raised while assembling or querying the operation catalog.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("operation '{name}' is already registered")]
    DuplicateOperation {
        name: String,
    },

    #[error("unknown operation '{name}'")]
    UnknownOperation {
        name: String,
    },

    #[error("schema for '{op}' declares duplicate {kind} name '{name}'")]
    DuplicateSchemaName {
        op: String,
        kind: &'static str,
        name: String,
    },
}

/// Top-level error type for fxpir.
#[derive(Debug, Error)]
pub enum FxpError {
    #[error("verification error: {0}")]
    Verification(#[from] VerificationError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("internal error: {message}")]
    Internal {
        message: String,
    },
}

impl FxpError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a verification error.
    #[must_use]
    pub const fn is_verification(&self) -> bool {
        matches!(self, Self::Verification(_))
    }

    /// Returns true if this is a registry error.
    #[must_use]
    pub const fn is_registry(&self) -> bool {
        matches!(self, Self::Registry(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for fxpir operations.
pub type FxpResult<T> = Result<T, FxpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::{ElemType, IntType};
    use crate::shape::Shape;
    use crate::types::TensorType;

    #[test]
    fn test_operand_count_message() {
        let err = VerificationError::OperandCountMismatch {
            op: "clamp_is".to_string(),
            expected: 1,
            got: 2,
        };
        let msg = format!("{err}");
        assert!(msg.contains("clamp_is"));
        assert!(msg.contains("expects 1 operands"));
        assert_eq!(err.op(), "clamp_is");
    }

    #[test]
    fn test_constraint_violation_message() {
        let err = VerificationError::OperandConstraintViolated {
            op: "real_add_ew".to_string(),
            operand: "lhs".to_string(),
            constraint: TypeConstraint::RealValue,
            found: TensorType::new(ElemType::Int(IntType::I32), Shape::new(&[4])),
        };
        let msg = format!("{err}");
        assert!(msg.contains("lhs"));
        assert!(msg.contains("real value"));
    }

    #[test]
    fn test_custom_error() {
        let err = VerificationError::custom("rounding_divide_by_pot_is", "exponent out of range");
        let msg = format!("{err}");
        assert!(msg.contains("rounding_divide_by_pot_is"));
        assert!(msg.contains("exponent out of range"));
    }

    #[test]
    fn test_fxp_error_from_verification() {
        let err: FxpError = VerificationError::custom("x", "boom").into();
        assert!(err.is_verification());
        assert!(!err.is_registry());
    }

    #[test]
    fn test_fxp_error_from_registry() {
        let err: FxpError = RegistryError::DuplicateOperation {
            name: "clamp_is".to_string(),
        }
        .into();
        assert!(err.is_registry());
        let msg = format!("{err}");
        assert!(msg.contains("already registered"));
    }

    #[test]
    fn test_fxp_error_internal() {
        let err = FxpError::internal("unexpected state");
        assert!(err.is_internal());
        let msg = format!("{err}");
        assert!(msg.contains("unexpected state"));
    }
}
