//! Operation schema definitions.
//!
//! A schema is the static, named description of one operation: its ordered
//! operand specs, attribute specs, result specs, declared traits, and an
//! optional custom verifier. Schemas are plain data registered once into
//! the catalog; concrete instances are constructed and verified against
//! them.

use serde::{Deserialize, Serialize};

use crate::attr::{AttrKind, AttrValue};
use crate::error::{RegistryError, VerificationError};
use crate::instance::OpInstance;
use crate::traits::OpTrait;
use crate::types::TypeConstraint;

/// A custom verification procedure attached to a schema.
///
/// Runs after all trait-implied structural checks.
pub type VerifyFn = fn(&OpInstance) -> Result<(), VerificationError>;

/// Specification of one operand slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandSpec {
    /// Operand name, unique within the operation.
    pub name: String,
    /// Constraint the bound value's type must satisfy.
    pub constraint: TypeConstraint,
}

impl OperandSpec {
    /// Creates an operand spec.
    pub fn new(name: impl Into<String>, constraint: TypeConstraint) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }
}

/// Specification of one result slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSpec {
    /// Result name, unique within the operation.
    pub name: String,
    /// Constraint the result type must satisfy.
    pub constraint: TypeConstraint,
}

impl ResultSpec {
    /// Creates a result spec.
    pub fn new(name: impl Into<String>, constraint: TypeConstraint) -> Self {
        Self {
            name: name.into(),
            constraint,
        }
    }
}

/// Specification of one attribute.
///
/// An attribute is either required, optional (absence is meaningful, e.g.
/// "no clamp"), defaulted, or fixed to a constant value by the schema
/// itself (the constant-attribute specialization mechanism).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrSpec {
    /// Attribute name, unique within the operation.
    pub name: String,
    /// Kind every binding must have.
    pub kind: AttrKind,
    /// Whether an instance must carry a binding.
    pub required: bool,
    /// Value filled in when the instance does not bind one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<AttrValue>,
    /// Constant value pinned by the schema; instances cannot rebind it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<AttrValue>,
}

impl AttrSpec {
    /// A required attribute of the given kind.
    pub fn required(name: impl Into<String>, kind: AttrKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            fixed: None,
        }
    }

    /// An optional attribute whose absence is meaningful.
    pub fn optional(name: impl Into<String>, kind: AttrKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            fixed: None,
        }
    }

    /// An attribute with a default value, filled in when unbound.
    pub fn with_default(name: impl Into<String>, default: impl Into<AttrValue>) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            kind: default.kind(),
            required: false,
            default: Some(default),
            fixed: None,
        }
    }

    /// An attribute pinned to a constant value by the schema.
    pub fn constant(name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            kind: value.kind(),
            required: false,
            default: None,
            fixed: Some(value),
        }
    }
}

/// A cataloged operation definition.
///
/// Operand, attribute, and result order is fixed at definition and
/// significant for positional construction. The custom verifier is not
/// part of the serialized form; [`OpSchema::rebind_verifier`] restores it
/// from the built-in table after deserialization.
///
/// # Examples
///
/// ```
/// use fxpir::{OperandSpec, OpSchema, OpTrait, TypeConstraint};
///
/// let schema = OpSchema::new("negate")
///     .operand(OperandSpec::new("operand", TypeConstraint::RealValue))
///     .result_spec(fxpir::ResultSpec::new("result", TypeConstraint::RealValue))
///     .with_trait(OpTrait::SideEffectFree);
/// assert!(schema.has_trait(OpTrait::SideEffectFree));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpSchema {
    /// Operation name, unique within the catalog.
    pub name: String,
    /// Ordered operand specs.
    pub operands: Vec<OperandSpec>,
    /// Ordered attribute specs.
    pub attrs: Vec<AttrSpec>,
    /// Ordered result specs.
    pub results: Vec<ResultSpec>,
    /// Declared traits. Each adds a mechanically checked obligation.
    pub traits: Vec<OpTrait>,
    /// Optional custom verifier, run after the trait checks.
    #[serde(skip)]
    pub verifier: Option<VerifyFn>,
}

impl OpSchema {
    /// Creates an empty schema with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operands: Vec::new(),
            attrs: Vec::new(),
            results: Vec::new(),
            traits: Vec::new(),
            verifier: None,
        }
    }

    /// Appends an operand spec.
    #[must_use]
    pub fn operand(mut self, spec: OperandSpec) -> Self {
        self.operands.push(spec);
        self
    }

    /// Appends an attribute spec.
    #[must_use]
    pub fn attr(mut self, spec: AttrSpec) -> Self {
        self.attrs.push(spec);
        self
    }

    /// Appends a result spec.
    #[must_use]
    pub fn result_spec(mut self, spec: ResultSpec) -> Self {
        self.results.push(spec);
        self
    }

    /// Declares a trait.
    #[must_use]
    pub fn with_trait(mut self, op_trait: OpTrait) -> Self {
        self.traits.push(op_trait);
        self
    }

    /// Attaches a custom verifier.
    #[must_use]
    pub fn verifier(mut self, verifier: VerifyFn) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Whether this operation declares the given trait.
    #[must_use]
    pub fn has_trait(&self, op_trait: OpTrait) -> bool {
        self.traits.contains(&op_trait)
    }

    /// Verifies a concrete instance against this schema.
    ///
    /// Runs the structural checks, every declared trait's obligation, and
    /// the custom verifier, in that order.
    pub fn verify(&self, instance: &OpInstance) -> Result<(), VerificationError> {
        crate::verify::verify(self, instance)
    }

    /// Looks up an attribute spec by name.
    #[must_use]
    pub fn attr_spec(&self, name: &str) -> Option<&AttrSpec> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// Derives a constant-attribute specialization of this schema.
    ///
    /// The named attribute is pinned to `value` in the derived schema (and
    /// can no longer be rebound by instances); everything else, including
    /// the custom verifier, carries over.
    pub fn specialize(
        &self,
        new_name: impl Into<String>,
        attr: &str,
        value: impl Into<AttrValue>,
    ) -> Result<OpSchema, VerificationError> {
        let value = value.into();
        let mut derived = self.clone();
        derived.name = new_name.into();
        let spec = derived
            .attrs
            .iter_mut()
            .find(|a| a.name == attr)
            .ok_or_else(|| VerificationError::UnknownAttribute {
                op: self.name.clone(),
                attr: attr.to_string(),
            })?;
        if spec.kind != value.kind() {
            return Err(VerificationError::AttributeKindMismatch {
                op: self.name.clone(),
                attr: attr.to_string(),
                expected: spec.kind,
                got: value.kind(),
            });
        }
        spec.required = false;
        spec.default = None;
        spec.fixed = Some(value);
        Ok(derived)
    }

    /// Checks that operand, attribute, and result names are unique.
    pub(crate) fn check_unique_names(&self) -> Result<(), RegistryError> {
        fn check<'a>(
            op: &str,
            kind: &'static str,
            names: impl Iterator<Item = &'a str>,
        ) -> Result<(), RegistryError> {
            let mut seen: Vec<&str> = Vec::new();
            for name in names {
                if seen.contains(&name) {
                    return Err(RegistryError::DuplicateSchemaName {
                        op: op.to_string(),
                        kind,
                        name: name.to_string(),
                    });
                }
                seen.push(name);
            }
            Ok(())
        }

        check(&self.name, "operand", self.operands.iter().map(|o| o.name.as_str()))?;
        check(&self.name, "attribute", self.attrs.iter().map(|a| a.name.as_str()))?;
        check(&self.name, "result", self.results.iter().map(|r| r.name.as_str()))?;
        Ok(())
    }

    /// Restores the custom verifier after deserialization.
    ///
    /// Verifier procedures are code, not data; a deserialized schema gets
    /// back the verifier of the built-in operation with the same name, so
    /// its verification contract is identical to the original's.
    pub fn rebind_verifier(&mut self) {
        self.verifier = crate::ops::builtin_verifier(&self.name);
    }
}

impl PartialEq for OpSchema {
    /// Declarative equality: the verifier is identified by the operation
    /// name rather than compared as a function pointer.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.operands == other.operands
            && self.attrs == other.attrs
            && self.results == other.results
            && self.traits == other.traits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::UnaryFn;

    fn sample_schema() -> OpSchema {
        OpSchema::new("real_unary_ew")
            .operand(OperandSpec::new("operand", TypeConstraint::RealValue))
            .attr(AttrSpec::with_default("fn", UnaryFn::Identity))
            .attr(AttrSpec::optional("clamp_min", AttrKind::Real))
            .attr(AttrSpec::optional("clamp_max", AttrKind::Real))
            .result_spec(ResultSpec::new("result", TypeConstraint::RealValue))
            .with_trait(OpTrait::SideEffectFree)
            .with_trait(OpTrait::SameOperandResultShape)
    }

    #[test]
    fn test_builder_shape() {
        let s = sample_schema();
        assert_eq!(s.name, "real_unary_ew");
        assert_eq!(s.operands.len(), 1);
        assert_eq!(s.attrs.len(), 3);
        assert_eq!(s.results.len(), 1);
        assert!(s.has_trait(OpTrait::SameOperandResultShape));
        assert!(!s.has_trait(OpTrait::SameOperandResultType));
    }

    #[test]
    fn test_attr_spec_constructors() {
        let s = sample_schema();
        let f = s.attr_spec("fn").unwrap();
        assert!(!f.required);
        assert_eq!(f.default, Some(AttrValue::UnaryFn(UnaryFn::Identity)));
        assert_eq!(f.kind, AttrKind::UnaryFn);

        let c = s.attr_spec("clamp_min").unwrap();
        assert!(!c.required);
        assert!(c.default.is_none());
        assert!(s.attr_spec("nope").is_none());
    }

    #[test]
    fn test_specialize_pins_attribute() {
        let s = sample_schema();
        let abs = s.specialize("real_abs_ew", "fn", UnaryFn::Abs).unwrap();
        assert_eq!(abs.name, "real_abs_ew");
        let f = abs.attr_spec("fn").unwrap();
        assert_eq!(f.fixed, Some(AttrValue::UnaryFn(UnaryFn::Abs)));
        assert!(f.default.is_none());
        // The base schema is untouched.
        assert!(s.attr_spec("fn").unwrap().fixed.is_none());
    }

    #[test]
    fn test_specialize_unknown_attr() {
        let s = sample_schema();
        let err = s.specialize("x", "missing", UnaryFn::Abs).unwrap_err();
        assert!(matches!(err, VerificationError::UnknownAttribute { .. }));
    }

    #[test]
    fn test_specialize_kind_mismatch() {
        let s = sample_schema();
        let err = s.specialize("x", "fn", 3i128).unwrap_err();
        assert!(matches!(err, VerificationError::AttributeKindMismatch { .. }));
    }

    #[test]
    fn test_unique_names_checked() {
        let s = OpSchema::new("dup")
            .operand(OperandSpec::new("a", TypeConstraint::IntegerLike))
            .operand(OperandSpec::new("a", TypeConstraint::IntegerLike));
        let err = s.check_unique_names().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateSchemaName { kind: "operand", .. }
        ));
        assert!(sample_schema().check_unique_names().is_ok());
    }

    #[test]
    fn test_serde_skips_verifier() {
        fn nop(_: &OpInstance) -> Result<(), VerificationError> {
            Ok(())
        }
        let s = sample_schema().verifier(nop);
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("verifier"));
        let back: OpSchema = serde_json::from_str(&json).unwrap();
        assert!(back.verifier.is_none());
        // Declarative equality ignores the verifier slot.
        assert_eq!(s, back);
    }
}
