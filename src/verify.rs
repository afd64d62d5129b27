//! The verification engine.
//!
//! Given a concrete instance and the schema it derives from, runs the
//! structural checks, every declared trait's obligation, and finally the
//! schema's custom verifier. The first failure wins; a failure at any
//! stage prevents the instance from ever existing.

use crate::error::VerificationError;
use crate::instance::OpInstance;
use crate::schema::OpSchema;

/// Verifies `instance` against `schema`.
///
/// Check order:
/// 1. operand count and per-operand constraint satisfaction;
/// 2. attribute presence, kind agreement, fixed-value agreement, and
///    rejection of undeclared attributes;
/// 3. result count and per-result constraint satisfaction;
/// 4. every declared trait's invariant;
/// 5. the custom verifier, if any.
pub fn verify(schema: &OpSchema, instance: &OpInstance) -> Result<(), VerificationError> {
    verify_operands(schema, instance)?;
    verify_attrs(schema, instance)?;
    verify_results(schema, instance)?;
    for op_trait in &schema.traits {
        op_trait.check(instance)?;
    }
    if let Some(verifier) = schema.verifier {
        verifier(instance)?;
    }
    Ok(())
}

fn verify_operands(schema: &OpSchema, instance: &OpInstance) -> Result<(), VerificationError> {
    if instance.operands().len() != schema.operands.len() {
        return Err(VerificationError::OperandCountMismatch {
            op: schema.name.clone(),
            expected: schema.operands.len(),
            got: instance.operands().len(),
        });
    }
    for (spec, ty) in schema.operands.iter().zip(instance.operands()) {
        if !spec.constraint.satisfies(ty) {
            return Err(VerificationError::OperandConstraintViolated {
                op: schema.name.clone(),
                operand: spec.name.clone(),
                constraint: spec.constraint,
                found: ty.clone(),
            });
        }
    }
    Ok(())
}

fn verify_attrs(schema: &OpSchema, instance: &OpInstance) -> Result<(), VerificationError> {
    for spec in &schema.attrs {
        match instance.attr(&spec.name) {
            Some(value) => {
                if value.kind() != spec.kind {
                    return Err(VerificationError::AttributeKindMismatch {
                        op: schema.name.clone(),
                        attr: spec.name.clone(),
                        expected: spec.kind,
                        got: value.kind(),
                    });
                }
                if let Some(fixed) = spec.fixed {
                    if *value != fixed {
                        return Err(VerificationError::FixedAttributeRebound {
                            op: schema.name.clone(),
                            attr: spec.name.clone(),
                        });
                    }
                }
            }
            None => {
                if spec.required {
                    return Err(VerificationError::MissingAttribute {
                        op: schema.name.clone(),
                        attr: spec.name.clone(),
                    });
                }
            }
        }
    }
    for (name, _) in instance.attrs() {
        if schema.attr_spec(name).is_none() {
            return Err(VerificationError::UnknownAttribute {
                op: schema.name.clone(),
                attr: name.clone(),
            });
        }
    }
    Ok(())
}

fn verify_results(schema: &OpSchema, instance: &OpInstance) -> Result<(), VerificationError> {
    if instance.results().len() != schema.results.len() {
        return Err(VerificationError::ResultCountMismatch {
            op: schema.name.clone(),
            expected: schema.results.len(),
            got: instance.results().len(),
        });
    }
    for (spec, ty) in schema.results.iter().zip(instance.results()) {
        if !spec.constraint.satisfies(ty) {
            return Err(VerificationError::ResultConstraintViolated {
                op: schema.name.clone(),
                result: spec.name.clone(),
                constraint: spec.constraint,
                found: ty.clone(),
            });
        }
    }
    Ok(())
}
