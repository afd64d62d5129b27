//! Operation instances and the instance builder.
//!
//! An instance is a concrete use of a cataloged schema: operands bound to
//! IR value types and attributes bound to literal values. The lifecycle is
//! construct → verify → (immutable, queryable) → erase: `OpBuilder::build`
//! verifies the candidate and only hands out an `OpInstance` on success,
//! so no partially-constructed or unverified instance is ever observable.
//! Erasing an instance is dropping it; ownership lies with the IR node
//! that contains it.

use serde::{Deserialize, Serialize};

use crate::attr::{AttrValue, CompareFn, UnaryFn};
use crate::error::{FxpResult, RegistryError, VerificationError};
use crate::registry::catalog;
use crate::schema::OpSchema;
use crate::types::TensorType;
use crate::verify;

/// A verified, immutable operation instance.
///
/// Fields are private; instances are constructed through [`OpBuilder`] or
/// the per-operation factory constructors, and queried through getters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpInstance {
    op: String,
    operands: Vec<TensorType>,
    attrs: Vec<(String, AttrValue)>,
    results: Vec<TensorType>,
}

impl OpInstance {
    /// The operation name this instance derives from.
    #[must_use]
    pub fn op(&self) -> &str {
        &self.op
    }

    /// The schema this instance derives from.
    #[must_use]
    pub fn schema(&self) -> &'static OpSchema {
        // A verified instance always names a cataloged operation.
        catalog()
            .get(&self.op)
            .expect("verified instance refers to a cataloged operation")
    }

    /// Bound operand types, in schema order.
    #[must_use]
    pub fn operands(&self) -> &[TensorType] {
        &self.operands
    }

    /// Result types, in schema order.
    #[must_use]
    pub fn results(&self) -> &[TensorType] {
        &self.results
    }

    /// Attribute bindings, in schema order.
    #[must_use]
    pub fn attrs(&self) -> &[(String, AttrValue)] {
        &self.attrs
    }

    /// Looks up an attribute binding by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Integer attribute accessor.
    #[must_use]
    pub fn int_attr(&self, name: &str) -> Option<i128> {
        self.attr(name).and_then(AttrValue::as_int)
    }

    /// Real attribute accessor.
    #[must_use]
    pub fn real_attr(&self, name: &str) -> Option<f64> {
        self.attr(name).and_then(AttrValue::as_real)
    }

    /// Unary-function attribute accessor.
    #[must_use]
    pub fn unary_fn_attr(&self, name: &str) -> Option<UnaryFn> {
        self.attr(name).and_then(AttrValue::as_unary_fn)
    }

    /// Comparison attribute accessor.
    #[must_use]
    pub fn compare_fn_attr(&self, name: &str) -> Option<CompareFn> {
        self.attr(name).and_then(AttrValue::as_compare_fn)
    }

    /// The clamp bounds, when both are present.
    ///
    /// Operations with optional `clamp_min`/`clamp_max` attributes clamp
    /// only when both bounds are bound.
    #[must_use]
    pub fn clamp_bounds(&self) -> Option<(f64, f64)> {
        match (self.real_attr("clamp_min"), self.real_attr("clamp_max")) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_trait_tests(
        op: &str,
        operands: Vec<TensorType>,
        results: Vec<TensorType>,
    ) -> Self {
        Self {
            op: op.to_string(),
            operands,
            attrs: Vec::new(),
            results,
        }
    }
}

/// Builder for operation instances.
///
/// # Example
/// ```
/// use fxpir::{IntType, OpBuilder, Shape, TensorType};
///
/// let ty = TensorType::int(IntType::I32, Shape::new(&[4]));
/// let inst = OpBuilder::new("rounding_divide_by_pot_is")
///     .operand(ty.clone())
///     .attr("exponent", 3i128)
///     .result(ty)
///     .build()
///     .unwrap();
/// assert_eq!(inst.int_attr("exponent"), Some(3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpBuilder {
    op: String,
    operands: Vec<TensorType>,
    attrs: Vec<(String, AttrValue)>,
    results: Vec<TensorType>,
}

impl OpBuilder {
    /// Creates a builder for the named operation.
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            ..Self::default()
        }
    }

    /// Appends an operand binding (positional, schema order).
    #[must_use]
    pub fn operand(mut self, ty: TensorType) -> Self {
        self.operands.push(ty);
        self
    }

    /// Binds an attribute. A later binding of the same name wins.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
        self
    }

    /// Appends a result type (positional, schema order).
    #[must_use]
    pub fn result(mut self, ty: TensorType) -> Self {
        self.results.push(ty);
        self
    }

    /// Builds and verifies the instance.
    ///
    /// Looks up the schema in the process-wide catalog, fills fixed and
    /// defaulted attributes, and runs the verification engine. Returns
    /// the instance only if every check passes.
    pub fn build(self) -> FxpResult<OpInstance> {
        let schema = catalog()
            .get(&self.op)
            .ok_or_else(|| RegistryError::UnknownOperation {
                name: self.op.clone(),
            })?;
        self.build_against(schema).map_err(Into::into)
    }

    /// Builds and verifies against an explicit schema.
    ///
    /// Used by the catalog path and by round-trip tests that verify a
    /// deserialized schema without registering it.
    pub fn build_against(self, schema: &OpSchema) -> Result<OpInstance, VerificationError> {
        let mut attrs: Vec<(String, AttrValue)> = Vec::with_capacity(schema.attrs.len());

        // Bindings the schema pins or defaults come first, in schema order.
        for spec in &schema.attrs {
            let bound = self.attrs.iter().find(|(n, _)| *n == spec.name);
            if let Some(fixed) = spec.fixed {
                if let Some((_, value)) = bound {
                    if *value != fixed {
                        return Err(VerificationError::FixedAttributeRebound {
                            op: schema.name.clone(),
                            attr: spec.name.clone(),
                        });
                    }
                }
                attrs.push((spec.name.clone(), fixed));
            } else if let Some((name, value)) = bound {
                attrs.push((name.clone(), *value));
            } else if let Some(default) = spec.default {
                attrs.push((spec.name.clone(), default));
            }
        }

        // Anything the schema does not declare is kept so verification can
        // reject it by name.
        for (name, value) in &self.attrs {
            if schema.attr_spec(name).is_none() {
                attrs.push((name.clone(), *value));
            }
        }

        let instance = OpInstance {
            op: schema.name.clone(),
            operands: self.operands,
            attrs,
            results: self.results,
        };
        verify::verify(schema, &instance)?;
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::IntType;
    use crate::error::FxpError;
    use crate::shape::Shape;

    fn i32_tensor() -> TensorType {
        TensorType::int(IntType::I32, Shape::new(&[4]))
    }

    #[test]
    fn test_unknown_operation() {
        let err = OpBuilder::new("no_such_op")
            .operand(i32_tensor())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            FxpError::Registry(RegistryError::UnknownOperation { .. })
        ));
    }

    #[test]
    fn test_build_fills_defaults() {
        let ty = TensorType::float(crate::dtype::FloatType::F32, Shape::new(&[2]));
        let inst = OpBuilder::new("real_unary_ew")
            .operand(ty.clone())
            .result(ty)
            .build()
            .unwrap();
        assert_eq!(inst.unary_fn_attr("fn"), Some(UnaryFn::Identity));
    }

    #[test]
    fn test_attr_rebinding_last_wins() {
        let ty = i32_tensor();
        let inst = OpBuilder::new("rounding_divide_by_pot_is")
            .operand(ty.clone())
            .attr("exponent", 40i128)
            .attr("exponent", 4i128)
            .result(ty)
            .build()
            .unwrap();
        assert_eq!(inst.int_attr("exponent"), Some(4));
    }

    #[test]
    fn test_clamp_bounds_requires_both() {
        let ty = TensorType::float(crate::dtype::FloatType::F32, Shape::new(&[2]));
        let inst = OpBuilder::new("real_unary_ew")
            .operand(ty.clone())
            .attr("clamp_min", -1.0)
            .result(ty)
            .build()
            .unwrap();
        assert_eq!(inst.real_attr("clamp_min"), Some(-1.0));
        assert_eq!(inst.clamp_bounds(), None);
    }

    #[test]
    fn test_instance_is_queryable() {
        let ty = i32_tensor();
        let inst = OpBuilder::new("clamp_is")
            .operand(ty.clone())
            .attr("clamp_min", -3i128)
            .attr("clamp_max", 8i128)
            .result(ty.clone())
            .build()
            .unwrap();
        assert_eq!(inst.op(), "clamp_is");
        assert_eq!(inst.operands(), &[ty.clone()]);
        assert_eq!(inst.results(), &[ty]);
        assert_eq!(inst.int_attr("clamp_min"), Some(-3));
        assert!(inst.schema().has_trait(crate::traits::OpTrait::SideEffectFree));
    }
}
