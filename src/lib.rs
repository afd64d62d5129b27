//! # fxpir - Fixed-Point Operation Catalog
//!
//! fxpir is the operation catalog of a quantization-lowering pipeline: it
//! describes a family of fixed-point and quantization-aware arithmetic
//! operations together with the structural and numeric invariants each
//! operation must satisfy. A lowering pass constructs operation instances
//! against the catalog; every instance is verified at construction, and
//! later passes query admitted instances purely through their declared
//! traits.
//!
//! ## Core Concepts
//!
//! - **Schema**: a static, named description of an operation's operands,
//!   attributes, results, traits, and optional custom verifier
//! - **Trait**: a declared structural property, mechanically enforced as
//!   an invariant over an instance's operands and results
//! - **Instance**: a concrete, immutable use of a schema; construct →
//!   verify → (immutable, queryable) → erase
//! - **Reference kernels**: the executable arithmetic contract of each
//!   operation, used by tests and conformance suites
//!
//! ## Usage
//!
//! ```rust
//! use fxpir::{ops, IntType, Shape, TensorType};
//!
//! let ty = TensorType::int(IntType::I32, Shape::new(&[3]));
//!
//! // Verified at construction: the exponent range is a hard invariant.
//! let inst = ops::fixed::rounding_divide_by_pot(ty.clone(), 4).unwrap();
//! assert_eq!(inst.int_attr("exponent"), Some(4));
//!
//! // Out-of-range exponents never produce an instance.
//! assert!(ops::fixed::rounding_divide_by_pot(ty, 32).is_err());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod attr;
pub mod dtype;
pub mod error;
pub mod shape;
pub mod types;

// Schema model, verification, and the catalog
pub mod instance;
pub mod ops;
pub mod registry;
pub mod schema;
pub mod serialize;
pub mod traits;
pub mod verify;

// Reference arithmetic contracts
pub mod kernels;

// Re-export primary types at crate root for convenience
pub use attr::{AttrKind, AttrValue, CompareFn, UnaryFn};
pub use dtype::{ElemType, FloatType, IntType, QuantizedType};
pub use error::{FxpError, FxpResult, RegistryError, VerificationError};
pub use instance::{OpBuilder, OpInstance};
pub use registry::{catalog, Catalog};
pub use schema::{AttrSpec, OperandSpec, OpSchema, ResultSpec, VerifyFn};
pub use serialize::{from_json, to_json_pretty};
pub use shape::Shape;
pub use traits::OpTrait;
pub use types::{TensorType, TypeConstraint};
