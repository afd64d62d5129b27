//! The built-in operation catalog.
//!
//! One module per operation family, mirroring the split in the catalog
//! itself: the integer-domain fixed-point operations, the real-valued
//! elementwise family, and matrix multiply.

pub mod fixed;
pub mod matmul;
pub mod real;

use crate::error::VerificationError;
use crate::instance::OpInstance;
use crate::schema::OpSchema;

/// All built-in catalog entries, in registration order.
///
/// The process-wide catalog is initialized with exactly this set.
#[must_use]
pub fn catalog_entries() -> Vec<OpSchema> {
    let mut entries = fixed::schemas();
    entries.extend(real::schemas());
    entries.extend(matmul::schemas());
    entries
}

/// The custom verifier of the built-in operation with the given name.
///
/// Verifiers are code, not data; deserialized schemas use this table to
/// restore their verification contract.
#[must_use]
pub fn builtin_verifier(
    name: &str,
) -> Option<fn(&OpInstance) -> Result<(), VerificationError>> {
    fixed::builtin_verifier(name)
        .or_else(|| real::builtin_verifier(name))
        .or_else(|| matmul::builtin_verifier(name))
}
