//! The operation schema registry.
//!
//! Schemas are registered once, at process start, into a process-wide
//! catalog behind a `OnceLock`. The catalog is never mutated afterwards,
//! so any number of compilation threads may read it concurrently without
//! synchronization.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::RegistryError;
use crate::ops;
use crate::schema::OpSchema;

/// An ordered name → schema catalog.
///
/// # Examples
///
/// ```
/// use fxpir::catalog;
///
/// let cat = catalog();
/// assert!(cat.get("clamp_is").is_some());
/// assert!(cat.get("no_such_op").is_none());
/// ```
#[derive(Debug, Default)]
pub struct Catalog {
    entries: BTreeMap<String, OpSchema>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the built-in operation set.
    ///
    /// This is the registration entry point; the process-wide catalog is
    /// initialized with exactly this set.
    #[must_use]
    pub fn with_builtin_ops() -> Self {
        let mut cat = Self::new();
        cat.register_all(ops::catalog_entries())
            .expect("built-in catalog entries are well-formed and unique");
        cat
    }

    /// Registers one schema.
    ///
    /// Rejects a duplicate operation name, and a schema whose operand,
    /// attribute, or result names are not unique.
    pub fn register(&mut self, schema: OpSchema) -> Result<(), RegistryError> {
        schema.check_unique_names()?;
        if self.entries.contains_key(&schema.name) {
            return Err(RegistryError::DuplicateOperation {
                name: schema.name,
            });
        }
        self.entries.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Registers every schema in the iterator, stopping at the first error.
    pub fn register_all<I>(&mut self, entries: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = OpSchema>,
    {
        for schema in entries {
            self.register(schema)?;
        }
        Ok(())
    }

    /// Looks up a schema by operation name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OpSchema> {
        self.entries.get(name)
    }

    /// Iterates over all schemas in name order.
    pub fn iter(&self) -> impl Iterator<Item = &OpSchema> {
        self.entries.values()
    }

    /// Number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static CATALOG: OnceLock<Catalog> = OnceLock::new();

/// The process-wide operation catalog.
///
/// Initialized with the built-in operation set on first use; immutable
/// thereafter.
#[must_use]
pub fn catalog() -> &'static Catalog {
    CATALOG.get_or_init(Catalog::with_builtin_ops)
}
