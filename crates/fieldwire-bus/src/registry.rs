//! Field-name registry for one form instance.

use std::collections::BTreeSet;

use crate::error::{BusError, Result};

/// The set of field names declared by one form.
///
/// Consumers key their state by field name, so names must be unique per
/// form. The bus itself cannot check this; forms register their fields here
/// when they are built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRegistry {
    names: BTreeSet<String>,
}

impl FieldRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from names, failing on the first duplicate.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name)?;
        }
        Ok(registry)
    }

    /// Registers a field name.
    pub fn register(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BusError::InvalidFieldName(name));
        }
        if self.names.contains(&name) {
            return Err(BusError::DuplicateFieldName(name));
        }
        self.names.insert(name);
        Ok(())
    }

    /// Returns whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Iterates the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns the number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
