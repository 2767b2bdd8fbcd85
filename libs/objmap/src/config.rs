use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Behaviour for destination kinds the mapper does not descend into
/// (channels, functions, raw addresses).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedPolicy {
    /// Leave the destination untouched.
    #[default]
    Skip,
    /// Fail with `TypeMismatch`.
    Fail,
}

/// Mapper settings.
///
/// Every field has a default, so a partial document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub unsupported: UnsupportedPolicy,

    /// Prefix of zero-argument accessor methods, read when a source field is
    /// missing: `get_` + `name`.
    #[serde(default = "default_accessor_prefix")]
    pub accessor_prefix: String,

    /// Prefix of single-argument mutator methods on the destination:
    /// `set_` + `name`.
    #[serde(default = "default_mutator_prefix")]
    pub mutator_prefix: String,
}

fn default_accessor_prefix() -> String {
    "get_".to_string()
}

fn default_mutator_prefix() -> String {
    "set_".to_string()
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            unsupported: UnsupportedPolicy::default(),
            accessor_prefix: default_accessor_prefix(),
            mutator_prefix: default_mutator_prefix(),
        }
    }
}

impl MapperConfig {
    pub fn validate(&self) -> Result<(), MapError> {
        if self.accessor_prefix.is_empty() {
            return Err(MapError::config("accessor_prefix must not be empty"));
        }
        if self.mutator_prefix.is_empty() {
            return Err(MapError::config("mutator_prefix must not be empty"));
        }
        Ok(())
    }

    pub fn accessor_name(&self, field: &str) -> String {
        format!("{}{field}", self.accessor_prefix)
    }

    /// Field name targeted by a mutator method, if it follows the convention.
    pub fn mutator_field<'a>(&self, method: &'a str) -> Option<&'a str> {
        method
            .strip_prefix(self.mutator_prefix.as_str())
            .filter(|field| !field.is_empty())
    }
}
