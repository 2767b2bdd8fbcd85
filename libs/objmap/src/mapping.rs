use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::converter::{Converter, TypePair};
use crate::error::{BoxError, MapError};
use crate::reflect::Reflect;

/// Override for one destination field of a struct pair.
///
/// - `source`: read this source field (or its accessor) instead of the
///   same-named one.
/// - `value`: produce the destination value directly from the resolved source
///   value instead of mapping it recursively.
#[derive(Clone)]
pub struct FieldMap {
    pub destination: String,
    pub source: Option<String>,
    pub value: Option<Converter>,
}

impl FieldMap {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            source: None,
            value: None,
        }
    }

    /// Read from the source field `source`.
    pub fn from(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn Reflect) -> Result<Option<Box<dyn Reflect>>, BoxError> + Send + Sync + 'static,
    {
        self.value = Some(Arc::new(f));
        self
    }

    /// Source field name to resolve for this destination field.
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.destination)
    }
}

impl fmt::Debug for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMap")
            .field("destination", &self.destination)
            .field("source", &self.source)
            .field("value", &self.value.is_some())
            .finish()
    }
}

/// Per struct-pair field overrides, keyed by destination field name.
#[derive(Debug, Clone, Default)]
pub struct FieldMaps {
    pairs: HashMap<TypePair, HashMap<String, FieldMap>>,
}

impl FieldMaps {
    /// Merge `maps` into the configuration of `pair`.
    ///
    /// Later entries for the same destination field replace earlier ones.
    /// Nothing is stored if any entry is invalid.
    pub fn configure(
        &mut self,
        pair: TypePair,
        maps: impl IntoIterator<Item = FieldMap>,
    ) -> Result<(), MapError> {
        let maps: Vec<FieldMap> = maps.into_iter().collect();
        if maps.iter().any(|map| map.destination.is_empty()) {
            return Err(MapError::config("destination field names must be provided"));
        }
        if maps
            .iter()
            .any(|map| map.source.as_deref().is_some_and(str::is_empty))
        {
            return Err(MapError::config("source field names must not be empty"));
        }

        let fields = self.pairs.entry(pair).or_default();
        for map in maps {
            fields.insert(map.destination.clone(), map);
        }
        Ok(())
    }

    pub fn get(&self, pair: &TypePair, destination: &str) -> Option<&FieldMap> {
        self.pairs.get(pair)?.get(destination)
    }

    pub fn for_pair(&self, pair: &TypePair) -> Option<&HashMap<String, FieldMap>> {
        self.pairs.get(pair)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
