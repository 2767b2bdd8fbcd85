use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::reflect::Reflect;

/// Identity of a `(source, destination)` type pair.
///
/// Equality is on the two type ids only; the names are kept for logs.
#[derive(Clone, Copy)]
pub struct TypePair {
    pub source: TypeId,
    pub destination: TypeId,
    source_name: &'static str,
    destination_name: &'static str,
}

impl TypePair {
    pub fn of<S: 'static, D: 'static>() -> Self {
        Self {
            source: TypeId::of::<S>(),
            destination: TypeId::of::<D>(),
            source_name: std::any::type_name::<S>(),
            destination_name: std::any::type_name::<D>(),
        }
    }

    /// Pair of the concrete types behind two reflected values.
    pub fn between(source: &dyn Reflect, destination: &dyn Reflect) -> Self {
        Self {
            source: source.as_any().type_id(),
            destination: destination.as_any().type_id(),
            source_name: source.type_name(),
            destination_name: destination.type_name(),
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source_name
    }

    pub fn destination_name(&self) -> &'static str {
        self.destination_name
    }
}

impl PartialEq for TypePair {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.destination == other.destination
    }
}

impl Eq for TypePair {}

impl std::hash::Hash for TypePair {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.destination.hash(state);
    }
}

impl fmt::Debug for TypePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypePair({} -> {})", self.source_name, self.destination_name)
    }
}

/// Explicit conversion for one type pair.
///
/// Receives the source value; returns a value of exactly the destination
/// type, `None` for "zero value", or an error that is propagated verbatim.
pub type Converter =
    Arc<dyn Fn(&dyn Reflect) -> Result<Option<Box<dyn Reflect>>, BoxError> + Send + Sync>;

/// Type-pair → converter table. Consulted before any structural mapping.
///
/// At most one converter per pair; inserting again replaces the previous one.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<TypePair, Converter>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `converter` for `pair`, returning the one it replaced.
    pub fn insert(&mut self, pair: TypePair, converter: Converter) -> Option<Converter> {
        self.converters.insert(pair, converter)
    }

    pub fn get(&self, pair: &TypePair) -> Option<&Converter> {
        self.converters.get(pair)
    }

    pub fn contains(&self, pair: &TypePair) -> bool {
        self.converters.contains_key(pair)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.converters.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: i64) -> Converter {
        Arc::new(move |_: &dyn Reflect| Ok::<_, BoxError>(Some(Box::new(value) as Box<dyn Reflect>)))
    }

    #[test]
    fn pair_equality_ignores_names() {
        let typed = TypePair::of::<String, i64>();
        let reflected = TypePair::between(&String::new(), &0i64);
        assert_eq!(typed, reflected);
        assert_ne!(typed, TypePair::of::<i64, String>());
        assert_eq!(typed.source_name(), std::any::type_name::<String>());
    }

    #[test]
    fn last_insert_wins() {
        let mut registry = ConverterRegistry::new();
        let pair = TypePair::of::<String, i64>();
        assert!(registry.insert(pair, constant(1)).is_none());
        assert!(registry.insert(pair, constant(2)).is_some());
        assert_eq!(registry.len(), 1);

        let converter = registry.get(&pair).unwrap();
        let out = converter(&String::new()).unwrap().unwrap();
        assert_eq!(out.as_any().downcast_ref::<i64>(), Some(&2));
    }

    #[test]
    fn lookup_is_per_pair() {
        let mut registry = ConverterRegistry::new();
        registry.insert(TypePair::of::<String, i64>(), constant(1));
        assert!(registry.contains(&TypePair::of::<String, i64>()));
        assert!(!registry.contains(&TypePair::of::<String, i32>()));
        assert!(!registry.is_empty());
    }
}
