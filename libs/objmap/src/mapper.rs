use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{MapperConfig, UnsupportedPolicy};
use crate::converter::{Converter, ConverterRegistry, TypePair};
use crate::error::{BoxError, MapError};
use crate::mapping::{FieldMap, FieldMaps};
use crate::reflect::{
    Array, Kind, Reflect, ReflectMut, ReflectRef, Struct, UnsupportedKind, type_id_of,
};

/// Copies values between reflected types of matching-but-not-identical shape.
///
/// Owns one converter registry, the field-map overrides and the settings.
/// Registration needs `&mut self`, mapping only `&self`: once configured, a
/// mapper can be shared between threads.
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect, Clone, Default)]
/// struct UserDto { id: i64, name: String }
///
/// #[derive(Reflect, Clone, Default)]
/// struct User { id: i64, name: String }
///
/// let mapper = Mapper::new();
/// let mut user = User::default();
/// mapper.map(&dto, &mut user)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    cfg: MapperConfig,
    converters: ConverterRegistry,
    field_maps: FieldMaps,
}

/// Source value found for a destination field.
enum Resolved<'a> {
    Field(&'a dyn Reflect),
    Accessor(Box<dyn Reflect>),
}

impl Resolved<'_> {
    fn as_reflect(&self) -> &dyn Reflect {
        match self {
            Resolved::Field(value) => *value,
            Resolved::Accessor(value) => &**value,
        }
    }
}

impl Mapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(cfg: MapperConfig) -> Result<Self, MapError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &MapperConfig {
        &self.cfg
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Register a converter for the exact pair `S -> D`.
    ///
    /// `f` receives the source value and must return a `D`, `None` (the
    /// destination is reset to its zero value) or an error, which `map`
    /// returns verbatim. A second registration for the same pair replaces
    /// the first.
    pub fn add_type_converter<S, D, F>(&mut self, f: F)
    where
        S: 'static,
        D: 'static,
        F: Fn(&dyn Reflect) -> Result<Option<Box<dyn Reflect>>, BoxError> + Send + Sync + 'static,
    {
        self.insert_converter(TypePair::of::<S, D>(), Arc::new(f));
    }

    /// Typed form of [`Mapper::add_type_converter`].
    pub fn add_converter<S, D, E, F>(&mut self, f: F)
    where
        S: Reflect,
        D: Reflect,
        E: Into<BoxError> + 'static,
        F: Fn(&S) -> Result<Option<D>, E> + Send + Sync + 'static,
    {
        let converter: Converter = Arc::new(move |src: &dyn Reflect| -> Result<_, BoxError> {
            let Some(typed) = src.as_any().downcast_ref::<S>() else {
                return Err(
                    MapError::type_mismatch(std::any::type_name::<S>(), src.type_name()).into(),
                );
            };
            match f(typed) {
                Ok(Some(value)) => Ok(Some(Box::new(value) as Box<dyn Reflect>)),
                Ok(None) => Ok(None),
                Err(e) => Err(e.into()),
            }
        });
        self.insert_converter(TypePair::of::<S, D>(), converter);
    }

    fn insert_converter(&mut self, pair: TypePair, converter: Converter) {
        if self.converters.insert(pair, converter).is_some() {
            tracing::debug!(
                source = pair.source_name(),
                destination = pair.destination_name(),
                "type converter replaced"
            );
        }
    }

    /// Override field resolution for the struct pair `S -> D`.
    pub fn configure_field_maps<S, D>(
        &mut self,
        maps: impl IntoIterator<Item = FieldMap>,
    ) -> Result<(), MapError>
    where
        S: Reflect + Default,
        D: Reflect + Default,
    {
        let is_struct = |value: &dyn Reflect| matches!(value.reflect_ref(), ReflectRef::Struct(_));
        if !is_struct(&S::default()) || !is_struct(&D::default()) {
            return Err(MapError::config(format!(
                "field maps need struct types, got {} -> {}",
                std::any::type_name::<S>(),
                std::any::type_name::<D>()
            )));
        }
        let pair = TypePair::of::<S, D>();
        self.field_maps.configure(pair, maps).map_err(|e| {
            e.with_context(format!("{} -> {}", pair.source_name(), pair.destination_name()))
        })
    }

    /// Copy `source` into `destination`.
    ///
    /// `destination` is written in place; on error it is left partially
    /// written. An `AnyValue` destination holding a payload by value, or a
    /// shared one, cannot be written and yields `NotAddressable`.
    pub fn map(&self, source: &dyn Reflect, destination: &mut dyn Reflect) -> Result<(), MapError> {
        tracing::trace!(
            source = source.type_name(),
            destination = destination.type_name(),
            "map"
        );
        if let ReflectMut::Interface(slot) = destination.reflect_mut() {
            if slot.is_shared() {
                return Err(MapError::NotAddressable);
            }
        }
        self.map_value(source, destination)
    }

    /// Map `source` into a fresh `T::default()`.
    pub fn map_into<T: Reflect + Default>(&self, source: &dyn Reflect) -> Result<T, MapError> {
        let mut destination = T::default();
        self.map(source, &mut destination)?;
        Ok(destination)
    }

    // ---------------------------------------------------------------------
    // Recursive core
    // ---------------------------------------------------------------------

    fn map_value(&self, src: &dyn Reflect, dst: &mut dyn Reflect) -> Result<(), MapError> {
        // Source indirection is unwrapped before anything else; an absent
        // source leaves the destination untouched.
        match src.reflect_ref() {
            ReflectRef::Optional(inner) => {
                return match inner.get() {
                    Some(value) => self.map_value(value, dst),
                    None => Ok(()),
                };
            }
            ReflectRef::Interface(inner) => {
                return match inner.get() {
                    Some(value) => self.map_value(value, dst),
                    None => Ok(()),
                };
            }
            _ => {}
        }

        let pair = TypePair::between(src, dst);
        if let Some(converter) = self.converters.get(&pair) {
            tracing::trace!(
                source = pair.source_name(),
                destination = pair.destination_name(),
                "applying type converter"
            );
            return apply_converter(converter, src, dst);
        }

        if dst.try_assign(src) {
            return Ok(());
        }

        let mismatch = || MapError::type_mismatch(pair.destination_name(), pair.source_name());

        match dst.reflect_mut() {
            ReflectMut::Scalar(scalar) => {
                let assigned = match src.reflect_ref() {
                    ReflectRef::Scalar(value) => scalar.assign(value),
                    _ => false,
                };
                if assigned { Ok(()) } else { Err(mismatch()) }
            }
            ReflectMut::Array(array) => {
                let seq = sequence(src).ok_or_else(mismatch)?;
                if array.len() < seq.len() {
                    return Err(MapError::InsufficientCapacity {
                        capacity: array.len(),
                        len: seq.len(),
                    });
                }
                for index in 0..seq.len() {
                    if let (Some(item), Some(slot)) = (seq.get(index), array.get_mut(index)) {
                        self.map_value(item, slot)?;
                    }
                }
                Ok(())
            }
            ReflectMut::List(list) => {
                let seq = sequence(src).ok_or_else(mismatch)?;
                list.clear();
                for index in 0..seq.len() {
                    let Some(item) = seq.get(index) else { continue };
                    let mut element = list.new_element();
                    self.map_value(item, &mut *element)?;
                    list.push(element)?;
                }
                Ok(())
            }
            ReflectMut::Map(map) => {
                let ReflectRef::Map(entries) = src.reflect_ref() else {
                    return Err(mismatch());
                };
                for (src_key, src_value) in entries.iter() {
                    let mut key = map.new_key();
                    self.map_value(src_key, &mut *key)?;
                    let mut value = map.new_value();
                    self.map_value(src_value, &mut *value)?;
                    map.insert_boxed(key, value)?;
                }
                Ok(())
            }
            ReflectMut::Optional(pointer) => self.map_value(src, pointer.get_or_insert_default()),
            ReflectMut::Interface(slot) => {
                if !slot.is_empty() {
                    let Some(held) = slot.get_mut() else {
                        return Err(MapError::NotAddressable);
                    };
                    return self.map_value(src, held);
                }
                let Some(mut value) = src.default_value() else {
                    tracing::debug!(
                        source = pair.source_name(),
                        "source has no zero value, interface left empty"
                    );
                    return Ok(());
                };
                self.map_value(src, &mut *value)?;
                slot.set_boxed(value);
                Ok(())
            }
            ReflectMut::Struct(target) => {
                let ReflectRef::Struct(source) = src.reflect_ref() else {
                    return Err(mismatch());
                };
                let overrides = self.field_maps.for_pair(&pair);
                self.map_fields(source, target, overrides)?;
                self.map_mutators(source, target, overrides, &pair)
            }
            ReflectMut::Opaque => Err(mismatch()),
            ReflectMut::Unsupported(kind) => self.unsupported(kind, &pair),
        }
    }

    fn unsupported(&self, kind: UnsupportedKind, pair: &TypePair) -> Result<(), MapError> {
        match self.cfg.unsupported {
            UnsupportedPolicy::Skip => {
                tracing::debug!(
                    kind = %Kind::from(kind),
                    destination = pair.destination_name(),
                    "skipping unsupported destination kind"
                );
                Ok(())
            }
            UnsupportedPolicy::Fail => Err(MapError::type_mismatch(
                pair.destination_name(),
                pair.source_name(),
            )),
        }
    }

    // ---------------------------------------------------------------------
    // Struct passes
    // ---------------------------------------------------------------------

    /// Same-named source field, else the source accessor for that name.
    fn resolve<'s>(&self, source: &'s dyn Struct, name: &str) -> Option<Resolved<'s>> {
        if let Some(field) = source.field(name) {
            return Some(Resolved::Field(field));
        }
        source
            .accessor(&self.cfg.accessor_name(name))
            .map(Resolved::Accessor)
    }

    /// Read pass: every destination field, in declaration order.
    fn map_fields(
        &self,
        source: &dyn Struct,
        target: &mut dyn Struct,
        overrides: Option<&HashMap<String, FieldMap>>,
    ) -> Result<(), MapError> {
        for &name in target.field_names() {
            let field_map = overrides.and_then(|maps| maps.get(name));
            let source_name = field_map.map_or(name, FieldMap::source_name);
            let Some(value) = self.resolve(source, source_name) else {
                tracing::trace!(field = name, "no source field or accessor");
                continue;
            };
            let Some(field) = target.field_mut(name) else {
                continue;
            };
            match field_map.and_then(|map| map.value.as_ref()) {
                Some(convert) => apply_converter(convert, value.as_reflect(), field)?,
                None => self.map_value(value.as_reflect(), field)?,
            }
        }
        Ok(())
    }

    /// Write pass: every destination mutator following the naming convention.
    fn map_mutators(
        &self,
        source: &dyn Struct,
        target: &mut dyn Struct,
        overrides: Option<&HashMap<String, FieldMap>>,
        pair: &TypePair,
    ) -> Result<(), MapError> {
        for &method in target.mutator_names() {
            let Some(name) = self.cfg.mutator_field(method) else {
                continue;
            };
            let field_map = overrides.and_then(|maps| maps.get(name));
            let source_name = field_map.map_or(name, FieldMap::source_name);
            let value = self.resolve(source, source_name).ok_or_else(|| {
                MapError::FieldNotFound(source_name.to_string())
                    .with_context(pair.destination_name())
            })?;
            let Some(mut param) = target.mutator_param(method) else {
                continue;
            };
            match field_map.and_then(|map| map.value.as_ref()) {
                Some(convert) => apply_converter(convert, value.as_reflect(), &mut *param)?,
                None => self.map_value(value.as_reflect(), &mut *param)?,
            }
            target.call_mutator(method, param)?;
        }
        Ok(())
    }
}

/// Readable sequence behind a fixed-size or growable source.
fn sequence(src: &dyn Reflect) -> Option<&dyn Array> {
    match src.reflect_ref() {
        ReflectRef::Array(array) => Some(array),
        ReflectRef::List(list) => Some(list.as_array()),
        _ => None,
    }
}

fn apply_converter(
    converter: &Converter,
    src: &dyn Reflect,
    dst: &mut dyn Reflect,
) -> Result<(), MapError> {
    match (**converter)(src).map_err(MapError::Converter)? {
        None => {
            dst.reset();
            Ok(())
        }
        Some(value) => {
            if type_id_of(&*value) != type_id_of(&*dst) {
                return Err(MapError::type_mismatch(dst.type_name(), value.type_name()));
            }
            dst.set(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::AnyValue;
    use std::collections::BTreeMap;

    #[test]
    fn scalars_copy_between_identical_kinds() {
        let mapper = Mapper::new();
        let mut dst = 0u16;
        mapper.map(&7u16, &mut dst).unwrap();
        assert_eq!(dst, 7);

        let err = mapper.map(&7u32, &mut dst).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(dst, 7);
    }

    #[test]
    fn optional_source_is_unwrapped() {
        let mapper = Mapper::new();
        let mut dst = 1i32;
        mapper.map(&Some(5i32), &mut dst).unwrap();
        assert_eq!(dst, 5);

        mapper.map(&None::<i32>, &mut dst).unwrap();
        assert_eq!(dst, 5);
    }

    #[test]
    fn optional_destination_is_allocated() {
        let mapper = Mapper::new();
        let mut dst: Option<Box<i64>> = None;
        mapper.map(&9i64, &mut dst).unwrap();
        assert_eq!(dst.as_deref(), Some(&9));
    }

    #[test]
    fn list_destination_is_rebuilt() {
        let mapper = Mapper::new();
        let mut dst = vec![9i32, 9, 9, 9];
        mapper.map(&[1i32, 2], &mut dst).unwrap();
        assert_eq!(dst, vec![1, 2]);
    }

    #[test]
    fn list_from_non_sequence_is_a_mismatch() {
        let mapper = Mapper::new();
        let mut dst = vec![3i32];
        let err = mapper.map(&1i32, &mut dst).unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(dst, vec![3]);
    }

    #[test]
    fn map_entries_are_merged() {
        let mapper = Mapper::new();
        let mut dst = BTreeMap::from([(String::from("keep"), 0i64)]);
        let src = HashMap::from([(String::from("a"), 1i64)]);
        mapper.map(&src, &mut dst).unwrap();
        assert_eq!(dst.len(), 2);
        assert_eq!(dst.get("a"), Some(&1));
    }

    #[test]
    fn interface_synthesizes_source_type() {
        let mapper = Mapper::new();
        let mut dst = AnyValue::default();
        mapper.map(&String::from("test"), &mut dst).unwrap();
        assert_eq!(dst.downcast_ref::<String>().map(String::as_str), Some("test"));
    }

    #[test]
    fn interface_writes_into_value_held_by_reference() {
        let mapper = Mapper::new();
        let mut dst = AnyValue::new_mut(0i64);
        mapper.map(&42i64, &mut dst).unwrap();
        assert_eq!(dst.downcast_ref::<i64>(), Some(&42));

        let err = mapper.map(&String::from("x"), &mut dst).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn interface_holding_a_value_is_not_addressable() {
        let mapper = Mapper::new();
        let mut dst = AnyValue::new(0i64);
        let err = mapper.map(&42i64, &mut dst).unwrap_err();
        assert!(matches!(err, MapError::NotAddressable));
        assert_eq!(dst.downcast_ref::<i64>(), Some(&0));
    }

    #[test]
    fn synthesized_interface_value_is_held_by_value() {
        let mapper = Mapper::new();
        let mut dst = AnyValue::default();
        mapper.map(&1i64, &mut dst).unwrap();
        assert!(matches!(mapper.map(&2i64, &mut dst), Err(MapError::NotAddressable)));
        assert_eq!(dst.downcast_ref::<i64>(), Some(&1));
    }

    #[test]
    fn shared_root_interface_is_not_addressable() {
        let mapper = Mapper::new();
        let original = AnyValue::new_mut(0i64);
        let mut alias = original.clone();
        let err = mapper.map(&1i64, &mut alias).unwrap_err();
        assert!(matches!(err, MapError::NotAddressable));
        assert_eq!(original.downcast_ref::<i64>(), Some(&0));
    }

    #[test]
    fn converter_wins_over_structural_mapping() {
        let mut mapper = Mapper::new();
        mapper.add_converter::<String, i64, BoxError, _>(|s| Ok(Some(s.len() as i64)));
        let mut dst = 0i64;
        mapper.map(&String::from("four"), &mut dst).unwrap();
        assert_eq!(dst, 4);
    }

    #[test]
    fn converter_none_resets_destination() {
        let mut mapper = Mapper::new();
        mapper.add_converter::<String, i64, BoxError, _>(|_| Ok(None));
        let mut dst = 11i64;
        mapper.map(&String::from("x"), &mut dst).unwrap();
        assert_eq!(dst, 0);
    }

    #[test]
    fn opaque_types_need_identical_types() {
        let mapper = Mapper::new();
        let mut dst = chrono::NaiveDate::default();
        let err = mapper.map(&chrono::Utc::now(), &mut dst).unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn mapper_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Mapper>();
    }
}
