//! Reflection-driven copying between values of matching shape.
//!
//! Types opt in through [`Reflect`] (derived for structs with
//! `#[derive(Reflect)]`); a [`Mapper`] then copies any reflected source into
//! any reflected destination, recursing through containers and struct
//! fields, and consulting registered converters first.

extern crate self as objmap;

pub mod config;
pub mod converter;
pub mod error;
mod impls;
pub mod mapper;
pub mod mapping;
pub mod reflect;
pub mod value;

pub use config::{MapperConfig, UnsupportedPolicy};
pub use converter::{Converter, ConverterRegistry, TypePair};
pub use error::{BoxError, MapError};
pub use mapper::Mapper;
pub use mapping::FieldMap;
pub use objmap_derive::Reflect;
pub use reflect::{
    Array, Kind, List, Map, Optional, Reflect, ReflectMut, ReflectRef, ScalarMut, ScalarRef, Struct,
    UnsupportedKind,
};
pub use value::{AnyValue, Complex};
