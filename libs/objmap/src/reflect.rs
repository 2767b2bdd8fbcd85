use std::any::{Any, TypeId};
use std::fmt;

use crate::error::MapError;
use crate::value::{AnyValue, Complex};

/// Runtime view of a value's shape.
///
/// Implemented for scalars, std containers, `AnyValue`, a handful of opaque
/// library types, and user structs through `#[derive(Reflect)]`.
///
/// The trait is object safe: the mapper only ever works with `&dyn Reflect`.
/// Every reflected value is `Send + Sync`.
pub trait Reflect: Any + Send + Sync {
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn as_reflect(&self) -> &dyn Reflect;
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;

    fn reflect_ref(&self) -> ReflectRef<'_>;
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    fn clone_value(&self) -> Box<dyn Reflect>;

    /// Fresh zero value of the same concrete type.
    ///
    /// `None` for kinds without a zero value (function, channel, raw address).
    fn default_value(&self) -> Option<Box<dyn Reflect>>;

    /// Copy `value` into `self` if both have exactly the same concrete type.
    fn try_assign(&mut self, value: &dyn Reflect) -> bool;

    /// Replace `self` with a boxed value of the same concrete type.
    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), MapError>;

    /// Reset to the zero value. No-op for kinds without one.
    fn reset(&mut self);
}

/// Concrete type identity of a reflected value.
pub fn type_id_of(value: &dyn Reflect) -> TypeId {
    value.as_any().type_id()
}

pub fn downcast<T: Reflect>(value: Box<dyn Reflect>) -> Result<Box<T>, MapError> {
    let found = value.type_name();
    value
        .into_any()
        .downcast::<T>()
        .map_err(|_| MapError::type_mismatch(std::any::type_name::<T>(), found))
}

/// Shape of a value, borrowed for reading.
pub enum ReflectRef<'a> {
    Scalar(ScalarRef<'a>),
    Array(&'a dyn Array),
    List(&'a dyn List),
    Map(&'a dyn Map),
    Optional(&'a dyn Optional),
    Interface(&'a AnyValue),
    Struct(&'a dyn Struct),
    Opaque,
    Unsupported(UnsupportedKind),
}

/// Shape of a value, borrowed for writing.
pub enum ReflectMut<'a> {
    Scalar(ScalarMut<'a>),
    Array(&'a mut dyn Array),
    List(&'a mut dyn List),
    Map(&'a mut dyn Map),
    Optional(&'a mut dyn Optional),
    Interface(&'a mut AnyValue),
    Struct(&'a mut dyn Struct),
    Opaque,
    Unsupported(UnsupportedKind),
}

/// Kinds the mapper deliberately does not descend into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedKind {
    Channel,
    Function,
    RawPointer,
}

/// Flat shape discriminant, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Complex32,
    Complex64,
    Char,
    String,
    Array,
    List,
    Map,
    Optional,
    Interface,
    Struct,
    Opaque,
    Channel,
    Function,
    RawPointer,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::I8 => "i8",
            Kind::I16 => "i16",
            Kind::I32 => "i32",
            Kind::I64 => "i64",
            Kind::I128 => "i128",
            Kind::Isize => "isize",
            Kind::U8 => "u8",
            Kind::U16 => "u16",
            Kind::U32 => "u32",
            Kind::U64 => "u64",
            Kind::U128 => "u128",
            Kind::Usize => "usize",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Complex32 => "complex32",
            Kind::Complex64 => "complex64",
            Kind::Char => "char",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Optional => "optional",
            Kind::Interface => "interface",
            Kind::Struct => "struct",
            Kind::Opaque => "opaque",
            Kind::Channel => "channel",
            Kind::Function => "function",
            Kind::RawPointer => "raw pointer",
        };
        f.write_str(name)
    }
}

impl From<UnsupportedKind> for Kind {
    fn from(kind: UnsupportedKind) -> Self {
        match kind {
            UnsupportedKind::Channel => Kind::Channel,
            UnsupportedKind::Function => Kind::Function,
            UnsupportedKind::RawPointer => Kind::RawPointer,
        }
    }
}

macro_rules! scalar_kinds {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        /// Scalar value, read side.
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub enum ScalarRef<'a> {
            $($variant($ty),)*
            String(&'a str),
        }

        /// Scalar value, write side.
        #[derive(Debug)]
        pub enum ScalarMut<'a> {
            $($variant(&'a mut $ty),)*
            String(&'a mut String),
        }

        impl ScalarRef<'_> {
            pub fn kind(&self) -> Kind {
                match self {
                    $(ScalarRef::$variant(_) => Kind::$variant,)*
                    ScalarRef::String(_) => Kind::String,
                }
            }
        }

        impl ScalarMut<'_> {
            pub fn kind(&self) -> Kind {
                match self {
                    $(ScalarMut::$variant(_) => Kind::$variant,)*
                    ScalarMut::String(_) => Kind::String,
                }
            }

            /// Copy `src` in if it is exactly the same scalar kind.
            pub fn assign(self, src: ScalarRef<'_>) -> bool {
                match (self, src) {
                    $((ScalarMut::$variant(dst), ScalarRef::$variant(v)) => *dst = v,)*
                    (ScalarMut::String(dst), ScalarRef::String(v)) => {
                        dst.clear();
                        dst.push_str(v);
                    }
                    _ => return false,
                }
                true
            }
        }
    };
}

scalar_kinds! {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Usize(usize),
    F32(f32),
    F64(f64),
    Complex32(Complex<f32>),
    Complex64(Complex<f64>),
    Char(char),
}

impl ReflectRef<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectRef::Scalar(scalar) => scalar.kind(),
            ReflectRef::Array(_) => Kind::Array,
            ReflectRef::List(_) => Kind::List,
            ReflectRef::Map(_) => Kind::Map,
            ReflectRef::Optional(_) => Kind::Optional,
            ReflectRef::Interface(_) => Kind::Interface,
            ReflectRef::Struct(_) => Kind::Struct,
            ReflectRef::Opaque => Kind::Opaque,
            ReflectRef::Unsupported(kind) => (*kind).into(),
        }
    }
}

impl ReflectMut<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ReflectMut::Scalar(scalar) => scalar.kind(),
            ReflectMut::Array(_) => Kind::Array,
            ReflectMut::List(_) => Kind::List,
            ReflectMut::Map(_) => Kind::Map,
            ReflectMut::Optional(_) => Kind::Optional,
            ReflectMut::Interface(_) => Kind::Interface,
            ReflectMut::Struct(_) => Kind::Struct,
            ReflectMut::Opaque => Kind::Opaque,
            ReflectMut::Unsupported(kind) => (*kind).into(),
        }
    }
}

/// Fixed-size sequence.
pub trait Array {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Option<&dyn Reflect>;
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Growable sequence.
pub trait List: Array {
    fn as_array(&self) -> &dyn Array;
    /// Fresh zero value of the element type.
    fn new_element(&self) -> Box<dyn Reflect>;
    fn push(&mut self, element: Box<dyn Reflect>) -> Result<(), MapError>;
    fn clear(&mut self);
}

/// Associative mapping.
pub trait Map {
    fn len(&self) -> usize;
    fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_>;
    fn new_key(&self) -> Box<dyn Reflect>;
    fn new_value(&self) -> Box<dyn Reflect>;
    fn insert_boxed(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>)
    -> Result<(), MapError>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pointer-like indirection: `Option<T>`, `Box<T>`.
pub trait Optional {
    fn get(&self) -> Option<&dyn Reflect>;
    /// Allocate the pointee if absent and return it.
    fn get_or_insert_default(&mut self) -> &mut dyn Reflect;
}

/// Record with named fields, plus the accessor and mutator methods
/// registered on it.
pub trait Struct {
    /// Field names in declaration order.
    fn field_names(&self) -> &'static [&'static str];
    fn field(&self, name: &str) -> Option<&dyn Reflect>;
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Reflect>;

    /// Invoke the zero-argument accessor `method`, if registered.
    fn accessor(&self, method: &str) -> Option<Box<dyn Reflect>>;

    /// Registered single-argument mutators, in declaration order.
    fn mutator_names(&self) -> &'static [&'static str];
    /// Fresh zero value of the parameter type of `method`.
    fn mutator_param(&self, method: &str) -> Option<Box<dyn Reflect>>;
    fn call_mutator(&mut self, method: &str, value: Box<dyn Reflect>) -> Result<(), MapError>;
}

/// Invoke a zero-argument accessor and box its result.
pub fn call_accessor<S, T, F>(target: &S, accessor: F) -> Box<dyn Reflect>
where
    S: ?Sized,
    T: Reflect,
    F: Fn(&S) -> T,
{
    Box::new(accessor(target))
}

/// Zero value of a mutator's parameter type.
pub fn mutator_param<S, T, F>(_mutator: F) -> Box<dyn Reflect>
where
    S: ?Sized,
    T: Reflect + Default,
    F: Fn(&mut S, T),
{
    Box::new(T::default())
}

/// Invoke a single-argument mutator with a boxed argument.
pub fn call_mutator<S, T, F>(target: &mut S, mutator: F, value: Box<dyn Reflect>) -> Result<(), MapError>
where
    S: ?Sized,
    T: Reflect,
    F: Fn(&mut S, T),
{
    let value = downcast::<T>(value)?;
    mutator(target, *value);
    Ok(())
}

/// Shared method bodies for `Reflect` impls of `Clone + Default` types.
///
/// Expanded inside an `impl Reflect` block; `reflect_ref`/`reflect_mut`
/// are left to the caller.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_value {
    () => {
        fn type_name(&self) -> &'static str {
            ::core::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn ::core::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
            self
        }

        fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
            self
        }

        fn as_reflect(&self) -> &dyn $crate::Reflect {
            self
        }

        fn as_reflect_mut(&mut self) -> &mut dyn $crate::Reflect {
            self
        }

        fn clone_value(&self) -> ::std::boxed::Box<dyn $crate::Reflect> {
            ::std::boxed::Box::new(::core::clone::Clone::clone(self))
        }

        fn default_value(&self) -> ::core::option::Option<::std::boxed::Box<dyn $crate::Reflect>> {
            ::core::option::Option::Some(::std::boxed::Box::new(
                <Self as ::core::default::Default>::default(),
            ))
        }

        fn try_assign(&mut self, value: &dyn $crate::Reflect) -> bool {
            match value.as_any().downcast_ref::<Self>() {
                ::core::option::Option::Some(value) => {
                    ::core::clone::Clone::clone_from(self, value);
                    true
                }
                ::core::option::Option::None => false,
            }
        }

        fn set(
            &mut self,
            value: ::std::boxed::Box<dyn $crate::Reflect>,
        ) -> ::core::result::Result<(), $crate::MapError> {
            *self = *$crate::reflect::downcast::<Self>(value)?;
            ::core::result::Result::Ok(())
        }

        fn reset(&mut self) {
            *self = <Self as ::core::default::Default>::default();
        }
    };
}
