//! `Reflect` impls for std and library types.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::mpsc::{Sender, SyncSender};

use crate::__reflect_value;
use crate::error::MapError;
use crate::reflect::{
    Array, List, Map, Optional, Reflect, ReflectMut, ReflectRef, ScalarMut, ScalarRef,
    UnsupportedKind, downcast,
};
use crate::value::{AnyValue, Complex};

// ═══════════════════════════════════════════════════════════════
//  Scalars
// ═══════════════════════════════════════════════════════════════

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                __reflect_value!();

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Scalar(ScalarRef::$variant(*self))
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Scalar(ScalarMut::$variant(self))
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    i128 => I128,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    u128 => U128,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Complex<f32> => Complex32,
    Complex<f64> => Complex64,
    char => Char,
}

impl Reflect for String {
    __reflect_value!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Scalar(ScalarRef::String(self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Scalar(ScalarMut::String(self))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Opaque: copied only between identical types
// ═══════════════════════════════════════════════════════════════

macro_rules! impl_opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                __reflect_value!();

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Opaque
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Opaque
                }
            }
        )*
    };
}

impl_opaque! {
    (),
    std::time::Duration,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::NaiveTime,
}

// ═══════════════════════════════════════════════════════════════
//  Unsupported kinds
// ═══════════════════════════════════════════════════════════════

macro_rules! impl_unsupported {
    ($kind:ident; $([$($generics:tt)*] $ty:ty),* $(,)?) => {
        $(
            impl<$($generics)*> Reflect for $ty {
                fn type_name(&self) -> &'static str {
                    std::any::type_name::<Self>()
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn Any {
                    self
                }

                fn into_any(self: Box<Self>) -> Box<dyn Any> {
                    self
                }

                fn as_reflect(&self) -> &dyn Reflect {
                    self
                }

                fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
                    self
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Unsupported(UnsupportedKind::$kind)
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Unsupported(UnsupportedKind::$kind)
                }

                fn clone_value(&self) -> Box<dyn Reflect> {
                    Box::new(self.clone())
                }

                fn default_value(&self) -> Option<Box<dyn Reflect>> {
                    None
                }

                fn try_assign(&mut self, value: &dyn Reflect) -> bool {
                    match value.as_any().downcast_ref::<Self>() {
                        Some(value) => {
                            self.clone_from(value);
                            true
                        }
                        None => false,
                    }
                }

                fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), MapError> {
                    *self = *downcast::<Self>(value)?;
                    Ok(())
                }

                fn reset(&mut self) {}
            }
        )*
    };
}

impl_unsupported! {
    Channel;
    [T: Send + 'static] Sender<T>,
    [T: Send + 'static] SyncSender<T>,
}

impl_unsupported! {
    Function;
    [R: 'static] fn() -> R,
    [A: 'static, R: 'static] fn(A) -> R,
}

// Raw addresses are held as `AtomicPtr`, the thread-safe pointer cell.
impl<T: 'static> Reflect for AtomicPtr<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn as_reflect(&self) -> &dyn Reflect {
        self
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Unsupported(UnsupportedKind::RawPointer)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Unsupported(UnsupportedKind::RawPointer)
    }

    fn clone_value(&self) -> Box<dyn Reflect> {
        Box::new(AtomicPtr::new(self.load(Ordering::Acquire)))
    }

    fn default_value(&self) -> Option<Box<dyn Reflect>> {
        None
    }

    fn try_assign(&mut self, value: &dyn Reflect) -> bool {
        match value.as_any().downcast_ref::<Self>() {
            Some(value) => {
                *self.get_mut() = value.load(Ordering::Acquire);
                true
            }
            None => false,
        }
    }

    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), MapError> {
        *self = *downcast::<Self>(value)?;
        Ok(())
    }

    fn reset(&mut self) {}
}

// ═══════════════════════════════════════════════════════════════
//  Sequences
// ═══════════════════════════════════════════════════════════════

impl<T: Reflect + Clone + Default> Array for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }
}

impl<T: Reflect + Clone + Default> List for Vec<T> {
    fn as_array(&self) -> &dyn Array {
        self
    }

    fn new_element(&self) -> Box<dyn Reflect> {
        Box::new(T::default())
    }

    fn push(&mut self, element: Box<dyn Reflect>) -> Result<(), MapError> {
        Vec::push(self, *downcast::<T>(element)?);
        Ok(())
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<T: Reflect + Clone + Default> Reflect for Vec<T> {
    __reflect_value!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::List(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::List(self)
    }
}

impl<T: Reflect + Clone + Default, const N: usize> Array for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }
}

// `[T; N]: Default` only exists for N <= 32, so the shared bodies are not used.
impl<T: Reflect + Clone + Default, const N: usize> Reflect for [T; N] {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn as_reflect(&self) -> &dyn Reflect {
        self
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Array(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Array(self)
    }

    fn clone_value(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn default_value(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(std::array::from_fn::<T, N, _>(|_| T::default())))
    }

    fn try_assign(&mut self, value: &dyn Reflect) -> bool {
        match value.as_any().downcast_ref::<Self>() {
            Some(value) => {
                self.clone_from(value);
                true
            }
            None => false,
        }
    }

    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), MapError> {
        *self = *downcast::<Self>(value)?;
        Ok(())
    }

    fn reset(&mut self) {
        *self = std::array::from_fn(|_| T::default());
    }
}

// ═══════════════════════════════════════════════════════════════
//  Associative mappings
// ═══════════════════════════════════════════════════════════════

macro_rules! impl_map {
    ($map:ident, $($key_bound:tt)+) => {
        impl<K, V> Map for $map<K, V>
        where
            K: Reflect + Clone + Default + $($key_bound)+,
            V: Reflect + Clone + Default,
        {
            fn len(&self) -> usize {
                $map::len(self)
            }

            fn iter(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
                Box::new(
                    $map::iter(self).map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
                )
            }

            fn new_key(&self) -> Box<dyn Reflect> {
                Box::new(K::default())
            }

            fn new_value(&self) -> Box<dyn Reflect> {
                Box::new(V::default())
            }

            fn insert_boxed(
                &mut self,
                key: Box<dyn Reflect>,
                value: Box<dyn Reflect>,
            ) -> Result<(), MapError> {
                let key = downcast::<K>(key)?;
                let value = downcast::<V>(value)?;
                $map::insert(self, *key, *value);
                Ok(())
            }
        }

        impl<K, V> Reflect for $map<K, V>
        where
            K: Reflect + Clone + Default + $($key_bound)+,
            V: Reflect + Clone + Default,
        {
            __reflect_value!();

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Map(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Map(self)
            }
        }
    };
}

impl_map!(HashMap, Eq + Hash);
impl_map!(BTreeMap, Ord);

// ═══════════════════════════════════════════════════════════════
//  Indirection
// ═══════════════════════════════════════════════════════════════

impl<T: Reflect + Clone + Default> Optional for Option<T> {
    fn get(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn get_or_insert_default(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Reflect + Clone + Default> Reflect for Option<T> {
    __reflect_value!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Optional(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Optional(self)
    }
}

impl<T: Reflect + Clone + Default> Optional for Box<T> {
    fn get(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn get_or_insert_default(&mut self) -> &mut dyn Reflect {
        &mut **self
    }
}

impl<T: Reflect + Clone + Default> Reflect for Box<T> {
    __reflect_value!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Optional(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Optional(self)
    }
}

impl Reflect for AnyValue {
    __reflect_value!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Interface(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Interface(self)
    }
}
