use std::fmt;
use std::sync::Arc;

use crate::reflect::{Reflect, type_id_of};

/// Complex number scalar.
///
/// Two widths are mapped as scalars: `Complex<f32>` and `Complex<f64>`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl<T> Complex<T> {
    pub const fn new(re: T, im: T) -> Self {
        Self { re, im }
    }
}

/// Polymorphic container holding a value of any reflected type, or nothing.
///
/// A payload is held either by value (`new`, `from_boxed`, or a value the
/// mapper synthesized) or by reference (`new_mut`). Strategy by state:
/// - Empty: mapping synthesizes a value of the source's concrete type.
/// - Held by value: not addressable, mapping into it fails with
///   `NotAddressable`.
/// - Held by reference and uniquely owned: mapping writes into it in place.
/// - Shared payload (the container was cloned): read-only, mapping into it
///   fails with `NotAddressable`.
///
/// `Reflect` requires `Send + Sync`, so containers and the structs holding
/// them can cross threads.
#[derive(Clone, Default)]
pub struct AnyValue {
    value: Option<Arc<dyn Reflect>>,
    by_ref: bool,
}

impl AnyValue {
    /// Hold `value` by value.
    pub fn new<T: Reflect>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
            by_ref: false,
        }
    }

    /// Hold `value` by reference: mapping may write into it in place.
    pub fn new_mut<T: Reflect>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
            by_ref: true,
        }
    }

    pub fn from_boxed(value: Box<dyn Reflect>) -> Self {
        Self {
            value: Some(Arc::from(value)),
            by_ref: false,
        }
    }

    /// Wrap an already shared payload. Mapping cannot write into it.
    pub fn from_shared(value: Arc<dyn Reflect>) -> Self {
        Self {
            value: Some(value),
            by_ref: false,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// `true` when the payload is reachable through another handle.
    pub fn is_shared(&self) -> bool {
        match &self.value {
            Some(value) => Arc::strong_count(value) > 1 || Arc::weak_count(value) > 0,
            None => false,
        }
    }

    /// `true` when the payload is held by reference and not shared.
    pub fn is_addressable(&self) -> bool {
        self.by_ref && !self.is_empty() && !self.is_shared()
    }

    pub fn get(&self) -> Option<&dyn Reflect> {
        self.value.as_deref()
    }

    /// Mutable access to the payload; `None` unless it is addressable.
    pub fn get_mut(&mut self) -> Option<&mut dyn Reflect> {
        if !self.by_ref {
            return None;
        }
        let value = Arc::get_mut(self.value.as_mut()?)?;
        Some(value as &mut dyn Reflect)
    }

    /// Store `value` by value, replacing any previous payload.
    pub fn set_boxed(&mut self, value: Box<dyn Reflect>) {
        self.value = Some(Arc::from(value));
        self.by_ref = false;
    }

    pub fn take(&mut self) -> Option<Arc<dyn Reflect>> {
        self.by_ref = false;
        self.value.take()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.get().and_then(|value| value.as_any().downcast_ref::<T>())
    }

    pub fn is<T: Reflect>(&self) -> bool {
        self.get()
            .is_some_and(|value| type_id_of(value) == std::any::TypeId::of::<T>())
    }

    pub fn type_name(&self) -> Option<&'static str> {
        self.get().map(|value| value.type_name())
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name() {
            Some(name) if self.by_ref => write!(f, "AnyValue(&{name})"),
            Some(name) => write!(f, "AnyValue({name})"),
            None => write!(f, "AnyValue(<empty>)"),
        }
    }
}
