//! Type-erased chain elements.
//!
//! A chain holds arbitrary values side by side, so each member is stored as
//! an [`Element`]: a shared handle that remembers the concrete type for
//! runtime type queries and still supports value equality, hashing and
//! display.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Object-safe view over any value that can sit in a causal chain.
///
/// Implemented automatically for every `'static` type that is
/// `Debug + Display + PartialEq + Hash + Send + Sync`.
pub trait CauseElement: Any + fmt::Debug + fmt::Display + Send + Sync {
    /// Borrow as `Any` for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle into a shared `Any` handle
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// Value equality against another erased element
    fn dyn_eq(&self, other: &dyn CauseElement) -> bool;

    /// Feed the concrete type and value into `state`
    fn dyn_hash(&self, state: &mut dyn Hasher);

    /// Name of the concrete type
    fn type_name(&self) -> &'static str;
}

impl<T> CauseElement for T
where
    T: Any + fmt::Debug + fmt::Display + PartialEq + Hash + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn dyn_eq(&self, other: &dyn CauseElement) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A single member of a causal chain.
///
/// Cloning an `Element` clones the handle, not the value, so clones stay
/// *identical* (see [`Element::ptr_eq`]). Equality (`==`) compares values.
#[derive(Clone)]
pub struct Element {
    inner: Arc<dyn CauseElement>,
}

impl Element {
    /// Wrap a value in a fresh allocation.
    ///
    /// Passing an `Element` returns that same handle. A value that is
    /// already shared as `Arc<T>` must go through [`Element::from_arc`] (or
    /// `From`); `new` would store the `Arc` itself, so typed queries for
    /// `T` would not match it.
    #[must_use]
    pub fn new<T: CauseElement>(value: T) -> Self {
        if let Some(element) = (&value as &dyn Any).downcast_ref::<Element>() {
            return element.clone();
        }
        Self {
            inner: Arc::new(value),
        }
    }

    /// Adopt an existing shared value, keeping its identity
    #[must_use]
    pub fn from_arc<T: CauseElement>(value: Arc<T>) -> Self {
        Self { inner: value }
    }

    /// Identity comparison: both handles point at the same allocation
    #[must_use]
    pub fn ptr_eq(&self, other: &Element) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }

    /// Check whether the value is a `T`
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.as_ref().as_any().is::<T>()
    }

    /// Borrow the value as a `T`, if it is one
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_ref().as_any().downcast_ref::<T>()
    }

    /// Get a shared handle to the value as a `T`, if it is one
    #[must_use]
    pub fn downcast_arc<T: CauseElement>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).into_any_arc().downcast::<T>().ok()
    }

    /// Name of the concrete type
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.as_ref().type_name()
    }
}

impl<T: CauseElement> From<Arc<T>> for Element {
    fn from(value: Arc<T>) -> Self {
        Self::from_arc(value)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner.as_ref().dyn_eq(other.inner.as_ref())
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.as_ref().dyn_hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.inner.as_ref(), f)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner.as_ref(), f)
    }
}
