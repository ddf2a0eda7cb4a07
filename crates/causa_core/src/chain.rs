//! Immutable causal chains.
//!
//! A chain lists the objects that led to an occurrence, from the root cause
//! to the most direct one. Once built it never changes.

use crate::builder::ChainBuilder;
use crate::element::Element;
use crate::error::{CauseError, CauseResult};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An ordered, never-empty, immutable sequence of causes
#[derive(Clone)]
pub struct CausalChain {
    elements: Arc<Vec<Element>>,
}

impl CausalChain {
    /// Create a new builder
    #[must_use]
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub(crate) fn from_shared(elements: Arc<Vec<Element>>) -> Self {
        debug_assert!(!elements.is_empty(), "cause chains are never empty");
        Self { elements }
    }

    pub(crate) fn shared(&self) -> Arc<Vec<Element>> {
        Arc::clone(&self.elements)
    }

    /// Chain with a single cause
    #[must_use]
    pub fn of(element: Element) -> Self {
        Self::from_shared(Arc::new(vec![element]))
    }

    /// Chain with a single cause from an optional source
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::NullArgument`] if `element` is `None`
    pub fn try_of(element: Option<Element>) -> CauseResult<Self> {
        element.map(Self::of).ok_or(CauseError::null("cause"))
    }

    /// Chain of `element` followed by `rest`, exactly as given.
    ///
    /// Unlike [`CausalChain::of_iter`], adjacent identical elements are kept.
    #[must_use]
    pub fn of_many<I>(element: Element, rest: I) -> Self
    where
        I: IntoIterator<Item = Element>,
    {
        let rest = rest.into_iter();
        let mut elements = Vec::with_capacity(rest.size_hint().0 + 1);
        elements.push(element);
        elements.extend(rest);
        Self::from_shared(Arc::new(elements))
    }

    /// Copy of an existing chain, duplicates preserved
    #[must_use]
    pub fn of_chain(chain: &CausalChain) -> Self {
        Self::from_shared(chain.shared())
    }

    /// Chain over an existing vector, duplicates preserved
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::InvalidState`] if `elements` is empty
    pub fn of_vec(elements: Vec<Element>) -> CauseResult<Self> {
        if elements.is_empty() {
            return Err(CauseError::empty_chain());
        }
        Ok(Self::from_shared(Arc::new(elements)))
    }

    /// Chain over an arbitrary sequence.
    ///
    /// Each element goes through [`ChainBuilder::append`], so an element
    /// identical to the one before it is dropped. Use
    /// [`CausalChain::of_vec`] to keep such repeats.
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::InvalidState`] if the sequence is empty
    pub fn of_iter<I>(elements: I) -> CauseResult<Self>
    where
        I: IntoIterator<Item = Element>,
    {
        let mut builder = ChainBuilder::new();
        for element in elements {
            builder.append(element);
        }
        builder.build()
    }

    /// Like [`CausalChain::of_iter`] over optional slots
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::NullArgument`] at the first `None`, or
    /// [`CauseError::InvalidState`] if the sequence is empty
    pub fn try_of_iter<I>(elements: I) -> CauseResult<Self>
    where
        I: IntoIterator<Item = Option<Element>>,
    {
        let mut builder = ChainBuilder::new();
        for element in elements {
            builder.try_append(element)?;
        }
        builder.build()
    }

    /// The root cause, at position 0
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.elements[0]
    }

    /// Every cause, in order
    #[must_use]
    pub fn all(&self) -> &[Element] {
        &self.elements
    }

    /// Iterate causes from root to effect
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.elements.iter()
    }

    /// Number of causes, at least one
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    // ---- predicate queries ----

    /// Position of the first cause matching `predicate`
    pub fn position_where(&self, predicate: impl Fn(&Element) -> bool) -> Option<usize> {
        self.elements.iter().position(predicate)
    }

    /// First cause matching `predicate`
    pub fn first_where(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        self.elements.iter().find(|element| predicate(*element))
    }

    /// Last cause matching `predicate`
    pub fn last_where(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        self.elements.iter().rev().find(|element| predicate(*element))
    }

    /// Cause right before the first one matching `predicate`.
    ///
    /// Only the first match is considered; `None` if it is the root.
    pub fn before_where(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        if self.len() == 1 {
            return None;
        }
        let position = self.position_where(predicate)?;
        position.checked_sub(1).map(|index| &self.elements[index])
    }

    /// Cause right after the first one matching `predicate`.
    ///
    /// Only the first match is considered; `None` if it is the last cause.
    pub fn after_where(&self, predicate: impl Fn(&Element) -> bool) -> Option<&Element> {
        if self.len() == 1 {
            return None;
        }
        let position = self.position_where(predicate)?;
        self.elements.get(position + 1)
    }

    /// Check if any cause matches `predicate`
    pub fn any_where(&self, predicate: impl Fn(&Element) -> bool) -> bool {
        self.elements.iter().any(predicate)
    }

    /// All causes matching `predicate`, in order
    pub fn filter(&self, predicate: impl Fn(&Element) -> bool) -> Vec<&Element> {
        self.elements.iter().filter(|element| predicate(*element)).collect()
    }

    /// All causes not matching `predicate`, in order
    pub fn reject(&self, predicate: impl Fn(&Element) -> bool) -> Vec<&Element> {
        self.elements.iter().filter(|element| !predicate(*element)).collect()
    }

    // ---- typed queries ----

    /// First cause of type `T`
    #[must_use]
    pub fn first<T: Any>(&self) -> Option<&T> {
        self.elements.iter().find_map(Element::downcast_ref::<T>)
    }

    /// Last cause of type `T`
    #[must_use]
    pub fn last<T: Any>(&self) -> Option<&T> {
        self.elements.iter().rev().find_map(Element::downcast_ref::<T>)
    }

    /// Cause right before the first cause of type `T`
    #[must_use]
    pub fn before<T: Any>(&self) -> Option<&Element> {
        self.before_where(Element::is::<T>)
    }

    /// Cause right after the first cause of type `T`
    #[must_use]
    pub fn after<T: Any>(&self) -> Option<&Element> {
        self.after_where(Element::is::<T>)
    }

    /// Check if any cause is a `T`
    #[must_use]
    pub fn contains_type<T: Any>(&self) -> bool {
        self.any_where(Element::is::<T>)
    }

    /// All causes of type `T`, in order
    #[must_use]
    pub fn all_of<T: Any>(&self) -> Vec<&T> {
        self.elements
            .iter()
            .filter_map(Element::downcast_ref::<T>)
            .collect()
    }

    /// All causes that are not a `T`, in order
    #[must_use]
    pub fn none_of<T: Any>(&self) -> Vec<&Element> {
        self.reject(Element::is::<T>)
    }

    /// Check if any cause equals `element` by value
    #[must_use]
    pub fn contains(&self, element: &Element) -> bool {
        self.elements.contains(element)
    }

    /// Check if any cause is a `T` equal to `value`
    #[must_use]
    pub fn contains_value<T: Any + PartialEq>(&self, value: &T) -> bool {
        self.elements
            .iter()
            .filter_map(Element::downcast_ref::<T>)
            .any(|candidate| candidate == value)
    }

    // ---- derived chains ----

    fn extended(&self, extend: impl FnOnce(&mut Vec<Element>)) -> Self {
        let mut elements = self.shared();
        extend(Arc::make_mut(&mut elements));
        Self::from_shared(elements)
    }

    /// New chain with `element` appended.
    ///
    /// Follows [`ChainBuilder::append`]: if `element` is identical to the
    /// last cause the result equals `self`.
    #[must_use]
    pub fn with(&self, element: Element) -> Self {
        if self.elements.last().is_some_and(|last| last.ptr_eq(&element)) {
            return self.clone();
        }
        self.extended(|elements| elements.push(element))
    }

    /// [`CausalChain::with`] for an optional source
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::NullArgument`] if `element` is `None`
    pub fn try_with(&self, element: Option<Element>) -> CauseResult<Self> {
        element
            .map(|element| self.with(element))
            .ok_or(CauseError::null("additional cause"))
    }

    /// New chain with `element` and `rest` appended exactly as given
    #[must_use]
    pub fn with_many<I>(&self, element: Element, rest: I) -> Self
    where
        I: IntoIterator<Item = Element>,
    {
        self.extended(|elements| {
            elements.push(element);
            elements.extend(rest);
        })
    }

    /// New chain with each element appended through [`ChainBuilder::append`]
    #[must_use]
    pub fn with_iter<I>(&self, additional: I) -> Self
    where
        I: IntoIterator<Item = Element>,
    {
        self.extended(|elements| {
            for element in additional {
                if !elements.last().is_some_and(|last| last.ptr_eq(&element)) {
                    elements.push(element);
                }
            }
        })
    }

    /// New chain with all of `other` appended, duplicates preserved
    #[must_use]
    pub fn merge(&self, other: &CausalChain) -> Self {
        self.extended(|elements| elements.extend(other.iter().cloned()))
    }
}

impl PartialEq for CausalChain {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.elements, &other.elements) || self.elements == other.elements
    }
}

impl Eq for CausalChain {}

impl Hash for CausalChain {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.elements.hash(state);
    }
}

impl fmt::Display for CausalChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cause[Stack={{")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", element)?;
        }
        write!(f, "}}]")
    }
}

impl fmt::Debug for CausalChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a CausalChain {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl TryFrom<Vec<Element>> for CausalChain {
    type Error = CauseError;

    fn try_from(elements: Vec<Element>) -> CauseResult<Self> {
        Self::of_vec(elements)
    }
}
