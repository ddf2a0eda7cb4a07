//! Mutable accumulator for causal chains.

use crate::chain::CausalChain;
use crate::element::Element;
use crate::error::{CauseError, CauseResult};
use std::sync::Arc;

/// Builder that assembles a [`CausalChain`].
///
/// The pending buffer is allocated on first write and shared copy-on-write
/// with every chain produced by [`ChainBuilder::build`], so building is
/// cheap and later mutations never leak into earlier chains.
#[derive(Debug, Clone, Default)]
pub struct ChainBuilder {
    pending: Option<Arc<Vec<Element>>>,
}

impl ChainBuilder {
    /// Create an empty, unallocated builder
    #[must_use]
    pub fn new() -> Self {
        Self { pending: None }
    }

    fn pending_mut(&mut self) -> &mut Vec<Element> {
        Arc::make_mut(self.pending.get_or_insert_with(Default::default))
    }

    /// Append an element to the end of the chain.
    ///
    /// Appending the element that is already last (same allocation, see
    /// [`Element::ptr_eq`]) does nothing. Equal but distinct values are
    /// appended normally, as are non-adjacent repeats.
    pub fn append(&mut self, element: Element) -> &mut Self {
        if self.last().is_some_and(|last| last.ptr_eq(&element)) {
            tracing::trace!(element = %element, "skipped identical adjacent cause");
            return self;
        }
        self.pending_mut().push(element);
        self
    }

    /// Append an element coming from an optional source
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::NullArgument`] if `element` is `None`
    pub fn try_append(&mut self, element: Option<Element>) -> CauseResult<&mut Self> {
        let element = element.ok_or(CauseError::null("cause"))?;
        Ok(self.append(element))
    }

    /// Insert an element at `position`, shifting later elements right.
    ///
    /// No adjacency check is made.
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::IndexOutOfRange`] if `position > len`
    pub fn insert(&mut self, position: usize, element: Element) -> CauseResult<&mut Self> {
        let len = self.len();
        if position > len {
            return Err(CauseError::IndexOutOfRange {
                index: position,
                len,
            });
        }
        self.pending_mut().insert(position, element);
        Ok(self)
    }

    /// Insert an element coming from an optional source at `position`
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::NullArgument`] if `element` is `None`, or
    /// [`CauseError::IndexOutOfRange`] if `position > len`
    pub fn try_insert(
        &mut self,
        position: usize,
        element: Option<Element>,
    ) -> CauseResult<&mut Self> {
        let element = element.ok_or(CauseError::null("cause"))?;
        self.insert(position, element)
    }

    /// Append every element as given, duplicates included
    pub fn append_all<I>(&mut self, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = Element>,
    {
        self.pending_mut().extend(elements);
        self
    }

    /// Append all elements of `chain`, duplicates included.
    ///
    /// An unallocated builder adopts the chain's storage without copying.
    pub fn from(&mut self, chain: &CausalChain) -> &mut Self {
        match &mut self.pending {
            None => self.pending = Some(chain.shared()),
            Some(pending) => Arc::make_mut(pending).extend(chain.iter().cloned()),
        }
        self
    }

    /// Freeze the current contents into a new chain.
    ///
    /// The builder stays usable; later changes do not affect the result.
    ///
    /// # Errors
    ///
    /// Returns [`CauseError::InvalidState`] if nothing has been added
    pub fn build(&self) -> CauseResult<CausalChain> {
        match &self.pending {
            Some(pending) if !pending.is_empty() => {
                tracing::trace!(len = pending.len(), "built cause chain");
                Ok(CausalChain::from_shared(Arc::clone(pending)))
            }
            _ => Err(CauseError::empty_chain()),
        }
    }

    /// Discard everything and return to the unallocated state
    pub fn reset(&mut self) -> &mut Self {
        self.pending = None;
        self
    }

    /// Elements accumulated so far
    #[must_use]
    pub fn pending(&self) -> &[Element] {
        self.pending
            .as_deref()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Last element accumulated so far
    #[must_use]
    pub fn last(&self) -> Option<&Element> {
        self.pending().last()
    }

    /// Number of accumulated elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending().len()
    }

    /// Check if nothing has been accumulated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// Check whether the buffer has been allocated yet
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_new_unallocated() {
        let builder = ChainBuilder::new();
        assert!(!builder.is_allocated());
        assert!(builder.is_empty());
        assert!(builder.last().is_none());
    }

    #[test]
    fn test_build_empty_fails() {
        let err = ChainBuilder::new().build().unwrap_err();
        assert!(matches!(err, CauseError::InvalidState { .. }));

        let mut builder = ChainBuilder::new();
        builder.append_all(Vec::new());
        assert!(builder.is_allocated());
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_append_identical_adjacent_is_noop() {
        let x = Element::new("x");
        let chain = ChainBuilder::new()
            .append(x.clone())
            .append(x.clone())
            .build()
            .unwrap();
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_append_non_adjacent_repeat_kept() {
        let x = Element::new("x");
        let y = Element::new("y");
        let chain = ChainBuilder::new()
            .append(x.clone())
            .append(y)
            .append(x)
            .build()
            .unwrap();
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_append_equal_but_distinct_kept() {
        let chain = ChainBuilder::new()
            .append(Element::new("x"))
            .append(Element::new("x"))
            .build()
            .unwrap();
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_try_append_none() {
        let mut builder = ChainBuilder::new();
        let err = builder.try_append(None).unwrap_err();
        assert_eq!(err, CauseError::null("cause"));
        assert!(!builder.is_allocated());

        builder.try_append(Some(Element::new(1u8))).unwrap();
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_insert_positions() {
        let a = Element::new("a");
        let b = Element::new("b");
        let c = Element::new("c");

        let mut builder = ChainBuilder::new();
        builder.insert(0, b.clone()).unwrap();
        builder.insert(1, c.clone()).unwrap();
        builder.insert(0, a.clone()).unwrap();
        assert_eq!(builder.pending(), &[a, b, c]);
    }

    #[test]
    fn test_insert_skips_dedup() {
        let x = Element::new("x");
        let mut builder = ChainBuilder::new();
        builder.append(x.clone());
        builder.insert(1, x).unwrap();
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_insert_out_of_range() {
        let mut builder = ChainBuilder::new();
        let err = builder.insert(1, Element::new("a")).unwrap_err();
        assert_eq!(err, CauseError::IndexOutOfRange { index: 1, len: 0 });

        builder.append(Element::new("a"));
        assert!(builder.insert(1, Element::new("b")).is_ok());
        assert!(builder.insert(3, Element::new("c")).is_err());
    }

    #[test]
    fn test_try_insert() {
        let mut builder = ChainBuilder::new();
        let err = builder.try_insert(0, None).unwrap_err();
        assert_eq!(err, CauseError::null("cause"));
        assert!(!builder.is_allocated());

        let err = builder.try_insert(1, Some(Element::new("a"))).unwrap_err();
        assert_eq!(err, CauseError::IndexOutOfRange { index: 1, len: 0 });

        builder.try_insert(0, Some(Element::new("b"))).unwrap();
        builder.try_insert(0, Some(Element::new("a"))).unwrap();
        assert_eq!(builder.pending()[0].downcast_ref::<&str>(), Some(&"a"));
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_append_all_keeps_duplicates() {
        let x = Element::new("x");
        let chain = ChainBuilder::new()
            .append_all([x.clone(), x.clone(), x])
            .build()
            .unwrap();
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_from_seeds_and_extends() {
        let x = Element::new("x");
        let seed = CausalChain::of(x.clone());

        let chain = ChainBuilder::new()
            .from(&seed)
            .from(&seed)
            .build()
            .unwrap();
        assert_eq!(chain.len(), 2);
        assert!(chain.all()[0].ptr_eq(&chain.all()[1]));
    }

    #[test]
    fn test_from_does_not_touch_source() {
        let seed = CausalChain::of(Element::new("root"));
        let mut builder = ChainBuilder::new();
        builder.from(&seed).append(Element::new("leaf"));
        assert_eq!(seed.len(), 1);
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_build_snapshots_are_independent() {
        let mut builder = ChainBuilder::new();
        builder.append(Element::new("a"));
        let first = builder.build().unwrap();

        builder.append(Element::new("b"));
        let second = builder.build().unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(second.root(), first.root());
    }

    #[test]
    fn test_reset() {
        let mut builder = ChainBuilder::new();
        builder.append(Element::new("a"));
        let kept = builder.build().unwrap();

        builder.reset();
        assert!(!builder.is_allocated());
        assert!(builder.build().is_err());
        assert_eq!(kept.len(), 1);
    }
}
