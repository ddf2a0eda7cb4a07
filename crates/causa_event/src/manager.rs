//! Dispatch boundary and the process-wide event manager.

use crate::error::{DispatchError, DispatchResult};
use crate::event::Event;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Delivers posted events to whoever is interested.
///
/// How and when delivery happens is up to the implementation.
pub trait EventManager: Send + Sync {
    /// Post an event
    fn post(&self, event: &dyn Event);
}

/// Manager used until one is installed; drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventManager;

impl EventManager for NoopEventManager {
    fn post(&self, event: &dyn Event) {
        tracing::trace!(event = event.event_name(), "no event manager installed, dropping event");
    }
}

static EVENT_MANAGER: OnceCell<Arc<dyn EventManager>> = OnceCell::new();

/// Install the process-wide event manager used by [`Event::post`]
///
/// # Errors
///
/// Returns [`DispatchError::AlreadyInstalled`] if one is already installed
pub fn install_event_manager(manager: Arc<dyn EventManager>) -> DispatchResult<()> {
    EVENT_MANAGER
        .set(manager)
        .map_err(|_| DispatchError::AlreadyInstalled)?;
    tracing::info!("event manager installed");
    Ok(())
}

/// The installed event manager, or a [`NoopEventManager`]
#[must_use]
pub fn event_manager() -> Arc<dyn EventManager> {
    match EVENT_MANAGER.get() {
        Some(manager) => Arc::clone(manager),
        None => Arc::new(NoopEventManager),
    }
}

/// Check whether [`install_event_manager`] has succeeded
#[must_use]
pub fn has_event_manager() -> bool {
    EVENT_MANAGER.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::{CausalChain, Element};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Ignite {
        cause: CausalChain,
    }

    impl Event for Ignite {
        fn cause(&self) -> &CausalChain {
            &self.cause
        }
    }

    #[derive(Default)]
    struct Counter {
        posted: AtomicUsize,
    }

    impl EventManager for Counter {
        fn post(&self, _event: &dyn Event) {
            self.posted.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_manager_accepts_events() {
        let event = Ignite {
            cause: CausalChain::of(Element::new("flint")),
        }
        .post_to(&NoopEventManager);
        assert_eq!(event.cause().len(), 1);
    }

    // The only test that touches the global manager.
    #[test]
    fn test_install_and_post() {
        let counter = Arc::new(Counter::default());
        install_event_manager(counter.clone()).unwrap();
        assert!(has_event_manager());

        let err = install_event_manager(Arc::new(NoopEventManager)).unwrap_err();
        assert_eq!(err, DispatchError::AlreadyInstalled);

        let event = Ignite {
            cause: CausalChain::of(Element::new("flint")),
        }
        .post()
        .post();
        assert_eq!(counter.posted.load(Ordering::SeqCst), 2);
        assert!(event.cause().contains_value(&"flint"));
    }
}
