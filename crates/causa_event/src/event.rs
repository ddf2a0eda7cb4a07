//! Occurrences that carry a causal chain.

use crate::manager::{EventManager, event_manager};
use causa_core::CausalChain;
use std::any::Any;

/// Upcast helper so subscribers can recover the concrete event type
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A notable happening that knows what caused it.
///
/// Implementors only supply [`Event::cause`]; posting is provided.
pub trait Event: AsAny + Send + Sync {
    /// The causal chain of this event, root first
    fn cause(&self) -> &CausalChain;

    /// Name used in logs and errors
    fn event_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Hand this event to the global event manager and return it
    fn post(self) -> Self
    where
        Self: Sized,
    {
        event_manager().post(&self);
        self
    }

    /// Hand this event to `manager` and return it
    fn post_to(self, manager: &dyn EventManager) -> Self
    where
        Self: Sized,
    {
        manager.post(&self);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use causa_core::Element;
    use std::sync::Mutex;

    struct BlockBreak {
        cause: CausalChain,
    }

    impl Event for BlockBreak {
        fn cause(&self) -> &CausalChain {
            &self.cause
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl EventManager for Recorder {
        fn post(&self, event: &dyn Event) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{} {}", event.event_name(), event.cause()));
        }
    }

    #[test]
    fn test_post_to_returns_event() {
        let recorder = Recorder::default();
        let root = Element::new("player");
        let event = BlockBreak {
            cause: CausalChain::of(root.clone()),
        }
        .post_to(&recorder);

        assert!(event.cause().root().ptr_eq(&root));
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].ends_with("BlockBreak Cause[Stack={player}]"));
    }

    #[test]
    fn test_as_any_recovers_type() {
        let event = BlockBreak {
            cause: CausalChain::of(Element::new(1u8)),
        };
        let erased: &dyn Event = &event;
        assert!(erased.as_any().downcast_ref::<BlockBreak>().is_some());
        assert!(erased.event_name().ends_with("BlockBreak"));
    }
}
