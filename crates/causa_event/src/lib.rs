//! CAUSA Events
//!
//! Occurrences that carry a [`causa_core::CausalChain`], the
//! [`EventManager`] boundary they are posted through, and a small
//! synchronous [`EventBus`] implementing it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod manager;

pub use bus::{BusStats, EventBus, SubscriptionId};
pub use config::BusConfig;
pub use error::{DispatchError, DispatchResult};
pub use event::{AsAny, Event};
pub use manager::{
    EventManager, NoopEventManager, event_manager, has_event_manager, install_event_manager,
};
