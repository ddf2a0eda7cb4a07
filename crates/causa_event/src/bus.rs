//! In-process event bus.
//!
//! Subscribers register for a concrete event type and are called
//! synchronously, in registration order, on the posting thread.

use crate::config::BusConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::event::Event;
use crate::manager::EventManager;
use indexmap::IndexMap;
use serde::Serialize;
use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type Handler = Arc<dyn Fn(&dyn Event) -> Result<(), String> + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw value
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Clone)]
struct Subscription {
    id: SubscriptionId,
    name: String,
    handler: Handler,
}

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    /// Events dispatched
    pub posted: u64,
    /// Successful subscriber calls
    pub delivered: u64,
    /// Failed subscriber calls
    pub failed: u64,
}

/// Synchronous, type-keyed [`EventManager`]
pub struct EventBus {
    config: BusConfig,
    subscribers: RwLock<IndexMap<TypeId, Vec<Subscription>>>,
    next_id: AtomicU64,
    posted: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl EventBus {
    /// Create a bus with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus with `config`
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            config,
            subscribers: RwLock::new(IndexMap::new()),
            next_id: AtomicU64::new(1),
            posted: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Register `handler` for events of type `E`.
    ///
    /// A handler returning `Err` marks the delivery as failed; see
    /// [`BusConfig::fail_fast`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::TooManySubscribers`] when the configured
    /// limit for `E` is reached
    pub fn subscribe<E, F>(&self, name: impl Into<String>, handler: F) -> DispatchResult<SubscriptionId>
    where
        E: Event,
        F: Fn(&E) -> Result<(), String> + Send + Sync + 'static,
    {
        let name = name.into();
        let event = std::any::type_name::<E>();
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let entry = subscribers.entry(TypeId::of::<E>()).or_default();
        let limit = self.config.max_subscribers_per_event;
        if entry.len() >= limit {
            return Err(DispatchError::TooManySubscribers { event, limit });
        }

        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handler: Handler = Arc::new(move |event: &dyn Event| {
            match event.as_any().downcast_ref::<E>() {
                Some(event) => handler(event),
                None => Ok(()),
            }
        });
        tracing::debug!(subscriber = %name, event, id = id.0, "subscribed");
        entry.push(Subscription { id, name, handler });
        Ok(id)
    }

    /// Remove a subscription; returns whether it existed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for list in subscribers.values_mut() {
            if let Some(index) = list.iter().position(|s| s.id == id) {
                let removed = list.remove(index);
                tracing::debug!(subscriber = %removed.name, id = id.0, "unsubscribed");
                return true;
            }
        }
        false
    }

    /// Number of subscribers for events of type `E`
    #[must_use]
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Snapshot of the delivery counters
    #[must_use]
    pub fn stats(&self) -> BusStats {
        BusStats {
            posted: self.posted.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Deliver `event` to its subscribers.
    ///
    /// Returns the number of subscribers that accepted it. Handlers run
    /// without the registry lock held, so they may subscribe or post.
    ///
    /// # Errors
    ///
    /// With [`BusConfig::fail_fast`], returns [`DispatchError::Subscriber`]
    /// for the first failing subscriber; later subscribers are skipped.
    pub fn dispatch(&self, event: &dyn Event) -> DispatchResult<usize> {
        let type_id = event.as_any().type_id();
        let targets: Vec<Subscription> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned()
            .unwrap_or_default();

        self.posted.fetch_add(1, Ordering::Relaxed);
        if self.config.log_chains {
            tracing::debug!(
                event = event.event_name(),
                cause = %event.cause(),
                subscribers = targets.len(),
                "dispatching event"
            );
        } else {
            tracing::debug!(
                event = event.event_name(),
                subscribers = targets.len(),
                "dispatching event"
            );
        }

        let mut accepted = 0;
        for subscription in &targets {
            match (subscription.handler)(event) {
                Ok(()) => {
                    accepted += 1;
                    self.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(message) => {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        event = event.event_name(),
                        subscriber = %subscription.name,
                        error = %message,
                        "subscriber failed"
                    );
                    if self.config.fail_fast {
                        return Err(DispatchError::Subscriber {
                            event: event.event_name(),
                            subscriber: subscription.name.clone(),
                            message,
                        });
                    }
                }
            }
        }
        Ok(accepted)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventManager for EventBus {
    fn post(&self, event: &dyn Event) {
        if let Err(err) = self.dispatch(event) {
            tracing::warn!(error = %err, "event delivery stopped");
        }
    }
}
