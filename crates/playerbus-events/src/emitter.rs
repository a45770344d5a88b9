//! Synchronous topic emitter.
//!
//! Callbacks run on the thread that calls [`Emitter::emit`], in the order they
//! were registered. Every emission works from a snapshot of the topic's
//! subscribers taken before the first callback runs, so callbacks may call
//! `on`, `off` or `emit` on the same bus without affecting the emission in
//! progress. The registry lock is never held while user code runs.

use crate::registry::Registry;
use crate::subscription::{BusId, SubscriptionGuard, SubscriptionHandle, Unsubscribe};
use crate::topic::{self, Topic};
use playerbus_core::{
    BusConfig, CoreError, CoreResult, FailurePolicy, FailureReason, SubscriberFailure,
};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, trace, warn};

type Callback<T> = Arc<dyn Fn(&T) -> anyhow::Result<()> + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(&SubscriberFailure) + Send + Sync>;

/// Outcome of one `emit` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    /// Subscribers that completed without error.
    pub delivered: usize,
    /// Subscribers that failed and were isolated.
    pub failures: Vec<SubscriberFailure>,
}

impl Emission {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Subscribers that were invoked, successful or not.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failures.len()
    }
}

struct Shared<T> {
    id: BusId,
    config: BusConfig,
    registry: Mutex<Registry<Callback<T>>>,
    error_handler: Mutex<Option<ErrorHandler>>,
}

impl<T> Shared<T> {
    // Callbacks never run under this lock, so a poisoned guard still holds a
    // consistent registry.
    fn registry(&self) -> MutexGuard<'_, Registry<Callback<T>>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, handle: &SubscriptionHandle) -> bool {
        if handle.bus != self.id {
            return false;
        }
        let removed = self.registry().remove(handle.topic.as_str(), handle.sequence);
        if removed {
            debug!(bus = %self.id, topic = %handle.topic, sequence = handle.sequence, "subscription removed");
        }
        removed
    }
}

impl<T: 'static> Unsubscribe for Shared<T> {
    fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.remove(handle)
    }
}

/// In-process publish/subscribe bus carrying payloads of type `T`.
///
/// Each `Emitter` owns its own registry; two emitters never see each other's
/// subscriptions. Wrap it in an `Arc` to share it between producers,
/// consumers and threads.
pub struct Emitter<T> {
    shared: Arc<Shared<T>>,
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: BusId::next(),
                config,
                registry: Mutex::new(Registry::new()),
                error_handler: Mutex::new(None),
            }),
        }
    }

    pub fn id(&self) -> BusId {
        self.shared.id
    }

    pub fn config(&self) -> &BusConfig {
        &self.shared.config
    }

    /// Registers `callback` after every existing subscriber of `topic`.
    pub fn on<F>(&self, topic: &str, callback: F) -> CoreResult<SubscriptionHandle>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(
            topic,
            Arc::new(move |data: &T| -> anyhow::Result<()> {
                callback(data);
                Ok(())
            }),
        )
    }

    /// Like [`Emitter::on`] for callbacks that can fail. A returned error is
    /// handled exactly like a panic.
    pub fn try_on<F>(&self, topic: &str, callback: F) -> CoreResult<SubscriptionHandle>
    where
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(topic, Arc::new(callback))
    }

    /// Registers `callback` and ties the subscription to the returned guard.
    pub fn subscribe_scoped<F>(&self, topic: &str, callback: F) -> CoreResult<SubscriptionGuard>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let handle = self.on(topic, callback)?;
        let weak = Arc::downgrade(&self.shared);
        let bus: Weak<dyn Unsubscribe> = weak;
        Ok(SubscriptionGuard::new(handle, bus))
    }

    /// Removes the subscription behind `handle`.
    ///
    /// Returns `false` when there was nothing to remove: already removed,
    /// cleared, or issued by another bus. An emission already running keeps
    /// its snapshot and may still invoke the callback once.
    pub fn off(&self, handle: &SubscriptionHandle) -> bool {
        self.shared.remove(handle)
    }

    /// Synchronously delivers `data` to every subscriber of `topic`.
    ///
    /// With [`FailurePolicy::Isolate`] a failing subscriber is logged, passed
    /// to the error handler and recorded in the returned [`Emission`]; the
    /// rest still run. With [`FailurePolicy::Propagate`] the first failure
    /// ends the emission and is returned as [`CoreError::SubscriberFailure`].
    pub fn emit(&self, topic: &str, data: &T) -> CoreResult<Emission> {
        topic::validate(topic, self.shared.config.max_topic_len)?;
        let subscribers = self.shared.registry().snapshot(topic);
        trace!(bus = %self.shared.id, topic, subscribers = subscribers.len(), "emit");

        let mut emission = Emission::default();
        for (sequence, callback) in subscribers {
            let reason = match panic::catch_unwind(AssertUnwindSafe(|| callback(data))) {
                Ok(Ok(())) => {
                    emission.delivered += 1;
                    continue;
                }
                Ok(Err(err)) => FailureReason::Error(format!("{err:#}")),
                Err(payload) => FailureReason::from_panic(payload),
            };
            let failure = SubscriberFailure {
                topic: topic.to_string(),
                sequence,
                reason,
            };
            match self.shared.config.failure_policy {
                FailurePolicy::Propagate => return Err(CoreError::SubscriberFailure(failure)),
                FailurePolicy::Isolate => {
                    self.report(&failure);
                    emission.failures.push(failure);
                }
            }
        }
        Ok(emission)
    }

    /// Installs the side channel that receives isolated subscriber failures,
    /// replacing any previous handler.
    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&SubscriberFailure) + Send + Sync + 'static,
    {
        let mut slot = self
            .shared
            .error_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(handler));
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.shared.registry().len(topic)
    }

    pub fn has_subscribers(&self, topic: &str) -> bool {
        self.subscriber_count(topic) > 0
    }

    /// Topics with at least one subscriber, sorted.
    pub fn topics(&self) -> Vec<Topic> {
        self.shared.registry().topics()
    }

    /// Drops every subscriber of `topic`; returns how many there were.
    pub fn clear(&self, topic: &str) -> usize {
        let removed = self.shared.registry().clear(topic);
        if removed > 0 {
            debug!(bus = %self.shared.id, topic, removed, "topic cleared");
        }
        removed
    }

    fn register(&self, topic: &str, callback: Callback<T>) -> CoreResult<SubscriptionHandle> {
        let topic = Topic::parse_with_limit(topic, self.shared.config.max_topic_len)?;
        let sequence = self.shared.registry().insert(topic.clone(), callback);
        debug!(bus = %self.shared.id, %topic, sequence, "subscription added");
        Ok(SubscriptionHandle {
            bus: self.shared.id,
            topic,
            sequence,
        })
    }

    fn report(&self, failure: &SubscriberFailure) {
        if self.shared.config.log_failures {
            warn!(bus = %self.shared.id, topic = %failure.topic, sequence = failure.sequence, "{}", failure.reason);
        }
        let handler = self
            .shared
            .error_handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(handler) = handler {
            if panic::catch_unwind(AssertUnwindSafe(|| handler(failure))).is_err() {
                warn!(bus = %self.shared.id, topic = %failure.topic, "error handler panicked");
            }
        }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("id", &self.shared.id)
            .field("subscribers", &self.shared.registry().total())
            .field("config", &self.shared.config)
            .finish()
    }
}
