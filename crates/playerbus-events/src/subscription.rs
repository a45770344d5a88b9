use crate::topic::Topic;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one bus instance, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusId(u64);

impl BusId {
    pub(crate) fn next() -> Self {
        Self(NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bus#{}", self.0)
    }
}

/// Token for exactly one registration, returned by `on` and consumed by `off`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub(crate) bus: BusId,
    pub(crate) topic: Topic,
    pub(crate) sequence: u64,
}

impl SubscriptionHandle {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn bus(&self) -> BusId {
        self.bus
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.bus, self.topic, self.sequence)
    }
}

pub(crate) trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool;
}

/// Removes its subscription when dropped.
///
/// Holds the bus weakly: a guard outliving its bus does nothing on drop.
#[must_use = "dropping the guard immediately removes the subscription"]
pub struct SubscriptionGuard {
    handle: SubscriptionHandle,
    // `None` once detached.
    bus: Option<Weak<dyn Unsubscribe>>,
}

impl SubscriptionGuard {
    pub(crate) fn new(handle: SubscriptionHandle, bus: Weak<dyn Unsubscribe>) -> Self {
        Self {
            handle,
            bus: Some(bus),
        }
    }

    pub fn handle(&self) -> &SubscriptionHandle {
        &self.handle
    }

    /// Keeps the subscription alive past the guard and returns its handle.
    pub fn detach(mut self) -> SubscriptionHandle {
        self.bus = None;
        self.handle.clone()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.take().and_then(|weak| weak.upgrade()) {
            bus.unsubscribe(&self.handle);
        }
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("handle", &self.handle)
            .finish()
    }
}
