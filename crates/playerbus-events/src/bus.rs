use crate::emitter::{Emission, Emitter};
use crate::subscription::SubscriptionHandle;
use playerbus_core::CoreResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl BusEvent {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

pub type JsonCallback = Box<dyn Fn(&serde_json::Value) + Send + Sync>;

/// Emitter carrying untyped JSON payloads.
pub type JsonBus = Emitter<serde_json::Value>;

/// Object-safe view of a bus, for hosts that pass it around as `dyn EventBus`.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: BusEvent) -> CoreResult<Emission>;
    fn subscribe(&self, topic: &str, callback: JsonCallback) -> CoreResult<SubscriptionHandle>;
    fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool;
}

impl EventBus for JsonBus {
    fn publish(&self, event: BusEvent) -> CoreResult<Emission> {
        self.emit(&event.topic, &event.payload)
    }

    fn subscribe(&self, topic: &str, callback: JsonCallback) -> CoreResult<SubscriptionHandle> {
        self.on(topic, move |payload| callback(payload))
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.off(handle)
    }
}
