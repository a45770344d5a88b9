pub mod bus;
pub mod emitter;
pub mod player;
pub mod registry;
pub mod subscription;
pub mod topic;

pub use bus::{BusEvent, EventBus, JsonBus, JsonCallback};
pub use emitter::{Emission, Emitter};
pub use player::{PlayerBus, PlayerEvent};
pub use subscription::{BusId, SubscriptionGuard, SubscriptionHandle};
pub use topic::Topic;

pub use playerbus_core::{BusConfig, CoreError, CoreResult, FailurePolicy, SubscriberFailure};
