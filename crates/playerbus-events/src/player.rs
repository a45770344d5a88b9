//! Media-player vocabulary on top of [`Emitter`].
//!
//! Playback code publishes [`PlayerEvent`]s; progress bars, buffering
//! indicators and subtitle renderers subscribe to the field they care about.

use crate::emitter::{Emission, Emitter};
use crate::subscription::SubscriptionHandle;
use playerbus_core::{BusConfig, CoreResult};
use serde::{Deserialize, Serialize};

pub const TIME_UPDATE: &str = "timeUpdate";
pub const BUFFERING: &str = "buffering";
pub const SUBTITLE: &str = "subtitle";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    TimeUpdate { position_secs: f64 },
    Buffering { active: bool },
    Subtitle { text: String },
}

impl PlayerEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            PlayerEvent::TimeUpdate { .. } => TIME_UPDATE,
            PlayerEvent::Buffering { .. } => BUFFERING,
            PlayerEvent::Subtitle { .. } => SUBTITLE,
        }
    }
}

#[derive(Debug, Default)]
pub struct PlayerBus {
    emitter: Emitter<PlayerEvent>,
}

impl PlayerBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BusConfig) -> Self {
        Self {
            emitter: Emitter::with_config(config),
        }
    }

    pub fn publish(&self, event: PlayerEvent) -> CoreResult<Emission> {
        self.emitter.emit(event.topic(), &event)
    }

    pub fn on_time_update<F>(&self, callback: F) -> CoreResult<SubscriptionHandle>
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.emitter.on(TIME_UPDATE, move |event| {
            if let PlayerEvent::TimeUpdate { position_secs } = event {
                callback(*position_secs);
            }
        })
    }

    pub fn on_buffering<F>(&self, callback: F) -> CoreResult<SubscriptionHandle>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.emitter.on(BUFFERING, move |event| {
            if let PlayerEvent::Buffering { active } = event {
                callback(*active);
            }
        })
    }

    pub fn on_subtitle<F>(&self, callback: F) -> CoreResult<SubscriptionHandle>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.emitter.on(SUBTITLE, move |event| {
            if let PlayerEvent::Subtitle { text } = event {
                callback(text);
            }
        })
    }

    pub fn off(&self, handle: &SubscriptionHandle) -> bool {
        self.emitter.off(handle)
    }

    /// The underlying emitter, for error handlers and raw subscriptions.
    pub fn emitter(&self) -> &Emitter<PlayerEvent> {
        &self.emitter
    }
}
