//! Domain events emitted by completed lifecycle transitions.
//!
//! Events are handed to the notification dispatcher after the transition
//! has committed. Consumers (email, chat, dashboards) live outside the core.

pub mod asset;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::UserId;

pub use asset::AssetEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event.
    pub actor_id: UserId,
    /// The event payload.
    pub payload: AssetEvent,
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: UserId, payload: AssetEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Short machine name of the payload, used as a log field.
    pub fn name(&self) -> &'static str {
        self.payload.name()
    }
}
