//! Notification hand-off configuration.

use serde::{Deserialize, Serialize};

/// Settings for the notification dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Whether completed transitions are handed to the notification sink.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}
