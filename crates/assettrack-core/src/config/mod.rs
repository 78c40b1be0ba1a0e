//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod access;
pub mod database;
pub mod logging;
pub mod notifications;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::access::AccessConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::notifications::NotificationsConfig;
pub use self::storage::{StorageConfig, StoreBackend, StoreConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Multi-company access control settings.
    #[serde(default)]
    pub access: AccessConfig,
    /// Attachment storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Notification hand-off settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Which record store backs the engine.
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the given base file with an environment-specific overlay
    /// (`config/{env}`) and environment variables prefixed with
    /// `ASSETTRACK__`.
    pub fn load(base: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .set_default("database.url", "postgres://localhost/assettrack")?
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("ASSETTRACK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let json = serde_json::json!({
            "database": { "url": "postgres://u:p@localhost/assets" }
        });
        let config: AppConfig = serde_json::from_value(json).expect("deserialize");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.logging.level, "info");
        assert!(!config.access.full_company_support);
        assert!(config.notifications.enabled);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert_eq!(config.storage.uploads_dir, "data/uploads/assets");
    }
}
