//! Multi-company access control configuration.

use serde::{Deserialize, Serialize};

/// Company scoping settings consulted by the access policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    /// When enabled, actors bound to a company may only see and modify
    /// assets belonging to that company.
    #[serde(default)]
    pub full_company_support: bool,
}
