//! Per-item and aggregate outcome of a bulk call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use assettrack_core::types::id::AssetId;

/// What happened to one asset of a bulk call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The change was committed.
    Applied,
    /// The asset was left alone on purpose.
    Skipped(String),
    /// The asset's transaction rolled back.
    Failed(String),
}

impl ItemOutcome {
    /// Short label for tables and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    /// Reason text, empty for applied items.
    pub fn reason(&self) -> &str {
        match self {
            Self::Applied => "",
            Self::Skipped(reason) | Self::Failed(reason) => reason,
        }
    }
}

/// Overall status of a bulk call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    /// Every item was applied or skipped.
    Completed,
    /// At least one item failed. The others were still processed.
    PartialFailure,
    /// The request carried nothing to do; no writes happened.
    NothingToUpdate,
}

/// Result of [`super::BulkCoordinator`] calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOperationResult {
    pub status: BulkStatus,
    pub items: BTreeMap<AssetId, ItemOutcome>,
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BulkOperationResult {
    /// A result for a request with nothing to apply.
    pub fn nothing_to_update() -> Self {
        Self {
            status: BulkStatus::NothingToUpdate,
            items: BTreeMap::new(),
            applied: 0,
            skipped: 0,
            failed: 0,
        }
    }

    /// Aggregate per-item outcomes.
    pub fn from_items(items: BTreeMap<AssetId, ItemOutcome>) -> Self {
        let mut applied = 0;
        let mut skipped = 0;
        let mut failed = 0;
        for outcome in items.values() {
            match outcome {
                ItemOutcome::Applied => applied += 1,
                ItemOutcome::Skipped(_) => skipped += 1,
                ItemOutcome::Failed(_) => failed += 1,
            }
        }
        let status = if failed > 0 {
            BulkStatus::PartialFailure
        } else {
            BulkStatus::Completed
        };
        Self {
            status,
            items,
            applied,
            skipped,
            failed,
        }
    }

    /// Outcome for one asset, if it was part of the call.
    pub fn outcome(&self, asset_id: AssetId) -> Option<&ItemOutcome> {
        self.items.get(&asset_id)
    }

    /// Number of items processed.
    pub fn total(&self) -> usize {
        self.items.len()
    }
}
