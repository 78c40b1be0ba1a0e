//! Commit-or-rollback plumbing shared by the services.

use tracing::warn;

use assettrack_core::result::AppResult;
use assettrack_database::store::StoreTransaction;

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and return
/// the original error.
pub(crate) async fn settle<T>(tx: Box<dyn StoreTransaction>, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
