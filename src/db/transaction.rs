/*!
 * Transaction Helper Utilities
 *
 * Header and line-item writes for one document commit together or not at
 * all. Creates additionally retry when a freshly minted id loses a race.
 */

use metrics::counter;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{error, warn};

use crate::errors::ServiceError;

/// Opens a transaction on the pool.
pub async fn begin(db: &DatabaseConnection) -> Result<DatabaseTransaction, ServiceError> {
    db.begin().await.map_err(|e| {
        error!("Failed to begin transaction: {}", e);
        ServiceError::db_error(e)
    })
}

/// Commits on success, rolls back on failure, and hands back the outcome.
///
/// # Example
///
/// ```rust,ignore
/// let txn = transaction::begin(&db).await?;
/// let outcome = write_header_and_items(&txn, &input).await;
/// let id = transaction::finish(txn, outcome).await?;
/// ```
pub async fn finish<T>(
    txn: DatabaseTransaction,
    outcome: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match outcome {
        Ok(value) => {
            txn.commit().await.map_err(|e| {
                error!("Failed to commit transaction: {}", e);
                ServiceError::db_error(e)
            })?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!("Rollback failed after {}: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}

/// Bounded retry budget for creates that mint ids from the last issued one.
#[derive(Debug, Clone)]
pub struct IdRetryBudget {
    operation: &'static str,
    attempts: u32,
    used: u32,
}

impl IdRetryBudget {
    pub fn new(operation: &'static str, attempts: u32) -> Self {
        Self {
            operation,
            attempts: attempts.max(1),
            used: 0,
        }
    }

    /// Records a failed attempt and tells whether another one is allowed.
    pub fn should_retry(&mut self, err: &ServiceError) -> bool {
        self.used += 1;
        if !err.is_unique_violation() || self.used >= self.attempts {
            return false;
        }
        warn!(
            operation = self.operation,
            attempt = self.used,
            "Minted id collided with a concurrent insert, retrying"
        );
        counter!("erp_documents.id_retry", 1, "operation" => self.operation);
        true
    }

    /// Final error once no retry is allowed. Collisions become conflicts.
    pub fn give_up(&self, err: ServiceError) -> ServiceError {
        if err.is_unique_violation() {
            error!(
                operation = self.operation,
                attempts = self.used,
                "Id generation kept colliding"
            );
            ServiceError::Conflict(format!(
                "{} could not mint a unique id after {} attempts",
                self.operation, self.used
            ))
        } else {
            err
        }
    }

    pub fn attempts_used(&self) -> u32 {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::vendor;
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, ConnectOptions, Database, EntityTrait, Set};

    async fn memory_db() -> DatabaseConnection {
        let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
        opt.max_connections(1).min_connections(1);
        let db = Database::connect(opt).await.unwrap();
        crate::db::run_migrations(&db).await.unwrap();
        db
    }

    fn vendor_row(id: &str) -> vendor::ActiveModel {
        vendor::ActiveModel {
            id_vendor: Set(id.to_string()),
            vendor_name: Set("Acme Supply".to_string()),
            email: Set(None),
            phone: Set(None),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        }
    }

    #[tokio::test]
    async fn finish_commits_ok_outcome() {
        let db = memory_db().await;
        let txn = begin(&db).await.unwrap();
        let outcome = vendor_row("VDR-00001").insert(&txn).await.map_err(ServiceError::db_error);
        finish(txn, outcome).await.unwrap();

        assert!(vendor::Entity::find_by_id("VDR-00001".to_string())
            .one(&db)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn finish_rolls_back_err_outcome() {
        let db = memory_db().await;
        let txn = begin(&db).await.unwrap();
        vendor_row("VDR-00001").insert(&txn).await.unwrap();
        let outcome: Result<(), ServiceError> = Err(ServiceError::ValidationError("late".into()));
        assert!(finish(txn, outcome).await.is_err());

        assert!(vendor::Entity::find_by_id("VDR-00001".to_string())
            .one(&db)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_primary_key_is_a_unique_violation() {
        let db = memory_db().await;
        vendor_row("VDR-00001").insert(&db).await.unwrap();
        let err = ServiceError::db_error(vendor_row("VDR-00001").insert(&db).await.unwrap_err());
        assert!(err.is_unique_violation());

        let mut budget = IdRetryBudget::new("create vendor", 2);
        assert!(budget.should_retry(&err));
        assert!(!budget.should_retry(&err));
        assert!(matches!(budget.give_up(err), ServiceError::Conflict(_)));
    }

    #[test]
    fn non_collision_errors_are_not_retried() {
        let mut budget = IdRetryBudget::new("create bom", 3);
        let err = ServiceError::NotFound("PRF-00001".into());
        assert!(!budget.should_retry(&err));
        assert!(matches!(budget.give_up(err), ServiceError::NotFound(_)));
    }
}
