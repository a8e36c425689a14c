//! Line-item reconciliation.
//!
//! Planning is pure: given the persisted items of a document and the incoming
//! set, [`plan`] decides which rows are updated in place and which are
//! inserted. [`apply`] executes a plan against a [`LineItemStore`] inside the
//! caller's transaction, minting ids for every insert in one batch.

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::sequence::{self, IdPrefix};
use crate::errors::ServiceError;

/// How a document kind treats its line items on update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemPolicy {
    /// Delete every persisted item, then insert the incoming set with fresh ids.
    ReplaceAll,
    /// Update items matched by catalog id in place, insert the rest, and keep
    /// persisted items missing from the incoming set.
    UpsertRetain,
}

/// An incoming line item, keyed by the catalog entity it references.
pub trait LineItem {
    fn catalog_id(&self) -> &str;
}

/// The identity of a persisted line item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedItem {
    pub id: String,
    pub catalog_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineItemAction<T> {
    Update { id: String, item: T },
    Insert { item: T },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan<T> {
    pub delete_existing: bool,
    pub actions: Vec<LineItemAction<T>>,
    /// Persisted ids left untouched by an upsert
    pub retained: Vec<String>,
}

impl<T> ReconcilePlan<T> {
    pub fn insert_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| matches!(action, LineItemAction::Insert { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub deleted: u64,
    pub updated: usize,
    pub inserted: usize,
    pub retained: usize,
}

/// Rejects a line-item set that references the same catalog entity twice.
pub fn ensure_unique_catalog_ids<T: LineItem>(items: &[T]) -> Result<(), ServiceError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.catalog_id()) {
            return Err(ServiceError::Conflict(format!(
                "Duplicate catalog id {} found in line items",
                item.catalog_id()
            )));
        }
    }
    Ok(())
}

/// Plans how `incoming` replaces `existing` under `policy`.
pub fn plan<T: LineItem>(
    policy: LineItemPolicy,
    existing: &[PersistedItem],
    incoming: Vec<T>,
) -> Result<ReconcilePlan<T>, ServiceError> {
    ensure_unique_catalog_ids(&incoming)?;

    match policy {
        LineItemPolicy::ReplaceAll => Ok(ReconcilePlan {
            delete_existing: !existing.is_empty(),
            actions: incoming
                .into_iter()
                .map(|item| LineItemAction::Insert { item })
                .collect(),
            retained: Vec::new(),
        }),
        LineItemPolicy::UpsertRetain => {
            let by_catalog: HashMap<&str, &str> = existing
                .iter()
                .map(|p| (p.catalog_id.as_str(), p.id.as_str()))
                .collect();
            let incoming_ids: HashSet<&str> = incoming.iter().map(|i| i.catalog_id()).collect();

            let retained = existing
                .iter()
                .filter(|p| !incoming_ids.contains(p.catalog_id.as_str()))
                .map(|p| p.id.clone())
                .collect();

            let actions = incoming
                .into_iter()
                .map(|item| match by_catalog.get(item.catalog_id()) {
                    Some(id) => LineItemAction::Update {
                        id: (*id).to_string(),
                        item,
                    },
                    None => LineItemAction::Insert { item },
                })
                .collect();

            Ok(ReconcilePlan {
                delete_existing: false,
                actions,
                retained,
            })
        }
    }
}

/// Persistence for one line-item family. Every call runs inside the
/// document's transaction.
#[async_trait]
pub trait LineItemStore: Send + Sync {
    type Item: LineItem + Send + Sync;

    fn prefix(&self) -> IdPrefix;

    async fn find_by_document(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
    ) -> Result<Vec<PersistedItem>, ServiceError>;

    /// Highest line-item id issued so far across all documents
    async fn last_id(&self, txn: &DatabaseTransaction) -> Result<Option<String>, ServiceError>;

    async fn insert(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
        id: &str,
        item: &Self::Item,
    ) -> Result<(), ServiceError>;

    async fn update(
        &self,
        txn: &DatabaseTransaction,
        id: &str,
        item: &Self::Item,
    ) -> Result<(), ServiceError>;

    async fn delete_by_document(
        &self,
        txn: &DatabaseTransaction,
        document_id: &str,
    ) -> Result<u64, ServiceError>;
}

/// Executes `plan` for `document_id`.
pub async fn apply<S: LineItemStore>(
    store: &S,
    txn: &DatabaseTransaction,
    document_id: &str,
    plan: ReconcilePlan<S::Item>,
) -> Result<ReconcileSummary, ServiceError> {
    let mut summary = ReconcileSummary {
        retained: plan.retained.len(),
        ..Default::default()
    };

    if plan.delete_existing {
        summary.deleted = store.delete_by_document(txn, document_id).await?;
    }

    let inserts = plan.insert_count();
    let mut fresh_ids = if inserts > 0 {
        let last = store.last_id(txn).await?.unwrap_or_default();
        sequence::next_batch(store.prefix(), &last, inserts)?.into_iter()
    } else {
        Vec::new().into_iter()
    };

    for action in plan.actions {
        match action {
            LineItemAction::Update { id, item } => {
                store.update(txn, &id, &item).await?;
                summary.updated += 1;
            }
            LineItemAction::Insert { item } => {
                let id = fresh_ids.next().ok_or_else(|| {
                    ServiceError::InternalError("line-item id batch exhausted".to_string())
                })?;
                store.insert(txn, document_id, &id, &item).await?;
                summary.inserted += 1;
            }
        }
    }

    debug!(
        document_id,
        deleted = summary.deleted,
        updated = summary.updated,
        inserted = summary.inserted,
        retained = summary.retained,
        "Line items reconciled"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug, Clone, PartialEq)]
    struct Line(&'static str, u32);

    impl LineItem for Line {
        fn catalog_id(&self) -> &str {
            self.0
        }
    }

    fn persisted(id: &str, catalog_id: &str) -> PersistedItem {
        PersistedItem {
            id: id.to_string(),
            catalog_id: catalog_id.to_string(),
        }
    }

    #[test]
    fn duplicate_catalog_ids_conflict() {
        let result = plan(
            LineItemPolicy::ReplaceAll,
            &[],
            vec![Line("MTR-00001", 2), Line("MTR-00001", 3)],
        );
        assert_matches!(result, Err(ServiceError::Conflict(msg)) if msg.contains("MTR-00001"));
    }

    #[test]
    fn replace_all_deletes_then_inserts_everything() {
        let existing = [persisted("BMM-00001", "MTR-00001")];
        let plan = plan(
            LineItemPolicy::ReplaceAll,
            &existing,
            vec![Line("MTR-00001", 5), Line("MTR-00002", 1)],
        )
        .unwrap();

        assert!(plan.delete_existing);
        assert_eq!(plan.insert_count(), 2);
        assert!(plan.retained.is_empty());
    }

    #[test]
    fn replace_all_on_empty_document_skips_delete() {
        let plan = plan(LineItemPolicy::ReplaceAll, &[], vec![Line("MTR-00001", 1)]).unwrap();
        assert!(!plan.delete_existing);
    }

    #[test]
    fn upsert_updates_matches_and_retains_orphans() {
        let existing = [
            persisted("QPR-00001", "PRF-00001"),
            persisted("QPR-00002", "PRF-00002"),
        ];
        let plan = plan(
            LineItemPolicy::UpsertRetain,
            &existing,
            vec![Line("PRF-00002", 7), Line("PRF-00003", 1)],
        )
        .unwrap();

        assert!(!plan.delete_existing);
        assert_eq!(
            plan.actions,
            vec![
                LineItemAction::Update {
                    id: "QPR-00002".into(),
                    item: Line("PRF-00002", 7)
                },
                LineItemAction::Insert {
                    item: Line("PRF-00003", 1)
                },
            ]
        );
        assert_eq!(plan.retained, vec!["QPR-00001".to_string()]);
    }

    #[test]
    fn upsert_with_identical_set_inserts_nothing() {
        let existing = [
            persisted("RQP-00001", "MTR-00001"),
            persisted("RQP-00002", "MTR-00002"),
        ];
        let plan = plan(
            LineItemPolicy::UpsertRetain,
            &existing,
            vec![Line("MTR-00001", 1), Line("MTR-00002", 1)],
        )
        .unwrap();

        assert_eq!(plan.insert_count(), 0);
        assert!(plan.retained.is_empty());
    }
}
