//! Which cached list pages a write to each document kind makes stale.

use futures::future::join_all;
use std::sync::Arc;
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, warn};

use super::CacheBackend;
use crate::documents::DocumentKind;

/// A cached, paginated list. The display form is the key stem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ListView {
    BomList,
    ManufacturingOrderList,
    RfqList,
    RfqOpenList,
    RfqBillableList,
    QuotationList,
    QuotationOpenList,
    QuotationBillableList,
}

impl ListView {
    /// Cache key of one page, e.g. `BomList_page_1`
    pub fn page_key(&self, page: u64) -> String {
        format!("{}{}", self.key_prefix(), page)
    }

    /// Stem shared by every page of this list and no other list
    pub fn key_prefix(&self) -> String {
        format!("{}_page_", self)
    }

    /// Lists holding documents of `kind`
    pub fn fed_by(kind: DocumentKind) -> Vec<ListView> {
        match kind {
            DocumentKind::Bom => vec![ListView::BomList],
            DocumentKind::ManufacturingOrder => vec![ListView::ManufacturingOrderList],
            DocumentKind::Rfq => vec![
                ListView::RfqList,
                ListView::RfqOpenList,
                ListView::RfqBillableList,
            ],
            DocumentKind::Quotation => vec![
                ListView::QuotationList,
                ListView::QuotationOpenList,
                ListView::QuotationBillableList,
            ],
            DocumentKind::VendorBill => vec![ListView::RfqBillableList],
        }
    }

    pub fn all() -> impl Iterator<Item = ListView> {
        ListView::iter()
    }
}

/// Evicts every cached page of every list a write touched. Runs after the
/// write committed; failures are logged and swallowed since a stale page only
/// lives until its TTL.
#[derive(Clone)]
pub struct CacheInvalidationPolicy {
    cache: Arc<dyn CacheBackend>,
}

impl CacheInvalidationPolicy {
    pub fn new(cache: Arc<dyn CacheBackend>) -> Self {
        Self { cache }
    }

    pub fn prefixes_for(&self, kind: DocumentKind) -> Vec<String> {
        ListView::fed_by(kind)
            .into_iter()
            .map(|view| view.key_prefix())
            .collect()
    }

    pub async fn invalidate(&self, kind: DocumentKind) {
        let prefixes = self.prefixes_for(kind);
        let results =
            join_all(prefixes.iter().map(|prefix| self.cache.delete_prefix(prefix))).await;

        for (prefix, result) in prefixes.iter().zip(results) {
            match result {
                Ok(removed) => debug!(prefix = %prefix, removed, "Evicted cached list pages"),
                Err(err) => warn!(prefix = %prefix, "Failed to evict cached list pages: {}", err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use rstest::rstest;

    #[rstest]
    #[case(ListView::BomList, "BomList_page_1")]
    #[case(ListView::RfqOpenList, "RfqOpenList_page_1")]
    #[case(ListView::QuotationBillableList, "QuotationBillableList_page_1")]
    fn page_keys_follow_the_list_name(#[case] view: ListView, #[case] expected: &str) {
        assert_eq!(view.page_key(1), expected);
    }

    #[test]
    fn every_list_is_fed_by_some_kind() {
        let kinds = [
            DocumentKind::Bom,
            DocumentKind::ManufacturingOrder,
            DocumentKind::Rfq,
            DocumentKind::Quotation,
            DocumentKind::VendorBill,
        ];
        for view in ListView::all() {
            assert!(
                kinds.iter().any(|k| ListView::fed_by(*k).contains(&view)),
                "{} is never invalidated",
                view
            );
        }
    }

    #[tokio::test]
    async fn rfq_writes_evict_all_rfq_lists_only() {
        let cache = Arc::new(InMemoryCache::new());
        for view in ListView::all() {
            cache.set(&view.page_key(1), "[]", None).await.unwrap();
        }
        let policy = CacheInvalidationPolicy::new(cache.clone());

        policy.invalidate(DocumentKind::Rfq).await;

        assert!(!cache.exists("RfqList_page_1").await.unwrap());
        assert!(!cache.exists("RfqOpenList_page_1").await.unwrap());
        assert!(!cache.exists("RfqBillableList_page_1").await.unwrap());
        assert!(cache.exists("BomList_page_1").await.unwrap());
        assert!(cache.exists("QuotationList_page_1").await.unwrap());
    }

    #[tokio::test]
    async fn evicts_pages_beyond_the_first() {
        let cache = Arc::new(InMemoryCache::new());
        for page in [1, 2, 40] {
            cache
                .set(&ListView::BomList.page_key(page), "[]", None)
                .await
                .unwrap();
        }
        let policy = CacheInvalidationPolicy::new(cache.clone());

        policy.invalidate(DocumentKind::Bom).await;

        assert!(cache.is_empty());
    }
}
