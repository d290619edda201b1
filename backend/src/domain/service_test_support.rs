//! Shared fixtures for the document-backed service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use crate::domain::CustomerId;
use crate::domain::document_tree::{ConcurrencyPolicy, DocumentTreeStore, TableNames};
use crate::domain::documents::StoredDocument;
use crate::domain::ports::{DocumentStore, FixtureDocumentStore, WriteCondition};

pub(crate) struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock pinned to noon UTC on `date`.
pub(crate) fn clock_on(date: NaiveDate) -> Arc<dyn Clock> {
    let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
    Arc::new(FixtureClock {
        utc_now: Utc.from_utc_datetime(&noon),
    })
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

pub(crate) fn customer() -> CustomerId {
    CustomerId::new("C1").expect("valid customer id")
}

/// Document tree over a fresh in-memory store, plus the store for inspection.
pub(crate) fn memory_tree() -> (
    DocumentTreeStore<FixtureDocumentStore>,
    Arc<FixtureDocumentStore>,
) {
    let store = Arc::new(FixtureDocumentStore::new());
    let tree = DocumentTreeStore::new(
        Arc::clone(&store),
        TableNames::default(),
        ConcurrencyPolicy::default(),
    );
    (tree, store)
}

/// Write `document` straight into the store backing `tree`.
pub(crate) async fn seed<D>(tree: &DocumentTreeStore<FixtureDocumentStore>, document: &D)
where
    D: StoredDocument,
{
    tree.save(document, None).await.expect("seed document");
}

/// Write raw JSON, bypassing typed encoding.
pub(crate) async fn seed_raw(
    store: &FixtureDocumentStore,
    table: &str,
    customer_id: &CustomerId,
    body: serde_json::Value,
) {
    store
        .create_table(table, "customer_id")
        .await
        .expect("create table");
    store
        .put(table, customer_id, body, WriteCondition::Unconditional)
        .await
        .expect("seed raw document");
}
