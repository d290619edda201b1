//! Port for the key-value document store.
//!
//! Each table holds at most one JSON document per customer, addressed by the
//! `customer_id` partition key. Writes replace the whole document and may be
//! guarded by a [`WriteCondition`] so callers can detect lost updates.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::CustomerId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            InternalError: "document store connection failed: {message}",
        /// A read or write failed while executing.
        Query { message: String } =>
            InternalError: "document store query failed: {message}",
        /// A conditional write lost against a concurrent writer.
        ConditionFailed { table: String, customer: String } =>
            Conflict: "document for {customer} in {table} was modified concurrently",
        /// The table has not been created.
        TableNotFound { table: String } =>
            InternalError: "document table {table} does not exist",
    }
}

/// Result of describing a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Exists,
    NotFound,
}

/// Guard applied to a whole-document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteCondition {
    /// Overwrite whatever is stored.
    #[default]
    Unconditional,
    /// Only write when no document exists yet.
    Absent,
    /// Only write when the stored revision still equals this value.
    Revision(u32),
}

impl WriteCondition {
    /// Whether a document currently at `current` may be overwritten.
    pub fn admits(self, current: Option<u32>) -> bool {
        match self {
            Self::Unconditional => true,
            Self::Absent => current.is_none(),
            Self::Revision(expected) => current == Some(expected),
        }
    }
}

/// A stored document with the revision it was written at.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
    pub body: Value,
    pub revision: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn describe_table(&self, table: &str) -> Result<TableStatus, DocumentStoreError>;

    async fn create_table(&self, table: &str, key_attribute: &str)
    -> Result<(), DocumentStoreError>;

    /// Fetch the document stored for `customer`, if any.
    async fn get(
        &self,
        table: &str,
        customer: &CustomerId,
    ) -> Result<Option<StoredItem>, DocumentStoreError>;

    /// Replace the document for `customer` and return its new revision.
    ///
    /// Revisions start at 1 and grow by one on every successful write.
    async fn put(
        &self,
        table: &str,
        customer: &CustomerId,
        body: Value,
        condition: WriteCondition,
    ) -> Result<u32, DocumentStoreError>;

    /// Partition-key query; yields zero or one item.
    async fn query(
        &self,
        table: &str,
        customer: &CustomerId,
    ) -> Result<Vec<StoredItem>, DocumentStoreError>;
}

/// In-process store used by tests and when no database is configured.
#[derive(Debug, Default)]
pub struct FixtureDocumentStore {
    inner: Mutex<FixtureState>,
}

#[derive(Debug, Default)]
struct FixtureState {
    tables: HashSet<String>,
    items: HashMap<(String, String), StoredItem>,
}

impl FixtureDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, FixtureState>, DocumentStoreError> {
        self.inner
            .lock()
            .map_err(|_| DocumentStoreError::connection("fixture store lock poisoned"))
    }

    /// Number of documents held across all tables.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|state| state.items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for FixtureDocumentStore {
    async fn describe_table(&self, table: &str) -> Result<TableStatus, DocumentStoreError> {
        let state = self.lock()?;
        Ok(if state.tables.contains(table) {
            TableStatus::Exists
        } else {
            TableStatus::NotFound
        })
    }

    async fn create_table(
        &self,
        table: &str,
        _key_attribute: &str,
    ) -> Result<(), DocumentStoreError> {
        self.lock()?.tables.insert(table.to_owned());
        Ok(())
    }

    async fn get(
        &self,
        table: &str,
        customer: &CustomerId,
    ) -> Result<Option<StoredItem>, DocumentStoreError> {
        let state = self.lock()?;
        if !state.tables.contains(table) {
            return Err(DocumentStoreError::table_not_found(table));
        }
        Ok(state
            .items
            .get(&(table.to_owned(), customer.to_string()))
            .cloned())
    }

    async fn put(
        &self,
        table: &str,
        customer: &CustomerId,
        body: Value,
        condition: WriteCondition,
    ) -> Result<u32, DocumentStoreError> {
        let mut state = self.lock()?;
        if !state.tables.contains(table) {
            return Err(DocumentStoreError::table_not_found(table));
        }
        let key = (table.to_owned(), customer.to_string());
        let current = state.items.get(&key).map(|item| item.revision);
        if !condition.admits(current) {
            return Err(DocumentStoreError::condition_failed(table, customer.as_ref()));
        }
        let revision = current.map_or(1, |rev| rev + 1);
        state.items.insert(key, StoredItem { body, revision });
        Ok(revision)
    }

    async fn query(
        &self,
        table: &str,
        customer: &CustomerId,
    ) -> Result<Vec<StoredItem>, DocumentStoreError> {
        Ok(self.get(table, customer).await?.into_iter().collect())
    }
}
