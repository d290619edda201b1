//! Load/save boundary between typed customer documents and the store.
//!
//! Tables are ensured (described, then created when missing) before every
//! access. Saves replace the whole document; under
//! [`ConcurrencyPolicy::OptimisticToken`] they are guarded by the revision
//! observed at load time.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::documents::{PARTITION_KEY, StoredDocument, TableKind};
use super::ports::{DocumentStore, DocumentStoreError, TableStatus, WriteCondition};
use super::{CustomerId, Error};

/// How concurrent read-merge-write cycles are arbitrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    #[default]
    LastWriterWins,
    OptimisticToken,
}

impl FromStr for ConcurrencyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "last_writer_wins" => Ok(Self::LastWriterWins),
            "optimistic_token" => Ok(Self::OptimisticToken),
            other => Err(format!("unknown concurrency policy '{other}'")),
        }
    }
}

/// Physical table names per logical table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub configuration: String,
    pub preventive_tasks: String,
    pub mapping: String,
    pub calendar: String,
    pub customer_snapshot: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            configuration: TableKind::Configuration.default_table_name().to_owned(),
            preventive_tasks: TableKind::PreventiveTasks.default_table_name().to_owned(),
            mapping: TableKind::Mapping.default_table_name().to_owned(),
            calendar: TableKind::Calendar.default_table_name().to_owned(),
            customer_snapshot: TableKind::CustomerSnapshot.default_table_name().to_owned(),
        }
    }
}

impl TableNames {
    pub fn name(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Configuration => &self.configuration,
            TableKind::PreventiveTasks => &self.preventive_tasks,
            TableKind::Mapping => &self.mapping,
            TableKind::Calendar => &self.calendar,
            TableKind::CustomerSnapshot => &self.customer_snapshot,
        }
    }

    /// Resolve a physical table name back to its logical table.
    pub fn kind_of(&self, table: &str) -> Option<TableKind> {
        TableKind::ALL
            .into_iter()
            .find(|kind| self.name(*kind) == table)
    }
}

/// A document together with the revision it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<D> {
    pub document: D,
    pub revision: u32,
}

/// Failures crossing the load/save boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocumentTreeError {
    #[error(transparent)]
    Store(#[from] DocumentStoreError),
    #[error("stored document in {table} for {customer} is malformed: {message}")]
    MalformedData {
        table: String,
        customer: String,
        message: String,
    },
    #[error("document for {customer} could not be encoded: {message}")]
    Encode { customer: String, message: String },
}

impl From<DocumentTreeError> for Error {
    fn from(value: DocumentTreeError) -> Self {
        match value {
            DocumentTreeError::Store(err) => err.into(),
            other => Error::internal(other.to_string()),
        }
    }
}

/// Typed access to the per-customer documents.
pub struct DocumentTreeStore<S: ?Sized> {
    store: Arc<S>,
    tables: TableNames,
    policy: ConcurrencyPolicy,
}

impl<S: ?Sized> Clone for DocumentTreeStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tables: self.tables.clone(),
            policy: self.policy,
        }
    }
}

impl<S> DocumentTreeStore<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(store: Arc<S>, tables: TableNames, policy: ConcurrencyPolicy) -> Self {
        Self {
            store,
            tables,
            policy,
        }
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Create the table backing `kind` if the store does not know it yet.
    pub async fn ensure_table(&self, kind: TableKind) -> Result<(), DocumentTreeError> {
        let table = self.tables.name(kind);
        match self.store.describe_table(table).await {
            Ok(TableStatus::Exists) => Ok(()),
            Ok(TableStatus::NotFound) | Err(DocumentStoreError::TableNotFound { .. }) => {
                info!(table, "creating document table");
                self.store.create_table(table, PARTITION_KEY).await?;
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Load the document of `customer`, or `None` when none was written yet.
    pub async fn load<D: StoredDocument>(
        &self,
        customer: &CustomerId,
    ) -> Result<Option<Loaded<D>>, DocumentTreeError> {
        self.ensure_table(D::KIND).await?;
        let table = self.tables.name(D::KIND);
        let Some(item) = self.store.get(table, customer).await? else {
            debug!(table, customer = %customer, "no stored document");
            return Ok(None);
        };
        let document = serde_json::from_value::<D>(item.body).map_err(|err| {
            DocumentTreeError::MalformedData {
                table: table.to_owned(),
                customer: customer.to_string(),
                message: err.to_string(),
            }
        })?;
        Ok(Some(Loaded {
            document,
            revision: item.revision,
        }))
    }

    /// Every document stored for `customer` in the table backing `D`.
    ///
    /// Used by cross-table joins, which treat each table as a list of
    /// documents rather than a single tree.
    pub async fn load_all<D: StoredDocument>(
        &self,
        customer: &CustomerId,
    ) -> Result<Vec<D>, DocumentTreeError> {
        self.ensure_table(D::KIND).await?;
        let table = self.tables.name(D::KIND);
        self.store
            .query(table, customer)
            .await?
            .into_iter()
            .map(|item| {
                serde_json::from_value::<D>(item.body).map_err(|err| {
                    DocumentTreeError::MalformedData {
                        table: table.to_owned(),
                        customer: customer.to_string(),
                        message: err.to_string(),
                    }
                })
            })
            .collect()
    }

    /// Overwrite the document, returning its new revision.
    ///
    /// `loaded_revision` is the revision the caller read, or `None` when the
    /// document did not exist. It only guards the write under
    /// [`ConcurrencyPolicy::OptimisticToken`].
    pub async fn save<D: StoredDocument>(
        &self,
        document: &D,
        loaded_revision: Option<u32>,
    ) -> Result<u32, DocumentTreeError> {
        self.ensure_table(D::KIND).await?;
        let table = self.tables.name(D::KIND);
        let customer = document.customer_id();
        let body = serde_json::to_value(document).map_err(|err| DocumentTreeError::Encode {
            customer: customer.to_string(),
            message: err.to_string(),
        })?;
        let condition = match (self.policy, loaded_revision) {
            (ConcurrencyPolicy::LastWriterWins, _) => WriteCondition::Unconditional,
            (ConcurrencyPolicy::OptimisticToken, Some(revision)) => {
                WriteCondition::Revision(revision)
            }
            (ConcurrencyPolicy::OptimisticToken, None) => WriteCondition::Absent,
        };
        let revision = self.store.put(table, customer, body, condition).await?;
        debug!(table, customer = %customer, revision, "document saved");
        Ok(revision)
    }
}
