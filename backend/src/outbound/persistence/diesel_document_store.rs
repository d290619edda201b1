//! PostgreSQL-backed `DocumentStore` implementation using Diesel ORM.
//!
//! Logical tables are rows of `document_tables`; documents live in a single
//! `documents` table keyed by `(table_name, customer_id)`. Conditional writes
//! use the `revision` column so a lost update surfaces as
//! [`DocumentStoreError::ConditionFailed`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::CustomerId;
use crate::domain::ports::{
    DocumentStore, DocumentStoreError, StoredItem, TableStatus, WriteCondition,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DocumentRow, NewDocumentRow, NewDocumentTableRow};
use super::pool::DbPool;
use super::schema::{document_tables, documents};

/// Diesel-backed implementation of the [`DocumentStore`] port.
#[derive(Clone)]
pub struct DieselDocumentStore {
    pool: DbPool,
}

impl DieselDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[expect(
    clippy::cast_sign_loss,
    reason = "a check constraint keeps revisions positive"
)]
fn revision_from_db(revision: i32) -> u32 {
    revision as u32
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "revisions grow by one per write and stay far below i32::MAX"
)]
fn revision_for_db(revision: u32) -> i32 {
    revision as i32
}

fn row_to_item(row: DocumentRow) -> StoredItem {
    StoredItem {
        body: row.body,
        revision: revision_from_db(row.revision),
    }
}

async fn table_exists(conn: &mut AsyncPgConnection, table: &str) -> Result<bool, DocumentStoreError> {
    let count: i64 = document_tables::table
        .filter(document_tables::table_name.eq(table))
        .count()
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;
    Ok(count > 0)
}

async fn require_table(conn: &mut AsyncPgConnection, table: &str) -> Result<(), DocumentStoreError> {
    if table_exists(conn, table).await? {
        Ok(())
    } else {
        Err(DocumentStoreError::table_not_found(table))
    }
}

#[async_trait]
impl DocumentStore for DieselDocumentStore {
    async fn describe_table(&self, table: &str) -> Result<TableStatus, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        Ok(if table_exists(&mut conn, table).await? {
            TableStatus::Exists
        } else {
            TableStatus::NotFound
        })
    }

    async fn create_table(
        &self,
        table: &str,
        key_attribute: &str,
    ) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(document_tables::table)
            .values(&NewDocumentTableRow {
                table_name: table,
                key_attribute,
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if inserted > 0 {
            info!(table, key_attribute, "created document table");
        }
        Ok(())
    }

    async fn get(
        &self,
        table: &str,
        customer: &CustomerId,
    ) -> Result<Option<StoredItem>, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        require_table(&mut conn, table).await?;

        let row: Option<DocumentRow> = documents::table
            .filter(documents::table_name.eq(table))
            .filter(documents::customer_id.eq(customer.as_ref()))
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_item))
    }

    async fn put(
        &self,
        table: &str,
        customer: &CustomerId,
        body: Value,
        condition: WriteCondition,
    ) -> Result<u32, DocumentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        require_table(&mut conn, table).await?;

        let new_row = NewDocumentRow {
            table_name: table,
            customer_id: customer.as_ref(),
            body: &body,
            revision: 1,
        };

        let written: Option<i32> = match condition {
            WriteCondition::Unconditional => diesel::insert_into(documents::table)
                .values(&new_row)
                .on_conflict((documents::table_name, documents::customer_id))
                .do_update()
                .set((
                    documents::body.eq(excluded(documents::body)),
                    documents::revision.eq(documents::revision + 1),
                    documents::updated_at.eq(diesel::dsl::now),
                ))
                .returning(documents::revision)
                .get_result(&mut conn)
                .await
                .map(Some)
                .map_err(map_diesel_error)?,
            WriteCondition::Absent => diesel::insert_into(documents::table)
                .values(&new_row)
                .on_conflict_do_nothing()
                .returning(documents::revision)
                .get_result(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)?,
            WriteCondition::Revision(expected) => diesel::update(
                documents::table
                    .filter(documents::table_name.eq(table))
                    .filter(documents::customer_id.eq(customer.as_ref()))
                    .filter(documents::revision.eq(revision_for_db(expected))),
            )
            .set((
                documents::body.eq(&body),
                documents::revision.eq(documents::revision + 1),
                documents::updated_at.eq(diesel::dsl::now),
            ))
            .returning(documents::revision)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?,
        };

        match written {
            Some(revision) => Ok(revision_from_db(revision)),
            None => {
                debug!(table, customer = %customer, ?condition, "conditional write lost");
                Err(DocumentStoreError::condition_failed(table, customer.as_ref()))
            }
        }
    }

    async fn query(
        &self,
        table: &str,
        customer: &CustomerId,
    ) -> Result<Vec<StoredItem>, DocumentStoreError> {
        Ok(self.get(table, customer).await?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1)]
    #[case(42, 42)]
    fn revisions_cross_the_boundary_unchanged(#[case] db: i32, #[case] domain: u32) {
        assert_eq!(revision_from_db(db), domain);
        assert_eq!(revision_for_db(domain), db);
    }
}
