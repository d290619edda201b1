//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{document_tables, documents};

/// Insertable struct registering a logical table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document_tables)]
pub(crate) struct NewDocumentTableRow<'a> {
    pub table_name: &'a str,
    pub key_attribute: &'a str,
}

/// Row struct for reading from the documents table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentRow {
    pub body: serde_json::Value,
    pub revision: i32,
    #[expect(dead_code, reason = "kept for operator queries and future audit output")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for the first write of a customer document.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub table_name: &'a str,
    pub customer_id: &'a str,
    pub body: &'a serde_json::Value,
    pub revision: i32,
}
