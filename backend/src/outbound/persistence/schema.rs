//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a migration
//! changes the schema, update this file by hand or regenerate it with
//! `diesel print-schema`.

diesel::table! {
    /// Logical document tables created on demand by the document tree store.
    document_tables (table_name) {
        table_name -> Varchar,
        /// Partition key attribute; always `customer_id` today.
        key_attribute -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Whole-customer JSON documents, one per logical table.
    documents (table_name, customer_id) {
        table_name -> Varchar,
        customer_id -> Varchar,
        body -> Jsonb,
        /// Starts at 1 and grows by one per write.
        revision -> Int4,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(documents -> document_tables (table_name));
diesel::allow_tables_to_appear_in_same_query!(document_tables, documents);
