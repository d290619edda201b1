//! Outbound adapters implementing the driven domain ports.
//!
//! - **persistence**: PostgreSQL document store using Diesel ORM
//! - **auth**: HS256 bearer token verification
//! - **pdf**: circuit-breaker detail sheets via `printpdf`
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod auth;
pub mod pdf;
pub mod persistence;
