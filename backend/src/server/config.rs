//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use switchgear_pm::domain::{ConcurrencyPolicy, TableNames};
use switchgear_pm::outbound::persistence::DbPool;
use zeroize::Zeroizing;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) tables: TableNames,
    pub(crate) policy: ConcurrencyPolicy,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) jwt_secret: Option<Zeroizing<Vec<u8>>>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Start from in-memory storage and no token secret.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            tables: TableNames::default(),
            policy: ConcurrencyPolicy::default(),
            db_pool: None,
            jwt_secret: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    #[must_use]
    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConcurrencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Back documents with PostgreSQL instead of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Verify bearer tokens as HS256 JWTs signed with `secret`.
    #[must_use]
    pub fn with_jwt_secret(mut self, secret: Zeroizing<Vec<u8>>) -> Self {
        self.jwt_secret = Some(secret);
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
