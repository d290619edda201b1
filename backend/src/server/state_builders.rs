//! Builders turning a [`ServerConfig`] into HTTP handler state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use switchgear_pm::domain::DocumentTreeStore;
use switchgear_pm::domain::ports::{
    DocumentStore, FixtureDocumentStore, FixtureTokenVerifier, TokenVerifier,
};
use switchgear_pm::inbound::http::state::{DocumentServices, HttpState};
use switchgear_pm::outbound::auth::Hs256TokenVerifier;
use switchgear_pm::outbound::pdf::PrintPdfRenderer;
use switchgear_pm::outbound::persistence::DieselDocumentStore;
use switchgear_pm::settings::secret_fingerprint;

use super::ServerConfig;

/// PostgreSQL when a pool is configured, otherwise process memory.
fn build_document_store(config: &ServerConfig) -> Arc<dyn DocumentStore> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselDocumentStore::new(pool.clone())),
        None => {
            warn!("no database configured; documents are kept in memory");
            Arc::new(FixtureDocumentStore::new())
        }
    }
}

/// HS256 verification when a secret is configured.
///
/// Without one, the bearer token text is taken as the customer id. `main`
/// refuses to start release builds in that state.
fn build_token_verifier(config: &ServerConfig) -> Arc<dyn TokenVerifier> {
    match &config.jwt_secret {
        Some(secret) => {
            info!(
                fingerprint = %secret_fingerprint(secret),
                "verifying bearer tokens with HS256"
            );
            Arc::new(Hs256TokenVerifier::new(
                secret.clone(),
                Arc::new(DefaultClock),
            ))
        }
        None => {
            warn!("no JWT secret configured; bearer tokens are trusted as customer ids");
            Arc::new(FixtureTokenVerifier)
        }
    }
}

/// Wire every driving port over one document tree.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let documents = DocumentTreeStore::new(
        build_document_store(config),
        config.tables.clone(),
        config.policy,
    );
    HttpState::from_documents(DocumentServices {
        documents,
        tokens: build_token_verifier(config),
        renderer: Arc::new(PrintPdfRenderer),
        clock: Arc::new(DefaultClock),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn config() -> ServerConfig {
        ServerConfig::new("127.0.0.1:0".parse().expect("socket addr"))
    }

    #[rstest]
    #[actix_web::test]
    async fn memory_state_serves_requests() {
        let state = build_http_state(&config());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(switchgear_pm::inbound::http::configure),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/preventivetask/C1")
                .insert_header(("Authorization", "Bearer C1"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn configured_secret_rejects_plain_tokens() {
        let state = build_http_state(
            &config().with_jwt_secret(Zeroizing::new(b"secret".to_vec())),
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(switchgear_pm::inbound::http::configure),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/preventivetask/C1")
                .insert_header(("Authorization", "Bearer C1"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
