//! Test helpers for inbound HTTP components.

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, web};
use std::sync::Arc;

use crate::domain::DocumentTreeStore;
use crate::domain::ports::{FixtureDocumentStore, FixturePdfRenderer, FixtureTokenVerifier};
use crate::domain::service_test_support::{clock_on, date, memory_tree};

use super::state::{DocumentServices, HttpState};

/// Customer id accepted by the fixture token verifier for `bearer()`.
pub const TEST_CUSTOMER: &str = "C1";

/// Authorization header understood by [`FixtureTokenVerifier`].
pub fn bearer() -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {TEST_CUSTOMER}"))
}

/// State backed by an in-memory document store, clock pinned to 2024-12-16.
///
/// The returned tree seeds and inspects the same store the handlers use.
pub fn memory_state() -> (HttpState, DocumentTreeStore<FixtureDocumentStore>) {
    let (documents, _) = memory_tree();
    let state = HttpState::from_documents(DocumentServices {
        documents: documents.clone(),
        tokens: Arc::new(FixtureTokenVerifier),
        renderer: Arc::new(FixturePdfRenderer),
        clock: clock_on(date(2024, 12, 16)),
    });
    (state, documents)
}

/// App with every maintenance route mounted over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(super::configure)
}
