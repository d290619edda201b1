//! Bearer token authentication for HTTP handlers.
//!
//! Handlers take a [`CustomerAuth`] argument to require a verified token.
//! Verification itself lives behind the [`TokenVerifier`] port so the HTTP
//! modules stay focused on request/response mapping.
//!
//! [`TokenVerifier`]: crate::domain::ports::TokenVerifier

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::ports::CustomerClaims;
use crate::domain::{CustomerId, Error};

use super::state::HttpState;

/// Claims of the verified bearer token presented with the request.
#[derive(Debug, Clone)]
pub struct CustomerAuth(CustomerClaims);

impl CustomerAuth {
    pub fn claims(&self) -> &CustomerClaims {
        &self.0
    }

    pub fn customer_id(&self) -> &CustomerId {
        &self.0.customer_id
    }
}

impl FromRequest for CustomerAuth {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered on the app"))?;
            let authorization =
                authorization.ok_or_else(|| Error::unauthorized("Access token is missing"))?;
            let claims = state.tokens.verify(&authorization).await.map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                Error::from(err)
            })?;
            Ok(CustomerAuth(claims))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{AuthError, MockTokenVerifier};
    use crate::inbound::http::state::HttpStatePorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;
    use std::sync::Arc;

    fn whoami_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).route(
            "/whoami",
            web::get().to(|auth: CustomerAuth| async move {
                Ok::<_, Error>(HttpResponse::Ok().body(auth.customer_id().to_string()))
            }),
        )
    }

    #[actix_web::test]
    async fn verified_token_reaches_handler() {
        let app = test::init_service(whoami_app(HttpState::new(HttpStatePorts::default()))).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .insert_header((header::AUTHORIZATION, "Bearer CUST-9"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "CUST-9");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Bearer "))]
    #[actix_web::test]
    async fn absent_tokens_are_unauthorised(#[case] header_value: Option<&str>) {
        let app = test::init_service(whoami_app(HttpState::new(HttpStatePorts::default()))).await;
        let mut req = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header_value {
            req = req.insert_header((header::AUTHORIZATION, value));
        }

        let res = test::call_service(&app, req.to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Error = test::read_body_json(res).await;
        assert_eq!(body.code(), ErrorCode::Unauthorized);
    }

    #[actix_web::test]
    async fn verifier_failures_surface_as_unauthorised() {
        let mut tokens = MockTokenVerifier::new();
        tokens
            .expect_verify()
            .withf(|header: &str| header == "Bearer stale")
            .times(1)
            .returning(|_| Err(AuthError::expired()));
        let state = HttpState::new(HttpStatePorts {
            tokens: Arc::new(tokens),
            ..HttpStatePorts::default()
        });
        let app = test::init_service(whoami_app(state)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .insert_header((header::AUTHORIZATION, "Bearer stale"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Error = test::read_body_json(res).await;
        assert_eq!(body.message(), "token has expired");
    }
}
