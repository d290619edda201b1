//! End-to-end checks of the switchgear routes wired to the production
//! adapters: HS256 bearer verification and `printpdf` detail sheets.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use sha2::Sha256;
use zeroize::Zeroizing;

use switchgear_pm::Trace;
use switchgear_pm::domain::ports::FixtureDocumentStore;
use switchgear_pm::domain::{ConcurrencyPolicy, DocumentTreeStore, TableNames};
use switchgear_pm::inbound::http::configure;
use switchgear_pm::inbound::http::state::{DocumentServices, HttpState};
use switchgear_pm::outbound::auth::Hs256TokenVerifier;
use switchgear_pm::outbound::pdf::PrintPdfRenderer;

const SECRET: &[u8] = b"integration-secret";
/// 2100-01-01T00:00:00Z.
const FAR_FUTURE: i64 = 4_102_444_800;

fn sign(claims: &Value, secret: &[u8]) -> String {
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("hmac key");
    mac.update(format!("{header}.{payload}").as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{header}.{payload}.{signature}")
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[fixture]
fn valid_token() -> String {
    sign(
        &json!({"customer_id": "C1", "customerName": "Acme", "exp": FAR_FUTURE}),
        SECRET,
    )
}

fn app() -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let documents = DocumentTreeStore::new(
        Arc::new(FixtureDocumentStore::new()),
        TableNames::default(),
        ConcurrencyPolicy::OptimisticToken,
    );
    let state = HttpState::from_documents(DocumentServices {
        documents,
        tokens: Arc::new(Hs256TokenVerifier::new(
            Zeroizing::new(SECRET.to_vec()),
            Arc::new(DefaultClock),
        )),
        renderer: Arc::new(PrintPdfRenderer),
        clock: Arc::new(DefaultClock),
    });
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .configure(configure)
}

fn configuration() -> Value {
    json!({
        "configswitchgears": [{
            "id": "SG1",
            "name": "Main",
            "configuredCBs": [
                {"id": 7, "name": "Incomer", "serialNo": "S-7", "brand": "Acme"}
            ]
        }]
    })
}

#[rstest]
#[actix_web::test]
async fn signed_token_reaches_the_detail_sheet(valid_token: String) {
    let app = test::init_service(app()).await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/switchgearConfig/C1/Plant")
            .insert_header(bearer(&valid_token))
            .set_json(configuration())
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/cbDetails/C1/SG1/7/pdf")
            .insert_header(bearer(&valid_token))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("application/pdf")
    );
    let disposition = res
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .expect("content disposition")
        .to_owned();
    assert!(disposition.starts_with("attachment"));
    let body = test::read_body(res).await;
    assert!(body.starts_with(b"%PDF"));
}

#[rstest]
#[case::wrong_secret(sign(&json!({"customer_id": "C1", "exp": FAR_FUTURE}), b"other"))]
#[case::expired(sign(&json!({"customer_id": "C1", "exp": 1_000}), SECRET))]
#[case::no_customer(sign(&json!({"exp": FAR_FUTURE}), SECRET))]
#[case::opaque("C1".to_owned())]
#[actix_web::test]
async fn rejected_tokens_answer_401(#[case] token: String) {
    let app = test::init_service(app()).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/switchgearConfig/C1/SG1")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key("trace-id"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn unknown_breaker_sheet_is_not_found(valid_token: String) {
    let app = test::init_service(app()).await;
    test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/switchgearConfig/C1/Plant")
            .insert_header(bearer(&valid_token))
            .set_json(configuration())
            .to_request(),
    )
    .await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/cbDetails/C1/SG1/99/pdf")
            .insert_header(bearer(&valid_token))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
