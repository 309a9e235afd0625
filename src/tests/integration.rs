use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::AppConfig;
use crate::services::rate_service::ProviderKind;
use crate::utils::page::FETCH_FAILED;
use crate::utils::session::SessionSigner;

const SECRET: &str = "test-secret";

fn config(rates_api_url: &str, provider: ProviderKind, auth: bool) -> AppConfig {
    AppConfig {
        port: 0, // unused in tests
        external_timeout_ms: 2_000,
        provider,
        rates_api_url: rates_api_url.to_string(),
        auth_required: auth,
        secret_key: auth.then(|| SECRET.to_string()),
        database_url: None,
    }
}

async fn build_app(cfg: AppConfig) -> Router {
    let state = cfg.build_state().await.expect("state");
    crate::routes::router(state)
}

async fn usd_rates_mock() -> MockServer {
    let server = MockServer::start().await;

    // Rates fixture
    let rates = serde_json::json!({
        "result": "success",
        "base_code": "USD",
        "rates": { "USD": 1.0, "EUR": 0.92, "GBP": 0.79, "JPY": 149.5, "BTC": 0.000016 }
    });

    Mock::given(method("GET"))
        .and(path("/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rates))
        .mount(&server)
        .await;

    server
}

fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().uri(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::empty()).unwrap()
}

async fn body_text(resp: Response) -> String {
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `name=value` part of the Set-Cookie header.
fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

#[tokio::test]
async fn converts_usd_to_eur() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app
        .oneshot(form_post("/", "base_currency=USD&target_currency=EUR&amount=100", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("$100 USD = €92.00 EUR"), "{}", html);
}

#[tokio::test]
async fn unknown_symbol_still_renders() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app
        .oneshot(form_post("/", "base_currency=USD&target_currency=BTC&amount=1000", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("= 0.02 BTC"), "{}", html);
}

#[tokio::test]
async fn unknown_target_is_a_domain_error_not_a_fetch_error() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app
        .oneshot(form_post("/", "base_currency=USD&target_currency=ZZZ&amount=100", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Invalid target currency: ZZZ"));
    assert!(!html.contains(FETCH_FAILED));
    assert!(!html.contains("class=\"result\""));
}

#[tokio::test]
async fn provider_error_status_renders_fetch_failure() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock)
        .await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app
        .oneshot(form_post("/", "base_currency=USD&target_currency=EUR&amount=1", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(FETCH_FAILED));
}

#[tokio::test]
async fn unreachable_provider_renders_fetch_failure() {
    // grab a free port, then close it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = format!("http://127.0.0.1:{}", port);
    let app = build_app(config(&url, ProviderKind::OpenErApi, false)).await;

    let resp = app
        .oneshot(form_post("/", "base_currency=USD&target_currency=EUR&amount=1", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains(FETCH_FAILED));
}

#[tokio::test]
async fn exchangerate_api_failure_result_renders_fetch_failure() {
    let mock = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/key/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "error",
            "error-type": "quota-reached"
        })))
        .mount(&mock)
        .await;
    let kind = ProviderKind::ExchangeRateApi { api_key: "key".into() };
    let app = build_app(config(&mock.uri(), kind, false)).await;

    let resp = app
        .oneshot(form_post("/", "base_currency=USD&target_currency=EUR&amount=1", None))
        .await
        .unwrap();
    assert!(body_text(resp).await.contains(FETCH_FAILED));
}

#[tokio::test]
async fn bad_input_is_a_400() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app
        .clone()
        .oneshot(form_post("/", "base_currency=USD&target_currency=EUR&amount=lots", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Invalid input"));

    let resp = app
        .oneshot(form_post("/", "base_currency=USD&amount=5", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("target_currency is required"));
}

fn json_post_with(body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    req.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn json_api_malformed_body_is_a_400_not_a_422() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app
        .clone()
        .oneshot(json_post_with(r#"{"base_currency":"USD","target_currency":"EUR"}"#, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let j: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(j["error"].as_str(), Some("Validation failed"));
    assert!(j["details"].as_str().unwrap_or_default().contains("amount"));

    let resp = app
        .oneshot(json_post_with(
            r#"{"base_currency":"USD","target_currency":"EUR","amount":"ten"}"#,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn overflowing_amount_is_rejected_as_input() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app
        .clone()
        .oneshot(form_post("/", "base_currency=USD&target_currency=JPY&amount=1e307", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let html = body_text(resp).await;
    assert!(html.contains("too large"), "{}", html);
    assert!(!html.contains("class=\"result\""));

    let resp = app
        .oneshot(json_post_with(
            r#"{"base_currency":"USD","target_currency":"JPY","amount":1e307}"#,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_form_body_is_a_400_page() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("USD EUR 100"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Invalid input"));
}

#[tokio::test]
async fn gate_runs_before_body_parsing() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, true)).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/convert")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("USD EUR 100"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = app
        .oneshot(json_post_with(r#"{"base_currency":"USD"}"#, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_cookie_for_unknown_account_is_logged_out() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, true)).await;

    // correctly signed, but the store has no such user (e.g. lost on restart)
    let set_cookie = SessionSigner::new(SECRET).unwrap().set_cookie("ghost");
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let resp = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let resp = app
        .clone()
        .oneshot(form_post(
            "/convert",
            "base_currency=USD&target_currency=EUR&amount=1",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/login");

    let resp = app
        .oneshot(json_post_with(
            r#"{"base_currency":"USD","target_currency":"EUR","amount":1}"#,
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn json_api_contract() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let json_post = |body: serde_json::Value| {
        Request::builder()
            .method("POST")
            .uri("/api/convert")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };

    let resp = app
        .clone()
        .oneshot(json_post(serde_json::json!({
            "base_currency": "USD", "target_currency": "EUR", "amount": 100.0
        })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let j: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(j["converted_amount"].as_f64(), Some(92.0));
    assert_eq!(j["target_symbol"].as_str(), Some("€"));

    let resp = app
        .clone()
        .oneshot(json_post(serde_json::json!({
            "base_currency": "USD", "target_currency": "ZZZ", "amount": 1.0
        })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // no mock for GBP as base
    let resp = app
        .oneshot(json_post(serde_json::json!({
            "base_currency": "GBP", "target_currency": "USD", "amount": 1.0
        })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn login_gate_lifecycle() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, true)).await;

    // anonymous visitors are sent to the login page
    let resp = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    let resp = app
        .clone()
        .oneshot(form_post("/convert", "base_currency=USD&target_currency=EUR&amount=1", None))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/login");

    // register
    let resp = app
        .clone()
        .oneshot(form_post("/register", "username=alice&password=pw1", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    // duplicate is rejected and does not replace the password
    let resp = app
        .clone()
        .oneshot(form_post("/register", "username=alice&password=pw2", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Username already exists"));

    // wrong password: no session
    let resp = app
        .clone()
        .oneshot(form_post("/login", "username=alice&password=pw2", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(resp).await.contains("Invalid username or password"));

    // right password
    let resp = app
        .clone()
        .oneshot(form_post("/login", "username=alice&password=pw1", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let cookie = session_cookie(&resp).expect("session cookie");

    let resp = app.clone().oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Signed in as alice"));

    let resp = app
        .clone()
        .oneshot(form_post(
            "/convert",
            "base_currency=USD&target_currency=EUR&amount=100",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("€92.00 EUR"));

    // logout clears the cookie and the gate closes again
    let resp = app.clone().oneshot(get("/logout", Some(&cookie))).await.unwrap();
    assert_eq!(location(&resp), "/login");
    let cleared = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cleared.contains("Max-Age=0"));
    let cleared = cleared.split(';').next().unwrap_or_default().to_string();

    let resp = app.oneshot(get("/", Some(&cleared))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn forged_cookie_does_not_pass_the_gate() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, true)).await;

    let resp = app
        .clone()
        .oneshot(get("/", Some("session=alice.deadbeef")))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/login");

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/convert")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, "session=alice")
                .body(Body::from(
                    r#"{"base_currency":"USD","target_currency":"EUR","amount":1}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_routes_absent_without_gate() {
    let mock = usd_rates_mock().await;
    let app = build_app(config(&mock.uri(), ProviderKind::OpenErApi, false)).await;

    let resp = app.clone().oneshot(get("/login", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("action=\"/\""));

    let resp = app.oneshot(get("/healthz", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
