//! Integration tests for the REST client request pipeline.
//!
//! Each test runs against a local mock server standing in for the shop.

use std::time::{Duration, Instant};

use serde_json::json;
use shopify_client::{
    AccessToken, ApiKey, ApiPassword, ApiSecretKey, ClientConfig, ClientConfigBuilder, ErrorSet,
    HttpError, HttpMethod, PrivateAppAuth, PublicAppAuth, RequestOptions, RestClient, RestError,
    ShopDomain,
};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PREFIX: &str = "/admin/api/2024-10";

fn builder(server: &MockServer) -> ClientConfigBuilder {
    ClientConfig::builder()
        .shop(ShopDomain::new("test-shop").unwrap())
        .api_version("2024-10".parse().unwrap())
        .api_host(server.uri())
        .rate_limit_delay(Duration::from_millis(1), Duration::from_millis(5))
}

fn public_auth() -> PublicAppAuth {
    PublicAppAuth::new(
        ApiKey::new("test-key").unwrap(),
        ApiSecretKey::new("test-secret").unwrap(),
        AccessToken::new("shpat_test").unwrap(),
    )
}

fn client(server: &MockServer) -> RestClient<PublicAppAuth> {
    RestClient::new(&builder(server).build().unwrap(), public_auth()).unwrap()
}

// ============================================================================
// Verbs
// ============================================================================

#[tokio::test]
async fn test_get_returns_decoded_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products/632910392.json")))
        .and(header("x-shopify-access-token", "shpat_test"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"product": {"id": 632_910_392}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let body = assert_ok!(client.get("products/632910392", None).await);

    assert_eq!(body["product"]["id"], 632_910_392);
    assert!(!client.has_errors());
    assert_eq!(client.last_response().map(|r| r.code), Some(200));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{PREFIX}/products.json")))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"product": {"title": "Hat"}})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"product": {"id": 1, "title": "Hat"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let body = assert_ok!(
        client
            .post("/products.json", json!({"product": {"title": "Hat"}}), None)
            .await
    );
    assert_eq!(body["product"]["title"], "Hat");
}

#[tokio::test]
async fn test_put_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{PREFIX}/products/1.json")))
        .and(body_json(json!({"product": {"title": "Cap"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"product": {"id": 1}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{PREFIX}/products/1.json")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    assert_ok!(
        client
            .put("products/1", json!({"product": {"title": "Cap"}}), None)
            .await
    );
    let deleted = assert_ok!(client.delete("products/1", None).await);

    // An empty body decodes to an empty object.
    assert_eq!(deleted, json!({}));
}

#[tokio::test]
async fn test_private_app_does_not_send_access_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"shop": {}})))
        .mount(&server)
        .await;

    let auth = PrivateAppAuth::new(
        ApiKey::new("key").unwrap(),
        ApiPassword::new("pass").unwrap(),
        ApiSecretKey::new("secret").unwrap(),
    );
    let mut client = RestClient::new(&builder(&server).build().unwrap(), auth).unwrap();
    assert_ok!(client.get("shop", None).await);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0]
        .headers
        .keys()
        .any(|name| name.as_str() == "x-shopify-access-token"));
}

#[tokio::test]
async fn test_request_headers_and_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/orders.json")))
        .and(header("x-app-name", "sync"))
        .and(header("x-request-tag", "nightly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orders": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = builder(&server)
        .default_header("X-App-Name", "sync")
        .build()
        .unwrap();
    let mut client = RestClient::new(&config, public_auth()).unwrap();
    let options = RequestOptions::new().header("X-Request-Tag", "nightly");
    assert_ok!(client.get("orders", Some(options)).await);
}

#[tokio::test]
async fn test_caller_accept_header_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(409))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/themes/1/assets.json")))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"asset": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let options = RequestOptions::new().header("Accept", "text/plain");
    assert_ok!(client.get("themes/1/assets", Some(options)).await);
}

#[tokio::test]
async fn test_invalid_path_is_rejected_before_dispatch() {
    let server = MockServer::start().await;
    let mut client = client(&server);

    let error = assert_err!(client.get("products?limit=5", None).await);
    assert!(matches!(error, RestError::InvalidPath { .. }));

    let error = assert_err!(client.get("https://other.example/products", None).await);
    assert!(matches!(error, RestError::InvalidPath { .. }));

    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Query handling
// ============================================================================

#[tokio::test]
async fn test_page_info_strips_disallowed_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&server)
        .await;

    let mut client = client(&server);
    let options = RequestOptions::new()
        .query_param("page_info", "abc")
        .query_param("vendor", "x")
        .query_param("limit", 10);
    assert_ok!(client.get("products", Some(options)).await);

    let requests = server.received_requests().await.unwrap();
    let mut pairs: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    assert_eq!(
        pairs,
        vec![
            ("limit".to_string(), "10".to_string()),
            ("page_info".to_string(), "abc".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_query_params_pass_through_without_page_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products.json")))
        .and(query_param("vendor", "Acme"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let options = RequestOptions::new()
        .query_param("vendor", "Acme")
        .query_param("limit", 10);
    assert_ok!(client.get("products", Some(options)).await);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_validation_failure_surfaces_error_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{PREFIX}/products.json")))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"errors": {"title": ["can't be blank"]}})),
        )
        .mount(&server)
        .await;

    let mut client = client(&server);
    let error = assert_err!(client.post("products", json!({"product": {}}), None).await);

    assert_eq!(error.status(), Some(422));
    let RestError::Http(HttpError::RequestFailed(failed)) = &error else {
        panic!("expected RequestFailed, got {error:?}");
    };
    assert_eq!(failed.code, 422);
    assert_eq!(
        failed.errors.as_ref().map(ErrorSet::messages),
        Some(vec!["title can't be blank".to_string()])
    );

    assert!(client.has_errors());
    assert!(matches!(client.errors(), Some(ErrorSet::Fields(_))));
    assert_eq!(client.last_response().map(|r| r.code), Some(422));
}

#[tokio::test]
async fn test_success_clears_previous_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products/404.json")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"errors": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products/1.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"product": {"id": 1}})))
        .mount(&server)
        .await;

    let mut client = client(&server);
    assert_err!(client.get("products/404", None).await);
    assert!(client.has_errors());
    assert_eq!(
        client.errors(),
        Some(&ErrorSet::Message("Not Found".to_string()))
    );

    assert_ok!(client.get("products/1", None).await);
    assert!(!client.has_errors());
    assert!(client.errors().is_none());
}

#[tokio::test]
async fn test_missing_scope_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/orders.json")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": "[API] This action requires merchant approval for read_orders scope."
        })))
        .mount(&server)
        .await;

    let mut client = client(&server);
    let error = assert_err!(client.get("orders", None).await);

    let RestError::Http(HttpError::MissingScope(missing)) = &error else {
        panic!("expected MissingScope, got {error:?}");
    };
    assert_eq!(missing.scopes, vec!["read_orders".to_string()]);
    assert_eq!(missing.code(), 403);
    assert_eq!(error.status(), Some(403));
}

#[tokio::test]
async fn test_transport_failure_clears_last_response() {
    let config = ClientConfig::builder()
        .shop(ShopDomain::new("test-shop").unwrap())
        .api_host("http://127.0.0.1:1")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    let mut client = RestClient::new(&config, public_auth()).unwrap();

    let error = assert_err!(client.get("shop", None).await);
    let RestError::Http(HttpError::Transport(transport)) = &error else {
        panic!("expected Transport, got {error:?}");
    };
    assert_eq!(transport.method, HttpMethod::Get);
    assert_eq!(transport.resource, "shop.json");
    assert_eq!(error.status(), None);
    assert!(client.last_response().is_none());
}

#[tokio::test]
async fn test_server_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("Retry-After", "1")
                .set_body_json(json!({"errors": "Service Unavailable"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client(&server);
    let error = assert_err!(client.get("shop", None).await);
    assert_eq!(error.status(), Some(503));
    assert_eq!(
        client.last_response().and_then(|r| r.retry_after()),
        Some(Duration::from_secs(1))
    );
}

// ============================================================================
// Call limit
// ============================================================================

#[tokio::test]
async fn test_call_limit_at_threshold_is_reached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-Shop-Api-Call-Limit", "80/100")
                .set_body_json(json!({"shop": {}})),
        )
        .mount(&server)
        .await;

    let mut client = client(&server);
    assert_ok!(client.get("shop", None).await);

    assert!((client.call_limit() - 0.8).abs() < f64::EPSILON);
    assert!(client.call_limit_reached());
    assert_eq!(client.api_call_limit().used, 80);
    assert_eq!(client.api_call_limit().capacity, 100);
}

#[tokio::test]
async fn test_call_limit_below_threshold_is_not_reached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-Shop-Api-Call-Limit", "79/100")
                .set_body_json(json!({"shop": {}})),
        )
        .mount(&server)
        .await;

    let mut client = client(&server);
    assert_ok!(client.get("shop", None).await);
    assert!(!client.call_limit_reached());
}

#[tokio::test]
async fn test_missing_call_limit_header_resets_to_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-Shop-Api-Call-Limit", "39/40")
                .set_body_json(json!({"shop": {}})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/products.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
        .mount(&server)
        .await;

    let mut client = client(&server);
    assert_ok!(client.get("shop", None).await);
    assert!(client.call_limit_reached());

    assert_ok!(client.get("products", None).await);
    assert!(client.call_limit().abs() < f64::EPSILON);
    assert!(!client.call_limit_reached());
}

#[tokio::test]
async fn test_call_after_threshold_is_delayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-Shop-Api-Call-Limit", "36/40")
                .set_body_json(json!({"shop": {}})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let config = builder(&server)
        .rate_limit_delay(Duration::from_millis(50), Duration::from_millis(60))
        .build()
        .unwrap();
    let mut client = RestClient::new(&config, public_auth()).unwrap();

    assert_ok!(client.get("shop", None).await);
    let started = Instant::now();
    assert_ok!(client.get("shop", None).await);
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_disabled_rate_limit_still_tracks_call_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-Shop-Api-Call-Limit", "40/40")
                .set_body_json(json!({"shop": {}})),
        )
        .mount(&server)
        .await;

    let config = builder(&server)
        .rate_limit_enabled(false)
        .rate_limit_delay(Duration::from_secs(30), Duration::from_secs(30))
        .build()
        .unwrap();
    let mut client = RestClient::new(&config, public_auth()).unwrap();

    assert_ok!(client.get("shop", None).await);
    assert!(client.call_limit_reached());

    // A 30s sleep here would trip the timeout.
    let second = tokio::time::timeout(Duration::from_secs(5), client.get("shop", None)).await;
    assert!(second.is_ok());
}

// ============================================================================
// Response handling
// ============================================================================

#[tokio::test]
async fn test_json_mode_off_returns_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(409))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/themes/1/assets.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{% layout none %}"))
        .mount(&server)
        .await;

    let config = builder(&server).json(false).build().unwrap();
    let mut client = RestClient::new(&config, public_auth()).unwrap();
    let body = assert_ok!(client.get("themes/1/assets", None).await);

    assert_eq!(body, json!("{% layout none %}"));
}

#[tokio::test]
async fn test_unparseable_json_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut client = client(&server);
    let body = assert_ok!(client.get("shop", None).await);
    assert_eq!(body, json!("not json"));
}

#[tokio::test]
async fn test_deprecation_header_is_exposed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{PREFIX}/shop.json")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Shopify-API-Deprecated-Reason", "https://shopify.dev/changelog")
                .insert_header("X-Request-Id", "req-123")
                .set_body_json(json!({"shop": {}})),
        )
        .mount(&server)
        .await;

    let mut client = client(&server);
    assert_ok!(client.get("shop", None).await);

    let response = client.last_response().unwrap();
    assert_eq!(
        response.deprecation_reason(),
        Some("https://shopify.dev/changelog")
    );
    assert_eq!(response.request_id(), Some("req-123"));
}

#[tokio::test]
async fn test_unversioned_client_uses_admin_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/oauth/access_scopes.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_scopes": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = builder(&server).unversioned().build().unwrap();
    let mut client = RestClient::new(&config, public_auth()).unwrap();
    assert_ok!(client.get("oauth/access_scopes", None).await);
}
