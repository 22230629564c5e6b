//! Dispatch layer end-to-end: encoding, headers, retry counts, classification.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use findata_sdk::prelude::*;
use findata_sdk::transport::HttpMethod;
use findata_sdk::ApiError;

fn factory_for(server_uri: &str, registry: Arc<RetryPolicyRegistry>) -> ApiClientFactory {
    let configuration =
        ApiConfiguration::new(server_uri).with_personal_access_token("test-token");
    ApiClientFactory::with_registry(configuration, registry).unwrap()
}

async fn mount_echo_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn pre_encoded_path_values_are_double_encoded_on_the_wire() {
    let cases = [
        ("prefix-%2F-suffix", "/prefix-%252F-suffix"),
        ("prefix-+-suffix", "/prefix-%2B-suffix"),
        ("prefix- -suffix", "/prefix-%20-suffix"),
        ("prefix-%24-suffix", "/prefix-%2524-suffix"),
    ];

    for (raw, expected_path) in cases {
        let server = MockServer::start().await;
        mount_echo_ok(&server).await;
        let factory = factory_for(&server.uri(), Arc::new(RetryPolicyRegistry::new()));

        factory
            .client()
            .execute(
                HttpMethod::Get,
                "/{arg}",
                RequestOptions::new().with_path_param("arg", raw),
            )
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.path(), expected_path, "input {raw:?}");
    }
}

#[tokio::test]
async fn bearer_token_and_application_name_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/portfolios"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("X-Findata-Application", "portfolio-loader"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let configuration = ApiConfiguration::new(server.uri())
        .with_personal_access_token("test-token")
        .with_application_name("portfolio-loader");
    let factory =
        ApiClientFactory::with_registry(configuration, Arc::new(RetryPolicyRegistry::new()))
            .unwrap();

    factory
        .client()
        .execute(HttpMethod::Get, "/api/portfolios", RequestOptions::new())
        .await
        .unwrap();
}

#[tokio::test]
async fn application_header_absent_when_no_name_configured() {
    let server = MockServer::start().await;
    mount_echo_ok(&server).await;
    let factory = factory_for(&server.uri(), Arc::new(RetryPolicyRegistry::new()));

    factory
        .client()
        .execute(HttpMethod::Get, "/api/portfolios", RequestOptions::new())
        .await
        .unwrap();

    let request = &server.received_requests().await.unwrap()[0];
    assert!(request.headers.get("X-Findata-Application").is_none());
}

#[tokio::test]
async fn sustained_rate_limiting_uses_the_default_budget_then_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/portfolios"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3) // 1 attempt + 2 default retries
        .mount(&server)
        .await;

    let factory = factory_for(&server.uri(), Arc::new(RetryPolicyRegistry::new()));

    let error = factory
        .client()
        .execute(HttpMethod::Get, "/api/portfolios", RequestOptions::new())
        .await
        .unwrap_err();

    assert!(error.is_rate_limited());
    assert_eq!(error.status_code(), Some(429));
}

#[tokio::test]
async fn per_call_rate_limit_override_of_one_gives_two_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let registry = Arc::new(RetryPolicyRegistry::new());
    registry.set_async_policy(RetryPolicy::no_delay());
    let factory = factory_for(&server.uri(), registry);

    let error = factory
        .client()
        .execute(
            HttpMethod::Get,
            "/api/portfolios",
            RequestOptions::new().with_rate_limit_retries(1),
        )
        .await
        .unwrap_err();

    assert!(error.is_rate_limited());
}

#[tokio::test]
async fn error_body_yields_problem_details_and_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "name": "PortfolioNotFound",
            "code": 110,
            "detail": "Portfolio Main/missing not found",
            "instance": format!("{}/app/insights/logs/0HMVIKHDKKOO1:00000002", server.uri()),
        })))
        .mount(&server)
        .await;

    let factory = factory_for(&server.uri(), Arc::new(RetryPolicyRegistry::new()));

    let error = factory
        .client()
        .execute(
            HttpMethod::Get,
            "/api/portfolios/{scope}/{code}",
            RequestOptions::new()
                .with_operation("GetPortfolio")
                .with_path_param("scope", "Main")
                .with_path_param("code", "missing"),
        )
        .await
        .unwrap_err();

    let api_error = match error {
        SdkError::Api(api_error) => api_error,
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(api_error.status, 404);
    let details = api_error.problem_details().unwrap();
    assert_eq!(details.name, "PortfolioNotFound");
    assert_eq!(details.code, Some(110));
    assert_eq!(
        api_error.request_id().as_deref(),
        Some("0HMVIKHDKKOO1:00000002")
    );
}

#[test]
fn malformed_error_body_never_raises_during_extraction() {
    let error = ApiError::new(123, "Some Critical Exception")
        .with_error_content("<Some Invalid Json>");
    assert!(error.problem_details().is_none());
    assert!(error.request_id().is_none());
}

#[tokio::test]
async fn per_call_timeout_aborts_as_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let registry = Arc::new(RetryPolicyRegistry::new());
    registry.set_async_policy(RetryPolicy::no_delay().with_transient_retries(0));
    let factory = factory_for(&server.uri(), registry);

    let error = factory
        .client()
        .execute(
            HttpMethod::Get,
            "/api/portfolios",
            RequestOptions::new().with_timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, SdkError::Transport(_)));
    assert_eq!(error.status_code(), None);
}

#[test]
fn blocking_client_round_trips_against_a_live_server() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": {"scope": "Main", "code": "uk-equity"},
                "displayName": "UK Equity"
            })))
            .mount(&server)
            .await;
        server
    });

    let factory = factory_for(&server.uri(), Arc::new(RetryPolicyRegistry::new()));
    let client = factory.blocking_client().unwrap();

    let portfolio: findata_sdk::api::Portfolio = client
        .execute_json(
            HttpMethod::Get,
            "/api/portfolios/{scope}/{code}",
            RequestOptions::new()
                .with_path_param("scope", "Main")
                .with_path_param("code", "uk-equity"),
        )
        .unwrap();

    assert_eq!(portfolio.display_name, "UK Equity");
}
