//! The blocking client used from plain `#[test]` functions.

use mockserver_client::blocking::MockServerClient;
use mockserver_client::{ClientConfig, HttpRequest, HttpResponse, TimeToLive, VerificationTimes};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start the fake server on a runtime of its own; the blocking client
/// brings a separate one.
fn start_server(runtime: &tokio::runtime::Runtime, mocks: Vec<Mock>) -> MockServer {
    runtime.block_on(async {
        let server = MockServer::start().await;
        for mock in mocks {
            mock.mount(&server).await;
        }
        server
    })
}

fn client_for(server: &MockServer) -> MockServerClient {
    MockServerClient::with_config(
        ClientConfig::new("127.0.0.1", server.address().port())
            .with_status_check(2, Duration::from_millis(10)),
    )
    .unwrap()
}

#[test]
fn test_blocking_register_and_verify() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let failure = "Request not found at least 1 time, expected:<{ \"path\" : \"/orders\" }>";
    let server = start_server(
        &runtime,
        vec![
            Mock::given(method("PUT"))
                .and(path("/mockserver/expectation"))
                .and(body_partial_json(json!({
                    "httpRequest": {"method": "POST", "path": "/orders"},
                    "timeToLive": {
                        "timeUnit": "MILLISECONDS",
                        "timeToLive": 60000,
                        "unlimited": false
                    }
                })))
                .respond_with(ResponseTemplate::new(201))
                .expect(1),
            Mock::given(method("PUT"))
                .and(path("/mockserver/verify"))
                .respond_with(ResponseTemplate::new(406).set_body_string(failure)),
        ],
    );

    let client = client_for(&server);
    client
        .when(HttpRequest::post("/orders"))
        .time_to_live(TimeToLive::exactly(Duration::from_secs(60)))
        .respond(HttpResponse::new(201))
        .unwrap();

    let orders = HttpRequest::post("/orders");
    let err = client
        .verify(&orders, VerificationTimes::at_least(1))
        .unwrap_err();
    assert!(err.is_assertion());
    assert_eq!(err.to_string(), failure);
}

#[test]
fn test_blocking_status_check() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![Mock::given(method("PUT"))
            .and(path("/mockserver/status"))
            .respond_with(ResponseTemplate::new(200))],
    );

    assert!(client_for(&server).is_running());
}
