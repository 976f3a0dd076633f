//! End-to-end checks against a real MockServer.
//!
//! Start one first, e.g. `docker run -p 1080:1080 mockserver/mockserver`,
//! then run `cargo test -- --ignored`. `MOCKSERVER_PORT` overrides the port.

use mockserver_client::{
    ClientConfig, HttpRequest, HttpResponse, MockServerClient, Times, VerificationTimes,
};
use std::time::Duration;

fn live_client() -> MockServerClient {
    let port = std::env::var("MOCKSERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1080);
    MockServerClient::with_config(
        ClientConfig::new("localhost", port).with_status_check(5, Duration::from_millis(200)),
    )
    .expect("client")
}

#[tokio::test]
#[ignore = "requires running server"]
async fn test_expectation_served_and_verified() {
    let client = live_client();
    assert!(client.is_running().await, "MockServer is not running");
    client.reset().await.unwrap();

    client
        .when(HttpRequest::get("/live/hello"))
        .times(Times::exactly(2))
        .respond(HttpResponse::ok().with_body("hello"))
        .await
        .unwrap();

    let url = format!("http://localhost:{}/live/hello", client.config().port);
    let body = reqwest::get(&url).await.unwrap().text().await.unwrap();
    assert_eq!(body, "hello");

    let hello = HttpRequest::get("/live/hello");
    let err = client
        .verify(&hello, VerificationTimes::exactly(2))
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Request not found exactly 2 times"));

    client
        .verify(&hello, VerificationTimes::once())
        .await
        .unwrap();
    let recorded = client.retrieve_recorded_requests(None).await.unwrap();
    assert_eq!(recorded.len(), 1);
}
