//! Async client for the MockServer REST API.

use crate::chain::ForwardChainExpectation;
use crate::codec;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::model::{
    ClearType, Expectation, HttpRequest, Ports, RetrieveType, Verification, VerificationSequence,
    VerificationTimes,
};
use crate::path::{is_blank, is_empty_slice};
use reqwest::header::{CONTENT_TYPE, HOST};
use reqwest::{Client, Method, StatusCode};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Status and fully read body of a control endpoint reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerResponse {
    pub status: u16,
    pub body: String,
}

impl ServerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for a MockServer instance.
///
/// The underlying [`reqwest::Client`] is safe to share, so a single
/// `MockServerClient` can serve concurrent calls without extra locking.
#[derive(Debug, Clone)]
pub struct MockServerClient {
    http: Client,
    config: ClientConfig,
}

impl MockServerClient {
    /// Create a client for the server at `host:port` with default settings.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::with_config(ClientConfig::new(host, port))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { http, config })
    }

    /// Use an existing transport, e.g. one shared with the code under test.
    pub fn with_http_client(config: ClientConfig, http: Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn http_client(&self) -> &Client {
        &self.http
    }

    /// Send a request to a control endpoint and read the whole reply.
    ///
    /// A `400 Bad Request` reply is turned into [`ClientError::Protocol`]
    /// carrying the server's explanation.
    pub async fn send_request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<ServerResponse> {
        let url = self.config.endpoint_url(endpoint);
        debug!("MockServer: {} {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .header(HOST, self.config.host_header());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::BAD_REQUEST {
            let message = if is_blank(&body) {
                format!("{endpoint} rejected the request with 400 Bad Request")
            } else {
                body
            };
            return Err(ClientError::protocol(Some(status.as_u16()), message));
        }

        Ok(ServerResponse {
            status: status.as_u16(),
            body,
        })
    }

    async fn put(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<ServerResponse> {
        self.send_request(Method::PUT, endpoint, query, body).await
    }

    /// Start building an expectation for `request`.
    ///
    /// Defaults: unlimited times, no expiry, priority 0.
    ///
    /// ```no_run
    /// # async fn run() -> mockserver_client::Result<()> {
    /// use mockserver_client::{HttpRequest, HttpResponse, MockServerClient, Times};
    ///
    /// let client = MockServerClient::new("localhost", 1080)?;
    /// client
    ///     .when(HttpRequest::get("/hello"))
    ///     .times(Times::exactly(2))
    ///     .respond(HttpResponse::ok().with_body("hello"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn when(&self, request: HttpRequest) -> ForwardChainExpectation<'_> {
        ForwardChainExpectation::new(self, request)
    }

    /// Register one expectation. The server must answer `201 Created`.
    pub async fn send_expectation(&self, expectation: &Expectation) -> Result<()> {
        let json = codec::to_json(expectation)?;
        let response = self.put("/expectation", &[], Some(json)).await?;
        if response.status != StatusCode::CREATED.as_u16() {
            return Err(ClientError::protocol(
                Some(response.status),
                format!(
                    "Failed to send expectation, server returned status {}: {}",
                    response.status, response.body
                ),
            ));
        }
        info!(
            "Registered expectation for {} {}",
            expectation.http_request.method.as_deref().unwrap_or("*"),
            expectation.http_request.path.as_deref().unwrap_or("*")
        );
        Ok(())
    }

    /// Register expectations one by one, stopping at the first failure.
    pub async fn send_expectations(&self, expectations: &[Expectation]) -> Result<()> {
        for expectation in expectations {
            self.send_expectation(expectation).await?;
        }
        Ok(())
    }

    /// Remove all expectations and recorded requests.
    pub async fn reset(&self) -> Result<()> {
        self.put("/reset", &[], None).await?;
        info!("Reset MockServer at {}", self.config.host_header());
        Ok(())
    }

    /// Remove expectations and recorded requests matching `request`, or
    /// everything when `None`.
    pub async fn clear(&self, request: Option<&HttpRequest>) -> Result<()> {
        let body = request.map(codec::to_json).transpose()?;
        self.put("/clear", &[], body).await?;
        Ok(())
    }

    /// Like [`clear`](Self::clear), limited to expectations or to the log.
    pub async fn clear_with_type(
        &self,
        request: Option<&HttpRequest>,
        clear_type: ClearType,
    ) -> Result<()> {
        let body = request.map(codec::to_json).transpose()?;
        let query = [("type", clear_type.as_str())];
        self.put("/clear", &query, body).await?;
        Ok(())
    }

    /// Assert that `request` was received the number of times given by `times`.
    ///
    /// A failed verification returns [`ClientError::Assertion`] carrying the
    /// server's description, e.g. `Request not found exactly 2 times ...`.
    pub async fn verify(&self, request: &HttpRequest, times: VerificationTimes) -> Result<()> {
        if !times.is_satisfiable() {
            return Err(ClientError::Argument(format!(
                "verification bounds can never be met: at least {} and at most {:?}",
                times.at_least, times.at_most
            )));
        }
        let json = codec::to_json(&Verification::new(request.clone(), times))?;
        let response = self.put("/verify", &[], Some(json)).await?;
        verification_result(response)
    }

    /// Assert that `requests` were received in this order.
    pub async fn verify_sequence(&self, requests: &[HttpRequest]) -> Result<()> {
        if is_empty_slice(requests) {
            return Err(ClientError::Argument(
                "verify_sequence requires at least one request".to_string(),
            ));
        }
        let json = codec::to_json(&VerificationSequence::new(requests.to_vec()))?;
        let response = self.put("/verifySequence", &[], Some(json)).await?;
        verification_result(response)
    }

    /// Assert that the server received no requests at all.
    pub async fn verify_zero_interactions(&self) -> Result<()> {
        let anything = HttpRequest::new();
        self.verify(&anything, VerificationTimes::never()).await
    }

    async fn retrieve(&self, request: Option<&HttpRequest>, kind: RetrieveType) -> Result<String> {
        let body = request.map(codec::to_json).transpose()?;
        let query = [("type", kind.as_str()), ("format", "JSON")];
        let response = self.put("/retrieve", &query, body).await?;
        Ok(response.body)
    }

    /// Requests recorded by the server, optionally filtered by `request`.
    pub async fn retrieve_recorded_requests(
        &self,
        request: Option<&HttpRequest>,
    ) -> Result<Vec<HttpRequest>> {
        let body = self.retrieve(request, RetrieveType::Requests).await?;
        Ok(codec::from_json_array(&body)?)
    }

    /// Expectations currently active on the server.
    pub async fn retrieve_active_expectations(
        &self,
        request: Option<&HttpRequest>,
    ) -> Result<Vec<Expectation>> {
        let body = self
            .retrieve(request, RetrieveType::ActiveExpectations)
            .await?;
        Ok(codec::from_json_array(&body)?)
    }

    /// Expectations recorded while the server was proxying.
    pub async fn retrieve_recorded_expectations(
        &self,
        request: Option<&HttpRequest>,
    ) -> Result<Vec<Expectation>> {
        let body = self
            .retrieve(request, RetrieveType::RecordedExpectations)
            .await?;
        Ok(codec::from_json_array(&body)?)
    }

    /// Server log messages, returned as the raw reply body.
    pub async fn retrieve_log_messages(&self, request: Option<&HttpRequest>) -> Result<String> {
        self.retrieve(request, RetrieveType::Logs).await
    }

    /// Poll `/status` using the configured [`status_check`](ClientConfig::status_check) policy.
    pub async fn is_running(&self) -> bool {
        let policy = self.config.status_check;
        self.is_running_with(policy.attempts, policy.interval).await
    }

    /// Poll `/status` up to `attempts` times, `interval` apart.
    ///
    /// Returns `true` on the first `200 OK`. Transport failures end polling
    /// with `false` instead of an error.
    pub async fn is_running_with(&self, attempts: u32, interval: Duration) -> bool {
        for attempt in 1..=attempts {
            match self.put("/status", &[], None).await {
                Ok(response) if response.status == StatusCode::OK.as_u16() => return true,
                Ok(response) => debug!(
                    "Status check {}/{} returned {}",
                    attempt, attempts, response.status
                ),
                Err(e) => {
                    debug!("Status check failed: {}", e);
                    return false;
                }
            }
            if attempt < attempts {
                tokio::time::sleep(interval).await;
            }
        }
        false
    }

    /// Stop the server, propagating a failed stop request.
    pub async fn stop(&self) -> Result<()> {
        self.stop_with(false).await
    }

    /// Ask the server to shut down and wait, bounded by
    /// [`stop_poll`](ClientConfig::stop_poll), until it stops answering.
    pub async fn stop_with(&self, ignore_failure: bool) -> Result<()> {
        if let Err(e) = self.put("/stop", &[], None).await {
            if ignore_failure {
                warn!(
                    "Failed to stop MockServer at {}: {}",
                    self.config.host_header(),
                    e
                );
                return Ok(());
            }
            return Err(ClientError::protocol(
                e.status(),
                format!("Failed to stop MockServer: {e}"),
            ));
        }

        let policy = self.config.stop_poll;
        for attempt in 1..=policy.attempts {
            if !self.is_running_with(1, Duration::ZERO).await {
                info!("Stopped MockServer at {}", self.config.host_header());
                return Ok(());
            }
            if attempt < policy.attempts {
                tokio::time::sleep(policy.interval).await;
            }
        }
        warn!(
            "MockServer at {} still running after {} checks",
            self.config.host_header(),
            policy.attempts
        );
        Ok(())
    }

    /// Ask the server to listen on additional ports; `0` picks a free one.
    pub async fn bind(&self, ports: &[u16]) -> Result<Ports> {
        let json = codec::to_json(&Ports {
            ports: ports.to_vec(),
        })?;
        let response = self.put("/bind", &[], Some(json)).await?;
        if !response.is_success() {
            return Err(ClientError::protocol(
                Some(response.status),
                format!("Failed to bind ports {ports:?}: {}", response.body),
            ));
        }
        Ok(codec::from_json(&response.body)?)
    }

    /// Read a JSON array of expectations from `path` and register each one.
    ///
    /// The file is read and parsed before any request is sent.
    pub async fn load_expectations_from_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<Expectation>> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ClientError::ExpectationFile {
                path: path.to_path_buf(),
                source,
            })?;
        let expectations: Vec<Expectation> = codec::from_json_array(&contents)?;
        self.send_expectations(&expectations).await?;
        info!(
            "Loaded {} expectations from {}",
            expectations.len(),
            path.display()
        );
        Ok(expectations)
    }
}

/// `/verify*` answers with an empty body on success and a description otherwise.
fn verification_result(response: ServerResponse) -> Result<()> {
    if is_blank(&response.body) {
        Ok(())
    } else {
        Err(ClientError::Assertion(response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ServerResponse {
        ServerResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_empty_verification_body_passes() {
        assert!(verification_result(response(202, "")).is_ok());
        assert!(verification_result(response(202, " \n")).is_ok());
    }

    #[test]
    fn test_verification_body_is_assertion() {
        let err = verification_result(response(
            406,
            "Request not found exactly 2 times, expected:<{...}> but was:<{...}>",
        ))
        .unwrap_err();
        assert!(err.is_assertion());
        let message = err.to_string();
        assert!(message.starts_with("Request not found exactly 2 times"));
    }

    #[test]
    fn test_server_response_success_range() {
        assert!(response(201, "").is_success());
        assert!(!response(404, "").is_success());
    }

    #[tokio::test]
    async fn test_verify_sequence_rejects_empty_input_before_network() {
        // Nothing listens on port 9; the argument check must fire first.
        let client = MockServerClient::new("127.0.0.1", 9).unwrap();
        let err = client.verify_sequence(&[]).await.unwrap_err();
        assert!(matches!(err, ClientError::Argument(_)));
    }

    #[tokio::test]
    async fn test_verify_rejects_impossible_bounds_before_network() {
        let client = MockServerClient::new("127.0.0.1", 9).unwrap();
        let err = client
            .verify(&HttpRequest::get("/x"), VerificationTimes::between(3, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Argument(_)));
    }

    #[tokio::test]
    async fn test_missing_expectation_file_fails_before_network() {
        let client = MockServerClient::new("127.0.0.1", 9).unwrap();
        let err = client
            .load_expectations_from_file("/definitely/not/here.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ExpectationFile { .. }));
    }
}
