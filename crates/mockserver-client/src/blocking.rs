//! Blocking wrapper around the async [`MockServerClient`](crate::MockServerClient).
//!
//! Each client owns a current-thread tokio runtime and drives every call to
//! completion on it. Do not create or drop a blocking client from inside an
//! async context; tokio panics when a runtime is dropped there.

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::model::{
    Action, ClearType, Expectation, HttpError, HttpForward, HttpRequest, HttpResponse, HttpTemplate,
    Ports, TimeToLive, Times, VerificationTimes,
};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Synchronous MockServer client for plain `#[test]` functions.
#[derive(Debug)]
pub struct MockServerClient {
    inner: crate::MockServerClient,
    runtime: Runtime,
}

impl MockServerClient {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::with_config(ClientConfig::new(host, port))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::from_async(crate::MockServerClient::with_config(config)?)
    }

    pub fn from_async(inner: crate::MockServerClient) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientError::Runtime)?;
        Ok(Self { inner, runtime })
    }

    pub fn as_async(&self) -> &crate::MockServerClient {
        &self.inner
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub fn when(&self, request: HttpRequest) -> ForwardChainExpectation<'_> {
        ForwardChainExpectation {
            client: self,
            expectation: Expectation::new(request),
        }
    }

    pub fn send_expectation(&self, expectation: &Expectation) -> Result<()> {
        self.block_on(self.inner.send_expectation(expectation))
    }

    pub fn send_expectations(&self, expectations: &[Expectation]) -> Result<()> {
        self.block_on(self.inner.send_expectations(expectations))
    }

    pub fn reset(&self) -> Result<()> {
        self.block_on(self.inner.reset())
    }

    pub fn clear(&self, request: Option<&HttpRequest>) -> Result<()> {
        self.block_on(self.inner.clear(request))
    }

    pub fn clear_with_type(
        &self,
        request: Option<&HttpRequest>,
        clear_type: ClearType,
    ) -> Result<()> {
        self.block_on(self.inner.clear_with_type(request, clear_type))
    }

    pub fn verify(&self, request: &HttpRequest, times: VerificationTimes) -> Result<()> {
        self.block_on(self.inner.verify(request, times))
    }

    pub fn verify_sequence(&self, requests: &[HttpRequest]) -> Result<()> {
        self.block_on(self.inner.verify_sequence(requests))
    }

    pub fn verify_zero_interactions(&self) -> Result<()> {
        self.block_on(self.inner.verify_zero_interactions())
    }

    pub fn retrieve_recorded_requests(
        &self,
        request: Option<&HttpRequest>,
    ) -> Result<Vec<HttpRequest>> {
        self.block_on(self.inner.retrieve_recorded_requests(request))
    }

    pub fn retrieve_active_expectations(
        &self,
        request: Option<&HttpRequest>,
    ) -> Result<Vec<Expectation>> {
        self.block_on(self.inner.retrieve_active_expectations(request))
    }

    pub fn retrieve_recorded_expectations(
        &self,
        request: Option<&HttpRequest>,
    ) -> Result<Vec<Expectation>> {
        self.block_on(self.inner.retrieve_recorded_expectations(request))
    }

    pub fn retrieve_log_messages(&self, request: Option<&HttpRequest>) -> Result<String> {
        self.block_on(self.inner.retrieve_log_messages(request))
    }

    pub fn is_running(&self) -> bool {
        self.block_on(self.inner.is_running())
    }

    pub fn is_running_with(&self, attempts: u32, interval: Duration) -> bool {
        self.block_on(self.inner.is_running_with(attempts, interval))
    }

    pub fn stop(&self) -> Result<()> {
        self.block_on(self.inner.stop())
    }

    pub fn stop_with(&self, ignore_failure: bool) -> Result<()> {
        self.block_on(self.inner.stop_with(ignore_failure))
    }

    pub fn bind(&self, ports: &[u16]) -> Result<Ports> {
        self.block_on(self.inner.bind(ports))
    }

    pub fn load_expectations_from_file(&self, path: impl AsRef<Path>) -> Result<Vec<Expectation>> {
        self.block_on(self.inner.load_expectations_from_file(path))
    }
}

/// Blocking counterpart of [`crate::ForwardChainExpectation`].
#[derive(Debug)]
pub struct ForwardChainExpectation<'a> {
    client: &'a MockServerClient,
    expectation: Expectation,
}

impl ForwardChainExpectation<'_> {
    pub fn times(mut self, times: Times) -> Self {
        self.expectation.times = times;
        self
    }

    pub fn time_to_live(mut self, time_to_live: TimeToLive) -> Self {
        self.expectation.time_to_live = time_to_live;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.expectation.priority = priority;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.expectation.id = Some(id.into());
        self
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    pub fn respond(&mut self, response: HttpResponse) -> Result<()> {
        self.register(Action::Response(response))
    }

    pub fn respond_with_template(&mut self, template: HttpTemplate) -> Result<()> {
        self.register(Action::ResponseTemplate(template))
    }

    pub fn forward(&mut self, forward: HttpForward) -> Result<()> {
        self.register(Action::Forward(forward))
    }

    pub fn forward_with_template(&mut self, template: HttpTemplate) -> Result<()> {
        self.register(Action::ForwardTemplate(template))
    }

    pub fn error(&mut self, error: HttpError) -> Result<()> {
        self.register(Action::Error(error))
    }

    fn register(&mut self, action: Action) -> Result<()> {
        self.expectation.action = Some(action);
        self.client.send_expectation(&self.expectation)
    }
}
