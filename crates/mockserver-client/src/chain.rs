//! Fluent expectation builder returned by [`MockServerClient::when`].

use crate::client::MockServerClient;
use crate::error::Result;
use crate::model::{
    Action, Expectation, HttpError, HttpForward, HttpRequest, HttpResponse, HttpTemplate,
    TimeToLive, Times,
};

/// Collects an expectation's settings and registers it once an action is set.
///
/// Every terminal call replaces the action held so far and sends the whole
/// expectation again, so the last one registered wins.
#[derive(Debug)]
pub struct ForwardChainExpectation<'a> {
    client: &'a MockServerClient,
    expectation: Expectation,
}

impl<'a> ForwardChainExpectation<'a> {
    pub(crate) fn new(client: &'a MockServerClient, request: HttpRequest) -> Self {
        Self {
            client,
            expectation: Expectation::new(request),
        }
    }

    pub fn times(mut self, times: Times) -> Self {
        self.expectation.times = times;
        self
    }

    pub fn time_to_live(mut self, time_to_live: TimeToLive) -> Self {
        self.expectation.time_to_live = time_to_live;
        self
    }

    /// Higher priorities are matched first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.expectation.priority = priority;
        self
    }

    /// Client-chosen id; registering the same id again replaces the old expectation.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.expectation.id = Some(id.into());
        self
    }

    /// Expectation as it stands, including the last action registered.
    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    pub async fn respond(&mut self, response: HttpResponse) -> Result<()> {
        self.register(Action::Response(response)).await
    }

    pub async fn respond_with_template(&mut self, template: HttpTemplate) -> Result<()> {
        self.register(Action::ResponseTemplate(template)).await
    }

    pub async fn forward(&mut self, forward: HttpForward) -> Result<()> {
        self.register(Action::Forward(forward)).await
    }

    pub async fn forward_with_template(&mut self, template: HttpTemplate) -> Result<()> {
        self.register(Action::ForwardTemplate(template)).await
    }

    pub async fn error(&mut self, error: HttpError) -> Result<()> {
        self.register(Action::Error(error)).await
    }

    async fn register(&mut self, action: Action) -> Result<()> {
        self.expectation.action = Some(action);
        self.client.send_expectation(&self.expectation).await
    }
}
