//! Expectations and verification payloads.

use super::action::{HttpError, HttpForward, HttpResponse, HttpTemplate};
use super::request::HttpRequest;
use super::timing::{TimeToLive, Times, VerificationTimes};
use serde::{Deserialize, Serialize};

/// What the server does with a matched request. An expectation holds at most one.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Response(HttpResponse),
    ResponseTemplate(HttpTemplate),
    Forward(HttpForward),
    ForwardTemplate(HttpTemplate),
    Error(HttpError),
}

/// A request matcher paired with an action, a repeat count and an expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExpectationWire", into = "ExpectationWire")]
pub struct Expectation {
    pub id: Option<String>,
    pub priority: i32,
    pub http_request: HttpRequest,
    pub action: Option<Action>,
    pub times: Times,
    pub time_to_live: TimeToLive,
}

impl Expectation {
    /// Expectation matching `request` with unlimited times, no expiry and priority 0.
    pub fn new(request: HttpRequest) -> Self {
        Self {
            id: None,
            priority: 0,
            http_request: request,
            action: None,
            times: Times::Unlimited,
            time_to_live: TimeToLive::Unlimited,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_times(mut self, times: Times) -> Self {
        self.times = times;
        self
    }

    pub fn with_time_to_live(mut self, time_to_live: TimeToLive) -> Self {
        self.time_to_live = time_to_live;
        self
    }

    /// Replace the action. Only one action is ever held.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn respond(self, response: HttpResponse) -> Self {
        self.with_action(Action::Response(response))
    }

    pub fn respond_with_template(self, template: HttpTemplate) -> Self {
        self.with_action(Action::ResponseTemplate(template))
    }

    pub fn forward(self, forward: HttpForward) -> Self {
        self.with_action(Action::Forward(forward))
    }

    pub fn forward_with_template(self, template: HttpTemplate) -> Self {
        self.with_action(Action::ForwardTemplate(template))
    }

    pub fn error(self, error: HttpError) -> Self {
        self.with_action(Action::Error(error))
    }
}

/// Flat wire form with one nullable field per action kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpectationWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    http_request: HttpRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    http_response: Option<HttpResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    http_response_template: Option<HttpTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    http_forward: Option<HttpForward>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    http_forward_template: Option<HttpTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    http_error: Option<HttpError>,
    #[serde(default)]
    times: Times,
    #[serde(default)]
    time_to_live: TimeToLive,
}

impl TryFrom<ExpectationWire> for Expectation {
    type Error = String;

    fn try_from(wire: ExpectationWire) -> Result<Self, Self::Error> {
        let mut actions = Vec::with_capacity(1);
        if let Some(response) = wire.http_response {
            actions.push(Action::Response(response));
        }
        if let Some(template) = wire.http_response_template {
            actions.push(Action::ResponseTemplate(template));
        }
        if let Some(forward) = wire.http_forward {
            actions.push(Action::Forward(forward));
        }
        if let Some(template) = wire.http_forward_template {
            actions.push(Action::ForwardTemplate(template));
        }
        if let Some(error) = wire.http_error {
            actions.push(Action::Error(error));
        }
        if actions.len() > 1 {
            return Err(format!(
                "expectation has {} actions, at most one of httpResponse, httpResponseTemplate, \
                 httpForward, httpForwardTemplate, httpError is allowed",
                actions.len()
            ));
        }

        Ok(Expectation {
            id: wire.id,
            priority: wire.priority,
            http_request: wire.http_request,
            action: actions.pop(),
            times: wire.times,
            time_to_live: wire.time_to_live,
        })
    }
}

impl From<Expectation> for ExpectationWire {
    fn from(expectation: Expectation) -> Self {
        let mut wire = ExpectationWire {
            id: expectation.id,
            priority: expectation.priority,
            http_request: expectation.http_request,
            http_response: None,
            http_response_template: None,
            http_forward: None,
            http_forward_template: None,
            http_error: None,
            times: expectation.times,
            time_to_live: expectation.time_to_live,
        };
        match expectation.action {
            Some(Action::Response(response)) => wire.http_response = Some(response),
            Some(Action::ResponseTemplate(template)) => {
                wire.http_response_template = Some(template)
            }
            Some(Action::Forward(forward)) => wire.http_forward = Some(forward),
            Some(Action::ForwardTemplate(template)) => wire.http_forward_template = Some(template),
            Some(Action::Error(error)) => wire.http_error = Some(error),
            None => {}
        }
        wire
    }
}

/// Payload of `/verify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub http_request: HttpRequest,
    pub times: VerificationTimes,
}

impl Verification {
    pub fn new(http_request: HttpRequest, times: VerificationTimes) -> Self {
        Self {
            http_request,
            times,
        }
    }
}

/// Payload of `/verifySequence`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSequence {
    pub http_requests: Vec<HttpRequest>,
}

impl VerificationSequence {
    pub fn new(http_requests: Vec<HttpRequest>) -> Self {
        Self { http_requests }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::{Scheme, TemplateType};
    use assert_json_diff::assert_json_eq;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_expectation_wire_shape() {
        let expectation = Expectation::new(HttpRequest::get("/hello"))
            .with_priority(10)
            .with_times(Times::exactly(2))
            .with_time_to_live(TimeToLive::exactly(Duration::from_secs(30)))
            .respond(HttpResponse::ok().with_body("hello"));

        assert_json_eq!(
            serde_json::to_value(&expectation).unwrap(),
            json!({
                "priority": 10,
                "httpRequest": {"method": "GET", "path": "/hello"},
                "httpResponse": {
                    "statusCode": 200,
                    "body": {"type": "STRING", "string": "hello"}
                },
                "times": {"remainingTimes": 2, "unlimited": false},
                "timeToLive": {"timeUnit": "MILLISECONDS", "timeToLive": 30000, "unlimited": false}
            })
        );
    }

    #[test]
    fn test_defaults_when_fields_missing() {
        let expectation: Expectation = serde_json::from_value(json!({
            "httpRequest": {"path": "/x"},
            "httpForward": {"host": "backend", "scheme": "HTTPS", "port": 8443}
        }))
        .unwrap();
        assert_eq!(expectation.priority, 0);
        assert!(expectation.times.is_unlimited());
        assert!(expectation.time_to_live.is_unlimited());
        let forward = HttpForward::new("backend").with_port(8443).with_scheme(Scheme::Https);
        assert_eq!(expectation.action, Some(Action::Forward(forward)));
    }

    #[test]
    fn test_last_action_wins() {
        let expectation = Expectation::new(HttpRequest::new())
            .respond(HttpResponse::ok())
            .forward(HttpForward::new("backend"));
        let value = serde_json::to_value(&expectation).unwrap();
        assert!(value.get("httpResponse").is_none());
        assert_eq!(value["httpForward"]["host"], "backend");
    }

    #[test]
    fn test_rejects_two_actions() {
        let result: Result<Expectation, _> = serde_json::from_value(json!({
            "httpRequest": {},
            "httpResponse": {"statusCode": 200},
            "httpForward": {"host": "backend"}
        }));
        assert!(result.unwrap_err().to_string().contains("at most one"));
    }

    #[test]
    fn test_templates_round_trip() {
        let source = json!({
            "priority": 0,
            "httpRequest": {"path": "/t"},
            "httpForwardTemplate": {
                "templateType": "VELOCITY",
                "template": "{ 'path': '$!request.path' }"
            },
            "times": {"remainingTimes": 0, "unlimited": true},
            "timeToLive": {"unlimited": true}
        });
        let expectation: Expectation = serde_json::from_value(source.clone()).unwrap();
        assert!(matches!(
            expectation.action,
            Some(Action::ForwardTemplate(ref t)) if t.template_type == TemplateType::Velocity
        ));
        assert_json_eq!(serde_json::to_value(&expectation).unwrap(), source);
    }

    #[test]
    fn test_verification_payloads() {
        let verification =
            Verification::new(HttpRequest::get("/hello"), VerificationTimes::exactly(2));
        assert_json_eq!(
            serde_json::to_value(&verification).unwrap(),
            json!({
                "httpRequest": {"method": "GET", "path": "/hello"},
                "times": {"atLeast": 2, "atMost": 2}
            })
        );

        let sequence = VerificationSequence::new(vec![
            HttpRequest::get("/a"),
            HttpRequest::post("/b"),
        ]);
        assert_json_eq!(
            serde_json::to_value(&sequence).unwrap(),
            json!({
                "httpRequests": [
                    {"method": "GET", "path": "/a"},
                    {"method": "POST", "path": "/b"}
                ]
            })
        );
    }
}
