//! Actions the server takes when an expectation matches.

use super::body::BodyContent;
use super::collections::{Cookies, MultiValueMap};
use super::timing::Delay;
use serde::{Deserialize, Serialize};

pub(crate) fn default_status_code() -> u16 {
    200
}

/// Deserialize statusCode from either a number or a string
pub(crate) fn deserialize_status_code<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .ok_or_else(|| D::Error::custom("invalid status code number")),
        serde_json::Value::String(s) => s
            .parse::<u16>()
            .map_err(|_| D::Error::custom(format!("invalid status code: {s}"))),
        _ => Err(D::Error::custom("statusCode must be a number or string")),
    }
}

/// Literal response returned for a matched request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    #[serde(
        default = "default_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "MultiValueMap::is_empty")]
    pub headers: MultiValueMap,
    #[serde(default, skip_serializing_if = "Cookies::is_empty")]
    pub cookies: Cookies,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Delay>,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new(default_status_code())
    }
}

impl HttpResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            reason_phrase: None,
            headers: MultiValueMap::new(),
            cookies: Cookies::new(),
            body: None,
            delay: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn with_reason_phrase(mut self, reason: impl Into<String>) -> Self {
        self.reason_phrase = Some(reason.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add_ignore_case(name, value);
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<BodyContent>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_delay(mut self, delay: impl Into<Delay>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    /// Delay applied before responding, zero when unset.
    pub fn effective_delay(&self) -> Delay {
        self.delay.unwrap_or_default()
    }
}

/// Script dialect of a server-side template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateType {
    Javascript,
    Velocity,
    Mustache,
}

/// Template rendered by the server into a response or a forwarded request.
///
/// The template text is opaque to the client and sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpTemplate {
    pub template_type: TemplateType,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Delay>,
}

impl HttpTemplate {
    pub fn new(template_type: TemplateType, template: impl Into<String>) -> Self {
        Self {
            template_type,
            template: template.into(),
            delay: None,
        }
    }

    pub fn javascript(template: impl Into<String>) -> Self {
        Self::new(TemplateType::Javascript, template)
    }

    pub fn velocity(template: impl Into<String>) -> Self {
        Self::new(TemplateType::Velocity, template)
    }

    pub fn mustache(template: impl Into<String>) -> Self {
        Self::new(TemplateType::Mustache, template)
    }

    pub fn with_delay(mut self, delay: impl Into<Delay>) -> Self {
        self.delay = Some(delay.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

fn default_forward_port() -> u16 {
    80
}

/// Proxy the matched request to another host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpForward {
    pub host: String,
    #[serde(default = "default_forward_port")]
    pub port: u16,
    #[serde(default)]
    pub scheme: Scheme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Delay>,
}

impl HttpForward {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_forward_port(),
            scheme: Scheme::default(),
            delay: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_delay(mut self, delay: impl Into<Delay>) -> Self {
        self.delay = Some(delay.into());
        self
    }
}

/// Misbehave at the connection level instead of answering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_connection: Option<bool>,
    /// Base64 encoded bytes written to the socket before closing it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_bytes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Delay>,
}

impl HttpError {
    pub fn drop_connection() -> Self {
        Self {
            drop_connection: Some(true),
            ..Default::default()
        }
    }

    pub fn with_response_bytes(mut self, bytes: impl AsRef<[u8]>) -> Self {
        use base64::Engine;
        self.response_bytes = Some(base64::engine::general_purpose::STANDARD.encode(bytes));
        self
    }
}
