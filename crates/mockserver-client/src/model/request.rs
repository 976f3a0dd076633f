//! Request matcher sent to and recorded by MockServer.

use super::body::Body;
use super::collections::{Cookies, MultiValueMap};
use serde::{Deserialize, Serialize};

/// Criteria an incoming request is matched against.
///
/// Every field is optional; [`HttpRequest::new`] matches any request and
/// serializes to `{}`. The same type is used for requests returned by
/// `/retrieve?type=REQUESTS`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "MultiValueMap::is_empty")]
    pub query_string_parameters: MultiValueMap,
    #[serde(default, skip_serializing_if = "MultiValueMap::is_empty")]
    pub headers: MultiValueMap,
    #[serde(default, skip_serializing_if = "Cookies::is_empty")]
    pub cookies: Cookies,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<bool>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new().with_method("GET").with_path(path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new().with_method("POST").with_path(path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new().with_method("PUT").with_path(path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new().with_method("DELETE").with_path(path)
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add a query parameter value. Repeated names collect their values in order.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters.add(name, value);
        self
    }

    /// Add a header value. Header names are compared case-insensitively.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add_ignore_case(name, value);
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = Some(keep_alive);
        self
    }

    /// First value of `name`, ignoring header name case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get_ignore_case(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_matcher_serializes_to_empty_object() {
        assert_eq!(serde_json::to_value(HttpRequest::new()).unwrap(), json!({}));
    }

    #[test]
    fn test_full_matcher_wire_shape() {
        let request = HttpRequest::post("/login")
            .with_query_param("redirect", "/home")
            .with_header("Content-Type", "application/json")
            .with_header("content-type", "charset=utf-8")
            .with_cookie("session", "abc")
            .with_body(Body::json(json!({"user": "bob"})))
            .with_secure(true)
            .with_keep_alive(false);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "POST",
                "path": "/login",
                "queryStringParameters": [{"name": "redirect", "values": ["/home"]}],
                "headers": [{
                    "name": "Content-Type",
                    "values": ["application/json", "charset=utf-8"]
                }],
                "cookies": [{"name": "session", "value": "abc"}],
                "body": {"type": "JSON", "json": {"user": "bob"}},
                "secure": true,
                "keepAlive": false
            })
        );
    }

    #[test]
    fn test_recorded_request_from_server() {
        // Shape returned by /retrieve?type=REQUESTS, with fields this client ignores.
        let recorded: HttpRequest = serde_json::from_value(json!({
            "method": "GET",
            "path": "/hello",
            "headers": {"Host": ["localhost:1080"], "Accept": ["*/*"]},
            "keepAlive": true,
            "secure": false,
            "socketAddress": {"host": "localhost", "port": 1080, "scheme": "HTTP"},
            "body": "plain text"
        }))
        .unwrap();

        assert_eq!(recorded.method.as_deref(), Some("GET"));
        assert_eq!(recorded.header("host"), Some("localhost:1080"));
        assert_eq!(recorded.body, Some(Body::exact("plain text")));
        assert_eq!(recorded.keep_alive, Some(true));
    }

    #[test]
    fn test_null_fields_are_absent() {
        let request: HttpRequest =
            serde_json::from_value(json!({"path": "/x", "body": null, "headers": null})).unwrap();
        assert_eq!(request, HttpRequest::new().with_path("/x"));
    }
}
