//! JSON encoding and decoding for any wire model type.
//!
//! Null omission and the shorthand forms live on the model types themselves;
//! these helpers only add the conventions shared by every endpoint.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

pub fn from_json<T: DeserializeOwned>(json: &str) -> serde_json::Result<T> {
    serde_json::from_str(json)
}

/// Decode a JSON array of `T`.
///
/// A single object is accepted as a one-element array, and blank input
/// decodes to an empty vector.
pub fn from_json_array<T: DeserializeOwned>(json: &str) -> serde_json::Result<Vec<T>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => items.into_iter().map(serde_json::from_value).collect(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Expectation, HttpRequest, HttpResponse};

    #[test]
    fn test_to_json_omits_absent_fields() {
        let json = to_json(&HttpRequest::get("/a")).unwrap();
        assert_eq!(json, r#"{"method":"GET","path":"/a"}"#);
    }

    #[test]
    fn test_from_json_array_accepts_single_object() {
        let items: Vec<HttpRequest> = from_json_array(r#"{"path": "/one"}"#).unwrap();
        assert_eq!(items, vec![HttpRequest::new().with_path("/one")]);
    }

    #[test]
    fn test_from_json_array_blank_is_empty() {
        let items: Vec<HttpRequest> = from_json_array("  \n").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_from_json_array_reports_malformed_input() {
        let result: serde_json::Result<Vec<Expectation>> = from_json_array("[{\"httpRequest\": ");
        assert!(result.is_err());
    }

    #[test]
    fn test_expectation_array() {
        let json = r#"[
            {"httpRequest": {"path": "/a"}, "httpResponse": {"statusCode": 200}},
            {"httpRequest": {"path": "/b"}, "httpResponse": {"statusCode": 404}}
        ]"#;
        let items: Vec<Expectation> = from_json_array(json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            Expectation::new(HttpRequest::new().with_path("/b")).respond(HttpResponse::not_found())
        );
    }

    #[test]
    fn test_pretty_output_parses_back() {
        let expectation = Expectation::new(HttpRequest::get("/x")).respond(HttpResponse::ok());
        let pretty = to_json_pretty(&expectation).unwrap();
        assert!(pretty.contains('\n'));
        let parsed: Expectation = from_json(&pretty).unwrap();
        assert_eq!(parsed, expectation);
    }
}
