//! Request body matchers and literal response bodies.
//!
//! Both are written as MockServer's typed body objects, e.g.
//! `{"type": "STRING", "string": "hello", "subString": true}`. On read, a bare
//! JSON string is accepted as shorthand: an exact string matcher for request
//! bodies and plain text for response bodies. An object without a `type` field
//! is typed by its payload key when every field is a body field. Any other
//! object, including one whose `type` names no body type, is a JSON document.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire tag of a body object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyType {
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "REGEX")]
    Regex,
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "XML")]
    Xml,
    #[serde(rename = "XPATH")]
    XPath,
    #[serde(rename = "JSON_PATH")]
    JsonPath,
    #[serde(rename = "XML_SCHEMA")]
    XmlSchema,
    #[serde(rename = "JSON_SCHEMA")]
    JsonSchema,
    #[serde(rename = "BINARY")]
    Binary,
}

/// How strictly a JSON body matcher compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchType {
    Strict,
    #[default]
    OnlyMatchingFields,
}

/// Payload of a request body matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    String {
        string: String,
        sub_string: bool,
        content_type: Option<String>,
    },
    Regex(String),
    Json {
        json: Value,
        match_type: Option<MatchType>,
        content_type: Option<String>,
    },
    Xml {
        xml: String,
        content_type: Option<String>,
    },
    XPath(String),
    JsonPath(String),
    XmlSchema(String),
    JsonSchema(Value),
    Binary {
        base64_bytes: String,
        content_type: Option<String>,
    },
}

/// Request body matcher with an optional negation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "BodyWire")]
pub struct Body {
    pub kind: BodyKind,
    pub not: bool,
}

impl Body {
    fn of(kind: BodyKind) -> Self {
        Self { kind, not: false }
    }

    /// Body equal to `value`.
    pub fn exact(value: impl Into<String>) -> Self {
        Self::of(BodyKind::String {
            string: value.into(),
            sub_string: false,
            content_type: None,
        })
    }

    /// Body containing `value`.
    pub fn sub_string(value: impl Into<String>) -> Self {
        Self::of(BodyKind::String {
            string: value.into(),
            sub_string: true,
            content_type: None,
        })
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::of(BodyKind::Regex(pattern.into()))
    }

    /// JSON body compared with `ONLY_MATCHING_FIELDS` semantics (server default).
    pub fn json(json: impl Into<Value>) -> Self {
        Self::of(BodyKind::Json {
            json: json.into(),
            match_type: None,
            content_type: None,
        })
    }

    pub fn json_strict(json: impl Into<Value>) -> Self {
        Self::of(BodyKind::Json {
            json: json.into(),
            match_type: Some(MatchType::Strict),
            content_type: None,
        })
    }

    pub fn xml(xml: impl Into<String>) -> Self {
        Self::of(BodyKind::Xml {
            xml: xml.into(),
            content_type: None,
        })
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::of(BodyKind::XPath(expression.into()))
    }

    pub fn json_path(expression: impl Into<String>) -> Self {
        Self::of(BodyKind::JsonPath(expression.into()))
    }

    pub fn xml_schema(schema: impl Into<String>) -> Self {
        Self::of(BodyKind::XmlSchema(schema.into()))
    }

    pub fn json_schema(schema: impl Into<Value>) -> Self {
        Self::of(BodyKind::JsonSchema(schema.into()))
    }

    pub fn binary(bytes: impl AsRef<[u8]>) -> Self {
        Self::of(BodyKind::Binary {
            base64_bytes: STANDARD.encode(bytes),
            content_type: None,
        })
    }

    /// Flip the negation flag. Applying it twice restores the original matcher.
    pub fn negated(mut self) -> Self {
        self.not = !self.not;
        self
    }

    pub fn is_not(&self) -> bool {
        self.not
    }

    /// Set the content type on bodies that carry one; ignored otherwise.
    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        match &mut self.kind {
            BodyKind::String { content_type, .. }
            | BodyKind::Json { content_type, .. }
            | BodyKind::Xml { content_type, .. }
            | BodyKind::Binary { content_type, .. } => *content_type = Some(value.into()),
            _ => {}
        }
        self
    }

    pub fn body_type(&self) -> BodyType {
        match &self.kind {
            BodyKind::String { .. } => BodyType::String,
            BodyKind::Regex(_) => BodyType::Regex,
            BodyKind::Json { .. } => BodyType::Json,
            BodyKind::Xml { .. } => BodyType::Xml,
            BodyKind::XPath(_) => BodyType::XPath,
            BodyKind::JsonPath(_) => BodyType::JsonPath,
            BodyKind::XmlSchema(_) => BodyType::XmlSchema,
            BodyKind::JsonSchema(_) => BodyType::JsonSchema,
            BodyKind::Binary { .. } => BodyType::Binary,
        }
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::exact(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::exact(value)
    }
}

/// Literal body returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "BodyWire")]
pub enum BodyContent {
    Text {
        string: String,
        content_type: Option<String>,
    },
    Json {
        json: Value,
        content_type: Option<String>,
    },
    Xml {
        xml: String,
        content_type: Option<String>,
    },
    Binary {
        base64_bytes: String,
        content_type: Option<String>,
    },
}

impl BodyContent {
    pub fn text(value: impl Into<String>) -> Self {
        BodyContent::Text {
            string: value.into(),
            content_type: None,
        }
    }

    pub fn json(value: impl Into<Value>) -> Self {
        BodyContent::Json {
            json: value.into(),
            content_type: None,
        }
    }

    pub fn xml(value: impl Into<String>) -> Self {
        BodyContent::Xml {
            xml: value.into(),
            content_type: None,
        }
    }

    pub fn binary(bytes: impl AsRef<[u8]>) -> Self {
        BodyContent::Binary {
            base64_bytes: STANDARD.encode(bytes),
            content_type: None,
        }
    }

    pub fn with_content_type(self, value: impl Into<String>) -> Self {
        let content_type = Some(value.into());
        match self {
            BodyContent::Text { string, .. } => BodyContent::Text {
                string,
                content_type,
            },
            BodyContent::Json { json, .. } => BodyContent::Json { json, content_type },
            BodyContent::Xml { xml, .. } => BodyContent::Xml { xml, content_type },
            BodyContent::Binary { base64_bytes, .. } => BodyContent::Binary {
                base64_bytes,
                content_type,
            },
        }
    }

    /// Body as text. JSON bodies are rendered compactly, binary bodies are
    /// decoded as UTF-8 when possible.
    pub fn as_text(&self) -> Option<String> {
        match self {
            BodyContent::Text { string, .. } => Some(string.clone()),
            BodyContent::Xml { xml, .. } => Some(xml.clone()),
            BodyContent::Json { json, .. } => Some(match json {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            BodyContent::Binary { base64_bytes, .. } => STANDARD
                .decode(base64_bytes)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok()),
        }
    }
}

impl From<&str> for BodyContent {
    fn from(value: &str) -> Self {
        BodyContent::text(value)
    }
}

impl From<String> for BodyContent {
    fn from(value: String) -> Self {
        BodyContent::text(value)
    }
}

// ============================================================================
// Wire representation
// ============================================================================

const PAYLOAD_KEYS: &[&str] = &[
    "string",
    "regex",
    "json",
    "xml",
    "xpath",
    "jsonPath",
    "xmlSchema",
    "jsonSchema",
    "base64Bytes",
    "rawBytes",
];

const FLAG_KEYS: &[&str] = &["not", "subString", "matchType", "contentType"];

/// Flat body object shared by matchers and literal bodies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BodyWire {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    body_type: Option<BodyType>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    not: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    string: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    sub_string: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    json: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    match_type: Option<MatchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xml: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xpath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    xml_schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base64_bytes: Option<String>,
    /// Base64 payload some servers send instead of the typed field
    #[serde(skip_serializing)]
    raw_bytes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

impl BodyWire {
    fn resolved_type(&self) -> Result<BodyType, String> {
        if let Some(body_type) = self.body_type {
            return Ok(body_type);
        }
        let inferred = if self.string.is_some() {
            BodyType::String
        } else if self.regex.is_some() {
            BodyType::Regex
        } else if self.json.is_some() {
            BodyType::Json
        } else if self.xml.is_some() {
            BodyType::Xml
        } else if self.xpath.is_some() {
            BodyType::XPath
        } else if self.json_path.is_some() {
            BodyType::JsonPath
        } else if self.xml_schema.is_some() {
            BodyType::XmlSchema
        } else if self.json_schema.is_some() {
            BodyType::JsonSchema
        } else if self.base64_bytes.is_some() || self.raw_bytes.is_some() {
            BodyType::Binary
        } else {
            return Err("body object has neither a type nor a payload".to_string());
        };
        Ok(inferred)
    }

    /// UTF-8 text decoded from `rawBytes`, used when the typed payload is absent.
    fn raw_text(&self) -> Result<Option<String>, String> {
        match &self.raw_bytes {
            None => Ok(None),
            Some(encoded) => {
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| format!("invalid base64 in rawBytes: {e}"))?;
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
        }
    }

    fn text_payload(
        &self,
        value: Option<String>,
        body_type: BodyType,
        key: &str,
    ) -> Result<String, String> {
        match value {
            Some(v) => Ok(v),
            None => self
                .raw_text()?
                .ok_or_else(|| missing_payload(body_type, key)),
        }
    }
}

fn missing_payload(body_type: BodyType, key: &str) -> String {
    format!("{body_type:?} body is missing \"{key}\"")
}

/// True when `obj` is a body object rather than a JSON document.
///
/// A `type` field must name a known body type. Without one, the object must
/// carry a payload key and nothing but payload and flag keys.
fn is_typed_body_object(obj: &serde_json::Map<String, Value>) -> bool {
    match obj.get("type") {
        Some(tag @ Value::String(_)) => BodyType::deserialize(tag).is_ok(),
        Some(_) => false,
        None => {
            obj.keys().any(|k| PAYLOAD_KEYS.contains(&k.as_str()))
                && obj.keys().all(|k| is_wire_key(k.as_str()))
        }
    }
}

fn is_wire_key(key: &str) -> bool {
    PAYLOAD_KEYS.contains(&key) || FLAG_KEYS.contains(&key)
}

impl TryFrom<BodyWire> for Body {
    type Error = String;

    fn try_from(wire: BodyWire) -> Result<Self, Self::Error> {
        let body_type = wire.resolved_type()?;
        let not = wire.not;
        let kind = match body_type {
            BodyType::String => BodyKind::String {
                string: wire.text_payload(wire.string.clone(), body_type, "string")?,
                sub_string: wire.sub_string,
                content_type: wire.content_type,
            },
            BodyType::Regex => BodyKind::Regex(
                wire.regex
                    .ok_or_else(|| missing_payload(body_type, "regex"))?,
            ),
            BodyType::Json => {
                let json = match wire.json.clone() {
                    Some(json) => json,
                    None => Value::String(wire.text_payload(None, body_type, "json")?),
                };
                BodyKind::Json {
                    json,
                    match_type: wire.match_type,
                    content_type: wire.content_type,
                }
            }
            BodyType::Xml => BodyKind::Xml {
                xml: wire.text_payload(wire.xml.clone(), body_type, "xml")?,
                content_type: wire.content_type,
            },
            BodyType::XPath => BodyKind::XPath(
                wire.xpath
                    .ok_or_else(|| missing_payload(body_type, "xpath"))?,
            ),
            BodyType::JsonPath => BodyKind::JsonPath(
                wire.json_path
                    .ok_or_else(|| missing_payload(body_type, "jsonPath"))?,
            ),
            BodyType::XmlSchema => BodyKind::XmlSchema(
                wire.xml_schema
                    .ok_or_else(|| missing_payload(body_type, "xmlSchema"))?,
            ),
            BodyType::JsonSchema => BodyKind::JsonSchema(
                wire.json_schema
                    .ok_or_else(|| missing_payload(body_type, "jsonSchema"))?,
            ),
            BodyType::Binary => BodyKind::Binary {
                base64_bytes: wire
                    .base64_bytes
                    .or(wire.raw_bytes)
                    .ok_or_else(|| missing_payload(body_type, "base64Bytes"))?,
                content_type: wire.content_type,
            },
        };
        Ok(Body { kind, not })
    }
}

impl TryFrom<Value> for Body {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Body::exact(s)),
            Value::Object(obj) if is_typed_body_object(&obj) => {
                let wire: BodyWire =
                    serde_json::from_value(Value::Object(obj)).map_err(|e| e.to_string())?;
                Body::try_from(wire)
            }
            json @ (Value::Object(_) | Value::Array(_)) => Ok(Body::json(json)),
            other => Err(format!("unsupported body matcher: {other}")),
        }
    }
}

impl From<Body> for BodyWire {
    fn from(body: Body) -> Self {
        let mut wire = BodyWire {
            body_type: Some(body.body_type()),
            not: body.not,
            ..Default::default()
        };
        match body.kind {
            BodyKind::String {
                string,
                sub_string,
                content_type,
            } => {
                wire.string = Some(string);
                wire.sub_string = sub_string;
                wire.content_type = content_type;
            }
            BodyKind::Regex(regex) => wire.regex = Some(regex),
            BodyKind::Json {
                json,
                match_type,
                content_type,
            } => {
                wire.json = Some(json);
                wire.match_type = match_type;
                wire.content_type = content_type;
            }
            BodyKind::Xml { xml, content_type } => {
                wire.xml = Some(xml);
                wire.content_type = content_type;
            }
            BodyKind::XPath(xpath) => wire.xpath = Some(xpath),
            BodyKind::JsonPath(json_path) => wire.json_path = Some(json_path),
            BodyKind::XmlSchema(schema) => wire.xml_schema = Some(schema),
            BodyKind::JsonSchema(schema) => wire.json_schema = Some(schema),
            BodyKind::Binary {
                base64_bytes,
                content_type,
            } => {
                wire.base64_bytes = Some(base64_bytes);
                wire.content_type = content_type;
            }
        }
        wire
    }
}

impl TryFrom<Value> for BodyContent {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(BodyContent::text(s)),
            Value::Object(obj) if is_typed_body_object(&obj) => {
                let wire: BodyWire =
                    serde_json::from_value(Value::Object(obj)).map_err(|e| e.to_string())?;
                // Reuse matcher decoding for the rawBytes fallbacks.
                let body = Body::try_from(wire)?;
                if body.not {
                    return Err("\"not\" applies to request body matchers only".to_string());
                }
                match body.kind {
                    BodyKind::String {
                        string,
                        content_type,
                        ..
                    } => Ok(BodyContent::Text {
                        string,
                        content_type,
                    }),
                    BodyKind::Json {
                        json, content_type, ..
                    } => Ok(BodyContent::Json { json, content_type }),
                    BodyKind::Xml { xml, content_type } => {
                        Ok(BodyContent::Xml { xml, content_type })
                    }
                    BodyKind::Binary {
                        base64_bytes,
                        content_type,
                    } => Ok(BodyContent::Binary {
                        base64_bytes,
                        content_type,
                    }),
                    other => Err(format!("unsupported response body type: {other:?}")),
                }
            }
            json @ (Value::Object(_) | Value::Array(_)) => Ok(BodyContent::json(json)),
            other => Err(format!("unsupported response body: {other}")),
        }
    }
}

impl From<BodyContent> for BodyWire {
    fn from(content: BodyContent) -> Self {
        let body = match content {
            BodyContent::Text {
                string,
                content_type,
            } => Body::of(BodyKind::String {
                string,
                sub_string: false,
                content_type,
            }),
            BodyContent::Json { json, content_type } => Body::of(BodyKind::Json {
                json,
                match_type: None,
                content_type,
            }),
            BodyContent::Xml { xml, content_type } => Body::of(BodyKind::Xml { xml, content_type }),
            BodyContent::Binary {
                base64_bytes,
                content_type,
            } => Body::of(BodyKind::Binary {
                base64_bytes,
                content_type,
            }),
        };
        BodyWire::from(body)
    }
}
