//! Header, query parameter and cookie collections.
//!
//! MockServer emits these as arrays of `{"name": .., "values": [..]}` entries.
//! Older servers and hand-written expectation files also use the object form
//! `{"name": ["v1", "v2"]}` or `{"name": "v"}`, which is accepted on read.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A name with one or more values, e.g. a repeated header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyToMultiValue {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A name with exactly one value, e.g. a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyToValue {
    pub name: String,
    pub value: String,
}

/// Ordered multi-valued map with unique names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Vec<KeyToMultiValue>")]
pub struct MultiValueMap {
    entries: Vec<KeyToMultiValue>,
}

impl MultiValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `name`, comparing names exactly.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push(name.into(), value.into(), |a, b| a == b);
    }

    /// Append `value` under `name`, comparing names ASCII case-insensitively.
    pub fn add_ignore_case(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push(name.into(), value.into(), |a, b| a.eq_ignore_ascii_case(b));
    }

    fn push(&mut self, name: String, value: String, same: fn(&str, &str) -> bool) {
        match self.entries.iter_mut().find(|e| same(&e.name, &name)) {
            Some(entry) => entry.values.push(value),
            None => self.entries.push(KeyToMultiValue {
                name,
                values: vec![value],
            }),
        }
    }

    /// Values recorded for `name` (exact comparison).
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.values.as_slice())
    }

    /// Values recorded for `name`, ignoring ASCII case.
    pub fn get_ignore_case(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.values.as_slice())
    }

    pub fn entries(&self) -> &[KeyToMultiValue] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<MultiValueMap> for Vec<KeyToMultiValue> {
    fn from(map: MultiValueMap) -> Self {
        map.entries
    }
}

impl TryFrom<Value> for MultiValueMap {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut map = MultiValueMap::new();
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    let mut obj = match item {
                        Value::Object(obj) => obj,
                        other => {
                            return Err(format!("expected {{name, values}} entry, found {other}"))
                        }
                    };
                    let name = match obj.remove("name") {
                        Some(Value::String(name)) => name,
                        _ => return Err("multi-value entry is missing a string \"name\"".into()),
                    };
                    let values = obj
                        .remove("values")
                        .or_else(|| obj.remove("value"))
                        .unwrap_or(Value::Array(Vec::new()));
                    for v in scalar_list(values)? {
                        map.add(name.clone(), v);
                    }
                }
            }
            Value::Object(obj) => {
                for (name, values) in obj {
                    for v in scalar_list(values)? {
                        map.add(name.clone(), v);
                    }
                }
            }
            other => return Err(format!("expected array or object, found {other}")),
        }
        Ok(map)
    }
}

impl<K, V> FromIterator<(K, V)> for MultiValueMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = MultiValueMap::new();
        for (k, v) in iter {
            map.add(k, v);
        }
        map
    }
}

/// Ordered list of cookies with unique names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Vec<KeyToValue>")]
pub struct Cookies {
    entries: Vec<KeyToValue>,
}

impl Cookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cookie, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|c| c.name == name) {
            Some(cookie) => cookie.value = value,
            None => self.entries.push(KeyToValue { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn entries(&self) -> &[KeyToValue] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Cookies> for Vec<KeyToValue> {
    fn from(cookies: Cookies) -> Self {
        cookies.entries
    }
}

impl TryFrom<Value> for Cookies {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut cookies = Cookies::new();
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    let cookie: KeyToValue =
                        serde_json::from_value(item).map_err(|e| format!("invalid cookie: {e}"))?;
                    cookies.insert(cookie.name, cookie.value);
                }
            }
            Value::Object(obj) => {
                for (name, value) in obj {
                    cookies.insert(name, scalar_to_string(value)?);
                }
            }
            other => return Err(format!("expected array or object, found {other}")),
        }
        Ok(cookies)
    }
}

fn scalar_list(value: Value) -> Result<Vec<String>, String> {
    match value {
        Value::Array(items) => items.into_iter().map(scalar_to_string).collect(),
        other => Ok(vec![scalar_to_string(other)?]),
    }
}

fn scalar_to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("expected a string value, found {other}")),
    }
}
