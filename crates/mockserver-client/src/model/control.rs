//! Parameters and replies of the control endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What `/retrieve` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetrieveType {
    Requests,
    ActiveExpectations,
    RecordedExpectations,
    Logs,
}

impl RetrieveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrieveType::Requests => "REQUESTS",
            RetrieveType::ActiveExpectations => "ACTIVE_EXPECTATIONS",
            RetrieveType::RecordedExpectations => "RECORDED_EXPECTATIONS",
            RetrieveType::Logs => "LOGS",
        }
    }
}

impl fmt::Display for RetrieveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What `/clear` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClearType {
    Expectations,
    Log,
    #[default]
    All,
}

impl ClearType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClearType::Expectations => "EXPECTATIONS",
            ClearType::Log => "LOG",
            ClearType::All => "ALL",
        }
    }
}

impl fmt::Display for ClearType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ports a server listens on, as returned by `/status` and `/bind`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ports {
    #[serde(default)]
    pub ports: Vec<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_values() {
        assert_eq!(RetrieveType::Requests.to_string(), "REQUESTS");
        assert_eq!(
            RetrieveType::ActiveExpectations.as_str(),
            "ACTIVE_EXPECTATIONS"
        );
        assert_eq!(RetrieveType::Logs.as_str(), "LOGS");
        assert_eq!(ClearType::default(), ClearType::All);
        assert_eq!(ClearType::Log.to_string(), "LOG");
    }

    #[test]
    fn test_ports() {
        let ports: Ports = serde_json::from_value(json!({"ports": [1080, 1081]})).unwrap();
        assert_eq!(ports.ports, vec![1080, 1081]);
        let empty: Ports = serde_json::from_value(json!({})).unwrap();
        assert!(empty.ports.is_empty());
    }
}
