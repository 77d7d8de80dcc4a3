//! Event and action definitions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header carrying the correlation ID, on inbound events and outbound requests alike.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// What happened to the resource an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Update,
    Delete,
    Approve,
    Deny,
    Revoke,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 6] = [
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Approve,
        Action::Deny,
        Action::Revoke,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Approve => "APPROVE",
            Action::Deny => "DENY",
            Action::Revoke => "REVOKE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown action: {0:?}")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    /// Case-insensitive, so config files may use `update` or `UPDATE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

/// A decoded event as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub action: Action,

    /// Transport headers. Only the correlation header is interpreted.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Serialized trace propagation carrier (e.g. `traceparent`).
    #[serde(default)]
    pub trace_context: Option<HashMap<String, String>>,

    #[serde(default)]
    pub extension_resource_definition_id: String,

    #[serde(default)]
    pub extension_id: String,

    #[serde(default)]
    pub extension_resource_id: String,

    #[serde(default)]
    pub version: String,
}

impl Event {
    /// Create an event with no headers and empty identifiers.
    pub fn new(action: Action) -> Self {
        Self {
            action,
            headers: HashMap::new(),
            trace_context: None,
            extension_resource_definition_id: String::new(),
            extension_id: String::new(),
            extension_resource_id: String::new(),
            version: String::new(),
        }
    }

    /// Builder-style helper that sets the correlation header.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.headers
            .insert(CORRELATION_ID_HEADER.to_string(), id.into());
        self
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.extension_resource_id = id.into();
        self
    }

    /// Correlation ID from the headers, or `""` when absent.
    ///
    /// Header names are matched case-insensitively since transports disagree
    /// on canonical casing.
    pub fn correlation_id(&self) -> &str {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(CORRELATION_ID_HEADER))
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// The trace carrier, if present and non-empty.
    pub fn trace_carrier(&self) -> Option<&HashMap<String, String>> {
        self.trace_context.as_ref().filter(|c| !c.is_empty())
    }
}
