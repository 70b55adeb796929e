use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named capability the remote model may invoke mid-conversation.
///
/// Descriptors are defined at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Map::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// One request from the remote model to execute a specific tool.
///
/// Minted by the live-session collaborator and consumed exactly once by the
/// dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    pub invocation_id: String,
}

impl ToolInvocation {
    pub fn new(
        name: impl Into<String>,
        arguments: Map<String, Value>,
        invocation_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments,
            invocation_id: invocation_id.into(),
        }
    }
}

/// The response addressed back to a [`ToolInvocation`].
///
/// `invocation_id` always equals the id of the invocation that triggered it;
/// the payload is either `{"result": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub payload: Value,
    pub invocation_id: String,
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        self.payload.get("error").is_some()
    }
}

/// One line of the user-visible conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub text: String,
}
