use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::{info, warn};

use super::registry::{ONE_PLUS_ONE, ToolRegistry};
use super::transcript::Transcript;

/// Executes recognised tool calls and turns unknown names into a structured
/// error payload instead of a failure.
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    transcript: Transcript,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, transcript: Transcript) -> Self {
        Self {
            registry,
            transcript,
        }
    }

    /// Produce the payload for a tool call.
    ///
    /// Deterministic for recognised names; unrecognised names yield
    /// `{"error": "Unknown function"}` so the remote model receives a
    /// well-formed negative response.
    pub fn execute(&self, name: &str, _arguments: &Map<String, Value>) -> Value {
        let Some(descriptor) = self.registry.get(name) else {
            self.transcript.append(format!("Unknown function: {name}"));
            warn!(tool = name, "Unknown function requested by model");
            return json!({ "error": "Unknown function" });
        };

        match descriptor.name.as_str() {
            ONE_PLUS_ONE => {
                self.transcript.append("Executing onePlusOne...");
                let result = json!({ "result": 2 });
                self.transcript.append(format!("onePlusOne result: {result}"));
                info!(tool = ONE_PLUS_ONE, "Tool executed");
                result
            }
            other => {
                // Registered descriptor with no bound implementation.
                self.transcript.append(format!("Unknown function: {other}"));
                warn!(tool = other, "Registered tool has no executor");
                json!({ "error": "Unknown function" })
            }
        }
    }
}
