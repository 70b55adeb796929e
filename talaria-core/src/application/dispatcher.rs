use std::sync::Arc;

use tracing::{debug, info};

use super::executor::ToolExecutor;
use super::transcript::Transcript;
use crate::domain::types::{ToolInvocation, ToolResult};
use crate::infrastructure::live::ToolCallHandler;

/// Routes one inbound tool invocation to the executor and addresses the
/// result back to the invocation that triggered it.
///
/// The dispatcher never decides what a tool computes; it only guarantees the
/// response carries the original tool name and invocation id. The live
/// collaborator delivers at most one invocation at a time and waits for the
/// return value, so `handle` runs to completion without interleaving.
#[derive(Clone)]
pub struct FunctionCallDispatcher {
    executor: Arc<ToolExecutor>,
    transcript: Transcript,
}

impl FunctionCallDispatcher {
    pub fn new(executor: Arc<ToolExecutor>, transcript: Transcript) -> Self {
        Self {
            executor,
            transcript,
        }
    }

    pub fn handle(&self, invocation: ToolInvocation) -> ToolResult {
        self.transcript
            .append(format!("Function called: {}", invocation.name));
        debug!(
            tool = %invocation.name,
            arguments = ?invocation.arguments,
            invocation_id = %invocation.invocation_id,
            "Function call received"
        );

        let payload = self
            .executor
            .execute(&invocation.name, &invocation.arguments);
        let result = ToolResult {
            name: invocation.name,
            payload,
            invocation_id: invocation.invocation_id,
        };

        self.transcript.append("Returning function response");
        info!(
            tool = %result.name,
            success = !result.is_error(),
            "Function call dispatched"
        );
        result
    }

    /// The explicit function value handed to the collaborator at
    /// session-open time.
    pub fn into_handler(self) -> ToolCallHandler {
        Arc::new(move |invocation| self.handle(invocation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::ToolRegistry;
    use serde_json::{Map, json};

    fn dispatcher() -> FunctionCallDispatcher {
        let transcript = Transcript::new();
        let registry = Arc::new(ToolRegistry::builtin());
        let executor = Arc::new(ToolExecutor::new(registry, transcript.clone()));
        FunctionCallDispatcher::new(executor, transcript)
    }

    #[test]
    fn recognised_call_round_trips_name_and_id() {
        let dispatcher = dispatcher();
        let invocation = ToolInvocation::new("onePlusOne", Map::new(), "abc");

        let result = dispatcher.handle(invocation);

        assert_eq!(result.name, "onePlusOne");
        assert_eq!(result.invocation_id, "abc");
        assert_eq!(result.payload, json!({ "result": 2 }));
        assert!(!result.is_error());
    }

    #[test]
    fn unrecognised_call_round_trips_name_and_id() {
        let dispatcher = dispatcher();
        let invocation = ToolInvocation::new("subtract", Map::new(), "xyz");

        let result = dispatcher.handle(invocation);

        assert_eq!(result.name, "subtract");
        assert_eq!(result.invocation_id, "xyz");
        assert_eq!(result.payload, json!({ "error": "Unknown function" }));
        assert!(result.is_error());
    }

    #[test]
    fn handler_closure_dispatches_like_handle() {
        let handler = dispatcher().into_handler();
        let result = handler(ToolInvocation::new("onePlusOne", Map::new(), "id-1"));
        assert_eq!(result.invocation_id, "id-1");
        assert_eq!(result.payload, json!({ "result": 2 }));
    }
}
