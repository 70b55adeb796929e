//! Offline emulation of the live-session collaborator.
//!
//! The real SDK transport (audio streaming, voice detection, the session
//! wire protocol) is out of scope, so the binary and the end-to-end tests
//! drive a scripted stand-in: it records the settings it was connected
//! with, retains the registered tool-call handler, and turns typed
//! utterances into the tool invocations the emulated model would make.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Map;
use tracing::debug;
use uuid::Uuid;

use super::live::{LiveBackend, LiveError, LiveSession, SessionSettings, ToolCallHandler};
use crate::domain::types::{ToolInvocation, ToolResult};

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    inner: Arc<BackendState>,
}

#[derive(Default)]
struct BackendState {
    connects: AtomicUsize,
    fail_connect: Mutex<Option<String>>,
    current: Mutex<Option<Arc<ScriptedSession>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `connect` fail with a connection error.
    pub fn fail_next_connect(&self, message: impl Into<String>) {
        *self.inner.fail_connect.lock().expect("backend lock") = Some(message.into());
    }

    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    /// The session handed out by the most recent successful connect.
    pub fn session(&self) -> Option<Arc<ScriptedSession>> {
        self.inner.current.lock().expect("backend lock").clone()
    }
}

#[async_trait]
impl LiveBackend for ScriptedBackend {
    async fn connect(&self, settings: SessionSettings) -> Result<Arc<dyn LiveSession>, LiveError> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.inner.fail_connect.lock().expect("backend lock").take() {
            return Err(LiveError::Connection { message });
        }

        debug!(model = %settings.model, tools = settings.tools.len(), "Scripted session connected");
        let session = Arc::new(ScriptedSession::new(settings));
        *self.inner.current.lock().expect("backend lock") = Some(session.clone());
        Ok(session)
    }
}

pub struct ScriptedSession {
    settings: SessionSettings,
    handler: Mutex<Option<ToolCallHandler>>,
    sent: Mutex<Vec<String>>,
    results: Mutex<Vec<ToolResult>>,
    fail_stop: Mutex<Option<String>>,
    stopped: AtomicBool,
}

impl std::fmt::Debug for ScriptedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedSession")
            .field("settings", &self.settings)
            .field("stopped", &self.stopped)
            .finish_non_exhaustive()
    }
}

impl ScriptedSession {
    fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            handler: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            results: Mutex::new(Vec::new()),
            fail_stop: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Text prompts sent into the session, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().expect("session lock").clone()
    }

    /// Results the registered handler produced, in delivery order.
    pub fn tool_results(&self) -> Vec<ToolResult> {
        self.results.lock().expect("session lock").clone()
    }

    /// Make the next `stop_audio_conversation` fail with a transport error.
    pub fn fail_next_stop(&self, message: impl Into<String>) {
        *self.fail_stop.lock().expect("session lock") = Some(message.into());
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Deliver one raw invocation through the registered handler, the way
    /// the collaborator would after the remote model emits a tool call.
    pub fn deliver(&self, invocation: ToolInvocation) -> Option<ToolResult> {
        let handler = self.handler.lock().expect("session lock").clone()?;
        let result = handler(invocation);
        self.results
            .lock()
            .expect("session lock")
            .push(result.clone());
        Some(result)
    }

    /// Simulate one user voice turn and return the model's spoken reply.
    ///
    /// An utterance asking about "one plus one" makes the emulated model
    /// invoke the first advertised tool; anything else gets a canned reply.
    pub fn utter(&self, text: &str) -> String {
        if self.is_stopped() {
            return "The conversation has ended.".to_string();
        }

        let lowered = text.to_lowercase();
        let asks_for_sum = lowered.contains("one plus one")
            || lowered.contains("1 + 1")
            || lowered.contains("1+1");
        if !asks_for_sum {
            return "I can add one and one for you. Ask me what one plus one is!".to_string();
        }

        let Some(tool) = self.settings.tools.first() else {
            return "I have no tools to answer that with.".to_string();
        };
        let invocation =
            ToolInvocation::new(tool.name.clone(), Map::new(), Uuid::new_v4().to_string());
        match self.deliver(invocation) {
            Some(result) => match result.payload.get("result") {
                Some(value) => format!("One plus one is {value}."),
                None => "I could not work that out.".to_string(),
            },
            None => "The conversation has not started yet.".to_string(),
        }
    }
}

#[async_trait]
impl LiveSession for ScriptedSession {
    async fn start_audio_conversation(&self, handler: ToolCallHandler) -> Result<(), LiveError> {
        *self.handler.lock().expect("session lock") = Some(handler);
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), LiveError> {
        if self.is_stopped() {
            return Err(LiveError::Closed);
        }
        self.sent
            .lock()
            .expect("session lock")
            .push(text.to_string());
        Ok(())
    }

    async fn stop_audio_conversation(&self) -> Result<(), LiveError> {
        if let Some(message) = self.fail_stop.lock().expect("session lock").take() {
            return Err(LiveError::Transport { message });
        }
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }
}
