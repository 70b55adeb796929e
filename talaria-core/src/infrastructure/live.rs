//! Capability surface of the external live-session collaborator.
//!
//! Audio capture and playback, voice-activity detection, and the streaming
//! wire protocol all live behind these traits; the core only configures a
//! session and reacts to tool invocations delivered through the registered
//! handler.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::types::{ToolDescriptor, ToolInvocation, ToolResult};

/// Callback invoked by the collaborator whenever the remote model emits a
/// tool call. Deliveries are serialised by the collaborator.
pub type ToolCallHandler = Arc<dyn Fn(ToolInvocation) -> ToolResult + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseModality {
    Audio,
    Text,
}

/// Everything a session is configured with at connect time.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub response_modality: ResponseModality,
    pub tools: Vec<ToolDescriptor>,
    pub system_instruction: String,
}

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("failed to connect live session: {message}")]
    Connection { message: String },
    #[error("live session transport error: {message}")]
    Transport { message: String },
    #[error("live session is closed")]
    Closed,
}

#[async_trait]
pub trait LiveSession: Send + Sync + std::fmt::Debug {
    /// Start bidirectional audio streaming, registering the handler for
    /// inbound tool invocations.
    async fn start_audio_conversation(&self, handler: ToolCallHandler) -> Result<(), LiveError>;

    /// Send a text prompt into the running session.
    async fn send_text(&self, text: &str) -> Result<(), LiveError>;

    /// Stop the audio conversation.
    async fn stop_audio_conversation(&self) -> Result<(), LiveError>;
}

#[async_trait]
pub trait LiveBackend: Send + Sync {
    async fn connect(&self, settings: SessionSettings) -> Result<Arc<dyn LiveSession>, LiveError>;
}
