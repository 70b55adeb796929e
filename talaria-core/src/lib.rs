pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::dispatcher::FunctionCallDispatcher;
pub use application::executor::ToolExecutor;
pub use application::registry::ToolRegistry;
pub use application::session::{SessionController, SessionError, SessionState};
pub use application::transcript::Transcript;
pub use config::{ConfigError, LiveConfig};
pub use domain::types::{LogEntry, ToolDescriptor, ToolInvocation, ToolResult};
pub use infrastructure::live::{
    LiveBackend, LiveError, LiveSession, ResponseModality, SessionSettings, ToolCallHandler,
};
pub use infrastructure::permissions::{Capability, PermissionProbe, StaticProbe};
pub use infrastructure::scripted::{ScriptedBackend, ScriptedSession};
