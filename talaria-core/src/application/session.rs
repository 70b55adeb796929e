use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::dispatcher::FunctionCallDispatcher;
use super::executor::ToolExecutor;
use super::registry::ToolRegistry;
use super::transcript::Transcript;
use crate::config::LiveConfig;
use crate::infrastructure::live::{
    LiveBackend, LiveError, LiveSession, ResponseModality, SessionSettings,
};
use crate::infrastructure::permissions::{Capability, PermissionProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("audio recording permission has not been granted")]
    PermissionDenied,
    #[error("a conversation is already active")]
    AlreadyActive,
    #[error("no conversation is active")]
    NotActive,
    #[error(transparent)]
    Live(#[from] LiveError),
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::PermissionDenied => "Audio permission required".to_string(),
            SessionError::AlreadyActive => "A conversation is already running".to_string(),
            SessionError::NotActive => "No conversation is running".to_string(),
            SessionError::Live(err) => format!("Session error: {err}"),
        }
    }
}

/// Owns the single live session and the Idle/Active state machine.
///
/// The session slot is the only mutation path: a handle present means a
/// conversation is active, absent means idle. The slot lock is held across
/// a whole transition, so overlapping toggles serialise instead of racing.
pub struct SessionController<B: LiveBackend> {
    backend: B,
    probe: Arc<dyn PermissionProbe>,
    registry: Arc<ToolRegistry>,
    dispatcher: FunctionCallDispatcher,
    config: LiveConfig,
    transcript: Transcript,
    session: Mutex<Option<Arc<dyn LiveSession>>>,
}

impl<B: LiveBackend> SessionController<B> {
    pub fn new(
        backend: B,
        probe: Arc<dyn PermissionProbe>,
        registry: Arc<ToolRegistry>,
        config: LiveConfig,
        transcript: Transcript,
    ) -> Self {
        let executor = Arc::new(ToolExecutor::new(registry.clone(), transcript.clone()));
        let dispatcher = FunctionCallDispatcher::new(executor, transcript.clone());
        Self {
            backend,
            probe,
            registry,
            dispatcher,
            config,
            transcript,
            session: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> SessionState {
        if self.session.lock().await.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub async fn is_active(&self) -> bool {
        self.state().await == SessionState::Active
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Open a session: permission gate, connect, audio start, greeting.
    ///
    /// Only valid from Idle. A failure at any step discards whatever was
    /// partially constructed and leaves the controller Idle.
    pub async fn start(&self) -> Result<(), SessionError> {
        let mut slot = self.session.lock().await;
        if slot.is_some() {
            return Err(SessionError::AlreadyActive);
        }

        if !self.probe.is_granted(Capability::RecordAudio) {
            self.transcript.append("Audio permission required");
            warn!("Session start refused: audio permission missing");
            return Err(SessionError::PermissionDenied);
        }

        self.transcript.append("Starting audio conversation...");
        let settings = SessionSettings {
            model: self.config.model.clone(),
            response_modality: ResponseModality::Audio,
            tools: self.registry.describe(),
            system_instruction: self.config.system_instruction.clone(),
        };
        debug!(
            model = %settings.model,
            tools = settings.tools.len(),
            "Configured live model"
        );

        self.transcript.append("Connecting to session...");
        let session = match self.backend.connect(settings).await {
            Ok(session) => session,
            Err(err) => {
                self.transcript.append(format!("Error: {err}"));
                warn!(%err, "Live session connect failed");
                return Err(err.into());
            }
        };
        self.transcript.append("Session connected");

        let handler = self.dispatcher.clone().into_handler();
        if let Err(err) = session.start_audio_conversation(handler).await {
            self.discard_partial(session, &err).await;
            return Err(err.into());
        }

        self.transcript.append("Sending initial greeting...");
        if let Err(err) = session.send_text(&self.config.greeting).await {
            self.discard_partial(session, &err).await;
            return Err(err.into());
        }
        self.transcript.append("Greeting sent");

        *slot = Some(session);
        self.transcript.append("Audio conversation started");
        info!(model = %self.config.model, "Live session active");
        Ok(())
    }

    /// Close the active session. Only valid from Active.
    ///
    /// The handle is discarded before the collaborator is asked to stop, so
    /// a failure inside `stop_audio_conversation` still leaves the
    /// controller Idle.
    pub async fn stop(&self) -> Result<(), SessionError> {
        let mut slot = self.session.lock().await;
        let Some(session) = slot.take() else {
            return Err(SessionError::NotActive);
        };

        self.transcript.append("Stopping audio conversation...");
        match session.stop_audio_conversation().await {
            Ok(()) => {
                self.transcript.append("Audio conversation stopped");
                info!("Live session closed");
                Ok(())
            }
            Err(err) => {
                self.transcript.append(format!("Error: {err}"));
                warn!(%err, "Stop failed; session discarded");
                Err(err.into())
            }
        }
    }

    async fn discard_partial(&self, session: Arc<dyn LiveSession>, err: &LiveError) {
        if let Err(stop_err) = session.stop_audio_conversation().await {
            debug!(%stop_err, "Cleanup of partially started session failed");
        }
        self.transcript.append(format!("Error: {err}"));
        warn!(%err, "Live session start aborted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::live::ToolCallHandler;
    use crate::infrastructure::permissions::StaticProbe;
    use crate::infrastructure::scripted::ScriptedBackend;
    use async_trait::async_trait;

    fn controller_with(
        backend: ScriptedBackend,
        probe: StaticProbe,
    ) -> SessionController<ScriptedBackend> {
        SessionController::new(
            backend,
            Arc::new(probe),
            Arc::new(ToolRegistry::builtin()),
            LiveConfig::default(),
            Transcript::new(),
        )
    }

    #[tokio::test]
    async fn denied_permission_never_touches_the_backend() {
        let backend = ScriptedBackend::new();
        let controller = controller_with(backend.clone(), StaticProbe::denied());

        let err = controller.start().await.expect_err("must refuse");

        assert!(matches!(err, SessionError::PermissionDenied));
        assert_eq!(backend.connect_count(), 0);
        assert_eq!(controller.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn failed_connect_leaves_idle() {
        let backend = ScriptedBackend::new();
        backend.fail_next_connect("no route to host");
        let controller = controller_with(backend.clone(), StaticProbe::granted());

        let err = controller.start().await.expect_err("connect fails");

        assert!(matches!(err, SessionError::Live(LiveError::Connection { .. })));
        assert_eq!(controller.state().await, SessionState::Idle);
        assert!(backend.session().is_none());
    }

    #[tokio::test]
    async fn start_configures_and_greets() {
        let backend = ScriptedBackend::new();
        let controller = controller_with(backend.clone(), StaticProbe::granted());

        controller.start().await.expect("start succeeds");

        assert_eq!(controller.state().await, SessionState::Active);
        let session = backend.session().expect("session retained");
        let settings = session.settings();
        assert_eq!(settings.model, LiveConfig::default().model);
        assert_eq!(settings.response_modality, ResponseModality::Audio);
        assert_eq!(settings.tools.len(), 1);
        assert_eq!(settings.tools[0].name, "onePlusOne");
        assert_eq!(session.sent_texts(), vec![LiveConfig::default().greeting]);
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let backend = ScriptedBackend::new();
        let controller = controller_with(backend.clone(), StaticProbe::granted());

        controller.start().await.expect("first start");
        let err = controller.start().await.expect_err("second start");

        assert!(matches!(err, SessionError::AlreadyActive));
        assert_eq!(backend.connect_count(), 1);
        assert_eq!(controller.state().await, SessionState::Active);
    }

    #[tokio::test]
    async fn stop_returns_to_idle() {
        let backend = ScriptedBackend::new();
        let controller = controller_with(backend.clone(), StaticProbe::granted());

        controller.start().await.expect("start");
        controller.stop().await.expect("stop");

        assert_eq!(controller.state().await, SessionState::Idle);
        assert!(backend.session().expect("session").is_stopped());
    }

    #[tokio::test]
    async fn stop_without_session_is_rejected() {
        let backend = ScriptedBackend::new();
        let controller = controller_with(backend, StaticProbe::granted());

        let err = controller.stop().await.expect_err("nothing to stop");
        assert!(matches!(err, SessionError::NotActive));
    }

    #[tokio::test]
    async fn failed_stop_still_forces_idle() {
        let backend = ScriptedBackend::new();
        let controller = controller_with(backend.clone(), StaticProbe::granted());

        controller.start().await.expect("start");
        backend
            .session()
            .expect("session")
            .fail_next_stop("socket torn down");

        let err = controller.stop().await.expect_err("stop fails");
        assert!(matches!(err, SessionError::Live(LiveError::Transport { .. })));
        assert_eq!(controller.state().await, SessionState::Idle);
    }

    #[derive(Debug)]
    struct GreetingRefusingSession;

    #[async_trait]
    impl LiveSession for GreetingRefusingSession {
        async fn start_audio_conversation(
            &self,
            _handler: ToolCallHandler,
        ) -> Result<(), LiveError> {
            Ok(())
        }

        async fn send_text(&self, _text: &str) -> Result<(), LiveError> {
            Err(LiveError::Transport {
                message: "greeting rejected".to_string(),
            })
        }

        async fn stop_audio_conversation(&self) -> Result<(), LiveError> {
            Ok(())
        }
    }

    struct GreetingRefusingBackend;

    #[async_trait]
    impl LiveBackend for GreetingRefusingBackend {
        async fn connect(
            &self,
            _settings: SessionSettings,
        ) -> Result<Arc<dyn LiveSession>, LiveError> {
            Ok(Arc::new(GreetingRefusingSession))
        }
    }

    #[tokio::test]
    async fn failed_greeting_discards_the_partial_session() {
        let controller = SessionController::new(
            GreetingRefusingBackend,
            Arc::new(StaticProbe::granted()),
            Arc::new(ToolRegistry::builtin()),
            LiveConfig::default(),
            Transcript::new(),
        );

        let err = controller.start().await.expect_err("greeting fails");

        assert!(matches!(err, SessionError::Live(LiveError::Transport { .. })));
        assert_eq!(controller.state().await, SessionState::Idle);
        let lines: Vec<String> = controller
            .transcript()
            .snapshot()
            .into_iter()
            .map(|entry| entry.text)
            .collect();
        assert!(lines.iter().any(|line| line.starts_with("Error:")));
    }
}
