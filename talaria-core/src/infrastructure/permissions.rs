/// Capabilities granted (or not) by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    RecordAudio,
}

/// Queried once before a session start; the controller never touches the
/// backend when the required capability is missing.
pub trait PermissionProbe: Send + Sync {
    fn is_granted(&self, capability: Capability) -> bool;
}

/// Fixed-answer probe for shells and tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe {
    granted: bool,
}

impl StaticProbe {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }
}

impl PermissionProbe for StaticProbe {
    fn is_granted(&self, _capability: Capability) -> bool {
        self.granted
    }
}
