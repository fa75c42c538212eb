/// Whether an immersive session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Inactive,
    Active,
}

impl SessionState {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Sole writer of [`SessionState`], driven by the host XR runtime's
/// session-start and session-end signals. Last write wins.
#[derive(Debug, Default)]
pub struct SessionGate {
    state: SessionState,
    transitions: u64,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of state changes seen so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Session-start signal. Returns true if the state changed.
    pub fn session_started(&mut self) -> bool {
        self.set(SessionState::Active)
    }

    /// Session-end signal. Returns true if the state changed.
    pub fn session_ended(&mut self) -> bool {
        self.set(SessionState::Inactive)
    }

    fn set(&mut self, state: SessionState) -> bool {
        if self.state == state {
            tracing::debug!(?state, "session signal repeated");
            return false;
        }
        self.state = state;
        self.transitions += 1;
        tracing::info!(?state, "session state changed");
        true
    }
}
