use std::fmt;

/// Where the session is in the download cycle.
///
/// `FlowController` is the only owner and mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Welcome message and entry point shown; HomeControl hidden.
    #[default]
    Initial,
    /// Credential prompt open and accepting input.
    PromptOpen,
    /// A transaction is outstanding for the open prompt.
    InFlight,
    /// The cycle ended: saved, failed (prompt still open for retry), or cancelled.
    Settled,
}

impl SessionState {
    /// The entry point is visible only in the initial view.
    #[must_use]
    pub fn shows_entry_point(self) -> bool {
        self == Self::Initial
    }

    /// HomeControl is visible everywhere except the initial view.
    #[must_use]
    pub fn shows_home_control(self) -> bool {
        self != Self::Initial
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "initial",
            Self::PromptOpen => "prompt-open",
            Self::InFlight => "in-flight",
            Self::Settled => "settled",
        })
    }
}
