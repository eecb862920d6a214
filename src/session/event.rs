use crate::report::{ReportOutcome, Settlement};

use super::prompt::{PromptAction, PromptField, PromptId, PromptKey};

/// Everything that can drive the session: user actions and network outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The "Download report" entry point was activated.
    EntryPointActivated,
    /// Free text typed into the chat input.
    TextEntered(String),
    /// A prompt field changed.
    PromptEdited {
        prompt: PromptId,
        field: PromptField,
        value: String,
    },
    /// A key bound by the prompt was pressed.
    PromptKeyPressed { prompt: PromptId, key: PromptKey },
    /// A prompt button was activated.
    PromptButton {
        prompt: PromptId,
        action: PromptAction,
    },
    /// The request started for `prompt` got a response (or failed to).
    ResponseReceived {
        prompt: PromptId,
        outcome: ReportOutcome,
    },
    /// The transaction started for `prompt` settled.
    TransactionSettled {
        prompt: PromptId,
        settlement: Settlement,
    },
    /// HomeControl was activated.
    HomeActivated,
}
