use crate::report::ReportRequest;

use super::log::Message;
use super::prompt::{PromptId, PromptView};

/// Declarative side effects for the rendering layer to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show or hide the entry point.
    SetEntryPointVisible(bool),
    /// Show or hide HomeControl.
    SetHomeVisible(bool),
    /// Append to the transcript and scroll to it.
    AppendMessage(Message),
    /// Drop every transcript entry.
    ClearLog,
    /// Draw a newly created prompt.
    OpenPrompt(PromptView),
    /// Redraw the open prompt.
    UpdatePrompt(PromptView),
    /// Unbind the prompt's inputs, then remove it.
    ClosePrompt(PromptId),
    /// Send the request; report back as `Input::ResponseReceived`.
    BeginTransaction {
        prompt: PromptId,
        request: ReportRequest,
    },
    /// Save a fetched report; report back as `Input::TransactionSettled`.
    SaveReport {
        prompt: PromptId,
        filename: String,
        bytes: Vec<u8>,
    },
}
