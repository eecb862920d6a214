//! Interaction state machine for the report download flow.
//!
//! Pure: inputs are user actions and transaction settlements, outputs are
//! [`Effect`]s. Rendering and IO live in the binary's `app` layer.

mod controller;
mod effect;
mod event;
mod home;
mod log;
mod prompt;
mod state;

pub use controller::{
    CANCELLED_MESSAGE, DOWNLOAD_COMMAND, FlowController, HELP_MESSAGE, IN_FLIGHT_MESSAGE,
    PROMPT_MESSAGE, WELCOME_MESSAGE, failure_message, success_message,
};
pub use effect::Effect;
pub use event::Input;
pub use home::HomeControl;
pub use log::{Message, MessageLog, Sender};
pub use prompt::{
    BUSY_LABEL, CredentialPrompt, PromptAction, PromptField, PromptHandle, PromptId, PromptKey,
    PromptSlot, PromptView, SUBMIT_LABEL, ValidationError,
};
pub use state::SessionState;
