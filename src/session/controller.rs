//! Session state machine.
//!
//! `FlowController::handle` takes one [`Input`] and returns the [`Effect`]s the
//! renderer must carry out. It never performs IO itself. A submit is answered
//! by [`Effect::BeginTransaction`], whose response comes back as
//! [`Input::ResponseReceived`]; only a response for the prompt still waiting
//! on it yields [`Effect::SaveReport`], which settles as
//! [`Input::TransactionSettled`].

use tracing::{debug, info, instrument, warn};

use crate::report::{ReportOptions, ReportOutcome, ReportRequest, Settlement};

use super::effect::Effect;
use super::event::Input;
use super::home::HomeControl;
use super::log::{Message, MessageLog};
use super::prompt::{CredentialPrompt, PromptAction, PromptHandle, PromptId, PromptSlot};
use super::state::SessionState;

pub const WELCOME_MESSAGE: &str = "Welcome to the report desk.\n\
     Select \"Download report\" or type \"download\" to get the latest report.";
pub const HELP_MESSAGE: &str =
    "I can fetch the report for you. Type \"download\" or select \"Download report\" to begin.";
pub const PROMPT_MESSAGE: &str = "Please sign in to download the report.";
pub const IN_FLIGHT_MESSAGE: &str = "Checking your credentials and preparing the report...";
pub const CANCELLED_MESSAGE: &str = "Download cancelled.";

/// Case-insensitive text trigger for the entry point.
pub const DOWNLOAD_COMMAND: &str = "download";

/// Owns the session state and every UI-level resource.
#[derive(Debug)]
pub struct FlowController {
    state: SessionState,
    log: MessageLog,
    prompt: PromptSlot,
    home: Option<HomeControl>,
    options: ReportOptions,
}

impl FlowController {
    /// Creates a controller; call [`start`](Self::start) to render the initial view.
    #[must_use]
    pub fn new(options: ReportOptions) -> Self {
        Self {
            state: SessionState::Initial,
            log: MessageLog::new(),
            prompt: PromptSlot::new(),
            home: None,
            options,
        }
    }

    /// Renders the initial view.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.enter_initial(&mut effects);
        effects
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&CredentialPrompt> {
        self.prompt.active()
    }

    /// Prompt instances created over the session's lifetime.
    #[must_use]
    pub fn prompts_opened(&self) -> u64 {
        self.prompt.opened_count()
    }

    #[must_use]
    pub fn entry_point_visible(&self) -> bool {
        self.state.shows_entry_point()
    }

    #[must_use]
    pub fn home_visible(&self) -> bool {
        self.home.as_ref().is_some_and(HomeControl::is_visible)
    }

    /// Applies one input.
    #[instrument(level = "debug", skip(self, input), fields(state = %self.state))]
    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        let mut effects = Vec::new();
        match input {
            Input::EntryPointActivated => self.on_entry_point(&mut effects),
            Input::TextEntered(text) => self.on_text(&text, &mut effects),
            Input::PromptEdited {
                prompt,
                field,
                value,
            } => {
                if let Some(active) = self.prompt.get_mut(prompt) {
                    active.edit(field, value);
                } else {
                    debug!(%prompt, "edit for inactive prompt dropped");
                }
            }
            Input::PromptKeyPressed { prompt, key } => {
                self.on_prompt_action(prompt, key.action(), &mut effects);
            }
            Input::PromptButton { prompt, action } => {
                self.on_prompt_action(prompt, action, &mut effects);
            }
            Input::ResponseReceived { prompt, outcome } => {
                self.on_response(prompt, outcome, &mut effects);
            }
            Input::TransactionSettled { prompt, settlement } => {
                self.on_settled(prompt, settlement, &mut effects);
            }
            Input::HomeActivated => self.reset(&mut effects),
        }
        debug!(state = %self.state, effects = effects.len(), "input handled");
        effects
    }

    fn on_entry_point(&mut self, effects: &mut Vec<Effect>) {
        if !self.state.shows_entry_point() {
            debug!("entry point activated while hidden; ignoring");
            return;
        }
        self.open_prompt(effects);
    }

    fn on_text(&mut self, text: &str, effects: &mut Vec<Effect>) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.append(Message::user(text), effects);

        if text.to_lowercase().contains(DOWNLOAD_COMMAND) {
            self.open_prompt(effects);
        } else {
            self.append(Message::system(HELP_MESSAGE), effects);
        }
    }

    fn open_prompt(&mut self, effects: &mut Vec<Effect>) {
        let id = match self.prompt.open(self.options.format) {
            PromptHandle::Existing(_) => return,
            PromptHandle::Opened(id) => id,
        };

        self.state = SessionState::PromptOpen;
        effects.push(Effect::SetEntryPointVisible(self.state.shows_entry_point()));
        self.append(Message::system(PROMPT_MESSAGE), effects);
        if let Some(prompt) = self.prompt.get_mut(id) {
            effects.push(Effect::OpenPrompt(prompt.view()));
        }
        self.sync_home(effects);
        info!(prompt = %id, "credential prompt shown");
    }

    fn on_prompt_action(&mut self, id: PromptId, action: PromptAction, effects: &mut Vec<Effect>) {
        let Some(prompt) = self.prompt.get_mut(id) else {
            debug!(prompt = %id, ?action, "action for inactive prompt dropped");
            return;
        };
        if !prompt.controls_enabled() {
            debug!(prompt = %id, ?action, "prompt controls disabled; action dropped");
            return;
        }

        match action {
            PromptAction::Submit => match prompt.submit() {
                Err(error) => {
                    debug!(prompt = %id, %error, "credential validation failed");
                    effects.push(Effect::UpdatePrompt(prompt.view()));
                }
                Ok(credentials) => {
                    effects.push(Effect::UpdatePrompt(prompt.view()));
                    let request = ReportRequest::new(credentials, &self.options);
                    self.state = SessionState::InFlight;
                    self.append(Message::system(IN_FLIGHT_MESSAGE), effects);
                    effects.push(Effect::BeginTransaction {
                        prompt: id,
                        request,
                    });
                    info!(prompt = %id, "report transaction requested");
                }
            },
            PromptAction::Cancel => {
                self.close_prompt(effects);
                self.append(Message::system(CANCELLED_MESSAGE), effects);
                self.state = SessionState::Settled;
                self.sync_home(effects);
                info!(prompt = %id, "credential prompt cancelled");
            }
        }
    }

    /// True while `id` is the open, busy prompt of an in-flight transaction.
    fn awaiting(&self, id: PromptId) -> bool {
        self.state == SessionState::InFlight
            && self
                .prompt
                .active()
                .is_some_and(|prompt| prompt.id() == id && prompt.is_busy())
    }

    fn on_response(&mut self, id: PromptId, outcome: ReportOutcome, effects: &mut Vec<Effect>) {
        if !self.awaiting(id) {
            warn!(prompt = %id, state = %self.state, "stale response dropped before save");
            return;
        }
        match outcome.into_result() {
            Ok((filename, bytes)) => {
                debug!(prompt = %id, %filename, "response accepted; saving");
                effects.push(Effect::SaveReport {
                    prompt: id,
                    filename,
                    bytes,
                });
            }
            Err(error) => self.on_settled(id, Settlement::Failed(error), effects),
        }
    }

    fn on_settled(&mut self, id: PromptId, settlement: Settlement, effects: &mut Vec<Effect>) {
        if !self.awaiting(id) {
            warn!(prompt = %id, state = %self.state, "stale transaction result dropped");
            return;
        }

        match settlement {
            Settlement::Saved { filename, location } => {
                let saved_as = location
                    .file_name()
                    .map_or(filename, |name| name.to_string_lossy().into_owned());
                self.close_prompt(effects);
                self.append(Message::system(success_message(&saved_as)), effects);
                info!(filename = %saved_as, location = %location.display(), "download settled");
            }
            Settlement::Failed(error) => {
                let message = error.to_string();
                if let Some(prompt) = self.prompt.get_mut(id) {
                    prompt.show_failure(message.clone());
                    effects.push(Effect::UpdatePrompt(prompt.view()));
                }
                self.append(Message::system(failure_message(&message)), effects);
                warn!(prompt = %id, %message, "download failed");
            }
        }
        self.state = SessionState::Settled;
        self.sync_home(effects);
    }

    /// Returns to the initial view from any state. An outstanding request
    /// keeps running; its response no longer matches and is dropped unsaved.
    fn reset(&mut self, effects: &mut Vec<Effect>) {
        if self.state == SessionState::InFlight {
            info!("abandoning in-flight transaction on reset");
        }
        self.close_prompt(effects);
        self.log.clear();
        effects.push(Effect::ClearLog);
        self.enter_initial(effects);
        info!("session reset");
    }

    fn enter_initial(&mut self, effects: &mut Vec<Effect>) {
        self.state = SessionState::Initial;
        self.append(Message::system(WELCOME_MESSAGE), effects);
        effects.push(Effect::SetEntryPointVisible(self.state.shows_entry_point()));
        self.sync_home(effects);
    }

    fn close_prompt(&mut self, effects: &mut Vec<Effect>) {
        if let Some(id) = self.prompt.close() {
            effects.push(Effect::ClosePrompt(id));
        }
    }

    /// HomeControl follows the state; it is only created once first revealed.
    fn sync_home(&mut self, effects: &mut Vec<Effect>) {
        let visible = self.state.shows_home_control();
        if !visible && self.home.is_none() {
            effects.push(Effect::SetHomeVisible(false));
            return;
        }
        HomeControl::ensure(&mut self.home).set_visible(visible);
        effects.push(Effect::SetHomeVisible(visible));
    }

    fn append(&mut self, message: Message, effects: &mut Vec<Effect>) {
        self.log.append(message.clone());
        effects.push(Effect::AppendMessage(message));
    }
}

#[must_use]
pub fn success_message(filename: &str) -> String {
    format!("Report downloaded: {filename}")
}

#[must_use]
pub fn failure_message(message: &str) -> String {
    format!("Download failed: {message}")
}
