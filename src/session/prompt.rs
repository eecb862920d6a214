//! Credential prompt gating the download.
//!
//! Only one prompt exists at a time. [`PromptSlot`] owns it and opening while
//! one is active hands back the existing instance without touching it.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::report::{Credentials, ReportFormat};

/// Identity of one prompt instance. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromptId(u64);

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prompt-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptField {
    Username,
    Password,
}

/// Prompt buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    Submit,
    Cancel,
}

/// Keys the prompt binds while it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKey {
    Enter,
    Escape,
}

impl PromptKey {
    /// `Enter` submits, `Escape` cancels.
    #[must_use]
    pub fn action(self) -> PromptAction {
        match self {
            Self::Enter => PromptAction::Submit,
            Self::Escape => PromptAction::Cancel,
        }
    }
}

/// Local validation failure; never reaches the network or the message log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter both username and password.")]
    MissingCredentials,
}

pub const SUBMIT_LABEL: &str = "Download";
pub const BUSY_LABEL: &str = "Downloading...";

/// What the renderer needs to draw the prompt. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    pub id: PromptId,
    pub format: ReportFormat,
    pub username: String,
    pub controls_enabled: bool,
    pub submit_label: &'static str,
    pub inline_error: Option<String>,
    pub focus: PromptField,
}

/// The open credential dialog.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPrompt {
    id: PromptId,
    format: ReportFormat,
    username: String,
    password: String,
    controls_enabled: bool,
    busy: bool,
    inline_error: Option<String>,
    focus: PromptField,
}

impl CredentialPrompt {
    fn new(id: PromptId, format: ReportFormat) -> Self {
        Self {
            id,
            format,
            username: String::new(),
            password: String::new(),
            controls_enabled: true,
            busy: false,
            inline_error: None,
            focus: PromptField::Username,
        }
    }

    #[must_use]
    pub fn id(&self) -> PromptId {
        self.id
    }

    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    #[must_use]
    pub fn focus(&self) -> PromptField {
        self.focus
    }

    /// Updates a field. Ignored while the controls are disabled.
    pub fn edit(&mut self, field: PromptField, value: String) -> bool {
        if !self.controls_enabled {
            debug!(prompt = %self.id, "edit ignored while request is in flight");
            return false;
        }
        match field {
            PromptField::Username => self.username = value,
            PromptField::Password => self.password = value,
        }
        self.focus = field;
        true
    }

    /// Validates the fields and, when they pass, locks the prompt.
    ///
    /// The username is trimmed; the password is taken as typed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCredentials`] when either field is
    /// empty. The inline error is set and focus moves back to the username.
    pub fn submit(&mut self) -> Result<Credentials, ValidationError> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            let error = ValidationError::MissingCredentials;
            self.inline_error = Some(error.to_string());
            self.focus = PromptField::Username;
            return Err(error);
        }

        let credentials = Credentials {
            username: username.to_string(),
            password: self.password.clone(),
        };
        self.controls_enabled = false;
        self.busy = true;
        self.inline_error = None;
        Ok(credentials)
    }

    /// Re-enables the prompt after a failed transaction and shows the error.
    pub fn show_failure(&mut self, message: impl Into<String>) {
        self.controls_enabled = true;
        self.busy = false;
        self.inline_error = Some(message.into());
    }

    #[must_use]
    pub fn view(&self) -> PromptView {
        PromptView {
            id: self.id,
            format: self.format,
            username: self.username.clone(),
            controls_enabled: self.controls_enabled,
            submit_label: if self.busy { BUSY_LABEL } else { SUBMIT_LABEL },
            inline_error: self.inline_error.clone(),
            focus: self.focus,
        }
    }
}

impl fmt::Debug for CredentialPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPrompt")
            .field("id", &self.id)
            .field("format", &self.format)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("controls_enabled", &self.controls_enabled)
            .field("busy", &self.busy)
            .field("inline_error", &self.inline_error)
            .finish()
    }
}

/// Result of [`PromptSlot::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptHandle {
    /// A new prompt was created.
    Opened(PromptId),
    /// A prompt was already open; nothing changed.
    Existing(PromptId),
}

impl PromptHandle {
    #[must_use]
    pub fn id(self) -> PromptId {
        match self {
            Self::Opened(id) | Self::Existing(id) => id,
        }
    }
}

/// Owner of the single prompt instance.
#[derive(Debug, Default)]
pub struct PromptSlot {
    active: Option<CredentialPrompt>,
    next_id: u64,
}

impl PromptSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a prompt, or returns the one already open.
    pub fn open(&mut self, format: ReportFormat) -> PromptHandle {
        if let Some(existing) = &self.active {
            warn!(prompt = %existing.id, "credential prompt already open; reusing it");
            return PromptHandle::Existing(existing.id);
        }
        self.next_id += 1;
        let id = PromptId(self.next_id);
        self.active = Some(CredentialPrompt::new(id, format));
        debug!(prompt = %id, %format, "credential prompt opened");
        PromptHandle::Opened(id)
    }

    #[must_use]
    pub fn active(&self) -> Option<&CredentialPrompt> {
        self.active.as_ref()
    }

    /// The open prompt, only if it is the instance `id` names.
    pub fn get_mut(&mut self, id: PromptId) -> Option<&mut CredentialPrompt> {
        self.active.as_mut().filter(|prompt| prompt.id == id)
    }

    /// Removes the open prompt. Inputs addressed to it are dropped afterwards.
    pub fn close(&mut self) -> Option<PromptId> {
        let closed = self.active.take().map(|prompt| prompt.id);
        if let Some(id) = closed {
            debug!(prompt = %id, "credential prompt closed");
        }
        closed
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Number of prompt instances created this session.
    #[must_use]
    pub fn opened_count(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn open_prompt() -> (PromptSlot, PromptId) {
        let mut slot = PromptSlot::new();
        let id = slot.open(ReportFormat::Csv).id();
        (slot, id)
    }

    #[test]
    fn test_second_open_returns_existing_instance() {
        let (mut slot, id) = open_prompt();
        slot.get_mut(id)
            .unwrap()
            .edit(PromptField::Username, "alice".to_string());
        let before = slot.active().cloned();

        let handle = slot.open(ReportFormat::Xlsx);

        assert_eq!(handle, PromptHandle::Existing(id));
        assert_eq!(slot.opened_count(), 1);
        assert_eq!(slot.active().cloned(), before);
    }

    #[test]
    fn test_ids_are_not_reused_after_close() {
        let (mut slot, first) = open_prompt();
        assert_eq!(slot.close(), Some(first));
        let second = slot.open(ReportFormat::Csv).id();
        assert!(second > first);
        assert!(slot.get_mut(first).is_none());
    }

    #[test]
    fn test_submit_rejects_blank_username_and_refocuses() {
        let (mut slot, id) = open_prompt();
        let prompt = slot.get_mut(id).unwrap();
        prompt.edit(PromptField::Username, "   ".to_string());
        prompt.edit(PromptField::Password, "secret".to_string());

        assert_eq!(prompt.submit(), Err(ValidationError::MissingCredentials));
        assert_eq!(prompt.focus(), PromptField::Username);
        assert!(prompt.controls_enabled());
        assert_eq!(
            prompt.inline_error(),
            Some("Please enter both username and password.")
        );
    }

    #[test]
    fn test_submit_rejects_empty_password() {
        let (mut slot, id) = open_prompt();
        let prompt = slot.get_mut(id).unwrap();
        prompt.edit(PromptField::Username, "alice".to_string());
        assert!(prompt.submit().is_err());
    }

    #[test]
    fn test_submit_trims_username_but_not_password() {
        let (mut slot, id) = open_prompt();
        let prompt = slot.get_mut(id).unwrap();
        prompt.edit(PromptField::Username, "  alice ".to_string());
        prompt.edit(PromptField::Password, " pass ".to_string());

        let credentials = prompt.submit().unwrap();

        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password, " pass ");
        assert!(!prompt.controls_enabled());
        assert_eq!(prompt.view().submit_label, BUSY_LABEL);
    }

    #[test]
    fn test_whitespace_password_is_accepted() {
        let (mut slot, id) = open_prompt();
        let prompt = slot.get_mut(id).unwrap();
        prompt.edit(PromptField::Username, "alice".to_string());
        prompt.edit(PromptField::Password, " ".to_string());
        assert!(prompt.submit().is_ok());
    }

    #[test]
    fn test_edits_ignored_while_busy() {
        let (mut slot, id) = open_prompt();
        let prompt = slot.get_mut(id).unwrap();
        prompt.edit(PromptField::Username, "alice".to_string());
        prompt.edit(PromptField::Password, "pw".to_string());
        prompt.submit().unwrap();

        assert!(!prompt.edit(PromptField::Username, "mallory".to_string()));
        assert_eq!(prompt.view().username, "alice");
    }

    #[test]
    fn test_show_failure_reenables_controls() {
        let (mut slot, id) = open_prompt();
        let prompt = slot.get_mut(id).unwrap();
        prompt.edit(PromptField::Username, "alice".to_string());
        prompt.edit(PromptField::Password, "pw".to_string());
        prompt.submit().unwrap();

        prompt.show_failure("bad credentials");

        assert!(prompt.controls_enabled());
        assert!(!prompt.is_busy());
        assert_eq!(prompt.view().submit_label, SUBMIT_LABEL);
        assert_eq!(prompt.inline_error(), Some("bad credentials"));
    }

    #[test]
    fn test_keys_map_to_actions() {
        assert_eq!(PromptKey::Enter.action(), PromptAction::Submit);
        assert_eq!(PromptKey::Escape.action(), PromptAction::Cancel);
    }

    #[test]
    fn test_debug_redacts_password() {
        let (mut slot, id) = open_prompt();
        slot.get_mut(id)
            .unwrap()
            .edit(PromptField::Password, "hunter2".to_string());
        assert!(!format!("{:?}", slot.active().unwrap()).contains("hunter2"));
    }
}
