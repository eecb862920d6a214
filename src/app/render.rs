//! Terminal renderer: carries out session effects as transcript output.

use std::io::{self, Write};

use report_desk::session::{Effect, Message, PromptField, PromptId, PromptView, Sender};
use tracing::debug;

pub(crate) const ENTRY_POINT_LABEL: &str = "[1] Download report";
pub(crate) const HOME_HINT: &str = "(type :home to start over)";
pub(crate) const CLEARED_MARKER: &str = "----------------------------------------";

/// Where the next typed line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Routing {
    Chat {
        entry_point_visible: bool,
    },
    Prompt {
        id: PromptId,
        focus: PromptField,
        enabled: bool,
    },
}

/// Prompt widget as drawn, plus the key routing it registered.
#[derive(Debug)]
struct PromptWidget {
    view: PromptView,
    focus: PromptField,
}

pub(crate) struct TerminalRenderer<W: Write> {
    out: W,
    entry_point_visible: bool,
    home_visible: bool,
    prompt: Option<PromptWidget>,
}

impl<W: Write> TerminalRenderer<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            entry_point_visible: false,
            home_visible: false,
            prompt: None,
        }
    }

    pub(crate) fn routing(&self) -> Routing {
        match &self.prompt {
            Some(widget) => Routing::Prompt {
                id: widget.view.id,
                focus: widget.focus,
                enabled: widget.view.controls_enabled,
            },
            None => Routing::Chat {
                entry_point_visible: self.entry_point_visible,
            },
        }
    }

    /// Moves prompt focus locally (after a field is filled in) and asks for it.
    pub(crate) fn focus(&mut self, field: PromptField) -> io::Result<()> {
        if let Some(widget) = self.prompt.as_mut() {
            widget.focus = field;
            self.ask_for_focused_field()?;
        }
        Ok(())
    }

    pub(crate) fn apply(&mut self, effect: &Effect) -> io::Result<()> {
        match effect {
            Effect::SetEntryPointVisible(visible) => {
                self.entry_point_visible = *visible;
                if *visible {
                    writeln!(self.out, "  {ENTRY_POINT_LABEL}")?;
                }
            }
            Effect::SetHomeVisible(visible) => {
                if *visible && !self.home_visible {
                    writeln!(self.out, "  {HOME_HINT}")?;
                }
                self.home_visible = *visible;
            }
            Effect::AppendMessage(message) => self.write_message(message)?,
            Effect::ClearLog => writeln!(self.out, "{CLEARED_MARKER}")?,
            Effect::OpenPrompt(view) => {
                writeln!(
                    self.out,
                    "  Sign in ({} report). Type :esc to cancel.",
                    view.format
                )?;
                self.prompt = Some(PromptWidget {
                    view: view.clone(),
                    focus: view.focus,
                });
                self.ask_for_focused_field()?;
            }
            Effect::UpdatePrompt(view) => self.update_prompt(view)?,
            Effect::ClosePrompt(id) => {
                // Unbind the prompt's routing before the widget goes away.
                if self.prompt.as_ref().is_some_and(|w| w.view.id == *id) {
                    self.prompt = None;
                    debug!(prompt = %id, "prompt routing removed");
                }
            }
            Effect::BeginTransaction { .. } | Effect::SaveReport { .. } => {}
        }
        self.out.flush()
    }

    fn update_prompt(&mut self, view: &PromptView) -> io::Result<()> {
        let Some(widget) = self.prompt.as_mut().filter(|w| w.view.id == view.id) else {
            return Ok(());
        };
        widget.view = view.clone();
        if !view.controls_enabled {
            writeln!(self.out, "  [{}]", view.submit_label)?;
            return Ok(());
        }
        widget.focus = view.focus;
        if let Some(error) = &view.inline_error {
            writeln!(self.out, "  ! {error}")?;
        }
        self.ask_for_focused_field()
    }

    fn ask_for_focused_field(&mut self) -> io::Result<()> {
        let Some(widget) = &self.prompt else {
            return Ok(());
        };
        if !widget.view.controls_enabled {
            return Ok(());
        }
        match widget.focus {
            PromptField::Username => write!(self.out, "  Username: ")?,
            PromptField::Password => write!(self.out, "  Password: ")?,
        }
        self.out.flush()
    }

    fn write_message(&mut self, message: &Message) -> io::Result<()> {
        let tag = match message.sender() {
            Sender::System => "system",
            Sender::User => "you",
        };
        for line in message.lines() {
            writeln!(self.out, "[{tag}] {line}")?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}
