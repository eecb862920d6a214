//! Maps typed lines onto session inputs according to the current routing.

use report_desk::session::{Input, PromptField, PromptKey};

use super::render::Routing;

pub(crate) const QUIT_COMMAND: &str = ":quit";
pub(crate) const HOME_COMMAND: &str = ":home";
pub(crate) const ESCAPE_COMMAND: &str = ":esc";
const ENTRY_POINT_SHORTCUT: &str = "1";
const ESCAPE_CHAR: &str = "\u{1b}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Routed {
    Inputs(Vec<Input>),
    Quit,
    /// The prompt is disabled while a transaction runs; the line is dropped.
    Busy,
    Empty,
}

pub(crate) fn route_line(line: &str, routing: &Routing) -> Routed {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case(QUIT_COMMAND) {
        return Routed::Quit;
    }
    if trimmed.eq_ignore_ascii_case(HOME_COMMAND) {
        return Routed::Inputs(vec![Input::HomeActivated]);
    }

    match *routing {
        Routing::Chat {
            entry_point_visible,
        } => {
            if trimmed.is_empty() {
                Routed::Empty
            } else if entry_point_visible && trimmed == ENTRY_POINT_SHORTCUT {
                Routed::Inputs(vec![Input::EntryPointActivated])
            } else {
                Routed::Inputs(vec![Input::TextEntered(trimmed.to_string())])
            }
        }
        Routing::Prompt { enabled: false, .. } => Routed::Busy,
        Routing::Prompt { id, focus, .. } => {
            if is_escape(trimmed) {
                return Routed::Inputs(vec![Input::PromptKeyPressed {
                    prompt: id,
                    key: PromptKey::Escape,
                }]);
            }
            match focus {
                PromptField::Username => Routed::Inputs(vec![Input::PromptEdited {
                    prompt: id,
                    field: PromptField::Username,
                    value: trimmed.to_string(),
                }]),
                // Passwords keep surrounding whitespace; only the line ending goes.
                PromptField::Password => Routed::Inputs(vec![
                    Input::PromptEdited {
                        prompt: id,
                        field: PromptField::Password,
                        value: line.trim_end_matches(['\r', '\n']).to_string(),
                    },
                    Input::PromptKeyPressed {
                        prompt: id,
                        key: PromptKey::Enter,
                    },
                ]),
            }
        }
    }
}

fn is_escape(trimmed: &str) -> bool {
    trimmed.eq_ignore_ascii_case(ESCAPE_COMMAND) || trimmed == ESCAPE_CHAR
}
