//! Append-only message log shown as the chat transcript.

use std::fmt;

/// Who a message is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    System,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::System => "system",
        })
    }
}

/// One transcript entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    content: String,
    sender: Sender,
}

impl Message {
    #[must_use]
    pub fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self {
            content: content.into(),
            sender,
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(content, Sender::System)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User)
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Content split on embedded line breaks, for display.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.lines()
    }
}

/// Ordered transcript owned by the flow controller.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its position, which becomes the newest.
    pub fn append(&mut self, message: Message) -> usize {
        self.entries.push(message);
        self.entries.len() - 1
    }

    /// Removes every entry. Only the reset transition calls this.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Position of the most recent entry, the scroll target.
    #[must_use]
    pub fn newest_position(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    #[must_use]
    pub fn newest(&self) -> Option<&Message> {
        self.entries.last()
    }

    #[must_use]
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order_and_tracks_newest() {
        let mut log = MessageLog::new();
        assert_eq!(log.newest_position(), None);

        assert_eq!(log.append(Message::system("hello")), 0);
        assert_eq!(log.append(Message::user("download please")), 1);

        assert_eq!(log.newest_position(), Some(1));
        assert_eq!(log.newest().map(Message::sender), Some(Sender::User));
        assert_eq!(log.entries()[0].content(), "hello");
    }

    #[test]
    fn test_clear_empties_log() {
        let mut log = MessageLog::new();
        log.append(Message::system("one"));
        log.append(Message::system("two"));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.newest_position(), None);
    }

    #[test]
    fn test_message_lines_split_on_breaks() {
        let message = Message::system("first\nsecond");
        assert_eq!(message.lines().collect::<Vec<_>>(), vec!["first", "second"]);
    }
}
