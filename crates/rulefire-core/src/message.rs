//! Verification messages produced while building a knowledge container

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a verification message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// A single diagnostic with its source location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub path: String,
    pub line: u32,
    pub column: u32,
    pub text: String,
}

impl Message {
    pub fn new(level: Level, path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            path: path.into(),
            line: 0,
            column: 0,
            text: text.into(),
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}:{}:{} {}",
            self.level, self.path, self.line, self.column, self.text
        )
    }
}

/// Ordered verification output of a container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    messages: Vec<Message>,
}

impl Results {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// True when at least one message has one of `levels`
    pub fn has_messages(&self, levels: &[Level]) -> bool {
        self.messages.iter().any(|m| levels.contains(&m.level))
    }

    /// Messages with one of `levels`, in the order they were reported
    pub fn messages(&self, levels: &[Level]) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| levels.contains(&m.level))
            .collect()
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_filter_by_level() {
        let mut results = Results::new();
        results.push(Message::new(Level::Info, "base", "compiled 2 rules"));
        results.push(Message::new(Level::Warning, "empty", "no rules").at(3, 1));
        results.push(Message::new(Level::Error, "base/r1", "duplicate rule"));

        assert!(results.has_messages(&[Level::Warning, Level::Error]));
        assert_eq!(results.messages(&[Level::Warning, Level::Error]).len(), 2);
        assert_eq!(results.messages(&[Level::Info])[0].text, "compiled 2 rules");
    }

    #[test]
    fn test_results_info_only() {
        let mut results = Results::new();
        results.push(Message::new(Level::Info, "base", "ok"));

        assert!(!results.has_messages(&[Level::Warning, Level::Error]));
    }

    #[test]
    fn test_message_display() {
        let message = Message::new(Level::Error, "rules/discount.rs", "bad").at(12, 5);
        assert_eq!(message.to_string(), "[ERROR] rules/discount.rs:12:5 bad");
    }

    #[test]
    fn test_level_serde() {
        let json = serde_json::to_string(&Level::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
    }
}
