//! Transcript data types
//!
//! Messages are shared between the widget, the renderer and the headless
//! `ask` command, and don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// A single entry in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// Who sent a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            text: text.into(),
        }
    }

    pub fn is_from_bot(&self) -> bool {
        self.role == ChatRole::Bot
    }
}

impl ChatRole {
    /// Label shown above the message in the transcript
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You:",
            ChatRole::Bot => "Bot:",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_role() {
        assert!(!ChatMessage::user("hi").is_from_bot());
        assert!(ChatMessage::bot("hello").is_from_bot());
    }

    #[test]
    fn test_serializes_role_lowercase() {
        let json = serde_json::to_string(&ChatMessage::bot("ok")).unwrap();
        assert_eq!(json, r#"{"role":"bot","text":"ok"}"#);
    }
}
