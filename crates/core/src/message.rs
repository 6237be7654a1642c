//! Message and conversation-turn domain types.
//!
//! A [`ConversationTurn`] is what the caller sends us (chat history as the
//! presentation layer keeps it); a [`Message`] is what we send to the
//! collaborator after prompt assembly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
}

/// A single message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }
}

/// Who authored a turn of caller-supplied history.
///
/// Anything that is not `"user"` is read as an assistant turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    #[serde(other)]
    Assistant,
}

/// One turn of chat history, as supplied by the caller on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,

    /// The text shown in the chat.
    #[serde(default)]
    pub text: String,

    /// The serialized artifact an assistant turn produced, if the caller kept it.
    #[serde(
        default,
        rename = "fullResponse",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_response: Option<String>,
}

impl ConversationTurn {
    /// A user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            full_response: None,
        }
    }

    /// An assistant turn, optionally carrying the artifact it produced.
    pub fn assistant(text: impl Into<String>, full_response: Option<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            full_response,
        }
    }

    /// Convert to a completion message.
    ///
    /// Assistant turns prefer the full serialized artifact over the chat text
    /// so the model can see the visualization state it produced earlier.
    pub fn to_message(&self) -> Message {
        match self.role {
            TurnRole::User => Message::user(&self.text),
            TurnRole::Assistant => {
                let content = self
                    .full_response
                    .as_deref()
                    .filter(|full| !full.is_empty())
                    .unwrap_or(self.text.as_str());
                Message::assistant(content)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Explain heaps");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Explain heaps");
    }

    #[test]
    fn unknown_turn_role_reads_as_assistant() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"bot","text":"hi"}"#).unwrap();
        assert_eq!(turn.role, TurnRole::Assistant);

        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"user","text":"hi"}"#).unwrap();
        assert_eq!(turn.role, TurnRole::User);
    }

    #[test]
    fn assistant_turn_prefers_full_response() {
        let turn = ConversationTurn::assistant("Here you go", Some(r#"{"message":"m"}"#.into()));
        let msg = turn.to_message();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, r#"{"message":"m"}"#);

        let turn = ConversationTurn::assistant("Here you go", Some(String::new()));
        assert_eq!(turn.to_message().content, "Here you go");
    }

    #[test]
    fn user_turn_ignores_full_response() {
        let turn = ConversationTurn {
            role: TurnRole::User,
            text: "and quicksort?".into(),
            full_response: Some("ignored".into()),
        };
        assert_eq!(turn.to_message().content, "and quicksort?");
    }

    #[test]
    fn turn_uses_camel_case_full_response() {
        let turn: ConversationTurn = serde_json::from_str(
            r#"{"role":"assistant","text":"t","fullResponse":"{}"}"#,
        )
        .unwrap();
        assert_eq!(turn.full_response.as_deref(), Some("{}"));
    }
}
