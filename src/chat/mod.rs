//! Chat turn types and the conversation orchestrator.

pub mod orchestrator;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use orchestrator::{ChatOrchestrator, TurnError};

/// Longest accepted user message, in characters.
pub const MAX_MESSAGE_LEN: usize = 10_000;

/// Body of `POST /api/v1/{user_id}/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<i64>,
    pub message: String,
}

impl ChatRequest {
    /// Request-shape check, run before any transaction opens.
    pub fn validate(&self) -> Result<(), String> {
        if self.message.is_empty() {
            return Err("message must not be empty".into());
        }
        if self.message.chars().count() > MAX_MESSAGE_LEN {
            return Err(format!(
                "message must be at most {MAX_MESSAGE_LEN} characters"
            ));
        }
        if let Some(id) = self.conversation_id {
            if id <= 0 {
                return Err("conversation_id must be a positive integer".into());
            }
        }
        Ok(())
    }
}

/// Audit record of one executed tool call: the name, the arguments as they
/// were actually executed (verified user id included), and the sanitized
/// result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub arguments: Value,
    pub result: Value,
}

/// Body of the 200 response to a chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub conversation_id: i64,
    pub response: String,
    pub tool_calls: Vec<ToolCallRecord>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_rejected() {
        let req = ChatRequest {
            conversation_id: None,
            message: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn oversized_message_rejected() {
        let req = ChatRequest {
            conversation_id: None,
            message: "x".repeat(MAX_MESSAGE_LEN + 1),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn non_positive_conversation_id_rejected() {
        let req = ChatRequest {
            conversation_id: Some(0),
            message: "hi".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn plain_request_accepted() {
        let req = ChatRequest {
            conversation_id: Some(3),
            message: "Add a task: buy milk".into(),
        };
        assert!(req.validate().is_ok());
    }
}
