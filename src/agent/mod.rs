//! Agent client abstraction.
//!
//! The orchestrator talks to the model through [`AgentClient`]: full context
//! plus tool declarations in, reply text plus proposed tool calls out. The
//! production implementation speaks the OpenAI-compatible chat-completions
//! protocol ([`openai::OpenAiAgent`]); [`mock::MockAgent`] replays scripted
//! replies for tests and offline runs.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use mock::MockAgent;
pub use openai::OpenAiAgent;

/// Instruction block injected at the start of a brand-new conversation.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that helps users manage their \
    tasks. You can interact with task management tools when needed. Only use tools when the user \
    explicitly asks to add, list, complete, update, or delete tasks.";

/// Where a context turn came from.
///
/// The wire protocol has no first-class role for tool results, so clients
/// downgrade `ToolResult` to a user turn on the way out; the distinct
/// variant keeps provenance honest everywhere in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    System,
    User,
    Assistant,
    ToolResult,
}

/// One entry of the context sent to the agent.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    pub fn tool_result(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::ToolResult,
            content: content.into(),
        }
    }
}

/// A tool the agent may call, as declared to the chat API.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool invocation the agent asked for.
#[derive(Debug, Clone)]
pub struct ProposedToolCall {
    pub name: String,
    pub arguments: Value,
}

/// What one agent call produced.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    pub tool_calls: Vec<ProposedToolCall>,
}

impl AgentReply {
    /// A plain text reply proposing no tool calls.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_call(mut self, name: impl Into<String>, arguments: Value) -> Self {
        self.tool_calls.push(ProposedToolCall {
            name: name.into(),
            arguments,
        });
        self
    }
}

#[async_trait]
pub trait AgentClient: Send + Sync {
    /// One model call. Transport failures, non-success statuses, and
    /// unparsable replies are infrastructure errors; a reply that simply
    /// proposes no tool calls is not.
    async fn respond(
        &self,
        messages: &[ChatTurn],
        tools: &[ToolDeclaration],
    ) -> anyhow::Result<AgentReply>;
}
