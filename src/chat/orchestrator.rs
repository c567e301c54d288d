//! Sequencing for one chat turn.
//!
//! A turn runs inside a single SQLite transaction. Conversation rows, the
//! user message, every tool mutation and the final assistant message commit
//! together or not at all. The agent endpoint sits outside the transaction,
//! so a failed agent call rolls everything back and the turn leaves no trace.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqliteConnection;

use crate::agent::{AgentClient, ChatTurn, ProposedToolCall, ToolDeclaration, SYSTEM_PROMPT};
use crate::chat::{ChatRequest, ChatResponse, ToolCallRecord};
use crate::storage::{conversations, MessageRow, Storage};
use crate::tools::{self, ToolRegistry};

/// Drives a chat turn: two agent calls with tool execution in between.
pub struct ChatOrchestrator {
    storage: Storage,
    registry: Arc<ToolRegistry>,
    agent: Arc<dyn AgentClient>,
}

impl ChatOrchestrator {
    pub fn new(storage: Storage, registry: Arc<ToolRegistry>, agent: Arc<dyn AgentClient>) -> Self {
        Self {
            storage,
            registry,
            agent,
        }
    }

    /// Run one turn end to end for `user_id`.
    ///
    /// Everything the turn persists lands in one transaction, committed only
    /// after the assistant reply is staged. On any infrastructure failure the
    /// transaction rolls back and the caller sees an opaque error.
    pub async fn run_turn(
        &self,
        user_id: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, TurnError> {
        let mut tx = self.storage.begin().await?;

        match self.turn_inner(&mut tx, user_id, request).await {
            Ok(response) => {
                tx.commit().await.context("commit chat turn")?;
                tracing::info!(
                    user = %user_id,
                    conversation = response.conversation_id,
                    tool_calls = response.tool_calls.len(),
                    "chat turn committed"
                );
                Ok(response)
            }
            Err(err) => {
                // Best effort; dropping the transaction rolls back anyway.
                let _ = tx.rollback().await;
                if let TurnError::Infrastructure(ref cause) = err {
                    tracing::error!(user = %user_id, "chat turn failed, rolled back: {cause:#}");
                }
                Err(err)
            }
        }
    }

    async fn turn_inner(
        &self,
        tx: &mut sqlx::Transaction<'static, sqlx::Sqlite>,
        user_id: &str,
        request: &ChatRequest,
    ) -> Result<ChatResponse, TurnError> {
        let db: &mut SqliteConnection = &mut *tx;

        // Resolve the conversation. A missing conversation and another
        // user's conversation are indistinguishable to the caller.
        let conversation = match request.conversation_id {
            None => {
                let title = format!("Conversation {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
                conversations::create(db, user_id, Some(&title)).await?
            }
            Some(id) => match conversations::get(db, id).await? {
                Some(row) if row.user_id == user_id => row,
                _ => return Err(TurnError::ConversationNotFound),
            },
        };

        // History is captured before the incoming message is persisted, so
        // the first agent call sees it as the newest turn exactly once.
        let history = conversations::list_messages(db, conversation.id).await?;
        conversations::insert_message(
            db,
            conversation.id,
            user_id,
            "user",
            &request.message,
            None,
        )
        .await?;

        let mut context = Vec::with_capacity(history.len() + 2);
        if history.is_empty() {
            context.push(ChatTurn::system(SYSTEM_PROMPT));
        }
        for row in &history {
            context.push(history_turn(row));
        }
        context.push(ChatTurn::user(request.message.as_str()));

        let declarations = self.declarations();
        let first = self.agent.respond(&context, &declarations).await?;

        let mut response_text = first.text;
        let mut executed: Vec<ToolCallRecord> = Vec::new();

        if !first.tool_calls.is_empty() {
            // Execute in proposal order on this same transaction, so later
            // calls observe the writes of earlier ones.
            for call in &first.tool_calls {
                let record = self.execute_call(&mut *tx, user_id, call).await?;
                executed.push(record);
            }

            context.push(ChatTurn::assistant(response_text.as_str()));
            for record in &executed {
                let payload =
                    serde_json::to_string(&record.result).context("encode tool result")?;
                context.push(ChatTurn::tool_result(format!(
                    "Tool {} result: {}",
                    record.tool_name, payload
                )));
            }
            // The wire protocol answers a user turn; this one carries nothing new.
            context.push(ChatTurn::user(""));

            let second = self.agent.respond(&context, &declarations).await?;
            response_text = second.text;
        }

        let audit = if executed.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&executed).context("encode tool call audit")?)
        };
        conversations::insert_message(
            &mut *tx,
            conversation.id,
            user_id,
            "assistant",
            &response_text,
            audit.as_deref(),
        )
        .await?;
        conversations::touch(&mut *tx, conversation.id).await?;

        Ok(ChatResponse {
            conversation_id: conversation.id,
            response: response_text,
            tool_calls: executed,
        })
    }

    /// Execute one proposed call through the registry.
    ///
    /// The verified user id overwrites whatever the agent put in `user_id`,
    /// and the audit record keeps the arguments as they actually ran.
    async fn execute_call(
        &self,
        db: &mut SqliteConnection,
        user_id: &str,
        call: &ProposedToolCall,
    ) -> Result<ToolCallRecord, TurnError> {
        let mut map = match call.arguments.as_object() {
            Some(map) => map.clone(),
            None => serde_json::Map::new(),
        };
        map.insert("user_id".into(), Value::String(user_id.to_string()));
        let arguments = Value::Object(map);

        let raw = match self.registry.get(&call.name) {
            Some(tool) => tool.execute(db, &arguments).await?,
            None => tools::fail(format!("Tool '{}' not found", call.name)),
        };
        let result = tools::sanitize(&raw);
        tracing::info!(user = %user_id, tool = %call.name, "tool call executed");

        Ok(ToolCallRecord {
            tool_name: call.name.clone(),
            arguments,
            result,
        })
    }

    /// Tool declarations offered to the agent.
    ///
    /// `user_id` never appears here: identity comes from the route, and the
    /// orchestrator injects it at execution time.
    fn declarations(&self) -> Vec<ToolDeclaration> {
        self.registry
            .list()
            .into_iter()
            .map(|descriptor| {
                let mut parameters = descriptor.input_schema;
                strip_user_id(&mut parameters);
                ToolDeclaration {
                    name: descriptor.name,
                    description: descriptor.description,
                    parameters,
                }
            })
            .collect()
    }
}

fn strip_user_id(schema: &mut Value) {
    if let Some(properties) = schema
        .get_mut("properties")
        .and_then(|value| value.as_object_mut())
    {
        properties.remove("user_id");
    }
    if let Some(required) = schema
        .get_mut("required")
        .and_then(|value| value.as_array_mut())
    {
        required.retain(|name| name != "user_id");
    }
}

fn history_turn(row: &MessageRow) -> ChatTurn {
    match row.role.as_str() {
        "assistant" => ChatTurn::assistant(row.content.as_str()),
        "system" => ChatTurn::system(row.content.as_str()),
        _ => ChatTurn::user(row.content.as_str()),
    }
}

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Errors returned by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("conversation not found")]
    ConversationNotFound,
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_id_stripped_from_schema() {
        let mut schema = json!({
            "type": "object",
            "properties": {
                "user_id": {"type": "string"},
                "title": {"type": "string"}
            },
            "required": ["user_id", "title"],
            "additionalProperties": false
        });
        strip_user_id(&mut schema);
        assert!(schema["properties"].get("user_id").is_none());
        assert_eq!(schema["required"], json!(["title"]));
    }

    #[test]
    fn history_roles_map_to_turns() {
        let row = MessageRow {
            id: 1,
            conversation_id: 1,
            user_id: "alice".into(),
            role: "assistant".into(),
            content: "done".into(),
            tool_calls: None,
            created_at: "2025-01-01T00:00:00Z".into(),
        };
        let turn = history_turn(&row);
        assert_eq!(turn.content, "done");
    }
}
