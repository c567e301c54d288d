//! OpenAI-compatible chat-completions client.
//!
//! Works against any endpoint speaking the `chat/completions` protocol:
//! OpenAI itself, Gemini's OpenAI-compatibility layer, or a local gateway.
//! Requests carry the tool declarations as `function` tools with
//! `tool_choice: "auto"`; proposed calls come back with JSON-encoded
//! argument strings that are parsed before the orchestrator sees them.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{AgentClient, AgentReply, ChatTurn, ProposedToolCall, ToolDeclaration, TurnRole};
use crate::config::AgentConfig;

/// Substitute text when the model returns an empty message body.
const EMPTY_REPLY: &str = "I couldn't process that request.";

pub struct OpenAiAgent {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiAgent {
    /// Build a client from the `[agent]` config section. The request timeout
    /// is the only turn-level bound; an expired call surfaces as an
    /// infrastructure error and rolls the turn back.
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn wire_messages(messages: &[ChatTurn]) -> Vec<Value> {
        messages
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    TurnRole::System => "system",
                    TurnRole::User | TurnRole::ToolResult => "user",
                    TurnRole::Assistant => "assistant",
                };
                json!({ "role": role, "content": turn.content })
            })
            .collect()
    }

    fn wire_tools(tools: &[ToolDeclaration]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect()
    }
}

// ─── Wire response types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded arguments object, per the chat-completions protocol.
    arguments: String,
}

#[async_trait]
impl AgentClient for OpenAiAgent {
    async fn respond(
        &self,
        messages: &[ChatTurn],
        tools: &[ToolDeclaration],
    ) -> Result<AgentReply> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut body = json!({
            "model": self.model,
            "messages": Self::wire_messages(messages),
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        if !tools.is_empty() {
            body["tools"] = Value::Array(Self::wire_tools(tools));
            body["tool_choice"] = json!("auto");
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("agent endpoint unreachable")?
            .error_for_status()
            .context("agent endpoint returned an error status")?;

        let parsed: ChatCompletionResponse =
            resp.json().await.context("malformed agent response")?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .context("agent response contained no choices")?;

        let text = match choice.message.content {
            Some(content) if !content.is_empty() => content,
            _ => EMPTY_REPLY.to_string(),
        };

        let mut tool_calls = Vec::with_capacity(choice.message.tool_calls.len());
        for call in choice.message.tool_calls {
            let arguments: Value = serde_json::from_str(&call.function.arguments).with_context(
                || format!("tool call '{}' carried unparsable arguments", call.function.name),
            )?;
            tool_calls.push(ProposedToolCall {
                name: call.function.name,
                arguments,
            });
        }

        Ok(AgentReply { text, tool_calls })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_results_downgrade_to_user_turns() {
        let turns = vec![
            ChatTurn::system("s"),
            ChatTurn::user("u"),
            ChatTurn::assistant("a"),
            ChatTurn::tool_result("Tool add_task result: {}"),
        ];
        let wire = OpenAiAgent::wire_messages(&turns);
        assert_eq!(wire[0]["role"], "system");
        assert_eq!(wire[1]["role"], "user");
        assert_eq!(wire[2]["role"], "assistant");
        assert_eq!(wire[3]["role"], "user");
        assert_eq!(wire[3]["content"], "Tool add_task result: {}");
    }

    #[test]
    fn declarations_wrap_as_function_tools() {
        let tools = vec![ToolDeclaration {
            name: "add_task".into(),
            description: "Add a new task.".into(),
            parameters: json!({ "type": "object" }),
        }];
        let wire = OpenAiAgent::wire_tools(&tools);
        assert_eq!(wire[0]["type"], "function");
        assert_eq!(wire[0]["function"]["name"], "add_task");
        assert_eq!(wire[0]["function"]["parameters"]["type"], "object");
    }
}
