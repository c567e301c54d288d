//! Scripted agent for tests and offline runs.
//!
//! Pops one scripted outcome per `respond` call and records what it was
//! asked, so tests can assert on the exact context the orchestrator built.
//! An exhausted script answers with a fixed text reply.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use super::{AgentClient, AgentReply, ChatTurn, ToolDeclaration};

/// One captured `respond` invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatTurn>,
    pub tool_names: Vec<String>,
}

pub struct MockAgent {
    script: Mutex<VecDeque<Result<AgentReply, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue replies to hand out in order.
    pub fn scripted(replies: impl IntoIterator<Item = AgentReply>) -> Self {
        let script: VecDeque<_> = replies.into_iter().map(Ok).collect();
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue an infrastructure failure for the next call.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script.lock().await.push_back(Err(message.into()));
    }

    pub async fn push_reply(&self, reply: AgentReply) {
        self.script.lock().await.push_back(Ok(reply));
    }

    /// Everything this agent has been asked so far.
    pub async fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentClient for MockAgent {
    async fn respond(
        &self,
        messages: &[ChatTurn],
        tools: &[ToolDeclaration],
    ) -> anyhow::Result<AgentReply> {
        self.calls.lock().await.push(RecordedCall {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });

        match self.script.lock().await.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(AgentReply::text("Done.")),
        }
    }
}
