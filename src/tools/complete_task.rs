//! The `complete_task` tool: mark a task as completed.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use crate::storage::tasks;
use crate::tools::{fail, ids, resolve_owned_task, schema, str_arg, FieldKind, FieldSpec, Tool};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::required("user_id", FieldKind::Str, "Who owns the task"),
    FieldSpec::required("task_id", FieldKind::TaskId, "Which task to complete"),
];

pub struct CompleteTask;

#[async_trait]
impl Tool for CompleteTask {
    fn name(&self) -> &'static str {
        "complete_task"
    }

    fn description(&self) -> &'static str {
        "Mark a task as completed."
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": { "type": "integer" },
                "status": { "type": "string", "enum": ["completed"] },
                "title": { "type": "string" }
            },
            "required": ["task_id", "status", "title"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, db: &mut SqliteConnection, args: &Value) -> anyhow::Result<Value> {
        if let Err(msg) = schema::validate(self.fields(), args) {
            return Ok(fail(msg));
        }
        let user_id = str_arg(args, "user_id")?;
        let task = match resolve_owned_task(db, user_id, args).await? {
            Ok(task) => task,
            Err(envelope) => return Ok(envelope),
        };

        // Completing twice is a no-op that reports the current state.
        if !task.completed {
            tasks::set_completed(db, &task.id, true).await?;
            tracing::info!(user = %user_id, task = %task.id, "task completed");
        }

        Ok(json!({
            "task_id": ids::external_id(&task.id),
            "status": "completed",
            "title": task.title,
        }))
    }
}
