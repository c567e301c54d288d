//! The `delete_task` tool: delete a task permanently (hard delete, no tombstone).

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use crate::storage::tasks;
use crate::tools::{fail, ids, resolve_owned_task, schema, str_arg, FieldKind, FieldSpec, Tool};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::required("user_id", FieldKind::Str, "Who owns the task"),
    FieldSpec::required("task_id", FieldKind::TaskId, "Which task to delete"),
];

pub struct DeleteTask;

#[async_trait]
impl Tool for DeleteTask {
    fn name(&self) -> &'static str {
        "delete_task"
    }

    fn description(&self) -> &'static str {
        "Delete a task permanently."
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": { "type": "integer" },
                "status": { "type": "string", "enum": ["deleted"] },
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

        tasks::delete(db, &task.id).await?;
        tracing::info!(user = %user_id, task = %task.id, "task deleted");

        Ok(json!({
            "task_id": ids::external_id(&task.id),
            "status": "deleted",
            "title": task.title,
        }))
    }
}
