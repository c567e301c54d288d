//! The `add_task` tool: create a task on the caller's list.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use crate::storage::tasks;
use crate::tools::{fail, ids, opt_str, schema, str_arg, FieldKind, FieldSpec, Tool};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::required("user_id", FieldKind::Str, "Who owns the new task"),
    FieldSpec::required("title", FieldKind::Str, "Short task title")
        .non_empty()
        .max_len(200),
    FieldSpec::optional("description", FieldKind::Str, "Longer free-form details").max_len(1000),
];

pub struct AddTask;

#[async_trait]
impl Tool for AddTask {
    fn name(&self) -> &'static str {
        "add_task"
    }

    fn description(&self) -> &'static str {
        "Add a new task to the caller's list."
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": { "type": "integer" },
                "status": { "type": "string", "enum": ["created"] },
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
        let title = str_arg(args, "title")?;
        let description = opt_str(args, "description");

        let task = tasks::insert(db, user_id, title, description).await?;
        tracing::info!(user = %user_id, task = %task.id, "task created");

        Ok(json!({
            "task_id": ids::external_id(&task.id),
            "status": "created",
            "title": task.title,
        }))
    }
}
