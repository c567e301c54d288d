//! The `update_task` tool: change a task's title and/or description.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use crate::storage::tasks;
use crate::tools::{
    fail, ids, opt_str, resolve_owned_task, schema, str_arg, FieldKind, FieldSpec, Tool,
};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::required("user_id", FieldKind::Str, "Who owns the task"),
    FieldSpec::required("task_id", FieldKind::TaskId, "Which task to update"),
    FieldSpec::optional("title", FieldKind::Str, "New title for the task")
        .non_empty()
        .max_len(200),
    FieldSpec::optional("description", FieldKind::Str, "New description for the task")
        .max_len(1000),
];

pub struct UpdateTask;

#[async_trait]
impl Tool for UpdateTask {
    fn name(&self) -> &'static str {
        "update_task"
    }

    fn description(&self) -> &'static str {
        "Update a task's title and/or description."
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": { "type": "integer" },
                "status": { "type": "string", "enum": ["updated"] },
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
        let title = opt_str(args, "title");
        let description = opt_str(args, "description");

        // Cross-field rule, checked before any store access.
        if title.is_none() && description.is_none() {
            return Ok(fail("at least one of title or description must be provided"));
        }

        let task = match resolve_owned_task(db, user_id, args).await? {
            Ok(task) => task,
            Err(envelope) => return Ok(envelope),
        };

        tasks::update_fields(db, &task.id, title, description).await?;
        tracing::info!(user = %user_id, task = %task.id, "task updated");

        Ok(json!({
            "task_id": ids::external_id(&task.id),
            "status": "updated",
            "title": title.unwrap_or(&task.title),
        }))
    }
}
