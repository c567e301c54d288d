//! The `list_tasks` tool: list the caller's tasks, optionally filtered by status.
//!
//! Returns a plain JSON array rather than an object envelope; the external
//! schema fixes that asymmetry against the other four tools.

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use crate::storage::tasks::{self, StatusFilter};
use crate::tools::{fail, ids, opt_str, schema, str_arg, FieldKind, FieldSpec, Tool};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::required("user_id", FieldKind::Str, "Whose tasks to retrieve"),
    FieldSpec::optional("status", FieldKind::Str, "Filter by completion status")
        .one_of(&["all", "pending", "completed"])
        .default_value("all"),
];

pub struct ListTasks;

#[async_trait]
impl Tool for ListTasks {
    fn name(&self) -> &'static str {
        "list_tasks"
    }

    fn description(&self) -> &'static str {
        "List the caller's tasks, optionally filtered by status."
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn output_schema(&self) -> Value {
        json!({
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "id": { "type": "integer" },
                    "title": { "type": "string" },
                    "completed": { "type": "boolean" }
                },
                "required": ["id", "title", "completed"],
                "additionalProperties": false
            }
        })
    }

    async fn execute(&self, db: &mut SqliteConnection, args: &Value) -> anyhow::Result<Value> {
        if let Err(msg) = schema::validate(self.fields(), args) {
            return Ok(fail(msg));
        }
        let user_id = str_arg(args, "user_id")?;
        let status = opt_str(args, "status").unwrap_or("all");
        let filter = StatusFilter::parse(status)
            .ok_or_else(|| anyhow::anyhow!("unvalidated status filter '{}'", status))?;

        let rows = tasks::list_for_user(db, user_id, filter).await?;
        let items: Vec<Value> = rows
            .iter()
            .map(|t| {
                json!({
                    "id": ids::external_id(&t.id),
                    "title": t.title,
                    "completed": t.completed,
                })
            })
            .collect();

        tracing::info!(user = %user_id, count = items.len(), "tasks listed");
        Ok(Value::Array(items))
    }
}
