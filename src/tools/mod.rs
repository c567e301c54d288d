//! The agent-facing tool layer.
//!
//! Tools are the only way the agent touches the task store. Each one is a
//! [`Tool`] implementation registered in a [`ToolRegistry`] built once at
//! startup and handed to the orchestrator and the REST layer by reference.
//!
//! ## Submodules
//!
//! | Module | Role |
//! |--------|------|
//! | `schema` | Field tables, the generic validator, JSON Schema rendering |
//! | `registry` | Name → tool map with discovery listing |
//! | `ids` | Canonical uuid ↔ external integer id translation |
//! | `guard` | Ownership check for task-scoped operations |
//! | `add_task` … `update_task` | The five task tools |
//!
//! ## Contract
//!
//! `execute` never returns `Err` for business-rule violations. Validation
//! failures, unknown tasks, and ownership failures all come back in-band as
//! `{"status": "error", "error": <message>}` so the agent can react to them.
//! Only infrastructure faults (the store itself failing) propagate as `Err`
//! and abort the surrounding transaction.

pub mod add_task;
pub mod complete_task;
pub mod delete_task;
pub mod guard;
pub mod ids;
pub mod list_tasks;
pub mod registry;
pub mod schema;
pub mod update_task;

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqliteConnection;

use crate::storage::{tasks, TaskRow};

pub use registry::{ToolDescriptor, ToolRegistry};
pub use schema::{FieldKind, FieldSpec};

// ─── Tool trait ───────────────────────────────────────────────────────────────

/// A named operation the agent can invoke.
///
/// `db` is the caller's open connection, usually a turn-spanning transaction:
/// tools stage writes on it and never commit, so the orchestrator alone
/// controls transaction boundaries.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// The field table driving both validation and schema rendering.
    fn fields(&self) -> &'static [FieldSpec];

    fn input_schema(&self) -> Value {
        schema::render(self.fields())
    }

    fn output_schema(&self) -> Value;

    async fn execute(&self, db: &mut SqliteConnection, args: &Value) -> anyhow::Result<Value>;
}

// ─── Envelope and argument helpers ────────────────────────────────────────────

/// The uniform business-failure envelope.
pub fn fail(message: impl Into<String>) -> Value {
    json!({ "status": "error", "error": message.into() })
}

fn str_arg<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("missing required field '{}'", key))
}

fn opt_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

// ─── Result sanitizer ─────────────────────────────────────────────────────────

/// Coerce every leaf of a tool result to text.
///
/// Containers keep their shape; scalars become strings (`42` → `"42"`,
/// `true` → `"true"`, `null` → `"null"`). The output is what gets folded
/// into the agent's context and written to the audit log.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            Value::Object(map.iter().map(|(k, v)| (k.clone(), sanitize(v))).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        Value::String(_) => value.clone(),
        other => Value::String(other.to_string()),
    }
}

// ─── Shared task resolution ───────────────────────────────────────────────────

/// Resolve the `task_id` argument to a task owned by `user_id`.
///
/// Used by every tool that targets one task. The inner `Err` is the in-band
/// failure envelope ready to return; the outer `Err` is an infrastructure
/// fault. External integers resolve by scanning the caller's own tasks, so a
/// foreign task can only come out of the canonical-uuid path, where the
/// guard turns it into `Unauthorized`. Missing and foreign uuids answer the
/// same way, so a caller learns nothing about other users' ids.
pub(crate) async fn resolve_owned_task(
    db: &mut SqliteConnection,
    user_id: &str,
    args: &Value,
) -> anyhow::Result<Result<TaskRow, Value>> {
    let raw = match args.get("task_id") {
        Some(v) => v,
        None => return Ok(Err(fail("field task_id is required"))),
    };
    let arg = match ids::parse_arg(raw) {
        Some(arg) => arg,
        None => return Ok(Err(fail("field task_id must be a string or an integer"))),
    };

    match arg {
        ids::TaskIdArg::External(n) => match ids::resolve_external(db, user_id, n).await? {
            Some(task) => Ok(Ok(task)),
            None => Ok(Err(fail("Task not found"))),
        },
        ids::TaskIdArg::Canonical(s) => {
            if uuid::Uuid::parse_str(s).is_err() {
                return Ok(Err(fail(format!("Invalid task_id format: {s}"))));
            }
            match tasks::get(db, s).await? {
                Some(task) if guard::owns(&task, user_id) => Ok(Ok(task)),
                _ => Ok(Err(fail(guard::UNAUTHORIZED))),
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
