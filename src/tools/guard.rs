//! Ownership guard.
//!
//! Every tool that reads or mutates a specific task runs the resolved row
//! through this check against the verified caller id. A failed check is a
//! business result, not an exception: the tool answers with the uniform
//! `Unauthorized` envelope and sibling tool calls in the turn continue.

use crate::storage::TaskRow;

/// The in-band error string for a failed ownership check.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// True when the task belongs to the calling user.
pub fn owns(task: &TaskRow, user_id: &str) -> bool {
    task.user_id == user_id
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn task_owned_by(user: &str) -> TaskRow {
        TaskRow {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            user_id: user.to_string(),
            title: "buy milk".to_string(),
            description: None,
            completed: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn owner_passes() {
        assert!(owns(&task_owned_by("alice"), "alice"));
    }

    #[test]
    fn non_owner_fails() {
        assert!(!owns(&task_owned_by("alice"), "bob"));
    }

    #[test]
    fn user_ids_are_case_sensitive() {
        assert!(!owns(&task_owned_by("Alice"), "alice"));
    }
}
