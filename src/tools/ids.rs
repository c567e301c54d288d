//! Translator between canonical task ids and the bounded integers the agent
//! protocol exposes.
//!
//! The store keys tasks by uuid strings; the agent protocol wants small
//! integers. The derived external id is the first 12 hex digits of the
//! dashless uuid reduced modulo 10^9. The mapping is not invertible and not
//! collision-free, so resolving an external id scans the owner's tasks and
//! recomputes the derivation for each until one matches.

use anyhow::Result;
use serde_json::Value;
use sqlx::SqliteConnection;

use crate::storage::{tasks, TaskRow};

/// Exclusive upper bound of the external id space.
const EXTERNAL_ID_SPACE: u64 = 1_000_000_000;

/// Derive the external integer id for a canonical id.
///
/// Stored ids are always uuid v4 strings, so the hex parse cannot fail on a
/// real row; anything unparsable reduces to 0.
pub fn external_id(canonical: &str) -> i64 {
    let hex: String = canonical.chars().filter(|c| *c != '-').take(12).collect();
    let n = u64::from_str_radix(&hex, 16).unwrap_or(0);
    (n % EXTERNAL_ID_SPACE) as i64
}

/// A `task_id` argument, disambiguated by JSON value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskIdArg<'a> {
    External(i64),
    Canonical(&'a str),
}

pub fn parse_arg(value: &Value) -> Option<TaskIdArg<'_>> {
    if let Some(n) = value.as_i64() {
        Some(TaskIdArg::External(n))
    } else {
        value.as_str().map(TaskIdArg::Canonical)
    }
}

/// Scan rows in the order given; the first task whose derived id matches
/// wins, silently shadowing any later collision.
pub fn find_by_external(rows: &[TaskRow], external: i64) -> Option<&TaskRow> {
    rows.iter().find(|t| external_id(&t.id) == external)
}

/// Resolve an external id against the calling user's tasks in creation
/// order. Tasks of other users are never considered.
pub async fn resolve_external(
    db: &mut SqliteConnection,
    user_id: &str,
    external: i64,
) -> Result<Option<TaskRow>> {
    let rows = tasks::list_for_user_oldest_first(db, user_id).await?;
    Ok(find_by_external(&rows, external).cloned())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, user: &str) -> TaskRow {
        TaskRow {
            id: id.to_string(),
            user_id: user.to_string(),
            title: "t".to_string(),
            description: None,
            completed: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn derivation_matches_reference_values() {
        // First 12 hex digits of the dashless uuid, mod 10^9.
        // 0x123e4567e89b = 20_058_661_709_979; mod 10^9 = 661_709_979.
        assert_eq!(
            external_id("123e4567-e89b-12d3-a456-426614174000"),
            661_709_979
        );
        // All-zero prefix reduces to 0.
        assert_eq!(external_id("00000000-0000-4000-8000-000000000000"), 0);
    }

    #[test]
    fn derivation_is_deterministic_and_bounded() {
        let id = uuid::Uuid::new_v4().to_string();
        let a = external_id(&id);
        let b = external_id(&id);
        assert_eq!(a, b);
        assert!((0..1_000_000_000).contains(&a));
    }

    #[test]
    fn parse_arg_disambiguates_by_type() {
        assert_eq!(parse_arg(&json!(42)), Some(TaskIdArg::External(42)));
        assert_eq!(
            parse_arg(&json!("abc")),
            Some(TaskIdArg::Canonical("abc"))
        );
        assert_eq!(parse_arg(&json!(true)), None);
        assert_eq!(parse_arg(&json!(1.5)), None);
    }

    #[test]
    fn first_match_shadows_collisions() {
        // Both ids share the first 12 hex digits, so they derive the same
        // external id; the earlier row must win.
        let a = row("00000000-0001-4000-8000-00000000aaaa", "u");
        let b = row("00000000-0001-4000-8000-00000000bbbb", "u");
        assert_eq!(external_id(&a.id), external_id(&b.id));

        let rows = vec![a.clone(), b];
        let found = find_by_external(&rows, external_id(&a.id)).unwrap();
        assert_eq!(found.id, a.id);
    }

    #[test]
    fn no_match_for_out_of_range_id() {
        let rows = vec![row("123e4567-e89b-12d3-a456-426614174000", "u")];
        assert!(find_by_external(&rows, -5).is_none());
        assert!(find_by_external(&rows, 1_000_000_000).is_none());
    }
}
