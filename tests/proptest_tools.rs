//! Property-based tests for the tool layer.
//!
//! 1. External id derivation: bounded, deterministic, hyphenation-blind.
//! 2. Argument validation: total over arbitrary JSON, honest on success.
//! 3. Result sanitizer: stringifies every leaf, idempotent, shape-preserving.
//!
//! Run with: cargo test --test proptest_tools

use proptest::prelude::*;
use serde_json::{json, Value};
use uuid::Uuid;

use taskchatd::tools::ids::external_id;
use taskchatd::tools::schema::{self, FieldKind, FieldSpec};
use taskchatd::tools::sanitize;

// ─── 1. External id derivation ───────────────────────────────────────────────

proptest! {
    /// Every derived id lands in [0, 10^9), whatever the uuid.
    #[test]
    fn external_id_is_bounded(bits in any::<u128>()) {
        let id = external_id(&Uuid::from_u128(bits).to_string());
        prop_assert!((0..1_000_000_000).contains(&id), "id {id} out of range");
    }

    /// Hyphenated and dashless renderings of the same uuid derive the same id.
    #[test]
    fn external_id_ignores_hyphenation(bits in any::<u128>()) {
        let uuid = Uuid::from_u128(bits);
        prop_assert_eq!(
            external_id(&uuid.hyphenated().to_string()),
            external_id(&uuid.simple().to_string()),
        );
    }

    /// Arbitrary garbage input never panics; it still derives a bounded id.
    #[test]
    fn external_id_is_total(input in ".*") {
        let id = external_id(&input);
        prop_assert!((0..1_000_000_000).contains(&id));
    }
}

// ─── 2. Argument validation ──────────────────────────────────────────────────

/// A representative input table: required string, bounded optional string,
/// enum, and a task reference.
const SPEC: &[FieldSpec] = &[
    FieldSpec::required("user_id", FieldKind::Str, "Owner of the task"),
    FieldSpec::required("title", FieldKind::Str, "Task title")
        .non_empty()
        .max_len(200),
    FieldSpec::optional("description", FieldKind::Str, "Task details").max_len(1000),
    FieldSpec::optional("status", FieldKind::Str, "Filter")
        .one_of(&["all", "pending", "completed"]),
    FieldSpec::optional("task_id", FieldKind::TaskId, "Task reference"),
];

/// Arbitrary JSON values up to a few levels deep.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        ".{0,32}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(".{0,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// The validator accepts or rejects; it never panics, and a rejection
    /// always carries a message.
    #[test]
    fn validation_is_total(args in arb_json()) {
        if let Err(msg) = schema::validate(SPEC, &args) {
            prop_assert!(!msg.is_empty());
        }
    }

    /// When validation passes, the required fields really are present with
    /// the shapes the table promises.
    #[test]
    fn validation_success_is_honest(args in arb_json()) {
        if schema::validate(SPEC, &args).is_ok() {
            let obj = args.as_object().expect("accepted args are an object");
            prop_assert!(obj["user_id"].is_string());
            let title = obj["title"].as_str().expect("title is a string");
            prop_assert!(!title.trim().is_empty());
            prop_assert!(title.chars().count() <= 200);
        }
    }
}

// ─── 3. Result sanitizer ─────────────────────────────────────────────────────

fn leaves_are_strings(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.values().all(leaves_are_strings),
        Value::Array(items) => items.iter().all(leaves_are_strings),
        Value::String(_) => true,
        _ => false,
    }
}

fn same_shape(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| same_shape(v, w)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| same_shape(v, w))
        }
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => false,
        _ => true,
    }
}

proptest! {
    /// After sanitizing, every leaf is a string.
    #[test]
    fn sanitize_stringifies_all_leaves(value in arb_json()) {
        prop_assert!(leaves_are_strings(&sanitize(&value)));
    }

    /// Sanitizing twice changes nothing.
    #[test]
    fn sanitize_is_idempotent(value in arb_json()) {
        let once = sanitize(&value);
        prop_assert_eq!(sanitize(&once), once);
    }

    /// Containers keep their keys and lengths; only leaves change.
    #[test]
    fn sanitize_preserves_shape(value in arb_json()) {
        prop_assert!(same_shape(&value, &sanitize(&value)));
    }
}

/// The booleans and integers the agent fold depends on render the way the
/// protocol promises.
#[test]
fn sanitize_renders_known_leaves() {
    let raw = json!({"id": 42, "completed": false, "title": "x", "extra": null});
    let clean = sanitize(&raw);
    assert_eq!(clean["id"], "42");
    assert_eq!(clean["completed"], "false");
    assert_eq!(clean["title"], "x");
    assert_eq!(clean["extra"], "null");
}
