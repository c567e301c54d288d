//! Declarative input schemas.
//!
//! Each tool describes its input as a flat table of [`FieldSpec`] rows. One
//! generic validator interprets the table at call time, and the same table
//! renders to a JSON Schema object for discovery, so the two can never drift
//! apart.

use serde_json::{json, Map, Value};

/// Primitive shape a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Bool,
    /// A task reference: canonical uuid string or derived external integer.
    TaskId,
}

/// One row of a tool's input table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: Option<usize>,
    pub non_empty: bool,
    pub one_of: Option<&'static [&'static str]>,
    pub default: Option<&'static str>,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            max_len: None,
            non_empty: false,
            one_of: None,
            default: None,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    pub const fn max_len(mut self, n: usize) -> Self {
        self.max_len = Some(n);
        self
    }

    pub const fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.one_of = Some(values);
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }
}

/// Check `args` against the table, stopping at the first violation.
///
/// The returned message is the in-band `error` string for the tool's
/// failure envelope; nothing here touches the store.
pub fn validate(fields: &[FieldSpec], args: &Value) -> Result<(), String> {
    let obj = match args.as_object() {
        Some(obj) => obj,
        None => return Err("arguments must be an object".into()),
    };

    for spec in fields {
        let value = match obj.get(spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(format!("field {} is required", spec.name));
                }
                continue;
            }
            Some(v) => v,
        };

        match spec.kind {
            FieldKind::Str => {
                let s = match value.as_str() {
                    Some(s) => s,
                    None => return Err(format!("field {} must be a string", spec.name)),
                };
                if spec.non_empty && s.trim().is_empty() {
                    return Err(format!("field {} must not be empty", spec.name));
                }
                if let Some(max) = spec.max_len {
                    if s.chars().count() > max {
                        return Err(format!(
                            "field {} must be at most {} characters",
                            spec.name, max
                        ));
                    }
                }
                if let Some(allowed) = spec.one_of {
                    if !allowed.contains(&s) {
                        return Err(format!(
                            "field {} must be one of {}",
                            spec.name,
                            allowed.join(", ")
                        ));
                    }
                }
            }
            FieldKind::Int => {
                if value.as_i64().is_none() {
                    return Err(format!("field {} must be an integer", spec.name));
                }
            }
            FieldKind::Bool => {
                if !value.is_boolean() {
                    return Err(format!("field {} must be a boolean", spec.name));
                }
            }
            FieldKind::TaskId => {
                if !value.is_string() && value.as_i64().is_none() {
                    return Err(format!(
                        "field {} must be a string or an integer",
                        spec.name
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Render the table as the JSON Schema object served by tool discovery.
pub fn render(fields: &[FieldSpec]) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();

    for spec in fields {
        let mut prop = Map::new();
        let type_value = match spec.kind {
            FieldKind::Str => json!("string"),
            FieldKind::Int => json!("integer"),
            FieldKind::Bool => json!("boolean"),
            FieldKind::TaskId => json!(["integer", "string"]),
        };
        prop.insert("type".into(), type_value);
        if !spec.description.is_empty() {
            prop.insert("description".into(), json!(spec.description));
        }
        if let Some(max) = spec.max_len {
            prop.insert("maxLength".into(), json!(max));
        }
        if let Some(allowed) = spec.one_of {
            prop.insert("enum".into(), json!(allowed));
        }
        if let Some(default) = spec.default {
            prop.insert("default".into(), json!(default));
        }
        properties.insert(spec.name.into(), Value::Object(prop));
        if spec.required {
            required.push(json!(spec.name));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("user_id", FieldKind::Str, "Caller"),
        FieldSpec::required("title", FieldKind::Str, "Title")
            .max_len(10)
            .non_empty(),
        FieldSpec::optional("status", FieldKind::Str, "Filter")
            .one_of(&["all", "pending", "completed"])
            .default_value("all"),
        FieldSpec::optional("task_id", FieldKind::TaskId, "Task reference"),
    ];

    #[test]
    fn missing_required_field() {
        let err = validate(FIELDS, &json!({"title": "x"})).unwrap_err();
        assert_eq!(err, "field user_id is required");
    }

    #[test]
    fn wrong_type() {
        let err = validate(FIELDS, &json!({"user_id": 7, "title": "x"})).unwrap_err();
        assert_eq!(err, "field user_id must be a string");
    }

    #[test]
    fn first_violation_wins() {
        // user_id precedes title in the table, so its violation is reported
        // even though title is also invalid.
        let err = validate(FIELDS, &json!({"user_id": 7, "title": 9})).unwrap_err();
        assert_eq!(err, "field user_id must be a string");
    }

    #[test]
    fn max_length_enforced() {
        let err = validate(
            FIELDS,
            &json!({"user_id": "u", "title": "0123456789ab"}),
        )
        .unwrap_err();
        assert_eq!(err, "field title must be at most 10 characters");
    }

    #[test]
    fn empty_title_rejected() {
        let err = validate(FIELDS, &json!({"user_id": "u", "title": "   "})).unwrap_err();
        assert_eq!(err, "field title must not be empty");
    }

    #[test]
    fn enum_outside_set_rejected() {
        let err = validate(
            FIELDS,
            &json!({"user_id": "u", "title": "x", "status": "done"}),
        )
        .unwrap_err();
        assert_eq!(err, "field status must be one of all, pending, completed");
    }

    #[test]
    fn task_id_accepts_both_shapes() {
        assert!(validate(
            FIELDS,
            &json!({"user_id": "u", "title": "x", "task_id": 42})
        )
        .is_ok());
        assert!(validate(
            FIELDS,
            &json!({"user_id": "u", "title": "x", "task_id": "abc-def"})
        )
        .is_ok());
        let err = validate(
            FIELDS,
            &json!({"user_id": "u", "title": "x", "task_id": true}),
        )
        .unwrap_err();
        assert_eq!(err, "field task_id must be a string or an integer");
    }

    #[test]
    fn null_optional_is_absent() {
        assert!(validate(
            FIELDS,
            &json!({"user_id": "u", "title": "x", "status": null})
        )
        .is_ok());
    }

    #[test]
    fn non_object_args_rejected() {
        assert!(validate(FIELDS, &json!([1, 2])).is_err());
    }

    #[test]
    fn rendered_schema_shape() {
        let schema = render(FIELDS);
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"], json!(["user_id", "title"]));
        assert_eq!(schema["properties"]["title"]["maxLength"], 10);
        assert_eq!(
            schema["properties"]["status"]["enum"],
            json!(["all", "pending", "completed"])
        );
        assert_eq!(schema["properties"]["status"]["default"], "all");
        assert_eq!(
            schema["properties"]["task_id"]["type"],
            json!(["integer", "string"])
        );
    }
}
