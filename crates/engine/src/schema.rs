//! JSON Schema validation of tool call arguments against a tool's
//! advertised `input_schema`. Enrichment dependency: the teacher never
//! validates tool arguments against a schema (its tools are hand-typed
//! Rust structs deserialized directly), so this is grounded on
//! `jsonschema`'s use elsewhere in the example pack (`stencila-stencila`'s
//! `rust/agents` crate, `danielchristiancazares-forge`) rather than on
//! the teacher itself.

/// True if `arguments` conforms to `schema`. A malformed schema is
/// treated as "does not validate" rather than panicking — callers
/// report it as `FailureReason::InvalidArguments`.
///
/// Diverges from standard JSON Schema on one default: when `properties`
/// is present and `additionalProperties` is absent, unknown fields are
/// rejected rather than allowed. A schema with no `properties` at all
/// still allows any fields, and an explicit `additionalProperties` is
/// always honored as written.
pub fn validate_arguments(schema: &serde_json::Value, arguments: &serde_json::Value) -> bool {
    let schema = tighten_additional_properties(schema);
    jsonschema::is_valid(&schema, arguments)
}

fn tighten_additional_properties(schema: &serde_json::Value) -> serde_json::Value {
    let Some(obj) = schema.as_object() else {
        return schema.clone();
    };
    if !obj.contains_key("properties") || obj.contains_key("additionalProperties") {
        return schema.clone();
    }
    let mut tightened = obj.clone();
    tightened.insert("additionalProperties".to_string(), serde_json::Value::Bool(false));
    serde_json::Value::Object(tightened)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_object_passes() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        });
        assert!(validate_arguments(&schema, &serde_json::json!({"query": "rust"})));
    }

    #[test]
    fn missing_required_field_fails() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        });
        assert!(!validate_arguments(&schema, &serde_json::json!({})));
    }

    #[test]
    fn wrong_type_fails() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "count": { "type": "integer" } },
            "required": ["count"]
        });
        assert!(!validate_arguments(&schema, &serde_json::json!({"count": "three"})));
    }

    #[test]
    fn unknown_field_rejected_by_default_when_properties_present() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        });
        assert!(!validate_arguments(&schema, &serde_json::json!({"query": "rust", "extra": 1})));
    }

    #[test]
    fn unknown_field_allowed_when_additional_properties_explicitly_true() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"],
            "additionalProperties": true
        });
        assert!(validate_arguments(&schema, &serde_json::json!({"query": "rust", "extra": 1})));
    }

    #[test]
    fn any_fields_allowed_when_properties_absent() {
        let schema = serde_json::json!({ "type": "object" });
        assert!(validate_arguments(&schema, &serde_json::json!({"anything": "goes"})));
    }
}
