//! Schema adapter — declared parameter lists to validated argument contracts.
//!
//! Translates a gateway [`ToolDefinition`]'s parameter list into an
//! [`ArgumentSchema`] the invoker checks arguments against before any
//! remote call. Pure derivation: no network, no mutation after build.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

use crate::gateway::ToolDefinition;
use crate::types::{Error, Result};

// =============================================================================
// Value types
// =============================================================================

/// Argument value type, built from the gateway's declared type tag.
///
/// The tag set is closed; anything unrecognized maps to `Any`, which
/// accepts every JSON value including null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Any,
}

impl ValueType {
    /// Map a declared type tag to a value type. Unrecognized tags fall
    /// back to `Any` rather than failing the wrap.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "string" => ValueType::String,
            "number" => ValueType::Number,
            "integer" => ValueType::Integer,
            "boolean" => ValueType::Boolean,
            "array" => ValueType::Array,
            "object" => ValueType::Object,
            _ => ValueType::Any,
        }
    }

    /// Validate a JSON value against this type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            ValueType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ValueType::Number => {
                if value.is_number() {
                    Ok(())
                } else {
                    Err(format!("expected number, got {}", value_type_name(value)))
                }
            }
            ValueType::Integer => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(format!("expected integer, got {}", value_type_name(value)))
                }
            }
            ValueType::Boolean => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("expected boolean, got {}", value_type_name(value)))
                }
            }
            ValueType::Array => {
                if value.is_array() {
                    Ok(())
                } else {
                    Err(format!("expected array, got {}", value_type_name(value)))
                }
            }
            ValueType::Object => {
                if value.is_object() {
                    Ok(())
                } else {
                    Err(format!("expected object, got {}", value_type_name(value)))
                }
            }
            ValueType::Any => Ok(()),
        }
    }

    /// Human-readable type name for prompt generation.
    pub fn display_name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Any => "any",
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Argument fields
// =============================================================================

/// A single argument field derived from one declared parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgField {
    pub name: String,
    pub value_type: ValueType,
    pub required: bool,
    pub description: String,
}

// =============================================================================
// Argument schema
// =============================================================================

/// Argument validation contract for one tool.
///
/// Field set exactly mirrors the definition's parameters. Required
/// fields must be present; optional fields may be omitted or explicitly
/// null. Built fresh per definition and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentSchema {
    name: String,
    fields: Vec<ArgField>,
}

impl ArgumentSchema {
    /// Derive a schema from a tool definition.
    ///
    /// Fails with a wrap error on malformed definitions (empty or
    /// duplicate parameter names) so the registry can skip them.
    pub fn from_definition(def: &ToolDefinition) -> Result<Self> {
        let mut fields = Vec::with_capacity(def.inputs.parameters.len());
        let mut seen: HashSet<&str> = HashSet::new();

        for param in &def.inputs.parameters {
            if param.name.is_empty() {
                return Err(Error::tool_wrap(format!(
                    "tool '{}' declares a parameter with an empty name",
                    def.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(Error::tool_wrap(format!(
                    "tool '{}' declares parameter '{}' more than once",
                    def.name, param.name
                )));
            }
            fields.push(ArgField {
                name: param.name.clone(),
                value_type: ValueType::from_tag(&param.value_schema.val_type),
                required: param.required,
                description: param
                    .description
                    .clone()
                    .unwrap_or_else(|| "No description provided.".to_string()),
            });
        }

        Ok(Self {
            name: format!("{}Args", def.name),
            fields,
        })
    }

    /// Schema name, unique per tool: `{tool}Args`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[ArgField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ArgField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate supplied arguments against this schema.
    ///
    /// Returns a single aggregated message: missing required fields
    /// (de-duplicated, deterministic order), then per-field violations
    /// and unknown-parameter rejections. Optional fields accept an
    /// explicit null.
    pub fn validate(&self, args: &Map<String, Value>) -> std::result::Result<(), String> {
        let mut missing: BTreeSet<&str> = BTreeSet::new();
        let mut violations: Vec<String> = Vec::new();

        for field in &self.fields {
            if field.required && !args.contains_key(&field.name) {
                missing.insert(field.name.as_str());
            }
        }

        for (key, value) in args {
            match self.field(key) {
                Some(field) => {
                    if value.is_null() && !field.required {
                        continue;
                    }
                    if let Err(e) = field.value_type.validate(value) {
                        violations.push(format!("{} on parameter `{}`", e, key));
                    }
                }
                None => violations.push(format!("unknown parameter `{}`", key)),
            }
        }

        if missing.is_empty() && violations.is_empty() {
            return Ok(());
        }

        let mut message = String::from("invalid arguments provided");
        if !missing.is_empty() {
            let names: Vec<&str> = missing.into_iter().collect();
            message.push_str(&format!("\n- missing fields: {}", names.join(", ")));
        }
        for violation in violations {
            message.push_str(&format!("\n- {}", violation));
        }
        Err(message)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{InputParameter, ToolInputs, ToolkitRef, ValueSchema};

    fn param(name: &str, val_type: &str, required: bool) -> InputParameter {
        InputParameter {
            name: name.to_string(),
            required,
            description: None,
            value_schema: ValueSchema {
                val_type: val_type.to_string(),
            },
        }
    }

    fn definition(name: &str, parameters: Vec<InputParameter>) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            toolkit: ToolkitRef {
                name: "Test".to_string(),
            },
            description: None,
            inputs: ToolInputs { parameters },
            requirements: None,
        }
    }

    #[test]
    fn test_from_tag_closed_set() {
        assert_eq!(ValueType::from_tag("string"), ValueType::String);
        assert_eq!(ValueType::from_tag("integer"), ValueType::Integer);
        assert_eq!(ValueType::from_tag("json"), ValueType::Any);
        assert_eq!(ValueType::from_tag(""), ValueType::Any);
    }

    #[test]
    fn test_any_accepts_everything() {
        let any = ValueType::Any;
        assert!(any.validate(&serde_json::json!(null)).is_ok());
        assert!(any.validate(&serde_json::json!({"k": 1})).is_ok());
        assert!(any.validate(&serde_json::json!("text")).is_ok());
    }

    #[test]
    fn test_integer_rejects_float() {
        assert!(ValueType::Integer.validate(&serde_json::json!(3)).is_ok());
        assert!(ValueType::Integer.validate(&serde_json::json!(3.5)).is_err());
        assert!(ValueType::Number.validate(&serde_json::json!(3.5)).is_ok());
    }

    #[test]
    fn test_schema_name_per_tool() {
        let schema =
            ArgumentSchema::from_definition(&definition("Search", vec![])).unwrap();
        assert_eq!(schema.name(), "SearchArgs");
    }

    #[test]
    fn test_round_trip_required_query() {
        let schema = ArgumentSchema::from_definition(&definition(
            "Search",
            vec![param("query", "string", true)],
        ))
        .unwrap();

        let ok = serde_json::json!({"query": "abc"});
        assert!(schema.validate(ok.as_object().unwrap()).is_ok());

        let empty = serde_json::json!({});
        let message = schema.validate(empty.as_object().unwrap()).unwrap_err();
        assert!(message.contains("query"), "message was: {}", message);
        assert!(message.contains("missing fields"));
    }

    #[test]
    fn test_missing_fields_deduplicated_and_ordered() {
        let schema = ArgumentSchema::from_definition(&definition(
            "Send",
            vec![
                param("subject", "string", true),
                param("body", "string", true),
            ],
        ))
        .unwrap();

        let empty = serde_json::json!({});
        let message = schema.validate(empty.as_object().unwrap()).unwrap_err();
        // BTreeSet ordering: alphabetical regardless of declaration order.
        assert!(message.contains("missing fields: body, subject"));
        assert_eq!(message.matches("body").count(), 1);
    }

    #[test]
    fn test_type_violation_names_parameter() {
        let schema = ArgumentSchema::from_definition(&definition(
            "Search",
            vec![param("query", "string", true)],
        ))
        .unwrap();

        let bad = serde_json::json!({"query": 42});
        let message = schema.validate(bad.as_object().unwrap()).unwrap_err();
        assert!(message.contains("expected string, got number on parameter `query`"));
    }

    #[test]
    fn test_optional_accepts_explicit_null() {
        let schema = ArgumentSchema::from_definition(&definition(
            "Search",
            vec![
                param("query", "string", true),
                param("limit", "integer", false),
            ],
        ))
        .unwrap();

        let args = serde_json::json!({"query": "abc", "limit": null});
        assert!(schema.validate(args.as_object().unwrap()).is_ok());

        // Null is not a valid value for a required string.
        let args = serde_json::json!({"query": null});
        let message = schema.validate(args.as_object().unwrap()).unwrap_err();
        assert!(message.contains("expected string, got null"));
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let schema = ArgumentSchema::from_definition(&definition(
            "Search",
            vec![param("query", "string", true)],
        ))
        .unwrap();

        let args = serde_json::json!({"query": "abc", "user_id": "spoofed"});
        let message = schema.validate(args.as_object().unwrap()).unwrap_err();
        assert!(message.contains("unknown parameter `user_id`"));
    }

    #[test]
    fn test_duplicate_parameter_fails_wrap() {
        let result = ArgumentSchema::from_definition(&definition(
            "Search",
            vec![param("query", "string", true), param("query", "string", false)],
        ));
        assert!(matches!(result, Err(Error::ToolWrap(_))));
    }

    #[test]
    fn test_empty_parameter_name_fails_wrap() {
        let result =
            ArgumentSchema::from_definition(&definition("Search", vec![param("", "string", true)]));
        assert!(matches!(result, Err(Error::ToolWrap(_))));
    }

    #[test]
    fn test_unrecognized_tag_field_accepts_anything() {
        let schema = ArgumentSchema::from_definition(&definition(
            "Exec",
            vec![param("payload", "binary", true)],
        ))
        .unwrap();
        let args = serde_json::json!({"payload": [1, 2, 3]});
        assert!(schema.validate(args.as_object().unwrap()).is_ok());
    }
}
