//! Input schemas declared as plain data
//!
//! A tool declares its parameters with [`InputSchema`]; the schema renders
//! itself as JSON Schema for discovery and validates incoming arguments
//! before the handler ever sees them.
//!
//! Unknown fields are rejected. Optional parameters that are absent or
//! `null` are filled from their declared default.

use agent_core::{Error, Result};
use serde_json::{Map, Value, json};

/// JSON type of a single parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        validate_basic(value, &json!({ "type": self.as_str() }))
    }
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub param_type: ParamType,
    pub description: Option<String>,
    /// `None` makes the parameter required
    pub default: Option<Value>,
}

impl Param {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = json!({ "type": self.param_type.as_str() });
        if let Some(description) = &self.description {
            schema["description"] = json!(description);
        }
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

/// Ordered set of parameters a tool accepts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    params: Vec<Param>,
}

impl InputSchema {
    /// Schema with no parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter
    pub fn required(
        mut self,
        name: impl Into<String>,
        param_type: ParamType,
        description: Option<&str>,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            param_type,
            description: description.map(str::to_string),
            default: None,
        });
        self
    }

    /// Add an optional parameter with a default
    pub fn optional(
        mut self,
        name: impl Into<String>,
        param_type: ParamType,
        default: Value,
        description: Option<&str>,
    ) -> Self {
        self.params.push(Param {
            name: name.into(),
            param_type,
            description: description.map(str::to_string),
            default: Some(default),
        });
        self
    }

    /// Render as a JSON Schema `object`
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.clone(), p.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect();

        object(Value::Object(properties), required)
    }

    /// Check `args` against the declared parameters and fill defaults
    ///
    /// `null` is accepted as an empty argument object.
    pub fn validate(&self, args: Value) -> Result<Arguments> {
        let mut provided = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(Error::InvalidArguments(format!(
                    "expected an object, got {}",
                    type_name(&other)
                )));
            }
        };

        if let Some(unknown) = provided
            .keys()
            .find(|key| !self.params.iter().any(|p| &p.name == *key))
        {
            return Err(Error::InvalidArguments(format!("unknown field `{unknown}`")));
        }

        let mut validated = Map::new();
        for param in &self.params {
            match provided.remove(&param.name) {
                Some(Value::Null) | None => match &param.default {
                    Some(default) => {
                        validated.insert(param.name.clone(), default.clone());
                    }
                    None => {
                        return Err(Error::InvalidArguments(format!(
                            "missing required field `{}`",
                            param.name
                        )));
                    }
                },
                Some(value) => {
                    if !param.param_type.matches(&value) {
                        return Err(Error::InvalidArguments(format!(
                            "field `{}` must be {}, got {}",
                            param.name,
                            param.param_type.as_str(),
                            type_name(&value)
                        )));
                    }
                    validated.insert(param.name.clone(), value);
                }
            }
        }

        Ok(Arguments(validated))
    }
}

/// Arguments that passed validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// String argument, erroring if absent or of another type
    pub fn str(&self, name: &str) -> anyhow::Result<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("argument `{name}` is not a string"))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Create a JSON Schema object type
///
/// # Arguments
///
/// * `properties` - Map of property names to their schemas
/// * `required` - List of required property names
pub fn object(properties: Value, required: Vec<&str>) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Validate that a value matches a JSON schema type (basic validation)
///
/// Only the top-level `type` keyword is checked.
pub fn validate_basic(value: &Value, schema: &Value) -> bool {
    let schema_type = match schema.get("type") {
        Some(Value::String(t)) => t.as_str(),
        _ => return true, // No type constraint, accept anything
    };

    match schema_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true, // Unknown type, accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_schema() -> InputSchema {
        InputSchema::new().optional(
            "format",
            ParamType::String,
            json!("%Y-%m-%d %H:%M:%S"),
            Some("strftime format"),
        )
    }

    #[test]
    fn test_to_json_schema() {
        let schema = InputSchema::new()
            .required("city", ParamType::String, Some("City name"))
            .optional("days", ParamType::Integer, json!(3), None)
            .to_json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["city"]["type"], "string");
        assert_eq!(schema["properties"]["city"]["description"], "City name");
        assert_eq!(schema["properties"]["days"]["default"], 3);
        assert_eq!(schema["required"], json!(["city"]));
    }

    #[test]
    fn test_validate_fills_defaults() {
        let args = time_schema().validate(json!({})).unwrap();
        assert_eq!(args.str("format").unwrap(), "%Y-%m-%d %H:%M:%S");

        let args = time_schema().validate(Value::Null).unwrap();
        assert_eq!(args.str("format").unwrap(), "%Y-%m-%d %H:%M:%S");

        let args = time_schema().validate(json!({"format": null})).unwrap();
        assert_eq!(args.str("format").unwrap(), "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn test_validate_keeps_provided_value() {
        let args = time_schema().validate(json!({"format": "%Y"})).unwrap();
        assert_eq!(args.str("format").unwrap(), "%Y");
    }

    #[test]
    fn test_validate_missing_required() {
        let schema = InputSchema::new().required("city", ParamType::String, None);
        let err = schema.validate(json!({})).unwrap_err();
        assert_eq!(err, Error::InvalidArguments("missing required field `city`".to_string()));
    }

    #[test]
    fn test_validate_wrong_type() {
        let err = time_schema().validate(json!({"format": 42})).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArguments("field `format` must be string, got integer".to_string())
        );
    }

    #[test]
    fn test_validate_unknown_field() {
        let err = time_schema()
            .validate(json!({"format": "%Y", "tz": "UTC"}))
            .unwrap_err();
        assert_eq!(err, Error::InvalidArguments("unknown field `tz`".to_string()));
    }

    #[test]
    fn test_validate_non_object() {
        let err = time_schema().validate(json!(["%Y"])).unwrap_err();
        assert!(matches!(err, Error::InvalidArguments(_)));
    }

    #[test]
    fn test_validate_basic() {
        assert!(validate_basic(&json!("hello"), &json!({"type": "string"})));
        assert!(!validate_basic(&json!(42), &json!({"type": "string"})));
        assert!(validate_basic(&json!(3), &json!({"type": "number"})));
        assert!(!validate_basic(&json!(3.5), &json!({"type": "integer"})));
        assert!(validate_basic(&json!({"a": 1}), &object(json!({}), vec![])));
        assert!(validate_basic(&json!(null), &json!({})));
    }
}
