//! Tool descriptors and the argument validation boundary.
//!
//! Each tool declares an ordered parameter list with explicit types,
//! required flags, and defaults. Incoming arguments are checked against
//! that declaration *before* the handler runs: a request with a missing
//! required parameter or a type mismatch is rejected with
//! `InvalidArguments` and has no observable side effect.
//!
//! Descriptors are immutable after registration and are rendered as
//! standard JSON Schema objects for `tools/list`, without Rust-specific
//! formats that LLM callers may not understand.

use serde_json::{Map, Value, json};

use super::error::ToolError;

/// Declared type of one tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    /// Ordered list of strings; order is preserved through validation
    StringList,
}

impl ParamType {
    /// JSON Schema type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Boolean => "boolean",
            ParamType::StringList => "array",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Integer => value.is_i64() || value.is_u64(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

/// Declaration of one tool parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub param_type: ParamType,
    pub required: bool,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn new(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            description,
            param_type,
            required: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Immutable description of one registered tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn new(name: &'static str, description: &'static str, params: Vec<ParamSpec>) -> Self {
        Self {
            name,
            description,
            params,
        }
    }

    /// Render the parameter list as a JSON Schema object for `tools/list`.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(param.param_type.as_str()));
            prop.insert("description".to_string(), json!(param.description));
            if param.param_type == ParamType::StringList {
                prop.insert("items".to_string(), json!({"type": "string"}));
            }
            if let Some(default) = &param.default {
                prop.insert("default".to_string(), default.clone());
            }
            properties.insert(param.name.to_string(), Value::Object(prop));
            if param.required {
                required.push(json!(param.name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Full listing entry for `tools/list`.
    pub fn to_listing(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }

    /// Validate and normalize an argument map against this descriptor.
    ///
    /// - every required parameter must be present and non-null
    /// - every present parameter must match its declared type
    /// - parameters not declared by the tool are rejected
    /// - `null` counts as absent, so defaults apply to it
    /// - defaults are injected for absent optional parameters
    ///
    /// Returns the normalized map the handler will see, or
    /// `InvalidArguments` with a detail naming the offending parameter.
    pub fn validate(&self, args: &Map<String, Value>) -> Result<Map<String, Value>, ToolError> {
        for key in args.keys() {
            if !self.params.iter().any(|p| p.name == key) {
                return Err(ToolError::InvalidArguments(format!(
                    "unexpected parameter '{key}' for tool '{}'",
                    self.name
                )));
            }
        }

        let mut normalized = Map::new();
        for param in &self.params {
            match args.get(param.name) {
                Some(value) if !value.is_null() => {
                    if !param.param_type.matches(value) {
                        return Err(ToolError::InvalidArguments(format!(
                            "parameter '{}' must be of type {}",
                            param.name,
                            param.param_type.as_str()
                        )));
                    }
                    normalized.insert(param.name.to_string(), value.clone());
                }
                _ => {
                    if param.required {
                        return Err(ToolError::InvalidArguments(format!(
                            "missing required parameter '{}'",
                            param.name
                        )));
                    }
                    if let Some(default) = &param.default {
                        normalized.insert(param.name.to_string(), default.clone());
                    }
                }
            }
        }
        Ok(normalized)
    }
}
