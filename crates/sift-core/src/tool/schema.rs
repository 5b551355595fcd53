use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonSchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl JsonSchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonSchemaType::String => "string",
            JsonSchemaType::Number => "number",
            JsonSchemaType::Integer => "integer",
            JsonSchemaType::Boolean => "boolean",
            JsonSchemaType::Array => "array",
            JsonSchemaType::Object => "object",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            JsonSchemaType::String => value.is_string(),
            JsonSchemaType::Number => value.is_number(),
            JsonSchemaType::Integer => value.is_i64() || value.is_u64(),
            JsonSchemaType::Boolean => value.is_boolean(),
            JsonSchemaType::Array => value.is_array(),
            JsonSchemaType::Object => value.is_object(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub schema_type: JsonSchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ToolParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ToolParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ToolParameter {
    fn of(schema_type: JsonSchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            default: None,
            items: None,
            properties: None,
            required: None,
        }
    }

    pub fn string() -> Self {
        Self::of(JsonSchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(JsonSchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::of(JsonSchemaType::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(JsonSchemaType::Boolean)
    }

    pub fn array(items: ToolParameter) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(JsonSchemaType::Array)
        }
    }

    pub fn object() -> Self {
        Self {
            properties: Some(BTreeMap::new()),
            required: Some(vec![]),
            ..Self::of(JsonSchemaType::Object)
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Schema the model sees when deciding whether to call a tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolParameter,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ToolParameter::object(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, param: ToolParameter) -> Self {
        if let Some(props) = &mut self.parameters.properties {
            props.insert(name.into(), param);
        }
        self
    }

    pub fn with_required_param(mut self, name: impl Into<String>, param: ToolParameter) -> Self {
        let name = name.into();
        if let Some(req) = &mut self.parameters.required {
            req.push(name.clone());
        }
        self.with_param(name, param)
    }

    pub fn required(&self) -> &[String] {
        self.parameters.required.as_deref().unwrap_or(&[])
    }

    /// Checks decoded arguments against the declared parameters: required
    /// names present and primitive types matching. Unknown names are allowed.
    pub fn validate_arguments(&self, args: &Map<String, Value>) -> Result<(), String> {
        for name in self.required() {
            match args.get(name) {
                None | Some(Value::Null) => {
                    return Err(format!("missing required parameter '{}'", name))
                }
                _ => {}
            }
        }

        if let Some(props) = &self.parameters.properties {
            for (name, value) in args {
                if value.is_null() {
                    continue;
                }
                if let Some(param) = props.get(name) {
                    if !param.schema_type.accepts(value) {
                        return Err(format!(
                            "parameter '{}' must be of type {}",
                            name,
                            param.schema_type.as_str()
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}
