//! Tool descriptions rendered into prompts.
//!
//! [`ToolContext`] describes a callable tool the way a prompt needs to see it:
//! name, description, ordered arguments with types and defaults, and return
//! type. It is built from a function-calling [`ToolDef`], from a typed
//! argument struct via `schemars`, or from a [`Tool`]; the last form keeps the
//! tool so the context can also be invoked.

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::Context;
use crate::error::{ProomptError, Result};
use crate::tools::core::{Tool, validate_tool_arguments};
use crate::{ToolDef, json_schema_for};

/// One argument of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolParameter {
    pub name: String,
    /// Rendered type, e.g. `integer`, `array<number>`, `string | null`.
    pub type_name: String,
    pub required: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: true,
            default: None,
            description: None,
        }
    }

    /// Mark optional with a default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }

    /// Mark optional without a default.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn signature_fragment(&self) -> String {
        match (&self.default, self.required) {
            (Some(default), _) => format!("{}: {} = {default}", self.name, self.type_name),
            (None, true) => format!("{}: {}", self.name, self.type_name),
            (None, false) => format!("{}?: {}", self.name, self.type_name),
        }
    }

    fn listing_line(&self) -> String {
        let qualifier = match (&self.default, self.required) {
            (Some(default), _) => format!("default {default}"),
            (None, true) => "required".to_string(),
            (None, false) => "optional".to_string(),
        };
        match &self.description {
            Some(d) => format!("  - {} ({}, {qualifier}): {d}", self.name, self.type_name),
            None => format!("  - {} ({}, {qualifier})", self.name, self.type_name),
        }
    }
}

/// Description of a tool, renderable into a prompt.
///
/// ```
/// use proompt::context::{Context, ToolContext, ToolParameter};
///
/// let tool = ToolContext::new("add_numbers", "Add two numbers together.")
///     .with_arg(ToolParameter::new("x", "integer"))
///     .with_arg(ToolParameter::new("y", "integer").with_default(1))
///     .with_return("integer");
///
/// assert_eq!(tool.signature(), "add_numbers(x: integer, y: integer = 1) -> integer");
/// assert!(tool.render().starts_with("Tool: add_numbers\nDescription: Add two numbers together."));
/// assert_eq!(tool.to_string(), tool.render());
/// ```
#[derive(Clone)]
pub struct ToolContext {
    tool_name: String,
    tool_description: String,
    tool_args: Vec<ToolParameter>,
    tool_return: Option<String>,
    parameters: Value,
    handler: Option<Arc<dyn Tool>>,
}

impl ToolContext {
    /// A description-only tool context with no arguments.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            tool_name: name.into(),
            tool_description: description.into(),
            tool_args: Vec::new(),
            tool_return: None,
            parameters: Value::Null,
            handler: None,
        }
    }

    /// Append an argument.
    pub fn with_arg(mut self, arg: ToolParameter) -> Self {
        self.tool_args.push(arg);
        self
    }

    /// Set the return type.
    pub fn with_return(mut self, type_name: impl Into<String>) -> Self {
        self.tool_return = Some(type_name.into());
        self
    }

    /// Build from a function-calling definition.
    ///
    /// Arguments follow the declared property order. An empty description
    /// falls back to the schema's own `description`.
    pub fn from_definition(def: &ToolDef) -> Result<Self> {
        let name = def.function.name.trim();
        if name.is_empty() {
            return Err(ProomptError::invalid_tool("tool name is empty"));
        }

        let parameters = &def.function.parameters;
        let tool_args = match parameters {
            Value::Null => Vec::new(),
            Value::Object(_) => parse_parameters(name, parameters)?,
            other => {
                return Err(ProomptError::invalid_tool(format!(
                    "parameters of '{name}' must be a JSON object, got {}",
                    json_kind(other)
                )));
            }
        };

        let description = if def.function.description.trim().is_empty() {
            parameters
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        } else {
            def.function.description.clone()
        };

        Ok(Self {
            tool_name: name.to_string(),
            tool_description: description,
            tool_args,
            tool_return: None,
            parameters: parameters.clone(),
            handler: None,
        })
    }

    /// Build from a typed argument struct. Doc comments on the struct and its
    /// fields become descriptions.
    pub fn from_args<A: JsonSchema>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        Self::from_definition(&ToolDef::new(name, description, json_schema_for::<A>()))
    }

    /// Describe a tool without keeping it.
    pub fn from_tool(tool: &dyn Tool) -> Result<Self> {
        Self::from_definition(&tool.definition())
    }

    /// Describe a tool and keep it so the context can be invoked.
    pub fn from_shared_tool(tool: Arc<dyn Tool>) -> Result<Self> {
        let mut ctx = Self::from_definition(&tool.definition())?;
        ctx.handler = Some(tool);
        Ok(ctx)
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn tool_description(&self) -> &str {
        &self.tool_description
    }

    pub fn tool_args(&self) -> &[ToolParameter] {
        &self.tool_args
    }

    pub fn tool_return(&self) -> Option<&str> {
        self.tool_return.as_deref()
    }

    /// The JSON Schema the arguments were parsed from (`null` when built by hand).
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    /// Whether [`invoke`](Self::invoke) can execute anything.
    pub fn is_invocable(&self) -> bool {
        self.handler.is_some()
    }

    /// `name(arg: type, arg: type = default) -> return`
    pub fn signature(&self) -> String {
        let args: Vec<String> = self
            .tool_args
            .iter()
            .map(ToolParameter::signature_fragment)
            .collect();
        let mut sig = format!("{}({})", self.tool_name, args.join(", "));
        if let Some(ret) = &self.tool_return {
            sig.push_str(&format!(" -> {ret}"));
        }
        sig
    }

    /// Function-calling definition equivalent to this context.
    pub fn definition(&self) -> ToolDef {
        let parameters = if self.parameters.is_null() {
            self.synthesized_schema()
        } else {
            self.parameters.clone()
        };
        ToolDef::new(
            self.tool_name.clone(),
            self.tool_description.clone(),
            parameters,
        )
    }

    /// Check JSON arguments against the tool's schema.
    pub fn validate_arguments(&self, arguments: &str) -> Result<()> {
        validate_tool_arguments(&self.definition(), arguments)
    }

    /// Validate and execute the underlying tool.
    pub async fn invoke(&self, arguments: &str) -> Result<String> {
        let tool = self
            .handler
            .as_ref()
            .ok_or_else(|| ProomptError::NotInvocable {
                tool: self.tool_name.clone(),
            })?;
        self.validate_arguments(arguments)?;
        Ok(tool.execute(arguments).await)
    }

    fn synthesized_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for arg in &self.tool_args {
            let mut prop = serde_json::Map::new();
            if let Some(primitive) = primitive_type(&arg.type_name) {
                prop.insert("type".into(), Value::String(primitive.into()));
            }
            if let Some(d) = &arg.description {
                prop.insert("description".into(), Value::String(d.clone()));
            }
            if let Some(default) = &arg.default {
                prop.insert("default".into(), default.clone());
            }
            if arg.required {
                required.push(Value::String(arg.name.clone()));
            }
            properties.insert(arg.name.clone(), Value::Object(prop));
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl Context for ToolContext {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("Tool: {}", self.tool_name),
            format!("Description: {}", self.tool_description),
            format!("Signature: {}", self.signature()),
        ];
        if self.tool_args.is_empty() {
            lines.push("Arguments: none".into());
        } else {
            lines.push("Arguments:".into());
            lines.extend(self.tool_args.iter().map(ToolParameter::listing_line));
        }
        if let Some(ret) = &self.tool_return {
            lines.push(format!("Returns: {ret}"));
        }
        lines.join("\n")
    }
}

impl fmt::Display for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("tool_name", &self.tool_name)
            .field("tool_args", &self.tool_args)
            .field("tool_return", &self.tool_return)
            .field("invocable", &self.is_invocable())
            .finish()
    }
}

// ── Schema parsing ─────────────────────────────────────────────────

fn parse_parameters(tool: &str, schema: &Value) -> Result<Vec<ToolParameter>> {
    let properties = match schema.get("properties") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(props)) => props,
        Some(other) => {
            return Err(ProomptError::invalid_tool(format!(
                "'properties' of '{tool}' must be an object, got {}",
                json_kind(other)
            )));
        }
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let params = properties
        .iter()
        .map(|(name, prop)| ToolParameter {
            name: name.clone(),
            type_name: type_name(prop),
            required: required.contains(&name.as_str()),
            default: prop.get("default").cloned(),
            description: prop
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect::<Vec<_>>();

    debug!("parsed {} argument(s) for tool '{tool}'", params.len());
    Ok(params)
}

/// Render a property schema's type as prompt text.
fn type_name(prop: &Value) -> String {
    if let Some(reference) = prop.get("$ref").and_then(Value::as_str) {
        return reference.rsplit('/').next().unwrap_or(reference).to_string();
    }

    match prop.get("type") {
        Some(Value::String(t)) if t == "array" => match prop.get("items") {
            Some(items) => format!("array<{}>", type_name(items)),
            None => "array".to_string(),
        },
        Some(Value::String(t)) => t.clone(),
        Some(Value::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            names.join(" | ")
        }
        _ => {
            // schemars renders Option<Struct> and enums as anyOf / oneOf / allOf.
            let variants = ["anyOf", "oneOf", "allOf"]
                .iter()
                .find_map(|k| prop.get(*k).and_then(Value::as_array));
            match variants {
                Some(vs) => vs.iter().map(type_name).collect::<Vec<_>>().join(" | "),
                None if prop.get("enum").is_some() => "enum".to_string(),
                None => "any".to_string(),
            }
        }
    }
}

fn primitive_type(type_name: &str) -> Option<&'static str> {
    match type_name {
        "string" => Some("string"),
        "integer" => Some("integer"),
        "number" => Some("number"),
        "boolean" => Some("boolean"),
        "object" => Some("object"),
        "null" => Some("null"),
        t if t.starts_with("array") => Some("array"),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::core::FnTool;
    use serde::Deserialize;
    use serde_json::json;

    /// Add two numbers together.
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct AddArgs {
        /// Left operand.
        x: i64,
        #[serde(default = "one")]
        y: i64,
    }

    fn one() -> i64 {
        1
    }

    /// Process data and return formatted result.
    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct ProcessArgs {
        data: Vec<f64>,
        #[serde(default = "json_format")]
        format_type: String,
        #[serde(default)]
        verbose: bool,
        label: Option<String>,
    }

    fn json_format() -> String {
        "json".into()
    }

    #[test]
    fn from_args_keeps_order_types_and_defaults() {
        let tool = ToolContext::from_args::<AddArgs>("add_numbers", "").unwrap();
        assert_eq!(tool.tool_name(), "add_numbers");
        assert_eq!(tool.tool_description(), "Add two numbers together.");

        let args = tool.tool_args();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].name, "x");
        assert_eq!(args[0].type_name, "integer");
        assert!(args[0].required);
        assert_eq!(args[0].description.as_deref(), Some("Left operand."));
        assert_eq!(args[1].name, "y");
        assert!(!args[1].required);
        assert_eq!(args[1].default, Some(json!(1)));

        assert_eq!(tool.signature(), "add_numbers(x: integer, y: integer = 1)");
    }

    #[test]
    fn from_args_handles_collections_and_options() {
        let tool = ToolContext::from_args::<ProcessArgs>("process_data", "Process data.")
            .unwrap()
            .with_return("object");
        let names: Vec<&str> = tool.tool_args().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["data", "format_type", "verbose", "label"]);
        assert_eq!(tool.tool_args()[0].type_name, "array<number>");
        assert_eq!(tool.tool_args()[1].default, Some(json!("json")));
        assert_eq!(tool.tool_args()[2].default, Some(json!(false)));
        assert_eq!(tool.tool_args()[3].type_name, "string | null");
        assert!(!tool.tool_args()[3].required);
        assert!(tool.signature().ends_with("-> object"));
    }

    #[test]
    fn from_definition_reads_required_and_defaults() {
        let def = ToolDef::new(
            "search_documents",
            "Search through company documents.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search text"},
                    "max_results": {"type": "integer", "default": 5}
                },
                "required": ["query"]
            }),
        );
        let tool = ToolContext::from_definition(&def).unwrap();
        assert_eq!(
            tool.signature(),
            "search_documents(query: string, max_results: integer = 5)"
        );
        let rendered = tool.render();
        assert!(rendered.contains("  - query (string, required): Search text"));
        assert!(rendered.contains("  - max_results (integer, default 5)"));
    }

    #[test]
    fn from_definition_rejects_malformed() {
        let no_name = ToolDef::new("  ", "desc", json!({}));
        assert!(ToolContext::from_definition(&no_name).is_err());

        let bad_params = ToolDef::new("x", "desc", json!("not a schema"));
        let err = ToolContext::from_definition(&bad_params).unwrap_err();
        assert!(err.to_string().contains("must be a JSON object, got string"));

        let bad_props = ToolDef::new("x", "desc", json!({"properties": [1, 2]}));
        assert!(ToolContext::from_definition(&bad_props).is_err());
    }

    #[test]
    fn from_definition_without_parameters() {
        let def = ToolDef::new("ping", "Check liveness.", Value::Null);
        let tool = ToolContext::from_definition(&def).unwrap();
        assert!(tool.tool_args().is_empty());
        assert!(tool.render().contains("Arguments: none"));
    }

    #[test]
    fn render_layout() {
        let tool = ToolContext::new("calculate_growth_rate", "Calculate simple growth rate.")
            .with_arg(ToolParameter::new("current", "number"))
            .with_arg(ToolParameter::new("previous", "number"))
            .with_return("object");
        assert_eq!(
            tool.render(),
            "Tool: calculate_growth_rate\n\
             Description: Calculate simple growth rate.\n\
             Signature: calculate_growth_rate(current: number, previous: number) -> object\n\
             Arguments:\n  \
             - current (number, required)\n  \
             - previous (number, required)\n\
             Returns: object"
        );
        assert_eq!(tool.to_string(), tool.render());
        let as_context: &dyn Context = &tool;
        assert_eq!(as_context.to_string(), tool.render());
    }

    #[test]
    fn hand_built_context_synthesizes_schema() {
        let tool = ToolContext::new("scale", "Scale a value.")
            .with_arg(ToolParameter::new("value", "number"))
            .with_arg(ToolParameter::new("factor", "number").with_default(2));
        assert!(tool.validate_arguments(r#"{"value": 3}"#).is_ok());
        assert!(tool.validate_arguments(r#"{"factor": 3}"#).is_err());
        assert!(tool.validate_arguments(r#"{"value": "three"}"#).is_err());
    }

    #[tokio::test]
    async fn invoke_requires_a_handler() {
        let tool = ToolContext::new("noop", "Does nothing.");
        let err = tool.invoke("{}").await.unwrap_err();
        assert!(matches!(err, ProomptError::NotInvocable { .. }));
    }

    #[tokio::test]
    async fn shared_tool_is_invocable() {
        let add = FnTool::new(
            ToolDef::new("add_numbers", "Add two numbers.", json_schema_for::<AddArgs>()),
            |args: AddArgs| async move { (args.x + args.y).to_string() },
        );
        let tool = ToolContext::from_shared_tool(Arc::new(add)).unwrap();
        assert!(tool.is_invocable());
        assert_eq!(tool.invoke(r#"{"x": 2}"#).await.unwrap(), "3");
        assert!(tool.invoke(r#"{"x": "two"}"#).await.is_err());
    }
}
