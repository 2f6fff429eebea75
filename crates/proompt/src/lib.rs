//! Object-oriented prompt composition for language-model interactions.
//!
//! `proompt` models a prompt as a tree of small, testable pieces instead of
//! one large format string. Three abstractions do the work:
//!
//! - **Providers** produce the data a prompt is about. Every
//!   [`Provider`](provider::Provider) has a synchronous `run`, an optional
//!   async `arun`, a `name`, and a one-line `provider_ctx`.
//! - **Contexts** render themselves to descriptive text. A
//!   [`ToolContext`](context::ToolContext) describes a callable tool: name,
//!   description, arguments, and return type.
//! - **Sections and prompts** combine the two. A
//!   [`PromptSection`](prompt::PromptSection) holds a context, ordered
//!   providers, and ordered tools and renders a fragment through its
//!   formatter; a [`Prompt`](prompt::Prompt) renders its sections into the
//!   final string.
//!
//! # Getting started
//!
//! ```
//! use proompt::prelude::*;
//!
//! let metrics = FnProvider::new("Metrics for Q3 2024", "Basic business metrics.", || {
//!     Ok(serde_json::json!({"quarter": "Q3 2024", "revenue": 1250000}))
//! });
//! let growth = ToolContext::new("calculate_growth_rate", "Calculate simple growth rate.")
//!     .with_arg(ToolParameter::new("current", "number"))
//!     .with_arg(ToolParameter::new("previous", "number"));
//!
//! let section = ListSection::new(
//!     "QUARTERLY METRICS ANALYSIS",
//!     SectionCore::new()
//!         .with_context(TextContext::new("Company: StartupCorp"))
//!         .with_providers([ProviderHandle::new(metrics)])
//!         .with_tools([growth]),
//! );
//!
//! let prompt = SectionedPrompt::new()
//!     .with_header("# QUARTERLY REVIEW: StartupCorp")
//!     .with_section(section)
//!     .with_summary_footer();
//!
//! let text = prompt.render().unwrap();
//! assert!(text.starts_with("# QUARTERLY REVIEW: StartupCorp"));
//! assert!(text.contains("- calculate_growth_rate: Calculate simple growth rate."));
//! ```
//!
//! # Where to find things
//!
//! - **Supply data:** implement [`Provider`](provider::Provider), or wrap a
//!   closure in [`FnProvider`](provider::FnProvider). Sections store providers
//!   as [`ProviderHandle`](provider::ProviderHandle)s and can recover the
//!   concrete type with `downcast_ref`.
//! - **Describe tools:** build a [`ToolContext`](context::ToolContext) by hand,
//!   from a function-calling [`ToolDef`], from a typed argument struct
//!   (`from_args`), or from an executable [`Tool`](tools::Tool). Anything a
//!   section accepts as a tool converts into a
//!   [`ToolSource`](tools::ToolSource).
//! - **Write sections:** implement [`PromptSection`](prompt::PromptSection)
//!   over a [`SectionCore`](prompt::SectionCore) and assemble text with
//!   [`PromptBuilder`](prompt::PromptBuilder) and the [`text`] helpers, or use
//!   [`ListSection`](prompt::ListSection).
//! - **Combine sections:** implement [`Prompt`](prompt::Prompt) or use
//!   [`SectionedPrompt`](prompt::SectionedPrompt) with a
//!   [`PromptConfig`](prompt::PromptConfig).
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`provider`] | [`Provider`](provider::Provider) trait, type-erased handles, closure and static providers |
//! | [`context`] | [`Context`](context::Context) trait, [`TextContext`](context::TextContext), [`ToolContext`](context::ToolContext) |
//! | [`tools`] | [`Tool`](tools::Tool) trait, [`Toolset`](tools::Toolset), [`FnTool`](tools::FnTool), tool normalization |
//! | [`prompt`] | Sections, prompts, the markdown builder, ready-made section and prompt |
//! | [`review`] | The quarterly-review prompt rendered by the `proompt` binary |
//! | [`text`] | `dedent`, `indent`, `bullet_list` |
//! | [`error`] | [`ProomptError`] and the [`Result`] alias |

pub mod context;
pub mod error;
pub mod prelude;
pub mod prompt;
pub mod provider;
pub mod review;
pub mod text;
pub mod tools;

pub use error::{ProomptError, Result};
pub use schemars;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Generate a JSON Schema `Value` from a type implementing [`JsonSchema`].
///
/// ```
/// use proompt::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct TrendArgs {
///     current_value: f64,
///     previous_value: f64,
///     #[serde(default)]
///     periods: Option<u32>,
/// }
///
/// let schema = json_schema_for::<TrendArgs>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"current_value".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Tool definitions ───────────────────────────────────────────────

/// The type of a tool. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ToolType {
    #[serde(rename = "function")]
    Function,
}

/// Tool definition in OpenAI function-calling format.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionDef,
}

impl ToolDef {
    /// Create a function-calling tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: ToolType::Function,
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_def_serializes_function_shape() {
        let def = ToolDef::new("get_metrics", "Retrieve metrics.", json!({"type": "object"}));
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "get_metrics");
        assert_eq!(value["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn tool_def_deserializes_without_optional_fields() {
        let def: ToolDef =
            serde_json::from_value(json!({"type": "function", "function": {"name": "x"}})).unwrap();
        assert_eq!(def.function.name, "x");
        assert_eq!(def.function.description, "");
        assert!(def.function.parameters.is_null());
    }

    #[test]
    fn schema_keeps_field_order() {
        #[derive(Deserialize, JsonSchema)]
        #[allow(dead_code)]
        struct Args {
            zeta: String,
            alpha: u32,
        }
        let schema = json_schema_for::<Args>();
        let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
