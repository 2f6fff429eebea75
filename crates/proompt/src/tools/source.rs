//! Normalization of everything a section accepts as a "tool".
//!
//! Sections store tools as [`ToolContext`]s, but callers hand them many
//! shapes: ready contexts, function-calling definitions, raw JSON loaded from
//! a file, executable [`Tool`]s, whole [`Toolset`]s, or `None`. A
//! [`ToolSource`] captures each shape and [`ToolSource::normalize`] turns it
//! into zero or more contexts. Malformed inputs normalize to nothing.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::core::{Tool, Toolset};
use crate::ToolDef;
use crate::context::ToolContext;
use crate::error::{ProomptError, Result};

/// Anything that can be added to a section's tools.
#[derive(Debug, Clone)]
pub enum ToolSource {
    Context(ToolContext),
    Definition(ToolDef),
    /// A function definition as raw JSON: either the full
    /// `{"type": "function", "function": {...}}` form or the bare
    /// `{"name", "description", "parameters"}` object.
    Json(Value),
    Tool(Arc<dyn Tool>),
    Toolset(Toolset),
    Nothing,
}

impl ToolSource {
    /// Convert into tool contexts, dropping anything malformed.
    pub fn normalize(self) -> Vec<ToolContext> {
        match self {
            ToolSource::Context(ctx) => vec![ctx],
            ToolSource::Definition(def) => convert(ToolContext::from_definition(&def)),
            ToolSource::Json(value) => match definition_from_json(value) {
                Ok(def) => convert(ToolContext::from_definition(&def)),
                Err(e) => {
                    debug!("skipping tool: {e}");
                    Vec::new()
                }
            },
            ToolSource::Tool(tool) => convert(ToolContext::from_shared_tool(tool)),
            ToolSource::Toolset(set) => set
                .iter()
                .flat_map(|tool| convert(ToolContext::from_shared_tool(tool.clone())))
                .collect(),
            ToolSource::Nothing => Vec::new(),
        }
    }
}

fn convert(result: Result<ToolContext>) -> Vec<ToolContext> {
    match result {
        Ok(ctx) => vec![ctx],
        Err(e) => {
            debug!("skipping tool: {e}");
            Vec::new()
        }
    }
}

fn definition_from_json(value: Value) -> Result<ToolDef> {
    let function = match value.get("function") {
        Some(f) => f.clone(),
        None => value,
    };
    if !function.is_object() {
        return Err(ProomptError::invalid_tool("definition is not a JSON object"));
    }
    let name = function
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ProomptError::invalid_tool("definition has no string 'name'"))?;
    let description = function
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let parameters = function.get("parameters").cloned().unwrap_or(Value::Null);
    Ok(ToolDef::new(name, description, parameters))
}

/// Load tool sources from a JSON file holding an array of definitions.
///
/// Entries are returned as [`ToolSource::Json`] so malformed ones are
/// filtered when added to a section rather than failing the whole load.
pub fn load_tool_sources(path: impl AsRef<Path>) -> Result<Vec<ToolSource>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    let entries = match value {
        Value::Array(entries) => entries,
        single @ Value::Object(_) => vec![single],
        _ => {
            return Err(ProomptError::invalid_tool(format!(
                "{} must contain a JSON array of tool definitions",
                path.display()
            )));
        }
    };
    debug!("loaded {} tool definition(s) from {}", entries.len(), path.display());
    Ok(entries.into_iter().map(ToolSource::Json).collect())
}

// ── Conversions ────────────────────────────────────────────────────

impl From<ToolContext> for ToolSource {
    fn from(ctx: ToolContext) -> Self {
        ToolSource::Context(ctx)
    }
}

impl From<ToolDef> for ToolSource {
    fn from(def: ToolDef) -> Self {
        ToolSource::Definition(def)
    }
}

impl From<Value> for ToolSource {
    fn from(value: Value) -> Self {
        ToolSource::Json(value)
    }
}

impl From<Arc<dyn Tool>> for ToolSource {
    fn from(tool: Arc<dyn Tool>) -> Self {
        ToolSource::Tool(tool)
    }
}

impl From<Toolset> for ToolSource {
    fn from(set: Toolset) -> Self {
        ToolSource::Toolset(set)
    }
}

impl<T: Into<ToolSource>> From<Option<T>> for ToolSource {
    fn from(item: Option<T>) -> Self {
        item.map_or(ToolSource::Nothing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::core::FnTool;
    use serde_json::json;
    use std::io::Write;

    fn fn_tool(name: &str) -> FnTool {
        FnTool::new(
            ToolDef::new(name, format!("{name} tool"), json!({"type": "object"})),
            |_: Value| async { "ok".to_string() },
        )
    }

    fn names(ctxs: &[ToolContext]) -> Vec<&str> {
        ctxs.iter().map(ToolContext::tool_name).collect()
    }

    #[test]
    fn context_passes_through() {
        let ctx = ToolContext::new("format_report", "Format data.");
        let out = ToolSource::from(ctx).normalize();
        assert_eq!(names(&out), vec!["format_report"]);
    }

    #[test]
    fn none_normalizes_to_nothing() {
        let nothing: Option<ToolContext> = None;
        assert!(ToolSource::from(nothing).normalize().is_empty());
        let some = Some(ToolContext::new("a", ""));
        assert_eq!(ToolSource::from(some).normalize().len(), 1);
    }

    #[test]
    fn json_accepts_both_shapes() {
        let wrapped = json!({
            "type": "function",
            "function": {"name": "get_metrics", "description": "Retrieve metrics.", "parameters": {}}
        });
        let bare = json!({"name": "summarize", "description": "Summarize data."});
        assert_eq!(names(&ToolSource::from(wrapped).normalize()), vec!["get_metrics"]);
        assert_eq!(names(&ToolSource::from(bare).normalize()), vec!["summarize"]);
    }

    #[test]
    fn malformed_json_is_dropped() {
        for bad in [
            json!(42),
            json!("search"),
            json!({"description": "no name"}),
            json!({"name": "", "description": "blank name"}),
            json!({"name": "x", "parameters": "oops"}),
            json!({"function": 7}),
        ] {
            assert!(ToolSource::from(bad.clone()).normalize().is_empty(), "{bad}");
        }
    }

    #[test]
    fn toolset_expands_in_order() {
        let set = Toolset::new()
            .with(fn_tool("search_documents"))
            .with(fn_tool("get_company_metrics"))
            .with(fn_tool("summarize_data"));
        let out = ToolSource::from(set).normalize();
        assert_eq!(
            names(&out),
            vec!["search_documents", "get_company_metrics", "summarize_data"]
        );
        assert!(out.iter().all(ToolContext::is_invocable));
    }

    #[test]
    fn shared_tool_stays_invocable() {
        let tool: Arc<dyn Tool> = Arc::new(fn_tool("calc"));
        let out = ToolSource::from(tool).normalize();
        assert!(out[0].is_invocable());
    }

    #[test]
    fn load_reads_array_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "a", "description": "first"}}, 17, {{"name": "b"}}]"#
        )
        .unwrap();
        let sources = load_tool_sources(file.path()).unwrap();
        assert_eq!(sources.len(), 3);
        let out: Vec<ToolContext> = sources.into_iter().flat_map(ToolSource::normalize).collect();
        assert_eq!(names(&out), vec!["a", "b"]);
    }

    #[test]
    fn load_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\"just a string\"").unwrap();
        assert!(load_tool_sources(file.path()).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_tool_sources("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ProomptError::Io(_)));
    }
}
