//! Executable tools and ordered tool sets.
//!
//! The [`Tool`] trait pairs a function-calling definition with an async
//! `execute` method. Tools are collected into a [`Toolset`], the unit a
//! prompt section can absorb wholesale: every tool in the set becomes a
//! [`ToolContext`](crate::context::ToolContext) in registration order.

use crate::ToolDef;
use crate::error::{ProomptError, Result};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Maximum size (in bytes) for tool output before truncation.
pub const DEFAULT_MAX_RESULT_BYTES: usize = 30_000;

/// Boxed future returned by [`Tool::execute`].
pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = String> + Send + 'a>>;

// ── Tool trait ─────────────────────────────────────────────────────

/// A callable tool described by a function-calling definition.
///
/// `execute` receives the raw JSON arguments string and returns the result
/// text. Uses a boxed future so that the trait is dyn-compatible.
pub trait Tool: Send + Sync {
    /// Name, description, and JSON Schema parameters.
    fn definition(&self) -> ToolDef;

    /// Execute the tool with the given raw JSON arguments string.
    fn execute(&self, arguments: &str) -> ToolFuture<'_>;

    /// The tool's name (delegates to the definition).
    fn name(&self) -> String {
        self.definition().function.name
    }
}

impl fmt::Debug for dyn Tool + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool").field("name", &self.name()).finish()
    }
}

// ── Toolset ────────────────────────────────────────────────────────

/// An ordered collection of tools.
///
/// Registration order is preserved; registering a tool whose name is already
/// present replaces the earlier tool in place.
///
/// ```ignore
/// let toolset = Toolset::new()
///     .with(search_tool())
///     .with(metrics_tool())
///     .with_arg_validation(true);
///
/// section.add_tools([toolset]);
/// ```
#[derive(Clone)]
pub struct Toolset {
    tools: Vec<Arc<dyn Tool>>,
    max_result_bytes: usize,
    validate_args: bool,
}

impl fmt::Debug for Toolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolset")
            .field("tools", &self.names())
            .field("max_result_bytes", &self.max_result_bytes)
            .finish()
    }
}

impl Toolset {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            validate_args: false,
        }
    }

    /// Set the maximum result size in bytes before truncation.
    pub fn with_max_result_bytes(mut self, max: usize) -> Self {
        self.max_result_bytes = max;
        self
    }

    /// Validate arguments against each tool's JSON Schema before executing.
    pub fn with_arg_validation(mut self, enabled: bool) -> Self {
        self.validate_args = enabled;
        self
    }

    /// Register a tool, replacing any existing tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_shared(Arc::new(tool));
    }

    /// Register an already shared tool.
    pub fn register_shared(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        match self.tools.iter().position(|t| t.name() == name) {
            Some(idx) => {
                debug!("replacing tool '{name}' in toolset");
                self.tools[idx] = tool;
            }
            None => self.tools.push(tool),
        }
    }

    /// Register a tool (builder pattern).
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    /// Conditionally register a tool (builder pattern).
    pub fn with_if(self, condition: bool, tool: impl Tool + 'static) -> Self {
        if condition { self.with(tool) } else { self }
    }

    /// All tool definitions, in registration order.
    pub fn definitions(&self) -> Vec<ToolDef> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// All tool names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Iterate over the tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name, with optional validation and truncation.
    pub async fn execute(&self, name: &str, arguments: &str) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| ProomptError::invalid_tool(format!("unknown tool '{name}'")))?;

        if self.validate_args {
            validate_tool_arguments(&tool.definition(), arguments)?;
        }

        log_tool_call(name, arguments);
        let start = std::time::Instant::now();
        let result = tool.execute(arguments).await;
        debug!(
            "Tool {name} completed in {:.0}ms ({} bytes)",
            start.elapsed().as_secs_f64() * 1000.0,
            result.len()
        );

        Ok(truncate_result(result, self.max_result_bytes))
    }
}

impl Default for Toolset {
    fn default() -> Self {
        Self::new()
    }
}

// ── FnTool ────────────────────────────────────────────────────────

/// Type-erased async handler for [`FnTool`].
type ErasedToolHandler =
    Box<dyn Fn(String) -> Pin<Box<dyn Future<Output = String> + Send>> + Send + Sync>;

/// A closure-based tool that auto-parses its arguments.
///
/// # Example
///
/// ```
/// use proompt::tools::FnTool;
/// use proompt::{ToolDef, json_schema_for};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// /// Calculate simple growth rate.
/// #[derive(Deserialize, JsonSchema)]
/// struct GrowthArgs {
///     current: f64,
///     previous: f64,
/// }
///
/// let tool = FnTool::new(
///     ToolDef::new(
///         "calculate_growth_rate",
///         "Calculate simple growth rate.",
///         json_schema_for::<GrowthArgs>(),
///     ),
///     |args: GrowthArgs| async move {
///         format!("{:.1}%", (args.current - args.previous) / args.previous * 100.0)
///     },
/// );
/// ```
pub struct FnTool {
    def: ToolDef,
    handler: ErasedToolHandler,
}

impl FnTool {
    /// Create a closure-based tool. Argument parse errors are returned to the
    /// caller as `"Error: ..."` text.
    pub fn new<A, F, Fut>(def: ToolDef, handler: F) -> Self
    where
        A: serde::de::DeserializeOwned + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = String> + Send + 'static,
    {
        let erased = move |raw: String| -> Pin<Box<dyn Future<Output = String> + Send>> {
            match parse_tool_args::<A>(&raw) {
                Ok(args) => Box::pin(handler(args)),
                Err(e) => Box::pin(async move { e }),
            }
        };

        Self {
            def,
            handler: Box::new(erased),
        }
    }
}

impl Tool for FnTool {
    fn definition(&self) -> ToolDef {
        self.def.clone()
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        (self.handler)(arguments.to_string())
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.def.function.name)
            .finish()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Validate JSON arguments against a definition's parameter schema.
///
/// A schema that is itself invalid disables validation rather than failing.
pub fn validate_tool_arguments(def: &ToolDef, arguments: &str) -> Result<()> {
    let tool = def.function.name.clone();
    let args_value: serde_json::Value =
        serde_json::from_str(arguments).map_err(|e| ProomptError::ToolArguments {
            tool: tool.clone(),
            errors: vec![format!("  - invalid JSON: {e}")],
        })?;

    let validator = match jsonschema::validator_for(&def.function.parameters) {
        Ok(v) => v,
        Err(e) => {
            debug!("skipping argument validation for '{tool}': invalid schema: {e}");
            return Ok(());
        }
    };

    let errors: Vec<String> = validator
        .iter_errors(&args_value)
        .map(|e| format!("  - {}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ProomptError::ToolArguments { tool, errors })
    }
}

/// Log a tool call at INFO level with a truncated preview of arguments.
pub fn log_tool_call(name: &str, arguments: &str) {
    let args_preview: String = arguments.chars().take(120).collect();
    info!(
        "[tool] {}({args_preview}{})",
        name,
        if arguments.chars().count() > 120 { "..." } else { "" }
    );
    trace!("[tool] {name} arguments: {arguments}");
}

/// Truncate a string to at most `max` bytes on a char boundary, appending a
/// notice if trimmed.
pub fn truncate_result(mut s: String, max: usize) -> String {
    if s.len() <= max {
        return s;
    }
    let total = s.len();
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
    s.push_str(&format!("...\n[truncated: {total} bytes total]"));
    s
}

/// Parse raw JSON arguments into a typed struct, formatting failures as
/// `"Error: ..."` text a model can act on.
pub fn parse_tool_args<T: serde::de::DeserializeOwned>(arguments: &str) -> Result<T, String> {
    serde_json::from_str(arguments).map_err(|e| {
        format!(
            "Error: invalid tool arguments: {e}. \
             Please provide valid JSON matching the tool's parameter schema."
        )
    })
}

// ── Tests ──────────────────────────────────────────────────────────
