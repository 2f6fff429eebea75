//! A ready-made section that lists its context, provider data, and tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builder::PromptBuilder;
use super::section::{PromptSection, SectionCore, SectionFuture};
use crate::context::{Context, ToolContext};
use crate::error::Result;
use crate::provider::ProviderHandle;

/// How much of each tool a section lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolDetail {
    /// Comma-separated tool names.
    Names,
    /// One `- name: description` line per tool.
    #[default]
    Summary,
    /// `- signature` lines.
    Signatures,
    /// The full rendered [`ToolContext`] block per tool.
    Full,
}

impl ToolDetail {
    /// Format a list of tools. Empty input yields an empty string.
    pub fn format(self, tools: &[ToolContext]) -> String {
        match self {
            ToolDetail::Names => tools
                .iter()
                .map(ToolContext::tool_name)
                .collect::<Vec<_>>()
                .join(", "),
            ToolDetail::Summary => tools
                .iter()
                .map(|t| format!("- {}: {}", t.tool_name(), t.tool_description()))
                .collect::<Vec<_>>()
                .join("\n"),
            ToolDetail::Signatures => tools
                .iter()
                .map(|t| format!("- {}", t.signature()))
                .collect::<Vec<_>>()
                .join("\n"),
            ToolDetail::Full => tools
                .iter()
                .map(|t| t.render())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

/// Section that renders a titled block:
///
/// ```text
/// ## HEADING
///
/// instructions
///
/// ### Context
/// ### Available Data
/// ### Analysis Tools
///
/// closing note
/// ```
///
/// Subsections with nothing to show are omitted. The context is required:
/// rendering without one fails with
/// [`MissingContext`](crate::ProomptError::MissingContext).
#[derive(Debug, Clone)]
pub struct ListSection {
    core: SectionCore,
    heading: String,
    instructions: Option<String>,
    closing: Option<String>,
    heading_level: u8,
    tool_detail: ToolDetail,
    data_heading: String,
    tools_heading: String,
}

impl ListSection {
    pub fn new(heading: impl Into<String>, core: SectionCore) -> Self {
        Self {
            core,
            heading: heading.into(),
            instructions: None,
            closing: None,
            heading_level: 2,
            tool_detail: ToolDetail::default(),
            data_heading: "Available Data".into(),
            tools_heading: "Analysis Tools".into(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_closing(mut self, closing: impl Into<String>) -> Self {
        self.closing = Some(closing.into());
        self
    }

    /// Level of the section title; subsections are one level deeper.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.max(1);
        self
    }

    pub fn with_tool_detail(mut self, detail: ToolDetail) -> Self {
        self.tool_detail = detail;
        self
    }

    pub fn with_data_heading(mut self, heading: impl Into<String>) -> Self {
        self.data_heading = heading.into();
        self
    }

    pub fn with_tools_heading(mut self, heading: impl Into<String>) -> Self {
        self.tools_heading = heading.into();
        self
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    fn provider_blocks(&self) -> Result<String> {
        let mut blocks = Vec::with_capacity(self.core.providers().len());
        for provider in self.core.providers() {
            let value = provider.run_json()?;
            blocks.push(format_provider_output(provider, &value));
        }
        Ok(blocks.join("\n\n"))
    }

    fn assemble(&self, context: &dyn Context, data: String) -> String {
        PromptBuilder::new()
            .heading(self.heading_level, &self.heading)
            .heading_level(self.heading_level.saturating_add(1))
            .raw_opt(self.instructions.as_deref())
            .section("Context", context.render())
            .section(&self.data_heading, data)
            .section(&self.tools_heading, self.tool_detail.format(self.core.tools()))
            .raw_opt(self.closing.as_deref())
            .build()
    }

    async fn render_concurrent(&self) -> Result<String> {
        let context = self.context()?;
        let results = self.core.gather_async().await;
        let mut blocks = Vec::with_capacity(results.len());
        for (provider, result) in self.core.providers().iter().zip(results) {
            let value = match result {
                Err(e) if e.is_not_implemented() => provider.run_json()?,
                other => other?,
            };
            blocks.push(format_provider_output(provider, &value));
        }
        Ok(self.assemble(context.as_ref(), blocks.join("\n\n")))
    }
}

impl PromptSection for ListSection {
    fn core(&self) -> &SectionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SectionCore {
        &mut self.core
    }

    fn name(&self) -> String {
        format!("ListSection({})", self.heading)
    }

    fn formatter(&self) -> Result<String> {
        let context = self.context()?;
        let data = self.provider_blocks()?;
        Ok(self.assemble(context.as_ref(), data))
    }

    /// Runs every provider's async entry point concurrently. Providers
    /// without async support fall back to their synchronous `run`.
    fn render_async(&self) -> SectionFuture<'_> {
        Box::pin(self.render_concurrent())
    }
}

/// Format one provider's JSON output for a prompt.
///
/// Single-line scalars become `- **name:** value`; multi-line text and
/// structured values get a bold title line followed by their content.
pub fn format_provider_output(provider: &ProviderHandle, value: &Value) -> String {
    let name = provider.name();
    match value {
        Value::String(s) if s.contains('\n') => format!("**{name}**\n\n{s}"),
        Value::Object(map) => {
            let lines: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("- {k}: {}", scalar_text(v)))
                .collect();
            format!("**{name}**\n{}", lines.join("\n"))
        }
        Value::Array(items) => {
            let lines: Vec<String> = items
                .iter()
                .map(|v| format!("- {}", scalar_text(v)))
                .collect();
            format!("**{name}**\n{}", lines.join("\n"))
        }
        other => format!("- **{name}:** {}", scalar_text(other)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProomptError;
    use crate::context::{TextContext, ToolParameter};
    use crate::provider::{FnProvider, StaticProvider};
    use serde_json::json;

    fn tools() -> Vec<ToolContext> {
        vec![
            ToolContext::new("calculate_growth_rate", "Calculate simple growth rate.")
                .with_arg(ToolParameter::new("current", "number"))
                .with_arg(ToolParameter::new("previous", "number"))
                .with_return("object"),
            ToolContext::new("summarize", "Summarize data."),
        ]
    }

    fn metrics() -> ProviderHandle {
        ProviderHandle::new(FnProvider::new("Metrics for Q3 2024", "", || {
            Ok(json!({"quarter": "Q3 2024", "revenue": 1250000}))
        }))
    }

    #[test]
    fn tool_detail_variants() {
        let tools = tools();
        assert_eq!(
            ToolDetail::Names.format(&tools),
            "calculate_growth_rate, summarize"
        );
        assert_eq!(
            ToolDetail::Summary.format(&tools),
            "- calculate_growth_rate: Calculate simple growth rate.\n- summarize: Summarize data."
        );
        assert!(ToolDetail::Signatures.format(&tools).starts_with("- calculate_growth_rate("));
        assert!(ToolDetail::Full.format(&tools).contains("Tool: summarize"));
        assert_eq!(ToolDetail::Summary.format(&[]), "");
    }

    #[test]
    fn tool_detail_deserializes_snake_case() {
        let detail: ToolDetail = serde_json::from_value(json!("signatures")).unwrap();
        assert_eq!(detail, ToolDetail::Signatures);
    }

    #[test]
    fn full_render() {
        let section = ListSection::new(
            "QUARTERLY METRICS ANALYSIS",
            SectionCore::new()
                .with_context(TextContext::new("Company: StartupCorp"))
                .with_providers([metrics()])
                .with_tools(tools()),
        )
        .with_instructions("Analyze the quarterly business performance.")
        .with_closing("Provide insights and recommendations.");

        assert_eq!(
            section.render().unwrap(),
            "## QUARTERLY METRICS ANALYSIS\n\n\
             Analyze the quarterly business performance.\n\n\
             ### Context\n\nCompany: StartupCorp\n\n\
             ### Available Data\n\n**Metrics for Q3 2024**\n- quarter: Q3 2024\n- revenue: 1250000\n\n\
             ### Analysis Tools\n\n\
             - calculate_growth_rate: Calculate simple growth rate.\n- summarize: Summarize data.\n\n\
             Provide insights and recommendations."
        );
    }

    #[test]
    fn empty_subsections_are_omitted() {
        let section = ListSection::new(
            "NOTES",
            SectionCore::new().with_context(TextContext::new("ctx")),
        )
        .with_heading_level(3);
        assert_eq!(section.render().unwrap(), "### NOTES\n\n#### Context\n\nctx");
    }

    #[test]
    fn missing_context_names_the_section() {
        let section = ListSection::new("SUMMARY", SectionCore::new());
        let err = section.render().unwrap_err();
        assert!(matches!(err, ProomptError::MissingContext { ref section } if section == "ListSection(SUMMARY)"));
    }

    #[test]
    fn provider_failure_propagates() {
        let failing = FnProvider::<String>::new("logs", "", || {
            Err(ProomptError::provider("logs", "no data"))
        });
        let section = ListSection::new(
            "LOGS",
            SectionCore::new()
                .with_context(TextContext::new("ctx"))
                .with_providers([ProviderHandle::new(failing)]),
        );
        assert_eq!(
            section.render().unwrap_err().to_string(),
            "provider 'logs' failed: no data"
        );
    }

    #[test]
    fn output_formats() {
        let p = ProviderHandle::new(StaticProvider::new("notes", ""));
        assert_eq!(format_provider_output(&p, &json!("short")), "- **notes:** short");
        assert_eq!(format_provider_output(&p, &json!(3)), "- **notes:** 3");
        assert_eq!(
            format_provider_output(&p, &json!("line 1\nline 2")),
            "**notes**\n\nline 1\nline 2"
        );
        assert_eq!(
            format_provider_output(&p, &json!(["a", 1])),
            "**notes**\n- a\n- 1"
        );
    }

    #[tokio::test]
    async fn render_async_matches_sync_render() {
        let section = ListSection::new(
            "DATA",
            SectionCore::new()
                .with_context(TextContext::new("ctx"))
                .with_providers([
                    metrics(),
                    ProviderHandle::new(StaticProvider::new("notes", "Keep it short.")),
                ]),
        );
        assert_eq!(section.render_async().await.unwrap(), section.render().unwrap());
    }
}
