//! A ready-made prompt: header, ruled sections, and an optional footer.

use std::path::Path;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::Prompt;
use super::list::ToolDetail;
use super::section::PromptSection;
use crate::error::Result;

/// Layout settings for a [`SectionedPrompt`] and the sections built for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Width of the `=` rule placed before each section and the footer.
    /// Zero disables the rule.
    pub separator_width: usize,
    pub include_header: bool,
    pub include_footer: bool,
    /// Title level used by sections built from this config.
    pub heading_level: u8,
    /// How sections built from this config list their tools.
    pub tool_detail: ToolDetail,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            separator_width: 40,
            include_header: true,
            include_footer: true,
            heading_level: 2,
            tool_detail: ToolDetail::default(),
        }
    }
}

impl PromptConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        debug!("loaded prompt config from {}", path.display());
        Ok(config)
    }

    pub fn with_separator_width(mut self, width: usize) -> Self {
        self.separator_width = width;
        self
    }

    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    pub fn with_footer(mut self, include: bool) -> Self {
        self.include_footer = include;
        self
    }

    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.max(1);
        self
    }

    pub fn with_tool_detail(mut self, detail: ToolDetail) -> Self {
        self.tool_detail = detail;
        self
    }

    fn rule(&self) -> Option<String> {
        (self.separator_width > 0).then(|| "=".repeat(self.separator_width))
    }
}

#[derive(Debug, Clone)]
enum Footer {
    Text(String),
    Summary,
}

/// Prompt that renders a header, each section preceded by a rule, and a
/// footer, all separated by blank lines.
///
/// ```
/// use proompt::context::TextContext;
/// use proompt::prompt::{ListSection, Prompt, PromptConfig, SectionCore, SectionedPrompt};
///
/// let prompt = SectionedPrompt::new()
///     .with_header("# QUARTERLY REVIEW: StartupCorp")
///     .with_section(ListSection::new(
///         "NOTES",
///         SectionCore::new().with_context(TextContext::new("Q3 2024")),
///     ))
///     .with_footer("Be concise.")
///     .with_config(PromptConfig::default().with_separator_width(3));
///
/// assert_eq!(
///     prompt.render().unwrap(),
///     "# QUARTERLY REVIEW: StartupCorp\n\n===\n\n## NOTES\n\n### Context\n\nQ3 2024\n\n===\n\nBe concise."
/// );
/// ```
#[derive(Debug, Default)]
pub struct SectionedPrompt {
    header: Option<String>,
    footer: Option<Footer>,
    sections: Vec<Box<dyn PromptSection>>,
    config: PromptConfig,
}

impl SectionedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(Footer::Text(footer.into()));
        self
    }

    /// Use a generated `## SUMMARY` footer counting providers, tools, and
    /// sections at render time.
    pub fn with_summary_footer(mut self) -> Self {
        self.footer = Some(Footer::Summary);
        self
    }

    pub fn with_config(mut self, config: PromptConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_section(mut self, section: impl PromptSection + 'static) -> Self {
        self.sections.push(Box::new(section));
        self
    }

    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    /// Summary footer; `sections` is the number of sections that rendered
    /// non-empty text.
    fn summary(&self, sections: usize) -> String {
        format!(
            "## SUMMARY\n\nThis prompt combines:\n- {}\n- {}\n- {}",
            counted(self.provider_count(), "Data Provider"),
            counted(self.tool_count(), "Analysis Tool"),
            counted(sections, "Prompt Section"),
        )
    }

    /// Render every section through its async path, concurrently.
    pub async fn render_async(&self) -> Result<String> {
        let texts = join_all(self.sections.iter().map(|s| s.render_async()))
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        Ok(self.assemble(texts))
    }

    fn assemble(&self, texts: Vec<String>) -> String {
        let rule = self.config.rule();
        let mut blocks: Vec<String> = Vec::new();

        if self.config.include_header
            && let Some(header) = &self.header
        {
            blocks.push(header.clone());
        }

        let texts: Vec<String> = texts.into_iter().filter(|t| !t.is_empty()).collect();
        let rendered = texts.len();
        for text in texts {
            blocks.extend(rule.clone());
            blocks.push(text);
        }

        if self.config.include_footer
            && let Some(footer) = self.footer_text(rendered)
        {
            blocks.extend(rule);
            blocks.push(footer);
        }

        let prompt = blocks.join("\n\n");
        debug!(
            "rendered prompt: {rendered} of {} section(s), {} chars",
            self.sections.len(),
            prompt.chars().count()
        );
        prompt
    }

    fn footer_text(&self, rendered: usize) -> Option<String> {
        match self.footer.as_ref()? {
            Footer::Text(text) => Some(text.clone()),
            Footer::Summary => Some(self.summary(rendered)),
        }
    }
}

impl Prompt for SectionedPrompt {
    fn sections(&self) -> &[Box<dyn PromptSection>] {
        &self.sections
    }

    fn sections_mut(&mut self) -> &mut Vec<Box<dyn PromptSection>> {
        &mut self.sections
    }

    fn render(&self) -> Result<String> {
        let texts = self.render_sections()?;
        Ok(self.assemble(texts))
    }
}

fn counted(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}
