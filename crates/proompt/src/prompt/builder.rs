//! Markdown block builder used by section formatters.
//!
//! [`PromptBuilder`] collects blocks (headed sections, raw text, bullet lists,
//! horizontal rules) and joins them with blank lines. Empty blocks are
//! dropped, so conditional content never leaves stray headings behind.

use crate::text::bullet_list;

/// Builder for markdown prompt fragments.
///
/// # Example
///
/// ```
/// use proompt::prompt::PromptBuilder;
///
/// let text = PromptBuilder::titled("QUARTERLY METRICS ANALYSIS")
///     .raw("Analyze the quarterly business performance.")
///     .section("Available Data", "- Revenue: $1,250,000")
///     .list("Analysis Tools", ["calculate_growth_rate"])
///     .section_opt("Notes", None::<String>)
///     .build();
///
/// assert_eq!(
///     text,
///     "## QUARTERLY METRICS ANALYSIS\n\n\
///      Analyze the quarterly business performance.\n\n\
///      ### Available Data\n\n- Revenue: $1,250,000\n\n\
///      ### Analysis Tools\n\n- calculate_growth_rate"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    blocks: Vec<String>,
    heading_level: u8,
    separator: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    /// An empty builder. Sections get `##` headings by default.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            heading_level: 2,
            separator: "\n\n".to_string(),
        }
    }

    /// Start with a `## title` line; subsequent sections are one level deeper.
    pub fn titled(title: &str) -> Self {
        Self::new().heading(2, title).heading_level(3)
    }

    /// Start with a preamble block.
    pub fn with_preamble(preamble: impl Into<String>) -> Self {
        Self::new().raw(preamble)
    }

    /// Set the heading level for subsequent `section()` calls.
    pub fn heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.max(1);
        self
    }

    /// Join blocks with this string instead of a blank line.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Append a bare heading line.
    pub fn heading(mut self, level: u8, text: &str) -> Self {
        if !text.is_empty() {
            let hashes = "#".repeat(level.max(1) as usize);
            self.blocks.push(format!("{hashes} {text}"));
        }
        self
    }

    /// Append a headed section. Skipped if `content` is empty.
    pub fn section(self, heading: &str, content: impl Into<String>) -> Self {
        let level = self.heading_level;
        self.section_at(level, heading, content)
    }

    /// Append a headed section at an explicit level. Skipped if `content` is empty.
    pub fn section_at(mut self, level: u8, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            let hashes = "#".repeat(level.max(1) as usize);
            self.blocks.push(format!("{hashes} {heading}\n\n{content}"));
        }
        self
    }

    /// Append a section only when `condition` holds; `content_fn` is lazy.
    pub fn section_if(
        self,
        condition: bool,
        heading: &str,
        content_fn: impl FnOnce() -> String,
    ) -> Self {
        if condition {
            self.section(heading, content_fn())
        } else {
            self
        }
    }

    /// Append a section only if the content is `Some`.
    pub fn section_opt(self, heading: &str, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.section(heading, c),
            None => self,
        }
    }

    /// Append a headed bullet list. Skipped when there are no items.
    pub fn list<I, S>(self, heading: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.section(heading, bullet_list(items))
    }

    /// Append raw text. Skipped if empty.
    pub fn raw(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.blocks.push(content);
        }
        self
    }

    /// Append raw text only when `condition` holds.
    pub fn raw_if(self, condition: bool, content_fn: impl FnOnce() -> String) -> Self {
        if condition {
            self.raw(content_fn())
        } else {
            self
        }
    }

    /// Append raw text only if the content is `Some`.
    pub fn raw_opt(self, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.raw(c),
            None => self,
        }
    }

    /// Append a horizontal rule of `width` `=` characters.
    pub fn rule(mut self, width: usize) -> Self {
        if width > 0 {
            self.blocks.push("=".repeat(width));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn build(self) -> String {
        self.blocks.join(&self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_builds_empty_string() {
        assert_eq!(PromptBuilder::new().build(), "");
        assert!(PromptBuilder::new().is_empty());
    }

    #[test]
    fn preamble_then_sections() {
        let text = PromptBuilder::with_preamble("You are an analyst.")
            .section("Context", "Q3 2024")
            .build();
        assert_eq!(text, "You are an analyst.\n\n## Context\n\nQ3 2024");
    }

    #[test]
    fn empty_content_leaves_no_heading() {
        let text = PromptBuilder::new()
            .section("Empty", "")
            .list("No Items", Vec::<String>::new())
            .section("Present", "x")
            .build();
        assert_eq!(text, "## Present\n\nx");
    }

    #[test]
    fn conditional_blocks() {
        let text = PromptBuilder::new()
            .section_if(false, "Hidden", || unreachable!())
            .section_if(true, "Shown", || "yes".into())
            .raw_if(false, || unreachable!())
            .raw_opt(Some("tail"))
            .raw_opt(None::<String>)
            .build();
        assert_eq!(text, "## Shown\n\nyes\n\ntail");
    }

    #[test]
    fn section_at_overrides_level() {
        let text = PromptBuilder::new()
            .heading_level(3)
            .section("Three", "a")
            .section_at(4, "Four", "b")
            .build();
        assert_eq!(text, "### Three\n\na\n\n#### Four\n\nb");
    }

    #[test]
    fn rule_and_custom_separator() {
        let text = PromptBuilder::new()
            .separator("\n")
            .raw("header")
            .rule(5)
            .rule(0)
            .raw("body")
            .build();
        assert_eq!(text, "header\n=====\nbody");
    }

    #[test]
    fn heading_level_is_at_least_one() {
        let text = PromptBuilder::new().heading_level(0).section("H", "c").build();
        assert_eq!(text, "# H\n\nc");
    }
}
