//! Renderable contexts.
//!
//! A [`Context`] is anything that renders itself to a descriptive string:
//! the business situation a section is written for, or the description of a
//! tool the model may call. The string form of a context always equals its
//! [`Context::render`] output.
//!
//! - [`TextContext`]: fixed text assembled from lines and `Label: value` fields.
//! - [`ToolContext`]: a tool's name, description, arguments, and return type.

pub mod tool;

use std::fmt;

pub use tool::{ToolContext, ToolParameter};

/// Something that renders to a descriptive string.
pub trait Context: Send + Sync {
    fn render(&self) -> String;
}

impl fmt::Display for dyn Context + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for dyn Context + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Context").field(&self.render()).finish()
    }
}

/// A context made of fixed text.
///
/// ```
/// use proompt::context::{Context, TextContext};
///
/// let ctx = TextContext::new("Review Context:")
///     .with_field("Company", "StartupCorp")
///     .with_field("Period", "Q3 2024");
///
/// assert_eq!(ctx.render(), "Review Context:\nCompany: StartupCorp\nPeriod: Q3 2024");
/// assert_eq!(ctx.to_string(), ctx.render());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextContext {
    lines: Vec<String>,
}

impl TextContext {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
        }
    }

    /// Append a line.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Append a `Label: value` line.
    pub fn with_field(self, label: &str, value: impl fmt::Display) -> Self {
        self.with_line(format!("{label}: {value}"))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }
}

impl Context for TextContext {
    fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for TextContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
