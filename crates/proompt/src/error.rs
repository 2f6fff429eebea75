//! Error type shared by providers, contexts, tools, and sections.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = ProomptError> = std::result::Result<T, E>;

/// Everything that can go wrong while assembling a prompt.
#[derive(Debug, Error)]
pub enum ProomptError {
    /// An optional capability was requested but the implementor never
    /// provided it (e.g. the async entry point of a sync-only provider).
    #[error("{operation} is not implemented for provider '{provider}'")]
    NotImplemented {
        provider: String,
        operation: &'static str,
    },

    /// A section tried to read its context before one was set.
    #[error("context is not set for {section}")]
    MissingContext { section: String },

    /// A context was rejected by [`SectionCore::set_context`](crate::prompt::SectionCore::set_context).
    #[error("invalid context for {section}: {reason}")]
    InvalidContext { section: String, reason: String },

    /// A provider's `run` failed.
    #[error("provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    /// A tool definition could not be turned into a [`ToolContext`](crate::context::ToolContext).
    #[error("invalid tool: {reason}")]
    InvalidTool { reason: String },

    /// Tool arguments did not match the tool's JSON Schema.
    #[error("argument validation failed for tool '{tool}':\n{}", .errors.join("\n"))]
    ToolArguments { tool: String, errors: Vec<String> },

    /// A description-only tool context was asked to execute.
    #[error("tool '{tool}' has no executable handler")]
    NotInvocable { tool: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProomptError {
    /// Shorthand for a provider failure.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Shorthand for an invalid tool definition.
    pub fn invalid_tool(reason: impl Into<String>) -> Self {
        Self::InvalidTool {
            reason: reason.into(),
        }
    }

    /// Whether this error signals an unimplemented optional capability.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_context_names_the_section() {
        let err = ProomptError::MissingContext {
            section: "MetricsSection".into(),
        };
        assert_eq!(err.to_string(), "context is not set for MetricsSection");
    }

    #[test]
    fn tool_argument_errors_are_listed() {
        let err = ProomptError::ToolArguments {
            tool: "add".into(),
            errors: vec!["  - /x: not an integer".into(), "  - /y: missing".into()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("argument validation failed for tool 'add':"));
        assert!(msg.contains("/x: not an integer\n  - /y: missing"));
    }

    #[test]
    fn not_implemented_predicate() {
        let err = ProomptError::NotImplemented {
            provider: "metrics".into(),
            operation: "arun",
        };
        assert!(err.is_not_implemented());
        assert!(!ProomptError::provider("metrics", "boom").is_not_implemented());
    }
}
