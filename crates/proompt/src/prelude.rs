//! Convenience re-exports for common `proompt` types.
//!
//! ```
//! use proompt::prelude::*;
//! ```
//!
//! Pulls in the traits needed to implement and render sections (their
//! methods are only callable with the trait in scope) and the ready-made
//! types most programs build prompts from.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ProomptError, Result, ToolDef, json_schema_for};

// ── Providers ───────────────────────────────────────────────────────
pub use crate::provider::{FnProvider, Provider, ProviderFuture, ProviderHandle, StaticProvider};

// ── Contexts ────────────────────────────────────────────────────────
pub use crate::context::{Context, TextContext, ToolContext, ToolParameter};

// ── Tools ───────────────────────────────────────────────────────────
pub use crate::tools::{FnTool, Tool, ToolFuture, ToolSource, Toolset};

// ── Sections and prompts ────────────────────────────────────────────
pub use crate::prompt::{
    ListSection, Prompt, PromptBuilder, PromptConfig, PromptSection, SectionCore,
    SectionedPrompt, ToolDetail,
};
