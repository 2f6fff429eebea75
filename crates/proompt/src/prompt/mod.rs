//! Sections and prompts.
//!
//! A [`PromptSection`] combines a context, providers, and tools into a string
//! fragment through its formatter. A [`Prompt`] holds ordered sections and
//! renders the complete prompt.
//!
//! # Submodules
//!
//! - [`section`]: [`SectionCore`] state and the [`PromptSection`] trait.
//! - [`base`]: the [`Prompt`] trait.
//! - [`builder`]: [`PromptBuilder`], markdown assembly for formatters.
//! - [`list`]: [`ListSection`], a ready-made titled section.
//! - [`sectioned`]: [`SectionedPrompt`] and its [`PromptConfig`].

pub mod base;
pub mod builder;
pub mod list;
pub mod section;
pub mod sectioned;

pub use base::Prompt;
pub use builder::PromptBuilder;
pub use list::{ListSection, ToolDetail, format_provider_output};
pub use section::{PromptSection, SectionCore, SectionFuture};
pub use sectioned::{PromptConfig, SectionedPrompt};
