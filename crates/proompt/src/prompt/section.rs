//! Prompt sections: a context, providers, and tools behind a formatter.
//!
//! A section's state lives in a [`SectionCore`]; the [`PromptSection`] trait
//! supplies the behavior every section shares (context access, filtered
//! insertion of providers and tools, string conversion) and leaves only
//! [`PromptSection::formatter`] to the implementor.
//!
//! Invalid items are filtered on insertion rather than rejected: a `None`
//! provider, a `None` tool, or a malformed tool definition is skipped and the
//! remaining items keep their order.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use proompt::context::TextContext;
//! use proompt::prompt::{PromptSection, SectionCore};
//! use proompt::provider::{ProviderHandle, StaticProvider};
//! use proompt::Result;
//!
//! struct Briefing { core: SectionCore }
//!
//! impl PromptSection for Briefing {
//!     fn core(&self) -> &SectionCore { &self.core }
//!     fn core_mut(&mut self) -> &mut SectionCore { &mut self.core }
//!
//!     fn formatter(&self) -> Result<String> {
//!         let notes = self.core.run_providers()?;
//!         Ok(format!("{}\n\n{}", self.context()?, notes[0].as_str().unwrap_or_default()))
//!     }
//! }
//!
//! let mut briefing = Briefing { core: SectionCore::new() };
//! assert!(briefing.render().is_err()); // no context yet
//!
//! briefing.set_context(Arc::new(TextContext::new("Company: StartupCorp"))).unwrap();
//! let notes = ProviderHandle::new(StaticProvider::new("notes", "Keep it short."));
//! briefing.add_providers([Some(notes), None]);
//! assert_eq!(briefing.providers().len(), 1);
//! assert_eq!(briefing.render().unwrap(), "Company: StartupCorp\n\nKeep it short.");
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, trace};

use crate::context::{Context, ToolContext};
use crate::error::{ProomptError, Result};
use crate::provider::{Provider, ProviderHandle};
use crate::tools::ToolSource;

// ── SectionCore ────────────────────────────────────────────────────

/// State shared by every prompt section.
#[derive(Debug, Clone, Default)]
pub struct SectionCore {
    context: Option<Arc<dyn Context>>,
    providers: Vec<ProviderHandle>,
    tools: Vec<ToolContext>,
}

impl SectionCore {
    /// A core with no context, providers, or tools.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the context (builder pattern).
    pub fn with_context(mut self, context: impl Context + 'static) -> Self {
        self.context = Some(Arc::new(context));
        self
    }

    /// Set a context that is shared with other sections (builder pattern).
    pub fn with_shared_context(mut self, context: Arc<dyn Context>) -> Self {
        self.context = Some(context);
        self
    }

    /// Add tools (builder pattern). See [`add_tools`](Self::add_tools).
    pub fn with_tools<I, T>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ToolSource>,
    {
        self.add_tools(tools);
        self
    }

    /// Add providers (builder pattern). See [`add_providers`](Self::add_providers).
    pub fn with_providers<I, T>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<ProviderHandle>>,
    {
        self.add_providers(providers);
        self
    }

    /// The context, if one is set.
    pub fn context(&self) -> Option<&Arc<dyn Context>> {
        self.context.as_ref()
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Replace the context. A context that renders to blank text is rejected
    /// and the previous context is kept.
    pub fn set_context(&mut self, context: Arc<dyn Context>, section: &str) -> Result<()> {
        if context.render().trim().is_empty() {
            return Err(ProomptError::InvalidContext {
                section: section.to_string(),
                reason: "context renders to blank text".into(),
            });
        }
        self.context = Some(context);
        Ok(())
    }

    /// Remove and return the context.
    pub fn clear_context(&mut self) -> Option<Arc<dyn Context>> {
        self.context.take()
    }

    /// Append providers, skipping `None` entries.
    pub fn add_providers<I, T>(&mut self, providers: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<ProviderHandle>>,
    {
        let before = self.providers.len();
        let mut skipped = 0usize;
        for item in providers {
            match item.into() {
                Some(handle) => self.providers.push(handle),
                None => skipped += 1,
            }
        }
        debug!(
            "added {} provider(s), skipped {skipped}",
            self.providers.len() - before
        );
    }

    /// Append tools, normalizing each source to zero or more [`ToolContext`]s.
    pub fn add_tools<I, T>(&mut self, tools: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<ToolSource>,
    {
        let before = self.tools.len();
        for source in tools {
            self.tools.extend(source.into().normalize());
        }
        debug!("added {} tool(s)", self.tools.len() - before);
    }

    pub fn providers(&self) -> &[ProviderHandle] {
        &self.providers
    }

    pub fn tools(&self) -> &[ToolContext] {
        &self.tools
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolContext::tool_name).collect()
    }

    /// Providers of concrete type `P`, in insertion order.
    pub fn providers_of<P: Provider>(&self) -> impl Iterator<Item = &P> {
        self.providers.iter().filter_map(ProviderHandle::downcast_ref::<P>)
    }

    /// Run every provider synchronously; the first failure aborts.
    pub fn run_providers(&self) -> Result<Vec<Value>> {
        self.providers.iter().map(ProviderHandle::run_json).collect()
    }

    /// Run every provider's async entry point concurrently.
    ///
    /// Results are returned in provider order; a provider without async
    /// support yields [`ProomptError::NotImplemented`] in its slot.
    pub async fn gather_async(&self) -> Vec<Result<Value>> {
        join_all(self.providers.iter().map(|p| p.arun_json())).await
    }
}

// ── PromptSection trait ────────────────────────────────────────────

/// Boxed future returned by [`PromptSection::render_async`].
pub type SectionFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// A section of a prompt.
///
/// Implementors own a [`SectionCore`] and write [`formatter`](Self::formatter);
/// everything else has a default.
pub trait PromptSection: Send + Sync {
    fn core(&self) -> &SectionCore;

    fn core_mut(&mut self) -> &mut SectionCore;

    /// Produce the section text.
    fn formatter(&self) -> Result<String>;

    /// Render the section. Defaults to [`formatter`](Self::formatter).
    fn render(&self) -> Result<String> {
        let text = self.formatter()?;
        trace!("rendered section {} ({} bytes)", self.name(), text.len());
        Ok(text)
    }

    /// Render through the providers' async entry points.
    /// Defaults to the synchronous [`render`](Self::render).
    fn render_async(&self) -> SectionFuture<'_> {
        Box::pin(async move { self.render() })
    }

    /// Name used in error messages. Defaults to the implementing type's name.
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// The context, or [`ProomptError::MissingContext`] naming this section.
    fn context(&self) -> Result<&Arc<dyn Context>> {
        self.core()
            .context()
            .ok_or_else(|| ProomptError::MissingContext {
                section: self.name(),
            })
    }

    fn set_context(&mut self, context: Arc<dyn Context>) -> Result<()> {
        let name = self.name();
        self.core_mut().set_context(context, &name)
    }

    fn providers(&self) -> &[ProviderHandle] {
        self.core().providers()
    }

    fn tools(&self) -> &[ToolContext] {
        self.core().tools()
    }

    fn add_providers<I, T>(&mut self, providers: I)
    where
        Self: Sized,
        I: IntoIterator<Item = T>,
        T: Into<Option<ProviderHandle>>,
    {
        self.core_mut().add_providers(providers);
    }

    fn add_tools<I, T>(&mut self, tools: I)
    where
        Self: Sized,
        I: IntoIterator<Item = T>,
        T: Into<ToolSource>,
    {
        self.core_mut().add_tools(tools);
    }
}

/// String form of a section. A failed render writes a `<render error: ..>`
/// marker in place of the text; call [`PromptSection::render`] for the
/// typed error.
impl fmt::Display for dyn PromptSection + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(e) => {
                debug!("section {} failed to render: {e}", self.name());
                write!(f, "<render error: {e}>")
            }
        }
    }
}

impl fmt::Debug for dyn PromptSection + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptSection")
            .field("name", &self.name())
            .field("core", self.core())
            .finish()
    }
}

/// `a::b::Thing<c::D>` → `Thing`.
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
