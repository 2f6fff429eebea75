//! Data providers: the units of work that feed a prompt section.
//!
//! A [`Provider`] produces a typed value for a section to format. Every
//! provider has a synchronous [`Provider::run`]; the asynchronous
//! [`Provider::arun`] is optional and reports
//! [`ProomptError::NotImplemented`] unless an implementor overrides it.
//!
//! Sections store providers as [`ProviderHandle`]s, a shared, type-erased
//! wrapper. A section formatter can either work with the JSON form of the
//! output ([`ProviderHandle::run_json`]) or recover the concrete provider with
//! [`ProviderHandle::downcast_ref`] and call its typed `run`.
//!
//! # Example
//!
//! ```
//! use proompt::provider::{Provider, ProviderHandle};
//! use proompt::Result;
//!
//! struct Headcount { team: String }
//!
//! impl Provider for Headcount {
//!     type Output = u32;
//!
//!     fn name(&self) -> String { format!("Headcount for {}", self.team) }
//!     fn provider_ctx(&self) -> String { "Current number of engineers.".into() }
//!     fn run(&self) -> Result<u32> { Ok(12) }
//! }
//!
//! let provider = Headcount { team: "platform".into() };
//! assert_eq!(provider.call().unwrap(), provider.run().unwrap());
//!
//! let handle = ProviderHandle::new(provider);
//! assert_eq!(handle.run_json().unwrap(), serde_json::json!(12));
//! assert_eq!(handle.downcast_ref::<Headcount>().unwrap().team, "platform");
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{ProomptError, Result};

/// Boxed future returned by [`Provider::arun`].
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

// ── Provider trait ─────────────────────────────────────────────────

/// A unit of work that supplies data to a prompt.
///
/// Implementors provide a name, a one-line description of what they supply,
/// and a synchronous `run`. The output must be serializable so sections that
/// only hold a [`ProviderHandle`] can still consume it as JSON.
pub trait Provider: Send + Sync + 'static {
    /// The value produced by `run`.
    type Output: Serialize + Send + 'static;

    /// Human-readable provider name.
    fn name(&self) -> String;

    /// Short description of the data this provider supplies.
    fn provider_ctx(&self) -> String;

    /// Produce the provider's data.
    fn run(&self) -> Result<Self::Output>;

    /// Asynchronous entry point. Unsupported unless overridden.
    fn arun(&self) -> ProviderFuture<'_, Self::Output> {
        let provider = self.name();
        Box::pin(async move {
            Err(ProomptError::NotImplemented {
                provider,
                operation: "arun",
            })
        })
    }

    /// Invoke the provider. Always identical to [`run`](Self::run).
    fn call(&self) -> Result<Self::Output> {
        self.run()
    }
}

// ── Type erasure ───────────────────────────────────────────────────

type JsonFuture<'a> = Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;

trait ErasedProvider: Send + Sync {
    fn erased_name(&self) -> String;
    fn erased_ctx(&self) -> String;
    fn run_value(&self) -> Result<Value>;
    fn arun_value(&self) -> JsonFuture<'_>;
    fn as_any(&self) -> &dyn Any;
}

impl<P: Provider> ErasedProvider for P {
    fn erased_name(&self) -> String {
        Provider::name(self)
    }

    fn erased_ctx(&self) -> String {
        Provider::provider_ctx(self)
    }

    fn run_value(&self) -> Result<Value> {
        let output = Provider::run(self)?;
        Ok(serde_json::to_value(output)?)
    }

    fn arun_value(&self) -> JsonFuture<'_> {
        Box::pin(async move {
            let output = Provider::arun(self).await?;
            Ok(serde_json::to_value(output)?)
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A shared, type-erased provider as stored by prompt sections.
///
/// Cloning a handle is cheap: every clone points at the same provider.
#[derive(Clone)]
pub struct ProviderHandle {
    inner: Arc<dyn ErasedProvider>,
}

impl ProviderHandle {
    /// Wrap a provider.
    pub fn new<P: Provider>(provider: P) -> Self {
        Self {
            inner: Arc::new(provider),
        }
    }

    /// Wrap a provider that is already shared elsewhere.
    pub fn from_arc<P: Provider>(provider: Arc<P>) -> Self {
        Self { inner: provider }
    }

    pub fn name(&self) -> String {
        self.inner.erased_name()
    }

    pub fn provider_ctx(&self) -> String {
        self.inner.erased_ctx()
    }

    /// Run the provider and serialize its output to JSON.
    pub fn run_json(&self) -> Result<Value> {
        let value = self.inner.run_value()?;
        trace!("provider '{}' produced {}", self.name(), value);
        Ok(value)
    }

    /// Same as [`run_json`](Self::run_json); mirrors [`Provider::call`].
    pub fn call_json(&self) -> Result<Value> {
        self.run_json()
    }

    /// Run the provider's async entry point and serialize its output.
    pub async fn arun_json(&self) -> Result<Value> {
        let result = self.inner.arun_value().await;
        if let Err(ref e) = result {
            debug!("provider '{}' async run failed: {e}", self.name());
        }
        result
    }

    /// Recover the concrete provider, if it is a `P`.
    pub fn downcast_ref<P: Provider>(&self) -> Option<&P> {
        self.inner.as_any().downcast_ref::<P>()
    }

    /// Whether the wrapped provider is a `P`.
    pub fn is<P: Provider>(&self) -> bool {
        self.inner.as_any().is::<P>()
    }
}

impl<P: Provider> From<P> for ProviderHandle {
    fn from(provider: P) -> Self {
        Self::new(provider)
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("name", &self.name())
            .finish()
    }
}

// ── FnProvider ─────────────────────────────────────────────────────

type SyncHandler<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;
type AsyncHandler<T> = Box<dyn Fn() -> ProviderFuture<'static, T> + Send + Sync>;

/// A closure-backed provider.
///
/// Useful for one-off data sources that don't warrant a dedicated struct.
/// Attach an async variant with [`with_async`](Self::with_async); without it,
/// `arun` reports `NotImplemented` like any other provider.
pub struct FnProvider<T> {
    name: String,
    description: String,
    run: SyncHandler<T>,
    arun: Option<AsyncHandler<T>>,
}

impl<T: Serialize + Send + 'static> FnProvider<T> {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, run: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            run: Box::new(run),
            arun: None,
        }
    }

    /// Attach an asynchronous implementation.
    pub fn with_async<F, Fut>(mut self, arun: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.arun = Some(Box::new(move || -> ProviderFuture<'static, T> {
            Box::pin(arun())
        }));
        self
    }
}

impl<T: Serialize + Send + 'static> Provider for FnProvider<T> {
    type Output = T;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn provider_ctx(&self) -> String {
        self.description.clone()
    }

    fn run(&self) -> Result<T> {
        (self.run)()
    }

    fn arun(&self) -> ProviderFuture<'_, T> {
        match &self.arun {
            Some(handler) => handler(),
            None => {
                let provider = self.name.clone();
                Box::pin(async move {
                    Err(ProomptError::NotImplemented {
                        provider,
                        operation: "arun",
                    })
                })
            }
        }
    }
}

impl<T> fmt::Debug for FnProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider")
            .field("name", &self.name)
            .field("async", &self.arun.is_some())
            .finish()
    }
}

// ── StaticProvider ─────────────────────────────────────────────────

/// A provider that always returns the same text.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    name: String,
    text: String,
}

impl StaticProvider {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl Provider for StaticProvider {
    type Output = String;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn provider_ctx(&self) -> String {
        format!("Fixed text supplied by {}.", self.name)
    }

    fn run(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn arun(&self) -> ProviderFuture<'_, String> {
        let text = self.text.clone();
        Box::pin(async move { Ok(text) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counter {
        calls: AtomicU32,
    }

    impl Provider for Counter {
        type Output = u32;

        fn name(&self) -> String {
            "counter".into()
        }

        fn provider_ctx(&self) -> String {
            "Counts how often it ran.".into()
        }

        fn run(&self) -> Result<u32> {
            Ok(self.calls.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    struct Failing;

    impl Provider for Failing {
        type Output = String;

        fn name(&self) -> String {
            "failing".into()
        }

        fn provider_ctx(&self) -> String {
            String::new()
        }

        fn run(&self) -> Result<String> {
            Err(ProomptError::provider("failing", "upstream unavailable"))
        }
    }

    #[test]
    fn call_delegates_to_run() {
        let provider = StaticProvider::new("notes", "remember the milk");
        assert_eq!(provider.call().unwrap(), provider.run().unwrap());
    }

    #[test]
    fn call_invokes_run_logic() {
        let provider = Counter {
            calls: AtomicU32::new(0),
        };
        assert_eq!(provider.run().unwrap(), 1);
        assert_eq!(provider.call().unwrap(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn call_propagates_run_errors() {
        let err = Failing.call().unwrap_err();
        assert_eq!(
            err.to_string(),
            "provider 'failing' failed: upstream unavailable"
        );
    }

    #[tokio::test]
    async fn default_arun_is_not_implemented() {
        let provider = Counter {
            calls: AtomicU32::new(0),
        };
        let err = provider.arun().await.unwrap_err();
        assert!(err.is_not_implemented());
        assert_eq!(err.to_string(), "arun is not implemented for provider 'counter'");
        // The sync path is untouched.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn static_provider_overrides_arun() {
        let provider = StaticProvider::new("notes", "text");
        assert_eq!(provider.arun().await.unwrap(), "text");
    }

    #[test]
    fn handle_exposes_json_and_metadata() {
        let handle = ProviderHandle::new(StaticProvider::new("notes", "hello"));
        assert_eq!(handle.name(), "notes");
        assert_eq!(handle.provider_ctx(), "Fixed text supplied by notes.");
        assert_eq!(handle.run_json().unwrap(), json!("hello"));
        assert_eq!(handle.call_json().unwrap(), handle.run_json().unwrap());
    }

    #[test]
    fn handle_downcasts_to_concrete_type() {
        let handle: ProviderHandle = StaticProvider::new("notes", "hello").into();
        assert!(handle.is::<StaticProvider>());
        assert!(!handle.is::<Failing>());
        assert!(handle.downcast_ref::<Failing>().is_none());
        let concrete = handle.downcast_ref::<StaticProvider>().unwrap();
        assert_eq!(concrete.run().unwrap(), "hello");
    }

    #[test]
    fn handle_clones_share_the_provider() {
        let shared = Arc::new(Counter {
            calls: AtomicU32::new(0),
        });
        let handle = ProviderHandle::from_arc(shared.clone());
        let clone = handle.clone();
        handle.run_json().unwrap();
        clone.run_json().unwrap();
        assert_eq!(shared.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn handle_arun_reports_not_implemented() {
        let handle = ProviderHandle::new(Failing);
        assert!(handle.arun_json().await.unwrap_err().is_not_implemented());
    }

    #[test]
    fn fn_provider_runs_closure() {
        let provider = FnProvider::new("metrics", "Quarter metrics.", || {
            Ok(json!({"quarter": "Q3", "revenue": 1_250_000}))
        });
        assert_eq!(Provider::name(&provider), "metrics");
        assert_eq!(provider.call().unwrap()["revenue"], 1_250_000);
    }

    #[tokio::test]
    async fn fn_provider_async_variant() {
        let sync_only = FnProvider::new("a", "", || Ok(1u8));
        assert!(sync_only.arun().await.unwrap_err().is_not_implemented());

        let both = FnProvider::new("b", "", || Ok(1u8)).with_async(|| async { Ok(2u8) });
        assert_eq!(both.run().unwrap(), 1);
        assert_eq!(both.arun().await.unwrap(), 2);
    }
}
