//! Explicit registry mapping provider names to reranker constructors.
//!
//! The registry is a plain value constructed at process start and passed to
//! whatever assembles the pipeline. There is no ambient global state; two
//! registries with different provider sets can coexist.

use std::collections::HashMap;
use std::sync::Arc;

use riptide_core::error::{RiptideError, RiptideResult};
use riptide_core::traits::{Reranker, RerankerConfig};

type BuilderFn = Arc<dyn Fn(RerankerConfig) -> RiptideResult<Arc<dyn Reranker>> + Send + Sync>;

/// Registry of reranker providers, keyed by name.
#[derive(Default, Clone)]
pub struct RerankerRegistry {
    builders: HashMap<String, BuilderFn>,
}

impl RerankerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all compiled-in providers registered.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "cohere")]
        registry.register("cohere", |config| {
            Ok(Arc::new(crate::cohere::CohereReranker::new(config)?) as Arc<dyn Reranker>)
        });

        #[cfg(feature = "jina")]
        registry.register("jina", |config| {
            Ok(Arc::new(crate::jina::JinaReranker::new(config)?) as Arc<dyn Reranker>)
        });

        registry
    }

    /// Register a provider constructor under a name, replacing any existing
    /// registration for that name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        builder: impl Fn(RerankerConfig) -> RiptideResult<Arc<dyn Reranker>> + Send + Sync + 'static,
    ) {
        self.builders.insert(name.into(), Arc::new(builder));
    }

    /// Construct a reranker for a registered provider name.
    pub fn create(&self, name: &str, config: RerankerConfig) -> RiptideResult<Arc<dyn Reranker>> {
        let builder = self.builders.get(name).ok_or_else(|| {
            RiptideError::invalid_configuration(format!(
                "unknown reranker provider '{}', registered providers: [{}]",
                name,
                self.provider_names().join(", ")
            ))
        })?;
        builder(config)
    }

    /// Names of the registered providers, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.builders.keys().cloned().collect();
        names.sort();
        names
    }
}
