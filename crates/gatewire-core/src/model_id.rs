//! Memoized model identifier resolution
//!
//! Some routes address models through indirection, for example an inference
//! profile id that maps to a foundation model. [`ModelIdCache`] remembers the
//! outcome of a [`ModelResolver`]. The resolver runs without any lock held:
//! concurrent misses for the same id may each resolve it, and the last write
//! wins. Resolution is expected to be idempotent.

use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Maps an external model identifier to a model name
pub trait ModelResolver: Send + Sync {
    fn resolve(&self, model_id: &str) -> Result<String>;
}

impl<F> ModelResolver for F
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    fn resolve(&self, model_id: &str) -> Result<String> {
        self(model_id)
    }
}

/// Resolver backed by a fixed alias table; unknown ids resolve to themselves
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    aliases: HashMap<String, String>,
}

impl StaticResolver {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        Self { aliases }
    }

    pub fn with_alias(mut self, model_id: impl Into<String>, model: impl Into<String>) -> Self {
        self.aliases.insert(model_id.into(), model.into());
        self
    }
}

impl ModelResolver for StaticResolver {
    fn resolve(&self, model_id: &str) -> Result<String> {
        if model_id.is_empty() {
            return Err(Error::ModelResolution {
                model: String::new(),
                message: "empty model identifier".to_string(),
            });
        }
        Ok(self
            .aliases
            .get(model_id)
            .cloned()
            .unwrap_or_else(|| model_id.to_string()))
    }
}

/// Cache in front of a [`ModelResolver`]; failures are not cached
#[derive(Debug)]
pub struct ModelIdCache<R> {
    resolver: R,
    entries: RwLock<HashMap<String, String>>,
}

impl<R: ModelResolver> ModelIdCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve through the cache
    pub fn resolve(&self, model_id: &str) -> Result<String> {
        if let Some(model) = self.cached(model_id) {
            return Ok(model);
        }

        log::debug!("Model id cache miss for '{}'", model_id);
        let model = self.resolver.resolve(model_id)?;
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(model_id.to_string(), model.clone());
        Ok(model)
    }

    /// The cached resolution, if any
    pub fn cached(&self, model_id: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
