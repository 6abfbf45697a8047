//! Source registry
//!
//! Holds one prototype per adapter kind and the ordered set of enabled
//! instances. Mutated while the server starts, then shared behind an `Arc`.

use libra_core::{LibraError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::local_file::LocalFileSource;
use crate::settings::SourceSettings;
use crate::source::Source;
use crate::spotify::SpotifySource;
use crate::web::WebSource;
use crate::youtube::YouTubeSource;

/// Prototypes plus enabled sources in priority order
#[derive(Debug, Default)]
pub struct SourceRegistry {
    prototypes: Vec<Arc<dyn Source>>,
    sources: HashMap<String, Arc<dyn Source>>,
    order: Vec<String>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in adapter registered
    ///
    /// A prototype that fails to initialise is logged and left out.
    pub async fn with_builtin(settings: SourceSettings) -> Self {
        let mut registry = Self::new();

        match YouTubeSource::install(settings.clone()).await {
            Ok(youtube) => registry.register_prototype(Arc::new(youtube)),
            Err(e) => warn!(source = "youtube", error = %e, "Source initialization failed"),
        }
        registry.register_prototype(Arc::new(SpotifySource::new()));
        registry.register_prototype(Arc::new(LocalFileSource::prototype()));
        match WebSource::prototype(&settings) {
            Ok(web) => registry.register_prototype(Arc::new(web)),
            Err(e) => warn!(source = "web", error = %e, "Source initialization failed"),
        }

        registry
    }

    pub fn register_prototype(&mut self, source: Arc<dyn Source>) {
        debug!(source = source.id(), "Registered source prototype");
        self.prototypes.push(source);
    }

    /// Enable the source matching `id`
    ///
    /// Prototypes that support multiple instances are derived into a fresh
    /// instance stored under its own id; other prototypes are enabled as-is.
    /// Enabling an already enabled source is a no-op.
    pub async fn enable(&mut self, id: &str) -> Result<()> {
        if self.sources.contains_key(id) {
            debug!(source = %id, "Source already enabled");
            return Ok(());
        }

        let prototype = self
            .prototypes
            .iter()
            .find(|p| p.satisfies(id))
            .cloned()
            .ok_or_else(|| LibraError::InvalidSource(id.to_string()))?;

        let source = if prototype.supports_multiple() {
            prototype
                .derive(id)
                .await
                .map_err(|e| LibraError::source(id, e))?
        } else {
            prototype
        };

        let source_id = source.id().to_string();
        if self.sources.contains_key(&source_id) {
            debug!(source = %source_id, "Source already enabled");
            return Ok(());
        }

        info!(source = %source_id, name = source.name(), "Enabled source");
        self.sources.insert(source_id.clone(), source);
        self.order.push(source_id);
        Ok(())
    }

    /// Enable each id in order, logging failures
    ///
    /// Returns the failures so callers that treat them as fatal can do so.
    pub async fn enable_all(&mut self, ids: &[String]) -> Vec<LibraError> {
        let mut failures = Vec::new();
        for id in ids {
            if let Err(e) = self.enable(id).await {
                warn!(source = %id, error = %e, "Error enabling source");
                failures.push(e);
            }
        }
        failures
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Source>> {
        self.sources.get(id).cloned()
    }

    /// Enabled sources, highest priority first
    pub fn enumerate(&self) -> Vec<Arc<dyn Source>> {
        self.order
            .iter()
            .filter_map(|id| self.sources.get(id).cloned())
            .collect()
    }

    /// Position of `id` in the priority order
    pub fn priority(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|enabled| enabled == id)
    }

    /// Whether `a` outranks `b`
    ///
    /// Unknown ids rank below every enabled id, and an empty `b` ranks below
    /// everything else.
    pub fn is_higher_priority(&self, a: &str, b: &str) -> bool {
        if b.is_empty() {
            return !a.is_empty();
        }
        match (self.priority(a), self.priority(b)) {
            (Some(pa), Some(pb)) => pa < pb,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
