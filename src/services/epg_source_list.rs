use std::path::Path;
use tracing::debug;

use crate::errors::{PipelineError, PipelineResult};
use crate::models::EpgSourceDescriptor;

/// Remote EPG feeds in the order they are merged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpgSourceList {
    sources: Vec<EpgSourceDescriptor>,
}

impl EpgSourceList {
    pub fn new(sources: Vec<EpgSourceDescriptor>) -> Self {
        Self { sources }
    }

    pub async fn load(path: &Path) -> PipelineResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::config_load(path, e.to_string()))?;
        let sources =
            Self::from_json(&content).map_err(|e| PipelineError::config_load(path, e))?;
        debug!("Loaded {} EPG sources from {}", sources.len(), path.display());
        Ok(sources)
    }

    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str::<Vec<EpgSourceDescriptor>>(content)
            .map(Self::new)
            .map_err(|e| format!("invalid EPG source list: {e}"))
    }

    /// Every declared source, including ones without a URL
    pub fn iter(&self) -> std::slice::Iter<'_, EpgSourceDescriptor> {
        self.sources.iter()
    }

    /// Sources with a non-empty URL, in declared order
    pub fn active(&self) -> impl Iterator<Item = &EpgSourceDescriptor> + '_ {
        self.sources.iter().filter(|source| source.url().is_some())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
