//! Channel catalog loaded from the mapping file

use std::path::Path;
use tracing::debug;

use crate::errors::{PipelineError, PipelineResult};
use crate::models::{AllowedIdSet, Channel};
use crate::utils::natural_sort::natural_sort_key;

/// Ordered channel definitions driving both the EPG filter and the playlist
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelCatalog {
    channels: Vec<Channel>,
}

impl ChannelCatalog {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    /// Read and parse the mapping file at `path`
    pub async fn load(path: &Path) -> PipelineResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::config_load(path, e.to_string()))?;
        let catalog =
            Self::from_json(&content).map_err(|e| PipelineError::config_load(path, e))?;
        debug!(
            "Loaded {} channels from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a JSON array of channel objects
    pub fn from_json(content: &str) -> Result<Self, String> {
        serde_json::from_str::<Vec<Channel>>(content)
            .map(Self::new)
            .map_err(|e| format!("invalid channel mapping: {e}"))
    }

    /// Reorder channels by natural order of their names, keeping ties in file order
    pub fn sort_in_place(&mut self) {
        self.channels
            .sort_by_cached_key(|channel| natural_sort_key(channel.sort_name()));
    }

    /// Distinct non-empty `tvg_id` values
    pub fn allowed_ids(&self) -> AllowedIdSet {
        self.channels.iter().filter_map(Channel::tvg_id).collect()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Channel> {
        self.channels.iter()
    }
}

impl<'a> IntoIterator for &'a ChannelCatalog {
    type Item = &'a Channel;
    type IntoIter = std::slice::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
