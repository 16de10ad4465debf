//! Input records read from the mapping and EPG source list files

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Display name used in the playlist when the mapping omits `name`
pub const UNKNOWN_CHANNEL_NAME: &str = "Unknown Channel";
/// Group title used when the mapping omits `category`
pub const UNCATEGORIZED: &str = "Uncategorized";
/// Label used in log lines when a source omits `country`
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// One entry of the channel mapping file
///
/// All fields are optional in the file; accessors apply the defaults. Unknown
/// keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tvg_id: Option<String>,
    #[serde(default)]
    pub tvg_logo: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Channel {
    /// Name used for ordering; a missing name sorts as the empty string
    pub fn sort_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_CHANNEL_NAME)
    }

    /// EPG binding, `None` when absent or empty
    pub fn tvg_id(&self) -> Option<&str> {
        self.tvg_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn tvg_logo(&self) -> &str {
        self.tvg_logo.as_deref().unwrap_or("")
    }

    /// Stream location, `None` when absent or empty
    pub fn stream_url(&self) -> Option<&str> {
        self.stream_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Group title; an explicit empty category stays empty
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }
}

/// One entry of the EPG source list file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpgSourceDescriptor {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl EpgSourceDescriptor {
    pub fn country(&self) -> &str {
        self.country.as_deref().unwrap_or(UNKNOWN_COUNTRY)
    }

    /// Download location, `None` when absent or empty
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Channel identifiers the merge is restricted to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedIdSet(HashSet<String>);

impl AllowedIdSet {
    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowedIdSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(Into::into)
                .filter(|id: &String| !id.is_empty())
                .collect(),
        )
    }
}
