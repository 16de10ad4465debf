use serde::Serialize;
use std::path::PathBuf;
use strum::Display;

use crate::xmltv::XmlElement;

/// Stages of a run, in the only order they can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
pub enum PipelineState {
    Start,
    CatalogLoaded,
    SourcesLoaded,
    EpgMerged,
    EpgWritten,
    PlaylistBuilt,
    PlaylistWritten,
    Done,
}

/// Elements kept from one successfully parsed source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceContribution {
    pub country: String,
    pub channels: Vec<XmlElement>,
    pub programmes: Vec<XmlElement>,
    pub warnings: usize,
}

/// Per-source counts recorded in the merge report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub country: String,
    pub channels: usize,
    pub programmes: usize,
    pub warnings: usize,
}

/// A source that could not be fetched or parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub country: String,
    /// Source URL with credentials masked
    pub url: String,
    pub error: String,
}

/// Outcome of merging every configured source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub document: XmlElement,
    pub programme_count: usize,
    pub channel_count: usize,
    pub outcomes: Vec<SourceOutcome>,
    pub failures: Vec<SourceFailure>,
}

impl MergeReport {
    pub fn new(document: XmlElement) -> Self {
        Self {
            document,
            programme_count: 0,
            channel_count: 0,
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Append a source's elements; channels go before programmes
    pub fn absorb(&mut self, contribution: SourceContribution) {
        self.outcomes.push(SourceOutcome {
            country: contribution.country,
            channels: contribution.channels.len(),
            programmes: contribution.programmes.len(),
            warnings: contribution.warnings,
        });
        self.channel_count += contribution.channels.len();
        self.programme_count += contribution.programmes.len();

        for channel in contribution.channels {
            self.document.push_element(channel);
        }
        for programme in contribution.programmes {
            self.document.push_element(programme);
        }
    }

    pub fn record_failure(&mut self, failure: SourceFailure) {
        self.failures.push(failure);
    }
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub epg_path: PathBuf,
    pub playlist_path: PathBuf,
    pub programme_count: usize,
    pub channel_count: usize,
    pub playlist_entries: usize,
    pub failed_sources: Vec<SourceFailure>,
}
