//! Runs the full merge: load inputs, merge the EPG, write both artifacts

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::PipelineResult;
use crate::pipeline::models::{PipelineState, RunSummary};
use crate::pipeline::stages::{publish, EpgMerger, PlaylistBuilder};
use crate::services::{ChannelCatalog, EpgSourceList};
use crate::sources::{EpgFetcher, HttpEpgFetcher};
use crate::utils::human_format::format_duration;
use crate::xmltv::write_document;

pub struct Pipeline {
    config: Config,
    fetcher: Arc<dyn EpgFetcher>,
}

impl Pipeline {
    /// Pipeline fetching sources over HTTP with the configured timeout
    pub fn new(config: Config) -> PipelineResult<Self> {
        let fetcher = HttpEpgFetcher::new(config.fetch_timeout)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn EpgFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Execute one run
    ///
    /// Input loading and output writing failures abort the run. Source
    /// failures are reported in the summary.
    pub async fn run(&self) -> PipelineResult<RunSummary> {
        let mut state = PipelineState::Start;
        let result = self.execute(&mut state).await;
        if let Err(e) = &result {
            debug!("Pipeline stopped after state {}: {}", state, e);
        }
        result
    }

    async fn execute(&self, state: &mut PipelineState) -> PipelineResult<RunSummary> {
        let started = Instant::now();
        let epg_path = self.config.epg_output_path();
        let playlist_path = self.config.m3u_output_path();

        let mut catalog = ChannelCatalog::load(&self.config.mapping_path()).await?;
        catalog.sort_in_place();
        advance(state, PipelineState::CatalogLoaded);

        let sources = EpgSourceList::load(&self.config.epg_sources_path()).await?;
        advance(state, PipelineState::SourcesLoaded);

        let allowed = catalog.allowed_ids();
        debug!(
            "Restricting EPG to {} channel ids from {} channels",
            allowed.len(),
            catalog.len()
        );
        let merger = EpgMerger::from_config(&self.config, Arc::clone(&self.fetcher));
        let report = merger.merge_all(&sources, &allowed).await;
        advance(state, PipelineState::EpgMerged);

        let epg_bytes = write_document(&report.document)?;
        publish(&epg_path, &epg_bytes).await?;
        info!("Merged EPG saved to: {}", epg_path.display());
        advance(state, PipelineState::EpgWritten);

        info!("Building M3U with natural sorting and categories...");
        let playlist = PlaylistBuilder::build(&catalog, &self.config.epg_reference_url());
        advance(state, PipelineState::PlaylistBuilt);

        publish(&playlist_path, playlist.render().as_bytes()).await?;
        info!("M3U saved to: {}", playlist_path.display());
        advance(state, PipelineState::PlaylistWritten);

        if !report.failures.is_empty() {
            warn!(
                "{} of {} EPG sources failed: {}",
                report.failures.len(),
                sources.active().count(),
                report
                    .failures
                    .iter()
                    .map(|f| f.country.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        info!(
            "Done! Total programmes grabbed from EPG: {}",
            report.programme_count
        );
        advance(state, PipelineState::Done);
        debug!("Pipeline finished in {}", format_duration(started.elapsed()));

        Ok(RunSummary {
            epg_path,
            playlist_path,
            programme_count: report.programme_count,
            channel_count: report.channel_count,
            playlist_entries: playlist.len(),
            failed_sources: report.failures,
        })
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug!("Pipeline state: {} -> {}", state, next);
    *state = next;
}
