//! EPG merge stage
//!
//! Fetches every active source, keeps the `channel` and `programme` elements
//! bound to an allowed channel identifier and folds them, in source order,
//! into a single `tv` document. A failing source is logged and recorded; it
//! never stops the merge.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::SourceResult;
use crate::models::{AllowedIdSet, EpgSourceDescriptor};
use crate::pipeline::models::{MergeReport, SourceContribution, SourceFailure};
use crate::services::EpgSourceList;
use crate::sources::EpgFetcher;
use crate::utils::human_format::format_duration;
use crate::utils::url::UrlUtils;
use crate::xmltv::{
    parse_tolerant, XmlElement, CHANNEL_ELEMENT, CHANNEL_ID_ATTR, GENERATOR_NAME_ATTR,
    GENERATOR_URL_ATTR, PROGRAMME_CHANNEL_ATTR, PROGRAMME_ELEMENT, TV_ELEMENT,
};

pub struct EpgMerger {
    fetcher: Arc<dyn EpgFetcher>,
    generator_name: String,
    generator_url: String,
    concurrency: usize,
}

impl EpgMerger {
    pub fn new(
        fetcher: Arc<dyn EpgFetcher>,
        generator_name: impl Into<String>,
        generator_url: impl Into<String>,
        concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            generator_name: generator_name.into(),
            generator_url: generator_url.into(),
            concurrency: concurrency.max(1),
        }
    }

    pub fn from_config(config: &Config, fetcher: Arc<dyn EpgFetcher>) -> Self {
        Self::new(
            fetcher,
            config.generator_name.clone(),
            config.base_url.clone(),
            config.fetch_concurrency(),
        )
    }

    /// Empty `tv` root carrying the generator attributes
    pub fn root_element(&self) -> XmlElement {
        XmlElement::new(TV_ELEMENT)
            .with_attribute(GENERATOR_NAME_ATTR, self.generator_name.as_str())
            .with_attribute(GENERATOR_URL_ATTR, self.generator_url.as_str())
    }

    /// Merge all sources into one document restricted to `allowed`
    pub async fn merge_all(&self, sources: &EpgSourceList, allowed: &AllowedIdSet) -> MergeReport {
        let started = Instant::now();
        let mut report = MergeReport::new(self.root_element());

        for skipped in sources.iter().filter(|source| source.url().is_none()) {
            debug!("Skipping {} EPG source without a URL", skipped.country());
        }

        let mut results = stream::iter(sources.active())
            .map(|source| self.collect_source(source, allowed))
            .buffered(self.concurrency);

        while let Some(result) = results.next().await {
            match result {
                Ok(contribution) => report.absorb(contribution),
                Err(failure) => report.record_failure(failure),
            }
        }

        info!(
            "EPG merge completed: channels={} programmes={} failed_sources={} duration={}",
            report.channel_count,
            report.programme_count,
            report.failures.len(),
            format_duration(started.elapsed())
        );
        report
    }

    async fn collect_source(
        &self,
        source: &EpgSourceDescriptor,
        allowed: &AllowedIdSet,
    ) -> Result<SourceContribution, SourceFailure> {
        let country = source.country();
        let url = source.url().unwrap_or_default();
        let display_url = UrlUtils::obfuscate_credentials(url);

        info!("Downloading {} EPG from {}...", country, display_url);

        self.fetch_and_extract(country, url, allowed)
            .await
            .map_err(|e| {
                warn!("Failed to process {} EPG: {}", country, e);
                SourceFailure {
                    country: country.to_string(),
                    url: display_url,
                    error: e.to_string(),
                }
            })
    }

    async fn fetch_and_extract(
        &self,
        country: &str,
        url: &str,
        allowed: &AllowedIdSet,
    ) -> SourceResult<SourceContribution> {
        let body = self.fetcher.fetch(url).await?;
        let parsed = parse_tolerant(&body)?;

        for warning in &parsed.warnings {
            debug!("{} EPG parse warning: {}", country, warning);
        }

        let channels = extract(&parsed.root, CHANNEL_ELEMENT, CHANNEL_ID_ATTR, allowed);
        let programmes = extract(&parsed.root, PROGRAMME_ELEMENT, PROGRAMME_CHANNEL_ATTR, allowed);

        debug!(
            "{} EPG contributed {} channels and {} programmes",
            country,
            channels.len(),
            programmes.len()
        );

        Ok(SourceContribution {
            country: country.to_string(),
            channels,
            programmes,
            warnings: parsed.warnings.len(),
        })
    }
}

/// Copies of `name` elements whose `id_attr` is an allowed identifier
fn extract(root: &XmlElement, name: &str, id_attr: &str, allowed: &AllowedIdSet) -> Vec<XmlElement> {
    root.select(name, |element| {
        element
            .attribute(id_attr)
            .is_some_and(|id| allowed.contains(id))
    })
    .into_iter()
    .cloned()
    .collect()
}
