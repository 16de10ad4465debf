//! HTTP fetcher for remote XMLTV feeds

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use tracing::debug;

use super::traits::EpgFetcher;
use crate::errors::{PipelineResult, SourceResult};
use crate::utils::human_format::format_bytes;
use crate::utils::http_client::StandardHttpClient;
use crate::utils::url::UrlUtils;

/// Downloads XMLTV documents over HTTP(S), decompressing gzip feeds
#[derive(Debug, Clone)]
pub struct HttpEpgFetcher {
    client: StandardHttpClient,
}

impl HttpEpgFetcher {
    pub fn new(timeout: Duration) -> PipelineResult<Self> {
        Ok(Self {
            client: StandardHttpClient::with_timeout(timeout)?,
        })
    }
}

#[async_trait]
impl EpgFetcher for HttpEpgFetcher {
    async fn fetch(&self, url: &str) -> SourceResult<Bytes> {
        let body = self.client.fetch_bytes(url).await?;
        debug!(
            "Downloaded {} of XMLTV data from {}",
            format_bytes(body.len()),
            UrlUtils::obfuscate_credentials(url)
        );
        Ok(body)
    }
}
