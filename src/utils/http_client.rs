use bytes::Bytes;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

use crate::errors::{PipelineError, PipelineResult, SourceError, SourceResult};
use crate::utils::decompression::{CompressionFormat, DecompressionService};
use crate::utils::human_format::format_bytes;
use crate::utils::url::UrlUtils;

/// User agent sent with every download
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// reqwest wrapper with a total request timeout and transparent decompression
#[derive(Debug, Clone)]
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    /// Create a client whose requests fail after `timeout` in total
    pub fn with_timeout(timeout: Duration) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                PipelineError::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }

    /// GET `url` once and return the decompressed body
    pub async fn fetch_bytes(&self, url: &str) -> SourceResult<Bytes> {
        debug!(
            "Fetching binary content from: {}",
            UrlUtils::obfuscate_credentials(url)
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::classify_error(e, url))?;

        Self::process_response_to_bytes(response, url).await
    }

    async fn process_response_to_bytes(response: Response, url: &str) -> SourceResult<Bytes> {
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                url: UrlUtils::obfuscate_credentials(url),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::classify_error(e, url))?;

        debug!("Fetched {} of raw content", format_bytes(bytes.len()));

        let compression_format = DecompressionService::detect_compression_format(&bytes);
        if compression_format == CompressionFormat::Uncompressed {
            return Ok(bytes);
        }

        debug!("Content is {} compressed, decompressing", compression_format);
        let decompressed = DecompressionService::decompress(bytes)?;
        debug!(
            "Decompressed to {} (compression: {})",
            format_bytes(decompressed.len()),
            compression_format
        );
        Ok(decompressed)
    }

    fn classify_error(error: reqwest::Error, url: &str) -> SourceError {
        let url = UrlUtils::obfuscate_credentials(url);
        if error.is_timeout() {
            SourceError::Timeout { url }
        } else {
            SourceError::Fetch {
                url,
                message: error.without_url().to_string(),
            }
        }
    }
}
