use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::SourceResult;

/// Retrieves the raw bytes of one EPG source
///
/// Implementations make a single attempt and return decompressed XML bytes.
#[async_trait]
pub trait EpgFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> SourceResult<Bytes>;
}
