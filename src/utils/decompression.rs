//! Compression detection and decompression of downloaded EPG payloads

use bytes::Bytes;
use std::fmt;

use crate::errors::{SourceError, SourceResult};

/// Compression formats recognised by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Gzip,
    Uncompressed,
}

impl fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionFormat::Gzip => write!(f, "gzip"),
            CompressionFormat::Uncompressed => write!(f, "none"),
        }
    }
}

/// Magic byte detection and decompression utility
pub struct DecompressionService;

impl DecompressionService {
    /// Detect compression format using magic bytes
    pub fn detect_compression_format(data: &[u8]) -> CompressionFormat {
        match infer::get(data) {
            Some(kind) if kind.mime_type() == "application/gzip" => CompressionFormat::Gzip,
            _ => CompressionFormat::Uncompressed,
        }
    }

    /// Decompress data based on the detected format; uncompressed data is returned as-is
    pub fn decompress(data: Bytes) -> SourceResult<Bytes> {
        match Self::detect_compression_format(&data) {
            CompressionFormat::Gzip => Self::decompress_gzip(data),
            CompressionFormat::Uncompressed => Ok(data),
        }
    }

    #[cfg(feature = "compression-gzip")]
    fn decompress_gzip(data: Bytes) -> SourceResult<Bytes> {
        use flate2::read::MultiGzDecoder;
        use std::io::Read;

        let mut decoder = MultiGzDecoder::new(data.as_ref());
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| SourceError::Decompression {
                message: format!("Failed to decompress gzip data: {e}"),
            })?;
        Ok(Bytes::from(decompressed))
    }

    #[cfg(not(feature = "compression-gzip"))]
    fn decompress_gzip(_data: Bytes) -> SourceResult<Bytes> {
        Err(SourceError::Decompression {
            message: "gzip payload received but compression-gzip support is disabled".to_string(),
        })
    }
}
