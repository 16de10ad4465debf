//! Error type definitions for epg-merge
//!
//! `PipelineError` aborts a run, `SourceError` only ever takes one EPG source
//! out of the merge.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The channel mapping or EPG source list could not be loaded
    #[error("Failed to load {}: {message}", .path.display())]
    ConfigLoad { path: PathBuf, message: String },

    /// Invalid runtime configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An output artifact could not be serialized
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// An output artifact could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors scoped to a single EPG source
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport level failure (DNS, connect, TLS, body read)
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The request exceeded the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// The server answered with a non-success status
    #[error("HTTP error: {status} {reason} - URL: {url}")]
    Http {
        url: String,
        status: u16,
        reason: String,
    },

    /// A compressed payload could not be decompressed
    #[error("Decompression failed: {message}")]
    Decompression { message: String },

    /// The payload could not be parsed as XML, even tolerantly
    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl PipelineError {
    /// Create a config load error for the given input file
    pub fn config_load<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an output write error for the given artifact path
    pub fn output_write<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

impl SourceError {
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}
