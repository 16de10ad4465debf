//! Utility modules shared across the pipeline
//!
//! URL handling, HTTP downloads with decompression, natural ordering and
//! human-readable log formatting.

pub mod decompression;
pub mod http_client;
pub mod human_format;
pub mod natural_sort;
pub mod url;

pub use decompression::{CompressionFormat, DecompressionService};
pub use http_client::StandardHttpClient;
pub use natural_sort::{natural_sort_key, NaturalKey};
