//! Centralized error handling for epg-merge
//!
//! Errors fall in two families:
//!
//! - **Pipeline errors**: fatal for a run (configuration inputs that cannot be
//!   loaded, outputs that cannot be written)
//! - **Source errors**: scoped to a single EPG source (fetch or parse failures).
//!   These are recorded against the source and the merge carries on.
//!
//! # Usage
//!
//! ```rust
//! use epg_merge::errors::{PipelineError, PipelineResult};
//!
//! fn example_function() -> PipelineResult<String> {
//!     Err(PipelineError::configuration("base_url must not be empty"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using PipelineError
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Convenience type alias for per-source Results
pub type SourceResult<T> = Result<T, SourceError>;
