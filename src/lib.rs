pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod utils;
pub mod xmltv;

pub use config::Config;
pub use errors::{PipelineError, PipelineResult, SourceError, SourceResult};
pub use pipeline::{Pipeline, RunSummary};
