//! The merge pipeline: stages, their result models and the orchestrator that
//! sequences them

pub mod models;
pub mod orchestrator;
pub mod stages;

pub use models::{
    MergeReport, PipelineState, RunSummary, SourceContribution, SourceFailure, SourceOutcome,
};
pub use orchestrator::Pipeline;
