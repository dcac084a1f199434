//! # demandcast-core — batch inference for sales-demand forecasting
//!
//! A single linear pipeline: resolve the latest trained model from a
//! registry, synthesize a calendar feature table for a fixed future window,
//! score it, and persist the results to a timestamped CSV. No training, no
//! online serving, no feedback loop; every error is fatal.
//!
//! Stages and their modules:
//! 1. Model resolver — [`registry`]
//! 2. Feature synthesizer — [`features`]
//! 3. Scorer — [`scoring`]
//! 4. Result writer — [`output`]
//!
//! [`pipeline::run_batch_inference`] wires the four together.

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod output;
pub mod persistence;
pub mod pipeline;
pub mod registry;
pub mod scoring;

pub use config::{ForecastConfig, load_config};
pub use error::ForecastError;
pub use features::{FeatureRow, FeatureTable};
pub use model::{FeatureSchema, ModelArtifact, ScoringModel};
pub use output::{ResultRow, ResultTable, ResultWriter};
pub use pipeline::{PipelineReport, run_batch_inference};
pub use registry::{ModelProvenance, ModelRegistry, ResolvedModel};
