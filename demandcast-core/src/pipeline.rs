//! Batch inference driver — the strict four-stage sequence.
//!
//! Resolve model -> generate features -> score -> persist. No branching, no
//! retries, no state beyond the in-flight tables; any stage error aborts the
//! whole run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::features::FeatureTable;
use crate::output::{ResultTable, ResultWriter};
use crate::registry::ModelRegistry;
use crate::scoring;

/// Summary of a completed batch run, for observability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Identifier of this batch run.
    pub batch_id: String,
    pub model_name: String,
    pub alias: String,
    /// Training run that produced the resolved model version.
    pub run_id: String,
    pub version: u32,
    pub anchor_date: NaiveDate,
    pub rows: usize,
    pub output_path: PathBuf,
}

/// Run the full batch inference pipeline.
///
/// `anchor_date` is day 0 of the forecast window. Callers pass "today" for
/// scheduled runs and a fixed date for deterministic tests.
pub fn run_batch_inference(
    config: &ForecastConfig,
    anchor_date: NaiveDate,
) -> Result<PipelineReport, ForecastError> {
    let batch_id = uuid::Uuid::new_v4().to_string();

    // Stage 1: resolve the model from the registry.
    let registry = ModelRegistry::open(&config.registry.root_dir)?;
    let model = registry.resolve(&config.model.name, &config.model.alias)?;
    tracing::info!(
        batch_id = %batch_id,
        model = %model.name,
        alias = %model.alias,
        run_id = %model.run_id,
        version = model.version,
        "Step 1: loaded latest trained model"
    );

    // Stage 2: synthesize calendar features for the forecast window.
    let features = FeatureTable::generate(anchor_date, config.forecast.horizon_days)?;
    tracing::info!(
        batch_id = %batch_id,
        anchor_date = %anchor_date,
        horizon_days = config.forecast.horizon_days,
        "Step 2: generated feature table for inference"
    );

    // Stage 3: score the table.
    let predictions = scoring::score(model.scorer(), &features)?;
    tracing::info!(
        batch_id = %batch_id,
        records = predictions.len(),
        "Step 3: completed batch inference"
    );

    // Stage 4: assemble and persist the result set.
    let table = ResultTable::assemble(anchor_date, &features, &predictions)?;
    let writer = ResultWriter::new(&config.output.dir, &config.output.file_prefix);
    let output_path = writer.persist(anchor_date, &table)?;
    tracing::info!(
        batch_id = %batch_id,
        path = %output_path.display(),
        "Step 4: saved predictions"
    );

    Ok(PipelineReport {
        batch_id,
        model_name: model.name.clone(),
        alias: model.alias.clone(),
        run_id: model.run_id.clone(),
        version: model.version,
        anchor_date,
        rows: table.len(),
        output_path,
    })
}
