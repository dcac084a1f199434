//! Scoring — apply a resolved model to a feature table.

use crate::error::ForecastError;
use crate::features::FeatureTable;
use crate::model::ScoringModel;

/// Score every row of `features` with `model`, in row order.
///
/// The table's column names and order are validated against the model's
/// declared schema before any prediction happens, so a renamed or reordered
/// feature fails loudly instead of silently degrading the forecast. Pure
/// function of model and table.
pub fn score(model: &dyn ScoringModel, features: &FeatureTable) -> Result<Vec<f64>, ForecastError> {
    model.schema().validate(&features.schema())?;

    let predictions = model.predict(&features.numeric_rows())?;

    if predictions.len() != features.len() {
        return Err(ForecastError::LengthMismatch {
            expected: features.len(),
            actual: predictions.len(),
        });
    }
    Ok(predictions)
}
