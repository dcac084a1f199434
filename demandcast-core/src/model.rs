//! Opaque scoring models and their declared input schemas.
//!
//! The pipeline treats a trained model as a capability: a schema it expects
//! and a `predict` over numeric rows. Artifact internals stay behind the
//! [`ScoringModel`] trait so the registry can grow new families without
//! touching the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Ordered, named numeric columns a model was trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Validate that `other` presents exactly these columns in this order.
    ///
    /// Positional trust is not enough: a renamed or reordered column would
    /// silently degrade predictions, so mismatches fail loudly instead.
    pub fn validate(&self, other: &FeatureSchema) -> Result<(), ForecastError> {
        if self.columns == other.columns {
            return Ok(());
        }
        Err(ForecastError::schema_mismatch(format!(
            "model expects [{}], features present [{}]",
            self.columns.join(", "),
            other.columns.join(", "),
        )))
    }
}

/// A trained model ready to score numeric feature rows.
///
/// Implementations are pure: no side effects, one prediction per input row,
/// in row order.
pub trait ScoringModel: Send + Sync {
    /// The input columns the model was trained on, in order.
    fn schema(&self) -> &FeatureSchema;

    /// Score a batch of numeric rows.
    ///
    /// Fails with [`ForecastError::SchemaMismatch`] if a row's width differs
    /// from the declared schema.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError>;
}

/// Serialized model artifact as stored in the registry.
///
/// Tagged by family so the registry format can carry other model kinds
/// later; each family deserializes into a [`ScoringModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearArtifact),
}

impl ModelArtifact {
    /// Turn the stored artifact into a usable scoring model.
    pub fn into_model(self) -> Result<Box<dyn ScoringModel>, ForecastError> {
        match self {
            ModelArtifact::Linear(artifact) => {
                if artifact.weights.len() != artifact.schema.len() {
                    return Err(ForecastError::schema_mismatch(format!(
                        "artifact declares {} columns but carries {} weights",
                        artifact.schema.len(),
                        artifact.weights.len(),
                    )));
                }
                Ok(Box::new(LinearModel { artifact }))
            }
        }
    }
}

/// Weights-and-bias artifact for a linear demand model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub schema: FeatureSchema,
    pub weights: Vec<f64>,
    pub bias: f64,
}

struct LinearModel {
    artifact: LinearArtifact,
}

impl ScoringModel for LinearModel {
    fn schema(&self) -> &FeatureSchema {
        &self.artifact.schema
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError> {
        let width = self.artifact.schema.len();
        rows.iter()
            .map(|row| {
                if row.len() != width {
                    return Err(ForecastError::schema_mismatch(format!(
                        "row has {} values, model expects {width}",
                        row.len(),
                    )));
                }
                let dot: f64 = row
                    .iter()
                    .zip(&self.artifact.weights)
                    .map(|(x, w)| x * w)
                    .sum();
                Ok(dot + self.artifact.bias)
            })
            .collect()
    }
}
