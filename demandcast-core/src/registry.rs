//! Filesystem-backed model registry.
//!
//! Layout: `<root>/<model_name>/registry.json` holds the version history and
//! alias map for one registered model; artifact files live next to the
//! manifest. Aliases are mutable labels (`latest_model`) resolved to a
//! concrete version at call time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ForecastError;
use crate::model::{ModelArtifact, ScoringModel};
use crate::persistence;

/// One registered version of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    pub version: u32,
    /// Identifier of the training run that produced the artifact.
    pub run_id: String,
    /// Artifact file path, relative to the model directory.
    pub artifact: PathBuf,
    /// SHA-256 digest of the artifact file.
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

/// Manifest for one registered model: version history plus alias map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub name: String,
    pub versions: Vec<ModelVersion>,
    pub aliases: HashMap<String, u32>,
}

impl ModelManifest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            versions: Vec::new(),
            aliases: HashMap::new(),
        }
    }

    /// The highest registered version, if any.
    pub fn latest_version(&self) -> Option<&ModelVersion> {
        self.versions.iter().max_by_key(|v| v.version)
    }

    pub fn find_version(&self, version: u32) -> Option<&ModelVersion> {
        self.versions.iter().find(|v| v.version == version)
    }
}

/// Provenance of a resolved model, kept for observability only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProvenance {
    pub run_id: String,
    pub version: u32,
    pub alias: String,
}

/// A model resolved from the registry and loaded, ready to score.
///
/// Immutable once resolved; lives for exactly one pipeline run.
pub struct ResolvedModel {
    pub name: String,
    pub alias: String,
    pub version: u32,
    pub run_id: String,
    model: Box<dyn ScoringModel>,
}

impl std::fmt::Debug for ResolvedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedModel")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("version", &self.version)
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}

impl ResolvedModel {
    pub fn scorer(&self) -> &dyn ScoringModel {
        self.model.as_ref()
    }

    pub fn provenance(&self) -> ModelProvenance {
        ModelProvenance {
            run_id: self.run_id.clone(),
            version: self.version,
            alias: self.alias.clone(),
        }
    }
}

/// Handle on a registry root directory.
#[derive(Debug)]
pub struct ModelRegistry {
    root: PathBuf,
}

impl ModelRegistry {
    /// Open a registry at `root`.
    ///
    /// Fails with [`ForecastError::RegistryUnavailable`] if the root does not
    /// exist or cannot be read.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ForecastError> {
        let root = root.into();
        match std::fs::read_dir(&root) {
            Ok(_) => Ok(Self { root }),
            Err(e) => Err(ForecastError::registry_unavailable(format!(
                "{}: {e}",
                root.display()
            ))),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join("registry.json")
    }

    /// Load the manifest for a registered model.
    pub fn manifest(&self, name: &str) -> Result<ModelManifest, ForecastError> {
        let path = self.manifest_path(name);
        let manifest: Option<ModelManifest> = persistence::load_json(&path).map_err(|e| {
            ForecastError::registry_unavailable(format!("{}: {e}", path.display()))
        })?;
        manifest.ok_or_else(|| ForecastError::model_not_found(format!("no registered model '{name}'")))
    }

    /// Metadata for the most recently registered version of a model.
    pub fn latest_version(&self, name: &str) -> Result<ModelVersion, ForecastError> {
        let manifest = self.manifest(name)?;
        manifest
            .latest_version()
            .cloned()
            .ok_or_else(|| ForecastError::model_not_found(format!("'{name}' has no versions")))
    }

    /// Resolve `(name, alias)` to a loaded scoring model plus provenance.
    ///
    /// The artifact's SHA-256 digest is verified against the manifest before
    /// the model is deserialized.
    pub fn resolve(&self, name: &str, alias: &str) -> Result<ResolvedModel, ForecastError> {
        let manifest = self.manifest(name)?;

        let version_number = *manifest.aliases.get(alias).ok_or_else(|| {
            ForecastError::model_not_found(format!("'{name}' has no alias '{alias}'"))
        })?;
        let version = manifest.find_version(version_number).ok_or_else(|| {
            ForecastError::model_not_found(format!(
                "alias '{alias}' points at missing version {version_number} of '{name}'"
            ))
        })?;

        let artifact_path = self.root.join(name).join(&version.artifact);
        let bytes = std::fs::read(&artifact_path).map_err(|e| {
            ForecastError::registry_unavailable(format!("{}: {e}", artifact_path.display()))
        })?;

        let digest = hex_digest(&bytes);
        if digest != version.sha256 {
            return Err(ForecastError::registry_unavailable(format!(
                "artifact digest mismatch for '{name}' v{version_number}: manifest {}, file {digest}",
                version.sha256,
            )));
        }

        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        let model = artifact.into_model()?;

        tracing::debug!(
            model = name,
            alias,
            version = version.version,
            run_id = %version.run_id,
            "Resolved model from registry"
        );

        Ok(ResolvedModel {
            name: name.to_string(),
            alias: alias.to_string(),
            version: version.version,
            run_id: version.run_id.clone(),
            model,
        })
    }

    /// Register a new version of a model and point `alias` at it.
    ///
    /// Writes the artifact and the updated manifest atomically. Used by
    /// training jobs and test fixtures; the inference pipeline only reads.
    pub fn register(
        &self,
        name: &str,
        alias: &str,
        run_id: &str,
        artifact: &ModelArtifact,
    ) -> Result<ModelVersion, ForecastError> {
        let mut manifest = match self.manifest(name) {
            Ok(m) => m,
            Err(ForecastError::ModelNotFound(_)) => ModelManifest::new(name),
            Err(e) => return Err(e),
        };

        let version = manifest.latest_version().map(|v| v.version + 1).unwrap_or(1);
        let artifact_rel = PathBuf::from(format!("v{version}.json"));
        let bytes = serde_json::to_vec_pretty(artifact)?;

        let model_dir = self.root.join(name);
        persistence::atomic_write(&model_dir.join(&artifact_rel), &bytes)?;

        let entry = ModelVersion {
            version,
            run_id: run_id.to_string(),
            artifact: artifact_rel,
            sha256: hex_digest(&bytes),
            created_at: Utc::now(),
        };
        manifest.versions.push(entry.clone());
        manifest.aliases.insert(alias.to_string(), version);
        persistence::atomic_write_json(&self.manifest_path(name), &manifest)?;

        Ok(entry)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
