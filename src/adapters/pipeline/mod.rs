//! Tree-ensemble pipeline adapter: Implementation of Predictor.
//!
//! Loads a gradient-boosted tree ensemble exported to JSON together with
//! its input encoding (numeric passthrough, one-hot for categoricals).
//!
//! # Artifact layout
//!
//! ```json
//! {
//!   "format": "churnguard-pipeline",
//!   "version": 1,
//!   "model_family": "LightGBM",
//!   "columns": [
//!     { "name": "tenure", "kind": "numeric" },
//!     { "name": "Contract", "kind": "categorical", "categories": ["Month-to-month", "One year"] }
//!   ],
//!   "base_score": -1.0,
//!   "trees": [[ { "feature": 0, "threshold": 6.5, "left": 1, "right": 2 }, { "leaf": 0.4 }, { "leaf": -0.1 } ]]
//! }
//! ```
//!
//! Split nodes send a row left when `value <= threshold`. Node 0 is the root
//! and children always sit at a higher index than their parent, so every walk
//! terminates.
//!
//! # Integrity
//!
//! If `<artifact>.sha256` exists next to the artifact, its hex digest must
//! match the artifact bytes. The `checksum_model` binary writes that file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ports::{FeatureRow, PredictError, Predictor};
use crate::ChurnError;

pub const PIPELINE_FORMAT: &str = "churnguard-pipeline";
pub const PIPELINE_VERSION: u32 = 1;

/// Artifact location relative to the install root.
pub const MODEL_RELATIVE_PATH: &str = "models/churn_lightgbm_pipeline.json";

/// Environment variable overriding the artifact location.
pub const MODEL_PATH_ENV: &str = "CHURNGUARD_MODEL_PATH";

/// Input column and how it is encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnSpec {
    Numeric { name: String },
    Categorical { name: String, categories: Vec<String> },
}

impl ColumnSpec {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name } | Self::Categorical { name, .. } => name,
        }
    }

    /// Number of encoded features this column contributes.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Numeric { .. } => 1,
            Self::Categorical { categories, .. } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: f64,
    },
}

/// The on-disk pipeline document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format: String,
    pub version: u32,
    pub model_family: String,
    pub columns: Vec<ColumnSpec>,
    pub base_score: f64,
    pub trees: Vec<Vec<TreeNode>>,
}

impl PipelineArtifact {
    /// Total encoded feature count.
    #[must_use]
    pub fn encoded_width(&self) -> usize {
        self.columns.iter().map(ColumnSpec::width).sum()
    }

    fn validate(&self) -> Result<(), ChurnError> {
        if self.format != PIPELINE_FORMAT {
            return Err(invalid(format!(
                "unexpected format {:?} (expected {PIPELINE_FORMAT:?})",
                self.format
            )));
        }
        if self.version != PIPELINE_VERSION {
            return Err(invalid(format!(
                "unsupported version {} (expected {PIPELINE_VERSION})",
                self.version
            )));
        }
        if self.columns.is_empty() {
            return Err(invalid("no input columns declared".into()));
        }

        let mut names = HashSet::new();
        for column in &self.columns {
            if !names.insert(column.name()) {
                return Err(invalid(format!("duplicate column {:?}", column.name())));
            }
            if let ColumnSpec::Categorical { name, categories } = column {
                if categories.is_empty() {
                    return Err(invalid(format!("column {name:?} has no categories")));
                }
                let unique: HashSet<&String> = categories.iter().collect();
                if unique.len() != categories.len() {
                    return Err(invalid(format!("column {name:?} repeats a category")));
                }
            }
        }

        if !self.base_score.is_finite() {
            return Err(invalid("base_score is not finite".into()));
        }
        if self.trees.is_empty() {
            return Err(invalid("ensemble has no trees".into()));
        }

        let width = self.encoded_width();
        for (t, nodes) in self.trees.iter().enumerate() {
            if nodes.is_empty() {
                return Err(invalid(format!("tree {t} is empty")));
            }
            for (i, node) in nodes.iter().enumerate() {
                match node {
                    TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= width {
                            return Err(invalid(format!(
                                "tree {t} node {i}: feature {feature} out of range (width {width})"
                            )));
                        }
                        if !threshold.is_finite() {
                            return Err(invalid(format!("tree {t} node {i}: threshold not finite")));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= nodes.len() {
                                return Err(invalid(format!(
                                    "tree {t} node {i}: child {child} out of range"
                                )));
                            }
                        }
                    }
                    TreeNode::Leaf { leaf } => {
                        if !leaf.is_finite() {
                            return Err(invalid(format!("tree {t} node {i}: leaf not finite")));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn invalid(msg: String) -> ChurnError {
    ChurnError::ModelLoad(format!("Invalid pipeline artifact: {msg}"))
}

/// Hex-encoded SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Location of the checksum file for an artifact (`<artifact>.sha256`).
#[must_use]
pub fn checksum_path(artifact: &Path) -> PathBuf {
    let mut s = artifact.as_os_str().to_owned();
    s.push(".sha256");
    PathBuf::from(s)
}

fn verify_checksum(artifact: &Path, bytes: &[u8]) -> Result<(), ChurnError> {
    let sidecar = checksum_path(artifact);
    if !sidecar.exists() {
        tracing::warn!("No checksum file at {:?}; skipping integrity check", sidecar);
        return Ok(());
    }

    let content = fs::read_to_string(&sidecar).map_err(|e| {
        ChurnError::ModelLoad(format!("Failed to read checksum {sidecar:?}: {e}"))
    })?;
    let expected = content
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let actual = sha256_hex(bytes);

    if expected != actual {
        return Err(ChurnError::ModelLoad(format!(
            "Checksum mismatch for {artifact:?}: artifact is corrupt or was modified"
        )));
    }
    tracing::debug!("Checksum verified for {:?}", artifact);
    Ok(())
}

/// Pick the artifact path: explicit override, then the install root, then the
/// working directory.
#[must_use]
pub fn resolve_model_path(override_path: Option<&str>, exe: Option<&Path>) -> PathBuf {
    if let Some(p) = override_path.map(str::trim).filter(|p| !p.is_empty()) {
        return PathBuf::from(p);
    }

    // <root>/bin/churnguard -> <root>/models/...
    if let Some(root) = exe.and_then(Path::parent).and_then(Path::parent) {
        let candidate = root.join(MODEL_RELATIVE_PATH);
        if candidate.exists() {
            return candidate;
        }
    }

    PathBuf::from(MODEL_RELATIVE_PATH)
}

/// Gradient-boosted tree ensemble loaded from a [`PipelineArtifact`].
#[derive(Debug, Clone)]
pub struct TreePipeline {
    artifact: PipelineArtifact,
}

impl TreePipeline {
    /// Load and validate an artifact from disk.
    ///
    /// # Errors
    /// Returns `ChurnError::ModelLoad` if the file is missing, fails its
    /// checksum, does not parse, or is structurally invalid.
    pub fn load(path: &Path) -> Result<Self, ChurnError> {
        let bytes = fs::read(path).map_err(|e| {
            ChurnError::ModelLoad(format!("Failed to read model artifact {path:?}: {e}"))
        })?;
        verify_checksum(path, &bytes)?;

        let pipeline = Self::from_slice(&bytes)?;
        tracing::info!(
            "Loaded {} pipeline from {:?} (trees={}, columns={}, encoded_width={})",
            pipeline.model_family(),
            path,
            pipeline.artifact.trees.len(),
            pipeline.artifact.columns.len(),
            pipeline.artifact.encoded_width()
        );
        Ok(pipeline)
    }

    /// Parse and validate an artifact held in memory.
    ///
    /// # Errors
    /// Returns `ChurnError::ModelLoad` if the document is malformed.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ChurnError> {
        let artifact: PipelineArtifact = serde_json::from_slice(bytes)
            .map_err(|e| ChurnError::ModelLoad(format!("Invalid pipeline format: {e}")))?;
        Self::from_artifact(artifact)
    }

    /// # Errors
    /// Returns `ChurnError::ModelLoad` if the artifact is structurally invalid.
    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self, ChurnError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    /// Encode a row into the ensemble's feature space.
    fn encode(&self, row: &FeatureRow) -> Result<Vec<f64>, PredictError> {
        let mut features = Vec::with_capacity(self.artifact.encoded_width());

        for column in &self.artifact.columns {
            let name = column.name();
            let value = row
                .get(name)
                .ok_or_else(|| PredictError::SchemaMismatch(format!("missing column {name:?}")))?;

            match column {
                ColumnSpec::Numeric { .. } => {
                    let v = value.as_f64().ok_or_else(|| {
                        PredictError::SchemaMismatch(format!("column {name:?} must be numeric"))
                    })?;
                    features.push(v);
                }
                ColumnSpec::Categorical { categories, .. } => {
                    let s = value.as_str().ok_or_else(|| {
                        PredictError::SchemaMismatch(format!("column {name:?} must be a string"))
                    })?;
                    let hit = categories.iter().position(|c| c == s).ok_or_else(|| {
                        PredictError::SchemaMismatch(format!(
                            "unknown category {s:?} for column {name:?}"
                        ))
                    })?;
                    features.extend((0..categories.len()).map(|i| if i == hit { 1.0 } else { 0.0 }));
                }
            }
        }

        Ok(features)
    }

    fn raw_score(&self, features: &[f64]) -> f64 {
        self.artifact.base_score
            + self
                .artifact
                .trees
                .iter()
                .map(|nodes| walk(nodes, features))
                .sum::<f64>()
    }
}

/// Follow one tree from the root to a leaf. Indices were checked at load time.
fn walk(nodes: &[TreeNode], features: &[f64]) -> f64 {
    let mut idx = 0;
    loop {
        match &nodes[idx] {
            TreeNode::Leaf { leaf } => return *leaf,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                idx = if features[*feature] <= *threshold {
                    *left
                } else {
                    *right
                };
            }
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Predictor for TreePipeline {
    fn model_family(&self) -> &str {
        &self.artifact.model_family
    }

    fn predict_proba(&self, rows: &[FeatureRow]) -> Result<Vec<[f64; 2]>, PredictError> {
        rows.iter()
            .map(|row| {
                let features = self.encode(row)?;
                let p = sigmoid(self.raw_score(&features));
                Ok([1.0 - p, p])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PredictionRequest, RawInputs};
    use crate::ports::FeatureValue;

    fn shipped_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join(MODEL_RELATIVE_PATH)
    }

    fn small_artifact() -> String {
        r#"{
            "format": "churnguard-pipeline",
            "version": 1,
            "model_family": "TestBoost",
            "columns": [
                { "name": "tenure", "kind": "numeric" },
                { "name": "Contract", "kind": "categorical", "categories": ["Month-to-month", "One year"] }
            ],
            "base_score": 0.0,
            "trees": [[
                { "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
                { "leaf": -1.0 },
                { "leaf": 1.0 }
            ]]
        }"#
        .to_string()
    }

    fn row(tenure: i64, contract: &str) -> FeatureRow {
        FeatureRow::new()
            .with("tenure", FeatureValue::Int(tenure))
            .with("Contract", FeatureValue::Str(contract.to_string()))
    }

    #[test]
    fn test_one_hot_routing() {
        let pipeline = TreePipeline::from_slice(small_artifact().as_bytes()).expect("Should load");
        assert_eq!(pipeline.model_family(), "TestBoost");

        let out = pipeline
            .predict_proba(&[row(5, "Month-to-month"), row(5, "One year")])
            .expect("Should predict");
        assert_eq!(out.len(), 2);
        // Month-to-month: one-hot [1, 0] -> feature 1 = 0 -> left leaf
        assert!((out[0][1] - sigmoid(1.0)).abs() < 1e-12);
        assert!((out[1][1] - sigmoid(-1.0)).abs() < 1e-12);
        assert!((out[0][0] + out[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let pipeline = TreePipeline::from_slice(small_artifact().as_bytes()).expect("Should load");
        let partial = FeatureRow::new().with("tenure", FeatureValue::Int(3));
        let err = pipeline.predict_proba(&[partial]).unwrap_err();
        assert!(matches!(err, PredictError::SchemaMismatch(_)));
    }

    #[test]
    fn test_unknown_category_and_wrong_type() {
        let pipeline = TreePipeline::from_slice(small_artifact().as_bytes()).expect("Should load");
        assert!(matches!(
            pipeline.predict_proba(&[row(3, "Two year")]),
            Err(PredictError::SchemaMismatch(_))
        ));

        let wrong = FeatureRow::new()
            .with("tenure", FeatureValue::Str("ten".into()))
            .with("Contract", FeatureValue::Str("One year".into()));
        assert!(matches!(
            pipeline.predict_proba(&[wrong]),
            Err(PredictError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_rejects_bad_version_and_format() {
        let bad_version = small_artifact().replace("\"version\": 1", "\"version\": 2");
        assert!(matches!(
            TreePipeline::from_slice(bad_version.as_bytes()),
            Err(ChurnError::ModelLoad(_))
        ));

        let bad_format = small_artifact().replace("churnguard-pipeline", "pickle");
        assert!(TreePipeline::from_slice(bad_format.as_bytes()).is_err());

        assert!(TreePipeline::from_slice(b"not json").is_err());
    }

    #[test]
    fn test_rejects_bad_tree_structure() {
        // feature index past the encoded width (1 numeric + 2 one-hot = 3)
        let bad_feature = small_artifact().replace("\"feature\": 1", "\"feature\": 3");
        assert!(TreePipeline::from_slice(bad_feature.as_bytes()).is_err());

        // child pointing back at the root would loop
        let cycle = small_artifact().replace("\"left\": 1", "\"left\": 0");
        assert!(TreePipeline::from_slice(cycle.as_bytes()).is_err());

        let dangling = small_artifact().replace("\"right\": 2", "\"right\": 7");
        assert!(TreePipeline::from_slice(dangling.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_categories() {
        let dup = small_artifact().replace("\"One year\"]", "\"Month-to-month\"]");
        assert!(TreePipeline::from_slice(dup.as_bytes()).is_err());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = TreePipeline::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ChurnError::ModelLoad(_)));
    }

    #[test]
    fn test_checksum_enforced_when_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.json");
        let body = small_artifact();
        fs::write(&path, &body).expect("write artifact");

        // no sidecar: loads
        assert!(TreePipeline::load(&path).is_ok());

        fs::write(checksum_path(&path), format!("{}  model.json\n", sha256_hex(body.as_bytes())))
            .expect("write sidecar");
        assert!(TreePipeline::load(&path).is_ok());

        fs::write(checksum_path(&path), "00".repeat(32)).expect("write sidecar");
        assert!(matches!(
            TreePipeline::load(&path),
            Err(ChurnError::ModelLoad(msg)) if msg.contains("Checksum mismatch")
        ));
    }

    #[test]
    fn test_shipped_artifact_scores_default_customer() {
        let pipeline = TreePipeline::load(&shipped_path()).expect("Shipped model should load");
        assert_eq!(pipeline.model_family(), "LightGBM");

        let req = PredictionRequest::try_from(RawInputs::default()).expect("valid defaults");
        let out = pipeline
            .predict_proba(&[FeatureRow::from(&req)])
            .expect("Should predict");
        let p = out[0][1];

        // base -1.02, leaves 0.25 + 0.40 + 0.05 + 0.05
        assert!((p - sigmoid(-0.27)).abs() < 1e-9);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_resolve_model_path() {
        assert_eq!(
            resolve_model_path(Some("/srv/model.json"), None),
            PathBuf::from("/srv/model.json")
        );
        assert_eq!(
            resolve_model_path(Some("  "), None),
            PathBuf::from(MODEL_RELATIVE_PATH)
        );

        let dir = tempfile::tempdir().expect("tempdir");
        let installed = dir.path().join(MODEL_RELATIVE_PATH);
        fs::create_dir_all(installed.parent().expect("parent")).expect("mkdir");
        fs::write(&installed, small_artifact()).expect("write");
        let exe = dir.path().join("bin").join("churnguard");
        assert_eq!(resolve_model_path(None, Some(exe.as_path())), installed);

        let elsewhere = tempfile::tempdir().expect("tempdir");
        let exe = elsewhere.path().join("bin").join("churnguard");
        assert_eq!(
            resolve_model_path(None, Some(exe.as_path())),
            PathBuf::from(MODEL_RELATIVE_PATH)
        );
    }
}
