//! JSON regression pipeline: optional standard scaler followed by a linear
//! model or a tree ensemble.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AqiPredictor;
use crate::AirqError;
use crate::models::{FEATURE_COUNT, FeatureVector, Pollutant};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionPipeline {
    /// Column names the model was trained on, checked against the feature order
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub regressor: Regressor,
}

/// `(x - mean) / scale` per feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    TreeEnsemble {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<Tree>,
    },
}

/// How tree outputs are combined: averaged (random forest) or summed (boosting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
}

/// Decision tree stored as a flat node list; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf {
        leaf: f64,
    },
    /// Go to `left` when `x[feature] <= threshold`, otherwise `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

impl RegressionPipeline {
    /// Read and validate a pipeline artifact
    pub async fn from_file(path: &Path) -> Result<Self, AirqError> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            AirqError::model_unavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, AirqError> {
        let pipeline: Self = serde_json::from_str(text)
            .map_err(|e| AirqError::model_unavailable(format!("corrupt model artifact: {e}")))?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Check the artifact against the fixed feature contract
    pub fn validate(&self) -> Result<(), AirqError> {
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(AirqError::model_unavailable(format!(
                "pipeline lists {} feature names, expected {FEATURE_COUNT}",
                self.feature_names.len()
            )));
        }
        for (name, expected) in self.feature_names.iter().zip(Pollutant::ALL) {
            if Pollutant::from_label(name) != Some(expected) {
                return Err(AirqError::model_unavailable(format!(
                    "feature order mismatch: expected {expected} at position {}, found '{name}'",
                    expected.index()
                )));
            }
        }

        if let Some(scaler) = &self.scaler {
            check_len("scaler mean", &scaler.mean)?;
            check_len("scaler scale", &scaler.scale)?;
            if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
                return Err(AirqError::model_unavailable(
                    "scaler scale entries must be finite and non-zero",
                ));
            }
        }

        match &self.regressor {
            Regressor::Linear {
                coefficients,
                intercept,
            } => {
                check_len("coefficients", coefficients)?;
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(AirqError::model_unavailable(
                        "linear model parameters must be finite",
                    ));
                }
            }
            Regressor::TreeEnsemble { trees, .. } => {
                if trees.is_empty() {
                    return Err(AirqError::model_unavailable("tree ensemble has no trees"));
                }
                for (index, tree) in trees.iter().enumerate() {
                    tree.validate().map_err(|message| {
                        AirqError::model_unavailable(format!("tree {index}: {message}"))
                    })?;
                }
            }
        }

        Ok(())
    }

    fn transform(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut x = *features.values();
        if let Some(scaler) = &self.scaler {
            for (i, value) in x.iter_mut().enumerate() {
                *value = (*value - scaler.mean[i]) / scaler.scale[i];
            }
        }
        x
    }
}

impl AqiPredictor for RegressionPipeline {
    fn predict(&self, features: &FeatureVector) -> Result<f64, AirqError> {
        if let Some(bad) = features.values().iter().find(|v| !v.is_finite()) {
            return Err(AirqError::inference(format!(
                "feature vector contains a non-finite value ({bad})"
            )));
        }

        let x = self.transform(features);
        let output = match &self.regressor {
            Regressor::Linear {
                coefficients,
                intercept,
            } => intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>(),
            Regressor::TreeEnsemble {
                aggregation,
                base_score,
                trees,
            } => {
                let total: f64 = trees.iter().map(|tree| tree.evaluate(&x)).sum();
                match aggregation {
                    Aggregation::Mean => base_score + total / trees.len() as f64,
                    Aggregation::Sum => base_score + total,
                }
            }
        };

        if output.is_finite() {
            Ok(output)
        } else {
            Err(AirqError::inference("model produced a non-finite value"))
        }
    }

    fn describe(&self) -> String {
        let scaled = if self.scaler.is_some() { "scaled " } else { "" };
        match &self.regressor {
            Regressor::Linear { .. } => format!("{scaled}linear regression"),
            Regressor::TreeEnsemble {
                aggregation, trees, ..
            } => format!(
                "{scaled}tree ensemble ({} trees, {:?} aggregation)",
                trees.len(),
                aggregation
            ),
        }
    }
}

impl Tree {
    /// Children must point forward, which rules out cycles
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { leaf } if !leaf.is_finite() => {
                    return Err(format!("node {index} has a non-finite leaf"));
                }
                TreeNode::Leaf { .. } => {}
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(format!("node {index} splits on unknown feature {feature}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {index} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

fn check_len(name: &str, values: &[f64]) -> Result<(), AirqError> {
    if values.len() == FEATURE_COUNT {
        Ok(())
    } else {
        Err(AirqError::model_unavailable(format!(
            "{name} has {} entries, expected {FEATURE_COUNT}",
            values.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINEAR: &str = r#"{
        "feature_names": ["PM2.5", "PM10", "NO2", "SO2", "CO", "O3"],
        "regressor": {"kind": "linear", "coefficients": [1.0, 0.5, 0.2, 0.1, 10.0, 0.3], "intercept": 2.0}
    }"#;

    fn features() -> FeatureVector {
        FeatureVector::new([35.0, 45.0, 25.0, 10.0, 1.5, 30.0])
    }

    #[test]
    fn test_linear_prediction() {
        let pipeline = RegressionPipeline::from_json(LINEAR).unwrap();
        // 2 + 35 + 22.5 + 5 + 1 + 15 + 9
        let aqi = pipeline.predict(&features()).unwrap();
        assert!((aqi - 89.5).abs() < 1e-9);
        assert_eq!(pipeline.describe(), "linear regression");
    }

    #[test]
    fn test_scaler_applied_before_regressor() {
        let json = r#"{
            "feature_names": ["pm2_5", "pm10", "no2", "so2", "co", "o3"],
            "scaler": {"mean": [35.0, 45.0, 25.0, 10.0, 1.5, 30.0], "scale": [1, 1, 1, 1, 1, 1]},
            "regressor": {"kind": "linear", "coefficients": [1, 1, 1, 1, 1, 1], "intercept": 42.0}
        }"#;
        let pipeline = RegressionPipeline::from_json(json).unwrap();
        assert_eq!(pipeline.predict(&features()).unwrap(), 42.0);
    }

    #[test]
    fn test_tree_ensemble_mean() {
        let json = r#"{
            "feature_names": ["PM2.5", "PM10", "NO2", "SO2", "CO", "O3"],
            "regressor": {
                "kind": "tree_ensemble",
                "trees": [
                    {"nodes": [
                        {"feature": 0, "threshold": 50.0, "left": 1, "right": 2},
                        {"leaf": 40.0},
                        {"leaf": 120.0}
                    ]},
                    {"nodes": [
                        {"feature": 4, "threshold": 1.0, "left": 1, "right": 2},
                        {"leaf": 30.0},
                        {"leaf": 60.0}
                    ]}
                ]
            }
        }"#;
        let pipeline = RegressionPipeline::from_json(json).unwrap();
        // tree 1 -> 40 (35 <= 50), tree 2 -> 60 (1.5 > 1.0)
        assert_eq!(pipeline.predict(&features()).unwrap(), 50.0);
        assert!(pipeline.describe().contains("2 trees"));
    }

    #[test]
    fn test_rejects_reordered_features() {
        let json = LINEAR.replace(
            r#"["PM2.5", "PM10", "NO2", "SO2", "CO", "O3"]"#,
            r#"["PM10", "PM2.5", "NO2", "SO2", "CO", "O3"]"#,
        );
        let err = RegressionPipeline::from_json(&json).unwrap_err();
        assert!(matches!(err, AirqError::ModelUnavailable { .. }));
        assert!(err.to_string().contains("feature order mismatch"));
    }

    #[test]
    fn test_rejects_corrupt_artifact() {
        let err = RegressionPipeline::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("corrupt model artifact"));
    }

    #[test]
    fn test_rejects_cyclic_tree() {
        let json = r#"{
            "feature_names": ["PM2.5", "PM10", "NO2", "SO2", "CO", "O3"],
            "regressor": {"kind": "tree_ensemble", "trees": [
                {"nodes": [{"feature": 0, "threshold": 1.0, "left": 0, "right": 1}, {"leaf": 1.0}]}
            ]}
        }"#;
        let err = RegressionPipeline::from_json(json).unwrap_err();
        assert!(err.to_string().contains("invalid child 0"));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let json = r#"{
            "feature_names": ["PM2.5", "PM10", "NO2", "SO2", "CO", "O3"],
            "scaler": {"mean": [0, 0, 0, 0, 0, 0], "scale": [1, 1, 0, 1, 1, 1]},
            "regressor": {"kind": "linear", "coefficients": [1, 1, 1, 1, 1, 1], "intercept": 0}
        }"#;
        assert!(RegressionPipeline::from_json(json).is_err());
    }

    #[test]
    fn test_non_finite_features_fail_inference() {
        let pipeline = RegressionPipeline::from_json(LINEAR).unwrap();
        let err = pipeline
            .predict(&FeatureVector::new([f64::NAN, 1.0, 1.0, 1.0, 1.0, 1.0]))
            .unwrap_err();
        assert!(matches!(err, AirqError::Inference { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_model_unavailable() {
        let err = RegressionPipeline::from_file(Path::new("/nonexistent/model.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, AirqError::ModelUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_from_file_reads_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, LINEAR).unwrap();

        let pipeline = RegressionPipeline::from_file(&path).await.unwrap();
        assert_eq!(pipeline.describe(), "linear regression");
    }
}
