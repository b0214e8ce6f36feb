//! AQI prediction
//!
//! The estimator only knows the [`AqiPredictor`] trait: a six-element feature
//! vector in, one scalar out. [`pipeline::RegressionPipeline`] is the concrete
//! model, deserialized from a JSON artifact that [`artifact`] fetches and reads.

use std::sync::Arc;

use tracing::{error, info};

use crate::AirqError;
use crate::config::AirqConfig;
use crate::models::FeatureVector;

pub mod artifact;
pub mod pipeline;

pub use pipeline::RegressionPipeline;

/// A loaded, read-only regression model
pub trait AqiPredictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, AirqError>;

    /// Short description for logs and health output
    fn describe(&self) -> String {
        "opaque predictor".to_string()
    }
}

/// Shared handle to the process-wide predictor
pub type SharedPredictor = Arc<dyn AqiPredictor>;

/// Fetch the artifact if needed and load it.
///
/// A failure is logged and returned so the caller can keep serving without a
/// model; predictions then report the model as unavailable.
pub async fn load_predictor(config: &AirqConfig) -> Result<SharedPredictor, AirqError> {
    let result = async {
        let path = artifact::ensure_local(config).await?;
        let pipeline = RegressionPipeline::from_file(&path).await?;
        info!(
            "Loaded model from {}: {}",
            path.display(),
            pipeline.describe()
        );
        Ok::<_, AirqError>(Arc::new(pipeline) as SharedPredictor)
    }
    .await;

    if let Err(e) = &result {
        error!("Model loading failed: {}", e);
    }
    result
}
