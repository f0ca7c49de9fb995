//! Readmission service: the request-facing use case.
//!
//! Combines the feature builder, the shared dimension lookups and the
//! prediction service:
//! - `predict`: record -> feature vector -> probability + risk band
//! - `metadata`: known categorical labels
//! - `reload_dimensions`: rebuild lookups from the store

use std::sync::Arc;

use crate::application::dimensions::{
    DimensionCatalog, DimensionMapper, DimensionMetadata, LookupRegistry, ReloadReport,
};
use crate::application::feature_builder::FeatureVectorBuilder;
use crate::application::prediction::PredictionService;
use crate::domain::{FeatureVector, PatientRecord, ReadmissionPrediction};
use crate::ports::{Classifier, ClassifierInfo, ModelError, RelationalStore};
use crate::{ReadmitError, Result};

/// Service answering readmission risk requests.
pub struct ReadmissionService {
    builder: FeatureVectorBuilder,
    lookups: LookupRegistry,
    mapper: DimensionMapper<dyn RelationalStore>,
    catalog: DimensionCatalog,
    predictor: PredictionService<dyn Classifier>,
}

impl ReadmissionService {
    /// Load dimension lookups and bind the classifier.
    ///
    /// # Errors
    /// Returns error if the classifier's input width does not match the
    /// feature schema or any dimension table fails to load. Both are fatal
    /// at startup.
    pub fn initialize(
        classifier: Arc<dyn Classifier>,
        store: Arc<dyn RelationalStore>,
        builder: FeatureVectorBuilder,
        catalog: DimensionCatalog,
    ) -> Result<Self> {
        tracing::info!("Initializing readmission service...");

        let expected = builder.schema().len();
        if classifier.n_features() != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: classifier.n_features(),
            }
            .into());
        }

        let mapper = DimensionMapper::new(store);
        let lookups = LookupRegistry::new(mapper.load_all(&catalog)?);

        Ok(Self {
            builder,
            lookups,
            mapper,
            catalog,
            predictor: PredictionService::new(classifier),
        })
    }

    /// Feature vector for `record` against the current lookups.
    #[must_use]
    pub fn features(&self, record: &PatientRecord) -> FeatureVector {
        self.builder.build(record, &self.lookups.snapshot())
    }

    /// Estimate the readmission probability for one patient.
    ///
    /// # Errors
    /// Returns error only if the classifier fails; missing or unusable
    /// record fields fall back to defaults.
    pub fn predict(&self, record: &PatientRecord) -> Result<ReadmissionPrediction> {
        let features = self.features(record);
        let probability = self.predictor.predict(&features)?;
        let prediction = ReadmissionPrediction::new(probability);
        tracing::info!(
            probability = prediction.readmission_probability,
            risk = %prediction.risk_band,
            "Readmission prediction"
        );
        Ok(prediction)
    }

    #[must_use]
    pub fn metadata(&self) -> DimensionMetadata {
        DimensionMetadata::from(self.lookups.snapshot().as_ref())
    }

    /// Re-read every dimension table and swap the lookups in one step.
    ///
    /// # Errors
    /// Returns the store error; the previous lookups keep serving.
    pub fn reload_dimensions(&self) -> Result<ReloadReport> {
        self.lookups
            .reload(&self.mapper, &self.catalog)
            .map_err(|e| {
                tracing::warn!("Dimension reload failed, keeping previous lookups: {e}");
                ReadmitError::from(e)
            })
    }

    #[must_use]
    pub fn model_info(&self) -> ClassifierInfo {
        self.predictor.info()
    }
}
