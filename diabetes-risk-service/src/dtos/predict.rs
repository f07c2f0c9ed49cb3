//! `/predict` request and response bodies for each schema revision.

use crate::models::{body_mass_index, BmiCategory, FeatureRow, RiskLevel, SchemaRevision};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::Validate;

/// Indicators shared by every revision with identical ranges.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct HealthIndicators {
    #[serde(rename = "GenHlth")]
    #[validate(range(min = 1, max = 5, message = "GenHlth must be between 1 and 5"))]
    pub gen_hlth: i64,

    #[serde(rename = "MentHlth")]
    #[validate(range(min = 0, max = 30, message = "MentHlth must be between 0 and 30"))]
    pub ment_hlth: i64,

    #[serde(rename = "PhysHlth")]
    #[validate(range(min = 0, max = 30, message = "PhysHlth must be between 0 and 30"))]
    pub phys_hlth: i64,

    #[serde(rename = "HighBP")]
    #[validate(range(min = 0, max = 1, message = "HighBP must be 0 or 1"))]
    pub high_bp: i64,

    #[serde(rename = "DiffWalk")]
    #[validate(range(min = 0, max = 1, message = "DiffWalk must be 0 or 1"))]
    pub diff_walk: i64,

    #[serde(rename = "HighChol")]
    #[validate(range(min = 0, max = 1, message = "HighChol must be 0 or 1"))]
    pub high_chol: i64,

    #[serde(rename = "HeartDiseaseorAttack")]
    #[validate(range(min = 0, max = 1, message = "HeartDiseaseorAttack must be 0 or 1"))]
    pub heart_disease_or_attack: i64,

    #[serde(rename = "Stroke")]
    #[validate(range(min = 0, max = 1, message = "Stroke must be 0 or 1"))]
    pub stroke: i64,

    #[serde(rename = "PhysActivity")]
    #[validate(range(min = 0, max = 1, message = "PhysActivity must be 0 or 1"))]
    pub phys_activity: i64,

    #[serde(rename = "HvyAlcoholConsump")]
    #[validate(range(min = 0, max = 1, message = "HvyAlcoholConsump must be 0 or 1"))]
    pub hvy_alcohol_consump: i64,

    #[serde(rename = "CholCheck")]
    #[validate(range(min = 0, max = 1, message = "CholCheck must be 0 or 1"))]
    pub chol_check: i64,

    #[serde(rename = "Smoker")]
    #[validate(range(min = 0, max = 1, message = "Smoker must be 0 or 1"))]
    pub smoker: i64,
}

impl HealthIndicators {
    fn feature_row(&self) -> FeatureRow {
        FeatureRow::new()
            .with("GenHlth", self.gen_hlth as f64)
            .with("MentHlth", self.ment_hlth as f64)
            .with("HighBP", self.high_bp as f64)
            .with("DiffWalk", self.diff_walk as f64)
            .with("HighChol", self.high_chol as f64)
            .with("HeartDiseaseorAttack", self.heart_disease_or_attack as f64)
            .with("PhysHlth", self.phys_hlth as f64)
            .with("Stroke", self.stroke as f64)
            .with("PhysActivity", self.phys_activity as f64)
            .with("HvyAlcoholConsump", self.hvy_alcohol_consump as f64)
            .with("CholCheck", self.chol_check as f64)
            .with("Smoker", self.smoker as f64)
    }
}

/// Model output after positive-class extraction and thresholding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: i64,
    pub probability: f64,
    pub risk: RiskLevel,
}

impl Prediction {
    pub fn new(label: i64, probability: f64) -> Self {
        Self {
            label,
            probability,
            risk: RiskLevel::from_probability(probability),
        }
    }
}

/// A patient payload accepted on `/predict` for one schema revision.
pub trait PatientRecord: DeserializeOwned + Validate + Send + 'static {
    const REVISION: SchemaRevision;

    type Response: Serialize + Send;

    /// One row holding exactly the columns of [`Self::REVISION`].
    fn feature_row(&self) -> FeatureRow;

    fn into_response(self, prediction: Prediction) -> Self::Response;
}

/// Revision 1: BMI supplied by the caller.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PatientV1 {
    #[serde(flatten)]
    #[validate(nested)]
    pub indicators: HealthIndicators,

    #[serde(rename = "BMI")]
    pub bmi: f64,

    #[serde(rename = "Age")]
    #[validate(range(min = 1, max = 13, message = "Age must be between 1 and 13"))]
    pub age: i64,

    #[serde(rename = "Income")]
    #[validate(range(min = 1, max = 8, message = "Income must be between 1 and 8"))]
    pub income: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionV1 {
    pub prediction: i64,
    pub score: f64,
}

impl PatientRecord for PatientV1 {
    const REVISION: SchemaRevision = SchemaRevision::V1;
    type Response = PredictionV1;

    fn feature_row(&self) -> FeatureRow {
        self.indicators
            .feature_row()
            .with("BMI", self.bmi)
            .with("Age", self.age as f64)
            .with("Income", self.income as f64)
    }

    fn into_response(self, prediction: Prediction) -> PredictionV1 {
        PredictionV1 {
            prediction: prediction.label,
            score: prediction.probability,
        }
    }
}

/// Revision 2: weight and height supplied, BMI derived.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PatientV2 {
    #[serde(flatten)]
    #[validate(nested)]
    pub indicators: HealthIndicators,

    /// Weight in kilograms.
    #[serde(rename = "Peso")]
    #[validate(range(exclusive_min = 0.0, message = "Peso must be positive"))]
    pub peso: f64,

    /// Height in centimetres.
    #[serde(rename = "Altura")]
    #[validate(range(exclusive_min = 0.0, message = "Altura must be positive"))]
    pub altura: f64,

    #[serde(rename = "Age")]
    #[validate(range(min = 1, max = 13, message = "Age must be between 1 and 13"))]
    pub age: i64,

    #[serde(rename = "Income")]
    #[validate(range(min = 1, max = 8, message = "Income must be between 1 and 8"))]
    pub income: i64,
}

impl PatientV2 {
    pub fn bmi(&self) -> f64 {
        body_mass_index(self.peso, self.altura)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionV2 {
    pub imc: f64,
    pub categoria_imc: BmiCategory,
    pub riesgo_diabetes: RiskLevel,
    pub prediccion: i64,
    pub probabilidad: f64,
}

impl PatientRecord for PatientV2 {
    const REVISION: SchemaRevision = SchemaRevision::V2;
    type Response = PredictionV2;

    fn feature_row(&self) -> FeatureRow {
        self.indicators
            .feature_row()
            .with("BMI", self.bmi())
            .with("Age", self.age as f64)
            .with("Income", self.income as f64)
    }

    fn into_response(self, prediction: Prediction) -> PredictionV2 {
        let imc = self.bmi();
        PredictionV2 {
            imc,
            categoria_imc: BmiCategory::from_bmi(imc),
            riesgo_diabetes: prediction.risk,
            prediccion: prediction.label,
            probabilidad: prediction.probability,
        }
    }
}

/// Revision 3: revision 2 plus `Education` and wider `Age`/`Income` codes.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PatientV3 {
    #[serde(flatten)]
    #[validate(nested)]
    pub indicators: HealthIndicators,

    #[serde(rename = "Peso")]
    #[validate(range(exclusive_min = 0.0, message = "Peso must be positive"))]
    pub peso: f64,

    #[serde(rename = "Altura")]
    #[validate(range(exclusive_min = 0.0, message = "Altura must be positive"))]
    pub altura: f64,

    #[serde(rename = "Age")]
    #[validate(range(min = 1, max = 14, message = "Age must be between 1 and 14"))]
    pub age: i64,

    #[serde(rename = "Education")]
    #[validate(range(min = 1, max = 6, message = "Education must be between 1 and 6"))]
    pub education: i64,

    #[serde(rename = "Income")]
    #[validate(range(min = 1, max = 11, message = "Income must be between 1 and 11"))]
    pub income: i64,
}

impl PatientV3 {
    pub fn bmi(&self) -> f64 {
        body_mass_index(self.peso, self.altura)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionV3 {
    pub imc: f64,
    pub riesgo_diabetes: RiskLevel,
    pub prediccion: i64,
    pub probabilidad: f64,
}

impl PatientRecord for PatientV3 {
    const REVISION: SchemaRevision = SchemaRevision::V3;
    type Response = PredictionV3;

    fn feature_row(&self) -> FeatureRow {
        self.indicators
            .feature_row()
            .with("BMI", self.bmi())
            .with("Age", self.age as f64)
            .with("Education", self.education as f64)
            .with("Income", self.income as f64)
    }

    fn into_response(self, prediction: Prediction) -> PredictionV3 {
        PredictionV3 {
            imc: self.bmi(),
            riesgo_diabetes: prediction.risk,
            prediccion: prediction.label,
            probabilidad: prediction.probability,
        }
    }
}
