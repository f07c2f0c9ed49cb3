use crate::dtos::{PatientRecord, Prediction};
use crate::services::record_prediction;
use crate::startup::AppState;
use crate::utils::ValidatedJson;
use axum::{extract::State, Json};
use service_core::error::AppError;
use std::time::Instant;

/// Scores one patient record against the loaded model.
///
/// Ranges are checked by the extractor before anything reaches the model;
/// violations come back as 422 with per-field details.
#[tracing::instrument(skip_all, fields(revision = %P::REVISION))]
pub async fn predict<P: PatientRecord>(
    State(state): State<AppState>,
    ValidatedJson(patient): ValidatedJson<P>,
) -> Result<Json<P::Response>, AppError> {
    let row = patient.feature_row();

    let start = Instant::now();
    let label = state.model.predict(&row)?;
    let probability = state.model.positive_probability(&row)?;
    let elapsed = start.elapsed();

    let prediction = Prediction::new(label, probability);
    record_prediction(P::REVISION, prediction.risk, elapsed);

    tracing::info!(
        label,
        probability,
        risk = prediction.risk.as_str(),
        "Prediction served"
    );

    Ok(Json(patient.into_response(prediction)))
}
