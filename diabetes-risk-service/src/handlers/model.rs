use crate::models::SchemaRevision;
use crate::services::model::POSITIVE_LABEL;
use crate::startup::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub name: String,
    pub revision: SchemaRevision,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub positive_class: i64,
    pub positive_class_index: usize,
}

/// Describes the model currently served on `/predict`.
pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let model = &state.model;
    Json(ModelInfoResponse {
        name: model.name().to_string(),
        revision: state.revision,
        feature_names: model.feature_names().to_vec(),
        classes: model.classes().to_vec(),
        positive_class: POSITIVE_LABEL,
        positive_class_index: model.positive_class_index(),
    })
}
