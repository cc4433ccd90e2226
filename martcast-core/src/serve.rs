//! HTTP serving layer for single-record sales predictions.
//!
//! The model and pipeline state are loaded once at startup and shared
//! read-only across request handlers; a fit that overwrites the persisted
//! artifacts takes effect on the next process start, never mid-flight.

use crate::config::{AppConfig, ServingConfig};
use crate::data::RecordBatch;
use crate::error::CoreError;
use crate::model::forest::RandomForestRegressor;
use crate::pipeline::{ArtifactStore, PipelineState, apply};
use axum::{
    Json, Router,
    extract::State,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Immutable per-process serving state.
#[derive(Debug)]
pub struct AppState {
    model: RandomForestRegressor,
    pipeline_state: PipelineState,
    model_version: String,
}

impl AppState {
    pub fn new(model: RandomForestRegressor, pipeline_state: PipelineState) -> Self {
        Self {
            model,
            pipeline_state,
            model_version: "unversioned".to_string(),
        }
    }

    /// Load the fitted model and pipeline state for serving.
    ///
    /// Fails (and thereby refuses to start the server) when training has
    /// never run: the pipeline state loads with a missing-state error and
    /// the model file with a model error.
    pub fn load(config: &AppConfig, store: &dyn ArtifactStore) -> Result<Self, CoreError> {
        let pipeline_state = PipelineState::load(store)?;
        let model = RandomForestRegressor::load(&config.model_path())?;
        tracing::info!(
            version = %config.model.version,
            trees = model.n_trees(),
            features = pipeline_state.feature_columns.len(),
            "loaded serving state"
        );
        Ok(Self {
            model,
            pipeline_state,
            model_version: config.model.version.clone(),
        })
    }
}

/// Build the prediction router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_handler() -> &'static str {
    "martcast sales prediction API is running"
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model_version": state.model_version,
        "trees": state.model.n_trees(),
        "features": state.pipeline_state.feature_columns.len(),
    }))
}

/// Predict sales for one JSON record.
async fn predict_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let record = payload
        .as_object()
        .filter(|record| !record.is_empty())
        .ok_or_else(|| ApiError::BadRequest("expected a non-empty JSON object".to_string()))?;

    let batch = RecordBatch::from_record(record);
    let matrix = apply(&batch, &state.pipeline_state)?;
    let predictions = state.model.predict(&matrix)?;
    let predicted = predictions
        .first()
        .copied()
        .ok_or_else(|| ApiError::Core(CoreError::model("prediction produced no rows")))?;

    tracing::info!(predicted, "served prediction");
    Ok(Json(json!({ "predicted_sales": predicted })))
}

/// Run the server until cancelled.
pub async fn run(config: &ServingConfig, state: Arc<AppState>) -> Result<(), CoreError> {
    let app = router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "serving sales predictions");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Boundary error: every pipeline failure maps to a status code and a stable
/// machine-readable category, never a raw internal fault string.
enum ApiError {
    BadRequest(String),
    Core(CoreError),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, category, message) = match self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "bad_request", message)
            }
            Self::Core(err) => {
                let status = match &err {
                    CoreError::InputSchema(_) | CoreError::Imputation(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::warn!(category = err.category(), error = %err, "prediction failed");
                (status, err.category(), err.to_string())
            }
        };
        (
            status,
            Json(json!({ "error": category, "message": message })),
        )
            .into_response()
    }
}
