// Axum API Server Module
//
// Purpose: HTTP surface over the disease, crop and weather pipelines.
// Handlers stay thin: extract, call the pipeline, map errors to status codes.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::error::{DiagnosisError, ModelError, ValidationError, WeatherError};
use crate::labels::{AdvisoryTable, LabelTable};
use crate::models::ModelRegistry;
use crate::pipeline::{self, CropRecommendation, DiseaseDiagnosis, FeatureVector};
use crate::weather::{self, OpenWeatherClient, WeatherReport, WeatherSource, DEFAULT_LOCATION};

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub weather: Arc<dyn WeatherSource>,
    pub disease_labels: LabelTable,
    pub crop_labels: LabelTable,
    pub advisories: Arc<AdvisoryTable>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Load the eager artifacts and build the weather client.
    pub async fn new(config: &ServiceConfig) -> anyhow::Result<Self> {
        tracing::info!("Loading crop model and scaler...");
        let registry = ModelRegistry::from_artifacts(
            &config.disease_model_path,
            &config.crop_model_path,
            &config.scaler_path,
        )?;
        tracing::info!(
            "Disease model will be loaded on first request from {:?}",
            config.disease_model_path
        );

        tracing::info!("Initializing weather client ({})...", config.weather_base_url);
        let weather = OpenWeatherClient::new(
            config.weather_base_url.clone(),
            config.openweather_api_key.clone(),
            config.weather_timeout,
        )?;

        Ok(Self::from_parts(
            Arc::new(registry),
            Arc::new(weather),
            config.max_upload_bytes,
        ))
    }

    pub fn from_parts(
        registry: Arc<ModelRegistry>,
        weather: Arc<dyn WeatherSource>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            registry,
            weather,
            disease_labels: LabelTable::diseases(),
            crop_labels: LabelTable::crops(),
            advisories: Arc::new(AdvisoryTable::plant_village()),
            max_upload_bytes,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        // Liveness
        .route("/", get(home))
        .route("/health", get(health_check))

        // Weather proxy
        .route("/api/weather_full", get(weather_full))

        // Prediction endpoints
        .route("/api/detect_disease", post(detect_disease))
        .route("/api/recommend_crop", post(recommend_crop))

        // Middleware (applied in reverse order)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

async fn home() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Smart Agro API is live!"
    }))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[derive(Debug, Deserialize)]
struct WeatherQuery {
    location: Option<String>,
}

async fn weather_full(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, AppError> {
    let location = query.location.unwrap_or_else(|| DEFAULT_LOCATION.to_string());

    let current = state.weather.current(&location).await.map_err(AppError::weather)?;
    let forecast = state.weather.forecast(&location).await.map_err(AppError::weather)?;

    let report = weather::aggregate(&location, current, &forecast).map_err(AppError::weather)?;
    tracing::debug!(
        "Weather for {}: {} hourly, {} daily",
        location,
        report.hourly.len(),
        report.daily.len()
    );

    Ok(Json(report))
}

async fn detect_disease(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DiseaseDiagnosis>, AppError> {
    let Ok(mut multipart) = multipart else {
        return Err(ValidationError::NoImage.into());
    };

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart upload: {}", e)))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid multipart upload: {}", e)))?;
            image = Some(bytes);
            break;
        }
    }

    let image = match image {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Err(ValidationError::NoImage.into()),
    };

    let classifier = state
        .registry
        .image_classifier()
        .await
        .map_err(|e| AppError::internal("Failed to load disease model", e))?;

    let labels = state.disease_labels;
    let advisories = Arc::clone(&state.advisories);
    let diagnosis = tokio::task::spawn_blocking(move || {
        pipeline::diagnose(classifier.as_ref(), &image, &labels, &advisories)
    })
    .await
    .map_err(|e| AppError::internal("Disease detection failed", e))??;

    Ok(Json(diagnosis))
}

async fn recommend_crop(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CropRecommendation>, AppError> {
    let features = FeatureVector::from_body(&body)?;

    let classifier = state.registry.tabular_classifier();
    let scaler = state.registry.scaler();
    let recommendation = pipeline::recommend(
        classifier.as_ref(),
        scaler.as_deref(),
        &features,
        &state.crop_labels,
    )
    .map_err(|e: ModelError| AppError::internal("Crop recommendation failed", e))?;

    Ok(Json(recommendation))
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Internal(String),
}

impl AppError {
    fn internal(context: &str, detail: impl std::fmt::Display) -> Self {
        let message = format!("{}: {}", context, detail);
        tracing::error!("{}", message);
        AppError::Internal(message)
    }

    fn weather(err: WeatherError) -> Self {
        let context = match err.endpoint() {
            Some("weather") => "Failed to fetch current weather",
            _ => "Failed to fetch forecast",
        };
        Self::internal(context, err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!("Rejected request: {}", err);
        AppError::BadRequest(err.to_string())
    }
}

impl From<DiagnosisError> for AppError {
    fn from(err: DiagnosisError) -> Self {
        match err {
            DiagnosisError::Validation(e) => e.into(),
            DiagnosisError::Decode(e) => AppError::internal("Disease detection failed", e),
            DiagnosisError::Model(e) => AppError::internal("Disease detection failed", e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
