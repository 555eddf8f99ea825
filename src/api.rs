//! HTTP routes for the feedback dashboard.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::clock::Clock;
use crate::error::AppError;
use crate::models::{FeedbackSummary, WeekBucket};
use crate::report;
use crate::store::FeedbackStore;
use crate::weekly;

/// Everything a handler needs, built once at startup.
pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn FeedbackStore>, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self { store, clock })
    }
}

pub fn build_router(state: Arc<AppState>, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let feedback_routes = Router::new()
        .route("/total", get(total_handler))
        .route("/summary", get(summary_handler))
        .route("/chart-data", get(chart_data_handler));

    Router::new()
        .nest("/api/feedbacks", feedback_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /api/feedbacks/total
pub async fn total_handler(State(state): State<Arc<AppState>>) -> Result<Json<i64>, AppError> {
    let total = state.store.count_total().await?;
    Ok(Json(total))
}

/// GET /api/feedbacks/summary
pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FeedbackSummary>, AppError> {
    let summary = report::summarize_by_type(state.store.as_ref()).await?;
    Ok(Json(summary))
}

/// GET /api/feedbacks/chart-data
pub async fn chart_data_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<WeekBucket>>, AppError> {
    let (start, end) = weekly::chart_window(state.clock.today());
    let buckets = weekly::weekly_breakdown(state.store.as_ref(), start, end).await?;
    Ok(Json(buckets))
}
