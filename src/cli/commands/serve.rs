//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for recommendations and taste profiling. Requests
//! are stateless: each query runs its own pipeline, no server-side session.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::engine::RecommendEngine;
use crate::generation::OpenAIGenerator;
use crate::metadata::EnrichedMovie;
use crate::profile::{Profiler, TasteProfile};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    engine: RecommendEngine,
    profiler: Option<Profiler>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'cinemind doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let index = super::load_index(&settings).await?;
    let engine = RecommendEngine::new(&settings, index)?;

    let profiler = if settings.profile.enabled {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        Some(Profiler::new(
            Arc::new(OpenAIGenerator::new(
                &settings.profile.model,
                settings.profile.temperature,
            )),
            prompts,
        ))
    } else {
        None
    };

    let state = Arc::new(AppState { engine, profiler });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/recommend", post(recommend))
        .route("/profile", post(profile))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("CineMind API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Recommend", "POST /recommend");
    Output::kv("Profile", "POST /profile");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Serialize)]
struct RecommendResponse {
    status: String,
    query: String,
    recommendations: String,
    /// True when the reply is a fallback message.
    failed: bool,
    movies: Vec<MovieCard>,
}

#[derive(Serialize)]
struct MovieCard {
    title: String,
    year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overview: Option<String>,
}

impl From<&EnrichedMovie> for MovieCard {
    fn from(movie: &EnrichedMovie) -> Self {
        Self {
            title: movie.title().to_string(),
            year: movie.year().to_string(),
            poster_url: movie.poster_url.clone(),
            rating: movie.rating,
            overview: movie.overview.clone(),
        }
    }
}

#[derive(Serialize)]
struct ProfileResponse {
    status: String,
    profile: TasteProfile,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    if req.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "query must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    // The pipeline never fails outright; fallbacks come back as displayable
    // turns with `failed` set.
    let turn = state.engine.respond(req.query.trim()).await;

    Json(RecommendResponse {
        status: "success".to_string(),
        query: req.query,
        recommendations: turn.text.clone(),
        failed: turn.failed,
        movies: turn.movies.iter().map(MovieCard::from).collect(),
    })
    .into_response()
}

async fn profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> impl IntoResponse {
    let Some(profiler) = &state.profiler else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "taste profiling is disabled".to_string(),
            }),
        )
            .into_response();
    };

    match profiler.profile(req.query.trim()).await {
        Ok(profile) => Json(ProfileResponse {
            status: "success".to_string(),
            profile,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}
