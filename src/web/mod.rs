use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    city::City,
    config::{CityConfig, ConfigError, GeneratorSettings, LayoutMode},
    export::{city_mesh, CitySummary},
    pipeline::generate,
};

/// Largest grid a single request may ask for.
pub const MAX_REQUEST_GRID_SIZE: i64 = 1_000;

pub struct WebServerConfig {
    pub base: CityConfig,
    pub host: String,
    pub port: u16,
}

struct AppState {
    base: CityConfig,
}

/// Per-request overrides of the server's base configuration.
#[derive(Debug, Default, Deserialize)]
pub struct CityQuery {
    pub seed: Option<u32>,
    pub population: Option<i64>,
    pub grid_size: Option<i64>,
    pub city_radius: Option<f64>,
    pub layout: Option<String>,
    pub hospitals: Option<i64>,
    pub schools: Option<i64>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl CityQuery {
    pub fn apply(&self, base: &CityConfig) -> Result<GeneratorSettings, ApiError> {
        let mut config = base.clone();
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(population) = self.population {
            config.population = population;
        }
        if let Some(grid_size) = self.grid_size {
            if grid_size > MAX_REQUEST_GRID_SIZE {
                return Err(ApiError::BadRequest(format!(
                    "grid_size {grid_size} exceeds {MAX_REQUEST_GRID_SIZE}"
                )));
            }
            config.grid_size = grid_size;
        }
        if let Some(city_radius) = self.city_radius {
            config.city_radius = city_radius;
        }
        if let Some(layout) = &self.layout {
            config.layout = layout.parse::<LayoutMode>()?;
        }
        if let Some(hospitals) = self.hospitals {
            config.hospitals = hospitals;
        }
        if let Some(schools) = self.schools {
            config.schools = schools;
        }
        Ok(config.normalize())
    }
}

pub fn router(base: CityConfig) -> Router {
    Router::new()
        .route("/api/city", get(city_json))
        .route("/api/summary", get(summary_json))
        .route("/api/city.obj", get(city_obj))
        .with_state(Arc::new(AppState { base }))
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig { base, host, port } = config;
    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    info!(%host, port, "city server listening");

    axum::serve(listener, router(base))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down city server");
}

async fn generate_for(state: &AppState, query: &CityQuery) -> Result<City, ApiError> {
    let settings = query.apply(&state.base)?;
    tokio::task::spawn_blocking(move || generate(&settings))
        .await
        .map_err(|err| {
            error!(error = %err, "generation task failed");
            ApiError::Internal("generation failed".to_string())
        })
}

async fn city_json(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<City>, ApiError> {
    Ok(Json(generate_for(&state, &query).await?))
}

async fn summary_json(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Json<CitySummary>, ApiError> {
    let city = generate_for(&state, &query).await?;
    Ok(Json(CitySummary::from_city(&city)))
}

async fn city_obj(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CityQuery>,
) -> Result<Response, ApiError> {
    let city = generate_for(&state, &query).await?;
    let mut buffer = Vec::new();
    city_mesh(&city)
        .write_to(&mut buffer)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Bytes::from(buffer),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_overrides_base() {
        let base = CityConfig::default();
        let query = CityQuery {
            seed: Some(42),
            grid_size: Some(60),
            layout: Some("Radial".to_string()),
            ..CityQuery::default()
        };
        let settings = query.apply(&base).unwrap();
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.grid_size, 60);
        assert_eq!(settings.layout, LayoutMode::Radial);
        assert_eq!(settings.population, 100_000);
    }

    #[test]
    fn test_query_rejects_bad_values() {
        let base = CityConfig::default();
        let layout = CityQuery {
            layout: Some("spiral".to_string()),
            ..CityQuery::default()
        };
        assert!(matches!(layout.apply(&base), Err(ApiError::BadRequest(_))));

        let huge = CityQuery {
            grid_size: Some(MAX_REQUEST_GRID_SIZE + 1),
            ..CityQuery::default()
        };
        assert!(matches!(huge.apply(&base), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_empty_query_normalizes_base() {
        let base = CityConfig {
            population: -10,
            ..CityConfig::default()
        };
        let settings = CityQuery::default().apply(&base).unwrap();
        assert_eq!(settings, base.normalize());
        assert_eq!(settings.population, 0);
    }
}
