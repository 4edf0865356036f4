//! Local stand-in for the crowdscan ingest API.
//!
//! This module provides an HTTP server that:
//! - Accepts crowd readings via POST /api/crowd-data
//! - Serves the latest reading per gate via GET /api/heatmap
//! - Serves risk tier counts via GET /api/risk-stats
//!
//! Readings live in memory only. A forced status can be configured so the
//! emitter's failure path can be exercised against a real socket.

use crate::core::{CrowdReading, RiskCounts, RiskLevel};
use crate::gates::{catalog, Location};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

/// Readings kept per gate.
const HISTORY_DEPTH: usize = 3;

/// Sink configuration
#[derive(Debug, Clone, Default)]
pub struct SinkConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Answer every ingest with this status instead of storing it
    pub respond_with: Option<u16>,
}

impl SinkConfig {
    /// Create a new sink configuration
    pub fn new(port: u16) -> Self {
        Self {
            port,
            respond_with: None,
        }
    }

    /// Force every ingest to be answered with `status`.
    pub fn respond_with(mut self, status: u16) -> Self {
        self.respond_with = Some(status);
        self
    }
}

/// A reading as stored by the sink.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReading {
    pub location_id: String,
    pub gate_id: String,
    pub density: f64,
    pub timestamp: DateTime<Utc>,
}

type GateKey = (String, String);

/// Shared sink state
pub struct SinkState {
    /// Recent readings per gate, newest first
    readings: RwLock<BTreeMap<GateKey, VecDeque<StoredReading>>>,
    /// Forced ingest status
    respond_with: Option<StatusCode>,
}

impl SinkState {
    fn new(respond_with: Option<StatusCode>) -> Self {
        Self {
            readings: RwLock::new(BTreeMap::new()),
            respond_with,
        }
    }

    async fn store(&self, reading: CrowdReading) {
        let key = (reading.location_id.clone(), reading.gate_id.clone());
        let stored = StoredReading {
            location_id: reading.location_id,
            gate_id: reading.gate_id,
            density: reading.density,
            timestamp: Utc::now(),
        };

        let mut readings = self.readings.write().await;
        let history = readings.entry(key).or_default();
        history.push_front(stored);
        history.truncate(HISTORY_DEPTH);
    }
}

/// Message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Risk statistics response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskStatsResponse {
    pub summary: RiskCounts,
    pub risk_distribution: BTreeMap<&'static str, String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Only JSON bodies are read; anything else counts as an empty body.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

/// Pull a reading out of an untyped body, requiring all three fields.
fn parse_reading(body: &[u8]) -> Option<CrowdReading> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let location_id = value.get("locationId")?.as_str().filter(|s| !s.is_empty())?;
    let gate_id = value.get("gateId")?.as_str().filter(|s| !s.is_empty())?;
    let density = value.get("density")?.as_f64()?;

    Some(CrowdReading {
        location_id: location_id.to_string(),
        gate_id: gate_id.to_string(),
        density,
    })
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/crowd-data
async fn ingest(
    State(state): State<Arc<SinkState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if let Some(status) = state.respond_with {
        return Err(api_error(status, "Forced response"));
    }

    let reading = Some(&body)
        .filter(|_| is_json(&headers))
        .and_then(|body| parse_reading(body))
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "locationId, gateId and density are required",
            )
        })?;

    tracing::debug!(
        location = %reading.location_id,
        gate = %reading.gate_id,
        density = reading.density,
        "reading stored"
    );
    state.store(reading).await;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Crowd data recorded".to_string(),
        }),
    ))
}

/// GET /api/heatmap
///
/// Latest reading for every gate that has reported.
async fn heatmap(State(state): State<Arc<SinkState>>) -> Json<Vec<StoredReading>> {
    let readings = state.readings.read().await;
    Json(
        readings
            .values()
            .filter_map(|history| history.front().cloned())
            .collect(),
    )
}

/// GET /api/risk-stats
async fn risk_stats(State(state): State<Arc<SinkState>>) -> Json<RiskStatsResponse> {
    let readings = state.readings.read().await;

    let mut counts = RiskCounts::default();
    for history in readings.values() {
        if let Some(latest) = history.front() {
            let previous = history.get(1).map(|r| r.density);
            counts.record(RiskLevel::classify(latest.density, previous));
        }
    }

    let risk_distribution = [
        ("safe", RiskLevel::Safe),
        ("moderate", RiskLevel::Moderate),
        ("high", RiskLevel::High),
        ("critical", RiskLevel::Critical),
        ("stampede", RiskLevel::Stampede),
    ]
    .into_iter()
    .map(|(name, level)| (name, counts.percentage(level)))
    .collect();

    Json(RiskStatsResponse {
        summary: counts,
        risk_distribution,
    })
}

/// GET /api/zones
async fn zones() -> Json<&'static [Location]> {
    Json(catalog())
}

/// Build the sink router
pub fn router(state: Arc<SinkState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/crowd-data", post(ingest))
        .route("/api/heatmap", get(heatmap))
        .route("/api/risk-stats", get(risk_stats))
        .route("/api/zones", get(zones))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the sink server
pub async fn run(config: SinkConfig) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let respond_with = config
        .respond_with
        .map(StatusCode::from_u16)
        .transpose()?;
    let state = Arc::new(SinkState::new(respond_with));
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Ingest sink listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Sink shutdown signal received");
            })
            .await
        {
            tracing::error!("Sink error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reading() {
        let reading =
            parse_reading(br#"{"locationId":"metro1","gateId":"G2","density":6.5}"#).unwrap();
        assert_eq!(reading.location_id, "metro1");
        assert_eq!(reading.gate_id, "G2");
        assert_eq!(reading.density, 6.5);
    }

    #[test]
    fn test_parse_reading_requires_fields() {
        assert!(parse_reading(br#"{"gateId":"G2","density":6.5}"#).is_none());
        assert!(parse_reading(br#"{"locationId":"","gateId":"G2","density":6.5}"#).is_none());
        assert!(parse_reading(br#"{"locationId":"metro1","gateId":"G2","density":"6.5"}"#).is_none());
        assert!(parse_reading(b"not json").is_none());
    }

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        assert!(!is_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            "application/json; charset=utf-8".parse().unwrap(),
        );
        assert!(is_json(&headers));
    }

    #[tokio::test]
    async fn test_store_keeps_recent_history() {
        let state = SinkState::new(None);
        for density in [3.0, 4.0, 5.0, 6.0] {
            state
                .store(CrowdReading {
                    location_id: "mall1".to_string(),
                    gate_id: "G1".to_string(),
                    density,
                })
                .await;
        }

        let readings = state.readings.read().await;
        let history = &readings[&("mall1".to_string(), "G1".to_string())];
        assert_eq!(history.len(), HISTORY_DEPTH);
        assert_eq!(history[0].density, 6.0);
        assert_eq!(history[2].density, 4.0);
    }
}
