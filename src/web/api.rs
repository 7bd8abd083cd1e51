//! REST API endpoints

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::output::sse;
use crate::AppState;

/// Header carrying the number of particles in a binary buffer response
pub const PARTICLE_COUNT_HEADER: HeaderName = HeaderName::from_static("x-particle-count");

/// API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    pub fn error(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        })
    }
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub phase: String,
    pub frame: u64,
    pub particle_count: usize,
    pub tracker_connected: bool,
    pub control_updates: u64,
    pub control_updates_dropped: u64,
}

/// Get current status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let frame = state.get_frame().await;

    ApiResponse::success(StatusResponse {
        version: crate::VERSION.to_string(),
        phase: frame
            .as_ref()
            .map(|f| f.phase.to_string())
            .unwrap_or_else(|| "starting".to_string()),
        frame: frame.as_ref().map(|f| f.frame).unwrap_or(0),
        particle_count: frame.as_ref().map(|f| f.particles.count).unwrap_or(0),
        tracker_connected: state.is_tracker_connected(),
        control_updates: state.control.published(),
        control_updates_dropped: state.control.dropped(),
    })
}

/// Get the most recent frame snapshot
pub async fn get_frame(State(state): State<Arc<AppState>>) -> Response {
    match state.get_frame().await {
        Some(frame) => ApiResponse::success(frame).into_response(),
        None => ApiResponse::error("No frame rendered yet").into_response(),
    }
}

/// Particle positions as little-endian f32 (x, y, z) triples
pub async fn get_particles(State(state): State<Arc<AppState>>) -> Response {
    let positions = state.positions.read().await;
    let body = bytemuck::cast_slice::<_, u8>(positions.as_slice()).to_vec();
    binary_response(positions.len(), body)
}

/// Particle styles as little-endian f32 (r, g, b, size) quads
pub async fn get_particle_styles(State(state): State<Arc<AppState>>) -> Response {
    let styles = state.styles.read().await;
    let body = bytemuck::cast_slice::<_, u8>(styles.as_slice()).to_vec();
    binary_response(styles.len(), body)
}

fn binary_response(count: usize, body: Vec<u8>) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (PARTICLE_COUNT_HEADER, HeaderValue::from(count)),
        ],
        body,
    )
        .into_response()
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config.read().await;
    Json(config.clone())
}

/// SSE stream of frame snapshots
pub async fn frame_stream(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let interval = state.config.read().await.http.stream_interval_frames;
    sse::create_frame_stream(state, interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::sim::FrameDriver;
    use glam::Vec3;

    fn state() -> Arc<AppState> {
        let mut config = Config::default();
        config.particles.count = 16;
        AppState::new(config)
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_status_before_first_frame() {
        let state = state();
        let json = body_json(get_status(State(state)).await.into_response()).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["phase"], "starting");
        assert_eq!(json["data"]["tracker_connected"], false);
    }

    #[tokio::test]
    async fn test_frame_endpoint() {
        let state = state();
        let json = body_json(get_frame(State(Arc::clone(&state))).await).await;
        assert_eq!(json["success"], false);

        let mut driver = FrameDriver::new(Arc::clone(&state)).await;
        driver.tick().await;

        let json = body_json(get_frame(State(state)).await).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["frame"], 1);
        assert_eq!(json["data"]["phase"], "idle");
        assert_eq!(json["data"]["particles"]["count"], 16);
    }

    #[tokio::test]
    async fn test_particles_are_little_endian_triples() {
        let state = state();
        state
            .set_positions(&[Vec3::new(1.0, -2.0, 0.5), Vec3::new(0.0, 3.0, -4.0)])
            .await;

        let response = get_particles(State(state)).await;
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(response.headers()[PARTICLE_COUNT_HEADER], "2");

        let bytes = body_bytes(response).await;
        assert_eq!(bytes.len(), 2 * 3 * 4);
        let floats: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(floats, vec![1.0, -2.0, 0.5, 0.0, 3.0, -4.0]);
    }

    #[tokio::test]
    async fn test_styles_served_after_driver_start() {
        let state = state();
        let _driver = FrameDriver::new(Arc::clone(&state)).await;

        let response = get_particle_styles(State(state)).await;
        assert_eq!(response.headers()[PARTICLE_COUNT_HEADER], "16");
        assert_eq!(body_bytes(response).await.len(), 16 * 4 * 4);
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let json = body_json(get_config(State(state())).await.into_response()).await;
        assert_eq!(json["particles"]["count"], 16);
        assert_eq!(json["gesture"]["enter_threshold"].as_f64().unwrap() as f32, 0.2);
    }
}
