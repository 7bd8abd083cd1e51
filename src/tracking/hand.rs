//! Hand tracker receiver
//!
//! Receives JSON-over-UDP packets from the `scripts/hand_tracker.py` helper.
//! The helper runs the hand landmark model once per camera frame and forwards
//! only the first detected hand, so each packet carries zero or one landmark
//! set.

use glam::Vec2;
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

use crate::config::TrackerConfig;
use crate::error::{Result, TrackingError};
use crate::tracking::landmarks::LandmarkSet;

/// A landmark as sent by the helper: `[x, y]`, `[x, y, z]` or `{"x", "y", ...}`.
/// Depth is ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum WirePoint {
    Xyz([f32; 3]),
    Xy([f32; 2]),
    Named { x: f32, y: f32 },
}

impl WirePoint {
    pub fn xy(&self) -> Vec2 {
        match *self {
            WirePoint::Xyz([x, y, _]) => Vec2::new(x, y),
            WirePoint::Xy([x, y]) => Vec2::new(x, y),
            WirePoint::Named { x, y } => Vec2::new(x, y),
        }
    }
}

/// A single JSON packet from the hand tracker
#[derive(Debug, Clone, Deserialize)]
pub struct HandPacket {
    /// Video timestamp of the frame the detection ran on
    pub timestamp_ms: u64,
    /// Whether a hand was detected this frame
    pub hand_detected: bool,
    /// Landmarks of the first detected hand
    #[serde(default)]
    pub landmarks: Vec<WirePoint>,
}

impl HandPacket {
    /// Landmark set carried by this packet, if a hand was seen.
    ///
    /// A set with any non-finite coordinate is dropped as malformed.
    pub fn landmarks(&self) -> Option<LandmarkSet> {
        if !self.hand_detected || self.landmarks.is_empty() {
            return None;
        }
        let set = LandmarkSet::new(self.landmarks.iter().map(WirePoint::xy).collect());
        if !set.is_finite() {
            tracing::warn!(
                "Dropping frame {}: non-finite landmark coordinates",
                self.timestamp_ms
            );
            return None;
        }
        Some(set)
    }
}

/// Hand tracker JSON-over-UDP receiver
pub struct HandReceiver {
    config: TrackerConfig,
    socket: Option<UdpSocket>,
    last_timestamp: Option<u64>,
    buf: Vec<u8>,
}

impl HandReceiver {
    /// Create a new hand receiver (does not bind yet)
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            config: config.clone(),
            socket: None,
            last_timestamp: None,
            buf: vec![0u8; 65536],
        }
    }

    /// Bind the UDP socket and start receiving
    pub async fn start(&mut self) -> Result<()> {
        let addr = format!("{}:{}", self.config.listen_address, self.config.port);

        let socket = UdpSocket::bind(&addr).await.map_err(|e| {
            TrackingError::Receiver(format!("Failed to bind to {}: {}", addr, e))
        })?;

        tracing::info!("Hand receiver listening on {}", addr);
        self.socket = Some(socket);

        Ok(())
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Wait for the next packet.
    ///
    /// Returns `Ok(None)` for a packet that repeats the previous video
    /// timestamp, so each camera frame is consumed at most once.
    pub async fn process(&mut self) -> Result<Option<HandPacket>> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| TrackingError::Receiver("Receiver not started".to_string()))?;

        let size = socket
            .recv(&mut self.buf)
            .await
            .map_err(|e| TrackingError::Receiver(format!("Receive error: {}", e)))?;

        let packet: HandPacket = serde_json::from_slice(&self.buf[..size])
            .map_err(|e| TrackingError::Parse(format!("JSON parse error: {}", e)))?;

        if self.last_timestamp == Some(packet.timestamp_ms) {
            tracing::trace!("Dropping repeated frame {}", packet.timestamp_ms);
            return Ok(None);
        }
        self.last_timestamp = Some(packet.timestamp_ms);

        Ok(Some(packet))
    }

    /// Stop the receiver
    pub fn stop(&mut self) {
        self.socket = None;
        tracing::info!("Hand receiver stopped");
    }
}
