//! Handburst - gesture-driven particle body
//!
//! A headless service that turns a hand tracker feed into a body which
//! bursts into particles when the hand closes and pulls itself back together
//! when it opens:
//! - Receives hand landmarks over UDP from a tracker helper process
//! - Classifies open hand / fist with hysteresis
//! - Runs the explosion and reformation simulation at a fixed frame rate
//! - Serves frame snapshots and particle buffers over HTTP/SSE

pub mod config;
pub mod control;
pub mod error;
pub mod output;
pub mod sim;
pub mod tracking;
pub mod web;

pub use config::Config;
pub use error::{HandburstError, Result};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use glam::Vec3;
use handburst_fx::ParticleStyle;

use control::ControlUpdate;
use sim::{FrameSnapshot, LatestCell};

/// Application state shared across all components
#[derive(Debug)]
pub struct AppState {
    /// Current configuration
    pub config: RwLock<Config>,
    /// Most recent frame
    pub frame: RwLock<Option<FrameSnapshot>>,
    /// Particle positions as of the last frame that moved them
    pub positions: RwLock<Vec<Vec3>>,
    /// Per-particle color and size, fixed at startup
    pub styles: RwLock<Vec<ParticleStyle>>,
    /// Channel for frame updates
    pub frame_tx: broadcast::Sender<FrameSnapshot>,
    /// Shutdown signal
    pub shutdown_tx: broadcast::Sender<()>,
    /// Latest hand control state, taken once per frame
    pub control: LatestCell<ControlUpdate>,
    /// Whether hand packets are arriving
    pub tracker_connected: AtomicBool,
}

impl AppState {
    /// Create a new application state with the given configuration
    pub fn new(config: Config) -> Arc<Self> {
        let (frame_tx, _) = broadcast::channel(64);
        let (shutdown_tx, _) = broadcast::channel(1);

        Arc::new(Self {
            config: RwLock::new(config),
            frame: RwLock::new(None),
            positions: RwLock::new(Vec::new()),
            styles: RwLock::new(Vec::new()),
            frame_tx,
            shutdown_tx,
            control: LatestCell::new(),
            tracker_connected: AtomicBool::new(false),
        })
    }

    /// Store a frame without broadcasting it
    pub async fn set_frame(&self, frame: FrameSnapshot) {
        *self.frame.write().await = Some(frame);
    }

    /// Store a frame and broadcast it
    pub async fn publish_frame(&self, frame: FrameSnapshot) {
        self.set_frame(frame.clone()).await;
        let _ = self.frame_tx.send(frame);
    }

    /// Get the most recent frame
    pub async fn get_frame(&self) -> Option<FrameSnapshot> {
        self.frame.read().await.clone()
    }

    /// Subscribe to frame updates
    pub fn subscribe_frames(&self) -> broadcast::Receiver<FrameSnapshot> {
        self.frame_tx.subscribe()
    }

    /// Replace the particle position buffer
    pub async fn set_positions(&self, positions: &[Vec3]) {
        let mut current = self.positions.write().await;
        current.clear();
        current.extend_from_slice(positions);
    }

    /// Replace the particle style buffer
    pub async fn set_styles(&self, styles: Vec<ParticleStyle>) {
        *self.styles.write().await = styles;
    }

    /// Subscribe to shutdown signal
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Set tracker connection status
    pub fn set_tracker_connected(&self, connected: bool) {
        self.tracker_connected.store(connected, Ordering::Relaxed);
    }

    pub fn is_tracker_connected(&self) -> bool {
        self.tracker_connected.load(Ordering::Relaxed)
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
