//! Configuration parsing and management for Handburst

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use handburst_fx::ParticleParams;

use crate::error::{ConfigError, HandburstError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scene: SceneConfig,
    pub particles: ParticleConfig,
    pub gesture: GestureConfig,
    pub motion: MotionConfig,
    pub tracker: TrackerConfig,
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self> {
        let paths = [
            PathBuf::from("handburst.toml"),
            PathBuf::from("config/default.toml"),
            dirs_path().join("config.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.scene.fov_y_degrees > 0.0 && self.scene.fov_y_degrees < 180.0) {
            return Err(invalid("scene.fov_y_degrees", "Field of view must be between 0 and 180 degrees"));
        }
        require_positive("scene.camera_distance", self.scene.camera_distance)?;
        require_positive("scene.aspect", self.scene.aspect)?;
        require_positive("scene.reach", self.scene.reach)?;
        require_positive("scene.body_radius", self.scene.body_radius)?;
        if !(self.scene.spin_x.is_finite() && self.scene.spin_y.is_finite()) {
            return Err(invalid("scene.spin_x", "Idle spin must be a finite number"));
        }

        if self.particles.count == 0 {
            return Err(invalid("particles.count", "Particle count must be greater than 0"));
        }
        require_positive("particles.speed_min", self.particles.speed_min)?;
        require_positive("particles.speed_max", self.particles.speed_max)?;
        if self.particles.speed_min > self.particles.speed_max {
            return Err(invalid(
                "particles.speed_min",
                "Speed range must have speed_min <= speed_max",
            ));
        }
        require_positive("particles.reform_speed", self.particles.reform_speed)?;
        require_positive("particles.convergence_epsilon", self.particles.convergence_epsilon)?;

        if !(self.gesture.enter_threshold.is_finite() && self.gesture.exit_threshold.is_finite()) {
            return Err(invalid("gesture.enter_threshold", "Thresholds must be finite numbers"));
        }
        if !(self.gesture.enter_threshold < self.gesture.exit_threshold) {
            return Err(invalid(
                "gesture.enter_threshold",
                "Enter threshold must be below exit threshold",
            ));
        }

        if !(self.motion.smoothing > 0.0 && self.motion.smoothing <= 1.0) {
            return Err(invalid("motion.smoothing", "Smoothing factor must be in (0, 1]"));
        }
        if self.motion.frame_rate == 0 {
            return Err(invalid("motion.frame_rate", "Frame rate must be greater than 0"));
        }

        if self.tracker.auto_launch {
            let path = Path::new(&self.tracker.tracker_script);
            if !path.exists() {
                tracing::warn!(
                    "Tracker auto_launch enabled but tracker script not found at: {}",
                    self.tracker.tracker_script
                );
            }
        }

        if self.http.port == 0 {
            return Err(invalid("http.port", "Port must be greater than 0"));
        }
        if self.http.stream_interval_frames == 0 {
            return Err(invalid(
                "http.stream_interval_frames",
                "Stream interval must be at least 1 frame",
            ));
        }

        Ok(())
    }

    /// Particle buffer parameters derived from the scene and particle sections
    pub fn particle_params(&self) -> ParticleParams {
        ParticleParams {
            count: self.particles.count,
            body_radius: self.scene.body_radius,
            speed_min: self.particles.speed_min,
            speed_max: self.particles.speed_max,
            seed: self.particles.seed,
        }
    }
}

fn require_positive(field: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "Must be a finite number greater than 0"))
    }
}

fn invalid(field: &str, message: &str) -> HandburstError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
    .into()
}

/// Camera projection and body placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Vertical field of view of the render camera, in degrees
    pub fov_y_degrees: f32,
    /// Distance from the camera to the body's working plane (z = 0)
    pub camera_distance: f32,
    /// Viewport width / height
    pub aspect: f32,
    /// Fraction of the visible half-extent the hand can reach
    pub reach: f32,
    /// Radius of the solid body
    pub body_radius: f32,
    /// Idle spin per frame around x, in radians
    pub spin_x: f32,
    /// Idle spin per frame around y, in radians
    pub spin_y: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            camera_distance: 12.0,
            aspect: 16.0 / 9.0,
            reach: 0.8,
            body_radius: 2.0,
            spin_x: 0.002,
            spin_y: 0.005,
        }
    }
}

/// Particle cloud configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Number of particles the body breaks into
    pub count: usize,
    /// Slowest explosion speed (units per frame)
    pub speed_min: f32,
    /// Fastest explosion speed (units per frame)
    pub speed_max: f32,
    /// Distance each particle travels per frame while reforming
    pub reform_speed: f32,
    /// Every particle must be closer than this to its anchor to finish reforming
    pub convergence_epsilon: f32,
    /// Seed for the particle layout
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        let params = ParticleParams::default();
        Self {
            count: params.count,
            speed_min: params.speed_min,
            speed_max: params.speed_max,
            reform_speed: 0.4,
            convergence_epsilon: 0.5,
            seed: params.seed,
        }
    }
}

/// Fist detection thresholds (normalized image units)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Average fingertip-to-wrist distance below which the hand closes
    pub enter_threshold: f32,
    /// Average fingertip-to-wrist distance above which the hand opens
    pub exit_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            enter_threshold: 0.2,
            exit_threshold: 0.3,
        }
    }
}

/// Render cadence and position smoothing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Per-frame interpolation factor toward the hand target
    pub smoothing: f32,
    /// Simulation ticks per second
    pub frame_rate: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.1,
            frame_rate: 60,
        }
    }
}

/// Hand tracker feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Enable the hand tracker receiver
    pub enabled: bool,
    /// UDP port to receive hand packets on
    pub port: u16,
    /// Listen address for UDP socket
    pub listen_address: String,
    /// Auto-launch the Python tracker subprocess
    pub auto_launch: bool,
    /// Path to the hand tracker script
    pub tracker_script: String,
    /// Camera device index
    pub camera_device: u32,
    /// Camera capture width
    pub capture_width: u32,
    /// Camera capture height
    pub capture_height: u32,
    /// Camera capture FPS
    pub capture_fps: u32,
    /// Directory to store/cache the hand landmark model file
    pub model_dir: String,
    /// Auto-restart subprocess on crash
    pub auto_restart: bool,
    /// Delay before restarting crashed subprocess (seconds)
    pub restart_delay_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 12347,
            listen_address: "127.0.0.1".to_string(),
            auto_launch: false,
            tracker_script: "scripts/hand_tracker.py".to_string(),
            camera_device: 0,
            capture_width: 640,
            capture_height: 480,
            capture_fps: 30,
            model_dir: ".".to_string(),
            auto_restart: true,
            restart_delay_secs: 3,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Enable HTTP server
    pub enabled: bool,
    /// HTTP server host
    pub host: String,
    /// HTTP server port
    pub port: u16,
    /// Enable CORS
    pub cors_enabled: bool,
    /// Send every Nth frame on the SSE stream
    pub stream_interval_frames: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8090,
            cors_enabled: true,
            stream_interval_frames: 2,
        }
    }
}

/// Get the platform-specific configuration directory
fn dirs_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        if let Some(config_dir) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(config_dir).join("handburst");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config/handburst");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join("Library/Application Support/handburst");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("handburst");
        }
    }

    PathBuf::from(".")
}
