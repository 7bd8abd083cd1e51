//! Hand tracker subprocess manager
//!
//! Launches and manages the Python hand tracker helper as a child process
//! with automatic cleanup on drop.

use tokio::process::{Child, Command};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackingError};

/// Manages a hand tracker subprocess (scripts/hand_tracker.py)
pub struct TrackerSubprocess {
    child: Option<Child>,
    config: TrackerConfig,
}

impl TrackerSubprocess {
    /// Create a new subprocess manager (does not start the process)
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            child: None,
            config: config.clone(),
        }
    }

    /// Command-line arguments passed to the tracker script
    pub fn args(&self) -> Vec<String> {
        vec![
            self.config.tracker_script.clone(),
            "--ip".to_string(),
            self.config.listen_address.clone(),
            "--port".to_string(),
            self.config.port.to_string(),
            "--capture".to_string(),
            self.config.camera_device.to_string(),
            "--width".to_string(),
            self.config.capture_width.to_string(),
            "--height".to_string(),
            self.config.capture_height.to_string(),
            "--fps".to_string(),
            self.config.capture_fps.to_string(),
            "--model-dir".to_string(),
            self.config.model_dir.clone(),
            "--num-hands".to_string(),
            "1".to_string(),
        ]
    }

    /// Launch the hand tracker subprocess.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let child = Command::new("python3")
            .args(self.args())
            .kill_on_drop(true)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| {
                TrackingError::Subprocess(format!(
                    "Failed to launch hand tracker at '{}': {}",
                    self.config.tracker_script, e
                ))
            })?;

        tracing::info!(
            "Hand tracker subprocess started (pid: {:?}, camera: {}, port: {})",
            child.id(),
            self.config.camera_device,
            self.config.port,
        );

        self.child = Some(child);
        Ok(())
    }

    /// Check if the subprocess is still running (non-blocking)
    pub fn is_running(&mut self) -> bool {
        match &mut self.child {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    tracing::warn!("Hand tracker subprocess exited with: {}", status);
                    self.child = None;
                    false
                }
                Err(e) => {
                    tracing::error!("Failed to check hand tracker status: {}", e);
                    false
                }
            },
            None => false,
        }
    }

    /// Stop the subprocess by killing it
    pub async fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            tracing::info!("Stopping hand tracker subprocess (pid: {:?})", child.id());
            let _ = child.kill().await;
            let _ = child.wait().await;
        }
    }
}

/// Check if the `mediapipe` Python package is available.
///
/// Runs `python3 -c "import mediapipe"` and returns true if it succeeds.
pub fn check_mediapipe_available() -> bool {
    match std::process::Command::new("python3")
        .args(["-c", "import mediapipe"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_follow_config() {
        let config = TrackerConfig {
            port: 4000,
            camera_device: 2,
            ..TrackerConfig::default()
        };
        let sp = TrackerSubprocess::new(&config);
        let args = sp.args();

        assert_eq!(args[0], "scripts/hand_tracker.py");
        let port = args.iter().position(|a| a == "--port").unwrap();
        assert_eq!(args[port + 1], "4000");
        let capture = args.iter().position(|a| a == "--capture").unwrap();
        assert_eq!(args[capture + 1], "2");
    }

    #[test]
    fn test_default_script_accepts_every_flag() {
        let config = TrackerConfig::default();
        let script = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(&config.tracker_script);
        let source = std::fs::read_to_string(&script).unwrap();

        for flag in TrackerSubprocess::new(&config)
            .args()
            .iter()
            .filter(|a| a.starts_with("--"))
        {
            assert!(
                source.contains(&format!("\"{}\"", flag)),
                "{} does not handle {}",
                script.display(),
                flag
            );
        }
        assert!(source.contains("\"hand_detected\""));
        assert!(source.contains("\"timestamp_ms\""));
    }

    #[tokio::test]
    async fn test_not_running_before_start() {
        let mut sp = TrackerSubprocess::new(&TrackerConfig::default());
        assert!(!sp.is_running());
        sp.stop().await;
    }
}
