//! Render-rate frame loop

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::{FrameSnapshot, Simulation};
use crate::AppState;

/// Owns the simulation and advances it once per render tick.
///
/// Each tick takes the newest control state from the shared mailbox. The
/// detection side has already folded every cycle into it, so a tracker
/// running ahead of the frame rate loses no classification history.
pub struct FrameDriver {
    state: Arc<AppState>,
    sim: Simulation,
    frame_rate: u32,
}

impl FrameDriver {
    /// Build the simulation from the current config and publish the static
    /// particle styles and the initial frame.
    pub async fn new(state: Arc<AppState>) -> Self {
        let config = state.config.read().await.clone();
        let sim = Simulation::new(&config);

        state.set_styles(sim.particles().styles().to_vec()).await;
        state.set_frame(sim.snapshot()).await;

        Self {
            state,
            sim,
            frame_rate: config.motion.frame_rate,
        }
    }

    /// Run one frame and publish the result.
    pub async fn tick(&mut self) -> FrameSnapshot {
        if let Some(update) = self.state.control.take() {
            self.sim.apply(&update);
        }

        let snapshot = self.sim.tick();

        if self.sim.take_positions_dirty() {
            self.state
                .set_positions(self.sim.particles().positions())
                .await;
        }
        self.state.publish_frame(snapshot.clone()).await;

        snapshot
    }

    /// Tick at the configured frame rate until shutdown.
    pub async fn run(mut self) {
        let mut shutdown_rx = self.state.subscribe_shutdown();

        let period = Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Frame driver started at {} fps", self.frame_rate);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Frame driver shutting down after {} frames", self.sim.frame());
                    break;
                }
            }
        }

        let dropped = self.state.control.dropped();
        if dropped > 0 {
            tracing::debug!(
                "{} of {} control updates were superseded before a tick",
                dropped,
                self.state.control.published()
            );
        }
    }
}
