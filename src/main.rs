//! Handburst - gesture-driven particle body
//!
//! Main entry point for the CLI application.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use handburst::{
    config::Config,
    control::HandControl,
    sim::FrameDriver,
    tracking::{
        subprocess::{check_mediapipe_available, TrackerSubprocess},
        HandReceiver,
    },
    web::WebServer,
    AppState,
};

/// Handburst - hand-gesture driven particle body
#[derive(Parser, Debug)]
#[command(name = "handburst", version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// HTTP server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Disable HTTP server
    #[arg(long)]
    no_http: bool,

    /// Disable the hand tracker receiver
    #[arg(long)]
    no_tracker: bool,

    /// Number of particles (overrides config)
    #[arg(long)]
    particles: Option<usize>,

    /// Particle layout seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation frame rate (overrides config)
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    info!("Starting {} v{}", handburst::NAME, handburst::VERSION);

    let runtime = tokio::runtime::Runtime::new()?;

    let state = runtime.block_on(async { setup_and_spawn_services(&args).await })?;

    // Headless: wait for Ctrl+C / SIGTERM
    runtime.block_on(async {
        shutdown_signal().await;
        info!("Shutdown signal received");
        state.shutdown();

        // Give tasks a moment to clean up
        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
    });

    info!("Handburst stopped");
    Ok(())
}

/// Load config, create AppState, and spawn all background services.
async fn setup_and_spawn_services(args: &Args) -> anyhow::Result<Arc<AppState>> {
    let mut config = if let Some(ref path) = args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if args.no_http {
        config.http.enabled = false;
    }
    if args.no_tracker {
        config.tracker.enabled = false;
    }
    if let Some(count) = args.particles {
        config.particles.count = count;
    }
    if let Some(seed) = args.seed {
        config.particles.seed = seed;
    }
    if let Some(fps) = args.fps {
        config.motion.frame_rate = fps;
    }

    config.validate()?;

    // Launch the helper ourselves if nothing says otherwise and it can run
    if config.tracker.enabled
        && !config.tracker.auto_launch
        && Path::new(&config.tracker.tracker_script).exists()
        && tokio::task::spawn_blocking(check_mediapipe_available)
            .await
            .unwrap_or(false)
    {
        info!("MediaPipe detected, auto-launching hand tracker");
        config.tracker.auto_launch = true;
    }

    info!("Particles: {}", config.particles.count);
    info!("Frame rate: {} fps", config.motion.frame_rate);
    info!("Hand tracker: {}", config.tracker.enabled);
    info!("HTTP server: {}", config.http.enabled);

    let state = AppState::new(config.clone());

    // The frame driver publishes styles and the first frame before serving
    let driver = FrameDriver::new(Arc::clone(&state)).await;
    tokio::spawn(driver.run());

    if config.http.enabled {
        let server = WebServer::new(Arc::clone(&state), &config.http);
        tokio::spawn(async move {
            if let Err(e) = server.serve().await {
                error!("HTTP server error: {}", e);
            }
        });
    }

    if config.tracker.enabled {
        let tracker_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = run_hand_tracking(tracker_state).await {
                error!("Hand tracking error: {}", e);
                warn!("Continuing without hand input");
            }
        });
    } else {
        info!("Hand tracker disabled, body stays at rest");
    }

    Ok(state)
}

async fn run_hand_tracking(state: Arc<AppState>) -> anyhow::Result<()> {
    let config = state.config.read().await.clone();
    let tracker_config = config.tracker.clone();
    let mut control = HandControl::new(&config);

    let mut shutdown_rx = state.subscribe_shutdown();

    // Optionally launch the subprocess
    let mut subprocess = if tracker_config.auto_launch {
        let mut sp = TrackerSubprocess::new(&tracker_config);
        if let Err(e) = sp.start() {
            error!("Failed to auto-launch hand tracker: {}", e);
        }
        Some(sp)
    } else {
        None
    };

    let mut receiver = HandReceiver::new(&tracker_config);
    receiver.start().await?;

    info!("Hand tracking started (port: {})", tracker_config.port);

    let mut health = tokio::time::interval(tokio::time::Duration::from_secs(1));

    loop {
        tokio::select! {
            result = receiver.process() => {
                match result {
                    Ok(Some(packet)) => {
                        state.set_tracker_connected(true);
                        // No hand leaves target and classification as they are
                        if let Some(landmarks) = packet.landmarks() {
                            state.control.publish(control.process(&landmarks));
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Hand packet skipped: {}", e);
                    }
                }
            }
            _ = health.tick() => {
                // Check subprocess health and auto-restart if needed
                if let Some(ref mut sp) = subprocess {
                    if !sp.is_running() {
                        state.set_tracker_connected(false);
                        if tracker_config.auto_restart {
                            info!(
                                "Hand tracker subprocess exited, restarting in {}s",
                                tracker_config.restart_delay_secs
                            );
                            tokio::time::sleep(tokio::time::Duration::from_secs(
                                tracker_config.restart_delay_secs,
                            ))
                            .await;
                            if let Err(e) = sp.start() {
                                error!("Failed to restart hand tracker: {}", e);
                            }
                        }
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Hand tracking shutting down");
                break;
            }
        }
    }

    // Cleanup
    receiver.stop();
    state.set_tracker_connected(false);
    if let Some(ref mut sp) = subprocess {
        sp.stop().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
