//! Server-Sent Events for real-time frame updates

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::sim::FrameSnapshot;
use crate::AppState;

/// Create an SSE stream of frame snapshots, sending every `interval`-th frame
/// plus every frame that changes the phase.
pub fn create_frame_stream(
    app_state: Arc<AppState>,
    interval: u32,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = app_state.subscribe_frames();
    let mut filter = FrameThrottle::new(interval);

    let stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(frame) if filter.admit(&frame) => Some(Ok(frame_to_event(&frame))),
        Ok(_) => None,
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Convert a frame snapshot to an SSE event
fn frame_to_event(frame: &FrameSnapshot) -> Event {
    let data = serde_json::to_string(frame).unwrap_or_default();

    Event::default().event("frame").data(data)
}

/// Decides which frames go out on a throttled stream
#[derive(Debug)]
struct FrameThrottle {
    interval: u64,
    last_phase: Option<crate::sim::Phase>,
}

impl FrameThrottle {
    fn new(interval: u32) -> Self {
        Self {
            interval: u64::from(interval.max(1)),
            last_phase: None,
        }
    }

    fn admit(&mut self, frame: &FrameSnapshot) -> bool {
        let phase_changed = self.last_phase != Some(frame.phase);
        self.last_phase = Some(frame.phase);
        phase_changed || frame.frame % self.interval == 0
    }
}
