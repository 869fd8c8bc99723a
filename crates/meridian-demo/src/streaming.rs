//! Streams terrain around a viewer walking a fixed path.

use std::path::Path;
use std::time::{Duration, Instant};

use glam::Vec2;
use meridian_config::Config;
use meridian_stream::{ChunkStreamer, Dispatch, StreamEvent, StreamStats, WorkerPool};
use meridian_terrain::debug_viz::DebugImage;
use tracing::info;

use crate::DemoError;
use crate::previews::save_png;

/// How long to keep draining after the path ends.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Viewer position on `frame`: a slow curve heading along +x.
pub(crate) fn viewer_position(frame: u32, speed: f32) -> Vec2 {
    let t = frame as f32 * speed;
    Vec2::new(t, (t * 0.004).sin() * 150.0)
}

#[derive(Debug, Default)]
struct EventTally {
    shown: usize,
    hidden: usize,
    mesh_changes: usize,
    colliders: usize,
}

impl EventTally {
    fn record(&mut self, events: &[StreamEvent]) {
        for event in events {
            match event {
                StreamEvent::VisibilityChanged { visible: true, .. } => self.shown += 1,
                StreamEvent::VisibilityChanged { visible: false, .. } => self.hidden += 1,
                StreamEvent::MeshChanged { .. } => self.mesh_changes += 1,
                StreamEvent::ColliderCommitted { .. } => self.colliders += 1,
            }
        }
    }
}

pub(crate) fn demonstrate_streaming(config: &Config, out: &Path) -> Result<StreamStats, DemoError> {
    info!("Starting chunk streaming demonstration");

    let pool = WorkerPool::with_threads(config.streaming.worker_threads);
    info!("Worker pool: {} threads", pool.worker_count());

    let mut streamer = ChunkStreamer::new(
        config.streaming.clone(),
        config.height_map.clone(),
        config.mesh.clone(),
        config.detail_levels()?,
        pool,
    );
    info!(
        "Streaming window radius {} chunks of {:.0} units",
        streamer.view_radius(),
        streamer.world_size()
    );

    let mut tally = EventTally::default();
    let frames = config.preview.frames;
    let mut viewer = Vec2::ZERO;

    for frame in 0..frames {
        viewer = viewer_position(frame, config.preview.viewer_speed);
        streamer.update(viewer);
        tally.record(&streamer.drain_events());

        if frame % 30 == 0 {
            let stats = streamer.stats();
            info!(
                "Frame {frame}: viewer=({:.0}, {:.0}), chunks={}, visible={}, in flight={}",
                viewer.x, viewer.y, stats.chunks, stats.visible, stats.in_flight
            );
        }
    }

    // Let outstanding work land so the final picture is complete.
    let deadline = Instant::now() + SETTLE_TIMEOUT;
    while streamer.dispatcher().in_flight() > 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
        streamer.update(viewer);
        tally.record(&streamer.drain_events());
    }
    streamer.update(viewer);
    tally.record(&streamer.drain_events());

    let stats = streamer.stats();
    info!(
        "Events: {} shown, {} hidden, {} mesh changes, {} colliders",
        tally.shown, tally.hidden, tally.mesh_changes, tally.colliders
    );

    save_png(&render_coverage(&streamer), &out.join("stream_coverage.png"))?;

    info!("Chunk streaming demonstration completed successfully");
    Ok(stats)
}

/// One pixel per known chunk: hidden chunks gray, visible ones shaded by the
/// detail level they display, collider chunks red.
fn render_coverage<D: Dispatch>(streamer: &ChunkStreamer<D>) -> DebugImage {
    let coords: Vec<_> = streamer.chunks().map(|c| c.coord).collect();
    let (Some(min_x), Some(max_x), Some(min_y), Some(max_y)) = (
        coords.iter().map(|c| c.x).min(),
        coords.iter().map(|c| c.x).max(),
        coords.iter().map(|c| c.y).min(),
        coords.iter().map(|c| c.y).max(),
    ) else {
        return DebugImage::new(1, 1);
    };

    let width = (max_x - min_x + 1) as u32;
    let height = (max_y - min_y + 1) as u32;
    let mut image = DebugImage::new(width, height);
    let levels = streamer.selector().levels().len().max(1);

    for chunk in streamer.chunks() {
        let x = (chunk.coord.x - min_x) as u32;
        // Image rows grow downward, world y grows upward.
        let y = (max_y - chunk.coord.y) as u32;
        let color = if chunk.collider_set {
            [220, 40, 40, 255]
        } else if let (true, Some(index)) = (chunk.visible, chunk.displayed_lod) {
            let shade = 255 - (index * 160 / levels) as u8;
            [40, shade, 80, 255]
        } else if chunk.has_height_map() {
            [90, 90, 90, 255]
        } else {
            [30, 30, 30, 255]
        };
        image.set_pixel(x, y, color);
    }
    image
}
