//! The per-frame streaming loop.

use std::sync::Arc;

use glam::Vec2;
use meridian_lod::{DetailLevels, LodSelector};
use meridian_mesh::{MeshBuilder, MeshData, MeshSettings};
use meridian_terrain::{HeightMap, HeightMapBuilder, HeightMapSettings, NormalizeMode};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::chunk::TerrainChunk;
use crate::coord::ChunkCoord;
use crate::dispatch::{Dispatch, Job, JobKey, catch_generation};
use crate::events::StreamEvent;
use crate::queue::CompletionQueue;

/// Tunables for [`ChunkStreamer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Worker threads for generation. `None` picks a count from the CPU.
    pub worker_threads: Option<usize>,
    /// Distance the viewer must travel before the chunk window is rescanned.
    pub viewer_move_threshold: f32,
    /// Edge distance inside which a ready collider mesh is committed.
    pub collider_generation_distance: f32,
    /// Half-width of the chunk window. `None` derives it from the farthest
    /// detail level.
    pub view_radius_chunks: Option<u32>,
}

impl StreamSettings {
    pub fn validate(&mut self) {
        self.viewer_move_threshold = self.viewer_move_threshold.max(0.0);
        self.collider_generation_distance = self.collider_generation_distance.max(0.0);
        if let Some(threads) = &mut self.worker_threads {
            *threads = (*threads).max(1);
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            worker_threads: None,
            viewer_move_threshold: 25.0,
            collider_generation_distance: 5.0,
            view_radius_chunks: None,
        }
    }
}

/// Counters for logging and tooling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub chunks: usize,
    pub visible: usize,
    pub height_maps: usize,
    pub meshes: usize,
    pub colliders: usize,
    pub in_flight: u64,
}

/// Keeps the chunks around a moving viewer generated, meshed at the right
/// detail level, and shown or hidden.
///
/// Call [`update`](Self::update) once per frame from one thread, then
/// [`drain_events`](Self::drain_events) to apply the resulting changes.
pub struct ChunkStreamer<D: Dispatch> {
    settings: StreamSettings,
    selector: LodSelector,
    world_size: f32,
    mesh_scale: f32,
    map_size: usize,
    view_radius: i32,
    height_builder: Arc<HeightMapBuilder>,
    mesh_builder: Arc<MeshBuilder>,
    dispatcher: D,
    heights: CompletionQueue<HeightMap>,
    meshes: CompletionQueue<MeshData>,
    chunks: FxHashMap<ChunkCoord, TerrainChunk>,
    visible: FxHashSet<ChunkCoord>,
    events: Vec<StreamEvent>,
    viewer: Vec2,
    last_viewer: Option<Vec2>,
    last_rescan: Option<Vec2>,
}

impl<D: Dispatch> ChunkStreamer<D> {
    pub fn new(
        settings: StreamSettings,
        height: HeightMapSettings,
        mesh: MeshSettings,
        levels: DetailLevels,
        dispatcher: D,
    ) -> Self {
        if height.noise.normalize_mode == NormalizeMode::Local {
            tracing::warn!("height noise uses local normalization, chunk edges will not line up");
        }

        let world_size = mesh.world_size();
        let view_radius = match settings.view_radius_chunks {
            Some(radius) => radius as i32,
            None => (levels.max_view_distance() / world_size).round() as i32,
        };
        let mesh_builder = Arc::new(MeshBuilder::from_settings(&height, &mesh));

        tracing::debug!(
            world_size,
            view_radius,
            levels = levels.len(),
            "created chunk streamer"
        );

        Self {
            settings,
            selector: LodSelector::new(levels),
            world_size,
            mesh_scale: mesh.mesh_scale,
            map_size: mesh.vertices_per_line(),
            view_radius,
            height_builder: Arc::new(HeightMapBuilder::new(height)),
            mesh_builder,
            dispatcher,
            heights: CompletionQueue::new(),
            meshes: CompletionQueue::new(),
            chunks: FxHashMap::default(),
            visible: FxHashSet::default(),
            events: Vec::new(),
            viewer: Vec2::ZERO,
            last_viewer: None,
            last_rescan: None,
        }
    }

    /// Advance one frame with the viewer at `viewer` on the ground plane.
    pub fn update(&mut self, viewer: Vec2) {
        self.viewer = viewer;

        self.apply_height_completions();
        self.apply_mesh_completions();

        if self.last_viewer.is_some_and(|last| last != viewer) {
            let mut visible: Vec<ChunkCoord> = self.visible.iter().copied().collect();
            visible.sort_unstable();
            for coord in visible {
                self.update_collision(coord);
            }
        }

        let threshold = self.settings.viewer_move_threshold;
        let rescan = self
            .last_rescan
            .is_none_or(|last| last.distance_squared(viewer) > threshold * threshold);
        if rescan {
            self.last_rescan = Some(viewer);
            self.rescan();
        }

        self.last_viewer = Some(viewer);
    }

    /// Take the events produced since the last call, oldest first.
    pub fn drain_events(&mut self) -> Vec<StreamEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_visible(&self, coord: ChunkCoord) -> bool {
        self.visible.contains(&coord)
    }

    pub fn visible_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.visible.iter().copied()
    }

    pub fn world_size(&self) -> f32 {
        self.world_size
    }

    pub fn view_radius(&self) -> i32 {
        self.view_radius
    }

    pub fn selector(&self) -> &LodSelector {
        &self.selector
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn height_queue(&self) -> &CompletionQueue<HeightMap> {
        &self.heights
    }

    pub fn mesh_queue(&self) -> &CompletionQueue<MeshData> {
        &self.meshes
    }

    pub fn stats(&self) -> StreamStats {
        let mut stats = StreamStats {
            chunks: self.chunks.len(),
            visible: self.visible.len(),
            in_flight: self.dispatcher.in_flight(),
            ..Default::default()
        };
        for chunk in self.chunks.values() {
            stats.height_maps += usize::from(chunk.has_height_map());
            stats.meshes += chunk.slots.iter().filter(|s| s.is_ready()).count();
            stats.colliders += usize::from(chunk.collider_set);
        }
        stats
    }

    fn apply_height_completions(&mut self) {
        for completion in self.heights.drain() {
            let JobKey::Height(coord) = completion.key else {
                tracing::warn!(key = ?completion.key, "ignoring mesh key on height queue");
                continue;
            };
            let height_map = match completion.result {
                Ok(height_map) => height_map,
                Err(err) => {
                    tracing::error!(%coord, error = %err, "height map generation failed");
                    continue;
                }
            };
            let Some(chunk) = self.chunks.get_mut(&coord) else {
                tracing::warn!(%coord, "ignoring height map for unknown chunk");
                continue;
            };
            if chunk.has_height_map() {
                tracing::debug!(%coord, "ignoring duplicate height map");
                continue;
            }
            chunk.height_map = Some(Arc::new(height_map));
            tracing::debug!(%coord, "height map received");
            self.update_chunk(coord);
        }
    }

    fn apply_mesh_completions(&mut self) {
        let collider_index = self.selector.levels().collider_index();

        for completion in self.meshes.drain() {
            let JobKey::Mesh { coord, slot } = completion.key else {
                tracing::warn!(key = ?completion.key, "ignoring height key on mesh queue");
                continue;
            };
            let mesh = match completion.result {
                Ok(mesh) => mesh,
                Err(err) => {
                    tracing::error!(%coord, slot, error = %err, "mesh generation failed");
                    continue;
                }
            };
            let Some(target) = self
                .chunks
                .get_mut(&coord)
                .and_then(|chunk| chunk.slots.get_mut(slot))
            else {
                tracing::warn!(%coord, slot, "ignoring mesh for unknown chunk slot");
                continue;
            };
            if target.is_ready() {
                tracing::debug!(%coord, slot, "ignoring duplicate mesh");
                continue;
            }
            target.mesh = Some(Arc::new(mesh));
            tracing::debug!(%coord, slot, lod = target.lod, "mesh received");

            self.update_chunk(coord);
            if slot == collider_index {
                self.update_collision(coord);
            }
        }
    }

    fn rescan(&mut self) {
        let mut updated = FxHashSet::default();

        let mut previously_visible: Vec<ChunkCoord> = self.visible.iter().copied().collect();
        previously_visible.sort_unstable();
        for coord in previously_visible {
            updated.insert(coord);
            self.update_chunk(coord);
        }

        let center = ChunkCoord::from_world(self.viewer, self.world_size);
        let r = self.view_radius;
        let mut created = 0usize;
        for dy in -r..=r {
            for dx in -r..=r {
                let coord = center.offset(dx, dy);
                if !updated.insert(coord) {
                    continue;
                }
                if self.chunks.contains_key(&coord) {
                    self.update_chunk(coord);
                } else {
                    self.create_chunk(coord);
                    created += 1;
                }
            }
        }

        let mut outside: Vec<ChunkCoord> = self
            .visible
            .iter()
            .copied()
            .filter(|c| c.chebyshev(center) > r as u32)
            .collect();
        outside.sort_unstable();
        for coord in outside {
            self.set_visibility(coord, false);
        }

        tracing::debug!(
            %center,
            created,
            chunks = self.chunks.len(),
            visible = self.visible.len(),
            "rescanned chunk window"
        );
    }

    fn create_chunk(&mut self, coord: ChunkCoord) {
        let mut chunk = TerrainChunk::new(
            coord,
            self.world_size,
            self.mesh_scale,
            self.selector.levels().levels(),
        );
        chunk.height_requested = true;
        let sample_center = chunk.sample_center;
        self.chunks.insert(coord, chunk);
        tracing::debug!(%coord, "created chunk");
        self.request_height(coord, sample_center);
    }

    /// Re-evaluate visibility and displayed LOD for one chunk.
    fn update_chunk(&mut self, coord: ChunkCoord) {
        let viewer = self.viewer;
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        let Some(height_map) = chunk.height_map.clone() else {
            return;
        };

        let edge_distance = chunk.bounds.distance(viewer);
        let visible = self.selector.is_visible(edge_distance);
        let mut request = None;

        if visible {
            let index = self.selector.select(edge_distance);
            if chunk.displayed_lod != Some(index) {
                let slot = &mut chunk.slots[index];
                if let Some(mesh) = &slot.mesh {
                    self.events.push(StreamEvent::MeshChanged {
                        coord,
                        lod_index: index,
                        lod: slot.lod,
                        mesh: Arc::clone(mesh),
                    });
                    chunk.displayed_lod = Some(index);
                } else if !slot.requested {
                    slot.requested = true;
                    request = Some((index, slot.lod));
                }
            }
        }

        self.set_visibility(coord, visible);
        if let Some((index, lod)) = request {
            self.request_mesh(coord, index, lod, height_map);
        }
    }

    /// Request and commit the collider mesh once the viewer is close enough.
    fn update_collision(&mut self, coord: ChunkCoord) {
        let viewer = self.viewer;
        let levels = self.selector.levels();
        let collider_index = levels.collider_index();
        let request_sqr = levels.collider().sqr_visible_distance();
        let commit_distance = self.settings.collider_generation_distance;

        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if chunk.collider_set {
            return;
        }
        let Some(height_map) = chunk.height_map.clone() else {
            return;
        };

        let sqr_distance = chunk.bounds.sqr_distance(viewer);
        let slot = &mut chunk.slots[collider_index];
        let lod = slot.lod;

        let request = sqr_distance < request_sqr && !slot.requested;
        if request {
            slot.requested = true;
        }

        let commit = if sqr_distance < commit_distance * commit_distance {
            slot.mesh.clone()
        } else {
            None
        };
        if let Some(mesh) = commit {
            chunk.collider_set = true;
            tracing::debug!(%coord, lod, "collider committed");
            self.events.push(StreamEvent::ColliderCommitted { coord, lod, mesh });
        }

        if request {
            self.request_mesh(coord, collider_index, lod, height_map);
        }
    }

    fn set_visibility(&mut self, coord: ChunkCoord, visible: bool) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if chunk.visible == visible {
            return;
        }
        chunk.visible = visible;
        if visible {
            self.visible.insert(coord);
        } else {
            self.visible.remove(&coord);
        }
        tracing::trace!(%coord, visible, "chunk visibility changed");
        self.events.push(StreamEvent::VisibilityChanged { coord, visible });
    }

    fn request_height(&self, coord: ChunkCoord, sample_center: Vec2) {
        let key = JobKey::Height(coord);
        let builder = Arc::clone(&self.height_builder);
        let sender = self.heights.sender();
        let size = self.map_size;

        let job: Job = Box::new(move || {
            let result = catch_generation(key, || builder.build(size, sample_center));
            sender.send(key, result);
        });

        tracing::debug!(%coord, "requesting height map");
        if let Err(err) = self.dispatcher.submit(key, job) {
            tracing::error!(%coord, error = %err, "failed to dispatch height map request");
        }
    }

    fn request_mesh(&self, coord: ChunkCoord, slot: usize, lod: u8, height_map: Arc<HeightMap>) {
        let key = JobKey::Mesh { coord, slot };
        let builder = Arc::clone(&self.mesh_builder);
        let sender = self.meshes.sender();

        let job: Job = Box::new(move || {
            let result = catch_generation(key, || builder.build(&height_map, lod));
            sender.send(key, result);
        });

        tracing::debug!(%coord, slot, lod, "requesting mesh");
        if let Err(err) = self.dispatcher.submit(key, job) {
            tracing::error!(%coord, slot, error = %err, "failed to dispatch mesh request");
        }
    }
}
