//! Chunk streaming around a moving viewer.
//!
//! [`ChunkStreamer`] owns the chunk registry and decides, once per frame,
//! which chunks are visible, which LOD each one shows, and when its collider
//! is committed. Height maps and meshes are produced off the main thread
//! through a [`Dispatch`] implementation and handed back through
//! [`CompletionQueue`]s that the streamer drains at the start of each update.

mod chunk;
mod coord;
mod dispatch;
mod events;
mod queue;
mod streamer;
mod worker;

pub use chunk::{ChunkState, LodMeshSlot, TerrainChunk};
pub use coord::ChunkCoord;
pub use dispatch::{Dispatch, GenerationError, InlineDispatch, Job, JobKey, catch_generation};
pub use events::StreamEvent;
pub use queue::{Completion, CompletionQueue, CompletionSender};
pub use streamer::{ChunkStreamer, StreamSettings, StreamStats};
pub use worker::WorkerPool;
