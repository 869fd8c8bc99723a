//! Job submission seam between the streamer and whatever runs the work.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::coord::ChunkCoord;

/// Identifies one unit of generation work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKey {
    /// Height map for a chunk.
    Height(ChunkCoord),
    /// Mesh for one detail-level slot of a chunk.
    Mesh { coord: ChunkCoord, slot: usize },
}

impl JobKey {
    pub fn coord(&self) -> ChunkCoord {
        match *self {
            JobKey::Height(coord) | JobKey::Mesh { coord, .. } => coord,
        }
    }
}

/// A boxed unit of work. The job delivers its own result.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errors surfaced by generation jobs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("generation job {key:?} panicked: {message}")]
    Panicked { key: JobKey, message: String },
    #[error("dispatcher has shut down, job {key:?} was dropped")]
    Disconnected { key: JobKey },
}

/// Runs generation jobs, possibly on other threads.
///
/// A job must eventually run exactly once unless `submit` returns an error.
pub trait Dispatch {
    fn submit(&self, key: JobKey, job: Job) -> Result<(), GenerationError>;

    /// Jobs submitted but not yet finished.
    fn in_flight(&self) -> u64 {
        0
    }
}

/// Runs every job immediately on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineDispatch;

impl Dispatch for InlineDispatch {
    fn submit(&self, _key: JobKey, job: Job) -> Result<(), GenerationError> {
        job();
        Ok(())
    }
}

/// Run `produce`, turning a panic into [`GenerationError::Panicked`].
pub fn catch_generation<T>(key: JobKey, produce: impl FnOnce() -> T) -> Result<T, GenerationError> {
    catch_unwind(AssertUnwindSafe(produce)).map_err(|payload| GenerationError::Panicked {
        key,
        message: panic_message(payload.as_ref()),
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_inline_dispatch_runs_immediately() {
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        InlineDispatch
            .submit(
                JobKey::Height(ChunkCoord::new(0, 0)),
                Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_catch_generation_reports_panic() {
        let key = JobKey::Mesh {
            coord: ChunkCoord::new(1, 2),
            slot: 0,
        };
        let result: Result<u32, _> = catch_generation(key, || panic!("bad height map"));
        assert_eq!(
            result,
            Err(GenerationError::Panicked {
                key,
                message: "bad height map".into()
            })
        );
        assert_eq!(catch_generation(key, || 7), Ok(7));
    }

    #[test]
    fn test_key_coord() {
        let coord = ChunkCoord::new(-3, 4);
        assert_eq!(JobKey::Height(coord).coord(), coord);
        assert_eq!(JobKey::Mesh { coord, slot: 2 }.coord(), coord);
    }
}
