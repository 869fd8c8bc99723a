//! Main-thread delivery of finished generation work.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::dispatch::{GenerationError, JobKey};

/// One finished job.
#[derive(Debug)]
pub struct Completion<T> {
    pub key: JobKey,
    pub result: Result<T, GenerationError>,
}

/// Cloneable handle that workers use to post completions.
#[derive(Debug)]
pub struct CompletionSender<T> {
    sender: Sender<Completion<T>>,
}

impl<T> Clone for CompletionSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> CompletionSender<T> {
    /// Post a completion. Returns `false` if the queue has been dropped.
    pub fn send(&self, key: JobKey, result: Result<T, GenerationError>) -> bool {
        self.sender.send(Completion { key, result }).is_ok()
    }
}

/// Multi-producer queue drained on the main thread once per frame.
#[derive(Debug)]
pub struct CompletionQueue<T> {
    sender: Sender<Completion<T>>,
    receiver: Receiver<Completion<T>>,
}

impl<T> CompletionQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> CompletionSender<T> {
        CompletionSender {
            sender: self.sender.clone(),
        }
    }

    /// Post a completion from the owning thread.
    pub fn push(&self, key: JobKey, result: Result<T, GenerationError>) {
        // The receiver lives in `self`, so this cannot disconnect.
        let _ = self.sender.send(Completion { key, result });
    }

    /// Take everything queued so far, in arrival order.
    pub fn drain(&self) -> Vec<Completion<T>> {
        let mut completions = Vec::new();
        while let Ok(completion) = self.receiver.try_recv() {
            completions.push(completion);
        }
        completions
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<T> Default for CompletionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
