//! Tokio-backed scheduler for hosts running on a `LocalSet`.

use super::microtask::{Schedule, Task};

/// Runs each task as a `spawn_local` future.
///
/// Must be used from inside a [`tokio::task::LocalSet`]; the task runs the
/// next time the local set polls, after the current synchronous code yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Schedule for TokioScheduler {
    fn schedule(&self, task: Task) {
        tokio::task::spawn_local(async move { task() });
    }
}
