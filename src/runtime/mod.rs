//! Scheduling primitives that decide when a pending flush runs.
//!
//! - [`MicrotaskQueue`] — host-drained FIFO, plus a thread-local default.
//! - [`TokioScheduler`] — `spawn_local` on a tokio `LocalSet`.

pub mod microtask;
pub mod spawn;

pub use microtask::{current_queue, queue_microtask, run_microtasks, MicrotaskQueue, Schedule, Task};
pub use spawn::TokioScheduler;
