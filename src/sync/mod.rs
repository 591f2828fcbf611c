//! Cooperative synchronization primitives.
//! Waiting tasks are parked on a waker queue; no OS thread blocks.

mod async_lock;
mod path_locks;

pub use async_lock::{Acquire, AsyncLock, Releaser};
pub use path_locks::PathLocks;
