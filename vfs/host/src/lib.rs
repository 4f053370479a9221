//! Host filesystem provider for `vfs-core`.
//!
//! [`HostLoop`] runs native filesystem calls on a small blocking pool and
//! hands their results back on the thread that calls [`HostLoop::run`].

mod config;
mod event_loop;
mod platform;

pub use config::HostLoopConfig;
pub use event_loop::{HostLoop, RunMode};

/// A filesystem on the host, driven by a [`HostLoop`].
pub type HostFs = vfs_core::LoopFs<HostLoop>;
