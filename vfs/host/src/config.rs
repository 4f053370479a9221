use vfs_core::{VfsError, VfsErrorKind, VfsResult};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "enable-serde", serde(default))]
pub struct HostLoopConfig {
    /// Upper bound on threads running native calls at once.
    pub worker_threads: usize,
    /// Submissions beyond this many in-flight requests are refused with
    /// `WouldBlock`.
    pub max_in_flight: usize,
    /// Name given to worker threads.
    pub thread_name: String,
}

impl Default for HostLoopConfig {
    fn default() -> Self {
        Self {
            worker_threads: 4,
            max_in_flight: 1024,
            thread_name: "vfs-host-io".to_string(),
        }
    }
}

impl HostLoopConfig {
    pub fn validate(&self) -> VfsResult<()> {
        if self.worker_threads == 0 {
            return Err(VfsError::new(
                VfsErrorKind::InvalidInput,
                "host.config.worker_threads",
            ));
        }
        if self.max_in_flight == 0 {
            return Err(VfsError::new(
                VfsErrorKind::InvalidInput,
                "host.config.max_in_flight",
            ));
        }
        if self.thread_name.is_empty() {
            return Err(VfsError::new(
                VfsErrorKind::InvalidInput,
                "host.config.thread_name",
            ));
        }
        Ok(())
    }
}
