//! Open file handles.

use std::fmt;

use crate::VfsPath;

/// A backend descriptor paired with the path it was opened from.
///
/// Produced by a successful `open`; consumed by every handle-addressed
/// operation. `close` takes the handle by value, so a closed handle cannot be
/// reused unless the caller kept a clone.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileHandle {
    path: VfsPath,
    fd: u64,
}

impl FileHandle {
    pub fn new(path: VfsPath, fd: u64) -> Self {
        Self { path, fd }
    }

    pub fn path(&self) -> &VfsPath {
        &self.path
    }

    /// Native descriptor. Only meaningful for handles delivered by a
    /// successful `open`.
    pub fn fd(&self) -> u64 {
        self.fd
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (fd {})", self.path, self.fd)
    }
}
