//! Error types shared by every filesystem backend.

use std::fmt;

use thiserror::Error;

use crate::errno;

pub type VfsResult<T> = Result<T, VfsError>;

/// Classification of a failed filesystem request.
///
/// Kinds follow the POSIX error space the native providers report in, so a
/// kind can always be turned back into an errno (see [`VfsError::errno`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum VfsErrorKind {
    NotFound,
    AlreadyExists,
    NotDir,
    IsDir,
    DirNotEmpty,
    PermissionDenied,
    OperationNotPermitted,
    InvalidInput,
    TooManySymlinks,
    NotSupported,
    CrossDevice,
    Busy,
    ReadOnlyFs,
    WouldBlock,
    Interrupted,
    NoSpace,
    TooManyOpenFiles,
    NameTooLong,
    BadHandle,
    Io,
}

impl VfsErrorKind {
    /// Stable string name for a kind (logging only).
    pub fn as_str(self) -> &'static str {
        match self {
            VfsErrorKind::NotFound => "not_found",
            VfsErrorKind::AlreadyExists => "already_exists",
            VfsErrorKind::NotDir => "not_dir",
            VfsErrorKind::IsDir => "is_dir",
            VfsErrorKind::DirNotEmpty => "dir_not_empty",
            VfsErrorKind::PermissionDenied => "permission_denied",
            VfsErrorKind::OperationNotPermitted => "operation_not_permitted",
            VfsErrorKind::InvalidInput => "invalid_input",
            VfsErrorKind::TooManySymlinks => "too_many_symlinks",
            VfsErrorKind::NotSupported => "not_supported",
            VfsErrorKind::CrossDevice => "cross_device",
            VfsErrorKind::Busy => "busy",
            VfsErrorKind::ReadOnlyFs => "read_only_fs",
            VfsErrorKind::WouldBlock => "would_block",
            VfsErrorKind::Interrupted => "interrupted",
            VfsErrorKind::NoSpace => "no_space",
            VfsErrorKind::TooManyOpenFiles => "too_many_open_files",
            VfsErrorKind::NameTooLong => "name_too_long",
            VfsErrorKind::BadHandle => "bad_handle",
            VfsErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for VfsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed request: what went wrong, the native code, and where.
///
/// `context` names the operation that failed (`"fs.open"`,
/// `"host.submit.capacity"`, ...). Errors are plain values so they can be
/// handed to any number of callbacks without allocation.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("{context}: {kind} (errno {errno})")]
pub struct VfsError {
    kind: VfsErrorKind,
    errno: i32,
    context: &'static str,
}

impl VfsError {
    pub fn new(kind: VfsErrorKind, context: &'static str) -> Self {
        Self {
            kind,
            errno: errno::errno_from_kind(kind),
            context,
        }
    }

    /// Build an error from a positive native error code.
    pub fn from_errno(errno: i32, context: &'static str) -> Self {
        Self {
            kind: errno::kind_from_errno(errno),
            errno,
            context,
        }
    }

    /// Build an error from an I/O error raised while talking to the host.
    pub fn from_io(err: &std::io::Error, context: &'static str) -> Self {
        match err.raw_os_error() {
            Some(code) => Self::from_errno(code, context),
            None => Self::new(errno::kind_from_io_kind(err.kind()), context),
        }
    }

    pub fn kind(&self) -> VfsErrorKind {
        self.kind
    }

    /// Positive POSIX error code (`ENOENT`, `EEXIST`, ...).
    pub fn errno(&self) -> i32 {
        self.errno
    }

    pub fn context(&self) -> &'static str {
        self.context
    }
}
