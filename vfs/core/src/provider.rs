//! Contract between the request layer and an asynchronous I/O provider.
//!
//! A provider accepts one [`FsOp`] at a time together with a [`Completion`].
//! Acceptance is reported synchronously; the result of the operation is
//! reported later, exactly once, by calling the completion from the thread
//! that drives the provider's loop. A provider that cannot accept an
//! operation hands both back inside a [`Rejection`] and never calls the
//! completion.

use std::fmt;

use crate::{Buffer, OpenFlags, RawStat, VfsError, VfsPath};

/// A native filesystem operation, carrying everything it needs by value.
#[derive(Debug)]
pub enum FsOp {
    Stat {
        path: VfsPath,
    },
    Mkdir {
        path: VfsPath,
        mode: u32,
    },
    Open {
        path: VfsPath,
        flags: OpenFlags,
        mode: u32,
    },
    Rename {
        from: VfsPath,
        to: VfsPath,
    },
    CopyFile {
        from: VfsPath,
        to: VfsPath,
    },
    /// Hard link: `new` becomes another name for `existing`.
    Link {
        existing: VfsPath,
        new: VfsPath,
    },
    /// `link` becomes a symbolic link whose contents are `target`.
    Symlink {
        target: VfsPath,
        link: VfsPath,
    },
    Unlink {
        path: VfsPath,
    },
    Fstat {
        fd: u64,
    },
    /// Fill `buffer` from its start with bytes read at `offset`.
    Read {
        fd: u64,
        buffer: Buffer,
        offset: u64,
    },
    /// Write the logical contents of `buffer` at `offset`.
    Write {
        fd: u64,
        buffer: Buffer,
        offset: u64,
    },
    Ftruncate {
        fd: u64,
        size: u64,
    },
    Close {
        fd: u64,
    },
}

impl FsOp {
    /// Stable operation name used in logs and error contexts.
    pub fn name(&self) -> &'static str {
        match self {
            FsOp::Stat { .. } => "stat",
            FsOp::Mkdir { .. } => "mkdir",
            FsOp::Open { .. } => "open",
            FsOp::Rename { .. } => "rename",
            FsOp::CopyFile { .. } => "copyfile",
            FsOp::Link { .. } => "link",
            FsOp::Symlink { .. } => "symlink",
            FsOp::Unlink { .. } => "unlink",
            FsOp::Fstat { .. } => "fstat",
            FsOp::Read { .. } => "read",
            FsOp::Write { .. } => "write",
            FsOp::Ftruncate { .. } => "ftruncate",
            FsOp::Close { .. } => "close",
        }
    }

    /// Every path the operation names, in argument order.
    pub fn paths(&self) -> impl Iterator<Item = &VfsPath> {
        let pair = match self {
            FsOp::Stat { path }
            | FsOp::Mkdir { path, .. }
            | FsOp::Open { path, .. }
            | FsOp::Unlink { path } => [Some(path), None],
            FsOp::Rename { from, to } | FsOp::CopyFile { from, to } => [Some(from), Some(to)],
            FsOp::Link { existing, new } => [Some(existing), Some(new)],
            FsOp::Symlink { target, link } => [Some(target), Some(link)],
            FsOp::Fstat { .. }
            | FsOp::Read { .. }
            | FsOp::Write { .. }
            | FsOp::Ftruncate { .. }
            | FsOp::Close { .. } => [None, None],
        };
        pair.into_iter().flatten()
    }

    /// Take the buffer back out of a read or write.
    pub fn into_buffer(self) -> Option<Buffer> {
        match self {
            FsOp::Read { buffer, .. } | FsOp::Write { buffer, .. } => Some(buffer),
            _ => None,
        }
    }
}

/// What a provider reports when an operation finishes.
///
/// `result` is negative errno on failure. On success it is the operation's
/// value: bytes transferred, the new descriptor, the new size, or zero.
#[derive(Debug, Default)]
pub struct RawCompletion {
    pub result: i64,
    pub stat: Option<RawStat>,
    pub buffer: Option<Buffer>,
}

impl RawCompletion {
    pub fn new(result: i64) -> Self {
        Self {
            result,
            ..Default::default()
        }
    }

    pub fn failed(error: &VfsError) -> Self {
        Self::new(-i64::from(error.errno()))
    }

    pub fn with_stat(mut self, stat: RawStat) -> Self {
        self.stat = Some(stat);
        self
    }

    pub fn with_buffer(mut self, buffer: Option<Buffer>) -> Self {
        self.buffer = buffer;
        self
    }
}

/// Per-request continuation. Owns all request state until it is called or
/// dropped.
pub type Completion = Box<dyn FnOnce(RawCompletion)>;

pub trait IoProvider {
    /// Queue `op`. On `Ok` the provider owns `completion` and will call it
    /// exactly once from its loop, never from inside `submit`.
    fn submit(&self, op: FsOp, completion: Completion) -> Result<(), Rejection>;
}

/// An operation the provider refused before doing any I/O.
pub struct Rejection {
    error: VfsError,
    op: FsOp,
    completion: Completion,
}

impl Rejection {
    pub fn new(error: VfsError, op: FsOp, completion: Completion) -> Self {
        Self {
            error,
            op,
            completion,
        }
    }

    pub fn error(&self) -> VfsError {
        self.error
    }

    pub fn op(&self) -> &FsOp {
        &self.op
    }

    /// Release the operation and its request state without running the
    /// completion.
    pub fn into_error(self) -> VfsError {
        self.error
    }

    /// Report the refusal through the completion as if the operation had
    /// failed natively. Used where no caller is left to return it to, e.g.
    /// from inside another request's completion.
    pub fn deliver(self) {
        let Rejection {
            error,
            op,
            completion,
        } = self;
        completion(RawCompletion::failed(&error).with_buffer(op.into_buffer()));
    }
}

impl fmt::Debug for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejection")
            .field("error", &self.error)
            .field("op", &self.op.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::VfsErrorKind;

    #[test]
    fn paths_in_argument_order() {
        let op = FsOp::Link {
            existing: VfsPath::new("/a"),
            new: VfsPath::new("/b"),
        };
        let paths: Vec<&str> = op.paths().map(VfsPath::as_str).collect();
        assert_eq!(paths, ["/a", "/b"]);
        assert_eq!(FsOp::Close { fd: 3 }.paths().count(), 0);
    }

    #[test]
    fn deliver_runs_completion_with_negative_errno_and_buffer() {
        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        let op = FsOp::Read {
            fd: 4,
            buffer: Buffer::new(16),
            offset: 0,
        };
        let rejection = Rejection::new(
            VfsError::new(VfsErrorKind::WouldBlock, "test.submit"),
            op,
            Box::new(move |raw| sink.set(Some((raw.result, raw.buffer.map(|b| b.capacity()))))),
        );
        rejection.deliver();
        assert_eq!(
            seen.get(),
            Some((-i64::from(libc::EAGAIN), Some(16)))
        );
    }

    #[test]
    fn into_error_never_runs_completion() {
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        let rejection = Rejection::new(
            VfsError::new(VfsErrorKind::InvalidInput, "test.submit"),
            FsOp::Unlink {
                path: VfsPath::new("/x"),
            },
            Box::new(move |_| flag.set(true)),
        );
        assert_eq!(rejection.into_error().kind(), VfsErrorKind::InvalidInput);
        assert!(!called.get());
    }
}
