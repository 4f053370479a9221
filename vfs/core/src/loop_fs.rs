//! [`FileSystem`] over any [`IoProvider`].
//!
//! Each operation packs its owned inputs and the user callback into a
//! request, wraps the request in the provider completion and submits it.
//! The completion is the only owner of the request from then on: it runs the
//! user callback, and the request is released when the completion returns.
//! A rejected submission drops the completion, and with it the request,
//! before the operation returns.
//!
//! Completions that submit follow-up work (the close after `create`, the
//! ancestor walk of `mkdirs`) hold the provider weakly, since the provider
//! stores the completions that refer to it.

use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::fs::{
    CloseCallback, ExistsCallback, FileSystem, FstatCallback, IoCallback, OpenCallback,
    PathCallback, PathPairCallback, StatCallback, TruncateCallback,
};
use crate::provider::{Completion, FsOp, IoProvider, RawCompletion};
use crate::request::{Request, Submission, translate};
use crate::{Buffer, FileHandle, OpenFlags, Stat, VfsError, VfsErrorKind, VfsPath, VfsResult};

type Done = Box<dyn FnOnce(VfsResult<()>)>;

/// A filesystem driven by one provider loop, owned exclusively or shared
/// with other filesystems on the same loop.
pub struct LoopFs<P> {
    provider: Rc<P>,
}

impl<P> Clone for LoopFs<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Rc::clone(&self.provider),
        }
    }
}

impl<P: IoProvider + 'static> LoopFs<P> {
    pub fn new(provider: P) -> Self {
        Self::shared(Rc::new(provider))
    }

    /// Attach to a loop that other filesystems may also submit to.
    pub fn shared(provider: Rc<P>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn submit(&self, op: FsOp, submission: Submission) -> VfsResult<()> {
        let Submission { completion, mark } = submission;
        match self.provider.submit(op, completion) {
            Ok(()) => {
                mark.submitted();
                Ok(())
            }
            Err(rejection) => {
                mark.rejected();
                let error = rejection.error();
                debug!(op = rejection.op().name(), %error, "submission rejected");
                Err(rejection.into_error())
            }
        }
    }

    fn dispatch<S: 'static>(
        &self,
        op: FsOp,
        request: Request<S>,
        on_complete: impl FnOnce(S, RawCompletion) + 'static,
    ) -> VfsResult<()> {
        self.submit(op, completion_for(request, on_complete))
    }

    fn path_op(
        &self,
        context: &'static str,
        op: FsOp,
        path: &VfsPath,
        callback: PathCallback,
    ) -> VfsResult<()> {
        let request = Request::new(context, (path.clone(), callback));
        self.dispatch(op, request, move |(path, callback), raw| {
            callback(&path, translate(raw.result, context).map(|_| ()));
        })
    }

    fn path_pair_op(
        &self,
        context: &'static str,
        op: FsOp,
        first: &VfsPath,
        second: &VfsPath,
        callback: PathPairCallback,
    ) -> VfsResult<()> {
        let request = Request::new(context, (first.clone(), second.clone(), callback));
        self.dispatch(op, request, move |(first, second, callback), raw| {
            callback(&first, &second, translate(raw.result, context).map(|_| ()));
        })
    }

    fn io_op(
        &self,
        context: &'static str,
        op: FsOp,
        file: &FileHandle,
        callback: IoCallback,
    ) -> VfsResult<()> {
        let request = Request::new(context, (file.clone(), callback));
        self.dispatch(op, request, move |(file, callback), raw| {
            let mut buffer = raw.buffer.unwrap_or_default();
            let result = translate(raw.result, context).map(|count| {
                buffer.truncate(count as usize);
                buffer.size()
            });
            callback(&file, result, buffer);
        })
    }
}

impl<P: IoProvider + 'static> FileSystem for LoopFs<P> {
    fn exists(&self, path: &VfsPath, callback: ExistsCallback) -> VfsResult<()> {
        let request = Request::new("fs.exists", (path.clone(), callback));
        let op = FsOp::Stat { path: path.clone() };
        self.dispatch(op, request, |(path, callback), raw| {
            let result = match translate(raw.result, "fs.exists") {
                Ok(_) => Ok(true),
                Err(err) if err.kind() == VfsErrorKind::NotFound => Ok(false),
                Err(err) => Err(err),
            };
            callback(&path, result);
        })
    }

    fn stat(&self, path: &VfsPath, callback: StatCallback) -> VfsResult<()> {
        let request = Request::new("fs.stat", (path.clone(), callback));
        let op = FsOp::Stat { path: path.clone() };
        self.dispatch(op, request, |(path, callback), raw| {
            callback(&path, stat_result(&raw, "fs.stat"));
        })
    }

    fn mkdir(&self, path: &VfsPath, mode: u32, callback: PathCallback) -> VfsResult<()> {
        let op = FsOp::Mkdir {
            path: path.clone(),
            mode,
        };
        self.path_op("fs.mkdir", op, path, callback)
    }

    fn mkdirs(&self, path: &VfsPath, mode: u32, callback: PathCallback) -> VfsResult<()> {
        let leaf = path.clone();
        let done: Done = Box::new(move |result| callback(&leaf, result));
        let submission = mkdirs_step(
            Rc::downgrade(&self.provider),
            path.clone(),
            mode,
            false,
            done,
        );
        let op = FsOp::Mkdir {
            path: path.clone(),
            mode,
        };
        self.submit(op, submission)
    }

    fn create(&self, path: &VfsPath, mode: u32, callback: PathCallback) -> VfsResult<()> {
        let request = Request::new("fs.create", (path.clone(), callback));
        let mark = request.phase_mark();
        let provider = Rc::downgrade(&self.provider);

        let completion: Completion = Box::new(move |raw| {
            let mut request = request;
            let Some((path, callback)) = request.complete() else {
                return;
            };
            let fd = match translate(raw.result, "fs.create") {
                Ok(fd) => fd,
                Err(err) => return callback(&path, Err(err)),
            };
            callback(&path, Ok(()));

            // The create request stays alive until its descriptor is closed.
            let close = Request::new("fs.create.close", (path, request));
            let submission = completion_for(close, move |(path, _create), raw| {
                if let Err(error) = translate(raw.result, "fs.create.close") {
                    warn!(%path, fd, %error, "closing newly created file failed");
                }
            });
            submit_chained(&provider, FsOp::Close { fd }, submission);
        });

        let op = FsOp::Open {
            path: path.clone(),
            flags: OpenFlags::CREATE | OpenFlags::EXCL | OpenFlags::WRITE,
            mode,
        };
        self.submit(op, Submission { completion, mark })
    }

    fn rename(&self, from: &VfsPath, to: &VfsPath, callback: PathPairCallback) -> VfsResult<()> {
        let op = FsOp::Rename {
            from: from.clone(),
            to: to.clone(),
        };
        self.path_pair_op("fs.rename", op, from, to, callback)
    }

    fn copy(&self, from: &VfsPath, to: &VfsPath, callback: PathPairCallback) -> VfsResult<()> {
        let op = FsOp::CopyFile {
            from: from.clone(),
            to: to.clone(),
        };
        self.path_pair_op("fs.copy", op, from, to, callback)
    }

    fn link(
        &self,
        existing: &VfsPath,
        new: &VfsPath,
        callback: PathPairCallback,
    ) -> VfsResult<()> {
        let op = FsOp::Link {
            existing: existing.clone(),
            new: new.clone(),
        };
        self.path_pair_op("fs.link", op, existing, new, callback)
    }

    fn symlink(
        &self,
        target: &VfsPath,
        link: &VfsPath,
        callback: PathPairCallback,
    ) -> VfsResult<()> {
        let op = FsOp::Symlink {
            target: target.clone(),
            link: link.clone(),
        };
        self.path_pair_op("fs.symlink", op, target, link, callback)
    }

    fn unlink(&self, path: &VfsPath, callback: PathCallback) -> VfsResult<()> {
        let op = FsOp::Unlink { path: path.clone() };
        self.path_op("fs.unlink", op, path, callback)
    }

    fn open(
        &self,
        path: &VfsPath,
        flags: OpenFlags,
        mode: u32,
        callback: OpenCallback,
    ) -> VfsResult<()> {
        let request = Request::new("fs.open", (path.clone(), callback));
        let op = FsOp::Open {
            path: path.clone(),
            flags,
            mode,
        };
        self.dispatch(op, request, |(path, callback), raw| {
            let result =
                translate(raw.result, "fs.open").map(|fd| FileHandle::new(path.clone(), fd));
            callback(&path, result);
        })
    }

    fn fstat(&self, file: &FileHandle, callback: FstatCallback) -> VfsResult<()> {
        let request = Request::new("fs.fstat", (file.clone(), callback));
        let op = FsOp::Fstat { fd: file.fd() };
        self.dispatch(op, request, |(file, callback), raw| {
            callback(&file, stat_result(&raw, "fs.fstat"));
        })
    }

    fn read(
        &self,
        file: &FileHandle,
        buffer: Buffer,
        offset: u64,
        callback: IoCallback,
    ) -> VfsResult<()> {
        let op = FsOp::Read {
            fd: file.fd(),
            buffer,
            offset,
        };
        self.io_op("fs.read", op, file, callback)
    }

    fn write(
        &self,
        file: &FileHandle,
        buffer: Buffer,
        offset: u64,
        callback: IoCallback,
    ) -> VfsResult<()> {
        let op = FsOp::Write {
            fd: file.fd(),
            buffer,
            offset,
        };
        self.io_op("fs.write", op, file, callback)
    }

    fn truncate(
        &self,
        file: &FileHandle,
        size: u64,
        callback: TruncateCallback,
    ) -> VfsResult<()> {
        let request = Request::new("fs.truncate", (file.clone(), callback));
        let op = FsOp::Ftruncate {
            fd: file.fd(),
            size,
        };
        self.dispatch(op, request, |(file, callback), raw| {
            callback(&file, translate(raw.result, "fs.truncate"));
        })
    }

    fn close(&self, file: FileHandle, callback: CloseCallback) -> VfsResult<()> {
        let op = FsOp::Close { fd: file.fd() };
        let request = Request::new("fs.close", (file, callback));
        self.dispatch(op, request, |(file, callback), raw| {
            callback(&file, translate(raw.result, "fs.close").map(|_| ()));
        })
    }
}

fn completion_for<S: 'static>(
    request: Request<S>,
    on_complete: impl FnOnce(S, RawCompletion) + 'static,
) -> Submission {
    let mark = request.phase_mark();
    let completion: Completion = Box::new(move |raw| {
        let mut request = request;
        if let Some(state) = request.complete() {
            on_complete(state, raw);
        }
    });
    Submission { completion, mark }
}

/// Submit follow-up work from inside a completion. There is no caller left
/// to hand a rejection to, so it is delivered through the completion.
fn submit_chained<P: IoProvider>(provider: &Weak<P>, op: FsOp, submission: Submission) {
    let Submission { completion, mark } = submission;
    let Some(provider) = provider.upgrade() else {
        mark.rejected();
        let error = VfsError::new(VfsErrorKind::Io, "fs.chain.provider_gone");
        debug!(op = op.name(), %error, "provider dropped before follow-up submission");
        completion(RawCompletion::failed(&error).with_buffer(op.into_buffer()));
        return;
    };
    match provider.submit(op, completion) {
        Ok(()) => mark.submitted(),
        Err(rejection) => {
            mark.rejected();
            let error = rejection.error();
            debug!(op = rejection.op().name(), %error, "follow-up submission rejected");
            rejection.deliver();
        }
    }
}

/// One `mkdir` of the `mkdirs` walk.
///
/// A missing parent is created first and the directory retried once.
/// Recursion only moves to strictly shorter ancestors, so it stops at the
/// root or at the first ancestor that exists.
fn mkdirs_step<P: IoProvider + 'static>(
    provider: Weak<P>,
    path: VfsPath,
    mode: u32,
    retried: bool,
    done: Done,
) -> Submission {
    let request = Request::new("fs.mkdirs", (path, done));
    completion_for(request, move |(path, done), raw| {
        let err = match translate(raw.result, "fs.mkdirs") {
            Ok(_) => return done(Ok(())),
            Err(err) if err.kind() == VfsErrorKind::AlreadyExists => return done(Ok(())),
            Err(err) => err,
        };
        let parent = path.parent();
        if retried || err.kind() != VfsErrorKind::NotFound || !path.starts_with_dir(&parent) {
            return done(Err(err));
        }

        let retry_provider = provider.clone();
        let after_parent: Done = Box::new(move |result| {
            if let Err(err) = result {
                return done(Err(err));
            }
            let op = FsOp::Mkdir {
                path: path.clone(),
                mode,
            };
            let retry = mkdirs_step(retry_provider.clone(), path, mode, true, done);
            submit_chained(&retry_provider, op, retry);
        });

        let op = FsOp::Mkdir {
            path: parent.clone(),
            mode,
        };
        let step = mkdirs_step(provider.clone(), parent, mode, false, after_parent);
        submit_chained(&provider, op, step);
    })
}

fn stat_result(raw: &RawCompletion, context: &'static str) -> VfsResult<Stat> {
    translate(raw.result, context)?;
    raw.stat
        .as_ref()
        .map(Stat::from)
        .ok_or_else(|| VfsError::new(VfsErrorKind::Io, context))
}
