//! The filesystem capability set every backend implements.
//!
//! All operations are asynchronous. A call returns `Ok(())` once the request
//! is accepted, and the callback then runs exactly once, later, from the
//! backend's loop. An `Err` return means nothing was submitted: the callback
//! has been dropped without being called.

use crate::{Buffer, FileHandle, OpenFlags, Stat, VfsPath, VfsResult};

pub type ExistsCallback = Box<dyn FnOnce(&VfsPath, VfsResult<bool>)>;
pub type StatCallback = Box<dyn FnOnce(&VfsPath, VfsResult<Stat>)>;
pub type FstatCallback = Box<dyn FnOnce(&FileHandle, VfsResult<Stat>)>;
/// Used by `mkdir`, `mkdirs`, `create` and `unlink`.
pub type PathCallback = Box<dyn FnOnce(&VfsPath, VfsResult<()>)>;
/// Used by `rename`, `copy`, `link` and `symlink`; paths in argument order.
pub type PathPairCallback = Box<dyn FnOnce(&VfsPath, &VfsPath, VfsResult<()>)>;
pub type OpenCallback = Box<dyn FnOnce(&VfsPath, VfsResult<FileHandle>)>;
/// Bytes transferred and the buffer, which always comes back. On success its
/// size equals the byte count.
pub type IoCallback = Box<dyn FnOnce(&FileHandle, VfsResult<usize>, Buffer)>;
pub type TruncateCallback = Box<dyn FnOnce(&FileHandle, VfsResult<u64>)>;
pub type CloseCallback = Box<dyn FnOnce(&FileHandle, VfsResult<()>)>;

pub trait FileSystem {
    /// Not-found is reported as `Ok(false)`, never as an error.
    fn exists(&self, path: &VfsPath, callback: ExistsCallback) -> VfsResult<()>;

    fn stat(&self, path: &VfsPath, callback: StatCallback) -> VfsResult<()>;

    fn mkdir(&self, path: &VfsPath, mode: u32, callback: PathCallback) -> VfsResult<()>;

    /// Create `path` and every missing ancestor. Directories that already
    /// exist, the leaf included, are not an error.
    fn mkdirs(&self, path: &VfsPath, mode: u32, callback: PathCallback) -> VfsResult<()>;

    /// Create a new regular file. Fails with `AlreadyExists` if `path` exists.
    /// The file is closed again before the request is released.
    fn create(&self, path: &VfsPath, mode: u32, callback: PathCallback) -> VfsResult<()>;

    /// Move `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &VfsPath, to: &VfsPath, callback: PathPairCallback) -> VfsResult<()>;

    /// Copy the contents of `from` to `to`, replacing `to` if it exists.
    fn copy(&self, from: &VfsPath, to: &VfsPath, callback: PathPairCallback) -> VfsResult<()>;

    /// Make `new` a hard link to `existing`.
    fn link(&self, existing: &VfsPath, new: &VfsPath, callback: PathPairCallback)
    -> VfsResult<()>;

    /// Make `link` a symbolic link pointing at `target`.
    fn symlink(&self, target: &VfsPath, link: &VfsPath, callback: PathPairCallback)
    -> VfsResult<()>;

    fn unlink(&self, path: &VfsPath, callback: PathCallback) -> VfsResult<()>;

    fn open(
        &self,
        path: &VfsPath,
        flags: OpenFlags,
        mode: u32,
        callback: OpenCallback,
    ) -> VfsResult<()>;

    fn fstat(&self, file: &FileHandle, callback: FstatCallback) -> VfsResult<()>;

    /// Read up to `buffer.capacity()` bytes at `offset` into the start of
    /// `buffer`. A short read is not an error.
    fn read(&self, file: &FileHandle, buffer: Buffer, offset: u64, callback: IoCallback)
    -> VfsResult<()>;

    /// Write the contents of `buffer` at `offset`. A short write is not an
    /// error.
    fn write(
        &self,
        file: &FileHandle,
        buffer: Buffer,
        offset: u64,
        callback: IoCallback,
    ) -> VfsResult<()>;

    /// Set the file length; the callback receives the resulting size.
    fn truncate(&self, file: &FileHandle, size: u64, callback: TruncateCallback)
    -> VfsResult<()>;

    fn close(&self, file: FileHandle, callback: CloseCallback) -> VfsResult<()>;
}
