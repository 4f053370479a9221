#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub(crate) use unix::execute;

#[cfg(not(unix))]
pub(crate) fn execute(op: vfs_core::FsOp) -> vfs_core::RawCompletion {
    let error = vfs_core::VfsError::new(vfs_core::VfsErrorKind::NotSupported, "host.platform");
    vfs_core::RawCompletion::failed(&error).with_buffer(op.into_buffer())
}
