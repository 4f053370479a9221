//! Native errno ↔ VFS error kind translation.
//!
//! This is the single source of truth for the mapping. Providers report raw
//! errno values; everything above them sees [`VfsErrorKind`].

use crate::VfsErrorKind;

/// Map a positive errno to a VFS error kind. Unknown codes become `Io`.
pub fn kind_from_errno(errno: i32) -> VfsErrorKind {
    match errno {
        libc::ENOENT => VfsErrorKind::NotFound,
        libc::EEXIST => VfsErrorKind::AlreadyExists,
        libc::ENOTDIR => VfsErrorKind::NotDir,
        libc::EISDIR => VfsErrorKind::IsDir,
        libc::ENOTEMPTY => VfsErrorKind::DirNotEmpty,
        libc::EACCES => VfsErrorKind::PermissionDenied,
        libc::EPERM => VfsErrorKind::OperationNotPermitted,
        libc::EINVAL => VfsErrorKind::InvalidInput,
        libc::ELOOP => VfsErrorKind::TooManySymlinks,
        libc::ENOSYS => VfsErrorKind::NotSupported,
        libc::EXDEV => VfsErrorKind::CrossDevice,
        libc::EBUSY => VfsErrorKind::Busy,
        libc::EROFS => VfsErrorKind::ReadOnlyFs,
        libc::EINTR => VfsErrorKind::Interrupted,
        libc::ENOSPC => VfsErrorKind::NoSpace,
        libc::EMFILE | libc::ENFILE => VfsErrorKind::TooManyOpenFiles,
        libc::ENAMETOOLONG => VfsErrorKind::NameTooLong,
        libc::EBADF => VfsErrorKind::BadHandle,
        // EWOULDBLOCK aliases EAGAIN on every supported target.
        code if code == libc::EAGAIN || code == libc::EWOULDBLOCK => VfsErrorKind::WouldBlock,
        // ENOTSUP and EOPNOTSUPP share a value on linux but not everywhere.
        code if code == libc::ENOTSUP || code == libc::EOPNOTSUPP => VfsErrorKind::NotSupported,
        _ => VfsErrorKind::Io,
    }
}

/// Canonical errno for a kind, used when an error is raised above the
/// provider and has no native code of its own.
pub fn errno_from_kind(kind: VfsErrorKind) -> i32 {
    match kind {
        VfsErrorKind::NotFound => libc::ENOENT,
        VfsErrorKind::AlreadyExists => libc::EEXIST,
        VfsErrorKind::NotDir => libc::ENOTDIR,
        VfsErrorKind::IsDir => libc::EISDIR,
        VfsErrorKind::DirNotEmpty => libc::ENOTEMPTY,
        VfsErrorKind::PermissionDenied => libc::EACCES,
        VfsErrorKind::OperationNotPermitted => libc::EPERM,
        VfsErrorKind::InvalidInput => libc::EINVAL,
        VfsErrorKind::TooManySymlinks => libc::ELOOP,
        VfsErrorKind::NotSupported => libc::ENOTSUP,
        VfsErrorKind::CrossDevice => libc::EXDEV,
        VfsErrorKind::Busy => libc::EBUSY,
        VfsErrorKind::ReadOnlyFs => libc::EROFS,
        VfsErrorKind::WouldBlock => libc::EAGAIN,
        VfsErrorKind::Interrupted => libc::EINTR,
        VfsErrorKind::NoSpace => libc::ENOSPC,
        VfsErrorKind::TooManyOpenFiles => libc::EMFILE,
        VfsErrorKind::NameTooLong => libc::ENAMETOOLONG,
        VfsErrorKind::BadHandle => libc::EBADF,
        VfsErrorKind::Io => libc::EIO,
    }
}

pub(crate) fn kind_from_io_kind(kind: std::io::ErrorKind) -> VfsErrorKind {
    match kind {
        std::io::ErrorKind::NotFound => VfsErrorKind::NotFound,
        std::io::ErrorKind::PermissionDenied => VfsErrorKind::PermissionDenied,
        std::io::ErrorKind::AlreadyExists => VfsErrorKind::AlreadyExists,
        std::io::ErrorKind::InvalidInput => VfsErrorKind::InvalidInput,
        std::io::ErrorKind::WouldBlock => VfsErrorKind::WouldBlock,
        std::io::ErrorKind::Interrupted => VfsErrorKind::Interrupted,
        std::io::ErrorKind::Unsupported => VfsErrorKind::NotSupported,
        _ => VfsErrorKind::Io,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_codes() {
        assert_eq!(kind_from_errno(libc::ENOENT), VfsErrorKind::NotFound);
        assert_eq!(kind_from_errno(libc::EEXIST), VfsErrorKind::AlreadyExists);
        assert_eq!(kind_from_errno(libc::EWOULDBLOCK), VfsErrorKind::WouldBlock);
        assert_eq!(kind_from_errno(libc::ENFILE), VfsErrorKind::TooManyOpenFiles);
        assert_eq!(kind_from_errno(0x7fff), VfsErrorKind::Io);
    }

    #[test]
    fn kinds_map_back_to_themselves() {
        let kinds = [
            VfsErrorKind::NotFound,
            VfsErrorKind::AlreadyExists,
            VfsErrorKind::NotDir,
            VfsErrorKind::IsDir,
            VfsErrorKind::DirNotEmpty,
            VfsErrorKind::PermissionDenied,
            VfsErrorKind::OperationNotPermitted,
            VfsErrorKind::InvalidInput,
            VfsErrorKind::TooManySymlinks,
            VfsErrorKind::NotSupported,
            VfsErrorKind::CrossDevice,
            VfsErrorKind::Busy,
            VfsErrorKind::ReadOnlyFs,
            VfsErrorKind::WouldBlock,
            VfsErrorKind::Interrupted,
            VfsErrorKind::NoSpace,
            VfsErrorKind::TooManyOpenFiles,
            VfsErrorKind::NameTooLong,
            VfsErrorKind::BadHandle,
            VfsErrorKind::Io,
        ];
        for kind in kinds {
            assert_eq!(kind_from_errno(errno_from_kind(kind)), kind, "{kind}");
        }
    }
}
