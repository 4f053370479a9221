use std::ffi::CString;
use std::io;
use std::mem;

use vfs_core::{FileType, FsOp, OpenFlags, RawCompletion, RawStat, Timespec, VfsError, VfsPath};

/// Run one operation to completion on the calling (worker) thread.
pub(crate) fn execute(op: FsOp) -> RawCompletion {
    match op {
        FsOp::Stat { path } => match stat(&path) {
            Ok(st) => RawCompletion::new(0).with_stat(st),
            Err(err) => failed(&err),
        },
        FsOp::Mkdir { path, mode } => complete(mkdir(&path, mode).map(|()| 0)),
        FsOp::Open { path, flags, mode } => complete(open(&path, flags, mode)),
        FsOp::Rename { from, to } => complete(rename(&from, &to).map(|()| 0)),
        FsOp::CopyFile { from, to } => {
            complete(std::fs::copy(from.as_std_path(), to.as_std_path()).map(|_| 0))
        }
        FsOp::Link { existing, new } => complete(link(&existing, &new).map(|()| 0)),
        FsOp::Symlink { target, link } => complete(symlink(&target, &link).map(|()| 0)),
        FsOp::Unlink { path } => complete(unlink(&path).map(|()| 0)),
        FsOp::Fstat { fd } => match fstat(fd) {
            Ok(st) => RawCompletion::new(0).with_stat(st),
            Err(err) => failed(&err),
        },
        FsOp::Read {
            fd,
            mut buffer,
            offset,
        } => complete(pread(fd, buffer.storage_mut(), offset)).with_buffer(Some(buffer)),
        FsOp::Write {
            fd,
            buffer,
            offset,
        } => complete(pwrite(fd, buffer.data(), offset)).with_buffer(Some(buffer)),
        FsOp::Ftruncate { fd, size } => complete(ftruncate(fd, size)),
        FsOp::Close { fd } => complete(close(fd).map(|()| 0)),
    }
}

fn complete(result: io::Result<i64>) -> RawCompletion {
    match result {
        Ok(value) => RawCompletion::new(value),
        Err(err) => failed(&err),
    }
}

fn failed(err: &io::Error) -> RawCompletion {
    RawCompletion::failed(&VfsError::from_io(err, "host.syscall"))
}

fn c_path(path: &VfsPath) -> io::Result<CString> {
    CString::new(path.as_str())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))
}

fn raw_fd(fd: u64) -> io::Result<libc::c_int> {
    libc::c_int::try_from(fd).map_err(|_| io::Error::from_raw_os_error(libc::EBADF))
}

fn raw_offset(offset: u64) -> io::Result<libc::off_t> {
    libc::off_t::try_from(offset).map_err(|_| io::Error::from_raw_os_error(libc::EINVAL))
}

fn stat(path: &VfsPath) -> io::Result<RawStat> {
    let cstr = c_path(path)?;
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    let res = unsafe { libc::stat(cstr.as_ptr(), &mut st) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(stat_from_libc(&st))
}

fn fstat(fd: u64) -> io::Result<RawStat> {
    let fd = raw_fd(fd)?;
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    let res = unsafe { libc::fstat(fd, &mut st) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(stat_from_libc(&st))
}

fn mkdir(path: &VfsPath, mode: u32) -> io::Result<()> {
    let cstr = c_path(path)?;
    let res = unsafe { libc::mkdir(cstr.as_ptr(), mode as libc::mode_t) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn open(path: &VfsPath, flags: OpenFlags, mode: u32) -> io::Result<i64> {
    let cstr = c_path(path)?;
    let mut oflags = libc::O_CLOEXEC;
    if flags.contains(OpenFlags::NOFOLLOW) {
        oflags |= libc::O_NOFOLLOW;
    }
    if flags.contains(OpenFlags::DIRECTORY) {
        oflags |= libc::O_DIRECTORY;
    }
    if flags.contains(OpenFlags::TRUNC) {
        oflags |= libc::O_TRUNC;
    }
    if flags.contains(OpenFlags::CREATE) {
        oflags |= libc::O_CREAT;
    }
    if flags.contains(OpenFlags::EXCL) {
        oflags |= libc::O_EXCL;
    }
    if flags.contains(OpenFlags::APPEND) {
        oflags |= libc::O_APPEND;
    }
    if flags.contains(OpenFlags::SYNC) {
        oflags |= libc::O_SYNC;
    }
    if flags.contains(OpenFlags::DSYNC) {
        oflags |= libc::O_DSYNC;
    }

    let access = if flags.contains(OpenFlags::READ) && flags.is_writable() {
        libc::O_RDWR
    } else if flags.is_writable() {
        libc::O_WRONLY
    } else {
        libc::O_RDONLY
    };
    oflags |= access;
    let fd = unsafe { libc::open(cstr.as_ptr(), oflags, mode as libc::c_uint) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(i64::from(fd))
}

fn rename(from: &VfsPath, to: &VfsPath) -> io::Result<()> {
    let from = c_path(from)?;
    let to = c_path(to)?;
    let res = unsafe { libc::rename(from.as_ptr(), to.as_ptr()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn link(existing: &VfsPath, new: &VfsPath) -> io::Result<()> {
    let existing = c_path(existing)?;
    let new = c_path(new)?;
    let res = unsafe { libc::link(existing.as_ptr(), new.as_ptr()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn symlink(target: &VfsPath, link: &VfsPath) -> io::Result<()> {
    let target = c_path(target)?;
    let link = c_path(link)?;
    let res = unsafe { libc::symlink(target.as_ptr(), link.as_ptr()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn unlink(path: &VfsPath) -> io::Result<()> {
    let cstr = c_path(path)?;
    let res = unsafe { libc::unlink(cstr.as_ptr()) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn pread(fd: u64, buf: &mut [u8], offset: u64) -> io::Result<i64> {
    let fd = raw_fd(fd)?;
    let offset = raw_offset(offset)?;
    let res = unsafe { libc::pread(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), offset) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as i64)
}

fn pwrite(fd: u64, buf: &[u8], offset: u64) -> io::Result<i64> {
    let fd = raw_fd(fd)?;
    let offset = raw_offset(offset)?;
    let res = unsafe { libc::pwrite(fd, buf.as_ptr() as *const libc::c_void, buf.len(), offset) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(res as i64)
}

/// Reports the new length on success.
fn ftruncate(fd: u64, size: u64) -> io::Result<i64> {
    let fd = raw_fd(fd)?;
    let len = raw_offset(size)?;
    let res = unsafe { libc::ftruncate(fd, len) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(len as i64)
}

fn close(fd: u64) -> io::Result<()> {
    let fd = raw_fd(fd)?;
    let res = unsafe { libc::close(fd) };
    if res < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

fn stat_from_libc(st: &libc::stat) -> RawStat {
    let file_type = match st.st_mode & libc::S_IFMT {
        libc::S_IFREG => FileType::RegularFile,
        libc::S_IFDIR => FileType::Directory,
        libc::S_IFLNK => FileType::Symlink,
        libc::S_IFBLK => FileType::BlockDevice,
        libc::S_IFCHR => FileType::CharDevice,
        libc::S_IFIFO => FileType::Fifo,
        libc::S_IFSOCK => FileType::Socket,
        _ => FileType::Unknown,
    };
    let (atime, mtime, ctime) = stat_times(st);
    RawStat {
        inode: st.st_ino as u64,
        file_type,
        mode: (st.st_mode & 0o7777) as u32,
        nlink: st.st_nlink as u64,
        uid: st.st_uid,
        gid: st.st_gid,
        size: st.st_size as u64,
        atime,
        mtime,
        ctime,
    }
}

fn stat_times(st: &libc::stat) -> (Timespec, Timespec, Timespec) {
    let atime = Timespec {
        secs: st.st_atime as i64,
        nanos: st.st_atime_nsec as i64,
    };
    let mtime = Timespec {
        secs: st.st_mtime as i64,
        nanos: st.st_mtime_nsec as i64,
    };
    let ctime = Timespec {
        secs: st.st_ctime as i64,
        nanos: st.st_ctime_nsec as i64,
    };
    (atime, mtime, ctime)
}
