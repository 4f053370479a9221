//! Metadata snapshots.

/// Seconds and nanoseconds as reported by the native stat call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timespec {
    pub secs: i64,
    pub nanos: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FileType {
    RegularFile,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
    #[default]
    Unknown,
}

/// Stat result as a provider reports it, before any conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawStat {
    pub inode: u64,
    pub file_type: FileType,
    /// Permission bits (`st_mode & 0o7777`).
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub atime: Timespec,
    pub mtime: Timespec,
    pub ctime: Timespec,
}

/// Immutable metadata snapshot of a filesystem entry.
///
/// Timestamps are milliseconds since the unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stat {
    inode: u64,
    size: u64,
    atime: u64,
    mtime: u64,
    ctime: u64,
    uid: u32,
    gid: u32,
    mode: u32,
    nlink: u64,
    file_type: FileType,
}

impl Stat {
    pub fn inode(&self) -> u64 {
        self.inode
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn atime(&self) -> u64 {
        self.atime
    }

    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    pub fn ctime(&self) -> u64 {
        self.ctime
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn gid(&self) -> u32 {
        self.gid
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn nlink(&self) -> u64 {
        self.nlink
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::RegularFile
    }

    pub fn is_link(&self) -> bool {
        self.file_type == FileType::Symlink
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_block(&self) -> bool {
        self.file_type == FileType::BlockDevice
    }

    pub fn is_fifo(&self) -> bool {
        self.file_type == FileType::Fifo
    }

    pub fn is_sock(&self) -> bool {
        self.file_type == FileType::Socket
    }
}

impl From<&RawStat> for Stat {
    fn from(raw: &RawStat) -> Self {
        Self {
            inode: raw.inode,
            size: raw.size,
            atime: timestamp_millis(raw.atime),
            mtime: timestamp_millis(raw.mtime),
            ctime: timestamp_millis(raw.ctime),
            uid: raw.uid,
            gid: raw.gid,
            mode: raw.mode,
            nlink: raw.nlink,
            file_type: raw.file_type,
        }
    }
}

/// Milliseconds for a native timestamp.
///
/// Nanoseconds are rounded to the nearest millisecond; a round-up to 1000 ms
/// carries into the seconds. Times before the epoch clamp to zero.
pub fn timestamp_millis(ts: Timespec) -> u64 {
    let mut secs = ts.secs;
    let mut millis = (ts.nanos.clamp(0, 999_999_999) + 500_000) / 1_000_000;
    if millis > 999 {
        secs = secs.saturating_add(1);
        millis = 0;
    }
    if secs < 0 {
        return 0;
    }
    (secs as u64).saturating_mul(1000).saturating_add(millis as u64)
}
