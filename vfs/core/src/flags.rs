use bitflags::bitflags;

bitflags! {
    /// Flags accepted by `open`. Providers translate them to native `O_*`
    /// bits; with neither `READ` nor `WRITE` set a file opens read-only.
    pub struct OpenFlags: u32 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const CREATE = 1 << 2;
        const EXCL = 1 << 3;
        const TRUNC = 1 << 4;
        const APPEND = 1 << 5;
        const SYNC = 1 << 6;
        const DSYNC = 1 << 7;
        const DIRECTORY = 1 << 8;
        const NOFOLLOW = 1 << 9;
    }
}

impl OpenFlags {
    pub fn read_write() -> Self {
        OpenFlags::READ | OpenFlags::WRITE
    }

    pub fn is_writable(self) -> bool {
        self.intersects(OpenFlags::WRITE | OpenFlags::APPEND)
    }
}
