//! Asynchronous, backend-agnostic filesystem requests.
//!
//! Callers build [`VfsPath`]s, issue operations through the [`FileSystem`]
//! trait and receive results in callbacks. [`LoopFs`] implements the trait
//! over any [`IoProvider`]; concrete providers live in their own crates.

pub mod buffer;
pub mod errno;
pub mod error;
pub mod flags;
pub mod fs;
pub mod handle;
pub mod loop_fs;
pub mod path;
pub mod provider;
mod request;
pub mod stat;

pub use buffer::Buffer;
pub use error::{VfsError, VfsErrorKind, VfsResult};
pub use flags::OpenFlags;
pub use fs::FileSystem;
pub use handle::FileHandle;
pub use loop_fs::LoopFs;
pub use path::VfsPath;
pub use provider::{Completion, FsOp, IoProvider, RawCompletion, Rejection};
pub use stat::{FileType, RawStat, Stat, Timespec};
