//! POSIX-style path values.
//!
//! A [`VfsPath`] is a plain owned string with the separator rules the request
//! layer relies on. Construction never fails; callers that care ask
//! [`VfsPath::is_valid`].

use std::fmt;

pub const SEPARATOR: char = '/';
const SEPARATOR_STR: &str = "/";
const PARENT: &str = "..";

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VfsPath {
    value: String,
}

impl VfsPath {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn root() -> Self {
        Self::new(SEPARATOR_STR)
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn as_std_path(&self) -> &std::path::Path {
        std::path::Path::new(&self.value)
    }

    pub fn into_string(self) -> String {
        self.value
    }

    pub fn is_root(&self) -> bool {
        self.value == SEPARATOR_STR
    }

    pub fn is_absolute(&self) -> bool {
        self.has_leading_separator()
    }

    pub fn is_relative(&self) -> bool {
        !self.has_leading_separator()
    }

    /// Non-empty and free of `//`.
    pub fn is_valid(&self) -> bool {
        !self.value.is_empty() && !self.value.contains("//")
    }

    /// Append `other`, keeping exactly one separator at the seam when either
    /// side provides one, and inserting one when neither does.
    pub fn append(&mut self, other: impl AsRef<str>) -> &mut Self {
        let other = other.as_ref();
        let other_leading = other.starts_with(SEPARATOR);

        if !self.has_trailing_separator() && !other_leading {
            self.value.push(SEPARATOR);
        } else if self.has_trailing_separator() && other_leading {
            self.value.pop();
        }
        self.value.push_str(other);
        self
    }

    /// Mirror of [`VfsPath::append`]: `other` goes in front.
    pub fn prepend(&mut self, other: impl AsRef<str>) -> &mut Self {
        let other = other.as_ref();
        let other_trailing = other.ends_with(SEPARATOR);

        if !self.has_leading_separator() && !other_trailing {
            self.value.insert(0, SEPARATOR);
        } else if self.has_leading_separator() && other_trailing {
            self.value.remove(0);
        }
        self.value.insert_str(0, other);
        self
    }

    /// Reset to the empty (invalid) path so it can be rebuilt by chaining.
    pub fn clear(&mut self) -> &mut Self {
        self.value.clear();
        self
    }

    /// The containing directory.
    ///
    /// The root is its own parent. A top-level absolute entry (`/data`) has
    /// the root as parent. A bare relative segment has no separator to cut
    /// at, so `..` is prepended instead (`vfs` → `../vfs`).
    pub fn parent(&self) -> VfsPath {
        if self.is_root() {
            return self.clone();
        }

        let mut parent = self.clone();
        parent.strip_trailing_separator();

        match parent.value.rfind(SEPARATOR) {
            Some(0) => VfsPath::root(),
            Some(index) => {
                parent.value.truncate(index);
                parent
            }
            None => {
                parent.prepend(PARENT);
                parent
            }
        }
    }

    /// The last component. The root is its own filename.
    pub fn filename(&self) -> VfsPath {
        if self.is_root() {
            return self.clone();
        }

        let mut filename = self.clone();
        filename.strip_trailing_separator();

        if let Some(index) = filename.value.rfind(SEPARATOR) {
            filename.value.drain(..=index);
        }
        filename
    }

    /// True when `ancestor` is a strict prefix of this path at a component
    /// boundary.
    pub fn starts_with_dir(&self, ancestor: &VfsPath) -> bool {
        let Some(rest) = self.value.strip_prefix(ancestor.as_str()) else {
            return false;
        };
        !rest.is_empty() && (ancestor.has_trailing_separator() || rest.starts_with(SEPARATOR))
    }

    fn strip_trailing_separator(&mut self) {
        if self.has_trailing_separator() {
            self.value.pop();
        }
    }

    fn has_leading_separator(&self) -> bool {
        self.value.starts_with(SEPARATOR)
    }

    fn has_trailing_separator(&self) -> bool {
        self.value.ends_with(SEPARATOR)
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for VfsPath {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl From<&str> for VfsPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VfsPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<VfsPath> for String {
    fn from(path: VfsPath) -> Self {
        path.value
    }
}
