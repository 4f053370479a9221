//! Fixed-capacity, move-only byte buffers.
//!
//! A [`Buffer`] is the unit of data handed to `read` and `write`. It is never
//! `Clone`: a buffer submitted with a request is moved into it and comes back
//! through the completion callback, so caller and backend never touch the
//! same memory at the same time.

use byteorder::ByteOrder;

#[derive(Debug, Default)]
pub struct Buffer {
    storage: Box<[u8]>,
    size: usize,
}

macro_rules! put_fixed {
    ($(#[$doc:meta])* $put:ident, $get:ident, $ty:ty, $width:expr, $write:ident, $read:ident) => {
        $(#[$doc])*
        pub fn $put<B: ByteOrder>(&mut self, value: $ty) -> bool {
            let mut bytes = [0u8; $width];
            B::$write(&mut bytes, value);
            self.put(&bytes)
        }

        /// Decode a value written by the matching `put_*` at `offset`.
        pub fn $get<B: ByteOrder>(&self, offset: usize) -> Option<$ty> {
            let end = offset.checked_add($width)?;
            self.data().get(offset..end).map(B::$read)
        }
    };
}

impl Buffer {
    /// A zeroed buffer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            size: 0,
        }
    }

    /// A buffer of `capacity` bytes pre-filled with `bytes`.
    ///
    /// Returns `None` when `bytes` does not fit under the same rule as
    /// [`Buffer::put`].
    pub fn from_slice(bytes: &[u8], capacity: usize) -> Option<Self> {
        let mut buffer = Self::new(capacity);
        buffer.put(bytes).then_some(buffer)
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The logical contents, `size` bytes long.
    pub fn data(&self) -> &[u8] {
        &self.storage[..self.size]
    }

    /// The whole backing storage, for providers filling the buffer in place.
    /// Follow with [`Buffer::truncate`] to publish how much was filled.
    pub fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }

    /// Append `bytes` after the current contents.
    ///
    /// All or nothing: fails without touching the buffer unless
    /// `size + bytes.len() < capacity`. One byte of headroom always remains.
    pub fn put(&mut self, bytes: &[u8]) -> bool {
        let Some(end) = self.size.checked_add(bytes.len()) else {
            return false;
        };
        if end >= self.capacity() {
            return false;
        }
        self.storage[self.size..end].copy_from_slice(bytes);
        self.size = end;
        true
    }

    put_fixed!(put_u16, get_u16, u16, 2, write_u16, read_u16);
    put_fixed!(
        /// Append a `u32` in byte order `B`.
        put_u32, get_u32, u32, 4, write_u32, read_u32
    );
    put_fixed!(put_u64, get_u64, u64, 8, write_u64, read_u64);
    put_fixed!(put_i32, get_i32, i32, 4, write_i32, read_i32);
    put_fixed!(put_i64, get_i64, i64, 8, write_i64, read_i64);
    put_fixed!(put_f32, get_f32, f32, 4, write_f32, read_f32);
    put_fixed!(put_f64, get_f64, f64, 8, write_f64, read_f64);

    /// Set the logical size, clamped to the capacity.
    pub fn truncate(&mut self, size: usize) {
        self.size = size.min(self.capacity());
    }

    pub fn clear(&mut self) {
        self.size = 0;
    }

    /// Move the contents out, leaving an empty zero-capacity buffer behind.
    pub fn take(&mut self) -> Buffer {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};
    use pretty_assertions::assert_eq;

    #[test]
    fn new_buffer_is_empty() {
        let buffer = Buffer::new(512);
        assert_eq!(buffer.capacity(), 512);
        assert_eq!(buffer.size(), 0);
        assert!(buffer.is_empty());
        assert!(buffer.data().is_empty());
    }

    #[test]
    fn put_keeps_one_byte_of_headroom() {
        let mut buffer = Buffer::new(8);
        assert!(buffer.put(b"abcd"));
        assert!(buffer.put(b"efg"));
        assert_eq!(buffer.size(), 7);
        assert!(!buffer.put(b"h"));
        assert_eq!(buffer.data(), b"abcdefg");
    }

    #[test]
    fn rejected_put_does_not_mutate() {
        let mut buffer = Buffer::new(6);
        assert!(buffer.put(b"ab"));
        assert!(!buffer.put(b"cdef"));
        assert_eq!(buffer.size(), 2);
        assert_eq!(buffer.data(), b"ab");
        assert!(buffer.put(b"cde"));
        assert_eq!(buffer.data(), b"abcde");
    }

    #[test]
    fn put_on_zero_capacity_fails() {
        let mut buffer = Buffer::default();
        assert!(!buffer.put(b""));
        assert!(!buffer.put(b"x"));
    }

    #[test]
    fn truncate_and_clear() {
        let mut buffer = Buffer::from_slice(b"hello world", 64).unwrap();
        buffer.truncate(5);
        assert_eq!(buffer.data(), b"hello");
        buffer.truncate(1000);
        assert_eq!(buffer.size(), 64);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 64);
    }

    #[test]
    fn take_leaves_an_empty_buffer() {
        let mut buffer = Buffer::from_slice(b"data", 16).unwrap();
        let moved = buffer.take();
        assert_eq!(moved.data(), b"data");
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.size(), 0);
    }

    #[test]
    fn fixed_width_fields_use_the_declared_byte_order() {
        let mut buffer = Buffer::new(64);
        assert!(buffer.put_u32::<LittleEndian>(1));
        assert!(buffer.put_u32::<BigEndian>(1));
        assert!(buffer.put_f32::<LittleEndian>(2.25));
        assert!(buffer.put_i64::<BigEndian>(-3));
        assert_eq!(&buffer.data()[..8], &[1, 0, 0, 0, 0, 0, 0, 1]);

        assert_eq!(buffer.get_u32::<LittleEndian>(0), Some(1));
        assert_eq!(buffer.get_u32::<BigEndian>(4), Some(1));
        assert_eq!(buffer.get_f32::<LittleEndian>(8), Some(2.25));
        assert_eq!(buffer.get_i64::<BigEndian>(12), Some(-3));
        assert_eq!(buffer.get_u64::<BigEndian>(16), None);
    }

    #[test]
    fn fixed_width_put_respects_capacity() {
        let mut buffer = Buffer::new(8);
        assert!(buffer.put_u32::<LittleEndian>(7));
        assert!(!buffer.put_u32::<LittleEndian>(8));
        assert_eq!(buffer.size(), 4);
    }
}
