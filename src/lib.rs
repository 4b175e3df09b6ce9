//! Containers for a single 16-bit chunk of a roaring bitmap.
//!
//! A roaring bitmap splits 32-bit values by their high 16 bits, and stores the
//! low 16 bits of each chunk in a container. This crate provides that container:
//! a set over the keys `0 ..= 65535` with two physical representations,
//!
//! * [`Sparse`], a sorted array of keys, for chunks with few members, and
//! * [`Bitmap`], a fixed 65536-bit bitmap, for chunks with many members.
//!
//! [`Container`] holds one or the other, and every operation on it chooses the
//! representation of its result purely from the result's cardinality: more than
//! [`DEFAULT_MAX_SIZE`] members makes a bitmap, otherwise an array. The choice is
//! invisible to equality, hashing, and iteration.
//!
//! ```
//! use roaring_container::{Bitmap, Container, Len};
//!
//! let run = Container::Dense(Bitmap::from_run(10, 20));
//! let keys: Container = [5u16, 10, 15, 20, 25].into_iter().collect();
//!
//! let both = run.and(&keys);
//! assert!(!both.is_dense());
//! assert_eq!(both.iter().collect::<Vec<_>>(), vec![10, 15, 20]);
//! assert_eq!(both.len(), 3);
//! ```

pub mod common;
pub mod bitmap;
pub mod sparse;
pub mod container;
pub mod bytes;
mod error;

#[cfg(test)]
mod proptests;

pub use common::{Len, Clear, HeapSize};
pub use bitmap::{Bitmap, BitmapIter};
pub use sparse::Sparse;
pub use container::{Container, Cursor, Iter};
pub use error::{Error, Result};

/// The number of keys in a chunk's universe.
pub const MAX_CAPACITY: usize = 1 << 16;
/// The number of `u64` words in a bitmap.
pub const BITMAP_WORDS: usize = MAX_CAPACITY / 64;
/// The size of a bitmap, in memory and serialized.
pub const BITMAP_BYTES: usize = MAX_CAPACITY / 8;
/// The largest cardinality held in sparse form; anything larger is a bitmap.
///
/// At 4096 keys a sorted `u16` array occupies the same 8KB as a bitmap.
pub const DEFAULT_MAX_SIZE: usize = 4096;
