//! The container contract, dispatching over the two representations.
//!
//! Every binary operation is defined for all four pairings of operand
//! representations. The representation of a result depends only on its
//! cardinality relative to [`DEFAULT_MAX_SIZE`], never on those of the inputs.
//!
//! Operations come in two forms. The borrowing form (`and`, `or`, ...) leaves
//! both operands untouched. The consuming form (`into_and`, `into_or`, ...)
//! reuses the receiver's storage where its representation allows, and returns
//! the result, which need not be the same representation as the receiver.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign};

use crate::{Bitmap, BitmapIter, Clear, HeapSize, Len, Sparse};
use crate::DEFAULT_MAX_SIZE;

/// A set of `u16` keys, held sparse or dense as its cardinality dictates.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Stored"))]
pub enum Container {
    Sparse(Sparse),
    Dense(Bitmap),
}

/// The serialized shape of a [`Container`], whose representation is settled on the way in.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(rename = "Container")]
enum Stored {
    Sparse(Sparse),
    Dense(Bitmap),
}

#[cfg(feature = "serde")]
impl From<Stored> for Container {
    fn from(stored: Stored) -> Self {
        match stored {
            Stored::Sparse(sparse) => sparse.into_container(),
            Stored::Dense(bitmap) => bitmap.into_container(),
        }
    }
}

use Container::{Dense, Sparse as Array};

impl Container {
    /// An empty container, in sparse form.
    pub fn new() -> Self { Array(crate::Sparse::new()) }

    /// A container holding exactly `first ..= last`, in the form its length calls for.
    pub fn from_run(first: u16, last: u16) -> Self {
        if first > last {
            return Self::new();
        }
        if last as usize - first as usize + 1 > DEFAULT_MAX_SIZE {
            Dense(Bitmap::from_run(first, last))
        } else {
            Array((first ..= last).collect())
        }
    }

    /// Whether the keys are held in a bitmap.
    #[inline(always)]
    pub fn is_dense(&self) -> bool { matches!(self, Dense(_)) }

    /// Inserts `key`, returning `true` if it was not already present.
    ///
    /// A sparse container already at the threshold becomes a bitmap.
    pub fn insert(&mut self, key: u16) -> bool {
        match self {
            Dense(bitmap) => bitmap.insert(key),
            Array(sparse) => {
                if sparse.len() >= DEFAULT_MAX_SIZE && !sparse.contains(key) {
                    tracing::trace!(cardinality = sparse.len() + 1, "converting sparse to bitmap");
                    let mut bitmap = sparse.to_bitmap();
                    bitmap.insert(key);
                    *self = Dense(bitmap);
                    true
                } else {
                    sparse.insert(key)
                }
            }
        }
    }

    /// Removes `key`, returning `true` if it was present.
    ///
    /// A bitmap holding exactly [`DEFAULT_MAX_SIZE`] keys becomes sparse when one
    /// of them is removed. Bitmaps with fewer keys stay bitmaps.
    pub fn remove(&mut self, key: u16) -> bool {
        match self {
            Dense(bitmap) => {
                if bitmap.len() == DEFAULT_MAX_SIZE && bitmap.contains(key) {
                    bitmap.remove(key);
                    tracing::trace!(cardinality = bitmap.len(), "converting bitmap to sparse");
                    *self = Array(bitmap.to_sparse());
                    true
                } else {
                    bitmap.remove(key)
                }
            }
            Array(sparse) => sparse.remove(key),
        }
    }

    #[inline]
    pub fn contains(&self, key: u16) -> bool {
        match self {
            Dense(bitmap) => bitmap.contains(key),
            Array(sparse) => sparse.contains(key),
        }
    }

    /// The smallest key at or after `from`, if any.
    pub fn next_at_least(&self, from: usize) -> Option<u16> {
        match self {
            Dense(bitmap) => bitmap.next_set_bit(from),
            Array(sparse) => sparse.next_at_least(from),
        }
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        match self {
            Dense(bitmap) => Iter::Dense(bitmap.iter()),
            Array(sparse) => Iter::Sparse(sparse.iter()),
        }
    }

    /// A cursor over the keys that can remove the key it last produced.
    pub fn cursor(&mut self) -> Cursor<'_> {
        Cursor { container: self, position: 0, current: None }
    }

    /// Writes each key, combined with `mask`, into `out`, returning the number written.
    ///
    /// Writing stops early should `out` be shorter than the container.
    pub fn fill_least_significant_16bits(&self, out: &mut [u32], mask: u32) -> usize {
        let mut written = 0;
        for (slot, key) in out.iter_mut().zip(self.iter()) {
            *slot = key as u32 | mask;
            written += 1;
        }
        written
    }

    /// Releases unused capacity of a sparse container; bitmaps have none.
    pub fn trim(&mut self) {
        match self {
            Dense(bitmap) => bitmap.trim(),
            Array(sparse) => sparse.trim(),
        }
    }

    /// The keys as a bitmap, whatever the current representation.
    pub fn to_bitmap(&self) -> Bitmap {
        match self {
            Dense(bitmap) => bitmap.clone(),
            Array(sparse) => sparse.to_bitmap(),
        }
    }

    /// The keys as a sorted array, whatever the current representation.
    pub fn to_sparse(&self) -> crate::Sparse {
        match self {
            Dense(bitmap) => bitmap.to_sparse(),
            Array(sparse) => sparse.clone(),
        }
    }

    pub fn and(&self, other: &Container) -> Container {
        match (self, other) {
            (Dense(a), Dense(b)) => a.and_bitmap(b),
            (Dense(a), Array(b)) => b.and_bitmap(a).into_container(),
            (Array(a), Dense(b)) => a.and_bitmap(b).into_container(),
            (Array(a), Array(b)) => a.and_sparse(b).into_container(),
        }
    }

    pub fn or(&self, other: &Container) -> Container {
        match (self, other) {
            (Dense(a), Dense(b)) => a.or_bitmap(b),
            (Dense(a), Array(b)) => a.or_sparse(b),
            (Array(a), Dense(b)) => b.or_sparse(a),
            (Array(a), Array(b)) => a.or_sparse(b),
        }
    }

    pub fn xor(&self, other: &Container) -> Container {
        match (self, other) {
            (Dense(a), Dense(b)) => a.xor_bitmap(b),
            (Dense(a), Array(b)) => a.xor_sparse(b),
            (Array(a), Dense(b)) => b.xor_sparse(a),
            (Array(a), Array(b)) => a.xor_sparse(b),
        }
    }

    /// Keys of `self` absent from `other`.
    pub fn and_not(&self, other: &Container) -> Container {
        match (self, other) {
            (Dense(a), Dense(b)) => a.and_not_bitmap(b),
            (Dense(a), Array(b)) => a.and_not_sparse(b),
            (Array(a), Dense(b)) => a.and_not_bitmap(b).into_container(),
            (Array(a), Array(b)) => a.and_not_sparse(b).into_container(),
        }
    }

    /// The complement of `self` within `first ..= last`; keys outside the range are kept as they are.
    pub fn not(&self, first: u16, last: u16) -> Container {
        match self {
            Dense(bitmap) => bitmap.not(first, last),
            Array(sparse) => sparse.not(first, last),
        }
    }

    /// As `and`, reusing `self`'s storage where possible.
    ///
    /// A bitmap cannot shrink into a sparse result in place, so intersecting one
    /// with a sparse operand is done from the sparse side.
    pub fn into_and(self, other: &Container) -> Container {
        match (self, other) {
            (Dense(a), Dense(b)) => a.into_and_bitmap(b),
            (Dense(a), Array(b)) => b.and_bitmap(&a).into_container(),
            (Array(a), Dense(b)) => a.into_and_bitmap(b).into_container(),
            (Array(a), Array(b)) => a.into_and_sparse(b).into_container(),
        }
    }

    /// As `or`, reusing `self`'s storage where possible.
    pub fn into_or(self, other: &Container) -> Container {
        match (self, other) {
            (Dense(a), Dense(b)) => a.into_or_bitmap(b),
            (Dense(a), Array(b)) => a.into_or_sparse(b),
            (Array(a), Dense(b)) => b.or_sparse(&a),
            (Array(a), Array(b)) => a.or_sparse(b),
        }
    }

    /// As `xor`, reusing `self`'s storage where possible.
    pub fn into_xor(self, other: &Container) -> Container {
        match (self, other) {
            (Dense(a), Dense(b)) => a.into_xor_bitmap(b),
            (Dense(a), Array(b)) => a.into_xor_sparse(b),
            (Array(a), Dense(b)) => b.xor_sparse(&a),
            (Array(a), Array(b)) => a.xor_sparse(b),
        }
    }

    /// As `and_not`, reusing `self`'s storage where possible.
    pub fn into_and_not(self, other: &Container) -> Container {
        match (self, other) {
            (Dense(a), Dense(b)) => a.into_and_not_bitmap(b),
            (Dense(a), Array(b)) => a.into_and_not_sparse(b),
            (Array(a), Dense(b)) => a.into_and_not_bitmap(b).into_container(),
            (Array(a), Array(b)) => a.into_and_not_sparse(b).into_container(),
        }
    }

    /// As `not`, reusing `self`'s storage where possible.
    pub fn into_not(self, first: u16, last: u16) -> Container {
        match self {
            Dense(bitmap) => bitmap.into_not(first, last),
            Array(sparse) => sparse.into_not(first, last),
        }
    }
}

impl Default for Container {
    fn default() -> Self { Self::new() }
}

impl Len for Container {
    #[inline]
    fn len(&self) -> usize {
        match self {
            Dense(bitmap) => bitmap.len(),
            Array(sparse) => sparse.len(),
        }
    }
}

impl Clear for Container {
    /// Empties the container, keeping its representation.
    fn clear(&mut self) {
        match self {
            Dense(bitmap) => bitmap.clear(),
            Array(sparse) => sparse.clear(),
        }
    }
}

impl HeapSize for Container {
    fn heap_size(&self) -> (usize, usize) {
        match self {
            Dense(bitmap) => bitmap.heap_size(),
            Array(sparse) => sparse.heap_size(),
        }
    }
}

/// Containers are equal when they hold the same keys, whatever their representations.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dense(a), Dense(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            _ => self.len() == other.len() && self.iter().eq(other.iter()),
        }
    }
}
impl Eq for Container { }

/// Hashes the keys themselves, so that equal containers hash equally across representations.
impl Hash for Container {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for key in self.iter() {
            key.hash(state);
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::common::fmt_keys(self.iter(), f)
    }
}

/// Settles the bitmap into the representation its cardinality calls for.
impl From<Bitmap> for Container {
    fn from(bitmap: Bitmap) -> Self { bitmap.into_container() }
}
/// Settles the array into the representation its cardinality calls for.
impl From<crate::Sparse> for Container {
    fn from(sparse: crate::Sparse) -> Self { sparse.into_container() }
}

impl FromIterator<u16> for Container {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut container = Container::new();
        container.extend(iter);
        container
    }
}

impl Extend<u16> for Container {
    fn extend<I: IntoIterator<Item = u16>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = u16;
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

macro_rules! implement_operator {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $by_ref:ident, $by_value:ident) => {
        impl $trait<&Container> for &Container {
            type Output = Container;
            #[inline] fn $method(self, other: &Container) -> Container { self.$by_ref(other) }
        }
        impl $trait<&Container> for Container {
            type Output = Container;
            #[inline] fn $method(self, other: &Container) -> Container { self.$by_value(other) }
        }
        impl $assign_trait<&Container> for Container {
            #[inline] fn $assign_method(&mut self, other: &Container) {
                *self = std::mem::take(self).$by_value(other);
            }
        }
    }
}

implement_operator!(BitAnd, bitand, BitAndAssign, bitand_assign, and, into_and);
implement_operator!(BitOr, bitor, BitOrAssign, bitor_assign, or, into_or);
implement_operator!(BitXor, bitxor, BitXorAssign, bitxor_assign, xor, into_xor);
implement_operator!(Sub, sub, SubAssign, sub_assign, and_not, into_and_not);

/// Ascending iterator over the keys of a [`Container`].
#[derive(Clone, Debug)]
pub enum Iter<'a> {
    Sparse(std::iter::Copied<std::slice::Iter<'a, u16>>),
    Dense(BitmapIter<'a>),
}

impl Iterator for Iter<'_> {
    type Item = u16;
    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            Iter::Sparse(iter) => iter.next(),
            Iter::Dense(iter) => iter.next(),
        }
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Sparse(iter) => iter.size_hint(),
            Iter::Dense(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for Iter<'_> { }
impl FusedIterator for Iter<'_> { }

/// Walks a container's keys in ascending order, allowing removal of the key last produced.
///
/// The cursor holds no position within either representation's storage, only
/// the next key to look for; each step searches the container afresh. This keeps
/// it valid when `remove_current` shrinks the container, even when the removal
/// turns a bitmap into an array. A cursor is not restartable.
pub struct Cursor<'a> {
    container: &'a mut Container,
    /// Smallest key not yet produced.
    position: usize,
    current: Option<u16>,
}

impl Cursor<'_> {
    /// The key most recently produced, unless it has been removed.
    pub fn current(&self) -> Option<u16> { self.current }

    /// Removes the key most recently produced, returning `false` if there is none.
    pub fn remove_current(&mut self) -> bool {
        match self.current.take() {
            Some(key) => self.container.remove(key),
            None => false,
        }
    }
}

impl Iterator for Cursor<'_> {
    type Item = u16;
    fn next(&mut self) -> Option<u16> {
        self.current = self.container.next_at_least(self.position);
        match self.current {
            Some(key) => self.position = key as usize + 1,
            None => self.position = crate::MAX_CAPACITY,
        }
        self.current
    }
}

impl FusedIterator for Cursor<'_> { }
