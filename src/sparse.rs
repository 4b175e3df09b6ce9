//! The sparse representation: a sorted array of distinct `u16` keys.
//!
//! Small sets are held inline, without allocating, courtesy of `SmallVec`.

use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;

use crate::{Bitmap, Clear, Container, Error, HeapSize, Len, Result};
use crate::DEFAULT_MAX_SIZE;

/// Keys held without a heap allocation.
const INLINE_KEYS: usize = 8;

type Keys = SmallVec<[u16; INLINE_KEYS]>;

/// A set of `u16` keys stored as a sorted, duplicate-free array.
///
/// A `Sparse` on its own may hold any number of keys; it is [`Container`]
/// that keeps sparse containers at or below [`DEFAULT_MAX_SIZE`] keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "Vec<u16>", try_from = "Vec<u16>"))]
pub struct Sparse {
    keys: Keys,
}

impl Sparse {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { keys: Keys::with_capacity(capacity) }
    }

    /// The keys, in ascending order.
    #[inline(always)]
    pub fn keys(&self) -> &[u16] { &self.keys }

    /// Inserts `key`, returning `true` if it was not already present.
    pub fn insert(&mut self, key: u16) -> bool {
        match self.keys.binary_search(&key) {
            Ok(_) => false,
            Err(position) => {
                self.keys.insert(position, key);
                true
            }
        }
    }

    /// Removes `key`, returning `true` if it was present.
    pub fn remove(&mut self, key: u16) -> bool {
        match self.keys.binary_search(&key) {
            Ok(position) => {
                self.keys.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    #[inline]
    pub fn contains(&self, key: u16) -> bool {
        self.keys.binary_search(&key).is_ok()
    }

    /// The smallest key at or after `from`, if any.
    pub fn next_at_least(&self, from: usize) -> Option<u16> {
        let position = self.keys.partition_point(|&key| (key as usize) < from);
        self.keys.get(position).copied()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u16>> {
        self.keys.iter().copied()
    }

    /// Overwrites `self` with the set positions of `bitmap`, in ascending order.
    pub fn load_data(&mut self, bitmap: &Bitmap) {
        self.keys.clear();
        self.keys.reserve(bitmap.cardinality);
        self.extend_from_words(bitmap.words().iter().copied());
    }

    /// Appends the set positions of a sequence of bitmap words, word `k` covering keys `64 * k ..`.
    pub(crate) fn extend_from_words(&mut self, words: impl Iterator<Item = u64>) {
        for (index, mut word) in words.enumerate() {
            while word != 0 {
                let lowest = word & word.wrapping_neg();
                self.keys.push((index * 64 + lowest.trailing_zeros() as usize) as u16);
                word ^= lowest;
            }
        }
    }

    pub fn to_bitmap(&self) -> Bitmap { Bitmap::from_sparse(self) }

    /// Settles `self` into the representation its cardinality calls for.
    pub fn into_container(self) -> Container {
        if self.keys.len() > DEFAULT_MAX_SIZE {
            tracing::trace!(cardinality = self.keys.len(), "converting sparse to bitmap");
            Container::Dense(self.to_bitmap())
        } else {
            Container::Sparse(self)
        }
    }

    /// Releases unused capacity.
    pub fn trim(&mut self) { self.keys.shrink_to_fit(); }

    /// Keys present in both `self` and `bitmap`.
    pub fn and_bitmap(&self, bitmap: &Bitmap) -> Sparse {
        Self { keys: self.keys.iter().copied().filter(|&key| bitmap.contains(key)).collect() }
    }
    /// Keys of `self` absent from `bitmap`.
    pub fn and_not_bitmap(&self, bitmap: &Bitmap) -> Sparse {
        Self { keys: self.keys.iter().copied().filter(|&key| !bitmap.contains(key)).collect() }
    }
    pub fn into_and_bitmap(mut self, bitmap: &Bitmap) -> Sparse {
        self.keys.retain(|key| bitmap.contains(*key));
        self
    }
    pub fn into_and_not_bitmap(mut self, bitmap: &Bitmap) -> Sparse {
        self.keys.retain(|key| !bitmap.contains(*key));
        self
    }

    pub fn and_sparse(&self, other: &Sparse) -> Sparse {
        let mut answer = Sparse::with_capacity(self.keys.len().min(other.keys.len()));
        merge(&self.keys, &other.keys, &mut answer.keys, false, true, false);
        answer
    }
    pub fn and_not_sparse(&self, other: &Sparse) -> Sparse {
        let mut answer = Sparse::with_capacity(self.keys.len());
        merge(&self.keys, &other.keys, &mut answer.keys, true, false, false);
        answer
    }
    /// As `and_sparse`, compacting the surviving keys within `self`.
    pub fn into_and_sparse(mut self, other: &Sparse) -> Sparse {
        let mut theirs = other.keys.iter().copied().peekable();
        self.keys.retain(|key| {
            let key = *key;
            while theirs.next_if(|&other| other < key).is_some() { }
            theirs.peek() == Some(&key)
        });
        self
    }
    pub fn into_and_not_sparse(mut self, other: &Sparse) -> Sparse {
        let mut theirs = other.keys.iter().copied().peekable();
        self.keys.retain(|key| {
            let key = *key;
            while theirs.next_if(|&other| other < key).is_some() { }
            theirs.peek() != Some(&key)
        });
        self
    }

    /// The union of `self` and `other`, as a bitmap should it exceed the threshold.
    pub fn or_sparse(&self, other: &Sparse) -> Container {
        if self.keys.len() + other.keys.len() > DEFAULT_MAX_SIZE {
            return self.to_bitmap().into_or_sparse(other);
        }
        let mut answer = Sparse::with_capacity(self.keys.len() + other.keys.len());
        merge(&self.keys, &other.keys, &mut answer.keys, true, true, true);
        Container::Sparse(answer)
    }

    /// The symmetric difference of `self` and `other`, as a bitmap should it exceed the threshold.
    pub fn xor_sparse(&self, other: &Sparse) -> Container {
        if self.keys.len() + other.keys.len() > DEFAULT_MAX_SIZE {
            return self.to_bitmap().into_xor_sparse(other);
        }
        let mut answer = Sparse::with_capacity(self.keys.len() + other.keys.len());
        merge(&self.keys, &other.keys, &mut answer.keys, true, false, true);
        Container::Sparse(answer)
    }

    /// The complement of `self` within `first ..= last`.
    ///
    /// The result cardinality is known before any key is written, and picks the representation.
    pub fn not(&self, first: u16, last: u16) -> Container {
        if first > last {
            return self.clone().into_container();
        }
        let lower = self.keys.partition_point(|&key| key < first);
        let upper = self.keys.partition_point(|&key| key <= last);
        let inside = upper - lower;
        let span = last as usize - first as usize + 1;
        let cardinality = self.keys.len() - inside + (span - inside);

        if cardinality > DEFAULT_MAX_SIZE {
            let mut bitmap = self.to_bitmap();
            bitmap.flip_range(first, last);
            return Container::Dense(bitmap);
        }

        let mut answer = Sparse::with_capacity(cardinality);
        answer.keys.extend_from_slice(&self.keys[.. lower]);
        let mut present = self.keys[lower .. upper].iter().copied().peekable();
        for key in first ..= last {
            if present.next_if_eq(&key).is_none() {
                answer.keys.push(key);
            }
        }
        answer.keys.extend_from_slice(&self.keys[upper ..]);
        Container::Sparse(answer)
    }

    /// As `not`; a sparse complement is always written out afresh.
    pub fn into_not(self, first: u16, last: u16) -> Container {
        self.not(first, last)
    }
}

/// Merges two sorted key sequences into `out`.
///
/// Keys only in `a`, only in `b`, or in both are kept according to the three flags,
/// which is enough to express union, intersection, and both differences.
fn merge(a: &[u16], b: &[u16], out: &mut Keys, only_a: bool, both: bool, only_b: bool) {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                if only_a { out.push(a[i]); }
                i += 1;
            }
            Ordering::Greater => {
                if only_b { out.push(b[j]); }
                j += 1;
            }
            Ordering::Equal => {
                if both { out.push(a[i]); }
                i += 1;
                j += 1;
            }
        }
    }
    if only_a { out.extend_from_slice(&a[i ..]); }
    if only_b { out.extend_from_slice(&b[j ..]); }
}

impl Len for Sparse {
    #[inline(always)] fn len(&self) -> usize { self.keys.len() }
}

impl Clear for Sparse {
    #[inline(always)] fn clear(&mut self) { self.keys.clear() }
}

impl HeapSize for Sparse {
    fn heap_size(&self) -> (usize, usize) {
        if self.keys.spilled() {
            let size = std::mem::size_of::<u16>();
            (size * self.keys.len(), size * self.keys.capacity())
        } else {
            (0, 0)
        }
    }
}

impl fmt::Display for Sparse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::common::fmt_keys(self.iter(), f)
    }
}

/// Collects keys in any order, discarding duplicates.
impl FromIterator<u16> for Sparse {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut keys: Keys = iter.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();
        Self { keys }
    }
}

impl From<Sparse> for Vec<u16> {
    fn from(sparse: Sparse) -> Self { sparse.keys.into_vec() }
}

/// Adopts keys that must already be strictly ascending.
impl TryFrom<Vec<u16>> for Sparse {
    type Error = Error;
    fn try_from(keys: Vec<u16>) -> Result<Self> {
        if let Some(position) = keys.windows(2).position(|pair| pair[0] >= pair[1]) {
            tracing::debug!(position, "rejecting unsorted sparse keys");
            return Err(Error::UnsortedKeys { position: position + 1 });
        }
        Ok(Self { keys: Keys::from_vec(keys) })
    }
}

impl<'a> IntoIterator for &'a Sparse {
    type Item = u16;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, u16>>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}
