//! The dense representation: all 65536 bits of a chunk in 1024 `u64` words.
//!
//! Bit `x` is stored at bit position `x % 64` of word `x / 64`. The storage
//! never changes size, so a `Bitmap` always costs 8KB regardless of how many
//! bits it holds; this is why operations whose results are small hand back a
//! [`Sparse`] container instead.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use crate::{Clear, Container, Error, HeapSize, Len, Result, Sparse};
use crate::{BITMAP_BYTES, BITMAP_WORDS, DEFAULT_MAX_SIZE, MAX_CAPACITY};

/// A set of `u16` keys stored as a fixed 65536-bit bitmap.
///
/// The number of set bits is tracked exactly by every mutation, so `len()` is
/// constant time.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "Vec<u64>", try_from = "Vec<u64>"))]
pub struct Bitmap {
    pub(crate) words: Box<[u64; BITMAP_WORDS]>,
    pub(crate) cardinality: usize,
}

/// Bits at and above position `bit` of a word.
#[inline(always)]
fn mask_from(bit: usize) -> u64 {
    !0u64 << bit
}

/// Bits at and below position `bit` of a word.
///
/// `bit == 63` needs its own arm, as `1 << 64` is not defined.
#[inline(always)]
fn mask_through(bit: usize) -> u64 {
    if bit == 63 { !0 } else { (1u64 << (bit + 1)) - 1 }
}

/// Flips the bits of `word` selected by `mask`, returning the change in its population count.
#[inline(always)]
fn flip(word: &mut u64, mask: u64) -> isize {
    let before = word.count_ones() as isize;
    *word ^= mask;
    word.count_ones() as isize - before
}

impl Bitmap {
    /// An empty bitmap.
    pub fn new() -> Self {
        Self {
            words: Box::new([0; BITMAP_WORDS]),
            cardinality: 0,
        }
    }

    /// A bitmap holding exactly the keys `first ..= last`.
    ///
    /// An empty range (`first > last`) produces an empty bitmap. Callers are
    /// expected to use this for runs long enough to warrant a bitmap, though
    /// nothing breaks if they do not.
    pub fn from_run(first: u16, last: u16) -> Self {
        let mut bitmap = Self::new();
        if first > last {
            return bitmap;
        }
        let (first, last) = (first as usize, last as usize);
        bitmap.cardinality = last - first + 1;
        if bitmap.cardinality == MAX_CAPACITY {
            bitmap.words.fill(!0);
            return bitmap;
        }
        let first_word = first / 64;
        let last_word = last / 64;
        bitmap.words[first_word ..= last_word].fill(!0);
        bitmap.words[first_word] &= mask_from(first % 64);
        bitmap.words[last_word] &= mask_through(last % 64);
        bitmap
    }

    /// Wraps caller-supplied word storage, which must be exactly 1024 words.
    ///
    /// `cardinality` is trusted to be the number of set bits in `words`.
    pub fn from_words(words: Vec<u64>, cardinality: usize) -> Result<Self> {
        if words.len() != BITMAP_WORDS {
            tracing::debug!(words = words.len(), "rejecting bitmap storage of the wrong size");
            return Err(Error::InvalidArgument { found: words.len(), expected: BITMAP_WORDS });
        }
        let words: Box<[u64; BITMAP_WORDS]> = words
            .into_boxed_slice()
            .try_into()
            .map_err(|words: Box<[u64]>| Error::InvalidArgument { found: words.len(), expected: BITMAP_WORDS })?;
        debug_assert_eq!(cardinality, words.iter().map(|w| w.count_ones() as usize).sum::<usize>());
        Ok(Self { words, cardinality })
    }

    /// Builds a bitmap holding the keys of `sparse`.
    pub fn from_sparse(sparse: &Sparse) -> Self {
        let mut bitmap = Self::new();
        bitmap.load_data(sparse);
        bitmap
    }

    /// Overwrites `self` with the keys of `sparse`.
    pub fn load_data(&mut self, sparse: &Sparse) {
        self.clear();
        for &key in sparse.keys() {
            self.words[key as usize / 64] |= 1 << (key % 64);
        }
        self.cardinality = sparse.keys().len();
    }

    /// The backing words.
    #[inline(always)]
    pub fn words(&self) -> &[u64; BITMAP_WORDS] { &self.words }

    /// Sets `key`, returning `true` if it was not already present.
    #[inline]
    pub fn insert(&mut self, key: u16) -> bool {
        let (index, bit) = (key as usize / 64, key as usize % 64);
        let previous = self.words[index];
        let updated = previous | (1 << bit);
        self.words[index] = updated;
        let added = ((previous ^ updated) >> bit) as usize;
        self.cardinality += added;
        added == 1
    }

    /// Clears `key`, returning `true` if it was present.
    ///
    /// This never changes representation; see [`Container::remove`] for the
    /// variant that downgrades at the threshold.
    #[inline]
    pub fn remove(&mut self, key: u16) -> bool {
        let (index, bit) = (key as usize / 64, key as usize % 64);
        let removed = ((self.words[index] >> bit) & 1) as usize;
        self.words[index] &= !(1 << bit);
        self.cardinality -= removed;
        removed == 1
    }

    #[inline(always)]
    pub fn contains(&self, key: u16) -> bool {
        (self.words[key as usize / 64] >> (key % 64)) & 1 == 1
    }

    /// The smallest set position at or after `from`, if any.
    pub fn next_set_bit(&self, from: usize) -> Option<u16> {
        let index = from / 64;
        if index >= BITMAP_WORDS {
            return None;
        }
        let word = self.words[index] >> (from % 64);
        if word != 0 {
            return Some((from + word.trailing_zeros() as usize) as u16);
        }
        self.words[index + 1 ..]
            .iter()
            .position(|&word| word != 0)
            .map(|offset| {
                let index = index + 1 + offset;
                (index * 64 + self.words[index].trailing_zeros() as usize) as u16
            })
    }

    /// The smallest unset position at or after `from`, if any.
    pub fn next_unset_bit(&self, from: usize) -> Option<u16> {
        let index = from / 64;
        if index >= BITMAP_WORDS {
            return None;
        }
        let word = !self.words[index] >> (from % 64);
        if word != 0 {
            return Some((from + word.trailing_zeros() as usize) as u16);
        }
        self.words[index + 1 ..]
            .iter()
            .position(|&word| word != !0)
            .map(|offset| {
                let index = index + 1 + offset;
                (index * 64 + (!self.words[index]).trailing_zeros() as usize) as u16
            })
    }

    /// Set keys in ascending order.
    pub fn iter(&self) -> BitmapIter<'_> {
        BitmapIter {
            words: &self.words,
            next_word: 0,
            base: 0,
            current: 0,
            remaining: self.cardinality,
        }
    }

    /// Copies the set keys into a sparse container.
    pub fn to_sparse(&self) -> Sparse {
        let mut sparse = Sparse::with_capacity(self.cardinality);
        sparse.load_data(self);
        sparse
    }

    /// Settles `self` into the representation its cardinality calls for.
    pub fn into_container(self) -> Container {
        if self.cardinality <= DEFAULT_MAX_SIZE {
            tracing::trace!(cardinality = self.cardinality, "converting bitmap to sparse");
            Container::Sparse(self.to_sparse())
        } else {
            Container::Dense(self)
        }
    }

    /// Storage is fixed, so there is nothing to release.
    #[inline(always)]
    pub fn trim(&mut self) { }

    /// Combines `self` and `other` word by word into a new container.
    ///
    /// The result cardinality is counted first, and the result materialized
    /// directly in the representation that count calls for.
    #[inline(always)]
    fn combine(&self, other: &Bitmap, op: impl Fn(u64, u64) -> u64) -> Container {
        let op = &op;
        let pairs = move || self.words.iter().zip(other.words.iter()).map(move |(&a, &b)| op(a, b));
        let cardinality = pairs().map(|word| word.count_ones() as usize).sum();
        if cardinality > DEFAULT_MAX_SIZE {
            let mut answer = Bitmap::new();
            for (slot, word) in answer.words.iter_mut().zip(pairs()) {
                *slot = word;
            }
            answer.cardinality = cardinality;
            Container::Dense(answer)
        } else {
            let mut answer = Sparse::with_capacity(cardinality);
            answer.extend_from_words(pairs());
            Container::Sparse(answer)
        }
    }

    /// As `combine`, but overwriting `self` when the result stays a bitmap.
    #[inline(always)]
    fn combine_into(mut self, other: &Bitmap, op: impl Fn(u64, u64) -> u64) -> Container {
        let cardinality = self.words.iter().zip(other.words.iter()).map(|(&a, &b)| op(a, b).count_ones() as usize).sum();
        if cardinality > DEFAULT_MAX_SIZE {
            for (word, &theirs) in self.words.iter_mut().zip(other.words.iter()) {
                *word = op(*word, theirs);
            }
            self.cardinality = cardinality;
            Container::Dense(self)
        } else {
            let mut answer = Sparse::with_capacity(cardinality);
            answer.extend_from_words(self.words.iter().zip(other.words.iter()).map(|(&a, &b)| op(a, b)));
            Container::Sparse(answer)
        }
    }

    pub fn and_bitmap(&self, other: &Bitmap) -> Container { self.combine(other, |a, b| a & b) }
    pub fn or_bitmap(&self, other: &Bitmap) -> Container { self.combine(other, |a, b| a | b) }
    pub fn xor_bitmap(&self, other: &Bitmap) -> Container { self.combine(other, |a, b| a ^ b) }
    pub fn and_not_bitmap(&self, other: &Bitmap) -> Container { self.combine(other, |a, b| a & !b) }

    pub fn into_and_bitmap(self, other: &Bitmap) -> Container { self.combine_into(other, |a, b| a & b) }
    pub fn into_or_bitmap(self, other: &Bitmap) -> Container { self.combine_into(other, |a, b| a | b) }
    pub fn into_xor_bitmap(self, other: &Bitmap) -> Container { self.combine_into(other, |a, b| a ^ b) }
    pub fn into_and_not_bitmap(self, other: &Bitmap) -> Container { self.combine_into(other, |a, b| a & !b) }

    /// The keys of `sparse` that are also set here.
    ///
    /// Only the sparse keys are visited, and the result is never larger than `sparse`.
    pub fn and_sparse(&self, sparse: &Sparse) -> Sparse {
        sparse.and_bitmap(self)
    }

    pub fn or_sparse(&self, sparse: &Sparse) -> Container { self.clone().into_or_sparse(sparse) }
    pub fn xor_sparse(&self, sparse: &Sparse) -> Container { self.clone().into_xor_sparse(sparse) }
    pub fn and_not_sparse(&self, sparse: &Sparse) -> Container { self.clone().into_and_not_sparse(sparse) }

    pub fn into_or_sparse(mut self, sparse: &Sparse) -> Container {
        for &key in sparse.keys() {
            let (index, bit) = (key as usize / 64, key as usize % 64);
            let word = self.words[index];
            self.cardinality += ((!word & (1 << bit)) >> bit) as usize;
            self.words[index] = word | (1 << bit);
        }
        self.into_container()
    }

    pub fn into_xor_sparse(mut self, sparse: &Sparse) -> Container {
        for &key in sparse.keys() {
            let (index, bit) = (key as usize / 64, key as usize % 64);
            let word = self.words[index];
            // +1 when the bit was clear, -1 when it was set.
            self.cardinality += 1;
            self.cardinality -= 2 * ((word >> bit) & 1) as usize;
            self.words[index] = word ^ (1 << bit);
        }
        self.into_container()
    }

    pub fn into_and_not_sparse(mut self, sparse: &Sparse) -> Container {
        for &key in sparse.keys() {
            let (index, bit) = (key as usize / 64, key as usize % 64);
            let word = self.words[index];
            let updated = word & !(1 << bit);
            self.cardinality -= ((word ^ updated) >> bit) as usize;
            self.words[index] = updated;
        }
        self.into_container()
    }

    /// Flips every key in `first ..= last`, leaving `self` a bitmap whatever its cardinality.
    ///
    /// The cardinality is adjusted by the population change of each touched
    /// word, rather than by recounting the whole bitmap.
    pub fn flip_range(&mut self, first: u16, last: u16) {
        if first > last {
            return;
        }
        let (first, last) = (first as usize, last as usize);
        if last - first + 1 == MAX_CAPACITY {
            for word in self.words.iter_mut() {
                *word = !*word;
            }
            self.cardinality = MAX_CAPACITY - self.cardinality;
            return;
        }

        let first_word = first / 64;
        let last_word = last / 64;
        let head = mask_from(first % 64);
        let tail = mask_through(last % 64);

        let mut cardinality = self.cardinality as isize;
        if first_word == last_word {
            cardinality += flip(&mut self.words[first_word], head & tail);
        } else {
            cardinality += flip(&mut self.words[first_word], head);
            for word in self.words[first_word + 1 .. last_word].iter_mut() {
                cardinality += 64 - 2 * word.count_ones() as isize;
                *word = !*word;
            }
            cardinality += flip(&mut self.words[last_word], tail);
        }
        self.cardinality = cardinality as usize;
    }

    /// The complement of `self` within `first ..= last`, as a new container.
    ///
    /// Words outside the range are carried over unchanged.
    pub fn not(&self, first: u16, last: u16) -> Container {
        self.clone().into_not(first, last)
    }

    /// The complement of `self` within `first ..= last`, reusing `self`'s storage.
    pub fn into_not(mut self, first: u16, last: u16) -> Container {
        self.flip_range(first, last);
        self.into_container()
    }
}

impl Default for Bitmap {
    fn default() -> Self { Self::new() }
}

impl Len for Bitmap {
    #[inline(always)] fn len(&self) -> usize { self.cardinality }
}

impl Clear for Bitmap {
    fn clear(&mut self) {
        if self.cardinality != 0 {
            self.words.fill(0);
            self.cardinality = 0;
        }
    }
}

impl HeapSize for Bitmap {
    fn heap_size(&self) -> (usize, usize) { (BITMAP_BYTES, BITMAP_BYTES) }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.cardinality == other.cardinality && self.words[..] == other.words[..]
    }
}
impl Eq for Bitmap { }

impl Hash for Bitmap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cardinality.hash(state);
        self.words[..].hash(state);
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("cardinality", &self.cardinality)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::common::fmt_keys(self.iter(), f)
    }
}

impl From<Bitmap> for Vec<u64> {
    fn from(bitmap: Bitmap) -> Self { bitmap.words.to_vec() }
}

/// Wraps the words, counting their set bits.
impl TryFrom<Vec<u64>> for Bitmap {
    type Error = Error;
    fn try_from(words: Vec<u64>) -> Result<Self> {
        let cardinality = words.iter().map(|w| w.count_ones() as usize).sum();
        Self::from_words(words, cardinality)
    }
}

impl<'a> IntoIterator for &'a Bitmap {
    type Item = u16;
    type IntoIter = BitmapIter<'a>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

/// Ascending iterator over the set keys of a [`Bitmap`].
#[derive(Clone, Debug)]
pub struct BitmapIter<'a> {
    words: &'a [u64; BITMAP_WORDS],
    /// Index of the next word to load.
    next_word: usize,
    /// Key of bit zero of `current`.
    base: usize,
    /// Unvisited bits of the current word.
    current: u64,
    remaining: usize,
}

impl Iterator for BitmapIter<'_> {
    type Item = u16;
    #[inline]
    fn next(&mut self) -> Option<u16> {
        while self.current == 0 {
            if self.remaining == 0 || self.next_word >= BITMAP_WORDS {
                return None;
            }
            self.current = self.words[self.next_word];
            self.base = self.next_word * 64;
            self.next_word += 1;
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        self.remaining -= 1;
        Some((self.base + bit) as u16)
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}

impl ExactSizeIterator for BitmapIter<'_> { }
impl FusedIterator for BitmapIter<'_> { }

#[cfg(test)]
mod test {

    use super::*;

    /// Population count of the raw words, for checking the tracked cardinality.
    fn popcount(bitmap: &Bitmap) -> usize {
        bitmap.words().iter().map(|w| w.count_ones() as usize).sum()
    }

    #[test]
    fn run_construction() {
        let bitmap = Bitmap::from_run(10, 20);
        assert_eq!(bitmap.len(), 11);
        assert_eq!(popcount(&bitmap), 11);
        for key in 0 .. 100u16 {
            assert_eq!(bitmap.contains(key), (10 ..= 20).contains(&key));
        }

        // Runs ending on the last bit of a word.
        let bitmap = Bitmap::from_run(60, 127);
        assert_eq!(bitmap.len(), 68);
        assert_eq!(bitmap.words()[0], !0u64 << 60);
        assert_eq!(bitmap.words()[1], !0u64);
        assert_eq!(bitmap.words()[2], 0);

        let full = Bitmap::from_run(0, u16::MAX);
        assert_eq!(full.len(), MAX_CAPACITY);
        assert!(full.words().iter().all(|&w| w == !0));

        let single = Bitmap::from_run(65535, 65535);
        assert_eq!(single.len(), 1);
        assert!(single.contains(65535));
        assert_eq!(single.words()[BITMAP_WORDS - 1], 1 << 63);

        assert!(Bitmap::from_run(5, 4).is_empty());
    }

    #[test]
    fn insert_remove() {
        let mut bitmap = Bitmap::new();
        assert!(bitmap.insert(42));
        assert!(!bitmap.insert(42));
        assert_eq!(bitmap.len(), 1);
        assert!(bitmap.contains(42));
        assert!(bitmap.remove(42));
        assert!(!bitmap.remove(42));
        assert_eq!(bitmap.len(), 0);
        assert!(!bitmap.contains(42));

        for key in [0u16, 63, 64, 65535] {
            bitmap.insert(key);
        }
        assert_eq!(bitmap.len(), 4);
        assert_eq!(popcount(&bitmap), 4);
    }

    #[test]
    fn from_words_checks_length() {
        assert!(matches!(
            Bitmap::from_words(vec![0; 1023], 0),
            Err(Error::InvalidArgument { found: 1023, expected: 1024 })
        ));
        assert!(matches!(
            Bitmap::from_words(vec![0; 1025], 0),
            Err(Error::InvalidArgument { found: 1025, expected: 1024 })
        ));

        let mut words = vec![0u64; BITMAP_WORDS];
        words[3] = 0b1011;
        let bitmap = Bitmap::from_words(words, 3).unwrap();
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![192, 193, 195]);

        let bitmap = Bitmap::try_from(vec![!0u64; BITMAP_WORDS]).unwrap();
        assert_eq!(bitmap.len(), MAX_CAPACITY);
    }

    #[test]
    fn next_bits() {
        let mut bitmap = Bitmap::new();
        assert_eq!(bitmap.next_set_bit(0), None);
        assert_eq!(bitmap.next_unset_bit(0), Some(0));

        bitmap.insert(3);
        bitmap.insert(700);
        bitmap.insert(65535);
        assert_eq!(bitmap.next_set_bit(0), Some(3));
        assert_eq!(bitmap.next_set_bit(3), Some(3));
        assert_eq!(bitmap.next_set_bit(4), Some(700));
        assert_eq!(bitmap.next_set_bit(701), Some(65535));
        assert_eq!(bitmap.next_set_bit(65536), None);

        let mut full = Bitmap::from_run(0, u16::MAX);
        assert_eq!(full.next_unset_bit(0), None);
        full.remove(128);
        full.remove(65535);
        assert_eq!(full.next_unset_bit(0), Some(128));
        assert_eq!(full.next_unset_bit(129), Some(65535));
        assert_eq!(full.next_unset_bit(65536), None);
    }

    #[test]
    fn iterates_ascending() {
        let keys = [0u16, 1, 63, 64, 500, 4095, 40000, 65535];
        let mut bitmap = Bitmap::new();
        for &key in keys.iter().rev() {
            bitmap.insert(key);
        }
        let iter = bitmap.iter();
        assert_eq!(iter.len(), keys.len());
        assert_eq!(iter.collect::<Vec<_>>(), keys);
        assert_eq!(format!("{}", bitmap), "{0,1,63,64,500,4095,40000,65535}");
    }

    #[test]
    fn flip_ranges() {
        // Within a single word.
        let mut bitmap = Bitmap::from_run(0, 9);
        bitmap.flip_range(5, 14);
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), (0 .. 5).chain(10 .. 15).collect::<Vec<u16>>());
        assert_eq!(bitmap.len(), popcount(&bitmap));

        // Ending exactly on a word boundary.
        let mut bitmap = Bitmap::new();
        bitmap.flip_range(0, 63);
        assert_eq!(bitmap.words()[0], !0);
        assert_eq!(bitmap.words()[1], 0);
        assert_eq!(bitmap.len(), 64);

        // Spanning several words, with interior words inverted.
        let mut bitmap = Bitmap::from_run(100, 300);
        bitmap.flip_range(50, 1000);
        let expected: Vec<u16> = (50 .. 100).chain(301 ..= 1000).collect();
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), expected);
        assert_eq!(bitmap.len(), expected.len());
        assert_eq!(bitmap.len(), popcount(&bitmap));

        // The full universe.
        let mut bitmap = Bitmap::from_run(7, 9);
        bitmap.flip_range(0, u16::MAX);
        assert_eq!(bitmap.len(), MAX_CAPACITY - 3);
        assert!(!bitmap.contains(8));
        assert!(bitmap.contains(10));

        // The last key alone.
        let mut bitmap = Bitmap::new();
        bitmap.flip_range(65535, 65535);
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), vec![65535]);
    }

    #[test]
    fn not_copies_outside_range() {
        let mut bitmap = Bitmap::from_run(0, 9999);
        bitmap.insert(60000);
        let answer = bitmap.not(100, 199);
        assert!(answer.is_dense());
        assert_eq!(answer.len(), 10001 - 100);
        assert!(answer.contains(99));
        assert!(!answer.contains(150));
        assert!(answer.contains(200));
        assert!(answer.contains(60000));
        // The receiver is untouched.
        assert_eq!(bitmap.len(), 10001);
    }

    #[test]
    fn word_parallel_thresholds() {
        let a = Bitmap::from_run(0, 9999);
        let b = Bitmap::from_run(5000, 14999);

        let and = a.and_bitmap(&b);
        assert!(and.is_dense());
        assert_eq!(and.len(), 5000);

        let xor = a.xor_bitmap(&b);
        assert!(xor.is_dense());
        assert_eq!(xor.len(), 10000);

        let or = a.or_bitmap(&b);
        assert_eq!(or.len(), 15000);

        let and_not = a.and_not_bitmap(&b);
        assert_eq!(and_not.len(), 5000);
        assert!(and_not.contains(4999));
        assert!(!and_not.contains(5000));

        // A small intersection becomes sparse.
        let c = Bitmap::from_run(9000, 20000);
        let small = a.and_bitmap(&c);
        assert!(!small.is_dense());
        assert_eq!(small.iter().collect::<Vec<_>>(), (9000 .. 10000).collect::<Vec<u16>>());

        let small = a.clone().into_and_bitmap(&c);
        assert!(!small.is_dense());
        assert_eq!(small.len(), 1000);

        let large = a.into_or_bitmap(&c);
        assert!(large.is_dense());
        assert_eq!(large.len(), 20001);
    }

    #[test]
    fn sparse_operands() {
        let bitmap = Bitmap::from_run(0, 4999);
        let sparse: Sparse = [3u16, 4999, 5000, 60000].into_iter().collect();

        assert_eq!(bitmap.and_sparse(&sparse).keys(), &[3, 4999]);

        let or = bitmap.or_sparse(&sparse);
        assert!(or.is_dense());
        assert_eq!(or.len(), 5002);

        let xor = bitmap.xor_sparse(&sparse);
        assert_eq!(xor.len(), 5000);
        assert!(!xor.contains(3));
        assert!(xor.contains(60000));

        // 4998 keys remain, which is above the threshold.
        let and_not = bitmap.and_not_sparse(&sparse);
        assert!(and_not.is_dense());
        assert_eq!(and_not.len(), 4998);

        // Dropping below the threshold converts.
        let trimmed = Bitmap::from_run(0, 4096).into_and_not_sparse(&[0u16].into_iter().collect());
        assert!(!trimmed.is_dense());
        assert_eq!(trimmed.len(), 4096);
    }
}
