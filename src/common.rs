//! Common traits and types that are re-used throughout the crate.

use std::fmt;

/// A type with a length.
pub trait Len {
    /// The number of contained elements.
    fn len(&self) -> usize;
    /// Whether this contains no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
impl<L: Len + ?Sized> Len for &L {
    #[inline(always)] fn len(&self) -> usize { L::len(*self) }
}
impl<L: Len + ?Sized> Len for &mut L {
    #[inline(always)] fn len(&self) -> usize { L::len(*self) }
}

/// A type that can remove its contents and return to an empty state.
///
/// Generally, this method does not release resources, and is used to make the container available for re-insertion.
pub trait Clear {
    /// Clears `self`, without changing its capacity.
    fn clear(&mut self);
}

pub trait HeapSize {
    /// Active (len) and allocated (cap) heap sizes in bytes.
    /// This should not include the size of `self` itself.
    fn heap_size(&self) -> (usize, usize) { (0, 0) }
}

impl<T: HeapSize> HeapSize for [T] {
    fn heap_size(&self) -> (usize, usize) {
        let mut l = std::mem::size_of_val(self);
        let mut c = std::mem::size_of_val(self);
        for item in self.iter() {
            let (il, ic) = item.heap_size();
            l += il;
            c += ic;
        }
        (l, c)
    }
}
impl<T: HeapSize> HeapSize for Vec<T> {
    fn heap_size(&self) -> (usize, usize) {
        let mut l = std::mem::size_of::<T>() * self.len();
        let mut c = std::mem::size_of::<T>() * self.capacity();
        for item in (self[..]).iter() {
            let (il, ic) = item.heap_size();
            l += il;
            c += ic;
        }
        (l, c)
    }
}

/// Writes ascending keys as `{1,2,3}`.
pub(crate) fn fmt_keys(keys: impl Iterator<Item = u16>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("{")?;
    for (index, key) in keys.enumerate() {
        if index > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", key)?;
    }
    f.write_str("}")
}
