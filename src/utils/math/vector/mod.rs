pub mod serde;

use std::fmt::{self, Debug};
use std::ops::Index;

use num::Num;

/// ZeroSpVec is a fixed-length sparse vector that treats zero as the
/// implicit value.
/// It holds `indices` and `values`:
/// `indices` keeps the logical index of every stored element and
/// `values` keeps the element itself.
///
/// Elements are kept sorted by ascending index and a stored element is
/// never zero.
#[derive(Clone, PartialEq)]
pub struct ZeroSpVec<N>
where
    N: Num + Copy,
{
    ind: Vec<usize>,
    val: Vec<N>,
    len: usize,
    zero: N,
}

impl<N> ZeroSpVec<N>
where
    N: Num + Copy,
{
    /// Create an all-zero vector of logical length `len`
    #[inline]
    pub fn new(len: usize) -> Self {
        ZeroSpVec {
            ind: Vec::new(),
            val: Vec::new(),
            len,
            zero: N::zero(),
        }
    }

    /// Create an all-zero vector with room for `cap` non-zero elements
    #[inline]
    pub fn with_capacity(len: usize, cap: usize) -> Self {
        ZeroSpVec {
            ind: Vec::with_capacity(cap),
            val: Vec::with_capacity(cap),
            len,
            zero: N::zero(),
        }
    }

    /// Build from `(index, value)` pairs.
    /// Returns `None` when an index is out of range or indices are not strictly ascending.
    /// Zero values are dropped.
    pub fn from_entries<I>(len: usize, entries: I) -> Option<Self>
    where
        I: IntoIterator<Item = (usize, N)>,
    {
        let mut vec = Self::new(len);
        for (index, value) in entries {
            if index >= len {
                return None;
            }
            if let Some(&last) = vec.ind.last() {
                if last >= index {
                    return None;
                }
            }
            if value != N::zero() {
                vec.ind.push(index);
                vec.val.push(value);
            }
        }
        Some(vec)
    }

    #[inline]
    fn ind_binary_search(&self, index: usize) -> Result<usize, usize> {
        self.ind.binary_search(&index)
    }

    /// logical length (dimension)
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// number of stored (non-zero) elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.ind.len()
    }

    /// true when no element is non-zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.ind.is_empty()
    }

    /// Get the element at `index`.
    /// Returns `None` only when `index` is out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&N> {
        if index >= self.len {
            return None;
        }
        match self.ind_binary_search(index) {
            Ok(pos) => Some(&self.val[pos]),
            Err(_) => Some(&self.zero),
        }
    }

    /// Overwrite the element at `index`.
    ///
    /// # Panics
    /// if `index >= len`
    pub fn set(&mut self, index: usize, value: N) {
        assert!(index < self.len, "index {index} out of bounds for length {}", self.len);
        match self.ind_binary_search(index) {
            Ok(pos) => {
                if value == N::zero() {
                    self.ind.remove(pos);
                    self.val.remove(pos);
                } else {
                    self.val[pos] = value;
                }
            }
            Err(pos) => {
                if value != N::zero() {
                    self.ind.insert(pos, index);
                    self.val.insert(pos, value);
                }
            }
        }
    }

    /// Add `delta` to the element at `index`.
    /// An element whose sum becomes exactly zero is dropped from storage.
    ///
    /// # Panics
    /// if `index >= len`
    pub fn add_at(&mut self, index: usize, delta: N) {
        assert!(index < self.len, "index {index} out of bounds for length {}", self.len);
        if delta == N::zero() {
            return;
        }
        match self.ind_binary_search(index) {
            Ok(pos) => {
                let sum = self.val[pos] + delta;
                if sum == N::zero() {
                    self.ind.remove(pos);
                    self.val.remove(pos);
                } else {
                    self.val[pos] = sum;
                }
            }
            Err(pos) => {
                self.ind.insert(pos, index);
                self.val.insert(pos, delta);
            }
        }
    }

    /// stored indices, ascending
    #[inline]
    pub fn as_ind_slice(&self) -> &[usize] {
        &self.ind
    }

    /// stored values, in index order
    #[inline]
    pub fn as_val_slice(&self) -> &[N] {
        &self.val
    }

    /// dense iterator over all `len` elements
    #[inline]
    pub fn iter(&self) -> ZeroSpVecIter<'_, N> {
        ZeroSpVecIter { vec: self, pos: 0 }
    }

    /// iterator over stored `(index, value)` pairs
    #[inline]
    pub fn raw_iter(&self) -> ZeroSpVecRawIter<'_, N> {
        ZeroSpVecRawIter { vec: self, pos: 0 }
    }

    pub fn to_dense(&self) -> Vec<N> {
        let mut dense = vec![N::zero(); self.len];
        for (idx, val) in self.raw_iter() {
            dense[idx] = *val;
        }
        dense
    }
}

impl<N> Index<usize> for ZeroSpVec<N>
where
    N: Num + Copy,
{
    type Output = N;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(val) => val,
            None => panic!("index {index} out of bounds for length {}", self.len),
        }
    }
}

impl<N: Num + Copy + Debug> Debug for ZeroSpVec<N> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_list().entries(self.iter()).finish()
        } else {
            f.debug_struct("ZeroSpVec")
                .field("len", &self.len)
                .field("nnz", &self.nnz())
                .field("entries", &self.raw_iter().collect::<Vec<_>>())
                .finish()
        }
    }
}

pub struct ZeroSpVecIter<'a, N>
where
    N: Num + Copy,
{
    vec: &'a ZeroSpVec<N>,
    pos: usize,
}

impl<'a, N> Iterator for ZeroSpVecIter<'a, N>
where
    N: Num + Copy,
{
    type Item = &'a N;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.vec.get(self.pos).map(|val| {
            self.pos += 1;
            val
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.vec.len - self.pos;
        (rest, Some(rest))
    }
}

pub struct ZeroSpVecRawIter<'a, N>
where
    N: Num + Copy,
{
    vec: &'a ZeroSpVec<N>,
    pos: usize,
}

impl<'a, N> Iterator for ZeroSpVecRawIter<'a, N>
where
    N: Num + Copy,
{
    type Item = (usize, &'a N);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.vec.ind.len() {
            let item = (self.vec.ind[self.pos], &self.vec.val[self.pos]);
            self.pos += 1;
            Some(item)
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.vec.ind.len() - self.pos;
        (rest, Some(rest))
    }
}
