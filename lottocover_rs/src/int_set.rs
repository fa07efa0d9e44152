//! Sets of integers over a fixed universe `[0, max_size)`, optimized for the
//! bulk boolean-algebra folds used by coverage queries.
//!
//! Two interchangeable backings implement the same [`IntSet`] contract: a
//! sparse explicit-index set (best when each set holds a small fraction of
//! the universe) and a dense packed bit vector (best when sets are dense or
//! when bulk word-level operations dominate). Binary operations require both
//! operands to share the same universe; a mismatch is a programming error
//! and fails fast.

use std::collections::HashSet;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Storage strategy for the sets a coverage engine produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Explicit-index storage backed by a hash set.
    #[default]
    Sparse,
    /// Packed u64 bit-vector storage.
    Dense,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Sparse => "sparse",
            Backend::Dense => "dense",
        }
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sparse" => Ok(Backend::Sparse),
            "dense" => Ok(Backend::Dense),
            other => bail!("unexpected int set backend {other:?} (expected sparse or dense)"),
        }
    }
}

/// A mutable set of integers bounded by a fixed universe size.
///
/// All binary operations panic if the operands disagree on `max_size`.
pub trait IntSet: Clone + Send + Sync {
    /// The empty set over `[0, max_size)`.
    fn empty(max_size: usize) -> Self;

    /// Build a set from an iterable of member indices.
    fn from_indices<I: IntoIterator<Item = usize>>(max_size: usize, indices: I) -> Self;

    /// The set containing every index in `[0, max_size)`.
    fn full(max_size: usize) -> Self {
        Self::from_indices(max_size, 0..max_size)
    }

    fn max_size(&self) -> usize;

    /// Number of members.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every index of the universe is a member.
    fn is_full(&self) -> bool {
        self.len() == self.max_size()
    }

    fn contains(&self, item: usize) -> bool;

    fn add(&mut self, item: usize);

    /// In-place union.
    fn update(&mut self, other: &Self);

    /// In-place difference.
    fn difference_update(&mut self, other: &Self);

    /// In-place intersection.
    fn intersection_update(&mut self, other: &Self);

    /// In-place complement with respect to the universe.
    fn complement_update(&mut self);

    fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.update(other);
        result
    }

    fn difference(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.difference_update(other);
        result
    }

    fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.intersection_update(other);
        result
    }

    fn complement(&self) -> Self {
        let mut result = self.clone();
        result.complement_update();
        result
    }

    /// Members in ascending order.
    fn items(&self) -> Vec<usize>;
}

/// Explicit-index set backed by a `HashSet`.
#[derive(Debug, Clone)]
pub struct SparseIntSet {
    max_size: usize,
    data: HashSet<usize>,
}

impl IntSet for SparseIntSet {
    fn empty(max_size: usize) -> Self {
        Self {
            max_size,
            data: HashSet::new(),
        }
    }

    fn from_indices<I: IntoIterator<Item = usize>>(max_size: usize, indices: I) -> Self {
        let data: HashSet<usize> = indices.into_iter().collect();
        debug_assert!(data.iter().all(|&item| item < max_size));
        Self { max_size, data }
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn contains(&self, item: usize) -> bool {
        self.data.contains(&item)
    }

    fn add(&mut self, item: usize) {
        debug_assert!(item < self.max_size);
        self.data.insert(item);
    }

    fn update(&mut self, other: &Self) {
        assert_eq!(self.max_size, other.max_size, "int set universe mismatch");
        self.data.extend(other.data.iter().copied());
    }

    fn difference_update(&mut self, other: &Self) {
        assert_eq!(self.max_size, other.max_size, "int set universe mismatch");
        for item in &other.data {
            self.data.remove(item);
        }
    }

    fn intersection_update(&mut self, other: &Self) {
        assert_eq!(self.max_size, other.max_size, "int set universe mismatch");
        self.data.retain(|item| other.data.contains(item));
    }

    fn complement_update(&mut self) {
        self.data = (0..self.max_size)
            .filter(|item| !self.data.contains(item))
            .collect();
    }

    fn items(&self) -> Vec<usize> {
        let mut items: Vec<usize> = self.data.iter().copied().collect();
        items.sort_unstable();
        items
    }
}

impl PartialEq for SparseIntSet {
    fn eq(&self, other: &Self) -> bool {
        self.max_size == other.max_size && self.data == other.data
    }
}

impl Eq for SparseIntSet {}

/// Packed bit-vector set: one bit per universe index, 64 indices per word.
///
/// Invariant: bits at positions >= max_size in the last word stay clear, so
/// popcounts and word-level complements never see phantom members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseIntSet {
    max_size: usize,
    words: Vec<u64>,
}

impl DenseIntSet {
    fn clear_tail(&mut self) {
        let tail_bits = self.max_size % 64;
        if tail_bits != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail_bits) - 1;
            }
        }
    }
}

impl IntSet for DenseIntSet {
    fn empty(max_size: usize) -> Self {
        Self {
            max_size,
            words: vec![0u64; max_size.div_ceil(64)],
        }
    }

    fn from_indices<I: IntoIterator<Item = usize>>(max_size: usize, indices: I) -> Self {
        let mut set = Self::empty(max_size);
        for item in indices {
            set.add(item);
        }
        set
    }

    fn full(max_size: usize) -> Self {
        let mut set = Self {
            max_size,
            words: vec![u64::MAX; max_size.div_ceil(64)],
        };
        set.clear_tail();
        set
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn contains(&self, item: usize) -> bool {
        if item >= self.max_size {
            return false;
        }
        self.words[item / 64] & (1u64 << (item % 64)) != 0
    }

    fn add(&mut self, item: usize) {
        debug_assert!(item < self.max_size);
        self.words[item / 64] |= 1u64 << (item % 64);
    }

    fn update(&mut self, other: &Self) {
        assert_eq!(self.max_size, other.max_size, "int set universe mismatch");
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word |= other_word;
        }
    }

    fn difference_update(&mut self, other: &Self) {
        assert_eq!(self.max_size, other.max_size, "int set universe mismatch");
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word &= !other_word;
        }
    }

    fn intersection_update(&mut self, other: &Self) {
        assert_eq!(self.max_size, other.max_size, "int set universe mismatch");
        for (word, other_word) in self.words.iter_mut().zip(&other.words) {
            *word &= other_word;
        }
    }

    fn complement_update(&mut self) {
        for word in &mut self.words {
            *word = !*word;
        }
        self.clear_tail();
    }

    fn items(&self) -> Vec<usize> {
        let mut items = Vec::with_capacity(self.len());
        for (word_index, &word) in self.words.iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                let offset = bits.trailing_zeros() as usize;
                items.push(word_index * 64 + offset);
                bits &= bits - 1;
            }
        }
        items
    }
}
