//! Rank/unrank bijection between k-combinations of `[0, n)` and dense
//! integer indices under lexicographic ordering, without ever materializing
//! the combination list.
//!
//! Ranks are `u128` so that combination spaces far too large to enumerate
//! (e.g. C(10000, 6)) can still be indexed without overflow.

use anyhow::{bail, Result};

/// Compute C(n, k) - the number of k-combinations from n items.
/// Returns 0 for k > n. Returns 1 for k == 0.
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    if k == 0 {
        return 1; // C(n, 0) = 1 for all n >= 0
    }
    // Use symmetry: C(n, k) = C(n, n-k) to minimize iterations
    let k = k.min(n - k);
    let mut numerator = 1u128;
    let mut denominator = 1u128;
    for i in 0..k {
        numerator *= (n - i) as u128;
        denominator *= (i + 1) as u128;
    }
    numerator / denominator
}

/// Count combinations of `remaining_length` elements from `[0, total_numbers)`
/// whose first element lies in `[start, candidate)`.
///
/// The naive count is `sum over c in start..candidate of
/// C(total_numbers - c - 1, remaining_length - 1)`; the hockey-stick
/// identity collapses that sum into two binomial evaluations.
fn count_skipped(
    total_numbers: usize,
    remaining_length: usize,
    start: usize,
    candidate: usize,
) -> u128 {
    binomial(total_numbers - start, remaining_length)
        - binomial(total_numbers - candidate, remaining_length)
}

/// Compute the 0-based position of a combination within the lexicographically
/// sorted list of all same-length combinations of `[0, total_numbers)`.
///
/// For each position we add, in closed form, the number of combinations
/// skipped by choosing `combination[position]` instead of the smallest
/// possible continuation. O(k) binomial evaluations total.
///
/// The input must be strictly increasing with every value below
/// `total_numbers`; this is not checked here. Callers holding
/// externally-sourced combinations must validate shape before calling.
pub fn rank_combination(combination: &[usize], total_numbers: usize) -> u128 {
    let combo_length = combination.len();
    let mut rank = 0u128;
    let mut next_smallest = 0usize;

    for (position, &current) in combination.iter().enumerate() {
        let remaining_length = combo_length - position;
        rank += count_skipped(total_numbers, remaining_length, next_smallest, current);
        next_smallest = current + 1;
    }

    rank
}

/// Generate the combination at `rank` within the lexicographically sorted
/// list of all `combo_length`-combinations of `[0, total_numbers)`, without
/// generating the list.
///
/// This is a direct decode of the combinatorial number system: each position
/// is resolved left to right by locating the candidate value whose block of
/// continuations contains the target rank. Block sizes are monotone in the
/// candidate, so each position is found by binary search.
///
/// Returns an empty Vec when `combo_length > total_numbers` or the rank is
/// out of range; use [`try_unrank_combination`] to turn those into errors.
pub fn unrank_combination(rank: u128, total_numbers: usize, combo_length: usize) -> Vec<usize> {
    if combo_length > total_numbers || rank >= binomial(total_numbers, combo_length) {
        return Vec::new();
    }

    let mut combination = Vec::with_capacity(combo_length);
    let mut remaining = rank;
    let mut start = 0usize;

    for position in 0..combo_length {
        let remaining_length = combo_length - position;
        let max_valid = total_numbers - remaining_length;

        // Smallest candidate c in [start, max_valid] such that the target
        // rank falls before the combinations continuing from c + 1.
        let mut lo = start;
        let mut hi = max_valid;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if remaining < count_skipped(total_numbers, remaining_length, start, mid + 1) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        remaining -= count_skipped(total_numbers, remaining_length, start, lo);
        combination.push(lo);
        start = lo + 1;
    }

    combination
}

/// Validating variant of [`unrank_combination`]: fails with a range error
/// instead of returning an empty Vec when the arguments are out of domain.
pub fn try_unrank_combination(
    rank: u128,
    total_numbers: usize,
    combo_length: usize,
) -> Result<Vec<usize>> {
    if combo_length > total_numbers {
        bail!(
            "combination length {combo_length} exceeds the pool of {total_numbers} numbers"
        );
    }
    let total = binomial(total_numbers, combo_length);
    if rank >= total {
        bail!(
            "rank {rank} is out of range for the {total} combinations of {combo_length} from {total_numbers} numbers"
        );
    }
    Ok(unrank_combination(rank, total_numbers, combo_length))
}

/// Iterator over all `combo_length`-combinations of `[0, total_numbers)` in
/// lexicographic order, advancing via the rightmost-increment rule.
///
/// Position i of the yielded sequence is exactly
/// `unrank_combination(i, total_numbers, combo_length)`.
pub struct CombinationIterator {
    total_numbers: usize,
    combo_length: usize,
    current: Vec<usize>,
    exhausted: bool,
}

impl CombinationIterator {
    pub fn new(total_numbers: usize, combo_length: usize) -> Self {
        Self {
            total_numbers,
            combo_length,
            current: (0..combo_length).collect(),
            exhausted: combo_length > total_numbers,
        }
    }

    fn advance(&mut self) {
        for i in (0..self.combo_length).rev() {
            let max_val = self.total_numbers - (self.combo_length - i);
            if self.current[i] < max_val {
                self.current[i] += 1;
                // Reset all positions to the right
                for j in (i + 1)..self.combo_length {
                    self.current[j] = self.current[j - 1] + 1;
                }
                return;
            }
        }
        self.exhausted = true;
    }
}

impl Iterator for CombinationIterator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let combo = self.current.clone();
        self.advance();
        Some(combo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_basic() {
        assert_eq!(binomial(5, 1), 5);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(5, 3), 10);
        assert_eq!(binomial(5, 5), 1);
        assert_eq!(binomial(18, 6), 18_564);
        assert_eq!(binomial(18, 4), 3_060);
        assert_eq!(binomial(39, 5), 575_757);
    }

    #[test]
    fn binomial_edge_cases() {
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(0, 0), 1);
        assert_eq!(binomial(5, 6), 0);
        assert_eq!(binomial(0, 1), 0);
    }

    #[test]
    fn binomial_symmetry() {
        for n in 1..=20 {
            for k in 0..=n {
                assert_eq!(
                    binomial(n, k),
                    binomial(n, n - k),
                    "Symmetry failed for C({}, {})",
                    n,
                    k
                );
            }
        }
    }

    #[test]
    fn unrank_depth_2_lex_order() {
        // C(5, 2) = 10 combinations in lex order:
        // {0,1}, {0,2}, {0,3}, {0,4}, {1,2}, {1,3}, {1,4}, {2,3}, {2,4}, {3,4}
        assert_eq!(unrank_combination(0, 5, 2), vec![0, 1]);
        assert_eq!(unrank_combination(1, 5, 2), vec![0, 2]);
        assert_eq!(unrank_combination(2, 5, 2), vec![0, 3]);
        assert_eq!(unrank_combination(3, 5, 2), vec![0, 4]);
        assert_eq!(unrank_combination(4, 5, 2), vec![1, 2]);
        assert_eq!(unrank_combination(5, 5, 2), vec![1, 3]);
        assert_eq!(unrank_combination(6, 5, 2), vec![1, 4]);
        assert_eq!(unrank_combination(7, 5, 2), vec![2, 3]);
        assert_eq!(unrank_combination(8, 5, 2), vec![2, 4]);
        assert_eq!(unrank_combination(9, 5, 2), vec![3, 4]);
    }

    #[test]
    fn unrank_depth_3_lex_order() {
        assert_eq!(unrank_combination(0, 5, 3), vec![0, 1, 2]);
        assert_eq!(unrank_combination(3, 5, 3), vec![0, 2, 3]);
        assert_eq!(unrank_combination(6, 5, 3), vec![1, 2, 3]);
        assert_eq!(unrank_combination(9, 5, 3), vec![2, 3, 4]);
    }

    #[test]
    fn unrank_out_of_domain_returns_empty() {
        let empty: Vec<usize> = vec![];
        assert_eq!(unrank_combination(0, 5, 6), empty);
        assert_eq!(unrank_combination(10, 5, 2), empty);
        assert_eq!(unrank_combination(1, 5, 5), empty);
    }

    #[test]
    fn try_unrank_rejects_out_of_domain() {
        assert!(try_unrank_combination(0, 5, 6).is_err());
        assert!(try_unrank_combination(10, 5, 2).is_err());
        assert!(try_unrank_combination(9, 5, 2).is_ok());
    }

    #[test]
    fn rank_matches_documented_skip_count() {
        // Skipping from (0,1,2,3) up to (5,10,17,28) with 30 numbers:
        // position 0 contributes C(30,4) - C(25,4), position 1 contributes
        // C(24,3) - C(20,3), and so on.
        let expected = (binomial(30, 4) - binomial(25, 4))
            + (binomial(24, 3) - binomial(20, 3))
            + (binomial(19, 2) - binomial(13, 2))
            + (binomial(12, 1) - binomial(2, 1));
        assert_eq!(rank_combination(&[5, 10, 17, 28], 30), expected);
    }

    #[test]
    fn rank_unrank_roundtrip_exhaustive_small() {
        for n in 1..=9 {
            for k in 1..=n {
                let count = binomial(n, k);
                for rank in 0..count {
                    let combo = unrank_combination(rank, n, k);
                    assert_eq!(combo.len(), k);
                    assert_eq!(
                        rank_combination(&combo, n),
                        rank,
                        "Roundtrip failed: n={}, k={}, rank={}, combo={:?}",
                        n,
                        k,
                        rank,
                        combo
                    );
                }
            }
        }
    }

    #[test]
    fn rank_unrank_roundtrip_large() {
        let test_cases: [(usize, usize, u128); 5] = [
            (100, 2, 4949),
            (100, 3, 161_699),
            (1000, 2, 250_000),
            (39, 5, 575_756),
            (10_000, 6, binomial(10_000, 6) / 2),
        ];

        for (n, k, rank) in test_cases {
            let combo = unrank_combination(rank, n, k);
            assert_eq!(combo.len(), k);
            assert_eq!(
                rank_combination(&combo, n),
                rank,
                "Roundtrip failed: n={}, k={}, rank={}",
                n,
                k,
                rank
            );
        }
    }

    #[test]
    fn unrank_preserves_lexicographic_order() {
        let n = 12;
        let k = 4;
        let count = binomial(n, k);
        let mut previous = unrank_combination(0, n, k);
        for rank in 1..count {
            let current = unrank_combination(rank, n, k);
            assert!(
                previous < current,
                "Order violated between ranks {} and {}",
                rank - 1,
                rank
            );
            previous = current;
        }
    }

    #[test]
    fn iterator_matches_unrank_at_every_position() {
        let n = 7;
        let k = 3;
        let combos: Vec<_> = CombinationIterator::new(n, k).collect();
        assert_eq!(combos.len(), binomial(n, k) as usize);

        for (i, combo) in combos.iter().enumerate() {
            assert_eq!(*combo, unrank_combination(i as u128, n, k));
            assert_eq!(rank_combination(combo, n), i as u128);
        }
    }

    #[test]
    fn iterator_handles_degenerate_lengths() {
        // One empty combination for length 0.
        let combos: Vec<_> = CombinationIterator::new(4, 0).collect();
        assert_eq!(combos, vec![Vec::<usize>::new()]);

        // No combinations when the length exceeds the pool.
        assert_eq!(CombinationIterator::new(3, 4).count(), 0);

        // Exactly one combination when length equals the pool.
        let combos: Vec<_> = CombinationIterator::new(4, 4).collect();
        assert_eq!(combos, vec![vec![0, 1, 2, 3]]);
    }
}
