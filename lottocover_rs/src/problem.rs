//! The immutable (n, k, p, t) lottery problem model and its derived counts.

use anyhow::{anyhow, bail, Result};
use tracing::info;

use crate::combinator::binomial;

/// A generalized lottery: `total_num_count` (n) numbers, tickets pick
/// `num_count_in_ticket` (k) of them, each draw selects `num_count_in_draw`
/// (p), and a ticket wins when at least `min_matched_num_count` (t) of its
/// numbers appear in the draw.
///
/// Parameters are validated at construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotteryProblem {
    total_num_count: usize,
    num_count_in_ticket: usize,
    num_count_in_draw: usize,
    min_matched_num_count: usize,
    total_ticket_count: usize,
    total_draw_count: usize,
}

impl LotteryProblem {
    /// Validate parameters and derive the combination-space sizes.
    ///
    /// Fails unless `n >= k >= t` and `n >= p >= t`. Also fails when either
    /// combination space is too large for dense indexing on this host; the
    /// pure rank/unrank functions in [`crate::combinator`] remain usable for
    /// such spaces.
    pub fn new(
        total_num_count: usize,
        num_count_in_ticket: usize,
        num_count_in_draw: usize,
        min_matched_num_count: usize,
    ) -> Result<Self> {
        let ordered = total_num_count >= num_count_in_ticket
            && num_count_in_ticket >= min_matched_num_count
            && total_num_count >= num_count_in_draw
            && num_count_in_draw >= min_matched_num_count;
        if !ordered {
            bail!(
                "invalid lottery parameters (n={total_num_count}, k={num_count_in_ticket}, \
                 p={num_count_in_draw}, t={min_matched_num_count}): require n >= k >= t and n >= p >= t"
            );
        }

        let total_ticket_count =
            usize::try_from(binomial(total_num_count, num_count_in_ticket)).map_err(|_| {
                anyhow!("C({total_num_count}, {num_count_in_ticket}) tickets cannot be densely indexed on this host")
            })?;
        let total_draw_count =
            usize::try_from(binomial(total_num_count, num_count_in_draw)).map_err(|_| {
                anyhow!("C({total_num_count}, {num_count_in_draw}) draws cannot be densely indexed on this host")
            })?;

        Ok(Self {
            total_num_count,
            num_count_in_ticket,
            num_count_in_draw,
            min_matched_num_count,
            total_ticket_count,
            total_draw_count,
        })
    }

    pub fn total_num_count(&self) -> usize {
        self.total_num_count
    }

    pub fn num_count_in_ticket(&self) -> usize {
        self.num_count_in_ticket
    }

    pub fn num_count_in_draw(&self) -> usize {
        self.num_count_in_draw
    }

    pub fn min_matched_num_count(&self) -> usize {
        self.min_matched_num_count
    }

    /// C(n, k).
    pub fn total_ticket_count(&self) -> usize {
        self.total_ticket_count
    }

    /// C(n, p).
    pub fn total_draw_count(&self) -> usize {
        self.total_draw_count
    }

    /// How many draws share exactly `matched_num_count` numbers with a fixed
    /// ticket: choose the matches from the ticket and the rest from outside.
    fn count_draws_with_matches(&self, matched_num_count: usize) -> u128 {
        let num_count_not_in_ticket = self.total_num_count - self.num_count_in_ticket;
        binomial(self.num_count_in_ticket, matched_num_count)
            * binomial(
                num_count_not_in_ticket,
                self.num_count_in_draw - matched_num_count,
            )
    }

    /// Number of draws any fixed ticket covers: the hypergeometric tail sum
    /// from `t` matches up to the maximum feasible overlap `min(p, k)`.
    ///
    /// Identical for every ticket by symmetry.
    pub fn covered_draw_count_per_ticket(&self) -> usize {
        let max_matched_num_count = self.num_count_in_draw.min(self.num_count_in_ticket);
        let total: u128 = (self.min_matched_num_count..=max_matched_num_count)
            .map(|matched_num_count| self.count_draws_with_matches(matched_num_count))
            .sum();
        // Covered draws are a subset of all draws, and total_draw_count was
        // proven to fit usize at construction.
        total as usize
    }

    /// Information-theoretic lower bound on covering-set size: no ticket
    /// covers more than `covered_draw_count_per_ticket` draws, so by
    /// pigeonhole no covering set can be smaller than this ratio.
    pub fn solution_size_lower_bound(&self) -> f64 {
        self.total_draw_count as f64 / self.covered_draw_count_per_ticket() as f64
    }

    /// Compact parameter signature, e.g. `"39,5,5,2"`.
    pub fn signature(&self) -> String {
        format!(
            "{},{},{},{}",
            self.total_num_count,
            self.num_count_in_ticket,
            self.num_count_in_draw,
            self.min_matched_num_count
        )
    }

    /// Emit a human-readable summary of the problem and its derived counts.
    pub fn log_summary(&self) {
        info!(
            "lottery problem with {} numbers, {} per ticket, {} per draw, {} or more matches to win",
            self.total_num_count,
            self.num_count_in_ticket,
            self.num_count_in_draw,
            self.min_matched_num_count
        );
        info!("{} tickets in total", self.total_ticket_count);
        info!("{} draws in total", self.total_draw_count);
        info!(
            "{} draws covered by each ticket",
            self.covered_draw_count_per_ticket()
        );
        info!(
            "{} entries in a full covered-draw cache",
            self.covered_draw_count_per_ticket() as u128 * self.total_ticket_count as u128
        );
        info!(
            "solution size lower bound: {:.3}",
            self.solution_size_lower_bound()
        );
    }
}
