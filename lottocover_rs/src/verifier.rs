//! End-to-end verification of candidate covering ticket sets, plus the
//! auxiliary statistics (coverage distribution, redundancy, overlap) used to
//! judge their quality.

use std::collections::BTreeMap;

use tracing::info;

use crate::engine::{CoverageEngine, TicketIndex};
use crate::int_set::IntSet;

/// Checks whether a ticket index sequence covers all draws of the engine's
/// problem, and computes redundancy/overlap statistics over the selection.
pub struct CoverageVerifier<'a, S: IntSet> {
    engine: &'a CoverageEngine<S>,
}

impl<'a, S: IntSet> CoverageVerifier<'a, S> {
    pub fn new(engine: &'a CoverageEngine<S>) -> Self {
        Self { engine }
    }

    /// Uncovered-draw count after each successive ticket is applied to the
    /// full draw set. Non-increasing by construction; the last entry is 0
    /// exactly when the selection is a full cover.
    pub fn uncovered_progression(&self, ticket_indices: &[TicketIndex]) -> Vec<usize> {
        let mut uncovered_draws = self.engine.create_full_draw_set();
        let mut progression = Vec::with_capacity(ticket_indices.len());
        for &ticket_index in ticket_indices {
            uncovered_draws.difference_update(self.engine.get_covered_draws(ticket_index).as_ref());
            progression.push(uncovered_draws.len());
        }
        progression
    }

    /// Verify coverage incrementally, logging the remaining uncovered count
    /// after each ticket. Returns the final uncovered count; 0 means the
    /// selection covers every draw.
    pub fn verify_coverage(&self, ticket_indices: &[TicketIndex]) -> usize {
        let total_draw_count = self.engine.problem().total_draw_count();
        info!("{total_draw_count} draws in total");

        let progression = self.uncovered_progression(ticket_indices);
        for (position, (&ticket_index, &uncovered_count)) in
            ticket_indices.iter().zip(&progression).enumerate()
        {
            let ticket_combo = self.engine.get_ticket_combo(ticket_index);
            let uncovered_percentage = uncovered_count as f64 / total_draw_count as f64 * 100.0;
            info!(
                "add ticket {}: {:?} -> {} / {} = {:.2}% draws uncovered",
                position + 1,
                ticket_combo,
                uncovered_count,
                total_draw_count,
                uncovered_percentage
            );
        }

        progression.last().copied().unwrap_or(total_draw_count)
    }

    /// How many of the selected tickets cover each draw, indexed by draw.
    pub fn draw_cover_counts(&self, ticket_indices: &[TicketIndex]) -> Vec<usize> {
        let mut cover_counts = vec![0usize; self.engine.problem().total_draw_count()];
        for &ticket_index in ticket_indices {
            for draw_index in self.engine.get_covered_draws(ticket_index).items() {
                cover_counts[draw_index] += 1;
            }
        }
        cover_counts
    }

    /// Histogram of cover frequencies over the draws covered at least once:
    /// frequency -> number of draws covered exactly that many times.
    pub fn coverage_distribution(&self, ticket_indices: &[TicketIndex]) -> BTreeMap<usize, usize> {
        let mut distribution = BTreeMap::new();
        for count in self.draw_cover_counts(ticket_indices) {
            if count > 0 {
                *distribution.entry(count).or_insert(0) += 1;
            }
        }
        distribution
    }

    /// Occurrence count of each number across the selected tickets, indexed
    /// by number.
    pub fn count_numbers(&self, ticket_indices: &[TicketIndex]) -> Vec<usize> {
        let mut occurrences = vec![0usize; self.engine.problem().total_num_count()];
        for combo in self.engine.get_tickets_by_indices(ticket_indices) {
            for number in combo {
                occurrences[number] += 1;
            }
        }
        occurrences
    }

    /// Per-ticket redundancy: for each selected ticket, how many of its
    /// covered draws are also covered by at least one other selected ticket.
    /// Two passes: tally cover counts per draw, then re-walk each ticket's
    /// covered draws counting those with cover count > 1.
    pub fn evaluate_redundancy(&self, ticket_indices: &[TicketIndex]) -> Vec<usize> {
        let cover_counts = self.draw_cover_counts(ticket_indices);

        ticket_indices
            .iter()
            .map(|&ticket_index| {
                self.engine
                    .get_covered_draws(ticket_index)
                    .items()
                    .into_iter()
                    .filter(|&draw_index| cover_counts[draw_index] > 1)
                    .count()
            })
            .collect()
    }

    /// Selected tickets sorted by redundancy, most redundant first, with a
    /// logged report. Useful for spotting tickets a covering set could
    /// likely drop.
    pub fn tickets_by_redundancy(
        &self,
        ticket_indices: &[TicketIndex],
    ) -> Vec<(usize, TicketIndex)> {
        let redundancies = self.evaluate_redundancy(ticket_indices);
        let mut ranked: Vec<(usize, TicketIndex)> = redundancies
            .into_iter()
            .zip(ticket_indices.iter().copied())
            .collect();
        ranked.sort_unstable_by(|a, b| b.cmp(a));

        let covered_per_ticket = self.engine.problem().covered_draw_count_per_ticket();
        for &(redundancy, ticket_index) in &ranked {
            info!(
                "ticket {}: {:?}, redundancy {}/{}",
                ticket_index,
                self.engine.get_ticket_combo(ticket_index),
                redundancy,
                covered_per_ticket
            );
        }
        ranked
    }

    /// Histogram of pairwise number overlaps between selected tickets:
    /// overlap size -> number of ticket pairs with that overlap.
    pub fn count_overlap(&self, ticket_indices: &[TicketIndex]) -> BTreeMap<usize, usize> {
        let ticket_combos = self.engine.get_tickets_by_indices(ticket_indices);

        let mut histogram = BTreeMap::new();
        for (i, combo_1) in ticket_combos.iter().enumerate() {
            for combo_2 in ticket_combos.iter().skip(i + 1) {
                // Combos are sorted and tiny, so a contains scan beats set
                // construction here.
                let overlap_count = combo_1
                    .iter()
                    .filter(|number| combo_2.contains(number))
                    .count();
                *histogram.entry(overlap_count).or_insert(0) += 1;
            }
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CacheOptions;
    use crate::int_set::SparseIntSet;
    use crate::problem::LotteryProblem;

    fn engine_4_2_2_1() -> CoverageEngine<SparseIntSet> {
        let problem = LotteryProblem::new(4, 2, 2, 1).unwrap();
        CoverageEngine::new(problem, CacheOptions::default())
    }

    #[test]
    fn full_cover_reaches_zero_uncovered() {
        let engine = engine_4_2_2_1();
        let verifier = CoverageVerifier::new(&engine);

        // Tickets {0,1} and {2,3}.
        assert_eq!(verifier.verify_coverage(&[0, 5]), 0);
        assert_eq!(verifier.uncovered_progression(&[0, 5]), vec![1, 0]);
    }

    #[test]
    fn empty_selection_leaves_everything_uncovered() {
        let engine = engine_4_2_2_1();
        let verifier = CoverageVerifier::new(&engine);
        assert_eq!(
            verifier.verify_coverage(&[]),
            engine.problem().total_draw_count()
        );
    }

    #[test]
    fn coverage_distribution_and_redundancy() {
        let engine = engine_4_2_2_1();
        let verifier = CoverageVerifier::new(&engine);
        let selection = [0, 5];

        // Draw {0,1} and {2,3} are each covered once; the four mixed draws
        // are covered by both tickets.
        let distribution = verifier.coverage_distribution(&selection);
        assert_eq!(distribution, BTreeMap::from([(1, 2), (2, 4)]));

        let redundancies = verifier.evaluate_redundancy(&selection);
        assert_eq!(redundancies, vec![4, 4]);

        // Every draw covered c > 1 times contributes c redundancy units,
        // one to each covering ticket.
        let cover_counts = verifier.draw_cover_counts(&selection);
        let expected_total: usize = cover_counts.iter().filter(|&&c| c > 1).sum();
        assert_eq!(redundancies.iter().sum::<usize>(), expected_total);
    }

    #[test]
    fn number_and_overlap_counts() {
        let engine = engine_4_2_2_1();
        let verifier = CoverageVerifier::new(&engine);

        // {0,1}, {0,2}, {2,3}
        let selection = [0, 1, 5];
        assert_eq!(verifier.count_numbers(&selection), vec![2, 1, 2, 1]);

        // Overlaps: |{0,1} n {0,2}| = 1, |{0,1} n {2,3}| = 0, |{0,2} n {2,3}| = 1.
        assert_eq!(
            verifier.count_overlap(&selection),
            BTreeMap::from([(0, 1), (1, 2)])
        );
    }

    #[test]
    fn redundancy_ranking_is_descending() {
        let engine = engine_4_2_2_1();
        let verifier = CoverageVerifier::new(&engine);

        // {0,1} twice-ish overlapping selection: {0,1}, {0,2}, {2,3}.
        let ranked = verifier.tickets_by_redundancy(&[0, 1, 5]);
        assert_eq!(ranked.len(), 3);
        for pair in ranked.windows(2) {
            assert!(pair[0].0 >= pair[1].0);
        }
    }
}
