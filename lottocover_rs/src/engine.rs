//! Coverage engine: binds the rank/unrank bijection to a concrete
//! [`LotteryProblem`] and manages five independently optional caches.
//!
//! Every accessor is dual-path: it consults its cache when built and falls
//! back to direct computation otherwise, with identical results either way.
//! Callers therefore trade memory for speed per cache without changing call
//! sites.

use std::borrow::Cow;
use std::collections::HashMap;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combinator::{rank_combination, unrank_combination, CombinationIterator};
use crate::int_set::IntSet;
use crate::problem::LotteryProblem;

/// Canonical ticket combination: strictly increasing numbers in `[0, n)`.
pub type TicketCombo = Vec<usize>;
/// Canonical draw combination: strictly increasing numbers in `[0, n)`.
pub type DrawCombo = Vec<usize>;
/// Dense ticket index in `[0, C(n, k))` under lexicographic ordering.
pub type TicketIndex = usize;
/// Dense draw index in `[0, C(n, p))` under lexicographic ordering.
pub type DrawIndex = usize;

/// Which caches to build eagerly at engine construction. All default to
/// off; each can also be built or dropped later through the engine's
/// `cache_*` / `delete_cache_*` methods.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CacheOptions {
    /// Enumerate all ticket combinations for O(1) index-to-combo lookup.
    #[serde(default)]
    pub all_ticket_combos: bool,
    /// Enumerate all draw combinations for O(1) index-to-combo lookup.
    #[serde(default)]
    pub all_draw_combos: bool,
    /// Map every ticket combination to its index, replacing rank computation.
    #[serde(default)]
    pub ticket_to_index: bool,
    /// Map every draw combination to its index, replacing rank computation.
    /// Used heavily while building covered-draw sets.
    #[serde(default)]
    pub draw_to_index: bool,
    /// Precompute the covered-draw set of every ticket. Memory cost scales
    /// as total_ticket_count x covered_draw_count_per_ticket; see
    /// [`CoverageEngine::cache_covered_draws`].
    #[serde(default)]
    pub covered_draws: bool,
}

/// Combination indexing and covered-draw computation for one lottery
/// problem, parameterized over the [`IntSet`] storage backend.
///
/// Caches are owned by the engine instance and live until explicitly
/// deleted; nothing is shared across engines.
pub struct CoverageEngine<S: IntSet> {
    problem: LotteryProblem,
    all_ticket_combos: Option<Vec<TicketCombo>>,
    all_draw_combos: Option<Vec<DrawCombo>>,
    ticket_to_index: Option<HashMap<TicketCombo, TicketIndex>>,
    draw_to_index: Option<HashMap<DrawCombo, DrawIndex>>,
    covered_draws: Option<Vec<S>>,
}

impl<S: IntSet> CoverageEngine<S> {
    pub fn new(problem: LotteryProblem, options: CacheOptions) -> Self {
        let mut engine = Self {
            problem,
            all_ticket_combos: None,
            all_draw_combos: None,
            ticket_to_index: None,
            draw_to_index: None,
            covered_draws: None,
        };
        if options.all_ticket_combos {
            engine.cache_all_ticket_combos();
        }
        if options.all_draw_combos {
            engine.cache_all_draw_combos();
        }
        if options.ticket_to_index {
            engine.cache_ticket_to_index();
        }
        if options.draw_to_index {
            engine.cache_draw_to_index();
        }
        if options.covered_draws {
            engine.cache_covered_draws(true);
        }
        engine
    }

    pub fn problem(&self) -> &LotteryProblem {
        &self.problem
    }

    // ------------------------------------------------------------------
    // Ticket combinations
    // ------------------------------------------------------------------

    /// All ticket combinations in lexicographic (index) order.
    pub fn iter_all_ticket_combos(&self) -> CombinationIterator {
        CombinationIterator::new(
            self.problem.total_num_count(),
            self.problem.num_count_in_ticket(),
        )
    }

    pub fn is_all_ticket_combos_cached(&self) -> bool {
        self.all_ticket_combos.is_some()
    }

    pub fn cache_all_ticket_combos(&mut self) {
        if !self.is_all_ticket_combos_cached() {
            self.all_ticket_combos = Some(self.iter_all_ticket_combos().collect());
        }
    }

    pub fn delete_cache_all_ticket_combos(&mut self) {
        self.all_ticket_combos = None;
    }

    pub fn get_ticket_combo(&self, ticket_index: TicketIndex) -> TicketCombo {
        debug_assert!(
            ticket_index < self.problem.total_ticket_count(),
            "ticket index out of range"
        );
        if let Some(combos) = &self.all_ticket_combos {
            return combos[ticket_index].clone();
        }
        unrank_combination(
            ticket_index as u128,
            self.problem.total_num_count(),
            self.problem.num_count_in_ticket(),
        )
    }

    pub fn get_tickets_by_indices(&self, ticket_indices: &[TicketIndex]) -> Vec<TicketCombo> {
        ticket_indices
            .iter()
            .map(|&ticket_index| self.get_ticket_combo(ticket_index))
            .collect()
    }

    // ------------------------------------------------------------------
    // Ticket-to-index map
    // ------------------------------------------------------------------

    pub fn is_ticket_to_index_cached(&self) -> bool {
        self.ticket_to_index.is_some()
    }

    /// Build the combo-to-index map. Worth it only when ticket indices are
    /// looked up frequently; the rank fallback is already O(k).
    pub fn cache_ticket_to_index(&mut self) {
        if !self.is_ticket_to_index_cached() {
            self.ticket_to_index = Some(
                self.iter_all_ticket_combos()
                    .enumerate()
                    .map(|(index, combo)| (combo, index))
                    .collect(),
            );
        }
    }

    pub fn delete_cache_ticket_to_index(&mut self) {
        self.ticket_to_index = None;
    }

    /// Resolve a canonical ticket combination to its dense index.
    ///
    /// The combination must be strictly increasing with values in `[0, n)`;
    /// malformed input is a caller error (validate externally-sourced
    /// tickets before calling).
    pub fn get_ticket_index(&self, ticket_combo: &[usize]) -> TicketIndex {
        if let Some(map) = &self.ticket_to_index {
            return map[ticket_combo];
        }
        rank_combination(ticket_combo, self.problem.total_num_count()) as TicketIndex
    }

    pub fn get_indices_by_tickets(&self, ticket_combos: &[TicketCombo]) -> Vec<TicketIndex> {
        ticket_combos
            .iter()
            .map(|combo| self.get_ticket_index(combo))
            .collect()
    }

    /// Indices of all tickets containing a specific number.
    pub fn get_tickets_containing_number(&self, number: usize) -> Vec<TicketIndex> {
        self.iter_all_ticket_combos()
            .enumerate()
            .filter(|(_, combo)| combo.contains(&number))
            .map(|(index, _)| index)
            .collect()
    }

    // ------------------------------------------------------------------
    // Draw combinations
    // ------------------------------------------------------------------

    /// All draw combinations in lexicographic (index) order.
    pub fn iter_all_draw_combos(&self) -> CombinationIterator {
        CombinationIterator::new(
            self.problem.total_num_count(),
            self.problem.num_count_in_draw(),
        )
    }

    pub fn is_all_draw_combos_cached(&self) -> bool {
        self.all_draw_combos.is_some()
    }

    pub fn cache_all_draw_combos(&mut self) {
        if !self.is_all_draw_combos_cached() {
            self.all_draw_combos = Some(self.iter_all_draw_combos().collect());
        }
    }

    pub fn delete_cache_all_draw_combos(&mut self) {
        self.all_draw_combos = None;
    }

    pub fn get_draw_combo(&self, draw_index: DrawIndex) -> DrawCombo {
        debug_assert!(
            draw_index < self.problem.total_draw_count(),
            "draw index out of range"
        );
        if let Some(combos) = &self.all_draw_combos {
            return combos[draw_index].clone();
        }
        unrank_combination(
            draw_index as u128,
            self.problem.total_num_count(),
            self.problem.num_count_in_draw(),
        )
    }

    pub fn get_draw_combos_of_draw_set(&self, draws: &S) -> Vec<DrawCombo> {
        draws
            .items()
            .into_iter()
            .map(|draw_index| self.get_draw_combo(draw_index))
            .collect()
    }

    // ------------------------------------------------------------------
    // Draw-to-index map
    // ------------------------------------------------------------------

    pub fn is_draw_to_index_cached(&self) -> bool {
        self.draw_to_index.is_some()
    }

    /// Build the draw-to-index map. Covered-draw generation resolves one
    /// draw index per covered draw, so this map pays off whenever more than
    /// a handful of covered-draw sets are computed.
    pub fn cache_draw_to_index(&mut self) {
        if !self.is_draw_to_index_cached() {
            self.draw_to_index = Some(
                self.iter_all_draw_combos()
                    .enumerate()
                    .map(|(index, combo)| (combo, index))
                    .collect(),
            );
        }
    }

    pub fn delete_cache_draw_to_index(&mut self) {
        self.draw_to_index = None;
    }

    /// Resolve a canonical draw combination to its dense index. Same caller
    /// contract as [`Self::get_ticket_index`].
    pub fn get_draw_index(&self, draw_combo: &[usize]) -> DrawIndex {
        if let Some(map) = &self.draw_to_index {
            return map[draw_combo];
        }
        rank_combination(draw_combo, self.problem.total_num_count()) as DrawIndex
    }

    /// The set of all draws containing a specific number.
    pub fn get_draws_containing_number(&self, number: usize) -> S {
        self.create_draw_set(
            self.iter_all_draw_combos()
                .enumerate()
                .filter(|(_, combo)| combo.contains(&number))
                .map(|(index, _)| index),
        )
    }

    // ------------------------------------------------------------------
    // Covered draws
    // ------------------------------------------------------------------

    pub fn is_covered_draws_cached(&self) -> bool {
        self.covered_draws.is_some()
    }

    /// Compute the set of draw indices sharing at least `t` numbers with
    /// the given ticket: for each feasible match count, every way to pick
    /// the matches from the ticket and the rest from outside it.
    ///
    /// O(covered_draw_count_per_ticket) combination generations; this is
    /// the dominant cost of the full cache build.
    pub fn generate_covered_draws(&self, ticket_index: TicketIndex) -> S {
        let ticket_combo = self.get_ticket_combo(ticket_index);
        let num_count_in_draw = self.problem.num_count_in_draw();
        let max_matched_num_count = num_count_in_draw.min(self.problem.num_count_in_ticket());
        let nums_not_in_ticket: Vec<usize> = (0..self.problem.total_num_count())
            .filter(|num| !ticket_combo.contains(num))
            .collect();

        let mut draw_indices = Vec::with_capacity(self.problem.covered_draw_count_per_ticket());
        for matched_num_count in self.problem.min_matched_num_count()..=max_matched_num_count {
            for matched_nums in ticket_combo.iter().copied().combinations(matched_num_count) {
                for unmatched_nums in nums_not_in_ticket
                    .iter()
                    .copied()
                    .combinations(num_count_in_draw - matched_num_count)
                {
                    let mut draw_combo: DrawCombo =
                        matched_nums.iter().chain(unmatched_nums.iter()).copied().collect();
                    draw_combo.sort_unstable();
                    draw_indices.push(self.get_draw_index(&draw_combo));
                }
            }
        }

        self.create_draw_set(draw_indices)
    }

    /// Build the covered-draw set of every ticket, in parallel across
    /// tickets. No-op when already built.
    ///
    /// Memory cost is total_ticket_count x covered_draw_count_per_ticket
    /// set entries, which can be very large; callers must size-check via
    /// [`LotteryProblem`] before requesting this cache.
    ///
    /// When `temp_cache_draw_to_index` is set and the draw-to-index map is
    /// not already cached, it is built as a scaffold for the duration of
    /// this call and torn down afterwards, so repeated rank computation is
    /// avoided without leaking a cache the caller never asked to keep.
    pub fn cache_covered_draws(&mut self, temp_cache_draw_to_index: bool) {
        if self.is_covered_draws_cached() {
            return;
        }

        let was_draw_to_index_cached = self.is_draw_to_index_cached();
        if temp_cache_draw_to_index && !was_draw_to_index_cached {
            self.cache_draw_to_index();
        }

        // The draw-to-index map is frozen for the whole parallel section;
        // each ticket's computation is independent and read-only.
        let table: Vec<S> = {
            let engine = &*self;
            (0..engine.problem.total_ticket_count())
                .into_par_iter()
                .map(|ticket_index| engine.generate_covered_draws(ticket_index))
                .collect()
        };

        if temp_cache_draw_to_index && !was_draw_to_index_cached {
            self.delete_cache_draw_to_index();
        }

        self.covered_draws = Some(table);
    }

    pub fn delete_cache_covered_draws(&mut self) {
        self.covered_draws = None;
    }

    /// The covered-draw set of one ticket: borrowed from the cache when
    /// built, computed on demand otherwise.
    pub fn get_covered_draws(&self, ticket_index: TicketIndex) -> Cow<'_, S> {
        match &self.covered_draws {
            Some(table) => Cow::Borrowed(&table[ticket_index]),
            None => Cow::Owned(self.generate_covered_draws(ticket_index)),
        }
    }

    /// Union of the covered-draw sets of the given tickets.
    pub fn get_covered_draws_of_tickets(&self, ticket_indices: &[TicketIndex]) -> S {
        let mut covered_draws = self.create_empty_draw_set();
        for &ticket_index in ticket_indices {
            covered_draws.update(self.get_covered_draws(ticket_index).as_ref());
        }
        covered_draws
    }

    /// Draws left uncovered by the given tickets.
    pub fn get_uncovered_draws_of_tickets(&self, ticket_indices: &[TicketIndex]) -> S {
        let mut uncovered_draws = self.create_full_draw_set();
        for &ticket_index in ticket_indices {
            uncovered_draws.difference_update(self.get_covered_draws(ticket_index).as_ref());
        }
        uncovered_draws
    }

    /// True when the given tickets cover every draw.
    pub fn is_solution(&self, ticket_indices: &[TicketIndex]) -> bool {
        self.get_covered_draws_of_tickets(ticket_indices).is_full()
    }

    // ------------------------------------------------------------------
    // Draw-set factories
    // ------------------------------------------------------------------

    pub fn create_draw_set<I: IntoIterator<Item = DrawIndex>>(&self, draw_indices: I) -> S {
        S::from_indices(self.problem.total_draw_count(), draw_indices)
    }

    pub fn create_empty_draw_set(&self) -> S {
        S::empty(self.problem.total_draw_count())
    }

    pub fn create_full_draw_set(&self) -> S {
        S::full(self.problem.total_draw_count())
    }
}
