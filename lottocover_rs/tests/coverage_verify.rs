//! End-to-end verification of a known 23-ticket covering set for the
//! (39, 5, 5, 2) lottery: every possible 5-number draw shares at least two
//! numbers with at least one of the tickets.

use lottocover_rs::{
    CacheOptions, CoverageEngine, CoverageVerifier, DenseIntSet, IntSet, LotteryProblem,
    SparseIntSet,
};

fn cover_tickets_39_5_5_2() -> Vec<Vec<usize>> {
    vec![
        vec![0, 1, 2, 3, 4],
        vec![0, 1, 2, 5, 6],
        vec![0, 1, 7, 8, 9],
        vec![2, 6, 7, 8, 9],
        vec![3, 4, 5, 6, 7],
        vec![3, 4, 5, 8, 9],
        vec![10, 11, 12, 13, 14],
        vec![10, 11, 12, 15, 16],
        vec![10, 11, 17, 18, 19],
        vec![12, 16, 17, 18, 19],
        vec![13, 14, 15, 16, 17],
        vec![13, 14, 15, 18, 19],
        vec![20, 21, 22, 23, 24],
        vec![20, 21, 22, 25, 26],
        vec![20, 21, 27, 28, 29],
        vec![22, 26, 27, 28, 29],
        vec![23, 24, 25, 26, 27],
        vec![23, 24, 25, 28, 29],
        vec![30, 31, 32, 33, 34],
        vec![30, 35, 36, 37, 38],
        vec![31, 32, 33, 35, 36],
        vec![31, 32, 33, 37, 38],
        vec![34, 35, 36, 37, 38],
    ]
}

#[test]
fn known_cover_verifies_to_zero_uncovered() {
    let problem = LotteryProblem::new(39, 5, 5, 2).unwrap();
    let engine: CoverageEngine<DenseIntSet> = CoverageEngine::new(
        problem,
        CacheOptions {
            draw_to_index: true,
            ..CacheOptions::default()
        },
    );

    let ticket_indices = engine.get_indices_by_tickets(&cover_tickets_39_5_5_2());
    assert_eq!(ticket_indices.len(), 23);

    let verifier = CoverageVerifier::new(&engine);
    let progression = verifier.uncovered_progression(&ticket_indices);

    // Uncovered counts shrink monotonically and end at zero.
    for pair in progression.windows(2) {
        assert!(pair[0] >= pair[1], "uncovered count increased: {pair:?}");
    }
    assert_eq!(progression.last(), Some(&0));

    assert_eq!(verifier.verify_coverage(&ticket_indices), 0);
    assert!(engine.is_solution(&ticket_indices));
}

#[test]
fn backends_agree_on_covered_draws() {
    let problem = LotteryProblem::new(39, 5, 5, 2).unwrap();
    let options = CacheOptions::default();
    let sparse: CoverageEngine<SparseIntSet> = CoverageEngine::new(problem.clone(), options);
    let dense: CoverageEngine<DenseIntSet> = CoverageEngine::new(problem, options);

    let ticket_index = sparse.get_ticket_index(&[0, 1, 2, 3, 4]);
    let sparse_covered = sparse.generate_covered_draws(ticket_index);
    let dense_covered = dense.generate_covered_draws(ticket_index);

    assert_eq!(
        sparse_covered.len(),
        sparse.problem().covered_draw_count_per_ticket()
    );
    assert_eq!(sparse_covered.items(), dense_covered.items());
}

#[test]
fn insufficient_prefix_is_detected() {
    let problem = LotteryProblem::new(39, 5, 5, 2).unwrap();
    let engine: CoverageEngine<DenseIntSet> = CoverageEngine::new(
        problem,
        CacheOptions {
            draw_to_index: true,
            ..CacheOptions::default()
        },
    );
    let ticket_indices = engine.get_indices_by_tickets(&cover_tickets_39_5_5_2());

    // Six tickets cannot cover: the pigeonhole bound for this problem is
    // just under nine tickets.
    let prefix = &ticket_indices[..6];
    let uncovered = engine.get_uncovered_draws_of_tickets(prefix);
    assert!(!uncovered.is_empty());
    assert!(!engine.is_solution(prefix));
}
