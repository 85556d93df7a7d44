//! Parallel fan-out experiment harness.
//!
//! Solves a batch of Sudoku puzzles with all three strategies (DPLL, CDCL+CHB, CDCL+EVSIDS),
//! validates each solution and aggregates the statistics into one CSV row per puzzle. Out of the
//! core's scope by design (spec.md §1): this is the orchestration shell around it, mirroring
//! `experiment_runner.py`'s `multiprocessing.Pool` fan-out with a bounded `std::thread` worker
//! pool, since each `satisfy-core` solve is independent, synchronous and owns its own state.
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use serde::Serialize;

use satisfy_core::{solve_dpll, Chb, Evsids, Solver};
use satisfy_formula::CnfFormula;
use satisfy_sudoku::{decode, encode_clues, merge, validate};

/// One row of the aggregated CSV output: per-strategy statistics for a single puzzle.
#[derive(Debug, Clone, Serialize)]
pub struct PuzzleRecord {
    pub unsolved_sudoku: String,
    pub unsolved_sudoku_number_of_clues: usize,
    pub unsolved_sudoku_number_of_unknown_positions: usize,
    pub unsolved_sudoku_total_of_characters: usize,

    pub vsids_is_satisfied: bool,
    pub vsids_is_solution_valid: bool,
    pub vsids_decisions: u64,
    pub vsids_propagations: u64,
    pub vsids_conflicts: u64,
    pub vsids_learned_clauses: u64,
    pub vsids_backjumps: u64,
    pub vsids_failed_backjumps: u64,
    pub vsids_elapsed_seconds: f64,

    pub chb_is_satisfied: bool,
    pub chb_is_solution_valid: bool,
    pub chb_decisions: u64,
    pub chb_propagations: u64,
    pub chb_conflicts: u64,
    pub chb_learned_clauses: u64,
    pub chb_backjumps: u64,
    pub chb_failed_backjumps: u64,
    pub chb_elapsed_seconds: f64,

    pub basic_dpll_is_satisfied: bool,
    pub basic_dpll_is_solution_valid: bool,
    pub basic_dpll_recursions: u64,
    pub basic_dpll_implications: u64,
    pub basic_dpll_decisions: u64,
    pub basic_dpll_backtracks: u64,
    pub basic_dpll_conflicts: u64,
    pub basic_dpll_simplifications: u64,
    pub basic_dpll_pure_literals: u64,
    pub basic_dpll_elapsed_seconds: f64,
}

/// Solves one puzzle against `rules` with every strategy and produces its CSV row.
///
/// `rules` must already declare the full `100*row + 10*col + value` variable range; the puzzle's
/// clues are encoded and merged with it independently for each strategy, matching the original's
/// `deepcopy(clauses)` per solver call (each solve gets its own untouched clause set).
pub fn solve_puzzle(puzzle: &str, rules: &CnfFormula) -> anyhow::Result<PuzzleRecord> {
    let clues = encode_clues(puzzle)?;

    let formula_for = || merge(clone_formula(rules), clone_formula(&clues));

    let start = Instant::now();
    let solver = Solver::new(formula_for(), Evsids::new());
    let vsids_result = solver.solve();
    let vsids_elapsed = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let solver = Solver::new(formula_for(), Chb::new());
    let chb_result = solver.solve();
    let chb_elapsed = start.elapsed().as_secs_f64();

    let start = Instant::now();
    let dpll_result = solve_dpll(formula_for());
    let dpll_elapsed = start.elapsed().as_secs_f64();

    let vsids_satisfied = vsids_result.status == satisfy_core::Status::Satisfiable;
    let chb_satisfied = chb_result.status == satisfy_core::Status::Satisfiable;
    let dpll_satisfied = dpll_result.status == satisfy_core::Status::Satisfiable;

    Ok(PuzzleRecord {
        unsolved_sudoku: puzzle.to_owned(),
        unsolved_sudoku_number_of_clues: puzzle.chars().filter(|&c| c != '.').count(),
        unsolved_sudoku_number_of_unknown_positions: puzzle.chars().filter(|&c| c == '.').count(),
        unsolved_sudoku_total_of_characters: puzzle.chars().count(),

        vsids_is_satisfied: vsids_satisfied,
        vsids_is_solution_valid: vsids_satisfied && validate(&decode(&vsids_result.assignment)),
        vsids_decisions: vsids_result.stats.decisions,
        vsids_propagations: vsids_result.stats.propagations,
        vsids_conflicts: vsids_result.stats.conflicts,
        vsids_learned_clauses: vsids_result.stats.learned_clauses,
        vsids_backjumps: vsids_result.stats.backjumps,
        vsids_failed_backjumps: vsids_result.stats.failed_backjumps,
        vsids_elapsed_seconds: vsids_elapsed,

        chb_is_satisfied: chb_satisfied,
        chb_is_solution_valid: chb_satisfied && validate(&decode(&chb_result.assignment)),
        chb_decisions: chb_result.stats.decisions,
        chb_propagations: chb_result.stats.propagations,
        chb_conflicts: chb_result.stats.conflicts,
        chb_learned_clauses: chb_result.stats.learned_clauses,
        chb_backjumps: chb_result.stats.backjumps,
        chb_failed_backjumps: chb_result.stats.failed_backjumps,
        chb_elapsed_seconds: chb_elapsed,

        basic_dpll_is_satisfied: dpll_satisfied,
        basic_dpll_is_solution_valid: dpll_satisfied && validate(&decode(&dpll_result.assignment)),
        basic_dpll_recursions: dpll_result.stats.recursions,
        basic_dpll_implications: dpll_result.stats.implications,
        basic_dpll_decisions: dpll_result.stats.decisions,
        basic_dpll_backtracks: dpll_result.stats.backtracks,
        basic_dpll_conflicts: dpll_result.stats.conflicts,
        basic_dpll_simplifications: dpll_result.stats.simplifications,
        basic_dpll_pure_literals: dpll_result.stats.pure_literals,
        basic_dpll_elapsed_seconds: dpll_elapsed,
    })
}

fn clone_formula(formula: &CnfFormula) -> CnfFormula {
    CnfFormula::from(formula.iter().map(|clause| clause.iter().copied()))
}

/// Solves every puzzle in `puzzles` against `rules` on a bounded worker pool, returning one
/// record per puzzle in the same order as the input.
///
/// `workers` threads pull from a shared work queue, the `std::thread`/`mpsc` counterpart of
/// `multiprocessing.Pool(processes=workers)`. Each worker owns its own `Solver` instances; no
/// state is shared between puzzles.
pub fn solve_all(puzzles: &[String], rules: &CnfFormula, workers: usize) -> Vec<anyhow::Result<PuzzleRecord>> {
    let workers = workers.max(1);
    let next_index = Arc::new(Mutex::new(0usize));
    let (result_tx, result_rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let next_index = Arc::clone(&next_index);
            let result_tx = result_tx.clone();
            scope.spawn(|| loop {
                let index = {
                    let mut guard = next_index.lock().unwrap();
                    if *guard >= puzzles.len() {
                        break;
                    }
                    let index = *guard;
                    *guard += 1;
                    index
                };

                let record = solve_puzzle(&puzzles[index], rules);
                result_tx.send((index, record)).expect("result receiver outlives every worker");
            });
        }
        drop(result_tx);

        let mut indexed: Vec<(usize, anyhow::Result<PuzzleRecord>)> = result_rx.iter().collect();
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, record)| record).collect()
    })
}
