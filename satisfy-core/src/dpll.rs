//! Classical DPLL: unit propagation, pure-literal elimination, chronological backtracking.
//!
//! Implemented iteratively with an explicit stack of decision frames rather than recursively,
//! so a solve cannot exhaust the call stack on a long chain of decisions.
use log::{debug, trace};

use satisfy_formula::{CnfFormula, Lit, Var};

use crate::cdcl::Status;

/// Counters describing how a DPLL solve proceeded.
#[derive(Copy, Clone, Default, Debug)]
pub struct Stats {
    pub recursions: u64,
    pub implications: u64,
    pub decisions: u64,
    pub backtracks: u64,
    pub conflicts: u64,
    pub simplifications: u64,
    pub pure_literals: u64,
}

/// The result of a completed DPLL solve.
pub struct SolveResult {
    pub status: Status,
    pub assignment: Vec<Lit>,
    pub stats: Stats,
}

/// A pending alternative: if the true branch of `var` fails, retry with it assigned false from
/// this snapshot of the search state.
struct Frame {
    clauses: Vec<Vec<Lit>>,
    assignment: Vec<Option<bool>>,
    var: Var,
}

fn find_unit(clauses: &[Vec<Lit>]) -> Option<Lit> {
    clauses.iter().find(|clause| clause.len() == 1).map(|clause| clause[0])
}

fn find_pure(clauses: &[Vec<Lit>], var_count: usize) -> Option<Lit> {
    let mut positive = vec![false; var_count];
    let mut negative = vec![false; var_count];

    for clause in clauses {
        for &lit in clause {
            if lit.is_positive() {
                positive[lit.var().index()] = true;
            } else {
                negative[lit.var().index()] = true;
            }
        }
    }

    (0..var_count).find_map(|index| match (positive[index], negative[index]) {
        (true, false) => Some(Var::from_index(index).positive()),
        (false, true) => Some(Var::from_index(index).negative()),
        _ => None,
    })
}

/// Drops clauses satisfied by `assigned`, and removes `!assigned` from the clauses that remain.
///
/// A clause left with no literals represents a conflict: every one of its literals was falsified
/// by the current assignment.
fn simplify(clauses: &[Vec<Lit>], assigned: Lit) -> Vec<Vec<Lit>> {
    clauses
        .iter()
        .filter(|clause| !clause.contains(&assigned))
        .map(|clause| {
            clause
                .iter()
                .copied()
                .filter(|&lit| lit != !assigned)
                .collect()
        })
        .collect()
}

fn has_conflict(clauses: &[Vec<Lit>]) -> bool {
    clauses.iter().any(|clause| clause.is_empty())
}

fn first_unassigned(assignment: &[Option<bool>]) -> Option<Var> {
    assignment
        .iter()
        .position(|value| value.is_none())
        .map(Var::from_index)
}

/// Runs DPLL search on `formula`.
pub fn solve(formula: CnfFormula) -> SolveResult {
    let var_count = formula.var_count();
    let mut stats = Stats::default();
    let mut clauses: Vec<Vec<Lit>> = formula.iter().map(|clause| clause.to_vec()).collect();
    let mut assignment: Vec<Option<bool>> = vec![None; var_count];
    let mut stack: Vec<Frame> = vec![];

    'search: loop {
        stats.recursions += 1;

        while !has_conflict(&clauses) {
            if let Some(lit) = find_unit(&clauses) {
                trace!("unit propagate {:?}", lit);
                assignment[lit.var().index()] = Some(lit.is_positive());
                clauses = simplify(&clauses, lit);
                stats.implications += 1;
                stats.simplifications += 1;
                continue;
            }

            if let Some(lit) = find_pure(&clauses, var_count) {
                trace!("pure literal {:?}", lit);
                assignment[lit.var().index()] = Some(lit.is_positive());
                clauses = simplify(&clauses, lit);
                stats.pure_literals += 1;
                stats.simplifications += 1;
                continue;
            }

            break;
        }

        if has_conflict(&clauses) {
            stats.conflicts += 1;

            loop {
                let frame = match stack.pop() {
                    Some(frame) => frame,
                    None => {
                        debug!("exhausted every branch, unsatisfiable");
                        return SolveResult {
                            status: Status::Unsatisfiable,
                            assignment: vec![],
                            stats,
                        };
                    }
                };
                stats.backtracks += 1;

                let retry = frame.var.negative();
                assignment = frame.assignment;
                assignment[frame.var.index()] = Some(false);
                clauses = simplify(&frame.clauses, retry);
                continue 'search;
            }
        }

        if clauses.is_empty() {
            for value in &mut assignment {
                if value.is_none() {
                    *value = Some(true);
                }
            }

            debug!("every clause satisfied, satisfiable");
            let result_assignment = assignment
                .iter()
                .enumerate()
                .map(|(index, value)| Lit::from_index(index, value.unwrap_or(true)))
                .collect();

            return SolveResult {
                status: Status::Satisfiable,
                assignment: result_assignment,
                stats,
            };
        }

        let var = first_unassigned(&assignment)
            .expect("a non-empty, conflict-free clause set must still mention an unassigned variable");
        stats.decisions += 1;

        stack.push(Frame {
            clauses: clauses.clone(),
            assignment: assignment.clone(),
            var,
        });

        assignment[var.index()] = Some(true);
        clauses = simplify(&clauses, var.positive());
    }
}
