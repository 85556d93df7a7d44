//! The CDCL solving engine: the public entry point for conflict-driven clause learning search.
use log::{debug, trace};

use satisfy_formula::{CnfFormula, Lit};

use crate::analyze::analyze;
use crate::clause::ClauseStore;
use crate::heuristic::BranchingHeuristic;
use crate::prop::propagate;
use crate::trail::{Reason, Trail};
use crate::watch::Watchlists;

/// The outcome of a solve.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Status {
    Satisfiable,
    Unsatisfiable,
}

/// Counters describing how a CDCL solve proceeded.
#[derive(Copy, Clone, Default, Debug)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub learned_clauses: u64,
    /// Backjumps that landed above decision level 0, i.e. search continued.
    pub backjumps: u64,
    /// Conflicts at decision level 0: no level is left to backjump to, so the solve ends
    /// unsatisfiable instead of continuing.
    pub failed_backjumps: u64,
}

/// The result of a completed solve.
pub struct SolveResult {
    pub status: Status,
    /// The full assignment, one signed literal per variable, when satisfiable. Empty otherwise.
    pub assignment: Vec<Lit>,
    pub stats: Stats,
}

/// A CDCL solver instance, generic over its branching heuristic.
///
/// Owns its clause store, trail and watch lists exclusively; nothing here is shared across
/// solver instances.
pub struct Solver<H: BranchingHeuristic> {
    clauses: ClauseStore,
    trail: Trail,
    watches: Watchlists,
    heuristic: H,
    stats: Stats,
    unsat_at_load: bool,
}

/// Sorts and deduplicates a clause's literals, reporting whether it is a tautology (contains a
/// variable with both polarities, and so is always true).
fn normalize(mut lits: Vec<Lit>) -> (Vec<Lit>, bool) {
    lits.sort_by_key(|lit| lit.code());
    lits.dedup();

    let tautology = lits
        .windows(2)
        .any(|pair| pair[0].var() == pair[1].var());

    (lits, tautology)
}

impl<H: BranchingHeuristic> Solver<H> {
    /// Builds a solver for `formula`, loading its clauses against an initially empty trail.
    ///
    /// Clauses are loaded one at a time and simplified against the partial assignment built up
    /// so far (tautologies and already-satisfied clauses are dropped, falsified literals are
    /// removed), so that by the time a multi-literal clause is watched, both watched literals are
    /// still unassigned.
    pub fn new(formula: CnfFormula, heuristic: H) -> Solver<H> {
        let var_count = formula.var_count();

        let mut trail = Trail::new();
        trail.set_var_count(var_count);
        let mut clauses = ClauseStore::new();
        let mut watches = Watchlists::new();
        watches.set_var_count(var_count);

        let mut unsat_at_load = false;

        for clause in formula.iter() {
            if unsat_at_load {
                break;
            }

            let (normalized, tautology) = normalize(clause.to_vec());
            if tautology {
                continue;
            }

            let mut filtered = Vec::with_capacity(normalized.len());
            let mut satisfied = false;
            for lit in normalized {
                if trail.lit_is_true(lit) {
                    satisfied = true;
                    break;
                }
                if trail.lit_is_false(lit) {
                    continue;
                }
                filtered.push(lit);
            }
            if satisfied {
                continue;
            }

            match filtered.len() {
                0 => unsat_at_load = true,
                1 => {
                    if trail.assign(filtered[0], 0, Reason::Unit).is_err() {
                        unsat_at_load = true;
                    }
                }
                _ => {
                    let cref = clauses.add(filtered);
                    let lits = clauses.get(cref);
                    watches.watch(lits[0], cref);
                    watches.watch(lits[1], cref);
                }
            }
        }

        let mut stats = Stats::default();
        if unsat_at_load {
            stats.conflicts = 1;
            stats.failed_backjumps = 1;
        }

        let mut solver = Solver {
            clauses,
            trail,
            watches,
            heuristic,
            stats,
            unsat_at_load,
        };

        solver.heuristic.initialize(var_count, &solver.clauses);
        solver
    }

    /// Runs the CDCL search to completion.
    pub fn solve(mut self) -> SolveResult {
        if self.unsat_at_load {
            return SolveResult {
                status: Status::Unsatisfiable,
                assignment: vec![],
                stats: self.stats,
            };
        }

        loop {
            let before = self.trail.trail().len();
            let conflict = propagate(&mut self.trail, &mut self.clauses, &mut self.watches);
            self.stats.propagations += (self.trail.trail().len() - before) as u64;

            if let Some(conflict_cref) = conflict {
                self.stats.conflicts += 1;

                if self.trail.current_level() == 0 {
                    self.stats.failed_backjumps += 1;
                    debug!("conflict at decision level 0, unsatisfiable");
                    return SolveResult {
                        status: Status::Unsatisfiable,
                        assignment: vec![],
                        stats: self.stats,
                    };
                }

                let (learned, backjump_level) =
                    analyze(&self.trail, &self.clauses, conflict_cref);
                trace!("learned clause of size {} at level {}", learned.len(), backjump_level);

                self.heuristic.on_conflict(&learned);
                self.heuristic.decay();
                self.stats.learned_clauses += 1;

                self.trail.backjump_to(backjump_level);
                self.stats.backjumps += 1;

                let asserted = learned[0];
                if learned.len() == 1 {
                    self.trail
                        .assign(asserted, backjump_level, Reason::Unit)
                        .expect("asserting literal of a unit learned clause must be consistent");
                } else {
                    let cref = self.clauses.append_learned(learned);
                    let lits = self.clauses.get(cref);
                    self.watches.watch(lits[0], cref);
                    self.watches.watch(lits[1], cref);
                    self.trail
                        .assign(asserted, backjump_level, Reason::Clause(cref))
                        .expect("asserting literal of a learned clause must be consistent");
                }

                continue;
            }

            if self.trail.is_complete() {
                debug!("all variables assigned, satisfiable");
                return SolveResult {
                    status: Status::Satisfiable,
                    assignment: self.trail.assignment(),
                    stats: self.stats,
                };
            }

            match self.heuristic.decide(&self.trail) {
                Some(lit) => {
                    self.stats.decisions += 1;
                    self.trail.push_decision_level();
                    let level = self.trail.current_level();
                    self.trail
                        .assign(lit, level, Reason::Decision)
                        .expect("deciding on an unassigned variable must be consistent");
                }
                None => {
                    return SolveResult {
                        status: Status::Satisfiable,
                        assignment: self.trail.assignment(),
                        stats: self.stats,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Evsids;
    use satisfy_formula::cnf;

    #[test]
    fn solves_a_satisfiable_formula() {
        let formula = CnfFormula::from(cnf![1, 2; -1, 2; -2, 3;]);
        let solver = Solver::new(formula, Evsids::new());
        let result = solver.solve();

        assert_eq!(result.status, Status::Satisfiable);
        assert!(result.assignment.iter().any(|&lit| lit == Lit::from_dimacs(2)));
    }

    #[test]
    fn detects_an_unsatisfiable_formula() {
        let formula = CnfFormula::from(cnf![1; -1;]);
        let solver = Solver::new(formula, Evsids::new());
        let result = solver.solve();

        assert_eq!(result.status, Status::Unsatisfiable);
        assert_eq!(result.stats.conflicts, 1);
        assert_eq!(result.stats.failed_backjumps, 1);
    }

    #[test]
    fn learns_a_clause_before_converging() {
        let formula = CnfFormula::from(cnf![1, 2; -1, 2; 1, -2; -1, -2;]);
        let solver = Solver::new(formula, Evsids::new());
        let result = solver.solve();

        assert_eq!(result.status, Status::Unsatisfiable);
    }

    #[test]
    fn empty_formula_is_satisfiable_with_empty_assignment() {
        let solver = Solver::new(CnfFormula::new(), Evsids::new());
        let result = solver.solve();

        assert_eq!(result.status, Status::Satisfiable);
        assert!(result.assignment.is_empty());
    }

    #[test]
    fn a_lone_empty_clause_is_unsatisfiable() {
        let mut formula = CnfFormula::new();
        formula.add_clause(Vec::<Lit>::new());

        let solver = Solver::new(formula, Evsids::new());
        let result = solver.solve();

        assert_eq!(result.status, Status::Unsatisfiable);
    }

    #[test]
    fn single_unit_clause_is_satisfiable_and_asserts_its_literal() {
        let formula = CnfFormula::from(cnf![1;]);
        let solver = Solver::new(formula, Evsids::new());
        let result = solver.solve();

        assert_eq!(result.status, Status::Satisfiable);
        assert!(result.assignment.contains(&Lit::from_dimacs(1)));
    }

    #[test]
    fn complementary_units_are_unsatisfiable() {
        let formula = CnfFormula::from(cnf![1; -1;]);
        let solver = Solver::new(formula, Evsids::new());
        let result = solver.solve();

        assert_eq!(result.status, Status::Unsatisfiable);
    }

    /// Pigeonhole PHP(3,2): three pigeons, two holes, each pigeon in some hole, no hole holding
    /// two pigeons. Classically unsatisfiable and a stress test for clause learning, since a
    /// DPLL-style solver without learning needs exponentially many branches on larger instances.
    /// Variable numbering: pigeon `i` in hole `j` is `(i - 1) * 2 + j`.
    #[test]
    fn pigeonhole_three_into_two_is_unsatisfiable() {
        let formula = CnfFormula::from(cnf![
            1, 2;
            3, 4;
            5, 6;
            -1, -3;
            -1, -5;
            -3, -5;
            -2, -4;
            -2, -6;
            -4, -6;
        ]);

        let solver = Solver::new(formula, Evsids::new());
        let result = solver.solve();

        assert_eq!(result.status, Status::Unsatisfiable);
    }

    mod soundness {
        use super::*;
        use crate::heuristic::Chb;
        use satisfy_formula::cnf::strategy::vec_formula;

        use proptest::prelude::*;

        proptest! {
            /// Every reported SAT result satisfies every clause of the input formula.
            #[test]
            fn satisfiable_results_satisfy_every_clause(
                clauses in vec_formula(1..12usize, 0..40, 0..5)
            ) {
                let formula = CnfFormula::from(clauses.iter().map(|clause| clause.iter().copied()));
                let solver = Solver::new(formula, Chb::new());
                let result = solver.solve();

                if result.status == Status::Satisfiable {
                    for clause in &clauses {
                        prop_assert!(
                            clause.iter().any(|lit| result.assignment.contains(lit)),
                            "clause {:?} not satisfied by {:?}", clause, result.assignment
                        );
                    }
                }
            }

            /// Every CDCL UNSAT verdict agrees with the independently implemented DPLL engine.
            #[test]
            fn unsat_agrees_with_dpll(clauses in vec_formula(1..10usize, 0..30, 0..4)) {
                let for_cdcl = CnfFormula::from(clauses.iter().map(|clause| clause.iter().copied()));
                let cdcl_result = Solver::new(for_cdcl, Evsids::new()).solve();

                if cdcl_result.status == Status::Unsatisfiable {
                    let for_dpll = CnfFormula::from(clauses.iter().map(|clause| clause.iter().copied()));
                    let dpll_result = crate::dpll::solve(for_dpll);
                    prop_assert_eq!(dpll_result.status, Status::Unsatisfiable);
                }
            }
        }
    }
}
