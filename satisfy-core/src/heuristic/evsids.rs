//! Exponential VSIDS: bump-on-conflict, multiply-decay branching heuristic.
use satisfy_formula::Lit;

use super::{highest_scoring_unassigned_lit, BranchingHeuristic};
use crate::clause::ClauseStore;
use crate::trail::Trail;

/// Default per-conflict decay factor, matching the source project's `VSIDSHeuristics`.
const DECAY_FACTOR: f64 = 0.95;

/// Per-literal score, initialized by clause occurrence count and bumped on conflict.
pub struct Evsids {
    scores: Vec<f64>,
    decay_factor: f64,
}

impl Default for Evsids {
    fn default() -> Evsids {
        Evsids {
            scores: vec![],
            decay_factor: DECAY_FACTOR,
        }
    }
}

impl Evsids {
    /// Creates a heuristic with the default 0.95 decay factor.
    pub fn new() -> Evsids {
        Evsids::default()
    }

    /// Overrides the per-conflict decay factor.
    pub fn with_decay_factor(decay_factor: f64) -> Evsids {
        Evsids {
            decay_factor,
            ..Evsids::default()
        }
    }
}

impl BranchingHeuristic for Evsids {
    fn initialize(&mut self, var_count: usize, clauses: &ClauseStore) {
        self.scores = vec![0.0; var_count * 2];

        for clause in clauses.iter() {
            for &lit in clause {
                self.scores[lit.code()] += 1.0;
            }
        }
    }

    fn on_conflict(&mut self, conflict_clause: &[Lit]) {
        for &lit in conflict_clause {
            self.scores[lit.code()] += 1.0;
        }
    }

    fn decay(&mut self) {
        for score in &mut self.scores {
            *score *= self.decay_factor;
        }
    }

    fn decide(&self, trail: &Trail) -> Option<Lit> {
        highest_scoring_unassigned_lit(trail, &self.scores)
    }
}
