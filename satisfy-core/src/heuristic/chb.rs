//! Conflict History-Based branching heuristic.
//!
//! Reinforcement-learning-style update: each literal that appears in a conflict clause is
//! rewarded in inverse proportion to how recently it last appeared in one, with a learning rate
//! that decays linearly from 0.4 toward a floor of 0.06. Constants match the source project's
//! `CHBHeuristics`.
use satisfy_formula::Lit;

use super::{highest_scoring_unassigned_lit, BranchingHeuristic};
use crate::clause::ClauseStore;
use crate::trail::Trail;

const INITIAL_ALPHA: f64 = 0.4;
const MIN_ALPHA: f64 = 0.06;
const DECAY_RATE: f64 = 1e-6;

/// Per-literal `q` score plus the bookkeeping needed to compute the recency reward.
pub struct Chb {
    q: Vec<f64>,
    last_conflict: Vec<u64>,
    conflicts: u64,
    alpha: f64,
}

impl Default for Chb {
    fn default() -> Chb {
        Chb {
            q: vec![],
            last_conflict: vec![],
            conflicts: 0,
            alpha: INITIAL_ALPHA,
        }
    }
}

impl Chb {
    pub fn new() -> Chb {
        Chb::default()
    }

    fn reward(&self, lit: Lit) -> f64 {
        1.0 / (self.conflicts - self.last_conflict[lit.code()] + 1) as f64
    }
}

impl BranchingHeuristic for Chb {
    fn initialize(&mut self, var_count: usize, _clauses: &ClauseStore) {
        self.q = vec![0.0; var_count * 2];
        self.last_conflict = vec![0; var_count * 2];
        self.conflicts = 0;
        self.alpha = INITIAL_ALPHA;
    }

    fn on_conflict(&mut self, conflict_clause: &[Lit]) {
        self.conflicts += 1;

        for &lit in conflict_clause {
            let reward = self.reward(lit);
            self.q[lit.code()] = (1.0 - self.alpha) * self.q[lit.code()] + self.alpha * reward;
            self.last_conflict[lit.code()] = self.conflicts;
        }
    }

    fn decay(&mut self) {
        if self.alpha > MIN_ALPHA {
            self.alpha = (self.alpha - DECAY_RATE).max(MIN_ALPHA);
        }
    }

    fn decide(&self, trail: &Trail) -> Option<Lit> {
        highest_scoring_unassigned_lit(trail, &self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satisfy_formula::Lit;

    #[test]
    fn conflict_rewards_recently_conflicting_literals() {
        let clauses = ClauseStore::new();
        let mut chb = Chb::new();
        chb.initialize(1, &clauses);

        chb.on_conflict(&[Lit::from_dimacs(1)]);
        assert_eq!(chb.q[Lit::from_dimacs(1).code()], INITIAL_ALPHA * 0.5);
        assert_eq!(chb.last_conflict[Lit::from_dimacs(1).code()], 1);
    }

    #[test]
    fn alpha_decays_toward_floor() {
        let clauses = ClauseStore::new();
        let mut chb = Chb::new();
        chb.initialize(1, &clauses);

        for _ in 0..1_000_000 {
            chb.decay();
        }

        assert!((chb.alpha - MIN_ALPHA).abs() < 1e-9);
    }

    #[test]
    fn decide_picks_highest_q_among_unassigned() {
        let mut trail = Trail::new();
        trail.set_var_count(2);

        let clauses = ClauseStore::new();
        let mut chb = Chb::new();
        chb.initialize(2, &clauses);
        chb.on_conflict(&[Lit::from_dimacs(2)]);

        assert_eq!(chb.decide(&trail), Some(Lit::from_dimacs(2)));
    }
}
