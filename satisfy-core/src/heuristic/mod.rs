//! Branching heuristics.
//!
//! A heuristic tracks one score per literal (not per variable: polarity is part of what gets
//! scored) and is consulted once per decision. The CDCL driver is generic over the heuristic
//! it uses, so the two implementations here carry no runtime dispatch cost.
mod chb;
mod evsids;

pub use chb::Chb;
pub use evsids::Evsids;

use satisfy_formula::Lit;

use crate::clause::ClauseStore;
use crate::trail::Trail;

/// The capability set a branching heuristic must provide.
pub trait BranchingHeuristic {
    /// Seeds per-literal scores from the clauses present before the first decision.
    fn initialize(&mut self, var_count: usize, clauses: &ClauseStore);

    /// Rewards the literals of a clause that just caused a conflict.
    fn on_conflict(&mut self, conflict_clause: &[Lit]);

    /// Applies the heuristic's time decay. Called once per conflict, after `on_conflict`.
    fn decay(&mut self);

    /// Picks the next literal to branch on: the highest-scoring literal whose variable is still
    /// unassigned. Returns `None` when every variable is assigned, which the driver reads as SAT.
    fn decide(&self, trail: &Trail) -> Option<Lit>;
}

fn highest_scoring_unassigned_lit(trail: &Trail, scores: &[f64]) -> Option<Lit> {
    (0..trail.var_count())
        .flat_map(|index| {
            let var = satisfy_formula::Var::from_index(index);
            [var.positive(), var.negative()]
        })
        .filter(|lit| trail.lit_is_unassigned(*lit))
        .max_by(|a, b| {
            scores[a.code()]
                .partial_cmp(&scores[b.code()])
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
