//! Trail and assignment view.
//!
//! The trail is the ordered sequence of all assigned literals, decisions and implications alike.
//! Position on the trail is the assignment timestamp; the decision-level boundaries recorded
//! alongside it let the solver backjump by truncation instead of undoing one assignment at a
//! time.
use satisfy_formula::{Lit, Var};

use crate::clause::ClauseRef;

/// Why a literal ended up on the trail.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Reason {
    /// Chosen by the branching heuristic.
    Decision,
    /// Forced by a clause with only one literal: either an original unit clause, loaded before
    /// any decision was made, or a unit clause learned from a conflict.
    Unit,
    /// Forced because every other literal of the given clause was false.
    Clause(ClauseRef),
}

#[derive(Copy, Clone)]
struct VarState {
    value: Option<bool>,
    level: u32,
    reason: Reason,
}

impl Default for VarState {
    fn default() -> VarState {
        VarState {
            value: None,
            level: 0,
            reason: Reason::Decision,
        }
    }
}

/// Current partial assignment, assignment order and decision-level structure.
#[derive(Default)]
pub struct Trail {
    vars: Vec<VarState>,
    trail: Vec<Lit>,
    queue_head: usize,
    /// Trail position where each decision level begins, indexed by `level - 1`.
    decision_starts: Vec<u32>,
}

impl Trail {
    /// Creates an empty trail with no variables.
    pub fn new() -> Trail {
        Trail::default()
    }

    /// Grows the trail to cover `count` variables.
    pub fn set_var_count(&mut self, count: usize) {
        self.vars.resize(count, VarState::default());
    }

    /// Number of variables the trail was sized for.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Value assigned to a variable, or `None` if unassigned.
    pub fn value(&self, var: Var) -> Option<bool> {
        self.vars[var.index()].value
    }

    /// Value assigned to a literal, accounting for its sign.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.value(lit.var()).map(|value| value ^ lit.is_negative())
    }

    /// Whether `lit` is currently assigned true.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(true)
    }

    /// Whether `lit` is currently assigned false.
    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(false)
    }

    /// Whether `lit`'s variable is currently unassigned.
    pub fn lit_is_unassigned(&self, lit: Lit) -> bool {
        self.lit_value(lit).is_none()
    }

    /// Whether every variable has a value.
    pub fn is_complete(&self) -> bool {
        self.trail.len() == self.vars.len()
    }

    /// Decision level at which `var` was assigned.
    ///
    /// Only meaningful for assigned variables.
    pub fn level_of(&self, var: Var) -> usize {
        self.vars[var.index()].level as usize
    }

    /// Reason `var` is assigned its current value.
    ///
    /// Only meaningful for assigned variables.
    pub fn reason_of(&self, var: Var) -> Reason {
        self.vars[var.index()].reason
    }

    /// Number of decisions currently in effect.
    pub fn current_level(&self) -> usize {
        self.decision_starts.len()
    }

    /// Starts a new decision level. The decision literal itself is assigned separately via
    /// [`assign`](Trail::assign).
    pub fn push_decision_level(&mut self) {
        self.decision_starts.push(self.trail.len() as u32);
    }

    /// Assigns `lit` true at `level` for `reason`.
    ///
    /// Fails if the variable is already assigned with the opposite sign: this signals a
    /// propagation conflict to the caller. Assigning an already-consistent literal is a no-op.
    pub fn assign(&mut self, lit: Lit, level: usize, reason: Reason) -> Result<(), ()> {
        let var = lit.var();
        match self.vars[var.index()].value {
            Some(value) if value != lit.is_positive() => return Err(()),
            Some(_) => return Ok(()),
            None => {}
        }

        self.vars[var.index()] = VarState {
            value: Some(lit.is_positive()),
            level: level as u32,
            reason,
        };
        self.trail.push(lit);
        Ok(())
    }

    /// Returns and dequeues the next literal BCP has not yet processed.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        if self.queue_head < self.trail.len() {
            let lit = self.trail[self.queue_head];
            self.queue_head += 1;
            Some(lit)
        } else {
            None
        }
    }

    /// Whether every assigned literal has been processed by BCP.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head == self.trail.len()
    }

    /// All assigned literals, in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Undoes all assignments at a decision level greater than `level`.
    ///
    /// Leaves no assignments of level > `level` on the trail.
    pub fn backjump_to(&mut self, level: usize) {
        if level >= self.current_level() {
            return;
        }

        let new_len = self.decision_starts[level] as usize;

        for &lit in &self.trail[new_len..] {
            self.vars[lit.var().index()].value = None;
        }

        self.trail.truncate(new_len);
        self.decision_starts.truncate(level);
        self.queue_head = self.queue_head.min(new_len);
    }

    /// The current assignment as a sequence of signed literals (only assigned variables).
    pub fn assignment(&self) -> Vec<Lit> {
        self.vars
            .iter()
            .enumerate()
            .filter_map(|(index, state)| {
                state
                    .value
                    .map(|value| Lit::from_index(index, value))
            })
            .collect()
    }

    /// Index of the first unassigned variable, if any.
    pub fn first_unassigned(&self) -> Option<Var> {
        self.vars
            .iter()
            .position(|state| state.value.is_none())
            .map(Var::from_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satisfy_formula::Lit;

    #[test]
    fn assign_and_backjump() {
        let mut trail = Trail::new();
        trail.set_var_count(4);

        trail.assign(Lit::from_dimacs(1), 0, Reason::Unit).unwrap();

        trail.push_decision_level();
        trail.assign(Lit::from_dimacs(2), 1, Reason::Decision).unwrap();
        trail.assign(Lit::from_dimacs(-3), 1, Reason::Unit).unwrap();

        trail.push_decision_level();
        trail.assign(Lit::from_dimacs(4), 2, Reason::Decision).unwrap();

        assert_eq!(trail.current_level(), 2);
        assert_eq!(trail.trail().len(), 4);

        trail.backjump_to(1);

        assert_eq!(trail.current_level(), 1);
        assert_eq!(trail.trail().len(), 3);
        assert_eq!(trail.value(Lit::from_dimacs(4).var()), None);
        assert_eq!(trail.value(Lit::from_dimacs(1).var()), Some(true));
    }

    #[test]
    fn assign_conflicting_sign_fails() {
        let mut trail = Trail::new();
        trail.set_var_count(1);

        trail.assign(Lit::from_dimacs(1), 0, Reason::Unit).unwrap();
        assert!(trail.assign(Lit::from_dimacs(-1), 0, Reason::Unit).is_err());
    }

    #[test]
    fn assign_same_sign_is_idempotent() {
        let mut trail = Trail::new();
        trail.set_var_count(1);

        trail.assign(Lit::from_dimacs(1), 0, Reason::Unit).unwrap();
        assert!(trail.assign(Lit::from_dimacs(1), 0, Reason::Unit).is_ok());
        assert_eq!(trail.trail().len(), 1);
    }
}
