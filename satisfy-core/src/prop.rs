//! Boolean constraint propagation over the two-watched-literal scheme.
use satisfy_formula::Lit;

use crate::clause::{ClauseRef, ClauseStore};
use crate::trail::{Reason, Trail};
use crate::watch::{Watch, Watchlists};

/// Propagates every literal currently queued on the trail to fixpoint.
///
/// Returns the clause that became false under the current assignment, if any. On conflict the
/// trail is left exactly as it was at the moment the conflict was detected: the caller is
/// responsible for conflict analysis and backjumping before propagation resumes.
pub fn propagate(
    trail: &mut Trail,
    clauses: &mut ClauseStore,
    watches: &mut Watchlists,
) -> Option<ClauseRef> {
    while let Some(p) = trail.pop_queue() {
        let false_lit = !p;
        let level = trail.current_level();

        let watch_list = watches.take(false_lit);
        let mut kept: Vec<Watch> = Vec::with_capacity(watch_list.len());
        let mut conflict: Option<ClauseRef> = None;

        for watch in watch_list {
            if conflict.is_some() {
                kept.push(watch);
                continue;
            }

            let cref = watch.cref;
            let lits = clauses.literals_mut(cref);

            if lits[0] != false_lit {
                lits.swap(0, 1);
            }
            debug_assert_eq!(lits[0], false_lit);

            let other = lits[1];
            if trail.lit_is_true(other) {
                kept.push(watch);
                continue;
            }

            let replacement = lits[2..]
                .iter()
                .position(|&lit| !trail.lit_is_false(lit))
                .map(|offset| offset + 2);

            if let Some(k) = replacement {
                lits.swap(0, k);
                let new_watched = lits[0];
                watches.push(new_watched, watch);
                continue;
            }

            match trail.assign(other, level, Reason::Clause(cref)) {
                Ok(()) => kept.push(watch),
                Err(()) => {
                    kept.push(watch);
                    conflict = Some(cref);
                }
            }
        }

        watches.restore(false_lit, kept);

        if conflict.is_some() {
            return conflict;
        }
    }

    None
}

/// The literals currently watching a clause, as positions `0` and `1`.
pub fn watched_literals(clause: &[Lit]) -> (Lit, Lit) {
    (clause[0], clause[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use satisfy_formula::Lit;

    fn setup(clauses_in: Vec<Vec<Lit>>, var_count: usize) -> (Trail, ClauseStore, Watchlists) {
        let mut trail = Trail::new();
        trail.set_var_count(var_count);
        let mut store = ClauseStore::new();
        let mut watches = Watchlists::new();
        watches.set_var_count(var_count);

        for clause in clauses_in {
            let cref = store.add(clause);
            let lits = store.get(cref);
            if lits.len() == 1 {
                trail.assign(lits[0], 0, Reason::Unit).unwrap();
            } else if lits.len() >= 2 {
                watches.watch(lits[0], cref);
                watches.watch(lits[1], cref);
            }
        }

        (trail, store, watches)
    }

    #[test]
    fn unit_propagation_chains() {
        let (mut trail, mut store, mut watches) = setup(
            vec![
                vec![Lit::from_dimacs(1)],
                vec![Lit::from_dimacs(-1), Lit::from_dimacs(2)],
                vec![Lit::from_dimacs(-2), Lit::from_dimacs(3)],
            ],
            3,
        );

        let conflict = propagate(&mut trail, &mut store, &mut watches);
        assert!(conflict.is_none());
        assert_eq!(trail.value(Lit::from_dimacs(2).var()), Some(true));
        assert_eq!(trail.value(Lit::from_dimacs(3).var()), Some(true));
    }

    #[test]
    fn conflicting_units_are_detected() {
        let (mut trail, mut store, mut watches) = setup(
            vec![vec![Lit::from_dimacs(1)], vec![Lit::from_dimacs(-1)]],
            1,
        );

        let conflict = propagate(&mut trail, &mut store, &mut watches);
        assert!(conflict.is_some());
    }

    #[test]
    fn watch_moves_to_unassigned_literal() {
        let (mut trail, mut store, mut watches) = setup(
            vec![vec![
                Lit::from_dimacs(1),
                Lit::from_dimacs(2),
                Lit::from_dimacs(3),
            ]],
            3,
        );

        trail.push_decision_level();
        trail.assign(Lit::from_dimacs(-1), 1, Reason::Decision).unwrap();
        let conflict = propagate(&mut trail, &mut store, &mut watches);
        assert!(conflict.is_none());
        assert_eq!(trail.value(Lit::from_dimacs(2).var()), None);
        assert_eq!(trail.value(Lit::from_dimacs(3).var()), None);
    }
}
