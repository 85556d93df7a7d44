//! First-UIP conflict analysis.
use satisfy_formula::Lit;

use crate::clause::{ClauseRef, ClauseStore};
use crate::trail::{Reason, Trail};

/// Resolves the conflicting clause back through the trail until exactly one literal of the
/// current decision level remains (the first unique implication point), producing a learned
/// clause and the level to backjump to.
///
/// The returned clause has the asserting literal (the negation of the UIP) at index 0; the
/// backjump level is the second-highest decision level among the clause's other literals, or 0
/// if the clause is unit.
pub fn analyze(trail: &Trail, clauses: &ClauseStore, conflict: ClauseRef) -> (Vec<Lit>, usize) {
    let current_level = trail.current_level();
    let mut seen = vec![false; trail.var_count()];
    let mut counter = 0usize;
    let mut learned: Vec<Lit> = vec![];

    let mut reason_lits: Vec<Lit> = clauses.get(conflict).to_vec();
    let mut resolving: Option<Lit> = None;
    let mut trail_index = trail.trail().len();

    loop {
        for &q in &reason_lits {
            if Some(q) == resolving {
                continue;
            }

            let var = q.var();
            let level = trail.level_of(var);

            if level == 0 || seen[var.index()] {
                continue;
            }
            seen[var.index()] = true;

            if level == current_level {
                counter += 1;
            } else {
                learned.push(q);
            }
        }

        let p = loop {
            trail_index -= 1;
            let lit = trail.trail()[trail_index];
            if seen[lit.var().index()] {
                break lit;
            }
        };

        seen[p.var().index()] = false;
        counter -= 1;
        if counter == 0 {
            resolving = Some(p);
            learned.insert(0, !p);
            break;
        }

        resolving = Some(p);
        reason_lits = match trail.reason_of(p.var()) {
            Reason::Clause(cref) => clauses.get(cref).to_vec(),
            Reason::Unit | Reason::Decision => unreachable!(
                "a literal still requiring resolution must have been propagated from a clause"
            ),
        };
    }

    let backjump_level = learned[1..]
        .iter()
        .map(|lit| trail.level_of(lit.var()))
        .max()
        .unwrap_or(0);

    (learned, backjump_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::Watchlists;
    use satisfy_formula::Lit;

    #[test]
    fn learns_unit_clause_at_decision_level_one() {
        let mut trail = Trail::new();
        trail.set_var_count(3);
        let mut clauses = ClauseStore::new();
        let mut watches = Watchlists::new();
        watches.set_var_count(3);

        let c1 = clauses.add(vec![Lit::from_dimacs(-1), Lit::from_dimacs(2)]);
        let c2 = clauses.add(vec![Lit::from_dimacs(-1), Lit::from_dimacs(-2)]);
        watches.watch(Lit::from_dimacs(-1), c1);
        watches.watch(Lit::from_dimacs(2), c1);
        watches.watch(Lit::from_dimacs(-1), c2);
        watches.watch(Lit::from_dimacs(-2), c2);

        trail.push_decision_level();
        trail.assign(Lit::from_dimacs(1), 1, Reason::Decision).unwrap();

        let conflict = crate::prop::propagate(&mut trail, &mut clauses, &mut watches);
        let conflict = conflict.expect("decision 1 should conflict via c1/c2");

        let (learned, level) = analyze(&trail, &clauses, conflict);
        assert_eq!(learned, vec![Lit::from_dimacs(-1)]);
        assert_eq!(level, 0);
    }
}
