//! Two-watched-literal bookkeeping.
//!
//! For every literal `l` we keep the list of clauses for which `l` is currently one of the two
//! watched positions. This is the direct counterpart of the watched literal itself, not of its
//! negation: a clause becomes a propagation candidate when its watched literal `l` is falsified,
//! at which point we look up `watches[l]` to find the clauses that need attention. Binary clauses
//! are watched like any other clause; there is no separate binary-clause fast path.
use satisfy_formula::Lit;

use crate::clause::ClauseRef;

/// One entry in a literal's watch list.
#[derive(Copy, Clone)]
pub struct Watch {
    pub cref: ClauseRef,
}

/// Per-literal watch lists, indexed by [`Lit::code`].
#[derive(Default)]
pub struct Watchlists {
    watches: Vec<Vec<Watch>>,
}

impl Watchlists {
    /// Creates empty watch lists.
    pub fn new() -> Watchlists {
        Watchlists::default()
    }

    /// Grows the watch lists to cover `count` variables (`2 * count` literal codes).
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize_with(count * 2, Vec::new);
    }

    /// Registers `cref` as watching `lit`: whenever `lit` becomes false this clause is checked.
    pub fn watch(&mut self, lit: Lit, cref: ClauseRef) {
        self.watches[lit.code()].push(Watch { cref });
    }

    /// Takes ownership of the watch list for `lit`, leaving an empty list in its place.
    ///
    /// Used by BCP, which rebuilds the list in place as it scans, so that clauses no longer
    /// watching `lit` are dropped from it and clauses that still do are kept.
    pub fn take(&mut self, lit: Lit) -> Vec<Watch> {
        std::mem::take(&mut self.watches[lit.code()])
    }

    /// Restores (a possibly modified) watch list for `lit`.
    pub fn restore(&mut self, lit: Lit, watches: Vec<Watch>) {
        self.watches[lit.code()] = watches;
    }

    /// Appends a single watch back onto `lit`'s list, used when BCP relocates a watched literal.
    pub fn push(&mut self, lit: Lit, watch: Watch) {
        self.watches[lit.code()].push(watch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satisfy_formula::Lit;

    #[test]
    fn watch_and_take_roundtrip() {
        let mut watches = Watchlists::new();
        watches.set_var_count(2);

        let cref = crate::clause::ClauseStore::new().add(vec![]);
        watches.watch(Lit::from_dimacs(1), cref);
        watches.watch(Lit::from_dimacs(-2), cref);

        let taken = watches.take(Lit::from_dimacs(1));
        assert_eq!(taken.len(), 1);
        assert!(watches.take(Lit::from_dimacs(1)).is_empty());

        watches.restore(Lit::from_dimacs(1), taken);
        assert_eq!(watches.take(Lit::from_dimacs(1)).len(), 1);
    }
}
