//! Variable bindings with an undo trail.

use crate::term::Term;

/// Binding cells for numbered variables, plus the trail of bound cells so
/// bindings can be undone on backtracking.
#[derive(Clone, Debug, Default)]
pub(crate) struct Substitution {
    cells: Vec<Option<Term>>,
    trail: Vec<usize>,
}

impl Substitution {
    pub(crate) fn with_vars(count: usize) -> Self {
        Self {
            cells: vec![None; count],
            trail: Vec::new(),
        }
    }

    /// Number of allocated variables.
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Allocates `count` unbound variables and returns the first number.
    pub(crate) fn fresh(&mut self, count: usize) -> usize {
        let base = self.cells.len();
        self.cells.resize(base + count, None);
        base
    }

    /// Allocates one unbound variable.
    pub(crate) fn fresh_var(&mut self) -> Term {
        Term::Var(self.fresh(1))
    }

    /// Undoes bindings made after the trail held `trail_mark` entries and
    /// frees variables allocated after `var_mark`.
    pub(crate) fn restore(&mut self, trail_mark: usize, var_mark: usize) {
        for var in self.trail.drain(trail_mark..) {
            if let Some(cell) = self.cells.get_mut(var) {
                *cell = None;
            }
        }
        self.cells.truncate(var_mark);
    }

    /// Follows variable bindings until reaching an unbound variable or a
    /// non-variable.
    pub(crate) fn deref(&self, term: &Term) -> Term {
        let mut current = term;
        while let Term::Var(v) = current {
            match self.cells.get(*v) {
                Some(Some(bound)) => current = bound,
                _ => break,
            }
        }
        current.clone()
    }

    /// Returns the term with every bound variable replaced by its value.
    pub(crate) fn resolve(&self, term: &Term) -> Term {
        match self.deref(term) {
            Term::Compound(name, args) => {
                Term::Compound(name, args.iter().map(|a| self.resolve(a)).collect())
            }
            other => other,
        }
    }

    fn bind(&mut self, var: usize, value: Term) {
        if let Some(cell) = self.cells.get_mut(var) {
            *cell = Some(value);
            self.trail.push(var);
        }
    }

    /// Unifies two terms, binding variables as needed. On failure some
    /// bindings may remain; callers restore to a mark.
    pub(crate) fn unify(&mut self, a: &Term, b: &Term) -> bool {
        let mut pending = vec![(a.clone(), b.clone())];
        while let Some((a, b)) = pending.pop() {
            let a = self.deref(&a);
            let b = self.deref(&b);
            match (&a, &b) {
                (Term::Var(x), Term::Var(y)) if x == y => {}
                (Term::Var(x), _) => self.bind(*x, b.clone()),
                (_, Term::Var(y)) => self.bind(*y, a.clone()),
                (Term::Atom(x), Term::Atom(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Term::Int(x), Term::Int(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Term::Compound(f, xs), Term::Compound(g, ys)) => {
                    if f != g || xs.len() != ys.len() {
                        return false;
                    }
                    pending.extend(xs.iter().cloned().zip(ys.iter().cloned()));
                }
                _ => return false,
            }
        }
        true
    }
}
