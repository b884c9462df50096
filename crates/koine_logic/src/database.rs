//! Clause storage.
//!
//! A [`Database`] holds three layers:
//!
//! - the library, a few list predicates available to every program,
//! - the consulted [`Program`], replaced wholesale on every load,
//! - asserted facts, which survive program reloads.
//!
//! Clause lists are persistent vectors, so cloning a database to give a
//! query its own snapshot is cheap.

use std::fmt;
use std::rc::Rc;

use im::{HashMap, HashSet, Vector};

use crate::dcg::translate_rule;
use crate::error::ConsultError;
use crate::parser::{ReadTerm, parse_goal, parse_program};
use crate::solver::is_builtin;
use crate::term::{Atom, Term};
use crate::unify::Substitution;

/// List predicates every program can call without defining them.
const LIBRARY: &str = r"
member(X, [X|_]).
member(X, [_|T]) :- member(X, T).
memberchk(X, L) :- member(X, L), !.
append([], L, L).
append([H|T], L, [H|R]) :- append(T, L, R).
select(X, [X|T], T).
select(X, [H|T], [H|R]) :- select(X, T, R).
last([X], X).
last([_|T], X) :- last(T, X).
reverse(L, R) :- '$reverse'(L, [], R).
'$reverse'([], Acc, Acc).
'$reverse'([H|T], Acc, R) :- '$reverse'(T, [H|Acc], R).
nth0(I, L, X) :- '$nth'(L, 0, I, X).
nth1(I, L, X) :- '$nth'(L, 1, I, X).
'$nth'([X|_], B, B, X).
'$nth'([_|T], B, I, X) :- B1 is B + 1, '$nth'(T, B1, I, X).
";

/// Name and arity identifying a predicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PredicateKey {
    /// Predicate name.
    pub name: Atom,
    /// Number of arguments.
    pub arity: usize,
}

impl PredicateKey {
    /// Creates a key.
    #[must_use]
    pub fn new(name: &str, arity: usize) -> Self {
        Self {
            name: Rc::from(name),
            arity,
        }
    }

    /// Returns the key of a callable term.
    #[must_use]
    pub fn of(term: &Term) -> Option<Self> {
        term.functor().map(|(name, arity)| Self {
            name: Rc::clone(name),
            arity,
        })
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", crate::term::quote_atom(&self.name), self.arity)
    }
}

/// A stored clause. Variables are numbered `0..var_count`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clause {
    /// Clause head.
    pub head: Term,
    /// Clause body; `true` for facts.
    pub body: Term,
    /// Number of distinct variables in head and body.
    pub var_count: usize,
}

impl Clause {
    /// Builds a clause from a read term, translating grammar rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the head is not callable, names a built-in, or
    /// the body is a number.
    pub fn from_read(read: &ReadTerm) -> Result<Self, ConsultError> {
        let mut var_count = read.var_count;
        let term = match read.term.functor() {
            Some((name, 2)) if &**name == "-->" => {
                let args = read.term.args();
                translate_rule(&args[0], &args[1], &mut var_count)?
            }
            _ => read.term.clone(),
        };

        let (head, body) = match term.functor() {
            Some((name, 2)) if &**name == ":-" => {
                let args = term.args();
                (args[0].clone(), args[1].clone())
            }
            _ => (term.clone(), Term::atom("true")),
        };

        let Some(key) = PredicateKey::of(&head) else {
            return Err(ConsultError::NotCallable(head.to_string()));
        };
        if is_builtin(&key.name, key.arity) {
            return Err(ConsultError::Permission(key.to_string()));
        }
        if matches!(body, Term::Int(_)) {
            return Err(ConsultError::NotCallable(body.to_string()));
        }

        Ok(Self {
            head,
            body,
            var_count,
        })
    }

    /// Returns the key of the predicate this clause belongs to.
    #[must_use]
    pub fn key(&self) -> Option<PredicateKey> {
        PredicateKey::of(&self.head)
    }

    /// Returns true if the clause has no body.
    #[must_use]
    pub fn is_fact(&self) -> bool {
        self.body.is_atom("true")
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fact() {
            write!(f, "{}.", self.head)
        } else {
            write!(f, "{} :- {}.", self.head, self.body)
        }
    }
}

type ClauseTable = HashMap<PredicateKey, Vector<Rc<Clause>>>;

/// A consulted rule program.
#[derive(Clone, Debug, Default)]
pub struct Program {
    clauses: ClauseTable,
    dynamic: HashSet<PredicateKey>,
    clause_count: usize,
}

impl Program {
    /// Creates an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses program text: clauses, grammar rules, and `dynamic` or
    /// `discontiguous` directives.
    ///
    /// # Errors
    ///
    /// Returns the first syntax error, an unsupported directive, or an
    /// invalid clause.
    pub fn parse(source: &str) -> Result<Self, ConsultError> {
        let mut program = Self::new();
        for read in parse_program(source)? {
            if let Some(directive) = directive_body(&read.term) {
                program.directive(directive)?;
            } else {
                program.add(Clause::from_read(&read)?);
            }
        }
        Ok(program)
    }

    /// Appends a clause to its predicate.
    pub fn add(&mut self, clause: Clause) {
        let Some(key) = clause.key() else {
            return;
        };
        self.clauses
            .entry(key)
            .or_default()
            .push_back(Rc::new(clause));
        self.clause_count += 1;
    }

    /// Returns the total number of clauses.
    #[must_use]
    pub const fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Returns the predicates that have clauses or were declared dynamic,
    /// sorted.
    #[must_use]
    pub fn predicates(&self) -> Vec<PredicateKey> {
        let mut keys: Vec<_> = self
            .clauses
            .keys()
            .chain(self.dynamic.iter())
            .cloned()
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Returns true if the predicate was declared dynamic.
    #[must_use]
    pub fn is_dynamic(&self, key: &PredicateKey) -> bool {
        self.dynamic.contains(key)
    }

    fn defines(&self, key: &PredicateKey) -> bool {
        self.clauses.contains_key(key) || self.dynamic.contains(key)
    }

    fn directive(&mut self, directive: &Term) -> Result<(), ConsultError> {
        match directive.functor() {
            Some((name, 1)) if &**name == "dynamic" => {
                for key in predicate_specs(&directive.args()[0])? {
                    if is_builtin(&key.name, key.arity) {
                        return Err(ConsultError::Permission(key.to_string()));
                    }
                    self.dynamic.insert(key);
                }
                Ok(())
            }
            Some((name, 1)) if &**name == "discontiguous" => {
                predicate_specs(&directive.args()[0]).map(|_| ())
            }
            _ => Err(ConsultError::Directive(directive.to_string())),
        }
    }
}

fn directive_body(term: &Term) -> Option<&Term> {
    match term.functor() {
        Some((name, 1)) if &**name == ":-" || &**name == "?-" => term.args().first(),
        _ => None,
    }
}

/// Reads `name/arity` specifications joined by commas or in a list.
fn predicate_specs(spec: &Term) -> Result<Vec<PredicateKey>, ConsultError> {
    let mut keys = Vec::new();
    let mut pending = vec![spec];
    while let Some(term) = pending.pop() {
        if let Some(items) = term.as_list() {
            pending.extend(items.into_iter().rev());
            continue;
        }
        match (term.functor(), term.args()) {
            (Some((name, 2)), [left, right]) if &**name == "," => {
                pending.push(right);
                pending.push(left);
            }
            (Some((name, 2)), [Term::Atom(pred), Term::Int(arity)]) if &**name == "/" => {
                let arity = usize::try_from(*arity)
                    .map_err(|_| ConsultError::Directive(format!("bad arity in {term}")))?;
                keys.push(PredicateKey {
                    name: Rc::clone(pred),
                    arity,
                });
            }
            _ => {
                return Err(ConsultError::Directive(format!(
                    "expected name/arity, found {term}"
                )));
            }
        }
    }
    Ok(keys)
}

/// Program, library, and asserted facts, ready to be queried.
#[derive(Clone, Debug)]
pub struct Database {
    library: Program,
    program: Program,
    facts: ClauseTable,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// Creates a database holding only the library.
    #[must_use]
    pub fn new() -> Self {
        let library = Program::parse(LIBRARY);
        debug_assert!(library.is_ok(), "library must parse");
        Self {
            library: library.unwrap_or_default(),
            program: Program::new(),
            facts: ClauseTable::default(),
        }
    }

    /// Replaces the program. Asserted facts are kept.
    pub fn load(&mut self, program: Program) {
        self.program = program;
    }

    /// Returns the loaded program.
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Adds a clause after every existing clause of its predicate. The
    /// predicate becomes known even if it was not declared dynamic.
    ///
    /// # Errors
    ///
    /// Returns an error if the clause is invalid.
    pub fn assert_clause(&mut self, read: &ReadTerm) -> Result<(), ConsultError> {
        let clause = Clause::from_read(read)?;
        let Some(key) = clause.key() else {
            return Err(ConsultError::NotCallable(clause.head.to_string()));
        };
        self.facts.entry(key).or_default().push_back(Rc::new(clause));
        Ok(())
    }

    /// Parses and asserts a clause such as `word_type('λόγος', noun)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or the clause is invalid.
    pub fn assert_source(&mut self, source: &str) -> Result<(), ConsultError> {
        let read = parse_goal(source)?;
        self.assert_clause(&read)
    }

    /// Removes every asserted clause whose head unifies with `pattern`
    /// (and whose body unifies with the pattern's body, for `Head :- Body`
    /// patterns; otherwise only facts match). Program clauses are never
    /// removed. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not callable.
    pub fn retract(&mut self, pattern: &ReadTerm) -> Result<usize, ConsultError> {
        let (head, body) = match pattern.term.functor() {
            Some((name, 2)) if &**name == ":-" => {
                let args = pattern.term.args();
                (args[0].clone(), args[1].clone())
            }
            _ => (pattern.term.clone(), Term::atom("true")),
        };
        let Some(key) = PredicateKey::of(&head) else {
            return Err(ConsultError::NotCallable(head.to_string()));
        };
        let Some(clauses) = self.facts.get(&key) else {
            return Ok(0);
        };

        let mut subst = Substitution::with_vars(pattern.var_count);
        let (trail_mark, var_mark) = (subst.trail_len(), subst.len());
        let mut kept = Vector::new();
        let mut removed = 0;
        for clause in clauses {
            let base = subst.fresh(clause.var_count);
            let matches = subst.unify(&head, &clause.head.offset(base))
                && subst.unify(&body, &clause.body.offset(base));
            subst.restore(trail_mark, var_mark);
            if matches {
                removed += 1;
            } else {
                kept.push_back(Rc::clone(clause));
            }
        }
        self.facts.insert(key, kept);
        Ok(removed)
    }

    /// Parses a pattern and retracts matching clauses.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or is not callable.
    pub fn retract_source(&mut self, source: &str) -> Result<usize, ConsultError> {
        let read = parse_goal(source)?;
        self.retract(&read)
    }

    /// Removes every asserted clause.
    pub fn clear_facts(&mut self) {
        self.facts = ClauseTable::default();
    }

    /// Returns the number of asserted clauses.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.facts.values().map(Vector::len).sum()
    }

    /// Returns the clauses to try for a call, or `None` if the predicate
    /// is unknown.
    ///
    /// A predicate the program defines or declares dynamic, or that has
    /// ever been asserted, uses program clauses followed by asserted ones.
    /// Otherwise library clauses are used.
    #[must_use]
    pub fn clauses(&self, key: &PredicateKey) -> Option<Vector<Rc<Clause>>> {
        let facts = self.facts.get(key);
        if self.program.defines(key) || facts.is_some() {
            let mut clauses = self.program.clauses.get(key).cloned().unwrap_or_default();
            if let Some(facts) = facts {
                clauses.append(facts.clone());
            }
            return Some(clauses);
        }
        self.library.clauses.get(key).cloned()
    }
}
