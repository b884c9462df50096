//! Lazy solution enumeration.
//!
//! A [`Solver`] proves one query against a snapshot of a [`Database`]. It
//! is an iterator: each call to `next` resumes the search where the
//! previous solution left off, so callers pull exactly as many solutions
//! as they need.
//!
//! The machine keeps a continuation of pending goals, a stack of choice
//! points, and a trail of variable bindings to undo when backtracking. Cut
//! truncates the choice point stack to the height recorded when the
//! enclosing clause was called.
//!
//! An [`ExecutionError`] abandons the branch that raised it; the next pull
//! carries on with the remaining alternatives. Exceeding the inference
//! limit ends the enumeration.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use im::Vector;

use crate::arith::eval;
use crate::database::{Clause, Database, PredicateKey};
use crate::error::{ExecutionError, SyntaxError};
use crate::parser::parse_goal;
use crate::term::{NIL, Term};
use crate::unify::Substitution;

/// Default number of goal calls one query may make.
pub const DEFAULT_INFERENCE_LIMIT: u64 = 100_000;

/// Highest arity accepted by `call/N`.
const MAX_CALL_ARITY: usize = 8;

/// Returns true for control constructs and built-in predicates, which
/// programs may not define.
#[must_use]
pub fn is_builtin(name: &str, arity: usize) -> bool {
    matches!(
        (name, arity),
        ("true" | "fail" | "false" | "!", 0)
            | (
                "\\+" | "not" | "var" | "nonvar" | "atom" | "integer" | "atomic" | "compound"
                    | "callable" | "is_list" | "ground",
                1
            )
            | (
                "," | ";" | "->" | "=" | "\\=" | "==" | "\\==" | "is" | "=:=" | "=\\=" | "<"
                    | ">" | "=<" | ">=" | "length" | "forall" | "phrase",
                2
            )
            | ("findall" | "phrase", 3)
    ) || (name == "call" && (1..=MAX_CALL_ARITY).contains(&arity))
}

/// A parsed goal with named variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    goal: Term,
    var_names: Vec<(String, usize)>,
    var_count: usize,
}

impl Query {
    /// Parses a goal such as `sentence(['ὁ', 'λόγος'])` or
    /// `word_type(W, noun)`.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the text is not exactly one term.
    pub fn parse(source: &str) -> Result<Self, SyntaxError> {
        let read = parse_goal(source)?;
        Ok(Self {
            goal: read.term,
            var_names: read.var_names,
            var_count: read.var_count,
        })
    }

    /// Wraps an already-built goal. Its variables are unnamed.
    #[must_use]
    pub fn from_term(goal: Term) -> Self {
        let var_count = goal.var_count();
        Self {
            goal,
            var_names: Vec::new(),
            var_count,
        }
    }

    /// Returns the goal term.
    #[must_use]
    pub const fn goal(&self) -> &Term {
        &self.goal
    }

    /// Returns the names of variables reported in solutions, in order of
    /// first appearance. Names starting with `_` are left out.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.var_names
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !name.starts_with('_'))
    }
}

/// Variable bindings of one solution, in query variable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    bindings: Vec<(String, Term)>,
}

impl Solution {
    /// Returns the value bound to a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Iterates `(name, value)` pairs in query variable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.bindings.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if the query had no reported variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bindings.is_empty() {
            return f.write_str("true");
        }
        for (i, (name, value)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

type Cont = Option<Rc<Frame>>;

/// A pending goal and the rest of the continuation.
#[derive(Debug)]
struct Frame {
    goal: Goal,
    /// Choice point height a `!` in this goal cuts back to.
    cut_barrier: usize,
    next: Cont,
}

#[derive(Debug)]
enum Goal {
    Call(Term),
    CutTo(usize),
}

impl Drop for Frame {
    // Continuations of deep recursions are long chains; unlink them one
    // frame at a time instead of recursing.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(frame) = next {
            match Rc::try_unwrap(frame) {
                Ok(mut frame) => next = frame.next.take(),
                Err(_) => break,
            }
        }
    }
}

fn push(goal: Goal, cut_barrier: usize, next: Cont) -> Cont {
    Some(Rc::new(Frame {
        goal,
        cut_barrier,
        next,
    }))
}

#[derive(Debug)]
enum Alternative {
    Resume(Cont),
    Clauses {
        goal: Term,
        clauses: Vector<Rc<Clause>>,
        index: usize,
        next: Cont,
        cut_barrier: usize,
    },
}

#[derive(Debug)]
struct ChoicePoint {
    trail_mark: usize,
    var_mark: usize,
    alternative: Alternative,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Ready,
    Retry,
    Done,
}

enum Progress {
    Answer(Result<(), ExecutionError>),
    Paused,
    Exhausted,
}

/// Result of running a solver for a bounded number of inferences.
#[derive(Debug)]
pub enum Step {
    /// The next answer, or the error that ended one branch.
    Answer(Result<Solution, ExecutionError>),
    /// The inference budget ran out before the next answer.
    Paused,
    /// No answers remain.
    Exhausted,
}

/// Iterator over the solutions of one query.
pub struct Solver {
    db: Database,
    subst: Substitution,
    goals: Cont,
    choices: Vec<ChoicePoint>,
    query_vars: Vec<(String, usize)>,
    inferences: u64,
    limit: u64,
    state: State,
}

impl Solver {
    /// Creates a solver for `query` over a snapshot of `db`.
    #[must_use]
    pub fn new(db: &Database, query: &Query, limit: u64) -> Self {
        Self {
            db: db.clone(),
            subst: Substitution::with_vars(query.var_count),
            goals: push(Goal::Call(query.goal.clone()), 0, None),
            choices: Vec::new(),
            query_vars: query
                .var_names
                .iter()
                .filter(|(name, _)| !name.starts_with('_'))
                .cloned()
                .collect(),
            inferences: 0,
            limit,
            state: State::Ready,
        }
    }

    /// Returns the number of goal calls made so far.
    #[must_use]
    pub const fn inferences(&self) -> u64 {
        self.inferences
    }

    /// Runs until the next solution, or until the inference count reaches
    /// `pause_at`.
    fn advance(&mut self, pause_at: Option<u64>) -> Progress {
        match self.state {
            State::Done => return Progress::Exhausted,
            State::Retry => {
                if !self.backtrack() {
                    self.state = State::Done;
                    return Progress::Exhausted;
                }
                self.state = State::Ready;
            }
            State::Ready => {}
        }

        loop {
            if pause_at.is_some_and(|at| self.inferences >= at) {
                return Progress::Paused;
            }
            let Some(frame) = self.goals.take() else {
                self.state = State::Retry;
                return Progress::Answer(Ok(()));
            };
            self.goals.clone_from(&frame.next);
            match self.step(&frame) {
                Ok(true) => {}
                Ok(false) => {
                    if !self.backtrack() {
                        self.state = State::Done;
                        return Progress::Exhausted;
                    }
                }
                Err(err @ ExecutionError::InferenceLimit(_)) => {
                    self.state = State::Done;
                    return Progress::Answer(Err(err));
                }
                Err(err) => {
                    self.state = State::Retry;
                    return Progress::Answer(Err(err));
                }
            }
        }
    }

    /// Runs for at most `budget` more inferences.
    ///
    /// Returns [`Step::Paused`] when the budget runs out before the next
    /// answer; calling again continues where the search stopped.
    pub fn resume(&mut self, budget: u64) -> Step {
        let pause_at = self.inferences.saturating_add(budget.max(1));
        match self.advance(Some(pause_at)) {
            Progress::Answer(outcome) => Step::Answer(outcome.map(|()| self.solution())),
            Progress::Paused => Step::Paused,
            Progress::Exhausted => Step::Exhausted,
        }
    }

    fn solution(&self) -> Solution {
        Solution {
            bindings: self
                .query_vars
                .iter()
                .map(|(name, id)| (name.clone(), self.subst.resolve(&Term::Var(*id))))
                .collect(),
        }
    }

    /// Pops choice points until one offers an alternative.
    fn backtrack(&mut self) -> bool {
        while let Some(choice) = self.choices.pop() {
            self.subst.restore(choice.trail_mark, choice.var_mark);
            match choice.alternative {
                Alternative::Resume(cont) => {
                    self.goals = cont;
                    return true;
                }
                Alternative::Clauses {
                    goal,
                    clauses,
                    index,
                    next,
                    cut_barrier,
                } => {
                    if self.try_clauses(goal, &clauses, index, next, cut_barrier) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Resolves `goal` against the clauses from `start` on. On a match,
    /// leaves a choice point for the remaining clauses and continues with
    /// the clause body.
    fn try_clauses(
        &mut self,
        goal: Term,
        clauses: &Vector<Rc<Clause>>,
        start: usize,
        next: Cont,
        cut_barrier: usize,
    ) -> bool {
        for index in start..clauses.len() {
            let clause = &clauses[index];
            let trail_mark = self.subst.trail_len();
            let var_mark = self.subst.len();
            let base = self.subst.fresh(clause.var_count);
            if !self.subst.unify(&goal, &clause.head.offset(base)) {
                self.subst.restore(trail_mark, var_mark);
                continue;
            }

            let body = (!clause.is_fact()).then(|| clause.body.offset(base));
            if index + 1 < clauses.len() {
                self.choices.push(ChoicePoint {
                    trail_mark,
                    var_mark,
                    alternative: Alternative::Clauses {
                        goal,
                        clauses: clauses.clone(),
                        index: index + 1,
                        next: next.clone(),
                        cut_barrier,
                    },
                });
            }
            self.goals = match body {
                Some(body) => push(Goal::Call(body), cut_barrier, next),
                None => next,
            };
            return true;
        }
        false
    }

    fn push_choice(&mut self, cont: Cont) {
        self.choices.push(ChoicePoint {
            trail_mark: self.subst.trail_len(),
            var_mark: self.subst.len(),
            alternative: Alternative::Resume(cont),
        });
    }

    /// Executes one goal. `Ok(false)` means the goal failed.
    #[allow(clippy::too_many_lines)]
    fn step(&mut self, frame: &Frame) -> Result<bool, ExecutionError> {
        let term = match &frame.goal {
            Goal::CutTo(height) => {
                self.choices.truncate(*height);
                return Ok(true);
            }
            Goal::Call(term) => self.subst.deref(term),
        };

        self.inferences += 1;
        if self.inferences > self.limit {
            return Err(ExecutionError::InferenceLimit(self.limit));
        }

        let (name, arity) = match &term {
            Term::Var(_) => return Err(ExecutionError::Instantiation("call/1".to_string())),
            Term::Int(n) => return Err(not_callable("call/1", &Term::Int(*n))),
            Term::Atom(name) => (Rc::clone(name), 0),
            Term::Compound(name, args) => (Rc::clone(name), args.len()),
        };
        let args = term.args();
        let next = frame.next.clone();
        let barrier = frame.cut_barrier;

        match (&*name, arity) {
            ("true", 0) => Ok(true),
            ("fail" | "false", 0) => Ok(false),
            ("!", 0) => {
                self.choices.truncate(barrier);
                Ok(true)
            }
            (",", 2) => {
                let rest = push(Goal::Call(args[1].clone()), barrier, next);
                self.goals = push(Goal::Call(args[0].clone()), barrier, rest);
                Ok(true)
            }
            (";", 2) => {
                let left = self.subst.deref(&args[0]);
                match (left.functor(), left.args()) {
                    (Some((op, 2)), [cond, then]) if &**op == "->" => {
                        let height = self.choices.len();
                        self.push_choice(push(Goal::Call(args[1].clone()), barrier, next.clone()));
                        let then = push(Goal::Call(then.clone()), barrier, next);
                        let commit = push(Goal::CutTo(height), barrier, then);
                        self.goals = push(Goal::Call(cond.clone()), height + 1, commit);
                    }
                    _ => {
                        self.push_choice(push(Goal::Call(args[1].clone()), barrier, next.clone()));
                        self.goals = push(Goal::Call(left.clone()), barrier, next);
                    }
                }
                Ok(true)
            }
            ("->", 2) => {
                let height = self.choices.len();
                let then = push(Goal::Call(args[1].clone()), barrier, next);
                let commit = push(Goal::CutTo(height), barrier, then);
                self.goals = push(Goal::Call(args[0].clone()), height, commit);
                Ok(true)
            }
            ("\\+" | "not", 1) => {
                let height = self.choices.len();
                self.push_choice(next);
                let fail = push(Goal::Call(Term::atom("fail")), barrier, None);
                let commit = push(Goal::CutTo(height), barrier, fail);
                self.goals = push(Goal::Call(args[0].clone()), height + 1, commit);
                Ok(true)
            }
            ("call", n) if (1..=MAX_CALL_ARITY).contains(&n) => {
                let goal = self.callable(&args[0], "call/N")?;
                let goal = if n > 1 {
                    goal.with_extra_args(args[1..].iter().cloned())
                        .ok_or_else(|| not_callable("call/N", &goal))?
                } else {
                    goal
                };
                let height = self.choices.len();
                self.goals = push(Goal::Call(goal), height, next);
                Ok(true)
            }
            ("phrase", 2 | 3) => {
                let body = self.callable(&args[0], "phrase/3")?;
                let rest = args.get(2).cloned().unwrap_or_else(Term::nil);
                let goal = body
                    .with_extra_args([args[1].clone(), rest])
                    .ok_or_else(|| not_callable("phrase/3", &body))?;
                let height = self.choices.len();
                self.goals = push(Goal::Call(goal), height, next);
                Ok(true)
            }
            ("forall", 2) => {
                let check = Term::compound(
                    "\\+",
                    vec![Term::compound(
                        ",",
                        vec![args[0].clone(), Term::compound("\\+", vec![args[1].clone()])],
                    )],
                );
                let height = self.choices.len();
                self.goals = push(Goal::Call(check), height, next);
                Ok(true)
            }
            ("findall", 3) => self.findall(&args[0], &args[1], &args[2]),
            _ if is_builtin(&name, arity) => self.builtin(&name, args),
            _ => {
                let key = PredicateKey {
                    name: Rc::clone(&name),
                    arity,
                };
                let Some(clauses) = self.db.clauses(&key) else {
                    return Err(ExecutionError::UnknownPredicate(key.to_string()));
                };
                let height = self.choices.len();
                Ok(self.try_clauses(term, &clauses, 0, next, height))
            }
        }
    }

    fn callable(&self, term: &Term, context: &str) -> Result<Term, ExecutionError> {
        match self.subst.deref(term) {
            Term::Var(_) => Err(ExecutionError::Instantiation(context.to_string())),
            goal if goal.is_callable() => Ok(goal),
            other => Err(not_callable(context, &other)),
        }
    }

    /// Deterministic built-ins.
    fn builtin(&mut self, name: &str, args: &[Term]) -> Result<bool, ExecutionError> {
        let subst = &mut self.subst;
        Ok(match (name, args) {
            ("=", [a, b]) => subst.unify(a, b),
            ("\\=", [a, b]) => {
                let (trail_mark, var_mark) = (subst.trail_len(), subst.len());
                let unifiable = subst.unify(a, b);
                subst.restore(trail_mark, var_mark);
                !unifiable
            }
            ("==", [a, b]) => subst.resolve(a) == subst.resolve(b),
            ("\\==", [a, b]) => subst.resolve(a) != subst.resolve(b),
            ("var", [a]) => subst.deref(a).is_var(),
            ("nonvar", [a]) => !subst.deref(a).is_var(),
            ("atom", [a]) => matches!(subst.deref(a), Term::Atom(_)),
            ("integer", [a]) => matches!(subst.deref(a), Term::Int(_)),
            ("atomic", [a]) => matches!(subst.deref(a), Term::Atom(_) | Term::Int(_)),
            ("compound", [a]) => matches!(subst.deref(a), Term::Compound(..)),
            ("callable", [a]) => subst.deref(a).is_callable(),
            ("is_list", [a]) => subst.resolve(a).as_list().is_some(),
            ("ground", [a]) => subst.resolve(a).is_ground(),
            ("is", [result, expr]) => {
                let value = eval(expr, subst, "is/2")?;
                subst.unify(result, &Term::Int(value))
            }
            (op @ ("=:=" | "=\\=" | "<" | ">" | "=<" | ">="), [a, b]) => {
                let context = format!("{op}/2");
                let a = eval(a, subst, &context)?;
                let b = eval(b, subst, &context)?;
                match op {
                    "=:=" => a == b,
                    "=\\=" => a != b,
                    "<" => a < b,
                    ">" => a > b,
                    "=<" => a <= b,
                    _ => a >= b,
                }
            }
            ("length", [list, length]) => return self.length(list, length),
            _ => return Err(ExecutionError::UnknownPredicate(format!("{name}/{}", args.len()))),
        })
    }

    fn length(&mut self, list: &Term, length: &Term) -> Result<bool, ExecutionError> {
        let mut count: i64 = 0;
        let mut current = self.subst.deref(list);
        loop {
            if current.is_atom(NIL) {
                return Ok(self.subst.unify(length, &Term::Int(count)));
            }
            match current.as_cons() {
                Some((_, tail)) => {
                    count += 1;
                    current = self.subst.deref(tail);
                }
                None => break,
            }
        }
        if !current.is_var() {
            return Ok(false);
        }
        match self.subst.deref(length) {
            Term::Int(n) if n >= count => {
                let missing = usize::try_from(n - count)
                    .map_err(|_| ExecutionError::Evaluation("list too long".to_string()))?;
                let base = self.subst.fresh(missing);
                let items: Vec<Term> = (base..base + missing).map(Term::Var).collect();
                Ok(self.subst.unify(&current, &Term::list(items, Term::nil())))
            }
            Term::Int(_) => Ok(false),
            Term::Var(_) => Err(ExecutionError::Instantiation("length/2".to_string())),
            other => Err(ExecutionError::Type {
                context: "length/2".to_string(),
                expected: "integer",
                found: other.to_string(),
            }),
        }
    }

    /// Collects every instance of `template` for which `goal` succeeds.
    fn findall(&mut self, template: &Term, goal: &Term, results: &Term) -> Result<bool, ExecutionError> {
        let goal = self.callable(goal, "findall/3")?;
        let goal = self.subst.resolve(&goal);
        let template = self.subst.resolve(template);

        let mut inner = Solver {
            db: self.db.clone(),
            subst: Substitution::with_vars(self.subst.len()),
            goals: push(Goal::Call(goal), 0, None),
            choices: Vec::new(),
            query_vars: Vec::new(),
            inferences: self.inferences,
            limit: self.limit,
            state: State::Ready,
        };
        let mut found = Vec::new();
        while let Progress::Answer(outcome) = inner.advance(None) {
            if let Err(err) = outcome {
                self.inferences = inner.inferences;
                return Err(err);
            }
            found.push(inner.subst.resolve(&template));
        }
        self.inferences = inner.inferences;

        let copies: Vec<Term> = found
            .iter()
            .map(|t| self.copy_fresh(t, &mut HashMap::new()))
            .collect();
        Ok(self.subst.unify(results, &Term::list(copies, Term::nil())))
    }

    /// Copies a term, giving each distinct variable a fresh variable here.
    fn copy_fresh(&mut self, term: &Term, renamed: &mut HashMap<usize, Term>) -> Term {
        match term {
            Term::Var(v) => renamed
                .entry(*v)
                .or_insert_with(|| self.subst.fresh_var())
                .clone(),
            Term::Compound(name, args) => Term::Compound(
                Rc::clone(name),
                args.iter().map(|a| self.copy_fresh(a, renamed)).collect(),
            ),
            _ => term.clone(),
        }
    }
}

impl Iterator for Solver {
    type Item = Result<Solution, ExecutionError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance(None) {
            Progress::Answer(outcome) => Some(outcome.map(|()| self.solution())),
            Progress::Paused | Progress::Exhausted => None,
        }
    }
}

impl fmt::Debug for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solver")
            .field("choices", &self.choices.len())
            .field("inferences", &self.inferences)
            .field("limit", &self.limit)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn not_callable(context: &str, term: &Term) -> ExecutionError {
    ExecutionError::Type {
        context: context.to_string(),
        expected: "callable",
        found: term.to_string(),
    }
}

impl Database {
    /// Starts solving `query` with the default inference limit.
    #[must_use]
    pub fn solve(&self, query: &Query) -> Solver {
        Solver::new(self, query, DEFAULT_INFERENCE_LIMIT)
    }
}
