//! Terms of the grammar language.
//!
//! A [`Term`] is an atom, an integer, a variable, or a compound. Lists are
//! built from `'.'/2` cells ending in the atom `[]`. Variables are numbered;
//! the numbering is local to whatever owns the term (a clause, a query, or
//! a running solver).

use std::fmt;
use std::rc::Rc;

/// Interned-by-sharing atom text.
pub type Atom = Rc<str>;

/// Name of the list cell functor.
pub const CONS: &str = ".";
/// The empty list atom.
pub const NIL: &str = "[]";

/// A term.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// A constant symbol.
    Atom(Atom),
    /// A signed integer.
    Int(i64),
    /// A numbered logic variable.
    Var(usize),
    /// A functor applied to one or more arguments.
    Compound(Atom, Rc<[Term]>),
}

impl Term {
    /// Creates an atom.
    #[must_use]
    pub fn atom(name: &str) -> Self {
        Self::Atom(Rc::from(name))
    }

    /// Creates a compound term. With no arguments, creates an atom.
    #[must_use]
    pub fn compound(name: &str, args: Vec<Term>) -> Self {
        if args.is_empty() {
            Self::atom(name)
        } else {
            Self::Compound(Rc::from(name), Rc::from(args))
        }
    }

    /// The empty list.
    #[must_use]
    pub fn nil() -> Self {
        Self::atom(NIL)
    }

    /// A list cell.
    #[must_use]
    pub fn cons(head: Term, tail: Term) -> Self {
        Self::Compound(Rc::from(CONS), Rc::from(vec![head, tail]))
    }

    /// Builds a list from items and a tail (`[]` for a proper list).
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Term, IntoIter: DoubleEndedIterator>, tail: Term) -> Self {
        items
            .into_iter()
            .rev()
            .fold(tail, |acc, item| Self::cons(item, acc))
    }

    /// Returns true if this is the atom `name`.
    #[must_use]
    pub fn is_atom(&self, name: &str) -> bool {
        matches!(self, Self::Atom(a) if &**a == name)
    }

    /// Returns true if this is a variable.
    #[must_use]
    pub const fn is_var(&self) -> bool {
        matches!(self, Self::Var(_))
    }

    /// Returns true if this term can be called as a goal.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Atom(_) | Self::Compound(..))
    }

    /// Returns the name and arity of a callable term.
    #[must_use]
    pub fn functor(&self) -> Option<(&Atom, usize)> {
        match self {
            Self::Atom(name) => Some((name, 0)),
            Self::Compound(name, args) => Some((name, args.len())),
            _ => None,
        }
    }

    /// Returns the arguments of a compound (empty for everything else).
    #[must_use]
    pub fn args(&self) -> &[Term] {
        match self {
            Self::Compound(_, args) => args,
            _ => &[],
        }
    }

    /// Returns the head and tail if this is a list cell.
    #[must_use]
    pub fn as_cons(&self) -> Option<(&Term, &Term)> {
        match self {
            Self::Compound(name, args) if &**name == CONS && args.len() == 2 => {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    /// Returns the items of a proper list.
    #[must_use]
    pub fn as_list(&self) -> Option<Vec<&Term>> {
        let mut items = Vec::new();
        let mut current = self;
        loop {
            if current.is_atom(NIL) {
                return Some(items);
            }
            let (head, tail) = current.as_cons()?;
            items.push(head);
            current = tail;
        }
    }

    /// Returns this term with extra arguments appended.
    ///
    /// Returns `None` if the term is not callable.
    #[must_use]
    pub fn with_extra_args(&self, extra: impl IntoIterator<Item = Term>) -> Option<Term> {
        let (name, _) = self.functor()?;
        let mut args = self.args().to_vec();
        args.extend(extra);
        Some(Self::compound(name, args))
    }

    /// Returns a copy with every variable number shifted by `base`.
    #[must_use]
    pub fn offset(&self, base: usize) -> Term {
        match self {
            Self::Var(n) => Self::Var(n + base),
            Self::Compound(name, args) => Self::Compound(
                Rc::clone(name),
                args.iter().map(|a| a.offset(base)).collect(),
            ),
            _ => self.clone(),
        }
    }

    /// Returns one past the highest variable number in this term.
    #[must_use]
    pub fn var_count(&self) -> usize {
        match self {
            Self::Var(n) => n + 1,
            Self::Compound(_, args) => args.iter().map(Term::var_count).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Returns true if this term contains no variables.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Var(_) => false,
            Self::Compound(_, args) => args.iter().all(Term::is_ground),
            _ => true,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(name) => f.write_str(&quote_atom(name)),
            Self::Int(n) => write!(f, "{n}"),
            Self::Var(n) => write!(f, "_G{n}"),
            Self::Compound(..) if self.as_cons().is_some() => {
                f.write_str("[")?;
                let mut current = self;
                let mut first = true;
                while let Some((head, tail)) = current.as_cons() {
                    if !first {
                        f.write_str(",")?;
                    }
                    write!(f, "{head}")?;
                    first = false;
                    current = tail;
                }
                if !current.is_atom(NIL) {
                    write!(f, "|{current}")?;
                }
                f.write_str("]")
            }
            Self::Compound(name, args) => {
                write!(f, "{}(", quote_atom(name))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Renders an atom so it reads back as the same atom, quoting when needed.
///
/// ```
/// use koine_logic::term::quote_atom;
///
/// assert_eq!(quote_atom("noun"), "noun");
/// assert_eq!(quote_atom("λόγος"), "λόγος");
/// assert_eq!(quote_atom("Present 1st Singular"), "'Present 1st Singular'");
/// assert_eq!(quote_atom("it's"), "'it\\'s'");
/// ```
#[must_use]
pub fn quote_atom(name: &str) -> String {
    if needs_no_quotes(name) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    out.push('\'');
    for c in name.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn needs_no_quotes(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if matches!(name, "[]" | "!" | ";" | "{}") {
        return true;
    }
    if first.is_alphabetic() && !first.is_uppercase() {
        return chars.all(|c| {
            c.is_alphanumeric()
                || c == '_'
                || matches!(c, '\u{0300}'..='\u{036F}' | '\u{1DC0}'..='\u{1DFF}' | '\u{20D0}'..='\u{20FF}')
        });
    }
    name != "." && !name.starts_with("/*") && name.chars().all(|c| "+-*/\\^<>=~:.?@#&$".contains(c))
}
