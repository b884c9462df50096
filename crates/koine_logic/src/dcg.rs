//! Grammar rule translation.
//!
//! A rule `Head --> Body` becomes an ordinary clause whose head and
//! non-terminals carry two extra arguments: the token list before and
//! after the phrase. Terminal lists unify the input with the list
//! followed by the remainder.
//!
//! ```text
//! np --> [the], noun.     ⇒   np(S0, S) :- S0 = [the|S1], noun(S1, S).
//! ```

use crate::error::ConsultError;
use crate::term::Term;

/// Translates `Head --> Body` into a `Head' :- Body'` clause term.
///
/// `var_count` is the number of variables already used by the rule; fresh
/// variables for the token lists are numbered from there and the count is
/// updated.
///
/// # Errors
///
/// Returns [`ConsultError::Grammar`] if the head is not a non-terminal or
/// the body contains something that is neither a non-terminal, a terminal
/// list, nor a control construct.
pub fn translate_rule(head: &Term, body: &Term, var_count: &mut usize) -> Result<Term, ConsultError> {
    if let Term::Compound(name, _) = head {
        if &**name == "," {
            return Err(ConsultError::Grammar(format!(
                "pushback in rule head is not supported: {head}"
            )));
        }
    }
    if !head.is_callable() {
        return Err(ConsultError::Grammar(format!(
            "rule head is not a non-terminal: {head}"
        )));
    }

    let mut fresh = Fresh(var_count);
    let s0 = fresh.var();
    let s = fresh.var();
    let new_head = extend(head, s0.clone(), s.clone())?;
    let new_body = translate_body(body, s0, s, &mut fresh)?;
    Ok(Term::compound(":-", vec![new_head, new_body]))
}

struct Fresh<'a>(&'a mut usize);

impl Fresh<'_> {
    fn var(&mut self) -> Term {
        let v = Term::Var(*self.0);
        *self.0 += 1;
        v
    }
}

fn translate_body(body: &Term, s0: Term, s: Term, fresh: &mut Fresh<'_>) -> Result<Term, ConsultError> {
    if body.is_var() {
        return Ok(Term::compound("phrase", vec![body.clone(), s0, s]));
    }
    if let Some(items) = body.as_list() {
        let items: Vec<Term> = items.into_iter().cloned().collect();
        return Ok(unify(s0, Term::list(items, s)));
    }
    if body.as_cons().is_some() {
        return Err(ConsultError::Grammar(format!(
            "terminal list is not a proper list: {body}"
        )));
    }

    let Some((name, arity)) = body.functor() else {
        return Err(ConsultError::Grammar(format!(
            "not a non-terminal: {body}"
        )));
    };
    let args = body.args();
    match (&**name, arity) {
        (",", 2) => {
            let mid = fresh.var();
            let left = translate_body(&args[0], s0, mid.clone(), fresh)?;
            let right = translate_body(&args[1], mid, s, fresh)?;
            Ok(Term::compound(",", vec![left, right]))
        }
        (";" | "|", 2) => {
            let left = translate_body(&args[0], s0.clone(), s.clone(), fresh)?;
            let right = translate_body(&args[1], s0, s, fresh)?;
            Ok(Term::compound(";", vec![left, right]))
        }
        ("->", 2) => {
            let mid = fresh.var();
            let cond = translate_body(&args[0], s0, mid.clone(), fresh)?;
            let then = translate_body(&args[1], mid, s, fresh)?;
            Ok(Term::compound("->", vec![cond, then]))
        }
        ("\\+", 1) => {
            let ignored = fresh.var();
            let inner = translate_body(&args[0], s0.clone(), ignored, fresh)?;
            Ok(Term::compound(
                ",",
                vec![Term::compound("\\+", vec![inner]), unify(s0, s)],
            ))
        }
        ("!", 0) => Ok(Term::compound(",", vec![Term::atom("!"), unify(s0, s)])),
        ("{}", 1) => Ok(Term::compound(",", vec![args[0].clone(), unify(s0, s)])),
        _ => extend(body, s0, s),
    }
}

fn extend(term: &Term, s0: Term, s: Term) -> Result<Term, ConsultError> {
    term.with_extra_args([s0, s])
        .ok_or_else(|| ConsultError::Grammar(format!("not a non-terminal: {term}")))
}

fn unify(a: Term, b: Term) -> Term {
    Term::compound("=", vec![a, b])
}
