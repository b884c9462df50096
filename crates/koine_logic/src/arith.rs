//! Integer arithmetic for `is/2` and the comparison built-ins.

use crate::error::ExecutionError;
use crate::term::Term;
use crate::unify::Substitution;

/// Evaluates an arithmetic expression.
///
/// `/` truncates like `//`, since the language has no floats.
pub(crate) fn eval(term: &Term, subst: &Substitution, context: &str) -> Result<i64, ExecutionError> {
    match subst.deref(term) {
        Term::Int(n) => Ok(n),
        Term::Var(_) => Err(ExecutionError::Instantiation(context.to_string())),
        Term::Atom(name) => Err(ExecutionError::Type {
            context: context.to_string(),
            expected: "evaluable",
            found: format!("{}/0", crate::term::quote_atom(&name)),
        }),
        compound @ Term::Compound(..) => {
            let args = compound.args();
            let name = compound
                .functor()
                .map(|(name, _)| name.to_string())
                .unwrap_or_default();
            match (name.as_str(), args) {
                ("-", [x]) => checked(eval(x, subst, context)?.checked_neg()),
                ("+", [x]) => eval(x, subst, context),
                ("abs", [x]) => checked(eval(x, subst, context)?.checked_abs()),
                ("sign", [x]) => Ok(eval(x, subst, context)?.signum()),
                (op, [x, y]) => {
                    let a = eval(x, subst, context)?;
                    let b = eval(y, subst, context)?;
                    binary(op, a, b, &compound, context)
                }
                _ => Err(not_evaluable(&compound, context)),
            }
        }
    }
}

fn binary(op: &str, a: i64, b: i64, term: &Term, context: &str) -> Result<i64, ExecutionError> {
    match op {
        "+" => checked(a.checked_add(b)),
        "-" => checked(a.checked_sub(b)),
        "*" => checked(a.checked_mul(b)),
        "//" | "/" => {
            nonzero(b)?;
            checked(a.checked_div(b))
        }
        "rem" => {
            nonzero(b)?;
            checked(a.checked_rem(b))
        }
        "mod" => {
            nonzero(b)?;
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            Ok(if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
        }
        "min" => Ok(a.min(b)),
        "max" => Ok(a.max(b)),
        _ => Err(not_evaluable(term, context)),
    }
}

fn checked(value: Option<i64>) -> Result<i64, ExecutionError> {
    value.ok_or_else(overflow)
}

fn overflow() -> ExecutionError {
    ExecutionError::Evaluation("integer overflow".to_string())
}

fn nonzero(b: i64) -> Result<(), ExecutionError> {
    if b == 0 {
        Err(ExecutionError::Evaluation("division by zero".to_string()))
    } else {
        Ok(())
    }
}

fn not_evaluable(term: &Term, context: &str) -> ExecutionError {
    let found = term
        .functor()
        .map(|(name, arity)| format!("{}/{arity}", crate::term::quote_atom(name)))
        .unwrap_or_else(|| term.to_string());
    ExecutionError::Type {
        context: context.to_string(),
        expected: "evaluable",
        found,
    }
}
