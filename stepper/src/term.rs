use std::{collections::BTreeSet, sync::Arc};

use crate::path::{Branch, Path};

pub type TermRef = Arc<Term>;

/// An untyped lambda term. Equality is structural tree equality; use
/// [`alpha_eq`] when bound-variable names should not matter.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Term {
    /// `x`
    Var(String),
    /// `lambda x. t`
    Abs(String, TermRef),
    /// `t t`
    Apply(TermRef, TermRef),
}

impl Term {
    pub fn var(name: impl Into<String>) -> TermRef {
        Arc::new(Term::Var(name.into()))
    }

    pub fn abs(parameter: impl Into<String>, body: TermRef) -> TermRef {
        Arc::new(Term::Abs(parameter.into(), body))
    }

    pub fn apply(func: TermRef, arg: TermRef) -> TermRef {
        Arc::new(Term::Apply(func, arg))
    }

    /// One-level eliminator: exactly one handler per variant, so a new
    /// variant cannot slip past any caller unnoticed.
    pub fn fold<T>(
        &self,
        var: impl FnOnce(&str) -> T,
        abs: impl FnOnce(&str, &TermRef) -> T,
        apply: impl FnOnce(&TermRef, &TermRef) -> T,
    ) -> T {
        match self {
            Term::Var(name) => var(name),
            Term::Abs(parameter, body) => abs(parameter, body),
            Term::Apply(func, arg) => apply(func, arg),
        }
    }

    /// An application whose function position is an abstraction.
    pub fn is_redex(&self) -> bool {
        matches!(self, Term::Apply(func, _) if matches!(func.as_ref(), Term::Abs(_, _)))
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        match self {
            Term::Var(name) => BTreeSet::from([name.clone()]),
            Term::Abs(parameter, body) => {
                let mut free = body.free_variables();
                free.remove(parameter);
                free
            }
            Term::Apply(func, arg) => {
                let mut free = func.free_variables();
                free.extend(arg.free_variables());
                free
            }
        }
    }

    /// Number of abstraction and application nodes.
    pub fn size(&self) -> usize {
        self.fold(
            |_| 0,
            |_, body| 1 + body.size(),
            |func, arg| 1 + func.size() + arg.size(),
        )
    }

    /// The subterm at `path`, if the address exists in this tree.
    pub fn subterm(&self, path: &Path) -> Option<&Term> {
        let mut current = self;
        for branch in path.branches() {
            current = match (branch, current) {
                (Branch::Body, Term::Abs(_, body)) => body,
                (Branch::Func, Term::Apply(func, _)) => func,
                (Branch::Arg, Term::Apply(_, arg)) => arg,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Splits a trailing numeric subscript off a name. The subscript is either
/// `0` alone or digits without a leading zero, and the base keeps at least
/// one character, so `abc123` splits as `("abc", "123")` while `abc0def`
/// keeps everything in the base.
pub fn split_number_subscript(s: &str) -> (&str, &str) {
    let valid = |suffix: &str| {
        suffix == "0"
            || (suffix.starts_with(|c: char| ('1'..='9').contains(&c))
                && suffix.chars().all(|c| c.is_ascii_digit()))
    };
    for (i, _) in s.char_indices() {
        if i == 0 {
            continue;
        }
        let (base, suffix) = s.split_at(i);
        if valid(suffix) {
            return (base, suffix);
        }
    }
    (s, "")
}

/// First of `base1`, `base2`, ... not in the exclusion set.
pub fn new_var(base: &str, exclude: &BTreeSet<String>) -> String {
    (1u32..)
        .map(|i| format!("{base}{i}"))
        .find(|name| !exclude.contains(name))
        .expect("fresh-name search is unbounded")
}

/// Renames every binder to a canonical `x1`, `x2`, ... so that two terms are
/// alpha-equivalent iff their normalized trees are equal. Free variables keep
/// their names, and fresh binders avoid them.
pub fn alpha_normalize(term: &TermRef) -> TermRef {
    fn go(term: &TermRef, bound: &mut BTreeSet<String>) -> TermRef {
        match term.as_ref() {
            Term::Var(_) => term.clone(),
            Term::Abs(parameter, body) => {
                let mut exclude = bound.clone();
                exclude.extend(term.free_variables());
                let fresh = new_var("x", &exclude);
                let renamed =
                    crate::reduce::substitute(body, parameter, &Term::var(fresh.clone()));
                bound.insert(fresh.clone());
                let normalized = go(&renamed, bound);
                bound.remove(&fresh);
                Term::abs(fresh, normalized)
            }
            Term::Apply(func, arg) => Term::apply(go(func, bound), go(arg, bound)),
        }
    }
    go(term, &mut BTreeSet::new())
}

pub fn alpha_eq(lhs: &TermRef, rhs: &TermRef) -> bool {
    alpha_normalize(lhs) == alpha_normalize(rhs)
}
