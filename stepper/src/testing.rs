//! Helpers shared by the per-module test suites.

use crate::term::{Term, TermRef};

macro_rules! var {
    ($name:expr) => {
        crate::term::Term::var($name)
    };
}
macro_rules! lam {
    ($parameter:expr, $body:expr) => {
        crate::term::Term::abs($parameter, $body)
    };
}
macro_rules! app {
    ($func:expr, $arg:expr) => {
        crate::term::Term::apply($func, $arg)
    };
}
pub(crate) use {app, lam, var};

/// Every term with at most `size` internal nodes over the variables `a` and
/// `b`, deterministically enumerated smallest first.
pub(crate) fn terms_up_to(size: usize) -> Vec<TermRef> {
    let mut by_size: Vec<Vec<TermRef>> = vec![vec![Term::var("a"), Term::var("b")]];
    for n in 1..=size {
        let mut terms = Vec::new();
        for body in &by_size[n - 1] {
            terms.push(Term::abs("a", body.clone()));
            terms.push(Term::abs("b", body.clone()));
        }
        for left in 0..n {
            for func in &by_size[left] {
                for arg in &by_size[n - 1 - left] {
                    terms.push(Term::apply(func.clone(), arg.clone()));
                }
            }
        }
        by_size.push(terms);
    }
    by_size.into_iter().flatten().collect()
}

/// The Church numeral `n`: `lambda f. lambda x. f (... (f x))`.
pub(crate) fn church(n: usize) -> TermRef {
    let mut body = Term::var("x");
    for _ in 0..n {
        body = Term::apply(Term::var("f"), body);
    }
    Term::abs("f", Term::abs("x", body))
}
