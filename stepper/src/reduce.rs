use std::collections::BTreeSet;

use thiserror::Error;

use crate::{
    path::{Branch, Path},
    term::{new_var, Term, TermRef},
};

/// A reduction was requested at an address that is not a redex. This is a
/// caller logic error (typically a stale address after the tree changed),
/// not a property of the term.
#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("address `{0}` does not exist in the term")]
    DanglingAddress(Path),
    #[error("no redex at address `{0}`")]
    NotARedex(Path),
}

/// Capture-avoiding substitution of `replacement` for every free occurrence
/// of `name` in `body`.
pub fn substitute(body: &TermRef, name: &str, replacement: &TermRef) -> TermRef {
    let free = replacement.free_variables();
    rewrite(body, name, replacement, &free, &Path::root(), &mut None)
}

/// Like [`substitute`], additionally recording the address of every
/// occurrence actually replaced and of every binder renamed to avoid
/// capture. Addresses are rooted at `root`, which callers set to the address
/// `body` will occupy in the surrounding tree, so the recorded paths are
/// valid in the whole new term.
pub fn substitute_traced(
    body: &TermRef,
    name: &str,
    replacement: &TermRef,
    root: &Path,
    touched: &mut BTreeSet<Path>,
) -> TermRef {
    let free = replacement.free_variables();
    rewrite(body, name, replacement, &free, root, &mut Some(touched))
}

fn rewrite(
    term: &TermRef,
    from: &str,
    to: &TermRef,
    to_free: &BTreeSet<String>,
    at: &Path,
    touched: &mut Option<&mut BTreeSet<Path>>,
) -> TermRef {
    match term.as_ref() {
        Term::Var(name) => {
            if name == from {
                if let Some(touched) = touched {
                    touched.insert(at.clone());
                }
                to.clone()
            } else {
                term.clone()
            }
        }
        Term::Abs(parameter, body) => {
            if parameter == from {
                // The binder shadows `from`: nothing below is free.
                return term.clone();
            }
            if !to_free.contains(parameter) {
                return Term::abs(
                    parameter.clone(),
                    rewrite(body, from, to, to_free, &at.child(Branch::Body), touched),
                );
            }
            // The binder would capture a free variable of the replacement:
            // rename it throughout its body first. The fresh name must not
            // collide with `from` either, or the renamed occurrences would be
            // substituted right after.
            let mut exclude = to_free.clone();
            exclude.extend(body.free_variables());
            exclude.insert(from.to_string());
            let fresh = new_var(parameter, &exclude);
            if let Some(touched) = touched {
                touched.insert(at.clone());
            }
            let fresh_free = BTreeSet::from([fresh.clone()]);
            let renamed = rewrite(
                body,
                parameter,
                &Term::var(fresh.clone()),
                &fresh_free,
                &at.child(Branch::Body),
                &mut None,
            );
            Term::abs(
                fresh,
                rewrite(&renamed, from, to, to_free, &at.child(Branch::Body), touched),
            )
        }
        Term::Apply(func, arg) => Term::apply(
            rewrite(func, from, to, to_free, &at.child(Branch::Func), touched),
            rewrite(arg, from, to, to_free, &at.child(Branch::Arg), touched),
        ),
    }
}

/// Beta-reduces the redex at `target`, rebuilding the ancestors around the
/// contracted subtree and sharing every untouched sibling.
pub fn reduce_at(term: &TermRef, target: &Path) -> Result<TermRef, ReduceError> {
    descend(term, target, &mut target.branches(), &mut None)
}

/// [`reduce_at`], also reporting which addresses of the resulting tree the
/// substitution touched.
pub fn reduce_at_traced(
    term: &TermRef,
    target: &Path,
) -> Result<(TermRef, BTreeSet<Path>), ReduceError> {
    let mut touched = BTreeSet::new();
    let reduced = descend(term, target, &mut target.branches(), &mut Some(&mut touched))?;
    Ok((reduced, touched))
}

fn descend(
    term: &TermRef,
    target: &Path,
    remaining: &mut impl Iterator<Item = Branch>,
    touched: &mut Option<&mut BTreeSet<Path>>,
) -> Result<TermRef, ReduceError> {
    match remaining.next() {
        None => contract(term, target, touched),
        Some(Branch::Body) => match term.as_ref() {
            Term::Abs(parameter, body) => Ok(Term::abs(
                parameter.clone(),
                descend(body, target, remaining, touched)?,
            )),
            _ => Err(ReduceError::DanglingAddress(target.clone())),
        },
        Some(Branch::Func) => match term.as_ref() {
            Term::Apply(func, arg) => Ok(Term::apply(
                descend(func, target, remaining, touched)?,
                arg.clone(),
            )),
            _ => Err(ReduceError::DanglingAddress(target.clone())),
        },
        Some(Branch::Arg) => match term.as_ref() {
            Term::Apply(func, arg) => Ok(Term::apply(
                func.clone(),
                descend(arg, target, remaining, touched)?,
            )),
            _ => Err(ReduceError::DanglingAddress(target.clone())),
        },
    }
}

fn contract(
    term: &TermRef,
    at: &Path,
    touched: &mut Option<&mut BTreeSet<Path>>,
) -> Result<TermRef, ReduceError> {
    match term.as_ref() {
        Term::Apply(func, arg) => match func.as_ref() {
            Term::Abs(parameter, body) => {
                let free = arg.free_variables();
                Ok(rewrite(body, parameter, arg, &free, at, touched))
            }
            _ => Err(ReduceError::NotARedex(at.clone())),
        },
        _ => Err(ReduceError::NotARedex(at.clone())),
    }
}

/// Address of the leftmost-outermost redex: the term itself if it is one,
/// else the function side before the argument side, outer nodes before
/// inner ones.
pub fn normal_order_redex(term: &Term) -> Option<Path> {
    fn search(term: &Term, at: Path) -> Option<Path> {
        match term {
            Term::Var(_) => None,
            Term::Abs(_, body) => search(body, at.child(Branch::Body)),
            Term::Apply(func, arg) => {
                if term.is_redex() {
                    Some(at)
                } else {
                    search(func, at.child(Branch::Func))
                        .or_else(|| search(arg, at.child(Branch::Arg)))
                }
            }
        }
    }
    search(term, Path::root())
}

pub fn is_normal_form(term: &Term) -> bool {
    normal_order_redex(term).is_none()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        term::alpha_eq,
        testing::{app, lam, terms_up_to, var},
    };

    fn path(s: &str) -> Path {
        s.parse().unwrap()
    }

    #[test]
    fn substitution_replaces_free_occurrences_only() {
        // (x (lambda x. x))[x := y]  ->  y (lambda x. x)
        let body = app!(var!("x"), lam!("x", var!("x")));
        assert_eq!(
            substitute(&body, "x", &var!("y")),
            app!(var!("y"), lam!("x", var!("x")))
        );
    }

    #[test]
    fn substitution_avoids_capture() {
        // (lambda y. x)[x := y] must rename the binder, not capture.
        let body = lam!("y", var!("x"));
        let result = substitute(&body, "x", &var!("y"));
        assert_eq!(result, lam!("y1", var!("y")));
        assert!(alpha_eq(&result, &lam!("z", var!("y"))));
    }

    #[test]
    fn renamed_binder_avoids_the_substituted_name() {
        // (lambda y. y)[y1 := y]: y1 is not free anywhere, but naming the
        // binder y1 would hand its occurrences to the substitution.
        let body = lam!("y", var!("y"));
        assert_eq!(
            substitute(&body, "y1", &var!("y")),
            lam!("y2", var!("y2"))
        );
    }

    #[test]
    fn renamed_binder_skips_clashing_suffixes() {
        // y1 is already taken by a free variable of the body.
        let body = lam!("y", app!(var!("x"), var!("y1")));
        let result = substitute(&body, "x", &var!("y"));
        assert_eq!(result, lam!("y2", app!(var!("y"), var!("y1"))));
    }

    #[test]
    fn reduce_at_the_root() {
        let term = app!(lam!("x", var!("x")), lam!("y", var!("y")));
        assert_eq!(
            reduce_at(&term, &Path::root()).unwrap(),
            lam!("y", var!("y"))
        );
    }

    #[test]
    fn reduce_at_a_nested_address() {
        // lambda z. ((lambda x. x) z)  --d-->  lambda z. z
        let term = lam!("z", app!(lam!("x", var!("x")), var!("z")));
        assert_eq!(reduce_at(&term, &path("d")).unwrap(), lam!("z", var!("z")));
    }

    #[test]
    fn reduce_at_rejects_non_redexes() {
        let term = app!(var!("f"), var!("y"));
        assert!(matches!(
            reduce_at(&term, &Path::root()),
            Err(ReduceError::NotARedex(_))
        ));
        assert!(matches!(
            reduce_at(&term, &path("d")),
            Err(ReduceError::DanglingAddress(_))
        ));
        assert!(matches!(
            reduce_at(&var!("x"), &path("l")),
            Err(ReduceError::DanglingAddress(_))
        ));
    }

    #[test]
    fn traced_reduction_reports_argument_landing_sites() {
        // (lambda x. x x) y  ->  y y, argument lands at `l` and `r`.
        let term = app!(lam!("x", app!(var!("x"), var!("x"))), var!("y"));
        let (reduced, touched) = reduce_at_traced(&term, &Path::root()).unwrap();
        assert_eq!(reduced, app!(var!("y"), var!("y")));
        assert_eq!(touched, BTreeSet::from([path("l"), path("r")]));
    }

    #[test]
    fn traced_reduction_reports_renamed_binders() {
        // (lambda x. lambda y. x y) y: the inner binder must be renamed
        // (recorded at its own address) before y lands at `dl`.
        let term = app!(lam!("x", lam!("y", app!(var!("x"), var!("y")))), var!("y"));
        let (reduced, touched) = reduce_at_traced(&term, &Path::root()).unwrap();
        assert_eq!(reduced, lam!("y1", app!(var!("y"), var!("y1"))));
        assert_eq!(touched, BTreeSet::from([path(""), path("dl")]));
    }

    #[test]
    fn traced_addresses_are_valid_in_the_new_tree() {
        let term = lam!("z", app!(lam!("x", app!(var!("x"), var!("x"))), var!("w")));
        let (reduced, touched) = reduce_at_traced(&term, &path("d")).unwrap();
        assert_eq!(reduced, lam!("z", app!(var!("w"), var!("w"))));
        for at in &touched {
            assert!(reduced.subterm(at).is_some(), "dangling touched path {at}");
        }
        assert_eq!(touched, BTreeSet::from([path("dl"), path("dr")]));
    }

    #[test]
    fn normal_order_prefers_outer_and_left() {
        let omega_half = lam!("x", app!(var!("x"), var!("x")));
        let omega = app!(omega_half.clone(), omega_half);
        assert_eq!(normal_order_redex(&omega), Some(Path::root()));

        let inner = lam!("z", app!(lam!("x", var!("x")), var!("z")));
        assert_eq!(normal_order_redex(&inner), Some(path("d")));

        // No redex in function position: the argument side is searched next.
        let term = app!(var!("f"), app!(lam!("y", var!("y")), var!("z")));
        assert_eq!(normal_order_redex(&term), Some(path("r")));

        assert_eq!(normal_order_redex(&var!("x")), None);
        assert!(is_normal_form(&lam!("x", var!("x"))));
    }

    #[test]
    fn normal_order_redex_is_reducible_and_outermost() {
        for term in terms_up_to(3) {
            let target = match normal_order_redex(&term) {
                Some(target) => target,
                None => continue,
            };
            assert!(
                reduce_at(&term, &target).is_ok(),
                "irreducible address for {term}"
            );
            for prefix in target.prefixes() {
                let ancestor = term.subterm(&prefix).expect("prefix exists");
                assert!(
                    !ancestor.is_redex(),
                    "redex above the reported one in {term}"
                );
            }
        }
    }
}
