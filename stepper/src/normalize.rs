use std::collections::BTreeSet;

use crate::{
    path::Path,
    reduce::{is_normal_form, normal_order_redex, reduce_at, reduce_at_traced, substitute},
    term::{Term, TermRef},
};

/// One beta step of a normal-order run.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Step {
    /// The whole term after the step.
    pub term: TermRef,
    /// Address of the redex that fired.
    pub target: Path,
    /// Addresses in `term` touched by the substitution.
    pub touched: BTreeSet<Path>,
}

/// Lazy leftmost-outermost reduction sequence. Ends exactly at normal form;
/// for divergent terms it yields forever, so the consumer controls pacing
/// and may stop pulling at any point.
pub struct Normalization {
    current: TermRef,
}

pub fn normalize(term: TermRef) -> Normalization {
    Normalization { current: term }
}

impl Iterator for Normalization {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let target = normal_order_redex(&self.current)?;
        let (term, touched) = reduce_at_traced(&self.current, &target)
            .expect("normal_order_redex returned a non-redex address");
        self.current = term.clone();
        Some(Step { term, target, touched })
    }
}

/// Runs to normal form. Diverges when the term has none; prefer
/// [`normal_form_within`] for untrusted input.
pub fn normal_form(term: TermRef) -> TermRef {
    match normalize(term.clone()).last() {
        Some(step) => step.term,
        None => term,
    }
}

/// Runs at most `max_steps` reductions, `None` when that was not enough.
pub fn normal_form_within(term: TermRef, max_steps: usize) -> Option<TermRef> {
    let mut current = term;
    for _ in 0..max_steps {
        match normal_order_redex(&current) {
            None => return Some(current),
            Some(target) => {
                current = reduce_at(&current, &target)
                    .expect("normal_order_redex returned a non-redex address");
            }
        }
    }
    if is_normal_form(&current) {
        Some(current)
    } else {
        None
    }
}

/// Every term reachable in exactly one beta step anywhere in the tree,
/// leftmost-outermost first.
pub fn beta_children(term: &TermRef) -> Vec<TermRef> {
    term.fold(
        |_| Vec::new(),
        |parameter, body| {
            beta_children(body)
                .into_iter()
                .map(|child| Term::abs(parameter, child))
                .collect()
        },
        |func, arg| {
            let mut children: Vec<TermRef> = beta_children(func)
                .into_iter()
                .map(|child| Term::apply(child, arg.clone()))
                .collect();
            children.extend(
                beta_children(arg)
                    .into_iter()
                    .map(|child| Term::apply(func.clone(), child)),
            );
            if let Term::Abs(parameter, body) = func.as_ref() {
                children.push(substitute(body, parameter, arg));
            }
            children
        },
    )
}

/// All beta-normal forms reachable within `depth` steps under any strategy.
/// Exponential; meant for small terms.
pub fn naive_beta_normal_forms(term: &TermRef, depth: usize) -> Vec<TermRef> {
    if is_normal_form(term) {
        return vec![term.clone()];
    }
    if depth == 0 {
        return Vec::new();
    }
    beta_children(term)
        .iter()
        .flat_map(|child| naive_beta_normal_forms(child, depth - 1))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        parser::parse,
        term::{alpha_eq, alpha_normalize},
        testing::{app, church, lam, terms_up_to, var},
    };

    #[test]
    fn identity_application_steps_once() {
        let term = app!(lam!("x", var!("x")), lam!("x", var!("x")));
        let steps: Vec<Step> = normalize(term).collect();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].target, Path::root());
        assert_eq!(steps[0].term, lam!("x", var!("x")));
        assert!(is_normal_form(&steps[0].term));
    }

    #[test]
    fn omega_reduces_to_itself_forever() {
        let omega = parse("(x. x x)(x. x x)").unwrap();
        for step in normalize(omega.clone()).take(50) {
            assert_eq!(step.target, Path::root());
            assert_eq!(step.term, omega);
        }
        assert_eq!(normal_form_within(omega, 100), None);
    }

    #[test]
    fn church_addition() {
        let plus = parse("(m n f x. m f(n f x))").unwrap();
        let sum = app!(app!(plus, church(3)), church(2));
        let result = normal_form_within(sum, 200).unwrap();
        assert!(alpha_eq(&result, &church(5)), "got {result}");
    }

    #[test]
    fn beta_children_cover_every_redex() {
        // (lambda x. x)((lambda y. y) z) has two redexes.
        let term = app!(lam!("x", var!("x")), app!(lam!("y", var!("y")), var!("z")));
        let children = beta_children(&term);
        assert_eq!(children.len(), 2);
        assert!(children.contains(&app!(lam!("x", var!("x")), var!("z"))));
        assert!(children.contains(&app!(lam!("y", var!("y")), var!("z"))));
    }

    #[test]
    fn normal_forms_are_unique_up_to_alpha() {
        for term in terms_up_to(3) {
            let forms = naive_beta_normal_forms(&term, 5);
            let mut normalized = forms.iter().map(alpha_normalize);
            if let Some(first) = normalized.next() {
                for other in normalized {
                    assert_eq!(first, other, "two normal forms for {term}");
                }
            }
        }
    }

    #[test]
    fn factorial_of_four() {
        let fix = "(f => (x => f(x x))(x => f(x x)))";
        let pred = "(n.f.x. n(g.h. h(g f))(u. x)(u. u))";
        let mul = "(a.b.f.x. a(b f) x)";
        let fls = "(x.y. y)";
        let tru = "(x.y. x)";
        let iszero = format!("(n. n(x. {fls}) {tru})");
        let one = "(f x . f x)";
        let four = "(f x . f (f (f (f x))))";
        let factorial =
            format!("{fix}(f x . {iszero} x {one} ({mul} x (f ({pred} x)) ) ){four}");
        let term = parse(&factorial).unwrap();
        let result = normal_form_within(term, 100_000).expect("factorial 4 terminates");
        assert!(alpha_eq(&result, &church(24)));
    }
}
