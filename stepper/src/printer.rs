use std::fmt;

use crate::{
    lang::{Lang, LangInfo},
    term::Term,
};

#[derive(PartialEq, Eq, Clone, Copy)]
enum Context {
    /// Directly inside an abstraction body.
    Abstraction,
    Other,
}

/// Renders a term in the given notation. Total: every term prints, and
/// reparsing the output yields the same tree.
pub fn print(term: &Term, info: &LangInfo) -> String {
    let mut out = render(term, Context::Other, info).trim().to_string();
    // Rendering pads liberally; a few fixed passes collapse the leftovers.
    for _ in 0..3 {
        out = out
            .replace("  ", " ")
            .replace(" )", ")")
            .replace(") ", ")")
            .replace("( ", "(")
            .replace(" (", "(");
    }
    out
}

fn render(term: &Term, context: Context, info: &LangInfo) -> String {
    match term {
        Term::Var(name) => format!(" {name} "),
        Term::Abs(parameter, body) => {
            let hide_binder = context == Context::Abstraction && info.multi_arg;
            let merge_connector =
                matches!(body.as_ref(), Term::Abs(_, _)) && info.multi_arg;
            format!(
                "{}{}{}{}",
                if hide_binder { "" } else { info.lambda_symbol },
                parameter,
                if merge_connector { " " } else { info.connector },
                render(body, Context::Abstraction, info),
            )
        }
        Term::Apply(func, arg) => {
            let func = parenthesize_if(
                matches!(func.as_ref(), Term::Abs(_, _)),
                render(func, Context::Other, info),
            );
            let arg = parenthesize_if(
                info.parenthesize_arg || !matches!(arg.as_ref(), Term::Var(_)),
                render(arg, Context::Other, info),
            );
            format!("{func} {arg}")
        }
    }
}

fn parenthesize_if(condition: bool, rendered: String) -> String {
    if condition {
        format!("({rendered})")
    } else {
        rendered
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print(self, Lang::Tex.info()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{parser::parse, testing::{app, lam, terms_up_to, var}};

    #[test]
    fn identity_in_every_notation() {
        let identity = lam!("x", var!("x"));
        assert_eq!(print(&identity, Lang::Python.info()), "lambda x: x");
        assert_eq!(print(&identity, Lang::JavaScript.info()), "x => x");
        assert_eq!(print(&identity, Lang::Tex.info()), "𝜆x. x");
    }

    #[test]
    fn tex_collapses_consecutive_binders() {
        let term = lam!("x", lam!("y", var!("x")));
        assert_eq!(print(&term, Lang::Tex.info()), "𝜆x y. x");
        // Code notations keep each binder separate.
        assert_eq!(
            print(&term, Lang::Python.info()),
            "lambda x: lambda y: x"
        );
        assert_eq!(print(&term, Lang::JavaScript.info()), "x => y => x");
    }

    #[test]
    fn parenthesization_rules() {
        let omega_half = lam!("x", app!(var!("x"), var!("x")));
        let omega = app!(omega_half.clone(), omega_half);
        assert_eq!(print(&omega, Lang::Tex.info()), "(𝜆x. x x)(𝜆x. x x)");

        // Function-position applications stay bare, arguments do not.
        let term = app!(app!(var!("a"), var!("b")), app!(var!("c"), var!("d")));
        assert_eq!(print(&term, Lang::Tex.info()), "a b(c d)");
        // Code notations parenthesize every argument.
        assert_eq!(print(&term, Lang::Python.info()), "a(b)(c(d))");
    }

    #[test]
    fn display_uses_tex() {
        let term = app!(lam!("f", var!("f")), var!("y"));
        // Cleanup also glues arguments onto a closing parenthesis.
        assert_eq!(term.to_string(), "(𝜆f. f)y");
    }

    #[test]
    fn print_then_parse_is_identity() {
        for term in terms_up_to(3) {
            for lang in Lang::ALL {
                let source = print(&term, lang.info());
                let reparsed = parse(&source).unwrap_or_else(|e| {
                    panic!("failed to reparse `{source}` ({lang}): {e}")
                });
                assert_eq!(reparsed, term, "source: `{source}` ({lang})");
            }
        }
    }
}
