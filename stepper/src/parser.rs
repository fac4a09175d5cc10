use std::str::Chars;

use thiserror::Error;

use crate::term::{Term, TermRef};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("expected variable names before the binder connector")]
    BinderParameter,
    #[error("empty application group")]
    EmptyGroup,
    #[error("unbalanced parentheses")]
    UnbalancedParen,
}

/// Rewrites every accepted notation into the one canonical form the scanner
/// understands: `.` introduces a binder body, the binder keywords themselves
/// vanish, and a final `)` closes the implicit top-level group so `f x y`
/// needs no outer parentheses.
fn canonicalize(source: &str) -> String {
    let mut canonical = source.replace("=>", ".").replace(':', ".");
    for binder in ["lambda", "\\", "λ", "𝜆"] {
        canonical = canonical.replace(binder, " ");
    }
    canonical.push(')');
    canonical
}

/// Parses a term in any supported notation: `(x . x x)`, `lambda x: x`,
/// `x => x`, `\x. x`. Application is juxtaposition and associates left;
/// `x y. body` abbreviates nested binders.
pub fn parse(source: &str) -> Result<TermRef, ParseError> {
    let canonical = canonicalize(source);
    let mut chars = canonical.chars();
    let term = parse_group(&mut chars)?;
    if chars.any(|c| c != ' ') {
        return Err(ParseError::UnbalancedParen);
    }
    Ok(term)
}

/// One parenthesized group: accumulates juxtaposed terms until the group
/// closes, recursing for nested groups.
fn parse_group(chars: &mut Chars) -> Result<TermRef, ParseError> {
    fn flush(word: &mut String, terms: &mut Vec<TermRef>) {
        if !word.is_empty() {
            terms.push(Term::var(std::mem::take(word)));
        }
    }

    let mut terms: Vec<TermRef> = Vec::new();
    let mut word = String::new();
    while let Some(c) = chars.next() {
        match c {
            '(' => {
                flush(&mut word, &mut terms);
                terms.push(parse_group(chars)?);
            }
            ' ' | '\t' | '\n' | '\r' => flush(&mut word, &mut terms),
            '.' => {
                flush(&mut word, &mut terms);
                let parameters = binder_parameters(&terms)?;
                let body = parse_group(chars)?;
                return Ok(make_abs(parameters, body));
            }
            ')' => {
                flush(&mut word, &mut terms);
                return make_apply(terms);
            }
            _ => word.push(c),
        }
    }
    Err(ParseError::UnexpectedEnd)
}

/// Everything accumulated before a connector must be a chain of parameter
/// names.
fn binder_parameters(terms: &[TermRef]) -> Result<Vec<String>, ParseError> {
    if terms.is_empty() {
        return Err(ParseError::BinderParameter);
    }
    terms
        .iter()
        .map(|term| match term.as_ref() {
            Term::Var(name) => Ok(name.clone()),
            _ => Err(ParseError::BinderParameter),
        })
        .collect()
}

fn make_abs(parameters: Vec<String>, body: TermRef) -> TermRef {
    parameters
        .into_iter()
        .rev()
        .fold(body, |body, parameter| Term::abs(parameter, body))
}

fn make_apply(terms: Vec<TermRef>) -> Result<TermRef, ParseError> {
    let mut terms = terms.into_iter();
    let head = terms.next().ok_or(ParseError::EmptyGroup)?;
    Ok(terms.fold(head, Term::apply))
}
