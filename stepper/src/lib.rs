//! Core engine for stepping untyped lambda-calculus terms: parsing the
//! usual notations, printing back under a chosen one, capture-avoiding beta
//! reduction at addressed subterms, and cancellable normal-order
//! normalization.

pub mod lang;
pub mod normalize;
pub mod parser;
pub mod path;
pub mod printer;
pub mod reduce;
pub mod session;
pub mod term;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;
