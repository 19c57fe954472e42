//! abnf-core: a parser-combinator engine driven by ABNF (RFC 5234) grammars.
//!
//! The engine is built from **consumers** — small objects each embodying one
//! grammar construct (a terminal, a literal, a concatenation, a weighted
//! alternation, ...). Every consumer shares one contract: given a [`Cursor`]
//! into the input, either advance the cursor and return an [`Atom`] (a node
//! of the generic parse tree), or leave the cursor untouched and return a
//! [`ParseError`].
//!
//! A grammar is a [`RuleMap`]: a table from rule name to consumer, threaded
//! ambiently through the descent via [`ParseState`]. [`kickoff`] invokes a
//! named start rule against a cursor and produces an [`Atom`] tree. The
//! [`reduce`] module then walks that tree with user-supplied callbacks and
//! turns it into whatever typed domain values the caller wants.
//!
//! This crate does not know about ABNF's own grammar (parsing `.abnf` files)
//! or about any concrete domain AST — those are the responsibility of a
//! bootstrap loader and of the reducer callbacks a caller supplies.
//!
//! # Example
//!
//! ```
//! use abnf_core::{cursor_from, kickoff, make_rules};
//!
//! let rules = make_rules(std::collections::HashMap::new());
//! let cursor = cursor_from("A");
//! let (atom, _cursor) = kickoff(cursor, &rules, "alpha").expect("single ALPHA parses");
//! assert_eq!(atom.as_rule_result().unwrap().0, "alpha");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod atom;
pub mod combinators;
pub mod consumer;
pub mod cursor;
pub mod diagnostics;
pub mod error;
pub mod printer;
pub mod reduce;
pub mod rules;
pub mod terminals;

#[cfg(test)]
mod scenarios_tests;

pub use atom::{Atom, AtomKind, TerminalKind};
pub use combinators::{Alt, Branch, Cat, Dec, DecRange, DecSeq, Hex, HexRange, HexSeq, Lit, Opt, Ref, Repeat, Str};
pub use consumer::{CancellationToken, Consumer, ParseState};
pub use cursor::{cursor_from, Cursor};
pub use error::ParseError;
pub use printer::print_tree;
pub use reduce::{reduce_into, ReduceContext, ReducedValue, ReducerMap};
pub use rules::{core_rules, kickoff, kickoff_with_recursion_limit, make_rules, RuleMap};

/// Errors that abort an in-flight parse outright rather than flowing through
/// the ordinary backtracking machinery: fuel exhaustion and cancellation are
/// deliberately not [`ParseError`]s, since no amount of alternation can
/// recover from either.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A cancellation token was observed mid-parse.
    #[error("parse cancelled")]
    Cancelled,

    /// Ref recursion went `recursion_limit` rules deep without making
    /// progress; almost always a left-recursive grammar.
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
}

/// Result type for operations that can raise an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
