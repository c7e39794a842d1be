//! Context-free grammar transformations and general parsers.
//!
//! A [`Grammar`] is parsed from a small BNF-like text format (see [`Grammar::parse`]).
//! From there:
//!
//! - [`eliminate_epsilon_rules`] and [`eliminate_unit_rules`] remove ε-rules and unit rules
//!   respectively.
//! - [`to_chomsky_normal_form`] chains both of the above with binarization to produce a
//!   grammar in Chomsky Normal Form.
//! - [`cyk::parse_with_cyk`] recognizes and parses a sentence in O(n³) time, converting to
//!   CNF internally.
//! - [`unger::parse_with_unger`] parses directly against any grammar, at exponential cost
//!   in the length of the longest production, trading speed for not needing CNF.

#![deny(
    missing_docs,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![cfg_attr(test, deny(warnings))]

mod cnf;
mod epsilon;
mod error;
mod grammar;
mod symbol;
mod tree;
mod unit;

pub mod cyk;
pub mod unger;

pub use cnf::{to_chomsky_normal_form, to_chomsky_normal_form_with_mapping};
pub use cyk::parse_with_cyk;
pub use epsilon::eliminate_epsilon_rules;
pub use error::Error;
pub use grammar::{Grammar, Production, Productions};
pub use symbol::Symbol;
pub use tree::Tree;
pub use unger::parse_with_unger;
pub use unit::eliminate_unit_rules;
