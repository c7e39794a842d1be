//! Error types returned by the crate's fallible public entry points.

/// Errors produced while building or transforming a grammar.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The BNF surface syntax was violated.
    #[error("malformed grammar input: {0}")]
    MalformedInput(String),
}
