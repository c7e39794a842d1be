//! Named symbols with cached analysis attributes.
//!
//! Symbols are interned by name: two `Symbol` handles with the same name are the same
//! handle, sharing the same mutable attribute cells. A `Grammar` owns one `Interner` and
//! never hands out a `Symbol` minted by a different grammar's interner.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Sentinel meaning "no finite derivation found (yet)".
pub const INFINITE: usize = usize::MAX;

/// A three-valued flag used by the fixed-point analyses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tristate {
    /// Not yet determined.
    Unknown,
    /// Known to hold.
    Yes,
    /// Known not to hold.
    No,
}

impl Tristate {
    /// Whether this tristate has settled on `Yes`.
    pub fn is_yes(self) -> bool {
        matches!(self, Tristate::Yes)
    }
}

struct SymbolData {
    name: Box<str>,
    terminal: Cell<Tristate>,
    auxiliary: Cell<bool>,
    nullable: Cell<Tristate>,
    min_length: Cell<usize>,
}

/// A named grammar symbol. Cheap to clone (an `Rc` bump); equality and hashing depend only
/// on the name.
#[derive(Clone)]
pub struct Symbol(Rc<SymbolData>);

impl Symbol {
    fn fresh(name: &str) -> Self {
        let is_epsilon = name.is_empty();
        Symbol(Rc::new(SymbolData {
            name: name.into(),
            terminal: Cell::new(Tristate::Unknown),
            auxiliary: Cell::new(false),
            nullable: Cell::new(if is_epsilon { Tristate::Yes } else { Tristate::Unknown }),
            min_length: Cell::new(if is_epsilon { 0 } else { INFINITE }),
        }))
    }

    /// The symbol's bare name. The empty symbol's name is the empty string.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Whether this is the distinguished empty symbol.
    pub fn is_epsilon(&self) -> bool {
        self.0.name.is_empty()
    }

    /// Display form used in pretty-printed grammars and parse trees: "ε" for the empty
    /// symbol, the bare name otherwise.
    pub fn display_name(&self) -> &str {
        if self.is_epsilon() {
            "ε"
        } else {
            &self.0.name
        }
    }

    /// Whether this symbol was synthesized by a transformation.
    pub fn is_auxiliary(&self) -> bool {
        self.0.auxiliary.get()
    }

    pub(crate) fn mark_auxiliary(&self) {
        self.0.auxiliary.set(true);
    }

    pub(crate) fn set_terminal(&self, state: Tristate) {
        self.0.terminal.set(state);
    }

    pub(crate) fn terminal_state(&self) -> Tristate {
        self.0.terminal.get()
    }

    /// Whether this symbol can derive the empty string. Meaningless before `init_nullable`
    /// has run.
    pub fn nullable(&self) -> bool {
        self.0.nullable.get().is_yes()
    }

    pub(crate) fn nullable_state(&self) -> Tristate {
        self.0.nullable.get()
    }

    pub(crate) fn set_nullable(&self, state: Tristate) {
        self.0.nullable.set(state);
    }

    /// Length of the shortest terminal string derivable from this symbol, or
    /// `symbol::INFINITE` if `init_min_length` hasn't run or found none.
    pub fn min_length(&self) -> usize {
        self.0.min_length.get()
    }

    pub(crate) fn set_min_length(&self, len: usize) {
        self.0.min_length.set(len);
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.display_name())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Interns symbols by name. Every `Grammar` owns one; `Grammar::clone` builds a parallel
/// interner so that attribute writes made by a transformation never leak back into the
/// grammar it was cloned from.
pub struct Interner {
    by_name: HashMap<Box<str>, Symbol>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates an interner already containing the epsilon symbol.
    pub fn new() -> Self {
        let mut interner = Interner { by_name: HashMap::new() };
        interner.intern("");
        interner
    }

    /// Returns the unique symbol for `name`, creating it if this is the first time it's
    /// been seen.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(sym) = self.by_name.get(name) {
            return sym.clone();
        }
        let sym = Symbol::fresh(name);
        self.by_name.insert(name.into(), sym.clone());
        sym
    }

    /// Whether `name` has already been interned.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// The distinguished empty symbol.
    pub fn epsilon(&mut self) -> Symbol {
        self.intern("")
    }

    /// Every symbol this interner has ever minted, in no particular order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.by_name.values()
    }

    /// Creates a fresh auxiliary symbol named `base_1`, `base_2`, … choosing the first
    /// suffix not already interned.
    pub fn create_aux(&mut self, base: &str) -> Symbol {
        let mut index = 0usize;
        loop {
            index += 1;
            let candidate = format!("{base}_{index}");
            if !self.contains(&candidate) {
                let sym = self.intern(&candidate);
                sym.mark_auxiliary();
                return sym;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_shares_attribute_cells() {
        let mut interner = Interner::new();
        let a = interner.intern("A");
        let b = interner.intern("A");
        a.set_nullable(Tristate::Yes);
        assert!(b.nullable());
    }

    #[test]
    fn epsilon_is_nullable_and_displays_as_greek_letter() {
        let mut interner = Interner::new();
        let eps = interner.epsilon();
        assert!(eps.nullable());
        assert_eq!(eps.min_length(), 0);
        assert_eq!(eps.display_name(), "ε");
        assert_eq!(eps.name(), "");
    }

    #[test]
    fn create_aux_picks_first_free_suffix() {
        let mut interner = Interner::new();
        interner.intern("A_1");
        let aux = interner.create_aux("A");
        assert_eq!(aux.name(), "A_2");
        assert!(aux.is_auxiliary());
    }
}
