//! The grammar type: symbol storage, BNF parsing, and the shared fixed-point analyses
//! (`nullable`, `min_length`, reachability) that the transformation passes build on.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::trace;

use crate::error::Error;
use crate::symbol::{Interner, Symbol, Tristate};

/// A single right-hand side: an ordered, non-empty sequence of symbols.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Production(Vec<Symbol>);

impl Production {
    fn new(symbols: Vec<Symbol>) -> Self {
        debug_assert!(!symbols.is_empty(), "productions are never empty");
        Production(symbols)
    }

    /// The symbols making up this alternative, in order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// The number of symbols in this alternative.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this alternative has no symbols. Always `false`: productions are never
    /// empty, since ε is represented by an explicit epsilon symbol rather than a bare
    /// empty sequence.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders this alternative the way the grammar pretty-printer does: symbols
    /// space-separated, using each symbol's display name.
    pub fn pretty(&self) -> String {
        self.0
            .iter()
            .map(Symbol::display_name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<'a> IntoIterator for &'a Production {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The set of alternatives for one head symbol, in the order they were added.
pub type Productions = IndexSet<Production>;

/// A context-free grammar: a start symbol, a set of productions keyed by head, and the
/// per-symbol attributes (`terminal`, `nullable`, `min_length`) the analyses populate.
pub struct Grammar {
    start: Symbol,
    interner: Interner,
    productions: IndexMap<Symbol, Productions>,
    composes: IndexMap<Symbol, IndexSet<Symbol>>,
}

impl Grammar {
    /// Parses a BNF-like text into a grammar.
    ///
    /// The format is whitespace-tokenized: `HEAD -> SYM SYM | SYM` lines, where `|`
    /// separates alternatives and a bare `ε` or `ϵ` token stands for the empty production.
    /// Newlines carry no special meaning; they're just whitespace. The head of the very
    /// first rule becomes the start symbol.
    pub fn parse(text: &str) -> Result<Grammar, Error> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let mut split_indices = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            if *token == "->" {
                split_indices.push(i.wrapping_sub(1));
            }
        }
        if split_indices.is_empty() {
            return Err(Error::MalformedInput("no `->` found in input".to_string()));
        }
        split_indices.push(tokens.len());

        if split_indices[0] != 0 {
            let end = split_indices[0].wrapping_add(1).min(tokens.len());
            return Err(Error::MalformedInput(format!(
                "head should only contain one symbol, but found: {}",
                tokens[..end].join(" ")
            )));
        }

        let mut grammar = Grammar::empty();
        for i in 0..split_indices.len() - 1 {
            let (start_idx, stop) = (split_indices[i], split_indices[i + 1]);
            let head = grammar.get_or_create_symbol(tokens[start_idx]);
            if i == 0 {
                grammar.start = head.clone();
            }

            let mut alternative = Vec::new();
            for &token in &tokens[start_idx + 2..stop] {
                if token == "|" {
                    if alternative.is_empty() {
                        return Err(Error::MalformedInput(format!(
                            "production should not be empty for symbol: {head}"
                        )));
                    }
                    grammar.add_production(head.clone(), std::mem::take(&mut alternative));
                } else if token == "ε" || token == "ϵ" {
                    alternative.push(grammar.epsilon_symbol());
                } else {
                    alternative.push(grammar.get_or_create_symbol(token));
                }
            }
            if alternative.is_empty() {
                return Err(Error::MalformedInput(format!(
                    "production should not be empty for symbol: {head}"
                )));
            }
            grammar.add_production(head, alternative);
        }

        Ok(grammar)
    }

    /// An empty grammar with no start symbol set (the epsilon symbol's name, used as a
    /// placeholder until `parse` assigns the real start).
    fn empty() -> Grammar {
        let mut interner = Interner::new();
        let start = interner.epsilon();
        Grammar { start, interner, productions: IndexMap::new(), composes: IndexMap::new() }
    }

    /// The grammar's start symbol.
    pub fn start(&self) -> &Symbol {
        &self.start
    }

    /// All head symbols, in the order their first production was added.
    pub fn heads(&self) -> impl Iterator<Item = &Symbol> {
        self.productions.keys()
    }

    /// The alternatives for `head`, if it has any.
    pub fn productions_of(&self, head: &Symbol) -> Option<&Productions> {
        self.productions.get(head)
    }

    pub(crate) fn productions(&self) -> &IndexMap<Symbol, Productions> {
        &self.productions
    }

    pub(crate) fn composes(&self) -> &IndexMap<Symbol, IndexSet<Symbol>> {
        &self.composes
    }

    pub(crate) fn epsilon_symbol(&mut self) -> Symbol {
        self.interner.epsilon()
    }

    pub(crate) fn get_or_create_symbol(&mut self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    pub(crate) fn create_aux(&mut self, base: &Symbol) -> Symbol {
        self.interner.create_aux(base.name())
    }

    /// Creates a fresh auxiliary symbol from a literal prefix rather than an existing
    /// symbol's name, as CNF binarization does for its `T_`/`N_` helpers.
    pub(crate) fn create_aux_named(&mut self, base: &str) -> Symbol {
        self.interner.create_aux(base)
    }

    /// Reassigns the start symbol, as epsilon-elimination does when the original start
    /// is folded into an auxiliary head.
    pub(crate) fn set_start(&mut self, start: Symbol) {
        self.start = start;
    }

    /// A symbol is terminal exactly when it never appears as a production head.
    pub fn is_terminal(&self, symbol: &Symbol) -> bool {
        !self.productions.contains_key(symbol)
    }

    /// The complement of `is_terminal`.
    pub fn is_non_terminal(&self, symbol: &Symbol) -> bool {
        self.productions.contains_key(symbol)
    }

    /// Adds one alternative to `head`'s productions, recording `head` as a dependent of
    /// every symbol appearing in it. Returns `true` if this alternative is new.
    pub(crate) fn add_production(&mut self, head: Symbol, production: Vec<Symbol>) -> bool {
        for symbol in &production {
            self.composes.entry(symbol.clone()).or_default().insert(head.clone());
        }
        head.set_terminal(Tristate::No);
        let production = Production::new(production);
        self.productions.entry(head).or_default().insert(production)
    }

    /// Replaces `head`'s alternatives with the empty set, without forgetting that `head`
    /// is a non-terminal or disturbing its position among the other heads.
    pub(crate) fn clear_productions(&mut self, head: &Symbol) {
        if let Some(productions) = self.productions.get_mut(head) {
            productions.clear();
        }
    }

    /// Removes `head` entirely; after this, `head` is a terminal again.
    pub(crate) fn remove_head(&mut self, head: &Symbol) {
        self.productions.shift_remove(head);
    }

    /// Computes `Symbol::nullable` for every known symbol via worklist fixed point.
    pub fn init_nullable(&mut self) {
        let mut queue: VecDeque<Symbol> = VecDeque::new();
        let mut in_queue: HashSet<Symbol> = HashSet::new();
        for symbol in self.interner.symbols() {
            queue.push_back(symbol.clone());
            in_queue.insert(symbol.clone());
        }

        while let Some(symbol) = queue.pop_front() {
            in_queue.remove(&symbol);
            if self.is_terminal(&symbol) {
                symbol.set_nullable(if symbol.is_epsilon() { Tristate::Yes } else { Tristate::No });
                continue;
            }
            let mut became_nullable = false;
            if let Some(productions) = self.productions.get(&symbol) {
                for production in productions {
                    if production.into_iter().all(|child| child.nullable_state() == Tristate::Yes) {
                        symbol.set_nullable(Tristate::Yes);
                        if let Some(heads) = self.composes.get(&symbol) {
                            for head in heads {
                                if head.nullable_state() != Tristate::Yes && !in_queue.contains(head) {
                                    queue.push_back(head.clone());
                                    in_queue.insert(head.clone());
                                }
                            }
                        }
                        became_nullable = true;
                        break;
                    }
                }
            }
            if !became_nullable {
                symbol.set_nullable(Tristate::No);
            }
        }
        trace!("nullability fixed point reached");
    }

    /// Computes `Symbol::min_length` for every known symbol via worklist fixed point.
    /// Terminal lengths are measured in characters, so a multi-character terminal symbol
    /// contributes its full character count.
    pub fn init_min_length(&mut self) {
        let mut queue: VecDeque<Symbol> = VecDeque::new();
        let mut in_queue: HashSet<Symbol> = HashSet::new();

        for symbol in self.interner.symbols() {
            if self.is_terminal(symbol) {
                if symbol.is_epsilon() {
                    continue;
                }
                symbol.set_min_length(symbol.name().chars().count());
            } else {
                symbol.set_min_length(crate::symbol::INFINITE);
                queue.push_back(symbol.clone());
                in_queue.insert(symbol.clone());
            }
        }

        while let Some(symbol) = queue.pop_front() {
            in_queue.remove(&symbol);
            let mut min_length = symbol.min_length();
            if let Some(productions) = self.productions.get(&symbol) {
                for production in productions {
                    let sum = production
                        .into_iter()
                        .fold(0usize, |acc, child| acc.saturating_add(child.min_length()));
                    min_length = min_length.min(sum);
                }
            }
            if min_length < symbol.min_length() {
                symbol.set_min_length(min_length);
                if let Some(heads) = self.composes.get(&symbol) {
                    for head in heads {
                        if !in_queue.contains(head) {
                            queue.push_back(head.clone());
                            in_queue.insert(head.clone());
                        }
                    }
                }
            }
        }
        trace!("minimum-length fixed point reached");
    }

    /// Drops every non-terminal not reachable from the start symbol by a BFS over
    /// production right-hand sides.
    pub fn remove_unreachable(&mut self) {
        let mut queue: VecDeque<Symbol> = VecDeque::new();
        let mut visited: HashSet<Symbol> = HashSet::new();
        queue.push_back(self.start.clone());
        visited.insert(self.start.clone());

        while let Some(head) = queue.pop_front() {
            let Some(productions) = self.productions.get(&head) else { continue };
            let referenced: Vec<Symbol> = productions
                .into_iter()
                .flat_map(|production| production.into_iter().cloned())
                .collect();
            for symbol in referenced {
                if self.is_non_terminal(&symbol) && !visited.contains(&symbol) {
                    visited.insert(symbol.clone());
                    queue.push_back(symbol);
                }
            }
        }

        let heads: Vec<Symbol> = self.productions.keys().cloned().collect();
        for head in heads {
            if !visited.contains(&head) {
                trace!("dropping unreachable head {head}");
                self.remove_head(&head);
            }
        }
    }
}

impl Clone for Grammar {
    fn clone(&self) -> Self {
        let mut interner = Interner::new();
        for symbol in self.interner.symbols() {
            let fresh = interner.intern(symbol.name());
            fresh.set_terminal(symbol.terminal_state());
            fresh.set_nullable(symbol.nullable_state());
            fresh.set_min_length(symbol.min_length());
            if symbol.is_auxiliary() {
                fresh.mark_auxiliary();
            }
        }

        let start = interner.intern(self.start.name());

        let mut productions = IndexMap::with_capacity(self.productions.len());
        for (head, alternatives) in &self.productions {
            let new_head = interner.intern(head.name());
            let mut new_alternatives = Productions::with_capacity(alternatives.len());
            for production in alternatives {
                let symbols = production.into_iter().map(|s| interner.intern(s.name())).collect();
                new_alternatives.insert(Production::new(symbols));
            }
            productions.insert(new_head, new_alternatives);
        }

        let mut composes = IndexMap::with_capacity(self.composes.len());
        for (symbol, heads) in &self.composes {
            let new_symbol = interner.intern(symbol.name());
            let new_heads = heads.iter().map(|h| interner.intern(h.name())).collect();
            composes.insert(new_symbol, new_heads);
        }

        Grammar { start, interner, productions, composes }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(longest) = self.productions.keys().map(|head| head.display_name().chars().count()).max()
        else {
            return Ok(());
        };

        let mut heads: Vec<&Symbol> = vec![&self.start];
        heads.extend(self.productions.keys().filter(|head| **head != self.start));

        for head in heads {
            let Some(productions) = self.productions.get(head) else { continue };
            let mut iter = productions.iter();
            let Some(first) = iter.next() else { continue };
            let name = head.display_name();
            let pad = longest - name.chars().count();
            writeln!(f, "{}{name} -> {}", " ".repeat(pad), first.pretty())?;
            for production in iter {
                writeln!(f, "{}| {}", " ".repeat(longest + 2), production.pretty())?;
            }
        }
        Ok(())
    }
}
