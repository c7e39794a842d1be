//! Recognition and parsing with the Cocke-Younger-Kasami algorithm.
//!
//! CYK needs the grammar in Chomsky Normal Form, so `parse_with_cyk` converts a copy of it
//! internally and reconstructs the result against the *original* grammar's productions,
//! using the CNF head mapping only to test recognizability against the DP table. Every
//! terminal symbol must be exactly one character long; this is checked with a
//! `debug_assert_eq!` the first time a terminal is matched against the recognition table.

use std::collections::{HashMap, HashSet};

use crate::cnf::to_chomsky_normal_form_keeping_unreachable;
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::tree::Tree;

/// Parses `sentence` against `grammar` with CYK, returning the first parse tree found, or
/// `None` if `sentence` isn't in the language.
pub fn parse_with_cyk(grammar: &Grammar, sentence: &str) -> Option<Tree> {
    let mut grammar = grammar.clone();
    grammar.init_nullable();
    let (cnf_grammar, head_mapping) = to_chomsky_normal_form_keeping_unreachable(&grammar);

    let sentence_chars: Vec<char> = sentence.chars().collect();
    let n = sentence_chars.len();
    let mut rec: Vec<Vec<HashSet<Symbol>>> = vec![vec![HashSet::new(); n]; n];

    for (i, ch) in sentence_chars.iter().enumerate() {
        for head in cnf_grammar.heads() {
            for production in cnf_grammar.productions_of(head).unwrap() {
                let symbols = production.symbols();
                if symbols.len() == 1 && !symbols[0].is_epsilon() && cnf_grammar.is_terminal(&symbols[0]) {
                    debug_assert_eq!(
                        symbols[0].name().chars().count(),
                        1,
                        "CYK terminals must be exactly one character long"
                    );
                    if symbols[0].name().chars().next() == Some(*ch) {
                        rec[i][i].insert(head.clone());
                        break;
                    }
                }
            }
        }
    }

    for sub_len in 1..n {
        for i in 0..n - sub_len {
            let j = i + sub_len;
            for head in cnf_grammar.heads() {
                for production in cnf_grammar.productions_of(head).unwrap() {
                    let symbols = production.symbols();
                    if symbols.len() == 2 {
                        for k in i..j {
                            if rec[i][k].contains(&symbols[0]) && rec[k + 1][j].contains(&symbols[1]) {
                                rec[i][j].insert(head.clone());
                                break;
                            }
                        }
                    }
                    if rec[i][j].contains(head) {
                        break;
                    }
                }
            }
        }
    }

    let mut history: HashMap<(Symbol, isize, isize), Option<Tree>> = HashMap::new();
    let start = grammar.start().clone();
    parse_symbol(&grammar, &head_mapping, &rec, &sentence_chars, &mut history, &start, 0, n as isize - 1)
}

fn recognisable(
    grammar: &Grammar,
    head_mapping: &HashMap<Symbol, Symbol>,
    rec: &[Vec<HashSet<Symbol>>],
    sentence_chars: &[char],
    symbol: &Symbol,
    start: isize,
    stop: isize,
) -> bool {
    if start > stop {
        return symbol.nullable();
    }
    if grammar.is_terminal(symbol) {
        let span = &sentence_chars[start as usize..=stop as usize];
        return span.len() == 1 && span[0].to_string() == symbol.name();
    }
    let mapped = head_mapping.get(symbol).cloned().unwrap_or_else(|| symbol.clone());
    rec[start as usize][stop as usize].contains(&mapped)
}

fn parse_production(
    grammar: &Grammar,
    head_mapping: &HashMap<Symbol, Symbol>,
    rec: &[Vec<HashSet<Symbol>>],
    sentence_chars: &[char],
    history: &mut HashMap<(Symbol, isize, isize), Option<Tree>>,
    production: &[Symbol],
    start: isize,
    stop: isize,
) -> Option<Vec<Tree>> {
    let Some((first, rest)) = production.split_first() else {
        return if start > stop { Some(Vec::new()) } else { None };
    };

    if grammar.is_terminal(first) {
        let bound = start.min(stop);
        let first_tree = parse_symbol(grammar, head_mapping, rec, sentence_chars, history, first, start, bound)?;
        let mut rest_trees =
            parse_production(grammar, head_mapping, rec, sentence_chars, history, rest, start + 1, stop)?;
        let mut out = vec![first_tree];
        out.append(&mut rest_trees);
        return Some(out);
    }

    for k in (start - 1)..=stop {
        if let Some(first_tree) = parse_symbol(grammar, head_mapping, rec, sentence_chars, history, first, start, k) {
            if let Some(mut rest_trees) =
                parse_production(grammar, head_mapping, rec, sentence_chars, history, rest, k + 1, stop)
            {
                let mut out = vec![first_tree];
                out.append(&mut rest_trees);
                return Some(out);
            }
        }
    }
    None
}

fn parse_symbol(
    grammar: &Grammar,
    head_mapping: &HashMap<Symbol, Symbol>,
    rec: &[Vec<HashSet<Symbol>>],
    sentence_chars: &[char],
    history: &mut HashMap<(Symbol, isize, isize), Option<Tree>>,
    symbol: &Symbol,
    start: isize,
    stop: isize,
) -> Option<Tree> {
    let key = (symbol.clone(), start, stop);
    if let Some(cached) = history.get(&key) {
        return cached.clone();
    }
    history.insert(key.clone(), None);

    let mut result = None;
    if grammar.is_terminal(symbol) {
        if recognisable(grammar, head_mapping, rec, sentence_chars, symbol, start, stop) {
            result = Some(Tree::Leaf(symbol.display_name().to_string()));
        }
    } else if recognisable(grammar, head_mapping, rec, sentence_chars, symbol, start, stop) {
        if let Some(productions) = grammar.productions_of(symbol) {
            for production in productions {
                let symbols = production.symbols();
                if let Some(children) =
                    parse_production(grammar, head_mapping, rec, sentence_chars, history, symbols, start, stop)
                {
                    result = if symbols.len() == 1 && grammar.is_terminal(&symbols[0]) {
                        children.into_iter().next()
                    } else {
                        Some(Tree::Node(production.pretty(), children))
                    };
                    break;
                }
            }
        }
    }

    history.insert(key, result.clone());
    result
}
