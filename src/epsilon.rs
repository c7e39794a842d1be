//! ε-rule elimination.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use crate::grammar::Grammar;
use crate::symbol::{Symbol, Tristate};

/// Rewrites `grammar` so that no production derives the empty string, except possibly the
/// start symbol's own productions if the original grammar's start symbol was nullable.
///
/// Every non-terminal that had at least one nullable child gets a fresh non-nullable
/// alternative head holding every alternative with the nullable children dropped in every
/// combination; rules elsewhere are rewritten to point at that alternative head instead.
pub fn eliminate_epsilon_rules(grammar: &Grammar) -> Grammar {
    eliminate_epsilon_rules_with(grammar, true).0
}

pub(crate) fn eliminate_epsilon_rules_with(
    grammar: &Grammar,
    init_nullable: bool,
) -> (Grammar, HashMap<Symbol, Symbol>) {
    let mut grammar = grammar.clone();
    if init_nullable {
        grammar.init_nullable();
    }
    let epsilon = grammar.epsilon_symbol();
    let mut head_mapping: HashMap<Symbol, Symbol> = HashMap::new();

    // Build, for every head with a nullable-containing alternative, an auxiliary head
    // whose alternatives are the nullable-free expansions of the original ones.
    let heads: Vec<Symbol> = grammar.heads().cloned().collect();
    for head in &heads {
        let productions = grammar.productions_of(head).cloned().unwrap_or_default();
        let any_nullable = productions
            .iter()
            .any(|production| production.symbols().iter().any(|s| s.nullable()));
        if !any_nullable {
            continue;
        }
        let new_head = grammar.create_aux(head);
        new_head.set_nullable(Tristate::No);
        for production in &productions {
            if production.symbols().iter().any(|s| s.nullable()) {
                let mut alternatives: Vec<Vec<Symbol>> = vec![Vec::new()];
                for symbol in production.symbols() {
                    if symbol.nullable() {
                        let mut with_symbol = alternatives.clone();
                        for alt in &mut with_symbol {
                            alt.push(symbol.clone());
                        }
                        alternatives.extend(with_symbol);
                    } else {
                        for alt in &mut alternatives {
                            alt.push(symbol.clone());
                        }
                    }
                }
                for alt in alternatives {
                    if alt.is_empty() {
                        continue;
                    }
                    if alt.len() == 1 && alt[0] == epsilon {
                        continue;
                    }
                    grammar.add_production(new_head.clone(), alt);
                }
            } else {
                grammar.add_production(new_head.clone(), production.symbols().to_vec());
            }
        }
        head_mapping.insert(head.clone(), new_head);
    }

    // Rewrite every head's productions to use the mapped symbols, dropping alternatives
    // that relied on a symbol which, after mapping, can only derive ε.
    let heads: Vec<Symbol> = grammar.heads().cloned().collect();
    let heads_set: HashSet<Symbol> = heads.iter().cloned().collect();
    let mut queue: VecDeque<Symbol> = heads.iter().cloned().collect();
    let mut in_queue: HashSet<Symbol> = heads_set.clone();
    while let Some(head) = queue.pop_front() {
        in_queue.remove(&head);
        let productions = grammar.productions_of(&head).cloned().unwrap_or_default();
        grammar.remove_head(&head);
        if head_mapping.contains_key(&head) {
            continue;
        }
        for production in &productions {
            let drop = production.symbols().iter().any(|symbol| {
                let mapped = head_mapping.get(symbol).cloned().unwrap_or_else(|| symbol.clone());
                mapped != head && heads_set.contains(symbol) && !grammar.productions().contains_key(&mapped)
            });
            if drop {
                continue;
            }
            let rewritten: Vec<Symbol> = production
                .symbols()
                .iter()
                .map(|symbol| head_mapping.get(symbol).cloned().unwrap_or_else(|| symbol.clone()))
                .collect();
            grammar.add_production(head.clone(), rewritten);
        }
        if !grammar.productions().contains_key(&head) {
            debug!("{head} can only derive ε; notifying dependents");
            if let Some(dependents) = grammar.composes().get(&head).cloned() {
                for symbol in dependents {
                    if !head_mapping.contains_key(&symbol)
                        && grammar.productions().contains_key(&symbol)
                        && !in_queue.contains(&symbol)
                    {
                        queue.push_back(symbol.clone());
                        in_queue.insert(symbol);
                    }
                }
            }
        }
    }

    // If the original start symbol was folded away, follow the mapping and keep ε
    // derivable from the new start when the original was nullable.
    if let Some(new_start) = head_mapping.get(grammar.start()).cloned() {
        let old_start = grammar.start().clone();
        grammar.set_start(new_start.clone());
        if old_start.nullable() {
            let epsilon = grammar.epsilon_symbol();
            grammar.add_production(new_start.clone(), vec![epsilon]);
            new_start.set_nullable(Tristate::Yes);
        }
    }

    (grammar, head_mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_epsilon_from_simple_optional_rule() {
        let grammar = Grammar::parse("S -> A B\nA -> a | ε\nB -> b").unwrap();
        let result = eliminate_epsilon_rules(&grammar);
        for head in result.heads() {
            for production in result.productions_of(head).unwrap() {
                assert!(production.len() >= 1);
                for symbol in production {
                    assert!(!symbol.is_epsilon() || *head == *result.start());
                }
            }
        }
    }

    #[test]
    fn nullable_start_keeps_a_direct_epsilon_rule() {
        let grammar = Grammar::parse("S -> A A\nA -> a | ε").unwrap();
        let result = eliminate_epsilon_rules(&grammar);
        let start_has_epsilon = result
            .productions_of(result.start())
            .unwrap()
            .iter()
            .any(|p| p.len() == 1 && p.symbols()[0].is_epsilon());
        assert!(start_has_epsilon);
    }

    fn production_names(grammar: &Grammar, head: &Symbol) -> Vec<Vec<String>> {
        grammar
            .productions_of(head)
            .into_iter()
            .flatten()
            .map(|p| p.symbols().iter().map(|s| s.name().to_string()).collect())
            .collect()
    }

    /// S1: `S -> L a M; L -> L M | ε; M -> M M | ε` folds to three nullable-free heads,
    /// each alternative expanded over every combination of its nullable children.
    #[test]
    fn eliminates_nested_optional_symbols_matching_s1() {
        let grammar = Grammar::parse("S -> L a M\nL -> L M\nL -> ε\nM -> M M\nM -> ε").unwrap();
        let result = eliminate_epsilon_rules(&grammar);

        assert_eq!(result.start().name(), "S_1");
        let s1 = result.heads().find(|h| h.name() == "S_1").unwrap().clone();
        let l1 = result.heads().find(|h| h.name() == "L_1").unwrap().clone();
        let m1 = result.heads().find(|h| h.name() == "M_1").unwrap().clone();

        assert_eq!(
            production_names(&result, &s1),
            vec![
                vec!["a".to_string()],
                vec!["L_1".to_string(), "a".to_string()],
                vec!["a".to_string(), "M_1".to_string()],
                vec!["L_1".to_string(), "a".to_string(), "M_1".to_string()],
            ]
        );
        assert_eq!(
            production_names(&result, &l1),
            vec![
                vec!["L_1".to_string()],
                vec!["M_1".to_string()],
                vec!["L_1".to_string(), "M_1".to_string()],
            ]
        );
        assert_eq!(
            production_names(&result, &m1),
            vec![vec!["M_1".to_string()], vec!["M_1".to_string(), "M_1".to_string()]]
        );
    }

    /// S2: a grammar where every head collapses entirely to ε leaves only the (renamed)
    /// start symbol, with a single `-> ε` production.
    #[test]
    fn collapses_an_all_nullable_grammar_to_a_single_epsilon_rule_matching_s2() {
        let grammar = Grammar::parse("S -> L M\nL -> ε\nM -> ε").unwrap();
        let result = eliminate_epsilon_rules(&grammar);

        let heads: Vec<&Symbol> = result.heads().collect();
        assert_eq!(heads.len(), 1);
        assert_eq!(heads[0].name(), "S_1");
        assert_eq!(result.start().name(), "S_1");

        let productions = result.productions_of(result.start()).unwrap();
        assert_eq!(productions.len(), 1);
        let only = productions.iter().next().unwrap();
        assert_eq!(only.len(), 1);
        assert!(only.symbols()[0].is_epsilon());
    }
}
