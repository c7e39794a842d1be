//! Chomsky Normal Form conversion: ε-elimination, unit-elimination, then binarization.

use std::collections::HashMap;

use crate::epsilon::eliminate_epsilon_rules_with;
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::unit::eliminate_unit_rules;

/// Converts `grammar` to Chomsky Normal Form: every production is either a single terminal
/// or exactly two non-terminals, and (besides possibly the start symbol) no rule derives ε
/// or is a unit rule.
///
/// When `remove_unreachable` is `true`, heads no longer reachable from the start symbol
/// after ε- and unit-elimination are dropped; callers who need every auxiliary head kept
/// around regardless of reachability (CYK recognition, for instance) should pass `false`.
pub fn to_chomsky_normal_form(grammar: &Grammar, remove_unreachable: bool) -> Grammar {
    to_chomsky_normal_form_impl(grammar, remove_unreachable).0
}

/// As `to_chomsky_normal_form`, but also returns the mapping from original heads to the
/// auxiliary heads ε-elimination folded them into, for callers that need to translate
/// symbols from the original grammar into the transformed one.
pub fn to_chomsky_normal_form_with_mapping(
    grammar: &Grammar,
    remove_unreachable: bool,
) -> (Grammar, HashMap<Symbol, Symbol>) {
    to_chomsky_normal_form_impl(grammar, remove_unreachable)
}

/// As `to_chomsky_normal_form_with_mapping(grammar, false)`; kept as a distinct name at the
/// call sites that rely on this behavior (CYK recognition) so the intent reads without
/// having to recall what the boolean means.
pub(crate) fn to_chomsky_normal_form_keeping_unreachable(
    grammar: &Grammar,
) -> (Grammar, HashMap<Symbol, Symbol>) {
    to_chomsky_normal_form_impl(grammar, false)
}

fn to_chomsky_normal_form_impl(grammar: &Grammar, remove_unreachable: bool) -> (Grammar, HashMap<Symbol, Symbol>) {
    let (grammar, head_mapping) = eliminate_epsilon_rules_with(grammar, true);
    let mut grammar = eliminate_unit_rules(&grammar);
    if remove_unreachable {
        grammar.remove_unreachable();
    }

    let heads: Vec<Symbol> = grammar.heads().cloned().collect();

    // Reuse any existing single-terminal or double-non-terminal production as the
    // canonical binarization helper for that shape, instead of minting a redundant one.
    let mut singles: HashMap<Symbol, Symbol> = HashMap::new();
    let mut duals: HashMap<(Symbol, Symbol), Symbol> = HashMap::new();
    for head in &heads {
        let productions = grammar.productions_of(head).unwrap();
        if productions.len() != 1 {
            continue;
        }
        let production = productions.iter().next().unwrap();
        let symbols = production.symbols();
        if symbols.len() == 1 {
            if grammar.is_terminal(&symbols[0]) {
                singles.insert(symbols[0].clone(), head.clone());
            }
        } else if symbols.len() == 2
            && grammar.is_non_terminal(&symbols[0])
            && grammar.is_non_terminal(&symbols[1])
        {
            duals.insert((symbols[0].clone(), symbols[1].clone()), head.clone());
        }
    }

    for head in &heads {
        let productions = grammar.productions_of(head).cloned().unwrap_or_default();
        grammar.clear_productions(head);
        for production in &productions {
            let symbols = production.symbols();
            if symbols.len() == 1 {
                grammar.add_production(head.clone(), symbols.to_vec());
                continue;
            }
            let mut last = get_or_create_single(&mut grammar, &mut singles, &symbols[0]);
            for symbol in &symbols[1..symbols.len() - 1] {
                let current = get_or_create_single(&mut grammar, &mut singles, symbol);
                last = get_or_create_dual(&mut grammar, &mut duals, &last, &current);
            }
            let tail = get_or_create_single(&mut grammar, &mut singles, &symbols[symbols.len() - 1]);
            grammar.add_production(head.clone(), vec![last, tail]);
        }
    }

    (grammar, head_mapping)
}

/// Returns a non-terminal whose sole alternative is `symbol`, reusing one if a suitable
/// head already exists.
fn get_or_create_single(grammar: &mut Grammar, singles: &mut HashMap<Symbol, Symbol>, symbol: &Symbol) -> Symbol {
    if grammar.is_non_terminal(symbol) {
        return symbol.clone();
    }
    if let Some(head) = singles.get(symbol) {
        return head.clone();
    }
    let head = grammar.create_aux_named("T");
    grammar.add_production(head.clone(), vec![symbol.clone()]);
    singles.insert(symbol.clone(), head.clone());
    head
}

/// Returns a non-terminal whose sole alternative is `a b`, reusing one if it already
/// exists.
fn get_or_create_dual(
    grammar: &mut Grammar,
    duals: &mut HashMap<(Symbol, Symbol), Symbol>,
    a: &Symbol,
    b: &Symbol,
) -> Symbol {
    if let Some(head) = duals.get(&(a.clone(), b.clone())) {
        return head.clone();
    }
    let head = grammar.create_aux_named("N");
    grammar.add_production(head.clone(), vec![a.clone(), b.clone()]);
    duals.insert((a.clone(), b.clone()), head.clone());
    head
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_cnf_shape(grammar: &Grammar) {
        for head in grammar.heads() {
            for production in grammar.productions_of(head).unwrap() {
                let symbols = production.symbols();
                match symbols.len() {
                    1 => assert!(
                        grammar.is_terminal(&symbols[0]) || symbols[0].is_epsilon() || symbols[0] == *head
                    ),
                    2 => {
                        assert!(grammar.is_non_terminal(&symbols[0]));
                        assert!(grammar.is_non_terminal(&symbols[1]));
                    }
                    n => panic!("production of length {n} is not in Chomsky Normal Form"),
                }
            }
        }
    }

    #[test]
    fn binarizes_long_productions() {
        let grammar = Grammar::parse("S -> A B C D\nA -> a\nB -> b\nC -> c\nD -> d").unwrap();
        let cnf = to_chomsky_normal_form(&grammar, true);
        check_cnf_shape(&cnf);
    }

    #[test]
    fn handles_epsilon_and_unit_rules_together() {
        let grammar = Grammar::parse("S -> A B\nA -> a | ε\nB -> C\nC -> b").unwrap();
        let cnf = to_chomsky_normal_form(&grammar, true);
        check_cnf_shape(&cnf);
    }

    #[test]
    fn decimal_number_grammar_reaches_cnf() {
        let grammar = Grammar::parse(
            "Number -> Integer | Integer Fraction\n\
             Integer -> Digit | Digit Integer\n\
             Fraction -> . Integer\n\
             Digit -> 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9",
        )
        .unwrap();
        let cnf = to_chomsky_normal_form(&grammar, true);
        check_cnf_shape(&cnf);
    }

    #[test]
    fn unreachable_heads_survive_when_the_sweep_is_skipped() {
        let grammar = Grammar::parse("S -> a\nUnused -> b").unwrap();
        let swept = to_chomsky_normal_form(&grammar, true);
        assert!(!swept.heads().any(|h| h.name() == "Unused"));
        let kept = to_chomsky_normal_form(&grammar, false);
        assert!(kept.heads().any(|h| h.name() == "Unused"));
    }

    /// S4: binarizing `Fraction -> . Integer` lifts the lone terminal into a fresh
    /// single-symbol head rather than leaving a mixed terminal/non-terminal production.
    #[test]
    fn lifts_the_lone_terminal_in_the_fraction_rule_matching_s4() {
        let grammar = Grammar::parse(
            "Number -> Integer | Integer Fraction\n\
             Integer -> Digit | Digit Integer\n\
             Fraction -> . Integer\n\
             Digit -> 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9",
        )
        .unwrap();
        let cnf = to_chomsky_normal_form(&grammar, true);

        let fraction = cnf.heads().find(|h| h.name() == "Fraction").expect("Fraction head survives").clone();
        let productions = cnf.productions_of(&fraction).unwrap();
        assert_eq!(productions.len(), 1);
        let production = productions.iter().next().unwrap();
        assert_eq!(production.len(), 2);

        let lifted_dot = production.symbols()[0].clone();
        assert_eq!(lifted_dot.name(), "T_1");
        assert_eq!(production.symbols()[1].name(), "Integer");

        let dot_productions = cnf.productions_of(&lifted_dot).unwrap();
        assert_eq!(dot_productions.len(), 1);
        let dot_production = dot_productions.iter().next().unwrap();
        assert_eq!(dot_production.len(), 1);
        assert_eq!(dot_production.symbols()[0].name(), ".");
    }
}
