//! General top-down parsing by Unger's method: try every way of carving up a span among a
//! production's symbols, memoized on `(symbol, start, stop)`.
//!
//! Unlike `cyk`, this works on any grammar directly: no normal form is required, at the
//! cost of being exponential in the length of the longest production.

use std::collections::HashMap;

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::tree::Tree;

/// Parses `sentence` against `grammar` with Unger's method, returning the first parse tree
/// found, or `None` if `sentence` isn't in the language.
pub fn parse_with_unger(grammar: &Grammar, sentence: &str) -> Option<Tree> {
    let mut grammar = grammar.clone();
    grammar.init_nullable();
    grammar.init_min_length();
    let sentence_chars: Vec<char> = sentence.chars().collect();
    let n = sentence_chars.len();
    let mut history: HashMap<(Symbol, usize, usize), Option<Tree>> = HashMap::new();
    let start = grammar.start().clone();
    parse_symbol(&grammar, &sentence_chars, &mut history, &start, 0, n)
}

/// Every way to split the half-open span `[start, stop)` into `parts` ordered,
/// possibly-empty, contiguous pieces, expressed as piece lengths. Enumeration order matters:
/// callers take the first division that validates, so this must produce the same order every
/// time for a parse to be deterministic.
fn divide(start: usize, stop: usize, parts: usize) -> Vec<Vec<usize>> {
    if parts == 1 {
        return vec![vec![stop - start]];
    }
    let mut out = Vec::new();
    for i in start..=stop {
        for mut rest in divide(i, stop, parts - 1) {
            let mut division = vec![i - start];
            division.append(&mut rest);
            out.push(division);
        }
    }
    out
}

fn parse_symbol(
    grammar: &Grammar,
    sentence: &[char],
    history: &mut HashMap<(Symbol, usize, usize), Option<Tree>>,
    symbol: &Symbol,
    start: usize,
    stop: usize,
) -> Option<Tree> {
    let key = (symbol.clone(), start, stop);
    if let Some(cached) = history.get(&key) {
        return cached.clone();
    }
    history.insert(key.clone(), None);

    let mut result = None;
    if symbol.is_epsilon() {
        if start == stop {
            result = Some(Tree::Leaf(symbol.display_name().to_string()));
        }
    } else if grammar.is_terminal(symbol) {
        if stop >= start && stop <= sentence.len() {
            let span: String = sentence[start..stop].iter().collect();
            if symbol.name() == span {
                result = Some(Tree::Leaf(symbol.display_name().to_string()));
            }
        }
    } else {
        'productions: for production in grammar.productions_of(symbol).into_iter().flatten() {
            let symbols = production.symbols();
            for division in divide(start, stop, symbols.len()) {
                let all_valid = symbols.iter().zip(&division).all(|(sym, &div)| {
                    if div == 0 && !sym.nullable() {
                        return false;
                    }
                    div >= sym.min_length()
                });
                if !all_valid {
                    continue;
                }

                let mut children = Vec::with_capacity(symbols.len());
                let mut sub_start = start;
                let mut division_ok = true;
                for (sym, &div) in symbols.iter().zip(&division) {
                    let sub_stop = sub_start + div;
                    match parse_symbol(grammar, sentence, history, sym, sub_start, sub_stop) {
                        Some(tree) => {
                            children.push(tree);
                            sub_start = sub_stop;
                        }
                        None => {
                            division_ok = false;
                            break;
                        }
                    }
                }
                if division_ok {
                    result = Some(Tree::Node(production.pretty(), children));
                    break 'productions;
                }
            }
        }
    }

    history.insert(key, result.clone());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_a_sentence_in_the_language() {
        let grammar = Grammar::parse("S -> a S b | ε").unwrap();
        let tree = parse_with_unger(&grammar, "aabb").unwrap();
        assert_eq!(tree.yield_symbols(), vec!["a", "a", "b", "b"]);
    }

    #[test]
    fn rejects_a_sentence_outside_the_language() {
        let grammar = Grammar::parse("S -> a S b | ε").unwrap();
        assert!(parse_with_unger(&grammar, "aab").is_none());
    }

    #[test]
    fn handles_ambiguous_grammars_by_taking_the_first_match() {
        let grammar = Grammar::parse("S -> S S | a").unwrap();
        let tree = parse_with_unger(&grammar, "aaa").unwrap();
        assert_eq!(tree.yield_symbols(), vec!["a", "a", "a"]);
    }

    #[test]
    fn agrees_with_cyk_on_a_shared_grammar() {
        let grammar = Grammar::parse("Digits -> Digit Digits | Digit\nDigit -> 0 | 1").unwrap();
        let unger_tree = parse_with_unger(&grammar, "101").unwrap();
        let cyk_tree = crate::cyk::parse_with_cyk(&grammar, "101").unwrap();
        assert_eq!(unger_tree.yield_symbols(), cyk_tree.yield_symbols());
    }

    /// S6: Unger on the usual expression grammar against "(i+i)×i" picks `Term`'s left-recursive
    /// branch at the top, descending through a parenthesized `Expr + Term` before the final `×i`.
    #[test]
    fn parses_the_expression_grammar_matching_s6() {
        let grammar = Grammar::parse(
            "Expr -> Expr + Term | Term\n\
             Term -> Term × Factor | Factor\n\
             Factor -> ( Expr ) | i",
        )
        .unwrap();
        let tree = parse_with_unger(&grammar, "(i+i)×i").unwrap();

        let i_factor = Tree::Node("Factor".to_string(), vec![Tree::Node("i".to_string(), vec![Tree::Leaf("i".to_string())])]);
        let expected = Tree::Node(
            "Term".to_string(),
            vec![Tree::Node(
                "Term × Factor".to_string(),
                vec![
                    Tree::Node(
                        "Factor".to_string(),
                        vec![Tree::Node(
                            "( Expr )".to_string(),
                            vec![
                                Tree::Leaf("(".to_string()),
                                Tree::Node(
                                    "Expr + Term".to_string(),
                                    vec![
                                        Tree::Node("Term".to_string(), vec![i_factor.clone()]),
                                        Tree::Leaf("+".to_string()),
                                        i_factor.clone(),
                                    ],
                                ),
                                Tree::Leaf(")".to_string()),
                            ],
                        )],
                    ),
                    Tree::Leaf("×".to_string()),
                    i_factor,
                ],
            )],
        );
        assert_eq!(tree, expected);
    }

    /// S7: Unger on `S -> L S D | ε; L -> ε; D -> d` against "dd" recurses through a nested
    /// `L S D` for the inner "d", with every node labeled by its production's right-hand side.
    #[test]
    fn parses_the_optional_leader_grammar_matching_s7() {
        let grammar = Grammar::parse("S -> L S D | ε\nL -> ε\nD -> d").unwrap();
        let tree = parse_with_unger(&grammar, "dd").unwrap();

        let empty = || Tree::Node("ε".to_string(), vec![Tree::Leaf("ε".to_string())]);
        let d = || Tree::Node("d".to_string(), vec![Tree::Leaf("d".to_string())]);
        let expected = Tree::Node(
            "L S D".to_string(),
            vec![
                empty(),
                Tree::Node("L S D".to_string(), vec![empty(), empty(), d()]),
                d(),
            ],
        );
        assert_eq!(tree, expected);
    }
}
