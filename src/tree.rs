//! The shared parse tree shape returned by both general parsers.

use std::fmt;

/// A parse tree: either a single terminal, or a non-terminal labeled with the production
/// it was derived by and the trees for each symbol on that production's right-hand side.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Tree {
    /// A terminal symbol, matched verbatim.
    Leaf(String),
    /// A non-terminal expansion: the chosen production's pretty form (its right-hand side,
    /// space-separated) and one child tree per symbol on that right-hand side.
    Node(String, Vec<Tree>),
}

impl Tree {
    /// The label at this tree's root: the terminal's own name for a leaf, the production's
    /// pretty form for a node.
    pub fn label(&self) -> &str {
        match self {
            Tree::Leaf(name) => name,
            Tree::Node(name, _) => name,
        }
    }

    /// The leaves of this tree, left to right: the terminal string it derives.
    pub fn yield_symbols(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_yield(&mut out);
        out
    }

    fn collect_yield<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Tree::Leaf(name) => out.push(name),
            Tree::Node(_, children) => {
                for child in children {
                    child.collect_yield(out);
                }
            }
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf(name) => write!(f, "{name}"),
            Tree::Node(name, children) => {
                write!(f, "({name}")?;
                for child in children {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}
