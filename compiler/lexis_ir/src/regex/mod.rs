//! Regex AST.
//!
//! Produced by the (external) grammar parser and consumed by the NFA
//! builder and the literal trie. The variant set is closed, so every pass
//! matches on [`RegexKind`] exhaustively.

use crate::Location;

/// Highest character the generator handles (end of the BMP).
pub const MAX_CHAR: u32 = 0xFFFF;

/// One item of a character class.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassItem {
    Single(char),
    /// Inclusive range.
    Range(char, char),
}

impl ClassItem {
    #[inline]
    pub fn contains(self, c: char) -> bool {
        match self {
            ClassItem::Single(s) => s == c,
            ClassItem::Range(lo, hi) => lo <= c && c <= hi,
        }
    }

    /// Highest character mentioned by this item.
    #[inline]
    pub fn max_char(self) -> char {
        match self {
            ClassItem::Single(c) | ClassItem::Range(_, c) => c,
        }
    }
}

/// A `[...]` or `~[...]` character class.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct CharClass {
    pub negated: bool,
    pub items: Vec<ClassItem>,
}

impl CharClass {
    pub fn new(items: Vec<ClassItem>) -> Self {
        CharClass {
            negated: false,
            items,
        }
    }

    pub fn negated(items: Vec<ClassItem>) -> Self {
        CharClass {
            negated: true,
            items,
        }
    }

    /// `~[]`: matches any single character.
    pub fn is_wildcard(&self) -> bool {
        self.negated && self.items.is_empty()
    }

    /// Whether the class accepts `c`, ignoring case folding.
    pub fn matches(&self, c: char) -> bool {
        self.items.iter().any(|item| item.contains(c)) != self.negated
    }
}

/// Regex node variants.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum RegexKind {
    Sequence(Vec<RegexNode>),
    Choice(Vec<RegexNode>),
    CharClass(CharClass),
    Literal(String),
    /// `child{min,max}`; `max: None` is unbounded.
    Repetition {
        child: Box<RegexNode>,
        min: u32,
        max: Option<u32>,
    },
    /// `<NAME>`: a use of another (possibly private) token regex.
    Reference(String),
}

/// A regex AST node with its source location.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct RegexNode {
    pub kind: RegexKind,
    pub location: Location,
}

impl RegexNode {
    pub fn new(kind: RegexKind, location: Location) -> Self {
        RegexNode { kind, location }
    }

    /// Set the location of this node.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(RegexKind::Literal(text.into()), Location::DUMMY)
    }

    pub fn class(items: Vec<ClassItem>) -> Self {
        Self::new(RegexKind::CharClass(CharClass::new(items)), Location::DUMMY)
    }

    pub fn negated_class(items: Vec<ClassItem>) -> Self {
        Self::new(
            RegexKind::CharClass(CharClass::negated(items)),
            Location::DUMMY,
        )
    }

    /// `[lo-hi]`
    pub fn range(lo: char, hi: char) -> Self {
        Self::class(vec![ClassItem::Range(lo, hi)])
    }

    /// `~[]`
    pub fn any() -> Self {
        Self::negated_class(Vec::new())
    }

    pub fn seq(children: Vec<RegexNode>) -> Self {
        Self::new(RegexKind::Sequence(children), Location::DUMMY)
    }

    pub fn choice(alternatives: Vec<RegexNode>) -> Self {
        Self::new(RegexKind::Choice(alternatives), Location::DUMMY)
    }

    pub fn repeat(child: RegexNode, min: u32, max: Option<u32>) -> Self {
        Self::new(
            RegexKind::Repetition {
                child: Box::new(child),
                min,
                max,
            },
            Location::DUMMY,
        )
    }

    /// `(child)*`
    pub fn star(child: RegexNode) -> Self {
        Self::repeat(child, 0, None)
    }

    /// `(child)+`
    pub fn plus(child: RegexNode) -> Self {
        Self::repeat(child, 1, None)
    }

    /// `(child)?`
    pub fn opt(child: RegexNode) -> Self {
        Self::repeat(child, 0, Some(1))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(RegexKind::Reference(name.into()), Location::DUMMY)
    }

    /// The literal text, if this node is a string literal.
    pub fn as_literal(&self) -> Option<&str> {
        match &self.kind {
            RegexKind::Literal(text) => Some(text),
            _ => None,
        }
    }

    /// `~[]` at the top level.
    pub fn is_wildcard(&self) -> bool {
        matches!(&self.kind, RegexKind::CharClass(class) if class.is_wildcard())
    }

    /// Visit this node and all descendants in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a RegexNode)) {
        f(self);
        match &self.kind {
            RegexKind::Sequence(children) | RegexKind::Choice(children) => {
                for child in children {
                    child.walk(f);
                }
            }
            RegexKind::Repetition { child, .. } => child.walk(f),
            RegexKind::CharClass(_) | RegexKind::Literal(_) | RegexKind::Reference(_) => {}
        }
    }
}
