//! Lexical grammar model.
//!
//! A [`Grammar`] is the boundary with the (external) grammar parser: an
//! ordered list of lexical state names and an ordered list of token
//! productions. [`GrammarBuilder`] constructs one programmatically and
//! assigns ordinals in declaration order.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{Location, Ordinal, RegexNode};

/// Name of the lexical state used when a grammar declares none.
pub const DEFAULT_LEX_STATE: &str = "DEFAULT";

/// How a matched token is treated by the scanner.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ProductionKind {
    /// Returned to the parser.
    Token,
    /// Discarded.
    Skip,
    /// Kept as a prefix of the next token.
    More,
    /// Discarded but attached to the next token as a special token.
    Special,
}

impl fmt::Display for ProductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProductionKind::Token => "TOKEN",
            ProductionKind::Skip => "SKIP",
            ProductionKind::More => "MORE",
            ProductionKind::Special => "SPECIAL_TOKEN",
        })
    }
}

/// A regex with its token identity.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenRegex {
    pub ordinal: Ordinal,
    pub label: Option<String>,
    /// `#NAME` regexes are only usable through references.
    pub private: bool,
    pub node: RegexNode,
}

impl TokenRegex {
    /// Label for messages: `<NAME>` or the literal image.
    pub fn display_name(&self) -> String {
        match (&self.label, self.node.as_literal()) {
            (Some(label), _) => label.clone(),
            (None, Some(text)) => format!("\"{text}\""),
            (None, None) => format!("token of kind {}", self.ordinal),
        }
    }

    pub fn location(&self) -> Location {
        self.node.location
    }
}

/// What a spec matches.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Pattern {
    Regex(TokenRegex),
    /// `<EOF>`: carries the end-of-input action and state change.
    EndOfFile,
}

/// User code attached to a spec, kept as opaque tokens.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub tokens: Vec<String>,
}

impl Action {
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Action {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// One `pattern [: NEXT_STATE] { action }` entry of a production.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct RegexSpec {
    pub pattern: Pattern,
    pub next_state: Option<String>,
    pub action: Option<Action>,
    pub location: Location,
}

impl RegexSpec {
    pub fn regex(&self) -> Option<&TokenRegex> {
        match &self.pattern {
            Pattern::Regex(re) => Some(re),
            Pattern::EndOfFile => None,
        }
    }

    /// The action, treating an empty token list as no action.
    pub fn effective_action(&self) -> Option<&Action> {
        self.action.as_ref().filter(|a| !a.is_empty())
    }
}

/// A `TOKEN`/`SKIP`/`MORE`/`SPECIAL_TOKEN` block.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenProduction {
    pub kind: ProductionKind,
    /// `None` means every lexical state (`<*>`).
    pub lexical_states: Option<Vec<String>>,
    pub ignore_case: bool,
    pub specs: Vec<RegexSpec>,
    pub location: Location,
}

impl TokenProduction {
    pub fn applies_to_all_states(&self) -> bool {
        self.lexical_states.is_none()
    }
}

/// A complete lexical grammar.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Grammar {
    /// Declared lexical states; index 0 is the default state.
    pub lexical_states: Vec<String>,
    pub productions: Vec<TokenProduction>,
}

impl Grammar {
    pub fn lexical_state_index(&self, name: &str) -> Option<usize> {
        self.lexical_states.iter().position(|s| s == name)
    }

    /// Indices of the lexical states a production applies to.
    ///
    /// Undefined names are skipped; the semantic checks report them.
    pub fn states_of(&self, production: &TokenProduction) -> Vec<usize> {
        match &production.lexical_states {
            None => (0..self.lexical_states.len()).collect(),
            Some(names) => names
                .iter()
                .filter_map(|n| self.lexical_state_index(n))
                .collect(),
        }
    }

    /// Every token regex with the production that declares it.
    pub fn token_regexes(&self) -> impl Iterator<Item = (&TokenProduction, &TokenRegex)> {
        self.productions
            .iter()
            .flat_map(|p| p.specs.iter().filter_map(move |s| s.regex().map(|re| (p, re))))
    }

    /// Labelled regexes by label. The first declaration wins.
    pub fn named_regexes(&self) -> FxHashMap<&str, &TokenRegex> {
        let mut named = FxHashMap::default();
        for (_, re) in self.token_regexes() {
            if let Some(label) = &re.label {
                named.entry(label.as_str()).or_insert(re);
            }
        }
        named
    }

    /// Highest ordinal in use (0 if there are no regexes).
    pub fn max_ordinal(&self) -> Ordinal {
        self.token_regexes()
            .map(|(_, re)| re.ordinal)
            .max()
            .unwrap_or(Ordinal::EOF)
    }
}

/// Builds a [`Grammar`], assigning ordinals in declaration order from 1.
#[derive(Clone, Debug)]
pub struct GrammarBuilder {
    lexical_states: Vec<String>,
    productions: Vec<TokenProduction>,
    next_ordinal: u32,
}

impl Default for GrammarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarBuilder {
    /// A builder with only the `DEFAULT` lexical state.
    pub fn new() -> Self {
        GrammarBuilder {
            lexical_states: vec![DEFAULT_LEX_STATE.to_owned()],
            productions: Vec::new(),
            next_ordinal: 1,
        }
    }

    /// Declare another lexical state (no-op if already declared).
    pub fn lexical_state(&mut self, name: &str) -> &mut Self {
        if !self.lexical_states.iter().any(|s| s == name) {
            self.lexical_states.push(name.to_owned());
        }
        self
    }

    /// Start a production of the given kind in the default state.
    pub fn production(&mut self, kind: ProductionKind) -> ProductionBuilder<'_> {
        let default = self.lexical_states[0].clone();
        ProductionBuilder {
            production: TokenProduction {
                kind,
                lexical_states: Some(vec![default]),
                ignore_case: false,
                specs: Vec::new(),
                location: Location::DUMMY,
            },
            ordinals: Vec::new(),
            grammar: self,
        }
    }

    pub fn build(self) -> Grammar {
        Grammar {
            lexical_states: self.lexical_states,
            productions: self.productions,
        }
    }

    fn next_ordinal(&mut self) -> Ordinal {
        let ordinal = Ordinal::new(self.next_ordinal);
        self.next_ordinal += 1;
        ordinal
    }
}

/// Adds specs to one production; call [`ProductionBuilder::finish`].
#[must_use = "call `finish` to add the production to the grammar"]
pub struct ProductionBuilder<'g> {
    grammar: &'g mut GrammarBuilder,
    production: TokenProduction,
    ordinals: Vec<Ordinal>,
}

impl ProductionBuilder<'_> {
    /// Restrict the production to the named lexical states.
    pub fn in_states(mut self, names: &[&str]) -> Self {
        self.production.lexical_states = Some(names.iter().map(|s| (*s).to_owned()).collect());
        self
    }

    /// Apply the production to every lexical state (`<*>`).
    pub fn all_states(mut self) -> Self {
        self.production.lexical_states = None;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.production.ignore_case = true;
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.production.location = location;
        self
    }

    /// Add an unlabelled regex.
    pub fn regex(self, node: RegexNode) -> Self {
        self.push_regex(None, false, node)
    }

    /// Add a `<LABEL: regex>` spec.
    pub fn labeled(self, label: &str, node: RegexNode) -> Self {
        self.push_regex(Some(label), false, node)
    }

    /// Add a `<#LABEL: regex>` spec.
    pub fn private(self, label: &str, node: RegexNode) -> Self {
        self.push_regex(Some(label), true, node)
    }

    /// Add an `<EOF>` spec.
    pub fn eof(mut self) -> Self {
        self.production.specs.push(RegexSpec {
            pattern: Pattern::EndOfFile,
            next_state: None,
            action: None,
            location: self.production.location,
        });
        self
    }

    /// Set the lexical state change of the most recent spec.
    pub fn next_state(mut self, name: &str) -> Self {
        if let Some(spec) = self.production.specs.last_mut() {
            spec.next_state = Some(name.to_owned());
        }
        self
    }

    /// Set the action of the most recent spec.
    pub fn action(mut self, tokens: &[&str]) -> Self {
        if let Some(spec) = self.production.specs.last_mut() {
            spec.action = Some(Action::new(tokens.iter().copied()));
        }
        self
    }

    /// Add the production and return the ordinals of its regex specs.
    pub fn finish(self) -> Vec<Ordinal> {
        self.grammar.productions.push(self.production);
        self.ordinals
    }

    fn push_regex(mut self, label: Option<&str>, private: bool, node: RegexNode) -> Self {
        let ordinal = self.grammar.next_ordinal();
        let location = node.location;
        self.production.specs.push(RegexSpec {
            pattern: Pattern::Regex(TokenRegex {
                ordinal,
                label: label.map(str::to_owned),
                private,
                node,
            }),
            next_state: None,
            action: None,
            location,
        });
        self.ordinals.push(ordinal);
        self
    }
}

#[cfg(test)]
mod tests;
