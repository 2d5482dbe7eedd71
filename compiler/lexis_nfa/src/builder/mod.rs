//! Thompson construction from regex AST nodes.
//!
//! Every construct produces an [`NfaFragment`] whose `end` state has no
//! character moves, so splicing fragments with epsilon edges never gives
//! a state both real transitions and outgoing epsilon moves.

use rustc_hash::FxHashMap;
use thiserror::Error;

use lexis_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use lexis_ir::{case, CharClass, ClassItem, Location, RegexKind, RegexNode, TokenRegex, MAX_CHAR};
use lexis_stack::ensure_sufficient_stack;

use crate::{GraphBuilder, StateId};

/// Characters at or above this need a unicode-aware input stream.
const NON_ASCII_START: u32 = 256;

const SURROGATES: (u32, u32) = (0xD800, 0xDFFF);

/// Entry and exit states of a built regex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NfaFragment {
    pub start: StateId,
    pub end: StateId,
}

/// Errors that stop NFA construction for a regex.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("undefined lexical token name \"{name}\"")]
    UndefinedReference { name: String, location: Location },

    #[error("loop in regular expression references through \"{name}\"")]
    ReferenceCycle { name: String, location: Location },

    #[error("character U+{code:04X} is outside the Basic Multilingual Plane")]
    CharOutOfRange { code: u32, location: Location },

    #[error("invalid repetition bounds {{{min},{max}}}")]
    InvalidBounds {
        min: u32,
        max: u32,
        location: Location,
    },

    #[error("invalid character range {lo:?}-{hi:?}")]
    InvertedRange {
        lo: char,
        hi: char,
        location: Location,
    },
}

impl BuildError {
    pub fn code(&self) -> ErrorCode {
        match self {
            BuildError::UndefinedReference { .. } => ErrorCode::E0101,
            BuildError::ReferenceCycle { .. } => ErrorCode::E0110,
            BuildError::CharOutOfRange { .. } => ErrorCode::E0111,
            BuildError::InvalidBounds { .. } | BuildError::InvertedRange { .. } => ErrorCode::E0112,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            BuildError::UndefinedReference { location, .. }
            | BuildError::ReferenceCycle { location, .. }
            | BuildError::CharOutOfRange { location, .. }
            | BuildError::InvalidBounds { location, .. }
            | BuildError::InvertedRange { location, .. } => *location,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(self.location(), "in this regular expression")
    }
}

/// What the builder needs beyond the node itself.
pub struct BuildContext<'a> {
    /// Labelled regexes, for resolving references.
    named: &'a FxHashMap<&'a str, &'a TokenRegex>,
    unicode_input: bool,
    diagnostics: &'a mut DiagnosticQueue,
    /// References currently being expanded, innermost last.
    active: Vec<String>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        named: &'a FxHashMap<&'a str, &'a TokenRegex>,
        unicode_input: bool,
        diagnostics: &'a mut DiagnosticQueue,
    ) -> Self {
        BuildContext {
            named,
            unicode_input,
            diagnostics,
            active: Vec::new(),
        }
    }

    /// Validate a character written in the grammar.
    fn check_char(&mut self, c: char, location: Location) -> Result<(), BuildError> {
        let code = u32::from(c);
        if code > MAX_CHAR {
            return Err(BuildError::CharOutOfRange { code, location });
        }
        if code >= NON_ASCII_START && !self.unicode_input {
            self.diagnostics.warn_once(
                Diagnostic::warning(ErrorCode::W0001)
                    .with_message("non-ASCII characters used in regular expression")
                    .with_label(location, "character above U+00FF")
                    .with_note(
                        "enable unicode input so the tokenizer reads characters, not bytes",
                    ),
            );
        }
        Ok(())
    }
}

/// One alternative of a flattened choice.
enum Alternative<'r> {
    /// Placeholder for the merged character class.
    Class,
    Node(&'r RegexNode),
}

impl GraphBuilder {
    /// Build `node` into a fresh fragment.
    pub fn build(
        &mut self,
        node: &RegexNode,
        ignore_case: bool,
        cx: &mut BuildContext<'_>,
    ) -> Result<NfaFragment, BuildError> {
        ensure_sufficient_stack(|| match &node.kind {
            RegexKind::Literal(text) => self.build_literal(text, node.location, ignore_case, cx),
            RegexKind::CharClass(class) => {
                let ranges = class_ranges(class, ignore_case, node.location, cx)?;
                Ok(self.build_class(&ranges))
            }
            RegexKind::Sequence(children) => {
                let mut acc = None;
                for child in children {
                    let fragment = self.build(child, ignore_case, cx)?;
                    acc = Some(self.splice(acc, fragment));
                }
                Ok(acc.unwrap_or_else(|| self.empty_fragment()))
            }
            RegexKind::Choice(alternatives) => self.build_choice(alternatives, ignore_case, cx),
            RegexKind::Repetition { child, min, max } => {
                self.build_repetition(child, *min, *max, node.location, ignore_case, cx)
            }
            RegexKind::Reference(name) => {
                let named = cx.named;
                let Some(target) = named.get(name.as_str()).copied() else {
                    return Err(BuildError::UndefinedReference {
                        name: name.clone(),
                        location: node.location,
                    });
                };
                if cx.active.iter().any(|active| active == name) {
                    return Err(BuildError::ReferenceCycle {
                        name: name.clone(),
                        location: node.location,
                    });
                }
                cx.active.push(name.clone());
                let result = self.build(&target.node, ignore_case, cx);
                cx.active.pop();
                result
            }
        })
    }

    /// A single state matching the empty string.
    fn empty_fragment(&mut self) -> NfaFragment {
        let state = self.new_state();
        NfaFragment {
            start: state,
            end: state,
        }
    }

    fn splice(&mut self, acc: Option<NfaFragment>, next: NfaFragment) -> NfaFragment {
        match acc {
            None => next,
            Some(acc) => {
                self.add_epsilon(acc.end, next.start);
                NfaFragment {
                    start: acc.start,
                    end: next.end,
                }
            }
        }
    }

    /// A chain with one state per character. A one-character literal is
    /// the same shape as a single-character class.
    fn build_literal(
        &mut self,
        text: &str,
        location: Location,
        ignore_case: bool,
        cx: &mut BuildContext<'_>,
    ) -> Result<NfaFragment, BuildError> {
        for c in text.chars() {
            cx.check_char(c, location)?;
        }
        let start = self.new_state();
        let mut current = start;
        for c in text.chars() {
            let next = self.new_state();
            let state = &mut self.states[current.index()];
            if ignore_case {
                for variant in case::case_variants(c) {
                    state.add_char(variant);
                }
            } else {
                state.add_char(c);
            }
            state.next = Some(next);
            current = next;
        }
        Ok(NfaFragment {
            start,
            end: current,
        })
    }

    /// One state carrying every range, moving to a fresh end state.
    fn build_class(&mut self, ranges: &[(u32, u32)]) -> NfaFragment {
        let start = self.new_state();
        let end = self.new_state();
        let state = &mut self.states[start.index()];
        for &(lo, hi) in ranges {
            for (lo, hi) in without_surrogates(lo, hi) {
                if let (Some(lo), Some(hi)) = (char::from_u32(lo), char::from_u32(hi)) {
                    state.add_range(lo, hi);
                }
            }
        }
        state.next = Some(end);
        NfaFragment { start, end }
    }

    /// Flatten nested choices, merge every single-character alternative
    /// into one class, and fan out over what remains.
    fn build_choice(
        &mut self,
        alternatives: &[RegexNode],
        ignore_case: bool,
        cx: &mut BuildContext<'_>,
    ) -> Result<NfaFragment, BuildError> {
        let mut flat = Vec::new();
        let mut visiting = Vec::new();
        flatten_choice(alternatives, cx.named, &cx.active, &mut visiting, &mut flat)?;

        let mut parts = Vec::with_capacity(flat.len());
        let mut merged: Option<Vec<(u32, u32)>> = None;
        for alt in flat {
            let ranges = match &alt.kind {
                RegexKind::CharClass(class) => class_ranges(class, ignore_case, alt.location, cx)?,
                RegexKind::Literal(text) if text.chars().count() == 1 => {
                    let class = CharClass::new(text.chars().map(ClassItem::Single).collect());
                    class_ranges(&class, ignore_case, alt.location, cx)?
                }
                _ => {
                    parts.push(Alternative::Node(alt));
                    continue;
                }
            };
            match &mut merged {
                Some(existing) => existing.extend(ranges),
                None => {
                    merged = Some(ranges);
                    parts.push(Alternative::Class);
                }
            }
        }
        let merged = normalize(merged.unwrap_or_default());

        if let [only] = parts.as_slice() {
            return match only {
                Alternative::Class => Ok(self.build_class(&merged)),
                Alternative::Node(node) => self.build(node, ignore_case, cx),
            };
        }

        let start = self.new_state();
        let end = self.new_state();
        for part in &parts {
            let fragment = match part {
                Alternative::Class => self.build_class(&merged),
                Alternative::Node(node) => self.build(node, ignore_case, cx)?,
            };
            self.add_epsilon(start, fragment.start);
            self.add_epsilon(fragment.end, end);
        }
        Ok(NfaFragment { start, end })
    }

    fn build_repetition(
        &mut self,
        child: &RegexNode,
        min: u32,
        max: Option<u32>,
        location: Location,
        ignore_case: bool,
        cx: &mut BuildContext<'_>,
    ) -> Result<NfaFragment, BuildError> {
        if let Some(max) = max {
            if max < min {
                return Err(BuildError::InvalidBounds { min, max, location });
            }
        }
        match (min, max) {
            (0, None) => self.zero_or_more(child, ignore_case, cx),
            (1, None) => {
                let start = self.new_state();
                let end = self.new_state();
                let inner = self.build(child, ignore_case, cx)?;
                self.add_epsilon(start, inner.start);
                self.add_epsilon(inner.end, inner.start);
                self.add_epsilon(inner.end, end);
                Ok(NfaFragment { start, end })
            }
            (0, Some(1)) => self.zero_or_one(child, ignore_case, cx),
            _ => {
                let mut acc = None;
                for _ in 0..min {
                    let copy = self.build(child, ignore_case, cx)?;
                    acc = Some(self.splice(acc, copy));
                }
                match max {
                    None => {
                        let tail = self.zero_or_more(child, ignore_case, cx)?;
                        acc = Some(self.splice(acc, tail));
                    }
                    Some(max) => {
                        for _ in min..max {
                            let tail = self.zero_or_one(child, ignore_case, cx)?;
                            acc = Some(self.splice(acc, tail));
                        }
                    }
                }
                Ok(acc.unwrap_or_else(|| self.empty_fragment()))
            }
        }
    }

    fn zero_or_more(
        &mut self,
        child: &RegexNode,
        ignore_case: bool,
        cx: &mut BuildContext<'_>,
    ) -> Result<NfaFragment, BuildError> {
        let start = self.new_state();
        let end = self.new_state();
        let inner = self.build(child, ignore_case, cx)?;
        self.add_epsilon(start, inner.start);
        self.add_epsilon(start, end);
        self.add_epsilon(inner.end, end);
        self.add_epsilon(inner.end, inner.start);
        Ok(NfaFragment { start, end })
    }

    fn zero_or_one(
        &mut self,
        child: &RegexNode,
        ignore_case: bool,
        cx: &mut BuildContext<'_>,
    ) -> Result<NfaFragment, BuildError> {
        let start = self.new_state();
        let end = self.new_state();
        let inner = self.build(child, ignore_case, cx)?;
        self.add_epsilon(start, inner.start);
        self.add_epsilon(start, end);
        self.add_epsilon(inner.end, end);
        Ok(NfaFragment { start, end })
    }
}

/// Collect the alternatives of `alternatives`, expanding nested choices
/// and references to choices in place.
fn flatten_choice<'r>(
    alternatives: &'r [RegexNode],
    named: &'r FxHashMap<&'r str, &'r TokenRegex>,
    active: &[String],
    visiting: &mut Vec<&'r str>,
    out: &mut Vec<&'r RegexNode>,
) -> Result<(), BuildError> {
    for alt in alternatives {
        match &alt.kind {
            RegexKind::Choice(inner) => flatten_choice(inner, named, active, visiting, out)?,
            RegexKind::Reference(name) => {
                let target = named.get(name.as_str()).copied();
                let Some(RegexKind::Choice(inner)) = target.map(|t| &t.node.kind) else {
                    out.push(alt);
                    continue;
                };
                if visiting.contains(&name.as_str()) || active.iter().any(|a| a == name) {
                    return Err(BuildError::ReferenceCycle {
                        name: name.clone(),
                        location: alt.location,
                    });
                }
                visiting.push(name);
                flatten_choice(inner, named, active, visiting, out)?;
                visiting.pop();
            }
            _ => out.push(alt),
        }
    }
    Ok(())
}

/// The characters a class accepts, as sorted disjoint inclusive ranges.
///
/// Case folding is applied to the written items before negation.
fn class_ranges(
    class: &CharClass,
    ignore_case: bool,
    location: Location,
    cx: &mut BuildContext<'_>,
) -> Result<Vec<(u32, u32)>, BuildError> {
    let mut ranges = Vec::with_capacity(class.items.len());
    for item in &class.items {
        let (lo, hi) = match *item {
            ClassItem::Single(c) => (c, c),
            ClassItem::Range(lo, hi) => (lo, hi),
        };
        if lo > hi {
            return Err(BuildError::InvertedRange { lo, hi, location });
        }
        cx.check_char(hi, location)?;
        ranges.push((u32::from(lo), u32::from(hi)));
    }
    if ignore_case {
        ranges = case_neutral(&ranges);
    }
    let ranges = normalize(ranges);
    Ok(if class.negated {
        complement(&ranges)
    } else {
        ranges
    })
}

/// Add the other-case variant of every character in `ranges`.
fn case_neutral(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut out = ranges.to_vec();
    for &(lo, hi) in ranges {
        for c in (lo..=hi).filter_map(char::from_u32) {
            for variant in case::case_variants(c).into_iter().skip(1) {
                let code = u32::from(variant);
                out.push((code, code));
            }
        }
    }
    out
}

/// Sort and coalesce overlapping or adjacent ranges.
fn normalize(mut ranges: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    ranges.sort_unstable();
    let mut out: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for (lo, hi) in ranges {
        match out.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => out.push((lo, hi)),
        }
    }
    out
}

/// Complement of normalized `ranges` over `0..=MAX_CHAR`.
fn complement(ranges: &[(u32, u32)]) -> Vec<(u32, u32)> {
    let mut out = Vec::with_capacity(ranges.len() + 1);
    let mut from = 0;
    for &(lo, hi) in ranges {
        if lo > from {
            out.push((from, lo - 1));
        }
        from = hi + 1;
    }
    if from <= MAX_CHAR {
        out.push((from, MAX_CHAR));
    }
    out
}

/// Split `lo..=hi` around the surrogate block, which has no `char`s.
fn without_surrogates(lo: u32, hi: u32) -> impl Iterator<Item = (u32, u32)> {
    let (s_lo, s_hi) = SURROGATES;
    let below = (lo < s_lo).then(|| (lo, hi.min(s_lo - 1)));
    let above = (hi > s_hi).then(|| (lo.max(s_hi + 1), hi));
    below.into_iter().chain(above)
}
