//! Semantic checks on the lexical grammar.
//!
//! Everything here is build-fatal except the IGNORE_CASE overlap warning
//! (W0005). Assembly only runs on a grammar that passed.

use rustc_hash::{FxHashMap, FxHashSet};

use lexis_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode, ErrorGuaranteed};
use lexis_ir::{
    case, ClassItem, Grammar, Location, Pattern, ProductionKind, RegexKind, RegexNode, TokenRegex,
    MAX_CHAR,
};
use lexis_nfa::BuildError;
use lexis_stack::ensure_sufficient_stack;

use crate::GeneratorOptions;

/// Run every check, reporting into `diagnostics`.
#[tracing::instrument(level = "debug", skip_all, fields(productions = grammar.productions.len()))]
pub(crate) fn check_grammar(
    grammar: &Grammar,
    options: &GeneratorOptions,
    diagnostics: &mut DiagnosticQueue,
) -> Result<(), ErrorGuaranteed> {
    check_lexical_states(grammar, diagnostics);
    check_end_of_file(grammar, diagnostics);
    check_labels(grammar, diagnostics);
    check_regexes(grammar, diagnostics);
    check_reference_loops(grammar, diagnostics);
    check_string_literals(grammar, options, diagnostics);

    match diagnostics.has_errors() {
        Some(guar) => Err(guar),
        None => Ok(()),
    }
}

fn undefined_state(name: &str, location: Location) -> Diagnostic {
    Diagnostic::error(ErrorCode::E0107)
        .with_message(format!("Lexical state \"{name}\" has not been defined."))
        .with_label(location, "unknown lexical state")
}

fn check_lexical_states(grammar: &Grammar, diagnostics: &mut DiagnosticQueue) {
    for production in &grammar.productions {
        for name in production.lexical_states.iter().flatten() {
            if grammar.lexical_state_index(name).is_none() {
                diagnostics.emit_error(undefined_state(name, production.location));
            }
        }
        for spec in &production.specs {
            if let Some(name) = &spec.next_state {
                if grammar.lexical_state_index(name).is_none() {
                    diagnostics.emit_error(undefined_state(name, spec.location));
                }
            }
        }
    }
}

fn check_end_of_file(grammar: &Grammar, diagnostics: &mut DiagnosticQueue) {
    let mut earlier: Option<Location> = None;
    for production in &grammar.productions {
        for spec in &production.specs {
            if spec.pattern != Pattern::EndOfFile {
                continue;
            }
            if !production.applies_to_all_states() {
                diagnostics.emit_error(
                    Diagnostic::error(ErrorCode::E0104)
                        .with_message(
                            "EOF action/state change must be specified for all states, i.e., <*>TOKEN:.",
                        )
                        .with_label(spec.location, "declared for some lexical states only"),
                );
            }
            if production.kind != ProductionKind::Token {
                diagnostics.emit_error(
                    Diagnostic::error(ErrorCode::E0105)
                        .with_message(
                            "EOF action/state change can be specified only in a TOKEN specification.",
                        )
                        .with_label(spec.location, format!("declared in a {} production", production.kind)),
                );
            }
            if let Some(first) = earlier {
                diagnostics.emit_error(
                    Diagnostic::error(ErrorCode::E0106)
                        .with_message("Duplicate action/state change specification for <EOF>.")
                        .with_label(spec.location, "second specification")
                        .with_secondary_label(first, "first specification"),
                );
            }
            if spec.next_state.is_some() || spec.effective_action().is_some() {
                earlier = Some(spec.location);
            }
        }
    }
}

fn check_labels(grammar: &Grammar, diagnostics: &mut DiagnosticQueue) {
    let mut seen: FxHashMap<&str, Location> = FxHashMap::default();
    for (_, re) in grammar.token_regexes() {
        let Some(label) = re.label.as_deref() else {
            continue;
        };
        if let Some(&first) = seen.get(label) {
            diagnostics.emit_error(
                Diagnostic::error(ErrorCode::E0108)
                    .with_message(format!("Multiply defined lexical token name \"{label}\"."))
                    .with_label(re.location(), "redefined here")
                    .with_secondary_label(first, "first defined here"),
            );
        } else {
            seen.insert(label, re.location());
        }
        if grammar.lexical_state_index(label).is_some() {
            diagnostics.emit_error(
                Diagnostic::error(ErrorCode::E0109)
                    .with_message(format!(
                        "Lexical token name \"{label}\" is the same as that of a lexical state."
                    ))
                    .with_label(re.location(), "token name"),
            );
        }
    }
}

/// Undefined references, characters outside the BMP and malformed
/// repetitions or ranges.
fn check_regexes(grammar: &Grammar, diagnostics: &mut DiagnosticQueue) {
    let named = grammar.named_regexes();
    for (_, re) in grammar.token_regexes() {
        re.node.walk(&mut |node: &RegexNode| {
            for error in node_errors(node, &named) {
                diagnostics.emit_error(error.to_diagnostic());
            }
        });
    }
}

fn node_errors(node: &RegexNode, named: &FxHashMap<&str, &TokenRegex>) -> Vec<BuildError> {
    let location = node.location;
    let out_of_range = |c: char| {
        let code = u32::from(c);
        (code > MAX_CHAR).then_some(BuildError::CharOutOfRange { code, location })
    };
    match &node.kind {
        RegexKind::Reference(name) if !named.contains_key(name.as_str()) => {
            vec![BuildError::UndefinedReference {
                name: name.clone(),
                location,
            }]
        }
        RegexKind::Literal(text) => text.chars().filter_map(out_of_range).take(1).collect(),
        RegexKind::CharClass(class) => class
            .items
            .iter()
            .filter_map(|&item| match item {
                ClassItem::Range(lo, hi) if lo > hi => Some(BuildError::InvertedRange { lo, hi, location }),
                item => out_of_range(item.max_char()),
            })
            .collect(),
        RegexKind::Repetition {
            min,
            max: Some(max),
            ..
        } if max < min => vec![BuildError::InvalidBounds {
            min: *min,
            max: *max,
            location,
        }],
        _ => Vec::new(),
    }
}

/// Labels whose regexes reference each other in a cycle.
fn check_reference_loops(grammar: &Grammar, diagnostics: &mut DiagnosticQueue) {
    let named = grammar.named_regexes();
    let mut labels: Vec<&str> = named.keys().copied().collect();
    labels.sort_unstable_by_key(|label| named[label].ordinal);

    let mut walk = LoopWalk {
        named: &named,
        done: FxHashSet::default(),
        path: Vec::new(),
        cycles: Vec::new(),
    };
    for label in labels {
        walk.visit(label);
    }

    for cycle in walk.cycles {
        let Some(start) = cycle.first().and_then(|label| named.get(label)) else {
            continue;
        };
        let rendered = cycle
            .iter()
            .map(|label| format!("...{label}..."))
            .collect::<Vec<_>>()
            .join(" --> ");
        diagnostics.emit_error(
            Diagnostic::error(ErrorCode::E0110)
                .with_message(format!("Loop in regular expression detected: \"{rendered}\""))
                .with_label(start.location(), "refers back to itself"),
        );
    }
}

struct LoopWalk<'a, 'g> {
    named: &'a FxHashMap<&'g str, &'g TokenRegex>,
    done: FxHashSet<&'g str>,
    path: Vec<&'g str>,
    /// Each cycle starts and ends with the same label.
    cycles: Vec<Vec<&'g str>>,
}

impl<'g> LoopWalk<'_, 'g> {
    fn visit(&mut self, label: &'g str) {
        if self.done.contains(label) {
            return;
        }
        if let Some(start) = self.path.iter().position(|&active| active == label) {
            let mut cycle = self.path[start..].to_vec();
            cycle.push(label);
            self.cycles.push(cycle);
            return;
        }
        let Some(re) = self.named.get(label).copied() else {
            return;
        };
        self.path.push(label);
        let mut references = Vec::new();
        re.node.walk(&mut |node: &'g RegexNode| {
            if let RegexKind::Reference(name) = &node.kind {
                references.push(name.as_str());
            }
        });
        ensure_sufficient_stack(|| {
            for name in references {
                self.visit(name);
            }
        });
        self.path.pop();
        self.done.insert(label);
    }
}

/// A string literal already seen in a lexical state.
struct SeenLiteral<'g> {
    image: &'g str,
    ignore_case: bool,
    location: Location,
}

/// Duplicate strings within a lexical state, and strings hidden by an
/// IGNORE_CASE variant.
fn check_string_literals(grammar: &Grammar, options: &GeneratorOptions, diagnostics: &mut DiagnosticQueue) {
    let mut by_state: Vec<FxHashMap<String, Vec<SeenLiteral<'_>>>> =
        (0..grammar.lexical_states.len()).map(|_| FxHashMap::default()).collect();

    for production in &grammar.productions {
        let ignore_case = production.ignore_case || options.ignore_case;
        for spec in &production.specs {
            let Some(re) = spec.regex() else {
                continue;
            };
            let Some(image) = re.node.as_literal() else {
                continue;
            };
            let folded: String = image.chars().map(case::to_upper).collect();

            for state in grammar.states_of(production) {
                let variants = by_state[state].entry(folded.clone()).or_default();
                let exact = variants.iter().position(|seen| seen.image == image);
                let general = match exact {
                    Some(index) if !variants[index].ignore_case => None,
                    _ => variants.iter().find(|seen| seen.ignore_case),
                };

                if let Some(other) = general {
                    diagnostics.emit_error(
                        Diagnostic::error(ErrorCode::E0102)
                            .with_message(format!(
                                "String \"{image}\" can never be matched due to presence of more \
                                 general (IGNORE_CASE) regular expression at {}.",
                                other.location
                            ))
                            .with_label(re.location(), "never matched")
                            .with_secondary_label(other.location, "IGNORE_CASE string declared here"),
                    );
                } else if ignore_case && !variants.is_empty() {
                    let lines = variants
                        .iter()
                        .map(|seen| format!(" line {}", seen.location.line))
                        .collect::<Vec<_>>()
                        .join(",");
                    let noun = if variants.len() == 1 { "string" } else { "strings" };
                    diagnostics.add(
                        Diagnostic::warning(ErrorCode::W0005)
                            .with_message(format!(
                                "String with IGNORE_CASE is partially superseded by {noun} at{lines}."
                            ))
                            .with_label(re.location(), "IGNORE_CASE string"),
                    );
                    if let Some(index) = exact {
                        variants.remove(index);
                    }
                    variants.push(SeenLiteral {
                        image,
                        ignore_case,
                        location: re.location(),
                    });
                } else if let Some(index) = exact {
                    let first = variants[index].location;
                    let message = if state == 0 {
                        format!("Duplicate definition of string token \"{image}\".")
                    } else {
                        format!(
                            "Duplicate definition of string token \"{image}\" in lexical state \"{}\".",
                            grammar.lexical_states[state]
                        )
                    };
                    diagnostics.emit_error(
                        Diagnostic::error(ErrorCode::E0103)
                            .with_message(message)
                            .with_label(re.location(), "duplicate")
                            .with_secondary_label(first, "first definition"),
                    );
                } else {
                    variants.push(SeenLiteral {
                        image,
                        ignore_case,
                        location: re.location(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
