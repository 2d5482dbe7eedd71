//! Lexical-state assembly.
//!
//! One pass per lexical state: literals go to the state's trie, `~[]`
//! becomes the state's wildcard kind and every other regex is built into
//! the shared NFA arena. The closed, named graph is exported into the
//! run-wide state table with its names shifted past the states of
//! earlier lexical states. Checks that need every state (unmatchable
//! choice alternatives, empty-match loops) run once at the end.

use rustc_hash::FxHashMap;

use lexis_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use lexis_ir::{
    min_kind, Action, Grammar, KindSet, Ordinal, Pattern, ProductionKind, RegexKind, RegexNode,
    RegexSpec, TokenRegex,
};
use lexis_literal::{Literal, LiteralTables, LiteralTrie};
use lexis_nfa::{BitVectorTable, BuildContext, GraphBuilder, NfaStateDesc, StateId};

use crate::empty_match::EmptyMatchCheck;
use crate::{
    GeneratorFlags, GeneratorOptions, LexicalStateDescription, MatchInfo, TokenizerDescription,
};

/// Run-wide assembly state.
pub(crate) struct Assembler<'g> {
    grammar: &'g Grammar,
    options: &'g GeneratorOptions,
    named: FxHashMap<&'g str, &'g TokenRegex>,
    graph: GraphBuilder,
    non_ascii: BitVectorTable,
    literal_tables: LiteralTables,
    nfa_states: Vec<NfaStateDesc>,
    lexical_states: Vec<LexicalStateDescription>,

    // Indexed by ordinal.
    regexes: Vec<Option<&'g TokenRegex>>,
    kinds: Vec<Option<ProductionKind>>,
    ignore_case: Vec<bool>,
    actions: Vec<Option<Action>>,
    new_lex_state: Vec<Option<usize>>,
    declared_in: Vec<Vec<usize>>,

    to_skip: KindSet,
    to_more: KindSet,
    to_special: KindSet,
    to_token: KindSet,
    flags: GeneratorFlags,
    can_reach_on_more: Vec<bool>,
    /// Choice regexes with the lexical state they were built in.
    choices: Vec<(usize, &'g TokenRegex)>,
}

impl<'g> Assembler<'g> {
    pub(crate) fn new(grammar: &'g Grammar, options: &'g GeneratorOptions) -> Self {
        let slots = grammar.max_ordinal().index() + 1;
        Assembler {
            grammar,
            options,
            named: grammar.named_regexes(),
            graph: GraphBuilder::new(),
            non_ascii: BitVectorTable::new(),
            literal_tables: LiteralTables::new(),
            nfa_states: Vec::new(),
            lexical_states: Vec::with_capacity(grammar.lexical_states.len()),
            regexes: vec![None; slots],
            kinds: vec![None; slots],
            ignore_case: vec![false; slots],
            actions: vec![None; slots],
            new_lex_state: vec![None; slots],
            declared_in: vec![Vec::new(); slots],
            to_skip: KindSet::new(),
            to_more: KindSet::new(),
            to_special: KindSet::new(),
            to_token: KindSet::new(),
            flags: GeneratorFlags::empty(),
            can_reach_on_more: vec![false; grammar.lexical_states.len()],
            choices: Vec::new(),
        }
    }

    /// Assemble every lexical state and run the cross-state checks.
    pub(crate) fn run(mut self, diagnostics: &mut DiagnosticQueue) -> TokenizerDescription {
        self.end_of_file();
        for state in 0..self.grammar.lexical_states.len() {
            self.lexical_state(state, diagnostics);
        }
        self.finish(diagnostics)
    }

    /// The end-of-input kind is always a TOKEN; the `<EOF>` spec, if any,
    /// only contributes its action and state change.
    fn end_of_file(&mut self) {
        self.to_token.insert(Ordinal::EOF);
        let grammar = self.grammar;
        let specs = grammar
            .productions
            .iter()
            .flat_map(|production| &production.specs)
            .filter(|spec| spec.pattern == Pattern::EndOfFile);
        for spec in specs {
            let target = spec
                .next_state
                .as_deref()
                .and_then(|name| grammar.lexical_state_index(name));
            let action = spec.effective_action().cloned();
            if target.is_some() || action.is_some() {
                self.new_lex_state[0] = target;
                self.actions[0] = action;
            }
        }
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(state = %self.grammar.lexical_states[state])
    )]
    fn lexical_state(&mut self, state: usize, diagnostics: &mut DiagnosticQueue) {
        let grammar = self.grammar;
        self.graph.reset();
        let initial = self.graph.initial_state();
        let mut trie = LiteralTrie::new(self.options.literal_options());
        let mut wildcard_kind = None;
        let mut mixed = false;
        let mut ignoring = false;

        let productions = grammar
            .productions
            .iter()
            .filter(|production| grammar.states_of(production).contains(&state));
        for (i, production) in productions.enumerate() {
            let ignore = production.ignore_case;
            if i == 0 {
                ignoring = ignore;
            }
            for spec in &production.specs {
                let Some(re) = spec.regex() else {
                    continue;
                };
                let slot = re.ordinal.index();
                self.regexes[slot] = Some(re);
                self.ignore_case[slot] = ignore;
                self.declared_in[slot].push(state);
                if re.private {
                    continue;
                }

                match re.node.as_literal() {
                    Some(image) if !image.is_empty() && !self.options.no_dfa => {
                        let mut literal = Literal::new(image, re.ordinal).at(re.location());
                        if ignore {
                            literal = literal.ignoring_case();
                        }
                        trie.generate(literal, diagnostics);
                        if i != 0 && ignoring != ignore {
                            mixed = true;
                        }
                    }
                    _ if re.node.is_wildcard() => {
                        wildcard_kind = min_kind(wildcard_kind, Some(re.ordinal));
                    }
                    _ => {
                        if matches!(re.node.kind, RegexKind::Choice(_)) {
                            self.choices.push((state, re));
                        }
                        self.build_regex(initial, re, ignore || self.options.ignore_case, diagnostics);
                    }
                }
                self.classify(state, production.kind, spec, re.ordinal);
            }
        }

        self.graph.compute_closures(self.options.closure_mode());
        let initial_name = self.graph.name_states();
        let has_nfa = self.graph.generated_states() != 0;
        let init_match = self.graph.initial_kind().filter(|kind| !kind.is_eof());
        if let Some(kind) = init_match {
            let flags = self.empty_match_flags(kind);
            self.flags |= flags;
        }

        trie.set_mixed(mixed);
        trie.fill_sub_string();
        if has_nfa && !mixed {
            trie.compute_handoffs(&self.graph, wildcard_kind);
        }
        self.graph.partition_non_ascii(&mut self.non_ascii);

        let first_state = self.nfa_states.len() as u32;
        trie.update_tables(
            state,
            first_state,
            &mut self.graph,
            &mut self.literal_tables,
            diagnostics,
        );
        trie.offset_states(first_state);
        let exported = self.graph.export(first_state);
        let state_count = exported.len() as u32;
        self.nfa_states.extend(exported);

        tracing::debug!(
            has_nfa,
            mixed,
            literals = trie.literals().len(),
            states = state_count,
            "lexical state assembled"
        );

        self.lexical_states.push(LexicalStateDescription {
            name: grammar.lexical_states[state].clone(),
            initial_state: initial_name.map(|name| name.offset(first_state)),
            wildcard_kind,
            mixed,
            has_nfa,
            init_match,
            can_loop: false,
            can_reach_on_more: false,
            first_state,
            state_count,
            literals: trie,
        });
    }

    /// Build `re` and wire it into the lexical state's initial state.
    fn build_regex(
        &mut self,
        initial: StateId,
        re: &TokenRegex,
        ignore_case: bool,
        diagnostics: &mut DiagnosticQueue,
    ) {
        let mut cx = BuildContext::new(&self.named, self.options.unicode_input, diagnostics);
        match self.graph.build(&re.node, ignore_case, &mut cx) {
            Ok(fragment) => {
                self.graph.set_final(fragment.end, re.ordinal);
                self.graph.add_epsilon(initial, fragment.start);
            }
            Err(error) => {
                diagnostics.emit_error(error.to_diagnostic());
            }
        }
    }

    /// Record how a matched kind is treated.
    fn classify(&mut self, state: usize, kind: ProductionKind, spec: &RegexSpec, ordinal: Ordinal) {
        let slot = ordinal.index();
        self.kinds[slot] = Some(kind);
        let target = spec
            .next_state
            .as_deref()
            .and_then(|name| self.grammar.lexical_state_index(name));
        if let Some(target) = target.filter(|&target| target != state) {
            self.new_lex_state[slot] = Some(target);
        }
        if let Some(action) = spec.effective_action() {
            self.actions[slot] = Some(action.clone());
        }

        let has_action = self.actions[slot].is_some();
        match kind {
            ProductionKind::Special => {
                if has_action || self.new_lex_state[slot].is_some() {
                    self.flags |= GeneratorFlags::SKIP_ACTIONS;
                }
                if has_action {
                    self.flags |= GeneratorFlags::SPECIAL_ACTIONS;
                }
                self.flags |= GeneratorFlags::SPECIAL;
                self.to_special.insert(ordinal);
                self.to_skip.insert(ordinal);
            }
            ProductionKind::Skip => {
                if has_action {
                    self.flags |= GeneratorFlags::SKIP_ACTIONS;
                }
                self.flags |= GeneratorFlags::SKIP;
                self.to_skip.insert(ordinal);
            }
            ProductionKind::More => {
                if has_action {
                    self.flags |= GeneratorFlags::MORE_ACTIONS;
                }
                self.flags |= GeneratorFlags::MORE;
                self.to_more.insert(ordinal);
                let reached = self.new_lex_state[slot].unwrap_or(state);
                self.can_reach_on_more[reached] = true;
            }
            ProductionKind::Token => {
                if has_action {
                    self.flags |= GeneratorFlags::TOKEN_ACTIONS;
                }
                self.to_token.insert(ordinal);
            }
        }
    }

    /// A kind matched by the empty string is acted on without consuming
    /// input, so the runtime needs its action path.
    fn empty_match_flags(&self, kind: Ordinal) -> GeneratorFlags {
        let actions = if self.to_skip.contains(kind) || self.to_special.contains(kind) {
            GeneratorFlags::SKIP_ACTIONS
        } else if self.to_more.contains(kind) {
            GeneratorFlags::MORE_ACTIONS
        } else {
            GeneratorFlags::TOKEN_ACTIONS
        };
        actions | GeneratorFlags::EMPTY_MATCH
    }

    /// Alternatives of a choice declared as tokens of their own, earlier
    /// and in the same lexical state, always win over the choice.
    fn check_unmatchability(&self, diagnostics: &mut DiagnosticQueue) {
        for &(state, choice) in &self.choices {
            let mut alternatives = Vec::new();
            flatten_choice(&choice.node, &mut alternatives);
            for alternative in alternatives {
                let RegexKind::Reference(name) = &alternative.kind else {
                    continue;
                };
                let Some(other) = self.named.get(name.as_str()).copied() else {
                    continue;
                };
                if other.private
                    || other.ordinal.is_eof()
                    || other.ordinal >= choice.ordinal
                    || !self.declared_in[other.ordinal.index()].contains(&state)
                {
                    continue;
                }
                let matched_as = match &choice.label {
                    Some(label) => format!(": {label}"),
                    None => format!("token of kind : {}", choice.ordinal),
                };
                diagnostics.add(
                    Diagnostic::warning(ErrorCode::W0002)
                        .with_message(format!(
                            "Regular Expression choice : {} can never be matched as {matched_as}",
                            other.display_name()
                        ))
                        .with_label(alternative.location, "alternative never matched here")
                        .with_secondary_label(other.location(), "matched by this earlier token"),
                );
            }
        }
    }

    fn finish(mut self, diagnostics: &mut DiagnosticQueue) -> TokenizerDescription {
        for (description, &reached) in self.lexical_states.iter_mut().zip(&self.can_reach_on_more) {
            description.can_reach_on_more = reached;
        }

        self.check_unmatchability(diagnostics);

        let has_loop = EmptyMatchCheck {
            states: &mut self.lexical_states,
            new_lex_state: &self.new_lex_state,
            regexes: &self.regexes,
        }
        .run(diagnostics);
        if has_loop {
            self.flags |= GeneratorFlags::LOOP;
        }

        let matches = (0..self.regexes.len()).map(|slot| self.match_info(slot)).collect();

        TokenizerDescription {
            lex_state_names: self.grammar.lexical_states.clone(),
            default_lex_state: 0,
            initial_state_by_lex_state: self
                .lexical_states
                .iter()
                .map(|state| state.initial_state)
                .collect(),
            wildcard_kind_by_lex_state: self
                .lexical_states
                .iter()
                .map(|state| state.wildcard_kind)
                .collect(),
            nfa_states: self.nfa_states,
            to_skip: self.to_skip,
            to_more: self.to_more,
            to_special: self.to_special,
            to_token: self.to_token,
            new_lex_state: self.new_lex_state,
            literal_tables: self.literal_tables.by_first_char,
            kind_to_nfa_start_state: self.literal_tables.nfa_start_states,
            matches,
            lexical_states: self.lexical_states,
            non_ascii: self.non_ascii,
            flags: self.flags,
            max_ordinal: self.grammar.max_ordinal(),
        }
    }

    fn match_info(&self, slot: usize) -> Option<MatchInfo> {
        if slot == 0 {
            return Some(MatchInfo {
                kind: Ordinal::EOF,
                image: None,
                match_type: ProductionKind::Token,
                new_lex_state: self.new_lex_state[0],
                action: self.actions[0].clone(),
            });
        }
        let re = self.regexes[slot].filter(|re| !re.private)?;
        let match_type = self.kinds[slot]?;
        let image = re
            .node
            .as_literal()
            .filter(|_| !self.ignore_case[slot] && !self.options.ignore_case)
            .map(str::to_owned);
        Some(MatchInfo {
            kind: re.ordinal,
            image,
            match_type,
            new_lex_state: self.new_lex_state[slot],
            action: self.actions[slot].clone(),
        })
    }
}

/// Direct alternatives of `node`, with nested choices spliced in.
fn flatten_choice<'n>(node: &'n RegexNode, out: &mut Vec<&'n RegexNode>) {
    match &node.kind {
        RegexKind::Choice(alternatives) => {
            for alternative in alternatives {
                flatten_choice(alternative, out);
            }
        }
        _ => out.push(node),
    }
}
