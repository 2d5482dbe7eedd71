//! Exported state table.

use lexis_ir::Ordinal;

use crate::partition::BitVectorTable;
use crate::state::StateName;
use crate::GraphBuilder;

/// One entry of the exported state table, indexed by [`StateName`].
///
/// Either a real state (moves plus successors) or a composite that only
/// lists its members.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct NfaStateDesc {
    pub ascii_moves: [u64; 2],
    pub char_moves: Vec<char>,
    pub range_moves: Vec<(char, char)>,
    /// States active after taking a move out of this state.
    pub next_states: Vec<StateName>,
    /// Kind matched after taking a move out of this state.
    pub kind: Option<Ordinal>,
    pub composite: Option<Vec<StateName>>,
    /// Index into [`BitVectorTable::methods`] for characters >= 128.
    pub non_ascii_method: Option<u32>,
}

impl NfaStateDesc {
    pub fn is_composite(&self) -> bool {
        self.composite.is_some()
    }

    /// Whether this state moves on `c`. Composites never move directly.
    pub fn accepts(&self, c: char, tables: &BitVectorTable) -> bool {
        let code = u32::from(c);
        if code < 128 {
            return self.ascii_moves[(code / 64) as usize] & (1u64 << (code % 64)) != 0;
        }
        self.non_ascii_method
            .is_some_and(|method| tables.accepts(method, c))
    }
}

impl GraphBuilder {
    /// Named states then composites, every name shifted by `offset`.
    pub fn export(&self, offset: u32) -> Vec<NfaStateDesc> {
        let mut table = Vec::with_capacity(self.indexed.len() + self.composites.len());
        for &id in &self.indexed {
            let state = &self.states[id.index()];
            let next_states = state
                .next
                .map(|next| self.names_of(&self.states[next.index()].epsilon_moves))
                .unwrap_or_default()
                .into_iter()
                .map(|name| name.offset(offset))
                .collect();
            table.push(NfaStateDesc {
                ascii_moves: state.ascii_moves,
                char_moves: state.char_moves.clone(),
                range_moves: state.range_moves.clone(),
                next_states,
                kind: state.kind_to_print,
                composite: None,
                non_ascii_method: state.non_ascii_method,
            });
        }
        for members in &self.composites {
            table.push(NfaStateDesc {
                composite: Some(members.iter().map(|name| name.offset(offset)).collect()),
                ..NfaStateDesc::default()
            });
        }
        table
    }
}

#[cfg(test)]
mod tests;
