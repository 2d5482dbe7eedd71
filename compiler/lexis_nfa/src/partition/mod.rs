//! Bit-vector dispatch for characters at or above 128.
//!
//! A character splits into a high byte and a low byte. For each state,
//! the low bytes it accepts under every high byte form 256-bit vectors;
//! high bytes with identical vectors share one entry guarded by a
//! high-byte set. Vectors and whole per-state recipes ("methods") are
//! deduplicated across the generation run.

use rustc_hash::FxHashMap;

use crate::state::NfaState;
use crate::GraphBuilder;

/// 256 bits, indexed by byte value.
pub type ByteSet = [u64; 4];

const EMPTY: ByteSet = [0; 4];

#[inline]
fn set_bit(set: &mut ByteSet, byte: u32) {
    set[(byte / 64) as usize] |= 1u64 << (byte % 64);
}

#[inline]
fn has_bit(set: &ByteSet, byte: u32) -> bool {
    set[(byte / 64) as usize] & (1u64 << (byte % 64)) != 0
}

/// One state's dispatch recipe. All fields are indices into the
/// [`BitVectorTable`] vectors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct NonAsciiMethod {
    /// `(high-byte set, low-byte set)` pairs shared by several high bytes.
    pub common: Vec<(u32, u32)>,
    /// `(high byte, low-byte set)` for high bytes with a unique vector.
    pub singles: Vec<(u8, u32)>,
}

/// Deduplicated vectors and methods for one generation run.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct BitVectorTable {
    vectors: Vec<ByteSet>,
    methods: Vec<NonAsciiMethod>,
    #[cfg_attr(feature = "cache", serde(skip))]
    vector_index: FxHashMap<ByteSet, u32>,
    #[cfg_attr(feature = "cache", serde(skip))]
    method_index: FxHashMap<NonAsciiMethod, u32>,
}

impl PartialEq for BitVectorTable {
    fn eq(&self, other: &Self) -> bool {
        self.vectors == other.vectors && self.methods == other.methods
    }
}

impl Eq for BitVectorTable {}

impl BitVectorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vectors(&self) -> &[ByteSet] {
        &self.vectors
    }

    pub fn methods(&self) -> &[NonAsciiMethod] {
        &self.methods
    }

    fn intern_vector(&mut self, set: ByteSet) -> u32 {
        if let Some(&index) = self.vector_index.get(&set) {
            return index;
        }
        let index = self.vectors.len() as u32;
        self.vectors.push(set);
        self.vector_index.insert(set, index);
        index
    }

    fn intern_method(&mut self, method: NonAsciiMethod) -> u32 {
        if let Some(&index) = self.method_index.get(&method) {
            return index;
        }
        let index = self.methods.len() as u32;
        self.methods.push(method.clone());
        self.method_index.insert(method, index);
        index
    }

    fn vector(&self, index: u32) -> Option<&ByteSet> {
        self.vectors.get(index as usize)
    }

    /// Whether method `method` accepts `c`.
    pub fn accepts(&self, method: u32, c: char) -> bool {
        let Some(method) = self.methods.get(method as usize) else {
            return false;
        };
        let code = u32::from(c);
        let (high, low) = (code >> 8, code & 0xFF);
        for &(highs, lows) in &method.common {
            if self.vector(highs).is_some_and(|set| has_bit(set, high)) {
                return self.vector(lows).is_some_and(|set| has_bit(set, low));
            }
        }
        method
            .singles
            .iter()
            .find(|&&(byte, _)| u32::from(byte) == high)
            .is_some_and(|&(_, lows)| self.vector(lows).is_some_and(|set| has_bit(set, low)))
    }
}

impl GraphBuilder {
    /// Give every named state with moves >= 128 its dispatch method.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn partition_non_ascii(&mut self, table: &mut BitVectorTable) {
        for id in self.indexed.clone() {
            let state = &self.states[id.index()];
            if state.char_moves.is_empty() && state.range_moves.is_empty() {
                continue;
            }
            let method = build_method(state, table);
            self.states[id.index()].non_ascii_method = Some(table.intern_method(method));
        }
        tracing::debug!(
            vectors = table.vectors.len(),
            methods = table.methods.len(),
            "non-ASCII tables"
        );
    }
}

fn build_method(state: &NfaState, table: &mut BitVectorTable) -> NonAsciiMethod {
    let mut lows = vec![EMPTY; 256];
    let mut add = |code: u32| set_bit(&mut lows[(code >> 8) as usize], code & 0xFF);
    for &c in &state.char_moves {
        add(u32::from(c));
    }
    for &(lo, hi) in &state.range_moves {
        for code in u32::from(lo)..=u32::from(hi) {
            add(code);
        }
    }

    let mut method = NonAsciiMethod::default();
    let mut done: Vec<bool> = lows.iter().map(|set| *set == EMPTY).collect();
    for high in 0..256 {
        if done[high] {
            continue;
        }
        let mut highs = EMPTY;
        for other in high + 1..256 {
            if !done[other] && lows[other] == lows[high] {
                done[other] = true;
                set_bit(&mut highs, other as u32);
            }
        }
        if highs != EMPTY {
            done[high] = true;
            set_bit(&mut highs, high as u32);
            let highs = table.intern_vector(highs);
            let low = table.intern_vector(lows[high]);
            method.common.push((highs, low));
        }
    }
    for (high, set) in lows.iter().enumerate() {
        if !done[high] {
            let low = table.intern_vector(*set);
            method.singles.push((high as u8, low));
        }
    }
    method
}
