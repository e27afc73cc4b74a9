//! Vocabulary loading: parses the tiktoken `.tiktoken` line format into a
//! bidirectional byte-sequence <-> rank mapping, plus a disjoint special-token
//! table.

use crate::{Error, Rank, MAX_TOKEN_LENGTH};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::HashMap;

/// An immutable, bidirectional vocabulary: byte sequences to ranks and back,
/// plus the disjoint table of special-token literals.
///
/// Constructed once by the builder and shared by reference across every
/// `Encoding` and every concurrent `encode`/`decode` call; nothing here is
/// mutated after [`Vocabulary::from_tiktoken_bytes`] returns.
pub struct Vocabulary {
    encode_map: FxHashMap<Vec<u8>, Rank>,
    decode_map: Vec<Vec<u8>>,
    specials: HashMap<String, Rank>,
    specials_decode: HashMap<Rank, String>,
}

impl Vocabulary {
    /// Parses newline-delimited `base64(token_bytes) SP rank` lines.
    ///
    /// Trailing blank lines are ignored. A duplicate byte sequence or a
    /// duplicate rank anywhere in the file is a fatal [`Error::LoadCorrupt`].
    pub fn from_tiktoken_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::LoadCorrupt(format!("vocabulary is not valid UTF-8: {e}")))?;

        let mut encode_map: FxHashMap<Vec<u8>, Rank> = FxHashMap::default();
        let mut seen_ranks: FxHashSet<Rank> = FxHashSet::default();

        for (line_no, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(2, ' ');
            let token_b64 = parts.next().unwrap();
            let rank_str = parts.next().ok_or_else(|| {
                Error::LoadCorrupt(format!("line {}: missing rank column", line_no + 1))
            })?;

            let token_bytes = STANDARD.decode(token_b64).map_err(|e| {
                Error::LoadCorrupt(format!("line {}: invalid base64: {e}", line_no + 1))
            })?;
            if token_bytes.len() > MAX_TOKEN_LENGTH {
                return Err(Error::LoadCorrupt(format!(
                    "line {}: token of {} bytes exceeds MAX_TOKEN_LENGTH ({})",
                    line_no + 1,
                    token_bytes.len(),
                    MAX_TOKEN_LENGTH
                )));
            }
            let rank: Rank = rank_str.trim().parse().map_err(|_| {
                Error::LoadCorrupt(format!(
                    "line {}: rank '{rank_str}' is not a valid integer",
                    line_no + 1
                ))
            })?;

            if encode_map.contains_key(&token_bytes) {
                return Err(Error::LoadCorrupt(format!(
                    "line {}: duplicate byte sequence",
                    line_no + 1
                )));
            }
            if !seen_ranks.insert(rank) {
                return Err(Error::LoadCorrupt(format!(
                    "line {}: duplicate rank {rank}",
                    line_no + 1
                )));
            }

            encode_map.insert(token_bytes, rank);
        }

        Self::from_encode_map(encode_map)
    }

    /// Builds a vocabulary directly from an already-parsed encode map.
    /// Used by the `.tiktoken` loader above and directly by tests that want
    /// a small synthetic vocabulary without round-tripping through base64.
    pub fn from_encode_map(encode_map: FxHashMap<Vec<u8>, Rank>) -> Result<Self, Error> {
        let mut decode_map = vec![Vec::new(); encode_map.len()];
        for (bytes, &rank) in &encode_map {
            let idx = rank as usize;
            if idx >= decode_map.len() {
                return Err(Error::LoadCorrupt(format!(
                    "rank {rank} is not dense: vocabulary has {} entries",
                    encode_map.len()
                )));
            }
            decode_map[idx] = bytes.clone();
        }

        crate::invariants::assert_vocabulary_bijective(encode_map.len(), decode_map.len());

        Ok(Self {
            encode_map,
            decode_map,
            specials: HashMap::new(),
            specials_decode: HashMap::new(),
        })
    }

    /// Merges a special-token table into this vocabulary. Ranks must not
    /// collide with the ordinary rank range or with each other; callers
    /// (the builder) are responsible for resolving extra-special overrides
    /// before calling this, since this method treats every entry as final.
    pub fn with_specials(mut self, specials: HashMap<String, Rank>) -> Result<Self, Error> {
        for (literal, &rank) in &specials {
            if (rank as usize) < self.decode_map.len() {
                return Err(Error::LoadCorrupt(format!(
                    "special token {literal:?} rank {rank} collides with the ordinary vocabulary"
                )));
            }
        }
        self.specials_decode = specials.iter().map(|(k, &v)| (v, k.clone())).collect();
        self.specials = specials;
        Ok(self)
    }

    pub fn encode_single_piece(&self, bytes: &[u8]) -> Option<Rank> {
        self.encode_map.get(bytes).copied()
    }

    pub fn encode_map(&self) -> &FxHashMap<Vec<u8>, Rank> {
        &self.encode_map
    }

    pub fn decode_rank(&self, rank: Rank) -> Option<&[u8]> {
        if (rank as usize) < self.decode_map.len() {
            return Some(self.decode_map[rank as usize].as_slice());
        }
        self.specials_decode.get(&rank).map(|s| s.as_bytes())
    }

    pub fn specials(&self) -> &HashMap<String, Rank> {
        &self.specials
    }

    pub fn special_rank(&self, literal: &str) -> Option<Rank> {
        self.specials.get(literal).copied()
    }

    pub fn is_special_rank(&self, rank: Rank) -> bool {
        self.specials_decode.contains_key(&rank)
    }

    /// Number of ordinary (non-special) entries.
    pub fn n_vocab(&self) -> usize {
        self.decode_map.len()
    }

    /// Largest rank assigned to any token, ordinary or special.
    pub fn max_token_value(&self) -> Rank {
        let ordinary_max = self.decode_map.len().saturating_sub(1) as Rank;
        self.specials
            .values()
            .copied()
            .fold(ordinary_max, Rank::max)
    }
}
