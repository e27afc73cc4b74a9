//! Encoder façade (spec §4.E): orchestrates the vocabulary, pattern set, and
//! BPE core, and implements the two budget-constrained trim modes.

use crate::bpe::bpe;
use crate::invariants;
use crate::pattern::PatternSet;
use crate::vocab::Vocabulary;
use crate::{Error, Rank};
use rayon::prelude::*;
use std::collections::HashSet;

/// Per-call allow-list selector for special-token recognition (spec §4.D,
/// §6's `applyAllSpecial` convenience flag).
#[derive(Debug, Clone)]
pub enum AllowedSpecial {
    /// Recognize every special token the vocabulary defines.
    All,
    /// Recognize only the named literals; anything else is ordinary text.
    Allowed(HashSet<String>),
    /// Recognize no special tokens at all -- special literals are
    /// segmented as ordinary bytes, same as any other text.
    None,
}

impl Default for AllowedSpecial {
    fn default() -> Self {
        AllowedSpecial::All
    }
}

/// The result of a trim-mode encode: the emitted ids plus the exact input
/// substring whose encoding equals those ids (spec §3 "Encoded result").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeTrimResult {
    pub token_ids: Vec<Rank>,
    pub text: String,
}

/// An immutable, shareable tokenizer: a vocabulary plus its compiled
/// pre-tokenization pattern. Constructed once by the builder (§4.F) and
/// read by every `encode`/`decode` call thereafter -- safe to share across
/// threads by unrestricted aliasing (spec §5).
pub struct Encoding {
    name: String,
    vocab: Vocabulary,
    patterns: PatternSet,
}

/// One emitted id paired with the byte span (in the original `text`) whose
/// encoding produced it. Used internally by the trim modes; exposed so
/// callers who want per-token provenance (e.g. highlighting) don't have to
/// re-derive it.
#[derive(Debug, Clone, Copy)]
struct TrackedId {
    rank: Rank,
    start: usize,
    end: usize,
}

impl Encoding {
    pub fn new(name: impl Into<String>, vocab: Vocabulary, patterns: PatternSet) -> Self {
        Self {
            name: name.into(),
            vocab,
            patterns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Largest rank assigned to any token, ordinary or special.
    pub fn max_token_value(&self) -> Rank {
        self.vocab.max_token_value()
    }

    /// Number of ordinary (non-special) vocabulary entries.
    pub fn n_vocab(&self) -> usize {
        self.vocab.n_vocab()
    }

    fn allowed_set<'a>(&'a self, allowed: &'a AllowedSpecial) -> HashSet<&'a str> {
        match allowed {
            AllowedSpecial::All => self.vocab.specials().keys().map(String::as_str).collect(),
            AllowedSpecial::Allowed(set) => set.iter().map(String::as_str).collect(),
            AllowedSpecial::None => HashSet::new(),
        }
    }

    /// Encodes `text`, ignoring every special token entirely -- the
    /// segmenter's literal scan pass is skipped altogether, not merely run
    /// with an empty allow-list (spec §11 supplement).
    pub fn encode_ordinary(&self, text: &str) -> Vec<Rank> {
        self.encode_ordinary_tracked(text)
            .into_iter()
            .map(|t| t.rank)
            .collect()
    }

    /// Encodes `text` into an ordered sequence of ranks (spec §4.E).
    pub fn encode(&self, text: &str, allowed_special: &AllowedSpecial) -> Vec<Rank> {
        self.encode_tracked(text, allowed_special)
            .into_iter()
            .map(|t| t.rank)
            .collect()
    }

    fn encode_ordinary_tracked(&self, text: &str) -> Vec<TrackedId> {
        let mut out = Vec::new();
        for mat in self.patterns.regex().find_iter(text) {
            let mat = mat.expect("pre-tokenization regex match failed");
            let piece_start = mat.start();
            let piece = mat.as_str().as_bytes();
            if let Some(rank) = self.vocab.encode_single_piece(piece) {
                out.push(TrackedId {
                    rank,
                    start: piece_start,
                    end: piece_start + piece.len(),
                });
                continue;
            }
            let tokens = bpe(piece, &self.vocab).expect("vocabulary missing byte fallback entry");
            out.extend(tokens.into_iter().map(|t| TrackedId {
                rank: t.rank,
                start: piece_start + t.start,
                end: piece_start + t.end,
            }));
        }
        out
    }

    fn encode_tracked(&self, text: &str, allowed_special: &AllowedSpecial) -> Vec<TrackedId> {
        if matches!(allowed_special, AllowedSpecial::None) {
            return self.encode_ordinary_tracked(text);
        }

        let allowed = self.allowed_set(allowed_special);
        let segments = crate::segmenter::segment(text, &self.patterns, &allowed);

        let mut out = Vec::new();
        for segment in segments {
            match segment {
                crate::segmenter::Segment::Ordinary { start, text: piece, .. } => {
                    let piece_bytes = piece.as_bytes();
                    if let Some(rank) = self.vocab.encode_single_piece(piece_bytes) {
                        out.push(TrackedId {
                            rank,
                            start,
                            end: start + piece_bytes.len(),
                        });
                        continue;
                    }
                    let tokens = bpe(piece_bytes, &self.vocab)
                        .expect("vocabulary missing byte fallback entry");
                    out.extend(tokens.into_iter().map(|t| TrackedId {
                        rank: t.rank,
                        start: start + t.start,
                        end: start + t.end,
                    }));
                }
                crate::segmenter::Segment::Special { start, end, literal } => {
                    let rank = self
                        .vocab
                        .special_rank(literal)
                        .expect("segmenter emitted a literal absent from the allow-list");
                    out.push(TrackedId { rank, start, end });
                }
            }
        }

        invariants::assert_encode_postconditions(
            &out.iter().map(|t| t.rank).collect::<Vec<_>>(),
            self.vocab.max_token_value(),
        );
        out
    }

    /// Reconstructs the original bytes from a sequence of ranks (spec
    /// §4.E). Lossless byte concatenation followed by a UTF-8 decode;
    /// invalid UTF-8 is replaced rather than causing a failure, matching
    /// spec §4.E's "only the test suite's decode-to-string path needs valid
    /// UTF-8" allowance.
    pub fn decode(&self, ids: &[Rank]) -> String {
        String::from_utf8_lossy(&self.decode_bytes(ids)).into_owned()
    }

    /// Reconstructs the original bytes from a sequence of ranks without any
    /// UTF-8 interpretation -- the lossless path spec §4.E calls out.
    pub fn decode_bytes(&self, ids: &[Rank]) -> Vec<u8> {
        let mut out = Vec::new();
        for &id in ids {
            if let Some(bytes) = self.vocab.decode_rank(id) {
                out.extend_from_slice(bytes);
            }
        }
        out
    }

    /// Byte sequence for a single rank, ordinary or special.
    pub fn decode_single_token_bytes(&self, rank: Rank) -> Result<Vec<u8>, Error> {
        self.vocab
            .decode_rank(rank)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::InvalidArgument(format!("rank {rank} is not in the vocabulary")))
    }

    /// Every ordinary token's byte value, indexed by rank.
    pub fn token_byte_values(&self) -> Vec<Vec<u8>> {
        (0..self.vocab.n_vocab() as Rank)
            .map(|rank| self.vocab.decode_rank(rank).unwrap_or(&[]).to_vec())
            .collect()
    }

    /// Encodes a batch of texts in parallel (spec §11 supplement).
    pub fn encode_batch(&self, texts: &[&str], allowed_special: &AllowedSpecial) -> Vec<Vec<Rank>> {
        texts
            .par_iter()
            .map(|text| self.encode(text, allowed_special))
            .collect()
    }

    /// Decodes a batch of id sequences in parallel.
    pub fn decode_batch(&self, batches: &[&[Rank]]) -> Vec<String> {
        batches.par_iter().map(|ids| self.decode(ids)).collect()
    }

    /// Encode mode bounded at `max_tokens`, discarding from the tail (spec
    /// §4.E `EncodeTrimSuffix`). The returned `text` is the byte-prefix of
    /// `text` whose encoding equals the returned ids.
    pub fn encode_trim_suffix(
        &self,
        text: &str,
        allowed_special: &AllowedSpecial,
        max_tokens: usize,
    ) -> EncodeTrimResult {
        let tracked = self.encode_tracked(text, allowed_special);
        if tracked.len() <= max_tokens {
            return EncodeTrimResult {
                token_ids: tracked.into_iter().map(|t| t.rank).collect(),
                text: text.to_string(),
            };
        }

        let cut_at = tracked[max_tokens].start;
        let token_ids: Vec<Rank> = tracked[..max_tokens].iter().map(|t| t.rank).collect();
        invariants::assert_trim_within_budget(token_ids.len(), max_tokens);
        EncodeTrimResult {
            token_ids,
            text: text[..cut_at].to_string(),
        }
    }

    /// Encode mode bounded at `max_tokens`, discarding from the head (spec
    /// §4.E `EncodeTrimPrefix`). The returned `text` is the byte-suffix of
    /// `text` whose encoding equals the returned ids.
    pub fn encode_trim_prefix(
        &self,
        text: &str,
        allowed_special: &AllowedSpecial,
        max_tokens: usize,
    ) -> EncodeTrimResult {
        let tracked = self.encode_tracked(text, allowed_special);
        if tracked.len() <= max_tokens {
            return EncodeTrimResult {
                token_ids: tracked.into_iter().map(|t| t.rank).collect(),
                text: text.to_string(),
            };
        }

        let keep_from_idx = tracked.len() - max_tokens;
        let cut_at = tracked[keep_from_idx].start;
        let token_ids: Vec<Rank> = tracked[keep_from_idx..].iter().map(|t| t.rank).collect();
        invariants::assert_trim_within_budget(token_ids.len(), max_tokens);
        EncodeTrimResult {
            token_ids,
            text: text[cut_at..].to_string(),
        }
    }
}
