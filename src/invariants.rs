//! Debug-mode runtime assertions for encoder invariants.
//!
//! These checks help catch bugs in the BPE core and segmenter during
//! development without affecting release performance: every assertion
//! compiles to a no-op when `debug_assertions` is off.

use crate::Rank;

/// Asserts that every rank produced by an `encode` call is within the
/// encoding's vocabulary (ordinary or special) and that the output size is
/// bounded, per spec §8 invariant 1 and the `MAX_OUTPUT_TOKENS` guard.
#[inline]
pub fn assert_encode_postconditions(ranks: &[Rank], max_token_value: Rank) {
    #[cfg(debug_assertions)]
    {
        for (i, &rank) in ranks.iter().enumerate() {
            debug_assert!(
                rank <= max_token_value,
                "invariant violation: rank[{i}] = {rank} > max_token_value ({max_token_value})"
            );
        }
        debug_assert!(
            ranks.len() <= crate::MAX_OUTPUT_TOKENS,
            "invariant violation: output of {} tokens exceeds MAX_OUTPUT_TOKENS ({})",
            ranks.len(),
            crate::MAX_OUTPUT_TOKENS
        );
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (ranks, max_token_value);
    }
}

/// Asserts that a trim result never emits more ids than the caller's
/// budget (spec §8 invariant 2).
#[inline]
pub fn assert_trim_within_budget(emitted: usize, max_tokens: usize) {
    #[cfg(debug_assertions)]
    {
        debug_assert!(
            emitted <= max_tokens,
            "invariant violation: trim emitted {emitted} tokens, budget was {max_tokens}"
        );
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (emitted, max_tokens);
    }
}

/// Asserts that a vocabulary's encode/decode maps are of equal size -- the
/// bijection invariant spec §3 requires of `Vocabulary`.
#[inline]
pub fn assert_vocabulary_bijective(encode_len: usize, decode_len: usize) {
    #[cfg(debug_assertions)]
    {
        debug_assert_eq!(
            encode_len, decode_len,
            "invariant violation: encode_map has {encode_len} entries but decode_map has {decode_len}"
        );
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (encode_len, decode_len);
    }
}
