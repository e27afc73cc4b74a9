//! BPE core: merges a byte run into a sequence of ranks using the ranked
//! pair-merging algorithm described in spec §4.C.
//!
//! This is the tiktoken reference algorithm (as vendored into
//! `darknoon-tiktoken-wasm`'s `_byte_pair_merge` and reproduced with an
//! explicit per-part cached rank in `tiktokenx`'s `CoreBPE::byte_pair_merge`):
//! a `parts` list of `(start, rank_of_pair_starting_here)` with a sentinel
//! trailing entry of rank `u32::MAX`, repeatedly merging the lowest-rank
//! (leftmost on ties) adjacent pair and recomputing only the two ranks that
//! changed.

use crate::vocab::Vocabulary;
use crate::{Error, Rank};

const NO_RANK: Rank = Rank::MAX;

/// One emitted token: its rank plus the byte range (relative to the start of
/// the piece passed to [`bpe`]) that produced it. Callers offset this range
/// by the piece's position in the original input to get an absolute span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BpeToken {
    pub rank: Rank,
    pub start: usize,
    pub end: usize,
}

/// Runs BPE merging over `piece`, returning ranks in left-to-right order
/// with their source byte ranges.
///
/// Spec §4.C step 1/2: single bytes and whole-piece hits short-circuit
/// without building the parts list.
pub fn bpe(piece: &[u8], vocab: &Vocabulary) -> Result<Vec<BpeToken>, Error> {
    if piece.is_empty() {
        return Ok(Vec::new());
    }
    if piece.len() == 1 {
        let rank = vocab.encode_single_piece(piece).ok_or_else(|| {
            Error::VocabIncomplete(format!("byte {:#04x} missing from vocabulary", piece[0]))
        })?;
        return Ok(vec![BpeToken {
            rank,
            start: 0,
            end: 1,
        }]);
    }
    if let Some(rank) = vocab.encode_single_piece(piece) {
        return Ok(vec![BpeToken {
            rank,
            start: 0,
            end: piece.len(),
        }]);
    }

    let parts = byte_pair_merge(piece, vocab)?;
    let mut out = Vec::with_capacity(parts.len() - 1);
    for window in parts.windows(2) {
        let (start, _) = window[0];
        let (end, _) = window[1];
        let rank = vocab.encode_single_piece(&piece[start..end]).ok_or_else(|| {
            Error::VocabIncomplete(format!(
                "merged span {start}..{end} not present in vocabulary"
            ))
        })?;
        out.push(BpeToken { rank, start, end });
    }
    Ok(out)
}

/// Returns the `(start, rank_of_pair_starting_here)` list after every
/// possible merge has been applied, per spec §4.C steps 3-4. The trailing
/// sentinel has `start == piece.len()` and rank [`NO_RANK`].
fn byte_pair_merge(piece: &[u8], vocab: &Vocabulary) -> Result<Vec<(usize, Rank)>, Error> {
    let mut parts: Vec<(usize, Rank)> = Vec::with_capacity(piece.len() + 1);

    let mut min_rank = (NO_RANK, usize::MAX);
    for i in 0..piece.len() - 1 {
        let rank = vocab
            .encode_single_piece(&piece[i..i + 2])
            .unwrap_or(NO_RANK);
        if rank < min_rank.0 {
            min_rank = (rank, i);
        }
        parts.push((i, rank));
    }
    parts.push((piece.len() - 1, NO_RANK));
    parts.push((piece.len(), NO_RANK));

    let pair_rank = |parts: &[(usize, Rank)], i: usize| -> Rank {
        if i + 3 >= parts.len() {
            return NO_RANK;
        }
        let start = parts[i].0;
        let end = parts[i + 3].0;
        vocab.encode_single_piece(&piece[start..end]).unwrap_or(NO_RANK)
    };

    while min_rank.0 != NO_RANK {
        let i = min_rank.1;

        if i > 0 {
            parts[i - 1].1 = pair_rank(&parts, i - 1);
        }
        parts[i].1 = pair_rank(&parts, i);
        parts.remove(i + 1);

        min_rank = (NO_RANK, usize::MAX);
        for (idx, &(_, rank)) in parts[..parts.len() - 1].iter().enumerate() {
            if rank < min_rank.0 {
                min_rank = (rank, idx);
            }
        }
    }

    Ok(parts)
}
