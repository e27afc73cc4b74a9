//! Segmenter: interleaves literal special-token scanning with ordinary
//! pre-tokenization regex splitting, per spec §4.D.
//!
//! Control flow follows `darknoon-tiktoken-wasm`'s `_encode_native`: walk a
//! cursor through the text, at each step find the next allowed special
//! literal, regex-split everything before it as ordinary text, emit the
//! special, and advance past it. Unlike that reference (which reuses the
//! ordinary regex to also find specials), spec §4.D and §9 require literal
//! scanning for specials "to avoid accidental capture of special-looking
//! text that is not in the allow-list" -- so this module never runs a regex
//! over special literals at all.

use crate::pattern::PatternSet;
use std::collections::HashSet;

/// One unit of segmented input: either an ordinary byte run to be handed to
/// the BPE core, or a special token recognized by literal scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Ordinary { start: usize, end: usize, text: &'a str },
    Special { start: usize, end: usize, literal: &'a str },
}

impl Segment<'_> {
    pub fn start(&self) -> usize {
        match self {
            Segment::Ordinary { start, .. } | Segment::Special { start, .. } => *start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Segment::Ordinary { end, .. } | Segment::Special { end, .. } => *end,
        }
    }
}

/// Finds the earliest, longest-on-tie occurrence of any allowed literal in
/// `text[from..]`, returning its absolute `(start, end)` byte span.
fn find_next_special(
    text: &str,
    from: usize,
    specials_by_length: &[String],
    allowed: &HashSet<&str>,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for literal in specials_by_length {
        if !allowed.contains(literal.as_str()) {
            continue;
        }
        let Some(rel) = text[from..].find(literal.as_str()) else {
            continue;
        };
        let start = from + rel;
        let end = start + literal.len();
        match best {
            Some((best_start, best_end)) => {
                if start < best_start || (start == best_start && end > best_end) {
                    best = Some((start, end));
                }
            }
            None => best = Some((start, end)),
        }
    }
    best
}

/// Splits `text` into ordinary and special segments in left-to-right order.
///
/// `allowed` is the per-call allow-list (spec §4.D: a literal present in the
/// vocabulary's special table but absent from `allowed` is segmented as
/// ordinary text instead).
pub fn segment<'a>(
    text: &'a str,
    patterns: &PatternSet,
    allowed: &HashSet<&str>,
) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    let mut cursor = 0usize;

    loop {
        let next_special =
            find_next_special(text, cursor, patterns.specials_by_length(), allowed);
        let gap_end = next_special.map_or(text.len(), |(start, _)| start);

        for mat in patterns.regex().find_iter(&text[cursor..gap_end]) {
            let mat = mat.expect("pre-tokenization regex match failed");
            let start = cursor + mat.start();
            let end = cursor + mat.end();
            segments.push(Segment::Ordinary {
                start,
                end,
                text: &text[start..end],
            });
        }

        match next_special {
            Some((start, end)) => {
                segments.push(Segment::Special {
                    start,
                    end,
                    literal: &text[start..end],
                });
                cursor = end;
            }
            None => break,
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{PatternSet, GPT2_PATTERN};

    fn patterns(specials: &[&str]) -> PatternSet {
        PatternSet::compile(
            GPT2_PATTERN,
            specials.iter().map(|s| s.to_string()),
        )
        .unwrap()
    }

    #[test]
    fn splits_around_allowed_special() {
        let p = patterns(&["<|endoftext|>"]);
        let allowed: HashSet<&str> = ["<|endoftext|>"].into_iter().collect();
        let segs = segment("Hello<|endoftext|>World", &p, &allowed);
        assert_eq!(segs.len(), 3);
        assert!(matches!(segs[0], Segment::Ordinary { text: "Hello", .. }));
        assert!(matches!(
            segs[1],
            Segment::Special {
                literal: "<|endoftext|>",
                ..
            }
        ));
        assert!(matches!(segs[2], Segment::Ordinary { text: "World", .. }));
    }

    #[test]
    fn disallowed_special_is_ordinary_text() {
        let p = patterns(&["<|endoftext|>"]);
        let allowed: HashSet<&str> = HashSet::new();
        let segs = segment("Hello<|endoftext|>World", &p, &allowed);
        assert!(segs.iter().all(|s| matches!(s, Segment::Ordinary { .. })));
    }

    #[test]
    fn longest_match_wins_at_same_position() {
        let p = patterns(&["<|a|>", "<|a|>x"]);
        let allowed: HashSet<&str> = ["<|a|>", "<|a|>x"].into_iter().collect();
        let segs = segment("<|a|>x", &p, &allowed);
        assert_eq!(segs.len(), 1);
        assert!(matches!(
            segs[0],
            Segment::Special {
                literal: "<|a|>x",
                ..
            }
        ));
    }

    #[test]
    fn empty_text_yields_no_segments() {
        let p = patterns(&["<|endoftext|>"]);
        let allowed: HashSet<&str> = ["<|endoftext|>"].into_iter().collect();
        assert!(segment("", &p, &allowed).is_empty());
    }
}
