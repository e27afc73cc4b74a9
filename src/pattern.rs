//! Pattern registry: the fixed pre-tokenization regex per encoder family,
//! and each encoder's default special-token table.

use crate::{Error, Rank};
use fancy_regex::Regex;
use std::collections::HashMap;

/// The gpt2-family pattern, shared by `gpt2`, `r50k_base`, `p50k_base`, and
/// `p50k_edit`.
pub const GPT2_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// The `cl100k_base` pattern (GPT-3.5 / GPT-4 family).
pub const CL100K_PATTERN: &str = r"(?i:'s|'t|'re|'ve|'m|'ll|'d)|[^\r\n\p{L}\p{N}]?\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]+[\r\n]*|\s*[\r\n]+|\s+(?!\S)|\s+";

const ENDOFTEXT: &str = "<|endoftext|>";
const FIM_PREFIX: &str = "<|fim_prefix|>";
const FIM_MIDDLE: &str = "<|fim_middle|>";
const FIM_SUFFIX: &str = "<|fim_suffix|>";
const ENDOFPROMPT: &str = "<|endofprompt|>";

/// Returns the pre-tokenization pattern string for a known encoder name.
pub fn pattern_for_encoder(encoder_name: &str) -> Result<&'static str, Error> {
    match encoder_name {
        "gpt2" | "r50k_base" | "p50k_base" | "p50k_edit" => Ok(GPT2_PATTERN),
        "cl100k_base" => Ok(CL100K_PATTERN),
        other => Err(Error::UnknownEncoder(other.to_string())),
    }
}

/// Returns the default special-token table for a known encoder name.
pub fn default_specials(encoder_name: &str) -> Result<HashMap<String, Rank>, Error> {
    let entries: &[(&str, Rank)] = match encoder_name {
        "gpt2" | "r50k_base" | "p50k_base" => &[(ENDOFTEXT, 50256)],
        "p50k_edit" => &[
            (ENDOFTEXT, 50256),
            (FIM_PREFIX, 50281),
            (FIM_MIDDLE, 50282),
            (FIM_SUFFIX, 50283),
        ],
        "cl100k_base" => &[
            (ENDOFTEXT, 100257),
            (FIM_PREFIX, 100258),
            (FIM_MIDDLE, 100259),
            (FIM_SUFFIX, 100260),
            (ENDOFPROMPT, 100276),
        ],
        other => return Err(Error::UnknownEncoder(other.to_string())),
    };
    Ok(entries.iter().map(|&(k, v)| (k.to_string(), v)).collect())
}

/// A compiled pattern set: the pre-tokenization regex plus the special
/// literals sorted for longest-match-first scanning (spec §3: "sorted by
/// descending length, then lexicographic").
pub struct PatternSet {
    regex: Regex,
    specials_by_length: Vec<String>,
}

impl PatternSet {
    pub fn compile(pat_str: &str, specials: impl Iterator<Item = String>) -> Result<Self, Error> {
        let regex = Regex::new(pat_str)?;
        let mut specials_by_length: Vec<String> = specials.collect();
        specials_by_length.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        Ok(Self {
            regex,
            specials_by_length,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Special literals in longest-match-first order.
    pub fn specials_by_length(&self) -> &[String] {
        &self.specials_by_length
    }
}
