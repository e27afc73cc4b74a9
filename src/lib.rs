//! # tiktoken-core
//!
//! Byte-pair encoding tokenizer engine compatible with the "tiktoken" family
//! of vocabularies used by the GPT-2, GPT-3, and GPT-4 model lineages.
//!
//! ## Features
//!
//! - Pure Rust, no bindings to the reference Python/Rust extension
//! - Bit-exact with the reference vocabulary files (`gpt2`, `r50k_base`,
//!   `p50k_base`, `p50k_edit`, `cl100k_base`)
//! - Budget-constrained trim encoding that keeps the decoded text a
//!   well-formed prefix/suffix of the input
//! - Immutable after construction; safe to share across threads
//!
//! ## Example
//!
//! ```no_run
//! use tiktoken_core::{get_encoding, FileVocabularyLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = FileVocabularyLoader::new("./ranks");
//! let enc = get_encoding("cl100k_base", &loader)?;
//!
//! let ids = enc.encode("Hello world", &Default::default());
//! let text = enc.decode(&ids);
//! assert_eq!(text, "Hello world");
//! # Ok(())
//! # }
//! ```

pub mod bpe;
pub mod builder;
pub mod encoding;
pub mod invariants;
pub mod pattern;
pub mod segmenter;
pub mod vocab;

pub use builder::{encoding_for_model, get_encoding, FileVocabularyLoader, VocabularyLoader};
pub use encoding::{AllowedSpecial, EncodeTrimResult, Encoding};
pub use vocab::Vocabulary;

/// Dense token identifier. Also referred to as "rank" throughout this crate,
/// matching the vocabulary's own terminology: a token's rank is both its
/// position in the dense ordinary range and its identifier.
pub type Rank = u32;

/// Upper bound on a single vocabulary entry's byte length. Purely a sanity
/// guard against a corrupt loader; real tiktoken vocabularies stay well
/// under this.
pub const MAX_TOKEN_LENGTH: usize = 1024;

/// Upper bound on the number of tokens a single `encode` call may emit,
/// guarding against runaway memory use on adversarial input.
pub const MAX_OUTPUT_TOKENS: usize = 1_000_000;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("corrupt vocabulary data: {0}")]
    LoadCorrupt(String),

    #[error("unknown encoder: {0}")]
    UnknownEncoder(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("failed to compile pattern: {0}")]
    PatternCompile(#[from] fancy_regex::Error),

    #[error("vocabulary incomplete: {0}")]
    VocabIncomplete(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
