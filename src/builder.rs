//! Builder (spec §4.F): resolves an encoder by name or by model name,
//! injects caller-supplied special tokens, and hands back a ready-to-use
//! [`Encoding`].
//!
//! Vocabulary bytes are obtained through the [`VocabularyLoader`] seam
//! (spec §10.4) rather than read directly, keeping file I/O and any future
//! download/caching policy out of the core -- spec §1 names both as
//! external collaborators.

use crate::encoding::Encoding;
use crate::pattern::{self, PatternSet};
use crate::vocab::Vocabulary;
use crate::{Error, Rank};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies vocabulary bytes for a named encoder. The core never performs
/// I/O itself; every byte it reads comes from a call to this trait.
pub trait VocabularyLoader {
    fn load(&self, encoder_name: &str) -> Result<Vec<u8>, Error>;
}

/// The obvious default loader: reads `<dir>/<encoder_name>.tiktoken`, taking
/// a filesystem root and resolving a well-known filename under it. Download
/// and on-disk caching policy (ETags, retry, XDG cache dirs) are explicitly
/// out of scope (spec §1 Non-goals) -- a caller who wants that wraps this
/// loader or supplies their own.
pub struct FileVocabularyLoader {
    dir: PathBuf,
}

impl FileVocabularyLoader {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl VocabularyLoader for FileVocabularyLoader {
    fn load(&self, encoder_name: &str) -> Result<Vec<u8>, Error> {
        let path = self.dir.join(format!("{encoder_name}.tiktoken"));
        log::debug!("loading vocabulary for {encoder_name} from {}", path.display());
        std::fs::read(&path).map_err(Error::Io)
    }
}

/// Model name -> encoder name, per spec §6's authoritative table. Checked
/// as an exact match first, then by longest-matching prefix (mirroring
/// `darknight-tiktoken-rs`'s `MODEL_TO_ENCODING`/`MODEL_PREFIX_TO_ENCODING`
/// two-tier lookup, so a new dated model release like `gpt-4-32k-0314`
/// resolves without a library update).
const MODEL_EXACT: &[(&str, &str)] = &[
    ("gpt-3.5-turbo", "cl100k_base"),
    ("text-davinci-003", "p50k_base"),
    ("text-davinci-002", "p50k_base"),
    ("code-davinci-002", "p50k_base"),
    ("code-davinci-001", "p50k_base"),
    ("code-cushman-002", "p50k_base"),
    ("code-cushman-001", "p50k_base"),
    ("davinci-codex", "p50k_base"),
    ("cushman-codex", "p50k_base"),
    ("text-davinci-edit-001", "p50k_edit"),
    ("code-davinci-edit-001", "p50k_edit"),
    ("davinci", "r50k_base"),
    ("curie", "r50k_base"),
    ("babbage", "r50k_base"),
    ("ada", "r50k_base"),
    ("text-davinci-001", "r50k_base"),
    ("text-curie-001", "r50k_base"),
    ("text-babbage-001", "r50k_base"),
    ("text-ada-001", "r50k_base"),
    ("gpt2", "gpt2"),
];

const MODEL_PREFIX: &[(&str, &str)] = &[
    ("gpt-4-", "cl100k_base"),
    ("gpt-4", "cl100k_base"),
    ("gpt-3.5-turbo-", "cl100k_base"),
    ("text-similarity-", "r50k_base"),
    ("text-search-", "r50k_base"),
    ("code-search-", "r50k_base"),
];

fn resolve_model_to_encoder(model_name: &str) -> Option<&'static str> {
    if let Some(&(_, encoder)) = MODEL_EXACT.iter().find(|&&(m, _)| m == model_name) {
        return Some(encoder);
    }
    MODEL_PREFIX
        .iter()
        .filter(|&&(prefix, _)| model_name.starts_with(prefix))
        .max_by_key(|&&(prefix, _)| prefix.len())
        .map(|&(_, encoder)| encoder)
}

/// Builds the encoder named `encoder_name` (one of `gpt2`, `r50k_base`,
/// `p50k_base`, `p50k_edit`, `cl100k_base`), loading its vocabulary through
/// `loader` and composing it with that encoder's fixed pattern and default
/// special-token table.
pub fn get_encoding(encoder_name: &str, loader: &dyn VocabularyLoader) -> Result<Encoding, Error> {
    log::trace!("resolving encoder {encoder_name}");
    let pattern_str = pattern::pattern_for_encoder(encoder_name)?;
    let defaults = pattern::default_specials(encoder_name)?;

    let bytes = loader.load(encoder_name)?;
    let vocab = Vocabulary::from_tiktoken_bytes(&bytes)?.with_specials(defaults.clone())?;
    log::debug!(
        "loaded {encoder_name}: {} ordinary tokens, {} specials",
        vocab.n_vocab(),
        defaults.len()
    );

    log::debug!("compiling pattern for {encoder_name}");
    let patterns = PatternSet::compile(pattern_str, defaults.keys().cloned())?;
    Ok(Encoding::new(encoder_name, vocab, patterns))
}

/// Builds the encoder appropriate for `model_name` (spec §6's model ->
/// encoder table), merging `extra_specials` into the encoder's default
/// special-token set. Caller-supplied ranks win on key collision with a
/// default (spec §4.F).
pub fn encoding_for_model(
    model_name: &str,
    extra_specials: HashMap<String, Rank>,
    loader: &dyn VocabularyLoader,
) -> Result<Encoding, Error> {
    let encoder_name = resolve_model_to_encoder(model_name)
        .ok_or_else(|| Error::UnknownModel(model_name.to_string()))?;
    log::trace!("model {model_name} resolved to encoder {encoder_name}");

    let pattern_str = pattern::pattern_for_encoder(encoder_name)?;
    let mut specials = pattern::default_specials(encoder_name)?;
    specials.extend(extra_specials);

    let bytes = loader.load(encoder_name)?;
    let vocab = Vocabulary::from_tiktoken_bytes(&bytes)?.with_specials(specials.clone())?;

    log::debug!("compiling pattern for {encoder_name}");
    let patterns = PatternSet::compile(pattern_str, specials.keys().cloned())?;
    Ok(Encoding::new(encoder_name, vocab, patterns))
}
