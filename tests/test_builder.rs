//! Integration tests for the builder (spec §4.F): encoder/model name
//! resolution and extra-special merging, using an in-memory
//! [`VocabularyLoader`] so these run without real ranks files on disk.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;
use tiktoken_core::{
    encoding_for_model, get_encoding, AllowedSpecial, Error, FileVocabularyLoader, VocabularyLoader,
};

struct InMemoryLoader {
    bytes: Vec<u8>,
}

impl InMemoryLoader {
    fn all_bytes() -> Self {
        let lines: Vec<String> = (0u8..=255)
            .map(|b| format!("{} {}", STANDARD.encode([b]), b as u32))
            .collect();
        Self {
            bytes: lines.join("\n").into_bytes(),
        }
    }
}

impl VocabularyLoader for InMemoryLoader {
    fn load(&self, _encoder_name: &str) -> Result<Vec<u8>, Error> {
        Ok(self.bytes.clone())
    }
}

#[test]
fn get_encoding_resolves_known_encoders() {
    let loader = InMemoryLoader::all_bytes();
    for name in ["gpt2", "r50k_base", "p50k_base", "p50k_edit", "cl100k_base"] {
        let enc = get_encoding(name, &loader).unwrap();
        assert_eq!(enc.name(), name);
    }
}

#[test]
fn get_encoding_rejects_unknown_name() {
    let loader = InMemoryLoader::all_bytes();
    let err = get_encoding("not_a_real_encoder", &loader).unwrap_err();
    assert!(matches!(err, Error::UnknownEncoder(_)));
}

#[test]
fn cl100k_base_carries_all_five_default_specials() {
    let loader = InMemoryLoader::all_bytes();
    let enc = get_encoding("cl100k_base", &loader).unwrap();
    for literal in [
        "<|endoftext|>",
        "<|fim_prefix|>",
        "<|fim_middle|>",
        "<|fim_suffix|>",
        "<|endofprompt|>",
    ] {
        assert!(enc.vocabulary().special_rank(literal).is_some());
    }
}

#[test]
fn encoding_for_model_maps_gpt4_family_to_cl100k() {
    let loader = InMemoryLoader::all_bytes();
    for model in ["gpt-4", "gpt-4-32k", "gpt-3.5-turbo", "gpt-3.5-turbo-0301"] {
        let enc = encoding_for_model(model, HashMap::new(), &loader).unwrap();
        assert_eq!(enc.name(), "cl100k_base");
    }
}

#[test]
fn encoding_for_model_maps_legacy_models_to_r50k() {
    let loader = InMemoryLoader::all_bytes();
    for model in ["davinci", "curie", "babbage", "ada", "text-davinci-001"] {
        let enc = encoding_for_model(model, HashMap::new(), &loader).unwrap();
        assert_eq!(enc.name(), "r50k_base");
    }
}

#[test]
fn encoding_for_model_rejects_unknown_model() {
    let loader = InMemoryLoader::all_bytes();
    let err = encoding_for_model("totally-made-up-model", HashMap::new(), &loader).unwrap_err();
    assert!(matches!(err, Error::UnknownModel(_)));
}

#[test]
fn caller_ranks_override_defaults_on_collision() {
    let loader = InMemoryLoader::all_bytes();
    let mut extra = HashMap::new();
    // Override the default <|endoftext|> rank for gpt2.
    extra.insert("<|endoftext|>".to_string(), 99999);
    let enc = encoding_for_model("gpt2", extra, &loader).unwrap();
    assert_eq!(enc.vocabulary().special_rank("<|endoftext|>"), Some(99999));
}

#[test]
fn file_vocabulary_loader_reads_ranks_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let lines: Vec<String> = (0u8..=255)
        .map(|b| format!("{} {}", STANDARD.encode([b]), b as u32))
        .collect();
    std::fs::write(dir.path().join("gpt2.tiktoken"), lines.join("\n")).unwrap();

    let loader = FileVocabularyLoader::new(dir.path());
    let enc = get_encoding("gpt2", &loader).unwrap();
    assert_eq!(enc.n_vocab(), 256);
}

#[test]
fn file_vocabulary_loader_propagates_missing_file_as_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = FileVocabularyLoader::new(dir.path());
    let err = get_encoding("gpt2", &loader).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn extra_specials_add_new_literals() {
    let loader = InMemoryLoader::all_bytes();
    let mut extra = HashMap::new();
    extra.insert("<|custom|>".to_string(), 90000);
    let enc = encoding_for_model("gpt2", extra, &loader).unwrap();
    let ids = enc.encode("<|custom|>", &AllowedSpecial::All);
    assert_eq!(ids, vec![90000]);
}
