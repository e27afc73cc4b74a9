//! Basic usage example for tiktoken-core
//!
//! Run with: cargo run --example basic -- path/to/ranks/dir

use std::env;
use tiktoken_core::{get_encoding, AllowedSpecial, FileVocabularyLoader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example basic -- <ranks-dir>");
        eprintln!();
        eprintln!("<ranks-dir> must contain cl100k_base.tiktoken");
        std::process::exit(1);
    }

    let ranks_dir = &args[1];
    println!("Loading cl100k_base from: {ranks_dir}");

    let loader = FileVocabularyLoader::new(ranks_dir);
    let enc = get_encoding("cl100k_base", &loader)?;

    println!();
    println!("Encoding loaded: {}", enc.name());
    println!("  ordinary vocab size: {}", enc.n_vocab());
    println!("  max token value: {}", enc.max_token_value());

    let test_text = "Hello, world! This is a test of tiktoken-core. <|endoftext|>";
    println!();
    println!("Test text: {test_text:?}");

    let ids = enc.encode(test_text, &AllowedSpecial::All);
    println!("Tokens ({}): {:?}", ids.len(), ids);

    let decoded = enc.decode(&ids);
    println!("Decoded: {decoded:?}");

    if decoded == test_text {
        println!("round-trip successful");
    } else {
        println!("round-trip mismatch");
    }

    println!();
    println!("Trim suffix to 5 tokens:");
    let trimmed = enc.encode_trim_suffix(test_text, &AllowedSpecial::All, 5);
    println!("  ids: {:?}", trimmed.token_ids);
    println!("  text: {:?}", trimmed.text);

    Ok(())
}
