//! deckport - flashcard deck package to CSV converter
//!
//! Converts an Anki-style `.apkg` package into a flat tab-separated
//! export, reconstructing readable note content and rewriting embedded
//! media references.
//!
//! # Pipeline
//!
//! One conversion is a single forward-only pass:
//! - unpack the package into an ephemeral workspace
//! - read every note from the embedded SQLite collection
//! - load the media manifest (index -> original filename)
//! - split each note's raw blob on the unit separator and rewrite the
//!   first two fields: resolve image references, drop sound tokens,
//!   normalize line breaks, strip the remaining markup
//! - assemble the delimited text
//!
//! The workspace is removed on every exit path. Transcoded images land
//! in a persistent, conversion-namespaced directory that survives only
//! a successful conversion.
//!
//! # Modules
//!
//! - `core`: the pipeline components
//! - `domain`: shared data structures (Note, AssetOutcome, Export)
//! - `config`: resolved conversion options
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! deckport convert my-deck.apkg
//! deckport inspect my-deck.apkg --json
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;

// Re-export main types at crate root for convenience
pub use crate::config::ConvertOptions;
pub use crate::core::pipeline::Converter;
pub use crate::domain::{AssetOutcome, Export, Note};
pub use crate::error::ConvertError;
