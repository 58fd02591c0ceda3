//! Conversion pipeline components.
//!
//! This module contains:
//! - workspace: scratch and persistent directory lifecycle
//! - archive: package extraction
//! - collection: embedded database access
//! - media: manifest parsing and filename hygiene
//! - rewrite: field splitting and content rewriting
//! - transcode: image decoding and JPEG re-encoding
//! - serialize: tabular assembly
//! - pipeline: the Converter driving everything in order

pub mod archive;
pub mod collection;
pub mod media;
pub mod pipeline;
pub mod rewrite;
pub mod serialize;
pub mod transcode;
pub mod workspace;

// Re-export commonly used types
pub use media::MediaManifest;
pub use pipeline::Converter;
pub use rewrite::{split_fields, ResolvedAsset, Rewriter, FIELD_SEPARATOR};
pub use serialize::ExportRow;
pub use transcode::Transcoder;
pub use workspace::{MediaOutputDir, Workspace};
