//! Data structures shared across the conversion pipeline.
//!
//! - Note: one row of the embedded collection store
//! - AssetOutcome: tagged result of handling one media asset
//! - Export: the finished tabular output handed to the caller

/// One row of the embedded `notes` relation.
///
/// A read-only snapshot for the duration of one conversion. Note order
/// is whatever the store yields; the pipeline never sorts.
#[derive(Debug, Clone)]
pub struct Note {
    /// Store-assigned note id.
    pub id: i64,

    /// Raw field content, individual fields joined by U+001F.
    pub fields_blob: String,

    /// Space-separated tag list. Parsed but not emitted per row.
    pub tags: String,

    /// Note type id. Read for completeness; single-model export only.
    pub model_id: i64,
}

/// Outcome of resolving one referenced media asset.
///
/// Recorded once per manifest index, in first-reference order, so
/// callers and tests can assert on asset handling directly instead of
/// scraping logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Transcoded and persisted; `public_path` is what the exported
    /// text now references.
    Resolved { index: String, public_path: String },

    /// Left as found in the text.
    Skipped { index: String, reason: String },
}

impl AssetOutcome {
    /// Manifest index this outcome belongs to.
    pub fn index(&self) -> &str {
        match self {
            AssetOutcome::Resolved { index, .. } => index,
            AssetOutcome::Skipped { index, .. } => index,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, AssetOutcome::Resolved { .. })
    }
}

/// The finished export handed back to the caller.
#[derive(Debug, Clone)]
pub struct Export {
    /// Tabular text: header line plus one tab-separated line per note.
    pub csv: String,

    /// Suggested download filename, `<package-base>.csv`.
    pub filename: String,

    /// Content classification for HTTP-style callers.
    pub content_type: &'static str,

    /// Per-asset outcomes, in first-reference order.
    pub assets: Vec<AssetOutcome>,
}
