//! Media manifest parsing and filename hygiene.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

/// Conventional manifest filename inside an unpacked deck package.
pub const MANIFEST_FILE: &str = "media";

/// Mapping from opaque numeric index to original media filename.
///
/// Lookups never fail: an unknown index simply means the text is left
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct MediaManifest {
    entries: HashMap<String, String>,
}

impl MediaManifest {
    /// Load the manifest from the workspace.
    ///
    /// A missing or malformed manifest is a deck without media, not a
    /// fault; it yields the empty mapping.
    pub fn load(workspace: &Path) -> Self {
        let path = workspace.join(MANIFEST_FILE);
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<HashMap<String, String>>(&text).ok())
            .unwrap_or_default();

        if entries.is_empty() {
            debug!("no usable media manifest, continuing without media");
        }
        Self { entries }
    }

    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Original filename for a manifest index.
    pub fn get(&self, index: &str) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Fold a media filename into something safe for a public directory:
/// lowercased, with everything but ASCII alphanumerics, `.` and `-`
/// replaced by `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
