//! Package extraction into the workspace.

use std::fs;
use std::io::{self, Cursor};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::error::ConvertError;

/// Expand every entry of the package into `root`, preserving relative
/// paths.
///
/// Entries whose name would escape `root` (absolute paths or
/// parent-directory traversal) fail the whole extraction; a package
/// carrying them is hostile, not merely malformed.
pub fn extract(package: &[u8], root: &Path) -> Result<usize, ConvertError> {
    let mut archive = ZipArchive::new(Cursor::new(package))
        .map_err(|e| ConvertError::PackageFormat(e.to_string()))?;

    let mut count = 0usize;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ConvertError::PackageFormat(e.to_string()))?;

        // enclosed_name() is None for absolute names and anything that
        // traverses above the archive root.
        let Some(rel) = entry.enclosed_name() else {
            return Err(ConvertError::PackageFormat(format!(
                "entry {:?} escapes the extraction root",
                entry.name()
            )));
        };
        let dest = root.join(rel);

        if entry.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| workspace_err(&dest, e))?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| workspace_err(parent, e))?;
        }
        let mut out = fs::File::create(&dest).map_err(|e| workspace_err(&dest, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| workspace_err(&dest, e))?;
        count += 1;
    }

    debug!(files = count, "package extracted");
    Ok(count)
}

fn workspace_err(path: &Path, e: io::Error) -> ConvertError {
    ConvertError::Workspace(format!("failed to write {}: {e}", path.display()))
}
