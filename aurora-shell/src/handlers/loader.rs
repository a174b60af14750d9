//! Discovery of installed shell handlers.
//!
//! Each subdirectory of the handler directory describes one candidate
//! through a `handler.toml` metadata file. Directories with missing or
//! invalid metadata are skipped with a warning: one broken handler
//! installation must not prevent the others from loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::errors::HandlerError;
use super::types::HandlerMetadata;

const METADATA_FILE_NAME: &str = "handler.toml";

/// Scan `directory` for handler candidates, sorted by directory name so
/// registration order is deterministic.
pub fn scan_handler_dir(directory: &Path) -> Result<Vec<(HandlerMetadata, PathBuf)>, HandlerError> {
    if !directory.exists() {
        warn!(path = %directory.display(), "handler directory does not exist");
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(directory).map_err(|source| HandlerError::Scan {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    let mut found = Vec::new();
    for dir in dirs {
        let metadata_path = dir.join(METADATA_FILE_NAME);
        let contents = match fs::read_to_string(&metadata_path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %metadata_path.display(), error = %e, "no readable handler metadata, skipping");
                continue;
            }
        };
        match toml::from_str::<HandlerMetadata>(&contents) {
            Ok(metadata) => {
                debug!(name = %metadata.name, path = %dir.display(), "found shell handler");
                found.push((metadata, dir));
            }
            Err(e) => {
                warn!(path = %metadata_path.display(), error = %e, "invalid handler metadata, skipping");
            }
        }
    }
    Ok(found)
}
