//! Rotation Output
//!
//! Rendering and file writing for a finished rotation. The output file
//! carries one layer name per line, the format game servers consume.

use crate::error::OutputError;
use crate::generate::Rotation;
use std::path::Path;
use tracing::info;

/// Render the rotation as layer names, one per line.
pub fn rotation_lines(rotation: &Rotation) -> String {
    rotation.layer_names().collect::<Vec<_>>().join("\n")
}

/// Write the rendered rotation to `path`, replacing any previous contents.
pub fn write_rotation(rotation: &Rotation, path: &Path) -> Result<(), OutputError> {
    std::fs::write(path, rotation_lines(rotation)).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), layers = rotation.len(), "rotation written");
    Ok(())
}
