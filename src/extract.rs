//! Materializing bundled binaries as real files the native loader can open

use crate::cleanup;
use crate::error::{BootstrapError, Result};
use crate::resources::ResourceRef;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create an empty temp file `<prefix><random><extension>` that is deleted on exit
///
/// `extension` includes its leading dot, or is empty. Files go to `dir`, or to the
/// system temp directory when `dir` is `None`.
///
/// # Errors
/// Returns [`BootstrapError::Extraction`] if the file cannot be created
pub fn create_temp_file(prefix: &str, extension: &str, dir: Option<&Path>) -> Result<(File, PathBuf)> {
    let dir = dir.map_or_else(std::env::temp_dir, Path::to_path_buf);
    let fail = |source: io::Error| BootstrapError::Extraction {
        resource: format!("{prefix}{extension}"),
        dir: dir.clone(),
        source,
    };

    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(extension)
        .tempfile_in(&dir)
        .map_err(fail)?;
    let (file, path) = temp.keep().map_err(|e| fail(e.error))?;
    let path = std::path::absolute(&path).map_err(fail)?;

    cleanup::delete_on_exit(&path);
    Ok((file, path))
}

/// Copy a resource into a fresh temp file and return the file's absolute path
///
/// The temp file keeps the resource's base name as prefix and its extension as
/// suffix, since some loaders decide what to do by extension.
///
/// # Errors
/// Returns [`BootstrapError::Extraction`] on any I/O failure while creating the file
/// or copying the resource bytes
pub fn extract(resource: &ResourceRef, dir: Option<&Path>) -> Result<PathBuf> {
    let (prefix, extension) = split_file_name(resource.file_name());
    let (mut file, path) = create_temp_file(&prefix, &extension, dir)?;

    let fail = |source: io::Error| BootstrapError::Extraction {
        resource: resource.location(),
        dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        source,
    };

    let mut reader = resource.open().map_err(fail)?;
    let copied = io::copy(&mut reader, &mut file).map_err(fail)?;
    file.flush().map_err(fail)?;
    file.sync_all().map_err(fail)?;
    drop(file);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).map_err(fail)?;
    }

    debug!("Extracted {} bytes of {} to {}", copied, resource.location(), path.display());
    Ok(path)
}

/// Split `libfoo.1.2.so` into (`libfoo.1.2`, `.so`)
fn split_file_name(file_name: &str) -> (String, String) {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map_or_else(|| file_name.to_string(), |s| s.to_string_lossy().into_owned());
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (stem, extension)
}
