//! Boundary to the native subsystem
//!
//! Safe wrapper around the dynamic library:
//! - The library path travels through a process property, like the native layer expects
//! - Dynamic loading with libloading
//! - The library stays mapped for the rest of the process once opened

use crate::error::NativeError;
use crate::properties;
use libloading::{Library, Symbol};
use once_cell::sync::OnceCell;
use std::os::raw::c_int;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Native layer a bundled library is handed to
pub trait NativeBinding: Send + Sync {
    /// Tell the native layer where its library file lives
    fn register_path(&self, path: &Path);

    /// Perform the native open/initialize call and return its status code
    ///
    /// # Errors
    /// Returns an error if the library cannot be linked or the entry point is missing.
    /// A negative status is returned as `Ok` and judged by the caller.
    fn open(&self) -> Result<i32, NativeError>;
}

/// Function signature for the native open entry point
pub type OpenFn = unsafe extern "C" fn() -> c_int;

/// Binding that dlopens the registered file and calls a C entry point
pub struct DylibBinding {
    path_property: String,
    open_symbol: String,
    library: OnceCell<Library>,
}

impl DylibBinding {
    /// Create a binding reading its library path from `path_property` and calling `open_symbol`
    pub fn new(path_property: impl Into<String>, open_symbol: impl Into<String>) -> Self {
        Self {
            path_property: path_property.into(),
            open_symbol: open_symbol.into(),
            library: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn path_property(&self) -> &str {
        &self.path_property
    }

    #[must_use]
    pub fn open_symbol(&self) -> &str {
        &self.open_symbol
    }

    /// The opened library, if `open` has linked it
    #[must_use]
    pub fn library(&self) -> Option<&Library> {
        self.library.get()
    }

    fn link(&self) -> Result<&Library, NativeError> {
        self.library.get_or_try_init(|| {
            let path = properties::get(&self.path_property)
                .map(PathBuf::from)
                .ok_or_else(|| NativeError::PathNotRegistered(self.path_property.clone()))?;

            debug!("Linking native library {}", path.display());
            // SAFETY: loading runs the library's initializers; the file was extracted
            // from resources shipped with this application
            unsafe { Library::new(&path) }.map_err(|source| NativeError::Link { path, source })
        })
    }
}

impl NativeBinding for DylibBinding {
    fn register_path(&self, path: &Path) {
        properties::set(self.path_property.as_str(), path.as_os_str());
    }

    fn open(&self) -> Result<i32, NativeError> {
        let library = self.link()?;

        // SAFETY: the open entry point is declared by the native library as
        // `int fn(void)`, matching OpenFn
        let status = unsafe {
            let open: Symbol<OpenFn> = library.get(self.open_symbol.as_bytes()).map_err(|source| {
                NativeError::MissingSymbol {
                    symbol: self.open_symbol.clone(),
                    source,
                }
            })?;
            open()
        };

        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_without_registered_path() {
        let binding = DylibBinding::new("nativeboot.test.native.unregistered", "H5open");
        let err = binding.open().unwrap_err();
        assert!(matches!(err, NativeError::PathNotRegistered(_)), "{err}");
        assert!(binding.library().is_none());
    }

    #[test]
    fn test_register_path_sets_property() {
        let binding = DylibBinding::new("nativeboot.test.native.register", "H5open");
        binding.register_path(Path::new("/opt/lib/libfoo.so"));
        assert_eq!(
            properties::get(binding.path_property()).map(PathBuf::from),
            Some(PathBuf::from("/opt/lib/libfoo.so"))
        );
    }

    #[test]
    fn test_open_garbage_file_is_link_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(format!(
            "{}garbage{}",
            std::env::consts::DLL_PREFIX,
            std::env::consts::DLL_SUFFIX
        ));
        std::fs::write(&path, b"definitely not a shared library").unwrap();

        let binding = DylibBinding::new("nativeboot.test.native.garbage", "H5open");
        binding.register_path(&path);
        let err = binding.open().unwrap_err();
        assert!(matches!(err, NativeError::Link { .. }), "{err}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_link_uses_exact_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = tempdir().unwrap();
        let dir = root.path().join(OsStr::from_bytes(b"d\xff"));
        std::fs::create_dir(&dir).unwrap();
        let path = dir.join("libgarbage.so");
        std::fs::write(&path, b"definitely not a shared library").unwrap();

        let binding = DylibBinding::new("nativeboot.test.native.non_utf8", "H5open");
        binding.register_path(&path);
        match binding.open().unwrap_err() {
            NativeError::Link { path: linked, .. } => {
                assert_eq!(linked, path);
                assert!(linked.exists());
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
