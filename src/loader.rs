//! One-time loading of a bundled native library
//!
//! A [`BundledLibrary`] walks the sequence locate → extract → register path → native
//! open at most once. Every caller, concurrent or later, sees the same outcome. Hold
//! it in a `static` to make the state process-wide:
//!
//! ```no_run
//! use nativeboot::{BundledLibrary, DirectoryResources, DylibBinding, LibraryName};
//! use once_cell::sync::Lazy;
//!
//! static HDF5: Lazy<BundledLibrary> = Lazy::new(|| {
//!     BundledLibrary::new(
//!         LibraryName::new("jhdf5.2.11.0").expect("valid library name"),
//!         DirectoryResources::new("natives"),
//!         DylibBinding::new("ncsa.hdf.hdf5lib.H5.hdf5lib", "H5open"),
//!     )
//! });
//!
//! if HDF5.ensure_loaded(None) {
//!     // native functionality is available
//! }
//! ```

use crate::error::{BootstrapError, NativeError, Result};
use crate::extract;
use crate::naming::{LibraryName, LibraryNaming};
use crate::native::NativeBinding;
use crate::resources::ResourceSet;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::any::Any;
use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A native library that can be brought up on demand
pub trait NativeLibrary {
    /// Make the library available, extracting files into `temp_dir` (or the system
    /// temp directory when `None`)
    ///
    /// Returns whether the library is usable. Never fails loudly: unavailability is
    /// an expected outcome on unsupported platforms.
    fn load(&self, temp_dir: Option<&Path>) -> bool;
}

/// Result of the single load attempt
#[derive(Debug, Clone, Serialize)]
pub struct LoadOutcome {
    pub library: String,
    pub available: bool,
    /// Location of the bundled resource, if one was found
    pub resource: Option<String>,
    pub extracted_path: Option<PathBuf>,
    /// Status returned by the native open call, if it ran
    pub status: Option<i32>,
    pub failure: Option<String>,
}

impl LoadOutcome {
    fn new(library: &LibraryName) -> Self {
        Self {
            library: library.to_string(),
            available: false,
            resource: None,
            extracted_path: None,
            status: None,
            failure: None,
        }
    }
}

/// Evidence that a native library was initialized successfully
///
/// Only [`BundledLibrary::capability`] hands these out, so code that requires one
/// cannot run before the library is usable.
#[derive(Debug, Clone, Copy)]
pub struct NativeCapability<'a> {
    outcome: &'a LoadOutcome,
}

impl<'a> NativeCapability<'a> {
    #[must_use]
    pub fn library(&self) -> &'a str {
        &self.outcome.library
    }

    /// Where the initialized library file was extracted to
    #[must_use]
    pub fn library_path(&self) -> Option<&'a Path> {
        self.outcome.extracted_path.as_deref()
    }
}

/// A native library shipped inside the application's resources
pub struct BundledLibrary {
    name: LibraryName,
    naming: LibraryNaming,
    resources: Box<dyn ResourceSet>,
    binding: Box<dyn NativeBinding>,
    state: OnceCell<LoadOutcome>,
}

impl BundledLibrary {
    /// Create a library that has not been loaded yet
    pub fn new(
        name: LibraryName,
        resources: impl ResourceSet + 'static,
        binding: impl NativeBinding + 'static,
    ) -> Self {
        Self {
            name,
            naming: LibraryNaming::host(),
            resources: Box::new(resources),
            binding: Box::new(binding),
            state: OnceCell::new(),
        }
    }

    /// Override the platform naming convention used to find the resource
    #[must_use]
    pub fn with_naming(mut self, naming: LibraryNaming) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn name(&self) -> &LibraryName {
        &self.name
    }

    /// File name the bundled resource is looked up under
    #[must_use]
    pub fn resource_file_name(&self) -> String {
        self.naming.map(&self.name)
    }

    /// Ensure the library is initialized and report whether it is available
    ///
    /// Only the first call does any work. Concurrent first callers block until that
    /// attempt finishes; later calls return the cached answer. A `temp_dir` passed
    /// after the attempt has started is ignored.
    pub fn ensure_loaded(&self, temp_dir: Option<&Path>) -> bool {
        if let Some(outcome) = self.state.get() {
            return outcome.available;
        }
        self.state.get_or_init(|| self.attempt(temp_dir)).available
    }

    /// Whether a load attempt has succeeded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.get().is_some_and(|o| o.available)
    }

    /// Outcome of the load attempt, `None` while no attempt has been made
    #[must_use]
    pub fn outcome(&self) -> Option<&LoadOutcome> {
        self.state.get()
    }

    /// Capability token, present only after a successful load
    #[must_use]
    pub fn capability(&self) -> Option<NativeCapability<'_>> {
        self.state
            .get()
            .filter(|o| o.available)
            .map(|outcome| NativeCapability { outcome })
    }

    fn attempt(&self, temp_dir: Option<&Path>) -> LoadOutcome {
        let mut outcome = LoadOutcome::new(&self.name);

        // A panicking binding or resource set still resolves the state
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.try_load(temp_dir, &mut outcome)))
            .unwrap_or_else(|payload| {
                Err(NativeError::Panicked(panic_message(payload.as_ref())).into())
            });

        match result {
            Ok(status) => {
                info!("Native library {} initialized (status {})", self.name, status);
                outcome.available = true;
            }
            Err(BootstrapError::ResourceNotFound(file_name)) => {
                warn!("Unable to find native library: {}", file_name);
                outcome.failure = Some(format!("resource not found: {file_name}"));
            }
            Err(e) => {
                let cause = error_chain(&e);
                warn!("Could not instantiate native library {}: {}", self.name, cause);
                outcome.failure = Some(cause);
            }
        }

        outcome
    }

    fn try_load(&self, temp_dir: Option<&Path>, outcome: &mut LoadOutcome) -> Result<i32> {
        let file_name = self.resource_file_name();
        let resource = self
            .resources
            .locate(&file_name)
            .ok_or(BootstrapError::ResourceNotFound(file_name))?;

        info!("Trying to load native library from: {}", resource.location());
        outcome.resource = Some(resource.location());

        let path = extract::extract(&resource, temp_dir)?;
        outcome.extracted_path = Some(path.clone());

        self.binding.register_path(&path);
        debug!("Registered {} with the native binding", path.display());

        let status = self.binding.open()?;
        outcome.status = Some(status);
        if status < 0 {
            return Err(NativeError::NegativeStatus(status).into());
        }

        Ok(status)
    }
}

impl NativeLibrary for BundledLibrary {
    fn load(&self, temp_dir: Option<&Path>) -> bool {
        self.ensure_loaded(temp_dir)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
