//! nativeboot - bring up a bundled native library exactly once
//!
//! This library locates a platform-specific shared library among the application's
//! bundled resources, extracts it to a temp file the native loader can open, hands
//! its path to the native layer and runs the native initialization call. The outcome
//! is cached for the lifetime of the process and exposed as a capability token.
//!
//! # Modules
//!
//! - [`naming`]: Logical library names and platform file naming
//! - [`resources`]: Bundled resource sets and lookup
//! - [`extract`]: Temp file extraction
//! - [`cleanup`]: Delete-on-exit registry for extracted files
//! - [`properties`]: Process-wide properties used as the path registration channel
//! - [`native`]: Native subsystem boundary (libloading)
//! - [`loader`]: One-time load state and capability token
//! - [`config`]: Configuration management and serialization

pub mod cleanup;
pub mod config;
pub mod error;
pub mod extract;
pub mod loader;
pub mod naming;
pub mod native;
pub mod properties;
pub mod resources;

pub use error::{BootstrapError, NativeError};
pub use loader::{BundledLibrary, LoadOutcome, NativeCapability, NativeLibrary};
pub use naming::{LibraryName, LibraryNaming};
pub use native::{DylibBinding, NativeBinding};
pub use resources::{ChainedResources, DirectoryResources, EmbeddedResources, ResourceRef, ResourceSet};
