//! Bundled resource sets and lookup of native binaries inside them
//!
//! A [`ResourceSet`] answers "is there a resource stored under this file name". Absence
//! is an expected outcome on platforms the application does not ship a binary for, so
//! lookups return `Option` rather than an error.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A resolvable reference to one bundled binary
#[derive(Debug, Clone)]
pub enum ResourceRef {
    /// Bytes compiled into the application, usually through `include_bytes!`
    Embedded {
        file_name: String,
        bytes: &'static [u8],
    },
    /// A file inside a resource directory shipped next to the application
    File { file_name: String, path: PathBuf },
}

impl ResourceRef {
    /// File name the resource is stored under
    #[must_use]
    pub fn file_name(&self) -> &str {
        match self {
            Self::Embedded { file_name, .. } | Self::File { file_name, .. } => file_name,
        }
    }

    /// Open a reader over the resource bytes
    ///
    /// # Errors
    /// Returns an error if a file-backed resource cannot be opened
    pub fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match self {
            Self::Embedded { bytes, .. } => Ok(Box::new(*bytes)),
            Self::File { path, .. } => Ok(Box::new(File::open(path)?)),
        }
    }

    /// Printable location of the resource for diagnostics
    #[must_use]
    pub fn location(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded { file_name, bytes } => {
                write!(f, "embedded:{file_name} ({} bytes)", bytes.len())
            }
            Self::File { path, .. } => write!(f, "file:{}", path.display()),
        }
    }
}

/// A set of bundled resources addressable by file name
pub trait ResourceSet: Send + Sync {
    /// Resolve a platform file name, or `None` if the bundle does not carry it
    fn locate(&self, file_name: &str) -> Option<ResourceRef>;
}

/// Resources compiled into the binary
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResources {
    entries: Vec<(&'static str, &'static [u8])>,
}

impl EmbeddedResources {
    #[must_use]
    pub fn new(entries: &[(&'static str, &'static [u8])]) -> Self {
        Self {
            entries: entries.to_vec(),
        }
    }

    /// Add one entry, replacing any previous entry of the same name
    #[must_use]
    pub fn with(mut self, file_name: &'static str, bytes: &'static [u8]) -> Self {
        self.entries.retain(|(name, _)| *name != file_name);
        self.entries.push((file_name, bytes));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceSet for EmbeddedResources {
    fn locate(&self, file_name: &str) -> Option<ResourceRef> {
        self.entries
            .iter()
            .find(|(name, _)| *name == file_name)
            .map(|(name, bytes)| ResourceRef::Embedded {
                file_name: (*name).to_string(),
                bytes: *bytes,
            })
    }
}

/// Resources stored as plain files under a root directory
#[derive(Debug, Clone)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl DirectoryResources {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// `natives/` next to the running executable
    ///
    /// # Errors
    /// Returns an error if the executable path cannot be determined
    pub fn beside_executable() -> io::Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent"))?;
        Ok(Self::new(dir.join("natives")))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSet for DirectoryResources {
    fn locate(&self, file_name: &str) -> Option<ResourceRef> {
        let path = self.root.join(file_name);
        path.is_file().then(|| ResourceRef::File {
            file_name: file_name.to_string(),
            path,
        })
    }
}

/// Several resource sets searched in order, first hit wins
#[derive(Default)]
pub struct ChainedResources {
    sets: Vec<Box<dyn ResourceSet>>,
}

impl ChainedResources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, set: impl ResourceSet + 'static) -> Self {
        self.sets.push(Box::new(set));
        self
    }
}

impl ResourceSet for ChainedResources {
    fn locate(&self, file_name: &str) -> Option<ResourceRef> {
        self.sets.iter().find_map(|set| set.locate(file_name))
    }
}
