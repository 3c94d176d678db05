//! Logical library names and the platform file naming convention

use crate::error::{BootstrapError, Result};
use std::fmt;

/// A library identifier independent of operating system naming, e.g. `jhdf5.2.11.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryName(String);

impl LibraryName {
    /// Validate a logical library name
    ///
    /// # Errors
    /// Returns [`BootstrapError::InvalidName`] if the name is empty, contains a path
    /// separator or contains a NUL byte. This is a programming error on the caller's side.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let reason = if name.trim().is_empty() {
            Some("name is empty")
        } else if name.contains(['/', '\\']) {
            Some("name contains a path separator")
        } else if name.contains('\0') {
            Some("name contains a NUL byte")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(BootstrapError::InvalidName { name, reason }),
            None => Ok(Self(name)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LibraryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prefix/suffix decoration the native loader expects on a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryNaming {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl LibraryNaming {
    /// Naming convention of the running host
    #[must_use]
    pub const fn host() -> Self {
        Self {
            prefix: std::env::consts::DLL_PREFIX,
            suffix: std::env::consts::DLL_SUFFIX,
        }
    }

    /// Naming convention for an operating system as spelled by `std::env::consts::OS`
    ///
    /// Unknown systems are treated as ELF unixes.
    #[must_use]
    pub fn for_os(os: &str) -> Self {
        match os {
            "windows" => Self {
                prefix: "",
                suffix: ".dll",
            },
            "macos" | "ios" => Self {
                prefix: "lib",
                suffix: ".dylib",
            },
            _ => Self {
                prefix: "lib",
                suffix: ".so",
            },
        }
    }

    /// Map a logical name to the file name a bundled resource is stored under
    #[must_use]
    pub fn map(&self, name: &LibraryName) -> String {
        format!("{}{}{}", self.prefix, name.as_str(), self.suffix)
    }
}

impl Default for LibraryNaming {
    fn default() -> Self {
        Self::host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_invalid_names() {
        assert!(LibraryName::new("").is_err());
        assert!(LibraryName::new("   ").is_err());
        assert!(LibraryName::new("../evil").is_err());
        assert!(LibraryName::new("a\\b").is_err());
        assert!(LibraryName::new("nul\0byte").is_err());
    }

    #[test]
    fn test_platform_mappings() {
        let name = LibraryName::new("mylib.1.0.0").unwrap();
        assert_eq!(LibraryNaming::for_os("linux").map(&name), "libmylib.1.0.0.so");
        assert_eq!(LibraryNaming::for_os("windows").map(&name), "mylib.1.0.0.dll");
        assert_eq!(LibraryNaming::for_os("macos").map(&name), "libmylib.1.0.0.dylib");
    }

    #[test]
    fn test_host_matches_for_os() {
        assert_eq!(
            LibraryNaming::host(),
            LibraryNaming::for_os(std::env::consts::OS)
        );
    }

    proptest! {
        #[test]
        fn mapped_name_wraps_logical_name(name in "[A-Za-z0-9_][A-Za-z0-9_.-]{0,24}") {
            let name = LibraryName::new(name).unwrap();
            for os in ["linux", "macos", "windows", "freebsd"] {
                let naming = LibraryNaming::for_os(os);
                let mapped = naming.map(&name);
                prop_assert!(mapped.starts_with(naming.prefix));
                prop_assert!(mapped.ends_with(naming.suffix));
                prop_assert_eq!(mapped.len(), naming.prefix.len() + name.as_str().len() + naming.suffix.len());
            }
        }
    }
}
