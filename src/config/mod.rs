use crate::loader::BundledLibrary;
use crate::naming::LibraryName;
use crate::native::DylibBinding;
use crate::resources::DirectoryResources;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Bootstrap configuration, read from `~/.nativeboot/config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub resources: ResourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryConfig {
    /// Logical library name, mapped to e.g. `lib<name>.so` on Linux
    #[serde(default = "default_library_name")]
    pub name: String,

    /// C entry point called to initialize the library
    #[serde(default = "default_open_symbol")]
    pub open_symbol: String,

    /// Property the native binding reads the library path from
    #[serde(default = "default_path_property")]
    pub path_property: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ExtractionConfig {
    /// Directory extracted files go to; system temp directory when unset
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ResourcesConfig {
    /// Directory holding the bundled binaries; `natives/` beside the executable when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

// Default value functions
fn default_library_name() -> String {
    "jhdf5.2.11.0".to_string()
}

fn default_open_symbol() -> String {
    "H5open".to_string()
}

fn default_path_property() -> String {
    "ncsa.hdf.hdf5lib.H5.hdf5lib".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            name: default_library_name(),
            open_symbol: default_open_symbol(),
            path_property: default_path_property(),
        }
    }
}

impl Config {
    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {}", path.as_ref().display()))?;

        let config: Config = serde_yaml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self).context("Failed to serialize config")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path.as_ref(), contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get default configuration path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;

        Ok(home.join(".nativeboot").join("config.yaml"))
    }

    /// Build the library described by this configuration
    ///
    /// # Errors
    /// Returns an error if the library name is invalid or no resource directory can be
    /// determined
    pub fn bundled_library(&self) -> Result<BundledLibrary> {
        let name = LibraryName::new(self.library.name.as_str())?;
        let resources = match &self.resources.dir {
            Some(dir) => DirectoryResources::new(dir),
            None => DirectoryResources::beside_executable()
                .context("Failed to locate the resource directory")?,
        };
        let binding = DylibBinding::new(
            self.library.path_property.as_str(),
            self.library.open_symbol.as_str(),
        );

        Ok(BundledLibrary::new(name, resources, binding))
    }
}
