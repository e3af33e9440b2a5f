//! Resolver configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Resolution behavior that differs between hosts
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Whether the type parameters of a method anchor are visible to the first segment
    pub method_type_parameters_in_scope: bool,
    /// Whether an unqualified type name with no `{...}` and no parameter list finds
    /// generic types of any arity
    pub standalone_generic_types: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            method_type_parameters_in_scope: true,
            standalone_generic_types: true,
        }
    }
}

/// An options file that could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read resolver options from {}", path.display())]
    Io {
        /// The file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// The text is not valid options TOML
    #[error("failed to parse resolver options")]
    Parse(#[from] toml::de::Error),
}

impl ResolverOptions {
    /// Parse options from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
