//! Lookup of org aliases in the sf CLI alias store.
//!
//! The sf CLI keeps aliases in `~/.sfdx/alias.json`:
//!
//! ```json
//! { "orgs": { "dev": "admin@example.com" } }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
struct AliasFile {
    #[serde(default)]
    orgs: HashMap<String, String>,
}

/// Read-only view of the sf CLI alias store.
#[derive(Debug, Default)]
pub struct AliasStore {
    orgs: HashMap<String, String>,
}

impl AliasStore {
    /// Default location of the alias file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".sfdx").join("alias.json"))
    }

    /// Load the store from the default location.
    ///
    /// A missing file yields an empty store.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load the store from `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let file: AliasFile = serde_json::from_str(&content)?;
        Ok(Self { orgs: file.orgs })
    }

    /// Resolve an alias to a username. Unknown values are returned as-is,
    /// since the caller may already have passed a username.
    pub fn resolve<'a>(&'a self, alias_or_username: &'a str) -> &'a str {
        self.orgs
            .get(alias_or_username)
            .map(String::as_str)
            .unwrap_or(alias_or_username)
    }
}
