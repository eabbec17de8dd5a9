//! `sfdx-project.json` resolution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};

pub const PROJECT_FILE: &str = "sfdx-project.json";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectFile {
    #[serde(default)]
    package_directories: Vec<PackageDirectoryEntry>,
    source_api_version: Option<String>,
    #[serde(default)]
    plugins: Plugins,
}

#[derive(Debug, Deserialize)]
struct PackageDirectoryEntry {
    path: String,
    #[serde(default)]
    default: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Plugins {
    #[serde(default)]
    sf_source: SfSourcePlugin,
}

#[derive(Debug, Default, Deserialize)]
struct SfSourcePlugin {
    #[serde(default)]
    hooks: BTreeMap<String, Vec<String>>,
}

/// One package directory, with an absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDirectory {
    pub path: PathBuf,
    pub default: bool,
}

/// A loaded Salesforce DX project.
#[derive(Debug, Clone)]
pub struct SfProject {
    root: PathBuf,
    package_directories: Vec<PackageDirectory>,
    source_api_version: Option<String>,
    hooks: BTreeMap<String, Vec<String>>,
}

impl SfProject {
    /// Load the project whose `sfdx-project.json` sits in `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let file = root.join(PROJECT_FILE);
        let content = std::fs::read_to_string(&file).map_err(|e| {
            Error::with_source(
                ErrorKind::Project(format!("Unable to read {}", file.display())),
                e,
            )
        })?;
        let parsed: ProjectFile = serde_json::from_str(&content).map_err(|e| {
            Error::with_source(
                ErrorKind::Project(format!("Invalid {}: {}", file.display(), e)),
                e,
            )
        })?;

        if parsed.package_directories.is_empty() {
            return Err(Error::new(ErrorKind::Project(format!(
                "{} declares no packageDirectories",
                file.display()
            ))));
        }

        let package_directories = parsed
            .package_directories
            .into_iter()
            .map(|entry| PackageDirectory {
                path: root.join(entry.path.trim_end_matches(['/', '\\'])),
                default: entry.default,
            })
            .collect();

        Ok(Self {
            root: root.to_path_buf(),
            package_directories,
            source_api_version: parsed.source_api_version,
            hooks: parsed.plugins.sf_source.hooks,
        })
    }

    /// Find the nearest project at or above `start`.
    pub fn resolve(start: &Path) -> Result<Self> {
        let start = std::path::absolute(start)?;
        for dir in start.ancestors() {
            if dir.join(PROJECT_FILE).is_file() {
                debug!(root = %dir.display(), "found project");
                return Self::load(dir);
            }
        }
        Err(Error::new(ErrorKind::Project(format!(
            "This command is required to run from within a Salesforce DX project: no {} found at or above {}",
            PROJECT_FILE,
            start.display()
        ))))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_directories(&self) -> &[PackageDirectory] {
        &self.package_directories
    }

    /// The directory flagged `default`, else the first one.
    pub fn default_package_directory(&self) -> &PackageDirectory {
        self.package_directories
            .iter()
            .find(|dir| dir.default)
            .unwrap_or(&self.package_directories[0])
    }

    pub fn source_api_version(&self) -> Option<&str> {
        self.source_api_version.as_deref()
    }

    /// Shell commands configured for a lifecycle event.
    pub fn hook_commands(&self, event: &str) -> &[String] {
        self.hooks.get(event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn hooks(&self) -> impl Iterator<Item = (&str, &str)> {
        self.hooks
            .iter()
            .flat_map(|(event, commands)| {
                commands.iter().map(move |c| (event.as_str(), c.as_str()))
            })
    }
}
