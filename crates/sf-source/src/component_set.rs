//! Component sets: the resolved metadata an operation works on.

use std::io::Write;
use std::path::{Path, PathBuf};

use busbar_sf_metadata::{PackageManifest, RetrieveRequest};
use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, ErrorKind, Result};
use crate::input::{WorkDescriptor, WorkItem};
use crate::project::{PackageDirectory, SfProject};
use crate::registry::{self, MetadataType, Strategy, META_SUFFIX};

/// One local file and where it lives inside a deploy archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub archive_path: String,
}

/// A component found in a package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceComponent {
    pub type_name: String,
    pub full_name: String,
    pub files: Vec<SourceFile>,
}

/// Resolves a work item against the project's package directories.
pub trait ComponentSetBuilder: Send + Sync {
    fn build(&self, work: &WorkItem, package_dirs: &[PackageDirectory]) -> Result<ComponentSet>;
}

/// Builder backed by the type registry and the local file tree.
#[derive(Debug, Clone)]
pub struct ProjectComponentSetBuilder {
    api_version: String,
}

impl ProjectComponentSetBuilder {
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
        }
    }

    /// Use the project's `sourceApiVersion`, else the client default.
    pub fn for_project(project: &SfProject) -> Self {
        Self::new(
            project
                .source_api_version()
                .unwrap_or(busbar_sf_metadata::DEFAULT_API_VERSION),
        )
    }
}

impl ComponentSetBuilder for ProjectComponentSetBuilder {
    fn build(&self, work: &WorkItem, package_dirs: &[PackageDirectory]) -> Result<ComponentSet> {
        let (manifest, components) = match &work.descriptor {
            WorkDescriptor::TypeNames(entries) => {
                let mut manifest = PackageManifest::new(self.api_version.as_str());
                for entry in entries {
                    let (type_name, member) = match entry.split_once(':') {
                        Some((t, m)) => (t.trim(), m.trim()),
                        None => (entry.trim(), "*"),
                    };
                    let metadata_type = registry::by_name(type_name).ok_or_else(|| {
                        Error::new(ErrorKind::Build(format!(
                            "Missing metadata type definition in registry for id '{}'.",
                            type_name
                        )))
                    })?;
                    manifest.add_member(metadata_type.name, member);
                }
                let components = select(discover(package_dirs)?, &manifest);
                (manifest, components)
            }
            WorkDescriptor::Manifest(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::with_source(
                        ErrorKind::Build(format!(
                            "Unable to read manifest {}: {}",
                            path.display(),
                            e
                        )),
                        e,
                    )
                })?;
                let mut manifest = PackageManifest::from_package_xml(&content).map_err(|e| {
                    Error::with_source(
                        ErrorKind::Build(format!("Invalid manifest {}: {}", path.display(), e)),
                        e,
                    )
                })?;
                if manifest.version.is_empty() {
                    manifest.version = self.api_version.clone();
                }
                let components = select(discover(package_dirs)?, &manifest);
                (manifest, components)
            }
            WorkDescriptor::Paths(paths) => {
                let local = discover(package_dirs)?;
                let mut selected: Vec<SourceComponent> = Vec::new();
                for path in paths {
                    let resolved = std::fs::canonicalize(path).map_err(|e| {
                        Error::with_source(
                            ErrorKind::Build(format!(
                                "The sourcepath \"{}\" is not a valid source file path.",
                                path.display()
                            )),
                            e,
                        )
                    })?;
                    let hits: Vec<&SourceComponent> = local
                        .iter()
                        .filter(|c| c.files.iter().any(|f| f.path.starts_with(&resolved)))
                        .collect();
                    if hits.is_empty() {
                        return Err(Error::new(ErrorKind::Build(format!(
                            "No source-backed components present in {}",
                            path.display()
                        ))));
                    }
                    for hit in hits {
                        if !selected.contains(hit) {
                            selected.push(hit.clone());
                        }
                    }
                }
                (manifest_for(&self.api_version, &selected), selected)
            }
            WorkDescriptor::PackageNames(_) => {
                (PackageManifest::new(self.api_version.as_str()), Vec::new())
            }
        };

        let package_names = match &work.descriptor {
            WorkDescriptor::PackageNames(names) => names.clone(),
            _ => work.package_names.clone(),
        };

        debug!(
            types = manifest.types.len(),
            components = components.len(),
            packages = package_names.len(),
            "built component set"
        );
        ComponentSet::new(manifest, components, package_names)
    }
}

fn manifest_for(api_version: &str, components: &[SourceComponent]) -> PackageManifest {
    let mut manifest = PackageManifest::new(api_version);
    for component in components {
        manifest.add_member(component.type_name.as_str(), component.full_name.as_str());
    }
    manifest
}

fn select(local: Vec<SourceComponent>, manifest: &PackageManifest) -> Vec<SourceComponent> {
    local
        .into_iter()
        .filter(|c| {
            manifest
                .members_of(&c.type_name)
                .iter()
                .any(|m| m == "*" || *m == c.full_name)
        })
        .collect()
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

/// Every registry-known component under the package directories.
pub(crate) fn discover(package_dirs: &[PackageDirectory]) -> Result<Vec<SourceComponent>> {
    let mut found = Vec::new();
    for dir in package_dirs {
        if dir.path.is_dir() {
            walk(&std::fs::canonicalize(&dir.path)?, &mut found)?;
        }
    }
    Ok(found)
}

fn walk(dir: &Path, found: &mut Vec<SourceComponent>) -> Result<()> {
    if let Some(metadata_type) = registry::by_directory(file_name(dir)) {
        return collect_type_dir(dir, metadata_type, found);
    }
    for entry in sorted_entries(dir)? {
        if entry.is_dir() {
            walk(&entry, found)?;
        }
    }
    Ok(())
}

fn collect_type_dir(
    dir: &Path,
    metadata_type: &MetadataType,
    found: &mut Vec<SourceComponent>,
) -> Result<()> {
    let entries = sorted_entries(dir)?;

    if metadata_type.strategy == Strategy::Bundle {
        for bundle in entries.iter().filter(|e| e.is_dir()) {
            let name = file_name(bundle).to_string();
            let mut files = Vec::new();
            bundle_files(
                bundle,
                &format!("{}/{}", metadata_type.directory, name),
                &mut files,
            )?;
            found.push(SourceComponent {
                type_name: metadata_type.name.to_string(),
                full_name: name,
                files,
            });
        }
        return Ok(());
    }

    for entry in &entries {
        if entry.is_dir() {
            collect_type_dir(entry, metadata_type, found)?;
            continue;
        }
        let meta_name = file_name(entry);
        let Some(full_name) = metadata_type.component_name(meta_name) else {
            continue;
        };

        let mut files = Vec::new();
        if metadata_type.strategy == Strategy::ContentWithMeta {
            let prefix = format!("{}.", full_name);
            for sibling in &entries {
                let sibling_name = file_name(sibling);
                if sibling.is_file()
                    && sibling_name.starts_with(&prefix)
                    && !sibling_name.ends_with(META_SUFFIX)
                {
                    files.push(SourceFile {
                        path: sibling.clone(),
                        archive_path: format!(
                            "{}/{}.{}",
                            metadata_type.directory, full_name, metadata_type.suffix
                        ),
                    });
                }
            }
        }
        files.push(SourceFile {
            path: entry.clone(),
            archive_path: format!(
                "{}/{}",
                metadata_type.directory,
                metadata_type.to_metadata_file_name(meta_name)
            ),
        });

        found.push(SourceComponent {
            type_name: metadata_type.name.to_string(),
            full_name,
            files,
        });
    }
    Ok(())
}

fn bundle_files(dir: &Path, archive_prefix: &str, files: &mut Vec<SourceFile>) -> Result<()> {
    for entry in sorted_entries(dir)? {
        let archive_path = format!("{}/{}", archive_prefix, file_name(&entry));
        if entry.is_dir() {
            bundle_files(&entry, &archive_path, files)?;
        } else {
            files.push(SourceFile {
                path: entry,
                archive_path,
            });
        }
    }
    Ok(())
}

/// The resolved set of components for one invocation.
///
/// Owns a private staging directory that is removed when the set is
/// dropped.
#[derive(Debug)]
pub struct ComponentSet {
    manifest: PackageManifest,
    components: Vec<SourceComponent>,
    package_names: Vec<String>,
    staging: TempDir,
}

impl ComponentSet {
    pub fn new(
        manifest: PackageManifest,
        components: Vec<SourceComponent>,
        package_names: Vec<String>,
    ) -> Result<Self> {
        let staging = tempfile::Builder::new().prefix("sf-source-").tempdir()?;
        Ok(Self {
            manifest,
            components,
            package_names,
            staging,
        })
    }

    pub fn manifest(&self) -> &PackageManifest {
        &self.manifest
    }

    pub fn components(&self) -> &[SourceComponent] {
        &self.components
    }

    pub fn package_names(&self) -> &[String] {
        &self.package_names
    }

    pub fn api_version(&self) -> &str {
        &self.manifest.version
    }

    /// Write `package.xml` into the staging directory and return its path.
    pub fn package_xml_path(&self) -> Result<PathBuf> {
        let path = self.staging.path().join("package.xml");
        std::fs::write(&path, self.manifest.to_package_xml())?;
        Ok(path)
    }

    pub fn retrieve_request(&self) -> RetrieveRequest {
        RetrieveRequest {
            unpackaged: (!self.manifest.is_empty()).then(|| self.manifest.clone()),
            package_names: self.package_names.clone(),
        }
    }

    /// Manifest listing exactly the local components, as shipped in a deploy.
    pub fn deploy_manifest(&self) -> PackageManifest {
        manifest_for(&self.manifest.version, &self.components)
    }

    /// Zip the local components with their manifest.
    pub fn to_deploy_zip(&self) -> Result<Vec<u8>> {
        if self.components.is_empty() {
            return Err(Error::new(ErrorKind::Build(
                "No local source found to deploy.".to_string(),
            )));
        }

        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("package.xml", options)?;
        zip.write_all(self.deploy_manifest().to_package_xml().as_bytes())?;

        for file in self.components.iter().flat_map(|c| &c.files) {
            zip.start_file(file.archive_path.as_str(), options)?;
            zip.write_all(&std::fs::read(&file.path)?)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}
