//! Writing retrieved archives into the local tree.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use busbar_sf_metadata::FileProperties;
use tracing::{debug, warn};

use crate::error::Result;
use crate::operation::{FileState, InboundFile};
use crate::registry::{self, META_SUFFIX};

/// Where a retrieve left its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveArtifacts {
    pub zip_file_path: PathBuf,
    pub inbound_files: Vec<InboundFile>,
}

/// Save the raw archive under a fresh temp directory.
fn write_zip_artifact(bytes: &[u8]) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!(
        "sdx_sourceRetrieve_pkg_{}",
        chrono::Utc::now().timestamp_millis()
    ));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("unpackaged.zip");
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Source-format location of a metadata-format path such as
/// `permissionsets/Admin.permissionset`.
fn source_path(relative: &str) -> String {
    match relative.split_once('/') {
        Some((directory, file)) if !file.contains('/') => match registry::by_directory(directory) {
            Some(metadata_type) => {
                format!("{}/{}", directory, metadata_type.to_source_file_name(file))
            }
            None => relative.to_string(),
        },
        _ => relative.to_string(),
    }
}

fn describe(entry_name: &str, file_properties: &[FileProperties]) -> (String, String) {
    let base = entry_name.strip_suffix(META_SUFFIX).unwrap_or(entry_name);
    let matched = file_properties.iter().find(|fp| {
        !fp.file_name.is_empty()
            && (fp.file_name == base || entry_name.starts_with(&format!("{}/", fp.file_name)))
    });
    if let Some(fp) = matched {
        return (fp.full_name.clone(), fp.component_type.clone());
    }

    let mut parts = entry_name.split('/').skip(1);
    let type_name = parts
        .next()
        .and_then(registry::by_directory)
        .map(|t| t.name.to_string())
        .unwrap_or_default();
    let full_name = Path::new(base)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (full_name, type_name)
}

/// Decode a retrieved archive, keep a copy, and extract it below `base`.
///
/// With `merge`, entries are converted to source format and written into
/// `<base>/main/default`, replacing same-named files and leaving others
/// alone. Without it, the metadata-format tree is written to `base` as-is.
pub fn apply(
    zip_base64: &str,
    file_properties: &[FileProperties],
    base: &Path,
    merge: bool,
) -> Result<RetrieveArtifacts> {
    let bytes = general_purpose::STANDARD.decode(zip_base64.trim())?;
    let zip_file_path = write_zip_artifact(&bytes)?;
    debug!(path = %zip_file_path.display(), bytes = bytes.len(), "saved retrieve archive");

    let target_root = if merge {
        base.join("main").join("default")
    } else {
        base.to_path_buf()
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut inbound_files = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let Some(enclosed) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping archive entry outside the target");
            continue;
        };
        let entry_name = enclosed.to_string_lossy().replace('\\', "/");

        let is_manifest = entry_name
            .split_once('/')
            .map(|(_, rest)| rest == "package.xml")
            .unwrap_or(entry_name == "package.xml");

        let relative = if merge {
            if is_manifest {
                continue;
            }
            match entry_name.split_once('/') {
                Some((_, rest)) => source_path(rest),
                None => source_path(&entry_name),
            }
        } else {
            entry_name.clone()
        };

        let dest = target_root.join(&relative);
        let state = if dest.exists() {
            FileState::Changed
        } else {
            FileState::Created
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&dest)?;
        std::io::copy(&mut entry, &mut out)?;

        if !is_manifest {
            let (full_name, component_type) = describe(&entry_name, file_properties);
            inbound_files.push(InboundFile {
                state,
                full_name,
                component_type,
                file_path: dest.display().to_string(),
            });
        }
    }

    debug!(files = inbound_files.len(), merge, "extracted retrieve archive");
    Ok(RetrieveArtifacts {
        zip_file_path,
        inbound_files,
    })
}
