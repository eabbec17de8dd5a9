//! Resolution of the "what to operate on" flags into one work item.

use std::path::PathBuf;

use crate::error::{Error, ErrorKind, Result};

pub const SOURCEPATH_FLAG: &str = "--sourcepath";
pub const MANIFEST_FLAG: &str = "--manifest";
pub const METADATA_FLAG: &str = "--metadata";
pub const PACKAGENAMES_FLAG: &str = "--packagenames";

/// Raw retrieve selection flags.
#[derive(Debug, Clone, Default)]
pub struct RetrieveInput {
    pub source_paths: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub metadata: Vec<String>,
    pub package_names: Vec<String>,
}

/// Raw deploy selection flags.
#[derive(Debug, Clone, Default)]
pub struct DeployInput {
    pub source_paths: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub metadata: Vec<String>,
}

/// The single selection mode of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkDescriptor {
    Paths(Vec<PathBuf>),
    Manifest(PathBuf),
    TypeNames(Vec<String>),
    PackageNames(Vec<String>),
}

/// A resolved descriptor plus the package names that ride along with it.
///
/// `package_names` is empty when the descriptor is itself
/// [`WorkDescriptor::PackageNames`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub descriptor: WorkDescriptor,
    pub package_names: Vec<String>,
}

fn exclusive_mode(
    source_paths: &[PathBuf],
    manifest: Option<&PathBuf>,
    metadata: &[String],
) -> Result<Option<WorkDescriptor>> {
    let manifest = manifest.filter(|p| !p.as_os_str().is_empty());

    let mut populated = Vec::new();
    if !source_paths.is_empty() {
        populated.push((SOURCEPATH_FLAG, WorkDescriptor::Paths(source_paths.to_vec())));
    }
    if let Some(path) = manifest {
        populated.push((MANIFEST_FLAG, WorkDescriptor::Manifest(path.clone())));
    }
    if !metadata.is_empty() {
        populated.push((METADATA_FLAG, WorkDescriptor::TypeNames(metadata.to_vec())));
    }

    if populated.len() > 1 {
        return Err(Error::new(ErrorKind::ConflictingInput {
            flags: populated.iter().map(|(flag, _)| *flag).collect(),
        }));
    }
    Ok(populated.pop().map(|(_, descriptor)| descriptor))
}

/// Resolve retrieve flags. Package names combine with any mode or stand
/// alone.
pub fn resolve_retrieve_input(input: &RetrieveInput) -> Result<WorkItem> {
    let mode = exclusive_mode(&input.source_paths, input.manifest.as_ref(), &input.metadata)?;

    match mode {
        Some(descriptor) => Ok(WorkItem {
            descriptor,
            package_names: input.package_names.clone(),
        }),
        None if !input.package_names.is_empty() => Ok(WorkItem {
            descriptor: WorkDescriptor::PackageNames(input.package_names.clone()),
            package_names: Vec::new(),
        }),
        None => Err(Error::new(ErrorKind::NoInput {
            flags: vec![SOURCEPATH_FLAG, MANIFEST_FLAG, METADATA_FLAG, PACKAGENAMES_FLAG],
        })),
    }
}

pub fn resolve_deploy_input(input: &DeployInput) -> Result<WorkItem> {
    let mode = exclusive_mode(&input.source_paths, input.manifest.as_ref(), &input.metadata)?;

    mode.map(|descriptor| WorkItem {
        descriptor,
        package_names: Vec::new(),
    })
    .ok_or_else(|| {
        Error::new(ErrorKind::NoInput {
            flags: vec![SOURCEPATH_FLAG, MANIFEST_FLAG, METADATA_FLAG],
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> Vec<PathBuf> {
        vec![PathBuf::from("force-app/main/default/classes")]
    }

    fn types() -> Vec<String> {
        vec!["ApexClass".to_string()]
    }

    #[test]
    fn test_each_single_mode_resolves() {
        let by_path = resolve_retrieve_input(&RetrieveInput {
            source_paths: paths(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(by_path.descriptor, WorkDescriptor::Paths(paths()));

        let by_manifest = resolve_retrieve_input(&RetrieveInput {
            manifest: Some(PathBuf::from("package.xml")),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            by_manifest.descriptor,
            WorkDescriptor::Manifest(PathBuf::from("package.xml"))
        );

        let by_type = resolve_retrieve_input(&RetrieveInput {
            metadata: types(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(by_type.descriptor, WorkDescriptor::TypeNames(types()));
    }

    #[test]
    fn test_package_names_alone_or_combined() {
        let packages = vec!["MyPkg".to_string()];

        let alone = resolve_retrieve_input(&RetrieveInput {
            package_names: packages.clone(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(alone.descriptor, WorkDescriptor::PackageNames(packages.clone()));
        assert!(alone.package_names.is_empty());

        let combined = resolve_retrieve_input(&RetrieveInput {
            metadata: types(),
            package_names: packages.clone(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(combined.descriptor, WorkDescriptor::TypeNames(types()));
        assert_eq!(combined.package_names, packages);
    }

    #[test]
    fn test_conflicts_name_all_offending_flags() {
        let err = resolve_retrieve_input(&RetrieveInput {
            source_paths: paths(),
            manifest: Some(PathBuf::from("bar.xml")),
            ..Default::default()
        })
        .unwrap_err();
        match err.kind {
            ErrorKind::ConflictingInput { flags } => {
                assert_eq!(flags, vec![SOURCEPATH_FLAG, MANIFEST_FLAG]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = resolve_deploy_input(&DeployInput {
            source_paths: paths(),
            manifest: Some(PathBuf::from("bar.xml")),
            metadata: types(),
        })
        .unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::ConflictingInput { ref flags } if flags.len() == 3
        ));
    }

    #[test]
    fn test_empty_values_count_as_unpopulated() {
        let item = resolve_retrieve_input(&RetrieveInput {
            source_paths: vec![],
            manifest: Some(PathBuf::new()),
            metadata: types(),
            package_names: vec![],
        })
        .unwrap();
        assert_eq!(item.descriptor, WorkDescriptor::TypeNames(types()));
    }

    #[test]
    fn test_no_input() {
        let err = resolve_retrieve_input(&RetrieveInput::default()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::NoInput { ref flags } if flags.len() == 4));

        let err = resolve_deploy_input(&DeployInput::default()).unwrap_err();
        assert!(err.to_string().contains("--sourcepath, --manifest, --metadata"));
    }
}
