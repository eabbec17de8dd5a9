//! Metadata types understood by the local source layout.
//!
//! Only a fixed set of common types is known. Anything else is rejected when
//! named explicitly and ignored when found on disk.

/// How a type's components are stored in source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `Foo.cls` plus `Foo.cls-meta.xml`.
    ContentWithMeta,
    /// `Foo.permissionset-meta.xml`, shipped as `permissionsets/Foo.permissionset`.
    MetaOnly,
    /// A directory per component, e.g. `lwc/foo/**`.
    Bundle,
}

#[derive(Debug, PartialEq, Eq)]
pub struct MetadataType {
    pub name: &'static str,
    pub directory: &'static str,
    pub suffix: &'static str,
    pub strategy: Strategy,
}

pub const META_SUFFIX: &str = "-meta.xml";

static TYPES: &[MetadataType] = &[
    MetadataType {
        name: "ApexClass",
        directory: "classes",
        suffix: "cls",
        strategy: Strategy::ContentWithMeta,
    },
    MetadataType {
        name: "ApexTrigger",
        directory: "triggers",
        suffix: "trigger",
        strategy: Strategy::ContentWithMeta,
    },
    MetadataType {
        name: "ApexPage",
        directory: "pages",
        suffix: "page",
        strategy: Strategy::ContentWithMeta,
    },
    MetadataType {
        name: "ApexComponent",
        directory: "components",
        suffix: "component",
        strategy: Strategy::ContentWithMeta,
    },
    MetadataType {
        name: "StaticResource",
        directory: "staticresources",
        suffix: "resource",
        strategy: Strategy::ContentWithMeta,
    },
    MetadataType {
        name: "LightningComponentBundle",
        directory: "lwc",
        suffix: "",
        strategy: Strategy::Bundle,
    },
    MetadataType {
        name: "AuraDefinitionBundle",
        directory: "aura",
        suffix: "",
        strategy: Strategy::Bundle,
    },
    MetadataType {
        name: "PermissionSet",
        directory: "permissionsets",
        suffix: "permissionset",
        strategy: Strategy::MetaOnly,
    },
    MetadataType {
        name: "Profile",
        directory: "profiles",
        suffix: "profile",
        strategy: Strategy::MetaOnly,
    },
    MetadataType {
        name: "Layout",
        directory: "layouts",
        suffix: "layout",
        strategy: Strategy::MetaOnly,
    },
    MetadataType {
        name: "Flow",
        directory: "flows",
        suffix: "flow",
        strategy: Strategy::MetaOnly,
    },
    MetadataType {
        name: "CustomTab",
        directory: "tabs",
        suffix: "tab",
        strategy: Strategy::MetaOnly,
    },
    MetadataType {
        name: "FlexiPage",
        directory: "flexipages",
        suffix: "flexipage",
        strategy: Strategy::MetaOnly,
    },
    MetadataType {
        name: "CustomApplication",
        directory: "applications",
        suffix: "app",
        strategy: Strategy::MetaOnly,
    },
    MetadataType {
        name: "CustomLabels",
        directory: "labels",
        suffix: "labels",
        strategy: Strategy::MetaOnly,
    },
];

/// Look up a type by name, ignoring case.
pub fn by_name(name: &str) -> Option<&'static MetadataType> {
    TYPES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Look up the type stored under a directory name.
pub fn by_directory(directory: &str) -> Option<&'static MetadataType> {
    TYPES.iter().find(|t| t.directory == directory)
}

impl MetadataType {
    /// Component name for a file in this type's directory, if the file
    /// belongs to the type. Bundles are matched by directory instead.
    pub fn component_name(&self, file_name: &str) -> Option<String> {
        match self.strategy {
            Strategy::Bundle => None,
            Strategy::ContentWithMeta | Strategy::MetaOnly => file_name
                .strip_suffix(META_SUFFIX)
                .and_then(|f| f.strip_suffix(self.suffix))
                .and_then(|f| f.strip_suffix('.'))
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        }
    }

    /// Archive (metadata format) file name for a source-format file name.
    pub fn to_metadata_file_name(&self, file_name: &str) -> String {
        match self.strategy {
            Strategy::MetaOnly => file_name
                .strip_suffix(META_SUFFIX)
                .unwrap_or(file_name)
                .to_string(),
            _ => file_name.to_string(),
        }
    }

    /// Source-format file name for an archive file name.
    pub fn to_source_file_name(&self, file_name: &str) -> String {
        match self.strategy {
            Strategy::MetaOnly if !file_name.ends_with(META_SUFFIX) => {
                format!("{}{}", file_name, META_SUFFIX)
            }
            _ => file_name.to_string(),
        }
    }
}
