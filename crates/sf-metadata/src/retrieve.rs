//! Retrieve operations.

use crate::error::{Error, ErrorKind, Result};
use crate::types::FileProperties;
use busbar_sf_client::security::xml;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

/// Namespace of `package.xml` documents.
pub const PACKAGE_XML_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

/// What a retrieve request asks for.
///
/// An unpackaged manifest and managed/unmanaged package names can be
/// combined in one request.
#[derive(Debug, Clone, Default)]
pub struct RetrieveRequest {
    pub unpackaged: Option<PackageManifest>,
    pub package_names: Vec<String>,
}

impl RetrieveRequest {
    /// `singlePackage` must be false whenever package names are present.
    pub fn single_package(&self) -> bool {
        self.package_names.is_empty()
    }
}

/// Package manifest (package.xml).
///
/// Use this structured type to safely build package manifests without
/// risk of XML injection. All values are properly escaped when converted
/// to XML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageManifest {
    pub types: Vec<PackageTypeMembers>,
    pub version: String,
}

impl PackageManifest {
    /// Create a new package manifest with the given API version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            types: Vec::new(),
            version: version.into(),
        }
    }

    /// Add a metadata type with its members.
    pub fn add_type(mut self, name: impl Into<String>, members: Vec<String>) -> Self {
        let name = name.into();
        for member in members {
            self.add_member(name.clone(), member);
        }
        self
    }

    /// Add one member, merging into an existing type entry. Duplicates are
    /// ignored and type order follows first insertion.
    pub fn add_member(&mut self, type_name: impl Into<String>, member: impl Into<String>) {
        let type_name = type_name.into();
        let member = member.into();
        match self.types.iter_mut().find(|t| t.name == type_name) {
            Some(entry) => {
                if !entry.members.contains(&member) {
                    entry.members.push(member);
                }
            }
            None => self.types.push(PackageTypeMembers {
                name: type_name,
                members: vec![member],
            }),
        }
    }

    /// True when no type has any member.
    pub fn is_empty(&self) -> bool {
        self.types.iter().all(|t| t.members.is_empty())
    }

    /// Members listed for `type_name`.
    pub fn members_of(&self, type_name: &str) -> &[String] {
        self.types
            .iter()
            .find(|t| t.name == type_name)
            .map(|t| t.members.as_slice())
            .unwrap_or(&[])
    }

    /// Convert to XML elements for SOAP envelope.
    /// All values are properly XML-escaped to prevent injection.
    pub(crate) fn to_xml(&self) -> String {
        let mut xml_parts = Vec::new();

        for type_member in &self.types {
            let members_xml: String = type_member
                .members
                .iter()
                .map(|m| format!("<members>{}</members>", xml::escape(m)))
                .collect::<Vec<_>>()
                .join("\n          ");

            xml_parts.push(format!(
                "<types>\n          {}\n          <name>{}</name>\n        </types>",
                members_xml,
                xml::escape(&type_member.name)
            ));
        }

        xml_parts.push(format!("<version>{}</version>", xml::escape(&self.version)));

        xml_parts.join("\n        ")
    }

    /// Render a standalone `package.xml` document.
    pub fn to_package_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!("<Package xmlns=\"{}\">\n", PACKAGE_XML_NAMESPACE));
        for type_member in &self.types {
            out.push_str("    <types>\n");
            for member in &type_member.members {
                out.push_str(&format!("        <members>{}</members>\n", xml::escape(member)));
            }
            out.push_str(&format!("        <name>{}</name>\n", xml::escape(&type_member.name)));
            out.push_str("    </types>\n");
        }
        out.push_str(&format!("    <version>{}</version>\n", xml::escape(&self.version)));
        out.push_str("</Package>\n");
        out
    }

    /// Parse a `package.xml` document.
    ///
    /// A missing `<version>` yields an empty version string so the caller
    /// can fill in its own default.
    pub fn from_package_xml(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut manifest = PackageManifest::default();
        let mut path: Vec<String> = Vec::new();
        let mut saw_root = false;
        let mut current_members: Vec<String> = Vec::new();
        let mut current_name: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if path.is_empty() {
                        if name != "Package" {
                            return Err(Error::new(ErrorKind::Manifest(format!(
                                "expected <Package> root element, found <{}>",
                                name
                            ))));
                        }
                        saw_root = true;
                    }
                    if name == "types" && path.len() == 1 {
                        current_members.clear();
                        current_name = None;
                    }
                    path.push(name);
                }
                Event::Text(t) => {
                    let text = t.unescape()?.into_owned();
                    match path_str(&path).as_str() {
                        "Package/types/members" => current_members.push(text),
                        "Package/types/name" => current_name = Some(text),
                        "Package/version" => manifest.version = text,
                        "" => {
                            return Err(Error::new(ErrorKind::Manifest(
                                "text outside of <Package> root element".to_string(),
                            )))
                        }
                        _ => {}
                    }
                }
                Event::End(_) => {
                    if path_str(&path) == "Package/types" {
                        let type_name = current_name.take().ok_or_else(|| {
                            Error::new(ErrorKind::Manifest("<types> without <name>".to_string()))
                        })?;
                        for member in current_members.drain(..) {
                            manifest.add_member(type_name.clone(), member);
                        }
                    }
                    path.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !saw_root {
            return Err(Error::new(ErrorKind::Manifest(
                "missing <Package> root element".to_string(),
            )));
        }
        if !path.is_empty() {
            return Err(Error::new(ErrorKind::Manifest(format!(
                "unclosed element <{}>",
                path.join("/")
            ))));
        }

        Ok(manifest)
    }
}

fn path_str(path: &[String]) -> String {
    path.join("/")
}

/// Type members in a package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTypeMembers {
    pub name: String,
    pub members: Vec<String>,
}

/// Retrieve status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrieveStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
    Canceling,
    Canceled,
}

impl std::str::FromStr for RetrieveStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RetrieveStatus::Pending),
            "InProgress" => Ok(RetrieveStatus::InProgress),
            "Succeeded" => Ok(RetrieveStatus::Succeeded),
            "Failed" => Ok(RetrieveStatus::Failed),
            "Canceling" => Ok(RetrieveStatus::Canceling),
            "Canceled" => Ok(RetrieveStatus::Canceled),
            _ => Err(format!("Unknown retrieve status: {}", s)),
        }
    }
}

/// Result of a `checkRetrieveStatus` call.
#[derive(Debug, Clone)]
pub struct RetrieveResult {
    /// Async process ID.
    pub id: String,
    /// Whether the operation is complete.
    pub done: bool,
    /// Current status.
    pub status: RetrieveStatus,
    /// Whether the retrieve succeeded.
    pub success: bool,
    /// Error message if failed.
    pub error_message: Option<String>,
    /// Error status code if failed.
    pub error_status_code: Option<String>,
    /// Base64-encoded zip file contents.
    pub zip_file: Option<String>,
    /// File properties in the retrieved package.
    pub file_properties: Vec<FileProperties>,
    /// Retrieve messages (warnings/errors).
    pub messages: Vec<RetrieveMessage>,
}

/// A message from retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveMessage {
    pub file_name: String,
    pub problem: String,
}
