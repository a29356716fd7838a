//! Shared types passed between pipeline stages.
//!
//! [`ComponentDescriptor`] is what the scanner hands to the builder. The
//! remaining types are the wire format read by the shadcn installer CLI, so
//! their serialized field names (`$schema`, `name`, `type`, `files[].path`, ...)
//! must not change.

use serde::{Deserialize, Serialize};

/// Installer file/item type, serialized with the `registry:` prefix.
///
/// Metadata files may use the short form (`style`) or the prefixed form
/// (`registry:style`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryKind {
    #[default]
    #[serde(rename = "registry:component", alias = "component")]
    Component,
    #[serde(rename = "registry:style", alias = "style")]
    Style,
    #[serde(rename = "registry:file", alias = "file")]
    File,
    #[serde(rename = "registry:hook", alias = "hook")]
    Hook,
    #[serde(rename = "registry:lib", alias = "lib")]
    Lib,
}

impl RegistryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "registry:component",
            Self::Style => "registry:style",
            Self::File => "registry:file",
            Self::Hook => "registry:hook",
            Self::Lib => "registry:lib",
        }
    }
}

/// One file shipped with a component, content inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Path the installer writes the file to, relative to the consumer project.
    pub path: String,
    /// Full file text.
    pub content: String,
    #[serde(rename = "type")]
    pub kind: RegistryKind,
}

/// A component as loaded from its directory, ready for the builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentDescriptor {
    /// Directory name the component was loaded from (diagnostics only).
    pub source_dir: String,
    pub slug: String,
    pub display_name: String,
    pub description: String,
    pub category: Option<String>,
    /// npm packages the installer adds to the consumer project.
    pub dependencies: Vec<String>,
    /// Alternative slugs that redirect to this component on the site.
    pub aliases: Vec<String>,
    pub keywords: Vec<String>,
    /// Primary sources first, then auxiliary snippets, in declaration order.
    pub files: Vec<FileRef>,
}

/// Registry entry shared by manifests and the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryItem {
    /// Component slug.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RegistryKind,
    pub title: String,
    pub description: String,
    pub dependencies: Vec<String>,
    pub files: Vec<FileRef>,
}

/// Per-component manifest, written to `<output_dir>/<slug>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "$schema")]
    pub schema: String,
    #[serde(flatten)]
    pub item: RegistryItem,
}

/// Aggregate index listing every component that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub name: String,
    pub homepage: String,
    pub items: Vec<RegistryItem>,
}
