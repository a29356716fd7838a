//! Component discovery and descriptor loading.
//!
//! Stage 1 of the registry build. Walks the source directory and turns every
//! component directory into a [`ComponentDescriptor`] with its file contents
//! already loaded, so the builder never touches the filesystem.
//!
//! ## Directory Structure
//!
//! ```text
//! registry/new-york/                  # Source directory
//! ├── animated-counter/
//! │   ├── meta.toml                   # Component metadata (or meta.json)
//! │   └── animated-counter.tsx        # Primary source → registry:component
//! ├── theme-toggle/
//! │   ├── meta.toml                   # Declares a stylesheet snippet
//! │   ├── theme-toggle.css            # Shipped only through the snippet
//! │   └── theme-toggle.tsx
//! └── tabs/
//!     ├── meta.toml
//!     ├── index.ts                    # Barrel file, ignored
//!     ├── example.tsx                 # Demo, ignored
//!     ├── tabs.test.tsx               # Test, ignored
//!     └── tabs.tsx
//! ```
//!
//! ## Metadata
//!
//! ```toml
//! slug = "theme-toggle"
//! name = "Theme Toggle"
//! category = "Buttons"
//! description = "Animated light/dark switch."
//! dependencies = ["motion"]
//! aliases = ["dark-mode-toggle"]
//!
//! [[snippets]]
//! label = "Add theme-toggle.css to your component folder"
//! target_path = "components/theme-toggle/theme-toggle.css"
//! registry_type = "registry:style"
//! source = "theme-toggle.css"          # or: code = "..."
//! ```
//!
//! Keys the registry doesn't use (SEO fields, props tables, notes) are
//! accepted and ignored because the same file also feeds the docs site.
//!
//! ## Ordering
//!
//! Component directories and the files inside them are visited in file-name
//! order, so two scans of the same tree yield identical descriptors.
//!
//! ## Failures
//!
//! A component that can't be loaded (no metadata, bad metadata, unreadable
//! file) becomes a [`Diagnostic`] and the scan moves on. Only a missing or
//! unreadable source directory fails the whole scan.

use crate::config::RegistryConfig;
use crate::diagnostic::{Diagnostic, Problem};
use crate::naming::{self, FileRole};
use crate::types::{ComponentDescriptor, FileRef, RegistryKind};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Metadata file names, in lookup order.
pub const META_FILES: &[&str] = &["meta.toml", "meta.json"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Source directory not found: {0}")]
    MissingSourceDir(PathBuf),
}

/// Declarative component metadata (`meta.toml` / `meta.json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComponentMeta {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub dependencies: Vec<String>,
    pub aliases: Vec<String>,
    pub keywords: Vec<String>,
    pub snippets: Vec<Snippet>,
}

/// Auxiliary code shown in the install docs. Shipped to the installer only
/// when it declares a `target_path`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Snippet {
    pub label: Option<String>,
    pub language: Option<String>,
    #[serde(alias = "targetPath")]
    pub target_path: Option<String>,
    #[serde(alias = "registryType")]
    pub registry_type: Option<RegistryKind>,
    /// Inline snippet text.
    pub code: Option<String>,
    /// File in the component directory holding the snippet text.
    pub source: Option<String>,
}

/// One component directory's scan result.
#[derive(Debug, Clone)]
pub enum ScanEntry {
    Loaded(ComponentDescriptor),
    Skipped(Diagnostic),
}

/// Everything found under the source directory, in directory order.
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub entries: Vec<ScanEntry>,
}

impl ScanOutput {
    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.entries.iter().filter_map(|e| match e {
            ScanEntry::Loaded(d) => Some(d),
            ScanEntry::Skipped(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter_map(|e| match e {
            ScanEntry::Skipped(d) => Some(d),
            ScanEntry::Loaded(_) => None,
        })
    }
}

/// Scan every immediate subdirectory of `source_dir` as a component.
pub fn scan(source_dir: &Path, config: &RegistryConfig) -> Result<ScanOutput, ScanError> {
    if !source_dir.is_dir() {
        return Err(ScanError::MissingSourceDir(source_dir.to_path_buf()));
    }

    let mut entries = Vec::new();
    for dir in component_dirs(source_dir)? {
        let dir_name = file_name_of(&dir);
        match load_component(&dir, config) {
            Ok(descriptor) => {
                debug!(
                    component = %dir_name,
                    files = descriptor.files.len(),
                    "loaded component"
                );
                entries.push(ScanEntry::Loaded(descriptor));
            }
            Err(problem) => {
                let diagnostic = Diagnostic::new(dir_name, problem);
                warn!("skipping {diagnostic}");
                entries.push(ScanEntry::Skipped(diagnostic));
            }
        }
    }

    Ok(ScanOutput { entries })
}

/// Immediate, non-hidden subdirectories in name order.
fn component_dirs(source_dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type().is_dir() && !hidden {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load one component directory into a descriptor.
///
/// Identity fields are trimmed but not validated; emptiness and slug rules are
/// checked by the builder so descriptors built in memory get the same treatment.
pub fn load_component(
    dir: &Path,
    config: &RegistryConfig,
) -> Result<ComponentDescriptor, Problem> {
    let dir_name = file_name_of(dir);
    let meta = load_meta(dir)?;

    let mut files = primary_files(dir, &dir_name, config)?;
    files.extend(snippet_files(dir, &meta.snippets)?);

    Ok(ComponentDescriptor {
        source_dir: dir_name,
        slug: meta.slug.trim().to_string(),
        display_name: meta.name.trim().to_string(),
        description: meta.description.trim().to_string(),
        category: meta.category,
        dependencies: meta.dependencies,
        aliases: meta.aliases,
        keywords: meta.keywords,
        files,
    })
}

/// Read and parse the first metadata file present in `dir`.
pub fn load_meta(dir: &Path) -> Result<ComponentMeta, Problem> {
    let Some(meta_path) = META_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
    else {
        return Err(Problem::MissingMetadata(format!(
            "no {} found",
            META_FILES.join(" or ")
        )));
    };

    let content = fs::read_to_string(&meta_path).map_err(|e| Problem::UnreadableSource {
        path: file_name_of(&meta_path),
        reason: e.to_string(),
    })?;

    let parsed: Result<ComponentMeta, String> = if meta_path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        toml::from_str(&content).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| Problem::InvalidMetadata(format!("{}: {}", file_name_of(&meta_path), e)))
}

/// Source files of the component directory, as `registry:component` files.
fn primary_files(
    dir: &Path,
    dir_name: &str,
    config: &RegistryConfig,
) -> Result<Vec<FileRef>, Problem> {
    let prefix = config.path_prefix.trim_end_matches('/');
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Problem::UnreadableSource {
            path: dir_name.to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if naming::classify_file(&file_name, &config.sources) != FileRole::Source {
            continue;
        }

        let content = read_source(entry.path(), &file_name)?;
        let path = if prefix.is_empty() {
            format!("{dir_name}/{file_name}")
        } else {
            format!("{prefix}/{dir_name}/{file_name}")
        };
        files.push(FileRef {
            path,
            content,
            kind: RegistryKind::Component,
        });
    }

    Ok(files)
}

/// Snippets with a `target_path`, in declaration order.
fn snippet_files(dir: &Path, snippets: &[Snippet]) -> Result<Vec<FileRef>, Problem> {
    let mut files = Vec::new();

    for (i, snippet) in snippets.iter().enumerate() {
        let Some(target) = snippet.target_path.as_deref() else {
            continue;
        };
        let label = snippet.label.clone().unwrap_or_else(|| format!("#{}", i + 1));
        if !naming::is_safe_relative_path(target) {
            return Err(Problem::InvalidMetadata(format!(
                "snippet {label}: target_path {target:?} must be a relative path"
            )));
        }

        let content = match (&snippet.code, &snippet.source) {
            (Some(code), None) => code.clone(),
            (None, Some(source)) => {
                if !naming::is_safe_relative_path(source) {
                    return Err(Problem::InvalidMetadata(format!(
                        "snippet {label}: source {source:?} must stay inside the component directory"
                    )));
                }
                read_source(&dir.join(source), source)?
            }
            _ => {
                return Err(Problem::InvalidMetadata(format!(
                    "snippet {label}: declare exactly one of `code` or `source`"
                )));
            }
        };

        files.push(FileRef {
            path: target.to_string(),
            content,
            kind: snippet.registry_type.unwrap_or(RegistryKind::File),
        });
    }

    Ok(files)
}

fn read_source(path: &Path, display: &str) -> Result<String, Problem> {
    fs::read_to_string(path).map_err(|e| Problem::UnreadableSource {
        path: display.to_string(),
        reason: e.to_string(),
    })
}
