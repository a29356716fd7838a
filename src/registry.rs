//! Registry assembly.
//!
//! Stage 2 of the registry build. A pure transformation from component
//! descriptors to the installer artifacts: one [`Manifest`] per component and
//! one aggregate [`Index`]. No I/O happens here; [`crate::scan`] has already
//! loaded every file and [`crate::emit`] writes the result.
//!
//! ## Validation
//!
//! Each descriptor is checked in input order. A descriptor that fails any
//! check is skipped with a [`Diagnostic`]; the rest of the catalog still builds.
//!
//! | Check | Problem |
//! |-------|---------|
//! | `slug` and `name` present | [`Problem::MissingMetadata`] |
//! | slug is URL-safe | [`Problem::InvalidSlug`] |
//! | slug not already taken | [`Problem::DuplicateSlug`] |
//! | at least one file | [`Problem::NoSourceFiles`] |
//! | file paths unique | [`Problem::DuplicatePath`] |
//!
//! ## Duplicate slugs
//!
//! The first descriptor that passes validation owns its slug. Later
//! descriptors with the same slug are skipped. A descriptor skipped for
//! another reason does not claim its slug.
//!
//! ## Determinism
//!
//! Index items follow input order and nothing time- or randomness-dependent
//! is recorded, so the same descriptors always produce identical artifacts.

use crate::config::{ConfigError, RegistryConfig};
use crate::diagnostic::{Diagnostic, Problem};
use crate::naming;
use crate::scan::{self, ScanEntry, ScanError, ScanOutput};
use crate::types::{ComponentDescriptor, Index, Manifest, RegistryItem, RegistryKind};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that stop the whole run. Per-component problems never end up here.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Cannot write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Manifest of {slug:?} would overwrite the index at {}", path.display())]
    IndexCollision { slug: String, path: PathBuf },
}

/// Summary of a component that made it into the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub source_dir: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub aliases: Vec<String>,
    pub keywords: Vec<String>,
    pub dependencies: Vec<String>,
    pub file_count: usize,
}

/// What happened to one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Built(CatalogEntry),
    Skipped(Diagnostic),
}

impl Outcome {
    /// Component directory the outcome refers to.
    pub fn component(&self) -> &str {
        match self {
            Self::Built(entry) => &entry.source_dir,
            Self::Skipped(diagnostic) => &diagnostic.component,
        }
    }
}

/// Build result: artifacts plus a per-component account of the run.
#[derive(Debug, Clone)]
pub struct Registry {
    /// Manifests keyed by slug.
    pub manifests: BTreeMap<String, Manifest>,
    pub index: Index,
    /// One outcome per input, in input order.
    pub outcomes: Vec<Outcome>,
}

impl Registry {
    pub fn processed(&self) -> usize {
        self.entries().count()
    }

    pub fn skipped(&self) -> usize {
        self.diagnostics().count()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Built(entry) => Some(entry),
            Outcome::Skipped(_) => None,
        })
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Skipped(diagnostic) => Some(diagnostic),
            Outcome::Built(_) => None,
        })
    }

    /// Look a component up by slug, then by alias.
    pub fn find(&self, slug_or_alias: &str) -> Option<&CatalogEntry> {
        self.entries()
            .find(|e| e.slug == slug_or_alias)
            .or_else(|| {
                self.entries()
                    .find(|e| e.aliases.iter().any(|a| a == slug_or_alias))
            })
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries()
            .filter_map(|e| e.category.as_deref())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

/// Build manifests and the index from in-memory descriptors.
pub fn build_registry(descriptors: &[ComponentDescriptor], config: &RegistryConfig) -> Registry {
    let mut builder = Builder::new(config);
    for descriptor in descriptors {
        builder.add(descriptor);
    }
    builder.finish()
}

/// Build from a scan, keeping the scanner's skipped components in the
/// outcome list at their directory position.
pub fn build_from_scan(scan: &ScanOutput, config: &RegistryConfig) -> Registry {
    let mut builder = Builder::new(config);
    for entry in &scan.entries {
        match entry {
            ScanEntry::Loaded(descriptor) => builder.add(descriptor),
            ScanEntry::Skipped(diagnostic) => {
                builder.outcomes.push(Outcome::Skipped(diagnostic.clone()));
            }
        }
    }
    builder.finish()
}

/// Scan `source_dir` and build the registry in one step.
pub fn load_registry(source_dir: &Path, config: &RegistryConfig) -> Result<Registry, RegistryError> {
    let scanned = scan::scan(source_dir, config)?;
    let registry = build_from_scan(&scanned, config);
    info!(
        processed = registry.processed(),
        skipped = registry.skipped(),
        "registry built"
    );
    Ok(registry)
}

struct Builder<'a> {
    config: &'a RegistryConfig,
    /// slug → component directory that claimed it
    claimed: HashMap<String, String>,
    manifests: BTreeMap<String, Manifest>,
    items: Vec<RegistryItem>,
    outcomes: Vec<Outcome>,
}

impl<'a> Builder<'a> {
    fn new(config: &'a RegistryConfig) -> Self {
        Self {
            config,
            claimed: HashMap::new(),
            manifests: BTreeMap::new(),
            items: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    fn add(&mut self, descriptor: &ComponentDescriptor) {
        let component = if descriptor.source_dir.is_empty() {
            descriptor.slug.clone()
        } else {
            descriptor.source_dir.clone()
        };

        if let Err(problem) = self.validate(descriptor) {
            let diagnostic = Diagnostic::new(component, problem);
            warn!("skipping {diagnostic}");
            self.outcomes.push(Outcome::Skipped(diagnostic));
            return;
        }

        let item = RegistryItem {
            name: descriptor.slug.clone(),
            kind: RegistryKind::Component,
            title: descriptor.display_name.clone(),
            description: descriptor.description.clone(),
            dependencies: descriptor.dependencies.clone(),
            files: descriptor.files.clone(),
        };

        info!(
            slug = %descriptor.slug,
            files = item.files.len(),
            "component added to registry"
        );

        self.claimed.insert(descriptor.slug.clone(), component.clone());
        self.manifests.insert(
            descriptor.slug.clone(),
            Manifest {
                schema: self.config.item_schema.clone(),
                item: item.clone(),
            },
        );
        self.items.push(item);
        self.outcomes.push(Outcome::Built(CatalogEntry {
            source_dir: component,
            slug: descriptor.slug.clone(),
            title: descriptor.display_name.clone(),
            description: descriptor.description.clone(),
            category: descriptor.category.clone(),
            aliases: descriptor.aliases.clone(),
            keywords: descriptor.keywords.clone(),
            dependencies: descriptor.dependencies.clone(),
            file_count: descriptor.files.len(),
        }));
    }

    fn validate(&self, descriptor: &ComponentDescriptor) -> Result<(), Problem> {
        let slug = descriptor.slug.as_str();
        if slug.trim().is_empty() {
            return Err(Problem::MissingMetadata("slug".to_string()));
        }
        if descriptor.display_name.trim().is_empty() {
            return Err(Problem::MissingMetadata("name".to_string()));
        }
        if !naming::is_valid_slug(slug) {
            return Err(Problem::InvalidSlug(slug.to_string()));
        }
        if let Some(first) = self.claimed.get(slug) {
            return Err(Problem::DuplicateSlug {
                slug: slug.to_string(),
                first: first.clone(),
            });
        }
        if descriptor.files.is_empty() {
            return Err(Problem::NoSourceFiles);
        }
        let mut paths = HashSet::new();
        for file in &descriptor.files {
            if !paths.insert(file.path.as_str()) {
                return Err(Problem::DuplicatePath(file.path.clone()));
            }
        }
        Ok(())
    }

    fn finish(self) -> Registry {
        Registry {
            manifests: self.manifests,
            index: Index {
                schema: self.config.index_schema.clone(),
                name: self.config.name.clone(),
                homepage: self.config.homepage.clone(),
                items: self.items,
            },
            outcomes: self.outcomes,
        }
    }
}
