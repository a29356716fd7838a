//! Shared test utilities for the messy-registry test suite.
//!
//! Provides fixture setup, component writers, descriptor builders, and lookup
//! helpers that work with pipeline data structures (`ComponentDescriptor`,
//! `Registry`, `Manifest`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let scanned = scan(tmp.path(), &config).unwrap();
//! let registry = build_from_scan(&scanned, &config);
//!
//! let manifest = find_manifest(&registry, "tabs");
//! assert_eq!(manifest.item.title, "Tabs");
//! assert_eq!(built_slugs(&registry), vec!["animated-counter", "hold-button", "tabs", "theme-toggle"]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::registry::Registry;
use crate::types::{ComponentDescriptor, FileRef, Manifest, RegistryKind};

// =========================================================================
// Fixture setup
// =========================================================================

/// Path of the checked-in sample catalog, `fixtures/registry/`.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/registry")
}

/// Copy `fixtures/registry/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_dir_recursive(&fixtures_dir(), tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a minimal component directory: `meta.toml` plus `<dir>.tsx`.
///
/// Returns the component directory so tests can add more files.
pub fn write_component(root: &Path, dir: &str, slug: &str, name: &str) -> PathBuf {
    let component = root.join(dir);
    fs::create_dir_all(&component).unwrap();
    fs::write(
        component.join("meta.toml"),
        format!("slug = {slug:?}\nname = {name:?}\ndescription = \"{name} component.\"\n"),
    )
    .unwrap();
    fs::write(
        component.join(format!("{dir}.tsx")),
        format!("export function Component() {{ return <div data-slot={slug:?} />; }}\n"),
    )
    .unwrap();
    component
}

// =========================================================================
// Descriptor builders
// =========================================================================

/// In-memory descriptor with one primary source file.
pub fn descriptor(slug: &str, name: &str) -> ComponentDescriptor {
    ComponentDescriptor {
        source_dir: slug.to_string(),
        slug: slug.to_string(),
        display_name: name.to_string(),
        description: format!("{name} component."),
        files: vec![FileRef {
            path: format!("registry/new-york/{slug}/{slug}.tsx"),
            content: format!("export const {} = 1;\n", name.replace(' ', "")),
            kind: RegistryKind::Component,
        }],
        ..Default::default()
    }
}

// =========================================================================
// Registry lookups: panics with a clear message on miss
// =========================================================================

/// Find a manifest by slug. Panics if not found.
pub fn find_manifest<'a>(registry: &'a Registry, slug: &str) -> &'a Manifest {
    registry.manifests.get(slug).unwrap_or_else(|| {
        let slugs: Vec<&String> = registry.manifests.keys().collect();
        panic!("manifest '{slug}' not found. Available: {slugs:?}")
    })
}

/// Slugs of built components, in outcome order.
pub fn built_slugs(registry: &Registry) -> Vec<&str> {
    registry.entries().map(|e| e.slug.as_str()).collect()
}

/// Component directories that were skipped, in outcome order.
pub fn skipped_components(registry: &Registry) -> Vec<&str> {
    registry
        .diagnostics()
        .map(|d| d.component.as_str())
        .collect()
}
