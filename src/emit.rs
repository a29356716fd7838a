//! Artifact writing.
//!
//! Stage 3 of the registry build. Serializes every manifest to
//! `<output_dir>/<slug>.json` and then the aggregate index.
//!
//! ## Ordering
//!
//! Manifests are independent files and are written in parallel on the rayon
//! pool. The index is written only after every manifest write has returned,
//! so an installer never sees an index pointing at a manifest that isn't on
//! disk yet.
//!
//! ## Unchanged files
//!
//! Before writing, the SHA-256 of the rendered JSON is compared with the file
//! already on disk. Identical files are left alone (their mtime survives, so
//! a static host or CI cache doesn't see a change) and reported as
//! [`WriteStatus::Unchanged`].
//!
//! ## Format
//!
//! Pretty-printed JSON, two-space indent, trailing newline. Rendering is
//! deterministic: same registry, same bytes.

use crate::registry::{Registry, RegistryError};
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written => write!(f, "written"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub status: WriteStatus,
}

/// What [`emit`] did on disk.
#[derive(Debug, Clone)]
pub struct EmitReport {
    /// Manifest files in slug order.
    pub manifests: Vec<WrittenFile>,
    pub index: WrittenFile,
    /// Stale manifests deleted because their component is gone.
    pub pruned: Vec<PathBuf>,
}

impl EmitReport {
    pub fn written(&self) -> usize {
        self.files()
            .filter(|f| f.status == WriteStatus::Written)
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.files()
            .filter(|f| f.status == WriteStatus::Unchanged)
            .count()
    }

    fn files(&self) -> impl Iterator<Item = &WrittenFile> {
        self.manifests.iter().chain(std::iter::once(&self.index))
    }
}

/// Render a value the way every artifact is written.
pub fn render_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// SHA-256 of a byte string, as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Path of the manifest for `slug` inside `output_dir`.
pub fn manifest_path(output_dir: &Path, slug: &str) -> PathBuf {
    output_dir.join(format!("{slug}.json"))
}

/// Write all manifests, then the index.
///
/// With `prune`, `*.json` files in `output_dir` that don't belong to a built
/// component are deleted after the index is written.
///
/// Fails with [`RegistryError::IndexCollision`] before writing anything when
/// a component's manifest would land on the index file.
pub fn emit(
    registry: &Registry,
    output_dir: &Path,
    index_path: &Path,
    prune: bool,
) -> Result<EmitReport, RegistryError> {
    create_dir(output_dir)?;
    if let Some(parent) = index_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir(parent)?;
    }
    let index_location = resolved(index_path);
    check_index_collision(registry, output_dir, &index_location, index_path)?;

    let pending: Vec<(PathBuf, String)> = registry
        .manifests
        .iter()
        .map(|(slug, manifest)| {
            render_json(manifest).map(|text| (manifest_path(output_dir, slug), text))
        })
        .collect::<Result<_, _>>()?;

    let manifests = pending
        .par_iter()
        .map(|(path, text)| write_if_changed(path, text))
        .collect::<Result<Vec<_>, _>>()?;

    // Manifests are all on disk from here on.
    let index = write_if_changed(index_path, &render_json(&registry.index)?)?;

    let pruned = if prune {
        prune_stale(output_dir, &index_location, registry)?
    } else {
        Vec::new()
    };

    let report = EmitReport {
        manifests,
        index,
        pruned,
    };
    info!(
        written = report.written(),
        unchanged = report.unchanged(),
        pruned = report.pruned.len(),
        "artifacts emitted"
    );
    Ok(report)
}

fn create_dir(dir: &Path) -> Result<(), RegistryError> {
    fs::create_dir_all(dir).map_err(|source| RegistryError::WriteFailure {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `text` to `path` unless the file already holds exactly those bytes.
pub fn write_if_changed(path: &Path, text: &str) -> Result<WrittenFile, RegistryError> {
    let unchanged = fs::read(path)
        .map(|existing| hash_bytes(&existing) == hash_bytes(text.as_bytes()))
        .unwrap_or(false);

    let status = if unchanged {
        WriteStatus::Unchanged
    } else {
        fs::write(path, text).map_err(|source| RegistryError::WriteFailure {
            path: path.to_path_buf(),
            source,
        })?;
        WriteStatus::Written
    };

    debug!(path = %path.display(), %status, "artifact");
    Ok(WrittenFile {
        path: path.to_path_buf(),
        status,
    })
}

/// `path` with its parent directory canonicalized, so `./r/registry.json`
/// and `r/registry.json` compare equal. The file itself need not exist.
fn resolved(path: &Path) -> PathBuf {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn check_index_collision(
    registry: &Registry,
    output_dir: &Path,
    index_location: &Path,
    index_path: &Path,
) -> Result<(), RegistryError> {
    let output_location = fs::canonicalize(output_dir).unwrap_or_else(|_| output_dir.to_path_buf());
    if index_location.parent() != Some(output_location.as_path()) {
        return Ok(());
    }
    let slug = index_location
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(".json"))
        .filter(|stem| registry.manifests.contains_key(*stem));
    match slug {
        Some(slug) => Err(RegistryError::IndexCollision {
            slug: slug.to_string(),
            path: index_path.to_path_buf(),
        }),
        None => Ok(()),
    }
}

fn prune_stale(
    output_dir: &Path,
    index_location: &Path,
    registry: &Registry,
) -> Result<Vec<PathBuf>, RegistryError> {
    let keep: HashSet<String> = registry
        .manifests
        .keys()
        .map(|slug| format!("{slug}.json"))
        .collect();

    let mut stale: Vec<PathBuf> = fs::read_dir(output_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == "json"))
        .filter(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
            !name.is_some_and(|n| keep.contains(&n))
        })
        .filter(|path| resolved(path) != index_location)
        .collect();
    stale.sort();

    for path in &stale {
        fs::remove_file(path).map_err(|source| RegistryError::WriteFailure {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "pruned stale manifest");
    }
    Ok(stale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::registry::build_registry;
    use crate::test_helpers::*;
    use crate::types::Manifest;
    use tempfile::TempDir;

    fn registry() -> Registry {
        build_registry(
            &[descriptor("tabs", "Tabs"), descriptor("hold-button", "Hold Button")],
            &RegistryConfig::default(),
        )
    }

    #[test]
    fn writes_one_manifest_per_slug_and_index() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("public/r");
        let index = tmp.path().join("registry.json");

        let report = emit(&registry(), &out, &index, false).unwrap();

        assert_eq!(report.manifests.len(), 2);
        assert!(out.join("tabs.json").is_file());
        assert!(out.join("hold-button.json").is_file());
        assert!(index.is_file());
        assert_eq!(report.written(), 3);
        assert_eq!(report.unchanged(), 0);
    }

    #[test]
    fn manifest_paths_are_in_slug_order() {
        let tmp = TempDir::new().unwrap();
        let report = emit(
            &registry(),
            tmp.path(),
            &tmp.path().join("registry.json"),
            false,
        )
        .unwrap();
        let names: Vec<String> = report
            .manifests
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["hold-button.json", "tabs.json"]);
    }

    #[test]
    fn written_manifest_reads_back() {
        let tmp = TempDir::new().unwrap();
        let registry = registry();
        emit(&registry, tmp.path(), &tmp.path().join("registry.json"), false).unwrap();

        let text = fs::read_to_string(tmp.path().join("tabs.json")).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.starts_with("{\n  \"$schema\""));
        let manifest: Manifest = serde_json::from_str(&text).unwrap();
        assert_eq!(manifest, registry.manifests["tabs"]);
    }

    #[test]
    fn second_emit_leaves_files_unchanged() {
        let tmp = TempDir::new().unwrap();
        let index = tmp.path().join("registry.json");
        emit(&registry(), tmp.path(), &index, false).unwrap();
        let before = fs::read(&index).unwrap();

        let report = emit(&registry(), tmp.path(), &index, false).unwrap();
        assert_eq!(report.written(), 0);
        assert_eq!(report.unchanged(), 3);
        assert_eq!(fs::read(&index).unwrap(), before);
    }

    #[test]
    fn modified_file_is_rewritten() {
        let tmp = TempDir::new().unwrap();
        let index = tmp.path().join("registry.json");
        emit(&registry(), tmp.path(), &index, false).unwrap();
        fs::write(tmp.path().join("tabs.json"), "{}").unwrap();

        let report = emit(&registry(), tmp.path(), &index, false).unwrap();
        assert_eq!(report.written(), 1);
        let tabs = report
            .manifests
            .iter()
            .find(|f| f.path.ends_with("tabs.json"))
            .unwrap();
        assert_eq!(tabs.status, WriteStatus::Written);
    }

    #[test]
    fn empty_registry_writes_empty_index() {
        let tmp = TempDir::new().unwrap();
        let index = tmp.path().join("registry.json");
        let empty = build_registry(&[], &RegistryConfig::default());

        let report = emit(&empty, &tmp.path().join("r"), &index, false).unwrap();
        assert!(report.manifests.is_empty());
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&index).unwrap()).unwrap();
        assert_eq!(value["items"], serde_json::json!([]));
    }

    #[test]
    fn unwritable_output_dir_is_write_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let result = emit(
            &registry(),
            &blocker.join("r"),
            &tmp.path().join("registry.json"),
            false,
        );
        assert!(matches!(result, Err(RegistryError::WriteFailure { .. })));
    }

    #[test]
    fn prune_removes_only_stale_json() {
        let tmp = TempDir::new().unwrap();
        let index = tmp.path().join("registry.json");
        fs::write(tmp.path().join("old-slider.json"), "{}").unwrap();
        fs::write(tmp.path().join("notes.txt"), "keep").unwrap();

        let report = emit(&registry(), tmp.path(), &index, true).unwrap();

        assert_eq!(report.pruned, vec![tmp.path().join("old-slider.json")]);
        assert!(!tmp.path().join("old-slider.json").exists());
        assert!(tmp.path().join("notes.txt").exists());
        assert!(index.exists());
        assert!(tmp.path().join("tabs.json").exists());
    }

    #[test]
    fn without_prune_stale_files_stay() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("old-slider.json"), "{}").unwrap();
        let report = emit(&registry(), tmp.path(), &tmp.path().join("registry.json"), false).unwrap();
        assert!(report.pruned.is_empty());
        assert!(tmp.path().join("old-slider.json").exists());
    }

    #[test]
    fn prune_keeps_index_spelled_another_way() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("r");
        let index = out.join("../r/registry.json");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("old-slider.json"), "{}").unwrap();

        let report = emit(&registry(), &out, &index, true).unwrap();

        assert_eq!(report.pruned, vec![out.join("old-slider.json")]);
        assert!(out.join("registry.json").is_file());
        assert!(out.join("tabs.json").is_file());
    }

    #[test]
    fn slug_named_like_index_is_rejected_before_writing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("r");
        let registry = build_registry(
            &[descriptor("registry", "Registry"), descriptor("tabs", "Tabs")],
            &RegistryConfig::default(),
        );

        let result = emit(&registry, &out, &out.join("./registry.json"), false);

        assert!(matches!(
            result,
            Err(RegistryError::IndexCollision { ref slug, .. }) if slug == "registry"
        ));
        assert!(!out.join("tabs.json").exists());
        assert!(!out.join("registry.json").exists());
    }

    #[test]
    fn index_outside_output_dir_never_collides() {
        let tmp = TempDir::new().unwrap();
        let registry = build_registry(
            &[descriptor("registry", "Registry")],
            &RegistryConfig::default(),
        );
        let out = tmp.path().join("r");
        let index = tmp.path().join("registry.json");

        emit(&registry, &out, &index, false).unwrap();
        assert!(out.join("registry.json").is_file());
        assert!(index.is_file());
    }

    #[test]
    fn unreadable_component_is_skipped_end_to_end() {
        let tmp = setup_fixtures();
        fs::write(tmp.path().join("tabs/tabs.tsx"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let out = tmp.path().join("public/r");
        let index = tmp.path().join("registry.json");

        let registry =
            crate::registry::load_registry(tmp.path(), &RegistryConfig::default()).unwrap();
        emit(&registry, &out, &index, false).unwrap();

        assert!(skipped_components(&registry).contains(&"tabs"));
        let written: crate::types::Index =
            serde_json::from_str(&fs::read_to_string(&index).unwrap()).unwrap();
        assert!(written.items.iter().all(|item| item.name != "tabs"));
        assert_eq!(written.items.len(), 3);
        assert!(!out.join("tabs.json").exists());
        assert!(out.join("hold-button.json").is_file());
    }

    #[test]
    fn hash_bytes_is_sha256_hex() {
        let h = hash_bytes(b"");
        assert_eq!(h.len(), 64);
        assert_eq!(
            h,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
