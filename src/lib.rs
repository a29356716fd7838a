//! # messy-registry
//!
//! Build tooling for the messy-ui component catalog. Turns a directory of
//! copy-paste React components into the JSON registry read by the shadcn
//! installer CLI, derives the docs site's sitemap and alias redirects from the
//! same catalog, and plans the odometer animation of the counter component.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Scan    registry/new-york/  →  descriptors     (filesystem → structured data)
//! 2. Build   descriptors         →  manifests+index (pure, no I/O)
//! 3. Emit    manifests+index     →  public/r/*.json, registry.json
//! ```
//!
//! The split keeps the interesting logic testable: the build stage is a pure
//! function from descriptors to artifacts, so validation rules, duplicate
//! handling and determinism are tested with in-memory descriptors and never
//! touch the filesystem.
//!
//! A component that can't be loaded or fails validation is skipped with a
//! [`diagnostic::Diagnostic`]; the rest of the catalog still builds. Only
//! environmental failures (missing source directory, unwritable output, bad
//! config) stop a run.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the source directory, loads `meta.toml`/`meta.json` and source files |
//! | [`registry`] | Stage 2: validates descriptors, assembles manifests and the index |
//! | [`emit`] | Stage 3: writes manifests in parallel, then the index |
//! | [`sitemap`] | `sitemap.xml` and alias redirects rendered with Maud |
//! | [`counter`] | Odometer digit-rotation planning |
//! | [`config`] | `registry.toml` loading, merging, and validation |
//! | [`types`] | Installer wire format (`Manifest`, `Index`, `FileRef`) and descriptors |
//! | [`naming`] | Slug rules and source-file classification |
//! | [`diagnostic`] | Per-component problems that skip a component |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Declarative Metadata
//!
//! Each component directory carries a `meta.toml` (or `meta.json`) parsed
//! with a real parser into a typed struct. Field names in the file map
//! one-to-one onto [`scan::ComponentMeta`]; there is no text scraping of
//! source files.
//!
//! ## Byte-Stable Output
//!
//! Directories are visited in name order, manifests are keyed by slug in a
//! `BTreeMap`, and nothing time-dependent is recorded. Running the build twice
//! on an unchanged catalog produces identical bytes, and [`emit`] skips
//! rewriting files whose content hash already matches.
//!
//! ## First Slug Wins
//!
//! When two components claim the same slug the first one (in directory
//! order) is kept and the second is reported. The installer addresses
//! components by slug alone, so shipping both is never an option.

pub mod config;
pub mod counter;
pub mod diagnostic;
pub mod emit;
pub mod naming;
pub mod output;
pub mod registry;
pub mod scan;
pub mod sitemap;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
