//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **component-centric, not file-centric**. The primary display for
//! every component is its positional index and title, with the slug, source
//! directory and problems shown as indented context lines. This reads as a
//! catalog inventory while still letting users trace an entry back to its
//! directory.
//!
//! # Output Format
//!
//! ## Build / Check
//!
//! ```text
//! Components
//! 001 Animated Counter (1 file)
//!     Slug: animated-counter
//!     Source: animated-counter/
//! 002 liquid-slider (skipped)
//!     Problem: missing metadata: no meta.toml or meta.json found
//!
//! 4 built, 1 skipped
//! ```
//!
//! ## Emit
//!
//! ```text
//! Manifests → public/r
//!     animated-counter.json: written
//!     tabs.json: unchanged
//! Index → registry.json: written
//!
//! Wrote 2 files, 1 unchanged
//! ```
//!
//! ## Counter
//!
//! ```text
//! Counter 1234 (cap 20, 2.0s)
//!     1 ← 1 step
//!     2 ← 12 steps
//!     3 ← 23 steps (capped)
//!     4 ← 24 steps (capped)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::counter::RotationPlan;
use crate::emit::EmitReport;
use crate::registry::{CatalogEntry, Outcome, Registry};
use crate::sitemap::SiteFiles;
use crate::types::Manifest;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Show `path` relative to `base` when it lives below it.
fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Build / check
// ============================================================================

/// Format one line block per component plus the final tally.
pub fn format_build_report(registry: &Registry) -> Vec<String> {
    let mut lines = vec!["Components".to_string()];

    for (i, outcome) in registry.outcomes.iter().enumerate() {
        let index = format_index(i + 1);
        match outcome {
            Outcome::Built(entry) => {
                lines.push(format!(
                    "{} {} ({})",
                    index,
                    entry.title,
                    plural(entry.file_count, "file", "files")
                ));
                lines.push(format!("{}Slug: {}", indent(1), entry.slug));
                lines.push(format!("{}Source: {}/", indent(1), entry.source_dir));
            }
            Outcome::Skipped(diagnostic) => {
                lines.push(format!("{} {} (skipped)", index, diagnostic.component));
                lines.push(format!("{}Problem: {}", indent(1), diagnostic.problem));
            }
        }
    }

    if registry.outcomes.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} built, {} skipped",
        registry.processed(),
        registry.skipped()
    ));
    lines
}

pub fn print_build_report(registry: &Registry) {
    for line in format_build_report(registry) {
        println!("{}", line);
    }
}

// ============================================================================
// Emit
// ============================================================================

/// Format write statuses. Paths are shown relative to `base` (usually the
/// working directory).
pub fn format_emit_report(report: &EmitReport, output_dir: &Path, base: &Path) -> Vec<String> {
    let mut lines = vec![format!("Manifests → {}", display_path(output_dir, base))];
    for file in &report.manifests {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            display_path(&file.path, output_dir),
            file.status
        ));
    }
    lines.push(format!(
        "Index → {}: {}",
        display_path(&report.index.path, base),
        report.index.status
    ));

    if !report.pruned.is_empty() {
        lines.push("Pruned".to_string());
        for path in &report.pruned {
            lines.push(format!("{}{}", indent(1), display_path(path, output_dir)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Wrote {}, {} unchanged",
        plural(report.written(), "file", "files"),
        report.unchanged()
    ));
    lines
}

pub fn print_emit_report(report: &EmitReport, output_dir: &Path, base: &Path) {
    for line in format_emit_report(report, output_dir, base) {
        println!("{}", line);
    }
}

/// Format sitemap and redirect write statuses.
pub fn format_site_files(files: &SiteFiles, base: &Path) -> Vec<String> {
    vec![
        format!(
            "Sitemap → {}: {}",
            display_path(&files.sitemap.path, base),
            files.sitemap.status
        ),
        format!(
            "Redirects → {}: {}",
            display_path(&files.redirects.path, base),
            files.redirects.status
        ),
    ]
}

pub fn print_site_files(files: &SiteFiles, base: &Path) {
    for line in format_site_files(files, base) {
        println!("{}", line);
    }
}

// ============================================================================
// Show
// ============================================================================

/// Format one component's summary and shipped files.
pub fn format_component(entry: &CatalogEntry, manifest: &Manifest) -> Vec<String> {
    let mut lines = vec![entry.title.clone()];
    lines.push(format!("{}Slug: {}", indent(1), entry.slug));
    if let Some(category) = &entry.category {
        lines.push(format!("{}Category: {}", indent(1), category));
    }
    if !entry.description.is_empty() {
        lines.push(format!(
            "{}Description: {}",
            indent(1),
            truncate_desc(&entry.description, 72)
        ));
    }
    if !entry.dependencies.is_empty() {
        lines.push(format!(
            "{}Dependencies: {}",
            indent(1),
            entry.dependencies.join(", ")
        ));
    }
    if !entry.aliases.is_empty() {
        lines.push(format!("{}Aliases: {}", indent(1), entry.aliases.join(", ")));
    }
    lines.push(format!("{}Source: {}/", indent(1), entry.source_dir));
    lines.push(format!("{}Files:", indent(1)));
    for file in &manifest.item.files {
        lines.push(format!(
            "{}{} ({}, {})",
            indent(2),
            file.path,
            file.kind.as_str(),
            plural(file.content.len(), "byte", "bytes")
        ));
    }
    lines
}

pub fn print_component(entry: &CatalogEntry, manifest: &Manifest) {
    for line in format_component(entry, manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Counter
// ============================================================================

/// Format a rotation plan, most-significant wheel first.
pub fn format_counter_plan(plan: &RotationPlan, duration: f64) -> Vec<String> {
    let mut lines = vec![format!(
        "Counter {} (cap {}, {:.1}s)",
        plan.target, plan.cap, duration
    )];
    let wheels = plan.wheels.len();
    for (i, wheel) in plan.wheels.iter().enumerate() {
        let position = wheels - 1 - i;
        let full = plan.target / 10u64.pow(position as u32);
        let capped = if full > plan.cap { " (capped)" } else { "" };
        lines.push(format!(
            "{}{} ← {}{}",
            indent(1),
            wheel.final_digit,
            plural(wheel.rotations as usize, "step", "steps"),
            capped
        ));
    }
    lines
}

pub fn print_counter_plan(plan: &RotationPlan, duration: f64) {
    for line in format_counter_plan(plan, duration) {
        println!("{}", line);
    }
}

// ============================================================================
