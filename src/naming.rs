//! Naming rules shared by the scanner and the registry builder.
//!
//! Three conventions live here:
//!
//! - **Slugs**: the primary key of a component across manifests, the index,
//!   and site URLs. A slug is lowercase ASCII letters and digits separated by
//!   single hyphens: `animated-counter`, `tabs`, `hold-button-2`.
//! - **Source files**: which files in a component directory ship to the
//!   installer. Only files with a configured extension count; metadata,
//!   barrel files, examples and tests are left behind.
//! - **Relative paths**: snippet sources and installer target paths must
//!   stay below their root, so a metadata file can't read or write outside
//!   the component or the consumer project.

use crate::config::SourcesConfig;

/// What a file in a component directory is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// Shipped as a `registry:component` file.
    Source,
    /// Test or story file, skipped.
    Test,
    /// Listed in `sources.ignore` (barrel files, examples, legacy metadata).
    Ignored,
    /// Anything else (stylesheets, images, notes). Reachable only through
    /// explicit snippets.
    Other,
}

/// Check a slug is URL-safe: `[a-z0-9]+(-[a-z0-9]+)*`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|part| {
            !part.is_empty()
                && part
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

/// Classify a file name found in a component directory.
pub fn classify_file(file_name: &str, sources: &SourcesConfig) -> FileRole {
    if sources.ignore.iter().any(|ignored| ignored == file_name) {
        return FileRole::Ignored;
    }
    if file_name.starts_with('.') {
        return FileRole::Other;
    }
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return FileRole::Other;
    };
    if !sources.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
        return FileRole::Other;
    }
    if sources
        .test_markers
        .iter()
        .any(|marker| file_name.contains(marker.as_str()))
    {
        return FileRole::Test;
    }
    FileRole::Source
}

/// Check an output or snippet path is relative and stays below its root.
///
/// Rejects empty paths, absolute paths, backslashes and `.`/`..` segments.
pub fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && !path.contains(':')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> SourcesConfig {
        SourcesConfig::default()
    }

    #[test]
    fn simple_slugs_are_valid() {
        assert!(is_valid_slug("tabs"));
        assert!(is_valid_slug("animated-counter"));
        assert!(is_valid_slug("hold-button-2"));
        assert!(is_valid_slug("3d-logo"));
    }

    #[test]
    fn empty_slug_is_invalid() {
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn uppercase_and_spaces_are_invalid() {
        assert!(!is_valid_slug("Tabs"));
        assert!(!is_valid_slug("hold button"));
        assert!(!is_valid_slug("über"));
    }

    #[test]
    fn stray_hyphens_are_invalid() {
        assert!(!is_valid_slug("-tabs"));
        assert!(!is_valid_slug("tabs-"));
        assert!(!is_valid_slug("hold--button"));
    }

    #[test]
    fn path_characters_are_invalid() {
        assert!(!is_valid_slug("../etc"));
        assert!(!is_valid_slug("ui/tabs"));
        assert!(!is_valid_slug("tabs.json"));
    }

    #[test]
    fn tsx_file_is_source() {
        assert_eq!(classify_file("hold-button.tsx", &sources()), FileRole::Source);
        assert_eq!(classify_file("use-theme.ts", &sources()), FileRole::Source);
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(classify_file("Legacy.TSX", &sources()), FileRole::Source);
    }

    #[test]
    fn test_and_story_files_are_tests() {
        assert_eq!(classify_file("tabs.test.tsx", &sources()), FileRole::Test);
        assert_eq!(classify_file("tabs.spec.ts", &sources()), FileRole::Test);
        assert_eq!(classify_file("tabs.stories.tsx", &sources()), FileRole::Test);
    }

    #[test]
    fn barrel_and_example_files_are_ignored() {
        assert_eq!(classify_file("index.ts", &sources()), FileRole::Ignored);
        assert_eq!(classify_file("example.tsx", &sources()), FileRole::Ignored);
        assert_eq!(classify_file("meta.ts", &sources()), FileRole::Ignored);
    }

    #[test]
    fn stylesheets_and_metadata_are_other() {
        assert_eq!(classify_file("theme-toggle.css", &sources()), FileRole::Other);
        assert_eq!(classify_file("meta.toml", &sources()), FileRole::Other);
        assert_eq!(classify_file("README", &sources()), FileRole::Other);
        assert_eq!(classify_file(".DS_Store", &sources()), FileRole::Other);
    }

    #[test]
    fn nested_relative_paths_are_safe() {
        assert!(is_safe_relative_path("components/ui/tabs.tsx"));
        assert!(is_safe_relative_path("theme-toggle.css"));
    }

    #[test]
    fn escaping_paths_are_unsafe() {
        assert!(!is_safe_relative_path(""));
        assert!(!is_safe_relative_path("/etc/passwd"));
        assert!(!is_safe_relative_path("../secrets.ts"));
        assert!(!is_safe_relative_path("styles/./x.css"));
        assert!(!is_safe_relative_path("styles//x.css"));
        assert!(!is_safe_relative_path("C:\\temp\\x.css"));
    }
}
