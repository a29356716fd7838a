//! Sitemap and alias redirects for the docs site.
//!
//! Derived from the same catalog as the registry so the site never lists a
//! component the installer can't fetch.
//!
//! ## URLs
//!
//! | Page | URL | Priority | Change frequency |
//! |------|-----|----------|------------------|
//! | Home | `{base}` | 1.0 | weekly |
//! | Gallery | `{base}/components` | 0.9 | weekly |
//! | Component | `{base}/components/{slug}` | 0.8 | monthly |
//! | Alias | `{base}/components/{alias}` | 0.6 | monthly |
//! | Category | `{base}/components?category={category}` | 0.7 | weekly |
//!
//! No `lastmod` is emitted; the sitemap only changes when the catalog does.
//!
//! ## Aliases
//!
//! An alias becomes a permanent redirect to its component. Aliases that are
//! not valid slugs, shadow a real component, or were already claimed by an
//! earlier component are dropped with a warning.

use crate::emit::{self, WrittenFile};
use crate::naming;
use crate::registry::{Registry, RegistryError};
use maud::{Markup, PreEscaped, html};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const SITEMAP_FILENAME: &str = "sitemap.xml";
pub const REDIRECTS_FILENAME: &str = "redirects.json";

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Characters left alone by JavaScript's `encodeURIComponent`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Weekly,
    Monthly,
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// One permanent redirect, in the shape the site's router config expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub source: String,
    pub destination: String,
    pub permanent: bool,
}

/// Files written by [`write_site_files`].
#[derive(Debug, Clone)]
pub struct SiteFiles {
    pub sitemap: WrittenFile,
    pub redirects: WrittenFile,
}

/// Aliases that survive the collision rules, as `(alias, slug)` pairs.
pub fn resolved_aliases(registry: &Registry) -> Vec<(&str, &str)> {
    let slugs: HashSet<&str> = registry.entries().map(|e| e.slug.as_str()).collect();
    let mut claimed = HashSet::new();
    let mut pairs = Vec::new();

    for entry in registry.entries() {
        for alias in &entry.aliases {
            let alias = alias.as_str();
            if !naming::is_valid_slug(alias) {
                warn!(slug = %entry.slug, alias, "dropping alias: not a valid slug");
            } else if slugs.contains(alias) {
                warn!(slug = %entry.slug, alias, "dropping alias: shadows a component");
            } else if !claimed.insert(alias) {
                warn!(slug = %entry.slug, alias, "dropping alias: already claimed");
            } else {
                pairs.push((alias, entry.slug.as_str()));
            }
        }
    }
    pairs
}

/// Every sitemap URL, in page-kind order: static, components, aliases,
/// categories.
pub fn sitemap_entries(registry: &Registry, base_url: &str) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');
    let entry = |loc: String, changefreq, priority| SitemapEntry {
        loc,
        changefreq,
        priority,
    };

    let mut entries = vec![
        entry(base.to_string(), ChangeFreq::Weekly, 1.0),
        entry(format!("{base}/components"), ChangeFreq::Weekly, 0.9),
    ];
    entries.extend(
        registry
            .entries()
            .map(|e| entry(format!("{base}/components/{}", e.slug), ChangeFreq::Monthly, 0.8)),
    );
    entries.extend(
        resolved_aliases(registry)
            .into_iter()
            .map(|(alias, _)| entry(format!("{base}/components/{alias}"), ChangeFreq::Monthly, 0.6)),
    );
    entries.extend(registry.categories().into_iter().map(|category| {
        let encoded = utf8_percent_encode(category, QUERY_VALUE);
        entry(
            format!("{base}/components?category={encoded}"),
            ChangeFreq::Weekly,
            0.7,
        )
    }));
    entries
}

/// Render a sitemaps.org `urlset` document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> Markup {
    html! {
        (PreEscaped(r#"<?xml version="1.0" encoding="UTF-8"?>"#))
        "\n"
        urlset xmlns=(SITEMAP_NS) {
            @for e in entries {
                url {
                    loc { (e.loc) }
                    changefreq { (e.changefreq.to_string()) }
                    priority { (format!("{:.1}", e.priority)) }
                }
            }
        }
    }
}

/// Redirects from every surviving alias to its component page.
pub fn redirects(registry: &Registry) -> Vec<Redirect> {
    resolved_aliases(registry)
        .into_iter()
        .map(|(alias, slug)| Redirect {
            source: format!("/components/{alias}"),
            destination: format!("/components/{slug}"),
            permanent: true,
        })
        .collect()
}

/// Write `sitemap.xml` and `redirects.json` into `out_dir`.
pub fn write_site_files(
    registry: &Registry,
    base_url: &str,
    out_dir: &Path,
) -> Result<SiteFiles, RegistryError> {
    fs::create_dir_all(out_dir).map_err(|source| RegistryError::WriteFailure {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut xml = render_sitemap(&sitemap_entries(registry, base_url)).into_string();
    xml.push('\n');
    let sitemap = emit::write_if_changed(&out_dir.join(SITEMAP_FILENAME), &xml)?;

    let redirect_file = emit::write_if_changed(
        &out_dir.join(REDIRECTS_FILENAME),
        &emit::render_json(&redirects(registry))?,
    )?;

    Ok(SiteFiles {
        sitemap,
        redirects: redirect_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::emit::WriteStatus;
    use crate::registry::build_registry;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn catalog() -> Registry {
        let mut counter = descriptor("animated-counter", "Animated Counter");
        counter.category = Some("Animations".to_string());
        counter.aliases = vec!["odometer-counter".to_string(), "digit-counter".to_string()];
        let mut toggle = descriptor("theme-toggle", "Theme Toggle");
        toggle.category = Some("Navigation & Menus".to_string());
        build_registry(&[counter, toggle], &RegistryConfig::default())
    }

    fn locs(entries: &[SitemapEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.loc.as_str()).collect()
    }

    #[test]
    fn entries_follow_page_kind_order() {
        let entries = sitemap_entries(&catalog(), "https://messyui.dev/");
        assert_eq!(
            locs(&entries),
            vec![
                "https://messyui.dev",
                "https://messyui.dev/components",
                "https://messyui.dev/components/animated-counter",
                "https://messyui.dev/components/theme-toggle",
                "https://messyui.dev/components/odometer-counter",
                "https://messyui.dev/components/digit-counter",
                "https://messyui.dev/components?category=Animations",
                "https://messyui.dev/components?category=Navigation%20%26%20Menus",
            ]
        );
    }

    #[test]
    fn priorities_by_page_kind() {
        let entries = sitemap_entries(&catalog(), "https://messyui.dev");
        let priorities: Vec<f32> = entries.iter().map(|e| e.priority).collect();
        assert_eq!(priorities, vec![1.0, 0.9, 0.8, 0.8, 0.6, 0.6, 0.7, 0.7]);
        assert_eq!(entries[2].changefreq, ChangeFreq::Monthly);
        assert_eq!(entries[0].changefreq, ChangeFreq::Weekly);
    }

    #[test]
    fn empty_catalog_lists_static_pages() {
        let registry = build_registry(&[], &RegistryConfig::default());
        let entries = sitemap_entries(&registry, "https://messyui.dev");
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn rendered_sitemap_is_urlset_xml() {
        let xml = render_sitemap(&sitemap_entries(&catalog(), "https://messyui.dev")).into_string();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(!xml.contains("<loc>https://messyui.dev/components/tabs</loc>"));
        assert!(xml.contains("<loc>https://messyui.dev/components/theme-toggle</loc>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.contains("<changefreq>monthly</changefreq>"));
    }

    #[test]
    fn ampersand_in_url_is_escaped() {
        let entries = vec![SitemapEntry {
            loc: "https://x.dev/?a=1&b=2".to_string(),
            changefreq: ChangeFreq::Weekly,
            priority: 0.5,
        }];
        let xml = render_sitemap(&entries).into_string();
        assert!(xml.contains("<loc>https://x.dev/?a=1&amp;b=2</loc>"));
    }

    #[test]
    fn redirects_point_aliases_at_components() {
        assert_eq!(
            redirects(&catalog()),
            vec![
                Redirect {
                    source: "/components/odometer-counter".to_string(),
                    destination: "/components/animated-counter".to_string(),
                    permanent: true,
                },
                Redirect {
                    source: "/components/digit-counter".to_string(),
                    destination: "/components/animated-counter".to_string(),
                    permanent: true,
                },
            ]
        );
    }

    #[test]
    fn colliding_aliases_are_dropped() {
        let mut tabs = descriptor("tabs", "Tabs");
        tabs.aliases = vec![
            "animated-tabs".to_string(),
            "separator".to_string(),
            "Bad Alias".to_string(),
        ];
        let mut other = descriptor("segmented", "Segmented");
        other.aliases = vec!["animated-tabs".to_string()];
        let registry = build_registry(
            &[tabs, descriptor("separator", "Separator"), other],
            &RegistryConfig::default(),
        );

        assert_eq!(resolved_aliases(&registry), vec![("animated-tabs", "tabs")]);
    }

    #[test]
    fn write_site_files_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let first = write_site_files(&catalog(), "https://messyui.dev", tmp.path()).unwrap();
        assert_eq!(first.sitemap.status, WriteStatus::Written);
        assert!(tmp.path().join(SITEMAP_FILENAME).is_file());

        let second = write_site_files(&catalog(), "https://messyui.dev", tmp.path()).unwrap();
        assert_eq!(second.sitemap.status, WriteStatus::Unchanged);
        assert_eq!(second.redirects.status, WriteStatus::Unchanged);

        let redirects: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(tmp.path().join(REDIRECTS_FILENAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(redirects[0]["permanent"], true);
    }
}
