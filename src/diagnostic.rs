//! Per-component problems that skip a component without failing the build.
//!
//! The scanner and the builder both report into this type. A [`Diagnostic`]
//! always names the component directory it came from so the report can list
//! outcomes in directory order.

use std::fmt;

/// Why a component was left out of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// No metadata file, or a required identity field is empty.
    MissingMetadata(String),
    /// The metadata file exists but does not parse or declares something invalid.
    InvalidMetadata(String),
    /// The slug is not URL-safe.
    InvalidSlug(String),
    /// A declared or discovered file could not be read as UTF-8 text.
    UnreadableSource { path: String, reason: String },
    /// Another component already claimed this slug.
    DuplicateSlug { slug: String, first: String },
    /// Two files of the same component target the same output path.
    DuplicatePath(String),
    /// Nothing to ship.
    NoSourceFiles,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetadata(what) => write!(f, "missing metadata: {what}"),
            Self::InvalidMetadata(why) => write!(f, "invalid metadata: {why}"),
            Self::InvalidSlug(slug) => write!(
                f,
                "invalid slug {slug:?} (lowercase letters, digits and single hyphens only)"
            ),
            Self::UnreadableSource { path, reason } => {
                write!(f, "unreadable source {path}: {reason}")
            }
            Self::DuplicateSlug { slug, first } => {
                write!(f, "duplicate slug {slug:?} (already provided by {first})")
            }
            Self::DuplicatePath(path) => write!(f, "duplicate output path {path}"),
            Self::NoSourceFiles => write!(f, "no source files"),
        }
    }
}

/// A skipped component and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Component directory name.
    pub component: String,
    pub problem: Problem,
}

impl Diagnostic {
    pub fn new(component: impl Into<String>, problem: Problem) -> Self {
        Self {
            component: component.into(),
            problem,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.component, self.problem)
    }
}
