//! The fixed vocabulary of recognised skills and their token-boundary patterns.

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::SkillSet;

/// Default vocabulary: languages, data stores, cloud/devops, frameworks, AI/data, methodologies.
pub const DEFAULT_SKILLS: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "C++",
    "C#",
    "Ruby",
    "PHP",
    "Swift",
    "Go",
    "Rust",
    "HTML",
    "CSS",
    "SQL",
    "NoSQL",
    "MongoDB",
    "PostgreSQL",
    "MySQL",
    "Redis",
    "AWS",
    "Azure",
    "GCP",
    "Docker",
    "Kubernetes",
    "Git",
    "Jenkins",
    "React",
    "Angular",
    "Vue.js",
    "Node.js",
    "Express",
    "Django",
    "Flask",
    "Machine Learning",
    "Data Science",
    "AI",
    "NLP",
    "Computer Vision",
    "Agile",
    "Scrum",
    "Project Management",
];

/// Anything that is not a letter, digit or underscore separates tokens.
const BOUNDARY_BEFORE: &str = r"(?:^|[^\p{L}\p{N}_])";
const BOUNDARY_AFTER: &str = r"(?:$|[^\p{L}\p{N}_])";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("skill catalog has no entries")]
    EmptyCatalog,

    #[error("skill catalog entry '{entry}' cannot be compiled: {source}")]
    InvalidEntry {
        entry: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug)]
struct CatalogEntry {
    canonical: String,
    pattern: Regex,
}

/// Ordered, read-only skill vocabulary. Built once at startup and shared by reference.
#[derive(Debug)]
pub struct SkillCatalog {
    entries: Vec<CatalogEntry>,
}

impl SkillCatalog {
    /// Builds a catalog from canonical names. Entries are trimmed; blank entries and
    /// case-insensitive duplicates are dropped (first occurrence wins).
    pub fn new<I, S>(names: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for name in names {
            let canonical = name.as_ref().trim();
            if canonical.is_empty() {
                continue;
            }
            let lower = canonical.to_lowercase();
            if !seen.insert(lower.clone()) {
                warn!(entry = canonical, "Duplicate skill catalog entry ignored");
                continue;
            }

            let pattern = token_pattern(&lower).map_err(|source| CatalogError::InvalidEntry {
                entry: canonical.to_string(),
                source,
            })?;
            entries.push(CatalogEntry {
                canonical: canonical.to_string(),
                pattern,
            });
        }

        if entries.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        debug!(entries = entries.len(), "Skill catalog built");
        Ok(Self { entries })
    }

    pub fn default_catalog() -> Result<Self, CatalogError> {
        Self::new(DEFAULT_SKILLS.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.canonical.as_str())
    }

    /// Returns the canonical form of `name`, matched case-insensitively.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let lower = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.canonical.to_lowercase() == lower)
            .map(|e| e.canonical.as_str())
    }

    /// Maps caller-supplied skill names onto the catalog.
    /// Returns the recognised skills and the names that are not in the catalog.
    pub fn resolve<I, S>(&self, names: I) -> (SkillSet, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skills = SkillSet::new();
        let mut unknown = Vec::new();

        for name in names {
            let name = name.as_ref();
            match self.canonical(name) {
                Some(canonical) => {
                    skills.insert(canonical);
                }
                None if name.trim().is_empty() => {}
                None => unknown.push(name.trim().to_string()),
            }
        }

        (skills, unknown)
    }

    /// Canonical names whose token-boundary pattern occurs in already-lowercased text.
    pub(crate) fn scan<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.pattern.is_match(lowered))
            .map(|e| e.canonical.as_str())
    }
}

fn token_pattern(lowered_entry: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        "{BOUNDARY_BEFORE}{}{BOUNDARY_AFTER}",
        regex::escape(lowered_entry)
    ))
}
