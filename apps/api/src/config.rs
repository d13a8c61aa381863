use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::models::SourceTag;
use crate::skills::DEFAULT_SKILLS;

/// How job descriptions and resumes are analysed before the catalog scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    Keyword,
    Normalized,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Enabled sources, in the order they are queried and merged.
    pub sources: Vec<SourceTag>,
    /// Base URLs for sources backed by a job board API.
    pub source_urls: HashMap<SourceTag, String>,
    pub skill_catalog: Vec<String>,
    pub per_source_timeout: Duration,
    pub default_location: String,
    pub default_radius: f64,
    /// Fraction in [0, 1] at which a match counts as strong.
    pub skills_threshold: f64,
    pub extraction_mode: ExtractionMode,
    pub output_path: String,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourceTag::ALL.to_vec(),
            source_urls: HashMap::new(),
            skill_catalog: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            per_source_timeout: Duration::from_secs(10),
            default_location: "Remote".to_string(),
            default_radius: 50.0,
            skills_threshold: 0.7,
            extraction_mode: ExtractionMode::Keyword,
            output_path: "output".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let sources = match get("JOB_SOURCES") {
            Some(raw) => parse_sources(&raw)?,
            None => defaults.sources,
        };

        let source_urls = SourceTag::ALL
            .into_iter()
            .filter_map(|tag| {
                let key = format!("{}_API_URL", tag.as_str().to_uppercase());
                get(&key).map(|url| (tag, url.trim().to_string()))
            })
            .collect();

        let skill_catalog = match get("SKILL_CATALOG") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.skill_catalog,
        };

        let per_source_timeout = match get("SOURCE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: f64 = raw
                    .trim()
                    .parse()
                    .context("SOURCE_TIMEOUT_SECS must be a number")?;
                if !secs.is_finite() || secs <= 0.0 {
                    bail!("SOURCE_TIMEOUT_SECS must be positive, got {secs}");
                }
                Duration::from_secs_f64(secs)
            }
            None => defaults.per_source_timeout,
        };

        let default_radius = match get("DEFAULT_RADIUS") {
            Some(raw) => {
                let radius: f64 = raw
                    .trim()
                    .parse()
                    .context("DEFAULT_RADIUS must be a number")?;
                if !radius.is_finite() || radius < 0.0 {
                    bail!("DEFAULT_RADIUS must be non-negative, got {radius}");
                }
                radius
            }
            None => defaults.default_radius,
        };

        let skills_threshold = match get("SKILLS_THRESHOLD") {
            Some(raw) => {
                let threshold: f64 = raw
                    .trim()
                    .parse()
                    .context("SKILLS_THRESHOLD must be a number")?;
                if !(0.0..=1.0).contains(&threshold) {
                    bail!("SKILLS_THRESHOLD must be between 0 and 1, got {threshold}");
                }
                threshold
            }
            None => defaults.skills_threshold,
        };

        let extraction_mode = match get("EXTRACTION_MODE").map(|m| m.trim().to_lowercase()) {
            None => defaults.extraction_mode,
            Some(mode) if mode == "keyword" => ExtractionMode::Keyword,
            Some(mode) if mode == "normalized" => ExtractionMode::Normalized,
            Some(other) => bail!("EXTRACTION_MODE must be 'keyword' or 'normalized', got '{other}'"),
        };

        Ok(Config {
            sources,
            source_urls,
            skill_catalog,
            per_source_timeout,
            default_location: get("DEFAULT_LOCATION").unwrap_or(defaults.default_location),
            default_radius,
            skills_threshold,
            extraction_mode,
            output_path: get("OUTPUT_PATH").unwrap_or(defaults.output_path),
            port: match get("PORT") {
                Some(raw) => raw
                    .trim()
                    .parse::<u16>()
                    .context("PORT must be a valid port number")?,
                None => defaults.port,
            },
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

/// Parses a comma-separated source list, keeping the first occurrence of each source.
fn parse_sources(raw: &str) -> Result<Vec<SourceTag>> {
    let mut sources = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let tag: SourceTag = name
            .parse()
            .map_err(|e: String| anyhow::anyhow!("JOB_SOURCES: {e}"))?;
        if !sources.contains(&tag) {
            sources.push(tag);
        }
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.sources, SourceTag::ALL.to_vec());
        assert!(config.source_urls.is_empty());
        assert_eq!(config.skill_catalog.len(), DEFAULT_SKILLS.len());
        assert_eq!(config.per_source_timeout, Duration::from_secs(10));
        assert_eq!(config.default_location, "Remote");
        assert_eq!(config.default_radius, 50.0);
        assert_eq!(config.skills_threshold, 0.7);
        assert_eq!(config.extraction_mode, ExtractionMode::Keyword);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_sources_keep_configured_order() {
        let config =
            Config::from_lookup(lookup(&[("JOB_SOURCES", "stepstone, Indeed,stepstone")])).unwrap();
        assert_eq!(config.sources, vec![SourceTag::Stepstone, SourceTag::Indeed]);
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let err = Config::from_lookup(lookup(&[("JOB_SOURCES", "linkedin,monster")])).unwrap_err();
        assert!(err.to_string().contains("monster"));
    }

    #[test]
    fn test_source_urls_are_read_per_source() {
        let config = Config::from_lookup(lookup(&[(
            "INDEED_API_URL",
            " https://jobs.example.com/indeed ",
        )]))
        .unwrap();
        assert_eq!(
            config.source_urls.get(&SourceTag::Indeed).map(String::as_str),
            Some("https://jobs.example.com/indeed")
        );
        assert!(!config.source_urls.contains_key(&SourceTag::Linkedin));
    }

    #[test]
    fn test_custom_catalog_and_timeout() {
        let config = Config::from_lookup(lookup(&[
            ("SKILL_CATALOG", "Rust, Tokio, ,Axum"),
            ("SOURCE_TIMEOUT_SECS", "2.5"),
        ]))
        .unwrap();
        assert_eq!(config.skill_catalog, vec!["Rust", "Tokio", "Axum"]);
        assert_eq!(config.per_source_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("DEFAULT_RADIUS", "-3")])).is_err());
        assert!(Config::from_lookup(lookup(&[("DEFAULT_RADIUS", "far")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SOURCE_TIMEOUT_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SKILLS_THRESHOLD", "70")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PORT", "99999")])).is_err());
    }

    #[test]
    fn test_extraction_mode() {
        let config = Config::from_lookup(lookup(&[("EXTRACTION_MODE", "Normalized")])).unwrap();
        assert_eq!(config.extraction_mode, ExtractionMode::Normalized);
        assert!(Config::from_lookup(lookup(&[("EXTRACTION_MODE", "spacy")])).is_err());
    }
}
