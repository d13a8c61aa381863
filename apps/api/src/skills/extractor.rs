//! Maps free text (resume or job description) to a catalog-bound `SkillSet`.
//!
//! Matching is exact-token and case-insensitive: an entry matches only when it is
//! surrounded by non-word characters or the text edges, so "Java" never matches
//! inside "JavaScript". No stemming or fuzzy matching.

use std::fmt;
use std::sync::Arc;

use crate::models::SkillSet;
use crate::skills::catalog::SkillCatalog;

/// Rewrites text before the catalog scan. Must be deterministic and pure.
pub trait TextNormalizer: Send + Sync {
    fn name(&self) -> &str;
    fn normalize(&self, text: &str) -> String;
}

/// Folds every run of whitespace (including line breaks) into a single space,
/// so multi-word skills wrapped across lines still match.
pub struct CollapseWhitespace;

impl TextNormalizer for CollapseWhitespace {
    fn name(&self) -> &str {
        "collapse_whitespace"
    }

    fn normalize(&self, text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Text-analysis capability handed to the extractor at construction.
///
/// `Keyword` is the deterministic fallback and needs nothing beyond the catalog.
/// `Normalized` scans the raw text and the normalizer's output; its results are
/// always a superset of `Keyword` and still restricted to the catalog.
#[derive(Clone, Default)]
pub enum TextAnalysis {
    #[default]
    Keyword,
    Normalized(Arc<dyn TextNormalizer>),
}

impl TextAnalysis {
    pub fn label(&self) -> &str {
        match self {
            TextAnalysis::Keyword => "keyword",
            TextAnalysis::Normalized(normalizer) => normalizer.name(),
        }
    }
}

impl fmt::Debug for TextAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextAnalysis({})", self.label())
    }
}

/// Stateless given its catalog; safe to share across tasks.
#[derive(Debug, Clone)]
pub struct SkillExtractor {
    catalog: Arc<SkillCatalog>,
    analysis: TextAnalysis,
}

impl SkillExtractor {
    pub fn new(catalog: Arc<SkillCatalog>) -> Self {
        Self::with_analysis(catalog, TextAnalysis::Keyword)
    }

    pub fn with_analysis(catalog: Arc<SkillCatalog>, analysis: TextAnalysis) -> Self {
        Self { catalog, analysis }
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn analysis(&self) -> &TextAnalysis {
        &self.analysis
    }

    pub fn extract_skills(&self, text: &str) -> SkillSet {
        if text.trim().is_empty() {
            return SkillSet::new();
        }

        let lowered = text.to_lowercase();
        let mut skills: SkillSet = self.catalog.scan(&lowered).collect();

        if let TextAnalysis::Normalized(normalizer) = &self.analysis {
            let normalized = normalizer.normalize(text).to_lowercase();
            for skill in self.catalog.scan(&normalized) {
                skills.insert(skill);
            }
        }

        skills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SkillExtractor {
        SkillExtractor::new(Arc::new(SkillCatalog::default_catalog().unwrap()))
    }

    fn names(set: &SkillSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[test]
    fn test_java_and_javascript_do_not_cross_match() {
        let skills = extractor().extract_skills("I know Java and JavaScript");
        assert_eq!(names(&skills), vec!["Java", "JavaScript"]);
    }

    #[test]
    fn test_javascript_alone_does_not_imply_java() {
        let skills = extractor().extract_skills("Senior JavaScript developer");
        assert_eq!(names(&skills), vec!["JavaScript"]);
    }

    #[test]
    fn test_empty_text_yields_empty_set() {
        assert!(extractor().extract_skills("").is_empty());
        assert!(extractor().extract_skills("   \n").is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive_and_canonical() {
        let skills = extractor().extract_skills("PYTHON, aws and kubernetes");
        assert_eq!(names(&skills), vec!["AWS", "Kubernetes", "Python"]);
    }

    #[test]
    fn test_abbreviations_are_not_expanded() {
        let skills = extractor().extract_skills("Strong JS and TS skills");
        assert!(!skills.contains("JavaScript"));
    }

    #[test]
    fn test_punctuated_skills_match() {
        let skills =
            extractor().extract_skills("Backend in Node.js and C++; frontend in Vue.js. Some C#.");
        assert_eq!(names(&skills), vec!["C#", "C++", "Node.js", "Vue.js"]);
    }

    #[test]
    fn test_go_does_not_match_inside_words() {
        let skills = extractor().extract_skills("Good communication, google-fu, MongoDB");
        assert_eq!(names(&skills), vec!["MongoDB"]);
    }

    #[test]
    fn test_sql_does_not_match_inside_nosql_or_mysql() {
        let skills = extractor().extract_skills("NoSQL stores and MySQL");
        assert_eq!(names(&skills), vec!["MySQL", "NoSQL"]);
    }

    #[test]
    fn test_multi_word_skills() {
        let skills = extractor().extract_skills("Experience with machine learning and Scrum");
        assert_eq!(names(&skills), vec!["Machine Learning", "Scrum"]);
    }

    #[test]
    fn test_keyword_mode_misses_wrapped_phrase() {
        let skills = extractor().extract_skills("machine\n   learning");
        assert!(skills.is_empty());
    }

    #[test]
    fn test_normalized_mode_matches_wrapped_phrase() {
        let extractor = SkillExtractor::with_analysis(
            Arc::new(SkillCatalog::default_catalog().unwrap()),
            TextAnalysis::Normalized(Arc::new(CollapseWhitespace)),
        );
        let skills = extractor.extract_skills("Python and machine\n   learning");
        assert_eq!(names(&skills), vec!["Machine Learning", "Python"]);
    }

    #[test]
    fn test_custom_catalog_restricts_results() {
        let extractor =
            SkillExtractor::new(Arc::new(SkillCatalog::new(["Rust", "Tokio"]).unwrap()));
        let skills = extractor.extract_skills("Rust, Tokio, Python and AWS");
        assert_eq!(names(&skills), vec!["Rust", "Tokio"]);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let extractor = extractor();
        let text = "Python, Docker, AWS, Agile";
        assert_eq!(extractor.extract_skills(text), extractor.extract_skills(text));
    }
}
