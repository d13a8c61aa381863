// Skill vocabulary and keyword-level extraction.
// Both types are immutable after construction and shared via Arc.

pub mod catalog;
pub mod extractor;

pub use catalog::{CatalogError, SkillCatalog, DEFAULT_SKILLS};
pub use extractor::{CollapseWhitespace, SkillExtractor, TextAnalysis, TextNormalizer};
