//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the wizard. The
//! controlled vocabularies are part of it: the row builder only ever sees the lists it is
//! handed here, so changing the export schema means changing a [`Vocabulary`], not code.

use crate::constants::{DEFAULT_ALLERGENS, DEFAULT_EXPORT_DIR, DEFAULT_LANGUAGES, SOURCE_LANGUAGE};
use crate::row::RowBuilder;
use crate::{MenuError, MenuResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The closed, ordered lists that drive column generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    allergens: Vec<String>,
    languages: Vec<String>,
    source_language: String,
}

impl Vocabulary {
    /// Create a validated vocabulary.
    ///
    /// Either list may be empty. When `languages` is non-empty it must contain
    /// `source_language`.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::InvalidVocabulary`] if an entry is blank, an entry repeats, the
    /// source language is missing, or the generated headers would collide.
    pub fn new(
        allergens: Vec<String>,
        languages: Vec<String>,
        source_language: impl Into<String>,
    ) -> MenuResult<Self> {
        let source_language = source_language.into().trim().to_string();
        if source_language.is_empty() {
            return Err(MenuError::InvalidVocabulary(
                "source language cannot be empty".into(),
            ));
        }

        let allergens = normalise_list("allergen", allergens)?;
        let languages = normalise_list("language", languages)?;

        if !languages.is_empty() && !languages.contains(&source_language) {
            return Err(MenuError::InvalidVocabulary(format!(
                "source language {source_language} is not in the language list"
            )));
        }

        let vocabulary = Self {
            allergens,
            languages,
            source_language,
        };

        let headers = RowBuilder::new(&vocabulary).headers();
        let mut seen = BTreeSet::new();
        if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
            return Err(MenuError::InvalidVocabulary(format!(
                "column header {dup} would appear twice"
            )));
        }

        Ok(vocabulary)
    }

    /// The built-in Japanese-source vocabulary.
    pub fn standard() -> Self {
        Self {
            allergens: DEFAULT_ALLERGENS.iter().map(|s| s.to_string()).collect(),
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            source_language: SOURCE_LANGUAGE.to_string(),
        }
    }

    pub fn allergens(&self) -> &[String] {
        &self.allergens
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn is_source(&self, language: &str) -> bool {
        self.source_language == language
    }

    pub fn contains_allergen(&self, allergen: &str) -> bool {
        self.allergens.iter().any(|a| a == allergen)
    }

    pub fn contains_language(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l == language)
    }

    /// Languages other than the source language, in vocabulary order.
    pub fn target_languages(&self) -> Vec<String> {
        self.languages
            .iter()
            .filter(|l| !self.is_source(l))
            .cloned()
            .collect()
    }

    /// Keep at most `limit` languages, source language first.
    ///
    /// `None` keeps every language. Allergens are never narrowed.
    pub fn narrowed(&self, limit: Option<usize>) -> Self {
        let Some(limit) = limit else {
            return self.clone();
        };

        let mut languages: Vec<String> = Vec::with_capacity(limit);
        if self.languages.contains(&self.source_language) {
            languages.push(self.source_language.clone());
        }
        languages.extend(
            self.languages
                .iter()
                .filter(|l| !self.is_source(l))
                .cloned(),
        );
        languages.truncate(limit);

        Self {
            allergens: self.allergens.clone(),
            languages,
            source_language: self.source_language.clone(),
        }
    }
}

fn normalise_list(kind: &str, entries: Vec<String>) -> MenuResult<Vec<String>> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry = entry.trim().to_string();
        if entry.is_empty() {
            return Err(MenuError::InvalidVocabulary(format!(
                "{kind} entries cannot be empty"
            )));
        }
        if !seen.insert(entry.clone()) {
            return Err(MenuError::InvalidVocabulary(format!(
                "{kind} {entry} is listed twice"
            )));
        }
        out.push(entry);
    }
    Ok(out)
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    export_dir: PathBuf,
    vocabulary: Vocabulary,
}

impl CoreConfig {
    pub fn new(export_dir: PathBuf, vocabulary: Vocabulary) -> Self {
        Self {
            export_dir,
            vocabulary,
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_EXPORT_DIR), Vocabulary::standard())
    }
}

/// Split a comma-separated environment value into trimmed entries.
///
/// `None` and whitespace-only values yield `None` so callers fall back to defaults. An
/// explicitly empty list can be requested with a lone comma (`","`).
pub fn list_from_env_value(value: Option<String>) -> Option<Vec<String>> {
    let value = value?;
    if value.trim().is_empty() {
        return None;
    }
    Some(
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Build a vocabulary from optional environment overrides.
///
/// Unset values fall back to the standard lists.
pub fn vocabulary_from_env_values(
    allergens: Option<String>,
    languages: Option<String>,
    source_language: Option<String>,
) -> MenuResult<Vocabulary> {
    let standard = Vocabulary::standard();

    let allergens =
        list_from_env_value(allergens).unwrap_or_else(|| standard.allergens().to_vec());
    let languages =
        list_from_env_value(languages).unwrap_or_else(|| standard.languages().to_vec());
    let source_language = source_language
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| standard.source_language().to_string());

    Vocabulary::new(allergens, languages, source_language)
}

/// Resolve the export directory from an optional override.
pub fn export_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn standard_vocabulary_is_valid() {
        let standard = Vocabulary::standard();
        let rebuilt = Vocabulary::new(
            standard.allergens().to_vec(),
            standard.languages().to_vec(),
            standard.source_language(),
        )
        .expect("standard vocabulary validates");
        assert_eq!(rebuilt, standard);
        assert_eq!(standard.allergens().len(), 14);
        assert_eq!(standard.languages().len(), 15);
    }

    #[test]
    fn rejects_duplicate_entries() {
        let err = Vocabulary::new(strings(&["Wheat", "Wheat"]), strings(&["Japanese"]), "Japanese")
            .expect_err("duplicate allergen");
        assert!(matches!(err, MenuError::InvalidVocabulary(msg) if msg.contains("twice")));
    }

    #[test]
    fn rejects_blank_entries() {
        let err = Vocabulary::new(strings(&[" "]), strings(&["Japanese"]), "Japanese")
            .expect_err("blank allergen");
        assert!(matches!(err, MenuError::InvalidVocabulary(msg) if msg.contains("empty")));
    }

    #[test]
    fn rejects_language_list_without_source() {
        let err = Vocabulary::new(vec![], strings(&["English"]), "Japanese")
            .expect_err("missing source");
        assert!(matches!(err, MenuError::InvalidVocabulary(msg) if msg.contains("source")));
    }

    #[test]
    fn rejects_allergen_colliding_with_core_header() {
        let err = Vocabulary::new(strings(&["価格"]), vec![], "Japanese")
            .expect_err("header collision");
        assert!(matches!(err, MenuError::InvalidVocabulary(msg) if msg.contains("価格")));
    }

    #[test]
    fn accepts_empty_lists() {
        let vocabulary = Vocabulary::new(vec![], vec![], "Japanese").expect("empty lists");
        assert!(vocabulary.allergens().is_empty());
        assert!(vocabulary.languages().is_empty());
    }

    #[test]
    fn narrowed_keeps_source_first() {
        let vocabulary = Vocabulary::new(
            vec![],
            strings(&["English", "Japanese", "Korean", "Thai"]),
            "Japanese",
        )
        .expect("valid");

        let narrowed = vocabulary.narrowed(Some(2));
        assert_eq!(narrowed.languages(), strings(&["Japanese", "English"]).as_slice());
        assert_eq!(vocabulary.narrowed(None), vocabulary);
        assert_eq!(
            vocabulary.target_languages(),
            strings(&["English", "Korean", "Thai"])
        );
    }

    #[test]
    fn env_values_override_defaults() {
        let vocabulary = vocabulary_from_env_values(
            Some("Wheat, Soy".into()),
            Some("Japanese,English , Korean".into()),
            Some("Japanese".into()),
        )
        .expect("valid overrides");
        assert_eq!(vocabulary.allergens(), strings(&["Wheat", "Soy"]).as_slice());
        assert_eq!(
            vocabulary.languages(),
            strings(&["Japanese", "English", "Korean"]).as_slice()
        );

        let defaults = vocabulary_from_env_values(None, Some("   ".into()), None)
            .expect("blank values fall back");
        assert_eq!(defaults, Vocabulary::standard());
    }

    #[test]
    fn lone_comma_requests_empty_list() {
        assert_eq!(list_from_env_value(Some(",".into())), Some(vec![]));
        assert_eq!(list_from_env_value(None), None);
    }

    #[test]
    fn export_dir_defaults_when_unset() {
        assert_eq!(export_dir_from_env_value(None), PathBuf::from("exports"));
        assert_eq!(
            export_dir_from_env_value(Some(" /tmp/out ".into())),
            PathBuf::from("/tmp/out")
        );
    }
}
