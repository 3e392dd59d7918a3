//! Owner narrative domain model.
//!
//! The owner's questionnaire answers, the single-paragraph summary produced from them, and
//! that summary translated into each supported language. Summary and translations are opaque
//! collaborator output; the core never inspects their content.

use crate::config::Vocabulary;
use crate::questionnaire::QuestionKey;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnerNarrative {
    pub answers: BTreeMap<QuestionKey, String>,
    pub summary: String,
    /// Language → translated summary.
    pub translations: BTreeMap<String, String>,
}

impl OwnerNarrative {
    /// A narrative with a summary whose only translation is the source-language identity.
    pub fn new(
        answers: BTreeMap<QuestionKey, String>,
        summary: impl Into<String>,
        source_language: &str,
    ) -> Self {
        let summary = summary.into();
        let mut translations = BTreeMap::new();
        translations.insert(source_language.to_string(), summary.clone());
        Self {
            answers,
            summary,
            translations,
        }
    }

    /// Merge translator output. The source language always maps to the summary itself.
    pub fn apply_translations(
        &mut self,
        translations: BTreeMap<String, String>,
        source_language: &str,
    ) {
        self.translations.extend(translations);
        self.translations
            .insert(source_language.to_string(), self.summary.clone());
    }

    /// Translation for `language`, or the empty string. Never another language's text.
    pub fn translation(&self, language: &str) -> &str {
        self.translations
            .get(language)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Vocabulary languages with no translation.
    pub fn missing_languages<'a>(&self, vocabulary: &'a Vocabulary) -> Vec<&'a str> {
        vocabulary
            .languages()
            .iter()
            .filter(|l| !self.translations.contains_key(l.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn answer(&self, key: QuestionKey) -> Option<&str> {
        self.answers.get(&key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::new(
            vec![],
            vec!["Japanese".into(), "English".into(), "Korean".into()],
            "Japanese",
        )
        .expect("valid vocabulary")
    }

    #[test]
    fn new_narrative_maps_source_to_summary() {
        let narrative = OwnerNarrative::new(BTreeMap::new(), "心を込めて", "Japanese");
        assert_eq!(narrative.translation("Japanese"), "心を込めて");
        assert_eq!(narrative.translation("English"), "");
    }

    #[test]
    fn apply_translations_cannot_override_source_identity() {
        let mut narrative = OwnerNarrative::new(BTreeMap::new(), "心を込めて", "Japanese");
        let mut incoming = BTreeMap::new();
        incoming.insert("Japanese".to_string(), "rewritten".to_string());
        incoming.insert("English".to_string(), "With all our heart".to_string());
        narrative.apply_translations(incoming, "Japanese");

        assert_eq!(narrative.translation("Japanese"), "心を込めて");
        assert_eq!(narrative.translation("English"), "With all our heart");
    }

    #[test]
    fn reports_missing_languages() {
        let mut narrative = OwnerNarrative::new(BTreeMap::new(), "summary", "Japanese");
        narrative
            .translations
            .insert("English".into(), "summary (en)".into());
        assert_eq!(narrative.missing_languages(&vocabulary()), ["Korean"]);
    }

    #[test]
    fn reads_answers_by_key() {
        let mut answers = BTreeMap::new();
        answers.insert(QuestionKey::RestaurantName, "和食処 さくら".to_string());
        let narrative = OwnerNarrative::new(answers, "", "Japanese");
        assert_eq!(narrative.answer(QuestionKey::RestaurantName), Some("和食処 さくら"));
        assert_eq!(narrative.answer(QuestionKey::Concept), None);
    }
}
