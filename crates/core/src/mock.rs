//! Canned collaborator implementations for offline runs and tests.

use crate::collaborators::{
    collaborator_error, Authenticator, ExtractedItem, MenuExtractor, PaymentStatus,
    PaymentVerifier, Summarizer, Translator,
};
use crate::questionnaire::{questions, QuestionKey};
use crate::MenuResult;
use std::collections::{BTreeMap, BTreeSet};
use tonosama_files::MenuUpload;

pub const MOCK_STORE_ID: &str = "TONOSAMA001";
pub const MOCK_CREDENTIAL: &str = "99999";

/// Accepts exactly one store ID / credential pair.
#[derive(Clone, Debug)]
pub struct MockAuthenticator {
    pub store_id: String,
    pub credential: String,
    pub unavailable: bool,
}

impl Default for MockAuthenticator {
    fn default() -> Self {
        Self {
            store_id: MOCK_STORE_ID.into(),
            credential: MOCK_CREDENTIAL.into(),
            unavailable: false,
        }
    }
}

impl Authenticator for MockAuthenticator {
    fn verify(&self, store_id: &str, credential: &str) -> MenuResult<bool> {
        if self.unavailable {
            return Err(collaborator_error("authentication", "service unavailable"));
        }
        Ok(store_id == self.store_id && credential == self.credential)
    }
}

/// Every store is paid unless listed in `unpaid`.
#[derive(Clone, Debug, Default)]
pub struct MockPayments {
    pub unpaid: BTreeSet<String>,
    pub unavailable: bool,
}

impl PaymentVerifier for MockPayments {
    fn check_payment_status(&self, store_id: &str) -> MenuResult<PaymentStatus> {
        if self.unavailable {
            return Ok(PaymentStatus::Error);
        }
        if self.unpaid.contains(store_id) {
            Ok(PaymentStatus::Unpaid)
        } else {
            Ok(PaymentStatus::Paid)
        }
    }
}

/// Returns the same menu lines for any upload.
#[derive(Clone, Debug)]
pub struct MockExtractor {
    pub items: Vec<ExtractedItem>,
    pub unavailable: bool,
}

impl Default for MockExtractor {
    fn default() -> Self {
        let line = |name: &str, price: &str| ExtractedItem {
            name: name.into(),
            price: price.into(),
        };
        Self {
            items: vec![
                line("唐揚げ定食", "980円"),
                line("焼き魚御膳", "1200円"),
                line("特製ラーメン", "850円"),
            ],
            unavailable: false,
        }
    }
}

impl MenuExtractor for MockExtractor {
    fn extract_menu_items(&self, upload: &MenuUpload) -> MenuResult<Vec<ExtractedItem>> {
        if self.unavailable {
            return Err(collaborator_error(
                "ocr",
                format!("could not read {}", upload.original_filename()),
            ));
        }
        Ok(self.items.clone())
    }
}

/// Joins the answers in questionnaire order.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockSummarizer;

impl Summarizer for MockSummarizer {
    fn summarize_answers(&self, answers: &BTreeMap<QuestionKey, String>) -> MenuResult<String> {
        let parts: Vec<&str> = questions()
            .filter_map(|q| answers.get(&q.key))
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();

        if parts.is_empty() {
            return Err(collaborator_error("summarizer", "no answers to summarize"));
        }
        Ok(parts.join(" "))
    }
}

/// Prefixes the text with the language name. Languages in `unsupported` are left out.
#[derive(Clone, Debug, Default)]
pub struct MockTranslator {
    pub unsupported: BTreeSet<String>,
    pub unavailable: bool,
}

impl Translator for MockTranslator {
    fn translate(
        &self,
        text: &str,
        target_languages: &[String],
    ) -> MenuResult<BTreeMap<String, String>> {
        if self.unavailable {
            return Err(collaborator_error("translation", "service unavailable"));
        }
        Ok(target_languages
            .iter()
            .filter(|l| !self.unsupported.contains(*l))
            .map(|l| (l.clone(), format!("[{l}] {text}")))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn authenticator_accepts_only_configured_pair() {
        let auth = MockAuthenticator::default();
        assert!(auth.verify("TONOSAMA001", "99999").expect("verify"));
        assert!(!auth.verify("TONOSAMA001", "12345").expect("verify"));

        let down = MockAuthenticator {
            unavailable: true,
            ..Default::default()
        };
        let err = down.verify("TONOSAMA001", "99999").expect_err("unavailable");
        assert_eq!(err.class(), ErrorClass::Collaborator);
    }

    #[test]
    fn payments_report_unpaid_stores() {
        let mut payments = MockPayments::default();
        payments.unpaid.insert("SHOP2".into());
        assert_eq!(payments.check_payment_status("SHOP1").expect("status"), PaymentStatus::Paid);
        assert_eq!(payments.check_payment_status("SHOP2").expect("status"), PaymentStatus::Unpaid);
    }

    #[test]
    fn extractor_returns_three_lines() {
        let upload = MenuUpload::from_bytes("menu.pdf", b"%PDF-1.4\n%mock".to_vec()).expect("pdf");
        let lines = MockExtractor::default()
            .extract_menu_items(&upload)
            .expect("extract");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].name, "唐揚げ定食");
    }

    #[test]
    fn summarizer_joins_answers_in_question_order() {
        let mut answers = BTreeMap::new();
        answers.insert(QuestionKey::CustomerMessage, "ようこそ".to_string());
        answers.insert(QuestionKey::RestaurantName, "さくら".to_string());
        let summary = MockSummarizer.summarize_answers(&answers).expect("summary");
        assert_eq!(summary, "さくら ようこそ");

        assert!(MockSummarizer.summarize_answers(&BTreeMap::new()).is_err());
    }

    #[test]
    fn translator_skips_unsupported_languages() {
        let mut translator = MockTranslator::default();
        translator.unsupported.insert("Korean".into());
        let out = translator
            .translate("hello", &["English".to_string(), "Korean".to_string()])
            .expect("translate");
        assert_eq!(out.get("English").map(String::as_str), Some("[English] hello"));
        assert!(!out.contains_key("Korean"));
    }
}
