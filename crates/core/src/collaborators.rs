//! External services the wizard depends on.
//!
//! Each collaborator is a small synchronous trait so the wizard can be driven with real
//! services or with the mocks in [`crate::mock`]. Failures are reported as
//! [`MenuError::Collaborator`] and leave wizard state unchanged.

use crate::mock::{MockAuthenticator, MockExtractor, MockPayments, MockSummarizer, MockTranslator};
use crate::questionnaire::QuestionKey;
use crate::{MenuError, MenuResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tonosama_files::MenuUpload;

/// One line of OCR output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub name: String,
    pub price: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Error,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Error => "error",
        })
    }
}

pub trait Authenticator {
    /// `Ok(false)` means the credentials were checked and rejected.
    fn verify(&self, store_id: &str, credential: &str) -> MenuResult<bool>;
}

pub trait PaymentVerifier {
    fn check_payment_status(&self, store_id: &str) -> MenuResult<PaymentStatus>;
}

pub trait MenuExtractor {
    fn extract_menu_items(&self, upload: &MenuUpload) -> MenuResult<Vec<ExtractedItem>>;
}

pub trait Summarizer {
    fn summarize_answers(&self, answers: &BTreeMap<QuestionKey, String>) -> MenuResult<String>;
}

pub trait Translator {
    /// Translate `text` into each of `target_languages`. Languages the engine cannot handle
    /// are simply absent from the result.
    fn translate(
        &self,
        text: &str,
        target_languages: &[String],
    ) -> MenuResult<BTreeMap<String, String>>;
}

/// The full set of collaborators a wizard session uses.
pub struct Collaborators {
    pub authenticator: Box<dyn Authenticator>,
    pub payments: Box<dyn PaymentVerifier>,
    pub extractor: Box<dyn MenuExtractor>,
    pub summarizer: Box<dyn Summarizer>,
    pub translator: Box<dyn Translator>,
}

impl Collaborators {
    /// Offline collaborators backed by canned data.
    pub fn mock() -> Self {
        Self {
            authenticator: Box::new(MockAuthenticator::default()),
            payments: Box::new(MockPayments::default()),
            extractor: Box::new(MockExtractor::default()),
            summarizer: Box::new(MockSummarizer),
            translator: Box::new(MockTranslator::default()),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Wrap a service failure message.
pub fn collaborator_error(service: &'static str, message: impl Into<String>) -> MenuError {
    MenuError::Collaborator {
        service,
        message: message.into(),
    }
}
