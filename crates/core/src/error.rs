use crate::collaborators::PaymentStatus;
use crate::components::menu_item::ItemId;
use crate::questionnaire::QuestionKey;
use crate::wizard::WizardStep;

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("no plan selected")]
    PlanNotSelected,
    #[error("unknown plan: {0}")]
    UnknownPlan(String),
    #[error("store ID or credential is incorrect")]
    InvalidCredentials,
    #[error("not logged in")]
    NotAuthenticated,
    #[error("payment for store {store_id} is {status}")]
    PaymentRequired {
        store_id: String,
        status: PaymentStatus,
    },
    #[error("no menu items are marked for introduction")]
    NothingToExport,
    #[error("unanswered questions: {}", join_keys(.0))]
    UnansweredQuestions(Vec<QuestionKey>),
    #[error("invalid reorder: {0}")]
    InvalidReorder(String),
    #[error("unknown menu item: {0}")]
    UnknownItem(ItemId),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("allergen {0} is not in the controlled vocabulary")]
    UnknownAllergen(String),
    #[error("language {0} is not in the controlled vocabulary")]
    UnknownLanguage(String),
    #[error("menu item {0} is excluded from the export")]
    ItemExcluded(ItemId),
    #[error("menu item {0} is not featured")]
    NotFeatured(ItemId),
    #[error("invalid image URL {url}: {reason}")]
    InvalidImageUrl { url: String, reason: String },
    #[error("operation requires step {expected}, wizard is at {actual}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },
    #[error("wizard is already complete")]
    AlreadyCompleted,

    #[error("{service} call failed: {message}")]
    Collaborator {
        service: &'static str,
        message: String,
    },

    #[error("row for item {item_id} does not match export headers: {detail}")]
    RowSchemaMismatch { item_id: ItemId, detail: String },

    #[error("invalid intake document: {0}")]
    Intake(String),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file error: {0}")]
    Files(#[from] tonosama_files::FilesError),
}

/// Broad handling class of a [`MenuError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad user input; the step re-prompts and nothing entered so far is lost.
    Validation,
    /// An external collaborator failed; the step can be retried by hand.
    Collaborator,
    /// Reading or writing files failed.
    Storage,
    /// The row builder broke its own schema. Not recoverable.
    ContractViolation,
}

impl MenuError {
    pub fn class(&self) -> ErrorClass {
        use tonosama_files::FilesError;

        match self {
            MenuError::Collaborator { .. } => ErrorClass::Collaborator,
            MenuError::RowSchemaMismatch { .. } => ErrorClass::ContractViolation,
            MenuError::Files(FilesError::UnsupportedUpload(_) | FilesError::EmptyUpload(_)) => {
                ErrorClass::Validation
            }
            MenuError::Files(_)
            | MenuError::Io(_)
            | MenuError::Csv(_)
            | MenuError::YamlSerialization(_) => ErrorClass::Storage,
            _ => ErrorClass::Validation,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.class() != ErrorClass::ContractViolation
    }
}

fn join_keys(keys: &[QuestionKey]) -> String {
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type MenuResult<T> = std::result::Result<T, MenuError>;
