//! The seven-step menu wizard.
//!
//! [`WizardController`] owns the whole session: the selected plan, the login, the menu items,
//! the allergen policy, the owner narrative and the featured selection. Every operation either
//! succeeds and mutates [`WizardState`], or fails and leaves it exactly as it was.
//!
//! Step gating:
//!
//! | from           | to             | requires                                   |
//! |----------------|----------------|--------------------------------------------|
//! | PlanSelection  | Login          | a plan                                     |
//! | Login          | MenuUpload     | [`WizardController::login`]                |
//! | MenuUpload     | DetailSettings | at least one active item                   |
//! | DetailSettings | OwnerThoughts  | nothing                                    |
//! | OwnerThoughts  | Featured       | every answer; summary and translations     |
//! | Featured       | Complete       | nothing                                    |
//!
//! [`WizardController::complete`] then writes the export and closes the session.

use crate::collaborators::{collaborator_error, Collaborators, PaymentStatus};
use crate::components::allergen_policy::AllergenPolicy;
use crate::components::menu_item::{renumber, Category, ItemId, ItemOrigin, MenuItem};
use crate::components::narrative::OwnerNarrative;
use crate::config::{CoreConfig, Vocabulary};
use crate::constants::{NEW_ITEM_NAME_PREFIX, NEW_ITEM_PRICE};
use crate::export::{ExportAssembler, ExportSink, Table};
use crate::plans::PlanId;
use crate::questionnaire::{self, QuestionKey};
use crate::{MenuError, MenuResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tonosama_files::{ExportMetadata, MenuUpload, Sha256Hash};
use tonosama_types::NonEmptyText;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    PlanSelection,
    Login,
    MenuUpload,
    DetailSettings,
    OwnerThoughts,
    Featured,
    Complete,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        WizardStep::PlanSelection,
        WizardStep::Login,
        WizardStep::MenuUpload,
        WizardStep::DetailSettings,
        WizardStep::OwnerThoughts,
        WizardStep::Featured,
        WizardStep::Complete,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::PlanSelection => "plan_selection",
            WizardStep::Login => "login",
            WizardStep::MenuUpload => "menu_upload",
            WizardStep::DetailSettings => "detail_settings",
            WizardStep::OwnerThoughts => "owner_thoughts",
            WizardStep::Featured => "featured",
            WizardStep::Complete => "complete",
        }
    }

    /// Short label shown in the progress bar.
    pub fn label(self) -> &'static str {
        match self {
            WizardStep::PlanSelection => "プラン",
            WizardStep::Login => "ログイン",
            WizardStep::MenuUpload => "メニュー",
            WizardStep::DetailSettings => "詳細設定",
            WizardStep::OwnerThoughts => "店主の想い",
            WizardStep::Featured => "イチオシ",
            WizardStep::Complete => "完成！",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The upload the current OCR items came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadRecord {
    pub file_name: String,
    pub media_type: String,
    pub hash: Sha256Hash,
    pub size_bytes: u64,
}

impl From<&MenuUpload> for UploadRecord {
    fn from(upload: &MenuUpload) -> Self {
        Self {
            file_name: upload.original_filename().to_string(),
            media_type: upload.media_type().to_string(),
            hash: upload.hash().clone(),
            size_bytes: upload.size_bytes(),
        }
    }
}

/// Partial update of a menu item. `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemEdit {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<Category>,
    pub allergens: Option<BTreeSet<String>>,
    /// Replaces every description.
    pub descriptions: Option<BTreeMap<String, String>>,
}

/// Progress through the questionnaire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionnaireProgress {
    pub filled: usize,
    pub total: usize,
    pub percent: u8,
}

/// All session state.
#[derive(Clone, Debug)]
pub struct WizardState {
    pub step: WizardStep,
    pub plan: Option<PlanId>,
    /// The configured vocabulary narrowed by the plan.
    pub vocabulary: Vocabulary,
    /// Store ID of the logged-in account.
    pub store_id: Option<NonEmptyText>,
    pub upload: Option<UploadRecord>,
    pub items: Vec<MenuItem>,
    /// OCR items from earlier uploads that a re-upload superseded.
    pub superseded: Vec<MenuItem>,
    pub policy: AllergenPolicy,
    pub narrative: OwnerNarrative,
    /// Set once the narrative has been summarized and translated for the current answers.
    pub narrative_ready: bool,
    pub added_count: usize,
    pub export: Option<ExportMetadata>,
}

impl WizardState {
    fn new(vocabulary: Vocabulary) -> Self {
        Self {
            step: WizardStep::PlanSelection,
            plan: None,
            vocabulary,
            store_id: None,
            upload: None,
            items: Vec::new(),
            superseded: Vec::new(),
            policy: AllergenPolicy::default(),
            narrative: OwnerNarrative::default(),
            narrative_ready: false,
            added_count: 0,
            export: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.export.is_some()
    }

    pub fn item(&self, id: ItemId) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|i| i.should_introduce).count()
    }

    pub fn disclaimer(&self) -> Option<&str> {
        self.narrative.answer(QuestionKey::AllergyDisclaimer)
    }
}

/// Drives one wizard session.
pub struct WizardController {
    cfg: Arc<CoreConfig>,
    collaborators: Collaborators,
    state: WizardState,
}

impl WizardController {
    pub fn new(cfg: Arc<CoreConfig>, collaborators: Collaborators) -> Self {
        let state = WizardState::new(cfg.vocabulary().clone());
        Self {
            cfg,
            collaborators,
            state,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.state.vocabulary
    }

    fn require_step(&self, expected: WizardStep) -> MenuResult<()> {
        if self.state.is_completed() {
            return Err(MenuError::AlreadyCompleted);
        }
        if self.state.step != expected {
            return Err(MenuError::WrongStep {
                expected,
                actual: self.state.step,
            });
        }
        Ok(())
    }

    fn move_to(&mut self, step: WizardStep) {
        tracing::info!(from = %self.state.step, to = %step, "wizard step");
        self.state.step = step;
    }

    fn item_mut(&mut self, id: ItemId) -> MenuResult<&mut MenuItem> {
        self.state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(MenuError::UnknownItem(id))
    }

    // --- navigation ---

    /// Move to the next step if the current step's requirements are met.
    ///
    /// # Errors
    ///
    /// Returns the validation error of the first unmet requirement, or a collaborator error
    /// if summarizing or translating the narrative fails. State is unchanged on error.
    pub fn advance(&mut self) -> MenuResult<WizardStep> {
        if self.state.is_completed() {
            return Err(MenuError::AlreadyCompleted);
        }

        let current = self.state.step;
        match current {
            WizardStep::PlanSelection => {
                if self.state.plan.is_none() {
                    tracing::warn!("cannot leave plan selection without a plan");
                    return Err(MenuError::PlanNotSelected);
                }
            }
            WizardStep::Login => {
                if self.state.store_id.is_none() {
                    return Err(MenuError::NotAuthenticated);
                }
            }
            WizardStep::MenuUpload => {
                if self.state.active_count() == 0 {
                    tracing::warn!("no menu items are marked for introduction");
                    return Err(MenuError::NothingToExport);
                }
            }
            WizardStep::DetailSettings => {}
            WizardStep::OwnerThoughts => self.prepare_narrative()?,
            WizardStep::Featured => {}
            WizardStep::Complete => {
                return Err(MenuError::InvalidInput(
                    "the last step is finished with complete()".into(),
                ))
            }
        }

        // Complete is the last step and was handled above.
        let next = current.next().unwrap_or(WizardStep::Complete);
        self.move_to(next);
        Ok(next)
    }

    /// Return to the previous step. Nothing entered so far is discarded.
    pub fn back(&mut self) -> MenuResult<WizardStep> {
        if self.state.is_completed() {
            return Err(MenuError::AlreadyCompleted);
        }
        if let Some(previous) = self.state.step.previous() {
            self.move_to(previous);
        }
        Ok(self.state.step)
    }

    // --- plan & login ---

    pub fn select_plan(&mut self, plan: PlanId) -> MenuResult<()> {
        self.require_step(WizardStep::PlanSelection)?;

        let vocabulary = plan.plan().vocabulary(self.cfg.vocabulary());
        tracing::info!(
            plan = %plan,
            languages = vocabulary.languages().len(),
            "plan selected"
        );
        self.state.plan = Some(plan);
        self.state.vocabulary = vocabulary;
        self.state.narrative_ready = false;
        Ok(())
    }

    /// Authenticate and check the account is paid up, then move to the upload step.
    pub fn login(&mut self, store_id: &str, credential: &str) -> MenuResult<()> {
        self.require_step(WizardStep::Login)?;

        let required = |_| MenuError::InvalidInput("store ID and credential are required".into());
        let store_id = NonEmptyText::new(store_id).map_err(required)?;
        let credential = NonEmptyText::new(credential).map_err(required)?;

        if !self
            .collaborators
            .authenticator
            .verify(store_id.as_str(), credential.as_str())?
        {
            tracing::warn!(store_id = %store_id, "login rejected");
            return Err(MenuError::InvalidCredentials);
        }

        let status = self
            .collaborators
            .payments
            .check_payment_status(store_id.as_str())?;
        match status {
            PaymentStatus::Paid => {}
            PaymentStatus::Error => {
                tracing::warn!(store_id = %store_id, "payment status check failed");
                return Err(collaborator_error(
                    "payment",
                    format!("could not check payment status for store {store_id}"),
                ));
            }
            PaymentStatus::Unpaid => {
                tracing::warn!(store_id = %store_id, %status, "login blocked by payment status");
                return Err(MenuError::PaymentRequired {
                    store_id: store_id.into_inner(),
                    status,
                });
            }
        }

        tracing::info!(store_id = %store_id, "logged in");
        self.state.store_id = Some(store_id);
        self.move_to(WizardStep::MenuUpload);
        Ok(())
    }

    // --- menu items ---

    /// Run OCR over `upload` and replace the OCR items with the result.
    ///
    /// Manually added items are kept and placed after the new OCR items. OCR items from an
    /// earlier upload move to [`WizardState::superseded`]. Returns the number of lines read.
    pub fn upload_menu(&mut self, upload: &MenuUpload) -> MenuResult<usize> {
        self.require_step(WizardStep::MenuUpload)?;

        let lines = self.collaborators.extractor.extract_menu_items(upload)?;
        let source = self.state.vocabulary.source_language().to_string();

        let (previous_ocr, mut manual): (Vec<_>, Vec<_>) = std::mem::take(&mut self.state.items)
            .into_iter()
            .partition(|i| i.origin == ItemOrigin::Ocr);
        manual.sort_by_key(|i| i.order);

        let mut items: Vec<MenuItem> = lines
            .iter()
            .enumerate()
            .map(|(order, line)| MenuItem::from_extracted(line, order, &source))
            .collect();
        items.extend(manual);
        for (order, item) in items.iter_mut().enumerate() {
            item.order = order;
        }

        tracing::info!(
            file = %upload.original_filename(),
            media_type = %upload.media_type(),
            lines = lines.len(),
            superseded = previous_ocr.len(),
            "menu extracted"
        );

        self.state.superseded.extend(previous_ocr);
        self.state.items = items;
        self.state.upload = Some(UploadRecord::from(upload));
        Ok(lines.len())
    }

    /// Append a blank manual item and return its ID.
    pub fn add_item(&mut self) -> MenuResult<ItemId> {
        self.require_step(WizardStep::MenuUpload)?;

        let number = self.state.added_count + 1;
        let item = MenuItem::new(
            format!("{NEW_ITEM_NAME_PREFIX} {number}"),
            NEW_ITEM_PRICE,
            self.state.items.len(),
            self.state.vocabulary.source_language(),
        );
        let id = item.id;
        tracing::debug!(item = %id, "menu item added");

        self.state.added_count = number;
        self.state.items.push(item);
        Ok(id)
    }

    /// Apply `edit` to one item. Validation happens before anything changes.
    pub fn update_item(&mut self, id: ItemId, edit: ItemEdit) -> MenuResult<()> {
        self.require_step(WizardStep::MenuUpload)?;

        if let Some(name) = &edit.name {
            if name.trim().is_empty() {
                return Err(MenuError::InvalidInput("menu item name cannot be empty".into()));
            }
        }
        if let Some(allergens) = &edit.allergens {
            if let Some(unknown) = allergens
                .iter()
                .find(|a| !self.state.vocabulary.contains_allergen(a))
            {
                return Err(MenuError::UnknownAllergen(unknown.clone()));
            }
        }
        if let Some(descriptions) = &edit.descriptions {
            if let Some(unknown) = descriptions
                .keys()
                .find(|l| !self.state.vocabulary.contains_language(l))
            {
                return Err(MenuError::UnknownLanguage(unknown.clone()));
            }
        }

        let source = self.state.vocabulary.source_language().to_string();
        let item = self.item_mut(id)?;

        if let Some(name) = edit.name {
            item.rename(name.trim(), &source);
        }
        if let Some(price) = edit.price {
            item.price = price;
        }
        if let Some(category) = edit.category {
            item.category = category;
        }
        if let Some(allergens) = edit.allergens {
            item.allergens = allergens;
        }
        if let Some(descriptions) = edit.descriptions {
            item.replace_descriptions(descriptions, &source);
        }

        tracing::debug!(item = %id, "menu item updated");
        Ok(())
    }

    /// Include or exclude an item. Excluding also drops it from the featured selection.
    pub fn set_should_introduce(&mut self, id: ItemId, introduce: bool) -> MenuResult<()> {
        self.require_step(WizardStep::MenuUpload)?;

        let item = self.item_mut(id)?;
        item.should_introduce = introduce;
        if !introduce {
            item.is_featured = false;
        }
        Ok(())
    }

    /// Remove a manual item, or exclude an OCR item.
    pub fn discard_item(&mut self, id: ItemId) -> MenuResult<()> {
        self.require_step(WizardStep::MenuUpload)?;

        let index = self
            .state
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(MenuError::UnknownItem(id))?;

        match self.state.items[index].origin {
            ItemOrigin::Manual => {
                self.state.items.remove(index);
                renumber(&mut self.state.items);
                tracing::debug!(item = %id, "manual item discarded");
            }
            ItemOrigin::Ocr => {
                let item = &mut self.state.items[index];
                item.should_introduce = false;
                item.is_featured = false;
                tracing::debug!(item = %id, "ocr item excluded");
            }
        }
        Ok(())
    }

    /// Set display order from a full permutation of item IDs.
    pub fn reorder(&mut self, order: &[ItemId]) -> MenuResult<()> {
        self.require_step(WizardStep::MenuUpload)?;

        if order.len() != self.state.items.len() {
            return Err(MenuError::InvalidReorder(format!(
                "expected {} item ids, got {}",
                self.state.items.len(),
                order.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for id in order {
            if !seen.insert(*id) {
                return Err(MenuError::InvalidReorder(format!("item {id} listed twice")));
            }
            if self.state.item(*id).is_none() {
                return Err(MenuError::UnknownItem(*id));
            }
        }

        for (rank, id) in order.iter().enumerate() {
            self.item_mut(*id)?.order = rank;
        }
        self.state.items.sort_by_key(|i| i.order);
        Ok(())
    }

    // --- detail settings ---

    /// Choose how allergens are disclosed.
    ///
    /// The disclaimer text is kept only for [`AllergenPolicy::DisclaimerOnly`].
    pub fn set_allergen_policy(
        &mut self,
        policy: AllergenPolicy,
        disclaimer: Option<&str>,
    ) -> MenuResult<()> {
        self.require_step(WizardStep::DetailSettings)?;

        let disclaimer = disclaimer.map(str::trim).filter(|d| !d.is_empty());
        let answers = &mut self.state.narrative.answers;
        let before = answers.get(&QuestionKey::AllergyDisclaimer).cloned();
        match (policy, disclaimer) {
            (AllergenPolicy::DisclaimerOnly, Some(text)) => {
                answers.insert(QuestionKey::AllergyDisclaimer, text.to_string());
            }
            (AllergenPolicy::DisclaimerOnly, None) => {
                tracing::warn!("disclaimer-only policy selected without disclaimer text");
                answers.remove(&QuestionKey::AllergyDisclaimer);
            }
            _ => {
                answers.remove(&QuestionKey::AllergyDisclaimer);
            }
        }
        if answers.get(&QuestionKey::AllergyDisclaimer) != before.as_ref() {
            self.state.narrative_ready = false;
        }

        tracing::info!(%policy, "allergen policy set");
        self.state.policy = policy;
        Ok(())
    }

    // --- owner thoughts ---

    pub fn answer(&mut self, key: QuestionKey, text: &str) -> MenuResult<()> {
        self.require_step(WizardStep::OwnerThoughts)?;

        if key == QuestionKey::AllergyDisclaimer {
            return Err(MenuError::InvalidInput(
                "the allergy disclaimer is set with the allergen policy".into(),
            ));
        }

        self.state
            .narrative
            .answers
            .insert(key, text.trim().to_string());
        self.state.narrative_ready = false;
        Ok(())
    }

    pub fn questionnaire_progress(&self) -> QuestionnaireProgress {
        let answers = &self.state.narrative.answers;
        QuestionnaireProgress {
            filled: questionnaire::filled_count(answers),
            total: questionnaire::question_count(),
            percent: questionnaire::progress_percent(answers),
        }
    }

    /// Use an already written summary and translations instead of calling the summarizer
    /// and translator. Every answer is still required.
    pub fn provide_narrative(
        &mut self,
        summary: &str,
        translations: BTreeMap<String, String>,
    ) -> MenuResult<()> {
        self.require_step(WizardStep::OwnerThoughts)?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(MenuError::InvalidInput("narrative summary cannot be empty".into()));
        }

        let source = self.state.vocabulary.source_language().to_string();
        let mut narrative =
            OwnerNarrative::new(self.state.narrative.answers.clone(), summary, &source);
        narrative.apply_translations(translations, &source);
        self.log_missing_translations(&narrative);

        self.state.narrative = narrative;
        self.state.narrative_ready = true;
        Ok(())
    }

    fn prepare_narrative(&mut self) -> MenuResult<()> {
        let missing = questionnaire::missing_answers(&self.state.narrative.answers);
        if !missing.is_empty() {
            tracing::warn!(missing = missing.len(), "questionnaire incomplete");
            return Err(MenuError::UnansweredQuestions(missing));
        }
        if self.state.narrative_ready {
            return Ok(());
        }

        let answers = self.state.narrative.answers.clone();
        let summary = self.collaborators.summarizer.summarize_answers(&answers)?;
        let targets = self.state.vocabulary.target_languages();
        let translations = self.collaborators.translator.translate(&summary, &targets)?;

        let source = self.state.vocabulary.source_language().to_string();
        let mut narrative = OwnerNarrative::new(answers, summary, &source);
        narrative.apply_translations(translations, &source);
        self.log_missing_translations(&narrative);

        tracing::info!(
            languages = narrative.translations.len(),
            "owner narrative summarized and translated"
        );
        self.state.narrative = narrative;
        self.state.narrative_ready = true;
        Ok(())
    }

    fn log_missing_translations(&self, narrative: &OwnerNarrative) {
        for language in narrative.missing_languages(&self.state.vocabulary) {
            tracing::warn!(language, "no narrative translation; column will be empty");
        }
    }

    // --- featured ---

    /// Promote or demote an item. Only active items can be promoted.
    pub fn set_featured(&mut self, id: ItemId, featured: bool) -> MenuResult<()> {
        self.require_step(WizardStep::Featured)?;

        let item = self.item_mut(id)?;
        if featured && !item.should_introduce {
            return Err(MenuError::ItemExcluded(id));
        }
        item.is_featured = featured;
        Ok(())
    }

    /// Set the image URL and source-language description of a featured item.
    ///
    /// A blank URL clears the image; a blank description restores the name default.
    pub fn set_featured_details(
        &mut self,
        id: ItemId,
        image_url: Option<&str>,
        description: Option<&str>,
    ) -> MenuResult<()> {
        self.require_step(WizardStep::Featured)?;

        let image_url = match image_url.map(str::trim) {
            Some("") => Some(None),
            Some(raw) => Some(Some(validate_image_url(raw)?)),
            None => None,
        };

        let source = self.state.vocabulary.source_language().to_string();
        let item = self.item_mut(id)?;
        if !item.is_featured {
            return Err(MenuError::NotFeatured(id));
        }

        if let Some(url) = image_url {
            item.image_url = url;
        }
        if let Some(text) = description {
            item.set_source_description(text, &source);
        }
        Ok(())
    }

    // --- complete ---

    /// The export as it would be written now.
    pub fn preview(&self) -> MenuResult<Table> {
        ExportAssembler::new(&self.state.vocabulary).assemble(
            &self.state.items,
            &self.state.narrative,
            self.state.policy,
        )
    }

    /// Assemble the export, write it to `sink` and close the session.
    ///
    /// # Errors
    ///
    /// [`MenuError::NothingToExport`] when no item is active; the session stays open.
    /// [`MenuError::RowSchemaMismatch`] if the row builder breaks its schema.
    pub fn complete(&mut self, sink: &dyn ExportSink) -> MenuResult<ExportMetadata> {
        self.require_step(WizardStep::Complete)?;

        let table = self.preview().inspect_err(|e| {
            if !e.is_recoverable() {
                tracing::error!(error = %e, "export aborted");
            }
        })?;
        if table.is_empty() {
            tracing::warn!("export blocked: no menu items are marked for introduction");
            return Err(MenuError::NothingToExport);
        }

        let metadata = sink.write_export(&table)?;
        tracing::info!(file = %metadata.file_name, rows = metadata.row_count, "wizard complete");
        self.state.export = Some(metadata.clone());
        Ok(metadata)
    }
}

impl fmt::Debug for WizardController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Accept absolute `http`/`https` URLs only.
pub fn validate_image_url(raw: &str) -> MenuResult<String> {
    let invalid = |reason: String| MenuError::InvalidImageUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other}"))),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".into()));
    }
    Ok(url.to_string())
}
