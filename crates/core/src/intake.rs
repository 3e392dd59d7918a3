//! YAML intake documents for unattended wizard runs.
//!
//! An intake document records everything an owner would enter in the wizard: plan, login,
//! the menu file, item edits, allergen policy, questionnaire answers and featured items. A
//! document can be produced from [`Intake::template`], filled in by hand, and replayed with
//! [`run_intake`].
//!
//! Responsibilities:
//! - Define the domain-level [`IntakeData`]
//! - Define a strict wire model (`deny_unknown_fields`) for the YAML form
//! - Translate between the two, validating keys and values
//! - Replay a parsed document through a [`WizardController`]

use crate::components::allergen_policy::AllergenPolicy;
use crate::components::menu_item::{Category, ItemId, ItemOrigin};
use crate::export::ExportSink;
use crate::mock::{MOCK_CREDENTIAL, MOCK_STORE_ID};
use crate::plans::PlanId;
use crate::questionnaire::{self, QuestionKey};
use crate::wizard::{ItemEdit, WizardController};
use crate::{MenuError, MenuResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tonosama_files::{ExportMetadata, MenuUpload};

// ============================================================================
// Public domain-level types
// ============================================================================

/// A parsed, validated intake document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakeData {
    pub plan: PlanId,
    pub store_id: String,
    pub credential: String,
    /// Menu image or PDF, relative to the document's directory unless absolute.
    pub upload: PathBuf,
    pub items: Vec<ItemInstruction>,
    pub allergen_policy: AllergenPolicy,
    pub disclaimer: Option<String>,
    pub answers: BTreeMap<QuestionKey, String>,
    /// Pre-written narrative; when absent the summarizer and translator are used.
    pub narrative: Option<NarrativeData>,
}

/// Which item an instruction applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemTarget {
    /// 1-based OCR line.
    Line(usize),
    /// A newly added manual item.
    New,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemInstruction {
    pub target: ItemTarget,
    pub edit: ItemEdit,
    pub introduce: Option<bool>,
    pub discard: bool,
    pub featured: bool,
    pub image_url: Option<String>,
    pub featured_description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrativeData {
    pub summary: String,
    pub translations: BTreeMap<String, String>,
}

// ============================================================================
// Public Intake operations
// ============================================================================

/// Intake document operations.
pub struct Intake;

impl Intake {
    /// Parse an intake document from YAML text.
    ///
    /// Uses `serde_path_to_error` so schema errors name the failing field (e.g.
    /// `items[2].category`).
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Intake`] if the YAML does not match the schema, an unknown key is
    /// present, or a value (plan, category, policy, line number) is invalid.
    pub fn parse(yaml_text: &str) -> MenuResult<IntakeData> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, IntakeWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(MenuError::Intake(format!(
                    "schema mismatch at {path}: {source}"
                )));
            }
        };

        wire_to_domain(wire)
    }

    /// Read and parse an intake document from disk.
    pub fn load(path: &Path) -> MenuResult<IntakeData> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Render an intake document as YAML text.
    pub fn render(data: &IntakeData) -> MenuResult<String> {
        serde_yaml::to_string(&domain_to_wire(data)).map_err(MenuError::YamlSerialization)
    }

    /// A filled-in example document, with each answer set to the question's example text.
    pub fn template() -> MenuResult<String> {
        let answers = questionnaire::questions()
            .map(|q| {
                let example = q.placeholder.trim_start_matches("例:").trim();
                (q.key, example.to_string())
            })
            .collect();

        let featured = ItemInstruction {
            target: ItemTarget::Line(1),
            edit: ItemEdit {
                allergens: Some(["小麦".to_string(), "大豆".to_string()].into()),
                ..Default::default()
            },
            introduce: None,
            discard: false,
            featured: true,
            image_url: Some("https://example.com/karaage.jpg".into()),
            featured_description: Some("自家製のタレに一晩漬け込んだ唐揚げです".into()),
        };
        let drink = ItemInstruction {
            target: ItemTarget::New,
            edit: ItemEdit {
                name: Some("生ビール".into()),
                price: Some("550円".into()),
                category: Some(Category::Drink),
                ..Default::default()
            },
            introduce: None,
            discard: false,
            featured: false,
            image_url: None,
            featured_description: None,
        };

        Self::render(&IntakeData {
            plan: PlanId::Premium,
            store_id: MOCK_STORE_ID.into(),
            credential: MOCK_CREDENTIAL.into(),
            upload: PathBuf::from("menu.png"),
            items: vec![featured, drink],
            allergen_policy: AllergenPolicy::Display,
            disclaimer: None,
            answers,
            narrative: None,
        })
    }
}

/// Replay `intake` through `wizard` and write the export to `sink`.
///
/// `base_dir` resolves a relative upload path. The wizard must be fresh.
pub fn run_intake(
    wizard: &mut WizardController,
    intake: &IntakeData,
    base_dir: &Path,
    sink: &dyn ExportSink,
) -> MenuResult<ExportMetadata> {
    wizard.select_plan(intake.plan)?;
    wizard.advance()?;
    wizard.login(&intake.store_id, &intake.credential)?;

    let upload_path = if intake.upload.is_absolute() {
        intake.upload.clone()
    } else {
        base_dir.join(&intake.upload)
    };
    let upload = MenuUpload::from_path(&upload_path)?;
    wizard.upload_menu(&upload)?;

    let ocr_ids: Vec<ItemId> = wizard
        .state()
        .items
        .iter()
        .filter(|i| i.origin == ItemOrigin::Ocr)
        .map(|i| i.id)
        .collect();

    let mut featured = Vec::new();
    for instruction in &intake.items {
        let id = match instruction.target {
            ItemTarget::Line(line) => *line
                .checked_sub(1)
                .and_then(|index| ocr_ids.get(index))
                .ok_or_else(|| {
                    MenuError::Intake(format!(
                        "line {line} does not exist; the menu has {} lines",
                        ocr_ids.len()
                    ))
                })?,
            ItemTarget::New => wizard.add_item()?,
        };

        if instruction.edit != ItemEdit::default() {
            wizard.update_item(id, instruction.edit.clone())?;
        }
        if let Some(introduce) = instruction.introduce {
            wizard.set_should_introduce(id, introduce)?;
        }
        if instruction.discard {
            wizard.discard_item(id)?;
        }
        if instruction.featured {
            featured.push((id, instruction));
        }
    }
    wizard.advance()?;

    wizard.set_allergen_policy(intake.allergen_policy, intake.disclaimer.as_deref())?;
    wizard.advance()?;

    for (key, text) in &intake.answers {
        wizard.answer(*key, text)?;
    }
    if let Some(narrative) = &intake.narrative {
        wizard.provide_narrative(&narrative.summary, narrative.translations.clone())?;
    }
    wizard.advance()?;

    for (id, instruction) in featured {
        wizard.set_featured(id, true)?;
        wizard.set_featured_details(
            id,
            instruction.image_url.as_deref(),
            instruction.featured_description.as_deref(),
        )?;
    }
    wizard.advance()?;

    wizard.complete(sink)
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct IntakeWire {
    plan: String,
    login: LoginWire,
    upload: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    items: Vec<ItemWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allergen_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disclaimer: Option<String>,
    #[serde(default)]
    answers: BTreeMap<QuestionKey, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    narrative: Option<NarrativeWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct LoginWire {
    store_id: String,
    credential: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct ItemWire {
    /// 1-based OCR line; omitted for new items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allergens: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    descriptions: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    introduce: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    discard: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    featured_description: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct NarrativeWire {
    summary: String,
    #[serde(default)]
    translations: BTreeMap<String, String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: IntakeWire) -> MenuResult<IntakeData> {
    let plan = wire
        .plan
        .parse::<PlanId>()
        .map_err(|e| MenuError::Intake(format!("plan: {e}")))?;

    let allergen_policy = match &wire.allergen_policy {
        Some(raw) => raw
            .parse::<AllergenPolicy>()
            .map_err(|e| MenuError::Intake(format!("allergen_policy: {e}")))?,
        None => AllergenPolicy::default(),
    };

    if wire.answers.contains_key(&QuestionKey::AllergyDisclaimer) {
        return Err(MenuError::Intake(
            "answers.allergy_disclaimer: use the top-level disclaimer key".into(),
        ));
    }

    let items = wire
        .items
        .into_iter()
        .enumerate()
        .map(|(index, item)| item_wire_to_domain(index, item))
        .collect::<MenuResult<Vec<_>>>()?;

    Ok(IntakeData {
        plan,
        store_id: wire.login.store_id,
        credential: wire.login.credential,
        upload: PathBuf::from(wire.upload),
        items,
        allergen_policy,
        disclaimer: wire.disclaimer,
        answers: wire.answers,
        narrative: wire.narrative.map(|n| NarrativeData {
            summary: n.summary,
            translations: n.translations,
        }),
    })
}

fn item_wire_to_domain(index: usize, wire: ItemWire) -> MenuResult<ItemInstruction> {
    let at = |field: &str, message: String| {
        MenuError::Intake(format!("items[{index}].{field}: {message}"))
    };

    let target = match wire.line {
        Some(0) => return Err(at("line", "lines are numbered from 1".into())),
        Some(line) => ItemTarget::Line(line),
        None => ItemTarget::New,
    };

    if wire.discard && wire.featured {
        return Err(at("featured", "a discarded item cannot be featured".into()));
    }
    if !wire.featured && (wire.image_url.is_some() || wire.featured_description.is_some()) {
        return Err(at("featured", "image_url and featured_description need featured: true".into()));
    }

    let category = wire
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| at("category", e.to_string()))?;

    let allergens = wire
        .allergens
        .map(|list| list.into_iter().map(|a| a.trim().to_string()).collect::<BTreeSet<_>>());

    Ok(ItemInstruction {
        target,
        edit: ItemEdit {
            name: wire.name,
            price: wire.price,
            category,
            allergens,
            descriptions: wire.descriptions,
        },
        introduce: wire.introduce,
        discard: wire.discard,
        featured: wire.featured,
        image_url: wire.image_url,
        featured_description: wire.featured_description,
    })
}

fn domain_to_wire(data: &IntakeData) -> IntakeWire {
    IntakeWire {
        plan: data.plan.as_str().to_string(),
        login: LoginWire {
            store_id: data.store_id.clone(),
            credential: data.credential.clone(),
        },
        upload: data.upload.display().to_string(),
        items: data.items.iter().map(item_domain_to_wire).collect(),
        allergen_policy: Some(data.allergen_policy.key().to_string()),
        disclaimer: data.disclaimer.clone(),
        answers: data.answers.clone(),
        narrative: data.narrative.as_ref().map(|n| NarrativeWire {
            summary: n.summary.clone(),
            translations: n.translations.clone(),
        }),
    }
}

fn item_domain_to_wire(item: &ItemInstruction) -> ItemWire {
    ItemWire {
        line: match item.target {
            ItemTarget::Line(line) => Some(line),
            ItemTarget::New => None,
        },
        name: item.edit.name.clone(),
        price: item.edit.price.clone(),
        category: item.edit.category.map(|c| c.key().to_string()),
        allergens: item
            .edit
            .allergens
            .as_ref()
            .map(|set| set.iter().cloned().collect()),
        descriptions: item.edit.descriptions.clone(),
        introduce: item.introduce,
        discard: item.discard,
        featured: item.featured,
        image_url: item.image_url.clone(),
        featured_description: item.featured_description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Collaborators;
    use crate::config::{CoreConfig, Vocabulary};
    use std::sync::Arc;
    use tonosama_files::ExportStore;

    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    fn minimal_yaml() -> String {
        let answers: String = questionnaire::questions()
            .map(|q| format!("  {}: answer\n", q.key))
            .collect();
        format!(
            "plan: basic\n\
             login:\n  store_id: TONOSAMA001\n  credential: \"99999\"\n\
             upload: menu.png\n\
             answers:\n{answers}"
        )
    }

    fn with_items(items: &str) -> String {
        minimal_yaml().replace("upload: menu.png", &format!("upload: menu.png\nitems:\n{items}"))
    }

    #[test]
    fn parses_minimal_document() {
        let data = Intake::parse(&minimal_yaml()).expect("parse");
        assert_eq!(data.plan, PlanId::Basic);
        assert_eq!(data.credential, "99999");
        assert_eq!(data.allergen_policy, AllergenPolicy::Display);
        assert_eq!(data.answers.len(), 15);
        assert!(data.items.is_empty());
    }

    #[test]
    fn unknown_keys_report_their_path() {
        let yaml = with_items("  - line: 1\n    colour: red");
        let err = Intake::parse(&yaml).expect_err("unknown key");
        let message = err.to_string();
        assert!(message.contains("items[0]"), "{message}");
        assert!(message.contains("colour"), "{message}");
    }

    #[test]
    fn rejects_invalid_values() {
        let bad_plan = minimal_yaml().replace("plan: basic", "plan: gold");
        assert!(matches!(
            Intake::parse(&bad_plan),
            Err(MenuError::Intake(m)) if m.contains("gold")
        ));

        let bad_line = with_items("  - line: 0");
        assert!(matches!(
            Intake::parse(&bad_line),
            Err(MenuError::Intake(m)) if m.contains("items[0].line")
        ));

        let bad_category = with_items("  - category: snack");
        assert!(matches!(
            Intake::parse(&bad_category),
            Err(MenuError::Intake(m)) if m.contains("snack")
        ));

        let disclaimer_answer = format!("{}  allergy_disclaimer: staff\n", minimal_yaml());
        assert!(Intake::parse(&disclaimer_answer).is_err());
    }

    #[test]
    fn template_parses_and_renders_back() {
        let template = Intake::template().expect("template");
        let data = Intake::parse(&template).expect("template parses");

        assert_eq!(data.plan, PlanId::Premium);
        assert_eq!(data.items.len(), 2);
        assert_eq!(data.items[1].target, ItemTarget::New);
        assert_eq!(data.items[1].edit.category, Some(Category::Drink));
        assert_eq!(
            data.answers.get(&QuestionKey::RestaurantName).map(String::as_str),
            Some("和食処 さくら")
        );
        assert_eq!(Intake::render(&data).expect("render"), template);
    }

    #[test]
    fn template_replays_end_to_end() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("menu.png"), PNG).expect("write upload");
        let store = ExportStore::new(&dir.path().join("exports")).expect("store");

        let data = Intake::parse(&Intake::template().expect("template")).expect("parse");
        let cfg = Arc::new(CoreConfig::new(dir.path().join("exports"), Vocabulary::standard()));
        let mut wizard = WizardController::new(cfg, Collaborators::mock());

        let metadata = run_intake(&mut wizard, &data, dir.path(), &store).expect("run");
        assert_eq!(metadata.row_count, 4);

        let state = wizard.state();
        assert!(state.is_completed());
        let first = state.items.iter().find(|i| i.order == 0).expect("first item");
        assert!(first.is_featured);
        assert_eq!(first.image_url.as_deref(), Some("https://example.com/karaage.jpg"));
        assert!(first.allergens.contains("小麦"));
        let drink = state.items.iter().find(|i| i.name == "生ビール").expect("drink");
        assert_eq!(drink.category, Category::Drink);

        let csv = std::fs::read(dir.path().join("exports").join(&metadata.file_name))
            .expect("read export");
        let text = String::from_utf8(csv).expect("utf-8");
        assert!(text.contains("生ビール"));
        assert!(text.contains("ドリンク"));
    }

    #[test]
    fn missing_line_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("menu.png"), PNG).expect("write upload");
        let store = ExportStore::new(dir.path()).expect("store");

        let yaml = with_items("  - line: 9\n    price: 100円");
        let data = Intake::parse(&yaml).expect("parse");
        let cfg = Arc::new(CoreConfig::new(dir.path().to_path_buf(), Vocabulary::standard()));
        let mut wizard = WizardController::new(cfg, Collaborators::mock());

        let err = run_intake(&mut wizard, &data, dir.path(), &store).expect_err("line 9");
        assert!(matches!(err, MenuError::Intake(m) if m.contains("line 9")));
    }
}
