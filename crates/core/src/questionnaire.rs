//! The owner-identity questionnaire.
//!
//! Fifteen questions grouped into five themed sections. Every question must have a non-blank
//! answer before the narrative can be summarized.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Answer keys. [`QuestionKey::AllergyDisclaimer`] is not asked by the questionnaire; it
/// carries the disclaimer copy of the disclaimer-only allergen policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKey {
    RestaurantName,
    YearsInBusiness,
    LocationFeatures,
    Concept,
    IngredientCommitment,
    ServiceApproach,
    SignatureDish,
    SeasonalMenus,
    MenuDevelopment,
    InternationalExperience,
    CulturalSharing,
    InternationalMessage,
    FutureGoals,
    MultilingualExpectations,
    CustomerMessage,
    AllergyDisclaimer,
}

impl QuestionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKey::RestaurantName => "restaurant_name",
            QuestionKey::YearsInBusiness => "years_in_business",
            QuestionKey::LocationFeatures => "location_features",
            QuestionKey::Concept => "concept",
            QuestionKey::IngredientCommitment => "ingredient_commitment",
            QuestionKey::ServiceApproach => "service_approach",
            QuestionKey::SignatureDish => "signature_dish",
            QuestionKey::SeasonalMenus => "seasonal_menus",
            QuestionKey::MenuDevelopment => "menu_development",
            QuestionKey::InternationalExperience => "international_experience",
            QuestionKey::CulturalSharing => "cultural_sharing",
            QuestionKey::InternationalMessage => "international_message",
            QuestionKey::FutureGoals => "future_goals",
            QuestionKey::MultilingualExpectations => "multilingual_expectations",
            QuestionKey::CustomerMessage => "customer_message",
            QuestionKey::AllergyDisclaimer => "allergy_disclaimer",
        }
    }
}

impl fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// Single line.
    Line,
    /// Multi-line free text.
    Text,
}

#[derive(Debug)]
pub struct Question {
    pub key: QuestionKey,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub kind: InputKind,
}

#[derive(Debug)]
pub struct Section {
    pub title: &'static str,
    pub questions: &'static [Question],
}

pub const SECTIONS: &[Section] = &[
    Section {
        title: "お店の基本情報",
        questions: &[
            Question {
                key: QuestionKey::RestaurantName,
                label: "お店の名前を教えてください",
                placeholder: "例: 和食処 さくら",
                kind: InputKind::Line,
            },
            Question {
                key: QuestionKey::YearsInBusiness,
                label: "お店を開いてから何年になりますか?",
                placeholder: "例: 10年になります",
                kind: InputKind::Line,
            },
            Question {
                key: QuestionKey::LocationFeatures,
                label: "お店の場所・立地の特徴を教えてください",
                placeholder: "例: 駅から徒歩3分、商店街の中にあります",
                kind: InputKind::Text,
            },
        ],
    },
    Section {
        title: "お店の想い・こだわり",
        questions: &[
            Question {
                key: QuestionKey::Concept,
                label: "お店のコンセプトや想いを教えてください",
                placeholder: "例: 家庭的な温かい雰囲気で、心のこもった料理を提供したい",
                kind: InputKind::Text,
            },
            Question {
                key: QuestionKey::IngredientCommitment,
                label: "特にこだわっている食材や調理法はありますか?",
                placeholder: "例: 地元の野菜を使用し、手作りにこだわっています",
                kind: InputKind::Text,
            },
            Question {
                key: QuestionKey::ServiceApproach,
                label: "お客様に対してどのようなサービスを心がけていますか?",
                placeholder: "例: 一人一人のお客様との会話を大切にしています",
                kind: InputKind::Text,
            },
        ],
    },
    Section {
        title: "料理・メニューについて",
        questions: &[
            Question {
                key: QuestionKey::SignatureDish,
                label: "お店の看板メニューとその特徴を教えてください",
                placeholder: "例: 手作りハンバーグは祖母から受け継いだレシピです",
                kind: InputKind::Text,
            },
            Question {
                key: QuestionKey::SeasonalMenus,
                label: "季節ごとのメニューやイベントはありますか?",
                placeholder: "例: 春は山菜料理、夏は冷やし中華に力を入れています",
                kind: InputKind::Text,
            },
            Question {
                key: QuestionKey::MenuDevelopment,
                label: "新しいメニューを考える時に大切にしていることは?",
                placeholder: "例: お客様の声を聞いて、健康的で美味しい料理を考えています",
                kind: InputKind::Text,
            },
        ],
    },
    Section {
        title: "国際的なお客様について",
        questions: &[
            Question {
                key: QuestionKey::InternationalExperience,
                label: "海外のお客様にどのような体験をしてほしいですか?",
                placeholder: "例: 日本の家庭料理の温かさを感じてほしいです",
                kind: InputKind::Text,
            },
            Question {
                key: QuestionKey::CulturalSharing,
                label: "お店の文化や料理の背景で伝えたいことはありますか?",
                placeholder: "例: 手作りの大切さと、食材への感謝の気持ちを伝えたいです",
                kind: InputKind::Text,
            },
            Question {
                key: QuestionKey::InternationalMessage,
                label: "海外からのお客様へのメッセージをお聞かせください",
                placeholder: "例: 日本の味を楽しんでいただき、素敵な思い出を作ってください",
                kind: InputKind::Text,
            },
        ],
    },
    Section {
        title: "今後の展望",
        questions: &[
            Question {
                key: QuestionKey::FutureGoals,
                label: "今後のお店の目標や夢を教えてください",
                placeholder: "例: 地域の人々と海外の方々の交流の場になりたいです",
                kind: InputKind::Text,
            },
            Question {
                key: QuestionKey::MultilingualExpectations,
                label: "多言語メニューでどのような効果を期待されますか?",
                placeholder: "例: 言葉の壁を越えて、より多くの方に料理を楽しんでもらいたいです",
                kind: InputKind::Text,
            },
            Question {
                key: QuestionKey::CustomerMessage,
                label: "最後に、お客様への一言メッセージをお願いします",
                placeholder: "例: 心を込めて作った料理で、皆様に笑顔をお届けします",
                kind: InputKind::Text,
            },
        ],
    },
];

/// Every questionnaire question in presentation order.
pub fn questions() -> impl Iterator<Item = &'static Question> {
    SECTIONS.iter().flat_map(|s| s.questions.iter())
}

pub fn question_count() -> usize {
    questions().count()
}

fn is_answered(answers: &BTreeMap<QuestionKey, String>, key: QuestionKey) -> bool {
    answers.get(&key).is_some_and(|a| !a.trim().is_empty())
}

/// Questions still lacking a non-blank answer, in presentation order.
pub fn missing_answers(answers: &BTreeMap<QuestionKey, String>) -> Vec<QuestionKey> {
    questions()
        .map(|q| q.key)
        .filter(|&key| !is_answered(answers, key))
        .collect()
}

pub fn filled_count(answers: &BTreeMap<QuestionKey, String>) -> usize {
    questions().filter(|q| is_answered(answers, q.key)).count()
}

/// Completion in whole percent.
pub fn progress_percent(answers: &BTreeMap<QuestionKey, String>) -> u8 {
    let total = question_count();
    if total == 0 {
        return 100;
    }
    ((filled_count(answers) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_answered() -> BTreeMap<QuestionKey, String> {
        questions()
            .map(|q| (q.key, format!("answer for {}", q.key)))
            .collect()
    }

    #[test]
    fn has_fifteen_questions_in_five_sections() {
        assert_eq!(SECTIONS.len(), 5);
        assert_eq!(question_count(), 15);
        assert!(SECTIONS.iter().all(|s| s.questions.len() == 3));
        assert!(questions().all(|q| q.key != QuestionKey::AllergyDisclaimer));
    }

    #[test]
    fn blank_answers_are_missing() {
        let mut answers = all_answered();
        answers.insert(QuestionKey::Concept, "   ".into());
        answers.remove(&QuestionKey::CustomerMessage);

        assert_eq!(
            missing_answers(&answers),
            vec![QuestionKey::Concept, QuestionKey::CustomerMessage]
        );
        assert_eq!(filled_count(&answers), 13);
        assert_eq!(progress_percent(&answers), 86);
    }

    #[test]
    fn disclaimer_does_not_count_towards_progress() {
        let mut answers = BTreeMap::new();
        answers.insert(QuestionKey::AllergyDisclaimer, "スタッフまでお申し出ください".into());
        assert_eq!(filled_count(&answers), 0);
        assert_eq!(missing_answers(&answers).len(), 15);
    }

    #[test]
    fn complete_answers_have_nothing_missing() {
        let answers = all_answered();
        assert!(missing_answers(&answers).is_empty());
        assert_eq!(progress_percent(&answers), 100);
    }

    #[test]
    fn keys_serialize_as_snake_case() {
        for key in questions().map(|q| q.key) {
            let yaml = serde_yaml::to_string(&key).expect("serialize key");
            assert_eq!(yaml.trim(), key.as_str());
        }
    }
}
