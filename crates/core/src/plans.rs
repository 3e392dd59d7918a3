//! Service plans offered at the start of the wizard.

use crate::config::Vocabulary;
use crate::{MenuError, MenuResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanId {
    Basic,
    Premium,
    Enterprise,
}

impl PlanId {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanId::Basic => "basic",
            PlanId::Premium => "premium",
            PlanId::Enterprise => "enterprise",
        }
    }

    pub fn plan(self) -> &'static Plan {
        // PLANS holds one entry per variant.
        match self {
            PlanId::Basic => &PLANS[0],
            PlanId::Premium => &PLANS[1],
            PlanId::Enterprise => &PLANS[2],
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(PlanId::Basic),
            "premium" => Ok(PlanId::Premium),
            "enterprise" => Ok(PlanId::Enterprise),
            other => Err(MenuError::UnknownPlan(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub recommended: bool,
    /// Maximum number of export languages; `None` means every configured language.
    pub language_limit: Option<usize>,
}

impl Plan {
    /// The vocabulary this plan exports with.
    pub fn vocabulary(&self, configured: &Vocabulary) -> Vocabulary {
        configured.narrowed(self.language_limit)
    }
}

pub static PLANS: [Plan; 3] = [
    Plan {
        id: PlanId::Basic,
        name: "ベーシックプラン",
        description: "基本的な多言語メニュー作成",
        features: &["5言語対応", "基本メニュー翻訳", "CSVファイル出力"],
        recommended: false,
        language_limit: Some(5),
    },
    Plan {
        id: PlanId::Premium,
        name: "プレミアムプラン",
        description: "高品質な多言語メニュー作成",
        features: &[
            "15言語対応",
            "高品質翻訳",
            "イチオシメニュー設定",
            "画像対応",
            "CSVファイル出力",
        ],
        recommended: true,
        language_limit: Some(15),
    },
    Plan {
        id: PlanId::Enterprise,
        name: "エンタープライズプラン",
        description: "完全カスタマイズ可能",
        features: &[
            "全言語対応",
            "AI翻訳",
            "完全カスタマイズ",
            "24時間サポート",
            "API連携",
        ],
        recommended: false,
        language_limit: None,
    },
];

pub fn find_plan(id: &str) -> MenuResult<&'static Plan> {
    Ok(id.parse::<PlanId>()?.plan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_lookup_matches_ids() {
        for plan in &PLANS {
            assert_eq!(plan.id.plan().id, plan.id);
            assert_eq!(find_plan(plan.id.as_str()).expect("known plan").id, plan.id);
        }
        assert!(matches!(find_plan("gold"), Err(MenuError::UnknownPlan(p)) if p == "gold"));
    }

    #[test]
    fn exactly_one_plan_is_recommended() {
        assert_eq!(PLANS.iter().filter(|p| p.recommended).count(), 1);
        assert!(PlanId::Premium.plan().recommended);
    }

    #[test]
    fn basic_plan_narrows_languages() {
        let standard = Vocabulary::standard();
        let basic = PlanId::Basic.plan().vocabulary(&standard);
        assert_eq!(basic.languages().len(), 5);
        assert_eq!(basic.languages()[0], standard.source_language());
        assert_eq!(basic.allergens(), standard.allergens());

        let enterprise = PlanId::Enterprise.plan().vocabulary(&standard);
        assert_eq!(enterprise, standard);
    }
}
