//! Allergen disclosure policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::components::menu_item::MenuItem;
use crate::MenuError;

/// How allergen information is disclosed in the export.
///
/// Only [`AllergenPolicy::Display`] emits real flags. Under the other two every flag is
/// `FALSE`; the item's allergen tags are kept, just not serialized. The disclaimer copy for
/// [`AllergenPolicy::DisclaimerOnly`] travels in the owner answers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergenPolicy {
    #[default]
    Display,
    Hide,
    DisclaimerOnly,
}

impl AllergenPolicy {
    pub fn discloses(self) -> bool {
        matches!(self, AllergenPolicy::Display)
    }

    /// Serialized flag for `allergen` on `item`.
    pub fn flag(self, item: &MenuItem, allergen: &str) -> bool {
        self.discloses() && item.allergens.contains(allergen)
    }

    pub fn key(self) -> &'static str {
        match self {
            AllergenPolicy::Display => "display",
            AllergenPolicy::Hide => "hide",
            AllergenPolicy::DisclaimerOnly => "disclaimer_only",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AllergenPolicy::Display => "表示する",
            AllergenPolicy::Hide => "表示しない",
            AllergenPolicy::DisclaimerOnly => "注意書きのみ",
        }
    }
}

impl fmt::Display for AllergenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AllergenPolicy {
    type Err = MenuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "display" => Ok(AllergenPolicy::Display),
            "hide" => Ok(AllergenPolicy::Hide),
            "disclaimer_only" | "disclaimer-only" => Ok(AllergenPolicy::DisclaimerOnly),
            other => Err(MenuError::InvalidInput(format!(
                "unknown allergen policy: {other}"
            ))),
        }
    }
}
