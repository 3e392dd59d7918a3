//! Menu item domain model.

use crate::collaborators::ExtractedItem;
use crate::{MenuError, MenuResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Session-scoped identifier of a menu item.
///
/// Stable across edits; displayed as 32 lowercase hex characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier previously produced by `Display`.
    pub fn parse(input: &str) -> MenuResult<Self> {
        Uuid::parse_str(input.trim())
            .map(Self)
            .map_err(|_| MenuError::InvalidInput(format!("invalid menu item id: {input}")))
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Menu category. Closed set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Food,
    Course,
    Lunch,
    Dessert,
    Drink,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Course,
        Category::Lunch,
        Category::Dessert,
        Category::Drink,
    ];

    /// Label written into the export and shown to owners.
    pub fn label(self) -> &'static str {
        match self {
            Category::Food => "フード",
            Category::Course => "コース",
            Category::Lunch => "ランチ",
            Category::Dessert => "デザート",
            Category::Drink => "ドリンク",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Course => "course",
            Category::Lunch => "lunch",
            Category::Dessert => "dessert",
            Category::Drink => "drink",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = MenuError;

    /// Accepts either the lowercase key or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s) || c.label() == s)
            .ok_or_else(|| MenuError::UnknownCategory(s.to_string()))
    }
}

/// Where an item came from. OCR items are never dropped from the session, only excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemOrigin {
    Ocr,
    Manual,
}

/// A single dish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub id: ItemId,
    /// Canonical source-language name.
    pub name: String,
    /// Free-form price label, never parsed.
    pub price: String,
    pub category: Category,
    /// Zero-based display rank.
    pub order: usize,
    pub allergens: BTreeSet<String>,
    /// Language → description. Always holds the source language.
    pub descriptions: BTreeMap<String, String>,
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub should_introduce: bool,
    pub origin: ItemOrigin,
}

impl MenuItem {
    /// A manually added item with its source description defaulted to `name`.
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        order: usize,
        source_language: &str,
    ) -> Self {
        let name = name.into();
        let mut descriptions = BTreeMap::new();
        descriptions.insert(source_language.to_string(), name.clone());

        Self {
            id: ItemId::new(),
            name,
            price: price.into(),
            category: Category::default(),
            order,
            allergens: BTreeSet::new(),
            descriptions,
            image_url: None,
            is_featured: false,
            should_introduce: true,
            origin: ItemOrigin::Manual,
        }
    }

    /// An item created from one OCR line.
    pub fn from_extracted(extracted: &ExtractedItem, order: usize, source_language: &str) -> Self {
        Self {
            origin: ItemOrigin::Ocr,
            ..Self::new(
                extracted.name.trim(),
                extracted.price.as_str(),
                order,
                source_language,
            )
        }
    }

    /// The explicit, non-blank description for `language`, if one was authored.
    pub fn description(&self, language: &str) -> Option<&str> {
        self.descriptions
            .get(language)
            .map(String::as_str)
            .filter(|d| !d.trim().is_empty())
    }

    /// Best available text for `language`: an explicit description, else the name for the
    /// source language, else nothing.
    pub fn localized_text(&self, language: &str, source_language: &str) -> &str {
        match self.description(language) {
            Some(text) => text,
            None if language == source_language => &self.name,
            None => "",
        }
    }

    /// Rename the item. A source description that was still defaulted to the old name
    /// follows the rename.
    pub fn rename(&mut self, name: impl Into<String>, source_language: &str) {
        let name = name.into();
        if let Some(source) = self.descriptions.get_mut(source_language) {
            if *source == self.name || source.trim().is_empty() {
                *source = name.clone();
            }
        }
        self.name = name;
    }

    /// Set the source-language description; blank text restores the name default.
    pub fn set_source_description(&mut self, text: &str, source_language: &str) {
        let text = text.trim();
        let value = if text.is_empty() {
            self.name.clone()
        } else {
            text.to_string()
        };
        self.descriptions.insert(source_language.to_string(), value);
    }

    /// Replace all descriptions, keeping the source-language default in place.
    pub fn replace_descriptions(
        &mut self,
        descriptions: BTreeMap<String, String>,
        source_language: &str,
    ) {
        let source = descriptions.get(source_language).cloned().unwrap_or_default();
        self.descriptions = descriptions;
        self.set_source_description(&source, source_language);
    }
}

/// Re-establish unique, contiguous zero-based ranks, keeping the current relative order.
pub fn renumber(items: &mut [MenuItem]) {
    items.sort_by_key(|item| item.order);
    for (rank, item) in items.iter_mut().enumerate() {
        item.order = rank;
    }
}

/// Items with `should_introduce`, in ascending `order`.
pub fn active_in_order(items: &[MenuItem]) -> Vec<&MenuItem> {
    let mut active: Vec<&MenuItem> = items.iter().filter(|i| i.should_introduce).collect();
    active.sort_by_key(|item| item.order);
    active
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "日本語";

    #[test]
    fn new_item_defaults_source_description_to_name() {
        let item = MenuItem::new("唐揚げ定食", "980円", 0, SOURCE);
        assert_eq!(item.descriptions.get(SOURCE).map(String::as_str), Some("唐揚げ定食"));
        assert!(item.should_introduce);
        assert!(!item.is_featured);
        assert_eq!(item.category, Category::Food);
    }

    #[test]
    fn extracted_item_is_marked_as_ocr() {
        let line = ExtractedItem {
            name: " 焼き魚御膳 ".into(),
            price: " ¥1,200 (税込) ".into(),
        };
        let item = MenuItem::from_extracted(&line, 3, SOURCE);
        assert_eq!(item.origin, ItemOrigin::Ocr);
        assert_eq!(item.name, "焼き魚御膳");
        assert_eq!(item.price, " ¥1,200 (税込) ");
        assert_eq!(item.order, 3);
    }

    #[test]
    fn localized_text_falls_back_to_name_only_for_source() {
        let mut item = MenuItem::new("Karaage", "980円", 0, "Japanese");
        item.descriptions.clear();

        assert_eq!(item.localized_text("Japanese", "Japanese"), "Karaage");
        assert_eq!(item.localized_text("English", "Japanese"), "");

        item.descriptions
            .insert("English".into(), "Fried chicken".into());
        assert_eq!(item.localized_text("English", "Japanese"), "Fried chicken");
    }

    #[test]
    fn blank_description_counts_as_not_authored() {
        let mut item = MenuItem::new("Karaage", "980円", 0, "Japanese");
        item.descriptions.insert("Japanese".into(), "  ".into());
        assert_eq!(item.description("Japanese"), None);
        assert_eq!(item.localized_text("Japanese", "Japanese"), "Karaage");
    }

    #[test]
    fn rename_carries_defaulted_description() {
        let mut item = MenuItem::new("ラーメン", "850円", 0, SOURCE);
        item.rename("特製ラーメン", SOURCE);
        assert_eq!(item.descriptions[SOURCE], "特製ラーメン");

        item.set_source_description("自家製麺の醤油ラーメン", SOURCE);
        item.rename("醤油ラーメン", SOURCE);
        assert_eq!(item.descriptions[SOURCE], "自家製麺の醤油ラーメン");
        assert_eq!(item.name, "醤油ラーメン");
    }

    #[test]
    fn replace_descriptions_keeps_source_key() {
        let mut item = MenuItem::new("ラーメン", "850円", 0, SOURCE);
        let mut descriptions = BTreeMap::new();
        descriptions.insert("英語".to_string(), "Ramen".to_string());
        item.replace_descriptions(descriptions, SOURCE);

        assert_eq!(item.descriptions[SOURCE], "ラーメン");
        assert_eq!(item.descriptions["英語"], "Ramen");
    }

    #[test]
    fn renumber_makes_orders_contiguous() {
        let mut items = vec![
            MenuItem::new("c", "", 7, SOURCE),
            MenuItem::new("a", "", 2, SOURCE),
            MenuItem::new("b", "", 4, SOURCE),
        ];
        renumber(&mut items);

        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        let orders: Vec<_> = items.iter().map(|i| i.order).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(orders, [0, 1, 2]);
    }

    #[test]
    fn active_in_order_filters_and_sorts() {
        let mut a = MenuItem::new("a", "", 2, SOURCE);
        let mut b = MenuItem::new("b", "", 0, SOURCE);
        let c = MenuItem::new("c", "", 1, SOURCE);
        b.should_introduce = false;
        a.is_featured = true;

        let items = vec![a, b, c];
        let active: Vec<_> = active_in_order(&items)
            .into_iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(active, ["c", "a"]);
    }

    #[test]
    fn category_parses_keys_and_labels() {
        assert_eq!("drink".parse::<Category>().expect("key"), Category::Drink);
        assert_eq!("デザート".parse::<Category>().expect("label"), Category::Dessert);
        assert!(matches!(
            "snack".parse::<Category>(),
            Err(MenuError::UnknownCategory(c)) if c == "snack"
        ));
    }

    #[test]
    fn item_id_round_trips_through_display() {
        let id = ItemId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 32);
        assert_eq!(ItemId::parse(&text).expect("parse"), id);
        assert!(ItemId::parse("not-an-id").is_err());
    }
}
