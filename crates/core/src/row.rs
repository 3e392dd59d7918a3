//! Row builder: the fixed-schema projection of one menu item.
//!
//! Column groups, in emission order:
//!
//! 1. core fields: price, image URL, category, recommended flag, 1-based display order
//! 2. one flag per vocabulary allergen
//! 3. name and description per vocabulary language
//! 4. owner narrative per vocabulary language
//! 5. remarks (always empty)
//!
//! The header list depends only on the [`Vocabulary`], never on item content, so a table with
//! zero rows still has a complete header.

use crate::components::allergen_policy::AllergenPolicy;
use crate::components::menu_item::MenuItem;
use crate::components::narrative::OwnerNarrative;
use crate::config::Vocabulary;
use crate::constants::{
    CATEGORY_HEADER, CORE_COLUMN_COUNT, DISPLAY_ORDER_HEADER, FALSE_LITERAL, IMAGE_URL_HEADER,
    ITEM_DESCRIPTION_SUFFIX, ITEM_NAME_SUFFIX, NARRATIVE_SUFFIX, PRICE_HEADER, RECOMMENDED_HEADER,
    REMARKS_HEADER, TRUE_LITERAL,
};

/// One exported record: ordered `(header, value)` cells.
///
/// Only [`RowBuilder::build_row`] constructs rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    pub(crate) fn from_cells(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }

    /// Value of the first cell labelled `header`.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Wire literal for a boolean cell.
pub fn flag_literal(value: bool) -> &'static str {
    if value {
        TRUE_LITERAL
    } else {
        FALSE_LITERAL
    }
}

pub fn item_name_header(language: &str) -> String {
    format!("{language}_{ITEM_NAME_SUFFIX}")
}

pub fn item_description_header(language: &str) -> String {
    format!("{language}_{ITEM_DESCRIPTION_SUFFIX}")
}

pub fn narrative_header(language: &str) -> String {
    format!("{language}_{NARRATIVE_SUFFIX}")
}

/// Pure mapping from `(item, narrative, policy)` to a [`Row`] under one vocabulary.
#[derive(Clone, Copy, Debug)]
pub struct RowBuilder<'a> {
    vocabulary: &'a Vocabulary,
}

impl<'a> RowBuilder<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// `5 + |allergens| + 3 × |languages| + 1`.
    pub fn column_count(&self) -> usize {
        CORE_COLUMN_COUNT
            + self.vocabulary.allergens().len()
            + 3 * self.vocabulary.languages().len()
            + 1
    }

    /// The export header row.
    pub fn headers(&self) -> Vec<String> {
        let languages = self.vocabulary.languages();
        let mut headers = Vec::with_capacity(self.column_count());

        headers.extend(
            [
                PRICE_HEADER,
                IMAGE_URL_HEADER,
                CATEGORY_HEADER,
                RECOMMENDED_HEADER,
                DISPLAY_ORDER_HEADER,
            ]
            .map(String::from),
        );
        headers.extend(self.vocabulary.allergens().iter().cloned());
        for language in languages {
            headers.push(item_name_header(language));
            headers.push(item_description_header(language));
        }
        headers.extend(languages.iter().map(|l| narrative_header(l)));
        headers.push(REMARKS_HEADER.to_string());

        headers
    }

    /// Build the row for `item`.
    ///
    /// The display order cell is `item.order + 1`; callers exporting a filtered set re-base
    /// `order` to the rank within that set first.
    pub fn build_row(
        &self,
        item: &MenuItem,
        narrative: &OwnerNarrative,
        policy: AllergenPolicy,
    ) -> Row {
        let source = self.vocabulary.source_language();
        let languages = self.vocabulary.languages();
        let mut cells: Vec<(String, String)> = Vec::with_capacity(self.column_count());

        cells.push((PRICE_HEADER.into(), item.price.clone()));
        cells.push((
            IMAGE_URL_HEADER.into(),
            item.image_url.clone().unwrap_or_default(),
        ));
        cells.push((CATEGORY_HEADER.into(), item.category.label().into()));
        cells.push((
            RECOMMENDED_HEADER.into(),
            flag_literal(item.is_featured).into(),
        ));
        cells.push((DISPLAY_ORDER_HEADER.into(), (item.order + 1).to_string()));

        for allergen in self.vocabulary.allergens() {
            cells.push((
                allergen.clone(),
                flag_literal(policy.flag(item, allergen)).into(),
            ));
        }

        for language in languages {
            let text = item.localized_text(language, source);
            cells.push((item_name_header(language), text.to_string()));
            cells.push((item_description_header(language), text.to_string()));
        }

        for language in languages {
            cells.push((
                narrative_header(language),
                narrative.translation(language).to_string(),
            ));
        }

        cells.push((REMARKS_HEADER.into(), String::new()));

        Row::from_cells(cells)
    }
}
