//! Constants used throughout the TONOSAMA core crate.
//!
//! The default vocabularies live here; everything that generates columns receives them
//! through [`crate::config::Vocabulary`] rather than reading these lists directly.

/// Language the owner writes the menu in.
pub const SOURCE_LANGUAGE: &str = "日本語";

/// Default supported languages, source language first.
pub const DEFAULT_LANGUAGES: &[&str] = &[
    "日本語",
    "英語",
    "韓国語",
    "中国語(簡体字)",
    "中国語(繁体字)",
    "タイ語",
    "ベトナム語",
    "インドネシア語",
    "スペイン語",
    "フランス語",
    "ドイツ語",
    "イタリア語",
    "ポルトガル語",
    "ロシア語",
    "アラビア語",
];

/// Default controlled allergen vocabulary.
pub const DEFAULT_ALLERGENS: &[&str] = &[
    "小麦",
    "甲殻類",
    "卵",
    "魚",
    "大豆",
    "ピーナッツ",
    "牛乳",
    "くるみ",
    "セロリ",
    "マスタード",
    "ゴマ",
    "亜硫酸塩",
    "ルピナス",
    "貝",
];

/// Core column headers, in emission order.
pub const PRICE_HEADER: &str = "価格";
pub const IMAGE_URL_HEADER: &str = "画像URL";
pub const CATEGORY_HEADER: &str = "カテゴリ";
pub const RECOMMENDED_HEADER: &str = "おすすめ";
pub const DISPLAY_ORDER_HEADER: &str = "表示順";

/// Trailing free-text column, always empty.
pub const REMARKS_HEADER: &str = "備考";

/// Suffixes for the per-language column groups (`<language>_<suffix>`).
pub const ITEM_NAME_SUFFIX: &str = "メニュー名";
pub const ITEM_DESCRIPTION_SUFFIX: &str = "説明";
pub const NARRATIVE_SUFFIX: &str = "店主の想い";

/// Number of core columns preceding the allergen flags.
pub const CORE_COLUMN_COUNT: usize = 5;

/// Wire literals for boolean cells.
pub const TRUE_LITERAL: &str = "TRUE";
pub const FALSE_LITERAL: &str = "FALSE";

/// UTF-8 byte-order mark written ahead of the CSV so spreadsheets detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Default directory for stored exports when none is configured.
pub const DEFAULT_EXPORT_DIR: &str = "exports";

/// Defaults for manually added menu items.
pub const NEW_ITEM_NAME_PREFIX: &str = "新しいメニュー";
pub const NEW_ITEM_PRICE: &str = "0円";
