//! Export assembly and serialization.
//!
//! The assembler turns the wizard's item list into a [`Table`]: active items only, sorted by
//! display order, re-ranked 1..N, each row checked against the vocabulary's headers before it
//! is accepted. A row that disagrees with the headers is a bug in the row builder and aborts
//! the export with [`MenuError::RowSchemaMismatch`].

use crate::components::allergen_policy::AllergenPolicy;
use crate::components::menu_item::{active_in_order, ItemId, MenuItem};
use crate::components::narrative::OwnerNarrative;
use crate::config::Vocabulary;
use crate::constants::UTF8_BOM;
use crate::row::{Row, RowBuilder};
use crate::{MenuError, MenuResult};
use std::io::Write;
use tonosama_files::{ExportMetadata, ExportStore};

/// Header row plus data rows, every row aligned to `headers`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no data rows. Headers are always present.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table as UTF-8 CSV preceded by a byte-order mark.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> MenuResult<()> {
        writer.write_all(UTF8_BOM)?;

        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.headers)?;
        for row in &self.rows {
            csv.write_record(row.values())?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> MenuResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_csv(&mut bytes)?;
        Ok(bytes)
    }
}

/// Builds export tables for one vocabulary.
#[derive(Clone, Copy, Debug)]
pub struct ExportAssembler<'a> {
    builder: RowBuilder<'a>,
}

impl<'a> ExportAssembler<'a> {
    pub fn new(vocabulary: &'a Vocabulary) -> Self {
        Self {
            builder: RowBuilder::new(vocabulary),
        }
    }

    pub fn headers(&self) -> Vec<String> {
        self.builder.headers()
    }

    /// Assemble the export for `items`.
    ///
    /// Items with `should_introduce == false` are skipped. The rest are ordered by `order`
    /// and their display order is the 1-based rank within that filtered list. The input
    /// slice is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::RowSchemaMismatch`] if a built row's headers differ from the
    /// table headers.
    pub fn assemble(
        &self,
        items: &[MenuItem],
        narrative: &OwnerNarrative,
        policy: AllergenPolicy,
    ) -> MenuResult<Table> {
        let headers = self.builder.headers();

        let rows = active_in_order(items)
            .into_iter()
            .enumerate()
            .map(|(rank, item)| {
                let mut ranked = item.clone();
                ranked.order = rank;
                let row = self.builder.build_row(&ranked, narrative, policy);
                verify_row(item.id, &row, &headers)?;
                Ok(row)
            })
            .collect::<MenuResult<Vec<_>>>()?;

        tracing::debug!(
            rows = rows.len(),
            columns = headers.len(),
            policy = %policy,
            "assembled export table"
        );

        Ok(Table { headers, rows })
    }
}

/// Check that `row` carries exactly `headers`, in order.
pub fn verify_row(item_id: ItemId, row: &Row, headers: &[String]) -> MenuResult<()> {
    if row.len() != headers.len() {
        return Err(MenuError::RowSchemaMismatch {
            item_id,
            detail: format!("{} cells for {} headers", row.len(), headers.len()),
        });
    }

    if let Some((index, (found, expected))) = row
        .headers()
        .zip(headers)
        .enumerate()
        .find(|(_, (found, expected))| found != expected)
    {
        return Err(MenuError::RowSchemaMismatch {
            item_id,
            detail: format!("column {index} is {found}, expected {expected}"),
        });
    }

    Ok(())
}

/// Destination for finished exports.
pub trait ExportSink {
    fn write_export(&self, table: &Table) -> MenuResult<ExportMetadata>;
}

impl ExportSink for ExportStore {
    fn write_export(&self, table: &Table) -> MenuResult<ExportMetadata> {
        let bytes = table.to_csv_bytes()?;
        let metadata = self.store(&bytes, table.row_count())?;
        tracing::debug!(
            file = %metadata.file_name,
            rows = metadata.row_count,
            bytes = metadata.size_bytes,
            "stored menu export"
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn vocabulary() -> Vocabulary {
        Vocabulary::new(
            vec!["Wheat".into(), "Soy".into()],
            vec!["Japanese".into(), "English".into()],
            "Japanese",
        )
        .expect("valid vocabulary")
    }

    fn narrative() -> OwnerNarrative {
        OwnerNarrative::new(BTreeMap::new(), "家庭の味", "Japanese")
    }

    fn item(name: &str, order: usize, introduce: bool) -> MenuItem {
        let mut item = MenuItem::new(name, "500円", order, "Japanese");
        item.should_introduce = introduce;
        item
    }

    fn names(table: &Table) -> Vec<String> {
        table
            .rows()
            .iter()
            .map(|r| r.get("Japanese_メニュー名").unwrap_or_default().to_string())
            .collect()
    }

    fn display_orders(table: &Table) -> Vec<String> {
        table
            .rows()
            .iter()
            .map(|r| r.get("表示順").unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn scenario_c_excluded_items_are_skipped_and_reranked() {
        let vocabulary = vocabulary();
        let items = vec![item("A", 0, true), item("B", 1, false), item("C", 2, true)];

        let table = ExportAssembler::new(&vocabulary)
            .assemble(&items, &narrative(), AllergenPolicy::Display)
            .expect("assemble");

        assert_eq!(table.row_count(), 2);
        assert_eq!(names(&table), ["A", "C"]);
        assert_eq!(display_orders(&table), ["1", "2"]);
        assert_eq!(items[2].order, 2);
    }

    #[test]
    fn sole_survivor_is_ranked_first() {
        let vocabulary = vocabulary();
        let items = vec![item("A", 0, false), item("B", 1, false), item("C", 2, true)];

        let table = ExportAssembler::new(&vocabulary)
            .assemble(&items, &narrative(), AllergenPolicy::Display)
            .expect("assemble");

        assert_eq!(names(&table), ["C"]);
        assert_eq!(display_orders(&table), ["1"]);
    }

    #[test]
    fn nothing_active_yields_headers_only() {
        let vocabulary = vocabulary();
        let items = vec![item("A", 0, false)];

        let table = ExportAssembler::new(&vocabulary)
            .assemble(&items, &narrative(), AllergenPolicy::Display)
            .expect("assemble");

        assert!(table.is_empty());
        assert_eq!(table.headers(), RowBuilder::new(&vocabulary).headers().as_slice());

        let csv = table.to_csv_bytes().expect("csv");
        let text = String::from_utf8(csv[UTF8_BOM.len()..].to_vec()).expect("utf-8");
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn rows_follow_order_not_input_position() {
        let vocabulary = vocabulary();
        let items = vec![item("late", 9, true), item("early", 3, true)];

        let table = ExportAssembler::new(&vocabulary)
            .assemble(&items, &narrative(), AllergenPolicy::Hide)
            .expect("assemble");

        assert_eq!(names(&table), ["early", "late"]);
        assert_eq!(display_orders(&table), ["1", "2"]);
    }

    #[test]
    fn mismatched_row_is_a_contract_violation() {
        let id = ItemId::new();
        let headers = vec!["価格".to_string(), "備考".to_string()];

        let short = Row::from_cells(vec![("価格".into(), "500円".into())]);
        let err = verify_row(id, &short, &headers).expect_err("short row");
        assert_eq!(err.class(), ErrorClass::ContractViolation);

        let renamed = Row::from_cells(vec![
            ("価格".into(), "500円".into()),
            ("メモ".into(), String::new()),
        ]);
        let err = verify_row(id, &renamed, &headers).expect_err("renamed column");
        assert!(err.to_string().contains("column 1 is メモ"));
    }

    #[test]
    fn csv_starts_with_bom_and_quotes_commas() {
        let vocabulary = vocabulary();
        let mut dish = item("Karaage", 0, true);
        dish.price = "1,200円".into();

        let table = ExportAssembler::new(&vocabulary)
            .assemble(&[dish], &narrative(), AllergenPolicy::Display)
            .expect("assemble");
        let bytes = table.to_csv_bytes().expect("csv");

        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf-8");
        let mut lines = text.lines();
        assert!(lines.next().expect("header line").starts_with("価格,画像URL,カテゴリ"));
        assert!(lines.next().expect("data line").starts_with("\"1,200円\",,フード,FALSE,1"));
    }

    #[test]
    fn export_store_sink_writes_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ExportStore::new(dir.path()).expect("store");
        let vocabulary = vocabulary();

        let table = ExportAssembler::new(&vocabulary)
            .assemble(&[item("A", 0, true)], &narrative(), AllergenPolicy::Display)
            .expect("assemble");
        let metadata = store.write_export(&table).expect("write export");

        assert_eq!(metadata.row_count, 1);
        let written = std::fs::read(dir.path().join(&metadata.file_name)).expect("read artifact");
        assert_eq!(written, table.to_csv_bytes().expect("csv"));
    }

    proptest! {
        #[test]
        fn display_orders_are_contiguous_and_follow_order(
            flags in proptest::collection::vec(any::<bool>(), 0..12),
            seed in any::<u64>(),
        ) {
            let vocabulary = vocabulary();
            let mut items: Vec<MenuItem> = flags
                .iter()
                .enumerate()
                .map(|(i, &on)| item(&format!("item{i:02}"), i * 2, on))
                .collect();
            let len = items.len();
            if len > 1 {
                items.rotate_left((seed as usize) % len);
            }

            let table = ExportAssembler::new(&vocabulary)
                .assemble(&items, &narrative(), AllergenPolicy::Display)
                .expect("assemble");

            let active = flags.iter().filter(|&&on| on).count();
            prop_assert_eq!(table.row_count(), active);

            let expected_orders: Vec<String> = (1..=active).map(|n| n.to_string()).collect();
            prop_assert_eq!(display_orders(&table), expected_orders);

            let expected_names: Vec<String> = flags
                .iter()
                .enumerate()
                .filter(|(_, &on)| on)
                .map(|(i, _)| format!("item{i:02}"))
                .collect();
            prop_assert_eq!(names(&table), expected_names);
        }

        #[test]
        fn input_permutation_does_not_change_output(
            count in 1usize..8,
            perm in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle(),
        ) {
            let vocabulary = vocabulary();
            let items: Vec<MenuItem> = (0..count)
                .map(|i| item(&format!("item{i}"), i, true))
                .collect();
            let shuffled: Vec<MenuItem> = perm
                .iter()
                .filter(|&&i| i < count)
                .map(|&i| items[i].clone())
                .collect();

            let assembler = ExportAssembler::new(&vocabulary);
            let a = assembler
                .assemble(&items, &narrative(), AllergenPolicy::Display)
                .expect("assemble");
            let b = assembler
                .assemble(&shuffled, &narrative(), AllergenPolicy::Display)
                .expect("assemble");
            prop_assert_eq!(a, b);
        }
    }
}
