//! 部品目錄操作

use bom_core::part::{dedup_key, DEFAULT_UNIT};
use bom_core::{NewPart, Part, PricingModel};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use std::collections::{BTreeSet, HashSet};

use crate::db::{decimal_to_sql, read_decimal, read_text};
use crate::error::{StoreError, StoreResult};
use crate::filter::PartFilter;
use crate::CatalogStore;

const PART_COLUMNS: &str = "id, partNo, description, manufacturer, category, category1, category2, \
     unit, unitPrice, pricingModel, unitPricePerKWh, unitPricePerYear, refCapacityKWh, notes";

const INSERT_PART: &str = r#"
INSERT INTO parts (
    partNo, description, manufacturer, category, unit, unitPrice, notes,
    category1, category2, pricingModel, unitPricePerKWh, unitPricePerYear, refCapacityKWh
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
"#;

/// 批次寫入結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// 新增的部品ID（依輸入順序）
    pub inserted_ids: Vec<i64>,

    /// 因 (品號, 品名) 重複而略過的筆數
    pub duplicates: usize,
}

impl InsertReport {
    /// 新增筆數
    pub fn inserted(&self) -> usize {
        self.inserted_ids.len()
    }
}

/// 分類篩選選項
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryOptions {
    pub category1: Vec<String>,
    pub category2: Vec<String>,
}

impl CatalogStore {
    /// 部品總數
    pub fn count_parts(&self) -> StoreResult<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM parts", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// 按主鍵查詢
    pub fn get_part(&self, id: i64) -> StoreResult<Option<Part>> {
        let sql = format!("SELECT {} FROM parts WHERE id = ?1", PART_COLUMNS);
        let part = self
            .conn
            .query_row(&sql, params![id], part_from_row)
            .optional()?;
        Ok(part)
    }

    /// 依條件查詢部品（依 ID 排序）
    pub fn search_parts(&self, filter: &PartFilter) -> StoreResult<Vec<Part>> {
        let (clause, values) = filter.to_sql();
        let sql = format!("SELECT {} FROM parts{} ORDER BY id ASC", PART_COLUMNS, clause);

        let mut stmt = self.conn.prepare(&sql)?;
        let parts = stmt
            .query_map(params_from_iter(values.iter()), part_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!("查詢部品 {:?}: {} 筆", filter, parts.len());
        Ok(parts)
    }

    /// 第一/第二分類的選項（去重、排序、排除空白）
    ///
    /// 指定關鍵字時，只列出符合關鍵字的部品所含的分類。
    pub fn category_options(&self, query: Option<&str>) -> StoreResult<CategoryOptions> {
        let filter = match query {
            Some(q) => PartFilter::new().with_query(q),
            None => PartFilter::new(),
        };
        let parts = self.search_parts(&filter)?;

        let mut category1 = BTreeSet::new();
        let mut category2 = BTreeSet::new();
        for part in parts {
            if !part.fields.category1.is_empty() {
                category1.insert(part.fields.category1);
            }
            if !part.fields.category2.is_empty() {
                category2.insert(part.fields.category2);
            }
        }

        Ok(CategoryOptions {
            category1: category1.into_iter().collect(),
            category2: category2.into_iter().collect(),
        })
    }

    /// 批次新增部品
    ///
    /// (品號, 品名) 不分大小寫與目錄或同批次重複者略過。任何一筆驗證失敗則整批不寫入。
    pub fn insert_parts(&mut self, parts: &[NewPart], allow_write: bool) -> StoreResult<InsertReport> {
        Self::ensure_writable(allow_write, "insert_parts")?;

        for part in parts {
            part.validate()?;
        }

        let mut known = self.existing_keys()?;
        let mut report = InsertReport::default();

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_PART)?;
            for part in parts {
                if !known.insert(part.dedup_key()) {
                    report.duplicates += 1;
                    continue;
                }
                stmt.execute(params_from_iter(part_params(part)?))?;
                report.inserted_ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;

        tracing::info!(
            "部品批次寫入完成：新增 {} 筆，重複略過 {} 筆",
            report.inserted(),
            report.duplicates
        );
        Ok(report)
    }

    /// 新增單一部品
    pub fn add_part(&mut self, part: &NewPart, allow_write: bool) -> StoreResult<i64> {
        Self::ensure_writable(allow_write, "add_part")?;
        part.validate()?;

        if self.existing_keys()?.contains(&part.dedup_key()) {
            return Err(StoreError::DuplicatePart {
                part_number: part.part_number.clone(),
                description: part.description.clone(),
            });
        }

        self.conn
            .execute(INSERT_PART, params_from_iter(part_params(part)?))?;
        let id = self.conn.last_insert_rowid();
        tracing::info!("新增部品 {} (id={})", part.part_number, id);
        Ok(id)
    }

    /// 刪除部品（引用此部品的 BOM 明細一併刪除）
    pub fn delete_part(&mut self, id: i64, allow_write: bool) -> StoreResult<()> {
        Self::ensure_writable(allow_write, "delete_part")?;

        let affected = self.conn.execute("DELETE FROM parts WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(StoreError::NotFound { entity: "part", id });
        }
        tracing::info!("刪除部品 id={}", id);
        Ok(())
    }

    /// 目錄中既有的去重鍵
    fn existing_keys(&self) -> StoreResult<HashSet<(String, String)>> {
        let mut stmt = self.conn.prepare("SELECT partNo, description FROM parts")?;
        let keys = stmt
            .query_map([], |row| {
                let part_number = read_text(row, 0)?;
                let description = read_text(row, 1)?;
                Ok(dedup_key(&part_number, &description))
            })?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(keys)
    }
}

/// 組出 INSERT 參數
fn part_params(part: &NewPart) -> StoreResult<Vec<rusqlite::types::Value>> {
    use rusqlite::types::Value;

    let text = |s: &str| Value::Text(s.trim().to_string());
    let real = |v: Option<rust_decimal::Decimal>| -> StoreResult<Value> {
        Ok(decimal_to_sql(v)?.map(Value::Real).unwrap_or(Value::Null))
    };

    let unit = if part.unit.trim().is_empty() {
        DEFAULT_UNIT
    } else {
        part.unit.as_str()
    };
    let pricing_model = if part.pricing_model.trim().is_empty() {
        PricingModel::Fixed.as_str()
    } else {
        part.pricing_model.as_str()
    };

    Ok(vec![
        text(&part.part_number),
        text(&part.description),
        text(&part.manufacturer),
        text(&part.category),
        text(unit),
        real(part.unit_price)?,
        text(&part.notes),
        text(&part.category1),
        text(&part.category2),
        text(pricing_model),
        real(part.unit_price_per_kwh)?,
        real(part.unit_price_per_year)?,
        real(part.ref_capacity_kwh)?,
    ])
}

/// 資料列轉部品
fn part_from_row(row: &Row<'_>) -> rusqlite::Result<Part> {
    Ok(Part {
        id: row.get(0)?,
        fields: NewPart {
            part_number: read_text(row, 1)?,
            description: read_text(row, 2)?,
            manufacturer: read_text(row, 3)?,
            category: read_text(row, 4)?,
            category1: read_text(row, 5)?,
            category2: read_text(row, 6)?,
            unit: read_text(row, 7)?,
            unit_price: read_decimal(row, 8)?,
            pricing_model: read_text(row, 9)?,
            unit_price_per_kwh: read_decimal(row, 10)?,
            unit_price_per_year: read_decimal(row, 11)?,
            ref_capacity_kwh: read_decimal(row, 12)?,
            notes: read_text(row, 13)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn seeded_store() -> CatalogStore {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let parts = vec![
            NewPart::new("BAT-100", "LFP battery module")
                .with_categories("Battery", "Module")
                .with_unit_price(Decimal::from(250000)),
            NewPart::new("PCS-50", "Power conversion system")
                .with_categories("PCS", "Hardware")
                .with_unit_price(Decimal::from(1200000)),
            NewPart::new("SGCS-E30", "EMS element - Basic Functions")
                .with_categories("EMS", "Software")
                .with_price_per_kwh(Decimal::new(5, 2))
                .with_notes("license per kWh"),
            NewPart::new("MNT-01", "Maintenance contract")
                .with_categories("Service", "")
                .with_price_per_year(Decimal::from(1200)),
        ];
        store.insert_parts(&parts, true).unwrap();
        store
    }

    #[test]
    fn test_insert_and_count() {
        let store = seeded_store();
        assert_eq!(store.count_parts().unwrap(), 4);
    }

    #[test]
    fn test_insert_requires_write_permission() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let result = store.insert_parts(&[NewPart::new("X-1", "x")], false);
        assert!(matches!(result, Err(StoreError::WriteNotAllowed { .. })));
        assert_eq!(store.count_parts().unwrap(), 0);
    }

    #[test]
    fn test_insert_skips_duplicates_case_insensitive() {
        let mut store = seeded_store();
        let batch = vec![
            NewPart::new("bat-100", "lfp BATTERY module"),
            NewPart::new("CAB-10", "DC cable"),
            NewPart::new("cab-10", "dc cable"),
        ];
        let report = store.insert_parts(&batch, true).unwrap();

        assert_eq!(report.inserted(), 1);
        assert_eq!(report.duplicates, 2);
        assert_eq!(store.count_parts().unwrap(), 5);
    }

    #[test]
    fn test_reimport_of_padded_part_is_duplicate() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let batch = vec![NewPart::new("ABC-1 ", "Cable")];

        let first = store.insert_parts(&batch, true).unwrap();
        let second = store.insert_parts(&batch, true).unwrap();

        assert_eq!(first.inserted(), 1);
        assert_eq!(second.inserted(), 0);
        assert_eq!(second.duplicates, 1);
        assert_eq!(store.count_parts().unwrap(), 1);
    }

    #[test]
    fn test_insert_rejects_invalid_batch() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let batch = vec![NewPart::new("OK-1", "fine"), NewPart::new("", "no number")];
        assert!(matches!(
            store.insert_parts(&batch, true),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.count_parts().unwrap(), 0);
    }

    #[test]
    fn test_get_part_round_trip_values() {
        let store = seeded_store();
        let part = store
            .search_parts(&PartFilter::new().with_query("SGCS"))
            .unwrap()
            .remove(0);
        let loaded = store.get_part(part.id).unwrap().unwrap();

        assert_eq!(loaded.pricing_model(), PricingModel::PerKwh);
        assert_eq!(loaded.fields.unit_price_per_kwh, Some(Decimal::new(5, 2)));
        assert_eq!(loaded.fields.unit_price, None);
        assert_eq!(loaded.fields.unit, "set");
        assert!(store.get_part(9999).unwrap().is_none());
    }

    #[test]
    fn test_search_by_keyword_case_insensitive() {
        let store = seeded_store();
        let found = store.search_parts(&PartFilter::new().with_query("ems")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fields.part_number, "SGCS-E30");

        let by_notes = store.search_parts(&PartFilter::new().with_query("LICENSE")).unwrap();
        assert_eq!(by_notes.len(), 1);
    }

    #[test]
    fn test_search_by_categories() {
        let store = seeded_store();
        let filter = PartFilter::new().with_category1(["Battery", "PCS"]);
        let found = store.search_parts(&filter).unwrap();
        let numbers: Vec<_> = found.iter().map(|p| p.fields.part_number.as_str()).collect();
        assert_eq!(numbers, vec!["BAT-100", "PCS-50"]);

        let filter = PartFilter::new()
            .with_category1(["Battery", "PCS"])
            .with_category2(["Hardware"]);
        assert_eq!(store.search_parts(&filter).unwrap().len(), 1);
    }

    #[test]
    fn test_category_options() {
        let store = seeded_store();
        let options = store.category_options(None).unwrap();
        assert_eq!(options.category1, vec!["Battery", "EMS", "PCS", "Service"]);
        assert_eq!(options.category2, vec!["Hardware", "Module", "Software"]);

        let options = store.category_options(Some("battery")).unwrap();
        assert_eq!(options.category1, vec!["Battery"]);
    }

    #[test]
    fn test_add_part_duplicate_and_missing_number() {
        let mut store = seeded_store();
        assert!(matches!(
            store.add_part(&NewPart::new("PCS-50", "power conversion system"), true),
            Err(StoreError::DuplicatePart { .. })
        ));
        assert!(matches!(
            store.add_part(&NewPart::new(" ", "blank"), true),
            Err(StoreError::Validation(_))
        ));

        let id = store.add_part(&NewPart::new("NEW-1", "new"), true).unwrap();
        assert!(store.get_part(id).unwrap().is_some());
    }

    #[test]
    fn test_delete_part() {
        let mut store = seeded_store();
        let id = store.search_parts(&PartFilter::new()).unwrap()[0].id;

        assert!(matches!(
            store.delete_part(id, false),
            Err(StoreError::WriteNotAllowed { .. })
        ));
        store.delete_part(id, true).unwrap();
        assert!(store.get_part(id).unwrap().is_none());
        assert!(matches!(
            store.delete_part(id, true),
            Err(StoreError::NotFound { entity: "part", .. })
        ));
    }
}
