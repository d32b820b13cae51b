//! BOM 與明細操作

use bom_core::{Bom, BomError, BomLineItem, LineItemRecord};
use chrono::{TimeZone, Utc};
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use crate::db::{decimal_to_sql, read_decimal, read_text};
use crate::error::{StoreError, StoreResult};
use crate::CatalogStore;

const LINE_ITEM_QUERY: &str = r#"
SELECT bi.id, bi.bomId, bi.partId,
       p.partNo, p.description, p.manufacturer, p.category, p.category1, p.category2,
       p.unit, p.pricingModel, p.unitPrice, p.unitPricePerKWh, p.unitPricePerYear,
       p.refCapacityKWh, bi.qty, bi.altText, p.notes
FROM bom_items bi
JOIN parts p ON p.id = bi.partId
WHERE bi.bomId = ?1
ORDER BY bi.id ASC
"#;

impl CatalogStore {
    /// 建立 BOM
    pub fn create_bom(&mut self, name: &str, allow_write: bool) -> StoreResult<Bom> {
        Self::ensure_writable(allow_write, "create_bom")?;

        let name = name.trim();
        if name.is_empty() {
            return Err(BomError::validation("name", "BOM 名稱不可為空").into());
        }

        let created_at = Utc::now();
        self.conn.execute(
            "INSERT INTO boms (name, createdAt) VALUES (?1, ?2)",
            params![name, created_at.timestamp_millis()],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!("建立 BOM {} (id={})", name, id);

        bom_from_columns(id, name.to_string(), created_at.timestamp_millis())
    }

    /// 列出所有 BOM（新建者在前）
    pub fn list_boms(&self) -> StoreResult<Vec<Bom>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, createdAt FROM boms ORDER BY createdAt DESC, id DESC")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, read_text(row, 1)?, row.get::<_, i64>(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, name, millis)| bom_from_columns(id, name, millis))
            .collect()
    }

    /// 按主鍵查詢 BOM
    pub fn get_bom(&self, id: i64) -> StoreResult<Option<Bom>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, createdAt FROM boms WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, i64>(0)?, read_text(row, 1)?, row.get::<_, i64>(2)?)),
            )
            .optional()?;

        row.map(|(id, name, millis)| bom_from_columns(id, name, millis))
            .transpose()
    }

    /// 將多個部品加入 BOM，返回新明細ID
    ///
    /// 同一部品可重複加入，每次各成一筆明細。
    pub fn add_items(
        &mut self,
        bom_id: i64,
        part_ids: &[i64],
        quantity: Decimal,
        allow_write: bool,
    ) -> StoreResult<Vec<i64>> {
        Self::ensure_writable(allow_write, "add_items")?;
        validate_quantity(quantity)?;
        self.require_bom(bom_id)?;

        for &part_id in part_ids {
            if self.get_part(part_id)?.is_none() {
                return Err(StoreError::NotFound {
                    entity: "part",
                    id: part_id,
                });
            }
        }

        let qty = decimal_to_sql(Some(quantity))?;
        let mut item_ids = Vec::with_capacity(part_ids.len());
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO bom_items (bomId, partId, qty, altText) VALUES (?1, ?2, ?3, NULL)")?;
            for &part_id in part_ids {
                stmt.execute(params![bom_id, part_id, qty])?;
                item_ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;

        tracing::info!("BOM {} 新增 {} 筆明細", bom_id, item_ids.len());
        Ok(item_ids)
    }

    /// 查詢單筆明細
    pub fn get_item(&self, item_id: i64) -> StoreResult<Option<BomLineItem>> {
        let item = self
            .conn
            .query_row(
                "SELECT id, bomId, partId, qty, altText FROM bom_items WHERE id = ?1",
                params![item_id],
                |row| {
                    Ok(BomLineItem {
                        id: row.get(0)?,
                        bom_id: row.get(1)?,
                        part_id: row.get(2)?,
                        quantity: read_decimal(row, 3)?.unwrap_or(Decimal::ZERO),
                        alt_text: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(item)
    }

    /// 更新明細數量
    pub fn update_quantity(&mut self, item_id: i64, quantity: Decimal, allow_write: bool) -> StoreResult<()> {
        Self::ensure_writable(allow_write, "update_quantity")?;
        validate_quantity(quantity)?;

        let affected = self.conn.execute(
            "UPDATE bom_items SET qty = ?1 WHERE id = ?2",
            params![decimal_to_sql(Some(quantity))?, item_id],
        )?;
        ensure_item_affected(affected, item_id)?;
        tracing::debug!("明細 {} 數量更新為 {}", item_id, quantity);
        Ok(())
    }

    /// 設定或清除明細替代文字（空白視為清除）
    pub fn set_alt_text(&mut self, item_id: i64, alt_text: Option<&str>, allow_write: bool) -> StoreResult<()> {
        Self::ensure_writable(allow_write, "set_alt_text")?;

        let alt_text = alt_text.map(str::trim).filter(|s| !s.is_empty());
        let affected = self.conn.execute(
            "UPDATE bom_items SET altText = ?1 WHERE id = ?2",
            params![alt_text, item_id],
        )?;
        ensure_item_affected(affected, item_id)?;
        tracing::debug!("明細 {} 替代文字: {:?}", item_id, alt_text);
        Ok(())
    }

    /// 移除明細
    pub fn remove_item(&mut self, item_id: i64, allow_write: bool) -> StoreResult<()> {
        Self::ensure_writable(allow_write, "remove_item")?;

        let affected = self
            .conn
            .execute("DELETE FROM bom_items WHERE id = ?1", params![item_id])?;
        ensure_item_affected(affected, item_id)?;
        tracing::info!("移除明細 id={}", item_id);
        Ok(())
    }

    /// BOM 的明細與部品欄位合併紀錄（依明細ID排序）
    pub fn line_items(&self, bom_id: i64) -> StoreResult<Vec<LineItemRecord>> {
        self.require_bom(bom_id)?;

        let mut stmt = self.conn.prepare(LINE_ITEM_QUERY)?;
        let records = stmt
            .query_map(params![bom_id], record_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!("BOM {} 讀取 {} 筆明細", bom_id, records.len());
        Ok(records)
    }

    fn require_bom(&self, bom_id: i64) -> StoreResult<()> {
        let exists = self
            .conn
            .query_row("SELECT 1 FROM boms WHERE id = ?1", params![bom_id], |_| Ok(()))
            .optional()?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                entity: "bom",
                id: bom_id,
            })
        }
    }
}

fn validate_quantity(quantity: Decimal) -> StoreResult<()> {
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(BomError::validation("qty", format!("數量不可為負: {}", quantity)).into());
    }
    Ok(())
}

fn ensure_item_affected(affected: usize, item_id: i64) -> StoreResult<()> {
    if affected == 0 {
        Err(StoreError::NotFound {
            entity: "bom_item",
            id: item_id,
        })
    } else {
        Ok(())
    }
}

fn bom_from_columns(id: i64, name: String, millis: i64) -> StoreResult<Bom> {
    Ok(Bom {
        id,
        name,
        created_at: millis_to_datetime(millis)?,
    })
}

fn millis_to_datetime(millis: i64) -> StoreResult<chrono::DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| StoreError::ConversionError {
            column: "createdAt".to_string(),
            message: format!("無效的時間戳: {}", millis),
        })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<LineItemRecord> {
    Ok(LineItemRecord {
        item_id: row.get(0)?,
        bom_id: row.get(1)?,
        part_id: row.get(2)?,
        part_number: read_text(row, 3)?,
        description: read_text(row, 4)?,
        manufacturer: read_text(row, 5)?,
        category: read_text(row, 6)?,
        category1: read_text(row, 7)?,
        category2: read_text(row, 8)?,
        unit: read_text(row, 9)?,
        pricing_model: read_text(row, 10)?,
        unit_price: read_decimal(row, 11)?,
        unit_price_per_kwh: read_decimal(row, 12)?,
        unit_price_per_year: read_decimal(row, 13)?,
        ref_capacity_kwh: read_decimal(row, 14)?,
        quantity: read_decimal(row, 15)?.unwrap_or(Decimal::ZERO),
        alt_text: row.get(16)?,
        notes: read_text(row, 17)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bom_core::NewPart;
    use rstest::rstest;

    fn store_with_parts() -> (CatalogStore, Vec<i64>) {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let report = store
            .insert_parts(
                &[
                    NewPart::new("BAT-100", "Battery module").with_unit_price(Decimal::from(250000)),
                    NewPart::new("SGCS-E30", "EMS element").with_price_per_kwh(Decimal::new(5, 2)),
                ],
                true,
            )
            .unwrap();
        (store, report.inserted_ids)
    }

    #[test]
    fn test_create_and_list_boms() {
        let (mut store, _) = store_with_parts();
        let first = store.create_bom("  Site A  ", true).unwrap();
        let second = store.create_bom("Site B", true).unwrap();

        assert_eq!(first.name, "Site A");
        let listed = store.list_boms().unwrap();
        assert_eq!(listed.len(), 2);
        // 同一毫秒建立時依 ID 遞減
        assert_eq!(listed[0].id, second.id);
        assert_eq!(store.get_bom(first.id).unwrap().unwrap().name, "Site A");
        assert!(store.get_bom(999).unwrap().is_none());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_create_bom_rejects_blank_name(#[case] name: &str) {
        let (mut store, _) = store_with_parts();
        assert!(matches!(
            store.create_bom(name, true),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_mutations_refused_without_permission() {
        let (mut store, parts) = store_with_parts();
        assert!(matches!(
            store.create_bom("x", false),
            Err(StoreError::WriteNotAllowed { .. })
        ));

        let bom = store.create_bom("x", true).unwrap();
        let items = store.add_items(bom.id, &parts, Decimal::ONE, true).unwrap();

        assert!(store.add_items(bom.id, &parts, Decimal::ONE, false).is_err());
        assert!(store.update_quantity(items[0], Decimal::TWO, false).is_err());
        assert!(store.set_alt_text(items[0], Some("alt"), false).is_err());
        assert!(store.remove_item(items[0], false).is_err());
        assert_eq!(store.line_items(bom.id).unwrap().len(), 2);
    }

    #[test]
    fn test_line_items_join_parts_in_item_order() {
        let (mut store, parts) = store_with_parts();
        let bom = store.create_bom("Site A", true).unwrap();
        let first = store.add_items(bom.id, &[parts[1]], Decimal::ONE, true).unwrap();
        store.add_items(bom.id, &[parts[0], parts[1]], Decimal::from(3), true).unwrap();

        let records = store.line_items(bom.id).unwrap();
        let numbers: Vec<_> = records.iter().map(|r| r.part_number.as_str()).collect();
        assert_eq!(numbers, vec!["SGCS-E30", "BAT-100", "SGCS-E30"]);
        assert_eq!(records[0].item_id, first[0]);
        assert_eq!(records[0].pricing_model, "per_kwh");
        assert_eq!(records[0].unit_price_per_kwh, Some(Decimal::new(5, 2)));
        assert_eq!(records[1].quantity, Decimal::from(3));
    }

    #[test]
    fn test_update_quantity_and_alt_text() {
        let (mut store, parts) = store_with_parts();
        let bom = store.create_bom("Site A", true).unwrap();
        let item = store.add_items(bom.id, &parts[..1], Decimal::ONE, true).unwrap()[0];

        store.update_quantity(item, Decimal::new(25, 1), true).unwrap();
        store.set_alt_text(item, Some("Rack (customer spec)"), true).unwrap();
        let loaded = store.get_item(item).unwrap().unwrap();
        assert_eq!(loaded.quantity, Decimal::new(25, 1));
        assert_eq!(loaded.alt_text.as_deref(), Some("Rack (customer spec)"));

        store.set_alt_text(item, Some("  "), true).unwrap();
        assert_eq!(store.get_item(item).unwrap().unwrap().alt_text, None);

        assert!(matches!(
            store.update_quantity(item, Decimal::NEGATIVE_ONE, true),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            store.update_quantity(9999, Decimal::ONE, true),
            Err(StoreError::NotFound { entity: "bom_item", .. })
        ));
    }

    #[test]
    fn test_add_items_checks_references() {
        let (mut store, parts) = store_with_parts();
        let bom = store.create_bom("Site A", true).unwrap();

        assert!(matches!(
            store.add_items(999, &parts, Decimal::ONE, true),
            Err(StoreError::NotFound { entity: "bom", .. })
        ));
        assert!(matches!(
            store.add_items(bom.id, &[parts[0], 999], Decimal::ONE, true),
            Err(StoreError::NotFound { entity: "part", .. })
        ));
        assert!(store.line_items(bom.id).unwrap().is_empty());
    }

    #[test]
    fn test_remove_item_and_cascade() {
        let (mut store, parts) = store_with_parts();
        let bom = store.create_bom("Site A", true).unwrap();
        let items = store.add_items(bom.id, &parts, Decimal::ONE, true).unwrap();

        store.remove_item(items[0], true).unwrap();
        assert_eq!(store.line_items(bom.id).unwrap().len(), 1);

        store.delete_part(parts[1], true).unwrap();
        assert!(store.line_items(bom.id).unwrap().is_empty());
    }

    #[test]
    fn test_line_items_unknown_bom() {
        let (store, _) = store_with_parts();
        assert!(matches!(
            store.line_items(42),
            Err(StoreError::NotFound { entity: "bom", id: 42 })
        ));
    }
}
