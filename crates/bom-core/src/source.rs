//! 明細來源介面

use crate::{LineItemRecord, Result};

/// 提供 BOM 明細的資料來源（通常為部品目錄）
///
/// 回傳順序必須與明細加入順序一致，計價與匯出皆依此順序。
pub trait LineItemSource {
    /// 讀取指定 BOM 的所有明細（已合併部品欄位）
    fn fetch_line_items(&self, bom_id: i64) -> Result<Vec<LineItemRecord>>;
}

impl LineItemSource for Vec<LineItemRecord> {
    fn fetch_line_items(&self, bom_id: i64) -> Result<Vec<LineItemRecord>> {
        Ok(self
            .iter()
            .filter(|record| record.bom_id == bom_id)
            .cloned()
            .collect())
    }
}
