//! # BOM Store
//!
//! 部品目錄與 BOM 的 SQLite 儲存層。
//!
//! 連線由 [`CatalogStore`] 持有：開啟時取得，值被丟棄時釋放，不使用全域共用連線。
//! 所有寫入操作都需要明確傳入 `allow_write`。

pub mod backup;
pub mod boms;
pub mod db;
pub mod error;
pub mod filter;
pub mod parts;

// Re-export 主要類型
pub use backup::backup_database;
pub use error::{StoreError, StoreResult};
pub use filter::PartFilter;
pub use parts::{CategoryOptions, InsertReport};

use bom_core::{LineItemRecord, LineItemSource};
use rusqlite::Connection;
use std::path::Path;

/// 部品目錄
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// 開啟資料庫檔案（不存在則建立）並初始化資料表
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        tracing::debug!("開啟目錄資料庫: {}", path.display());
        let conn = db::open_connection(path)?;
        Self::from_connection(conn)
    }

    /// 開啟記憶體資料庫（測試用）
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        db::configure_connection(&conn)?;
        Self::from_connection(conn)
    }

    /// 從已配置的連線建立目錄
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        db::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// 獲取底層連線
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// 檢查寫入許可
    pub(crate) fn ensure_writable(allow_write: bool, operation: &str) -> StoreResult<()> {
        if allow_write {
            Ok(())
        } else {
            tracing::warn!("拒絕未允許的寫入: {}", operation);
            Err(StoreError::WriteNotAllowed {
                operation: operation.to_string(),
            })
        }
    }
}

impl LineItemSource for CatalogStore {
    fn fetch_line_items(&self, bom_id: i64) -> bom_core::Result<Vec<LineItemRecord>> {
        self.line_items(bom_id).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_guard() {
        assert!(CatalogStore::ensure_writable(true, "insert").is_ok());
        match CatalogStore::ensure_writable(false, "insert") {
            Err(StoreError::WriteNotAllowed { operation }) => assert_eq!(operation, "insert"),
            other => panic!("unexpected: {:?}", other.err()),
        }
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parts_bom.db");
        {
            let store = CatalogStore::open(&path).unwrap();
            assert_eq!(store.count_parts().unwrap(), 0);
        }
        assert!(path.exists());
        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(
            db::read_schema_version(store.connection()).unwrap(),
            Some(db::CURRENT_SCHEMA_VERSION)
        );
    }
}
