//! SQLite 連線與資料表結構
//!
//! 每個連線各自開啟外鍵與 busy_timeout；資料表欄位沿用既有目錄檔的命名，
//! 以便直接開啟舊資料庫。

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Row};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};

/// 預設 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 目前的 schema 版本
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS parts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    partNo TEXT NOT NULL,
    description TEXT,
    manufacturer TEXT,
    category TEXT,
    unit TEXT,
    unitPrice REAL,
    notes TEXT,
    category1 TEXT,
    category2 TEXT,
    pricingModel TEXT DEFAULT 'fixed',
    unitPricePerKWh REAL,
    unitPricePerYear REAL,
    refCapacityKWh REAL
);

CREATE TABLE IF NOT EXISTS boms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    createdAt INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS bom_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bomId INTEGER NOT NULL,
    partId INTEGER NOT NULL,
    qty REAL NOT NULL DEFAULT 1,
    altText TEXT,
    FOREIGN KEY (bomId) REFERENCES boms(id) ON DELETE CASCADE,
    FOREIGN KEY (partId) REFERENCES parts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_bom_items_bom ON bom_items(bomId);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    appliedAt INTEGER NOT NULL
);
"#;

/// 配置連線的統一 PRAGMA
pub fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 開啟資料庫檔案並套用統一配置
pub fn open_connection(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    Ok(conn)
}

/// 建立資料表（已存在則略過）並記錄 schema 版本
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, appliedAt) VALUES (?1, ?2)",
        rusqlite::params![CURRENT_SCHEMA_VERSION, chrono::Utc::now().timestamp_millis()],
    )?;
    Ok(())
}

/// 讀取 schema 版本（若表不存在則返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
}

/// 讀取可空的數值欄位
///
/// 舊資料庫中同一欄位可能混有 REAL、INTEGER 或文字；無法解析的文字視為缺值。
pub fn read_decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(Decimal::from(i)),
        ValueRef::Real(f) => Some(decimal_from_f64(f).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Real,
                Box::new(e),
            )
        })?),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| Decimal::from_str(s.trim()).ok()),
        ValueRef::Blob(_) => None,
    };
    Ok(value)
}

/// 讀取可空的文字欄位（NULL 視為空字串）
pub fn read_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

/// 數值轉為資料庫 REAL
pub fn decimal_to_sql(value: Option<Decimal>) -> StoreResult<Option<f64>> {
    value
        .map(|v| {
            v.to_f64().ok_or_else(|| StoreError::ConversionError {
                column: "REAL".to_string(),
                message: format!("{} 無法轉為浮點數", v),
            })
        })
        .transpose()
}

/// 以最短十進位表示轉換，避免 0.05 變成 0.05000000000000000277
fn decimal_from_f64(value: f64) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(&value.to_string()).or_else(|_| Decimal::try_from(value))
}
