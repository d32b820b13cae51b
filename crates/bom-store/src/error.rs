//! 目錄儲存層錯誤類型

use bom_core::BomError;
use thiserror::Error;

/// 目錄儲存層錯誤類型
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("未允許寫入資料庫: {operation}")]
    WriteNotAllowed { operation: String },

    #[error("記錄未找到: {entity} with id={id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("部品已存在: {part_number} / {description}")]
    DuplicatePart {
        part_number: String,
        description: String,
    },

    #[error(transparent)]
    Validation(#[from] BomError),

    #[error("唯一約束違反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外鍵約束違反: {0}")]
    ForeignKeyViolation(String),

    #[error("資料庫查詢失敗: {0}")]
    DatabaseQueryError(String),

    #[error("欄位值無法轉換 (column={column}): {message}")]
    ConversionError { column: String, message: String },

    #[error("備份失敗: {0}")]
    Backup(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    StoreError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    StoreError::ForeignKeyViolation(msg)
                } else {
                    StoreError::DatabaseQueryError(msg)
                }
            }
            _ => StoreError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<StoreError> for BomError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(inner) => inner,
            StoreError::NotFound { entity: "bom", id } => BomError::BomNotFound(id),
            other => BomError::Source(other.to_string()),
        }
    }
}

/// Result 類型別名
pub type StoreResult<T> = Result<T, StoreError>;
