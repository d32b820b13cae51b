//! # BOM Core
//!
//! 核心資料模型與類型定義

pub mod bom;
pub mod config;
pub mod part;
pub mod project;
pub mod source;

// Re-export 主要類型
pub use bom::{Bom, BomLineItem, LineItemRecord};
pub use config::{AppConfig, ExportConfig};
pub use part::{NewPart, Part, PricingModel};
pub use project::ProjectParams;
pub use source::LineItemSource;

/// BOM 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum BomError {
    #[error("無效的價格模型: {0}")]
    InvalidPricingModel(String),

    #[error("參數驗證失敗 ({field}): {message}")]
    Validation { field: String, message: String },

    #[error("找不到 BOM: {0}")]
    BomNotFound(i64),

    #[error("設定檔錯誤: {0}")]
    Config(String),

    #[error("讀取明細失敗: {0}")]
    Source(String),
}

impl BomError {
    /// 建立欄位驗證錯誤
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BomError>;
