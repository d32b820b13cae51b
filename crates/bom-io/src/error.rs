//! 匯入/匯出錯誤類型

use thiserror::Error;

/// 匯入錯誤類型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 檔案 =====
    #[error("檔案不存在: {0}")]
    FileNotFound(String),

    #[error("不支援的檔案格式: {0}（僅支援 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("檔案讀取失敗: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Excel 解析失敗: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失敗: {0}")]
    CsvParseError(#[from] csv::Error),

    // ===== 欄位對應 =====
    #[error("未知的欄位名稱: {0}")]
    UnknownField(String),

    #[error("欄位對應格式錯誤: {0}（應為 field=header）")]
    InvalidMapping(String),

    #[error("找不到欄位 {field} 對應的表頭: {header}")]
    MissingColumn { field: String, header: String },
}

/// 匯出錯誤類型
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("輸出失敗: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 寫入失敗: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel 寫入失敗: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("不支援的匯出格式: {0}")]
    UnsupportedFormat(String),
}

pub type ImportResult<T> = Result<T, ImportError>;
pub type ExportResult<T> = Result<T, ExportError>;
