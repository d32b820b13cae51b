//! # BOM IO
//!
//! 部品主檔匯入（CSV / Excel）與 BOM 匯出（CSV / TSV / Excel）。

pub mod error;
pub mod export;
pub mod import;

// Re-export 主要類型
pub use error::{ExportError, ExportResult, ImportError, ImportResult};
pub use export::{
    export_file_name, export_rows, write_delimited, write_export, write_xlsx, ExportFormat,
    ExportRow, XLSX_SHEET_NAME,
};
pub use import::{find_master_file, read_candidates, ColumnMapping, ImportBatch, RawTable};
