//! 應用程式設定

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::part::DEFAULT_UNIT;
use crate::{BomError, Result};

/// 預設資料庫路徑
pub const DEFAULT_DATABASE_PATH: &str = "parts_bom.db";

/// 預設備份目錄
pub const DEFAULT_BACKUP_DIR: &str = "_db_backups";

/// 預設合計列標籤
pub const DEFAULT_TOTAL_LABEL: &str = "合計";

/// 應用程式設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite 資料庫路徑
    pub database_path: PathBuf,

    /// 備份目錄
    pub backup_dir: PathBuf,

    /// 寫入前是否自動備份
    pub backup_before_write: bool,

    /// 啟動時偵測的主檔候選（依序）
    pub master_candidates: Vec<String>,

    /// 匯入時單位空白的預設值
    pub default_unit: String,

    /// 匯出設定
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            backup_before_write: true,
            master_candidates: vec![
                "parts_master.xlsx".to_string(),
                "parts_master.csv".to_string(),
            ],
            default_unit: DEFAULT_UNIT.to_string(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 字串解析
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BomError::Config(e.to_string()))
    }

    /// 從檔案讀取設定
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BomError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// 檔案存在則讀取，否則使用預設值
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 建構器模式：設置資料庫路徑
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// 建構器模式：設置備份目錄
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// 建構器模式：設置是否自動備份
    pub fn with_backup_before_write(mut self, enabled: bool) -> Self {
        self.backup_before_write = enabled;
        self
    }

    /// 建構器模式：設置匯出設定
    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }
}

/// 匯出設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// 合計列標籤
    pub total_label: String,

    /// 是否輸出合計列
    pub include_total_row: bool,

    /// 是否加上 UTF-8 BOM（相容試算表軟體）
    pub utf8_bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            total_label: DEFAULT_TOTAL_LABEL.to_string(),
            include_total_row: true,
            utf8_bom: true,
        }
    }
}

impl ExportConfig {
    /// 建構器模式：設置合計列標籤
    pub fn with_total_label(mut self, label: impl Into<String>) -> Self {
        self.total_label = label.into();
        self
    }

    /// 建構器模式：設置是否輸出合計列
    pub fn with_total_row(mut self, include: bool) -> Self {
        self.include_total_row = include;
        self
    }

    /// 建構器模式：設置是否加上 UTF-8 BOM
    pub fn with_utf8_bom(mut self, enabled: bool) -> Self {
        self.utf8_bom = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database_path, PathBuf::from("parts_bom.db"));
        assert_eq!(config.export.total_label, "合計");
        assert!(config.backup_before_write);
        assert_eq!(config.master_candidates.len(), 2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            database_path = "catalog.db"

            [export]
            total_label = "Total"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("catalog.db"));
        assert_eq!(config.backup_dir, PathBuf::from("_db_backups"));
        assert_eq!(config.export.total_label, "Total");
        assert!(config.export.include_total_row);
        assert_eq!(config.default_unit, "set");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("database_path = ["),
            Err(BomError::Config(_))
        ));
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(AppConfig::load_or_default(&missing).unwrap(), AppConfig::default());

        let path = dir.path().join("bomkit.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "backup_before_write = false").unwrap();
        let config = AppConfig::load_or_default(&path).unwrap();
        assert!(!config.backup_before_write);
    }

    #[test]
    fn test_config_builder() {
        let config = AppConfig::default()
            .with_database_path("x.db")
            .with_backup_before_write(false)
            .with_export(ExportConfig::default().with_total_label("TOTAL").with_utf8_bom(false));

        assert_eq!(config.database_path, PathBuf::from("x.db"));
        assert!(!config.backup_before_write);
        assert_eq!(config.export.total_label, "TOTAL");
        assert!(!config.export.utf8_bom);
    }
}
