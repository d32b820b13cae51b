//! 指令執行環境：設定、寫入許可與目錄開啟

use anyhow::{Context, Result};
use bom_core::AppConfig;
use bom_store::{backup_database, CatalogStore};
use std::path::PathBuf;

use crate::cli::GlobalOpts;

/// 單次指令的執行環境
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub allow_write: bool,
}

impl AppContext {
    /// 讀取設定檔並套用命令列覆寫
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let mut config = AppConfig::load_or_default(&global.config)
            .with_context(|| format!("無法讀取設定檔 {}", global.config.display()))?;
        if let Some(db) = &global.db {
            config = config.with_database_path(db.clone());
        }
        Ok(Self::new(config, global.allow_write))
    }

    pub fn new(config: AppConfig, allow_write: bool) -> Self {
        Self { config, allow_write }
    }

    /// 開啟目錄資料庫
    pub fn open_store(&self) -> Result<CatalogStore> {
        let path = &self.config.database_path;
        CatalogStore::open(path).with_context(|| format!("無法開啟資料庫 {}", path.display()))
    }

    /// 寫入前的準備：允許寫入且設定啟用時先備份
    ///
    /// 未允許寫入時不備份，後續寫入會由目錄拒絕。
    pub fn before_write(&self) -> Result<Option<PathBuf>> {
        if !self.allow_write || !self.config.backup_before_write {
            return Ok(None);
        }
        let backup = backup_database(&self.config.database_path, &self.config.backup_dir)
            .context("寫入前備份失敗")?;
        if let Some(path) = &backup {
            eprintln!("已備份: {}", path.display());
        }
        Ok(backup)
    }

    /// 立即備份
    pub fn backup_now(&self) -> Result<Option<PathBuf>> {
        backup_database(&self.config.database_path, &self.config.backup_dir).context("備份失敗")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &std::path::Path, allow_write: bool) -> AppContext {
        let config = AppConfig::default()
            .with_database_path(dir.join("parts_bom.db"))
            .with_backup_dir(dir.join("_db_backups"));
        AppContext::new(config, allow_write)
    }

    #[test]
    fn test_before_write_backs_up_existing_db() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), true);
        assert!(ctx.before_write().unwrap().is_none());

        drop(ctx.open_store().unwrap());
        let backup = ctx.before_write().unwrap().unwrap();
        assert!(backup.exists());
    }

    #[test]
    fn test_before_write_skipped_without_permission() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), false);
        drop(ctx.open_store().unwrap());
        assert!(ctx.before_write().unwrap().is_none());
        assert!(!dir.path().join("_db_backups").exists());
    }
}
