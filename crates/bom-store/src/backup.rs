//! 資料庫備份

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreResult;

/// 將資料庫檔案複製到備份目錄
///
/// 檔名為 `{stem}.backup-{YYYYmmdd-HHMMSS}{.ext}`。資料庫檔案不存在時返回 `None`。
pub fn backup_database(db_path: &Path, backup_dir: &Path) -> StoreResult<Option<PathBuf>> {
    if !db_path.exists() {
        tracing::debug!("資料庫不存在，略過備份: {}", db_path.display());
        return Ok(None);
    }

    fs::create_dir_all(backup_dir)?;
    let target = backup_dir.join(backup_file_name(db_path, &Local::now().format("%Y%m%d-%H%M%S").to_string()));
    fs::copy(db_path, &target)?;

    tracing::info!("已備份資料庫: {}", target.display());
    Ok(Some(target))
}

fn backup_file_name(db_path: &Path, stamp: &str) -> String {
    let stem = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "database".to_string());
    match db_path.extension() {
        Some(ext) => format!("{}.backup-{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}.backup-{}", stem, stamp),
    }
}
