//! `bomkit backup`

use anyhow::Result;

use crate::cli::AppContext;

pub fn run(ctx: &AppContext) -> Result<()> {
    match ctx.backup_now()? {
        Some(path) => println!("已備份: {}", path.display()),
        None => println!("資料庫不存在，未備份: {}", ctx.config.database_path.display()),
    }
    Ok(())
}
