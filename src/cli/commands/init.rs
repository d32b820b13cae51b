//! `bomkit init`：建立資料表，目錄為空時載入主檔

use anyhow::{Context, Result};
use bom_io::{find_master_file, read_candidates, ColumnMapping};
use std::path::PathBuf;

use crate::cli::AppContext;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// 尋找主檔的目錄
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let mut store = ctx.open_store()?;
    let count = store.count_parts()?;
    println!("資料庫: {}（部品 {} 筆）", ctx.config.database_path.display(), count);

    if count > 0 {
        return Ok(());
    }

    let Some(master) = find_master_file(&args.dir, &ctx.config.master_candidates) else {
        println!("未找到主檔（{}），目錄保持空白", ctx.config.master_candidates.join(", "));
        return Ok(());
    };

    let batch = read_candidates(&master, &ColumnMapping::new(), &ctx.config.default_unit)
        .with_context(|| format!("無法讀取主檔 {}", master.display()))?;
    println!("主檔 {}：候選 {} 筆", master.display(), batch.len());

    if !ctx.allow_write {
        println!("未指定 --allow-write，未寫入");
        return Ok(());
    }

    ctx.before_write()?;
    let report = store.insert_parts(&batch.parts, ctx.allow_write)?;
    println!("已載入 {} 筆（重複略過 {} 筆）", report.inserted(), report.duplicates);
    Ok(())
}
