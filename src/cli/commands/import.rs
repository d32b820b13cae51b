//! `bomkit import`：預覽或寫入匯入候選

use anyhow::{bail, Context, Result};
use bom_io::{read_candidates, ColumnMapping};
use std::path::PathBuf;

use crate::cli::table::parts_table;
use crate::cli::AppContext;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// 來源檔（.csv / .xlsx / .xls）
    pub file: PathBuf,

    /// 欄位對應 field=header（可重複）
    #[arg(long = "map", value_name = "FIELD=HEADER")]
    pub mappings: Vec<String>,

    /// 確認寫入（需同時指定 --allow-write）
    #[arg(long)]
    pub commit: bool,
}

pub fn run(args: ImportArgs, ctx: &AppContext) -> Result<()> {
    let mapping = ColumnMapping::from_pairs(&args.mappings)?;
    let batch = read_candidates(&args.file, &mapping, &ctx.config.default_unit)
        .with_context(|| format!("無法讀取 {}", args.file.display()))?;

    let preview: Vec<_> = batch
        .parts
        .iter()
        .cloned()
        .map(|fields| bom_core::Part { id: 0, fields })
        .collect();
    println!("{}", parts_table(&preview));
    println!(
        "\n候選 {} 筆，品號空白略過 {} 列，數值無法解析 {} 格",
        batch.len(),
        batch.skipped_rows,
        batch.invalid_number_count()
    );
    for (field, count) in &batch.invalid_numbers {
        println!("  {}: {}", field, count);
    }

    if !args.commit {
        println!("預覽模式，加上 --commit --allow-write 以寫入");
        return Ok(());
    }
    if !ctx.allow_write {
        bail!("寫入需要 --allow-write");
    }

    let mut store = ctx.open_store()?;
    ctx.before_write()?;
    let report = store.insert_parts(&batch.parts, ctx.allow_write)?;
    println!("已新增 {} 筆（重複略過 {} 筆）", report.inserted(), report.duplicates);
    Ok(())
}
