//! `bomkit bom`：BOM 建立、明細編輯、計價顯示與匯出

use anyhow::{Context, Result};
use bom_core::ProjectParams;
use bom_io::{export_file_name, write_export, ExportFormat};
use clap::{Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::cli::table::{boms_table, priced_table};
use crate::cli::AppContext;
use crate::service::price_bom;

#[derive(Subcommand, Debug)]
pub enum BomCommands {
    /// 建立 BOM
    Create {
        /// 名稱
        name: String,
    },

    /// 列出 BOM（新建者在前）
    List,

    /// 將部品加入 BOM
    Add {
        /// BOM ID
        bom_id: i64,

        /// 部品ID（可多個）
        #[arg(required = true)]
        part_ids: Vec<i64>,

        /// 數量
        #[arg(long, default_value = "1")]
        qty: Decimal,
    },

    /// 更新明細數量
    SetQty {
        /// 明細ID
        item_id: i64,

        /// 數量
        qty: Decimal,
    },

    /// 設定明細替代文字（省略則清除）
    SetText {
        /// 明細ID
        item_id: i64,

        /// 替代文字
        text: Option<String>,
    },

    /// 移除明細
    Remove {
        /// 明細ID
        item_id: i64,
    },

    /// 計價並顯示
    Show {
        /// BOM ID
        bom_id: i64,

        #[command(flatten)]
        pricing: PricingArgs,

        /// 輸出格式
        #[arg(long, value_enum, default_value_t = ShowFormat::Table)]
        format: ShowFormat,
    },

    /// 計價並匯出 CSV/TSV/Excel
    Export {
        /// BOM ID
        bom_id: i64,

        #[command(flatten)]
        pricing: PricingArgs,

        /// 匯出格式
        #[arg(long, value_enum, default_value_t = ExportFormatArg::Csv)]
        format: ExportFormatArg,

        /// 輸出檔案（預設 bom_{id}.{ext}）
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

/// 專案參數
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PricingArgs {
    /// 專案容量 (kWh)
    #[arg(long, default_value = "0")]
    pub capacity_kwh: Decimal,

    /// 年數
    #[arg(long, default_value = "0")]
    pub years: Decimal,

    /// kWh 單價覆寫（0 表示不覆寫）
    #[arg(long, default_value = "0")]
    pub rate_override: Decimal,
}

impl PricingArgs {
    pub fn params(&self) -> ProjectParams {
        ProjectParams::new()
            .with_capacity_kwh(self.capacity_kwh)
            .with_years(self.years)
            .with_rate_override(self.rate_override)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    Csv,
    Tsv,
    Xlsx,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Csv => ExportFormat::Csv,
            ExportFormatArg::Tsv => ExportFormat::Tsv,
            ExportFormatArg::Xlsx => ExportFormat::Xlsx,
        }
    }
}

pub fn run(cmd: BomCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        BomCommands::Create { name } => {
            let mut store = ctx.open_store()?;
            ctx.before_write()?;
            let bom = store.create_bom(&name, ctx.allow_write)?;
            println!("已建立 BOM {} (id={})", bom.name, bom.id);
        }
        BomCommands::List => {
            let store = ctx.open_store()?;
            println!("{}", boms_table(&store.list_boms()?));
        }
        BomCommands::Add { bom_id, part_ids, qty } => {
            let mut store = ctx.open_store()?;
            ctx.before_write()?;
            let items = store.add_items(bom_id, &part_ids, qty, ctx.allow_write)?;
            println!("已加入 {} 筆明細: {:?}", items.len(), items);
        }
        BomCommands::SetQty { item_id, qty } => {
            let mut store = ctx.open_store()?;
            ctx.before_write()?;
            store.update_quantity(item_id, qty, ctx.allow_write)?;
            println!("明細 {} 數量 = {}", item_id, qty);
        }
        BomCommands::SetText { item_id, text } => {
            let mut store = ctx.open_store()?;
            ctx.before_write()?;
            store.set_alt_text(item_id, text.as_deref(), ctx.allow_write)?;
            println!("明細 {} 替代文字已更新", item_id);
        }
        BomCommands::Remove { item_id } => {
            let mut store = ctx.open_store()?;
            ctx.before_write()?;
            store.remove_item(item_id, ctx.allow_write)?;
            println!("已移除明細 {}", item_id);
        }
        BomCommands::Show { bom_id, pricing, format } => run_show(bom_id, &pricing, format, ctx)?,
        BomCommands::Export {
            bom_id,
            pricing,
            format,
            output,
        } => run_export(bom_id, &pricing, format.into(), output, ctx)?,
    }
    Ok(())
}

fn run_show(bom_id: i64, pricing: &PricingArgs, format: ShowFormat, ctx: &AppContext) -> Result<()> {
    let store = ctx.open_store()?;
    let priced = price_bom(&store, bom_id, pricing.params())?;

    match format {
        ShowFormat::Table => {
            if priced.is_empty() {
                println!("BOM {} 沒有明細", bom_id);
            }
            println!("{}", priced_table(&priced, &ctx.config.export.total_label));
        }
        ShowFormat::Json => println!("{}", serde_json::to_string_pretty(&priced)?),
    }
    Ok(())
}

fn run_export(
    bom_id: i64,
    pricing: &PricingArgs,
    format: ExportFormat,
    output: Option<PathBuf>,
    ctx: &AppContext,
) -> Result<()> {
    let store = ctx.open_store()?;
    let priced = price_bom(&store, bom_id, pricing.params())?;

    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(bom_id, format)));
    write_export(&path, &priced, &ctx.config.export, format)
        .with_context(|| format!("無法寫出 {}", path.display()))?;

    println!("已匯出 {} 筆明細至 {}（合計 {}）", priced.len(), path.display(), priced.total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_args_to_params() {
        let args = PricingArgs {
            capacity_kwh: Decimal::from(1000),
            years: Decimal::ZERO,
            rate_override: Decimal::new(10, 2),
        };
        let params = args.params();
        assert!(params.has_capacity());
        assert!(!params.has_years());
        assert_eq!(params.rate_override(), Some(Decimal::new(10, 2)));
        assert_eq!(PricingArgs::default().params(), ProjectParams::default());
    }

    #[test]
    fn test_export_format_arg() {
        assert_eq!(ExportFormat::from(ExportFormatArg::Tsv), ExportFormat::Tsv);
        assert_eq!(ExportFormat::from(ExportFormatArg::Xlsx), ExportFormat::Xlsx);
    }
}
