//! `bomkit part`：部品查詢、新增、刪除與分類選項

use anyhow::Result;
use bom_core::NewPart;
use bom_store::PartFilter;
use clap::Subcommand;
use rust_decimal::Decimal;

use crate::cli::table::parts_table;
use crate::cli::AppContext;

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// 查詢部品
    List(ListArgs),

    /// 新增部品
    Add(AddArgs),

    /// 刪除部品（引用此部品的明細一併刪除）
    Delete {
        /// 部品ID
        id: i64,
    },

    /// 列出第一/第二分類選項
    Categories {
        /// 關鍵字
        #[arg(long, short = 'q')]
        query: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// 關鍵字（不分大小寫，比對文字欄位）
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// 第一分類（可重複）
    #[arg(long = "category1", value_name = "CATEGORY")]
    pub category1: Vec<String>,

    /// 第二分類（可重複）
    #[arg(long = "category2", value_name = "CATEGORY")]
    pub category2: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// 品號
    pub part_no: String,

    /// 品名/規格
    #[arg(default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub manufacturer: String,

    #[arg(long, default_value = "")]
    pub category: String,

    #[arg(long, default_value = "")]
    pub category1: String,

    #[arg(long, default_value = "")]
    pub category2: String,

    /// 單位（預設取設定檔）
    #[arg(long)]
    pub unit: Option<String>,

    /// 價格模型 fixed / per_kwh / per_year
    #[arg(long, default_value = "fixed")]
    pub pricing_model: String,

    /// 固定單價
    #[arg(long)]
    pub price: Option<Decimal>,

    /// kWh 單價
    #[arg(long)]
    pub per_kwh: Option<Decimal>,

    /// 年單價
    #[arg(long)]
    pub per_year: Option<Decimal>,

    /// 參考容量 (kWh)
    #[arg(long)]
    pub ref_capacity: Option<Decimal>,

    #[arg(long, default_value = "")]
    pub notes: String,
}

impl AddArgs {
    fn to_new_part(&self, default_unit: &str) -> NewPart {
        let mut part = NewPart::new(self.part_no.trim(), self.description.trim())
            .with_manufacturer(self.manufacturer.trim())
            .with_category(self.category.trim())
            .with_categories(self.category1.trim(), self.category2.trim())
            .with_unit(self.unit.as_deref().unwrap_or(default_unit).trim())
            .with_pricing_model(self.pricing_model.trim().to_lowercase())
            .with_notes(self.notes.trim());
        part.unit_price = self.price;
        part.unit_price_per_kwh = self.per_kwh;
        part.unit_price_per_year = self.per_year;
        match self.ref_capacity {
            Some(capacity) => part.with_ref_capacity(capacity),
            None => part,
        }
    }
}

pub fn run(cmd: PartCommands, ctx: &AppContext) -> Result<()> {
    match cmd {
        PartCommands::List(args) => run_list(args, ctx),
        PartCommands::Add(args) => run_add(args, ctx),
        PartCommands::Delete { id } => run_delete(id, ctx),
        PartCommands::Categories { query } => run_categories(query, ctx),
    }
}

fn run_list(args: ListArgs, ctx: &AppContext) -> Result<()> {
    let store = ctx.open_store()?;
    let mut filter = PartFilter::new()
        .with_category1(args.category1)
        .with_category2(args.category2);
    if let Some(query) = args.query {
        filter = filter.with_query(query);
    }

    let parts = store.search_parts(&filter)?;
    println!("{}", parts_table(&parts));
    println!("\n{} 筆", parts.len());
    Ok(())
}

fn run_add(args: AddArgs, ctx: &AppContext) -> Result<()> {
    let part = args.to_new_part(&ctx.config.default_unit);
    let mut store = ctx.open_store()?;
    ctx.before_write()?;
    let id = store.add_part(&part, ctx.allow_write)?;
    println!("已新增部品 {} (id={})", part.part_number, id);
    Ok(())
}

fn run_delete(id: i64, ctx: &AppContext) -> Result<()> {
    let mut store = ctx.open_store()?;
    ctx.before_write()?;
    store.delete_part(id, ctx.allow_write)?;
    println!("已刪除部品 id={}", id);
    Ok(())
}

fn run_categories(query: Option<String>, ctx: &AppContext) -> Result<()> {
    let store = ctx.open_store()?;
    let options = store.category_options(query.as_deref())?;
    println!("category1: {}", options.category1.join(", "));
    println!("category2: {}", options.category2.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bom_core::PricingModel;

    #[test]
    fn test_add_args_to_new_part() {
        let args = AddArgs {
            part_no: " SGCS-E30 ".to_string(),
            description: "EMS element".to_string(),
            manufacturer: String::new(),
            category: String::new(),
            category1: "EMS".to_string(),
            category2: "Software".to_string(),
            unit: None,
            pricing_model: "PER_KWH".to_string(),
            price: None,
            per_kwh: Some(Decimal::new(5, 2)),
            per_year: None,
            ref_capacity: Some(Decimal::from(1000)),
            notes: String::new(),
        };
        let part = args.to_new_part("set");

        assert_eq!(part.part_number, "SGCS-E30");
        assert_eq!(part.unit, "set");
        assert_eq!(part.pricing_model.parse::<PricingModel>().unwrap(), PricingModel::PerKwh);
        assert_eq!(part.unit_price_per_kwh, Some(Decimal::new(5, 2)));
        assert_eq!(part.ref_capacity_kwh, Some(Decimal::from(1000)));
    }
}
