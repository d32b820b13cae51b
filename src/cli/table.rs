//! 表格輸出（tabled）

use bom_core::{Bom, Part};
use bom_pricing::{PricedBom, WarningSeverity};
use rust_decimal::Decimal;
use tabled::{builder::Builder, settings::Style};

fn price_cell(value: Option<Decimal>) -> String {
    value.map(|v| v.normalize().to_string()).unwrap_or_default()
}

/// 部品清單
pub fn parts_table(parts: &[Part]) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "id",
        "partNo",
        "description",
        "category1",
        "category2",
        "unit",
        "pricingModel",
        "unitPrice",
        "perKWh",
        "perYear",
    ]);

    for part in parts {
        let f = &part.fields;
        builder.push_record([
            part.id.to_string(),
            f.part_number.clone(),
            f.description.clone(),
            f.category1.clone(),
            f.category2.clone(),
            f.unit.clone(),
            f.pricing_model.clone(),
            price_cell(f.unit_price),
            price_cell(f.unit_price_per_kwh),
            price_cell(f.unit_price_per_year),
        ]);
    }
    builder.build().with(Style::markdown()).to_string()
}

/// BOM 清單
pub fn boms_table(boms: &[Bom]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["id", "name", "createdAt"]);
    for bom in boms {
        builder.push_record([
            bom.id.to_string(),
            bom.name.clone(),
            bom.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    builder.build().with(Style::markdown()).to_string()
}

/// 計價結果（含合計與警告）
pub fn priced_table(priced: &PricedBom, total_label: &str) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "item",
        "partNo",
        "description",
        "model",
        "unitPrice",
        "qty",
        "amount",
    ]);

    for line in &priced.lines {
        let record = &line.record;
        builder.push_record([
            record.item_id.to_string(),
            record.part_number.clone(),
            record.display_description().to_string(),
            line.model.to_string(),
            line.display_unit_price.map(|p| p.to_string()).unwrap_or_default(),
            record.quantity.normalize().to_string(),
            line.amount.to_string(),
        ]);
    }

    let mut output = builder.build().with(Style::markdown()).to_string();
    output.push_str(&format!("\n\n**{}**: {}\n", total_label, priced.total));

    for warning in &priced.warnings {
        let tag = match warning.severity {
            WarningSeverity::Info => "info",
            WarningSeverity::Warning => "warning",
        };
        output.push_str(&format!(
            "[{}] item {} ({}): {}\n",
            tag, warning.item_id, warning.part_number, warning.message
        ));
    }
    output
}
