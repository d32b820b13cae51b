//! 計價流程：從明細來源讀取快照並計價

use bom_core::{LineItemSource, ProjectParams};
use bom_pricing::{PricedBom, PricingCalculator};

/// 讀取 BOM 明細並依專案參數計價
///
/// 參數先驗證（拒絕負數），明細於計價前即時讀取。
pub fn price_bom(source: &impl LineItemSource, bom_id: i64, params: ProjectParams) -> bom_core::Result<PricedBom> {
    params.validate()?;

    let records = source.fetch_line_items(bom_id)?;
    let priced = PricingCalculator::new(params).price(&records);

    for warning in &priced.warnings {
        tracing::debug!("明細 {} ({}): {}", warning.item_id, warning.part_number, warning.message);
    }
    tracing::info!("BOM {} 計價完成：{} 筆，合計 {}", bom_id, priced.len(), priced.total);
    Ok(priced)
}
