//! 計價規則判定

use bom_core::{LineItemRecord, PricingModel, ProjectParams};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::rounding::round_unit_price;

/// 實際套用的計價規則（依優先順序，先符合者勝出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingRule {
    /// kWh 單價 × 專案容量
    PerKwh,
    /// 年單價 × 合約年數
    PerYear,
    /// 直接使用固定單價
    Base,
}

/// 單價乘算超出 Decimal 可表示範圍
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceOverflow;

/// 顯示單價判定器
pub struct RateResolver;

impl RateResolver {
    /// 判定套用規則與顯示單價
    ///
    /// 1. per_kwh 且已指定容量：覆寫單價（若有）否則部品 kWh 單價，乘以容量
    /// 2. per_year 且已指定年數：年單價乘以年數
    /// 3. 其餘：固定單價原樣回傳
    ///
    /// 注意：per_kwh 部品在未指定容量時落入規則 3，通常沒有固定單價，
    /// 顯示單價因此為空、金額為 0。此行為刻意保留。
    ///
    /// 乘算溢位時返回 `Err(PriceOverflow)`，規則仍照常判定。
    pub fn resolve(
        record: &LineItemRecord,
        model: PricingModel,
        params: &ProjectParams,
    ) -> (PricingRule, Result<Option<Decimal>, PriceOverflow>) {
        match model {
            PricingModel::PerKwh if params.has_capacity() => {
                let rate = params.rate_override().or(record.unit_price_per_kwh);
                (PricingRule::PerKwh, scaled(rate, params.capacity_kwh))
            }
            PricingModel::PerYear if params.has_years() => {
                (PricingRule::PerYear, scaled(record.unit_price_per_year, params.years))
            }
            _ => (PricingRule::Base, Ok(record.unit_price)),
        }
    }
}

/// 單價 × 係數後取至小數兩位；單價缺值則維持缺值
fn scaled(rate: Option<Decimal>, factor: Decimal) -> Result<Option<Decimal>, PriceOverflow> {
    match rate {
        Some(r) => r
            .checked_mul(factor)
            .map(|v| Some(round_unit_price(v)))
            .ok_or(PriceOverflow),
        None => Ok(None),
    }
}
