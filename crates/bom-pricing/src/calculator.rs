//! BOM 主計價器

use bom_core::{LineItemRecord, PricingModel, ProjectParams};
use rust_decimal::Decimal;

use crate::rate::{PricingRule, RateResolver};
use crate::rounding::{round_amount, truncate_total};
use crate::{PricedBom, PricedLine, PricingWarning};

/// BOM 計價器
///
/// 同一批次內的所有明細共用一組專案參數（容量、年數、kWh 單價覆寫）。
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    /// 專案參數
    params: ProjectParams,
}

impl PricingCalculator {
    /// 創建新的計價器
    pub fn new(params: ProjectParams) -> Self {
        Self { params }
    }

    /// 獲取專案參數
    pub fn params(&self) -> &ProjectParams {
        &self.params
    }

    /// 主計價入口
    ///
    /// 負數數量、單價或參數不在此檢查，呼叫端須事先驗證。
    pub fn price(&self, records: &[LineItemRecord]) -> PricedBom {
        tracing::debug!(
            "開始 BOM 計價：明細 {} 筆，容量 {} kWh，年數 {}，kWh 覆寫 {}",
            records.len(),
            self.params.capacity_kwh,
            self.params.years,
            self.params.rate_override_kwh
        );

        let mut result = PricedBom::empty();
        let mut sum = Decimal::ZERO;

        for record in records {
            let model = self.resolve_model(record, &mut result);
            let (rule, resolved) = RateResolver::resolve(record, model, &self.params);

            if rule == PricingRule::Base {
                self.note_fallback(record, model, &mut result);
            }

            let priced = resolved.ok().and_then(|display| {
                let amount = Self::line_amount(display, record.quantity)?;
                let next = sum.checked_add(amount)?;
                Some((display, amount, next))
            });

            let (display_unit_price, amount) = match priced {
                Some((display, amount, next)) => {
                    sum = next;
                    (display, amount)
                }
                None => {
                    Self::note_overflow(record, &mut result);
                    (None, Decimal::ZERO)
                }
            };

            result.lines.push(PricedLine {
                record: record.clone(),
                model,
                rule,
                display_unit_price,
                amount,
            });
        }

        result.total = truncate_total(sum);

        tracing::debug!("BOM 計價完成，合計 {}", result.total);

        result
    }

    /// 金額 = 顯示單價（缺值為 0）× 數量，取整；溢位時返回 None
    pub fn line_amount(display_unit_price: Option<Decimal>, quantity: Decimal) -> Option<Decimal> {
        display_unit_price
            .unwrap_or(Decimal::ZERO)
            .checked_mul(quantity)
            .map(round_amount)
    }

    /// 單價、金額或合計溢位：該明細不計入合計
    fn note_overflow(record: &LineItemRecord, result: &mut PricedBom) {
        tracing::warn!(
            "明細 {} ({}) 計價數值溢位，金額以 0 計",
            record.item_id,
            record.part_number
        );
        result.add_warning(PricingWarning::warning(
            record,
            "計價數值超出可表示範圍，顯示單價留空、金額以 0 計".to_string(),
        ));
    }

    /// 判讀價格模型，無法辨識者視為固定並記錄警告
    fn resolve_model(&self, record: &LineItemRecord, result: &mut PricedBom) -> PricingModel {
        match PricingModel::resolve(&record.pricing_model) {
            Some(model) => model,
            None => {
                tracing::warn!(
                    "明細 {} ({}) 價格模型無法辨識: {:?}，以 fixed 計價",
                    record.item_id,
                    record.part_number,
                    record.pricing_model
                );
                result.add_warning(PricingWarning::warning(
                    record,
                    format!("無法辨識的價格模型 {:?}，以 fixed 計價", record.pricing_model),
                ));
                PricingModel::Fixed
            }
        }
    }

    /// 非固定模型因缺少專案參數而退回固定單價時，留下說明
    fn note_fallback(&self, record: &LineItemRecord, model: PricingModel, result: &mut PricedBom) {
        let message = match model {
            PricingModel::PerKwh => "未指定對象容量，per_kwh 明細以固定單價計價",
            PricingModel::PerYear => "未指定合約年數，per_year 明細以固定單價計價",
            PricingModel::Fixed => return,
        };
        result.add_warning(PricingWarning::info(record, message.to_string()));
    }
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::new(ProjectParams::default())
    }
}
