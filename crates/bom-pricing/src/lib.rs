//! # BOM Pricing Engine
//!
//! BOM 計價引擎：依價格模型與專案參數計算顯示單價、金額與合計。
//! 純計算，不讀寫任何持久化儲存。

pub mod calculator;
pub mod rate;
pub mod rounding;

// Re-export 主要類型
pub use calculator::PricingCalculator;
pub use rate::{PriceOverflow, PricingRule, RateResolver};

use bom_core::{LineItemRecord, PricingModel};
use rust_decimal::Decimal;
use serde::Serialize;

/// BOM 計價結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedBom {
    /// 計價後明細（與輸入順序一致）
    pub lines: Vec<PricedLine>,

    /// 合計（整數）
    pub total: Decimal,

    /// 警告信息
    pub warnings: Vec<PricingWarning>,
}

impl PricedBom {
    /// 創建空的計價結果
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total: Decimal::ZERO,
            warnings: Vec::new(),
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: PricingWarning) {
        self.warnings.push(warning);
    }

    /// 明細數量
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// 是否沒有明細
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// 單筆計價明細
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    /// 原始明細
    pub record: LineItemRecord,

    /// 判讀後的價格模型
    pub model: PricingModel,

    /// 套用的計價規則
    pub rule: PricingRule,

    /// 顯示單價（缺值保留為 None，供介面區分空白與 0）
    pub display_unit_price: Option<Decimal>,

    /// 金額（取整）
    pub amount: Decimal,
}

/// 計價警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingWarning {
    pub item_id: i64,
    pub part_number: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PricingWarning {
    pub fn new(record: &LineItemRecord, message: String, severity: WarningSeverity) -> Self {
        Self {
            item_id: record.item_id,
            part_number: record.part_number.clone(),
            message,
            severity,
        }
    }

    pub fn info(record: &LineItemRecord, message: String) -> Self {
        Self::new(record, message, WarningSeverity::Info)
    }

    pub fn warning(record: &LineItemRecord, message: String) -> Self {
        Self::new(record, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Info,
    Warning,
}
