//! 專案計價參數

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BomError, Result};

/// 專案層級的計價參數
///
/// 各欄位為 0 表示「未指定」。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParams {
    /// 對象容量（kWh）
    pub capacity_kwh: Decimal,

    /// 合約年數
    pub years: Decimal,

    /// kWh 單價暫時覆寫（0 表示使用各部品自身單價）
    pub rate_override_kwh: Decimal,
}

impl ProjectParams {
    /// 創建未指定任何參數的設定
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置對象容量
    pub fn with_capacity_kwh(mut self, capacity_kwh: Decimal) -> Self {
        self.capacity_kwh = capacity_kwh;
        self
    }

    /// 建構器模式：設置合約年數
    pub fn with_years(mut self, years: Decimal) -> Self {
        self.years = years;
        self
    }

    /// 建構器模式：設置 kWh 單價覆寫
    pub fn with_rate_override(mut self, rate: Decimal) -> Self {
        self.rate_override_kwh = rate;
        self
    }

    /// 是否指定了容量
    pub fn has_capacity(&self) -> bool {
        self.capacity_kwh > Decimal::ZERO
    }

    /// 是否指定了年數
    pub fn has_years(&self) -> bool {
        self.years > Decimal::ZERO
    }

    /// 取得有效的覆寫單價
    pub fn rate_override(&self) -> Option<Decimal> {
        (self.rate_override_kwh > Decimal::ZERO).then_some(self.rate_override_kwh)
    }

    /// 驗證參數皆非負
    ///
    /// 計價引擎本身不做此檢查，呼叫端應在計價前驗證。
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("capacityKWh", self.capacity_kwh),
            ("years", self.years),
            ("rateOverrideKWh", self.rate_override_kwh),
        ];
        for (field, value) in fields {
            if value < Decimal::ZERO {
                return Err(BomError::validation(field, format!("不可為負數: {}", value)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_unspecified() {
        let params = ProjectParams::new();
        assert!(!params.has_capacity());
        assert!(!params.has_years());
        assert_eq!(params.rate_override(), None);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_params_builder() {
        let params = ProjectParams::new()
            .with_capacity_kwh(Decimal::from(1000))
            .with_years(Decimal::from(3))
            .with_rate_override(Decimal::new(10, 2));

        assert!(params.has_capacity());
        assert!(params.has_years());
        assert_eq!(params.rate_override(), Some(Decimal::new(10, 2)));
    }

    #[test]
    fn test_validate_rejects_negative() {
        let params = ProjectParams::new().with_years(Decimal::from(-1));
        match params.validate() {
            Err(BomError::Validation { field, .. }) => assert_eq!(field, "years"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
