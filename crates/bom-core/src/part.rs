//! 部品模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{BomError, Result};

/// 預設單位
pub const DEFAULT_UNIT: &str = "set";

/// 價格模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    /// 固定單價
    #[default]
    Fixed,
    /// 按容量計價（kWh 單價 × 專案容量）
    PerKwh,
    /// 按年計價（年單價 × 合約年數）
    PerYear,
}

impl PricingModel {
    /// 資料庫/匯出使用的字串
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::Fixed => "fixed",
            PricingModel::PerKwh => "per_kwh",
            PricingModel::PerYear => "per_year",
        }
    }

    /// 寬鬆解析：空字串視為預設值 `fixed`，其餘無法辨識者回傳 None
    ///
    /// 前後空白一律忽略，`"per_kwh "` 與 `"per_kwh"` 同樣以 kWh 計價。
    pub fn resolve(raw: &str) -> Option<Self> {
        // 帶空白的模型名不會退回 fixed
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Some(PricingModel::Fixed);
        }
        trimmed.parse().ok()
    }
}

impl FromStr for PricingModel {
    type Err = BomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(PricingModel::Fixed),
            "per_kwh" => Ok(PricingModel::PerKwh),
            "per_year" => Ok(PricingModel::PerYear),
            _ => Err(BomError::InvalidPricingModel(s.to_string())),
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 新增部品（尚未寫入目錄，亦作為匯入候選）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPart {
    /// 品號（必填）
    pub part_number: String,

    /// 品名/規格
    pub description: String,

    /// 製造商
    pub manufacturer: String,

    /// 分類（自由文字）
    pub category: String,

    /// 第一分類（篩選用）
    pub category1: String,

    /// 第二分類（篩選用）
    pub category2: String,

    /// 單位
    pub unit: String,

    /// 價格模型（保留原始字串，由計價引擎判讀）
    pub pricing_model: String,

    /// 固定單價
    pub unit_price: Option<Decimal>,

    /// kWh 單價
    pub unit_price_per_kwh: Option<Decimal>,

    /// 年單價
    pub unit_price_per_year: Option<Decimal>,

    /// 參考容量（目前不參與計算）
    pub ref_capacity_kwh: Option<Decimal>,

    /// 備註
    pub notes: String,
}

impl NewPart {
    /// 創建新的部品（固定價格模型、預設單位）
    pub fn new(part_number: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            part_number: part_number.into(),
            description: description.into(),
            manufacturer: String::new(),
            category: String::new(),
            category1: String::new(),
            category2: String::new(),
            unit: DEFAULT_UNIT.to_string(),
            pricing_model: PricingModel::Fixed.as_str().to_string(),
            unit_price: None,
            unit_price_per_kwh: None,
            unit_price_per_year: None,
            ref_capacity_kwh: None,
            notes: String::new(),
        }
    }

    /// 建構器模式：設置製造商
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    /// 建構器模式：設置分類
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// 建構器模式：設置第一/第二分類
    pub fn with_categories(mut self, category1: impl Into<String>, category2: impl Into<String>) -> Self {
        self.category1 = category1.into();
        self.category2 = category2.into();
        self
    }

    /// 建構器模式：設置單位
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// 建構器模式：固定單價
    pub fn with_unit_price(mut self, price: Decimal) -> Self {
        self.pricing_model = PricingModel::Fixed.as_str().to_string();
        self.unit_price = Some(price);
        self
    }

    /// 建構器模式：kWh 單價（同時切換價格模型）
    pub fn with_price_per_kwh(mut self, rate: Decimal) -> Self {
        self.pricing_model = PricingModel::PerKwh.as_str().to_string();
        self.unit_price_per_kwh = Some(rate);
        self
    }

    /// 建構器模式：年單價（同時切換價格模型）
    pub fn with_price_per_year(mut self, rate: Decimal) -> Self {
        self.pricing_model = PricingModel::PerYear.as_str().to_string();
        self.unit_price_per_year = Some(rate);
        self
    }

    /// 建構器模式：直接設置價格模型字串
    pub fn with_pricing_model(mut self, model: impl Into<String>) -> Self {
        self.pricing_model = model.into();
        self
    }

    /// 建構器模式：設置參考容量
    pub fn with_ref_capacity(mut self, capacity_kwh: Decimal) -> Self {
        self.ref_capacity_kwh = Some(capacity_kwh);
        self
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// 去重鍵：(品號, 品名) 小寫
    pub fn dedup_key(&self) -> (String, String) {
        dedup_key(&self.part_number, &self.description)
    }

    /// 驗證必填欄位與數值
    pub fn validate(&self) -> Result<()> {
        if self.part_number.trim().is_empty() {
            return Err(BomError::validation("partNo", "品號為必填"));
        }

        let prices = [
            ("unitPrice", self.unit_price),
            ("unitPricePerKWh", self.unit_price_per_kwh),
            ("unitPricePerYear", self.unit_price_per_year),
        ];
        for (field, value) in prices {
            if matches!(value, Some(v) if v < Decimal::ZERO) {
                return Err(BomError::validation(field, "單價不可為負數"));
            }
        }

        Ok(())
    }
}

/// 目錄中的部品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// 部品ID（由目錄指派）
    pub id: i64,

    #[serde(flatten)]
    pub fields: NewPart,
}

impl Part {
    /// 解析價格模型（無法辨識者視為固定）
    pub fn pricing_model(&self) -> PricingModel {
        PricingModel::resolve(&self.fields.pricing_model).unwrap_or_default()
    }
}

/// 計算去重鍵（去除前後空白後小寫，與寫入時的正規化一致）
pub fn dedup_key(part_number: &str, description: &str) -> (String, String) {
    (
        part_number.trim().to_lowercase(),
        description.trim().to_lowercase(),
    )
}
