//! BOM 與明細模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::part::PricingModel;

/// 物料清單（BOM）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bom {
    /// BOM ID（由目錄指派）
    pub id: i64,

    /// 名稱
    pub name: String,

    /// 建立時間
    pub created_at: DateTime<Utc>,
}

impl Bom {
    /// 建立時間（毫秒時間戳，資料庫儲存格式）
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

/// BOM 明細（僅引用部品，不複製部品資料）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomLineItem {
    /// 明細ID
    pub id: i64,

    /// 所屬 BOM
    pub bom_id: i64,

    /// 引用部品
    pub part_id: i64,

    /// 數量
    pub quantity: Decimal,

    /// 替代文字
    pub alt_text: Option<String>,
}

/// 明細與部品欄位合併後的紀錄（計價引擎輸入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    /// 明細ID
    pub item_id: i64,

    /// 所屬 BOM
    pub bom_id: i64,

    /// 引用部品
    pub part_id: i64,

    /// 品號
    pub part_number: String,

    /// 品名/規格
    pub description: String,

    /// 製造商
    pub manufacturer: String,

    /// 分類
    pub category: String,

    /// 第一分類
    pub category1: String,

    /// 第二分類
    pub category2: String,

    /// 單位
    pub unit: String,

    /// 價格模型原始字串
    pub pricing_model: String,

    /// 固定單價
    pub unit_price: Option<Decimal>,

    /// kWh 單價
    pub unit_price_per_kwh: Option<Decimal>,

    /// 年單價
    pub unit_price_per_year: Option<Decimal>,

    /// 參考容量
    pub ref_capacity_kwh: Option<Decimal>,

    /// 數量
    pub quantity: Decimal,

    /// 替代文字
    pub alt_text: Option<String>,

    /// 備註
    pub notes: String,
}

impl LineItemRecord {
    /// 創建新的明細紀錄（固定價格、數量 1）
    pub fn new(item_id: i64, part_number: impl Into<String>) -> Self {
        Self {
            item_id,
            bom_id: 0,
            part_id: 0,
            part_number: part_number.into(),
            description: String::new(),
            manufacturer: String::new(),
            category: String::new(),
            category1: String::new(),
            category2: String::new(),
            unit: crate::part::DEFAULT_UNIT.to_string(),
            pricing_model: PricingModel::Fixed.as_str().to_string(),
            unit_price: None,
            unit_price_per_kwh: None,
            unit_price_per_year: None,
            ref_capacity_kwh: None,
            quantity: Decimal::ONE,
            alt_text: None,
            notes: String::new(),
        }
    }

    /// 建構器模式：設置價格模型字串
    pub fn with_pricing_model(mut self, model: impl Into<String>) -> Self {
        self.pricing_model = model.into();
        self
    }

    /// 建構器模式：設置固定單價
    pub fn with_unit_price(mut self, price: Decimal) -> Self {
        self.unit_price = Some(price);
        self
    }

    /// 建構器模式：設置 kWh 單價
    pub fn with_price_per_kwh(mut self, rate: Decimal) -> Self {
        self.unit_price_per_kwh = Some(rate);
        self
    }

    /// 建構器模式：設置年單價
    pub fn with_price_per_year(mut self, rate: Decimal) -> Self {
        self.unit_price_per_year = Some(rate);
        self
    }

    /// 建構器模式：設置數量
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// 建構器模式：設置品名
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 匯出時顯示的品名（替代文字優先）
    pub fn display_description(&self) -> &str {
        match self.alt_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => &self.description,
        }
    }
}
