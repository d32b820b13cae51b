//! 捨入規則
//!
//! 單價取至小數兩位、金額取至整數、合計截斷為整數。
//! 皆採銀行家捨入（四捨六入五成雙），與既有匯出結果一致。

use rust_decimal::Decimal;

/// 單價小數位數
pub const UNIT_PRICE_DP: u32 = 2;

/// 金額小數位數
pub const AMOUNT_DP: u32 = 0;

/// 單價捨入
pub fn round_unit_price(value: Decimal) -> Decimal {
    value.round_dp(UNIT_PRICE_DP)
}

/// 金額捨入
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp(AMOUNT_DP)
}

/// 合計截斷為整數
pub fn truncate_total(value: Decimal) -> Decimal {
    value.trunc()
}
