//! BOM 匯出（CSV / TSV / Excel）

use bom_core::ExportConfig;
use bom_pricing::{PricedBom, PricedLine};
use csv::WriterBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{ExportError, ExportResult};

/// 匯出欄位
pub const EXPORT_HEADERS: [&str; 9] = [
    "partNo",
    "description",
    "category1",
    "category2",
    "unit",
    "unitPrice",
    "qty",
    "amount",
    "notes",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Excel 匯出的工作表名稱
pub const XLSX_SHEET_NAME: &str = "BOM";

/// 合計列的標籤欄（unitPrice）與金額欄（amount）
const TOTAL_LABEL_COL: usize = 5;
const TOTAL_AMOUNT_COL: usize = 7;

/// 匯出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Xlsx,
}

impl ExportFormat {
    /// 分隔字元；Excel 無
    pub fn delimiter(self) -> Option<u8> {
        match self {
            ExportFormat::Csv => Some(b','),
            ExportFormat::Tsv => Some(b'\t'),
            ExportFormat::Xlsx => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// 匯出列
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub part_number: String,

    /// 品名（替代文字優先）
    pub description: String,

    pub category1: String,
    pub category2: String,
    pub unit: String,

    /// 顯示單價
    pub unit_price: Option<Decimal>,

    pub quantity: Decimal,
    pub amount: Decimal,
    pub notes: String,
}

impl ExportRow {
    pub fn from_line(line: &PricedLine) -> Self {
        let record = &line.record;
        Self {
            part_number: record.part_number.clone(),
            description: record.display_description().to_string(),
            category1: record.category1.clone(),
            category2: record.category2.clone(),
            unit: record.unit.clone(),
            unit_price: line.display_unit_price,
            quantity: record.quantity,
            amount: line.amount,
            notes: record.notes.clone(),
        }
    }

    fn to_record(&self) -> [String; 9] {
        [
            self.part_number.clone(),
            self.description.clone(),
            self.category1.clone(),
            self.category2.clone(),
            self.unit.clone(),
            self.unit_price.map(|p| p.to_string()).unwrap_or_default(),
            self.quantity.normalize().to_string(),
            self.amount.to_string(),
            self.notes.clone(),
        ]
    }
}

/// 依明細順序建立匯出列
pub fn export_rows(priced: &PricedBom) -> Vec<ExportRow> {
    priced.lines.iter().map(ExportRow::from_line).collect()
}

/// 寫出分隔文字檔
///
/// 明細之後依設定加上一列空白與合計列（標籤在單價欄、合計在金額欄）。
pub fn write_delimited<W: Write>(
    mut writer: W,
    priced: &PricedBom,
    config: &ExportConfig,
    format: ExportFormat,
) -> ExportResult<()> {
    let delimiter = format
        .delimiter()
        .ok_or_else(|| ExportError::UnsupportedFormat(format.to_string()))?;

    if config.utf8_bom {
        writer.write_all(UTF8_BOM)?;
    }

    let mut out = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    out.write_record(EXPORT_HEADERS)?;
    for row in export_rows(priced) {
        out.write_record(row.to_record())?;
    }

    if config.include_total_row {
        out.write_record([""; 9])?;
        let mut total_row: [String; 9] = Default::default();
        total_row[TOTAL_LABEL_COL] = config.total_label.clone();
        total_row[TOTAL_AMOUNT_COL] = priced.total.to_string();
        out.write_record(&total_row)?;
    }

    out.flush()?;
    tracing::debug!("匯出 {} 筆明細 ({})", priced.len(), format);
    Ok(())
}

/// 寫出 Excel 活頁簿
///
/// 單一工作表 `BOM`：第 0 列表頭、明細自第 1 列起。
/// 合計列位於明細後隔一列空白（第 len + 2 列），UTF-8 BOM 設定不適用。
/// 單價、數量與金額寫為數值，缺值單價留空。
pub fn write_xlsx(path: impl AsRef<Path>, priced: &PricedBom, config: &ExportConfig) -> ExportResult<()> {
    let path = path.as_ref();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET_NAME)?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    let rows = export_rows(priced);
    for (index, row) in rows.iter().enumerate() {
        write_xlsx_row(sheet, index as u32 + 1, row)?;
    }

    if config.include_total_row {
        let total_row = rows.len() as u32 + 2;
        sheet.write_string(total_row, TOTAL_LABEL_COL as u16, config.total_label.as_str())?;
        write_decimal(sheet, total_row, TOTAL_AMOUNT_COL as u16, priced.total)?;
    }

    workbook.save(path)?;
    tracing::debug!("匯出 {} 筆明細至 {}", priced.len(), path.display());
    Ok(())
}

fn write_xlsx_row(sheet: &mut Worksheet, row: u32, values: &ExportRow) -> ExportResult<()> {
    let texts = [
        (0, &values.part_number),
        (1, &values.description),
        (2, &values.category1),
        (3, &values.category2),
        (4, &values.unit),
        (8, &values.notes),
    ];
    for (col, text) in texts {
        if !text.is_empty() {
            sheet.write_string(row, col, text.as_str())?;
        }
    }

    if let Some(price) = values.unit_price {
        write_decimal(sheet, row, 5, price)?;
    }
    write_decimal(sheet, row, 6, values.quantity)?;
    write_decimal(sheet, row, 7, values.amount)?;
    Ok(())
}

/// 可轉為 f64 者寫為數值，否則以文字保留原值
fn write_decimal(sheet: &mut Worksheet, row: u32, col: u16, value: Decimal) -> ExportResult<()> {
    match value.to_f64() {
        Some(number) => sheet.write_number(row, col, number)?,
        None => sheet.write_string(row, col, value.to_string())?,
    };
    Ok(())
}

/// 依格式寫出至檔案
pub fn write_export(
    path: impl AsRef<Path>,
    priced: &PricedBom,
    config: &ExportConfig,
    format: ExportFormat,
) -> ExportResult<()> {
    match format {
        ExportFormat::Xlsx => write_xlsx(path, priced, config),
        ExportFormat::Csv | ExportFormat::Tsv => {
            let file = File::create(path.as_ref())?;
            write_delimited(BufWriter::new(file), priced, config, format)
        }
    }
}

/// 匯出檔名
pub fn export_file_name(bom_id: i64, format: ExportFormat) -> String {
    format!("bom_{}.{}", bom_id, format.extension())
}
