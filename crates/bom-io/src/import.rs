//! 部品主檔匯入
//!
//! 分兩階段：先讀檔並正規化成 [`ImportBatch`] 供預覽，確認後再交給目錄寫入。
//! 表頭只做不分大小寫的完全比對，其餘對應需明確指定。

use bom_core::part::DEFAULT_UNIT;
use bom_core::{NewPart, PricingModel};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ImportError, ImportResult};

/// 可匯入的欄位名稱
pub const CANONICAL_FIELDS: [&str; 13] = [
    "partNo",
    "description",
    "manufacturer",
    "category",
    "unit",
    "unitPrice",
    "notes",
    "category1",
    "category2",
    "pricingModel",
    "unitPricePerKWh",
    "unitPricePerYear",
    "refCapacityKWh",
];

/// 數值欄位
const NUMERIC_FIELDS: [&str; 4] = [
    "unitPrice",
    "unitPricePerKWh",
    "unitPricePerYear",
    "refCapacityKWh",
];

fn canonical_field(name: &str) -> Option<&'static str> {
    let name = name.trim();
    CANONICAL_FIELDS
        .iter()
        .copied()
        .find(|field| field.eq_ignore_ascii_case(name))
}

/// 欄位對應：欄位名稱 → 來源表頭
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    overrides: BTreeMap<&'static str, String>,
}

impl ColumnMapping {
    /// 創建空對應（全部依欄位名稱比對）
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定欄位對應的來源表頭
    pub fn with_field(mut self, field: &str, header: impl Into<String>) -> ImportResult<Self> {
        let field = canonical_field(field).ok_or_else(|| ImportError::UnknownField(field.to_string()))?;
        self.overrides.insert(field, header.into());
        Ok(self)
    }

    /// 解析 `field=header` 形式的對應
    pub fn from_pairs<I, S>(pairs: I) -> ImportResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pairs.into_iter().try_fold(Self::new(), |mapping, pair| {
            let pair = pair.as_ref();
            let (field, header) = pair
                .split_once('=')
                .ok_or_else(|| ImportError::InvalidMapping(pair.to_string()))?;
            if header.trim().is_empty() {
                return Err(ImportError::InvalidMapping(pair.to_string()));
            }
            mapping.with_field(field, header.trim())
        })
    }

    /// 將欄位對應到表頭索引
    ///
    /// 明確指定的表頭必須存在；品號欄位必須能對應。
    pub fn resolve(&self, headers: &[String]) -> ImportResult<HashMap<&'static str, usize>> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted.trim()))
        };

        let mut columns = HashMap::new();
        for field in CANONICAL_FIELDS {
            match self.overrides.get(field) {
                Some(header) => {
                    let idx = find(header).ok_or_else(|| ImportError::MissingColumn {
                        field: field.to_string(),
                        header: header.clone(),
                    })?;
                    columns.insert(field, idx);
                }
                None => {
                    if let Some(idx) = find(field) {
                        columns.insert(field, idx);
                    }
                }
            }
        }

        if !columns.contains_key("partNo") {
            return Err(ImportError::MissingColumn {
                field: "partNo".to_string(),
                header: "partNo".to_string(),
            });
        }
        Ok(columns)
    }
}

/// 讀入的原始表格
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// 依副檔名讀取 CSV 或 Excel 第一個工作表
    pub fn read(path: &Path) -> ImportResult<Self> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Self::read_csv(path),
            "xlsx" | "xls" => Self::read_excel(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    fn read_csv(path: &Path) -> ImportResult<Self> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|v| v.trim().to_string()).collect());
        }

        Ok(Self { headers, rows }.without_blank_rows())
    }

    fn read_excel(path: &Path) -> ImportResult<Self> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::ExcelParseError("Excel 檔案沒有工作表".to_string()))?
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 檔案沒有表頭".to_string()))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let rows = rows
            .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
            .collect();

        Ok(Self { headers, rows }.without_blank_rows())
    }

    fn without_blank_rows(mut self) -> Self {
        self.rows.retain(|row| row.iter().any(|v| !v.is_empty()));
        self
    }
}

/// 正規化後的匯入候選
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    /// 待寫入的部品
    pub parts: Vec<NewPart>,

    /// 品號空白而略過的列數
    pub skipped_rows: usize,

    /// 各數值欄位無法解析（視為缺值）的筆數
    pub invalid_numbers: BTreeMap<String, usize>,
}

impl ImportBatch {
    /// 正規化原始表格
    pub fn from_table(table: &RawTable, mapping: &ColumnMapping, default_unit: &str) -> ImportResult<Self> {
        let columns = mapping.resolve(&table.headers)?;
        let default_unit = if default_unit.trim().is_empty() {
            DEFAULT_UNIT
        } else {
            default_unit.trim()
        };

        let mut batch = Self::default();
        for row in &table.rows {
            let text = |field: &str| -> String {
                columns
                    .get(field)
                    .and_then(|&idx| row.get(idx))
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default()
            };

            let part_number = text("partNo");
            if part_number.is_empty() {
                batch.skipped_rows += 1;
                continue;
            }

            let mut numbers = [None; NUMERIC_FIELDS.len()];
            for (slot, field) in numbers.iter_mut().zip(NUMERIC_FIELDS) {
                let raw = text(field);
                if raw.is_empty() {
                    continue;
                }
                match parse_number(&raw) {
                    Some(value) => *slot = Some(value),
                    None => {
                        tracing::debug!("{} 欄位 {} 無法解析: {}", part_number, field, raw);
                        *batch.invalid_numbers.entry(field.to_string()).or_insert(0) += 1;
                    }
                }
            }

            let unit = text("unit");
            let pricing_model = text("pricingModel").to_lowercase();

            let mut part = NewPart::new(part_number, text("description"));
            part.manufacturer = text("manufacturer");
            part.category = text("category");
            part.category1 = text("category1");
            part.category2 = text("category2");
            part.notes = text("notes");
            part.unit = if unit.is_empty() { default_unit.to_string() } else { unit };
            part.pricing_model = if pricing_model.is_empty() {
                PricingModel::Fixed.as_str().to_string()
            } else {
                pricing_model
            };
            let [unit_price, per_kwh, per_year, ref_capacity] = numbers;
            part.unit_price = unit_price;
            part.unit_price_per_kwh = per_kwh;
            part.unit_price_per_year = per_year;
            part.ref_capacity_kwh = ref_capacity;

            batch.parts.push(part);
        }

        tracing::info!(
            "匯入候選 {} 筆，略過 {} 列，數值無法解析 {} 格",
            batch.parts.len(),
            batch.skipped_rows,
            batch.invalid_number_count()
        );
        Ok(batch)
    }

    /// 無法解析的數值總格數
    pub fn invalid_number_count(&self) -> usize {
        self.invalid_numbers.values().sum()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// 讀取主檔並正規化為匯入候選（不寫入任何資料）
pub fn read_candidates(path: &Path, mapping: &ColumnMapping, default_unit: &str) -> ImportResult<ImportBatch> {
    tracing::info!("讀取主檔: {}", path.display());
    let table = RawTable::read(path)?;
    ImportBatch::from_table(&table, mapping, default_unit)
}

/// 在目錄中依序尋找第一個存在的主檔
pub fn find_master_file(dir: &Path, candidates: &[String]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// 解析數值（接受一般與科學記號表示）
fn parse_number(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
