//! 部品查詢條件

/// 部品查詢條件
///
/// 關鍵字比對多個文字欄位（不分大小寫）；第一/第二分類為多選，
/// 同一分類內為「或」，不同條件之間為「且」。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartFilter {
    /// 關鍵字
    pub query: Option<String>,

    /// 第一分類（空集合表示不篩選）
    pub category1: Vec<String>,

    /// 第二分類（空集合表示不篩選）
    pub category2: Vec<String>,
}

/// 關鍵字比對的欄位
pub(crate) const KEYWORD_COLUMNS: [&str; 8] = [
    "partNo",
    "description",
    "manufacturer",
    "category",
    "category1",
    "category2",
    "unit",
    "notes",
];

impl PartFilter {
    /// 創建不含任何條件的查詢
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置關鍵字
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    /// 建構器模式：設置第一分類
    pub fn with_category1<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category1 = values.into_iter().map(Into::into).collect();
        self
    }

    /// 建構器模式：設置第二分類
    pub fn with_category2<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category2 = values.into_iter().map(Into::into).collect();
        self
    }

    /// 組出 WHERE 子句與參數
    pub(crate) fn to_sql(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if let Some(query) = &self.query {
            let like = format!("%{}%", query.trim());
            let parts: Vec<String> = KEYWORD_COLUMNS
                .iter()
                .map(|col| format!("{} LIKE ?", col))
                .collect();
            clauses.push(format!("({})", parts.join(" OR ")));
            params.extend(std::iter::repeat(like).take(KEYWORD_COLUMNS.len()));
        }

        for (column, values) in [("category1", &self.category1), ("category2", &self.category2)] {
            if values.is_empty() {
                continue;
            }
            let placeholders = vec!["?"; values.len()].join(", ");
            clauses.push(format!("COALESCE({}, '') IN ({})", column, placeholders));
            params.extend(values.iter().cloned());
        }

        if clauses.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), params)
        }
    }
}
