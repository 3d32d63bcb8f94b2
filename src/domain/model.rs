use serde::{Deserialize, Serialize};

/// 搜尋 API 回傳的單一 entity，保留原始 JSON 結構
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Record {
    pub data: serde_json::Value,
}

impl Record {
    pub fn new(data: serde_json::Value) -> Self {
        Self { data }
    }
}

/// 一頁搜尋結果；`entities` 缺少或為 null 時視為空頁
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub entities: Vec<Record>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Record>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Record>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<Option<String>>,
}

impl Row {
    pub fn new(cells: Vec<Option<String>>) -> Self {
        Self { cells }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|c| c.as_deref())
    }
}

/// 有序的資料列集合，對應一個 CSV 檔
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Pads or truncates the row to the header width.
    pub fn push_row(&mut self, mut row: Row) {
        row.cells.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    pub fn column_values(&self, column: &str) -> Vec<Option<&str>> {
        match self.column_index(column) {
            Some(index) => self.rows.iter().map(|r| r.get(index)).collect(),
            None => vec![None; self.rows.len()],
        }
    }

    pub fn non_missing_count(&self, column: &str) -> usize {
        self.column_values(column)
            .into_iter()
            .filter(|v| !is_missing(*v))
            .count()
    }

    /// 只保留存在的欄位，依傳入順序排列
    pub fn select_columns(&self, names: &[&str]) -> Dataset {
        let picked: Vec<(String, usize)> = names
            .iter()
            .filter_map(|n| self.column_index(n).map(|i| (n.to_string(), i)))
            .collect();

        Dataset {
            columns: picked.iter().map(|(n, _)| n.clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| {
                    Row::new(
                        picked
                            .iter()
                            .map(|(_, i)| row.cells.get(*i).cloned().flatten())
                            .collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn head(&self, n: usize) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// 只有 None 與空字串算缺值；純空白仍是有值的儲存格
pub fn is_missing(value: Option<&str>) -> bool {
    value.map(str::is_empty).unwrap_or(true)
}
