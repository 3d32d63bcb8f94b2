use crate::domain::model::{Dataset, Record, Row};
use serde_json::Value;

pub const CATEGORY_DELIMITER: &str = ";";

const COMPANY_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "permalink",
    "founded_on",
    "short_description",
    "website",
    "num_employees_enum",
    "categories",
];

const FINANCIAL_COLUMNS: &[&str] = &[
    "funding_total",
    "funding_total_numeric",
    "num_funding_rounds",
];

const COMPANY_FIELD_IDS: &[&str] = &[
    "identifier",
    "founded_on",
    "short_description",
    "website",
    "num_employees_enum",
    "categories",
];

const FINANCIAL_FIELD_IDS: &[&str] = &["funding_total", "num_funding_rounds"];

/// 每個流程輸出固定的欄位集合，與單筆 Record 實際有哪些欄位無關
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSchema {
    Companies,
    Financial,
}

impl RowSchema {
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            RowSchema::Companies => COMPANY_COLUMNS.to_vec(),
            RowSchema::Financial => [COMPANY_COLUMNS, FINANCIAL_COLUMNS].concat(),
        }
    }

    /// 查詢時要求 API 回傳的 field_ids
    pub fn field_ids(&self) -> Vec<&'static str> {
        match self {
            RowSchema::Companies => COMPANY_FIELD_IDS.to_vec(),
            RowSchema::Financial => [COMPANY_FIELD_IDS, FINANCIAL_FIELD_IDS].concat(),
        }
    }

    pub fn empty_dataset(&self) -> Dataset {
        Dataset::new(self.columns().into_iter().map(String::from).collect())
    }
}

/// 沿著 key 路徑往下取值；任何一層不是物件或值為 null 都回傳 None
pub fn safe_get<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.as_object()?.get(*key)?;
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}

/// 物件型欄位（例如 `{"value": ..., "precision": ...}`）取其 `value`
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Object(obj) if obj.contains_key("value") => scalar_text(obj.get("value")),
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn category_label(category: &Value) -> String {
    match category {
        Value::String(s) => s.clone(),
        Value::Object(obj) => ["value", "name"]
            .iter()
            .filter_map(|key| obj.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| category.to_string()),
        other => other.to_string(),
    }
}

fn join_categories(properties: &Value) -> String {
    safe_get(properties, &["categories"])
        .and_then(Value::as_array)
        .map(|cats| {
            cats.iter()
                .map(category_label)
                .collect::<Vec<_>>()
                .join(CATEGORY_DELIMITER)
        })
        .unwrap_or_default()
}

/// 數值 0 視為沒有募資金額
fn funding_numeric(raw: Option<&Value>, text: Option<&str>) -> Option<String> {
    if raw.and_then(Value::as_f64) == Some(0.0) {
        return None;
    }
    parse_funding_amount(text).map(|v| v.to_string())
}

/// 解析募資金額字串：去掉 `$`、逗號與空白；`低-高` 區間取中點
pub fn parse_funding_amount(amount: Option<&str>) -> Option<f64> {
    let cleaned: String = amount?
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    if cleaned.contains('-') {
        let parts: Vec<&str> = cleaned.split('-').collect();
        if parts.len() == 2 {
            let low = parts[0].parse::<f64>().ok()?;
            let high = parts[1].parse::<f64>().ok()?;
            return Some((low + high) / 2.0);
        }
    }

    cleaned.parse::<f64>().ok()
}

/// 把一筆 Record 攤平成固定欄位的 Row；缺少的欄位一律留空，不報錯
pub fn flatten(record: &Record, schema: RowSchema) -> Row {
    let empty = Value::Null;
    let props = safe_get(&record.data, &["properties"]).unwrap_or(&empty);
    let text = |path: &[&str]| scalar_text(safe_get(props, path));

    let mut cells = vec![
        text(&["identifier", "uuid"]),
        text(&["identifier", "value"]),
        text(&["identifier", "permalink"]),
        text(&["founded_on"]),
        text(&["short_description"]),
        text(&["website"]),
        text(&["num_employees_enum"]),
        Some(join_categories(props)),
    ];

    if schema == RowSchema::Financial {
        let raw_total = safe_get(props, &["funding_total", "value"]);
        let funding_total = scalar_text(raw_total);
        let numeric = funding_numeric(raw_total, funding_total.as_deref());
        cells.push(funding_total);
        cells.push(numeric);
        cells.push(text(&["num_funding_rounds"]));
    }

    Row::new(cells)
}

pub fn flatten_all(records: &[Record], schema: RowSchema) -> Dataset {
    let mut dataset = schema.empty_dataset();
    for record in records {
        dataset.push_row(flatten(record, schema));
    }
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Record {
        Record::new(json!({
            "uuid": "abc",
            "properties": {
                "identifier": {"uuid": "abc", "value": "Acme", "permalink": "acme"},
                "founded_on": {"value": "2024-02-01", "precision": "day"},
                "short_description": "Rockets",
                "website": {"value": "https://acme.test"},
                "num_employees_enum": "c_00011_00050",
                "categories": [
                    {"value": "Aerospace", "uuid": "1"},
                    "Manufacturing",
                    {"name": "Space"}
                ],
                "funding_total": {"value": 1500000, "currency": "USD"},
                "num_funding_rounds": 2
            }
        }))
    }

    #[test]
    fn test_flatten_extracts_identifier_fields() {
        let row = flatten(&full_record(), RowSchema::Companies);
        assert_eq!(row.cells.len(), RowSchema::Companies.columns().len());
        assert_eq!(row.get(0), Some("abc"));
        assert_eq!(row.get(1), Some("Acme"));
        assert_eq!(row.get(2), Some("acme"));
        assert_eq!(row.get(3), Some("2024-02-01"));
        assert_eq!(row.get(4), Some("Rockets"));
        assert_eq!(row.get(5), Some("https://acme.test"));
        assert_eq!(row.get(6), Some("c_00011_00050"));
    }

    #[test]
    fn test_flatten_joins_categories() {
        let row = flatten(&full_record(), RowSchema::Companies);
        assert_eq!(row.get(7), Some("Aerospace;Manufacturing;Space"));
    }

    #[test]
    fn test_flatten_is_total_for_empty_record() {
        for schema in [RowSchema::Companies, RowSchema::Financial] {
            let row = flatten(&Record::new(json!({})), schema);
            assert_eq!(row.cells.len(), schema.columns().len());
            assert_eq!(row.get(0), None);
            assert_eq!(row.get(7), Some(""));
        }
    }

    #[test]
    fn test_flatten_tolerates_wrong_shapes() {
        let record = Record::new(json!({
            "properties": {"identifier": "not-an-object", "categories": null, "website": null}
        }));
        let row = flatten(&record, RowSchema::Financial);
        assert_eq!(row.get(0), None);
        assert_eq!(row.get(5), None);
        assert_eq!(row.get(7), Some(""));
        assert_eq!(row.get(8), None);
        assert_eq!(row.get(9), None);
    }

    #[test]
    fn test_flatten_financial_fields() {
        let row = flatten(&full_record(), RowSchema::Financial);
        assert_eq!(row.get(8), Some("1500000"));
        assert_eq!(row.get(9), Some("1500000"));
        assert_eq!(row.get(10), Some("2"));
    }

    #[test]
    fn test_category_label_skips_blank_value() {
        let record = Record::new(json!({
            "properties": {
                "categories": [
                    {"value": null, "name": "Space"},
                    {"value": "", "name": "Rockets"},
                    {"value": null}
                ]
            }
        }));
        let row = flatten(&record, RowSchema::Companies);
        assert_eq!(row.get(7), Some(r#"Space;Rockets;{"value":null}"#));
    }

    #[test]
    fn test_zero_funding_has_no_numeric_value() {
        let record = Record::new(json!({
            "properties": {"funding_total": {"value": 0, "currency": "USD"}}
        }));
        let row = flatten(&record, RowSchema::Financial);
        assert_eq!(row.get(8), Some("0"));
        assert_eq!(row.get(9), None);

        let record = Record::new(json!({
            "properties": {"funding_total": {"value": "$2,000"}}
        }));
        let row = flatten(&record, RowSchema::Financial);
        assert_eq!(row.get(9), Some("2000"));
    }

    #[test]
    fn test_parse_funding_amount() {
        assert_eq!(parse_funding_amount(Some("$1,500,000")), Some(1_500_000.0));
        assert_eq!(parse_funding_amount(Some("1000000-5000000")), Some(3_000_000.0));
        assert_eq!(parse_funding_amount(Some("12.5")), Some(12.5));
        assert_eq!(parse_funding_amount(Some("n/a")), None);
        assert_eq!(parse_funding_amount(Some("1-2-3")), None);
        assert_eq!(parse_funding_amount(Some("")), None);
        assert_eq!(parse_funding_amount(None), None);
    }

    #[test]
    fn test_safe_get_stops_on_non_object() {
        let value = json!({"a": {"b": 1}, "c": null});
        assert_eq!(safe_get(&value, &["a", "b"]), Some(&json!(1)));
        assert_eq!(safe_get(&value, &["a", "b", "c"]), None);
        assert_eq!(safe_get(&value, &["c"]), None);
        assert_eq!(safe_get(&value, &["missing"]), None);
    }

    #[test]
    fn test_financial_query_requests_extra_fields() {
        let ids = RowSchema::Financial.field_ids();
        assert!(ids.contains(&"funding_total"));
        assert!(ids.contains(&"num_funding_rounds"));
        assert_eq!(RowSchema::Companies.field_ids().len(), 6);
    }
}
