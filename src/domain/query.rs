use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field_id: String,
    pub sort: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub r#type: String,
    pub field_id: String,
    pub operator_id: String,
    pub values: Vec<String>,
}

impl Predicate {
    pub fn new(field_id: &str, operator_id: &str, values: Vec<String>) -> Self {
        Self {
            r#type: "predicate".to_string(),
            field_id: field_id.to_string(),
            operator_id: operator_id.to_string(),
            values,
        }
    }
}

/// 固定的查詢內容；每一頁都送出相同的 body，只有 cursor 不同
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub field_ids: Vec<String>,
    pub order: Vec<SortOrder>,
    pub query: Vec<Predicate>,
    pub limit: usize,
}

impl SearchQuery {
    /// 依成立日期區間與 facet 建立查詢，結果依 founded_on 升冪排序
    pub fn founded_between(
        field_ids: &[&str],
        from: &str,
        to: &str,
        facets: &[String],
        limit: usize,
    ) -> Self {
        Self {
            field_ids: field_ids.iter().map(|f| f.to_string()).collect(),
            order: vec![SortOrder {
                field_id: "founded_on".to_string(),
                sort: "asc".to_string(),
            }],
            query: vec![
                // 日期用兩個 predicate，不用 between
                Predicate::new("founded_on", "gte", vec![from.to_string()]),
                Predicate::new("founded_on", "lte", vec![to.to_string()]),
                Predicate::new("facet_ids", "includes", facets.to_vec()),
            ],
            limit,
        }
    }

    pub fn page(&self, after_id: Option<String>) -> SearchRequest {
        SearchRequest {
            query: self.clone(),
            after_id,
        }
    }
}

/// 單頁請求 = 基本查詢 + 選用的 `after_id`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub query: SearchQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
}
