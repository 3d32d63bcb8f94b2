use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_date_range, validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// 搜尋 API 一頁最多回傳的筆數
pub const MAX_PAGE_LIMIT: usize = 1000;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex"));

/// 查詢設定檔（選用）。未指定的欄位使用預設值。
///
/// ```toml
/// founded_from = "2024-01-01"
/// founded_to = "2024-12-31"
/// facets = ["company"]
/// limit = 1000
/// delay_ms = 200
/// api_key = "${CRUNCHBASE_API_KEY}"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub founded_from: String,
    pub founded_to: String,
    pub facets: Vec<String>,
    pub limit: usize,
    pub delay_ms: u64,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            founded_from: "2024-01-01".to_string(),
            founded_to: "2024-12-31".to_string(),
            facets: vec!["company".to_string()],
            limit: MAX_PAGE_LIMIT,
            delay_ms: 200,
            endpoint: None,
            api_key: None,
        }
    }
}

impl QueryConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => EtlError::MissingInput {
                path: path.display().to_string(),
                hint: Some("Pass an existing TOML file to --query-config".to_string()),
            },
            _ => EtlError::IoError(e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// 未被替換的 `${VAR}` 視為沒有設定
    pub fn resolved_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !ENV_VAR.is_match(k))
    }
}

/// 替換環境變數 (例如 ${API_KEY})；找不到的變數保持原樣
pub fn substitute_env_vars(content: &str) -> String {
    ENV_VAR
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

impl Validate for QueryConfig {
    fn validate(&self) -> Result<()> {
        validate_date_range("founded_on", &self.founded_from, &self.founded_to)?;
        validate_range("limit", self.limit, 1, MAX_PAGE_LIMIT)?;

        if self.facets.is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "facets".to_string(),
            });
        }
        for facet in &self.facets {
            validate_non_empty_string("facets", facet)?;
        }

        if let Some(endpoint) = &self.endpoint {
            validate_url("endpoint", endpoint)?;
        }
        Ok(())
    }
}
