#[cfg(feature = "cli")]
pub mod args;
pub mod cli;
pub mod toml_config;

use crate::core::flatten::RowSchema;
use crate::core::matching::{MatchColumns, MatcherOptions};
use crate::core::search::DEFAULT_SEARCH_URL;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use toml_config::QueryConfig;

pub const API_KEY_ENV: &str = "CRUNCHBASE_API_KEY";
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

pub const DEFAULT_COMPANIES_CSV: &str = "companies_2024.csv";
pub const DEFAULT_FINANCIAL_CSV: &str = "companies_financial_2024.csv";
pub const DEFAULT_MERGED_CSV: &str = "companies_with_financial_2024.csv";
pub const DEFAULT_MATCHED_CSV: &str = "matched_sample.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DatasetKind {
    /// 公司基本資料
    Companies,
    /// 公司基本資料 + 募資欄位
    Financial,
}

impl DatasetKind {
    pub fn schema(&self) -> RowSchema {
        match self {
            DatasetKind::Companies => RowSchema::Companies,
            DatasetKind::Financial => RowSchema::Financial,
        }
    }

    pub fn default_output(&self) -> &'static str {
        match self {
            DatasetKind::Companies => DEFAULT_COMPANIES_CSV,
            DatasetKind::Financial => DEFAULT_FINANCIAL_CSV,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum FetchMode {
    /// 抓取全部符合條件的公司
    All,
    /// 先讀既有的公司 CSV，再重新查詢
    Existing,
}

/// API key 取用順序：查詢設定檔 → 環境變數 → 預留字串
pub fn resolve_api_key(query: &QueryConfig) -> String {
    if let Some(key) = query.resolved_api_key() {
        return key.to_string();
    }
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::warn!(
                "⚠️ {} is not set, using placeholder key {}",
                API_KEY_ENV,
                API_KEY_PLACEHOLDER
            );
            API_KEY_PLACEHOLDER.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub dataset: DatasetKind,
    pub mode: FetchMode,
    pub input_csv: String,
    pub output_csv: String,
    pub endpoint: String,
    pub api_key: String,
    pub query: QueryConfig,
}

impl FetchSettings {
    pub fn new(dataset: DatasetKind, query: QueryConfig) -> Self {
        let endpoint = query
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string());
        let api_key = resolve_api_key(&query);
        Self {
            dataset,
            mode: FetchMode::All,
            input_csv: DEFAULT_COMPANIES_CSV.to_string(),
            output_csv: dataset.default_output().to_string(),
            endpoint,
            api_key,
            query,
        }
    }
}

impl Validate for FetchSettings {
    fn validate(&self) -> Result<()> {
        validate_url("endpoint", &self.endpoint)?;
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_path("output_csv", &self.output_csv)?;
        if self.mode == FetchMode::Existing {
            validate_path("input_csv", &self.input_csv)?;
        }
        self.query.validate()
    }
}

#[derive(Debug, Clone)]
pub struct MergeSettings {
    pub companies_csv: String,
    pub financial_csv: String,
    pub output_csv: String,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            companies_csv: DEFAULT_COMPANIES_CSV.to_string(),
            financial_csv: DEFAULT_FINANCIAL_CSV.to_string(),
            output_csv: DEFAULT_MERGED_CSV.to_string(),
        }
    }
}

impl Validate for MergeSettings {
    fn validate(&self) -> Result<()> {
        validate_path("companies", &self.companies_csv)?;
        validate_path("financial", &self.financial_csv)?;
        validate_path("output", &self.output_csv)
    }
}

#[derive(Debug, Clone)]
pub struct MatchSettings {
    pub master_csv: String,
    pub queries_csv: String,
    pub output_csv: String,
    pub sample_size: usize,
    pub columns: MatchColumns,
    pub matcher: MatcherOptions,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            master_csv: "samplecrunchbase3.csv".to_string(),
            queries_csv: "samplepitchbook3.csv".to_string(),
            output_csv: DEFAULT_MATCHED_CSV.to_string(),
            sample_size: 100,
            columns: MatchColumns::default(),
            matcher: MatcherOptions::default(),
        }
    }
}

impl Validate for MatchSettings {
    fn validate(&self) -> Result<()> {
        validate_path("master", &self.master_csv)?;
        validate_path("queries", &self.queries_csv)?;
        validate_path("output", &self.output_csv)?;
        validate_positive_number("sample_size", self.sample_size, 1)?;
        validate_positive_number("top_n", self.matcher.top_n, 1)?;
        validate_non_empty_string("master_column", &self.columns.master_name)?;
        validate_non_empty_string("query_column", &self.columns.query_name)?;
        validate_non_empty_string("id_column", &self.columns.query_id)
    }
}
