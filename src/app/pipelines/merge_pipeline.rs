use super::{read_csv, write_csv};
use crate::config::MergeSettings;
use crate::core::merge::merge_datasets;
use crate::core::summary::{coverage, COVERAGE_COLUMNS};
use crate::core::{Dataset, Pipeline, Storage};
use crate::utils::error::Result;

/// 讀兩份 CSV → left join → 輸出
pub struct MergePipeline<S: Storage> {
    storage: S,
    settings: MergeSettings,
}

impl<S: Storage> MergePipeline<S> {
    pub fn new(storage: S, settings: MergeSettings) -> Self {
        Self { storage, settings }
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for MergePipeline<S> {
    type Raw = (Dataset, Dataset);

    async fn extract(&self) -> Result<(Dataset, Dataset)> {
        tracing::info!("📂 Loading companies from {}", self.settings.companies_csv);
        let companies = read_csv(&self.storage, &self.settings.companies_csv, None).await?;
        println!("Loaded {} companies", companies.len());

        tracing::info!("📂 Loading financial data from {}", self.settings.financial_csv);
        let financial = read_csv(
            &self.storage,
            &self.settings.financial_csv,
            Some("Run `company-etl fetch --dataset financial` first to fetch financial data"),
        )
        .await?;
        println!("Loaded {} companies with financial data", financial.len());

        Ok((companies, financial))
    }

    async fn transform(&self, raw: (Dataset, Dataset)) -> Result<Dataset> {
        let (companies, financial) = raw;
        let outcome = merge_datasets(&companies, &financial)?;

        if !outcome.replaced_columns.is_empty() {
            tracing::info!(
                "🔀 Took financial values for: {}",
                outcome.replaced_columns.join(", ")
            );
        }

        println!("\nMerged dataset: {} companies", outcome.dataset.len());
        println!(
            "Companies with financial data: {}",
            outcome.dataset.non_missing_count("funding_total_numeric")
        );
        Ok(outcome.dataset)
    }

    async fn load(&self, dataset: Dataset) -> Result<Option<String>> {
        let path = self.settings.output_csv.clone();
        write_csv(&self.storage, &path, &dataset).await?;
        println!("\nSaved merged data to {}", path);

        println!("\n=== Financial Data Coverage ===");
        for line in coverage(&dataset, COVERAGE_COLUMNS) {
            println!("{}", line);
        }
        Ok(Some(path))
    }
}
