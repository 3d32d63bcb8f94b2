use super::{read_csv, write_csv};
use crate::config::{DatasetKind, FetchMode, FetchSettings};
use crate::core::flatten::flatten_all;
use crate::core::paginate::fetch_all;
use crate::core::summary::FinancialSummary;
use crate::core::{Dataset, Pipeline, Record, SearchSource, Storage};
use crate::domain::query::SearchQuery;
use crate::utils::error::{EtlError, Result};

/// 分頁抓取 → 攤平 → 輸出 CSV
pub struct FetchPipeline<S: Storage, Src: SearchSource> {
    storage: S,
    source: Src,
    settings: FetchSettings,
}

impl<S: Storage, Src: SearchSource> FetchPipeline<S, Src> {
    pub fn new(storage: S, source: Src, settings: FetchSettings) -> Self {
        Self {
            storage,
            source,
            settings,
        }
    }

    pub fn query(&self) -> SearchQuery {
        let q = &self.settings.query;
        SearchQuery::founded_between(
            &self.settings.dataset.schema().field_ids(),
            &q.founded_from,
            &q.founded_to,
            &q.facets,
            q.limit,
        )
    }

    /// `existing` 模式只讀既有檔案回報筆數，實際上仍會重新查詢全部資料
    async fn check_existing_companies(&self) -> Result<()> {
        let path = &self.settings.input_csv;
        match read_csv(&self.storage, path, None).await {
            Ok(existing) => {
                tracing::info!("📂 Loaded {} companies from {}", existing.len(), path);
                tracing::info!(
                    "🔁 Re-querying API with {:?} fields (this fetches the full date range again)",
                    self.settings.dataset
                );
                Ok(())
            }
            Err(EtlError::MissingInput { .. }) => {
                tracing::warn!(
                    "⚠️ File {} not found. Fetching all companies instead...",
                    path
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, Src: SearchSource> Pipeline for FetchPipeline<S, Src> {
    type Raw = Vec<Record>;

    async fn extract(&self) -> Result<Vec<Record>> {
        if self.settings.mode == FetchMode::Existing {
            self.check_existing_companies().await?;
        }

        let query = self.query();
        tracing::info!(
            "📡 Fetching companies founded {}..{} (page size {})",
            self.settings.query.founded_from,
            self.settings.query.founded_to,
            query.limit
        );
        fetch_all(&self.source, &query, self.settings.query.delay()).await
    }

    async fn transform(&self, raw: Vec<Record>) -> Result<Dataset> {
        Ok(flatten_all(&raw, self.settings.dataset.schema()))
    }

    async fn load(&self, dataset: Dataset) -> Result<Option<String>> {
        let path = self.settings.output_csv.clone();

        match self.settings.dataset {
            DatasetKind::Companies => {
                write_csv(&self.storage, &path, &dataset).await?;
                println!("Saved {} rows to {}", dataset.len(), path);
            }
            DatasetKind::Financial => {
                if dataset.is_empty() {
                    tracing::warn!("⚠️ Financial fetch returned no rows, nothing written");
                    println!("No data fetched. Check API key and query parameters.");
                    return Ok(None);
                }
                write_csv(&self.storage, &path, &dataset).await?;
                println!(
                    "Saved {} rows with financial data to {}",
                    dataset.len(),
                    path
                );
                println!("\n{}", FinancialSummary::from_dataset(&dataset));
            }
        }

        Ok(Some(path))
    }
}
