use super::{read_csv, write_csv};
use crate::config::MatchSettings;
use crate::core::matching::match_dataset;
use crate::core::summary::preview;
use crate::core::{Dataset, NameMatcher, Pipeline, Storage};
use crate::utils::error::{EtlError, Result};
use std::path::Path;
use std::sync::Mutex;

const PREVIEW_ROWS: usize = 10;

/// 讀 master 與待比對清單 → 名稱模糊比對 → 輸出
pub struct MatchPipeline<S: Storage, M: NameMatcher + Send> {
    storage: S,
    settings: MatchSettings,
    matcher: Mutex<M>,
}

impl<S: Storage, M: NameMatcher + Send> MatchPipeline<S, M> {
    pub fn new(storage: S, settings: MatchSettings, matcher: M) -> Self {
        Self {
            storage,
            settings,
            matcher: Mutex::new(matcher),
        }
    }

    /// 找不到指定路徑時，改試目前目錄下的同名檔案
    async fn locate(&self, path: &str) -> String {
        if self.storage.exists(path).await {
            return path.to_string();
        }

        if let Some(name) = Path::new(path).file_name().and_then(|n| n.to_str()) {
            if name != path && self.storage.exists(name).await {
                tracing::warn!("⚠️ {} not found, using ./{} instead", path, name);
                return name.to_string();
            }
        }
        path.to_string()
    }
}

#[async_trait::async_trait]
impl<S: Storage, M: NameMatcher + Send> Pipeline for MatchPipeline<S, M> {
    type Raw = (Dataset, Dataset);

    async fn extract(&self) -> Result<(Dataset, Dataset)> {
        let master_path = self.locate(&self.settings.master_csv).await;
        let queries_path = self.locate(&self.settings.queries_csv).await;

        tracing::info!("📂 Loading data...");
        let master = read_csv(&self.storage, &master_path, None).await?;
        let queries = read_csv(&self.storage, &queries_path, None).await?;
        tracing::info!(
            "📂 Loaded {} master names and {} names to match",
            master.len(),
            queries.len()
        );
        Ok((master, queries))
    }

    async fn transform(&self, raw: (Dataset, Dataset)) -> Result<Dataset> {
        let (master, queries) = raw;
        let mut matcher = self.matcher.lock().map_err(|_| EtlError::ProcessingError {
            message: "name matcher lock poisoned".to_string(),
        })?;

        match_dataset(
            &master,
            &queries,
            &self.settings.columns,
            self.settings.sample_size,
            &mut *matcher,
        )
    }

    async fn load(&self, dataset: Dataset) -> Result<Option<String>> {
        let path = self.settings.output_csv.clone();
        tracing::info!("💾 Saving results to {}...", path);
        write_csv(&self.storage, &path, &dataset).await?;
        println!("Successfully saved {} matches to {}", dataset.len(), path);

        println!("\nSample Matches:");
        println!(
            "{}",
            preview(
                &dataset,
                &[
                    self.settings.columns.query_name.as_str(),
                    "match_name",
                    "score",
                    "exact_match_check",
                ],
                PREVIEW_ROWS,
            )
        );
        Ok(Some(path))
    }
}
