pub mod fetch_pipeline;
pub mod match_pipeline;
pub mod merge_pipeline;

pub use fetch_pipeline::FetchPipeline;
pub use match_pipeline::MatchPipeline;
pub use merge_pipeline::MergePipeline;

use crate::core::csv_io::{read_dataset, write_dataset};
use crate::core::{Dataset, Storage};
use crate::utils::error::{EtlError, Result};

/// 讀取 CSV；檔案不存在時回傳 `MissingInput`
pub(crate) async fn read_csv<S: Storage>(
    storage: &S,
    path: &str,
    hint: Option<&str>,
) -> Result<Dataset> {
    if !storage.exists(path).await {
        return Err(EtlError::MissingInput {
            path: path.to_string(),
            hint: hint.map(str::to_string),
        });
    }
    let bytes = storage.read_file(path).await?;
    read_dataset(&bytes)
}

pub(crate) async fn write_csv<S: Storage>(
    storage: &S,
    path: &str,
    dataset: &Dataset,
) -> Result<()> {
    let bytes = write_dataset(dataset)?;
    tracing::debug!("Writing {} bytes to {}", bytes.len(), path);
    storage.write_file(path, &bytes).await
}
