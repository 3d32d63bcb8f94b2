use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

/// 依序執行 extract → transform → load
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<Option<String>> {
        let started = Instant::now();
        tracing::info!("🚀 Starting ETL process");

        tracing::info!("📥 Extracting data...");
        let raw = self.pipeline.extract().await?;

        tracing::info!("🔄 Transforming data...");
        let dataset = self.pipeline.transform(raw).await?;
        tracing::info!("🔄 Transformed {} rows", dataset.len());

        tracing::info!("💾 Loading data...");
        let output_path = self.pipeline.load(dataset).await?;

        let elapsed = started.elapsed().as_secs_f64();
        match &output_path {
            Some(path) => tracing::info!("✅ Output saved to {} ({:.1}s)", path, elapsed),
            None => tracing::warn!("⚠️ No output written ({:.1}s)", elapsed),
        }
        Ok(output_path)
    }
}
