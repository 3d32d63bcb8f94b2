use crate::domain::model::{Dataset, RecordPage};
use crate::domain::query::SearchRequest;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// 分頁搜尋來源；一次呼叫取一頁
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn fetch_page(&self, request: &SearchRequest) -> Result<RecordPage>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    /// master list 的列索引
    pub index: usize,
    pub name: String,
    pub score: f64,
}

/// 可替換的名稱比對器：先載入 master list，再逐筆查詢最佳對應
pub trait NameMatcher {
    fn load_master(&mut self, names: Vec<String>);
    fn match_name(&self, query: &str) -> Option<NameMatch>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Raw: Send;

    async fn extract(&self) -> Result<Self::Raw>;
    async fn transform(&self, raw: Self::Raw) -> Result<Dataset>;
    /// 回傳寫出的檔案路徑；沒有寫出任何檔案時為 None
    async fn load(&self, dataset: Dataset) -> Result<Option<String>>;
}
