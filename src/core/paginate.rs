use crate::core::flatten::safe_get;
use crate::domain::model::Record;
use crate::domain::ports::SearchSource;
use crate::domain::query::SearchQuery;
use crate::utils::error::Result;
use std::time::Duration;

/// 依 cursor 逐頁取回全部結果。
///
/// 空頁或筆數少於 `limit` 的頁面即為最後一頁；下一頁的 `after_id`
/// 是本頁最後一筆的 `properties.identifier.uuid`。
pub async fn fetch_all<S: SearchSource + ?Sized>(
    source: &S,
    query: &SearchQuery,
    delay: Duration,
) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut after_id: Option<String> = None;
    let mut page_number = 0usize;

    loop {
        page_number += 1;
        let request = query.page(after_id.take());
        let page = source.fetch_page(&request).await?;
        let count = page.entities.len();

        tracing::debug!("📄 Page {}: {} entities", page_number, count);

        if count == 0 {
            break;
        }

        let cursor = page
            .entities
            .last()
            .and_then(|e| safe_get(&e.data, &["properties", "identifier", "uuid"]))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        records.extend(page.entities);

        if count < query.limit {
            break;
        }

        match cursor {
            Some(id) => after_id = Some(id),
            None => {
                tracing::warn!(
                    "⚠️ Last entity of page {} has no identifier uuid, stopping pagination",
                    page_number
                );
                break;
            }
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    tracing::info!(
        "📡 Fetched {} records across {} page(s)",
        records.len(),
        page_number
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RecordPage;
    use crate::domain::query::SearchRequest;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 依序回傳預先準備好的頁面，並記錄每次請求的 cursor
    struct MockSource {
        pages: Mutex<Vec<Vec<Record>>>,
        cursors: Mutex<Vec<Option<String>>>,
    }

    impl MockSource {
        fn new(page_sizes: &[usize]) -> Self {
            let mut next_id = 0;
            let pages = page_sizes
                .iter()
                .map(|size| {
                    (0..*size)
                        .map(|_| {
                            next_id += 1;
                            entity(&format!("uuid-{}", next_id))
                        })
                        .collect()
                })
                .collect();
            Self {
                pages: Mutex::new(pages),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchSource for MockSource {
        async fn fetch_page(&self, request: &SearchRequest) -> Result<RecordPage> {
            self.cursors.lock().unwrap().push(request.after_id.clone());
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                return Err(EtlError::ProcessingError {
                    message: "fetched past the last page".to_string(),
                });
            }
            Ok(RecordPage {
                entities: pages.remove(0),
            })
        }
    }

    fn entity(uuid: &str) -> Record {
        Record::new(serde_json::json!({
            "properties": {"identifier": {"uuid": uuid, "value": uuid}}
        }))
    }

    fn query(limit: usize) -> SearchQuery {
        SearchQuery::founded_between(&["identifier"], "2024-01-01", "2024-12-31", &[], limit)
    }

    #[tokio::test]
    async fn test_stops_on_short_page() {
        let source = MockSource::new(&[1000, 3, 50]);
        let records = fetch_all(&source, &query(1000), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(records.len(), 1003);
        assert_eq!(
            source.cursors(),
            vec![None, Some("uuid-1000".to_string())]
        );
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let source = MockSource::new(&[2, 2, 0]);
        let records = fetch_all(&source, &query(2), Duration::ZERO).await.unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(source.cursors().len(), 3);
        assert_eq!(source.cursors()[2], Some("uuid-4".to_string()));
    }

    #[tokio::test]
    async fn test_preserves_order_across_pages() {
        let source = MockSource::new(&[2, 1]);
        let records = fetch_all(&source, &query(2), Duration::ZERO).await.unwrap();

        let ids: Vec<&str> = records
            .iter()
            .map(|r| r.data["properties"]["identifier"]["uuid"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["uuid-1", "uuid-2", "uuid-3"]);
    }

    #[tokio::test]
    async fn test_first_page_empty_yields_nothing() {
        let source = MockSource::new(&[0]);
        let records = fetch_all(&source, &query(10), Duration::ZERO).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_missing_cursor_stops_loop() {
        let source = MockSource::new(&[]);
        source.pages.lock().unwrap().push(vec![
            entity("a"),
            Record::new(serde_json::json!({"properties": {}})),
        ]);

        let records = fetch_all(&source, &query(2), Duration::ZERO).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(source.cursors().len(), 1);
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let source = MockSource::new(&[2]);
        let result = fetch_all(&source, &query(2), Duration::ZERO).await;
        assert!(matches!(result, Err(EtlError::ProcessingError { .. })));
    }
}
