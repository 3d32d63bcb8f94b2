use crate::domain::model::{Dataset, Row};
use crate::utils::error::{EtlError, Result};

/// 輸出 CSV：一行表頭，之後每個 Row 一行；None 寫成空欄位
pub fn write_dataset(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&dataset.columns)?;

    for row in &dataset.rows {
        writer.write_record(row.cells.iter().map(|c| c.as_deref().unwrap_or("")))?;
    }

    writer.into_inner().map_err(|e| EtlError::ProcessingError {
        message: format!("Failed to flush CSV writer: {}", e),
    })
}

/// 讀取 CSV：空欄位視為缺值，欄位數不齊的列補齊或截斷成表頭寬度
pub fn read_dataset(data: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(EtlError::ProcessingError {
            message: "CSV input has no header row".to_string(),
        });
    }

    let mut dataset = Dataset::new(columns);
    for record in reader.records() {
        let record = record?;
        let cells = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        dataset.push_row(Row::new(cells));
    }

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_dataset_keeps_row_order_and_blanks() {
        let mut ds = Dataset::new(vec!["uuid".into(), "name".into(), "categories".into()]);
        ds.push_row(Row::new(vec![Some("2".into()), Some("Beta, Inc".into()), None]));
        ds.push_row(Row::new(vec![Some("1".into()), None, Some("A;B".into())]));

        let text = String::from_utf8(write_dataset(&ds).unwrap()).unwrap();
        assert_eq!(text, "uuid,name,categories\n2,\"Beta, Inc\",\n1,,A;B\n");
    }

    #[test]
    fn test_write_empty_dataset_has_header() {
        let ds = Dataset::new(vec!["a".into(), "b".into()]);
        let text = String::from_utf8(write_dataset(&ds).unwrap()).unwrap();
        assert_eq!(text, "a,b\n");
    }

    #[test]
    fn test_read_dataset_maps_empty_to_missing() {
        let ds = read_dataset(b"uuid,name\n1,Acme\n2,\n").unwrap();
        assert_eq!(ds.columns, vec!["uuid", "name"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value(0, "name"), Some("Acme"));
        assert_eq!(ds.value(1, "name"), None);
    }

    #[test]
    fn test_read_dataset_tolerates_ragged_rows() {
        let ds = read_dataset(b"a,b,c\n1\n1,2,3,4\n").unwrap();
        assert_eq!(ds.rows[0].cells, vec![Some("1".into()), None, None]);
        assert_eq!(ds.rows[1].cells.len(), 3);
    }

    #[test]
    fn test_read_dataset_rejects_empty_input() {
        assert!(read_dataset(b"").is_err());
    }
}
