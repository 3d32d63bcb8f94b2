use crate::domain::model::{Dataset, Row};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

/// 依優先順序嘗試的 join key
pub const JOIN_KEYS: &[&str] = &["uuid", "permalink"];

pub const COLLISION_SUFFIX: &str = "_financial";

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub dataset: Dataset,
    pub key: String,
    /// 改用第二份資料版本的欄位
    pub replaced_columns: Vec<String>,
}

pub fn choose_join_key(primary: &Dataset, secondary: &Dataset) -> Result<&'static str> {
    JOIN_KEYS
        .iter()
        .copied()
        .find(|key| primary.has_column(key) && secondary.has_column(key))
        .ok_or_else(|| EtlError::NoCommonJoinKey {
            candidates: JOIN_KEYS.iter().map(|k| k.to_string()).collect(),
        })
}

/// 以 `secondary` left join 到 `primary`。
///
/// `primary` 的每一列都會保留；重複欄名先在第二份加上 `_financial`，
/// 之後保留非缺值較多的一方（同數時保留 `primary`）並移除加尾碼的欄位。
pub fn merge_datasets(primary: &Dataset, secondary: &Dataset) -> Result<MergeOutcome> {
    let key = choose_join_key(primary, secondary)?;
    tracing::info!("🔗 Merging on {}", key);

    let primary_key = primary.column_index(key).unwrap_or_default();
    let secondary_key = secondary.column_index(key).unwrap_or_default();

    let mut lookup: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, row) in secondary.rows.iter().enumerate() {
        if let Some(value) = row.get(secondary_key).filter(|v| !v.trim().is_empty()) {
            lookup.entry(value).or_default().push(i);
        }
    }

    // 第二份資料中除了 key 以外的欄位
    let carried: Vec<usize> = (0..secondary.columns.len())
        .filter(|i| *i != secondary_key)
        .collect();

    let mut columns = primary.columns.clone();
    let mut collisions: Vec<(usize, usize)> = Vec::new();
    for &i in &carried {
        let name = &secondary.columns[i];
        match primary.column_index(name) {
            Some(original) => {
                collisions.push((original, columns.len()));
                columns.push(format!("{}{}", name, COLLISION_SUFFIX));
            }
            None => columns.push(name.clone()),
        }
    }

    let mut merged = Dataset::new(columns);
    for row in &primary.rows {
        let matches = row
            .get(primary_key)
            .and_then(|value| lookup.get(value))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        if matches.is_empty() {
            merged.push_row(row.clone());
            continue;
        }

        for &m in matches {
            let other = &secondary.rows[m];
            let mut cells = row.cells.clone();
            cells.resize(primary.columns.len(), None);
            cells.extend(carried.iter().map(|&i| other.cells.get(i).cloned().flatten()));
            merged.push_row(Row::new(cells));
        }
    }

    let replaced_columns = resolve_collisions(&mut merged, &collisions);

    Ok(MergeOutcome {
        dataset: merged,
        key: key.to_string(),
        replaced_columns,
    })
}

fn resolve_collisions(merged: &mut Dataset, collisions: &[(usize, usize)]) -> Vec<String> {
    let mut replaced = Vec::new();

    for &(original, suffixed) in collisions {
        let original_name = merged.columns[original].clone();
        let suffixed_name = merged.columns[suffixed].clone();

        if merged.non_missing_count(&suffixed_name) > merged.non_missing_count(&original_name) {
            tracing::debug!("Using {} values for {}", suffixed_name, original_name);
            for row in &mut merged.rows {
                row.cells[original] = row.cells[suffixed].take();
            }
            replaced.push(original_name);
        }
    }

    let mut drop: Vec<usize> = collisions.iter().map(|(_, s)| *s).collect();
    drop.sort_unstable_by(|a, b| b.cmp(a));
    for index in drop {
        merged.columns.remove(index);
        for row in &mut merged.rows {
            row.cells.remove(index);
        }
    }

    replaced
}
