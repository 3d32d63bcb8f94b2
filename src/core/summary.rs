use crate::domain::model::{is_missing, Dataset};
use std::fmt;

/// 合併後要回報覆蓋率的財務欄位
pub const COVERAGE_COLUMNS: &[&str] = &[
    "funding_total_numeric",
    "num_funding_rounds",
    "last_funding_on",
    "revenue_range",
    "valuation_numeric",
    "num_investors",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSummary {
    pub total: usize,
    pub with_funding: usize,
    pub with_rounds: usize,
    pub total_funding: f64,
    pub average_funding: Option<f64>,
}

fn numeric(value: Option<&str>) -> Option<f64> {
    value?.trim().parse::<f64>().ok()
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// 12345.6 -> "12,346"
pub fn format_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut out = String::new();
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

impl FinancialSummary {
    /// 金額為 0 或無法解析者不算有募資資料
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let funded: Vec<f64> = dataset
            .column_values("funding_total_numeric")
            .into_iter()
            .filter_map(numeric)
            .filter(|v| *v != 0.0)
            .collect();

        let with_rounds = dataset
            .column_values("num_funding_rounds")
            .into_iter()
            .filter(|v| numeric(*v).map(|n| n != 0.0).unwrap_or(!is_missing(*v)))
            .count();

        let total_funding: f64 = funded.iter().sum();
        let average_funding = if funded.is_empty() {
            None
        } else {
            Some(total_funding / funded.len() as f64)
        };

        Self {
            total: dataset.len(),
            with_funding: funded.len(),
            with_rounds,
            total_funding,
            average_funding,
        }
    }
}

impl fmt::Display for FinancialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Financial Data Summary ===")?;
        writeln!(
            f,
            "Companies with funding data: {} ({:.1}%)",
            self.with_funding,
            percent(self.with_funding, self.total)
        )?;
        write!(
            f,
            "Companies with funding rounds data: {} ({:.1}%)",
            self.with_rounds,
            percent(self.with_rounds, self.total)
        )?;
        if self.total_funding > 0.0 {
            write!(
                f,
                "\nTotal funding across all companies: ${}",
                format_thousands(self.total_funding)
            )?;
        }
        if let Some(avg) = self.average_funding {
            write!(
                f,
                "\nAverage funding (for companies with funding): ${}",
                format_thousands(avg)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnCoverage {
    pub column: String,
    pub count: usize,
    pub percent: f64,
}

/// 只回報資料集中實際存在的欄位
pub fn coverage(dataset: &Dataset, columns: &[&str]) -> Vec<ColumnCoverage> {
    columns
        .iter()
        .filter(|c| dataset.has_column(c))
        .map(|c| {
            let count = dataset.non_missing_count(c);
            ColumnCoverage {
                column: c.to_string(),
                count,
                percent: percent(count, dataset.len()),
            }
        })
        .collect()
}

impl fmt::Display for ColumnCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} companies ({:.1}%)",
            self.column, self.count, self.percent
        )
    }
}

/// 比對結果預覽表（前 n 筆）
pub fn preview(dataset: &Dataset, columns: &[&str], n: usize) -> String {
    let view = dataset.select_columns(columns).head(n);
    let mut widths: Vec<usize> = view.columns.iter().map(|c| c.chars().count()).collect();
    for row in &view.rows {
        for (i, cell) in row.cells.iter().enumerate() {
            let len = cell.as_deref().unwrap_or("").chars().count();
            widths[i] = widths[i].max(len);
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(view.columns.iter().map(String::as_str).collect())];
    for row in &view.rows {
        out.push(line(
            row.cells.iter().map(|c| c.as_deref().unwrap_or("")).collect(),
        ));
    }
    out.join("\n")
}
