use crate::core::normalize::normalize_name;
use crate::domain::model::{Dataset, Row};
use crate::domain::ports::{NameMatch, NameMatcher};
use crate::utils::error::{EtlError, Result};
use std::collections::{HashMap, HashSet};

const LEGAL_SUFFIXES: &[&str] = &[
    "ab", "ag", "bv", "co", "company", "corp", "corporation", "gmbh", "inc", "incorporated",
    "kg", "limited", "llc", "llp", "lp", "ltd", "nv", "oy", "plc", "pte", "pty", "sa", "sarl",
    "sas", "spa", "srl",
];

#[derive(Debug, Clone)]
pub struct MatcherOptions {
    /// 先以字元 bigram cosine 挑出的候選數
    pub top_n: usize,
    pub lowercase: bool,
    pub remove_punctuation: bool,
    pub remove_non_ascii: bool,
    pub legal_suffixes: bool,
    pub common_words: bool,
    /// 出現在超過此比例 master 名稱中的字視為常用字
    pub common_word_ratio: f64,
    /// 常用字至少要出現在這麼多筆 master 名稱中
    pub common_word_min_count: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            lowercase: true,
            remove_punctuation: true,
            remove_non_ascii: true,
            legal_suffixes: true,
            common_words: true,
            common_word_ratio: 0.02,
            common_word_min_count: 10,
        }
    }
}

struct MasterEntry {
    original: String,
    processed: String,
    bigrams: HashMap<(char, char), f64>,
    norm: f64,
}

/// 以 strsim 計算的預設比對器。
///
/// 先用 bigram cosine 取 top-N 候選，再以 normalized Levenshtein、
/// Sørensen–Dice 與 token-sort ratio 的平均（0–100）挑出最佳者。
pub struct FuzzyNameMatcher {
    options: MatcherOptions,
    common: HashSet<String>,
    master: Vec<MasterEntry>,
}

impl FuzzyNameMatcher {
    pub fn new(options: MatcherOptions) -> Self {
        Self {
            options,
            common: HashSet::new(),
            master: Vec::new(),
        }
    }

    fn clean(&self, name: &str) -> String {
        let mut text = if self.options.lowercase {
            name.to_lowercase()
        } else {
            name.to_string()
        };
        if self.options.remove_non_ascii {
            text.retain(|c| c.is_ascii());
        }
        if self.options.remove_punctuation {
            text = text
                .chars()
                .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
                .collect();
        }
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn strip_words(&self, cleaned: &str) -> String {
        let kept: Vec<&str> = cleaned
            .split_whitespace()
            .filter(|w| {
                let lower = w.to_lowercase();
                !(self.options.legal_suffixes && LEGAL_SUFFIXES.contains(&lower.as_str()))
                    && !self.common.contains(&lower)
            })
            .collect();

        // 全部被移除時保留原字串，避免空名稱
        if kept.is_empty() {
            cleaned.to_string()
        } else {
            kept.join(" ")
        }
    }

    fn process(&self, name: &str) -> String {
        self.strip_words(&self.clean(name))
    }

    fn find_common_words(&self, cleaned: &[String]) -> HashSet<String> {
        if !self.options.common_words || cleaned.is_empty() {
            return HashSet::new();
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        for name in cleaned {
            let unique: HashSet<String> = name.split_whitespace().map(str::to_lowercase).collect();
            for word in unique {
                *counts.entry(word).or_default() += 1;
            }
        }

        let threshold = cleaned.len() as f64 * self.options.common_word_ratio;
        counts
            .into_iter()
            .filter(|(_, n)| *n >= self.options.common_word_min_count && *n as f64 > threshold)
            .map(|(w, _)| w)
            .collect()
    }
}

impl Default for FuzzyNameMatcher {
    fn default() -> Self {
        Self::new(MatcherOptions::default())
    }
}

fn bigram_vector(text: &str) -> (HashMap<(char, char), f64>, f64) {
    let padded: Vec<char> = format!(" {} ", text).chars().collect();
    let mut counts = HashMap::new();
    for pair in padded.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0.0) += 1.0;
    }
    let norm = counts.values().map(|v| v * v).sum::<f64>().sqrt();
    (counts, norm)
}

fn cosine(a: &HashMap<(char, char), f64>, a_norm: f64, entry: &MasterEntry) -> f64 {
    if a_norm == 0.0 || entry.norm == 0.0 {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(k, v)| entry.bigrams.get(k).map(|w| v * w))
        .sum();
    dot / (a_norm * entry.norm)
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let sort = |s: &str| {
        let mut tokens: Vec<&str> = s.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    };
    strsim::normalized_levenshtein(&sort(a), &sort(b))
}

/// 三種相似度的平均，換算成 0–100
pub fn combined_score(a: &str, b: &str) -> f64 {
    let scores = [
        strsim::normalized_levenshtein(a, b),
        strsim::sorensen_dice(a, b),
        token_sort_ratio(a, b),
    ];
    scores.iter().sum::<f64>() / scores.len() as f64 * 100.0
}

impl NameMatcher for FuzzyNameMatcher {
    fn load_master(&mut self, names: Vec<String>) {
        let cleaned: Vec<String> = names.iter().map(|n| self.clean(n)).collect();
        self.common = self.find_common_words(&cleaned);
        if !self.common.is_empty() {
            tracing::debug!("Ignoring {} common words in master list", self.common.len());
        }

        self.master = names
            .into_iter()
            .zip(cleaned)
            .map(|(original, cleaned)| {
                let processed = self.strip_words(&cleaned);
                let (bigrams, norm) = bigram_vector(&processed);
                MasterEntry {
                    original,
                    processed,
                    bigrams,
                    norm,
                }
            })
            .collect();
    }

    fn match_name(&self, query: &str) -> Option<NameMatch> {
        let processed = self.process(query);
        if processed.is_empty() {
            return None;
        }

        let (bigrams, norm) = bigram_vector(&processed);
        let mut candidates: Vec<(usize, f64)> = self
            .master
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.processed.is_empty())
            .map(|(i, e)| (i, cosine(&bigrams, norm, e)))
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        candidates.truncate(self.options.top_n.max(1));

        let mut best: Option<NameMatch> = None;
        for (index, _) in candidates {
            let entry = &self.master[index];
            let score = combined_score(&processed, &entry.processed);
            if best.as_ref().map(|b| score > b.score).unwrap_or(true) {
                best = Some(NameMatch {
                    index,
                    name: entry.original.clone(),
                    score,
                });
            }
        }
        best
    }
}

/// 比對流程使用的欄位名稱
#[derive(Debug, Clone)]
pub struct MatchColumns {
    pub master_name: String,
    pub query_name: String,
    pub query_id: String,
}

impl Default for MatchColumns {
    fn default() -> Self {
        Self {
            master_name: "co1".to_string(),
            query_name: "co2".to_string(),
            query_id: "idp".to_string(),
        }
    }
}

fn require_column(dataset: &Dataset, column: &str, role: &str) -> Result<()> {
    if dataset.has_column(column) {
        Ok(())
    } else {
        Err(EtlError::ConfigError {
            message: format!("Column '{}' not found in {} dataset", column, role),
        })
    }
}

/// 以 master 全表比對 query 資料集的前 `sample_size` 筆，結果依列位置併回。
///
/// 輸出欄位為 `id, name, match_name, score, match_index, exact_match_check`
/// 中實際存在者。
pub fn match_dataset(
    master: &Dataset,
    queries: &Dataset,
    columns: &MatchColumns,
    sample_size: usize,
    matcher: &mut dyn NameMatcher,
) -> Result<Dataset> {
    require_column(master, &columns.master_name, "master")?;
    require_column(queries, &columns.query_name, "query")?;

    let master_clean: Vec<String> = master
        .column_values(&columns.master_name)
        .into_iter()
        .map(normalize_name)
        .collect();
    matcher.load_master(master_clean);

    let sample = queries.head(sample_size);
    tracing::info!(
        "🔎 Matching {} names against {} master names",
        sample.len(),
        master.len()
    );

    let clean_column = format!("{}_clean", columns.query_name);
    let mut combined_columns = sample.columns.clone();
    combined_columns.extend(
        [
            clean_column.as_str(),
            "match_name",
            "score",
            "match_index",
            "exact_match_check",
        ]
        .map(String::from),
    );
    let mut combined = Dataset::new(combined_columns);

    let names = sample.column_values(&columns.query_name);
    for (row, name) in sample.rows.iter().zip(names) {
        let clean = normalize_name(name);
        let found = matcher.match_name(&clean);
        let exact = found.as_ref().map(|m| m.name == clean).unwrap_or(false);

        let mut cells = row.cells.clone();
        cells.push(Some(clean));
        match found {
            Some(m) => {
                cells.push(Some(m.name));
                cells.push(Some(format!("{:.2}", m.score)));
                cells.push(Some(m.index.to_string()));
            }
            None => cells.extend([None, None, None]),
        }
        cells.push(Some(exact.to_string()));
        combined.push_row(Row::new(cells));
    }

    Ok(combined.select_columns(&[
        columns.query_id.as_str(),
        columns.query_name.as_str(),
        "match_name",
        "score",
        "match_index",
        "exact_match_check",
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        let mut ds = Dataset::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            ds.push_row(Row::new(
                row.iter()
                    .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
                    .collect(),
            ));
        }
        ds
    }

    /// 只做完全相等比對的替身，用來單獨測試併回邏輯
    struct ExactMatcher {
        master: Vec<String>,
    }

    impl NameMatcher for ExactMatcher {
        fn load_master(&mut self, names: Vec<String>) {
            self.master = names;
        }

        fn match_name(&self, query: &str) -> Option<NameMatch> {
            self.master
                .iter()
                .position(|n| n == query)
                .map(|index| NameMatch {
                    index,
                    name: self.master[index].clone(),
                    score: 100.0,
                })
        }
    }

    #[test]
    fn test_fuzzy_matcher_prefers_closest_name() {
        let mut matcher = FuzzyNameMatcher::default();
        matcher.load_master(vec![
            "Globex Corporation".to_string(),
            "Acme Rockets Inc".to_string(),
            "Initech".to_string(),
        ]);

        let found = matcher.match_name("ACME Rocket").unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.name, "Acme Rockets Inc");
        assert!(found.score > 80.0 && found.score <= 100.0);
    }

    #[test]
    fn test_fuzzy_matcher_ignores_legal_suffixes() {
        let mut matcher = FuzzyNameMatcher::default();
        matcher.load_master(vec!["Initech LLC".to_string(), "Initrode".to_string()]);

        let found = matcher.match_name("Initech Ltd").unwrap();
        assert_eq!(found.index, 0);
        assert!((found.score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_matcher_handles_empty_inputs() {
        let mut matcher = FuzzyNameMatcher::default();
        matcher.load_master(vec![]);
        assert!(matcher.match_name("Acme").is_none());

        matcher.load_master(vec!["Acme".to_string()]);
        assert!(matcher.match_name("").is_none());
        assert!(matcher.match_name("   ").is_none());
    }

    #[test]
    fn test_common_words_are_dropped_from_large_masters() {
        let mut names: Vec<String> = (0..20).map(|i| format!("Holdings Alpha{}", i)).collect();
        names.push("Zeta".to_string());
        let mut matcher = FuzzyNameMatcher::default();
        matcher.load_master(names);

        assert!(matcher.common.contains("holdings"));
        let found = matcher.match_name("Zeta Holdings").unwrap();
        assert_eq!(found.index, 20);
    }

    #[test]
    fn test_combined_score_bounds() {
        assert!((combined_score("acme", "acme") - 100.0).abs() < 1e-9);
        assert!(combined_score("acme", "zzzz") < 30.0);
        let forward = combined_score("rockets acme", "acme rockets");
        let backward = combined_score("acme rockets", "rockets acme");
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn test_match_dataset_joins_by_position() {
        let master = dataset(&["co1"], &[&["Acme, Inc."], &["Globex"]]);
        let queries = dataset(
            &["idp", "co2", "state2"],
            &[&["p1", "Globex", "CA"], &["p2", "Unknown Co", "NY"], &["p3", "Acme Inc", "TX"]],
        );
        let mut matcher = ExactMatcher { master: vec![] };

        let out = match_dataset(&master, &queries, &MatchColumns::default(), 100, &mut matcher)
            .unwrap();

        assert_eq!(
            out.columns,
            vec!["idp", "co2", "match_name", "score", "match_index", "exact_match_check"]
        );
        assert_eq!(out.len(), 3);
        assert_eq!(out.value(0, "match_index"), Some("1"));
        assert_eq!(out.value(0, "exact_match_check"), Some("true"));
        assert_eq!(out.value(1, "match_name"), None);
        assert_eq!(out.value(1, "exact_match_check"), Some("false"));
        assert_eq!(out.value(2, "match_name"), Some("Acme Inc"));
        assert_eq!(out.value(2, "score"), Some("100.00"));
    }

    #[test]
    fn test_match_dataset_samples_head() {
        let master = dataset(&["co1"], &[&["Acme"]]);
        let queries = dataset(&["co2"], &[&["Acme"], &["Acme"], &["Acme"]]);
        let mut matcher = FuzzyNameMatcher::default();

        let out = match_dataset(&master, &queries, &MatchColumns::default(), 2, &mut matcher)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.columns[0], "co2");
    }

    #[test]
    fn test_match_dataset_requires_name_columns() {
        let master = dataset(&["name"], &[&["Acme"]]);
        let queries = dataset(&["co2"], &[&["Acme"]]);
        let mut matcher = FuzzyNameMatcher::default();

        let err = match_dataset(&master, &queries, &MatchColumns::default(), 10, &mut matcher)
            .unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
    }

    #[test]
    fn test_fuzzy_exact_flag_compares_clean_names() {
        let master = dataset(&["co1"], &[&["Acme Rockets"]]);
        let queries = dataset(&["idp", "co2"], &[&["1", "acme-rockets"]]);
        let mut matcher = FuzzyNameMatcher::default();

        let out = match_dataset(&master, &queries, &MatchColumns::default(), 10, &mut matcher)
            .unwrap();
        assert_eq!(out.value(0, "match_name"), Some("Acme Rockets"));
        // "acme rockets" != "Acme Rockets"，分數滿分但不算完全相同
        assert_eq!(out.value(0, "exact_match_check"), Some("false"));
        assert_eq!(out.value(0, "score"), Some("100.00"));
    }
}
