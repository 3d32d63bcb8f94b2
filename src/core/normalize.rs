use regex::Regex;
use std::sync::LazyLock;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]").expect("static regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// 名稱比對前的標準化：缺值變空字串，非 ASCII 英數字元換成空白，
/// 連續空白合併為一個並去頭尾。
pub fn normalize_name(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let replaced = NON_ALNUM.replace_all(text, " ");
    WHITESPACE.replace_all(&replaced, " ").trim().to_string()
}
