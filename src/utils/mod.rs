use once_cell::sync::Lazy;
use regex::Regex;

/// 只保留字母（含越南语等扩展拉丁字母）、数字和空白
static NON_SLUG_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("valid slug regex"));

/// 由标题文本生成 URL 锚点
///
/// 小写化后去掉其它字符，把空白合并成一个连字符，去掉首尾连字符。
/// 带声调的字母转写为 ASCII，例如 "Giá xi măng" 得到 "gia-xi-mang"。
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");

    stripped
        .split_whitespace()
        .map(slug::slugify)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string()
}

/// 确保路径以斜杠结尾
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}
