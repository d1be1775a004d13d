//! 文本清洗与启发式字段提取
//! 大小/清晰度都从自由文本里猜，猜不到时返回约定的兜底值

use once_cell::sync::Lazy;
use regex::Regex;

/// 大小兜底值
pub const UNKNOWN_SIZE: &str = "未知大小";
/// 清晰度兜底值
pub const UNKNOWN_QUALITY: &str = "unknown";

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

static SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+(?:\.\d+)?\s?(?:GB|GiB|MB|MiB|KB)").expect("invalid size regex")
});

/// 清晰度匹配规则，按优先级从高到低排列，命中即返回。
/// 高分辨率/编码标记信息量更大，标题里同时出现多个时必须赢。
static QUALITY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"2160p|4K|UHD",
        r"1080p|BDRip|BluRay|WEB[- ]?DL|WEB[- ]?Rip|HEVC|x265|x264",
        r"720p",
    ]
    .iter()
    .map(|pat| Regex::new(&format!("(?i){pat}")).expect("invalid quality regex"))
    .collect()
});

/// 挑战页特征（人机校验拦截页），全部按小写子串匹配
const CAPTCHA_MARKERS: &[&str] = &["i'm not a robot", "captcha", "visitor-test-form", "visitor_test"];

/// 把连续空白（含换行）折叠成单个空格并去掉首尾空白
pub fn clean_text(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// 从文本里提取第一个 `<数字>(.<数字>)? <单位>` 形式的大小标记。
/// 匹配不到时原样返回输入（由调用方决定是否有意义），输入为空则返回兜底值。
pub fn guess_size(text: &str) -> String {
    if let Some(m) = SIZE_RE.find(text) {
        return m.as_str().to_string();
    }
    if text.is_empty() {
        UNKNOWN_SIZE.to_string()
    } else {
        text.to_string()
    }
}

/// 从标题里猜清晰度，按 QUALITY_PATTERNS 的分组优先级取第一个命中的子串
pub fn guess_quality(text: &str) -> String {
    for pat in QUALITY_PATTERNS.iter() {
        if let Some(m) = pat.find(text) {
            return m.as_str().to_string();
        }
    }
    UNKNOWN_QUALITY.to_string()
}

/// 判断抓回来的 HTML 是不是人机校验页而非真实内容
pub fn looks_like_captcha(html: &str) -> bool {
    let lower = html.to_lowercase();
    CAPTCHA_MARKERS.iter().any(|m| lower.contains(m))
}
