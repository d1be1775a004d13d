//! 发表时间解析
//! 站点时间列是 "今天 21:41" / "昨天 08:12" / "2025-10-26 21:41" 三种格式，
//! 统一解析成带固定时区偏移的时间点

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// 站点时区：台北 UTC+8（无夏令时，固定偏移即可），
/// 服务器本地时区可能不是台北，这里显式指定
pub static TZ: Lazy<FixedOffset> =
    Lazy::new(|| FixedOffset::east_opt(8 * 3600).expect("invalid UTC+8 offset"));

static RELATIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(今天|昨天)\s+(\d{1,2}):(\d{2})$").expect("invalid relative time regex"));

static ABSOLUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})\s+(\d{1,2}):(\d{2})$")
        .expect("invalid absolute time regex")
});

/// 当前站点时区时间
pub fn now_local() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&*TZ)
}

/// 解析时间列文本。识别不了的文本一律回退成 `now`
/// （下游按时间排序依赖这个兜底行为，不要改成报错）。
pub fn parse_cn_time(cell_text: &str, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let t = cell_text.trim();

    // 今天/昨天 HH:MM
    if let Some(caps) = RELATIVE_RE.captures(t) {
        let base = if &caps[1] == "今天" {
            now.date_naive()
        } else {
            (now - Duration::days(1)).date_naive()
        };
        let (hh, mm) = (parse_u32(&caps[2]), parse_u32(&caps[3]));
        if let Some(dt) = TZ
            .with_ymd_and_hms(base.year(), base.month(), base.day(), hh, mm, 0)
            .single()
        {
            return dt;
        }
        return now;
    }

    // YYYY-MM-DD HH:MM
    if let Some(caps) = ABSOLUTE_RE.captures(t) {
        let y = caps[1].parse::<i32>().unwrap_or(now.year());
        let (mo, d, hh, mm) = (
            parse_u32(&caps[2]),
            parse_u32(&caps[3]),
            parse_u32(&caps[4]),
            parse_u32(&caps[5]),
        );
        if let Some(dt) = TZ.with_ymd_and_hms(y, mo, d, hh, mm, 0).single() {
            return dt;
        }
    }

    // 兜底：用 now
    now
}

fn parse_u32(s: &str) -> u32 {
    s.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<FixedOffset> {
        TZ.with_ymd_and_hms(2025, 10, 26, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_today() {
        let dt = parse_cn_time("今天 21:41", fixed_now());
        assert_eq!(dt.to_rfc3339(), "2025-10-26T21:41:00+08:00");
    }

    #[test]
    fn test_parse_yesterday() {
        let dt = parse_cn_time("昨天 08:12", fixed_now());
        assert_eq!(dt.to_rfc3339(), "2025-10-25T08:12:00+08:00");
    }

    #[test]
    fn test_parse_absolute() {
        let dt = parse_cn_time("2025-09-30 07:05", fixed_now());
        assert_eq!(dt.to_rfc3339(), "2025-09-30T07:05:00+08:00");
    }

    #[test]
    fn test_fallback_to_now() {
        let now = fixed_now();
        assert_eq!(parse_cn_time("not a date", now), now);
        assert_eq!(parse_cn_time("", now), now);
        // 日期字段非法时同样回退
        assert_eq!(parse_cn_time("2025-13-40 99:99", now), now);
    }
}
