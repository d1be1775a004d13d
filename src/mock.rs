//! 本地兜底数据
//! 真实站点完全不可用时可以切到这份演示数据，字段形状和线上抓取结果一致

use crate::timeparse::now_local;
use crate::types::AnimeInfo;

/// 演示数据的来源标识
#[allow(dead_code)]
pub const MOCK_SOURCE: &str = "mock.fallback";

/// 生成一批演示条目，时间统一用当前时刻
#[allow(dead_code)]
pub fn mock_scrape_latest() -> Vec<AnimeInfo> {
    let now_iso = now_local().to_rfc3339();
    vec![
        AnimeInfo {
            title: "【演示】数码宝贝 BEATBREAK - 04 [WebRip 1080p HEVC-10bit AAC][简繁内封字幕]"
                .to_string(),
            url: "magnet:?xt=urn:btih:fakehash-123".to_string(),
            size: "567.6MB".to_string(),
            quality: "1080p HEVC".to_string(),
            date: now_iso.clone(),
            source: MOCK_SOURCE.to_string(),
        },
        AnimeInfo {
            title: "【演示】不擅吸血的吸血鬼 - 03 (Baha 1920x1080 AVC AAC MP4)".to_string(),
            url: "https://comicat.org/show-eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee.html".to_string(),
            size: "416.7MB".to_string(),
            quality: "1080p AVC".to_string(),
            date: now_iso.clone(),
            source: MOCK_SOURCE.to_string(),
        },
        AnimeInfo {
            title: "【演示】葬送的芙莉莲 - 第07集 简体内嵌".to_string(),
            url: "magnet:?xt=urn:btih:fakehash1111".to_string(),
            size: "1.23 GB".to_string(),
            quality: "1080p WEBRip".to_string(),
            date: now_iso,
            source: MOCK_SOURCE.to_string(),
        },
    ]
}
