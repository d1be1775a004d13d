//! 抓取入口
//! 实际抓取 https://comicat.org/today-1.html ，使用专用表格解析器：
//! - 如设置 COMICAT_COOKIE，则携带 Cookie，减少被网关拦截的概率
//! - 成功抓到真实页面时落盘快照，被人机校验拦截时用快照离线兜底
//! - 会对前 N 条详情页尝试补抓磁力/下载链接

use crate::http_client::{build_client, get_text};
use crate::parser::{extract_entries, HttpResolver, ResolveDownload};
use crate::snapshot::PageCache;
use crate::text::looks_like_captcha;
use crate::timeparse::now_local;
use crate::types::AnimeInfo;
use once_cell::sync::Lazy;
use tracing::{info, warn};
use url::Url;

pub const BASE_URL: &str = "https://comicat.org/";
pub const TODAY_URL: &str = "https://comicat.org/today-1.html";
pub const SOURCE_LABEL: &str = "comicat.org";

pub static BASE: Lazy<Url> = Lazy::new(|| Url::parse(BASE_URL).expect("invalid base url"));

/// 详情页补抓上限：N 行最多只多发这么多请求
const MAX_DETAIL_FETCH: usize = 12;
/// 最终返回的条目上限
const RESULT_LIMIT: usize = 5;

const DIAG_OK: &str = "OK";
const DIAG_FROM_CACHE: &str = "线上页面被验证码拦截，使用本地缓存解析";
const DIAG_STILL_BLOCKED: &str =
    "仍然是验证码/人机校验页面（没有本地缓存可用，请检查/更新 COMICAT_COOKIE）";
const DIAG_NO_ENTRIES: &str =
    "页面结构已加载，但没有从表格中解析到条目（可能页面改版或选择器不匹配）";

/// 抓取今日列表页。返回 (条目, 诊断信息)。
/// 只有列表页本身的网络错误会作为 Err 冒出去，其余情况一律退化成空列表 + 诊断信息。
pub async fn scrape_comicat_today(cache: &dyn PageCache) -> anyhow::Result<(Vec<AnimeInfo>, String)> {
    let cookie = std::env::var("COMICAT_COOKIE").ok();

    let client = build_client(cookie.as_deref())?;
    let html = get_text(&client, TODAY_URL).await?;

    let (html, diag) = match settle_fetched_page(html, cache) {
        Ok(pair) => pair,
        Err(msg) => return Ok((Vec::new(), msg.to_string())),
    };

    // 表格专用解析器 +（前 N 条）详情页补抓磁力，复用同一个连接
    let resolver = HttpResolver { client: &client };
    let mut items = extract_entries(
        &html,
        Some(&resolver as &dyn ResolveDownload),
        MAX_DETAIL_FETCH,
        now_local(),
    )
    .await;

    if items.is_empty() {
        return Ok((Vec::new(), DIAG_NO_ENTRIES.to_string()));
    }

    info!("抓取到 {} 条，返回前 {} 条", items.len(), RESULT_LIMIT.min(items.len()));
    items.truncate(RESULT_LIMIT);
    Ok((items, diag.to_string()))
}

/// 拦截检测 + 快照读写。
/// - 真实页面：覆盖快照（写失败只记日志），原文继续
/// - 拦截页且有快照：改用快照解析
/// - 拦截页且无快照：Err(提示信息)，不再尝试解析
/// 拦截页永远不会写进快照，保证快照里只有最近一次成功抓到的页面。
fn settle_fetched_page(
    html: String,
    cache: &dyn PageCache,
) -> Result<(String, &'static str), &'static str> {
    if looks_like_captcha(&html) {
        warn!("列表页被人机校验拦截");
        return match cache.load() {
            Some(cached) => Ok((cached, DIAG_FROM_CACHE)),
            None => Err(DIAG_STILL_BLOCKED),
        };
    }

    if let Err(e) = cache.store(&html) {
        warn!("快照写入失败: {e}");
    }
    Ok((html, DIAG_OK))
}
