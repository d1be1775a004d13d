//! 列表页专用 DOM 解析器（高精度）
//! 解析 table#listTable tbody#data_list 中的条目，生成 AnimeInfo 列表：
//! - 标题/链接：来自"标题"列的 <a>
//! - 大小：来自"大小"列
//! - 质量：从标题文本中猜
//! - 日期：解析"发表时间"列（今天/昨天/yyyy-mm-dd）
//! - URL：优先尝试详情页补抓磁力（最多补抓 max_detail 条；超过则直接用详情页 URL）

use crate::crawler::{BASE, SOURCE_LABEL};
use crate::http_client::DETAIL_TIMEOUT_SECONDS;
use crate::text::{clean_text, guess_quality, guess_size};
use crate::timeparse::parse_cn_time;
use crate::types::AnimeInfo;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

/// 列语义按位置固定
const COL_DATE: usize = 0;
#[allow(dead_code)]
const COL_CATEGORY: usize = 1; // 类别列暂时不用，保留扩展
const COL_TITLE: usize = 2;
const COL_SIZE: usize = 3;
/// 每行至少要有的单元格数，少于这个数的行直接跳过
const MIN_CELLS: usize = 4;

const MAGNET_PREFIX: &str = "magnet:?xt=urn:btih:";

static TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table#listTable tbody#data_list").expect("invalid table selector")
});
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("invalid link selector"));

/// 详情页链接解析器。实现必须自己吞掉所有失败，绝不向调用方抛错
#[async_trait]
pub trait ResolveDownload: Send + Sync {
    /// 尽力把详情页 URL 换成磁力/下载链接，失败时原样返回 detail_url
    async fn resolve(&self, detail_url: &str) -> String;
}

/// 走 HTTP 补抓详情页的解析器，与列表页抓取共用同一个 Client
pub struct HttpResolver<'a> {
    pub client: &'a Client,
}

#[async_trait]
impl ResolveDownload for HttpResolver<'_> {
    async fn resolve(&self, detail_url: &str) -> String {
        match self.try_fetch(detail_url).await {
            Some(link) => link,
            None => detail_url.to_string(),
        }
    }
}

impl HttpResolver<'_> {
    async fn try_fetch(&self, url: &str) -> Option<String> {
        let resp = self
            .client
            .get(url)
            .timeout(Duration::from_secs(DETAIL_TIMEOUT_SECONDS))
            .send()
            .await
            .map_err(|e| debug!("详情页请求失败 {url}: {e}"))
            .ok()?;
        if resp.status() != StatusCode::OK {
            return None;
        }
        let html = resp.text().await.ok()?;
        extract_download_link(&html)
    }
}

/// 在详情页 HTML 里找磁力链接，找不到再退而求其次找 .torrent / download 链接，
/// 都按文档顺序取第一个
pub fn extract_download_link(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let hrefs: Vec<String> = doc
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(|h| h.trim().to_string())
        .collect();

    if let Some(magnet) = hrefs.iter().find(|h| h.starts_with(MAGNET_PREFIX)) {
        return Some(magnet.clone());
    }

    hrefs
        .iter()
        .find(|h| {
            let lower = h.to_lowercase();
            lower.ends_with(".torrent") || lower.contains("download")
        })
        .cloned()
}

/// 从列表页解出来的一行，尚未补抓磁力
struct RawRow {
    date_text: String,
    title: String,
    detail_url: String,
    size_text: String,
}

/// 只取元素的直接子元素里名字匹配的那些（不吃畸形标记里嵌套出来的行）
fn direct_children<'a>(el: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == tag)
        .collect()
}

/// 同步解析阶段：定位表格、逐行取出字段。
/// 表格不存在返回空列表（页面改版的信号），不算错误。
fn parse_listing(html: &str) -> Vec<RawRow> {
    let doc = Html::parse_document(html);

    let tbody = match doc.select(&TABLE_SELECTOR).next() {
        Some(t) => t,
        None => return Vec::new(),
    };

    let mut rows = Vec::new();
    for tr in direct_children(tbody, "tr") {
        let tds = direct_children(tr, "td");
        if tds.len() < MIN_CELLS {
            continue;
        }

        // 发表时间
        let date_text = clean_text(&tds[COL_DATE].text().collect::<String>());

        // 标题 + 详情页链接
        let title_a = match tds[COL_TITLE].select(&LINK_SELECTOR).next() {
            Some(a) => a,
            None => continue,
        };
        let title = clean_text(&title_a.text().collect::<String>());
        let href = title_a.value().attr("href").unwrap_or_default().trim();
        let detail_url = match BASE.join(href) {
            Ok(u) => u.to_string(),
            Err(_) => href.to_string(),
        };

        // 大小
        let size_text = clean_text(&tds[COL_SIZE].text().collect::<String>());

        rows.push(RawRow {
            date_text,
            title,
            detail_url,
            size_text,
        });
    }
    rows
}

/// 解析列表页并生成记录，按文档顺序，不去重不排序。
/// 提供 resolver 时对前 max_detail 行补抓磁力链接（严格按行序逐条进行），
/// 超过上限的行直接用详情页 URL，把请求放大控制在常数级。
pub async fn extract_entries(
    html: &str,
    resolver: Option<&dyn ResolveDownload>,
    max_detail: usize,
    now: DateTime<FixedOffset>,
) -> Vec<AnimeInfo> {
    let rows = parse_listing(html);
    debug!("列表页解析出 {} 行", rows.len());

    let mut results = Vec::with_capacity(rows.len());
    let mut detail_fetch_count = 0usize;

    for row in rows {
        let mut final_url = row.detail_url.clone();
        if let Some(resolver) = resolver {
            if detail_fetch_count < max_detail {
                final_url = resolver.resolve(&row.detail_url).await;
                detail_fetch_count += 1;
            }
        }

        results.push(AnimeInfo {
            quality: guess_quality(&row.title),
            title: row.title,
            url: final_url,
            size: guess_size(&row.size_text),
            date: parse_cn_time(&row.date_text, now).to_rfc3339(),
            source: SOURCE_LABEL.to_string(),
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeparse::TZ;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixed_now() -> DateTime<FixedOffset> {
        TZ.with_ymd_and_hms(2025, 10, 26, 10, 0, 0).unwrap()
    }

    const LISTING_HTML: &str = r#"
    <html><body>
    <table id="listTable">
      <tbody id="data_list">
        <tr>
          <td>今天 12:30</td><td>动画</td>
          <td><a href="/show-aaa.html">  [字幕组] 番剧A [01][1080p]  </a></td>
          <td>624 MB</td>
        </tr>
        <tr>
          <td>昨天 08:12</td><td>动画</td><td>没有链接的行</td><td>1.2GB</td>
        </tr>
        <tr>
          <td>只有三个格子</td><td>动画</td><td><a href="/show-x.html">残行</a></td>
        </tr>
        <tr>
          <td>2025-10-25 21:41</td><td>动画</td>
          <td><a href="https://other.example/show-bbb.html">番剧B 2160p 1080p</a>
            <table><tbody><tr><td>嵌</td><td>套</td><td>行</td><td>别解析</td></tr></tbody></table>
          </td>
          <td>没写大小</td>
        </tr>
      </tbody>
    </table>
    </body></html>
    "#;

    #[tokio::test]
    async fn test_extract_entries_shape_and_order() {
        let entries = extract_entries(LISTING_HTML, None, 12, fixed_now()).await;
        // 4 行里：1 行缺 <a>，1 行不足 4 格，嵌套表格的行不算
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "[字幕组] 番剧A [01][1080p]");
        assert_eq!(first.url, "https://comicat.org/show-aaa.html");
        assert_eq!(first.size, "624 MB");
        assert_eq!(first.quality, "1080p");
        assert_eq!(first.date, "2025-10-26T12:30:00+08:00");
        assert_eq!(first.source, "comicat.org");

        let second = &entries[1];
        // 绝对链接不受 base 影响
        assert_eq!(second.url, "https://other.example/show-bbb.html");
        // 优先级分组：2160p 赢
        assert_eq!(second.quality, "2160p");
        // 大小列匹配不到时原样保留
        assert_eq!(second.size, "没写大小");
        assert_eq!(second.date, "2025-10-25T21:41:00+08:00");
    }

    #[tokio::test]
    async fn test_extract_entries_missing_table() {
        let entries = extract_entries("<html><body><p>改版了</p></body></html>", None, 12, fixed_now()).await;
        assert!(entries.is_empty());
    }

    struct CountingResolver {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ResolveDownload for CountingResolver {
        async fn resolve(&self, detail_url: &str) -> String {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            format!("magnet:?xt=urn:btih:resolved{n}&src={detail_url}")
        }
    }

    fn five_row_listing() -> String {
        let rows: String = (0..5)
            .map(|i| {
                format!(
                    "<tr><td>今天 10:0{i}</td><td>动画</td>\
                     <td><a href=\"/show-{i}.html\">条目{i} 1080p</a></td>\
                     <td>100MB</td></tr>"
                )
            })
            .collect();
        format!(
            "<table id=\"listTable\"><tbody id=\"data_list\">{rows}</tbody></table>"
        )
    }

    #[tokio::test]
    async fn test_detail_resolution_cap() {
        let resolver = CountingResolver {
            calls: AtomicUsize::new(0),
        };
        let entries =
            extract_entries(&five_row_listing(), Some(&resolver as &dyn ResolveDownload), 2, fixed_now()).await;

        assert_eq!(entries.len(), 5);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
        // 前 2 行拿到补抓结果，之后的行保持详情页 URL
        assert!(entries[0].url.starts_with(MAGNET_PREFIX));
        assert!(entries[1].url.starts_with(MAGNET_PREFIX));
        assert_eq!(entries[2].url, "https://comicat.org/show-2.html");
        assert_eq!(entries[3].url, "https://comicat.org/show-3.html");
        assert_eq!(entries[4].url, "https://comicat.org/show-4.html");
    }

    #[test]
    fn test_extract_download_link_magnet_first() {
        let html = r#"
        <a href="/rss.xml">RSS</a>
        <a href="https://example.com/files/a.torrent">torrent</a>
        <a href="magnet:?xt=urn:btih:abc">magnet</a>
        "#;
        // 磁力优先，即使 .torrent 链接在它前面
        assert_eq!(
            extract_download_link(html).as_deref(),
            Some("magnet:?xt=urn:btih:abc")
        );
    }

    #[test]
    fn test_extract_download_link_torrent_fallback() {
        let html = r#"<a href="/home">首页</a><a href="/files/b.TORRENT">下载</a>"#;
        assert_eq!(extract_download_link(html).as_deref(), Some("/files/b.TORRENT"));

        let html = r#"<a href="/home">首页</a><a href="/Download?id=9">下载</a>"#;
        assert_eq!(extract_download_link(html).as_deref(), Some("/Download?id=9"));

        assert_eq!(extract_download_link(r#"<a href="/home">首页</a>"#), None);
    }
}
