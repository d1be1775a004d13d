//! HTTP 客户端构造
//! 一次抓取共用一个 Client（连接复用），带上桌面浏览器请求头降低被拦截概率

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, COOKIE};
use reqwest::{redirect, Client};
use std::time::Duration;
use thiserror::Error;

/// 列表页请求超时
const TIMEOUT_SECONDS: u64 = 12;
/// 详情页补抓超时（见 parser 模块）
pub const DETAIL_TIMEOUT_SECONDS: u64 = 6;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("请求超时")]
    Timeout,
    #[error("请求失败: {0}")]
    RequestFailed(String),
    #[error("构建客户端失败: {0}")]
    BuildFailed(String),
}

/// 构建抓取用的 Client。cookie 非空时作为 Cookie 头附带
/// （COMICAT_COOKIE，预先从浏览器里拿到的会话 cookie）
pub fn build_client(cookie: Option<&str>) -> Result<Client, HttpClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    if let Some(cookie) = cookie.map(str::trim).filter(|c| !c.is_empty()) {
        let value = HeaderValue::from_str(cookie)
            .map_err(|e| HttpClientError::BuildFailed(format!("非法 Cookie 值: {e}")))?;
        headers.insert(COOKIE, value);
    }

    Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECONDS))
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .redirect(redirect::Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| HttpClientError::BuildFailed(e.to_string()))
}

/// GET 请求并返回响应正文。
/// 注意：不校验状态码——拦截页往往也是 200/403 带正文，交给上层的挑战页检测
pub async fn get_text(client: &Client, url: &str) -> Result<String, HttpClientError> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            HttpClientError::Timeout
        } else {
            HttpClientError::RequestFailed(e.to_string())
        }
    })?;

    response
        .text()
        .await
        .map_err(|e| HttpClientError::RequestFailed(e.to_string()))
}
