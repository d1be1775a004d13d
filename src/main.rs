mod crawler;
mod http_client;
mod mock;
mod parser;
mod snapshot;
mod text;
mod timeparse;
mod types;

use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    // 读 .env（COMICAT_COOKIE / PORT）
    dotenvy::dotenv().ok();

    // 初始化日志
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // CORS 配置，允许前端仪表盘跨域访问
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // 路由
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/scrape", get(scrape_handler))
        .layer(cors);

    // 启动服务器
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8001);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("🚀 动漫资源抓取 API 启动在 http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// GET /health - 健康检查
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// GET /scrape - 抓取今日动漫资源。
///
/// 前端约定的两种返回格式：
/// 1) 成功: 单条资源的 JSON 对象
/// 2) 失败/无数据: {"error": "..."}
///
/// 抓取层最多返回 5 条，这里目前只回第一条——现有前端就是按单条解析的，
/// 改成返回数组前需要和前端一起动。
async fn scrape_handler() -> impl IntoResponse {
    let cache = snapshot::FileCache::default();

    match crawler::scrape_comicat_today(&cache).await {
        Ok((items, diag)) => {
            if items.is_empty() {
                info!("本次抓取无结果: {diag}");
                return Json(json!({"error": "No new anime releases today."}));
            }
            info!("本次抓取 {} 条 ({diag})", items.len());
            Json(json!(items[0]))
        }
        // 出异常时也用 {error: "..."} 而不是抛 500，前端逻辑在等 error 字段
        Err(e) => {
            warn!("抓取失败: {e}");
            Json(json!({"error": format!("Scrape failed: {e}")}))
        }
    }
}
