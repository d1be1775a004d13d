//! 数据结构定义
//! 字段必须和前端仪表盘保持一致

use serde::Serialize;

/// 单条动漫资源（构造后不再修改）
#[derive(Debug, Clone, Serialize)]
pub struct AnimeInfo {
    /// 资源标题，比如『葬送的芙莉莲 第07集』
    pub title: String,
    /// 下载地址：磁力链接 / .torrent 链接 / 详情页链接
    pub url: String,
    /// 文件大小，比如 "567.6MB"，解析不到则为 "未知大小"
    pub size: String,
    /// 清晰度/版本，比如 "1080p"，推断不出则为 "unknown"
    pub quality: String,
    /// 发布时间，ISO8601 字符串（带 +08:00 时区偏移）
    pub date: String,
    /// 来源站标识
    pub source: String,
}
