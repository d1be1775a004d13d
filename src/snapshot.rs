//! 列表页快照
//! 落盘保存最近一次成功抓到的原始 HTML，线上被人机校验拦截时用它离线兜底。
//! 抽象成 trait 以便测试里换成内存实现。

use std::fs;
use std::path::PathBuf;

/// 默认快照路径（相对进程工作目录）
pub const SNAPSHOT_PATH: &str = "last_comicat_page.html";

pub trait PageCache: Send + Sync {
    /// 覆盖写入快照
    fn store(&self, html: &str) -> std::io::Result<()>;
    /// 读取快照，不存在或读不出来返回 None
    fn load(&self) -> Option<String>;
}

/// 文件快照，单个固定路径
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new(SNAPSHOT_PATH)
    }
}

impl PageCache for FileCache {
    fn store(&self, html: &str) -> std::io::Result<()> {
        fs::write(&self.path, html)
    }

    fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }
}

/// 内存快照，测试专用
#[cfg(test)]
pub struct MemCache(pub std::sync::Mutex<Option<String>>);

#[cfg(test)]
impl MemCache {
    pub fn empty() -> Self {
        Self(std::sync::Mutex::new(None))
    }

    pub fn with(html: &str) -> Self {
        Self(std::sync::Mutex::new(Some(html.to_string())))
    }
}

#[cfg(test)]
impl PageCache for MemCache {
    fn store(&self, html: &str) -> std::io::Result<()> {
        *self.0.lock().unwrap() = Some(html.to_string());
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.0.lock().unwrap().clone()
    }
}
