// source/mod.rs — 图片源模块入口
// 定义了图片搜索站（如 Unsplash）必须实现的通用 Trait
pub mod unsplash;

use async_trait::async_trait; // 异步 Trait 支持宏
use std::path::{Path, PathBuf};

/// 图片源的抽象 Trait
///
/// 两个操作都不返回错误：HTTP 状态码非 200、网络不可达、
/// 响应解析失败都统一折叠为 `None`，由调用方当作正常分支处理。
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// 搜索关键词，返回排名第一的结果的图片地址
    async fn search_top(&self, query: &str) -> Option<String>;

    /// 下载图片到 `dir/<stem>.<ext>`，成功时返回完整路径
    ///
    /// 扩展名由实现根据响应内容决定。失败时不应留下文件。
    async fn download(&self, url: &str, dir: &Path, stem: &str) -> Option<PathBuf>;
}

/// 根据 Content-Type 选择文件扩展名，无法识别时使用 jpg
pub fn extension_for(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("image/png") => "png",
        Some("image/webp") => "webp",
        Some("image/gif") => "gif",
        Some("image/bmp") => "bmp",
        _ => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(Some("image/jpeg")), "jpg");
        assert_eq!(extension_for(Some("image/png")), "png");
        assert_eq!(extension_for(Some("IMAGE/WEBP; charset=binary")), "webp");
        assert_eq!(extension_for(Some("application/octet-stream")), "jpg");
        assert_eq!(extension_for(None), "jpg");
    }
}
