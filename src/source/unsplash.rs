// unsplash.rs — Unsplash API 异步客户端模块
// 负责与 Unsplash API 交互：按关键词搜索图片，下载排名第一的结果
//
// 所有请求失败（网络错误、非 200 状态、JSON 结构不符）都只记录日志并返回 None，
// 上层不区分 "没有结果" 和 "请求失败"。

use super::{ImageSource, extension_for};
use crate::error::AppResult;
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize; // 反序列化 trait，用于将 JSON 转为 Rust 结构体
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File; // tokio 提供的异步文件操作
use tokio::io::AsyncWriteExt; // 异步写入 trait，提供 write_all() 等方法

/// Unsplash 搜索响应的顶层结构
/// GET /search/photos 返回的 JSON 根对象
#[derive(Deserialize, Debug)]
struct SearchResponse {
    /// 搜索结果列表，JSON 中多余的字段会被 serde 忽略
    results: Vec<Photo>,
}

#[derive(Deserialize, Debug)]
struct Photo {
    urls: PhotoUrls,
}

/// 各尺寸图片 URL 集合，这里只需要 regular
#[derive(Deserialize, Debug)]
struct PhotoUrls {
    regular: String,
}

/// Unsplash API 异步客户端
///
/// Access Key 以 `client_id` 查询参数传递。
pub struct UnsplashClient {
    /// HTTP 客户端（内部有连接池，应复用）
    client: reqwest::Client,

    /// API 基础 URL
    base_url: String,

    /// Unsplash Access Key
    access_key: String,

    /// 可选的方向过滤 (landscape / portrait / squarish)
    orientation: Option<String>,
}

impl UnsplashClient {
    /// 创建新的 Unsplash 客户端
    ///
    /// # 参数
    /// - `base_url`: API 地址，通常为 `https://api.unsplash.com`
    /// - `access_key`: 从 Unsplash Developer 后台获取的 Access Key
    /// - `timeout`: 单个请求（含读取响应体）的超时时间
    pub fn new(base_url: &str, access_key: String, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key,
            orientation: None,
        })
    }

    pub fn with_orientation(mut self, orientation: Option<String>) -> Self {
        self.orientation = orientation;
        self
    }

    /// 构建搜索请求
    /// `.query()` 负责百分号编码，关键词里的 `&`、`#`、`%` 不会破坏 URL
    fn search_request(&self, query: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/search/photos", self.base_url);

        let mut params: Vec<(&str, &str)> = vec![
            ("query", query),
            ("client_id", self.access_key.as_str()),
            ("per_page", "1"),
        ];
        if let Some(orientation) = self.orientation.as_deref() {
            params.push(("orientation", orientation));
        }

        self.client.get(url).query(&params)
    }
}

#[async_trait]
impl ImageSource for UnsplashClient {
    async fn search_top(&self, query: &str) -> Option<String> {
        let response = match self.search_request(query).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("search request for '{}' failed: {}", query, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            log::warn!("search for '{}' returned HTTP {}", query, response.status());
            return None;
        }

        let search_response: SearchResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                log::warn!("unexpected search response for '{}': {}", query, e);
                return None;
            }
        };

        log::debug!("search for '{}' returned {} result(s)", query, search_response.results.len());
        search_response
            .results
            .into_iter()
            .next()
            .map(|photo| photo.urls.regular)
    }

    async fn download(&self, url: &str, dir: &Path, stem: &str) -> Option<PathBuf> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("download request failed: {}", e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            log::warn!("download returned HTTP {}", response.status());
            return None;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        // 先完整读取响应体再创建文件，读取失败时磁盘上不会有残留
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("failed to read image body: {}", e);
                return None;
            }
        };

        let filename = format!("{}.{}", stem, extension_for(content_type.as_deref()));
        let save_path = dir.join(filename);

        if let Err(e) = write_file(&save_path, &bytes).await {
            log::warn!("failed to write {}: {}", save_path.display(), e);
            // 写入失败时删除半截文件
            let _ = tokio::fs::remove_file(&save_path).await;
            return None;
        }

        log::debug!("saved {} bytes to {}", bytes.len(), save_path.display());
        Some(save_path)
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// 启动只应答一次的本地 HTTP 服务，返回其基础地址
    async fn serve_once(status: u16, content_type: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {} Test\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> UnsplashClient {
        UnsplashClient::new(base_url, "secret-key".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_search_request_encodes_query() {
        let client = client("https://api.unsplash.com/").with_orientation(Some("landscape".to_string()));
        let request = client.search_request("Rock-&-Roll#1").build().unwrap();

        assert_eq!(request.url().path(), "/search/photos");
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "Rock-&-Roll#1".to_string()),
                ("client_id".to_string(), "secret-key".to_string()),
                ("per_page".to_string(), "1".to_string()),
                ("orientation".to_string(), "landscape".to_string()),
            ]
        );
        assert!(!request.url().query().unwrap().contains('#'));
    }

    #[tokio::test]
    async fn test_search_returns_first_regular_url() {
        let body = br#"{"total":2,"results":[
            {"id":"a","urls":{"raw":"r1","regular":"https://images.example/a"}},
            {"id":"b","urls":{"raw":"r2","regular":"https://images.example/b"}}
        ]}"#;
        let base = serve_once(200, "application/json", body.to_vec()).await;

        let url = client(&base).search_top("Halloween").await;
        assert_eq!(url.as_deref(), Some("https://images.example/a"));
    }

    #[tokio::test]
    async fn test_search_empty_results_is_none() {
        let base = serve_once(200, "application/json", br#"{"total":0,"results":[]}"#.to_vec()).await;
        assert!(client(&base).search_top("No-events-for-today").await.is_none());
    }

    #[tokio::test]
    async fn test_search_error_status_is_none() {
        let base = serve_once(401, "application/json", br#"{"errors":["OAuth error"]}"#.to_vec()).await;
        assert!(client(&base).search_top("Halloween").await.is_none());
    }

    #[tokio::test]
    async fn test_search_unreachable_is_none() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(client(&format!("http://{}", addr)).search_top("Halloween").await.is_none());
    }

    #[tokio::test]
    async fn test_download_writes_body_with_content_type_extension() {
        let base = serve_once(200, "image/png", vec![0x89, b'P', b'N', b'G']).await;
        let dir = tempfile::tempdir().unwrap();

        let path = client(&base)
            .download(&format!("{}/photo", base), dir.path(), "Earth_20250422120000")
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("Earth_20250422120000.png"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_download_not_found_leaves_no_file() {
        let base = serve_once(404, "text/plain", b"not found".to_vec()).await;
        let dir = tempfile::tempdir().unwrap();

        let path = client(&base)
            .download(&format!("{}/photo", base), dir.path(), "Earth_20250422120000")
            .await;

        assert!(path.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
