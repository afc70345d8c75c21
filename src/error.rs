// error.rs — 统一错误类型
// 只有事件表加载失败会作为硬错误终止运行；
// "没有图片" 和 "下载失败" 是正常结果，见 orchestrator::RunOutcome

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// 事件表无法读取、解析，或缺少所需的列
    #[error("cannot load event table {}: {reason}", .path.display())]
    DataSource { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP 客户端构建失败（请求本身的失败不会走到这里）
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to set wallpaper: {0}")]
    Wallpaper(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn data_source(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        AppError::DataSource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
