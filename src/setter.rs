// setter.rs — 系统壁纸设置模块

use crate::error::{AppError, AppResult};
use std::path::Path;

/// 设置桌面背景的能力接口
///
/// 调用方只关心调用本身是否报错，不会回头确认系统是否真的换了壁纸。
pub trait WallpaperSetter {
    fn set_background(&self, path: &Path) -> AppResult<()>;
}

/// 基于 `wallpaper` 库的实现
/// 这个库会自动识别操作系统并调用相应的 API
pub struct SystemSetter;

impl WallpaperSetter for SystemSetter {
    fn set_background(&self, path: &Path) -> AppResult<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| AppError::Wallpaper(format!("non UTF-8 path: {}", path.display())))?;

        log::debug!("setting wallpaper -> {}", path.display());

        wallpaper::set_from_path(path_str).map_err(|e| AppError::Wallpaper(e.to_string()))
    }
}
