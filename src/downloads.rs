// downloads.rs — 下载记录
// 每次成功下载都把文件名追加到下载目录下的清单文件，
// clean 只删除清单里记录过的文件，不会碰用户自己的图片

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// 清单文件名，每行一个下载文件名
const MANIFEST_NAME: &str = ".daywall-downloads";

fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_NAME)
}

/// 记录一张下载到 `dir` 中的图片
pub fn record(dir: &Path, image: &Path) -> io::Result<()> {
    let Some(name) = image.file_name().and_then(|n| n.to_str()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot record {}", image.display()),
        ));
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(manifest_path(dir))?;
    writeln!(file, "{}", name)
}

/// 清单中记录过的文件名，清单不存在时为空
pub fn recorded(dir: &Path) -> io::Result<Vec<String>> {
    match fs::read_to_string(manifest_path(dir)) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            // 只接受单纯的文件名，防止清单被改成指向目录外
            .filter(|name| {
                !name.is_empty()
                    && *name != MANIFEST_NAME
                    && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(*name)
            })
            .map(str::to_string)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// 删除清单中记录的、仍然存在的文件，然后删除清单本身
///
/// 返回被删除的文件名。
pub fn clean(dir: &Path) -> io::Result<Vec<String>> {
    let mut deleted = Vec::new();
    for name in recorded(dir)? {
        let path = dir.join(&name);
        if path.is_file() {
            fs::remove_file(&path)?;
            deleted.push(name);
        }
    }

    match fs::remove_file(manifest_path(dir)) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }
    Ok(deleted)
}
