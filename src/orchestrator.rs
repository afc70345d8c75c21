// orchestrator.rs — 主流程
// 加载事件表 -> 解析今天的事件 -> 构造关键词 -> 搜索 -> 下载 -> 设置壁纸
// 每一步都按顺序同步等待，前一步结束后才开始下一步

use crate::downloads;
use crate::error::AppResult;
use crate::events::{self, EventTable, EventsOptions};
use crate::setter::WallpaperSetter;
use crate::source::ImageSource;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rust_i18n::t;
use std::io;
use std::path::{Path, PathBuf};

/// 一次运行所需的全部配置，由 config 模块构造后传入
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// 事件表 CSV 路径，构造时不检查是否存在
    pub events_file: PathBuf,
    pub events: EventsOptions,
    /// 下载图片的保存目录
    pub download_dir: PathBuf,
}

/// 一次运行的三种正常结束状态
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// 壁纸已设置，携带图片的绝对路径
    WallpaperSet(PathBuf),
    /// 找到了图片但下载失败
    DownloadFailed,
    /// 搜索没有结果或搜索请求失败
    NoImage,
}

impl RunOutcome {
    pub fn message(&self) -> String {
        match self {
            RunOutcome::WallpaperSet(_) => t!("wallpaper_set").to_string(),
            RunOutcome::DownloadFailed => t!("download_failed").to_string(),
            RunOutcome::NoImage => t!("no_image").to_string(),
        }
    }
}

/// 今天的事件名和对应的搜索关键词
#[derive(Debug, PartialEq, Eq)]
pub struct Preview {
    pub label: String,
    pub query: String,
}

/// 加载事件表并解析指定日期的事件名和关键词，不访问网络
pub fn preview(config: &RunConfig, today: NaiveDate) -> AppResult<Preview> {
    let table = EventTable::load(&config.events_file, &config.events)?;
    log::debug!("{} events loaded", table.len());

    let label = events::resolve_label(&table, today);
    let query = events::build_query(&label);
    Ok(Preview { label, query })
}

pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    source: &'a dyn ImageSource,
    setter: &'a dyn WallpaperSetter,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a RunConfig,
        source: &'a dyn ImageSource,
        setter: &'a dyn WallpaperSetter,
    ) -> Self {
        Self {
            config,
            source,
            setter,
        }
    }

    /// 以本地当前时间执行一次完整流程
    pub async fn run(&self) -> AppResult<RunOutcome> {
        self.run_at(Local::now().naive_local()).await
    }

    /// 以给定时刻执行一次完整流程
    ///
    /// 只有事件表加载失败会返回 `Err`，
    /// 其余情况都以 `RunOutcome` 正常结束并打印对应提示。
    pub async fn run_at(&self, now: NaiveDateTime) -> AppResult<RunOutcome> {
        let Preview { label, query } = preview(self.config, now.date())?;
        log::info!("today's event: '{}', query: '{}'", label, query);

        let outcome = self.fetch_and_apply(&query, now).await?;
        println!("{}", outcome.message());
        Ok(outcome)
    }

    async fn fetch_and_apply(&self, query: &str, now: NaiveDateTime) -> AppResult<RunOutcome> {
        let Some(image_url) = self.source.search_top(query).await else {
            return Ok(RunOutcome::NoImage);
        };
        log::debug!("top result: {}", image_url);

        // 找到图片后才创建下载目录
        let dir = match prepare_dir(&self.config.download_dir) {
            Ok(dir) => dir,
            Err(e) => {
                log::warn!("cannot use {}: {}", self.config.download_dir.display(), e);
                return Ok(RunOutcome::DownloadFailed);
            }
        };
        let stem = events::file_stem(query, now);

        let Some(image_path) = self.source.download(&image_url, &dir, &stem).await else {
            return Ok(RunOutcome::DownloadFailed);
        };

        if let Err(e) = downloads::record(&dir, &image_path) {
            log::warn!("failed to record {}: {}", image_path.display(), e);
        }

        // 不确认系统是否真的换了壁纸，调用报错也只记录日志
        if let Err(e) = self.setter.set_background(&image_path) {
            log::warn!("{}", e);
        }
        Ok(RunOutcome::WallpaperSet(image_path))
    }
}

fn prepare_dir(dir: &Path) -> io::Result<PathBuf> {
    let dir = std::path::absolute(dir)?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
