// events.rs — 事件表模块
// 从 CSV 读取 "日期 -> 事件名" 的映射，并推导今天的搜索关键词

use crate::error::{AppError, AppResult};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::Path;

/// 今天没有事件时使用的占位文本
pub const NO_EVENT_LABEL: &str = "No events for today";

/// 事件名中需要去掉的固定片段（"Valentine's Day" -> "Valentine's"）
const DAY_SUFFIX: &str = " Day";

/// 文件名时间戳格式：年月日时分秒，无分隔符
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// 读取事件表时的列配置
#[derive(Debug, Clone)]
pub struct EventsOptions {
    /// 作为索引的日期列名
    pub date_column: String,
    /// 事件名所在列，`None` 表示取第一个非日期列
    pub label_column: Option<String>,
    /// 日期列的 chrono 格式串
    pub date_format: String,
}

impl Default for EventsOptions {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            label_column: None,
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// 按日期索引的事件表
///
/// 每次运行都重新加载，加载完成后不再修改。
/// 同一日期出现多次时后出现的行覆盖前面的行。
#[derive(Debug, Default)]
pub struct EventTable {
    events: HashMap<NaiveDate, String>,
}

impl EventTable {
    /// 从 CSV 文件加载事件表
    ///
    /// 文件不存在、无法解析、缺少日期列或事件列、日期格式不合法
    /// 都会返回 `AppError::DataSource`。
    pub fn load(path: &Path, options: &EventsOptions) -> AppResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| AppError::data_source(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| AppError::data_source(path, e))?
            .clone();

        let date_idx = headers
            .iter()
            .position(|h| h == options.date_column)
            .ok_or_else(|| {
                AppError::data_source(path, format!("missing column '{}'", options.date_column))
            })?;

        let label_idx = match &options.label_column {
            Some(name) => headers.iter().position(|h| h == name.as_str()),
            None => (0..headers.len()).find(|&i| i != date_idx),
        }
        .ok_or_else(|| {
            let name = options.label_column.as_deref().unwrap_or("<event>");
            AppError::data_source(path, format!("missing column '{}'", name))
        })?;

        let mut events = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| AppError::data_source(path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            // 日期解析不了的行永远匹配不到今天，跳过即可
            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = match NaiveDate::parse_from_str(raw_date, &options.date_format) {
                Ok(date) => date,
                Err(e) => {
                    log::warn!("skipping line {}: invalid date '{}': {}", line, raw_date, e);
                    continue;
                }
            };
            let label = record.get(label_idx).unwrap_or_default().to_string();

            if let Some(previous) = events.insert(date, label) {
                log::warn!(
                    "duplicate entry for {} at line {} replaces '{}'",
                    date,
                    line,
                    previous
                );
            }
        }

        log::debug!("loaded {} events from {}", events.len(), path.display());
        Ok(Self { events })
    }

    pub fn get(&self, date: NaiveDate) -> Option<&str> {
        self.events.get(&date).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[cfg(test)]
    pub fn from_entries(entries: impl IntoIterator<Item = (NaiveDate, String)>) -> Self {
        Self {
            events: entries.into_iter().collect(),
        }
    }
}

/// 查找指定日期的事件名，找不到时使用占位文本，然后去掉所有 " Day"
pub fn resolve_label(table: &EventTable, date: NaiveDate) -> String {
    table
        .get(date)
        .unwrap_or(NO_EVENT_LABEL)
        .replace(DAY_SUFFIX, "")
}

/// 将事件名转换为搜索关键词：每个空格替换成一个连字符
pub fn build_query(label: &str) -> String {
    label.replace(' ', "-")
}

/// 生成下载文件名（不含扩展名）：`<关键词>_<YYYYmmddHHMMSS>`
///
/// 关键词中不能出现在文件名里的字符会被替换为 `-`。
pub fn file_stem(query: &str, now: NaiveDateTime) -> String {
    let safe: String = query
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    format!("{}_{}", safe, now.format(TIMESTAMP_FORMAT))
}
