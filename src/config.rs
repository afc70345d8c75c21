// config.rs — 配置管理模块
// 遵循 Unix 风格：从 ~/.config/daywall/config.toml 读取配置
// 优先级：命令行参数 > 环境变量 > 配置文件 > 交互式输入

use crate::error::{AppError, AppResult};
use crate::events::EventsOptions;
use crate::orchestrator::RunConfig;
use rust_i18n::t;
use schemars::JsonSchema; // 引入用于生成 JSON Schema 的 trait
use serde::{Deserialize, Serialize}; // 引入序列化与反序列化 trait
use std::env;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_EVENTS_FILE: &str = "DAYWALL_EVENTS_FILE";
const ENV_ACCESS_KEY: &str = "UNSPLASH_ACCESS_KEY";

/// 展开路径中的 ~ 和环境变量 ($HOME, ${XDG_DATA_HOME} 等)，相对路径则相对于 `base`
/// 引用了未定义的变量时只展开 ~
fn expand_path(path_str: &str, base: &Path) -> PathBuf {
    let expanded = shellexpand::full(path_str)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| shellexpand::tilde(path_str).into_owned());
    let p = PathBuf::from(expanded);
    if p.is_absolute() { p } else { base.join(p) }
}

/// 映射 config.toml 文件内容的嵌套结构体
#[derive(Debug, Deserialize, Serialize, Default, JsonSchema)]
struct ConfigFile {
    #[serde(default)]
    events: EventsConfig,
    #[serde(default)]
    unsplash: UnsplashConfig,
    #[serde(default)]
    download: DownloadConfig,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct EventsConfig {
    /// 事件表 CSV 路径 (支持 ~、$HOME，相对路径则相对于 $HOME)
    #[serde(default)]
    file: Option<String>,
    /// 日期列名
    #[serde(default = "default_date_column")]
    date_column: String,
    /// 事件名列名，不配置则取第一个非日期列
    #[serde(default)]
    label_column: Option<String>,
    /// 日期格式 (chrono strftime 语法)
    #[serde(default = "default_date_format")]
    date_format: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            file: None,
            date_column: default_date_column(),
            label_column: None,
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct UnsplashConfig {
    #[serde(default)]
    access_key: Option<String>,
    #[serde(default = "default_base_url")]
    base_url: String,
    /// landscape / portrait / squarish，不配置则不过滤
    #[serde(default)]
    orientation: Option<String>,
}

impl Default for UnsplashConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            base_url: default_base_url(),
            orientation: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
struct DownloadConfig {
    /// 图片保存目录，不配置则使用当前工作目录
    #[serde(default)]
    dir: Option<String>,
    /// 单个 HTTP 请求的超时时间（秒）
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_date_column() -> String {
    "Date".to_string()
}
fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}
fn default_base_url() -> String {
    "https://api.unsplash.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// 命令行上给出的覆盖项
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub events_file: Option<PathBuf>,
    pub access_key: Option<String>,
    pub download_dir: Option<PathBuf>,
}

/// 应用全局配置项
pub struct AppConfig {
    /// 事件表路径 (优先级：CLI > ENV > TOML > 交互输入)
    pub events_file: Option<PathBuf>,
    pub events: EventsOptions,
    /// Unsplash Access Key (优先级：CLI > ENV > TOML > 交互输入)
    pub access_key: Option<String>,
    pub base_url: String,
    pub orientation: Option<String>,
    /// 图片保存目录
    pub download_dir: PathBuf,
    pub timeout: Duration,
    /// 配置文件所在路径
    pub config_path: PathBuf,
    /// 文件中的原始内容，`set` 只修改这一份再写回
    file: ConfigFile,
}

impl AppConfig {
    /// 读取配置文件与环境变量并应用命令行覆盖项
    pub fn load(overrides: ConfigOverrides) -> AppResult<Self> {
        let home = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .ok_or_else(|| AppError::Config("cannot determine home directory".to_string()))?;
        let cwd = env::current_dir()?;

        let config_path = overrides
            .config_path
            .clone()
            .unwrap_or_else(|| home.join(".config").join("daywall").join("config.toml"));
        let file = Self::load_config_from_file(&config_path)?;

        Ok(Self::resolve(file, config_path, &home, &cwd, overrides, |key| {
            env::var(key).ok().filter(|v| !v.is_empty())
        }))
    }

    /// 解析 TOML 配置文件，文件不存在时使用默认值
    fn load_config_from_file(path: &Path) -> AppResult<ConfigFile> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ConfigFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(
        file: ConfigFile,
        config_path: PathBuf,
        home: &Path,
        cwd: &Path,
        overrides: ConfigOverrides,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        // 命令行和环境变量中的相对路径相对于当前目录，配置文件中的相对于 $HOME
        let events_file = overrides
            .events_file
            .map(|p| cwd.join(p))
            .or_else(|| env_lookup(ENV_EVENTS_FILE).map(|s| expand_path(&s, cwd)))
            .or_else(|| file.events.file.as_deref().map(|s| expand_path(s, home)));

        let access_key = overrides
            .access_key
            .or_else(|| env_lookup(ENV_ACCESS_KEY))
            .or_else(|| file.unsplash.access_key.clone());

        let download_dir = overrides
            .download_dir
            .map(|p| cwd.join(p))
            .or_else(|| file.download.dir.as_deref().map(|s| expand_path(s, home)))
            .unwrap_or_else(|| cwd.to_path_buf());

        Self {
            events_file,
            events: EventsOptions {
                date_column: file.events.date_column.clone(),
                label_column: file.events.label_column.clone(),
                date_format: file.events.date_format.clone(),
            },
            access_key,
            base_url: file.unsplash.base_url.clone(),
            orientation: file.unsplash.orientation.clone(),
            download_dir,
            timeout: Duration::from_secs(file.download.timeout_secs),
            config_path,
            file,
        }
    }

    /// 缺少事件表路径（以及需要时的 Access Key）且处于终端时，交互式询问
    pub fn prompt_missing(&mut self, need_key: bool) -> AppResult<()> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Ok(());
        }
        let mut input = stdin.lock();

        if self.events_file.is_none() {
            self.events_file = prompt(&mut input, &t!("prompt_events_file"))?.map(PathBuf::from);
        }
        if need_key && self.access_key.is_none() {
            self.access_key = prompt(&mut input, &t!("prompt_access_key"))?;
        }
        Ok(())
    }

    /// 构造主流程需要的运行配置
    pub fn run_config(&self) -> AppResult<RunConfig> {
        let events_file = self
            .events_file
            .clone()
            .ok_or_else(|| AppError::Config(t!("error_missing_events", env => ENV_EVENTS_FILE).to_string()))?;

        Ok(RunConfig {
            events_file,
            events: self.events.clone(),
            download_dir: self.download_dir.clone(),
        })
    }

    pub fn require_access_key(&self) -> AppResult<&str> {
        self.access_key
            .as_deref()
            .ok_or_else(|| AppError::Config(t!("error_missing_key", env => ENV_ACCESS_KEY).to_string()))
    }

    /// 修改配置文件中的一项并保存
    pub fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        let value = value.to_string();
        match key {
            "events" | "events.file" => self.file.events.file = Some(value),
            "date_column" => self.file.events.date_column = value,
            "label_column" => self.file.events.label_column = Some(value),
            "date_format" => self.file.events.date_format = value,
            "access_key" => self.file.unsplash.access_key = Some(value),
            "base_url" => self.file.unsplash.base_url = value,
            "orientation" => self.file.unsplash.orientation = Some(value),
            "dir" | "download.dir" => self.file.download.dir = Some(value),
            "timeout" | "timeout_secs" => {
                self.file.download.timeout_secs = value
                    .parse()
                    .map_err(|_| AppError::Config(t!("config_error_timeout", value => value).to_string()))?
            }
            _ => return Err(AppError::Config(t!("config_error_unknown_key", key => key).to_string())),
        }
        self.save()
    }

    /// 将配置保存回文件
    fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(&self.file)
            .map_err(|e| AppError::Config(e.to_string()))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    /// 获取配置文件的 JSON Schema
    pub fn get_schema() -> AppResult<String> {
        let schema = schemars::schema_for!(ConfigFile);
        serde_json::to_string_pretty(&schema).map_err(|e| AppError::Config(e.to_string()))
    }

    /// 将配置文件内容转换为 TOML 字符串
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(&self.file)
            .unwrap_or_else(|_| "# Error serializing config".to_string())
    }

    /// 用于展示的 Access Key，只保留末尾四位
    pub fn masked_access_key(&self) -> String {
        match self.access_key.as_deref() {
            None => "None".to_string(),
            Some(key) if key.chars().count() <= 4 => "****".to_string(),
            Some(key) => {
                let tail: String = key.chars().skip(key.chars().count() - 4).collect();
                format!("****{}", tail)
            }
        }
    }
}

/// 打印提示并读取一行，空输入返回 None
fn prompt(input: &mut impl BufRead, message: &str) -> io::Result<Option<String>> {
    print!("{} ", message);
    io::stdout().flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}
