// cli.rs — 命令行接口定义模块
// 使用 clap 的 derive 模式定义所有子命令和参数

use clap::{Parser, Subcommand}; // Parser: 解析命令行参数的 trait; Subcommand: 定义子命令的 trait
use clap_complete::Shell; // Shell 枚举：Bash, Zsh, Fish, Elvish, PowerShell
use std::path::PathBuf;

/// 节日壁纸工具
///
/// 从事件表中查出今天的节日，在 Unsplash 搜索对应的图片，
/// 下载第一张结果并设置为桌面壁纸。
#[derive(Parser)]
#[command(name = "daywall")]
#[command(version)] // 自动从 Cargo.toml 读取 version 字段
#[command(author)]
#[command(about = "Set today's calendar event as your desktop wallpaper, using Unsplash photos")]
pub struct Cli {
    /// 事件表 CSV 路径（覆盖环境变量和配置文件）
    #[arg(short, long, global = true, value_name = "CSV")]
    pub events: Option<PathBuf>,

    /// Unsplash Access Key
    #[arg(short = 'k', long, global = true, value_name = "KEY")]
    pub access_key: Option<String>,

    /// 图片保存目录（默认当前目录）
    #[arg(short, long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// 配置文件路径（默认 ~/.config/daywall/config.toml）
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 不指定子命令时等同于 `run`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 查找今天的事件、下载图片并设置为壁纸
    ///
    /// 用法示例:
    ///   daywall run --events ~/events.csv
    Run,

    /// 只显示今天的事件名和搜索关键词，不访问网络
    ///
    /// 用法示例:
    ///   daywall today
    Today,

    /// 删除之前运行下载的图片
    ///
    /// 用法示例:
    ///   daywall clean --dir ~/Pictures
    Clean,

    /// 配置管理操作
    ///
    /// 用法示例:
    ///   daywall config show
    ///   daywall config set events ~/events.csv
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// 生成 shell 补全脚本（支持 bash, zsh, fish, elvish, powershell）
    ///
    /// 用法示例：
    ///   daywall completions zsh > ~/.zsh/completions/_daywall
    Completions {
        /// 目标 shell 类型
        shell: Shell,
    },
}

/// 配置管理操作
#[derive(Subcommand)]
pub enum ConfigAction {
    /// 查看当前生效的配置
    Show,
    /// 生成配置文件对应的 JSON Schema
    Schema,
    /// 以 TOML 格式打印配置文件内容
    Dump,
    /// 设置配置项的值 (events, date_column, label_column, date_format,
    /// access_key, base_url, orientation, dir, timeout)
    Set {
        /// 要设置的键
        key: String,
        /// 要设置的值
        value: String,
    },
}
