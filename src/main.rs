// main.rs — 程序入口
// 负责初始化日志与异步运行时、解析命令行参数、分发子命令

mod cli;
mod config;
mod downloads;
mod error;
mod events;
mod orchestrator;
mod setter;
mod source;

// 初始化多语言支持，嵌入 locales 目录下的所有翻译
rust_i18n::i18n!("locales", fallback = "en");

use clap::{CommandFactory, Parser}; // CommandFactory 用于生成补全脚本
use clap_complete::generate;
use cli::{Cli, Commands, ConfigAction};
use config::{AppConfig, ConfigOverrides};
use error::AppResult;
use orchestrator::Orchestrator;
use rust_i18n::t; // 引入翻译宏
use setter::SystemSetter;
use source::unsplash::UnsplashClient;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // 自动检测系统语言并设置
    let locale = std::env::var("LANG").unwrap_or_else(|_| "en".to_string());
    if locale.starts_with("zh") {
        rust_i18n::set_locale("zh-CN");
    } else {
        rust_i18n::set_locale("en");
    }

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("{}", t!("error_prefix", reason => e));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> AppResult<()> {
    // 补全脚本不需要读取配置
    if let Some(Commands::Completions { shell }) = &cli.command {
        generate(*shell, &mut Cli::command(), "daywall", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = AppConfig::load(ConfigOverrides {
        config_path: cli.config,
        events_file: cli.events,
        access_key: cli.access_key,
        download_dir: cli.dir,
    })?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => handle_run(&mut config).await,
        Commands::Today => handle_today(&mut config),
        Commands::Clean => handle_clean(&config),
        Commands::Config { action } => handle_config(&mut config, &action),
        Commands::Completions { .. } => Ok(()),
    }
}

/// 处理 run 子命令：查找今天的事件并设置壁纸
async fn handle_run(config: &mut AppConfig) -> AppResult<()> {
    config.prompt_missing(true)?;
    let run_config = config.run_config()?;
    let access_key = config.require_access_key()?.to_string();

    let client = UnsplashClient::new(&config.base_url, access_key, config.timeout)?
        .with_orientation(config.orientation.clone());

    let outcome = Orchestrator::new(&run_config, &client, &SystemSetter)
        .run()
        .await?;
    log::info!("run finished: {:?}", outcome);
    Ok(())
}

/// 处理 today 子命令：只显示今天的事件和关键词
fn handle_today(config: &mut AppConfig) -> AppResult<()> {
    config.prompt_missing(false)?;
    let run_config = config.run_config()?;

    let today = chrono::Local::now().date_naive();
    let preview = orchestrator::preview(&run_config, today)?;

    println!("{}", t!("today_event", date => today, label => preview.label));
    println!("{}", t!("today_query", query => preview.query));
    Ok(())
}

/// 处理 clean 子命令：删除之前运行时记录在下载目录清单中的图片
fn handle_clean(config: &AppConfig) -> AppResult<()> {
    let dir = &config.download_dir;
    if !dir.exists() {
        println!("{}", t!("clean_done", count => 0));
        return Ok(());
    }

    println!("{}", t!("cleaning_dir", path => dir.display()));

    let deleted = downloads::clean(dir)?;
    for filename in &deleted {
        println!("  {} {}", t!("deleted"), filename);
    }

    println!("{}", t!("clean_done", count => deleted.len()));
    Ok(())
}

/// 处理 config 子命令：查看或修改配置
fn handle_config(config: &mut AppConfig, action: &ConfigAction) -> AppResult<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", t!("config_title"));
            println!("{}", t!("config_path", path => config.config_path.display()));
            let events_file = config
                .events_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "None".to_string());
            println!("{}", t!("config_events", path => events_file));
            println!(
                "{}",
                t!(
                    "config_columns",
                    date => config.events.date_column,
                    label => config.events.label_column.as_deref().unwrap_or("-")
                )
            );
            println!("{}", t!("config_access_key", key => config.masked_access_key()));
            println!("{}", t!("config_base_url", url => config.base_url));
            println!("{}", t!("config_dir", path => config.download_dir.display()));
            println!("{}", t!("config_timeout", secs => config.timeout.as_secs()));
        }
        ConfigAction::Schema => {
            println!("{}", AppConfig::get_schema()?);
        }
        ConfigAction::Dump => {
            println!("{}", config.to_toml());
        }
        ConfigAction::Set { key, value } => {
            config.set(key, value)?;
            println!("{}", t!("config_updated", key => key, value => value));
        }
    }
    Ok(())
}
