// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use learnctl::{
    cli::{Cli, LogLevel},
    constants,
    error::AppError,
    run_from_cli, ui,
};
use std::{env, sync::Arc, time::Duration};

fn init_logger(level: LogLevel) {
    if level == LogLevel::Off {
        return;
    }

    let filter = match level {
        LogLevel::Off => log::LevelFilter::Off,
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warn => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Trace => log::LevelFilter::Trace,
    };

    let log_file_path = match dirs::home_dir() {
        Some(home) => home.join(constants::CONFIG_DIR_NAME).join(constants::LOG_FILE_NAME),
        None => {
            eprintln!("警告: 无法获取用户主目录，日志将写入临时目录。");
            env::temp_dir().join(clap::crate_name!()).join(constants::LOG_FILE_NAME)
        }
    };
    if let Some(dir) = log_file_path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("警告: 无法创建日志目录 {:?}: {}", dir, e);
    }

    let file_appender = match fern::log_file(&log_file_path) {
        Ok(file) => file,
        Err(e) => {
            let fallback = env::temp_dir().join(constants::LOG_FALLBACK_FILE_NAME);
            eprintln!("警告: 无法打开日志文件 {:?} ({})，改用 {:?}", log_file_path, e, fallback);
            match fern::log_file(&fallback) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("警告: 日志功能已禁用: {}", e);
                    return;
                }
            }
        }
    };

    let result = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(filter)
        // 依赖库的日志只保留警告以上
        .level_for("reqwest", log::LevelFilter::Warn)
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("rustls", log::LevelFilter::Warn)
        .chain(file_appender)
        .apply();
    if let Err(e) = result {
        eprintln!("警告: 初始化日志失败: {}", e);
    }
}

#[tokio::main]
async fn main() {
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{} 用户强制中断程序。", "[!]".yellow());
            tokio::time::sleep(Duration::from_millis(100)).await;
            std::process::exit(130);
        }
    });

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "learnctl".to_string());
    let after_help = format!(
        "示例:\n  # 查看学习进度\n  {bin} progress rust-basics\n\n  # 进入交互式学习会话\n  {bin} study rust-basics\n\n  # 作答测验并在通过后标记完成\n  {bin} quiz rust-basics <课时ID> --answers 2,1,3 --complete\n\n  # 获取 Token 帮助\n  {bin} token-help",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };
    init_logger(args.log_level);
    log::info!("{} v{} 启动", clap::crate_name!(), clap::crate_version!());

    match run_from_cli(args).await {
        Ok(()) => {}
        Err(AppError::UserInterrupt) => {
            println!("\n{} 操作已取消。", "[!]".yellow());
            std::process::exit(130);
        }
        Err(e @ AppError::Unauthorized) | Err(e @ AppError::TokenMissing) => {
            ui::notify_error(&e);
            eprintln!("{} 运行 '{} login' 重新登录，或查看 '{} token-help'。", "[i]".cyan(), bin_name, bin_name);
            std::process::exit(1);
        }
        Err(e) => {
            log::error!("程序执行出错: {:?}", e);
            eprintln!("\n{} {}", "[X]".red(), format!("程序执行出错: {}", e).red());
            std::process::exit(1);
        }
    }
}
