// src/lib.rs

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod models;
pub mod store;
pub mod symbols;
pub mod tracker;
pub mod ui;
pub mod utils;
pub mod views;
mod workflows;

use crate::{
    cli::{Cli, Command},
    client::RobustClient,
    config::AppConfig,
    controller::AppController,
    error::AppResult,
};
use colored::*;
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);
    match &args.command {
        Command::TokenHelp => {
            ui::box_message(
                "获取 Access Token 指南",
                constants::HELP_TOKEN_GUIDE
                    .lines()
                    .collect::<Vec<_>>()
                    .as_slice(),
                |s| s.cyan(),
            );
            println!(
                "\n{} 安全提醒: 请妥善保管你的 Token，不要分享给他人。",
                *symbols::INFO
            );
            return Ok(());
        }
        Command::Logout => {
            config::token::clear_token()?;
            ui::notify_ok("已清除本地保存的 Access Token。");
            return Ok(());
        }
        _ => {}
    }

    let config = Arc::new(AppConfig::new(&args)?);
    debug!("加载的应用配置: {:?}", config);

    let token_opt = if matches!(args.command, Command::Login) {
        None
    } else {
        let (token_opt, source) = config::token::resolve_token(args.token.as_deref());
        match &token_opt {
            Some(_) => info!("从 {} 加载 Access Token", source),
            None => info!("未找到本地 Access Token"),
        }
        token_opt
    };
    let token = Arc::new(TokioMutex::new(token_opt));

    let http_client = Arc::new(RobustClient::new(config, token)?.persist_logout(true));
    let mut controller = AppController::new(http_client.clone());

    workflows::execute(&args.command, &mut controller, &http_client).await
}
