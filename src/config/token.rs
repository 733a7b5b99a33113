// src/config/token.rs

use crate::{
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use std::{fs, io::Write, path::PathBuf};

pub(super) fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

pub(crate) fn load_or_create_external_config() -> AppResult<ExternalConfig> {
    let config_path = get_config_path()?;
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件 '{}' 失败", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default_app_config();
        write_external_config(&config)?;
        Ok(config)
    }
}

/// 先写入同目录下的临时文件再原子替换，避免写到一半时配置文件损坏
fn write_external_config(config: &ExternalConfig) -> AppResult<()> {
    let config_path = get_config_path()?;
    let dir = config_path
        .parent()
        .ok_or_else(|| AppError::Other(anyhow!("配置文件路径无效")))?;
    fs::create_dir_all(dir)?;

    let json_content = serde_json::to_string_pretty(config)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json_content.as_bytes())?;
    tmp.persist(&config_path)?;
    Ok(())
}

pub fn save_token(token: &str) -> AppResult<()> {
    if token.is_empty() {
        return Ok(());
    }

    let mut config = load_or_create_external_config()?;
    config.accesstoken = Some(token.to_string());
    write_external_config(&config)?;

    info!("用户已将 Token 保存至配置文件");
    Ok(())
}

/// 清除本地保存的 Token (登出或收到 401 时调用)
pub fn clear_token() -> AppResult<()> {
    let mut config = load_or_create_external_config()?;
    if config.accesstoken.take().is_some() {
        write_external_config(&config)?;
        info!("已从配置文件中清除 Token");
    }
    Ok(())
}

pub fn load_token_from_config() -> Option<String> {
    load_or_create_external_config()
        .ok()
        .and_then(|config| config.accesstoken)
}

pub fn resolve_token(cli_token: Option<&str>) -> (Option<String>, String) {
    if let Some(token) = cli_token && !token.is_empty() {
        debug!("使用来自命令行参数的 Token");
        return (Some(token.to_string()), "命令行参数".to_string());
    }
    if let Ok(token) = std::env::var(constants::ENV_ACCESS_TOKEN) && !token.is_empty() {
        debug!("使用来自环境变量 ACCESS_TOKEN 的 Token");
        return (Some(token), "环境变量 (ACCESS_TOKEN)".to_string());
    }
    if let Some(token) = load_token_from_config() && !token.is_empty() {
        debug!("使用来自本地配置文件的 Token");
        return (Some(token), "本地配置文件".to_string());
    }
    debug!("未在任何位置找到可用的 Token");
    (None, "未找到".to_string())
}
