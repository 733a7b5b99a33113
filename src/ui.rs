// src/ui.rs

use crate::{constants, error::AppError, symbols};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, Write},
    time::Duration,
};

pub fn print_header(title: &str) {
    println!("\n{}", "═".repeat(constants::UI_WIDTH));
    println!(" {}", title.cyan().bold());
    println!("{}", "═".repeat(constants::UI_WIDTH));
}

pub fn print_sub_header(title: &str) {
    println!("\n--- {} ---", title.bold());
}

pub fn box_message(title: &str, content: &[&str], color_func: fn(ColoredString) -> ColoredString) {
    println!("\n┌{}┐", "─".repeat(constants::UI_WIDTH - 2));
    println!("  {}", color_func(title.bold()));
    println!("├{}┤", "─".repeat(constants::UI_WIDTH - 2));
    for line in content {
        println!("  {}", line);
    }
    println!("└{}┘", "─".repeat(constants::UI_WIDTH - 2));
}

/// 一次性的错误通知，不影响其余状态
pub fn notify_error(e: &AppError) {
    let text = e.to_string();
    match e {
        AppError::CompletionNotAllowed(_)
        | AppError::CertificateNotEligible { .. }
        | AppError::QuizState(_)
        | AppError::UserInputError(_) => eprintln!("{} {}", *symbols::WARN, text.yellow()),
        _ => eprintln!("{} {}", *symbols::ERROR, text.red()),
    }
}

pub fn notify_ok(message: &str) {
    println!("{} {}", *symbols::OK, message);
}

/// 等待网络请求时显示的转轮；非终端环境下自动隐藏
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn prompt(message: &str, default: Option<&str>) -> io::Result<String> {
    let default_str = default.map_or("".to_string(), |d| format!(" (默认: {})", d));
    print!("\n>>> {}{}: ", message, default_str);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "输入已结束"));
    }
    let input = input.trim().to_string();
    if input.is_empty() {
        Ok(default.unwrap_or("").to_string())
    } else {
        Ok(input)
    }
}

pub fn confirm(question: &str, default_yes: bool) -> bool {
    let options = if default_yes { "(Y/n)" } else { "(y/N)" };
    loop {
        match prompt(
            &format!("{} {} (按 {} 取消)", question, options, *symbols::CTRL_C),
            None,
        ) {
            Ok(choice) => {
                let choice = choice.to_lowercase();
                if choice == "y" {
                    return true;
                }
                if choice == "n" {
                    return false;
                }
                if choice.is_empty() {
                    return default_yes;
                }
                println!("{}", "无效输入，请输入 'y' 或 'n'。".red());
            }
            Err(_) => return false,
        }
    }
}

pub fn prompt_hidden(message: &str) -> io::Result<String> {
    print!("\n>>> {}: ", message);
    io::stdout().flush()?;
    rpassword::read_password()
}
