// src/utils.rs

use crate::error::*;
use regex::Regex;
use std::{ffi::OsStr, path::Path, sync::LazyLock};

static ILLEGAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISPOSITION_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"filename\*?=(?:UTF-8'')?"?([^";]+)"?"#).unwrap());

const MAX_FILENAME_BYTES: usize = 200;

pub fn sanitize_filename(name: &str) -> String {
    let original_name = name.trim();
    if original_name.is_empty() { return "unknown".to_string(); }

    let stem = Path::new(original_name)
        .file_stem()
        .unwrap_or_else(|| OsStr::new(original_name))
        .to_string_lossy()
        .to_uppercase();
    let windows_reserved = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];

    let mut name = if windows_reserved.contains(&stem.as_ref()) {
        format!("_{}", original_name)
    } else {
        original_name.to_string()
    };

    name = ILLEGAL_CHARS_RE.replace_all(&name, " ").into_owned();
    name = WHITESPACE_RE.replace_all(&name, " ").trim().to_string();
    name = name.trim_matches(|c: char| c == '.' || c.is_whitespace()).to_string();
    if name.is_empty() { return "unnamed".to_string(); }

    if name.len() > MAX_FILENAME_BYTES {
        name = safe_truncate_utf8(&name, MAX_FILENAME_BYTES).to_string();
    }
    name
}

fn safe_truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes { return s; }
    let mut i = max_bytes;
    while i > 0 && !s.is_char_boundary(i) { i -= 1; }
    &s[..i]
}

/// 按显示宽度截断 (非 ASCII 字符计为 2)
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}

pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    DISPOSITION_FILENAME_RE
        .captures(header)
        .and_then(|c| c.get(1))
        .map(|m| percent_encoding::percent_decode_str(m.as_str().trim()).decode_utf8_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// 解析测验答案，例如 "2,1,3"：按题目顺序，每题一个从 1 开始的选项序号
pub fn parse_answer_list(input: &str, option_counts: &[usize]) -> AppResult<Vec<usize>> {
    let parts: Vec<&str> = input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() != option_counts.len() {
        return Err(AppError::UserInputError(format!(
            "需要 {} 个答案，实际提供了 {} 个",
            option_counts.len(),
            parts.len()
        )));
    }
    parts
        .iter()
        .zip(option_counts)
        .enumerate()
        .map(|(i, (part, &count))| match part.parse::<usize>() {
            Ok(n) if n >= 1 && n <= count => Ok(n - 1),
            _ => Err(AppError::UserInputError(format!(
                "第 {} 题的答案 '{}' 无效 (可选 1-{})",
                i + 1,
                part,
                count
            ))),
        })
        .collect()
}

/// 文本进度条，例如 `[██████░░░░] 60%`
pub fn progress_bar_text(percent: u8, width: usize) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * width / 100;
    format!(
        "[{}{}] {:>3}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        percent
    )
}
