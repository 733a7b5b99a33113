// src/models/assessment.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: String,
    pub selected_option: usize,
}

/// 服务器评分后的测验结果，客户端只保留最近一次
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub score: f64,
    pub is_passed: bool,
    #[serde(default)]
    pub pass_score: Option<u32>,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub total_questions: Option<u32>,
}

/// 运行或提交代码后的结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodingResult {
    #[serde(default)]
    pub is_passed: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
