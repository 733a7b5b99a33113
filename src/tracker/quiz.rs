// src/tracker/quiz.rs

use crate::{
    error::{AppError, AppResult},
    models::{QuizAnswer, QuizContent, QuizResult},
};
use std::collections::BTreeMap;

/// 单个测验课时的本地流程：未开始 → 作答中 → 已提交 → (重做) 作答中
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QuizSession {
    #[default]
    NotStarted,
    InProgress {
        answers: BTreeMap<String, usize>,
    },
    Submitted {
        answers: BTreeMap<String, usize>,
        result: QuizResult,
    },
}

impl QuizSession {
    pub fn answers(&self) -> Option<&BTreeMap<String, usize>> {
        match self {
            QuizSession::NotStarted => None,
            QuizSession::InProgress { answers } | QuizSession::Submitted { answers, .. } => {
                Some(answers)
            }
        }
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match self {
            QuizSession::Submitted { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.result().is_some_and(|r| r.is_passed)
    }

    /// 检查一次作答是否合法 (已提交的测验需先重做)
    pub fn check_answer(&self, quiz: &QuizContent, question_id: &str, option: usize) -> AppResult<()> {
        if matches!(self, QuizSession::Submitted { .. }) {
            return Err(AppError::QuizState("测验已提交，请先重做".to_string()));
        }
        let question = quiz
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| AppError::QuizState(format!("题目 '{}' 不存在", question_id)))?;
        if option >= question.options.len() {
            return Err(AppError::QuizState(format!(
                "题目 '{}' 只有 {} 个选项",
                question_id,
                question.options.len()
            )));
        }
        Ok(())
    }

    pub fn answered(self, question_id: &str, option: usize) -> Self {
        match self {
            QuizSession::NotStarted => {
                let mut answers = BTreeMap::new();
                answers.insert(question_id.to_string(), option);
                QuizSession::InProgress { answers }
            }
            QuizSession::InProgress { mut answers } => {
                answers.insert(question_id.to_string(), option);
                QuizSession::InProgress { answers }
            }
            submitted @ QuizSession::Submitted { .. } => submitted,
        }
    }

    /// 生成提交内容；要求处于作答中且每道题都已作答
    pub fn submission(&self, quiz: &QuizContent) -> AppResult<Vec<QuizAnswer>> {
        let QuizSession::InProgress { answers } = self else {
            return Err(AppError::QuizState(match self {
                QuizSession::Submitted { .. } => "测验已提交，请先重做".to_string(),
                _ => "尚未开始作答".to_string(),
            }));
        };
        let unanswered: Vec<&str> = quiz
            .questions
            .iter()
            .filter(|q| !answers.contains_key(&q.id))
            .map(|q| q.id.as_str())
            .collect();
        if !unanswered.is_empty() {
            return Err(AppError::QuizState(format!(
                "还有 {} 道题未作答",
                unanswered.len()
            )));
        }
        Ok(quiz
            .questions
            .iter()
            .map(|q| QuizAnswer {
                question_id: q.id.clone(),
                selected_option: answers[&q.id],
            })
            .collect())
    }

    /// 服务器确认评分后进入已提交状态
    pub fn submitted(self, result: QuizResult) -> Self {
        let answers = match self {
            QuizSession::NotStarted => BTreeMap::new(),
            QuizSession::InProgress { answers } | QuizSession::Submitted { answers, .. } => answers,
        };
        QuizSession::Submitted { answers, result }
    }

    /// 重做：清空之前的答案和分数
    pub fn retake(self) -> Self {
        match self {
            QuizSession::Submitted { .. } => QuizSession::InProgress {
                answers: BTreeMap::new(),
            },
            other => other,
        }
    }
}
