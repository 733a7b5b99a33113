// src/tracker/coding.rs

use crate::models::{CodingProblemContent, CodingResult};

/// 编程题的本地编辑状态。运行 (run) 与提交 (submit) 相互独立，只有提交会被评分并持久化
#[derive(Debug, Clone, PartialEq)]
pub struct CodingSession {
    pub language: String,
    pub code: String,
    pub last_run: Option<CodingResult>,
    pub last_submission: Option<CodingResult>,
}

impl CodingSession {
    /// 以题目的初始代码作为编辑缓冲区
    pub fn seeded(problem: &CodingProblemContent) -> Self {
        Self {
            language: problem.language.clone(),
            code: problem.starter_code.clone(),
            last_run: None,
            last_submission: None,
        }
    }

    pub fn edited(self, code: String) -> Self {
        Self { code, ..self }
    }

    pub fn with_language(self, language: String) -> Self {
        Self { language, ..self }
    }

    pub fn ran(self, result: CodingResult) -> Self {
        Self {
            last_run: Some(result),
            ..self
        }
    }

    pub fn submitted(self, result: CodingResult) -> Self {
        Self {
            last_submission: Some(result),
            ..self
        }
    }

    pub fn has_passing_submission(&self) -> bool {
        self.last_submission.as_ref().is_some_and(|r| r.is_passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> CodingProblemContent {
        CodingProblemContent {
            statement: "print hello".into(),
            starter_code: "print()".into(),
            language: "python".into(),
            languages: vec!["python".into()],
        }
    }

    fn passing() -> CodingResult {
        CodingResult { is_passed: true, score: Some(100.0), output: Some("hello".into()), message: None }
    }

    #[test]
    fn test_seeded_from_starter_code() {
        let session = CodingSession::seeded(&problem());
        assert_eq!(session.code, "print()");
        assert_eq!(session.language, "python");
        assert!(session.last_run.is_none());
    }

    #[test]
    fn test_passing_run_does_not_count_as_submission() {
        let session = CodingSession::seeded(&problem()).ran(passing());
        assert!(!session.has_passing_submission());
        let session = session.submitted(passing());
        assert!(session.has_passing_submission());
        assert!(session.last_run.is_some());
    }
}
