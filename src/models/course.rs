// src/models/course.rs

use serde::{Deserialize, Serialize};

/// 课程结构 (服务器所有，客户端只读缓存)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Course {
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.chapters.iter().flat_map(|c| c.lessons.iter())
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons().find(|l| l.id == lesson_id)
    }

    pub fn lesson_count(&self) -> usize {
        self.chapters.iter().map(|c| c.lessons.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub body: LessonBody,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// 按 `type` 字段区分的课时内容；`content` 缺失表示课时被锁定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LessonBody {
    Video {
        #[serde(default)]
        content: Option<VideoContent>,
    },
    Article {
        #[serde(default)]
        content: Option<ArticleContent>,
    },
    Quiz {
        #[serde(default)]
        content: Option<QuizContent>,
    },
    CodingProblem {
        #[serde(default)]
        content: Option<CodingProblemContent>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonKind {
    Video,
    Article,
    Quiz,
    CodingProblem,
}

impl LessonKind {
    pub fn label(&self) -> &'static str {
        match self {
            LessonKind::Video => "视频",
            LessonKind::Article => "文章",
            LessonKind::Quiz => "测验",
            LessonKind::CodingProblem => "编程题",
        }
    }

    /// 需要通过的提交才能标记完成
    pub fn is_assessment(&self) -> bool {
        matches!(self, LessonKind::Quiz | LessonKind::CodingProblem)
    }
}

impl Lesson {
    pub fn kind(&self) -> LessonKind {
        match self.body {
            LessonBody::Video { .. } => LessonKind::Video,
            LessonBody::Article { .. } => LessonKind::Article,
            LessonBody::Quiz { .. } => LessonKind::Quiz,
            LessonBody::CodingProblem { .. } => LessonKind::CodingProblem,
        }
    }

    pub fn is_locked(&self) -> bool {
        match &self.body {
            LessonBody::Video { content } => content.is_none(),
            LessonBody::Article { content } => content.is_none(),
            LessonBody::Quiz { content } => content.is_none(),
            LessonBody::CodingProblem { content } => content.is_none(),
        }
    }

    pub fn quiz(&self) -> Option<&QuizContent> {
        match &self.body {
            LessonBody::Quiz { content } => content.as_ref(),
            _ => None,
        }
    }

    pub fn coding_problem(&self) -> Option<&CodingProblemContent> {
        match &self.body {
            LessonBody::CodingProblem { content } => content.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoContent {
    pub url: String,
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleContent {
    #[serde(alias = "body")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizContent {
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
    #[serde(default = "default_pass_score")]
    pub pass_score: u32,
}

fn default_pass_score() -> u32 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "prompt")]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodingProblemContent {
    #[serde(alias = "description")]
    pub statement: String,
    #[serde(default)]
    pub starter_code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub languages: Vec<String>,
}

fn default_language() -> String {
    "javascript".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    pub url: String,
}

/// 课程目录中的课程摘要
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lesson_count: Option<u32>,
    /// 仅在“我的课程”列表中出现
    #[serde(default)]
    pub progress: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lesson_body_tagged_by_type() {
        let lesson: Lesson = serde_json::from_value(json!({
            "_id": "l1",
            "title": "Intro",
            "type": "codingProblem",
            "content": { "description": "sum two numbers", "starterCode": "fn main() {}", "language": "rust" }
        }))
        .unwrap();
        assert_eq!(lesson.kind(), LessonKind::CodingProblem);
        assert!(!lesson.is_locked());
        let problem = lesson.coding_problem().unwrap();
        assert_eq!(problem.language, "rust");
        assert_eq!(problem.starter_code, "fn main() {}");
    }

    #[test]
    fn test_lesson_without_content_is_locked() {
        let missing: Lesson =
            serde_json::from_value(json!({ "id": "l2", "title": "Paid", "type": "video" })).unwrap();
        let null: Lesson = serde_json::from_value(
            json!({ "id": "l3", "title": "Paid", "type": "quiz", "content": null }),
        )
        .unwrap();
        assert!(missing.is_locked());
        assert!(null.is_locked());
        assert!(null.quiz().is_none());
    }

    #[test]
    fn test_unknown_lesson_type_is_rejected() {
        let res: Result<Lesson, _> =
            serde_json::from_value(json!({ "id": "l4", "title": "?", "type": "podcast" }));
        assert!(res.is_err());
    }

    #[test]
    fn test_quiz_pass_score_defaults() {
        let quiz: QuizContent = serde_json::from_value(json!({
            "questions": [{ "id": "q1", "question": "1+1?", "options": ["1", "2"] }]
        }))
        .unwrap();
        assert_eq!(quiz.pass_score, 50);
        assert_eq!(quiz.questions[0].options.len(), 2);
    }
}
