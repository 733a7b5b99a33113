// src/api/student.rs

use crate::{
    client::RobustClient,
    constants::api::student,
    error::AppResult,
    models::{
        CodingResult, CourseSummary, QuizAnswer, QuizResult,
        api::{CodeRequest, CourseProgressResponse, ProgressUpdate, QuizSubmission},
    },
};
use log::{debug, info};
use std::sync::Arc;

pub struct StudentCourseService {
    http_client: Arc<RobustClient>,
}

impl StudentCourseService {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self { http_client }
    }

    pub async fn enrolled_courses(&self) -> AppResult<Vec<CourseSummary>> {
        self.http_client.get_json(student::COURSES, &[], &[]).await
    }

    pub async fn course_progress(&self, slug: &str) -> AppResult<CourseProgressResponse> {
        let res: CourseProgressResponse = self
            .http_client
            .get_json(student::PROGRESS, &[("slug", slug)], &[])
            .await?;
        debug!(
            "课程 '{}' 共 {} 个课时，已完成 {}",
            slug,
            res.course.lesson_count(),
            res.completed_lessons.len()
        );
        Ok(res)
    }

    pub async fn complete_lesson(&self, lesson_id: &str) -> AppResult<ProgressUpdate> {
        info!("请求标记课时 '{}' 为已完成", lesson_id);
        self.http_client
            .post_json(student::COMPLETE, &[("lesson_id", lesson_id)], &serde_json::json!({}))
            .await
    }

    pub async fn incomplete_lesson(&self, lesson_id: &str) -> AppResult<ProgressUpdate> {
        info!("请求标记课时 '{}' 为未完成", lesson_id);
        self.http_client
            .post_json(student::INCOMPLETE, &[("lesson_id", lesson_id)], &serde_json::json!({}))
            .await
    }

    pub async fn submit_quiz(&self, lesson_id: &str, answers: &[QuizAnswer]) -> AppResult<QuizResult> {
        info!("提交测验 '{}'，共 {} 个答案", lesson_id, answers.len());
        self.http_client
            .post_json(
                student::SUBMIT_QUIZ,
                &[("lesson_id", lesson_id)],
                &QuizSubmission { answers },
            )
            .await
    }

    /// 仅运行，不计分也不保存
    pub async fn run_code(&self, lesson_id: &str, code: &str, language: &str) -> AppResult<CodingResult> {
        debug!("运行代码 '{}' ({})", lesson_id, language);
        self.http_client
            .post_json(
                student::RUN_CODE,
                &[("lesson_id", lesson_id)],
                &CodeRequest { code, language },
            )
            .await
    }

    pub async fn submit_code(&self, lesson_id: &str, code: &str, language: &str) -> AppResult<CodingResult> {
        info!("提交代码 '{}' ({})", lesson_id, language);
        self.http_client
            .post_json(
                student::SUBMIT_CODE,
                &[("lesson_id", lesson_id)],
                &CodeRequest { code, language },
            )
            .await
    }
}
