// src/api/mod.rs

//! 各业务域的 REST 服务。学员课程与证书相关接口同时通过
//! [`LearningBackend`] 暴露给控制器，便于替换实现。

pub mod admin;
pub mod ads;
pub mod catalog;
pub mod certificates;
pub mod coupons;
pub mod faq;
pub mod student;
pub mod subscriptions;

use crate::{
    client::RobustClient,
    error::AppResult,
    models::{
        Certificate, CodingResult, CourseSummary, QuizAnswer, QuizResult,
        api::{CourseProgressResponse, ProgressUpdate},
    },
};
use async_trait::async_trait;
use std::sync::Arc;

pub use certificates::CertificateService;
pub use student::StudentCourseService;

/// 课程进度跟踪器依赖的服务端能力
#[async_trait]
pub trait LearningBackend: Send + Sync {
    async fn enrolled_courses(&self) -> AppResult<Vec<CourseSummary>>;
    async fn course_progress(&self, slug: &str) -> AppResult<CourseProgressResponse>;
    async fn complete_lesson(&self, lesson_id: &str) -> AppResult<ProgressUpdate>;
    async fn incomplete_lesson(&self, lesson_id: &str) -> AppResult<ProgressUpdate>;
    async fn submit_quiz(&self, lesson_id: &str, answers: &[QuizAnswer]) -> AppResult<QuizResult>;
    async fn run_code(&self, lesson_id: &str, code: &str, language: &str) -> AppResult<CodingResult>;
    async fn submit_code(&self, lesson_id: &str, code: &str, language: &str) -> AppResult<CodingResult>;
    async fn issue_certificate(&self, course_id: &str) -> AppResult<Certificate>;
    async fn my_certificates(&self) -> AppResult<Vec<Certificate>>;
}

/// 基于 HTTP 的默认实现
pub struct ApiBackend {
    student: StudentCourseService,
    certificates: CertificateService,
}

impl ApiBackend {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self {
            student: StudentCourseService::new(http_client.clone()),
            certificates: CertificateService::new(http_client),
        }
    }
}

#[async_trait]
impl LearningBackend for ApiBackend {
    async fn enrolled_courses(&self) -> AppResult<Vec<CourseSummary>> {
        self.student.enrolled_courses().await
    }

    async fn course_progress(&self, slug: &str) -> AppResult<CourseProgressResponse> {
        self.student.course_progress(slug).await
    }

    async fn complete_lesson(&self, lesson_id: &str) -> AppResult<ProgressUpdate> {
        self.student.complete_lesson(lesson_id).await
    }

    async fn incomplete_lesson(&self, lesson_id: &str) -> AppResult<ProgressUpdate> {
        self.student.incomplete_lesson(lesson_id).await
    }

    async fn submit_quiz(&self, lesson_id: &str, answers: &[QuizAnswer]) -> AppResult<QuizResult> {
        self.student.submit_quiz(lesson_id, answers).await
    }

    async fn run_code(&self, lesson_id: &str, code: &str, language: &str) -> AppResult<CodingResult> {
        self.student.run_code(lesson_id, code, language).await
    }

    async fn submit_code(&self, lesson_id: &str, code: &str, language: &str) -> AppResult<CodingResult> {
        self.student.submit_code(lesson_id, code, language).await
    }

    async fn issue_certificate(&self, course_id: &str) -> AppResult<Certificate> {
        self.certificates.issue(course_id).await
    }

    async fn my_certificates(&self) -> AppResult<Vec<Certificate>> {
        self.certificates.mine().await
    }
}
