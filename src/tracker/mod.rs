// src/tracker/mod.rs

//! 课程进度跟踪：基于服务器返回的课程结构与已完成集合计算派生状态。
//! 完成状态本身从不在本地推断，只有百分比在客户端计算。

mod coding;
mod quiz;

pub use coding::CodingSession;
pub use quiz::QuizSession;

use crate::{
    error::CompletionBlock,
    models::{Certificate, Chapter, Lesson, LessonKind, LessonState},
    store::CourseProgressState,
};

/// 证书入口的状态
#[derive(Debug, Clone, PartialEq)]
pub enum CertificateOffer<'a> {
    /// 进度未满 100%
    Locked { progress: u8 },
    /// 可以申请
    Available,
    /// 已有证书，直接展示
    Issued(&'a Certificate),
}

pub struct CourseTracker<'a> {
    state: &'a CourseProgressState,
    certificate: Option<&'a Certificate>,
}

impl<'a> CourseTracker<'a> {
    pub fn new(state: &'a CourseProgressState, certificate: Option<&'a Certificate>) -> Self {
        Self { state, certificate }
    }

    pub fn state(&self) -> &'a CourseProgressState {
        self.state
    }

    pub fn lesson(&self, lesson_id: &str) -> Option<&'a Lesson> {
        self.state.course.lesson(lesson_id)
    }

    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.state.completed.contains(lesson_id)
    }

    /// 空章节永远不算完成
    pub fn is_chapter_completed(&self, chapter: &Chapter) -> bool {
        !chapter.lessons.is_empty()
            && chapter
                .lessons
                .iter()
                .all(|l| self.is_lesson_completed(&l.id))
    }

    pub fn total_lessons(&self) -> usize {
        self.state.course.lesson_count()
    }

    /// 只统计属于本课程的已完成课时
    pub fn completed_lessons(&self) -> usize {
        self.state.completed_in_course()
    }

    /// 向下取整，因此只有全部课时完成时才会得到 100
    pub fn progress_percentage(&self) -> u8 {
        self.state.progress_percentage()
    }

    pub fn lesson_state(&self, lesson: &Lesson) -> LessonState {
        if lesson.is_locked() {
            LessonState::Locked
        } else if self.is_lesson_completed(&lesson.id) {
            LessonState::Complete
        } else {
            LessonState::Incomplete
        }
    }

    /// 测验/编程题是否已有通过的提交 (本地最近结果或服务器记录)
    pub fn has_passing_submission(&self, lesson: &Lesson) -> bool {
        if self.state.passed_assessments.contains(&lesson.id) {
            return true;
        }
        match lesson.kind() {
            LessonKind::Quiz => self
                .state
                .quiz(&lesson.id)
                .is_some_and(QuizSession::is_passed),
            LessonKind::CodingProblem => self
                .state
                .coding
                .get(&lesson.id)
                .is_some_and(CodingSession::has_passing_submission),
            LessonKind::Video | LessonKind::Article => false,
        }
    }

    pub fn can_complete_lesson(&self, lesson_id: &str) -> Result<(), CompletionBlock> {
        let lesson = self.lesson(lesson_id).ok_or(CompletionBlock::UnknownLesson)?;
        if lesson.is_locked() {
            return Err(CompletionBlock::Locked);
        }
        if self.is_lesson_completed(lesson_id) {
            return Err(CompletionBlock::AlreadyCompleted);
        }
        if lesson.kind().is_assessment() && !self.has_passing_submission(lesson) {
            return Err(CompletionBlock::AssessmentNotPassed);
        }
        Ok(())
    }

    pub fn can_incomplete_lesson(&self, lesson_id: &str) -> Result<(), CompletionBlock> {
        self.lesson(lesson_id)
            .map(|_| ())
            .ok_or(CompletionBlock::UnknownLesson)
    }

    pub fn certificate_offer(&self) -> CertificateOffer<'a> {
        if let Some(cert) = self.certificate {
            return CertificateOffer::Issued(cert);
        }
        match self.progress_percentage() {
            100 => CertificateOffer::Available,
            progress => CertificateOffer::Locked { progress },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodingResult, QuizResult, api::CourseProgressResponse};
    use serde_json::json;

    /// 2 个章节 × 2 个课时
    fn state(completed: &[&str]) -> CourseProgressState {
        let response: CourseProgressResponse = serde_json::from_value(json!({
            "course": {
                "id": "c1", "slug": "rust-101", "title": "Rust 101",
                "chapters": [
                    { "id": "ch1", "title": "One", "lessons": [
                        { "id": "v1", "title": "Video", "type": "video", "content": { "url": "https://v/1" } },
                        { "id": "a1", "title": "Article", "type": "article", "content": { "text": "hi" } }
                    ]},
                    { "id": "ch2", "title": "Two", "lessons": [
                        { "id": "q1", "title": "Quiz", "type": "quiz",
                          "content": { "questions": [{ "id": "x", "question": "?", "options": ["a", "b"] }], "passScore": 50 } },
                        { "id": "p1", "title": "Code", "type": "codingProblem",
                          "content": { "statement": "s", "starterCode": "", "language": "rust" } }
                    ]},
                    { "id": "ch3", "title": "Empty", "lessons": [] }
                ]
            },
            "completedLessons": completed
        }))
        .unwrap();
        CourseProgressState::from_response(response)
    }

    #[test]
    fn test_progress_three_of_four_is_75() {
        let s = state(&["v1", "a1", "q1"]);
        let tracker = CourseTracker::new(&s, None);
        assert_eq!(tracker.progress_percentage(), 75);
        assert_eq!(tracker.certificate_offer(), CertificateOffer::Locked { progress: 75 });

        let s = state(&["v1", "a1", "q1", "p1"]);
        let tracker = CourseTracker::new(&s, None);
        assert_eq!(tracker.progress_percentage(), 100);
        assert_eq!(tracker.certificate_offer(), CertificateOffer::Available);
    }

    #[test]
    fn test_progress_ignores_foreign_lesson_ids() {
        let s = state(&["v1", "elsewhere"]);
        assert_eq!(CourseTracker::new(&s, None).progress_percentage(), 25);
    }

    #[test]
    fn test_progress_rounds_down_below_100() {
        let mut s = state(&["v1", "a1", "q1", "p1", "v2"]);
        for id in ["v2", "v3"] {
            let mut extra = s.course.chapters[0].lessons[0].clone();
            extra.id = id.into();
            s.course.chapters[0].lessons.push(extra);
        }
        // 5 / 6
        assert_eq!(CourseTracker::new(&s, None).progress_percentage(), 83);
    }

    #[test]
    fn test_empty_course_has_zero_progress() {
        let mut s = state(&[]);
        s.course.chapters.clear();
        let tracker = CourseTracker::new(&s, None);
        assert_eq!(tracker.progress_percentage(), 0);
        assert!(matches!(tracker.certificate_offer(), CertificateOffer::Locked { .. }));
    }

    #[test]
    fn test_chapter_completion() {
        let s = state(&["v1", "a1", "q1"]);
        let tracker = CourseTracker::new(&s, None);
        let chapters = &s.course.chapters;
        assert!(tracker.is_chapter_completed(&chapters[0]));
        assert!(!tracker.is_chapter_completed(&chapters[1]));
        assert!(!tracker.is_chapter_completed(&chapters[2]));
    }

    #[test]
    fn test_locked_lesson_never_completable() {
        let mut s = state(&[]);
        s.course.chapters[0].lessons[0].body = crate::models::LessonBody::Video { content: None };
        let tracker = CourseTracker::new(&s, None);
        let lesson = tracker.lesson("v1").unwrap();
        assert_eq!(tracker.lesson_state(lesson), LessonState::Locked);
        assert_eq!(tracker.can_complete_lesson("v1"), Err(CompletionBlock::Locked));

        // 服务器记录了完成，但内容仍然锁定
        s.completed.insert("v1".into());
        let tracker = CourseTracker::new(&s, None);
        assert_eq!(tracker.can_complete_lesson("v1"), Err(CompletionBlock::Locked));
    }

    #[test]
    fn test_assessments_need_passing_submission() {
        let mut s = state(&[]);
        {
            let tracker = CourseTracker::new(&s, None);
            assert_eq!(tracker.can_complete_lesson("v1"), Ok(()));
            assert_eq!(tracker.can_complete_lesson("q1"), Err(CompletionBlock::AssessmentNotPassed));
            assert_eq!(tracker.can_complete_lesson("p1"), Err(CompletionBlock::AssessmentNotPassed));
            assert_eq!(tracker.can_complete_lesson("zz"), Err(CompletionBlock::UnknownLesson));
        }

        let failing = QuizResult { score: 40.0, is_passed: false, pass_score: Some(50), correct_answers: None, total_questions: None };
        s.quizzes.insert("q1".into(), QuizSession::default().answered("x", 0).submitted(failing));
        s.coding.insert(
            "p1".into(),
            CodingSession {
                language: "rust".into(),
                code: String::new(),
                last_run: Some(CodingResult { is_passed: true, score: None, output: None, message: None }),
                last_submission: None,
            },
        );
        let tracker = CourseTracker::new(&s, None);
        assert_eq!(tracker.can_complete_lesson("q1"), Err(CompletionBlock::AssessmentNotPassed));
        assert_eq!(tracker.can_complete_lesson("p1"), Err(CompletionBlock::AssessmentNotPassed));

        s.passed_assessments.insert("q1".into());
        let tracker = CourseTracker::new(&s, None);
        assert_eq!(tracker.can_complete_lesson("q1"), Ok(()));
    }

    #[test]
    fn test_already_completed_lesson() {
        let s = state(&["v1"]);
        let tracker = CourseTracker::new(&s, None);
        assert_eq!(tracker.can_complete_lesson("v1"), Err(CompletionBlock::AlreadyCompleted));
        assert_eq!(tracker.can_incomplete_lesson("v1"), Ok(()));
    }

    #[test]
    fn test_existing_certificate_is_surfaced() {
        let s = state(&["v1"]);
        let cert = Certificate {
            id: "cert".into(),
            course_id: "c1".into(),
            course_title: None,
            student_name: None,
            issued_at: None,
            verification_token: "tok".into(),
        };
        let tracker = CourseTracker::new(&s, Some(&cert));
        assert_eq!(tracker.certificate_offer(), CertificateOffer::Issued(&cert));
    }
}
