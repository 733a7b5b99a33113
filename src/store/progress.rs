// src/store/progress.rs

use crate::{
    models::{
        Course, CourseSummary, CodingResult, QuizResult,
        api::{CourseProgressResponse, ProgressUpdate},
    },
    tracker::{CodingSession, QuizSession},
};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

/// 单门课程的学习状态，完成集合以服务器返回为准
#[derive(Debug, Clone, PartialEq)]
pub struct CourseProgressState {
    pub course: Course,
    pub completed: BTreeSet<String>,
    pub reported_progress: Option<f64>,
    pub passed_assessments: BTreeSet<String>,
    pub quizzes: HashMap<String, QuizSession>,
    pub coding: HashMap<String, CodingSession>,
}

impl CourseProgressState {
    pub fn from_response(response: CourseProgressResponse) -> Self {
        Self {
            course: response.course,
            completed: response.completed_lessons.into_iter().collect(),
            reported_progress: response.progress,
            passed_assessments: response.passed_assessments.into_iter().collect(),
            quizzes: HashMap::new(),
            coding: HashMap::new(),
        }
    }

    /// 属于本课程的已完成课时数，服务器返回的其他 ID 不计入
    pub fn completed_in_course(&self) -> usize {
        self.course
            .lessons()
            .filter(|l| self.completed.contains(&l.id))
            .count()
    }

    /// 向下取整，因此只有全部课时完成时才会得到 100；空课程为 0
    pub fn progress_percentage(&self) -> u8 {
        let total = self.course.lesson_count();
        if total == 0 {
            return 0;
        }
        (self.completed_in_course() * 100 / total) as u8
    }

    fn warn_on_progress_mismatch(&self) {
        let pct = self.progress_percentage();
        if let Some(reported) = self.reported_progress
            && (reported.round() as i64) != pct as i64
        {
            warn!(
                "课程 '{}' 服务器进度 {:.0}% 与计算值 {}% 不一致",
                self.course.slug, reported, pct
            );
        }
    }

    pub fn quiz(&self, lesson_id: &str) -> Option<&QuizSession> {
        self.quizzes.get(lesson_id)
    }

    /// 已有会话，或者以题目初始代码新建一个
    pub fn coding_session(&self, lesson_id: &str) -> Option<CodingSession> {
        self.coding.get(lesson_id).cloned().or_else(|| {
            self.course
                .lesson(lesson_id)
                .and_then(|l| l.coding_problem())
                .map(CodingSession::seeded)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StudentCourseState {
    pub enrolled: Vec<CourseSummary>,
    pub courses: HashMap<String, CourseProgressState>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StudentCourseEvent {
    EnrolledLoaded(Vec<CourseSummary>),
    ProgressLoaded {
        slug: String,
        response: CourseProgressResponse,
    },
    ProgressRefreshed {
        slug: String,
        update: ProgressUpdate,
    },
    QuizAnswered {
        slug: String,
        lesson_id: String,
        question_id: String,
        option: usize,
    },
    QuizSubmitted {
        slug: String,
        lesson_id: String,
        result: QuizResult,
    },
    QuizRetaken {
        slug: String,
        lesson_id: String,
    },
    CodeEdited {
        slug: String,
        lesson_id: String,
        code: String,
    },
    CodeLanguageSelected {
        slug: String,
        lesson_id: String,
        language: String,
    },
    CodeRan {
        slug: String,
        lesson_id: String,
        result: CodingResult,
    },
    CodeSubmitted {
        slug: String,
        lesson_id: String,
        result: CodingResult,
    },
}

impl StudentCourseState {
    pub fn course(&self, slug: &str) -> Option<&CourseProgressState> {
        self.courses.get(slug)
    }

    pub fn reduce(mut self, event: StudentCourseEvent) -> Self {
        match event {
            StudentCourseEvent::EnrolledLoaded(list) => {
                self.enrolled = list;
            }
            StudentCourseEvent::ProgressLoaded { slug, response } => {
                let mut next = CourseProgressState::from_response(response);
                // 重新加载时保留仍然存在的课时的本地作答/编辑状态
                if let Some(prev) = self.courses.remove(&slug) {
                    next.quizzes = prev
                        .quizzes
                        .into_iter()
                        .filter(|(id, _)| next.course.lesson(id).is_some())
                        .collect();
                    next.coding = prev
                        .coding
                        .into_iter()
                        .filter(|(id, _)| next.course.lesson(id).is_some())
                        .collect();
                }
                debug!("课程 '{}' 进度已加载，已完成 {} 个课时", slug, next.completed.len());
                next.warn_on_progress_mismatch();
                self.courses.insert(slug, next);
            }
            StudentCourseEvent::ProgressRefreshed { slug, update } => {
                if let Some(state) = self.courses.get_mut(&slug) {
                    // 没有完成列表时保留原集合，由控制器重新拉取
                    match update.completed_lessons {
                        Some(list) => state.completed = list.into_iter().collect(),
                        None => debug!("课程 '{}' 的进度更新不含完成列表，保留现有状态", slug),
                    }
                    if update.progress.is_some() {
                        state.reported_progress = update.progress;
                    }
                    state.warn_on_progress_mismatch();
                } else {
                    warn!("收到未加载课程 '{}' 的进度更新，已忽略", slug);
                }
            }
            StudentCourseEvent::QuizAnswered { slug, lesson_id, question_id, option } => {
                if let Some(state) = self.courses.get_mut(&slug) {
                    let session = state.quizzes.remove(&lesson_id).unwrap_or_default();
                    state
                        .quizzes
                        .insert(lesson_id, session.answered(&question_id, option));
                }
            }
            StudentCourseEvent::QuizSubmitted { slug, lesson_id, result } => {
                if let Some(state) = self.courses.get_mut(&slug) {
                    let session = state.quizzes.remove(&lesson_id).unwrap_or_default();
                    state.quizzes.insert(lesson_id, session.submitted(result));
                }
            }
            StudentCourseEvent::QuizRetaken { slug, lesson_id } => {
                if let Some(state) = self.courses.get_mut(&slug) {
                    let session = state.quizzes.remove(&lesson_id).unwrap_or_default();
                    state.quizzes.insert(lesson_id, session.retake());
                }
            }
            StudentCourseEvent::CodeEdited { slug, lesson_id, code } => {
                self.update_coding(&slug, lesson_id, |s| s.edited(code));
            }
            StudentCourseEvent::CodeLanguageSelected { slug, lesson_id, language } => {
                self.update_coding(&slug, lesson_id, |s| s.with_language(language));
            }
            StudentCourseEvent::CodeRan { slug, lesson_id, result } => {
                self.update_coding(&slug, lesson_id, |s| s.ran(result));
            }
            StudentCourseEvent::CodeSubmitted { slug, lesson_id, result } => {
                self.update_coding(&slug, lesson_id, |s| s.submitted(result));
            }
        }
        self
    }

    fn update_coding<F>(&mut self, slug: &str, lesson_id: String, f: F)
    where
        F: FnOnce(CodingSession) -> CodingSession,
    {
        let Some(state) = self.courses.get_mut(slug) else {
            return;
        };
        match state.coding_session(&lesson_id) {
            Some(session) => {
                state.coding.insert(lesson_id, f(session));
            }
            None => warn!("课时 '{}' 不是可用的编程题，已忽略", lesson_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(completed: &[&str]) -> CourseProgressResponse {
        serde_json::from_value(json!({
            "course": {
                "id": "c1", "slug": "rust", "title": "Rust",
                "chapters": [{
                    "id": "ch1", "title": "Basics",
                    "lessons": [
                        { "id": "l1", "title": "Quiz", "type": "quiz",
                          "content": { "questions": [{ "id": "q1", "question": "?", "options": ["a", "b"] }] } },
                        { "id": "l2", "title": "Code", "type": "codingProblem",
                          "content": { "statement": "s", "starterCode": "start", "language": "rust" } }
                    ]
                }]
            },
            "completedLessons": completed,
            "progress": 50.0
        }))
        .unwrap()
    }

    fn loaded(completed: &[&str]) -> StudentCourseState {
        StudentCourseState::default().reduce(StudentCourseEvent::ProgressLoaded {
            slug: "rust".into(),
            response: response(completed),
        })
    }

    #[test]
    fn test_progress_refresh_replaces_completed_set() {
        let state = loaded(&["l1"]).reduce(StudentCourseEvent::ProgressRefreshed {
            slug: "rust".into(),
            update: ProgressUpdate { completed_lessons: Some(vec!["l2".into()]), progress: Some(50.0) },
        });
        let course = state.course("rust").unwrap();
        assert!(course.completed.contains("l2"));
        assert!(!course.completed.contains("l1"));
    }

    #[test]
    fn test_progress_only_refresh_keeps_completed_set() {
        let update: ProgressUpdate = serde_json::from_value(json!({ "progress": 100.0 })).unwrap();
        assert_eq!(update.completed_lessons, None);

        let state = loaded(&["l1"]).reduce(StudentCourseEvent::ProgressRefreshed {
            slug: "rust".into(),
            update,
        });
        let course = state.course("rust").unwrap();
        assert!(course.completed.contains("l1"));
        assert_eq!(course.reported_progress, Some(100.0));
        assert_eq!(course.progress_percentage(), 50);
    }

    #[test]
    fn test_refresh_for_unknown_course_is_ignored() {
        let before = loaded(&[]);
        let after = before.clone().reduce(StudentCourseEvent::ProgressRefreshed {
            slug: "other".into(),
            update: ProgressUpdate { completed_lessons: Some(vec!["x".into()]), progress: None },
        });
        assert_eq!(before, after);
    }

    #[test]
    fn test_reload_keeps_local_sessions() {
        let state = loaded(&[])
            .reduce(StudentCourseEvent::QuizAnswered {
                slug: "rust".into(),
                lesson_id: "l1".into(),
                question_id: "q1".into(),
                option: 1,
            })
            .reduce(StudentCourseEvent::ProgressLoaded {
                slug: "rust".into(),
                response: response(&["l2"]),
            });
        let course = state.course("rust").unwrap();
        assert_eq!(course.quiz("l1").unwrap().answers().unwrap()["q1"], 1);
        assert!(course.completed.contains("l2"));
    }

    #[test]
    fn test_code_events_seed_from_starter_code() {
        let state = loaded(&[]).reduce(StudentCourseEvent::CodeRan {
            slug: "rust".into(),
            lesson_id: "l2".into(),
            result: CodingResult { is_passed: true, score: None, output: Some("ok".into()), message: None },
        });
        let session = &state.course("rust").unwrap().coding["l2"];
        assert_eq!(session.code, "start");
        assert!(session.last_run.is_some());
        assert!(!session.has_passing_submission());
    }

    #[test]
    fn test_code_events_ignored_for_non_coding_lesson() {
        let before = loaded(&[]);
        let after = before.clone().reduce(StudentCourseEvent::CodeEdited {
            slug: "rust".into(),
            lesson_id: "l1".into(),
            code: "x".into(),
        });
        assert_eq!(before, after);
    }
}
