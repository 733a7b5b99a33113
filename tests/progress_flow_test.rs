// tests/progress_flow_test.rs

use async_trait::async_trait;
use learnctl::{
    api::LearningBackend,
    client::RobustClient,
    config::AppConfig,
    controller::AppController,
    error::{AppError, AppResult, CompletionBlock},
    models::{
        Certificate, CodingResult, CourseSummary, QuizAnswer, QuizResult,
        api::{CourseProgressResponse, ProgressUpdate},
    },
    tracker::CertificateOffer,
};
use serde_json::json;
use std::{
    collections::{BTreeSet, VecDeque},
    sync::{Arc, Mutex},
};
use tokio::sync::Mutex as TokioMutex;

/// 内存中的课程进度后端，记录收到的每个请求
struct FakeBackend {
    progress: CourseProgressResponse,
    completed: Mutex<BTreeSet<String>>,
    quiz_results: Mutex<VecDeque<QuizResult>>,
    calls: Mutex<Vec<String>>,
    fail_mutations: bool,
    progress_only: bool,
}

impl FakeBackend {
    fn new(progress: CourseProgressResponse) -> Self {
        let completed = progress.completed_lessons.iter().cloned().collect();
        Self {
            progress,
            completed: Mutex::new(completed),
            quiz_results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fail_mutations: false,
            progress_only: false,
        }
    }

    /// 标记接口只返回百分比，不带完成列表
    fn progress_only(mut self) -> Self {
        self.progress_only = true;
        self
    }

    fn failing(mut self) -> Self {
        self.fail_mutations = true;
        self
    }

    fn with_quiz_results(self, results: Vec<QuizResult>) -> Self {
        *self.quiz_results.lock().unwrap() = results.into();
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn update(&self) -> ProgressUpdate {
        let completed = self.completed.lock().unwrap();
        if self.progress_only {
            let total = self.progress.course.lesson_count();
            return ProgressUpdate {
                completed_lessons: None,
                progress: Some((completed.len() * 100 / total) as f64),
            };
        }
        ProgressUpdate {
            completed_lessons: Some(completed.iter().cloned().collect()),
            progress: None,
        }
    }

    fn check_failure(&self) -> AppResult<()> {
        if self.fail_mutations {
            return Err(AppError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                message: "boom".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LearningBackend for FakeBackend {
    async fn enrolled_courses(&self) -> AppResult<Vec<CourseSummary>> {
        self.record("enrolled".to_string());
        Ok(Vec::new())
    }

    async fn course_progress(&self, slug: &str) -> AppResult<CourseProgressResponse> {
        self.record(format!("progress {}", slug));
        let mut res = self.progress.clone();
        res.completed_lessons = self.completed.lock().unwrap().iter().cloned().collect();
        Ok(res)
    }

    async fn complete_lesson(&self, lesson_id: &str) -> AppResult<ProgressUpdate> {
        self.record(format!("complete {}", lesson_id));
        self.check_failure()?;
        self.completed.lock().unwrap().insert(lesson_id.to_string());
        Ok(self.update())
    }

    async fn incomplete_lesson(&self, lesson_id: &str) -> AppResult<ProgressUpdate> {
        self.record(format!("incomplete {}", lesson_id));
        self.check_failure()?;
        self.completed.lock().unwrap().remove(lesson_id);
        Ok(self.update())
    }

    async fn submit_quiz(&self, lesson_id: &str, answers: &[QuizAnswer]) -> AppResult<QuizResult> {
        self.record(format!("quiz {} ({} answers)", lesson_id, answers.len()));
        self.quiz_results
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::UserInputError("no scripted quiz result".to_string()))
    }

    async fn run_code(&self, lesson_id: &str, _code: &str, _language: &str) -> AppResult<CodingResult> {
        self.record(format!("run {}", lesson_id));
        Ok(coding_result(false))
    }

    async fn submit_code(&self, lesson_id: &str, code: &str, _language: &str) -> AppResult<CodingResult> {
        self.record(format!("submit {}", lesson_id));
        Ok(coding_result(code.contains("return a + b")))
    }

    async fn issue_certificate(&self, course_id: &str) -> AppResult<Certificate> {
        self.record(format!("issue {}", course_id));
        Ok(serde_json::from_value(json!({
            "_id": "cert-1",
            "course": course_id,
            "certificateId": "VERIFY-1"
        }))?)
    }

    async fn my_certificates(&self) -> AppResult<Vec<Certificate>> {
        self.record("certificates".to_string());
        Ok(Vec::new())
    }
}

fn coding_result(is_passed: bool) -> CodingResult {
    CodingResult {
        is_passed,
        score: None,
        output: Some("ok".to_string()),
        message: None,
    }
}

fn quiz_result(score: f64, is_passed: bool) -> QuizResult {
    QuizResult {
        score,
        is_passed,
        pass_score: Some(50),
        correct_answers: None,
        total_questions: Some(2),
    }
}

/// 两章、每章两课时；第二章含一个测验
fn progress_fixture(completed: &[&str]) -> CourseProgressResponse {
    serde_json::from_value(json!({
        "course": {
            "_id": "course-1",
            "slug": "rust-basics",
            "title": "Rust 基础",
            "chapters": [
                {
                    "_id": "c1",
                    "title": "入门",
                    "lessons": [
                        { "_id": "l1", "title": "安装", "type": "video", "content": { "url": "https://v/1" } },
                        { "_id": "l2", "title": "所有权", "type": "article", "content": { "text": "..." } }
                    ]
                },
                {
                    "_id": "c2",
                    "title": "练习",
                    "lessons": [
                        {
                            "_id": "l3",
                            "title": "小测",
                            "type": "quiz",
                            "content": {
                                "passScore": 50,
                                "questions": [
                                    { "_id": "q1", "question": "1 + 1 = ?", "options": ["1", "2"] },
                                    { "_id": "q2", "question": "借用检查器?", "options": ["是", "否"] }
                                ]
                            }
                        },
                        { "_id": "l4", "title": "总结", "type": "video", "content": { "url": "https://v/4" } }
                    ]
                }
            ]
        },
        "completedLessons": completed,
        "progress": null
    }))
    .unwrap()
}

fn controller_with(backend: Arc<FakeBackend>) -> AppController {
    let config = Arc::new(AppConfig::default());
    let http_client = Arc::new(RobustClient::new(config, Arc::new(TokioMutex::new(None))).unwrap());
    AppController::with_backend(http_client, backend)
}

#[tokio::test]
async fn test_completing_last_lesson_unlocks_certificate() {
    let backend = Arc::new(FakeBackend::new(progress_fixture(&["l1", "l2", "l3"])));
    let mut controller = controller_with(backend.clone());

    controller.load_progress("rust-basics").await.unwrap();
    {
        let tracker = controller.tracker("rust-basics").unwrap();
        assert_eq!(tracker.progress_percentage(), 75);
        assert_eq!(tracker.certificate_offer(), CertificateOffer::Locked { progress: 75 });
    }

    controller.complete_lesson("rust-basics", "l4").await.unwrap();
    {
        let tracker = controller.tracker("rust-basics").unwrap();
        assert_eq!(tracker.progress_percentage(), 100);
        assert!(tracker.is_lesson_completed("l4"));
        assert_eq!(tracker.certificate_offer(), CertificateOffer::Available);
    }

    let cert = controller.issue_certificate("rust-basics").await.unwrap();
    assert_eq!(cert.course_id, "course-1");
    assert!(matches!(
        controller.tracker("rust-basics").unwrap().certificate_offer(),
        CertificateOffer::Issued(c) if c.id == "cert-1"
    ));

    // 已有证书时不会再次申请
    controller.issue_certificate("rust-basics").await.unwrap();
    let issue_calls = backend.calls().iter().filter(|c| c.starts_with("issue")).count();
    assert_eq!(issue_calls, 1);
}

#[tokio::test]
async fn test_certificate_refused_below_full_progress() {
    let backend = Arc::new(FakeBackend::new(progress_fixture(&["l1"])));
    let mut controller = controller_with(backend.clone());
    controller.load_progress("rust-basics").await.unwrap();

    let err = controller.issue_certificate("rust-basics").await.unwrap_err();
    assert!(matches!(err, AppError::CertificateNotEligible { progress: 25 }));
    assert!(!backend.calls().iter().any(|c| c.starts_with("issue")));
}

#[tokio::test]
async fn test_locked_lesson_sends_no_request() {
    let mut progress = progress_fixture(&[]);
    progress.course.chapters[0].lessons[0] = serde_json::from_value(json!({
        "_id": "l1", "title": "安装", "type": "video", "content": null
    }))
    .unwrap();
    let backend = Arc::new(FakeBackend::new(progress));
    let mut controller = controller_with(backend.clone());
    controller.load_progress("rust-basics").await.unwrap();

    let err = controller.complete_lesson("rust-basics", "l1").await.unwrap_err();
    assert!(matches!(err, AppError::CompletionNotAllowed(CompletionBlock::Locked)));
    assert_eq!(backend.calls(), vec!["progress rust-basics".to_string()]);
}

#[tokio::test]
async fn test_failed_mutation_leaves_state_unchanged() {
    let backend = Arc::new(FakeBackend::new(progress_fixture(&["l1"])).failing());
    let mut controller = controller_with(backend.clone());
    controller.load_progress("rust-basics").await.unwrap();

    let err = controller.complete_lesson("rust-basics", "l2").await.unwrap_err();
    assert!(matches!(err, AppError::Api { .. }));
    let tracker = controller.tracker("rust-basics").unwrap();
    assert!(!tracker.is_lesson_completed("l2"));
    assert_eq!(tracker.progress_percentage(), 25);
}

#[tokio::test]
async fn test_complete_then_incomplete_round_trip() {
    let backend = Arc::new(FakeBackend::new(progress_fixture(&["l1"])));
    let mut controller = controller_with(backend.clone());
    controller.load_progress("rust-basics").await.unwrap();

    controller.complete_lesson("rust-basics", "l2").await.unwrap();
    assert_eq!(controller.tracker("rust-basics").unwrap().progress_percentage(), 50);

    // 重复完成在本地被拦截
    let err = controller.complete_lesson("rust-basics", "l2").await.unwrap_err();
    assert!(matches!(err, AppError::CompletionNotAllowed(CompletionBlock::AlreadyCompleted)));

    controller.incomplete_lesson("rust-basics", "l2").await.unwrap();
    let tracker = controller.tracker("rust-basics").unwrap();
    assert!(!tracker.is_lesson_completed("l2"));
    assert_eq!(tracker.progress_percentage(), 25);
    assert_eq!(
        backend.calls(),
        vec![
            "progress rust-basics".to_string(),
            "complete l2".to_string(),
            "incomplete l2".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_progress_only_response_reloads_completed_set() {
    let backend = Arc::new(FakeBackend::new(progress_fixture(&["l1"])).progress_only());
    let mut controller = controller_with(backend.clone());
    controller.load_progress("rust-basics").await.unwrap();

    controller.complete_lesson("rust-basics", "l2").await.unwrap();
    {
        let tracker = controller.tracker("rust-basics").unwrap();
        assert!(tracker.is_lesson_completed("l1"));
        assert!(tracker.is_lesson_completed("l2"));
        assert_eq!(tracker.progress_percentage(), 50);
    }

    controller.incomplete_lesson("rust-basics", "l2").await.unwrap();
    let tracker = controller.tracker("rust-basics").unwrap();
    assert!(tracker.is_lesson_completed("l1"));
    assert!(!tracker.is_lesson_completed("l2"));
    assert_eq!(
        backend.calls(),
        vec![
            "progress rust-basics".to_string(),
            "complete l2".to_string(),
            "progress rust-basics".to_string(),
            "incomplete l2".to_string(),
            "progress rust-basics".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_quiz_blocks_completion_until_retake_passes() {
    let backend = Arc::new(
        FakeBackend::new(progress_fixture(&["l1", "l2", "l4"]))
            .with_quiz_results(vec![quiz_result(40.0, false), quiz_result(100.0, true)]),
    );
    let mut controller = controller_with(backend.clone());
    controller.load_progress("rust-basics").await.unwrap();

    // 未作答完不能提交
    controller.answer_question("rust-basics", "l3", "q1", 0).unwrap();
    let err = controller.submit_quiz("rust-basics", "l3").await.unwrap_err();
    assert!(matches!(err, AppError::QuizState(_)));

    controller.answer_question("rust-basics", "l3", "q2", 1).unwrap();
    let result = controller.submit_quiz("rust-basics", "l3").await.unwrap();
    assert!(!result.is_passed);

    let err = controller.complete_lesson("rust-basics", "l3").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::CompletionNotAllowed(CompletionBlock::AssessmentNotPassed)
    ));

    // 已提交后不能直接改答案
    let err = controller.answer_question("rust-basics", "l3", "q1", 1).unwrap_err();
    assert!(matches!(err, AppError::QuizState(_)));

    controller.retake_quiz("rust-basics", "l3").unwrap();
    {
        let session = controller.state().student.course("rust-basics").unwrap().quiz("l3").unwrap();
        assert!(session.result().is_none());
        assert!(session.answers().is_none_or(|a| a.is_empty()));
    }

    controller.answer_question("rust-basics", "l3", "q1", 1).unwrap();
    controller.answer_question("rust-basics", "l3", "q2", 0).unwrap();
    let result = controller.submit_quiz("rust-basics", "l3").await.unwrap();
    assert!(result.is_passed);

    controller.complete_lesson("rust-basics", "l3").await.unwrap();
    assert_eq!(controller.tracker("rust-basics").unwrap().progress_percentage(), 100);
    assert_eq!(
        backend.calls().iter().filter(|c| c.starts_with("quiz")).count(),
        2
    );
}

#[tokio::test]
async fn test_invalid_answer_is_rejected_locally() {
    let backend = Arc::new(FakeBackend::new(progress_fixture(&[])));
    let mut controller = controller_with(backend);
    controller.load_progress("rust-basics").await.unwrap();

    assert!(controller.answer_question("rust-basics", "l3", "q1", 5).is_err());
    assert!(controller.answer_question("rust-basics", "l3", "nope", 0).is_err());
    assert!(controller.answer_question("rust-basics", "l1", "q1", 0).is_err());
}

#[tokio::test]
async fn test_answering_locked_quiz_is_a_completion_block() {
    let mut progress = progress_fixture(&[]);
    progress.course.chapters[1].lessons[0] = serde_json::from_value(json!({
        "_id": "l3", "title": "小测", "type": "quiz", "content": null
    }))
    .unwrap();
    let backend = Arc::new(FakeBackend::new(progress));
    let mut controller = controller_with(backend.clone());
    controller.load_progress("rust-basics").await.unwrap();

    let err = controller.answer_question("rust-basics", "l3", "q1", 0).unwrap_err();
    assert!(matches!(err, AppError::CompletionNotAllowed(CompletionBlock::Locked)));
    assert_eq!(backend.calls(), vec!["progress rust-basics".to_string()]);
}

#[tokio::test]
async fn test_actions_on_unloaded_course_fail() {
    let backend = Arc::new(FakeBackend::new(progress_fixture(&[])));
    let mut controller = controller_with(backend.clone());

    let err = controller.complete_lesson("rust-basics", "l1").await.unwrap_err();
    assert!(matches!(err, AppError::UserInputError(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_dashboard_loads_progress_and_certificates() {
    let backend = Arc::new(FakeBackend::new(progress_fixture(&["l1", "l2"])));
    let mut controller = controller_with(backend.clone());

    controller.load_dashboard("rust-basics").await.unwrap();
    assert_eq!(controller.tracker("rust-basics").unwrap().progress_percentage(), 50);
    let calls = backend.calls();
    assert!(calls.contains(&"progress rust-basics".to_string()));
    assert!(calls.contains(&"certificates".to_string()));
}

#[tokio::test]
async fn test_coding_problem_needs_passing_submission() {
    let mut progress = progress_fixture(&["l1", "l2", "l3"]);
    progress.course.chapters[1].lessons[1] = serde_json::from_value(json!({
        "_id": "l4",
        "title": "两数之和",
        "type": "codingProblem",
        "content": {
            "statement": "实现 add(a, b)",
            "starterCode": "function add(a, b) {}",
            "language": "javascript"
        }
    }))
    .unwrap();
    let backend = Arc::new(FakeBackend::new(progress));
    let mut controller = controller_with(backend.clone());
    controller.load_progress("rust-basics").await.unwrap();

    // 会话以起始代码初始化
    let session = controller
        .state()
        .student
        .course("rust-basics")
        .unwrap()
        .coding_session("l4")
        .unwrap();
    assert_eq!(session.code, "function add(a, b) {}");

    // 运行结果不影响完成条件
    controller.run_code("rust-basics", "l4").await.unwrap();
    let err = controller.complete_lesson("rust-basics", "l4").await.unwrap_err();
    assert!(matches!(
        err,
        AppError::CompletionNotAllowed(CompletionBlock::AssessmentNotPassed)
    ));

    controller
        .edit_code("rust-basics", "l4", "function add(a, b) { return a + b; }".to_string(), None)
        .unwrap();
    let result = controller.submit_code("rust-basics", "l4").await.unwrap();
    assert!(result.is_passed);

    controller.complete_lesson("rust-basics", "l4").await.unwrap();
    assert_eq!(controller.tracker("rust-basics").unwrap().progress_percentage(), 100);

    // 非编程题课时不能编辑代码
    assert!(controller.edit_code("rust-basics", "l1", String::new(), None).is_err());
}
