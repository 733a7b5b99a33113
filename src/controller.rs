// src/controller.rs

//! 唯一持有应用状态的控制器。每个动作都是“请求 → 服务器确认 → reduce”，
//! 失败时状态保持不变，错误原样返回给调用方展示。

use crate::{
    api::{
        ApiBackend, LearningBackend, admin::AdminHistoryService, ads::AdsService,
        catalog::CatalogService, coupons::CouponService, faq::FaqService,
        subscriptions::SubscriptionService, CertificateService,
    },
    client::RobustClient,
    error::{AppError, AppResult, CompletionBlock},
    models::{
        Certificate, CodingResult, Coupon, CouponDraft, QuizResult,
        api::{CouponValidation, ProgressUpdate},
    },
    store::*,
    tracker::{CertificateOffer, CourseTracker},
};
use log::{debug, info};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

pub struct AppController {
    state: AppState,
    backend: Arc<dyn LearningBackend>,
    catalog: CatalogService,
    certificates: CertificateService,
    subscriptions: SubscriptionService,
    coupons: CouponService,
    ads: AdsService,
    faq: FaqService,
    admin: AdminHistoryService,
}

impl AppController {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        let backend = Arc::new(ApiBackend::new(http_client.clone()));
        Self::with_backend(http_client, backend)
    }

    /// 使用自定义的课程进度后端 (其余业务域仍走 HTTP)
    pub fn with_backend(http_client: Arc<RobustClient>, backend: Arc<dyn LearningBackend>) -> Self {
        Self {
            state: AppState::default(),
            backend,
            catalog: CatalogService::new(http_client.clone()),
            certificates: CertificateService::new(http_client.clone()),
            subscriptions: SubscriptionService::new(http_client.clone()),
            coupons: CouponService::new(http_client.clone()),
            ads: AdsService::new(http_client.clone()),
            faq: FaqService::new(http_client.clone()),
            admin: AdminHistoryService::new(http_client),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, event: impl Into<AppEvent>) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(event.into());
    }

    fn course_state(&self, slug: &str) -> AppResult<&CourseProgressState> {
        self.state
            .student
            .course(slug)
            .ok_or_else(|| AppError::UserInputError(format!("课程 '{}' 尚未加载", slug)))
    }

    /// 针对已加载课程的派生查询
    pub fn tracker(&self, slug: &str) -> AppResult<CourseTracker<'_>> {
        let state = self.course_state(slug)?;
        let cert = self.state.certificates.for_course(&state.course.id);
        Ok(CourseTracker::new(state, cert))
    }

    // --- 课程进度 ---

    pub async fn load_enrolled(&mut self) -> AppResult<()> {
        let list = self.backend.enrolled_courses().await?;
        self.dispatch(StudentCourseEvent::EnrolledLoaded(list));
        Ok(())
    }

    pub async fn load_progress(&mut self, slug: &str) -> AppResult<()> {
        let mut response = self.backend.course_progress(slug).await?;
        let certificate = response.certificate.take();
        self.dispatch(StudentCourseEvent::ProgressLoaded {
            slug: slug.to_string(),
            response,
        });
        if let Some(cert) = certificate {
            self.dispatch(CertificateEvent::Issued(cert));
        }
        Ok(())
    }

    /// 进度与证书列表并发加载
    pub async fn load_dashboard(&mut self, slug: &str) -> AppResult<()> {
        let (mut response, certificates) = futures::try_join!(
            self.backend.course_progress(slug),
            self.backend.my_certificates()
        )?;
        let embedded = response.certificate.take();
        self.dispatch(StudentCourseEvent::ProgressLoaded {
            slug: slug.to_string(),
            response,
        });
        self.dispatch(CertificateEvent::Loaded(certificates));
        if let Some(cert) = embedded {
            self.dispatch(CertificateEvent::Issued(cert));
        }
        Ok(())
    }

    pub async fn complete_lesson(&mut self, slug: &str, lesson_id: &str) -> AppResult<()> {
        self.tracker(slug)?
            .can_complete_lesson(lesson_id)
            .map_err(AppError::CompletionNotAllowed)?;
        let update = self.backend.complete_lesson(lesson_id).await?;
        info!("课时 '{}' 已标记为完成", lesson_id);
        self.apply_progress_update(slug, update).await
    }

    pub async fn incomplete_lesson(&mut self, slug: &str, lesson_id: &str) -> AppResult<()> {
        self.tracker(slug)?
            .can_incomplete_lesson(lesson_id)
            .map_err(AppError::CompletionNotAllowed)?;
        let update = self.backend.incomplete_lesson(lesson_id).await?;
        info!("课时 '{}' 已标记为未完成", lesson_id);
        self.apply_progress_update(slug, update).await
    }

    /// 响应不带完成列表时重新拉取整份进度，避免把已完成集合清空
    async fn apply_progress_update(&mut self, slug: &str, update: ProgressUpdate) -> AppResult<()> {
        if update.completed_lessons.is_none() {
            debug!("课程 '{}' 的进度更新不含完成列表，重新加载进度", slug);
            return self.load_progress(slug).await;
        }
        self.dispatch(StudentCourseEvent::ProgressRefreshed {
            slug: slug.to_string(),
            update,
        });
        Ok(())
    }

    // --- 测验 ---

    pub fn answer_question(
        &mut self,
        slug: &str,
        lesson_id: &str,
        question_id: &str,
        option: usize,
    ) -> AppResult<()> {
        let state = self.course_state(slug)?;
        let quiz = quiz_content(state, lesson_id)?;
        state
            .quiz(lesson_id)
            .cloned()
            .unwrap_or_default()
            .check_answer(quiz, question_id, option)?;
        self.dispatch(StudentCourseEvent::QuizAnswered {
            slug: slug.to_string(),
            lesson_id: lesson_id.to_string(),
            question_id: question_id.to_string(),
            option,
        });
        Ok(())
    }

    pub async fn submit_quiz(&mut self, slug: &str, lesson_id: &str) -> AppResult<QuizResult> {
        let answers = {
            let state = self.course_state(slug)?;
            let quiz = quiz_content(state, lesson_id)?;
            state
                .quiz(lesson_id)
                .cloned()
                .unwrap_or_default()
                .submission(quiz)?
        };
        let result = self.backend.submit_quiz(lesson_id, &answers).await?;
        debug!("测验 '{}' 得分 {}，通过: {}", lesson_id, result.score, result.is_passed);
        self.dispatch(StudentCourseEvent::QuizSubmitted {
            slug: slug.to_string(),
            lesson_id: lesson_id.to_string(),
            result: result.clone(),
        });
        Ok(result)
    }

    pub fn retake_quiz(&mut self, slug: &str, lesson_id: &str) -> AppResult<()> {
        quiz_content(self.course_state(slug)?, lesson_id)?;
        self.dispatch(StudentCourseEvent::QuizRetaken {
            slug: slug.to_string(),
            lesson_id: lesson_id.to_string(),
        });
        Ok(())
    }

    // --- 编程题 ---

    pub fn edit_code(&mut self, slug: &str, lesson_id: &str, code: String, language: Option<String>) -> AppResult<()> {
        let state = self.course_state(slug)?;
        if state.coding_session(lesson_id).is_none() {
            return Err(not_a_coding_problem(lesson_id));
        }
        self.dispatch(StudentCourseEvent::CodeEdited {
            slug: slug.to_string(),
            lesson_id: lesson_id.to_string(),
            code,
        });
        if let Some(language) = language {
            self.dispatch(StudentCourseEvent::CodeLanguageSelected {
                slug: slug.to_string(),
                lesson_id: lesson_id.to_string(),
                language,
            });
        }
        Ok(())
    }

    pub async fn run_code(&mut self, slug: &str, lesson_id: &str) -> AppResult<CodingResult> {
        let session = self
            .course_state(slug)?
            .coding_session(lesson_id)
            .ok_or_else(|| not_a_coding_problem(lesson_id))?;
        let result = self
            .backend
            .run_code(lesson_id, &session.code, &session.language)
            .await?;
        self.dispatch(StudentCourseEvent::CodeRan {
            slug: slug.to_string(),
            lesson_id: lesson_id.to_string(),
            result: result.clone(),
        });
        Ok(result)
    }

    pub async fn submit_code(&mut self, slug: &str, lesson_id: &str) -> AppResult<CodingResult> {
        let session = self
            .course_state(slug)?
            .coding_session(lesson_id)
            .ok_or_else(|| not_a_coding_problem(lesson_id))?;
        let result = self
            .backend
            .submit_code(lesson_id, &session.code, &session.language)
            .await?;
        self.dispatch(StudentCourseEvent::CodeSubmitted {
            slug: slug.to_string(),
            lesson_id: lesson_id.to_string(),
            result: result.clone(),
        });
        Ok(result)
    }

    // --- 证书 ---

    /// 已有证书时直接返回，不会重复申请
    pub async fn issue_certificate(&mut self, slug: &str) -> AppResult<Certificate> {
        let course_id = {
            let tracker = self.tracker(slug)?;
            match tracker.certificate_offer() {
                CertificateOffer::Issued(cert) => return Ok(cert.clone()),
                CertificateOffer::Locked { progress } => {
                    return Err(AppError::CertificateNotEligible { progress });
                }
                CertificateOffer::Available => tracker.state().course.id.clone(),
            }
        };
        let cert = self.backend.issue_certificate(&course_id).await?;
        info!("课程 '{}' 证书已颁发: {}", slug, cert.id);
        self.dispatch(CertificateEvent::Issued(cert.clone()));
        Ok(cert)
    }

    pub async fn load_certificates(&mut self) -> AppResult<()> {
        let list = self.backend.my_certificates().await?;
        self.dispatch(CertificateEvent::Loaded(list));
        Ok(())
    }

    pub async fn verify_certificate(&mut self, token: &str) -> AppResult<()> {
        let verification = self.certificates.verify(token).await?;
        self.dispatch(CertificateEvent::Verified(verification));
        Ok(())
    }

    pub async fn download_certificate(&mut self, certificate_id: &str, dir: &Path) -> AppResult<PathBuf> {
        let path = self.certificates.download(certificate_id, dir).await?;
        self.dispatch(CertificateEvent::Downloaded(path.clone()));
        Ok(path)
    }

    // --- 课程目录 ---

    pub async fn load_catalog(&mut self, search: Option<&str>) -> AppResult<()> {
        let list = self.catalog.list(search).await?;
        self.dispatch(CatalogEvent::Loaded(list));
        Ok(())
    }

    pub async fn load_course_detail(&mut self, slug: &str) -> AppResult<()> {
        let course = self.catalog.course(slug).await?;
        self.dispatch(CatalogEvent::DetailLoaded {
            slug: slug.to_string(),
            course,
        });
        Ok(())
    }

    // --- 订阅与优惠券 ---

    pub async fn load_plans(&mut self) -> AppResult<()> {
        let plans = self.subscriptions.plans().await?;
        self.dispatch(SubscriptionEvent::PlansLoaded(plans));
        Ok(())
    }

    pub async fn load_subscription(&mut self) -> AppResult<()> {
        let current = self.subscriptions.current().await?;
        self.dispatch(SubscriptionEvent::CurrentLoaded(current));
        Ok(())
    }

    pub async fn validate_coupon(&mut self, code: &str, plan_id: Option<&str>) -> AppResult<CouponValidation> {
        let validation = self.coupons.validate(code, plan_id).await?;
        self.dispatch(SubscriptionEvent::CouponValidated(validation.clone()));
        Ok(validation)
    }

    pub async fn subscribe(&mut self, plan_id: &str, coupon_code: Option<&str>) -> AppResult<()> {
        let sub = self.subscriptions.subscribe(plan_id, coupon_code).await?;
        self.dispatch(SubscriptionEvent::Subscribed(sub));
        Ok(())
    }

    pub async fn cancel_subscription(&mut self) -> AppResult<()> {
        let sub = self.subscriptions.cancel().await?;
        self.dispatch(SubscriptionEvent::Cancelled(sub));
        Ok(())
    }

    pub async fn load_coupons(&mut self) -> AppResult<()> {
        let list = self.coupons.list().await?;
        self.dispatch(CouponEvent::Loaded(list));
        Ok(())
    }

    pub async fn create_coupon(&mut self, draft: &CouponDraft) -> AppResult<Coupon> {
        let coupon = self.coupons.create(draft).await?;
        self.dispatch(CouponEvent::Created(coupon.clone()));
        Ok(coupon)
    }

    pub async fn update_coupon(&mut self, id: &str, draft: &CouponDraft) -> AppResult<Coupon> {
        let coupon = self.coupons.update(id, draft).await?;
        self.dispatch(CouponEvent::Updated(coupon.clone()));
        Ok(coupon)
    }

    pub async fn delete_coupon(&mut self, id: &str) -> AppResult<()> {
        self.coupons.delete(id).await?;
        self.dispatch(CouponEvent::Deleted(id.to_string()));
        Ok(())
    }

    // --- 广告、公告、FAQ、管理记录 ---

    pub async fn load_ads(&mut self, placement: Option<&str>) -> AppResult<()> {
        let ads = self.ads.active_ads(placement).await?;
        self.dispatch(AdsEvent::AdsLoaded(ads));
        Ok(())
    }

    pub fn rotate_ad(&mut self) {
        self.dispatch(AdsEvent::AdRotated);
    }

    pub async fn load_announcements(&mut self) -> AppResult<()> {
        let list = self.ads.announcements().await?;
        self.dispatch(AdsEvent::AnnouncementsLoaded(list));
        Ok(())
    }

    pub async fn load_faq(&mut self, category: Option<&str>) -> AppResult<()> {
        let entries = self.faq.list(category).await?;
        self.dispatch(FaqEvent::Loaded(entries));
        Ok(())
    }

    pub fn toggle_faq(&mut self, id: &str) {
        self.dispatch(FaqEvent::Toggled(id.to_string()));
    }

    pub async fn load_admin_history(&mut self, page: u32, limit: Option<u32>) -> AppResult<()> {
        let page = self.admin.history(page, limit).await?;
        self.dispatch(AdminHistoryEvent::Loaded(page));
        Ok(())
    }
}

fn quiz_content<'a>(
    state: &'a CourseProgressState,
    lesson_id: &str,
) -> AppResult<&'a crate::models::QuizContent> {
    let lesson = state
        .course
        .lesson(lesson_id)
        .ok_or(AppError::CompletionNotAllowed(CompletionBlock::UnknownLesson))?;
    if lesson.is_locked() {
        return Err(AppError::CompletionNotAllowed(CompletionBlock::Locked));
    }
    lesson
        .quiz()
        .ok_or_else(|| AppError::QuizState(format!("课时 '{}' 不是测验", lesson_id)))
}

fn not_a_coding_problem(lesson_id: &str) -> AppError {
    AppError::UserInputError(format!("课时 '{}' 不是可用的编程题", lesson_id))
}
