// src/models/mod.rs

pub mod api;
pub mod assessment;
pub mod certificate;
pub mod commerce;
pub mod content;
pub mod course;

pub use assessment::{CodingResult, QuizAnswer, QuizResult};
pub use certificate::{Certificate, CertificateVerification};
pub use commerce::{Coupon, CouponDraft, DiscountType, Subscription, SubscriptionPlan, SubscriptionStatus};
pub use content::{Ad, AdminHistoryEntry, Announcement, Faq};
pub use course::{
    ArticleContent, Chapter, CodingProblemContent, Course, CourseSummary, Lesson, LessonBody,
    LessonKind, QuizContent, QuizQuestion, Resource, VideoContent,
};

use serde::{Deserialize, Serialize};

/// 客户端观察到的课时状态 (镜像服务器，不独立维护)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonState {
    Locked,
    Incomplete,
    Complete,
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(alias = "data", alias = "docs")]
    pub items: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total: u64,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
