// src/models/api.rs

use super::{Certificate, Course};
use serde::{Deserialize, Serialize};

// --- 学员课程进度 API ---

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressResponse {
    pub course: Course,
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    /// 服务器计算的整体进度
    #[serde(default)]
    pub progress: Option<f64>,
    /// 已有通过提交的测验/编程题课时
    #[serde(default)]
    pub passed_assessments: Vec<String>,
    #[serde(default)]
    pub certificate: Option<Certificate>,
}

/// 标记完成/未完成后返回的最新进度；
/// 不带完成列表时 `completed_lessons` 为 None，需要重新拉取进度
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(default)]
    pub completed_lessons: Option<Vec<String>>,
    #[serde(default)]
    pub progress: Option<f64>,
}

#[derive(Serialize, Debug, Clone)]
pub struct QuizSubmission<'a> {
    pub answers: &'a [super::QuizAnswer],
}

#[derive(Serialize, Debug, Clone)]
pub struct CodeRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
}

// --- 证书 API ---

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest<'a> {
    pub course_id: &'a str,
}

// --- 订阅与优惠券 API ---

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest<'a> {
    pub plan_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<&'a str>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest<'a> {
    pub code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<&'a str>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub coupon: super::Coupon,
    #[serde(default)]
    pub final_price: Option<f64>,
}
