// src/models/certificate.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 课程字段既可能是 ID 字符串，也可能是展开后的课程对象
fn course_ref<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CourseRef {
        Id(String),
        Object {
            #[serde(alias = "_id")]
            id: String,
        },
    }
    Ok(match CourseRef::deserialize(deserializer)? {
        CourseRef::Id(id) | CourseRef::Object { id } => id,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "course", deserialize_with = "course_ref")]
    pub course_id: String,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(alias = "certificateId")]
    pub verification_token: String,
}

/// 公开验证接口的返回 (无需登录)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateVerification {
    #[serde(alias = "isValid")]
    pub valid: bool,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
}
