// src/models/content.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, alias = "link")]
    pub link_url: Option<String>,
    #[serde(default)]
    pub placement: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "content")]
    pub body: String,
    #[serde(default, alias = "createdAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    #[serde(alias = "_id")]
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub order: i32,
}

/// 管理端操作审计记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminHistoryEntry {
    #[serde(alias = "_id")]
    pub id: String,
    pub action: String,
    #[serde(default, alias = "user")]
    pub actor: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub details: Option<Value>,
}
