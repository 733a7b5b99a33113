// src/models/commerce.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Pending,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub plan: Option<SubscriptionPlan>,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(alias = "_id")]
    pub id: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Coupon {
    /// 折后价格，百分比折扣上限为 100%，结果不会为负
    pub fn apply_to(&self, price: f64) -> f64 {
        let discounted = match self.discount_type {
            DiscountType::Percentage => {
                let pct = self.discount_value.clamp(0.0, 100.0);
                price * (100.0 - pct) / 100.0
            }
            DiscountType::Fixed => price - self.discount_value.max(0.0),
        };
        (discounted.max(0.0) * 100.0).round() / 100.0
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if self.expires_at.is_some_and(|exp| exp <= now) {
            return false;
        }
        !self.usage_limit.is_some_and(|limit| self.used_count >= limit)
    }
}

/// 管理端创建/更新优惠券的请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CouponDraft {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    pub is_active: bool,
}
