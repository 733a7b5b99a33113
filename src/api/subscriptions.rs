// src/api/subscriptions.rs

use crate::{
    client::RobustClient,
    constants::api::subscriptions,
    error::{AppError, AppResult},
    models::{Subscription, SubscriptionPlan, api::SubscribeRequest},
};
use log::info;
use std::sync::Arc;

pub struct SubscriptionService {
    http_client: Arc<RobustClient>,
}

impl SubscriptionService {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self { http_client }
    }

    pub async fn plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        self.http_client.get_json(subscriptions::PLANS, &[], &[]).await
    }

    /// 没有订阅时服务器返回 404 或空数据，统一视为 None
    pub async fn current(&self) -> AppResult<Option<Subscription>> {
        match self
            .http_client
            .get_json::<Subscription>(subscriptions::MINE, &[], &[])
            .await
        {
            Ok(sub) => Ok(Some(sub)),
            Err(AppError::NotFound(_)) | Err(AppError::EmptyResponse { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn subscribe(&self, plan_id: &str, coupon_code: Option<&str>) -> AppResult<Subscription> {
        info!("订阅套餐 '{}' (优惠券: {:?})", plan_id, coupon_code);
        self.http_client
            .post_json(
                subscriptions::SUBSCRIBE,
                &[],
                &SubscribeRequest { plan_id, coupon_code },
            )
            .await
    }

    pub async fn cancel(&self) -> AppResult<Subscription> {
        info!("取消当前订阅");
        self.http_client
            .post_json(subscriptions::CANCEL, &[], &serde_json::json!({}))
            .await
    }
}
