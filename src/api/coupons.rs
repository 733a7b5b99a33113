// src/api/coupons.rs

use crate::{
    client::RobustClient,
    constants::api::coupons,
    error::AppResult,
    models::{
        Coupon, CouponDraft,
        api::{CouponValidation, ValidateCouponRequest},
    },
};
use log::info;
use std::sync::Arc;

pub struct CouponService {
    http_client: Arc<RobustClient>,
}

impl CouponService {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self { http_client }
    }

    pub async fn validate(&self, code: &str, plan_id: Option<&str>) -> AppResult<CouponValidation> {
        self.http_client
            .post_json(
                coupons::VALIDATE,
                &[],
                &ValidateCouponRequest { code: code.trim(), plan_id },
            )
            .await
    }

    pub async fn list(&self) -> AppResult<Vec<Coupon>> {
        self.http_client.get_json(coupons::ADMIN, &[], &[]).await
    }

    pub async fn create(&self, draft: &CouponDraft) -> AppResult<Coupon> {
        info!("创建优惠券 '{}'", draft.code);
        self.http_client.post_json(coupons::ADMIN, &[], draft).await
    }

    pub async fn update(&self, id: &str, draft: &CouponDraft) -> AppResult<Coupon> {
        info!("更新优惠券 '{}'", id);
        self.http_client
            .put_json(coupons::ADMIN_ONE, &[("id", id)], draft)
            .await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        info!("删除优惠券 '{}'", id);
        self.http_client.delete(coupons::ADMIN_ONE, &[("id", id)]).await
    }
}
