// src/store/subscriptions.rs

use crate::models::{Subscription, SubscriptionPlan, api::CouponValidation};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubscriptionState {
    pub plans: Vec<SubscriptionPlan>,
    pub current: Option<Subscription>,
    pub applied_coupon: Option<CouponValidation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    PlansLoaded(Vec<SubscriptionPlan>),
    CurrentLoaded(Option<Subscription>),
    Subscribed(Subscription),
    Cancelled(Subscription),
    CouponValidated(CouponValidation),
    CouponCleared,
}

impl SubscriptionState {
    pub fn plan(&self, plan_id: &str) -> Option<&SubscriptionPlan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    /// 套餐价格，叠加已验证的优惠券
    pub fn price_for(&self, plan_id: &str) -> Option<f64> {
        let plan = self.plan(plan_id)?;
        Some(match &self.applied_coupon {
            Some(v) => v.final_price.unwrap_or_else(|| v.coupon.apply_to(plan.price)),
            None => plan.price,
        })
    }

    pub fn reduce(mut self, event: SubscriptionEvent) -> Self {
        match event {
            SubscriptionEvent::PlansLoaded(plans) => self.plans = plans,
            SubscriptionEvent::CurrentLoaded(current) => self.current = current,
            SubscriptionEvent::Subscribed(sub) => {
                self.current = Some(sub);
                self.applied_coupon = None;
            }
            SubscriptionEvent::Cancelled(sub) => self.current = Some(sub),
            SubscriptionEvent::CouponValidated(v) => self.applied_coupon = Some(v),
            SubscriptionEvent::CouponCleared => self.applied_coupon = None,
        }
        self
    }
}
