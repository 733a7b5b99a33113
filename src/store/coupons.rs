// src/store/coupons.rs

use crate::models::Coupon;

/// 管理端优惠券列表
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CouponState {
    pub coupons: Vec<Coupon>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CouponEvent {
    Loaded(Vec<Coupon>),
    Created(Coupon),
    Updated(Coupon),
    Deleted(String),
}

impl CouponState {
    pub fn reduce(mut self, event: CouponEvent) -> Self {
        match event {
            CouponEvent::Loaded(list) => self.coupons = list,
            CouponEvent::Created(coupon) => self.coupons.push(coupon),
            CouponEvent::Updated(coupon) => {
                match self.coupons.iter_mut().find(|c| c.id == coupon.id) {
                    Some(slot) => *slot = coupon,
                    None => self.coupons.push(coupon),
                }
            }
            CouponEvent::Deleted(id) => self.coupons.retain(|c| c.id != id),
        }
        self
    }
}
