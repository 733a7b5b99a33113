// src/store/mod.rs

//! 应用状态：每个业务域一个切片，每个切片提供纯函数 `reduce(state, event) -> state`。
//! 状态只由控制器持有，不存在全局可变状态。

pub mod admin;
pub mod ads;
pub mod catalog;
pub mod certificates;
pub mod coupons;
pub mod faq;
pub mod progress;
pub mod subscriptions;

pub use admin::{AdminHistoryEvent, AdminHistoryState};
pub use ads::{AdsEvent, AdsState};
pub use catalog::{CatalogEvent, CatalogState};
pub use certificates::{CertificateEvent, CertificateState};
pub use coupons::{CouponEvent, CouponState};
pub use faq::{FaqEvent, FaqState};
pub use progress::{CourseProgressState, StudentCourseEvent, StudentCourseState};
pub use subscriptions::{SubscriptionEvent, SubscriptionState};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub catalog: CatalogState,
    pub student: StudentCourseState,
    pub certificates: CertificateState,
    pub subscriptions: SubscriptionState,
    pub coupons: CouponState,
    pub ads: AdsState,
    pub faq: FaqState,
    pub admin: AdminHistoryState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Catalog(CatalogEvent),
    Student(StudentCourseEvent),
    Certificate(CertificateEvent),
    Subscription(SubscriptionEvent),
    Coupon(CouponEvent),
    Ads(AdsEvent),
    Faq(FaqEvent),
    Admin(AdminHistoryEvent),
}

macro_rules! impl_from_event {
    ($($variant:ident => $event:ty),* $(,)?) => {
        $(impl From<$event> for AppEvent {
            fn from(event: $event) -> Self {
                AppEvent::$variant(event)
            }
        })*
    };
}

impl_from_event! {
    Catalog => CatalogEvent,
    Student => StudentCourseEvent,
    Certificate => CertificateEvent,
    Subscription => SubscriptionEvent,
    Coupon => CouponEvent,
    Ads => AdsEvent,
    Faq => FaqEvent,
    Admin => AdminHistoryEvent,
}

impl AppState {
    pub fn reduce(self, event: AppEvent) -> Self {
        match event {
            AppEvent::Catalog(e) => Self { catalog: self.catalog.reduce(e), ..self },
            AppEvent::Student(e) => Self { student: self.student.reduce(e), ..self },
            AppEvent::Certificate(e) => Self { certificates: self.certificates.reduce(e), ..self },
            AppEvent::Subscription(e) => Self { subscriptions: self.subscriptions.reduce(e), ..self },
            AppEvent::Coupon(e) => Self { coupons: self.coupons.reduce(e), ..self },
            AppEvent::Ads(e) => Self { ads: self.ads.reduce(e), ..self },
            AppEvent::Faq(e) => Self { faq: self.faq.reduce(e), ..self },
            AppEvent::Admin(e) => Self { admin: self.admin.reduce(e), ..self },
        }
    }
}
