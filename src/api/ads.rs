// src/api/ads.rs

use crate::{
    client::RobustClient,
    constants::api::ads,
    error::AppResult,
    models::{Ad, Announcement},
};
use std::sync::Arc;

pub struct AdsService {
    http_client: Arc<RobustClient>,
}

impl AdsService {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self { http_client }
    }

    pub async fn active_ads(&self, placement: Option<&str>) -> AppResult<Vec<Ad>> {
        let query: Vec<(&str, String)> = placement
            .map(|p| vec![("placement", p.to_string())])
            .unwrap_or_default();
        self.http_client.get_json(ads::ACTIVE, &[], &query).await
    }

    pub async fn announcements(&self) -> AppResult<Vec<Announcement>> {
        self.http_client.get_json(ads::ANNOUNCEMENTS, &[], &[]).await
    }
}
