// src/api/faq.rs

use crate::{client::RobustClient, constants::api::faq, error::AppResult, models::Faq};
use std::sync::Arc;

pub struct FaqService {
    http_client: Arc<RobustClient>,
}

impl FaqService {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self { http_client }
    }

    pub async fn list(&self, category: Option<&str>) -> AppResult<Vec<Faq>> {
        let query: Vec<(&str, String)> = category
            .map(|c| vec![("category", c.to_string())])
            .unwrap_or_default();
        self.http_client.get_json(faq::LIST, &[], &query).await
    }
}
