// src/api/admin.rs

use crate::{
    client::RobustClient,
    constants::{DEFAULT_PAGE_SIZE, api::admin},
    error::AppResult,
    models::{AdminHistoryEntry, Page},
};
use std::sync::Arc;

pub struct AdminHistoryService {
    http_client: Arc<RobustClient>,
}

impl AdminHistoryService {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self { http_client }
    }

    pub async fn history(&self, page: u32, limit: Option<u32>) -> AppResult<Page<AdminHistoryEntry>> {
        let query = [
            ("page", page.max(1).to_string()),
            ("limit", limit.unwrap_or(DEFAULT_PAGE_SIZE).to_string()),
        ];
        self.http_client.get_json(admin::HISTORY, &[], &query).await
    }
}
