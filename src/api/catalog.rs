// src/api/catalog.rs

use crate::{
    client::RobustClient,
    constants::api::catalog,
    error::AppResult,
    models::{Course, CourseSummary},
};
use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

/// 课程目录；课程详情在客户端生命周期内按 slug 缓存
pub struct CatalogService {
    http_client: Arc<RobustClient>,
    cache: DashMap<String, Course>,
}

impl CatalogService {
    pub fn new(http_client: Arc<RobustClient>) -> Self {
        Self {
            http_client,
            cache: DashMap::new(),
        }
    }

    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<CourseSummary>> {
        let query: Vec<(&str, String)> = search
            .filter(|s| !s.is_empty())
            .map(|s| vec![("search", s.to_string())])
            .unwrap_or_default();
        self.http_client.get_json(catalog::COURSES, &[], &query).await
    }

    pub async fn course(&self, slug: &str) -> AppResult<Course> {
        if let Some(entry) = self.cache.get(slug) {
            debug!("课程详情缓存命中: {}", slug);
            return Ok(entry.value().clone());
        }
        debug!("课程详情缓存未命中，从网络获取: {}", slug);
        let course: Course = self
            .http_client
            .get_json(catalog::COURSE, &[("slug", slug)], &[])
            .await?;
        self.cache.insert(slug.to_string(), course.clone());
        Ok(course)
    }
}
