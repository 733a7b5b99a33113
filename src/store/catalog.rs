// src/store/catalog.rs

use crate::models::{Course, CourseSummary};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogState {
    pub courses: Vec<CourseSummary>,
    pub details: HashMap<String, Course>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    Loaded(Vec<CourseSummary>),
    DetailLoaded { slug: String, course: Course },
}

impl CatalogState {
    pub fn reduce(mut self, event: CatalogEvent) -> Self {
        match event {
            CatalogEvent::Loaded(courses) => self.courses = courses,
            CatalogEvent::DetailLoaded { slug, course } => {
                self.details.insert(slug, course);
            }
        }
        self
    }
}
