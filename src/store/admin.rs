// src/store/admin.rs

use crate::models::{AdminHistoryEntry, Page};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdminHistoryState {
    pub page: Option<Page<AdminHistoryEntry>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminHistoryEvent {
    Loaded(Page<AdminHistoryEntry>),
}

impl AdminHistoryState {
    pub fn reduce(self, event: AdminHistoryEvent) -> Self {
        match event {
            AdminHistoryEvent::Loaded(page) => Self { page: Some(page) },
        }
    }
}
