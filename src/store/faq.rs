// src/store/faq.rs

use crate::models::Faq;
use std::collections::{BTreeMap, BTreeSet};

pub const UNCATEGORIZED: &str = "其他";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaqState {
    pub entries: Vec<Faq>,
    /// 手风琴中展开的条目
    pub expanded: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FaqEvent {
    Loaded(Vec<Faq>),
    Toggled(String),
}

impl FaqState {
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&Faq>> {
        let mut groups: BTreeMap<&str, Vec<&Faq>> = BTreeMap::new();
        for faq in &self.entries {
            groups
                .entry(faq.category.as_deref().unwrap_or(UNCATEGORIZED))
                .or_default()
                .push(faq);
        }
        for list in groups.values_mut() {
            list.sort_by_key(|f| f.order);
        }
        groups
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn reduce(mut self, event: FaqEvent) -> Self {
        match event {
            FaqEvent::Loaded(entries) => {
                self.expanded.retain(|id| entries.iter().any(|f| &f.id == id));
                self.entries = entries;
            }
            FaqEvent::Toggled(id) => {
                if !self.expanded.remove(&id) {
                    self.expanded.insert(id);
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(id: &str, category: Option<&str>, order: i32) -> Faq {
        Faq {
            id: id.into(),
            question: format!("{}?", id),
            answer: "yes".into(),
            category: category.map(Into::into),
            order,
        }
    }

    #[test]
    fn test_grouping_and_order() {
        let state = FaqState::default().reduce(FaqEvent::Loaded(vec![
            faq("b", Some("billing"), 2),
            faq("a", Some("billing"), 1),
            faq("c", None, 0),
        ]));
        let groups = state.grouped();
        assert_eq!(groups["billing"].iter().map(|f| f.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(groups[UNCATEGORIZED].len(), 1);
    }

    #[test]
    fn test_toggle_expands_and_collapses() {
        let state = FaqState::default()
            .reduce(FaqEvent::Loaded(vec![faq("a", None, 0)]))
            .reduce(FaqEvent::Toggled("a".into()));
        assert!(state.is_expanded("a"));
        let state = state.reduce(FaqEvent::Toggled("a".into()));
        assert!(!state.is_expanded("a"));
    }
}
