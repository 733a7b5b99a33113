// src/store/ads.rs

use crate::models::{Ad, Announcement};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdsState {
    pub ads: Vec<Ad>,
    /// 轮播当前位置
    pub cursor: usize,
    pub announcements: Vec<Announcement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdsEvent {
    AdsLoaded(Vec<Ad>),
    AdRotated,
    AnnouncementsLoaded(Vec<Announcement>),
}

impl AdsState {
    pub fn current_ad(&self) -> Option<&Ad> {
        self.ads.get(self.cursor)
    }

    pub fn reduce(mut self, event: AdsEvent) -> Self {
        match event {
            AdsEvent::AdsLoaded(ads) => {
                self.ads = ads;
                self.cursor = 0;
            }
            AdsEvent::AdRotated => {
                if !self.ads.is_empty() {
                    self.cursor = (self.cursor + 1) % self.ads.len();
                }
            }
            AdsEvent::AnnouncementsLoaded(mut list) => {
                // 置顶优先，其余按发布时间倒序
                list.sort_by(|a, b| {
                    b.pinned
                        .cmp(&a.pinned)
                        .then_with(|| b.published_at.cmp(&a.published_at))
                });
                self.announcements = list;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(id: &str) -> Ad {
        Ad { id: id.into(), title: id.into(), image_url: None, link_url: None, placement: None }
    }

    #[test]
    fn test_carousel_wraps_around() {
        let state = AdsState::default().reduce(AdsEvent::AdsLoaded(vec![ad("a"), ad("b")]));
        assert_eq!(state.current_ad().unwrap().id, "a");
        let state = state.reduce(AdsEvent::AdRotated);
        assert_eq!(state.current_ad().unwrap().id, "b");
        let state = state.reduce(AdsEvent::AdRotated);
        assert_eq!(state.current_ad().unwrap().id, "a");
    }

    #[test]
    fn test_rotating_empty_carousel() {
        let state = AdsState::default().reduce(AdsEvent::AdRotated);
        assert!(state.current_ad().is_none());
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_pinned_announcements_first() {
        let older_pinned = Announcement {
            id: "p".into(),
            title: "p".into(),
            body: String::new(),
            published_at: Some("2026-01-01T00:00:00Z".parse().unwrap()),
            pinned: true,
        };
        let newer = Announcement {
            id: "n".into(),
            pinned: false,
            published_at: Some("2026-05-01T00:00:00Z".parse().unwrap()),
            ..older_pinned.clone()
        };
        let state = AdsState::default()
            .reduce(AdsEvent::AnnouncementsLoaded(vec![newer, older_pinned]));
        assert_eq!(state.announcements[0].id, "p");
    }
}
