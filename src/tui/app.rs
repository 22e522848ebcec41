//! TUI application state: active tab, content lists, and injected services.

use std::sync::Arc;

use ratatui::widgets::ListState;

use crate::core::content::{self, Activity, Post, Profile};
use crate::core::services::{Analytics, FeatureFlags, TtlCache};
use crate::core::update::controller::UpdateController;
use crate::core::update::metadata::AppliedUpdate;

use super::constants::FEED_CACHE_TTL;

/// Screens reachable from the tab bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTab {
    Home,
    Feed,
    Notifications,
    Profile,
}

impl AppTab {
    pub fn index(self) -> usize {
        match self {
            AppTab::Home => 0,
            AppTab::Feed => 1,
            AppTab::Notifications => 2,
            AppTab::Profile => 3,
        }
    }

    pub fn from_index(index: usize) -> AppTab {
        match index {
            0 => AppTab::Home,
            1 => AppTab::Feed,
            2 => AppTab::Notifications,
            _ => AppTab::Profile,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AppTab::Home => "Home",
            AppTab::Feed => "Feed",
            AppTab::Notifications => "Notifications",
            AppTab::Profile => "Profile",
        }
    }
}

pub struct App {
    pub tab: AppTab,
    pub controller: UpdateController,
    pub analytics: Arc<Analytics>,
    pub flags: Arc<FeatureFlags>,
    /// Metadata of the update this launch came from, when there is one.
    pub whats_new: Option<AppliedUpdate>,
    feed_cache: TtlCache<Vec<Post>>,
    pub activity: Vec<Activity>,
    pub profile: Profile,
    pub feed_index: usize,
    pub feed_state: ListState,
    pub activity_index: usize,
    pub activity_state: ListState,
}

impl App {
    pub fn new(
        controller: UpdateController,
        analytics: Arc<Analytics>,
        flags: Arc<FeatureFlags>,
        whats_new: Option<AppliedUpdate>,
    ) -> Self {
        Self {
            tab: AppTab::Home,
            controller,
            analytics,
            flags,
            whats_new,
            feed_cache: TtlCache::new(),
            activity: content::sample_activity(),
            profile: content::profile(),
            feed_index: 0,
            feed_state: ListState::default(),
            activity_index: 0,
            activity_state: ListState::default(),
        }
    }

    /// Feed posts, rebuilt when the cache entry expires.
    pub fn posts(&self) -> Vec<Post> {
        if let Some(posts) = self.feed_cache.get("feed") {
            return posts;
        }
        let posts = content::sample_posts();
        self.feed_cache
            .set("feed", posts.clone(), Some(FEED_CACHE_TTL));
        posts
    }

    /// Drop the cached feed so the next read rebuilds it.
    pub fn refresh_feed(&mut self) {
        self.feed_cache.remove("feed");
        self.feed_index = 0;
    }

    pub fn select_tab(&mut self, tab: AppTab) {
        if self.tab != tab {
            self.tab = tab;
            self.track_screen_view();
        }
    }

    pub fn next_tab(&mut self) {
        self.select_tab(AppTab::from_index((self.tab.index() + 1) % 4));
    }

    pub fn track_screen_view(&self) {
        self.analytics.track_screen_view(self.tab.title());
    }

    pub fn unread_count(&self) -> usize {
        self.activity.iter().filter(|entry| !entry.read).count()
    }

    pub fn move_selection(&mut self, delta: isize) {
        match self.tab {
            AppTab::Feed => {
                self.feed_index = step(self.feed_index, delta, self.posts().len());
            }
            AppTab::Notifications => {
                self.activity_index = step(self.activity_index, delta, self.activity.len());
            }
            _ => {}
        }
    }

    /// Mark the selected activity entry read.
    pub fn mark_selected_read(&mut self) {
        if self.tab == AppTab::Notifications
            && let Some(entry) = self.activity.get_mut(self.activity_index)
        {
            entry.read = true;
        }
    }
}

/// Clamp-step a list index; empty lists pin to zero.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize).min(last)
    }
}
