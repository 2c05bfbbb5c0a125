use crate::app::MenuItem;
use playoff_engine::Conference;
use std::collections::VecDeque;

const FEED_CAPACITY: usize = 500;

// ---------------------------------------------------------------------------
// Event feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedTone {
    Game,
    Milestone,
    Headline,
}

#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub tone: FeedTone,
    pub text: String,
    /// Arrived since the feed was last viewed.
    pub is_new: bool,
}

/// Newest entries last. Old entries fall off the front.
#[derive(Debug, Default)]
pub struct FeedState {
    pub entries: VecDeque<FeedEntry>,
}

impl FeedState {
    pub fn push(&mut self, tone: FeedTone, text: impl Into<String>) {
        if self.entries.len() == FEED_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(FeedEntry { tone, text: text.into(), is_new: true });
    }

    pub fn mark_seen(&mut self) {
        for entry in &mut self.entries {
            entry.is_new = false;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn last_headline(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.tone == FeedTone::Headline)
            .map(|e| e.text.as_str())
    }
}

// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub autoplay: bool,
    pub selected_conference: Conference,
    pub status: Option<String>,
    pub last_error: Option<String>,
    pub feed: FeedState,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            autoplay: false,
            selected_conference: Conference::Eastern,
            status: None,
            last_error: None,
            feed: FeedState::default(),
        }
    }
}
