use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

use crate::query::{distinct_channels, filter_by_channel};
use crate::source::Post;

/// Captions longer than this are cut with `...` unless expanded.
pub const CAPTION_PREVIEW_CHARS: usize = 100;

pub struct App {
    /// Every stored post, newest first.
    posts: Vec<Post>,
    /// Distinct channel handles, ascending.
    pub channels: Vec<String>,
    /// Index into `channels`; `None` shows every channel.
    pub channel_filter: Option<usize>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the selected post's caption is shown in full.
    pub expanded: bool,
    /// Whether a scrape is in flight.
    pub refreshing: bool,
    /// When posts were last loaded from the store.
    pub last_updated: Option<DateTime<Utc>>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last refresh status message.
    pub status: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            posts: Vec::new(),
            channels: Vec::new(),
            channel_filter: None,
            list_state: ListState::default(),
            expanded: false,
            refreshing: false,
            last_updated: None,
            quit: false,
            status: "Ready".into(),
        }
    }

    /// Replace the post list with a fresh read of the store.
    ///
    /// The active channel filter survives as long as that channel still has
    /// posts; the selection is clamped to the new list.
    pub fn load_posts(&mut self, posts: Vec<Post>, now: DateTime<Utc>) {
        let active = self.active_channel().map(str::to_string);

        self.channels = distinct_channels(&posts);
        self.posts = posts;
        self.channel_filter = active.and_then(|name| self.channels.iter().position(|c| *c == name));
        if !self.posts.is_empty() {
            self.last_updated = Some(now);
        }
        self.clamp_selection();
    }

    /// Name of the channel currently filtered on.
    pub fn active_channel(&self) -> Option<&str> {
        self.channel_filter
            .and_then(|i| self.channels.get(i))
            .map(String::as_str)
    }

    /// Posts passing the channel filter, newest first.
    pub fn visible_posts(&self) -> Vec<&Post> {
        match self.active_channel() {
            Some(channel) => filter_by_channel(&self.posts, channel),
            None => self.posts.iter().collect(),
        }
    }

    pub fn selected_post(&self) -> Option<&Post> {
        let i = self.list_state.selected()?;
        self.visible_posts().get(i).copied()
    }

    fn visible_len(&self) -> usize {
        self.visible_posts().len()
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    // -- refresh -------------------------------------------------------------

    /// Mark a refresh as started. Returns `false` if one is already running.
    pub fn begin_refresh(&mut self) -> bool {
        if self.refreshing {
            return false;
        }
        self.refreshing = true;
        self.status = "Refreshing…".into();
        true
    }

    pub fn finish_refresh(&mut self, added: usize) {
        self.refreshing = false;
        self.status = match added {
            0 => "No new posts".into(),
            1 => "1 new post".into(),
            n => format!("{n} new posts"),
        };
    }

    pub fn fail_refresh(&mut self, error: &str) {
        self.refreshing = false;
        self.status = format!("Error: {error}");
    }

    // -- channel filter ------------------------------------------------------

    /// Cycle All → first channel → … → last channel → All.
    pub fn next_channel(&mut self) {
        self.channel_filter = match self.channel_filter {
            None if self.channels.is_empty() => None,
            None => Some(0),
            Some(i) if i + 1 < self.channels.len() => Some(i + 1),
            Some(_) => None,
        };
        self.reset_selection();
    }

    /// Cycle in the opposite direction to [`App::next_channel`].
    pub fn previous_channel(&mut self) {
        self.channel_filter = match self.channel_filter {
            None if self.channels.is_empty() => None,
            None => Some(self.channels.len() - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        self.expanded = false;
        let first = (self.visible_len() > 0).then_some(0);
        self.list_state.select(first);
    }

    // -- navigation ----------------------------------------------------------

    pub fn toggle_expanded(&mut self) {
        if self.list_state.selected().is_some() {
            self.expanded = !self.expanded;
        }
    }

    fn select(&mut self, index: Option<usize>) {
        if index != self.list_state.selected() {
            self.expanded = false;
        }
        self.list_state.select(index);
    }

    pub fn select_next(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.visible_len() == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.visible_len() > 0 {
            self.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.select(Some(len - 1));
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Caption as shown in the list: full when `expanded`, otherwise cut at
/// [`CAPTION_PREVIEW_CHARS`] characters.
pub fn caption_preview(caption: &str, expanded: bool) -> String {
    if expanded || caption.chars().count() <= CAPTION_PREVIEW_CHARS {
        return caption.to_string();
    }
    let cut: String = caption.chars().take(CAPTION_PREVIEW_CHARS).collect();
    format!("{cut}...")
}
