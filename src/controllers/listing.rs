//! Listing screen controller
//!
//! View state for the public news listing:
//! - initial load, category selection, bounded page navigation
//! - debounced search (one pending timer, restarted per keystroke)
//! - pagination window with ellipsis markers
//! - detail-view selection
//!
//! Every fetch is awaited to completion before the next mutation, so a slow
//! response can never overwrite the result of a later request.

use std::sync::Arc;
use std::time::Duration;

use crate::models::{CategoryFilter, NewsItem, PagedNews, DEFAULT_PAGE_SIZE};
use crate::services::NewsRepository;

use super::debounce::Debouncer;

/// How long the search input must stay quiet before a fetch
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Load lifecycle of the listing screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing fetched yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// Last fetch committed
    Loaded,
    /// Last fetch failed
    Errored,
}

/// One slot in the rendered pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEntry {
    /// A navigable page number
    Page(u32),
    /// A gap marker ("…")
    Ellipsis,
}

/// Pages to render for `current` of `total`: all of them up to 7, otherwise
/// the first and last pages bracket a window of `current ± 1`, with gap
/// markers where pages are elided.
pub fn page_window(total: u32, current: u32) -> Vec<PageEntry> {
    if total <= 7 {
        return (1..=total.max(1)).map(PageEntry::Page).collect();
    }
    let mut entries = vec![PageEntry::Page(1)];
    if current > 3 {
        entries.push(PageEntry::Ellipsis);
    }
    let low = current.saturating_sub(1).max(2);
    let high = (current + 1).min(total - 1);
    entries.extend((low..=high).map(PageEntry::Page));
    if current + 2 < total {
        entries.push(PageEntry::Ellipsis);
    }
    entries.push(PageEntry::Page(total));
    entries
}

/// View state for the public listing screen
pub struct ListingController {
    repo: Arc<dyn NewsRepository>,
    state: LoadState,
    page: PagedNews,
    current_page: u32,
    per_page: u32,
    filter: CategoryFilter,
    search_text: String,
    applied_search: String,
    debouncer: Debouncer,
    selected: Option<NewsItem>,
    error: Option<String>,
}

impl ListingController {
    pub fn new(repo: Arc<dyn NewsRepository>) -> Self {
        Self::with_debounce(repo, SEARCH_DEBOUNCE)
    }

    /// Like `new`, with an explicit debounce delay
    pub fn with_debounce(repo: Arc<dyn NewsRepository>, debounce: Duration) -> Self {
        Self {
            repo,
            state: LoadState::Idle,
            page: PagedNews::default(),
            current_page: 1,
            per_page: DEFAULT_PAGE_SIZE,
            filter: CategoryFilter::All,
            search_text: String::new(),
            applied_search: String::new(),
            debouncer: Debouncer::new(debounce),
            selected: None,
            error: None,
        }
    }

    /// Fetch the current page with the active filter and search.
    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        self.error = None;
        match self
            .repo
            .fetch_page(
                self.current_page,
                self.per_page,
                self.filter,
                &self.applied_search,
            )
            .await
        {
            Ok(page) => {
                self.current_page = page.current_page;
                self.page = page;
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                tracing::warn!(error = %err, "listing load failed");
                self.error = Some("Error al cargar las noticias".to_string());
                self.state = LoadState::Errored;
            }
        }
    }

    /// Switch category and reload from page 1. Selecting the active
    /// category again also resets and refetches.
    pub async fn select_category(&mut self, filter: CategoryFilter) {
        self.filter = filter;
        self.current_page = 1;
        self.load().await;
    }

    /// Navigate to `page`; out-of-range targets are ignored, any in-range
    /// page refetches.
    pub async fn go_to_page(&mut self, page: u32) {
        if page < 1 || page > self.page.total_pages {
            return;
        }
        self.current_page = page;
        self.load().await;
    }

    /// Record a keystroke in the search box, restarting the debounce timer.
    pub fn search_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.search_text = text.clone();
        self.debouncer.schedule(text);
    }

    /// Wait for the debounced search to fire, then apply it: reset to page 1
    /// and reload. Returns whether a term was applied. Only await this after
    /// `search_input`, as it waits for the timer to deliver.
    pub async fn apply_debounced_search(&mut self) -> bool {
        let Some(term) = self.debouncer.fired().await else {
            return false;
        };
        self.applied_search = term;
        self.current_page = 1;
        self.load().await;
        true
    }

    /// Open the detail view for `id`.
    pub async fn open_detail(&mut self, id: i64) {
        self.selected = self.repo.fetch_by_id(id).await;
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.page.items
    }

    pub fn total_items(&self) -> i64 {
        self.page.total_items
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selected(&self) -> Option<&NewsItem> {
        self.selected.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The pagination bar for the current state
    pub fn pages(&self) -> Vec<PageEntry> {
        page_window(self.page.total_pages, self.current_page)
    }
}
