use std::ops::RangeInclusive;

use crate::internal::location::Location;
use crate::internal::models::{FetchState, Idea};
use crate::internal::prefs::{PreferenceStore, Preferences};
use crate::internal::query::{ListQuery, PAGE_SIZE_OPTIONS, SortOrder};

/// How many numbered page buttons are visible at once.
pub const PAGE_WINDOW: u32 = 5;

/// Owns the active [`ListQuery`] and the fetch state machine
/// (`Idle -> Loading -> {Loaded, Failed}`), and keeps the injected location
/// and preference store in sync with every query change.
///
/// Fetch I/O itself lives elsewhere; callers drive the lifecycle through
/// [`begin_fetch`] / [`complete_fetch`] / [`fail_fetch`]. Each fetch carries a
/// sequence number and completions for anything but the latest issued fetch
/// are discarded, so a slow page-2 response can never overwrite page 3.
///
/// [`begin_fetch`]: ListController::begin_fetch
/// [`complete_fetch`]: ListController::complete_fetch
/// [`fail_fetch`]: ListController::fail_fetch
pub struct ListController {
    query: ListQuery,
    items: Vec<Idea>,
    total: u64,
    state: FetchState,
    error: Option<String>,
    issued_seq: u64,
    location: Box<dyn Location>,
    prefs: Box<dyn PreferenceStore>,
}

impl ListController {
    /// Derive the initial query from the location's current search string and
    /// the stored preferences, then write the effective state back so a
    /// partial or invalid deep link reads back normalized.
    pub fn new(location: Box<dyn Location>, prefs: Box<dyn PreferenceStore>) -> Self {
        let mut controller = Self {
            query: ListQuery::default(),
            items: Vec::new(),
            total: 0,
            state: FetchState::Idle,
            error: None,
            issued_seq: 0,
            location,
            prefs,
        };
        let search = controller.location.search();
        controller.requery(&search);
        controller.persist_prefs();
        controller
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn items(&self) -> &[Idea] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == FetchState::Loading
    }

    /// The location's current search string (post-normalization).
    pub fn location_search(&self) -> String {
        self.location.search()
    }

    // ----- query mutation; each returns true when the query changed -----

    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if page == self.query.page {
            return false;
        }
        self.query.page = page;
        self.sync_location();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.can_next() && self.set_page(self.query.page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.can_prev() && self.set_page(self.query.page - 1)
    }

    pub fn first_page(&mut self) -> bool {
        self.can_prev() && self.set_page(1)
    }

    pub fn last_page(&mut self) -> bool {
        self.can_next() && self.set_page(self.page_count())
    }

    /// Apply a new page size. A size change invalidates page boundaries, so
    /// the page resets to 1. Values outside the option set are rejected.
    pub fn set_page_size(&mut self, size: u32) -> bool {
        if !PAGE_SIZE_OPTIONS.contains(&size) || size == self.query.page_size {
            return false;
        }
        self.query.page_size = size;
        self.query.page = 1;
        self.sync_location();
        self.persist_prefs();
        true
    }

    /// Step to the next size in the fixed option cycle (10 -> 20 -> 50 -> 10).
    pub fn cycle_page_size(&mut self) -> bool {
        let current = PAGE_SIZE_OPTIONS
            .iter()
            .position(|&s| s == self.query.page_size)
            .unwrap_or(0);
        let next = PAGE_SIZE_OPTIONS[(current + 1) % PAGE_SIZE_OPTIONS.len()];
        self.set_page_size(next)
    }

    /// Apply a new sort order, resetting the page to 1.
    pub fn set_sort(&mut self, sort: SortOrder) -> bool {
        if sort == self.query.sort {
            return false;
        }
        self.query.sort = sort;
        self.query.page = 1;
        self.sync_location();
        self.persist_prefs();
        true
    }

    pub fn toggle_sort(&mut self) -> bool {
        self.set_sort(self.query.sort.toggled())
    }

    // ----- fetch lifecycle -----

    /// Clear any prior error, enter Loading, and hand out the sequence number
    /// the eventual completion must present.
    pub fn begin_fetch(&mut self) -> u64 {
        self.error = None;
        self.state = FetchState::Loading;
        self.issued_seq += 1;
        self.issued_seq
    }

    /// Apply a successful fetch. Returns false (and changes nothing) when a
    /// newer fetch has been issued since `seq`.
    pub fn complete_fetch(&mut self, seq: u64, items: Vec<Idea>, total: u64) -> bool {
        if seq != self.issued_seq {
            tracing::debug!(seq, latest = self.issued_seq, "discarding stale fetch result");
            return false;
        }
        self.items = items;
        self.total = total;
        self.state = FetchState::Loaded;
        true
    }

    /// Record a fetch failure. Items from the previously displayed page stay
    /// in memory; the view swaps to the error panel while they do.
    pub fn fail_fetch(&mut self, seq: u64, message: impl Into<String>) -> bool {
        if seq != self.issued_seq {
            tracing::debug!(seq, latest = self.issued_seq, "discarding stale fetch error");
            return false;
        }
        self.error = Some(message.into());
        self.state = FetchState::Failed;
        true
    }

    // ----- history navigation -----

    /// Step the location back one entry and re-derive the query from it using
    /// the same fallback chain as startup. Returns false at start of history.
    pub fn navigate_back(&mut self) -> bool {
        match self.location.back() {
            Some(search) => {
                self.requery(&search);
                true
            }
            None => false,
        }
    }

    /// Forward counterpart of [`navigate_back`](ListController::navigate_back).
    pub fn navigate_forward(&mut self) -> bool {
        match self.location.forward() {
            Some(search) => {
                self.requery(&search);
                true
            }
            None => false,
        }
    }

    // ----- derived values -----

    pub fn page_count(&self) -> u32 {
        match self.total {
            0 => 0,
            total => total
                .div_ceil(self.query.page_size as u64)
                .min(u32::MAX as u64) as u32,
        }
    }

    pub fn can_prev(&self) -> bool {
        self.query.page > 1
    }

    pub fn can_next(&self) -> bool {
        self.query.page < self.page_count()
    }

    /// The sliding window of visible page numbers: [`PAGE_WINDOW`] wide,
    /// clipped at both ends of the page range. Empty when there are no pages.
    pub fn page_window(&self) -> RangeInclusive<u32> {
        let page_count = self.page_count();
        if page_count == 0 {
            #[allow(clippy::reversed_empty_ranges)]
            return 1..=0;
        }

        let half = PAGE_WINDOW / 2;
        let mut start = self.query.page.saturating_sub(half).max(1);
        let end = start.saturating_add(PAGE_WINDOW - 1).min(page_count);
        // When total shrank under us, the current page may sit past the end.
        start = start.min(end);
        if end - start + 1 < PAGE_WINDOW {
            start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
        }
        start..=end
    }

    /// 1-based item range on the current page, for "Showing X - Y of Z".
    /// None while the total is unknown or zero.
    pub fn showing_range(&self) -> Option<(u64, u64)> {
        if self.total == 0 {
            return None;
        }
        let page = self.query.page as u64;
        let size = self.query.page_size as u64;
        Some(((page - 1) * size + 1, (page * size).min(self.total)))
    }

    fn requery(&mut self, search: &str) {
        self.query = ListQuery::from_search(search, &self.prefs.load());
        self.sync_location();
    }

    fn sync_location(&mut self) {
        self.location.replace(&self.query.to_search());
    }

    fn persist_prefs(&mut self) {
        let prefs = Preferences {
            page_size: Some(self.query.page_size),
            sort: Some(self.query.sort.as_query_str().to_string()),
        };
        self.prefs.save(&prefs);
    }
}
