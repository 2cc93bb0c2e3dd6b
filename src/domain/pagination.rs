//! Windowing over the sorted card list.
//!
//! Desktop views page through fixed-size pages; mobile views grow a single
//! window from the top as the user scrolls ("load more").

use serde::{Deserialize, Serialize};

/// Cards per page in fixed page mode.
pub const PAGE_SIZE: usize = 10;
/// Pages skipped by the `±10` buttons.
pub const PAGE_SKIP: usize = 10;
/// Cards shown before the first load-more in reveal mode.
pub const INITIAL_REVEAL: usize = 20;
/// Cards added per load-more.
pub const REVEAL_STEP: usize = 20;
/// Distance below the viewport at which the sentinel counts as reached.
pub const LOAD_MORE_LEAD_MARGIN: f64 = 200.0;

/// Caller-selected addressing mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    Paged,
    Reveal,
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_items.div_ceil(page_size).max(1)
}

/// Clamp any requested page number (including 0 or negatives) into range.
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let last = total_pages.max(1) as i64;
    requested.clamp(1, last) as usize
}

/// Fixed page cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

impl PageCursor {
    pub fn total_pages(&self, total_items: usize) -> usize {
        total_pages(total_items, self.page_size)
    }

    /// Page actually shown for the given item count.
    pub fn effective_page(&self, total_items: usize) -> usize {
        clamp_page(self.page as i64, self.total_pages(total_items))
    }

    /// Pull the cursor back in range after the item count shrank.
    pub fn clamp_to(&mut self, total_items: usize) {
        self.page = self.effective_page(total_items);
    }

    pub fn jump_to(&mut self, requested: i64, total_items: usize) {
        self.page = clamp_page(requested, self.total_pages(total_items));
    }

    // Moves step from the page actually shown, not a stale stored one.
    fn step(&mut self, delta: i64, total_items: usize) {
        let page = self.effective_page(total_items) as i64;
        self.jump_to(page + delta, total_items);
    }

    pub fn next(&mut self, total_items: usize) {
        self.step(1, total_items);
    }

    pub fn prev(&mut self, total_items: usize) {
        self.step(-1, total_items);
    }

    pub fn skip_forward(&mut self, total_items: usize) {
        if self.navigation(total_items).can_skip_forward {
            self.step(PAGE_SKIP as i64, total_items);
        }
    }

    pub fn skip_back(&mut self, total_items: usize) {
        if self.navigation(total_items).can_skip_back {
            self.step(-(PAGE_SKIP as i64), total_items);
        }
    }

    pub fn range(&self, total_items: usize) -> std::ops::Range<usize> {
        let page = self.effective_page(total_items);
        let size = self.page_size.max(1);
        let start = ((page - 1) * size).min(total_items);
        let end = (page * size).min(total_items);
        start..end
    }

    pub fn navigation(&self, total_items: usize) -> PageNavigation {
        let total_pages = self.total_pages(total_items);
        let page = self.effective_page(total_items);
        let range = self.range(total_items);
        PageNavigation {
            page,
            total_pages,
            total_items,
            first_item: if total_items == 0 { 0 } else { range.start + 1 },
            last_item: range.end,
            can_prev: page > 1,
            can_next: page < total_pages,
            can_skip_back: page > PAGE_SKIP,
            can_skip_forward: page + PAGE_SKIP <= total_pages,
        }
    }
}

/// What a pager control needs to draw itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageNavigation {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// 1-based, 0 when there is nothing to show.
    pub first_item: usize,
    pub last_item: usize,
    pub can_prev: bool,
    pub can_next: bool,
    pub can_skip_back: bool,
    pub can_skip_forward: bool,
}

impl PageNavigation {
    /// Hide the pager entirely when everything fits on one page.
    pub fn is_needed(&self) -> bool {
        self.total_pages > 1
    }

    pub fn summary(&self) -> String {
        format!(
            "Page {} / {} ({}-{} of {})",
            self.page, self.total_pages, self.first_item, self.last_item, self.total_items
        )
    }
}

/// Growing window for mobile views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealCursor {
    count: usize,
    #[serde(default)]
    last_trigger: Option<u64>,
}

impl Default for RevealCursor {
    fn default() -> Self {
        Self {
            count: INITIAL_REVEAL,
            last_trigger: None,
        }
    }
}

impl RevealCursor {
    /// Number of cards shown; never more than exist.
    pub fn revealed(&self, total_items: usize) -> usize {
        self.count.min(total_items)
    }

    pub fn has_more(&self, total_items: usize) -> bool {
        self.count < total_items
    }

    /// Handle a load-more request carrying the presentation layer's trigger
    /// sequence number. Repeated or older sequence numbers are ignored so a
    /// single visibility event cannot grow the window twice. Returns whether
    /// the window grew.
    pub fn load_more(&mut self, trigger: u64, total_items: usize) -> bool {
        if self.last_trigger.is_some_and(|last| trigger <= last) {
            return false;
        }
        self.last_trigger = Some(trigger);

        if !self.has_more(total_items) {
            return false;
        }
        self.count = (self.count + REVEAL_STEP).min(total_items);
        true
    }

    /// Whether a sentinel `distance` below the viewport is close enough to
    /// request more cards.
    pub fn sentinel_in_range(distance: f64, lead_margin: f64) -> bool {
        distance.is_finite() && distance <= lead_margin
    }

    pub fn range(&self, total_items: usize) -> std::ops::Range<usize> {
        0..self.revealed(total_items)
    }
}

/// Window position in whichever mode the view uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageWindow {
    Page(PageCursor),
    Reveal(RevealCursor),
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::initial(DisplayMode::default())
    }
}

impl PageWindow {
    pub fn initial(mode: DisplayMode) -> Self {
        match mode {
            DisplayMode::Paged => Self::Page(PageCursor::default()),
            DisplayMode::Reveal => Self::Reveal(RevealCursor::default()),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        match self {
            Self::Page(_) => DisplayMode::Paged,
            Self::Reveal(_) => DisplayMode::Reveal,
        }
    }

    /// Back to page 1 or the initial reveal count, keeping the page size.
    pub fn reset(&mut self) {
        *self = match *self {
            Self::Page(cursor) => Self::Page(PageCursor {
                page: 1,
                page_size: cursor.page_size,
            }),
            Self::Reveal(_) => Self::Reveal(RevealCursor::default()),
        };
    }

    pub fn range(&self, total_items: usize) -> std::ops::Range<usize> {
        match self {
            Self::Page(cursor) => cursor.range(total_items),
            Self::Reveal(cursor) => cursor.range(total_items),
        }
    }
}

/// Slice out the visible part of `items`.
pub fn window<T: Clone>(items: &[T], window: &PageWindow) -> Vec<T> {
    items[window.range(items.len())].to_vec()
}
