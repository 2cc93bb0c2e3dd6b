use serde::{Deserialize, Serialize};

use super::entities::RawCard;
use super::filter::FilterCriteria;
use super::pagination::{DisplayMode, PageWindow};
use super::pipeline::{run_pipeline, PipelineOutput};
use super::sort::{SortKey, SortSpec};

/// The view configuration one caller owns: criteria, ordering and window.
///
/// Setters keep the window consistent: any change to the filter criteria
/// (misc expenses included) puts the window back at its initial position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
    criteria: FilterCriteria,
    sort: SortSpec,
    window: PageWindow,
}

impl ViewState {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            sort: SortSpec::default(),
            window: PageWindow::initial(mode),
        }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn window(&self) -> &PageWindow {
        &self.window
    }

    pub fn mode(&self) -> DisplayMode {
        self.window.mode()
    }

    /// Replace the criteria. Returns whether anything changed (and the
    /// window was reset).
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> bool {
        if criteria == self.criteria {
            return false;
        }
        self.criteria = criteria;
        self.window.reset();
        true
    }

    pub fn update_criteria(&mut self, edit: impl FnOnce(&mut FilterCriteria)) -> bool {
        let mut next = self.criteria.clone();
        edit(&mut next);
        self.set_criteria(next)
    }

    pub fn set_misc_expenses(&mut self, misc_expenses: f64) -> bool {
        self.update_criteria(|criteria| criteria.misc_expenses = misc_expenses)
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    /// Header click: flip direction on the active key, otherwise switch.
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = self.sort.toggle(key);
    }

    /// Switching modes starts the new mode from its initial window.
    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.window.mode() != mode {
            self.window = PageWindow::initial(mode);
        }
    }

    pub fn jump_to_page(&mut self, requested: i64, total_items: usize) {
        if let PageWindow::Page(cursor) = &mut self.window {
            cursor.jump_to(requested, total_items);
        }
    }

    pub fn next_page(&mut self, total_items: usize) {
        if let PageWindow::Page(cursor) = &mut self.window {
            cursor.next(total_items);
        }
    }

    pub fn prev_page(&mut self, total_items: usize) {
        if let PageWindow::Page(cursor) = &mut self.window {
            cursor.prev(total_items);
        }
    }

    pub fn skip_forward(&mut self, total_items: usize) {
        if let PageWindow::Page(cursor) = &mut self.window {
            cursor.skip_forward(total_items);
        }
    }

    pub fn skip_back(&mut self, total_items: usize) {
        if let PageWindow::Page(cursor) = &mut self.window {
            cursor.skip_back(total_items);
        }
    }

    /// Explicit "load more" from the presentation layer.
    pub fn load_more(&mut self, trigger: u64, total_items: usize) -> bool {
        match &mut self.window {
            PageWindow::Reveal(cursor) => cursor.load_more(trigger, total_items),
            PageWindow::Page(_) => false,
        }
    }

    /// Run the pipeline for the current configuration and pull a stale page
    /// number back into range.
    pub fn refresh(&mut self, raw: &[RawCard]) -> PipelineOutput {
        let output = run_pipeline(raw, &self.criteria, self.sort, &self.window);
        if let PageWindow::Page(cursor) = &mut self.window {
            cursor.clamp_to(output.stats.filtered);
        }
        output
    }

    pub fn apply_persisted(&mut self, persisted: Preferences) {
        self.set_mode(persisted.mode);
        self.set_criteria(persisted.criteria);
        self.sort = persisted.sort;
    }

    pub fn to_persisted(&self) -> Preferences {
        Preferences {
            criteria: self.criteria.clone(),
            sort: self.sort,
            mode: self.mode(),
        }
    }
}

/// What survives between sessions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub criteria: FilterCriteria,
    #[serde(default)]
    pub sort: SortSpec,
    #[serde(default)]
    pub mode: DisplayMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::IN_STOCK_MARKER;
    use crate::domain::pagination::{PageCursor, RevealCursor};

    fn cards(count: usize) -> Vec<RawCard> {
        (0..count)
            .map(|i| RawCard {
                id: format!("{i:03}"),
                no: None,
                name: if i % 2 == 0 { format!("Pikachu {i}") } else { format!("Eevee {i}") },
                card_number: None,
                buy_price: 30_000.0,
                sell_price: 2_000.0 + i as f64,
                stock: IN_STOCK_MARKER.into(),
                image_url: None,
                reference_url: None,
                profit: None,
            })
            .collect()
    }

    #[test]
    fn criteria_change_resets_page() {
        let raw = cards(60);
        let mut view = ViewState::new(DisplayMode::Paged);
        view.jump_to_page(5, 60);
        assert_eq!(view.window(), &PageWindow::Page(PageCursor { page: 5, page_size: 10 }));

        assert!(view.update_criteria(|c| c.keyword = "pikachu".into()));
        assert_eq!(view.window(), &PageWindow::default());
        let output = view.refresh(&raw);
        assert_eq!(output.stats.filtered, 30);
    }

    #[test]
    fn unchanged_criteria_keep_position() {
        let mut view = ViewState::new(DisplayMode::Paged);
        view.jump_to_page(3, 60);
        assert!(!view.set_criteria(FilterCriteria::default()));
        assert_eq!(view.window(), &PageWindow::Page(PageCursor { page: 3, page_size: 10 }));
    }

    #[test]
    fn misc_expenses_reset_reveal_count() {
        let mut view = ViewState::new(DisplayMode::Reveal);
        assert!(view.load_more(1, 60));
        assert!(view.set_misc_expenses(500.0));
        assert_eq!(view.window(), &PageWindow::Reveal(RevealCursor::default()));
    }

    #[test]
    fn refresh_clamps_stored_page() {
        let raw = cards(60);
        let mut view = ViewState::new(DisplayMode::Paged);
        view.jump_to_page(6, 60);
        // Cards come back with fewer rows than before.
        let output = view.refresh(&raw[..25]);
        assert_eq!(output.visible.len(), 5);
        assert_eq!(view.window(), &PageWindow::Page(PageCursor { page: 3, page_size: 10 }));
    }

    #[test]
    fn page_buttons_step_from_shown_page() {
        let raw = cards(250);
        let mut view = ViewState::new(DisplayMode::Paged);
        view.jump_to_page(40, 1_000);

        // List shrank to 25 pages before the next refresh.
        view.prev_page(250);
        assert_eq!(view.window(), &PageWindow::Page(PageCursor { page: 24, page_size: 10 }));
        view.next_page(250);
        assert_eq!(view.window(), &PageWindow::Page(PageCursor { page: 25, page_size: 10 }));
        view.skip_back(250);
        assert_eq!(view.window(), &PageWindow::Page(PageCursor { page: 15, page_size: 10 }));

        let output = view.refresh(&raw);
        assert_eq!(output.visible[0].card.id, "140");
    }

    #[test]
    fn page_controls_ignore_reveal_mode() {
        let mut view = ViewState::new(DisplayMode::Reveal);
        view.jump_to_page(4, 100);
        view.skip_forward(100);
        assert_eq!(view.window(), &PageWindow::Reveal(RevealCursor::default()));
        view.set_mode(DisplayMode::Paged);
        assert!(!view.load_more(1, 100));
    }

    #[test]
    fn preferences_roundtrip_through_view() {
        let mut view = ViewState::new(DisplayMode::Paged);
        view.toggle_sort(SortKey::Name);
        view.update_criteria(|c| c.in_stock_only = true);
        let saved = view.to_persisted();

        let mut restored = ViewState::default();
        restored.apply_persisted(saved.clone());
        assert_eq!(restored.to_persisted(), saved);
        assert_eq!(restored.sort(), SortSpec::for_key(SortKey::Name));
    }
}
