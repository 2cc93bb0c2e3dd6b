//! The full recomputation: enrich, filter, sort, window, summarize.
//!
//! Every call is a pure function of its inputs. Callers re-run it whenever
//! the card list or any view parameter changes.

use serde::Serialize;

use super::entities::{EnrichedCard, RawCard};
use super::filter::{filter_cards, FilterCriteria};
use super::pagination::{window, PageNavigation, PageWindow};
use super::profit::enrich_cards;
use super::sort::{sort_cards, SortSpec};
use super::stats::{profit_summary, summarize, AggregateStats, ProfitSummary};

/// Position info for the rendered window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum WindowInfo {
    Paged(PageNavigation),
    Reveal {
        shown: usize,
        total: usize,
        has_more: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub visible: Vec<EnrichedCard>,
    pub stats: AggregateStats,
    pub summary: Option<ProfitSummary>,
    pub window: WindowInfo,
}

pub fn run_pipeline(
    raw: &[RawCard],
    criteria: &FilterCriteria,
    sort: SortSpec,
    page_window: &PageWindow,
) -> PipelineOutput {
    let misc_expenses = criteria.misc_expenses();

    let enriched = enrich_cards(raw);
    let mut filtered = filter_cards(&enriched, criteria);
    sort_cards(&mut filtered, sort, misc_expenses);

    let total = filtered.len();
    let window_info = match page_window {
        PageWindow::Page(cursor) => WindowInfo::Paged(cursor.navigation(total)),
        PageWindow::Reveal(cursor) => WindowInfo::Reveal {
            shown: cursor.revealed(total),
            total,
            has_more: cursor.has_more(total),
        },
    };

    PipelineOutput {
        visible: window(&filtered, page_window),
        stats: summarize(raw, &filtered, misc_expenses),
        summary: profit_summary(&filtered, misc_expenses),
        window: window_info,
    }
}
