//! Domain logic for grading profitability lives here. Nothing in this module
//! performs I/O.

pub mod app_state;
pub mod entities;
pub mod filter;
pub mod pagination;
pub mod pipeline;
pub mod profit;
pub mod sort;
pub mod stats;

pub use app_state::{Preferences, ViewState};
pub use entities::{
    normalize_stock_status, EnrichedCard, GradingTier, ProfitInfo, RawCard, IN_STOCK_MARKER,
    OUT_OF_STOCK_MARKER,
};
pub use filter::{filter_cards, FilterCriteria, PriceField};
pub use pagination::{DisplayMode, PageCursor, PageNavigation, PageWindow, RevealCursor};
pub use pipeline::{run_pipeline, PipelineOutput, WindowInfo};
pub use profit::{calc_card_profit, enrich_cards};
pub use sort::{sort_cards, SortKey, SortSpec};
pub use stats::{profit_summary, summarize, AggregateStats, ProfitSummary};
