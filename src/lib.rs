//! Grading profitability scanner for trading cards.
//!
//! [`domain`] holds the pure pipeline (profit model, filtering, sorting,
//! windowing). [`infra`] fetches the card list and keeps the on-disk
//! snapshot; [`ui`] renders results as text.

pub mod config;
pub mod domain;
pub mod infra;
pub mod ui;
pub mod util;
