use serde::Serialize;

use super::entities::{EnrichedCard, RawCard};
use super::profit::calc_card_profit;

/// Counters shown in the sidebar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub total: usize,
    pub filtered: usize,
    /// Raw cards below the grading floor.
    pub hidden_by_profit: usize,
    pub profitable: usize,
    pub in_stock: usize,
}

pub fn summarize(raw: &[RawCard], filtered: &[EnrichedCard], misc_expenses: f64) -> AggregateStats {
    AggregateStats {
        total: raw.len(),
        filtered: filtered.len(),
        hidden_by_profit: raw
            .iter()
            .filter(|card| calc_card_profit(card).is_none())
            .count(),
        profitable: filtered
            .iter()
            .filter(|item| {
                item.display_net_profit(misc_expenses)
                    .map(|profit| profit > 0.0)
                    .unwrap_or(false)
            })
            .count(),
        in_stock: filtered.iter().filter(|item| item.card.is_in_stock()).count(),
    }
}

/// Average / max / min display profit under the table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProfitSummary {
    /// Floored to whole currency units.
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

pub fn profit_summary(filtered: &[EnrichedCard], misc_expenses: f64) -> Option<ProfitSummary> {
    let profits: Vec<f64> = filtered
        .iter()
        .filter_map(|item| item.display_net_profit(misc_expenses))
        .collect();
    if profits.is_empty() {
        return None;
    }

    let average = profits.iter().sum::<f64>() / profits.len() as f64;
    let max = profits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = profits.iter().copied().fold(f64::INFINITY, f64::min);

    Some(ProfitSummary {
        average: average.floor(),
        max,
        min,
    })
}
