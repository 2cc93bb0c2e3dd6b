//! Card filtering.

use serde::{Deserialize, Serialize};

use super::entities::{finite_or_zero, EnrichedCard};

/// Profit-rate floor applied until the user picks another one.
pub const DEFAULT_PROFIT_RATE_MIN: f64 = 20.0;
/// Floors offered in the filter picker; 0 means no floor.
pub const PROFIT_RATE_PRESETS: [f64; 6] = [0.0, 10.0, 15.0, 20.0, 25.0, 30.0];

/// Which price the min/max bounds apply to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    /// The raw card's shop price (our acquisition cost).
    #[default]
    Purchase,
    /// The PSA10 buy-back price (our resale proceeds).
    Psa10,
}

/// User-controlled narrowing of the candidate list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub keyword: String,
    pub in_stock_only: bool,
    pub profitable_only: bool,
    /// `None` means no floor.
    pub profit_rate_min: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub price_field: PriceField,
    /// Shipping and similar costs, subtracted from every net profit.
    pub misc_expenses: f64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            in_stock_only: false,
            profitable_only: false,
            profit_rate_min: Some(DEFAULT_PROFIT_RATE_MIN),
            price_min: None,
            price_max: None,
            price_field: PriceField::default(),
            misc_expenses: 0.0,
        }
    }
}

impl FilterCriteria {
    /// Parse a floor typed or picked by the user. Empty or junk input means
    /// no floor.
    pub fn parse_rate_floor(input: &str) -> Option<f64> {
        input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value > 0.0)
    }

    /// Floor actually enforced: unset reads as 0.
    pub fn effective_rate_floor(&self) -> f64 {
        self.profit_rate_min.map(finite_or_zero).unwrap_or(0.0)
    }

    pub fn misc_expenses(&self) -> f64 {
        finite_or_zero(self.misc_expenses)
    }

    pub fn matches(&self, item: &EnrichedCard) -> bool {
        let Some(info) = item.profit.as_ref() else {
            return false;
        };

        let keyword = self.keyword.trim();
        if !keyword.is_empty() && !item.card.search_text().contains(&keyword.to_lowercase()) {
            return false;
        }

        let price = match self.price_field {
            PriceField::Purchase => info.purchase_price,
            PriceField::Psa10 => info.psa10_price,
        };
        if let Some(min) = self.price_min.filter(|v| v.is_finite()) {
            if price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max.filter(|v| v.is_finite()) {
            if price > max {
                return false;
            }
        }

        if self.in_stock_only && !item.card.is_in_stock() {
            return false;
        }
        if self.profitable_only && info.display_net_profit(self.misc_expenses()) <= 0.0 {
            return false;
        }

        info.profit_rate >= self.effective_rate_floor()
    }
}

/// Keep the cards passing every predicate, in their original order.
pub fn filter_cards(items: &[EnrichedCard], criteria: &FilterCriteria) -> Vec<EnrichedCard> {
    items
        .iter()
        .filter(|item| criteria.matches(item))
        .cloned()
        .collect()
}
