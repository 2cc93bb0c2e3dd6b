//! Card ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::entities::EnrichedCard;

/// Sorting options for the card table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Net profit after misc expenses.
    #[default]
    DisplayProfit,
    ProfitRate,
    MonthlyRate,
    MaxProfit,
    GradingFee,
    RiskReward,
    Name,
    CardNumber,
    Psa10Price,
    PurchasePrice,
    Stock,
}

impl SortKey {
    pub const ALL: [SortKey; 11] = [
        Self::DisplayProfit,
        Self::ProfitRate,
        Self::MonthlyRate,
        Self::MaxProfit,
        Self::GradingFee,
        Self::RiskReward,
        Self::Name,
        Self::CardNumber,
        Self::Psa10Price,
        Self::PurchasePrice,
        Self::Stock,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::DisplayProfit => "Net profit",
            Self::ProfitRate => "Rate %",
            Self::MonthlyRate => "Monthly %",
            Self::MaxProfit => "Max profit",
            Self::GradingFee => "Grading fee",
            Self::RiskReward => "Risk",
            Self::Name => "Name",
            Self::CardNumber => "Number",
            Self::Psa10Price => "PSA10",
            Self::PurchasePrice => "Purchase",
            Self::Stock => "Stock",
        }
    }

    /// Parse a CLI-style key name such as `profit-rate`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        let key = match normalized.as_str() {
            "profit" | "display-profit" | "net-profit" => Self::DisplayProfit,
            "rate" | "profit-rate" => Self::ProfitRate,
            "monthly" | "monthly-rate" => Self::MonthlyRate,
            "max-profit" => Self::MaxProfit,
            "fee" | "grading-fee" => Self::GradingFee,
            "risk" | "risk-reward" => Self::RiskReward,
            "name" => Self::Name,
            "number" | "card-number" => Self::CardNumber,
            "psa10" | "psa10-price" | "buy-price" => Self::Psa10Price,
            "purchase" | "purchase-price" | "sell-price" => Self::PurchasePrice,
            "stock" => Self::Stock,
            _ => return None,
        };
        Some(key)
    }

    /// Profit-oriented keys start out descending, everything else ascending.
    pub fn default_descending(&self) -> bool {
        matches!(
            self,
            Self::DisplayProfit | Self::ProfitRate | Self::MonthlyRate | Self::MaxProfit
        )
    }

    fn value(&self, item: &EnrichedCard, misc_expenses: f64) -> SortValue {
        let info = item.profit.as_ref();
        let number = |value: Option<f64>| SortValue::Number(value.unwrap_or(f64::NEG_INFINITY));
        match self {
            Self::DisplayProfit => number(item.display_net_profit(misc_expenses)),
            Self::ProfitRate => number(info.map(|i| i.profit_rate)),
            // Express cards carry no monthly figure; they rank as -1.
            Self::MonthlyRate => SortValue::Number(
                info.map(|i| i.monthly_rate.unwrap_or(-1.0)).unwrap_or(f64::NEG_INFINITY),
            ),
            Self::MaxProfit => number(info.map(|i| i.max_profit)),
            Self::GradingFee => number(info.map(|i| i.grading_fee)),
            Self::RiskReward => number(info.map(|i| i.risk_reward)),
            Self::Name => SortValue::Text(item.card.name.to_lowercase()),
            Self::CardNumber => SortValue::Text(
                item.card
                    .card_number
                    .as_deref()
                    .unwrap_or_default()
                    .to_lowercase(),
            ),
            Self::Psa10Price => SortValue::Number(item.card.psa10_price()),
            Self::PurchasePrice => SortValue::Number(item.card.purchase_price()),
            Self::Stock => SortValue::Text(item.card.stock.to_lowercase()),
        }
    }
}

#[derive(Debug, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
}

impl SortValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

/// Key plus direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub descending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::for_key(SortKey::default())
    }
}

impl SortSpec {
    pub fn for_key(key: SortKey) -> Self {
        Self {
            key,
            descending: key.default_descending(),
        }
    }

    /// Column-header behaviour: same key flips direction, a new key starts
    /// at its default direction.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self {
                key,
                descending: !self.descending,
            }
        } else {
            Self::for_key(key)
        }
    }

    pub fn arrow(&self) -> &'static str {
        if self.descending {
            "↓"
        } else {
            "↑"
        }
    }

    /// Total order over cards. Ties fall back to the card id (ascending, in
    /// either direction) so repeated runs agree.
    pub fn compare(&self, a: &EnrichedCard, b: &EnrichedCard, misc_expenses: f64) -> Ordering {
        let primary = self
            .key
            .value(a, misc_expenses)
            .compare(&self.key.value(b, misc_expenses));
        let primary = if self.descending {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| a.card.id.cmp(&b.card.id))
    }
}

/// Sort the whole filtered sequence, not just the visible page.
pub fn sort_cards(items: &mut [EnrichedCard], spec: SortSpec, misc_expenses: f64) {
    items.sort_by(|a, b| spec.compare(a, b, misc_expenses));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{RawCard, IN_STOCK_MARKER};
    use crate::domain::profit::enrich_cards;

    fn raw(id: &str, name: &str, purchase: f64, psa10: f64) -> RawCard {
        RawCard {
            id: id.into(),
            no: None,
            name: name.into(),
            card_number: None,
            buy_price: psa10,
            sell_price: purchase,
            stock: IN_STOCK_MARKER.into(),
            image_url: None,
            reference_url: None,
            profit: None,
        }
    }

    fn sample() -> Vec<EnrichedCard> {
        enrich_cards(&[
            raw("b", "mew", 1_000.0, 21_000.0),
            raw("a", "Eevee", 5_000.0, 40_000.0),
            raw("c", "arceus", 2_000.0, 22_000.0),
            raw("d", "Zapdos", 1_000.0, 16_000.0),
        ])
    }

    fn ids(items: &[EnrichedCard]) -> Vec<&str> {
        items.iter().map(|i| i.card.id.as_str()).collect()
    }

    #[test]
    fn default_is_display_profit_descending_with_id_tiebreak() {
        let mut items = sample();
        sort_cards(&mut items, SortSpec::default(), 0.0);
        // b and c both net 17,000.
        assert_eq!(ids(&items), ["a", "b", "c", "d"]);
    }

    #[test]
    fn names_compare_case_insensitively() {
        let mut items = sample();
        sort_cards(&mut items, SortSpec::for_key(SortKey::Name), 0.0);
        assert_eq!(ids(&items), ["c", "a", "b", "d"]);
    }

    #[test]
    fn express_cards_rank_lowest_on_monthly_rate() {
        let mut items = sample();
        sort_cards(&mut items, SortSpec::for_key(SortKey::MonthlyRate), 0.0);
        assert_eq!(items.last().map(|i| i.card.id.as_str()), Some("a"));
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let spec = SortSpec::default();
        assert!(spec.descending);
        let flipped = spec.toggle(SortKey::DisplayProfit);
        assert!(!flipped.descending);
        let by_fee = flipped.toggle(SortKey::GradingFee);
        assert_eq!(by_fee, SortSpec { key: SortKey::GradingFee, descending: false });
        assert!(by_fee.toggle(SortKey::ProfitRate).descending);
    }

    #[test]
    fn comparison_is_antisymmetric() {
        let items = sample();
        for key in SortKey::ALL {
            for descending in [false, true] {
                let spec = SortSpec { key, descending };
                for a in &items {
                    for b in &items {
                        assert_eq!(spec.compare(a, b, 500.0), spec.compare(b, a, 500.0).reverse());
                    }
                }
            }
        }
    }

    #[test]
    fn sorting_is_repeatable() {
        let spec = SortSpec::for_key(SortKey::GradingFee);
        let mut first = sample();
        let mut second = sample();
        second.reverse();
        sort_cards(&mut first, spec, 0.0);
        sort_cards(&mut second, spec, 0.0);
        assert_eq!(first, second);
    }

    #[test]
    fn key_names_parse() {
        assert_eq!(SortKey::from_name("profit-rate"), Some(SortKey::ProfitRate));
        assert_eq!(SortKey::from_name("GRADING_FEE"), Some(SortKey::GradingFee));
        assert_eq!(SortKey::from_name("bogus"), None);
    }
}
