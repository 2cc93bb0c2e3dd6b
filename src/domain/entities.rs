use serde::{Deserialize, Serialize};

/// Stock marker shown for cards the shop currently has on hand.
pub const IN_STOCK_MARKER: &str = "在庫あり";
/// Stock marker for sold-out cards (and for anything we could not scrape).
pub const OUT_OF_STOCK_MARKER: &str = "在庫なし";
/// Placeholder the scrapers write when a field could not be fetched.
pub const FETCH_FAILED_MARKER: &str = "取得失敗";
/// Display name used when the source row carries none.
pub const UNKNOWN_NAME: &str = "不明";

/// A raw card as delivered by the card list endpoint.
///
/// Price naming follows the shops, not the trader:
/// - `buy_price` = what the grading-side shop pays for a PSA10 copy (our proceeds)
/// - `sell_price` = what the raw-card shop sells it for (our cost)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCard {
    pub id: String,
    /// Catalog row number from the source listing.
    pub no: Option<String>,
    pub name: String,
    pub card_number: Option<String>,
    pub buy_price: f64,
    pub sell_price: f64,
    pub stock: String,
    pub image_url: Option<String>,
    pub reference_url: Option<String>,
    /// Profit figure precomputed upstream; overrides `buy_price - sell_price`.
    #[serde(default)]
    pub profit: Option<f64>,
}

impl RawCard {
    /// Acquisition cost of the raw card.
    pub fn purchase_price(&self) -> f64 {
        finite_or_zero(self.sell_price)
    }

    /// Resale proceeds for a PSA10 outcome.
    pub fn psa10_price(&self) -> f64 {
        finite_or_zero(self.buy_price)
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock.contains(IN_STOCK_MARKER)
    }

    /// Text the keyword search runs against.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.card_number.as_deref().unwrap_or_default(),
            self.no.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Grading service plan chosen from the expected profit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradingTier {
    /// 2-3 month turnaround.
    Standard,
    /// Roughly one month turnaround.
    Express,
}

impl GradingTier {
    pub const STANDARD_FEE: f64 = 3_000.0;
    pub const EXPRESS_FEE: f64 = 10_000.0;

    pub fn fee(&self) -> f64 {
        match self {
            Self::Standard => Self::STANDARD_FEE,
            Self::Express => Self::EXPRESS_FEE,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Express => "Express",
        }
    }
}

/// Financial metrics derived for a card worth grading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfitInfo {
    pub psa10_price: f64,
    pub purchase_price: f64,
    pub tier: GradingTier,
    pub grading_fee: f64,
    pub max_profit: f64,
    pub net_profit: f64,
    /// Percent of (purchase price + grading fee).
    pub profit_rate: f64,
    /// Only set for the standard tier (two month holding period).
    pub monthly_rate: Option<f64>,
    /// Expected loss magnitude on a failed grade.
    pub risk_reward: f64,
}

impl ProfitInfo {
    pub fn is_express(&self) -> bool {
        self.tier == GradingTier::Express
    }

    /// Net profit after the caller's miscellaneous expenses.
    pub fn display_net_profit(&self, misc_expenses: f64) -> f64 {
        self.net_profit - finite_or_zero(misc_expenses)
    }
}

/// A raw card paired with its derived metrics. `profit` is `None` when the
/// card falls below the grading floor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCard {
    pub card: RawCard,
    pub profit: Option<ProfitInfo>,
}

impl EnrichedCard {
    pub fn display_net_profit(&self, misc_expenses: f64) -> Option<f64> {
        self.profit
            .as_ref()
            .map(|info| info.display_net_profit(misc_expenses))
    }
}

/// Collapse scraper noise into a stable stock label.
pub fn normalize_stock_status(raw: Option<&str>) -> String {
    let Some(value) = raw.map(str::trim) else {
        return OUT_OF_STOCK_MARKER.to_string();
    };

    if value.is_empty() || value.eq_ignore_ascii_case("nan") || value.contains(FETCH_FAILED_MARKER)
    {
        OUT_OF_STOCK_MARKER.to_string()
    } else {
        value.to_string()
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_normalization_maps_noise_to_out_of_stock() {
        assert_eq!(normalize_stock_status(None), OUT_OF_STOCK_MARKER);
        assert_eq!(normalize_stock_status(Some("")), OUT_OF_STOCK_MARKER);
        assert_eq!(normalize_stock_status(Some("NaN")), OUT_OF_STOCK_MARKER);
        assert_eq!(normalize_stock_status(Some("取得失敗")), OUT_OF_STOCK_MARKER);
        assert_eq!(normalize_stock_status(Some(" 在庫あり(3) ")), "在庫あり(3)");
    }

    #[test]
    fn non_finite_prices_read_as_zero() {
        let card = RawCard {
            id: "1".into(),
            no: None,
            name: "Pikachu".into(),
            card_number: None,
            buy_price: f64::NAN,
            sell_price: f64::INFINITY,
            stock: OUT_OF_STOCK_MARKER.into(),
            image_url: None,
            reference_url: None,
            profit: None,
        };
        assert_eq!(card.psa10_price(), 0.0);
        assert_eq!(card.purchase_price(), 0.0);
        assert_eq!(card.search_text(), "pikachu  ");
    }
}
