//! Grading fee tiers and the per-card profit model.
//!
//! - Expected max profit below 10,001: not worth grading, no metrics.
//! - 10,001 up to 29,999: standard plan (fee 3,000, 2-3 months).
//! - 30,000 and above: express plan (fee 10,000, about a month).

use super::entities::{finite_or_zero, EnrichedCard, GradingTier, ProfitInfo, RawCard};

/// Smallest expected profit that still justifies paying for grading.
pub const MIN_PROFIT_TO_SHOW: f64 = 10_001.0;
/// Expected profit from which the express plan is used.
pub const EXPRESS_THRESHOLD: f64 = 30_000.0;
/// Resale platform fee assumed when a failed card is sold raw.
pub const RAW_RESALE_FEE_RATE: f64 = 0.10;
/// Holding period, in months, assumed for the standard plan.
pub const STANDARD_HOLDING_MONTHS: f64 = 2.0;

/// Tier for a given expected profit, or `None` below the grading floor.
pub fn grading_tier(max_profit: f64) -> Option<GradingTier> {
    let profit = finite_or_zero(max_profit);
    if profit < MIN_PROFIT_TO_SHOW {
        None
    } else if profit >= EXPRESS_THRESHOLD {
        Some(GradingTier::Express)
    } else {
        Some(GradingTier::Standard)
    }
}

/// Net profit over total cost, in percent. Zero when there is no cost base.
pub fn profit_rate(net_profit: f64, purchase_price: f64, grading_fee: f64) -> f64 {
    let total_cost = finite_or_zero(purchase_price) + finite_or_zero(grading_fee);
    if total_cost <= 0.0 {
        return 0.0;
    }
    finite_or_zero(finite_or_zero(net_profit) / total_cost * 100.0)
}

/// Loss if the grade fails: the fee plus the platform cut on a raw resale.
pub fn risk_reward(grading_fee: f64, purchase_price: f64) -> f64 {
    round_half_up(finite_or_zero(grading_fee) + finite_or_zero(purchase_price) * RAW_RESALE_FEE_RATE)
}

/// Derive grading metrics for one card.
///
/// Returns `None` when the expected profit is below [`MIN_PROFIT_TO_SHOW`];
/// that is an exclusion, not an error.
pub fn calc_card_profit(card: &RawCard) -> Option<ProfitInfo> {
    let psa10_price = card.psa10_price();
    let purchase_price = card.purchase_price();
    let max_profit = card
        .profit
        .filter(|profit| profit.is_finite())
        .unwrap_or(psa10_price - purchase_price);

    let tier = grading_tier(max_profit)?;
    let grading_fee = tier.fee();
    let net_profit = max_profit - grading_fee;
    let rate = profit_rate(net_profit, purchase_price, grading_fee);
    let monthly_rate = match tier {
        GradingTier::Standard => Some(rate / STANDARD_HOLDING_MONTHS),
        GradingTier::Express => None,
    };

    Some(ProfitInfo {
        psa10_price,
        purchase_price,
        tier,
        grading_fee,
        max_profit,
        net_profit,
        profit_rate: rate,
        monthly_rate,
        risk_reward: risk_reward(grading_fee, purchase_price),
    })
}

/// Pair every card with its metrics. Excluded cards stay in the output with
/// `profit: None` so they can still be counted.
pub fn enrich_cards(cards: &[RawCard]) -> Vec<EnrichedCard> {
    cards
        .iter()
        .map(|card| EnrichedCard {
            card: card.clone(),
            profit: calc_card_profit(card),
        })
        .collect()
}

// Math.round semantics: halves go towards positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OUT_OF_STOCK_MARKER;

    fn card(purchase: f64, psa10: f64) -> RawCard {
        RawCard {
            id: "c-1".into(),
            no: Some("1".into()),
            name: "Charizard ex".into(),
            card_number: Some("SV2a 201/165".into()),
            buy_price: psa10,
            sell_price: purchase,
            stock: OUT_OF_STOCK_MARKER.into(),
            image_url: None,
            reference_url: None,
            profit: None,
        }
    }

    fn with_max_profit(max_profit: f64) -> RawCard {
        card(1_000.0, 1_000.0 + max_profit)
    }

    #[test]
    fn tier_boundaries() {
        assert!(calc_card_profit(&with_max_profit(10_000.0)).is_none());
        assert_eq!(
            calc_card_profit(&with_max_profit(10_001.0)).map(|p| p.grading_fee),
            Some(3_000.0)
        );
        assert_eq!(
            calc_card_profit(&with_max_profit(29_999.0)).map(|p| p.grading_fee),
            Some(3_000.0)
        );
        assert_eq!(
            calc_card_profit(&with_max_profit(30_000.0)).map(|p| p.grading_fee),
            Some(10_000.0)
        );
    }

    #[test]
    fn express_scenario() {
        let info = calc_card_profit(&card(5_000.0, 40_000.0)).expect("profitable");
        assert_eq!(info.max_profit, 35_000.0);
        assert_eq!(info.grading_fee, 10_000.0);
        assert!(info.is_express());
        assert_eq!(info.net_profit, 25_000.0);
        assert!((info.profit_rate - 166.666_666_666_666_66).abs() < 1e-9);
        assert_eq!(info.monthly_rate, None);
        assert_eq!(info.risk_reward, 10_500.0);
    }

    #[test]
    fn standard_tier_halves_rate_for_monthly() {
        let info = calc_card_profit(&card(10_000.0, 30_000.0)).expect("profitable");
        assert_eq!(info.tier, GradingTier::Standard);
        assert_eq!(info.net_profit, 17_000.0);
        assert_eq!(info.profit_rate, 17_000.0 / 13_000.0 * 100.0);
        assert_eq!(info.monthly_rate, Some(info.profit_rate / 2.0));
        assert_eq!(info.risk_reward, 4_000.0);
    }

    #[test]
    fn below_floor_is_excluded() {
        assert!(calc_card_profit(&card(8_000.0, 10_500.0)).is_none());
    }

    #[test]
    fn supplied_profit_overrides_price_gap() {
        let mut raw = card(5_000.0, 6_000.0);
        raw.profit = Some(12_000.0);
        let info = calc_card_profit(&raw).expect("profitable");
        assert_eq!(info.max_profit, 12_000.0);
        assert_eq!(info.tier, GradingTier::Standard);

        raw.profit = Some(f64::NAN);
        assert!(calc_card_profit(&raw).is_none());
    }

    #[test]
    fn malformed_prices_are_coerced() {
        let raw = card(f64::NAN, 50_000.0);
        let info = calc_card_profit(&raw).expect("profitable");
        assert_eq!(info.purchase_price, 0.0);
        assert_eq!(info.max_profit, 50_000.0);
        assert_eq!(info.profit_rate, 40_000.0 / 10_000.0 * 100.0);
    }

    #[test]
    fn rate_is_zero_without_cost_base() {
        assert_eq!(profit_rate(5_000.0, 0.0, 0.0), 0.0);
        assert_eq!(profit_rate(5_000.0, -3_000.0, 3_000.0), 0.0);
        assert_eq!(profit_rate(f64::NAN, 100.0, 0.0), 0.0);
        assert!(profit_rate(1e308, 1e-300, 0.0).is_finite());
    }

    #[test]
    fn risk_rounds_half_up() {
        assert_eq!(risk_reward(3_000.0, 1_235.0), 3_124.0);
        assert_eq!(risk_reward(3_000.0, 1_245.0), 3_125.0);
    }

    #[test]
    fn enrichment_keeps_excluded_cards() {
        let cards = vec![card(8_000.0, 10_500.0), card(5_000.0, 40_000.0)];
        let enriched = enrich_cards(&cards);
        assert_eq!(enriched.len(), 2);
        assert!(enriched[0].profit.is_none());
        assert!(enriched[1].profit.is_some());
    }
}
