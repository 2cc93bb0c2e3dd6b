//! Plain-text rendering of a pipeline result.

use std::fmt::Write as _;

use crate::domain::{
    AggregateStats, EnrichedCard, PipelineOutput, ProfitInfo, ProfitSummary, SortKey, SortSpec,
    WindowInfo,
};

const NAME_WIDTH: usize = 28;
const NUMBER_WIDTH: usize = 14;

pub fn render(output: &PipelineOutput, sort: SortSpec, misc_expenses: f64) -> String {
    let mut out = String::new();
    out.push_str(&render_stats(&output.stats));
    out.push('\n');

    if output.visible.is_empty() {
        out.push_str("No cards match the current filters.\n");
    } else {
        out.push_str(&render_header(sort));
        for item in &output.visible {
            out.push_str(&render_row(item, misc_expenses));
        }
    }

    if let Some(summary) = &output.summary {
        out.push_str(&render_summary(summary));
    }
    out.push_str(&render_window(&output.window));
    out
}

pub fn render_stats(stats: &AggregateStats) -> String {
    format!(
        "Cards: {} total | {} shown | {} below grading floor | {} profitable | {} in stock\n",
        stats.total, stats.filtered, stats.hidden_by_profit, stats.profitable, stats.in_stock
    )
}

fn render_header(sort: SortSpec) -> String {
    let label = |key: SortKey| {
        if sort.key == key {
            format!("{}{}", key.label(), sort.arrow())
        } else {
            key.label().to_string()
        }
    };

    let mut line = String::new();
    let _ = writeln!(
        line,
        "{:<name$} {:<num$} {:>10} {:>10} {:>12} {:>12} {:>8} {:>10} {:>9} {}",
        label(SortKey::Name),
        label(SortKey::CardNumber),
        label(SortKey::Psa10Price),
        label(SortKey::PurchasePrice),
        label(SortKey::GradingFee),
        label(SortKey::DisplayProfit),
        label(SortKey::ProfitRate),
        label(SortKey::MonthlyRate),
        label(SortKey::RiskReward),
        label(SortKey::Stock),
        name = NAME_WIDTH,
        num = NUMBER_WIDTH,
    );
    line
}

fn render_row(item: &EnrichedCard, misc_expenses: f64) -> String {
    let card = &item.card;
    let name = truncate(&card.name, NAME_WIDTH);
    let number = truncate(card.card_number.as_deref().unwrap_or("—"), NUMBER_WIDTH);

    let mut line = String::new();
    match &item.profit {
        Some(info) => {
            let _ = writeln!(
                line,
                "{:<name$} {:<num$} {:>10} {:>10} {:>12} {:>12} {:>8} {:>10} {:>9} {}",
                name,
                number,
                format_yen(info.psa10_price),
                format_yen(info.purchase_price),
                format_fee(info),
                format_signed_yen(info.display_net_profit(misc_expenses)),
                format_rate(Some(info.profit_rate)),
                format_rate(info.monthly_rate),
                format_yen(info.risk_reward),
                card.stock,
                name = NAME_WIDTH,
                num = NUMBER_WIDTH,
            );
        }
        None => {
            let _ = writeln!(
                line,
                "{:<name$} {:<num$} {:>10} {:>10} {:>12} {:>12} {:>8} {:>10} {:>9} {}",
                name,
                number,
                format_yen(card.psa10_price()),
                format_yen(card.purchase_price()),
                "—",
                "—",
                "—",
                "—",
                "—",
                card.stock,
                name = NAME_WIDTH,
                num = NUMBER_WIDTH,
            );
        }
    }
    line
}

fn render_summary(summary: &ProfitSummary) -> String {
    format!(
        "Net profit  avg {}  max {}  min {}\n",
        format_signed_yen(summary.average),
        format_signed_yen(summary.max),
        format_signed_yen(summary.min)
    )
}

pub fn render_window(window: &WindowInfo) -> String {
    match window {
        WindowInfo::Paged(nav) => {
            if !nav.is_needed() {
                return format!("{}\n", nav.summary());
            }
            let mut controls = Vec::new();
            if nav.can_skip_back {
                controls.push("-10");
            }
            if nav.can_prev {
                controls.push("prev");
            }
            if nav.can_next {
                controls.push("next");
            }
            if nav.can_skip_forward {
                controls.push("+10");
            }
            format!("{}  [{}]\n", nav.summary(), controls.join(" | "))
        }
        WindowInfo::Reveal {
            shown,
            total,
            has_more,
        } => {
            if *has_more {
                format!("Showing {shown} of {total} (load more available)\n")
            } else {
                format!("Showing {shown} of {total}\n")
            }
        }
    }
}

fn format_fee(info: &ProfitInfo) -> String {
    if info.is_express() {
        format!("{} (E)", format_yen(info.grading_fee))
    } else {
        format_yen(info.grading_fee)
    }
}

fn format_rate(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}%"),
        _ => "—".to_string(),
    }
}

/// `¥12,345`, rounded to whole yen.
pub fn format_yen(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let rounded = value.round();
    let digits = group_thousands(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("-¥{digits}")
    } else {
        format!("¥{digits}")
    }
}

/// Like [`format_yen`] with an explicit `+` on gains.
pub fn format_signed_yen(value: f64) -> String {
    if value.is_finite() && value.round() > 0.0 {
        format!("+{}", format_yen(value))
    } else {
        format_yen(value)
    }
}

fn group_thousands(value: u64) -> String {
    let raw = value.to_string();
    let mut grouped = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
