use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use card_grading_scanner::config::AppConfig;
use card_grading_scanner::domain::{
    DisplayMode, FilterCriteria, PriceField, SortKey, SortSpec, ViewState,
};
use card_grading_scanner::infra::cards_api::CardsClient;
use card_grading_scanner::ui::console;
use card_grading_scanner::util::persistence::{load_preferences, save_preferences};
use card_grading_scanner::util::version::{version_label, APP_NAME};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PriceFieldArg {
    Purchase,
    Psa10,
}

impl From<PriceFieldArg> for PriceField {
    fn from(value: PriceFieldArg) -> Self {
        match value {
            PriceFieldArg::Purchase => PriceField::Purchase,
            PriceFieldArg::Psa10 => PriceField::Psa10,
        }
    }
}

/// Which raw cards are worth sending to PSA.
#[derive(Debug, Parser)]
#[command(name = "card_grading_scanner", version, about)]
struct Args {
    /// Substring matched against name, card number and list number
    #[arg(long)]
    keyword: Option<String>,

    /// Only cards the shop has in stock
    #[arg(long)]
    in_stock: bool,

    /// Only cards with positive net profit after misc expenses
    #[arg(long)]
    profitable_only: bool,

    /// Minimum profit rate in percent; 0 or empty disables the floor
    #[arg(long)]
    min_rate: Option<String>,

    #[arg(long)]
    price_min: Option<f64>,

    #[arg(long)]
    price_max: Option<f64>,

    /// Price the min/max bounds apply to
    #[arg(long, value_enum)]
    price_field: Option<PriceFieldArg>,

    /// Per-card expenses (shipping, supplies) subtracted from net profit
    #[arg(long)]
    misc: Option<f64>,

    /// Sort key, e.g. profit, rate, monthly, fee, risk, name, psa10, purchase, stock
    #[arg(long, value_parser = parse_sort_key)]
    sort: Option<SortKey>,

    #[arg(long, conflicts_with = "desc")]
    asc: bool,

    #[arg(long)]
    desc: bool,

    /// Page to show in paged mode; out-of-range values are clamped
    #[arg(long, allow_negative_numbers = true)]
    page: Option<i64>,

    /// Grow a single list instead of paging
    #[arg(long)]
    mobile: bool,

    /// Simulate this many load-more triggers in mobile mode
    #[arg(long, default_value_t = 0)]
    load_more: u64,

    /// Use the on-disk snapshot only
    #[arg(long)]
    offline: bool,

    /// Persist the resulting filters and sort order
    #[arg(long)]
    save: bool,
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    SortKey::from_name(value).ok_or_else(|| format!("unknown sort key `{value}`"))
}

fn init_tracing(directive: &str) {
    let (filter, rejected) = match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("info"), Some(err)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    if let Some(err) = rejected {
        warn!(directive, error = %err, "invalid log filter, using info");
    }
}

fn apply_args(view: &mut ViewState, args: &Args) {
    if args.mobile {
        view.set_mode(DisplayMode::Reveal);
    }

    view.update_criteria(|criteria: &mut FilterCriteria| {
        if let Some(keyword) = &args.keyword {
            criteria.keyword = keyword.clone();
        }
        if args.in_stock {
            criteria.in_stock_only = true;
        }
        if args.profitable_only {
            criteria.profitable_only = true;
        }
        if let Some(raw) = &args.min_rate {
            criteria.profit_rate_min = FilterCriteria::parse_rate_floor(raw);
        }
        if args.price_min.is_some() {
            criteria.price_min = args.price_min;
        }
        if args.price_max.is_some() {
            criteria.price_max = args.price_max;
        }
        if let Some(field) = args.price_field {
            criteria.price_field = field.into();
        }
        if let Some(misc) = args.misc {
            criteria.misc_expenses = misc;
        }
    });

    let mut sort = match args.sort {
        Some(key) => SortSpec::for_key(key),
        None => view.sort(),
    };
    if args.asc {
        sort.descending = false;
    } else if args.desc {
        sort.descending = true;
    }
    view.set_sort(sort);
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_issues) = AppConfig::from_env();
    init_tracing(&config.log_filter);
    for issue in &config_issues {
        issue.log();
    }
    info!(app = APP_NAME, version = %version_label(), api = %config.api_url, "starting");

    let mut view = ViewState::default();
    if let Some(preferences) = load_preferences() {
        view.apply_persisted(preferences);
    }
    apply_args(&mut view, &args);

    let client = CardsClient::with_base_url(&config.api_url)
        .context("invalid card API url")?
        .with_ttl(config.cache_ttl);

    let payload = if args.offline {
        client
            .offline_snapshot()
            .context("no card snapshot available for offline use")?
    } else {
        client.get_cards().await.context("failed to load cards")?
    };
    info!(
        cards = payload.data.len(),
        status = payload.status.label(),
        "card list ready"
    );
    let raw = payload.data;

    // Page and load-more positions depend on the filtered count.
    let filtered = view.refresh(&raw).stats.filtered;
    if let Some(page) = args.page {
        view.jump_to_page(page, filtered);
    }
    for trigger in 1..=args.load_more {
        if !view.load_more(trigger, filtered) {
            break;
        }
    }

    let output = view.refresh(&raw);
    print!(
        "{}",
        console::render(&output, view.sort(), view.criteria().misc_expenses())
    );

    if args.save {
        match save_preferences(&view.to_persisted()) {
            Ok(path) => info!(path = %path.display(), "preferences saved"),
            Err(err) => warn!(error = %err, "could not save preferences"),
        }
    }

    Ok(())
}
