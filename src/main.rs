//! `screener` command line front end

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use parking_lot::Mutex;
use screener_dashboard::api::types::{Base, EntityType};
use screener_dashboard::config::Config;
use screener_dashboard::error::{AppError, ErrorResponse};
use screener_dashboard::services::{
    Asset, AuthService, DetailService, InsiderService, PreferencesService, ScreenerService, Timeframe,
    WatchlistService,
};
use screener_dashboard::state::AppState;
use screener_dashboard::table::format;
use screener_dashboard::table::render::{page_footer, render_table};
use screener_dashboard::table::{parse_bound, DateRange, FetchOutcome, SortDescriptor, SortDirection, TableView};
use screener_dashboard::views::alerts::group_by_date;
use screener_dashboard::views::ViewKind;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "screener")]
#[command(version)]
#[command(about = "Stock, crypto and insider-trading screener", long_about = None)]
struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session
    Login { email: String, password: String },
    /// Create an account and log in
    Register { email: String, password: String },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Stock screener
    Stocks {
        #[arg(long, value_enum, default_value_t = StockMarket::Us)]
        market: StockMarket,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Crypto screener
    Crypto {
        /// usd or btc
        #[arg(long, default_value = "usd")]
        base: Base,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Crypto Fibonacci retracement levels
    Fibonacci {
        /// usd, eth or btc
        #[arg(long, default_value = "usd")]
        base: Base,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Alert feeds
    Alerts {
        #[arg(long, value_enum, default_value_t = AlertMarket::Us)]
        market: AlertMarket,
        /// Crypto alerts only: usd, eth or btc
        #[arg(long, default_value = "usd")]
        base: Base,
        /// Only symbols on the watchlist
        #[arg(long)]
        watchlist_only: bool,
        /// Alert type to keep (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,
        #[command(flatten)]
        table: TableArgs,
    },
    /// US insider trading
    Insider {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Purchase statistics of one insider
    InsiderStats { name: String },
    /// Price history and indicators
    History {
        #[arg(value_enum)]
        asset: AssetArg,
        symbol: String,
        #[arg(long, default_value = "usd")]
        base: Base,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Heikin-Ashi candles of a crypto symbol
    HeikinAshi {
        symbol: String,
        #[arg(long, default_value = "usd")]
        base: Base,
        /// 3d or 2w
        #[arg(long, default_value = "3d")]
        timeframe: Timeframe,
    },
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },
}

#[derive(Subcommand, Debug)]
enum WatchlistAction {
    List,
    Add { entity_type: EntityType, symbol: String },
    Remove { entity_type: EntityType, symbol: String },
    /// Symbols separated by commas or whitespace
    BulkAdd { entity_type: EntityType, symbols: Vec<String> },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum StockMarket {
    Us,
    In,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AlertMarket {
    Us,
    Crypto,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum AssetArg {
    Us,
    In,
    Crypto,
}

#[derive(Args, Debug, Default)]
struct TableArgs {
    /// Reference date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    page: Option<usize>,
    #[arg(long)]
    page_size: Option<usize>,
    /// Column to sort by
    #[arg(long)]
    sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    desc: bool,
    /// Lower bound, `column=value` (repeatable)
    #[arg(long, value_name = "COL=V")]
    min: Vec<String>,
    /// Upper bound, `column=value` (repeatable)
    #[arg(long, value_name = "COL=V")]
    max: Vec<String>,
    /// Substring filter, `column=value` (repeatable)
    #[arg(long, value_name = "COL=V")]
    text: Vec<String>,
    /// Category value to keep, `column=value` (repeatable)
    #[arg(long, value_name = "COL=V")]
    choice: Vec<String>,
    /// Column to hide (repeatable)
    #[arg(long)]
    hide: Vec<String>,
    /// Remember filters, hidden columns and page size for this view
    #[arg(long)]
    save: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    screener_dashboard::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;
    let state = AppState::new(config).context("Failed to initialize application state")?;

    if let Err(e) = AuthService::restore_session(&state).await {
        tracing::warn!("Could not restore session: {}", e);
    }

    if let Err(err) = run(&state, cli.command, cli.json).await {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&err))?);
        } else {
            eprintln!("{}", err.user_message());
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(state: &AppState, command: Command, json: bool) -> Result<(), AppError> {
    match command {
        Command::Login { email, password } => {
            let profile = AuthService::login(state, &email, &password).await?;
            print_value(json, &profile, || format!("Logged in as {}", profile.email.as_deref().unwrap_or(email.as_str())))?;
        }
        Command::Register { email, password } => {
            let profile = AuthService::register(state, &email, &password).await?;
            print_value(json, &profile, || format!("Registered {}", profile.email.as_deref().unwrap_or(email.as_str())))?;
        }
        Command::Logout => {
            AuthService::logout(state)?;
            print_value(json, &json!({"success": true}), || "Logged out".to_string())?;
        }
        Command::Whoami => {
            let profile = AuthService::current_user(state).ok_or_else(|| AppError::Auth("Not logged in".to_string()))?;
            print_value(json, &profile, || {
                profile.email.clone().unwrap_or_else(|| "(no email)".to_string())
            })?;
        }
        Command::Stocks { market, table } => {
            let kind = match market {
                StockMarket::Us => ViewKind::UsStocks,
                StockMarket::In => ViewKind::InStocks,
            };
            run_table(state, kind, table, json, |_| Ok(())).await?;
        }
        Command::Crypto { base, table } => {
            run_table(state, ViewKind::Crypto(base), table, json, |_| Ok(())).await?;
        }
        Command::Fibonacci { base, table } => {
            run_table(state, ViewKind::Fibonacci(base), table, json, |_| Ok(())).await?;
        }
        Command::Alerts {
            market,
            base,
            watchlist_only,
            types,
            table,
        } => {
            let kind = match market {
                AlertMarket::Us => ViewKind::StockAlerts {
                    watch_list_only: watchlist_only,
                },
                AlertMarket::Crypto => ViewKind::CryptoAlerts(base),
            };
            run_table(state, kind, table, json, |view| {
                view.edit(|filters| {
                    for alert_type in &types {
                        filters.select_choice("alerts", alert_type);
                    }
                });
                Ok(())
            })
            .await?;
        }
        Command::Insider { start, end, table } => {
            run_table(state, ViewKind::InsiderTrades, table, json, |view| {
                if let (Some(start), Some(end)) = (start, end) {
                    view.set_range(Some(DateRange::new(start, end)));
                } else if start.is_some() || end.is_some() {
                    return Err(AppError::Validation("--start and --end must be given together".to_string()));
                }
                Ok(())
            })
            .await?;
        }
        Command::InsiderStats { name } => {
            let stats = InsiderService::stats(state, &name).await?;
            let summary = stats.summary();
            print_value(json, &stats, || {
                let mut out = format!(
                    "{}\nTotal purchases:   {}\n1-month win rate:  {}\n3-month win rate:  {}\nAvg 1-month return: {}\nAvg 3-month return: {}\n",
                    name,
                    summary.total_purchases,
                    format::win_rate(summary.one_month_wins, summary.total_purchases),
                    format::win_rate(summary.three_month_wins, summary.total_purchases),
                    optional(summary.avg_one_month_return, format::percentage),
                    optional(summary.avg_three_month_return, format::percentage),
                );
                if !stats.transactions.is_empty() {
                    let view = ViewKind::InsiderTrades.open();
                    out.push('\n');
                    out.push_str(&render_table(&view.visible_columns(), &stats.transactions));
                }
                out
            })?;
        }
        Command::History {
            asset,
            symbol,
            base,
            start,
            end,
        } => {
            let asset = match asset {
                AssetArg::Us => Asset::UsStock,
                AssetArg::In => Asset::InStock,
                AssetArg::Crypto => Asset::Crypto(base),
            };
            let range = match (start, end) {
                (Some(start), Some(end)) => Some(DateRange::new(start, end)),
                (None, None) => None,
                _ => return Err(AppError::Validation("--start and --end must be given together".to_string())),
            };
            let data = DetailService::historical(state, asset, &symbol, range).await?;
            print_value(json, &data, || {
                let mut out = format!("{}\n", data.name().unwrap_or(symbol.as_str()));
                for point in data.points() {
                    out.push_str(&format!(
                        "{}  close {}  ema {}\n",
                        point.datetime,
                        optional(point.close, format::number),
                        optional(point.ema, format::number),
                    ));
                }
                out
            })?;
        }
        Command::HeikinAshi {
            symbol,
            base,
            timeframe,
        } => {
            let data = DetailService::heikin_ashi(state, &symbol, base, timeframe).await?;
            print_value(json, &data, || {
                let mut out = String::new();
                for candle in &data.ha_data {
                    out.push_str(&format!(
                        "{}  {}  open {}  close {}  body {}..{}\n",
                        candle.datetime,
                        if candle.is_bullish() { "bull" } else { "bear" },
                        format::price(candle.ha_open, base),
                        format::price(candle.ha_close, base),
                        format::price(candle.body_bottom(), base),
                        format::price(candle.body_top(), base),
                    ));
                }
                for change in &data.color_changes {
                    out.push_str(&format!("{}  turned {}\n", change.datetime, change.kind));
                }
                out
            })?;
        }
        Command::Watchlist { action } => run_watchlist(state, action, json).await?,
    }

    Ok(())
}

async fn run_watchlist(state: &AppState, action: WatchlistAction, json: bool) -> Result<(), AppError> {
    match action {
        WatchlistAction::List => {
            let entries = WatchlistService::refresh(state).await?;
            print_value(json, &entries, || {
                entries
                    .iter()
                    .map(|e| format!("{:<10} {}\n", e.entity_type.as_str(), e.symbol))
                    .collect()
            })?;
        }
        WatchlistAction::Add { entity_type, symbol } => {
            let symbol = symbol.trim().to_uppercase();
            WatchlistService::add(state, entity_type, &symbol).await?;
            print_value(json, &json!({"success": true}), || format!("Added {} to your watchlist", symbol))?;
        }
        WatchlistAction::Remove { entity_type, symbol } => {
            let symbol = symbol.trim().to_uppercase();
            WatchlistService::remove(state, entity_type, &symbol).await?;
            print_value(json, &json!({"success": true}), || format!("Removed {} from your watchlist", symbol))?;
        }
        WatchlistAction::BulkAdd { entity_type, symbols } => {
            let result = WatchlistService::bulk_add(state, entity_type, &symbols.join(" ")).await;
            print_value(json, &result, || {
                let mut out = if result.success.is_empty() {
                    "No symbols were added to your watchlist\n".to_string()
                } else {
                    format!(
                        "Successfully added {} symbol{} to your watchlist\n",
                        result.success.len(),
                        if result.success.len() > 1 { "s" } else { "" }
                    )
                };
                for failure in &result.failures {
                    out.push_str(&format!("  {}: {}\n", failure.symbol, failure.reason));
                }
                out
            })?;
        }
    }
    Ok(())
}

/// Open a view, apply the command line state, fetch once and print
async fn run_table<F>(state: &AppState, kind: ViewKind, args: TableArgs, json: bool, customize: F) -> Result<(), AppError>
where
    F: FnOnce(&mut TableView) -> Result<(), AppError>,
{
    let mut view = ScreenerService::open(state, kind)?;
    apply_args(&mut view, &args)?;
    customize(&mut view)?;
    view.apply();
    if let Some(page) = args.page {
        view.set_page(page);
    }

    let view = Mutex::new(view);
    if let FetchOutcome::Failed(message) = ScreenerService::refresh(state, &view).await {
        return Err(AppError::Fetch(message));
    }
    let view = view.into_inner();

    if args.save {
        PreferencesService::save(state, &view)?;
    }

    let rows = view.visible_rows();
    if json {
        let window = view.state().window();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "view": view.config().name,
                "page": window.page,
                "pageSize": window.page_size,
                "totalPages": view.total_pages(),
                "totalCount": view.total_count(),
                "data": rows,
            }))?
        );
        return Ok(());
    }

    println!("{}", view.config().title);
    let columns = view.visible_columns();
    if matches!(kind, ViewKind::StockAlerts { .. } | ViewKind::CryptoAlerts(_)) {
        for group in group_by_date(&rows) {
            let heading = group
                .date
                .map(|d| d.format("%A, %B %-d, %Y").to_string())
                .unwrap_or_else(|| "Undated".to_string());
            println!("\n{}\n{}", heading, render_table(&columns, &group.rows));
        }
    } else {
        print!("{}", render_table(&columns, &rows));
    }
    println!("{}", page_footer(view.state().window().page, view.total_pages(), view.total_count()));
    Ok(())
}

fn apply_args(view: &mut TableView, args: &TableArgs) -> Result<(), AppError> {
    if let Some(date) = args.date {
        view.set_date(Some(date));
    }
    if let Some(size) = args.page_size {
        view.set_page_size(size);
    }
    if let Some(key) = &args.sort {
        if view.config().column(key).is_none() {
            return Err(AppError::Validation(format!("Unknown column '{}'", key)));
        }
        let direction = if args.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        view.set_sort(SortDescriptor::by(key, direction));
    }
    for key in &args.hide {
        view.hide_column(key);
    }

    let mins = parse_pairs(&args.min)?;
    let maxs = parse_pairs(&args.max)?;
    let texts = parse_pairs(&args.text)?;
    let choices = parse_pairs(&args.choice)?;

    let mut bounds = Vec::new();
    for (key, raw, is_min) in mins
        .iter()
        .map(|(k, v)| (k, v, true))
        .chain(maxs.iter().map(|(k, v)| (k, v, false)))
    {
        bounds.push((key.clone(), parse_bound(key, raw)?, is_min));
    }

    view.edit(|filters| {
        for (key, value, is_min) in &bounds {
            if *is_min {
                filters.set_min(key, Some(*value));
            } else {
                filters.set_max(key, Some(*value));
            }
        }
        for (key, value) in &texts {
            filters.set_text(key, value);
        }
        for (key, value) in &choices {
            filters.select_choice(key, value);
        }
    });

    Ok(())
}

/// `column=value` pairs
fn parse_pairs(raw: &[String]) -> Result<Vec<(String, String)>, AppError> {
    raw.iter()
        .map(|item| {
            item.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| AppError::Validation(format!("Expected column=value, got '{}'", item)))
        })
        .collect()
}

fn optional(value: Option<f64>, fmt: fn(f64) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| format::NOT_AVAILABLE.to_string())
}

fn print_value<T, F>(json: bool, value: &T, text: F) -> Result<(), AppError>
where
    T: serde::Serialize,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text().trim_end());
        println!();
    }
    Ok(())
}
