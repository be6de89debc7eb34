//! Command line front end for tickerscope.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use std::path::PathBuf;
use tickerscope::{
    CompiledDataset, CompilerConfig, DataFrequency, DatasetCompiler, DatasetSummary,
    EarningsCalendarEntry, MarketMover, MarketMovers, OutputSize, SqliteWatchlist, Symbol,
    WatchlistStore,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tickerscope", about = "Per-ticker market data from Alpha Vantage", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Alpha Vantage API key (overrides the configured one)
    #[arg(long, env = "ALPHA_VANTAGE_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Compile datasets for one or more tickers
    Compile {
        /// Ticker symbols
        #[arg(required = true)]
        tickers: Vec<String>,

        #[command(flatten)]
        options: CompileOptions,
    },

    /// Manage the saved watchlist
    Watchlist {
        #[command(subcommand)]
        command: WatchlistCommand,
    },

    /// Show today's top gainers, top losers and most active tickers
    Movers {
        /// Rows per list
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        output: MarketOptions,
    },

    /// Show upcoming earnings reports
    Calendar {
        /// Restrict to one ticker
        ticker: Option<String>,

        #[command(flatten)]
        output: MarketOptions,
    },
}

#[derive(clap::Args)]
struct MarketOptions {
    /// Print as JSON
    #[arg(long)]
    json: bool,

    /// Serve responses from JSON or CSV files in this directory
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

impl MarketOptions {
    fn compiler(&self, mut config: CompilerConfig) -> Result<DatasetCompiler> {
        if let Some(dir) = &self.fixtures {
            config.fixture_dir = Some(dir.clone());
        }
        Ok(DatasetCompiler::from_config(config)?)
    }
}

#[derive(Subcommand)]
enum WatchlistCommand {
    /// Add a ticker
    Add {
        /// Ticker symbol
        ticker: String,

        /// Free-text note
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Remove an entry by id
    Remove {
        /// Entry id, as shown by `list`
        id: i64,
    },

    /// List watched tickers
    List,

    /// Remove every entry
    Clear,

    /// Compile datasets for every watched ticker
    Compile {
        #[command(flatten)]
        options: CompileOptions,
    },
}

#[derive(clap::Args)]
struct CompileOptions {
    /// Print summaries as JSON
    #[arg(long)]
    json: bool,

    /// Fetch fundamentals concurrently
    #[arg(long)]
    parallel: bool,

    /// Time series granularity
    #[arg(long, value_enum)]
    frequency: Option<Granularity>,

    /// Only request the latest 100 bars
    #[arg(long)]
    compact: bool,

    /// Skip the BBANDS, STOCHRSI, STOCHF and APO requests
    #[arg(long)]
    no_advanced: bool,

    /// Serve responses from JSON files in this directory
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Granularity {
    #[value(name = "1min")]
    Minute,
    #[value(name = "5min")]
    FiveMinute,
    #[value(name = "15min")]
    FifteenMinute,
    #[value(name = "30min")]
    ThirtyMinute,
    #[value(name = "60min")]
    Hourly,
    Daily,
    DailyAdjusted,
    Weekly,
    Monthly,
}

impl From<Granularity> for DataFrequency {
    fn from(value: Granularity) -> Self {
        match value {
            Granularity::Minute => Self::Minute,
            Granularity::FiveMinute => Self::FiveMinute,
            Granularity::FifteenMinute => Self::FifteenMinute,
            Granularity::ThirtyMinute => Self::ThirtyMinute,
            Granularity::Hourly => Self::Hourly,
            Granularity::Daily => Self::Daily,
            Granularity::DailyAdjusted => Self::DailyAdjusted,
            Granularity::Weekly => Self::Weekly,
            Granularity::Monthly => Self::Monthly,
        }
    }
}

impl CompileOptions {
    fn apply(&self, mut config: CompilerConfig) -> CompilerConfig {
        config.parallel_fetch |= self.parallel;
        if let Some(frequency) = self.frequency {
            config.frequency = frequency.into();
        }
        if self.compact {
            config.output_size = OutputSize::Compact;
        }
        if self.no_advanced {
            config.advanced_indicators = false;
        }
        if let Some(dir) = &self.fixtures {
            config.fixture_dir = Some(dir.clone());
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "tickerscope=info,warn",
        1 => "tickerscope=debug,ticker_alphavantage=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;
    if let Some(key) = cli.api_key {
        config.compiler.api_key = key;
    }

    match cli.command {
        Command::Compile { tickers, options } => {
            let compiler = DatasetCompiler::from_config(options.apply(config.compiler))?;
            let symbols: Vec<Symbol> = tickers.iter().map(Symbol::new).collect();

            let mut results = std::pin::pin!(compiler.compile_stream(&symbols));
            while let Some(compiled) = results.next().await {
                print_compiled(&compiled, options.json)?;
            }
        }

        Command::Watchlist { command } => {
            if let Some(parent) = config.watchlist.db_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let store = SqliteWatchlist::new(&config.watchlist.db_path)?;
            run_watchlist(command, &store, config.compiler).await?;
        }

        Command::Movers { limit, output } => {
            let compiler = output.compiler(config.compiler)?;
            let movers = compiler.client().fetch_market_movers().await?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&movers)?);
            } else {
                print_movers(&movers, limit);
            }
        }

        Command::Calendar { ticker, output } => {
            let compiler = output.compiler(config.compiler)?;
            let symbol = ticker.map(Symbol::new);
            let entries = compiler
                .client()
                .fetch_earnings_calendar(symbol.as_ref())
                .await?;
            if output.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_calendar(&entries);
            }
        }
    }

    Ok(())
}

async fn run_watchlist(
    command: WatchlistCommand,
    store: &SqliteWatchlist,
    compiler_config: CompilerConfig,
) -> Result<()> {
    match command {
        WatchlistCommand::Add { ticker, notes } => {
            let entry = store.add(&Symbol::new(ticker), notes.as_deref()).await?;
            println!("{:>4}  {}", entry.id, entry.symbol);
        }

        WatchlistCommand::Remove { id } => {
            if store.remove(id).await? {
                println!("Removed entry {id}.");
            } else {
                println!("No entry with id {id}.");
            }
        }

        WatchlistCommand::List => {
            let entries = store.list().await?;
            if entries.is_empty() {
                println!("Watchlist is empty. Add one with `tickerscope watchlist add <TICKER>`.");
            }
            for entry in &entries {
                println!(
                    "{:>4}  {:<8} {}  {}",
                    entry.id,
                    entry.symbol.as_str(),
                    entry.date_added.format("%Y-%m-%d"),
                    entry.notes.as_deref().unwrap_or("")
                );
            }
        }

        WatchlistCommand::Clear => {
            let removed = store.clear().await?;
            println!("Removed {removed} entries.");
        }

        WatchlistCommand::Compile { options } => {
            let compiler = DatasetCompiler::from_config(options.apply(compiler_config))?;
            let compiled = compiler.compile_watchlist(store).await?;
            info!(count = compiled.len(), "Compiled watchlist");
            for dataset in &compiled {
                print_compiled(dataset, options.json)?;
            }
        }
    }
    Ok(())
}

fn print_compiled(compiled: &CompiledDataset, json: bool) -> Result<()> {
    let summary = compiled.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(s: &DatasetSummary) {
    let optional = |value: Option<f64>| value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"));

    println!("─────────────────────────────────");
    println!("  {}  {}", s.symbol, s.name);
    println!("─────────────────────────────────");
    println!("  Sector     : {} / {}", s.sector, s.industry);
    println!("  Price      : {} ({})", optional(s.price), s.change_percent);
    println!("  Market cap : {}", s.market_cap);
    println!("  P/E        : {}", s.pe_ratio);
    println!("  Float      : {}", s.float);
    println!(
        "  Ownership  : insiders {}, institutions {}",
        s.insider_ownership, s.institutional_ownership
    );
    match (s.first_date, s.last_date) {
        (Some(first), Some(last)) => {
            println!("  History    : {} rows, {first} to {last}", s.rows);
        }
        _ => println!("  History    : none"),
    }
    for (name, value) in &s.indicators {
        println!("  {name:<11}: {value:.4}");
    }
    for (name, value) in &s.metrics {
        println!("  {name:<11}: {value:.2}");
    }
    if let Some(supplementary) = &s.supplementary {
        println!(
            "  Volume     : {} (avg {}, {})",
            supplementary.current_volume, supplementary.average_volume, supplementary.relative_volume
        );
        println!("  Short float: {}", supplementary.short_float);
    }
    if let (Some(buys), Some(sells)) = (s.insider_buys, s.insider_sells) {
        println!(
            "  Insiders   : {buys} buys, {sells} sells (ratio {})",
            s.insider_buy_sell_ratio
        );
    }
    for warning in &s.warnings {
        println!("  warning    : {} ({:?}): {}", warning.resource, warning.kind, warning.message);
    }
    if let Some(error) = &s.error {
        println!("  error      : {error}");
    }
}

fn print_movers(movers: &MarketMovers, limit: usize) {
    let lists: [(&str, &[MarketMover]); 3] = [
        ("Top gainers", movers.top_gainers.as_slice()),
        ("Top losers", movers.top_losers.as_slice()),
        ("Most active", movers.most_actively_traded.as_slice()),
    ];
    if let Some(updated) = &movers.last_updated {
        println!("As of {updated}");
    }
    for (title, list) in lists {
        println!("\n  {title}");
        for mover in list.iter().take(limit) {
            let price = mover.price.map_or_else(|| "N/A".to_string(), |p| format!("{p:.2}"));
            println!(
                "  {:<8} {:>10} {:>8} {:>9} {:>10}",
                mover.ticker.as_str(),
                price,
                mover.change_formatted.to_string(),
                mover.change_pct_formatted.to_string(),
                mover.volume_formatted.to_string()
            );
        }
    }
}

fn print_calendar(entries: &[EarningsCalendarEntry]) {
    if entries.is_empty() {
        println!("No upcoming earnings reports.");
    }
    for entry in entries {
        let date = entry
            .report_date
            .map_or_else(|| "N/A".to_string(), |d| d.to_string());
        let estimate = entry
            .estimate
            .map_or_else(|| "N/A".to_string(), |e| format!("{e:.2}"));
        println!(
            "  {date}  {:<8} {:>8} {}  {}",
            entry.symbol.as_str(),
            estimate,
            entry.currency.as_deref().unwrap_or(""),
            entry.name
        );
    }
}
