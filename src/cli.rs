//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    BACKTEST_SECTION, parse_date, read_initial_capital, strategy_from_config,
    validate_backtest_config,
};
use crate::domain::error::BacktesterError;
use crate::domain::price::PriceSeries;
use crate::domain::strategy::Strategy;
use crate::domain::sweep::{ma_crossover_grid, run_sweep};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_REPORT_DIR: &str = "report";

#[derive(Parser, Debug)]
#[command(name = "backtester", about = "Single-instrument trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Separate INI file holding the [strategy] section
        #[arg(short, long)]
        strategy: Option<PathBuf>,
        /// Report directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a strategy configuration
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
    /// Show the stored data range for a ticker
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List tickers available in the data directory
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Run a moving average crossover parameter grid in parallel
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Short windows, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        short: Vec<usize>,
        /// Long windows, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        long: Vec<usize>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            strategy,
            output,
            ticker,
            data_dir,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, strategy.as_deref(), ticker.as_deref())
            } else {
                run_backtest(
                    &config,
                    strategy.as_deref(),
                    output.as_deref(),
                    ticker.as_deref(),
                    data_dir.as_deref(),
                )
            }
        }
        Command::Validate { strategy } => run_validate(&strategy),
        Command::Info {
            config,
            ticker,
            data_dir,
        } => run_info(&config, ticker.as_deref(), data_dir.as_deref()),
        Command::ListTickers { config, data_dir } => run_list_tickers(&config, data_dir.as_deref()),
        Command::Sweep {
            config,
            ticker,
            data_dir,
            short,
            long,
        } => run_sweep_command(&config, ticker.as_deref(), data_dir.as_deref(), &short, &long),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BacktesterError> {
    FileConfigAdapter::from_file(path).map_err(|e| BacktesterError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Strategy from a dedicated strategy file when given, otherwise from the main config.
pub fn load_strategy(
    config: &dyn ConfigPort,
    strategy_path: Option<&Path>,
) -> Result<Strategy, BacktesterError> {
    match strategy_path {
        Some(path) => {
            eprintln!("Loading strategy from {}", path.display());
            strategy_from_config(&load_config(path)?)
        }
        None => strategy_from_config(config),
    }
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    ticker_override: Option<&str>,
) -> Result<BacktestConfig, BacktesterError> {
    let start_date = parse_date(
        adapter.get_string(BACKTEST_SECTION, "start_date").as_deref(),
        "start_date",
    )?;
    let end_date = parse_date(
        adapter.get_string(BACKTEST_SECTION, "end_date").as_deref(),
        "end_date",
    )?;

    Ok(BacktestConfig {
        ticker: resolve_ticker(adapter, ticker_override)?,
        start_date,
        end_date,
        initial_capital: read_initial_capital(adapter)?,
    })
}

pub fn resolve_ticker(
    adapter: &dyn ConfigPort,
    ticker_override: Option<&str>,
) -> Result<String, BacktesterError> {
    ticker_override
        .map(str::to_string)
        .or_else(|| adapter.get_string(BACKTEST_SECTION, "ticker"))
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BacktesterError::ConfigMissing {
            section: BACKTEST_SECTION.into(),
            key: "ticker".into(),
        })
}

pub fn resolve_data_dir(adapter: &dyn ConfigPort, override_dir: Option<&Path>) -> PathBuf {
    override_dir
        .map(Path::to_path_buf)
        .or_else(|| {
            adapter
                .get_string(BACKTEST_SECTION, "data_dir")
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn load_prices(
    data_port: &dyn PriceDataPort,
    bt_config: &BacktestConfig,
) -> Result<PriceSeries, BacktesterError> {
    let bars = data_port.fetch_prices(&bt_config.ticker, bt_config.start_date, bt_config.end_date)?;
    PriceSeries::new(bars)
}

fn run_backtest(
    config_path: &Path,
    strategy_path: Option<&Path>,
    output_path: Option<&Path>,
    ticker_override: Option<&str>,
    data_dir_override: Option<&Path>,
) -> Result<(), BacktesterError> {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    let bt_config = build_backtest_config(&adapter, ticker_override)?;

    // Stage 2: Strategy
    let strategy = load_strategy(&adapter, strategy_path)?;
    eprintln!("Loading strategy: {}", strategy);

    // Stage 3: Data, simulation, report
    let data_port = CsvAdapter::new(resolve_data_dir(&adapter, data_dir_override));
    let output = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR));

    run_backtest_pipeline(&data_port, &CsvReportAdapter::new(), &strategy, &bt_config, &output)?;
    Ok(())
}

/// Load prices, run the backtest, print the summary and write the report.
pub fn run_backtest_pipeline(
    data_port: &dyn PriceDataPort,
    report_port: &dyn ReportPort,
    strategy: &Strategy,
    bt_config: &BacktestConfig,
    output_path: &Path,
) -> Result<BacktestResult, BacktesterError> {
    let prices = load_prices(data_port, bt_config)?;

    eprintln!(
        "Running backtest: {} from {} to {} ({} bars)",
        bt_config.ticker,
        prices.first_date(),
        prices.last_date(),
        prices.len(),
    );

    let result = backtest_engine::run_backtest(&prices, strategy, bt_config)?;
    print_summary(&result, bt_config);

    report_port.write(&result, bt_config, output_path)?;
    eprintln!("\nReport written to: {}", output_path.display());
    Ok(result)
}

fn print_summary(result: &BacktestResult, bt_config: &BacktestConfig) {
    let summary = &result.summary;

    let fills: Vec<_> = result
        .portfolio
        .iter()
        .filter_map(|r| r.fill.map(|f| (r.date, f)))
        .collect();
    if !fills.is_empty() {
        eprintln!("\n=== Trades ===");
        for (date, fill) in &fills {
            eprintln!(
                "  {}  {} {} shares at {:.2}",
                date, fill.side, fill.shares, fill.price
            );
        }
    }

    eprintln!("\n=== Results: {} ({}) ===", bt_config.ticker, result.strategy);
    eprintln!("Initial Capital:  {:.2}", summary.initial_capital);
    eprintln!("Final Value:      {:.2}", summary.final_value);
    eprintln!("Total Return:     {:.2}%", summary.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", summary.annualized_return * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", summary.max_drawdown * 100.0);
    eprintln!("Trades:           {}", summary.trade_count);
}

pub fn run_dry_run(
    config_path: &Path,
    strategy_path: Option<&Path>,
    ticker_override: Option<&str>,
) -> Result<(), BacktesterError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    let bt_config = build_backtest_config(&adapter, ticker_override)?;
    let strategy = load_strategy(&adapter, strategy_path)?;
    eprintln!("Config validated successfully");

    eprintln!("\nStrategy: {}", strategy);
    eprintln!("  kind:    {}", strategy.kind());
    eprintln!("  warmup:  {} bars", strategy.warmup_bars());

    let indicators = strategy.indicator_types();
    if !indicators.is_empty() {
        eprintln!("\nIndicators to compute:");
        for indicator in &indicators {
            eprintln!("  {}", indicator);
        }
    }

    eprintln!("\nBacktest:");
    eprintln!("  ticker:  {}", bt_config.ticker);
    eprintln!("  period:  {} to {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  capital: {:.2}", bt_config.initial_capital);

    eprintln!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_validate(strategy_path: &Path) -> Result<(), BacktesterError> {
    eprintln!("Validating strategy: {}", strategy_path.display());
    let adapter = load_config(strategy_path)?;
    let strategy = strategy_from_config(&adapter)?;

    eprintln!("\nStrategy: {}", strategy);
    for indicator in strategy.indicator_types() {
        eprintln!("  uses {}", indicator);
    }
    eprintln!("  needs at least {} bars", strategy.warmup_bars());
    eprintln!("\nStrategy is valid");
    Ok(())
}

fn run_info(
    config_path: &Path,
    ticker_override: Option<&str>,
    data_dir_override: Option<&Path>,
) -> Result<(), BacktesterError> {
    let adapter = load_config(config_path)?;
    let ticker = resolve_ticker(&adapter, ticker_override)?;
    let data_port = CsvAdapter::new(resolve_data_dir(&adapter, data_dir_override));

    match data_port.get_data_range(&ticker)? {
        Some((first, last, count)) => {
            println!("{}: {} to {} ({} bars)", ticker, first, last, count);
        }
        None => eprintln!("No data found for {}", ticker),
    }
    Ok(())
}

fn run_list_tickers(
    config_path: &Path,
    data_dir_override: Option<&Path>,
) -> Result<(), BacktesterError> {
    let adapter = load_config(config_path)?;
    let data_dir = resolve_data_dir(&adapter, data_dir_override);
    let tickers = CsvAdapter::new(data_dir.clone()).list_tickers()?;

    if tickers.is_empty() {
        eprintln!("No tickers found in {}", data_dir.display());
    } else {
        for ticker in &tickers {
            println!("{}", ticker);
        }
        eprintln!("{} tickers found", tickers.len());
    }
    Ok(())
}

fn run_sweep_command(
    config_path: &Path,
    ticker_override: Option<&str>,
    data_dir_override: Option<&Path>,
    short_windows: &[usize],
    long_windows: &[usize],
) -> Result<(), BacktesterError> {
    let adapter = load_config(config_path)?;
    validate_backtest_config(&adapter)?;
    let bt_config = build_backtest_config(&adapter, ticker_override)?;

    let data_port = CsvAdapter::new(resolve_data_dir(&adapter, data_dir_override));
    let prices = load_prices(&data_port, &bt_config)?;

    let mut strategies = Vec::new();
    for candidate in ma_crossover_grid(short_windows, long_windows) {
        match candidate {
            Ok(strategy) => strategies.push(strategy),
            Err(e) => eprintln!("skipping: {e}"),
        }
    }

    eprintln!(
        "Sweeping {} strategies over {} ({} bars)",
        strategies.len(),
        bt_config.ticker,
        prices.len()
    );

    for outcome in run_sweep(&prices, &strategies, &bt_config) {
        match outcome.result {
            Ok(summary) => println!(
                "{:<36} total {:>8.2}%  annualized {:>7.2}%  drawdown -{:.1}%  trades {}",
                outcome.strategy.to_string(),
                summary.total_return * 100.0,
                summary.annualized_return * 100.0,
                summary.max_drawdown * 100.0,
                summary.trade_count,
            ),
            Err(e) => println!("{:<36} failed: {}", outcome.strategy.to_string(), e),
        }
    }
    Ok(())
}
