use gpfg_holdings::config::Config;
use gpfg_holdings::data_provider::HoldingsProvider;
use gpfg_holdings::models::holding::WatchEntry;
use gpfg_holdings::retry::{RetryPolicy, TokioSleeper};
use gpfg_holdings::scrapers::eastmoney::EastMoneyHkSource;
use gpfg_holdings::services::analysis_service::AnalysisService;
use gpfg_holdings::services::price_service::PriceService;
use gpfg_holdings::watchlist;

use anyhow::Context;
use clap::{App, Arg};
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let matches = App::new("gpfg-holdings")
        .version(env!("CARGO_PKG_VERSION"))
        .about("GPFG equity holding trends with year-end prices and implied share counts")
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory containing the yearly eq_<YYYY>1231.xlsx files")
                .takes_value(true)
                .default_value("datasets"),
        )
        .arg(
            Arg::with_name("output-dir")
                .long("output-dir")
                .value_name("DIR")
                .help("Directory the SVG charts are written to")
                .takes_value(true)
                .default_value("charts"),
        )
        .arg(
            Arg::with_name("start-year")
                .long("start-year")
                .value_name("YYYY")
                .help("First disclosure year to load")
                .takes_value(true)
                .default_value("2015"),
        )
        .arg(
            Arg::with_name("end-year")
                .long("end-year")
                .value_name("YYYY")
                .help("Last disclosure year to load")
                .takes_value(true)
                .default_value("2025"),
        )
        .arg(
            Arg::with_name("watchlist")
                .short('w')
                .long("watchlist")
                .value_name("FILE")
                .help("JSON list of {\"name\": ..., \"ticker\": ...} entries")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("full-watchlist")
                .long("full-watchlist")
                .help("Analyze the full built-in list of Chinese holdings")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("company")
                .short('c')
                .long("company")
                .value_name("NAME")
                .help("Analyze a single company (exact name as disclosed)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ticker")
                .short('t')
                .long("ticker")
                .value_name("CODE")
                .help("Hong Kong ticker for --company, e.g. 00700")
                .takes_value(true)
                .requires("company"),
        )
        .arg(
            Arg::with_name("max-retries")
                .long("max-retries")
                .value_name("N")
                .help("Maximum price fetch attempts per ticker")
                .takes_value(true)
                .default_value("3"),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Timeout for each price request")
                .takes_value(true)
                .default_value("30"),
        )
        .arg(
            Arg::with_name("no-chart")
                .long("no-chart")
                .help("Print reports only, do not write SVG charts")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("list-companies")
                .long("list-companies")
                .value_name("FILTER")
                .help("List company names containing FILTER (case-insensitive) and exit")
                .takes_value(true)
                .min_values(0),
        )
        .get_matches();

    let start_year = matches.value_of("start-year").unwrap_or("2015")
        .parse::<i32>().context("invalid --start-year")?;
    let end_year = matches.value_of("end-year").unwrap_or("2025")
        .parse::<i32>().context("invalid --end-year")?;
    let max_retries = matches.value_of("max-retries").unwrap_or("3")
        .parse::<u32>().context("invalid --max-retries")?;
    let timeout_secs = matches.value_of("timeout").unwrap_or("30")
        .parse::<u64>().context("invalid --timeout")?;

    // 创建配置
    let config = Config::new()
        .with_data_dir(matches.value_of("data-dir").unwrap_or("datasets"))
        .with_output_dir(matches.value_of("output-dir").unwrap_or("charts"))
        .with_years(start_year, end_year)
        .with_max_retries(max_retries)
        .with_request_timeout(Duration::from_secs(timeout_secs))
        .with_write_charts(!matches.is_present("no-chart"));

    // 校验年份区间
    config.price_window()?;

    // 基础数据加载失败时整个批次无法继续
    let provider = HoldingsProvider::load_from_dir(&config.data_dir, &config.years())
        .with_context(|| format!("failed to load holdings from {}", config.data_dir))?;

    if matches.is_present("list-companies") {
        let filter = matches.value_of("list-companies").unwrap_or("");
        let names = provider.search_companies(filter);
        for name in &names {
            println!("{}", name);
        }
        info!("{} companies match '{}'", names.len(), filter);
        return Ok(());
    }

    let entries: Vec<WatchEntry> = if let Some(company) = matches.value_of("company") {
        vec![WatchEntry::new(company, matches.value_of("ticker"))]
    } else if let Some(path) = matches.value_of("watchlist") {
        watchlist::load_watchlist(Path::new(path))?
    } else if matches.is_present("full-watchlist") {
        watchlist::full_watchlist()
    } else {
        watchlist::default_watchlist()
    };

    let source = EastMoneyHkSource::new(config.request_timeout)?;
    info!("Using request timeout {:?}, up to {} attempts per ticker", config.request_timeout, config.max_retries);

    let price_service = PriceService::new(
        Arc::new(source),
        Arc::new(TokioSleeper),
        RetryPolicy::new(config.max_retries),
    );
    let service = AnalysisService::new(config, price_service);

    let summary = service.run_batch(&provider, &entries).await?;
    for report in &summary.reports {
        if let Some(path) = &report.chart_path {
            info!("{}: {}", report.entry.name, path.display());
        }
    }

    Ok(())
}
