use std::{error::Error, fs::OpenOptions, path::PathBuf, sync::Arc};

use clap::Parser;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use paydash::{
    AnalyticsView, DashboardConfig, Dataset, FileRecordSource, PageRequest, Period, RecordSource,
    Session, TableView, ViewContext, ViewKey, chart_options,
};

/// Compute a dashboard view from exported records and print it as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing `<view>.json` or `<view>.csv` record files.
    #[arg(long)]
    data_dir: PathBuf,

    /// The view to compute, e.g. "transfers" or "wallet-flows".
    #[arg(long)]
    view: ViewKey,

    /// File path to a JSON dashboard config. The built-in config is used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Free-text search.
    #[arg(long, default_value = "")]
    search: String,

    /// Only show records with this status.
    #[arg(long, default_value = paydash::ALL_STATUSES)]
    status: String,

    /// How many days back to include. Defaults to the view's configured window.
    #[arg(long)]
    window_days: Option<u32>,

    /// The zero-based page to show.
    #[arg(long)]
    page: Option<usize>,

    /// Rows per page. Defaults to the configured page size.
    #[arg(long)]
    page_size: Option<usize>,

    /// Bucket records into a time series instead of showing a table.
    #[arg(long)]
    period: Option<Period>,

    /// Print ECharts options instead of the raw series. Implies a chart view.
    #[arg(long)]
    chart: bool,

    /// Canonical timezone for calendar dates, e.g. "Africa/Lagos". Overrides the config.
    #[arg(long)]
    timezone: Option<String>,

    /// Also write debug logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    setup_logging(args.log_file.as_ref())?;

    let config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    let view_config = config.view(args.view)?.clone();
    let timezone = args.timezone.as_deref().unwrap_or(&config.timezone);
    let context = ViewContext::now_in(timezone)?;

    let mut criteria = view_config
        .initial_criteria()
        .with_search(&args.search)
        .with_status(&args.status);
    if let Some(window_days) = args.window_days {
        criteria.window_days = window_days
            .try_into()
            .map_err(|_| paydash::Error::InvalidWindow)?;
    }

    let session = Session {
        user_id: "cli".to_owned(),
        business_id: "local".to_owned(),
    };
    let records = FileRecordSource::new(&args.data_dir).fetch_records(args.view, &session)?;
    let dataset = Dataset::new(records);

    let period = match (args.period, args.chart) {
        (Some(period), _) => Some(period),
        (None, true) => Some(view_config.default_period.unwrap_or(Period::Monthly)),
        (None, false) => None,
    };

    let output = match period {
        Some(period) => {
            let mut view = AnalyticsView::new(view_config, config.cache_capacity)?;
            let chart_view = view.recompute(Some(&dataset), &criteria, period, &context)?;

            if args.chart {
                chart_options(&chart_view, &format!("{} ({period})", args.view)).to_string()
            } else {
                serde_json::to_string_pretty(chart_view.as_ref())?
            }
        }
        None => {
            let mut page_state = config.pagination.initial_state()?;
            if let Some(page_size) = args.page_size {
                page_state.set_page_size(page_size)?;
            }
            if let Some(page) = args.page {
                page_state.set_page(page);
            }
            let page: PageRequest = page_state.request();

            let mut view = TableView::new(view_config, config.cache_capacity);
            let filtered_view = view.recompute(Some(&dataset), &criteria, page, &context)?;

            serde_json::to_string_pretty(&filtered_view)?
        }
    };

    println!("{output}");

    Ok(())
}

fn setup_logging(log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_filter(filter::LevelFilter::INFO);

    let debug_log = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(filter::LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(debug_log)
        .init();

    Ok(())
}
