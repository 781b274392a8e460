mod file_source;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dashboard_aggregator::{Aggregator, DashboardSource, HttpDashboardSource};
use dashboard_core::{DashboardConfig, DashboardSnapshot};
use file_source::FileSource;

#[derive(Parser, Debug)]
#[command(
    name = "dashboard-cli",
    about = "Builds the patient demographics and adverse events dashboard snapshot."
)]
struct Args {
    /// JSON file with dashboard settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the analytics API.
    #[arg(long, env = "DASHBOARD_API_URL")]
    api_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Saved `patient_demog` response to use instead of the API.
    #[arg(long, requires = "adverse_events")]
    demographics: Option<PathBuf>,

    /// Saved `adverse_event` response to use instead of the API.
    #[arg(long, requires = "demographics")]
    adverse_events: Option<PathBuf>,

    /// Print the whole snapshot as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let source: Arc<dyn DashboardSource> = match (&args.demographics, &args.adverse_events) {
        (Some(demographics), Some(adverse_events)) => {
            Arc::new(FileSource::new(demographics, adverse_events))
        }
        _ => Arc::new(
            HttpDashboardSource::new(&config).context("Could not build the HTTP client")?,
        ),
    };

    let aggregator = Aggregator::new(source, config);
    aggregator
        .refresh()
        .await
        .context("Dashboard data unavailable")?;
    let snapshot = aggregator
        .current()
        .context("No snapshot was published")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        println!("{}", render_summary(&snapshot));
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {:?}", path))?;
            serde_json::from_str(&data)
                .with_context(|| format!("Invalid config file {:?}", path))?
        }
        None => DashboardConfig::default(),
    };

    if let Some(url) = &args.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }

    Ok(config)
}

fn render_summary(snapshot: &DashboardSnapshot) -> String {
    let demographics = &snapshot.demographics().kpis;
    let events = &snapshot.adverse_events().kpis;

    [
        format!("Generated at: {}", snapshot.generated_at),
        format!("Total patients: {:.0}", demographics.total_patients),
        format!("Average age: {}", demographics.average_age),
        format!("Gender ratio: {} M:F", demographics.gender_ratio),
        format!(
            "Latest registrations: {:.0} ({})",
            demographics.latest_registrations,
            format_delta(demographics.registration_delta_pct)
        ),
        format!("Total events: {:.0}", events.total_events),
        format!(
            "Ongoing events: {:.0} ({} of total)",
            events.ongoing_events,
            format_percent(events.ongoing_pct)
        ),
        format!(
            "Critical events: {:.0} ({} of total)",
            events.critical_events,
            format_percent(events.critical_pct)
        ),
        format!(
            "Avg days to resolution: {:.2}",
            events.average_resolution_days
        ),
        format!(
            "Event trend: {}",
            format_delta(events.occurrence_delta_pct)
        ),
    ]
    .join("\n")
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(percent) => format!("{percent:.1}%"),
        None => "—".to_string(),
    }
}

fn format_delta(value: Option<f64>) -> String {
    match value {
        Some(delta) => format!("{delta:+.1}%"),
        None => "—".to_string(),
    }
}
