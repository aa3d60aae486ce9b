use anyhow::Result;
use dotenv::dotenv;
use oscillator_dashboard::aggregators::signal_level::ScoreBand;
use oscillator_dashboard::config::app_context::AppContext;
use oscillator_dashboard::utils::serdealizers::parse_flexible_datetime;
use oscillator_dashboard::{AcquisitionSession, Orchestrator};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    // config file name without extension, config.toml by default
    let config_filename = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let context = AppContext::new(&config_filename)?;
    info!("Starting the dashboard with settings: {:?}", context.settings);

    let orchestrator = context.orchestrator.clone();
    let mut updates = WatchStream::new(orchestrator.subscribe());
    tokio::spawn(async move {
        while let Some(session) = updates.next().await {
            log_session(&session);
        }
    });

    orchestrator.bootstrap().await;

    let commands = orchestrator.clone();
    let command_loop = tokio::spawn(async move { read_commands(commands).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("ctrl-c received"),
        _ = command_loop => info!("stdin closed"),
    }
    orchestrator.teardown().await;
    info!("Dashboard stopped");
    Ok(())
}

async fn read_commands(orchestrator: Orchestrator) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("refresh"), _) => orchestrator.refresh().await,
            (Some("live"), _) => orchestrator.deactivate_time_machine().await,
            (Some("points"), _) => {
                for point in orchestrator.store().snapshot().await.iter() {
                    info!(
                        "{:>4} {} {} ({})",
                        point.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                        point.date.format("%Y-%m-%d"),
                        point.name,
                        point.provenance()
                    );
                }
            }
            (Some("point"), Some(id)) => match id.parse::<u64>() {
                Ok(id) => {
                    orchestrator.select_historical(id).await;
                }
                Err(e) => warn!("bad point id {id}: {e}"),
            },
            (Some("date"), Some(raw)) => match parse_flexible_datetime(raw) {
                Some(date) => orchestrator.fetch_for_date(date).await,
                None => warn!("can't parse date {raw}"),
            },
            (Some("quit"), _) => break,
            (None, _) => {}
            _ => warn!("commands: refresh | live | points | point <id> | date <YYYY-MM-DD> | quit"),
        }
    }
}

fn log_session(session: &AcquisitionSession) {
    if session.loading {
        info!("[{}] loading (retry {})", session.data_source, session.retry_count);
        return;
    }
    if let Some(metrics) = session.composite_metrics {
        info!(
            "[{}] COS {:.1}/{:.1} ({}) BSI {:.1}/{:.1} ({}) price {:?}",
            session.data_source,
            metrics.cos.monthly,
            metrics.cos.weekly,
            ScoreBand::of(metrics.cos.monthly),
            metrics.bsi.monthly,
            metrics.bsi.weekly,
            ScoreBand::of(metrics.bsi.monthly),
            session.price
        );
    }
    if let Some(point) = &session.active_point {
        info!("viewing {}: {}", point.name, point.description);
    }
    if let Some(error) = &session.error {
        warn!("{error}");
    }
    if session.is_backend_unavailable() {
        warn!("backend unavailable, type `refresh` to retry");
    }
}
