//! Job 1: checks last night's box scores and writes the alert state file.
//! Runs daily around 1:30 AM PT, after the last west coast game is final.

use fifty_point_alerts::config::get_configuration;
use fifty_point_alerts::score_checker::{resolve_check_date, ScoreChecker};
use fifty_point_alerts::stats_client::StatsClient;
use fifty_point_alerts::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = get_subscriber(
        String::from("check_scores"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber);

    let config = get_configuration()?;
    let stats_client = StatsClient::from_settings(&config.stats_client)?;
    let checker = ScoreChecker::from_settings(stats_client, &config.score_checker);
    let check_date = resolve_check_date(config.score_checker.check_date);

    tracing::info!("Checking games played on {}", check_date);

    let state = checker
        .run(check_date, &config.score_checker.state_file)
        .await?;

    tracing::info!(alert_needed = state.alert_needed, "Score check finished");

    Ok(())
}
