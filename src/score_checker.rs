use std::path::Path;
use std::time;

use chrono::{Duration, Local, NaiveDate};

use crate::config::ScoreCheckerSettings;
use crate::domain::alert_state::{AlertState, AlertStateError};
use crate::domain::performance::{normalize_player_name, Performance};
use crate::stats_client::{StatsClient, StatsClientError};

/// First job of the pipeline: looks at every game of a day and records
/// whether somebody reached the points threshold.
pub struct ScoreChecker {
    stats_client: StatsClient,
    points_threshold: u32,
    request_delay: time::Duration,
}

impl ScoreChecker {
    pub fn new(
        stats_client: StatsClient,
        points_threshold: u32,
        request_delay: time::Duration,
    ) -> ScoreChecker {
        ScoreChecker {
            stats_client,
            points_threshold,
            request_delay,
        }
    }

    pub fn from_settings(stats_client: StatsClient, settings: &ScoreCheckerSettings) -> Self {
        ScoreChecker::new(
            stats_client,
            settings.points_threshold,
            settings.get_request_delay(),
        )
    }

    /// Checks every game played on `check_date` and writes the outcome to
    /// `state_file`, even when there were no games at all.
    #[tracing::instrument(name = "Checking scores", skip(self, state_file))]
    pub async fn run(
        &self,
        check_date: NaiveDate,
        state_file: &Path,
    ) -> Result<AlertState, AlertStateError> {
        let performances = self.find_performances(check_date).await;
        let state = AlertState::from_check(performances, check_date);

        state.save(state_file)?;
        log_summary(&state, self.points_threshold);

        Ok(state)
    }

    pub async fn find_performances(&self, check_date: NaiveDate) -> Vec<Performance> {
        // An unreachable scoreboard is reported as a night without games
        let game_ids = match self.stats_client.game_ids_for(check_date).await {
            Ok(game_ids) => game_ids,
            Err(err) => {
                tracing::error!("Failed to fetch the scoreboard: {:?}", err);
                Vec::new()
            }
        };

        if game_ids.is_empty() {
            tracing::info!("No games found for {}", check_date);
            return Vec::new();
        }

        tracing::info!("Found {} games, checking box scores", game_ids.len());

        let mut performances = Vec::new();

        for (index, game_id) in game_ids.iter().enumerate() {
            // The stats API rate limits aggressive clients
            if index > 0 {
                tokio::time::sleep(self.request_delay).await;
            }

            match self.game_performances(game_id).await {
                Ok(mut found) => performances.append(&mut found),
                Err(err) => {
                    tracing::error!("Failed to check game {}: {:?}", game_id, err);
                }
            }
        }

        performances
    }

    async fn game_performances(
        &self,
        game_id: &str,
    ) -> Result<Vec<Performance>, StatsClientError> {
        let box_score = self.stats_client.box_score(game_id).await?;
        let performances: Vec<Performance> = box_score
            .players()
            .filter(|(_, player)| player.statistics.points() >= self.points_threshold)
            .map(|(team, player)| Performance {
                player: normalize_player_name(&format!(
                    "{} {}",
                    player.first_name, player.family_name
                )),
                team: team.to_string(),
                points: player.statistics.points(),
                game_id: game_id.to_string(),
                rebounds: player.statistics.rebounds(),
                assists: player.statistics.assists(),
                minutes: player
                    .statistics
                    .minutes
                    .clone()
                    .filter(|minutes| !minutes.is_empty())
                    .unwrap_or_else(|| String::from("N/A")),
            })
            .collect();

        for performance in &performances {
            tracing::info!(
                player = %performance.player,
                team = %performance.team,
                points = performance.points,
                "Found a {}+ point performance",
                self.points_threshold
            );
        }

        Ok(performances)
    }
}

/// The configured date, or yesterday when none is configured.
pub fn resolve_check_date(configured: Option<NaiveDate>) -> NaiveDate {
    configured.unwrap_or_else(|| Local::now().date_naive() - Duration::days(1))
}

fn log_summary(state: &AlertState, points_threshold: u32) {
    if !state.alert_needed {
        tracing::info!(
            "Alert needed: NO. No {}+ point games on {:?}",
            points_threshold,
            state.check_date
        );
        return;
    }

    tracing::info!(
        "Alert needed: YES. {} performances found",
        state.performances.len()
    );

    for performance in &state.performances {
        tracing::info!(
            "{} ({}): {} PTS, {} REB, {} AST",
            performance.player,
            performance.team,
            performance.points,
            performance.rebounds,
            performance.assists
        );
    }
}
