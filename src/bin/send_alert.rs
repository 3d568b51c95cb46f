//! Job 2: reads the alert state file and broadcasts the promo email when a
//! 50 point game happened. Runs daily at 9:00 AM PT, once the promo is live.
//!
//! `APP_DISPATCHER__MODE=test` (with `APP_DISPATCHER__TEST_RECIPIENT`) sends a
//! single email instead, `APP_DISPATCHER__MODE=preview` only writes the HTML.

use fifty_point_alerts::config::{get_configuration, DispatchMode};
use fifty_point_alerts::dispatcher::Dispatcher;
use fifty_point_alerts::email_client::EmailClient;
use fifty_point_alerts::email_templates::EmailTemplates;
use fifty_point_alerts::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = get_subscriber(
        String::from("send_alert"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber);

    let config = get_configuration()?;

    // Previews never reach the provider
    if config.dispatcher.mode != DispatchMode::Preview {
        config.email_client.ensure_credentials().map_err(|err| {
            tracing::error!("Cannot send the alert: {}", err);
            err
        })?;
    }

    let email_client = EmailClient::from_settings(&config.email_client)?;
    let templates = EmailTemplates::new()?;
    let dispatcher = Dispatcher::new(
        email_client,
        templates,
        config.score_checker.state_file.clone(),
    );

    tracing::info!("Dispatching in {:?} mode", config.dispatcher.mode);

    let outcome = dispatcher.run(&config.dispatcher).await.map_err(|err| {
        tracing::error!("Failed to dispatch the alert: {:?}", err);
        err
    })?;

    tracing::info!("Dispatch finished: {:?}", outcome);

    Ok(())
}
