//! Prints every contact of the audience with its subscription status.

use fifty_point_alerts::config::get_configuration;
use fifty_point_alerts::email_client::EmailClient;
use fifty_point_alerts::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = get_subscriber(
        String::from("list_contacts"),
        String::from("warn"),
        std::io::stderr,
    );

    init_subscriber(subscriber);

    let config = get_configuration()?;

    config.email_client.ensure_credentials()?;

    let email_client = EmailClient::from_settings(&config.email_client)?;
    let contacts = email_client.list_contacts().await?;
    let unsubscribed = contacts.iter().filter(|contact| contact.unsubscribed).count();

    println!("Total contacts: {}\n", contacts.len());

    for contact in &contacts {
        let status = if contact.unsubscribed {
            "unsubscribed"
        } else {
            "subscribed"
        };

        println!("  {} ({})", contact.email, status);
    }

    println!("\nSummary:");
    println!("  Subscribed: {}", contacts.len() - unsubscribed);
    println!("  Unsubscribed: {}", unsubscribed);
    println!("  Total: {}", contacts.len());

    Ok(())
}
