use std::path::PathBuf;
use std::time;

use chrono::NaiveDate;
use config::{Config, ConfigError, File};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::subscriber_email::SubscriberEmail;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub stats_client: StatsClientSettings,
    pub score_checker: ScoreCheckerSettings,
    pub dispatcher: DispatcherSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender: String,
    pub sender_name: String,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    pub api_key: Secret<String>,
    pub audience_id: String,
    // Receives a short notice every time somebody subscribes
    pub admin_email: Option<String>,
    // Destination of the messages posted to /feedback
    pub forward_email: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct StatsClientSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct ScoreCheckerSettings {
    pub state_file: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub points_threshold: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_delay_milliseconds: u64,
    // When empty the checker looks at yesterday's games
    pub check_date: Option<NaiveDate>,
}

#[derive(serde::Deserialize, Clone)]
pub struct DispatcherSettings {
    #[serde(default)]
    pub mode: DispatchMode,
    pub test_recipient: Option<String>,
    pub preview_file: PathBuf,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    #[default]
    Live,
    Test,
    Preview,
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }

    pub fn set_email_client_base_url(&mut self, new_base_url: String) {
        self.email_client.set_base_url(new_base_url)
    }

    pub fn set_stats_client_base_url(&mut self, new_base_url: String) {
        self.stats_client.base_url = new_base_url
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }
}

impl EmailClientSettings {
    pub fn get_sender(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.sender.clone())
    }

    pub fn get_sender_name(&self) -> String {
        self.sender_name.clone()
    }

    pub fn get_base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn get_api_key(&self) -> Secret<String> {
        self.api_key.clone()
    }

    pub fn get_audience_id(&self) -> String {
        self.audience_id.clone()
    }

    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn get_admin_email(&self) -> Option<Result<SubscriberEmail, String>> {
        parse_optional_email(&self.admin_email)
    }

    pub fn get_forward_email(&self) -> Option<Result<SubscriberEmail, String>> {
        parse_optional_email(&self.forward_email)
    }

    pub fn set_base_url(&mut self, new_base_url: String) {
        self.base_url = new_base_url
    }

    /// Jobs that talk to the provider stop here when the credentials were
    /// never configured, instead of failing later with a 401.
    pub fn ensure_credentials(&self) -> Result<(), String> {
        let mut missing = Vec::new();

        if self.api_key.expose_secret().trim().is_empty() {
            missing.push("APP_EMAIL_CLIENT__API_KEY");
        }
        if self.audience_id.trim().is_empty() {
            missing.push("APP_EMAIL_CLIENT__AUDIENCE_ID");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("{} not set", missing.join(" and ")))
        }
    }
}

impl StatsClientSettings {
    pub fn get_base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl ScoreCheckerSettings {
    pub fn get_request_delay(&self) -> time::Duration {
        time::Duration::from_millis(self.request_delay_milliseconds)
    }
}

// Environment variables can only blank a value, so an empty string counts as "not set"
fn parse_optional_email(value: &Option<String>) -> Option<Result<SubscriberEmail, String>> {
    value
        .as_ref()
        .filter(|email| !email.trim().is_empty())
        .map(|email| SubscriberEmail::parse(email.clone()))
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().map_err(|err| {
        ConfigError::Message(format!("Failed to determine the current directory: {}", err))
    })?;
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(environment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_EMAIL_CLIENT__API_KEY would set Settings.email_client.api_key
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    tracing::info!("Application environment = {:?}", environment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
