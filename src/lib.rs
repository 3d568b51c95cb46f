pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod email_client;
pub mod email_templates;
pub mod routes;
pub mod score_checker;
pub mod startup;
pub mod stats_client;
pub mod telemetry;
pub mod utils;
