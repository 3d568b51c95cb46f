use actix_web::dev::Server;
use actix_web::error::InternalError;
use actix_web::http::{Method, StatusCode};
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::Settings;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::email_client::EmailClient;
use crate::email_templates::EmailTemplates;
use crate::routes::{
    cors, error_response, handle_create_subscription, handle_feedback, handle_unsubscribe_get,
    handle_unsubscribe_post, health_check, method_not_allowed, not_found_or_preflight, preflight,
};

/// Address notified about every new subscriber, if any.
pub struct AdminEmail(pub Option<SubscriberEmail>);

/// Address the feedback form is forwarded to, if any.
pub struct FeedbackRecipient(pub Option<SubscriberEmail>);

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let email_client = EmailClient::from_settings(&config.email_client).map_err(invalid_config)?;
        let templates = EmailTemplates::new().map_err(|err| invalid_config(err.to_string()))?;
        let admin_email = config
            .email_client
            .get_admin_email()
            .transpose()
            .map_err(invalid_config)?;
        let feedback_recipient = config
            .email_client
            .get_forward_email()
            .transpose()
            .map_err(invalid_config)?;

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            email_client,
            templates,
            AdminEmail(admin_email),
            FeedbackRecipient(feedback_recipient),
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    templates: EmailTemplates,
    admin_email: AdminEmail,
    feedback_recipient: FeedbackRecipient,
) -> Result<Server, std::io::Error> {
    let email_client = web::Data::new(email_client);
    let templates = web::Data::new(templates);
    let admin_email = web::Data::new(admin_email);
    let feedback_recipient = web::Data::new(feedback_recipient);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", cors::ALLOW_ORIGIN))
                    .add(("Access-Control-Allow-Methods", cors::ALLOW_METHODS))
                    .add(("Access-Control-Allow-Headers", cors::ALLOW_HEADERS)),
            )
            .app_data(json_config())
            .app_data(query_config())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/")
                    .route(web::post().to(handle_create_subscription))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/unsubscribe")
                    .route(web::get().to(handle_unsubscribe_get))
                    .route(web::post().to(handle_unsubscribe_post))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/feedback")
                    .route(web::post().to(handle_feedback))
                    .route(web::method(Method::OPTIONS).to(preflight))
                    .default_service(web::to(method_not_allowed)),
            )
            .default_service(web::to(not_found_or_preflight))
            .app_data(email_client.clone())
            .app_data(templates.clone())
            .app_data(admin_email.clone())
            .app_data(feedback_recipient.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

// Malformed payloads get the same JSON envelope as the handlers' own errors.
// Forms may post JSON as text/plain to skip the CORS preflight.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| {
            tracing::error!("Invalid JSON payload: {:?}", err);
            let response = error_response(StatusCode::BAD_REQUEST, "Invalid request body");

            InternalError::from_response(err, response).into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::error!("Invalid query string: {:?}", err);
        let response = error_response(StatusCode::BAD_REQUEST, "Invalid query string");

        InternalError::from_response(err, response).into()
    })
}

fn invalid_config(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
}
