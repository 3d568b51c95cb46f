use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    domain::{subscriber_email::SubscriberEmail, subscriber_request::SubscriberRequestBody},
    email_client::{ContactOutcome, EmailClient, EmailClientError},
    email_templates::EmailTemplates,
    routes::{error_response, success_response},
    startup::AdminEmail,
    utils::error_chain_fmt,
};

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to add the subscriber to the audience.")]
    AudienceError(#[source] EmailClientError),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::AudienceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            SubscribeError::ValidationError(_) => {
                error_response(self.status_code(), "Valid email required")
            }
            SubscribeError::AudienceError(_) => error_response(
                self.status_code(),
                "Failed to subscribe. Please try again later.",
            ),
        }
    }
}

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, email_client, templates, admin_email),
    fields(subscriber_email = ?body.email)
)]
pub async fn handle_create_subscription(
    body: web::Json<SubscriberRequestBody>,
    email_client: web::Data<EmailClient>,
    templates: web::Data<EmailTemplates>,
    admin_email: web::Data<AdminEmail>,
) -> Result<HttpResponse, SubscribeError> {
    let subscriber_email = SubscriberEmail::try_from(body.into_inner()).map_err(|err| {
        tracing::error!("Validation error: {:?}", err);
        SubscribeError::ValidationError(err)
    })?;

    let outcome = email_client
        .create_contact(&subscriber_email)
        .await
        .map_err(|err| {
            tracing::error!("Failed to create contact: {:?}", err);
            SubscribeError::AudienceError(err)
        })?;

    match outcome {
        ContactOutcome::AlreadyExists => Ok(success_response("You're already subscribed!")),
        _ => {
            if let Some(admin_email) = admin_email.0.as_ref() {
                notify_admin(&email_client, &templates, admin_email, &subscriber_email).await;
            }

            Ok(success_response("Successfully subscribed!"))
        }
    }
}

/// Best effort: the subscription already succeeded, a failed notice is only logged.
#[tracing::instrument(
    name = "Notifying the admin about a new subscriber",
    skip(email_client, templates, admin_email, subscriber_email)
)]
async fn notify_admin(
    email_client: &EmailClient,
    templates: &EmailTemplates,
    admin_email: &SubscriberEmail,
    subscriber_email: &SubscriberEmail,
) {
    let email = match templates.new_subscriber(subscriber_email) {
        Ok(email) => email,
        Err(err) => {
            tracing::error!("Failed to render the new subscriber notice: {:?}", err);
            return;
        }
    };

    if let Err(err) = email_client
        .send_email(
            std::slice::from_ref(admin_email),
            &email.subject,
            &email.html,
            &email.text,
            None,
        )
        .await
    {
        tracing::error!(
            "Failed to send the new subscriber notice to {}: {:?}",
            admin_email.as_ref(),
            err
        );
    }
}
