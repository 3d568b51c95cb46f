use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    domain::{subscriber_email::SubscriberEmail, subscriber_request::SubscriberRequestBody},
    email_client::{EmailClient, EmailClientError},
    routes::{error_response, success_response},
    utils::error_chain_fmt,
};

#[derive(thiserror::Error)]
pub enum UnsubscribeError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to unsubscribe the contact from the audience.")]
    AudienceError(#[source] EmailClientError),
}

impl std::fmt::Debug for UnsubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for UnsubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            UnsubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            UnsubscribeError::AudienceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            UnsubscribeError::ValidationError(_) => {
                error_response(self.status_code(), "Valid email required")
            }
            UnsubscribeError::AudienceError(_) => error_response(
                self.status_code(),
                "Failed to unsubscribe. Please try again later.",
            ),
        }
    }
}

/// Unsubscribe links from the landing page pass the email in the query string.
pub async fn handle_unsubscribe_get(
    query: web::Query<SubscriberRequestBody>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, UnsubscribeError> {
    unsubscribe(query.into_inner(), &email_client).await
}

/// The form posts a JSON body, but a bare `?email=` is accepted as well.
pub async fn handle_unsubscribe_post(
    query: web::Query<SubscriberRequestBody>,
    body: Option<web::Json<SubscriberRequestBody>>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, UnsubscribeError> {
    let email = body
        .and_then(|body| body.into_inner().email)
        .or_else(|| query.into_inner().email);

    unsubscribe(SubscriberRequestBody { email }, &email_client).await
}

#[tracing::instrument(
    name = "Unsubscribing a subscriber",
    skip(request, email_client),
    fields(subscriber_email = ?request.email)
)]
async fn unsubscribe(
    request: SubscriberRequestBody,
    email_client: &EmailClient,
) -> Result<HttpResponse, UnsubscribeError> {
    let subscriber_email = SubscriberEmail::try_from(request).map_err(|err| {
        tracing::error!("Validation error: {:?}", err);
        UnsubscribeError::ValidationError(err)
    })?;

    // Unknown contacts come back as ContactOutcome::NotFound, which is fine here
    email_client
        .unsubscribe_contact(&subscriber_email)
        .await
        .map_err(|err| {
            tracing::error!("Failed to unsubscribe contact: {:?}", err);
            UnsubscribeError::AudienceError(err)
        })?;

    Ok(success_response("Successfully unsubscribed"))
}
