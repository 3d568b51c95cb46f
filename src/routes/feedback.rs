use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    domain::feedback::{Feedback, FeedbackBody},
    email_client::{EmailClient, EmailClientError},
    email_templates::EmailTemplates,
    routes::{error_response, success_response},
    startup::FeedbackRecipient,
    utils::error_chain_fmt,
};

#[derive(thiserror::Error)]
pub enum FeedbackError {
    #[error("{0}")]
    ValidationError(String),
    #[error("No feedback recipient is configured.")]
    MissingRecipient,
    #[error("Failed to render the feedback email.")]
    TemplateError(#[source] tera::Error),
    #[error("Failed to forward the feedback.")]
    SendEmailError(#[source] EmailClientError),
}

impl std::fmt::Debug for FeedbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for FeedbackError {
    fn status_code(&self) -> StatusCode {
        match self {
            FeedbackError::ValidationError(_) => StatusCode::BAD_REQUEST,
            FeedbackError::MissingRecipient
            | FeedbackError::TemplateError(_)
            | FeedbackError::SendEmailError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            FeedbackError::ValidationError(message) => {
                error_response(self.status_code(), message)
            }
            _ => error_response(
                self.status_code(),
                "Failed to send feedback. Please try again later.",
            ),
        }
    }
}

#[tracing::instrument(
    name = "Forwarding feedback handler",
    skip(body, email_client, templates, recipient),
    fields(feedback_type = ?body.kind)
)]
pub async fn handle_feedback(
    body: web::Json<FeedbackBody>,
    email_client: web::Data<EmailClient>,
    templates: web::Data<EmailTemplates>,
    recipient: web::Data<FeedbackRecipient>,
) -> Result<HttpResponse, FeedbackError> {
    let feedback = Feedback::try_from(body.into_inner()).map_err(|err| {
        tracing::error!("Validation error: {:?}", err);
        FeedbackError::ValidationError(err)
    })?;
    let recipient = recipient.0.as_ref().ok_or_else(|| {
        tracing::error!("Feedback received but no forward email is configured");
        FeedbackError::MissingRecipient
    })?;
    let email = templates
        .feedback(&feedback)
        .map_err(FeedbackError::TemplateError)?;

    email_client
        .send_email(
            std::slice::from_ref(recipient),
            &email.subject,
            &email.html,
            &email.text,
            feedback.email.as_ref(),
        )
        .await
        .map_err(|err| {
            tracing::error!("Failed to forward feedback: {:?}", err);
            FeedbackError::SendEmailError(err)
        })?;

    Ok(success_response("Thanks for your feedback!"))
}
