use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::time;

use crate::config::EmailClientSettings;
use crate::domain::subscriber_email::SubscriberEmail;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

/// Client for the transactional email provider (Resend REST API): single
/// sends, audience broadcasts and audience contact management.
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: SubscriberEmail,
    sender_name: String,
    api_key: Secret<String>,
    audience_id: String,
}

#[derive(thiserror::Error, Debug)]
pub enum EmailClientError {
    #[error("Failed to reach the email provider.")]
    Request(#[from] reqwest::Error),
    #[error("The email provider answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Invalid email provider url: {0}")]
    InvalidUrl(String),
}

/// Result of an audience contact change the provider accepted (or that was
/// already in the requested state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    Updated,
    AlreadyExists,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(default)]
    pub unsubscribed: bool,
}

#[derive(serde::Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(serde::Serialize)]
struct CreateBroadcastBody<'a> {
    audience_id: &'a str,
    from: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(serde::Serialize)]
struct ContactBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    unsubscribed: bool,
}

#[derive(serde::Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(serde::Deserialize)]
struct ContactList {
    data: Vec<Contact>,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: SubscriberEmail,
        sender_name: String,
        api_key: Secret<String>,
        audience_id: String,
        timeout: Option<time::Duration>,
    ) -> Result<EmailClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()?;

        Ok(EmailClient {
            http_client,
            base_url,
            sender,
            sender_name,
            api_key,
            audience_id,
        })
    }

    pub fn from_settings(settings: &EmailClientSettings) -> Result<EmailClient, String> {
        let sender = settings.get_sender()?;

        EmailClient::new(
            settings.get_base_url(),
            sender,
            settings.get_sender_name(),
            settings.get_api_key(),
            settings.get_audience_id(),
            Some(settings.get_timeout()),
        )
        .map_err(|err| format!("Failed to build the email http client: {}", err))
    }

    /// `Name <address>` as expected in the provider's `from` field.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.sender_name, self.sender.as_ref())
    }

    #[tracing::instrument(
        name = "Sending an email",
        skip(self, recipients, html_content, text_content, reply_to),
        fields(recipients = recipients.len(), subject = %subject)
    )]
    pub async fn send_email(
        &self,
        recipients: &[SubscriberEmail],
        subject: &str,
        html_content: &str,
        text_content: &str,
        reply_to: Option<&SubscriberEmail>,
    ) -> Result<String, EmailClientError> {
        let from = self.from_header();
        let body = SendEmailBody {
            from: &from,
            to: recipients.iter().map(|email| email.as_ref()).collect(),
            subject,
            html: html_content,
            text: text_content,
            reply_to: reply_to.map(|email| email.as_ref()),
        };
        let url = self.url(&["emails"])?;
        let response: IdResponse = self
            .send_json(self.http_client.post(url).json(&body))
            .await?;

        Ok(response.id)
    }

    /// Creates a broadcast for the whole audience and sends it right away.
    /// The provider fans it out and handles the unsubscribe link.
    #[tracing::instrument(
        name = "Broadcasting an email to the audience",
        skip(self, html_content, text_content),
        fields(audience_id = %self.audience_id, subject = %subject)
    )]
    pub async fn broadcast(
        &self,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<String, EmailClientError> {
        let from = self.from_header();
        let body = CreateBroadcastBody {
            audience_id: &self.audience_id,
            from: &from,
            subject,
            html: html_content,
            text: text_content,
        };
        let url = self.url(&["broadcasts"])?;
        let broadcast: IdResponse = self
            .send_json(self.http_client.post(url).json(&body))
            .await?;

        tracing::info!("Broadcast {} created", broadcast.id);

        let url = self.url(&["broadcasts", &broadcast.id, "send"])?;
        let _: IdResponse = self
            .send_json(self.http_client.post(url).json(&serde_json::json!({})))
            .await?;

        Ok(broadcast.id)
    }

    #[tracing::instrument(
        name = "Adding a contact to the audience",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn create_contact(
        &self,
        email: &SubscriberEmail,
    ) -> Result<ContactOutcome, EmailClientError> {
        let url = self.url(&["audiences", &self.audience_id, "contacts"])?;
        let body = ContactBody {
            email: Some(email.as_ref()),
            unsubscribed: false,
        };

        match self.send(self.http_client.post(url).json(&body)).await {
            Ok(_) => Ok(ContactOutcome::Updated),
            Err(EmailClientError::Status { status, body })
                if status == StatusCode::CONFLICT
                    || body.to_lowercase().contains("already exists") =>
            {
                tracing::info!("Contact already in the audience");
                Ok(ContactOutcome::AlreadyExists)
            }
            Err(err) => Err(err),
        }
    }

    #[tracing::instrument(
        name = "Unsubscribing a contact from the audience",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    pub async fn unsubscribe_contact(
        &self,
        email: &SubscriberEmail,
    ) -> Result<ContactOutcome, EmailClientError> {
        let url = self.url(&["audiences", &self.audience_id, "contacts", email.as_ref()])?;
        let body = ContactBody {
            email: None,
            unsubscribed: true,
        };

        match self.send(self.http_client.patch(url).json(&body)).await {
            Ok(_) => Ok(ContactOutcome::Updated),
            // Nobody to unsubscribe is as good as unsubscribed
            Err(EmailClientError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                tracing::info!("Contact not found in the audience");
                Ok(ContactOutcome::NotFound)
            }
            Err(err) => Err(err),
        }
    }

    #[tracing::instrument(name = "Listing audience contacts", skip(self))]
    pub async fn list_contacts(&self) -> Result<Vec<Contact>, EmailClientError> {
        let url = self.url(&["audiences", &self.audience_id, "contacts"])?;
        let list: ContactList = self.send_json(self.http_client.get(url)).await?;

        Ok(list.data)
    }

    // Path segments are percent-encoded, contact emails end up in the url
    fn url(&self, segments: &[&str]) -> Result<Url, EmailClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| EmailClientError::InvalidUrl(err.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| EmailClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, EmailClientError> {
        let response = request
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        Err(EmailClientError::Status { status, body })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, EmailClientError> {
        Ok(self.send(request).await?.json::<T>().await?)
    }
}
