use std::path::{Path, PathBuf};

use crate::config::{DispatchMode, DispatcherSettings};
use crate::domain::alert_state::{AlertState, AlertStateError};
use crate::domain::performance::Performance;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::email_client::{EmailClient, EmailClientError};
use crate::email_templates::{EmailContent, EmailTemplates};
use crate::utils::error_chain_fmt;

/// Second job of the pipeline: turns the alert state left by the score
/// checker into a broadcast to the whole audience.
pub struct Dispatcher {
    email_client: EmailClient,
    templates: EmailTemplates,
    state_file: PathBuf,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    NoAlertNeeded,
    Broadcasted { broadcast_id: String, performances: usize },
    TestSent { email_id: String },
    Previewed { preview_file: PathBuf },
}

#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to read or write the alert state.")]
    State(#[from] AlertStateError),
    #[error("Failed to render the alert email.")]
    Template(#[from] tera::Error),
    #[error("Failed to send the alert email.")]
    Email(#[from] EmailClientError),
    #[error("Failed to write the email preview to {path}.")]
    Preview {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Test mode needs a dispatcher.test_recipient.")]
    MissingTestRecipient,
    #[error("{0}")]
    InvalidTestRecipient(String),
}

impl std::fmt::Debug for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl Dispatcher {
    pub fn new(email_client: EmailClient, templates: EmailTemplates, state_file: PathBuf) -> Self {
        Self {
            email_client,
            templates,
            state_file,
        }
    }

    pub async fn run(
        &self,
        settings: &DispatcherSettings,
    ) -> Result<DispatchOutcome, DispatchError> {
        match settings.mode {
            DispatchMode::Live => self.send_alert().await,
            DispatchMode::Test => {
                let recipient = settings
                    .test_recipient
                    .clone()
                    .filter(|recipient| !recipient.trim().is_empty())
                    .ok_or(DispatchError::MissingTestRecipient)?;
                let recipient =
                    SubscriberEmail::parse(recipient).map_err(DispatchError::InvalidTestRecipient)?;

                self.send_test(&recipient).await
            }
            DispatchMode::Preview => self.preview(&settings.preview_file),
        }
    }

    /// Broadcasts the alert when the checker flagged one, then clears the
    /// flag. A failed broadcast leaves the state as it was so a rerun can
    /// still send it.
    #[tracing::instrument(name = "Sending the 50 point alert", skip(self))]
    pub async fn send_alert(&self) -> Result<DispatchOutcome, DispatchError> {
        let state = AlertState::load(&self.state_file)?;

        if !state.alert_needed {
            tracing::info!("No alert needed today");
            return Ok(DispatchOutcome::NoAlertNeeded);
        }

        tracing::info!(
            "Alert needed! {} performances found",
            state.performances.len()
        );

        let email = self.templates.alert(&state.performances)?;
        let broadcast_id = self
            .email_client
            .broadcast(&email.subject, &email.html, &email.text)
            .await?;

        tracing::info!("Alert broadcasted, id {}", broadcast_id);

        AlertState::cleared().save(&self.state_file)?;

        Ok(DispatchOutcome::Broadcasted {
            broadcast_id,
            performances: state.performances.len(),
        })
    }

    /// Sends the alert to a single address without touching the state.
    #[tracing::instrument(
        name = "Sending a test alert",
        skip(self, recipient),
        fields(recipient = %recipient)
    )]
    pub async fn send_test(
        &self,
        recipient: &SubscriberEmail,
    ) -> Result<DispatchOutcome, DispatchError> {
        let email = self.load_email_or_sample()?;
        let email_id = self
            .email_client
            .send_email(
                std::slice::from_ref(recipient),
                &email.subject,
                &email.html,
                &email.text,
                None,
            )
            .await?;

        tracing::info!("Test alert sent, id {}", email_id);

        Ok(DispatchOutcome::TestSent { email_id })
    }

    /// Writes the HTML body to `preview_file` and logs the text body.
    #[tracing::instrument(name = "Previewing the alert", skip(self))]
    pub fn preview(&self, preview_file: &Path) -> Result<DispatchOutcome, DispatchError> {
        let email = self.load_email_or_sample()?;
        let io_error = |source| DispatchError::Preview {
            path: preview_file.to_path_buf(),
            source,
        };

        if let Some(parent) = preview_file
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        std::fs::write(preview_file, &email.html).map_err(io_error)?;

        tracing::info!("Email preview (plain text):\n{}", email.text);
        tracing::info!("HTML preview saved to {}", preview_file.display());

        Ok(DispatchOutcome::Previewed {
            preview_file: preview_file.to_path_buf(),
        })
    }

    // Previews and test sends fall back to a known performance on quiet days
    fn load_email_or_sample(&self) -> Result<EmailContent, DispatchError> {
        let mut state = AlertState::load(&self.state_file)?;

        if state.performances.is_empty() {
            state.performances.push(Performance::sample());
        }

        Ok(self.templates.alert(&state.performances)?)
    }
}
