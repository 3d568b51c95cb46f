use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::subscriber_email::SubscriberEmail;

const MAX_MESSAGE_LENGTH: usize = 5000;

#[derive(Deserialize, Debug)]
pub struct FeedbackBody {
    pub message: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug)]
pub struct Feedback {
    pub message: FeedbackMessage,
    pub email: Option<SubscriberEmail>,
    pub kind: FeedbackKind,
}

#[derive(Debug)]
pub struct FeedbackMessage(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    General,
    Bug,
    Feature,
    Other,
}

impl FeedbackMessage {
    pub fn parse(message: String) -> Result<FeedbackMessage, String> {
        let message = message.trim();

        if message.is_empty() {
            return Err(String::from("Feedback message cannot be empty"));
        }

        if message.graphemes(true).count() > MAX_MESSAGE_LENGTH {
            return Err(format!(
                "Feedback message cannot be longer than {} characters",
                MAX_MESSAGE_LENGTH
            ));
        }

        Ok(Self(message.to_string()))
    }
}

impl AsRef<str> for FeedbackMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FeedbackKind {
    /// Unknown kinds are kept as general feedback instead of being rejected,
    /// the landing page form may grow new options before the handler does.
    pub fn parse(kind: Option<&str>) -> FeedbackKind {
        match kind.map(|kind| kind.trim().to_lowercase()).as_deref() {
            Some("bug") => FeedbackKind::Bug,
            Some("feature") => FeedbackKind::Feature,
            Some("other") => FeedbackKind::Other,
            _ => FeedbackKind::General,
        }
    }
}

impl AsRef<str> for FeedbackKind {
    fn as_ref(&self) -> &str {
        match self {
            FeedbackKind::General => "general",
            FeedbackKind::Bug => "bug",
            FeedbackKind::Feature => "feature",
            FeedbackKind::Other => "other",
        }
    }
}

impl TryFrom<FeedbackBody> for Feedback {
    type Error = String;

    fn try_from(body: FeedbackBody) -> Result<Self, Self::Error> {
        let message = FeedbackMessage::parse(body.message.unwrap_or_default())?;
        let email = match body.email.filter(|email| !email.trim().is_empty()) {
            Some(email) => Some(SubscriberEmail::parse(email)?),
            None => None,
        };
        let kind = FeedbackKind::parse(body.kind.as_deref());

        Ok(Feedback {
            message,
            email,
            kind,
        })
    }
}
