use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;

/// Body (or query string) carrying the address to subscribe or unsubscribe.
#[derive(Deserialize, Debug, Default)]
pub struct SubscriberRequestBody {
    pub email: Option<String>,
}

impl TryFrom<SubscriberRequestBody> for SubscriberEmail {
    type Error = String;

    fn try_from(body: SubscriberRequestBody) -> Result<Self, Self::Error> {
        match body.email {
            Some(email) => SubscriberEmail::parse(email),
            None => Err(String::from("email is required")),
        }
    }
}
