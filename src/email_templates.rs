use tera::{Context, Tera};

use crate::domain::feedback::Feedback;
use crate::domain::performance::Performance;
use crate::domain::subscriber_email::SubscriberEmail;

pub const ALERT_SUBJECT: &str = "🏀 50% OFF DoorDash - LIVE NOW until 11 AM PT!";
pub const NEW_SUBSCRIBER_SUBJECT: &str = "New 50-Point Alerts subscriber";

// Templates ending in .html are autoescaped by tera, the .txt ones are not
const TEMPLATES: [(&str, &str); 6] = [
    ("alert.html", include_str!("../templates/alert.html")),
    ("alert.txt", include_str!("../templates/alert.txt")),
    ("feedback.html", include_str!("../templates/feedback.html")),
    ("feedback.txt", include_str!("../templates/feedback.txt")),
    ("new_subscriber.html", include_str!("../templates/new_subscriber.html")),
    ("new_subscriber.txt", include_str!("../templates/new_subscriber.txt")),
];

/// Rendered HTML and plain text bodies of one email.
#[derive(Debug, Clone)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();

        tera.add_raw_templates(TEMPLATES.to_vec())?;

        Ok(Self { tera })
    }

    pub fn alert(&self, performances: &[Performance]) -> Result<EmailContent, tera::Error> {
        let mut context = Context::new();

        context.insert("performances", performances);

        self.render("alert", ALERT_SUBJECT.to_string(), &context)
    }

    pub fn feedback(&self, feedback: &Feedback) -> Result<EmailContent, tera::Error> {
        let mut context = Context::new();
        let kind: &str = feedback.kind.as_ref();
        let message: &str = feedback.message.as_ref();
        let email: Option<&str> = feedback.email.as_ref().map(|email| email.as_ref());

        context.insert("kind", kind);
        context.insert("message", message);
        context.insert("email", &email);

        let subject = format!("[50-Point Alerts] {} feedback", kind);

        self.render("feedback", subject, &context)
    }

    pub fn new_subscriber(&self, email: &SubscriberEmail) -> Result<EmailContent, tera::Error> {
        let mut context = Context::new();
        let email: &str = email.as_ref();

        context.insert("email", email);

        self.render("new_subscriber", NEW_SUBSCRIBER_SUBJECT.to_string(), &context)
    }

    fn render(
        &self,
        name: &str,
        subject: String,
        context: &Context,
    ) -> Result<EmailContent, tera::Error> {
        Ok(EmailContent {
            subject,
            html: self.tera.render(&format!("{}.html", name), context)?,
            text: self.tera.render(&format!("{}.txt", name), context)?,
        })
    }
}
