pub mod alert_state;
pub mod feedback;
pub mod performance;
pub mod subscriber_email;
pub mod subscriber_request;
