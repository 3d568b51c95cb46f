mod cors;
mod feedback;
mod health_check;
mod subscriptions;
mod unsubscribe;
