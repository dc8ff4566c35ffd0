pub mod conversations;
pub mod messages;
pub mod notifications;
