use thiserror::Error;

use crate::traits::TicketEmail;

#[derive(Debug, Clone, Error)]
pub enum MailerError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
    #[error("Could not render the ticket email: {0}")]
    RenderError(String),
    #[error("Could not deliver the ticket email: {0}")]
    TransportError(String),
}

/// Sends the ticket email. Implementations are not expected to be idempotent; the order flow records delivery and
/// never sends twice for the same order.
#[allow(async_fn_in_trait)]
pub trait TicketMailer {
    async fn send_tickets(&self, email: &TicketEmail) -> Result<(), MailerError>;
}
