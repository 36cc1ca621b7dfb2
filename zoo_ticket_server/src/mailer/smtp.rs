use std::sync::Arc;

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport,
    AsyncTransport,
    Message,
    Tokio1Executor,
};
use log::*;
use zoo_ticket_engine::traits::{MailerError, TicketEmail, TicketMailer};

use crate::{
    config::SmtpConfig,
    mailer::{
        pdf::build_ticket_pdf,
        qr::qr_png,
        template::{render_html, render_text, subject, ticket_cid},
    },
};

fn content_type(mime: &str) -> Result<ContentType, MailerError> {
    ContentType::parse(mime).map_err(|e| MailerError::RenderError(format!("{mime}: {e}")))
}

/// Sends ticket emails through an SMTP relay.
#[derive(Clone)]
pub struct SmtpTicketMailer {
    from: Mailbox,
    attach_pdf: bool,
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpTicketMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidAddress(format!("SMTP_FROM '{}' is invalid. {e}", config.from)))?;
        let builder = match &config.user {
            Some(user) => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| MailerError::TransportError(e.to_string()))?
                .credentials(Credentials::new(user.clone(), config.password.reveal().clone())),
            None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };
        let transport = builder.port(config.port).timeout(Some(config.timeout)).build();
        info!("📧️ Ticket emails will be sent from {from} via {}:{}", config.host, config.port);
        Ok(Self { from, attach_pdf: config.attach_pdf, transport: Arc::new(transport) })
    }

    /// Renders the complete MIME message: a text/HTML alternative with the QR images inline, plus the PDF sheet when
    /// enabled.
    pub fn build_message(&self, email: &TicketEmail) -> Result<Message, MailerError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidAddress(format!("'{}' is invalid. {e}", email.to)))?;
        let png = content_type("image/png")?;
        let mut related = MultiPart::related().singlepart(SinglePart::html(render_html(email)));
        for (i, ticket) in email.tickets.iter().enumerate() {
            let image = qr_png(&ticket.ticket_code)?;
            related = related.singlepart(Attachment::new_inline(ticket_cid(i)).body(image, png.clone()));
        }
        let body = MultiPart::alternative().singlepart(SinglePart::plain(render_text(email))).multipart(related);
        let mut content = MultiPart::mixed().multipart(body);
        if self.attach_pdf {
            let pdf = build_ticket_pdf(email)?;
            let filename = format!("tickets-{}.pdf", email.order_no);
            content = content.singlepart(Attachment::new(filename).body(pdf, content_type("application/pdf")?));
        }
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject(email))
            .multipart(content)
            .map_err(|e| MailerError::RenderError(e.to_string()))
    }
}

impl TicketMailer for SmtpTicketMailer {
    async fn send_tickets(&self, email: &TicketEmail) -> Result<(), MailerError> {
        let message = self.build_message(email)?;
        debug!("📧️ Sending {} tickets for order [{}] to {}", email.tickets.len(), email.order_no, email.to);
        let response = self.transport.send(message).await.map_err(|e| MailerError::TransportError(e.to_string()))?;
        trace!("📧️ SMTP relay replied {:?}", response.code());
        Ok(())
    }
}
