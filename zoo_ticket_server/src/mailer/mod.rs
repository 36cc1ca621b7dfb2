//! # Ticket email
//!
//! [`SmtpTicketMailer`] renders the ticket email and delivers it over SMTP. Every ticket code becomes a QR code
//! ([`qr`]), shown inline in the HTML body ([`template`]) and, optionally, in a printable A4 PDF ([`pdf`]).
pub mod pdf;
pub mod qr;
mod smtp;
pub mod template;

pub use smtp::SmtpTicketMailer;
