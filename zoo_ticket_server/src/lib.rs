//! # Zoo ticket server
//!
//! The HTTP front of the zoo ticketing backend. It is responsible for:
//! * Taking ticket orders from the website, from signed-in customers and guests alike.
//! * Sending customers to the payment gateway, and processing the encrypted payment result the gateway sends back.
//! * Handing paid orders to the ticketing system and emailing the tickets as QR codes (and optionally a PDF).
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orderTicketGroups`: Order list for admins and customers.
//! * `/api/orderTicketGroup`: Order lookup (GET) and order creation (POST).
//! * `/payment/return`: Where the gateway returns customers after payment.
//! * `/payment/banks` and `/payment/checkout`: Bank list and the checkout redirect page.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod mailer;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
