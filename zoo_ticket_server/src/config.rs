use std::{env, fmt::Display, io::Write, str::FromStr, time::Duration as StdDuration};

use chrono::Duration;
use gateway_tools::GatewayConfig;
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use tempfile::NamedTempFile;
use zoo_ticket_engine::{
    helpers::{EnvelopeCodec, PaddingMode, StatusCodeMap},
    sqlite_db::db_url,
    OrderFlowConfig,
};
use ztg_common::{
    helpers::{parse_boolean_flag, parse_list},
    Secret,
};

use crate::errors::ServerError;

const DEFAULT_ZTG_HOST: &str = "127.0.0.1";
const DEFAULT_ZTG_PORT: u16 = 8380;
const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_ACCESS_TOKEN_TTL_MIN: i64 = 60;
const DEFAULT_REFRESH_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_SMTP_HOST: &str = "localhost";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SMTP_FROM: &str = "tickets@localhost";
pub const TICKETING_TIMEOUT: StdDuration = StdDuration::from_secs(60);
pub const SMTP_TIMEOUT: StdDuration = StdDuration::from_secs(30);
/// The gateway sends the customer back to this path on the backend.
pub const CALLBACK_PATH: &str = "/payment/return";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The public base URL of this backend, as the gateway and the customer's browser see it.
    pub public_url: String,
    /// The customer-facing frontend. Checkout and payment-result redirects point here.
    pub frontend_base_url: String,
    pub gateway: GatewayConfig,
    pub status_codes: StatusCodeMap,
    pub padding_mode: PaddingMode,
    pub auth: AuthConfig,
    pub ticketing: TicketingConfig,
    pub smtp: SmtpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ZTG_HOST.to_string(),
            port: DEFAULT_ZTG_PORT,
            database_url: String::default(),
            public_url: format!("http://{DEFAULT_ZTG_HOST}:{DEFAULT_ZTG_PORT}"),
            frontend_base_url: DEFAULT_FRONTEND_BASE_URL.to_string(),
            gateway: GatewayConfig::default(),
            status_codes: StatusCodeMap::default(),
            padding_mode: PaddingMode::default(),
            auth: AuthConfig::default(),
            ticketing: TicketingConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}

/// Reads `name` and parses it, falling back to `default` (with a warning) when the value is invalid.
fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => default,
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("ZTG_HOST").ok().unwrap_or_else(|| DEFAULT_ZTG_HOST.into());
        let port = parse_env("ZTG_PORT", DEFAULT_ZTG_PORT);
        let database_url = db_url();
        let public_url = env::var("ZTG_PUBLIC_URL").ok().unwrap_or_else(|| {
            let url = format!("http://{host}:{port}");
            warn!("🪛️ ZTG_PUBLIC_URL is not set. The gateway will be told to return customers to {url}{CALLBACK_PATH}");
            url
        });
        let frontend_base_url = env::var("FRONTEND_BASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ FRONTEND_BASE_URL is not set. Using {DEFAULT_FRONTEND_BASE_URL}");
            DEFAULT_FRONTEND_BASE_URL.into()
        });
        let gateway = GatewayConfig::new_from_env_or_default();
        if !gateway.api_key.is_empty() && gateway.api_key.as_bytes().len() < 32 {
            error!("🪛️ GATEWAY_API_KEY is shorter than 32 bytes. Payment callbacks cannot be decrypted.");
        }
        let success = env::var("GATEWAY_SUCCESS_CODES").map(|s| parse_list(&s)).unwrap_or_default();
        let pending = env::var("GATEWAY_PENDING_CODES").map(|s| parse_list(&s)).unwrap_or_default();
        let status_codes = StatusCodeMap::new(success, pending);
        info!(
            "🪛️ Gateway success codes: [{}]. Pending codes: [{}]",
            status_codes.success_codes().join(","),
            status_codes.pending_codes().join(",")
        );
        let padding_mode = if parse_boolean_flag(env::var("GATEWAY_STRICT_PADDING").ok(), false) {
            PaddingMode::Strict
        } else {
            PaddingMode::Lenient
        };
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let ticketing = TicketingConfig::from_env_or_default();
        let smtp = SmtpConfig::from_env_or_default();
        Self {
            host,
            port,
            database_url,
            public_url,
            frontend_base_url,
            gateway,
            status_codes,
            padding_mode,
            auth,
            ticketing,
            smtp,
        }
    }

    pub fn flow_config(&self) -> OrderFlowConfig {
        OrderFlowConfig { frontend_base_url: self.frontend_base_url.clone(), status_codes: self.status_codes.clone() }
    }

    pub fn envelope_codec(&self) -> EnvelopeCodec {
        EnvelopeCodec::new(self.gateway.api_key.clone()).with_padding_mode(self.padding_mode)
    }

    pub fn checkout_options(&self) -> CheckoutOptions {
        CheckoutOptions::new(&self.public_url)
    }
}

//-------------------------------------------------  CheckoutOptions  --------------------------------------------------
/// The non-secret part of the configuration that the checkout route needs.
#[derive(Clone, Debug)]
pub struct CheckoutOptions {
    /// Where the gateway sends the customer (and the encrypted result) after payment.
    pub callback_url: String,
}

impl CheckoutOptions {
    pub fn new(public_url: &str) -> Self {
        Self { callback_url: format!("{}{CALLBACK_PATH}", public_url.trim_end_matches('/')) }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 secret shared with the token service.
    pub jwt_secret: Secret<String>,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since no externally issued token will be accepted. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production instance, \
                         you are doing it wrong! Set the JWT_SECRET environment variable instead. 🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret. ");
            },
        }
        Self::new(Secret::new(secret))
    }
}

impl AuthConfig {
    /// An auth configuration with the default token lifetimes.
    pub fn new(jwt_secret: Secret<String>) -> Self {
        Self {
            jwt_secret,
            access_token_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MIN),
            refresh_token_ttl: Duration::hours(DEFAULT_REFRESH_TOKEN_TTL_HOURS),
        }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("JWT_SECRET is empty".to_string()));
        }
        let access_minutes = parse_env("ACCESS_TOKEN_TTL_MIN", DEFAULT_ACCESS_TOKEN_TTL_MIN);
        let refresh_hours = parse_env("REFRESH_TOKEN_TTL_HOURS", DEFAULT_REFRESH_TOKEN_TTL_HOURS);
        Ok(Self {
            jwt_secret: Secret::new(secret),
            access_token_ttl: Duration::minutes(access_minutes),
            refresh_token_ttl: Duration::hours(refresh_hours),
        })
    }
}

//-------------------------------------------------  TicketingConfig  --------------------------------------------------
/// The external ticketing system that issues tickets for paid orders.
#[derive(Clone, Debug)]
pub struct TicketingConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    pub timeout: StdDuration,
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self { api_url: String::default(), api_key: Secret::default(), timeout: TICKETING_TIMEOUT }
    }
}

impl TicketingConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("TICKETING_API_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ TICKETING_API_URL is not set. Paid orders will not be fulfilled and no tickets will be emailed.");
            String::default()
        });
        let api_key = env::var("TICKETING_API_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ TICKETING_API_KEY is not set. The ticketing system will probably reject fulfillment requests.");
            String::default()
        });
        Self { api_url, api_key: Secret::new(api_key), timeout: TICKETING_TIMEOUT }
    }
}

//-------------------------------------------------  SmtpConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// When set, the relay is reached over STARTTLS and authenticated with these credentials.
    pub user: Option<String>,
    pub password: Secret<String>,
    pub from: String,
    /// Attach a printable PDF of the tickets in addition to the inline QR images.
    pub attach_pdf: bool,
    pub timeout: StdDuration,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            user: None,
            password: Secret::default(),
            from: DEFAULT_SMTP_FROM.to_string(),
            attach_pdf: true,
            timeout: SMTP_TIMEOUT,
        }
    }
}

impl SmtpConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("SMTP_HOST").ok().unwrap_or_else(|| {
            warn!("🪛️ SMTP_HOST is not set. Using {DEFAULT_SMTP_HOST}");
            DEFAULT_SMTP_HOST.into()
        });
        let port = parse_env("SMTP_PORT", DEFAULT_SMTP_PORT);
        let user = env::var("SMTP_USER").ok().filter(|s| !s.trim().is_empty());
        if user.is_none() {
            info!("🪛️ SMTP_USER is not set. Mail will be relayed without authentication or TLS.");
        }
        let password = Secret::new(env::var("SMTP_PASSWORD").unwrap_or_default());
        let from = env::var("SMTP_FROM").ok().unwrap_or_else(|| {
            warn!("🪛️ SMTP_FROM is not set. Ticket emails will be sent from {DEFAULT_SMTP_FROM}");
            DEFAULT_SMTP_FROM.into()
        });
        let attach_pdf = parse_boolean_flag(env::var("ZTG_ATTACH_PDF").ok(), true);
        Self { host, port, user, password, from, attach_pdf, timeout: SMTP_TIMEOUT }
    }
}
