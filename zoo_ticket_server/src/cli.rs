//! Help output for operators.
//!
//! All configuration comes from the environment, so any command line argument at all prints the help text followed by
//! the current values of the non-secret settings, and the server does not start.
use std::{env, env::VarError};

const HELP: &str = include_str!("./cli-help.txt");

/// Settings that are safe to echo to a terminal. API keys, the JWT secret and the SMTP credentials are never listed.
pub const NON_SECRET_SETTINGS: [&str; 18] = [
    "RUST_LOG",
    "ZTG_HOST",
    "ZTG_PORT",
    "ZTG_PUBLIC_URL",
    "ZTG_ATTACH_PDF",
    "DATABASE_URL",
    "FRONTEND_BASE_URL",
    "GATEWAY_URL",
    "GATEWAY_API_URL",
    "GATEWAY_SUCCESS_CODES",
    "GATEWAY_PENDING_CODES",
    "GATEWAY_STRICT_PADDING",
    "ACCESS_TOKEN_TTL_MIN",
    "REFRESH_TOKEN_TTL_HOURS",
    "TICKETING_API_URL",
    "SMTP_HOST",
    "SMTP_PORT",
    "SMTP_FROM",
];

/// Prints the help and returns `true` when the binary was started with arguments.
pub fn print_help_if_requested() -> bool {
    let requested = env::args().nth(1).is_some();
    if requested {
        println!("\n{HELP}\n");
        println!("Current settings (secrets are not shown):");
        for line in settings_report() {
            println!("{line}");
        }
    }
    requested
}

fn describe_setting(name: &str) -> String {
    let value = match env::var(name) {
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    };
    format!("  {name:<30} {value}")
}

pub fn settings_report() -> Vec<String> {
    NON_SECRET_SETTINGS.iter().map(|name| describe_setting(name)).collect()
}
