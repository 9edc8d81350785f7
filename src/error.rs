use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(meetbell::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(meetbell::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(meetbell::google_calendar))]
    GoogleCalendar(String),

    #[error("Google Calendar rejected credentials: HTTP {status} - {message}")]
    #[diagnostic(
        code(meetbell::calendar_auth),
        help("Run `get_calendar_token` to authorize again")
    )]
    CalendarAuth { status: u16, message: String },

    #[error("Token error: {0}")]
    #[diagnostic(code(meetbell::token))]
    Token(String),

    #[error("Alert error: {0}")]
    #[diagnostic(code(meetbell::alert))]
    Alert(String),

    #[error("Failed to open link {url}: {message}")]
    #[diagnostic(code(meetbell::link_open))]
    LinkOpen { url: String, message: String },

    #[error(transparent)]
    #[diagnostic(code(meetbell::io))]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(meetbell::http))]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(meetbell::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(meetbell::other))]
    Other(String),
}

impl Error {
    /// Whether the calendar refused our credentials (HTTP 401/403)
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::CalendarAuth { status, .. } if *status == 401 || *status == 403)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ReminderResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create token errors
pub fn token_error(message: &str) -> Error {
    Error::Token(message.to_string())
}

/// Helper to create alert errors
pub fn alert_error(message: &str) -> Error {
    Error::Alert(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failure_classification() {
        let unauthorized = Error::CalendarAuth {
            status: 401,
            message: "invalid_grant".to_string(),
        };
        let forbidden = Error::CalendarAuth {
            status: 403,
            message: "insufficient scope".to_string(),
        };
        assert!(unauthorized.is_auth_failure());
        assert!(forbidden.is_auth_failure());

        assert!(!google_calendar_error("HTTP 500").is_auth_failure());
        assert!(!token_error("expired").is_auth_failure());
    }
}
