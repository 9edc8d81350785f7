use crate::error::{token_error, Error, ReminderResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Refresh this many seconds before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth token as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp of expiry
    pub expires_at: i64,
}

impl StoredToken {
    /// Build a token from a token endpoint response
    pub fn from_response(response: &serde_json::Value, previous_refresh: Option<&str>) -> ReminderResult<Self> {
        let access_token = response
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| token_error("Token response missing 'access_token' field"))?
            .to_string();

        // Google only returns a refresh token on the first exchange
        let refresh_token = response
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .or(previous_refresh)
            .map(|s| s.to_string());

        let expires_in = response
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);

        Ok(Self {
            access_token,
            refresh_token,
            expires_at: Utc::now().timestamp() + expires_in,
        })
    }

    pub fn is_expired(&self, now_timestamp: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now_timestamp
    }
}

/// Loads, refreshes and saves the Google OAuth token
#[derive(Clone)]
pub struct TokenManager {
    token_path: PathBuf,
    client_id: String,
    client_secret: String,
    client: Client,
}

impl TokenManager {
    pub fn new(token_path: PathBuf, client_id: String, client_secret: String) -> Self {
        Self {
            token_path,
            client_id,
            client_secret,
            client: Client::new(),
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Get a valid access token, refreshing the stored one if it has expired
    pub async fn get_token(&self) -> ReminderResult<StoredToken> {
        let token = self.load_token().await?;

        if !token.is_expired(Utc::now().timestamp()) {
            return Ok(token);
        }

        debug!("Access token expired, refreshing");
        self.refresh_token(&token).await
    }

    /// Read the token file
    pub async fn load_token(&self) -> ReminderResult<StoredToken> {
        let content = tokio::fs::read_to_string(&self.token_path)
            .await
            .map_err(|e| {
                token_error(&format!(
                    "Failed to read token file {}: {}. Run get_calendar_token first.",
                    self.token_path.display(),
                    e
                ))
            })?;

        serde_json::from_str(&content)
            .map_err(|e| token_error(&format!("Failed to parse token file: {}", e)))
    }

    /// Refresh an expired token and store the result
    async fn refresh_token(&self, token: &StoredToken) -> ReminderResult<StoredToken> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| token_error("No refresh token in token data"))?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| token_error(&format!("Failed to refresh token: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(Error::CalendarAuth {
                    status: status.as_u16(),
                    message: error_body,
                });
            }
            return Err(token_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| token_error(&format!("Failed to parse token response: {}", e)))?;

        let refreshed = StoredToken::from_response(&body, Some(refresh_token))?;
        self.set_token(&refreshed).await?;
        info!("Refreshed Google Calendar access token");

        Ok(refreshed)
    }

    /// Write the token file, creating its directory if needed
    pub async fn set_token(&self, token: &StoredToken) -> ReminderResult<()> {
        if let Some(parent) = self.token_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(token)?;
        tokio::fs::write(&self.token_path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_token_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("meetbell-test-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_from_response_keeps_previous_refresh_token() {
        let response = json!({ "access_token": "new-access", "expires_in": 1800 });
        let token = StoredToken::from_response(&response, Some("old-refresh")).unwrap();
        assert_eq!(token.access_token, "new-access");
        assert_eq!(token.refresh_token.as_deref(), Some("old-refresh"));
        assert!(token.expires_at > Utc::now().timestamp() + 1700);
    }

    #[test]
    fn test_from_response_requires_access_token() {
        let response = json!({ "error": "invalid_grant" });
        assert!(StoredToken::from_response(&response, None).is_err());
    }

    #[test]
    fn test_expiry_margin() {
        let token = StoredToken {
            access_token: "a".to_string(),
            refresh_token: None,
            expires_at: 1_000,
        };
        assert!(!token.is_expired(900));
        assert!(token.is_expired(940));
        assert!(token.is_expired(2_000));
    }

    #[tokio::test]
    async fn test_set_and_load_token() {
        let path = temp_token_path("token.json");
        let manager = TokenManager::new(path.clone(), "id".to_string(), "secret".to_string());
        let token = StoredToken {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now().timestamp() + 3600,
        };

        manager.set_token(&token).await.unwrap();
        assert_eq!(manager.load_token().await.unwrap(), token);
        // Not expired, so no network round trip
        assert_eq!(manager.get_token().await.unwrap(), token);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_missing_token_file() {
        let manager = TokenManager::new(
            temp_token_path("missing.json"),
            "id".to_string(),
            "secret".to_string(),
        );
        assert!(matches!(manager.get_token().await, Err(Error::Token(_))));
    }
}
