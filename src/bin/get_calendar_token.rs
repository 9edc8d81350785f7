use meetbell::components::google_calendar::{StoredToken, TokenManager};
use meetbell::config::Config;
use meetbell::error::{other_error, token_error, Error, ReminderResult};
use url::Url;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const REDIRECT_URI: &str = "http://localhost:8080";
const LISTEN_ADDR: &str = "127.0.0.1:8080";
const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = Config::load()?;

    let token_manager = TokenManager::new(
        config.token_path.clone(),
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
    );

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = authorization_url(&config.google_client_id, &state)?;

    // Start the callback listener before the browser can redirect to it
    let server = tiny_http::Server::http(LISTEN_ADDR)
        .map_err(|e| other_error(&format!("Failed to listen on {}: {}", LISTEN_ADDR, e)))?;

    println!("Opening browser for Google Calendar authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Could not open a browser. Visit this URL:\n{}", auth_url);
    }
    println!("Waiting for authorization callback...");

    let request = server.recv().map_err(Error::from)?;
    let code = callback_code(request.url(), &state)?;

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let response = client
        .post(TOKEN_ENDPOINT)
        .form(&[
            ("client_id", config.google_client_id.as_str()),
            ("client_secret", config.google_client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(Error::from)?;

    if !response.status().is_success() {
        let error_text = response.text().await.map_err(Error::from)?;
        return Err(token_error(&format!("Failed to get token: {}", error_text)).into());
    }

    let token_data: serde_json::Value = response.json().await.map_err(Error::from)?;
    let token = StoredToken::from_response(&token_data, None)?;
    token_manager.set_token(&token).await?;

    let reply =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(reply).map_err(Error::from)?;

    println!("Token saved to {}", token_manager.token_path().display());

    Ok(())
}

fn authorization_url(client_id: &str, state: &str) -> ReminderResult<Url> {
    let mut url = Url::parse(AUTH_ENDPOINT)
        .map_err(|e| other_error(&format!("Invalid authorization endpoint: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", SCOPE)
        .append_pair("state", state);
    Ok(url)
}

/// Pull the authorization code out of the callback path, checking `state`
fn callback_code(request_path: &str, expected_state: &str) -> ReminderResult<String> {
    let url = Url::parse(REDIRECT_URI)
        .and_then(|base| base.join(request_path))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => return Err(token_error(&format!("Authorization denied: {}", value))),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(token_error("Authorization callback state mismatch"));
    }

    code.ok_or_else(|| token_error("No authorization code found in callback"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_carries_state() {
        let url = authorization_url("client-123", "abc").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".to_string(), "client-123".to_string())));
        assert!(pairs.contains(&("state".to_string(), "abc".to_string())));
        assert!(pairs.contains(&("access_type".to_string(), "offline".to_string())));
    }

    #[test]
    fn test_callback_code() {
        assert_eq!(callback_code("/?state=abc&code=4%2F0xyz", "abc").unwrap(), "4/0xyz");
        assert!(callback_code("/?state=other&code=4%2F0xyz", "abc").is_err());
        assert!(callback_code("/?state=abc&error=access_denied", "abc").is_err());
        assert!(callback_code("/?state=abc", "abc").is_err());
    }
}
