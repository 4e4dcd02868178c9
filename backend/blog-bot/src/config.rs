/// Bot configuration, read from the environment
use std::time::Duration;

#[derive(Clone)]
pub struct BotConfig {
    /// Telegram bot token
    pub bot_token: String,
    /// Base URL of the blog API, without a trailing slash
    pub api_base_url: String,
    /// Per-request timeout for API calls
    pub api_timeout_secs: u64,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, String> {
        let bot_token = std::env::var("BOT_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| "BOT_TOKEN must be set".to_string())?;

        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        let api_timeout_secs = match std::env::var("API_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| format!("Invalid API_TIMEOUT_SECS value '{}': {}", raw, e))?,
            Err(_) => 10,
        };

        Ok(Self {
            bot_token,
            api_base_url,
            api_timeout_secs,
        })
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        for key in ["BOT_TOKEN", "API_BASE_URL", "API_TIMEOUT_SECS"] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn token_is_required() {
        clear();
        assert!(BotConfig::from_env().unwrap_err().contains("BOT_TOKEN"));
    }

    #[test]
    #[serial]
    fn defaults_and_trailing_slash() {
        clear();
        std::env::set_var("BOT_TOKEN", "123:abc");
        std::env::set_var("API_BASE_URL", "http://api.local:8000/");

        let config = BotConfig::from_env().unwrap();
        assert_eq!(config.api_base_url, "http://api.local:8000");
        assert_eq!(config.api_timeout(), Duration::from_secs(10));
        assert!(!format!("{:?}", config).contains("123:abc"));
        clear();
    }

    #[test]
    #[serial]
    fn bad_timeout_is_an_error() {
        clear();
        std::env::set_var("BOT_TOKEN", "123:abc");
        std::env::set_var("API_TIMEOUT_SECS", "soon");

        assert!(BotConfig::from_env()
            .unwrap_err()
            .contains("API_TIMEOUT_SECS"));
        clear();
    }
}
