use std::env;
use std::time::Duration;

/// Default API root for OpenAI-compatible providers.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upstream chat-completion settings.
///
/// | Env var              | Default                       |
/// |----------------------|-------------------------------|
/// | `OPENAI_API_KEY`     | (required, else coach is off) |
/// | `OPENAI_BASE_URL`    | `https://api.openai.com/v1`   |
/// | `COACH_MODEL`        | `gpt-4o-mini`                 |
/// | `COACH_TIMEOUT_SECS` | `30`                          |
#[derive(Clone, Debug)]
pub struct CoachConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl CoachConfig {
    /// Read the coach settings. `None` when no usable API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("OPENAI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }

        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = env::var("COACH_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let timeout_secs: u64 = env::var("COACH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Some(Self::new(api_key, base_url, model).with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let config = CoachConfig::new("k", "http://localhost:9000/v1/", "m");
        assert_eq!(
            config.completions_url(),
            "http://localhost:9000/v1/chat/completions"
        );
    }
}
