use chrono::NaiveTime;
use tracing::warn;

use crate::types::{DigestError, Result};

/// Default delivery time, 03:30 UTC (09:00 IST).
pub const DEFAULT_DIGEST_TIME: &str = "03:30";

/// Process-scoped configuration, read once at startup and passed to each
/// component. Components never read the environment themselves.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub chat_id: String,
    pub gemini_api_key: Option<String>,
    pub ci_mode: bool,
    pub digest_time: NaiveTime,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, so tests can substitute
    /// the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = required(&lookup, "TELEGRAM_BOT_TOKEN")?;
        let chat_id = required(&lookup, "TELEGRAM_CHAT_ID")?;

        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty());
        if gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY is not set; digest generation will fail until it is provided");
        }

        let ci_mode = lookup("CI").map(|v| is_truthy(&v)).unwrap_or(false);

        let digest_time = match lookup("DIGEST_TIME_UTC") {
            Some(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| {
                DigestError::InvalidConfig { key: "DIGEST_TIME_UTC", value: raw }
            })?,
            None => NaiveTime::parse_from_str(DEFAULT_DIGEST_TIME, "%H:%M")
                .expect("default digest time parses"),
        };

        Ok(Self { bot_token, chat_id, gemini_api_key, ci_mode, digest_time })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DigestError::MissingConfig(key)),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "token-123"),
            ("TELEGRAM_CHAT_ID", "-100200300"),
            ("GEMINI_API_KEY", "key-456"),
            ("CI", "true"),
            ("DIGEST_TIME_UTC", "07:45"),
        ]))
        .unwrap();

        assert_eq!(config.bot_token, "token-123");
        assert_eq!(config.chat_id, "-100200300");
        assert_eq!(config.gemini_api_key.as_deref(), Some("key-456"));
        assert!(config.ci_mode);
        assert_eq!(config.digest_time, NaiveTime::parse_from_str("07:45", "%H:%M").unwrap());
    }

    #[test]
    fn test_missing_bot_token_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[("TELEGRAM_CHAT_ID", "1")]));
        assert!(matches!(result, Err(DigestError::MissingConfig("TELEGRAM_BOT_TOKEN"))));
    }

    #[test]
    fn test_missing_chat_id_is_fatal() {
        let result = Config::from_lookup(lookup_from(&[("TELEGRAM_BOT_TOKEN", "t")]));
        assert!(matches!(result, Err(DigestError::MissingConfig("TELEGRAM_CHAT_ID"))));
    }

    #[test]
    fn test_empty_required_value_counts_as_missing() {
        let result = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "  "),
            ("TELEGRAM_CHAT_ID", "1"),
        ]));
        assert!(matches!(result, Err(DigestError::MissingConfig("TELEGRAM_BOT_TOKEN"))));
    }

    #[test]
    fn test_gemini_key_is_optional() {
        let config = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "1"),
        ]))
        .unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(!config.ci_mode);
        assert_eq!(
            config.digest_time,
            NaiveTime::parse_from_str(DEFAULT_DIGEST_TIME, "%H:%M").unwrap()
        );
    }

    #[test]
    fn test_ci_flag_values() {
        for (raw, expected) in [("1", true), ("true", true), ("YES", true), ("false", false), ("0", false)] {
            let config = Config::from_lookup(lookup_from(&[
                ("TELEGRAM_BOT_TOKEN", "t"),
                ("TELEGRAM_CHAT_ID", "1"),
                ("CI", raw),
            ]))
            .unwrap();
            assert_eq!(config.ci_mode, expected, "CI={}", raw);
        }
    }

    #[test]
    fn test_invalid_digest_time_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "1"),
            ("DIGEST_TIME_UTC", "quarter past nine"),
        ]));
        assert!(matches!(result, Err(DigestError::InvalidConfig { key: "DIGEST_TIME_UTC", .. })));
    }
}
