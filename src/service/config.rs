use std::{env, sync::Arc};

use crate::config::Config;

pub trait ConfigService: Send + Sync {
    fn port(&self) -> u16;
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    fn strip_wrapping_quotes(value: &str) -> &str {
        if value.len() >= 2 {
            let bytes = value.as_bytes();
            let first = bytes[0];
            let last = bytes[value.len() - 1];
            if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
                return &value[1..value.len() - 1];
            }
        }
        value
    }

    fn env_nonempty(key: &str) -> Option<String> {
        env::var(key).ok().and_then(|value| {
            let normalized = Self::strip_wrapping_quotes(value.trim()).trim();
            if normalized.is_empty() {
                None
            } else {
                Some(normalized.to_string())
            }
        })
    }

    fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
        Self::env_nonempty(key).and_then(|value| value.parse::<T>().ok())
    }

    fn env_bool(key: &str, default: bool) -> bool {
        Self::env_nonempty(key)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }

    pub fn new() -> Self {
        let defaults = Config::default();

        let config = Config {
            port: Self::env_parse("PORT").unwrap_or(defaults.port),
            redis_url: Self::env_nonempty("REDIS_URL"),
            session_ttl_seconds: Self::env_parse("SESSION_TTL_SECONDS")
                .unwrap_or(defaults.session_ttl_seconds),
            session_key_prefix: Self::env_nonempty("SESSION_KEY_PREFIX")
                .unwrap_or(defaults.session_key_prefix),
            cookie_secure: Self::env_bool("COOKIE_SECURE", defaults.cookie_secure),
            cookie_domain: Self::env_nonempty("COOKIE_DOMAIN"),
            default_plan_name: Self::env_nonempty("DEFAULT_PLAN_NAME")
                .unwrap_or(defaults.default_plan_name),
            change_feed_capacity: Self::env_parse::<usize>("CHANGE_FEED_CAPACITY")
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.change_feed_capacity),
            lease_expiry_warning_days: Self::env_parse("LEASE_EXPIRY_WARNING_DAYS")
                .unwrap_or(defaults.lease_expiry_warning_days),
        };

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for ConfigServiceImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService for ConfigServiceImpl {
    fn port(&self) -> u16 {
        self.config.port
    }

    fn values(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_matching_quotes_only() {
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("\"abc\""), "abc");
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("'abc'"), "abc");
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("\"abc'"), "\"abc'");
        assert_eq!(ConfigServiceImpl::strip_wrapping_quotes("\""), "\"");
    }

    #[test]
    fn from_config_keeps_values() {
        let service = ConfigServiceImpl::from_config(Config {
            port: 8080,
            ..Config::default()
        });
        assert_eq!(service.port(), 8080);
        assert_eq!(service.values().default_plan_name, "Free");
    }
}
