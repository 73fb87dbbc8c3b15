//! Gateway configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use commissionhub_auth::DEFAULT_STEP_TIMEOUT;
use commissionhub_billing::PaymentLinks;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ROLE_TABLE: &str = "users";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// Identity provider / database REST base URL (no trailing slash).
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Backend token verification endpoint.
    pub verify_url: String,
    /// Table holding the `role` column keyed by user `id`.
    pub role_table: String,
    /// Bounded wait for each external call in the sign-in flow.
    pub step_timeout: Duration,
    pub payment_links: PaymentLinks,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                message: e.to_string(),
            })?;

        let step_timeout = match lookup("CALLBACK_STEP_TIMEOUT_MS") {
            None => DEFAULT_STEP_TIMEOUT,
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                    var: "CALLBACK_STEP_TIMEOUT_MS",
                    message: e.to_string(),
                })?;
                if ms == 0 {
                    return Err(ConfigError::Invalid {
                        var: "CALLBACK_STEP_TIMEOUT_MS",
                        message: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_millis(ms)
            }
        };

        Ok(Self {
            bind_addr,
            supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            verify_url: required("VERIFY_URL")?,
            role_table: lookup("ROLE_TABLE").unwrap_or_else(|| DEFAULT_ROLE_TABLE.to_string()),
            step_timeout,
            payment_links: PaymentLinks::from_lookup(&lookup),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SUPABASE_URL", "https://db.example/"),
        ("SUPABASE_ANON_KEY", "anon"),
        ("VERIFY_URL", "https://app.example/api/verify"),
    ];

    #[test]
    fn defaults_apply() {
        let cfg = GatewayConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.supabase_url, "https://db.example");
        assert_eq!(cfg.role_table, "users");
        assert_eq!(cfg.step_timeout, DEFAULT_STEP_TIMEOUT);
        assert_eq!(cfg.payment_links, PaymentLinks::default());
    }

    #[test]
    fn missing_required_var_is_reported() {
        let err = GatewayConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("VERIFY_URL"));
    }

    #[test]
    fn timeout_and_links_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("CALLBACK_STEP_TIMEOUT_MS", "2500"));
        pairs.push(("PAYMENT_LINK_PREMIUM", "https://pay.example/premium"));
        let cfg = GatewayConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.step_timeout, Duration::from_millis(2500));
        assert_eq!(cfg.payment_links.premium, "https://pay.example/premium");
    }

    #[test]
    fn zero_or_garbage_timeout_is_invalid() {
        for raw in ["0", "soon"] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push(("CALLBACK_STEP_TIMEOUT_MS", raw));
            assert!(matches!(
                GatewayConfig::from_lookup(lookup(&pairs)),
                Err(ConfigError::Invalid { var: "CALLBACK_STEP_TIMEOUT_MS", .. })
            ));
        }
    }
}
